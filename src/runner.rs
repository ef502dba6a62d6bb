use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::cli::{Cli, CommonArgs, Commands};
use ipx::config::ScanConfig;
use ipx::matching::StatusFilter;
use ipx::output::{spawn_hit_printer, HitFormat, Layout};
use ipx::probe::{parse_method, HttpProber};
use ipx::scanner::ScanCoordinator;
use ipx::target::CidrBlock;

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    // Our crate follows the flags; reqwest/hyper stay at INFO so they cannot flood stderr.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!("ipx={crate},reqwest=info,hyper=info,rustls=warn", crate = crate_level);
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    match cli.command {
        Commands::Scan { cidr, domain, delta, common } => {
            let block = CidrBlock::parse(&cidr)?;
            let config = build_config(&common, delta);
            tracing::info!(%block, %domain, delta, scheme = %config.scheme, "Starting origin scan");

            let progress = progress_bar(&common);
            let coordinator = coordinator(&config, progress.clone())?;
            let (tx, rx) = mpsc::channel(1024);
            let printer = spawn_hit_printer(rx, Layout::Origin, hit_format(&common), progress);

            let result = coordinator.find_origin(&block, &domain, tx).await;
            let printed = printer.await.unwrap_or(0);
            let summary = result?;
            tracing::info!(probed = summary.probed, hits = printed, "Origin scan finished");
        }
        Commands::Methods { method, host, cidr, all_status, common } => {
            let block = CidrBlock::parse(&cidr)?;
            let method = parse_method(&method)?;
            let config = build_config(&common, 0);
            let filter = if all_status { StatusFilter::Any } else { StatusFilter::OkOnly };
            tracing::info!(%block, %method, %host, scheme = %config.scheme, "Starting method probe");

            let progress = progress_bar(&common);
            let coordinator = coordinator(&config, progress.clone())?;
            let (tx, rx) = mpsc::channel(1024);
            let printer = spawn_hit_printer(rx, Layout::Methods, hit_format(&common), progress);

            let summary = coordinator.probe_methods(&block, method, &host, filter, tx).await;
            let printed = printer.await.unwrap_or(0);
            tracing::info!(probed = summary.probed, hits = printed, "Method probe finished");
        }
    }
    Ok(())
}

fn build_config(common: &CommonArgs, tolerance: u64) -> ScanConfig {
    ScanConfig {
        timeout_secs: common.timeout,
        concurrency: common.concurrency,
        scheme: common.scheme,
        port: common.port,
        tolerance,
        follow_redirects: common.follow_redirects,
        ..ScanConfig::default()
    }
}

fn coordinator(config: &ScanConfig, progress: Option<ProgressBar>) -> anyhow::Result<ScanCoordinator<HttpProber>> {
    let prober = HttpProber::new(config)?;
    let coordinator = ScanCoordinator::new(prober, config.clone());
    Ok(match progress {
        Some(pb) => coordinator.with_progress(pb),
        None => coordinator,
    })
}

fn hit_format(common: &CommonArgs) -> HitFormat {
    if common.json {
        HitFormat::Json
    } else if common.no_color || !std::io::stdout().is_terminal() {
        HitFormat::Plain
    } else {
        HitFormat::Color
    }
}

fn progress_bar(common: &CommonArgs) -> Option<ProgressBar> {
    if !common.progress {
        return None;
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    Some(pb)
}
