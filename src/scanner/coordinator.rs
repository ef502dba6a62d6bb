use std::net::Ipv4Addr;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use reqwest::Method;
use tokio::sync::mpsc;

use crate::baseline;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::matching::{Evidence, MatchPolicy, StatusFilter, Verdict};
use crate::probe::{ProbeResult, ProbeTarget, Prober};
use crate::scanner::ScanSummary;
use crate::target::CidrBlock;

/// Drives a sweep over a block: one spawned task per address, hits streamed
/// to the sink in completion order.
pub struct ScanCoordinator<P> {
    prober: Arc<P>,
    config: ScanConfig,
    progress: Option<ProgressBar>,
}

impl<P: Prober + 'static> ScanCoordinator<P> {
    pub fn new(prober: P, config: ScanConfig) -> Self {
        Self::from_arc(Arc::new(prober), config)
    }

    pub fn from_arc(prober: Arc<P>, config: ScanConfig) -> Self {
        Self { prober, config, progress: None }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Origin matching. The baseline is fixed before the first candidate is
    /// probed; if it cannot be captured nothing is probed at all.
    pub async fn find_origin(
        &self,
        block: &CidrBlock,
        domain: &str,
        sink: mpsc::Sender<Evidence>,
    ) -> Result<ScanSummary, ScanError> {
        let signature = baseline::resolve(self.prober.as_ref(), domain, self.config.scheme).await?;
        let shared = Arc::new(signature);
        let policy = MatchPolicy::new(self.config.tolerance);
        let host_header = domain.to_string();

        tracing::info!(
            %block,
            %domain,
            baseline_length = signature.body_length,
            tolerance = policy.tolerance,
            "starting origin sweep"
        );

        let judge = {
            let host_header = host_header.clone();
            move |address: Ipv4Addr, result: &ProbeResult| policy.judge(address, &host_header, result, &shared)
        };

        let mut summary = self.sweep(block, &host_header, Method::GET, judge, sink).await;
        summary.baseline = Some(signature);
        Ok(summary)
    }

    /// Raw reconnaissance: no baseline, every response the filter accepts is
    /// reported.
    pub async fn probe_methods(
        &self,
        block: &CidrBlock,
        method: Method,
        host_header: &str,
        filter: StatusFilter,
        sink: mpsc::Sender<Evidence>,
    ) -> ScanSummary {
        tracing::info!(%block, %method, %host_header, ?filter, "starting method sweep");

        let judge = {
            let host_header = host_header.to_string();
            move |address: Ipv4Addr, result: &ProbeResult| filter.judge(address, &host_header, result)
        };

        self.sweep(block, host_header, method, judge, sink).await
    }

    async fn sweep<J>(
        &self,
        block: &CidrBlock,
        host_header: &str,
        method: Method,
        judge: J,
        sink: mpsc::Sender<Evidence>,
    ) -> ScanSummary
    where
        J: Fn(Ipv4Addr, &ProbeResult) -> Verdict + Send + Sync + 'static,
    {
        let judge = Arc::new(judge);
        let limit = self.config.effective_concurrency();
        let scheme = self.config.scheme;
        let port = self.config.port;
        let follow_redirects = self.config.follow_redirects;

        if let Some(pb) = &self.progress {
            pb.set_length(block.len());
        }

        let tasks = stream::iter(block.addresses())
            .map(|address| {
                let prober = Arc::clone(&self.prober);
                let judge = Arc::clone(&judge);
                let target = ProbeTarget::new(candidate_host(address, port), scheme, host_header)
                    .with_method(method.clone())
                    .following_redirects(follow_redirects);

                tokio::spawn(async move {
                    let result = prober.probe(&target).await;
                    (address, (*judge)(address, &result))
                })
            })
            .buffer_unordered(limit);
        futures::pin_mut!(tasks);

        let mut summary = ScanSummary::default();
        let mut sink_open = true;

        while let Some(joined) = tasks.next().await {
            summary.probed += 1;
            if let Some(pb) = &self.progress {
                pb.inc(1);
            }

            match joined {
                Ok((_, Verdict::Match(evidence))) => {
                    summary.matched += 1;
                    tracing::info!(address = %evidence.address, status = evidence.status, body_length = evidence.body_length, "hit");
                    if sink_open && sink.send(evidence).await.is_err() {
                        tracing::warn!("hit receiver closed, further hits are only counted");
                        sink_open = false;
                    }
                }
                Ok((_, Verdict::NonMatch)) => summary.non_matched += 1,
                Ok((address, Verdict::Discarded(error))) => {
                    summary.discarded += 1;
                    tracing::debug!(%address, %error, "discarding candidate");
                }
                Err(e) => {
                    summary.discarded += 1;
                    tracing::warn!(error = %e, "probe task did not complete");
                }
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        tracing::info!(
            probed = summary.probed,
            matched = summary.matched,
            discarded = summary.discarded,
            "sweep complete"
        );
        summary
    }
}

fn candidate_host(address: Ipv4Addr, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}", address, port),
        None => address.to_string(),
    }
}
