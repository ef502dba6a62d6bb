use clap::Parser;

use ipx::probe::Scheme;

#[derive(clap::Parser, Debug)]
#[command(name = "ipx", author, version, about = "Origin IP discovery behind reverse proxies and CDNs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Find addresses that serve the same page as the proxied domain
    Scan {
        /// CIDR range to scan (e.g. 203.0.113.0/24)
        #[arg(long)]
        cidr: String,

        /// Domain to use in the Host header and to fetch the baseline from
        #[arg(long)]
        domain: String,

        /// Allowed content length difference from the baseline
        #[arg(long, default_value_t = 0_u64)]
        delta: u64,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Send one method with a fixed Host header to every address and report 200 OK responses
    Methods {
        /// HTTP method to send (GET, HEAD, OPTIONS, PROPFIND, ...)
        method: String,

        /// Host header to send
        host: String,

        /// CIDR range to scan (e.g. 203.0.113.0/24)
        #[arg(long)]
        cidr: String,

        /// Report every response, not only 200 OK
        #[arg(long, default_value_t = false)]
        all_status: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Scheme used for the baseline and for every candidate
    #[arg(long, value_enum, default_value_t = Scheme::Https)]
    pub scheme: Scheme,

    /// Port to contact on every candidate address
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15_u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Probes in flight at once (0 = unlimited)
    #[arg(short = 'c', long, default_value_t = 256_usize)]
    pub concurrency: usize,

    /// Let candidates redirect (the baseline always does); a candidate that
    /// redirects to the proxied site will then look like a match
    #[arg(long, default_value_t = false)]
    pub follow_redirects: bool,

    /// Print hits as JSON lines
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Show a progress bar on stderr
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
