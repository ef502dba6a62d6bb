use reqwest::{Client, ClientBuilder};
use std::time::Duration;

use crate::config::ScanConfig;

/// Build a probe client. Candidates get one without redirects unless the
/// operator opts in; the baseline follows them like a browser would.
///
/// Certificate validation is OFF. Origin servers are contacted by IP address
/// and routinely present self-signed certificates or certificates for the
/// domain rather than the address, so trust cannot be a filter here. This
/// client must not be reused for anything but probing.
pub fn create_probe_client(config: &ScanConfig, follow_redirects: bool) -> reqwest::Result<Client> {
    let redirects = if follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    ClientBuilder::new()
        // Every candidate is a different address, nothing to reuse
        .pool_max_idle_per_host(0)
        .tcp_nodelay(true)
        // Candidates must be reached directly, never through a system proxy
        .no_proxy()
        // HTTP/2 would carry the address in :authority and servers prefer it over Host
        .http1_only()

        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))

        // Compare decoded lengths on both paths
        .gzip(true)
        .brotli(true)

        .use_rustls_tls()
        .https_only(false)
        .danger_accept_invalid_certs(true)

        .redirect(redirects)
        .user_agent(config.user_agent.clone())
        .build()
}
