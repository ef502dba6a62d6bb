use serde::Deserialize;

use crate::probe::Scheme;

/// Knobs shared by both scan modes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub timeout_secs: u64,
    /// Probes in flight at once; 0 lifts the limit.
    pub concurrency: usize,
    pub scheme: Scheme,
    /// Appended to candidate addresses, never to the baseline domain.
    pub port: Option<u16>,
    /// Allowed body-length difference from the baseline.
    pub tolerance: u64,
    /// Let candidates redirect. Off by default: a candidate that redirects to
    /// the proxied site would otherwise inherit its page and length.
    pub follow_redirects: bool,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            concurrency: 256,
            scheme: Scheme::Https,
            port: None,
            tolerance: 0,
            follow_redirects: false,
            user_agent: format!("ipx/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScanConfig {
    /// Limit handed to `buffer_unordered`.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrency == 0 {
            usize::MAX
        } else {
            self.concurrency
        }
    }
}
