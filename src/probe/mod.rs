pub mod http_probe;

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ProbeError, ScanError};

pub use http_probe::HttpProber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request to send: where to connect and who to claim to be talking to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Address or domain, optionally with `:port`.
    pub host: String,
    pub scheme: Scheme,
    pub host_header: String,
    pub method: Method,
    pub follow_redirects: bool,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, scheme: Scheme, host_header: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scheme,
            host_header: host_header.into(),
            method: Method::GET,
            follow_redirects: false,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn following_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// `scheme://host`, no path.
    pub fn url(&self) -> Result<Url, ProbeError> {
        Url::parse(&format!("{}://{}", self.scheme, self.host))
            .map_err(|e| ProbeError::Request(format!("{}: {}", self.host, e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub host: String,
    pub scheme: Scheme,
    pub outcome: Result<ProbeResponse, ProbeError>,
}

impl ProbeResult {
    pub fn response(target: &ProbeTarget, status: u16, body_length: u64) -> Self {
        Self {
            host: target.host.clone(),
            scheme: target.scheme,
            outcome: Ok(ProbeResponse { status, body_length }),
        }
    }

    pub fn failed(target: &ProbeTarget, error: ProbeError) -> Self {
        Self {
            host: target.host.clone(),
            scheme: target.scheme,
            outcome: Err(error),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.outcome.as_ref().ok().map(|r| r.status)
    }

    pub fn body_length(&self) -> Option<u64> {
        self.outcome.as_ref().ok().map(|r| r.body_length)
    }

    pub fn error(&self) -> Option<&ProbeError> {
        self.outcome.as_ref().err()
    }
}

/// Parse a method name case-insensitively; custom tokens like `PROPFIND` are fine.
pub fn parse_method(input: &str) -> Result<Method, ScanError> {
    let upper = input.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(ScanError::InvalidMethod(input.to_string()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| ScanError::InvalidMethod(input.to_string()))
}

/// Sends a single probe. Implementations never fail outward: every problem
/// ends up in [`ProbeResult::outcome`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &ProbeTarget) -> ProbeResult;
}
