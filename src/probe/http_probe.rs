use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HOST;
use reqwest::Client;

use crate::config::ScanConfig;
use crate::error::ProbeError;
use crate::http_client::create_probe_client;
use crate::probe::{ProbeResult, ProbeTarget, Prober};

/// Probes over real HTTP with the Host header swapped in.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    redirecting: Client,
    timeout_secs: u64,
}

impl HttpProber {
    pub fn new(config: &ScanConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: create_probe_client(config, false)?,
            redirecting: create_probe_client(config, true)?,
            timeout_secs: config.timeout_secs,
        })
    }

    async fn exchange(&self, target: &ProbeTarget) -> Result<(u16, u64), ProbeError> {
        let url = target.url()?;
        let client = if target.follow_redirects { &self.redirecting } else { &self.client };
        let mut resp = client
            .request(target.method.clone(), url)
            .header(HOST, target.host_header.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status().as_u16();
        // Only the length matters, so chunks are counted and dropped
        let mut body_length = 0u64;
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => body_length += chunk.len() as u64,
                Ok(None) => break,
                Err(e) if e.is_timeout() => return Err(ProbeError::Timeout(self.timeout_secs)),
                Err(e) => return Err(ProbeError::Read(e.to_string())),
            }
        }

        Ok((status, body_length))
    }

    fn classify(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Timeout(self.timeout_secs)
        } else if e.is_builder() {
            ProbeError::Request(e.to_string())
        } else if e.is_connect() {
            ProbeError::Connect(e.to_string())
        } else {
            ProbeError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &ProbeTarget) -> ProbeResult {
        // Outer guard over connect, headers and body together
        let budget = Duration::from_secs(self.timeout_secs);
        let outcome = match tokio::time::timeout(budget, self.exchange(target)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout(self.timeout_secs)),
        };

        match outcome {
            Ok((status, body_length)) => {
                tracing::debug!(host = %target.host, status, body_length, "probe answered");
                ProbeResult::response(target, status, body_length)
            }
            Err(e) => {
                tracing::debug!(host = %target.host, error = %e, "probe failed");
                ProbeResult::failed(target, e)
            }
        }
    }
}
