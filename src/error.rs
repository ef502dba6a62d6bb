use thiserror::Error;

/// Errors that stop a run. Anything per-candidate is a [`ProbeError`] instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid CIDR block '{input}': {reason}")]
    InvalidCidr { input: String, reason: String },

    #[error("baseline for {domain} unavailable: {reason}")]
    BaselineUnavailable { domain: String, reason: String },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
}

/// Failure of a single probe. Expected in bulk when sweeping a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("could not build request: {0}")]
    Request(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read body: {0}")]
    Read(String),
}
