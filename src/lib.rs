pub mod baseline;
pub mod config;
pub mod error;
pub mod http_client;
pub mod matching;
pub mod output;
pub mod probe;
pub mod scanner;
pub mod target;

// re-export the types most callers need
pub use crate::error::{ProbeError, ScanError};
pub use crate::matching::{Evidence, MatchPolicy, StatusFilter, Verdict};
pub use crate::scanner::{ScanCoordinator, ScanSummary};
pub use crate::target::CidrBlock;
