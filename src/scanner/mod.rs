pub mod coordinator;

pub use coordinator::ScanCoordinator;

use crate::baseline::BaselineSignature;

/// Tally of one sweep, kept by the collector loop alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub probed: u64,
    pub matched: u64,
    pub non_matched: u64,
    pub discarded: u64,
    pub baseline: Option<BaselineSignature>,
}
