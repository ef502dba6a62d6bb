use std::net::Ipv4Addr;

use serde::Serialize;

use crate::baseline::BaselineSignature;
use crate::error::ProbeError;
use crate::probe::{ProbeResult, Scheme};

/// Length comparison against the baseline.
///
/// A heuristic: different pages can share a length and dynamic pages drift,
/// so both false positives and false negatives are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchPolicy {
    pub tolerance: u64,
}

impl MatchPolicy {
    pub fn new(tolerance: u64) -> Self {
        Self { tolerance }
    }

    /// `|candidate - baseline| <= tolerance`
    pub fn is_match(&self, candidate_length: u64, baseline_length: u64) -> bool {
        candidate_length.abs_diff(baseline_length) <= self.tolerance
    }

    pub fn judge(
        &self,
        address: Ipv4Addr,
        host_header: &str,
        result: &ProbeResult,
        baseline: &BaselineSignature,
    ) -> Verdict {
        let resp = match &result.outcome {
            Ok(resp) => resp,
            Err(e) => return Verdict::Discarded(e.clone()),
        };

        if resp.status != 200 || !self.is_match(resp.body_length, baseline.body_length) {
            return Verdict::NonMatch;
        }

        Verdict::Match(Evidence {
            address,
            host_header: host_header.to_string(),
            scheme: result.scheme,
            status: resp.status,
            body_length: resp.body_length,
            baseline_length: Some(baseline.body_length),
        })
    }
}

/// Which responses the method-probing mode reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    OkOnly,
    Any,
}

impl StatusFilter {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            StatusFilter::OkOnly => status == 200,
            StatusFilter::Any => true,
        }
    }

    pub fn judge(&self, address: Ipv4Addr, host_header: &str, result: &ProbeResult) -> Verdict {
        match &result.outcome {
            Err(e) => Verdict::Discarded(e.clone()),
            Ok(resp) if !self.accepts(resp.status) => Verdict::NonMatch,
            Ok(resp) => Verdict::Match(Evidence {
                address,
                host_header: host_header.to_string(),
                scheme: result.scheme,
                status: resp.status,
                body_length: resp.body_length,
                baseline_length: None,
            }),
        }
    }
}

/// Everything needed to act on a hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub address: Ipv4Addr,
    pub host_header: String,
    pub scheme: Scheme,
    pub status: u16,
    pub body_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match(Evidence),
    NonMatch,
    /// The probe never produced a response. Not shown to the user.
    Discarded(ProbeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeTarget;

    const ADDR: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 20);

    fn baseline(len: u64) -> BaselineSignature {
        BaselineSignature { status: 200, body_length: len }
    }

    fn answered(status: u16, len: u64) -> ProbeResult {
        ProbeResult::response(&ProbeTarget::new(ADDR.to_string(), Scheme::Http, "example.com"), status, len)
    }

    #[test]
    fn strict_tolerance() {
        let policy = MatchPolicy::new(0);
        assert!(policy.is_match(1000, 1000));
        assert!(!policy.is_match(999, 1000));
        assert!(!policy.is_match(1001, 1000));
    }

    #[test]
    fn tolerance_window_is_inclusive() {
        let policy = MatchPolicy::new(50);
        for len in 950..=1050 {
            assert!(policy.is_match(len, 1000), "{len} should match");
        }
        assert!(!policy.is_match(949, 1000));
        assert!(!policy.is_match(1051, 1000));
    }

    #[test]
    fn symmetric_and_monotonic() {
        let pairs = [(0u64, 0u64), (0, 7), (10, 3), (1000, 1051), (u64::MAX, 0), (u64::MAX, u64::MAX - 1)];
        for (a, b) in pairs {
            for t in [0u64, 1, 7, 51, 1000, u64::MAX] {
                let policy = MatchPolicy::new(t);
                assert_eq!(policy.is_match(a, b), policy.is_match(b, a));
                if policy.is_match(a, b) {
                    for wider in [t, t.saturating_add(1), u64::MAX] {
                        assert!(MatchPolicy::new(wider).is_match(a, b));
                    }
                }
            }
        }
    }

    #[test]
    fn errors_take_the_discard_branch() {
        let target = ProbeTarget::new(ADDR.to_string(), Scheme::Http, "example.com");
        let failed = ProbeResult::failed(&target, ProbeError::Connect("refused".into()));
        let verdict = MatchPolicy::new(10).judge(ADDR, "example.com", &failed, &baseline(100));
        assert_eq!(verdict, Verdict::Discarded(ProbeError::Connect("refused".into())));
        assert_eq!(
            StatusFilter::Any.judge(ADDR, "example.com", &failed),
            Verdict::Discarded(ProbeError::Connect("refused".into()))
        );
    }

    #[test]
    fn non_200_never_matches_origin() {
        let verdict = MatchPolicy::new(0).judge(ADDR, "example.com", &answered(404, 100), &baseline(100));
        assert_eq!(verdict, Verdict::NonMatch);
    }

    #[test]
    fn match_carries_evidence() {
        let verdict = MatchPolicy::new(5).judge(ADDR, "example.com", &answered(200, 103), &baseline(100));
        match verdict {
            Verdict::Match(ev) => {
                assert_eq!(ev.address, ADDR);
                assert_eq!(ev.host_header, "example.com");
                assert_eq!(ev.body_length, 103);
                assert_eq!(ev.baseline_length, Some(100));
                assert_eq!(ev.scheme, Scheme::Http);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn status_filter_modes() {
        assert!(matches!(StatusFilter::OkOnly.judge(ADDR, "h", &answered(200, 1)), Verdict::Match(_)));
        assert_eq!(StatusFilter::OkOnly.judge(ADDR, "h", &answered(403, 1)), Verdict::NonMatch);
        assert!(matches!(StatusFilter::Any.judge(ADDR, "h", &answered(403, 1)), Verdict::Match(ev) if ev.status == 403));
    }
}
