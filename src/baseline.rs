use crate::error::ScanError;
use crate::probe::{ProbeTarget, Prober, Scheme};

/// What the domain serves through its normal, proxied path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineSignature {
    pub status: u16,
    pub body_length: u64,
}

/// Probe the domain with its own name as address and Host header.
///
/// Anything but a readable 200 is fatal: there is nothing to compare against.
pub async fn resolve<P: Prober + ?Sized>(
    prober: &P,
    domain: &str,
    scheme: Scheme,
) -> Result<BaselineSignature, ScanError> {
    // The proxied path may bounce through http->https or www; follow it
    let target = ProbeTarget::new(domain, scheme, domain).following_redirects(true);
    let result = prober.probe(&target).await;

    let unavailable = |reason: String| ScanError::BaselineUnavailable {
        domain: domain.to_string(),
        reason,
    };

    match result.outcome {
        Ok(resp) if resp.status == 200 => {
            tracing::info!(%domain, %scheme, body_length = resp.body_length, "baseline captured");
            Ok(BaselineSignature {
                status: resp.status,
                body_length: resp.body_length,
            })
        }
        Ok(resp) => Err(unavailable(format!("unexpected status code: {}", resp.status))),
        Err(e) => Err(unavailable(e.to_string())),
    }
}
