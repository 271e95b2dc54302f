//! The individual checks, as free functions over a capability.
//!
//! Every check resolves to its terminal value and never returns an error.
//! Expected failures (refused, unreachable, not found, timeout) are silently
//! collapsed; anything else is collapsed too but also logged at `warn` and
//! handed back as a [`Diagnostic`].

use std::time::Duration;

use hostprobe_common::error::ProbeError;
use hostprobe_common::probe::{Check, Diagnostic};
use tracing::{debug, warn};

pub mod dns;
pub mod icmp;
pub mod tcp;

pub use dns::{classify_record, resolve_address, reverse_resolve};
pub use icmp::probe_icmp;
pub use tcp::probe_tcp;

/// A check's terminal value plus the unclassified failure, if any, that was
/// collapsed into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Checked<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(value: T, diagnostic: Option<Diagnostic>) -> Self {
        Self { value, diagnostic }
    }
}

/// Bounds `fut` by `timeout`, mapping expiry to [`ProbeError::Timeout`].
pub(crate) async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res,
        Err(_elapsed) => Err(ProbeError::Timeout),
    }
}

/// Logs a collapsed failure and returns a diagnostic when it was unexpected.
pub(crate) fn note(check: Check, subject: &str, err: &ProbeError) -> Option<Diagnostic> {
    if err.is_expected() {
        debug!("{check} check on {subject}: {err}");
        None
    } else {
        warn!("{check} check on {subject} hit an unclassified error: {err}");
        Some(Diagnostic::new(check, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_maps_expiry_to_timeout() {
        let res: Result<(), ProbeError> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(res, Err(ProbeError::Timeout));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let res = bounded(Duration::from_secs(1), async { Ok::<_, ProbeError>(7) }).await;
        assert_eq!(res, Ok(7));
    }

    #[test]
    fn test_note_only_reports_unclassified() {
        assert_eq!(note(Check::Tcp, "h", &ProbeError::ConnectionRefused), None);
        assert_eq!(
            note(Check::Tcp, "h", &ProbeError::Unclassified("EMFILE".into())),
            Some(Diagnostic::new(
                Check::Tcp,
                "unclassified transport error: EMFILE"
            ))
        );
    }
}
