use std::time::Duration;

use hostprobe_common::probe::Check;

use super::{Checked, bounded, note};
use crate::capability::ReachabilityProber;

// An external helper may overrun its own wait bound by a little.
const PROBER_GRACE: Duration = Duration::from_millis(500);

/// Exactly one probe round. Every non-answer condition is `false`.
pub async fn probe_icmp(
    prober: &dyn ReachabilityProber,
    hostname: &str,
    timeout: Duration,
) -> Checked<bool> {
    match bounded(timeout + PROBER_GRACE, prober.probe(hostname, timeout)).await {
        Ok(answered) => Checked::clean(answered),
        Err(err) => Checked::with_diagnostic(false, note(Check::Icmp, hostname, &err)),
    }
}
