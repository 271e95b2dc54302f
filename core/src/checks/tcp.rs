use std::time::Duration;

use hostprobe_common::probe::Check;

use super::{Checked, bounded, note};
use crate::capability::Dialer;

/// `true` only for a completed connect followed by a close.
///
/// `timeout` is a wall-clock bound around the whole attempt, name resolution
/// inside the dialer included.
pub async fn probe_tcp(
    dialer: &dyn Dialer,
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Checked<bool> {
    match bounded(timeout, dialer.connect(hostname, port, timeout)).await {
        Ok(()) => Checked::clean(true),
        Err(err) => {
            let subject = format!("{hostname}:{port}");
            Checked::with_diagnostic(false, note(Check::Tcp, &subject, &err))
        }
    }
}
