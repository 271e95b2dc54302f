//! Concurrent probing of many targets.
//!
//! Every target runs on its own tokio task with its own [`HostProbe`], so
//! targets share nothing but the (read-only) capabilities. Each task can be
//! cancelled through its [`ProbeHandle`] without disturbing the others.

use hostprobe_common::config::Config;
use hostprobe_common::network::target::Target;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info_span, warn};

use crate::capability::Capabilities;
use crate::probe::HostProbe;

pub struct ProbeHandle {
    target: Target,
    task: JoinHandle<HostProbe>,
}

impl ProbeHandle {
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Aborts this target's checks. Other targets keep running.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the probe. `None` when it was cancelled or panicked.
    pub async fn join(self) -> Option<HostProbe> {
        match self.task.await {
            Ok(probe) => Some(probe),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                error!("probe task for {} failed: {e}", self.target);
                None
            }
        }
    }
}

/// Starts a full probe of every target and returns immediately.
pub fn probe_many<I>(targets: I, caps: &Capabilities, cfg: &Config) -> Vec<ProbeHandle>
where
    I: IntoIterator<Item = Target>,
{
    targets
        .into_iter()
        .map(|target| {
            let mut probe = HostProbe::new(target.clone(), caps.clone(), cfg);
            let span = info_span!("probe", target = %target);
            let task = tokio::spawn(
                async move {
                    probe.probe_all().await;
                    probe
                }
                .instrument(span),
            );
            ProbeHandle { target, task }
        })
        .collect()
}

/// Probes every target concurrently and waits for all of them.
///
/// See [`join_all`] for the shape of the output.
pub async fn probe_targets<I>(
    targets: I,
    caps: &Capabilities,
    cfg: &Config,
) -> Vec<Option<HostProbe>>
where
    I: IntoIterator<Item = Target>,
{
    join_all(probe_many(targets, caps, cfg)).await
}

/// Waits for every handle in turn.
///
/// The output lines up index for index with `handles`; a target whose task was
/// cancelled or panicked is `None`.
pub async fn join_all(handles: Vec<ProbeHandle>) -> Vec<Option<HostProbe>> {
    let mut probes = Vec::with_capacity(handles.len());
    for handle in handles {
        let target = handle.target().clone();
        let probe = handle.join().await;
        if probe.is_none() {
            warn!("no result for {target}: probe did not finish");
        }
        probes.push(probe);
    }
    probes
}
