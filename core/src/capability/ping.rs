//! Unprivileged reachability through the platform `ping` executable.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hostprobe_common::error::{ProbeError, ResolutionFailure};
use tokio::process::Command;
use tracing::trace;

use super::ReachabilityProber;

// Covers process start-up on top of ping's own wait bound.
const PROCESS_GRACE: Duration = Duration::from_millis(500);

/// Sends one echo request via `ping`. Exit status 0 means an answer arrived.
pub struct SystemPing;

#[async_trait]
impl ReachabilityProber for SystemPing {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<bool, ProbeError> {
        let addr: IpAddr = resolve(host).await?;
        let mut cmd: Command = ping_command(addr, timeout);

        let status = match tokio::time::timeout(timeout + PROCESS_GRACE, cmd.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(ProbeError::Unclassified(format!("failed to run ping: {e}"))),
            Err(_elapsed) => return Ok(false),
        };

        trace!("ping {addr} exited with {status}");
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(ProbeError::Unclassified(format!("ping exited with {status}"))),
        }
    }
}

/// `ping` would resolve the name itself, but then a missing host and a broken
/// helper share one exit code.
async fn resolve(host: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(addr);
    }
    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::Resolution(ResolutionFailure::Other(e.to_string())))?;
    addrs
        .next()
        .map(|sock| sock.ip())
        .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
}

fn ping_command(addr: IpAddr, timeout: Duration) -> Command {
    let mut cmd = Command::new(program(addr));
    cmd.args(wait_args(timeout))
        .arg(addr.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

#[cfg(target_os = "macos")]
fn program(addr: IpAddr) -> &'static str {
    if addr.is_ipv6() { "ping6" } else { "ping" }
}

#[cfg(not(target_os = "macos"))]
fn program(_addr: IpAddr) -> &'static str {
    "ping"
}

#[cfg(target_os = "windows")]
fn wait_args(timeout: Duration) -> Vec<String> {
    vec!["-n".into(), "1".into(), "-w".into(), timeout.as_millis().to_string()]
}

#[cfg(target_os = "macos")]
fn wait_args(timeout: Duration) -> Vec<String> {
    vec!["-c".into(), "1".into(), "-W".into(), timeout.as_millis().to_string()]
}

/// iputils and busybox take whole seconds for `-W`.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn wait_args(timeout: Duration) -> Vec<String> {
    let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
    vec!["-c".into(), "1".into(), "-W".into(), secs.to_string()]
}
