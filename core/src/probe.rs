//! # Host Probe
//!
//! Aggregates every check for one [`Target`].
//!
//! Nothing runs on construction. Each check is invoked explicitly and writes
//! only its own field of the [`ProbeResult`], so re-running one check never
//! disturbs another. [`HostProbe::probe_all`] runs the enabled checks
//! concurrently; they share no state and finish in any order.

use std::time::Duration;

use hostprobe_common::config::{CheckSet, Config};
use hostprobe_common::error::ResolutionFailure;
use hostprobe_common::network::target::Target;
use hostprobe_common::probe::{
    AddressResolution, Check, Diagnostic, ProbeResult, RecordKind,
};
use tokio::time::Instant;
use tracing::debug;

use crate::capability::Capabilities;
use crate::checks::{self, Checked};

pub struct HostProbe {
    target: Target,
    result: ProbeResult,
    diagnostics: Vec<Diagnostic>,
    caps: Capabilities,
    tcp_timeout: Duration,
    icmp_timeout: Duration,
    dns_timeout: Duration,
    target_deadline: Option<Duration>,
    checks: CheckSet,
}

impl HostProbe {
    pub fn new(target: Target, caps: Capabilities, cfg: &Config) -> Self {
        Self {
            target,
            result: ProbeResult::new(),
            diagnostics: Vec::new(),
            caps,
            tcp_timeout: cfg.tcp_timeout,
            icmp_timeout: cfg.icmp_timeout,
            dns_timeout: cfg.dns_timeout,
            target_deadline: cfg.target_deadline,
            checks: cfg.checks,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn result(&self) -> &ProbeResult {
        &self.result
    }

    /// Unclassified failures seen by the most recent run of each check.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub async fn resolve_address(&mut self) -> &AddressResolution {
        let checked =
            checks::resolve_address(&*self.caps.resolver, self.target.hostname(), self.dns_timeout)
                .await;
        self.apply_address(checked)
    }

    /// Reverse-resolves the hostname when it is an IPv4 literal.
    pub async fn reverse_resolve(&mut self) -> &str {
        let checked =
            checks::reverse_resolve(&*self.caps.resolver, self.target.hostname(), self.dns_timeout)
                .await;
        self.apply_reverse(checked)
    }

    pub async fn classify_record(&mut self) -> RecordKind {
        let checked =
            checks::classify_record(&*self.caps.resolver, self.target.hostname(), self.dns_timeout)
                .await;
        self.apply_record(checked);
        self.result.record_kind
    }

    pub async fn probe_tcp(&mut self) -> bool {
        let checked = checks::probe_tcp(
            &*self.caps.dialer,
            self.target.hostname(),
            self.target.port(),
            self.tcp_timeout,
        )
        .await;
        self.apply_tcp(checked);
        self.result.tcp_reachable.unwrap_or(false)
    }

    pub async fn probe_icmp(&mut self) -> bool {
        let checked =
            checks::probe_icmp(&*self.caps.prober, self.target.hostname(), self.icmp_timeout)
                .await;
        self.apply_icmp(checked);
        self.result.icmp_reachable.unwrap_or(false)
    }

    /// Runs every enabled check concurrently.
    ///
    /// With a target deadline configured, checks still running when it expires
    /// resolve to their failure value; finished ones keep their result.
    pub async fn probe_all(&mut self) -> &ProbeResult {
        let deadline: Option<Instant> = self.target_deadline.map(|d| Instant::now() + d);
        let hostname: &str = self.target.hostname();
        let port: u16 = self.target.port();
        let caps = &self.caps;
        let enabled = self.checks;

        debug!("probing {}", self.target);

        let (address, reverse, record, tcp, icmp) = tokio::join!(
            run_check(
                enabled.contains(Check::Address),
                deadline,
                Err(ResolutionFailure::Timeout),
                checks::resolve_address(&*caps.resolver, hostname, self.dns_timeout),
            ),
            run_check(
                enabled.contains(Check::Reverse),
                deadline,
                hostname.to_string(),
                checks::reverse_resolve(&*caps.resolver, hostname, self.dns_timeout),
            ),
            run_check(
                enabled.contains(Check::Record),
                deadline,
                RecordKind::NotFound,
                checks::classify_record(&*caps.resolver, hostname, self.dns_timeout),
            ),
            run_check(
                enabled.contains(Check::Tcp),
                deadline,
                false,
                checks::probe_tcp(&*caps.dialer, hostname, port, self.tcp_timeout),
            ),
            run_check(
                enabled.contains(Check::Icmp),
                deadline,
                false,
                checks::probe_icmp(&*caps.prober, hostname, self.icmp_timeout),
            ),
        );

        if let Some(checked) = address {
            self.apply_address(checked);
        }
        if let Some(checked) = reverse {
            self.apply_reverse(checked);
        }
        if let Some(checked) = record {
            self.apply_record(checked);
        }
        if let Some(checked) = tcp {
            self.apply_tcp(checked);
        }
        if let Some(checked) = icmp {
            self.apply_icmp(checked);
        }

        &self.result
    }

    fn apply_address(
        &mut self,
        checked: Checked<Result<std::net::IpAddr, ResolutionFailure>>,
    ) -> &AddressResolution {
        self.replace_diagnostic(Check::Address, checked.diagnostic);
        self.result
            .resolved_address
            .insert(AddressResolution::from(checked.value))
    }

    fn apply_reverse(&mut self, checked: Checked<String>) -> &str {
        self.replace_diagnostic(Check::Reverse, checked.diagnostic);
        self.result.reverse_name.insert(checked.value)
    }

    fn apply_record(&mut self, checked: Checked<RecordKind>) {
        self.result.record_kind = checked.value;
        self.replace_diagnostic(Check::Record, checked.diagnostic);
    }

    fn apply_tcp(&mut self, checked: Checked<bool>) {
        self.result.tcp_reachable = Some(checked.value);
        self.replace_diagnostic(Check::Tcp, checked.diagnostic);
    }

    fn apply_icmp(&mut self, checked: Checked<bool>) {
        self.result.icmp_reachable = Some(checked.value);
        self.replace_diagnostic(Check::Icmp, checked.diagnostic);
    }

    fn replace_diagnostic(&mut self, check: Check, diagnostic: Option<Diagnostic>) {
        self.diagnostics.retain(|d| d.check != check);
        self.diagnostics.extend(diagnostic);
    }
}

/// Skips disabled checks and bounds the rest by the optional target deadline.
async fn run_check<T, F>(
    enabled: bool,
    deadline: Option<Instant>,
    on_expiry: T,
    check: F,
) -> Option<Checked<T>>
where
    F: Future<Output = Checked<T>>,
{
    if !enabled {
        return None;
    }
    let Some(deadline) = deadline else {
        return Some(check.await);
    };
    match tokio::time::timeout_at(deadline, check).await {
        Ok(checked) => Some(checked),
        Err(_elapsed) => Some(Checked::clean(on_expiry)),
    }
}
