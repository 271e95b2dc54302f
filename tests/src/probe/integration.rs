#![cfg(test)]
use hostprobe_common::config::Config;
use hostprobe_common::error::{ProbeError, ResolutionFailure};
use hostprobe_common::network::target::Target;
use hostprobe_common::probe::{AddressResolution, Check, RecordKind};
use hostprobe_core::capability::TokioDialer;
use hostprobe_core::mock::{MockDialer, MockProber, MockResolver};
use hostprobe_core::{Capabilities, HostProbe, RecordQuery};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

const EPSILON: Duration = Duration::from_millis(500);

fn loopback_caps(resolver: Arc<MockResolver>) -> Capabilities {
    Capabilities::new(resolver, Arc::new(TokioDialer), Arc::new(MockProber::new()))
}

/// Binds and immediately releases a loopback port so nothing listens on it.
async fn closed_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// An open port on loopback answers within the default timeout.
#[tokio::test]
async fn open_loopback_port_is_reachable() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let caps = loopback_caps(Arc::new(MockResolver::new()));
    let mut probe = HostProbe::new(Target::new("127.0.0.1", port), caps, &Config::default());

    let start = Instant::now();
    assert!(probe.probe_tcp().await, "connect to open loopback port failed");
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(probe.result().tcp_reachable, Some(true));
    assert!(probe.diagnostics().is_empty());
    Ok(())
}

#[tokio::test]
async fn nothing_listening_is_unreachable_within_timeout() -> anyhow::Result<()> {
    let port = closed_port().await?;
    let cfg = Config::default();

    let caps = loopback_caps(Arc::new(MockResolver::new()));
    let mut probe = HostProbe::new(Target::new("127.0.0.1", port), caps, &cfg);

    let start = Instant::now();
    assert!(!probe.probe_tcp().await);
    assert!(start.elapsed() < cfg.tcp_timeout + EPSILON);
    assert!(probe.diagnostics().is_empty(), "refusal is an expected failure");
    Ok(())
}

#[tokio::test]
async fn nonexistent_host_fails_every_check() {
    let caps = Capabilities::new(
        Arc::new(MockResolver::new()),
        Arc::new(MockDialer::new().failing(
            "nonexistent.invalid",
            ProbeError::Resolution(ResolutionFailure::NotFound),
        )),
        Arc::new(MockProber::new()),
    );
    let target: Target = "nonexistent.invalid:22".parse().unwrap();
    let mut probe = HostProbe::new(target, caps, &Config::default());

    let result = probe.probe_all().await.clone();

    assert_eq!(
        result.resolved_address,
        Some(AddressResolution::Failed(ResolutionFailure::NotFound))
    );
    assert_eq!(result.tcp_reachable, Some(false));
    assert_eq!(result.icmp_reachable, Some(false));
    assert_eq!(result.record_kind, RecordKind::NotFound);
    assert_eq!(result.reverse_name.as_deref(), Some("nonexistent.invalid"));
    assert!(probe.diagnostics().is_empty());
}

#[tokio::test]
async fn ipv4_literal_without_ptr_reverses_to_itself() {
    let resolver = Arc::new(MockResolver::new());
    let caps = loopback_caps(resolver.clone());
    let mut probe = HostProbe::new(Target::with_default_port("192.0.2.7"), caps, &Config::default());

    assert_eq!(probe.reverse_resolve().await, "192.0.2.7");
    assert_eq!(resolver.reverse_calls(), 1);
}

#[tokio::test]
async fn ipv4_literal_with_ptr_reverses_to_name() {
    let addr = Ipv4Addr::new(192, 0, 2, 8);
    let caps = loopback_caps(Arc::new(MockResolver::new().with_ptr(addr, "host.example.net")));
    let mut probe = HostProbe::new(Target::with_default_port("192.0.2.8"), caps, &Config::default());

    assert_eq!(probe.reverse_resolve().await, "host.example.net");
}

#[tokio::test]
async fn non_dotted_quad_reverses_without_lookup() {
    let resolver = Arc::new(MockResolver::new());
    let caps = loopback_caps(resolver.clone());

    for input in ["example.com", "::1", "10.0.0", "1.2.3.4.5"] {
        let mut probe = HostProbe::new(Target::with_default_port(input), caps.clone(), &Config::default());
        assert_eq!(probe.reverse_resolve().await, input);
    }
    assert_eq!(resolver.reverse_calls(), 0);
}

#[tokio::test]
async fn cname_only_name_skips_a_query() {
    let resolver = Arc::new(MockResolver::new().with_cname("alias.example.com"));
    let caps = loopback_caps(resolver.clone());
    let mut probe = HostProbe::new(
        Target::with_default_port("alias.example.com"),
        caps,
        &Config::default(),
    );

    assert_eq!(probe.classify_record().await, RecordKind::Cname);
    assert_eq!(resolver.record_calls(RecordQuery::Cname), 1);
    assert_eq!(resolver.record_calls(RecordQuery::A), 0);
}

#[tokio::test]
async fn a_record_is_classified_after_cname_miss() {
    let addr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));
    let resolver = Arc::new(MockResolver::new().with_address("www.example.com", addr));
    let caps = loopback_caps(resolver.clone());
    let mut probe = HostProbe::new(
        Target::with_default_port("www.example.com"),
        caps,
        &Config::default(),
    );

    assert_eq!(probe.classify_record().await, RecordKind::A);
    assert_eq!(probe.resolve_address().await.address(), Some(addr));
    assert_eq!(resolver.record_calls(RecordQuery::Cname), 1);
    assert_eq!(resolver.record_calls(RecordQuery::A), 1);
}

/// Re-running every check in an unchanged environment gives the same answer.
#[tokio::test]
async fn repeated_probes_agree() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    let resolver = Arc::new(MockResolver::new());
    let caps = loopback_caps(resolver.clone());
    let mut probe = HostProbe::new(Target::new("127.0.0.1", port), caps, &Config::default());

    let first = probe.probe_all().await.clone();
    let second = probe.probe_all().await.clone();

    assert_eq!(first, second);
    assert_eq!(first.tcp_reachable, Some(true));
    assert_eq!(resolver.reverse_calls(), 2);
    Ok(())
}

#[tokio::test]
async fn unclassified_failure_is_reported_not_fatal() {
    let caps = Capabilities::new(
        Arc::new(MockResolver::new()),
        Arc::new(MockDialer::new().failing("flaky.test", ProbeError::Unclassified("EMFILE".into()))),
        Arc::new(MockProber::new().failing_with(ProbeError::Unclassified("EPERM".into()))),
    );
    let mut probe = HostProbe::new(Target::with_default_port("flaky.test"), caps, &Config::default());

    assert!(!probe.probe_tcp().await);
    assert!(!probe.probe_icmp().await);

    let checks: Vec<Check> = probe.diagnostics().iter().map(|d| d.check).collect();
    assert!(checks.contains(&Check::Tcp));
    assert!(checks.contains(&Check::Icmp));
}

#[tokio::test]
async fn probe_all_runs_checks_concurrently() {
    let delay = Duration::from_millis(300);
    let caps = Capabilities::new(
        Arc::new(MockResolver::new().with_delay(delay)),
        Arc::new(MockDialer::new().with_delay(delay)),
        Arc::new(MockProber::new().with_delay(delay)),
    );
    let mut probe = HostProbe::new(Target::with_default_port("192.0.2.1"), caps, &Config::default());

    let start = Instant::now();
    let result = probe.probe_all().await;
    assert!(result.is_complete());
    // Sequential execution would need at least six delays.
    assert!(start.elapsed() < delay * 3);
}
