#![cfg(test)]
use hostprobe_common::config::Config;
use hostprobe_common::network::target::Target;
use hostprobe_core::mock::{MockDialer, MockProber, MockResolver};
use hostprobe_core::{Capabilities, probe_many, probe_targets};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn targets(names: &[&str]) -> Vec<Target> {
    names.iter().map(|n| Target::with_default_port(*n)).collect()
}

#[tokio::test]
async fn results_follow_input_order() {
    let caps = Capabilities::new(
        Arc::new(MockResolver::new()),
        Arc::new(MockDialer::new().with_open("b.test", 22)),
        Arc::new(MockProber::new().with_reachable("c.test")),
    );

    let probes: Vec<_> = probe_targets(targets(&["a.test", "b.test", "c.test"]), &caps, &Config::default())
        .await
        .into_iter()
        .flatten()
        .collect();
    let names: Vec<&str> = probes.iter().map(|p| p.target().hostname()).collect();

    assert_eq!(names, ["a.test", "b.test", "c.test"]);
    assert_eq!(probes[0].result().tcp_reachable, Some(false));
    assert_eq!(probes[1].result().tcp_reachable, Some(true));
    assert_eq!(probes[2].result().icmp_reachable, Some(true));
}

/// Cancelling one target leaves the others to finish on their own deadline.
#[tokio::test]
async fn cancelled_target_does_not_affect_others() {
    let slow = Duration::from_secs(5);
    let caps = Capabilities::new(
        Arc::new(MockResolver::new().with_delay(slow)),
        Arc::new(MockDialer::new().with_delay(slow)),
        Arc::new(MockProber::new().with_delay(slow)),
    );
    let cfg = Config {
        target_deadline: Some(Duration::from_millis(300)),
        ..Config::default()
    };

    let start = Instant::now();
    let mut handles = probe_many(targets(&["cancelled.test", "kept.test"]), &caps, &cfg);
    let kept = handles.pop().unwrap();
    let cancelled = handles.pop().unwrap();
    cancelled.cancel();

    assert!(cancelled.join().await.is_none());

    let probe = kept.join().await.expect("kept probe should finish");
    assert_eq!(probe.target().hostname(), "kept.test");
    assert_eq!(probe.result().tcp_reachable, Some(false));
    assert_eq!(probe.result().icmp_reachable, Some(false));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn targets_run_in_parallel() {
    let delay = Duration::from_millis(400);
    let caps = Capabilities::new(
        Arc::new(MockResolver::new()),
        Arc::new(MockDialer::new().with_delay(delay)),
        Arc::new(MockProber::new()),
    );
    let names: Vec<String> = (0..8).map(|i| format!("host{i}.test")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let start = Instant::now();
    let probes = probe_targets(targets(&refs), &caps, &Config::default()).await;

    assert_eq!(probes.len(), 8);
    assert!(probes.iter().all(Option::is_some));
    assert!(start.elapsed() < delay * 3);
}
