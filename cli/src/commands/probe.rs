use std::time::{Duration, Instant};

use colored::*;
use hostprobe_common::config::Config;
use hostprobe_common::network::target::Target;
use hostprobe_core::{Capabilities, HostProbe, scanner};
use tracing::{Instrument, info_span};

use crate::terminal::{colors, format, print};

pub async fn probe(raw_targets: &[String], default_port: u16, cfg: &Config) -> anyhow::Result<()> {
    let targets: Vec<Target> = parse_targets(raw_targets, default_port)?;

    let caps: Capabilities = Capabilities::from_config(cfg);
    let start_time: Instant = Instant::now();
    let probes: Vec<Option<HostProbe>> = scanner::probe_targets(targets.clone(), &caps, cfg)
        .instrument(info_span!("run"))
        .await;

    probing_ends(&targets, &probes, start_time.elapsed());
    Ok(())
}

/// Command-line targets with surrounding whitespace stripped.
fn parse_targets(raw_targets: &[String], default_port: u16) -> anyhow::Result<Vec<Target>> {
    raw_targets
        .iter()
        .map(|s| Target::parse_with_default_port(s.trim(), default_port))
        .collect::<Result<_, _>>()
        .map_err(|e| anyhow::anyhow!(e))
}

fn probing_ends(targets: &[Target], probes: &[Option<HostProbe>], total_time: Duration) {
    if probes.iter().all(Option::is_none) {
        print::no_results();
        return;
    }

    print::header("probe results");
    for (idx, (target, probe)) in targets.iter().zip(probes).enumerate() {
        match probe {
            Some(probe) => print_probe_tree(probe, idx),
            None => print_missing(target, idx),
        }
        if idx + 1 != probes.len() {
            print::print("");
        }
    }
    print_summary(probes, total_time);
}

fn print_probe_tree(probe: &HostProbe, idx: usize) {
    let target = probe.target();
    print::tree_head(idx, &target.to_string());
    let details = format::result_to_details(probe.result(), target.port(), probe.diagnostics());
    print::as_tree_one_level(details);
}

fn print_missing(target: &Target, idx: usize) {
    print::tree_head(idx, &target.to_string());
    print::as_tree_one_level(vec![(
        "Status".to_string(),
        "did not finish".color(colors::UNKNOWN),
    )]);
}

fn print_summary(probes: &[Option<HostProbe>], total_time: Duration) {
    let up: usize = probes
        .iter()
        .flatten()
        .filter(|p| format::is_up(p.result()))
        .count();
    let plain: String = format!(
        "Probe Complete: {up}/{} hosts up in {:.2}s",
        probes.len(),
        total_time.as_secs_f64()
    );

    let up_hosts: ColoredString = format!("{up}/{}", probes.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Probe Complete: {up_hosts} hosts up in {total_time}").color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string(), plain.chars().count());
}
