use std::net::IpAddr;

use colored::*;
use hostprobe_common::probe::{AddressResolution, Diagnostic, ProbeResult, RecordKind};

use crate::terminal::colors;

type Detail = (String, ColoredString);

pub fn result_to_details(result: &ProbeResult, port: u16, diagnostics: &[Diagnostic]) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(resolution) = &result.resolved_address {
        details.push(address_to_detail(resolution));
    }
    if let Some(name) = &result.reverse_name {
        details.push(("Reverse".to_string(), name.color(colors::TEXT_DEFAULT)));
    }
    if result.record_kind != RecordKind::Unknown {
        details.push(record_to_detail(result.record_kind));
    }
    if let Some(reachable) = result.tcp_reachable {
        details.push((format!("TCP/{port}"), reachability(reachable, "open", "closed")));
    }
    if let Some(reachable) = result.icmp_reachable {
        details.push(("ICMP".to_string(), reachability(reachable, "answered", "silent")));
    }
    for diagnostic in diagnostics {
        details.push(("Warning".to_string(), diagnostic.to_string().color(colors::UNKNOWN)));
    }

    details
}

fn address_to_detail(resolution: &AddressResolution) -> Detail {
    match resolution {
        AddressResolution::Resolved(ip @ IpAddr::V4(_)) => {
            ("IPv4".to_string(), ip.to_string().color(colors::IPV4_ADDR))
        }
        AddressResolution::Resolved(ip @ IpAddr::V6(_)) => {
            ("IPv6".to_string(), ip.to_string().color(colors::IPV6_ADDR))
        }
        AddressResolution::Failed(failure) => {
            ("Address".to_string(), failure.to_string().color(colors::DOWN))
        }
    }
}

fn record_to_detail(kind: RecordKind) -> Detail {
    let value = match kind {
        RecordKind::NotFound => kind.to_string().color(colors::DOWN),
        RecordKind::Unknown => kind.to_string().color(colors::UNKNOWN),
        _ => kind.to_string().color(colors::PRIMARY),
    };
    ("Record".to_string(), value)
}

fn reachability(reachable: bool, up: &str, down: &str) -> ColoredString {
    if reachable {
        up.color(colors::UP).bold()
    } else {
        down.color(colors::DOWN)
    }
}

pub fn is_up(result: &ProbeResult) -> bool {
    result.tcp_reachable == Some(true) || result.icmp_reachable == Some(true)
}
