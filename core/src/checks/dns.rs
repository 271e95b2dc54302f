use std::net::IpAddr;
use std::time::Duration;

use hostprobe_common::error::{ProbeError, ResolutionFailure};
use hostprobe_common::probe::{Check, RecordKind};
use hostprobe_common::utils::ip;

use super::{Checked, bounded, note};
use crate::capability::{RecordPresence, RecordQuery, Resolver};

/// Forward lookup of `hostname`. One resolver round trip, no retries.
pub async fn resolve_address(
    resolver: &dyn Resolver,
    hostname: &str,
    timeout: Duration,
) -> Checked<Result<IpAddr, ResolutionFailure>> {
    match bounded(timeout, resolver.lookup_address(hostname)).await {
        Ok(addr) => Checked::clean(Ok(addr)),
        Err(err) => {
            let diagnostic = note(Check::Address, hostname, &err);
            Checked::with_diagnostic(Err(resolution_failure(err)), diagnostic)
        }
    }
}

/// Reverse lookup of an IPv4 literal.
///
/// Anything that is not a dotted quad is returned unchanged without touching
/// the resolver, as is the input when the lookup fails.
pub async fn reverse_resolve(
    resolver: &dyn Resolver,
    address: &str,
    timeout: Duration,
) -> Checked<String> {
    let Some(v4) = ip::as_dotted_quad(address) else {
        return Checked::clean(address.to_string());
    };

    match bounded(timeout, resolver.reverse_lookup(v4)).await {
        Ok(name) => Checked::clean(name),
        Err(err) => {
            let diagnostic = note(Check::Reverse, address, &err);
            Checked::with_diagnostic(address.to_string(), diagnostic)
        }
    }
}

/// Classifies `hostname` as CNAME, A or NotFound.
///
/// The CNAME query goes first and a hit stops there; the A query is only
/// issued when no CNAME exists. Chains are not followed.
pub async fn classify_record(
    resolver: &dyn Resolver,
    hostname: &str,
    timeout: Duration,
) -> Checked<RecordKind> {
    let mut diagnostic = None;

    match bounded(timeout, resolver.lookup_record(hostname, RecordQuery::Cname)).await {
        Ok(RecordPresence::Present) => return Checked::clean(RecordKind::Cname),
        Ok(RecordPresence::Absent) => {}
        Err(err) => diagnostic = note(Check::Record, hostname, &err),
    }

    let kind = match bounded(timeout, resolver.lookup_record(hostname, RecordQuery::A)).await {
        Ok(RecordPresence::Present) => RecordKind::A,
        Ok(RecordPresence::Absent) => RecordKind::NotFound,
        Err(err) => {
            diagnostic = diagnostic.or(note(Check::Record, hostname, &err));
            RecordKind::NotFound
        }
    };

    Checked::with_diagnostic(kind, diagnostic)
}

fn resolution_failure(err: ProbeError) -> ResolutionFailure {
    match err {
        ProbeError::Resolution(failure) => failure,
        ProbeError::Timeout => ResolutionFailure::Timeout,
        other => ResolutionFailure::Other(other.to_string()),
    }
}
