//! Capability boundaries between the checks and the host's network stack.
//!
//! Each check consumes exactly one of these traits. Production implementations
//! live in the submodules; tests substitute their own.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hostprobe_common::config::{Config, IcmpMode};
use hostprobe_common::error::ProbeError;
use tracing::debug;

pub mod dialer;
pub mod icmp;
pub mod ping;
pub mod resolver;

pub use dialer::TokioDialer;
pub use icmp::RawIcmpProber;
pub use ping::SystemPing;
pub use resolver::HickoryResolver;

/// Record types the classifier asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordQuery {
    A,
    Cname,
}

impl fmt::Display for RecordQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordQuery::A => write!(f, "A"),
            RecordQuery::Cname => write!(f, "CNAME"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPresence {
    Present,
    Absent,
}

/// Forward, record and reverse DNS lookups.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Returns the first address `name` resolves to.
    async fn lookup_address(&self, name: &str) -> Result<IpAddr, ProbeError>;

    /// Reports whether `name` owns a record of the given type.
    ///
    /// A missing name or an empty answer is `Ok(Absent)`, not an error.
    async fn lookup_record(&self, name: &str, query: RecordQuery)
    -> Result<RecordPresence, ProbeError>;

    /// Returns the PTR name of `addr`.
    async fn reverse_lookup(&self, addr: Ipv4Addr) -> Result<String, ProbeError>;
}

/// Opens (and immediately closes) TCP connections.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// `Ok(())` only when the handshake completed.
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError>;
}

/// Answers "does this host respond to an echo request".
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    /// One probe round. `Ok(false)` means no answer arrived in time.
    async fn probe(&self, host: &str, timeout: Duration) -> Result<bool, ProbeError>;
}

/// The three capabilities a [`HostProbe`](crate::HostProbe) runs on.
///
/// Cloning is cheap; every target of a multi-target run shares one set.
#[derive(Clone)]
pub struct Capabilities {
    pub resolver: Arc<dyn Resolver>,
    pub dialer: Arc<dyn Dialer>,
    pub prober: Arc<dyn ReachabilityProber>,
}

impl Capabilities {
    pub fn new(
        resolver: Arc<dyn Resolver>,
        dialer: Arc<dyn Dialer>,
        prober: Arc<dyn ReachabilityProber>,
    ) -> Self {
        Self {
            resolver,
            dialer,
            prober,
        }
    }

    /// Builds the production set described by `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            resolver: Arc::new(HickoryResolver::from_config(cfg)),
            dialer: Arc::new(TokioDialer),
            prober: reachability_prober(cfg.icmp_mode),
        }
    }
}

/// Picks the echo mechanism for `mode`.
pub fn reachability_prober(mode: IcmpMode) -> Arc<dyn ReachabilityProber> {
    match mode {
        IcmpMode::System => Arc::new(SystemPing),
        IcmpMode::Raw => Arc::new(RawIcmpProber),
        IcmpMode::Auto => {
            if is_root::is_root() {
                debug!("running as root, using raw ICMP echo");
                Arc::new(RawIcmpProber)
            } else {
                debug!("unprivileged, falling back to system ping");
                Arc::new(SystemPing)
            }
        }
    }
}
