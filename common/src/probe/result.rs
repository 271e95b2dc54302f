use std::fmt;
use std::net::IpAddr;

use crate::error::ResolutionFailure;

/// DNS answer category of a name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The classification has not run yet.
    #[default]
    Unknown,
    A,
    Cname,
    /// Neither a CNAME nor an A record exists. This is a result, not missing data.
    NotFound,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Unknown => write!(f, "unknown"),
            RecordKind::A => write!(f, "A"),
            RecordKind::Cname => write!(f, "CNAME"),
            RecordKind::NotFound => write!(f, "not found"),
        }
    }
}

/// Terminal value of a forward lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressResolution {
    Resolved(IpAddr),
    Failed(ResolutionFailure),
}

impl AddressResolution {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            AddressResolution::Resolved(ip) => Some(*ip),
            AddressResolution::Failed(_) => None,
        }
    }
}

impl From<Result<IpAddr, ResolutionFailure>> for AddressResolution {
    fn from(res: Result<IpAddr, ResolutionFailure>) -> Self {
        match res {
            Ok(ip) => AddressResolution::Resolved(ip),
            Err(failure) => AddressResolution::Failed(failure),
        }
    }
}

/// The individual checks a probe can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Address,
    Reverse,
    Record,
    Tcp,
    Icmp,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Address => write!(f, "address"),
            Check::Reverse => write!(f, "reverse"),
            Check::Record => write!(f, "record"),
            Check::Tcp => write!(f, "tcp"),
            Check::Icmp => write!(f, "icmp"),
        }
    }
}

/// An unclassified failure that was collapsed into a check's safe default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub check: Check,
    pub message: String,
}

impl Diagnostic {
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.check, self.message)
    }
}

/// Last known result of each check for one target.
///
/// `None` (or [`RecordKind::Unknown`]) means the check never ran. Each field is
/// only ever written by its own check.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub resolved_address: Option<AddressResolution>,
    pub reverse_name: Option<String>,
    pub record_kind: RecordKind,
    pub tcp_reachable: Option<bool>,
    pub icmp_reachable: Option<bool>,
}

impl ProbeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once every check has produced a terminal value.
    pub fn is_complete(&self) -> bool {
        self.resolved_address.is_some()
            && self.reverse_name.is_some()
            && self.record_kind != RecordKind::Unknown
            && self.tcp_reachable.is_some()
            && self.icmp_reachable.is_some()
    }
}
