//! Failure taxonomy shared by every check.
//!
//! All variants except [`ProbeError::Unclassified`] are expected outcomes of
//! probing a host that is down, missing or filtered. They collapse into the
//! check's terminal value. `Unclassified` collapses too, but is reported on the
//! diagnostic channel because it means the probe mechanism itself misbehaved.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("resolution failed: {0}")]
    Resolution(ResolutionFailure),

    #[error("connection refused")]
    ConnectionRefused,

    #[error("host unreachable")]
    HostUnreachable,

    #[error("timed out")]
    Timeout,

    #[error("unclassified transport error: {0}")]
    Unclassified(String),
}

impl ProbeError {
    /// `true` for the outcomes a healthy probe mechanism is expected to produce.
    pub fn is_expected(&self) -> bool {
        !matches!(self, ProbeError::Unclassified(_))
    }
}

impl From<ResolutionFailure> for ProbeError {
    fn from(failure: ResolutionFailure) -> Self {
        ProbeError::Resolution(failure)
    }
}

/// Why a forward lookup produced no address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// NXDOMAIN or an empty answer.
    #[error("host not found")]
    NotFound,

    #[error("lookup timed out")]
    Timeout,

    /// The name could not be turned into a DNS query.
    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("{0}")]
    Other(String),
}
