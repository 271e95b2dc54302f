//! Probing and resolution logic for a single host.
//!
//! [`probe::HostProbe`] aggregates the checks for one target. The checks reach
//! the network only through the traits in [`capability`], so every one of them
//! can be driven by test doubles.

pub mod capability;
pub mod checks;
pub mod probe;
pub mod scanner;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use capability::{Capabilities, Dialer, ReachabilityProber, RecordPresence, RecordQuery, Resolver};
pub use probe::HostProbe;
pub use scanner::{ProbeHandle, join_all, probe_many, probe_targets};
