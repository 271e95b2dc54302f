pub mod result;

pub use result::{AddressResolution, Check, Diagnostic, ProbeResult, RecordKind};
