//! # Probe Target Model
//!
//! A target is the `(hostname, port)` pair a probe runs against.
//!
//! The hostname is kept exactly as the caller wrote it. It is not normalized
//! or validated here; the resolver is the only judge of whether it names a host.
//!
//! Accepted textual forms:
//! * `host` (port defaults to [`DEFAULT_PORT`])
//! * `host:port`
//! * `[ipv6]:port`
//! * a bare IPv6 literal such as `::1`

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// Port used by the TCP check when the caller does not name one (SSH).
pub const DEFAULT_PORT: u16 = 22;

/// The identity of a probed host. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    hostname: String,
    port: u16,
}

impl Target {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    pub fn with_default_port(hostname: impl Into<String>) -> Self {
        Self::new(hostname, DEFAULT_PORT)
    }

    /// Parses `s`, falling back to `default_port` when no port is written.
    ///
    /// `s` is taken verbatim; surrounding whitespace is the caller's to strip.
    pub fn parse_with_default_port(s: &str, default_port: u16) -> Result<Self, String> {
        if s.is_empty() {
            return Err("target cannot be empty".to_string());
        }

        if let Some(target) = parse_bracketed(s)? {
            return Ok(target);
        }

        if s.parse::<Ipv6Addr>().is_ok() {
            return Ok(Self::new(s, default_port));
        }

        match s.rsplit_once(':') {
            Some((host, port_str)) => {
                if host.is_empty() {
                    return Err(format!("missing hostname in '{s}'"));
                }
                let port = parse_port(port_str)?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(s, default_port)),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default_port(s, DEFAULT_PORT)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hostname.contains(':') {
            write!(f, "[{}]:{}", self.hostname, self.port)
        } else {
            write!(f, "{}:{}", self.hostname, self.port)
        }
    }
}

/// Parses the `[v6]:port` form. Returns `Ok(None)` when `s` is not bracketed.
fn parse_bracketed(s: &str) -> Result<Option<Target>, String> {
    let Some(rest) = s.strip_prefix('[') else {
        return Ok(None);
    };

    let (host, tail) = rest
        .split_once(']')
        .ok_or_else(|| format!("unterminated '[' in '{s}'"))?;

    if host.is_empty() {
        return Err(format!("missing hostname in '{s}'"));
    }

    let port_str = tail
        .strip_prefix(':')
        .ok_or_else(|| format!("expected ':port' after ']' in '{s}'"))?;

    Ok(Some(Target::new(host, parse_port(port_str)?)))
}

fn parse_port(port_str: &str) -> Result<u16, String> {
    port_str
        .parse::<u16>()
        .map_err(|e| format!("invalid port '{port_str}': {e}"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
