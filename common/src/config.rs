use std::net::IpAddr;
use std::time::Duration;

use crate::probe::Check;

pub const DEFAULT_TCP_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_ICMP_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Which mechanism answers the ICMP-style reachability check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IcmpMode {
    /// Raw ICMP echo when running as root, the system `ping` otherwise.
    #[default]
    Auto,
    System,
    Raw,
}

/// The set of checks a full probe runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSet {
    pub address: bool,
    pub reverse: bool,
    pub record: bool,
    pub tcp: bool,
    pub icmp: bool,
}

impl CheckSet {
    pub fn all() -> Self {
        Self {
            address: true,
            reverse: true,
            record: true,
            tcp: true,
            icmp: true,
        }
    }

    pub fn without(mut self, check: Check) -> Self {
        match check {
            Check::Address => self.address = false,
            Check::Reverse => self.reverse = false,
            Check::Record => self.record = false,
            Check::Tcp => self.tcp = false,
            Check::Icmp => self.icmp = false,
        }
        self
    }

    pub fn contains(&self, check: Check) -> bool {
        match check {
            Check::Address => self.address,
            Check::Reverse => self.reverse,
            Check::Record => self.record,
            Check::Tcp => self.tcp,
            Check::Icmp => self.icmp,
        }
    }
}

impl Default for CheckSet {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Wall-clock bound around a whole TCP connect attempt.
    pub tcp_timeout: Duration,
    /// Wait bound handed to the reachability prober.
    pub icmp_timeout: Duration,
    /// Wall-clock bound around each DNS query.
    pub dns_timeout: Duration,
    /// Optional overall bound for every check of one target.
    ///
    /// Checks still running when it expires resolve to their failure value.
    pub target_deadline: Option<Duration>,
    /// Query this nameserver instead of the system configuration.
    pub nameserver: Option<IpAddr>,
    pub icmp_mode: IcmpMode,
    pub checks: CheckSet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_timeout: DEFAULT_TCP_TIMEOUT,
            icmp_timeout: DEFAULT_ICMP_TIMEOUT,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
            target_deadline: None,
            nameserver: None,
            icmp_mode: IcmpMode::Auto,
            checks: CheckSet::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.tcp_timeout, Duration::from_secs(1));
        assert_eq!(cfg.icmp_timeout, Duration::from_secs(1));
        assert_eq!(cfg.target_deadline, None);
        assert_eq!(cfg.icmp_mode, IcmpMode::Auto);
        assert_eq!(cfg.checks, CheckSet::all());
    }

    #[test]
    fn test_check_set_without() {
        let set = CheckSet::all().without(Check::Icmp).without(Check::Reverse);
        assert!(!set.contains(Check::Icmp));
        assert!(!set.contains(Check::Reverse));
        assert!(set.contains(Check::Address));
        assert!(set.contains(Check::Record));
        assert!(set.contains(Check::Tcp));
    }
}
