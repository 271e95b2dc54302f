pub mod probe;

use std::net::IpAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use hostprobe_common::config::{CheckSet, Config, IcmpMode};
use hostprobe_common::network::target::DEFAULT_PORT;
use hostprobe_common::probe::Check;

#[derive(Parser)]
#[command(name = "hostprobe")]
#[command(about = "Checks DNS, TCP and ICMP reachability of one or more hosts.")]
pub struct CommandLine {
    /// Hosts to probe: `host`, `host:port` or `[v6]:port`
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Port for targets that do not name one
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Bound for the TCP connect and the ICMP probe, in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Bound for each DNS query, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub dns_timeout_ms: u64,

    /// Overall bound for all checks of one target, in milliseconds
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Query this nameserver instead of the system resolver
    #[arg(long)]
    pub nameserver: Option<IpAddr>,

    /// Echo mechanism for the ICMP check
    #[arg(long, value_enum, default_value_t = IcmpArg::Auto)]
    pub icmp: IcmpArg,

    /// Checks to leave out (repeatable or comma-separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub skip: Vec<CheckArg>,

    /// Raise log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IcmpArg {
    Auto,
    System,
    Raw,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CheckArg {
    Address,
    Reverse,
    Record,
    Tcp,
    Icmp,
}

impl From<IcmpArg> for IcmpMode {
    fn from(arg: IcmpArg) -> Self {
        match arg {
            IcmpArg::Auto => IcmpMode::Auto,
            IcmpArg::System => IcmpMode::System,
            IcmpArg::Raw => IcmpMode::Raw,
        }
    }
}

impl From<CheckArg> for Check {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::Address => Check::Address,
            CheckArg::Reverse => Check::Reverse,
            CheckArg::Record => Check::Record,
            CheckArg::Tcp => Check::Tcp,
            CheckArg::Icmp => Check::Icmp,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn to_config(&self) -> Config {
        let timeout = Duration::from_millis(self.timeout_ms);
        let checks = self
            .skip
            .iter()
            .fold(CheckSet::all(), |set, &check| set.without(check.into()));

        Config {
            tcp_timeout: timeout,
            icmp_timeout: timeout,
            dns_timeout: Duration::from_millis(self.dns_timeout_ms),
            target_deadline: self.deadline_ms.map(Duration::from_millis),
            nameserver: self.nameserver,
            icmp_mode: self.icmp.into(),
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_default_config() {
        let cli = CommandLine::try_parse_from(["hostprobe", "example.com"]).unwrap();
        let cfg = cli.to_config();
        let default = Config::default();

        assert_eq!(cli.port, DEFAULT_PORT);
        assert_eq!(cfg.tcp_timeout, default.tcp_timeout);
        assert_eq!(cfg.icmp_timeout, default.icmp_timeout);
        assert_eq!(cfg.dns_timeout, default.dns_timeout);
        assert_eq!(cfg.target_deadline, None);
        assert_eq!(cfg.icmp_mode, IcmpMode::Auto);
        assert_eq!(cfg.checks, CheckSet::all());
    }

    #[test]
    fn test_skip_and_overrides() {
        let cli = CommandLine::try_parse_from([
            "hostprobe",
            "-t",
            "250",
            "--deadline-ms",
            "2000",
            "--skip",
            "icmp,reverse",
            "--icmp",
            "system",
            "--nameserver",
            "9.9.9.9",
            "a.test",
            "b.test:443",
        ])
        .unwrap();
        let cfg = cli.to_config();

        assert_eq!(cli.targets, ["a.test", "b.test:443"]);
        assert_eq!(cfg.tcp_timeout, Duration::from_millis(250));
        assert_eq!(cfg.target_deadline, Some(Duration::from_secs(2)));
        assert!(!cfg.checks.contains(Check::Icmp));
        assert!(!cfg.checks.contains(Check::Reverse));
        assert!(cfg.checks.contains(Check::Tcp));
        assert_eq!(cfg.icmp_mode, IcmpMode::System);
        assert_eq!(cfg.nameserver, Some("9.9.9.9".parse().unwrap()));
    }

    #[test]
    fn test_targets_are_required() {
        assert!(CommandLine::try_parse_from(["hostprobe"]).is_err());
    }
}
