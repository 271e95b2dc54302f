//! [`Resolver`] backed by `hickory-resolver`.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    ResolveError, TokioResolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::op::ResponseCode,
    proto::rr::{Name, RecordType},
    proto::{ProtoError, ProtoErrorKind},
};
use hostprobe_common::config::Config;
use hostprobe_common::error::{ProbeError, ResolutionFailure};
use hostprobe_common::utils::ip;
use tracing::warn;

use super::{RecordPresence, RecordQuery, Resolver};

const DNS_PORT: u16 = 53;

// hickory's own timer must lose the race against ours so expiry always
// surfaces as `Timeout`.
const INNER_TIMEOUT_GRACE: Duration = Duration::from_secs(1);

pub struct HickoryResolver {
    inner: TokioResolver,
    timeout: Duration,
}

impl HickoryResolver {
    pub fn from_config(cfg: &Config) -> Self {
        let inner = match cfg.nameserver {
            Some(ns_ip) => build_for_nameserver(ns_ip, cfg.dns_timeout),
            None => build_system(cfg.dns_timeout),
        };
        Self {
            inner,
            timeout: cfg.dns_timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, ProbeError>
    where
        F: Future<Output = Result<T, ResolveError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(|e| classify_resolve_error(&e)),
            Err(_elapsed) => Err(ProbeError::Resolution(ResolutionFailure::Timeout)),
        }
    }
}

#[async_trait]
impl Resolver for HickoryResolver {
    async fn lookup_address(&self, name: &str) -> Result<IpAddr, ProbeError> {
        if let Ok(addr) = name.parse::<IpAddr>() {
            return Ok(addr);
        }
        validate_name(name)?;

        let response = self.bounded(self.inner.lookup_ip(name)).await?;
        response
            .iter()
            .next()
            .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
    }

    async fn lookup_record(
        &self,
        name: &str,
        query: RecordQuery,
    ) -> Result<RecordPresence, ProbeError> {
        validate_name(name)?;
        let record_type = match query {
            RecordQuery::A => RecordType::A,
            RecordQuery::Cname => RecordType::CNAME,
        };

        match self.bounded(self.inner.lookup(name, record_type)).await {
            Ok(response) => Ok(presence(
                response.record_iter().map(|record| record.record_type()),
                record_type,
            )),
            Err(e) => absent_when_not_found(e),
        }
    }

    async fn reverse_lookup(&self, addr: Ipv4Addr) -> Result<String, ProbeError> {
        let ptr_name = Name::from(IpAddr::V4(addr));
        let response = self.bounded(self.inner.lookup(ptr_name, RecordType::PTR)).await?;

        response
            .record_iter()
            .find_map(|record| record.data().as_ptr())
            .map(|ptr| ip::trim_root_dot(&ptr.0.to_string()).to_string())
            .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
    }
}

fn validate_name(name: &str) -> Result<(), ProbeError> {
    if name.is_empty() {
        return Err(ResolutionFailure::InvalidName(name.to_string()).into());
    }
    Name::from_str(name)
        .map(|_| ())
        .map_err(|_| ResolutionFailure::InvalidName(name.to_string()).into())
}

/// Only NXDOMAIN and an empty NOERROR answer mean the name has nothing.
///
/// hickory also reports SERVFAIL, REFUSED and friends as "no records found";
/// those say the nameserver is broken, not that the host is missing.
fn classify_resolve_error(err: &ResolveError) -> ProbeError {
    match err.proto().map(ProtoError::kind) {
        Some(ProtoErrorKind::NoRecordsFound { response_code, .. }) => match response_code {
            ResponseCode::NXDomain | ResponseCode::NoError => {
                ProbeError::Resolution(ResolutionFailure::NotFound)
            }
            code => ProbeError::Unclassified(format!("nameserver answered {code}")),
        },
        _ => ProbeError::Unclassified(err.to_string()),
    }
}

/// An answer counts only when it holds a record of the asked-for type; a
/// CNAME chain in an A answer does not make the name an A record.
fn presence<I>(answered: I, wanted: RecordType) -> RecordPresence
where
    I: IntoIterator<Item = RecordType>,
{
    if answered.into_iter().any(|record_type| record_type == wanted) {
        RecordPresence::Present
    } else {
        RecordPresence::Absent
    }
}

fn absent_when_not_found(err: ProbeError) -> Result<RecordPresence, ProbeError> {
    match err {
        ProbeError::Resolution(ResolutionFailure::NotFound) => Ok(RecordPresence::Absent),
        other => Err(other),
    }
}

/// No retries and no answer cache: every check is exactly one round trip.
fn probe_options(timeout: Duration) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = timeout + INNER_TIMEOUT_GRACE;
    opts.attempts = 1;
    opts.cache_size = 0;
    opts
}

fn build_for_nameserver(ns_ip: IpAddr, timeout: Duration) -> TokioResolver {
    let config = ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from_ips_clear(&[ns_ip], DNS_PORT, true),
    );
    TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
        .with_options(probe_options(timeout))
        .build()
}

/// Uses the host configuration (e.g. `/etc/resolv.conf`), falling back to
/// hickory's defaults when it cannot be read.
fn build_system(timeout: Duration) -> TokioResolver {
    match TokioResolver::builder_tokio() {
        Ok(mut builder) => {
            *builder.options_mut() = probe_options(timeout);
            builder.build()
        }
        Err(e) => {
            warn!("Failed to load system DNS configuration, falling back to defaults: {e}");
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
            .with_options(probe_options(timeout))
            .build()
        }
    }
}
