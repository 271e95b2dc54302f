//! Recording test doubles for the capability traits.
//!
//! Each double answers from an in-memory table and counts how often it was
//! asked, so tests can assert that a query was (or was not) issued.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hostprobe_common::error::{ProbeError, ResolutionFailure};

use crate::capability::{Dialer, ReachabilityProber, RecordPresence, RecordQuery, Resolver};

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Default)]
pub struct MockResolver {
    addresses: HashMap<String, IpAddr>,
    cnames: HashSet<String>,
    ptrs: HashMap<Ipv4Addr, String>,
    failure: Option<ProbeError>,
    delay: Option<Duration>,
    address_calls: AtomicUsize,
    cname_calls: AtomicUsize,
    a_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an A record for `name`.
    pub fn with_address(mut self, name: &str, addr: IpAddr) -> Self {
        self.addresses.insert(name.to_string(), addr);
        self
    }

    pub fn with_cname(mut self, name: &str) -> Self {
        self.cnames.insert(name.to_string());
        self
    }

    pub fn with_ptr(mut self, addr: Ipv4Addr, name: &str) -> Self {
        self.ptrs.insert(addr, name.to_string());
        self
    }

    /// Every query fails with `err`.
    pub fn failing_with(mut self, err: ProbeError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn address_calls(&self) -> usize {
        self.address_calls.load(Ordering::SeqCst)
    }

    pub fn record_calls(&self, query: RecordQuery) -> usize {
        match query {
            RecordQuery::A => self.a_calls.load(Ordering::SeqCst),
            RecordQuery::Cname => self.cname_calls.load(Ordering::SeqCst),
        }
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> Result<(), ProbeError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn lookup_address(&self, name: &str) -> Result<IpAddr, ProbeError> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.fail()?;
        self.addresses
            .get(name)
            .copied()
            .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
    }

    async fn lookup_record(
        &self,
        name: &str,
        query: RecordQuery,
    ) -> Result<RecordPresence, ProbeError> {
        let present = match query {
            RecordQuery::A => {
                self.a_calls.fetch_add(1, Ordering::SeqCst);
                self.addresses.contains_key(name)
            }
            RecordQuery::Cname => {
                self.cname_calls.fetch_add(1, Ordering::SeqCst);
                self.cnames.contains(name)
            }
        };
        pause(self.delay).await;
        self.fail()?;
        Ok(if present {
            RecordPresence::Present
        } else {
            RecordPresence::Absent
        })
    }

    async fn reverse_lookup(&self, addr: Ipv4Addr) -> Result<String, ProbeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        self.fail()?;
        self.ptrs
            .get(&addr)
            .cloned()
            .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
    }
}

/// Accepts connections to registered `(host, port)` pairs and refuses the rest.
#[derive(Default)]
pub struct MockDialer {
    open: HashSet<(String, u16)>,
    failures: HashMap<String, ProbeError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open(mut self, host: &str, port: u16) -> Self {
        self.open.insert((host.to_string(), port));
        self
    }

    /// Connections to `host` fail with `err` instead of being refused.
    pub fn failing(mut self, host: &str, err: ProbeError) -> Self {
        self.failures.insert(host.to_string(), err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn connect(&self, host: &str, port: u16, _timeout: Duration) -> Result<(), ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        if self.open.contains(&(host.to_string(), port)) {
            return Ok(());
        }
        Err(self
            .failures
            .get(host)
            .cloned()
            .unwrap_or(ProbeError::ConnectionRefused))
    }
}

/// Answers for registered hosts and stays silent for the rest.
#[derive(Default)]
pub struct MockProber {
    reachable: HashSet<String>,
    failure: Option<ProbeError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reachable(mut self, host: &str) -> Self {
        self.reachable.insert(host.to_string());
        self
    }

    pub fn failing_with(mut self, err: ProbeError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReachabilityProber for MockProber {
    async fn probe(&self, host: &str, _timeout: Duration) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pause(self.delay).await;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.reachable.contains(host))
    }
}
