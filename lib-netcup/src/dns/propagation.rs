//! Checks whether a published challenge is visible to the outside world.

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::rr::rdata::TXT;
use hickory_resolver::TokioAsyncResolver;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;

use super::config::{challenge_fqdn, HookConfig};
use super::errors::HookErrors;

/// Source of TXT record values for a fully qualified name.
#[async_trait]
pub trait TxtLookup: Send + Sync {
    /// All TXT values at `name`. A name without TXT records yields an empty list.
    async fn txt_values(&self, name: &str) -> Result<Vec<String>, HookErrors>;
}

/// Queries a single nameserver directly, without caching.
pub struct ResolverLookup {
    nameserver: SocketAddr,
    resolver: TokioAsyncResolver,
}

impl ResolverLookup {
    pub fn new(nameserver: SocketAddr) -> Self {
        let group =
            NameServerConfigGroup::from_ips_clear(&[nameserver.ip()], nameserver.port(), true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.cache_size = 0;
        opts.use_hosts_file = false;
        opts.timeout = Duration::from_secs(5);
        opts.attempts = 2;

        ResolverLookup {
            nameserver,
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

impl fmt::Debug for ResolverLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverLookup")
            .field("nameserver", &self.nameserver)
            .finish()
    }
}

#[async_trait]
impl TxtLookup for ResolverLookup {
    async fn txt_values(&self, name: &str) -> Result<Vec<String>, HookErrors> {
        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => Ok(lookup.iter().map(txt_value).collect()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Joins the character strings of one TXT record without a separator.
fn txt_value(txt: &TXT) -> String {
    txt.txt_data()
        .iter()
        .map(|data| String::from_utf8_lossy(data))
        .collect()
}

/// Polls the reference resolver until the challenge shows up or time runs out.
pub struct PropagationChecker {
    lookup: Box<dyn TxtLookup>,
    record_name: String,
    poll_interval: Duration,
}

impl PropagationChecker {
    pub fn new(config: &HookConfig) -> Self {
        Self::with_lookup(config, ResolverLookup::new(config.resolver))
    }

    pub fn with_lookup(config: &HookConfig, lookup: impl TxtLookup + 'static) -> Self {
        PropagationChecker {
            lookup: Box::new(lookup),
            record_name: config.record_name.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Waits until `challenge` is among the TXT values of the challenge name of `domain`.
    ///
    /// The deadline is fixed on entry. The resolver is asked at least once; between
    /// attempts the checker sleeps for the poll interval. Returns `false` once the deadline
    /// has passed without a match.
    pub async fn await_propagation(&self, domain: &str, challenge: &str, timeout: Duration) -> bool {
        let record_name = challenge_fqdn(&self.record_name, domain);
        let start = Instant::now();
        let deadline = start + timeout;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::info!(record = %record_name, attempt, "Checking if challenge is propagated");
            if self.is_visible(&record_name, challenge).await {
                tracing::info!(
                    record = %record_name,
                    elapsed_secs = start.elapsed().as_secs(),
                    "Challenge propagated"
                );
                return true;
            }

            if Instant::now() >= deadline {
                tracing::warn!(
                    record = %record_name,
                    timeout_secs = timeout.as_secs(),
                    attempts = attempt,
                    "Challenge not propagated before the deadline"
                );
                return false;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn is_visible(&self, record_name: &str, challenge: &str) -> bool {
        match self.lookup.txt_values(record_name).await {
            Ok(values) => {
                tracing::trace!(record = %record_name, ?values, "TXT lookup answered");
                values.iter().any(|value| value == challenge)
            }
            Err(e) => {
                tracing::warn!(record = %record_name, error = %e, "DNS lookup error");
                false
            }
        }
    }
}
