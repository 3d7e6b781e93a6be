//! Name resolution used by the workers.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use tracing::debug;

use crate::error::{PoolError, PoolResult};
use torhoney_core::LookupError;

/// Resolves a query name to the addresses it points at.
///
/// Implementations must be safe to share between every worker in the pool.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Look up the `A`/`AAAA` records for `name`.
    ///
    /// An empty `Ok` means the name exists but has no address records.
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, LookupError>;
}

/// [`NameResolver`] backed by hickory using the system configuration.
pub struct HickoryResolver {
    inner: TokioResolver,
}

impl HickoryResolver {
    /// Create a resolver from `/etc/resolv.conf` (or the platform
    /// equivalent) with a single attempt per query bounded by `timeout`.
    pub fn from_system_conf(timeout: Duration) -> PoolResult<Self> {
        let mut builder = TokioResolver::builder_tokio()
            .map_err(|e| PoolError::Resolver(format!("failed to read system config: {e}")))?;

        let opts = builder.options_mut();
        opts.timeout = timeout;
        opts.attempts = 1;

        Ok(Self {
            inner: builder.build(),
        })
    }
}

#[async_trait]
impl NameResolver for HickoryResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, LookupError> {
        match self.inner.lookup_ip(name).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => {
                // NXDOMAIN lands here too: not listed, reported as a failure
                debug!(name, error = %e, "resolution failed");
                Err(LookupError::Resolve(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Scripted answer for one query name.
    #[derive(Debug, Clone)]
    pub enum Answer {
        Records(Vec<IpAddr>),
        Fail(String),
        Delayed(Duration, Vec<IpAddr>),
        Hang,
        Panic,
    }

    /// In-memory resolver. Unknown names resolve to no records.
    #[derive(Debug, Default)]
    pub struct StubResolver {
        answers: HashMap<String, Answer>,
    }

    impl StubResolver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn answer(mut self, name: impl Into<String>, answer: Answer) -> Self {
            self.answers.insert(name.into(), answer);
            self
        }
    }

    #[async_trait]
    impl NameResolver for StubResolver {
        async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, LookupError> {
            match self.answers.get(name).cloned() {
                None => Ok(Vec::new()),
                Some(Answer::Records(records)) => Ok(records),
                Some(Answer::Fail(reason)) => Err(LookupError::Resolve(reason)),
                Some(Answer::Delayed(delay, records)) => {
                    tokio::time::sleep(delay).await;
                    Ok(records)
                }
                Some(Answer::Panic) => panic!("resolver crashed on {name}"),
                Some(Answer::Hang) => {
                    std::future::pending::<()>().await;
                    Ok(Vec::new())
                }
            }
        }
    }
}
