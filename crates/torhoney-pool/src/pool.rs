//! Worker pool coordinator.
//!
//! Lifecycle of one run:
//!
//! 1. [`ResolverPool::start`] creates the bounded work and result queues,
//!    spawns the workers and the feeder, and hands the result queue to the
//!    caller as a [`PoolHandle`].
//! 2. The feeder pushes every address and drops its sender, closing the work
//!    queue.
//! 3. Each worker drains the work queue and exits, dropping its result
//!    sender. The coordinator keeps no sender of its own, so the result queue
//!    closes exactly when the last worker exits and never before.
//! 4. A supervisor task joins the feeder and every worker and reports
//!    [`PoolStats`] or the first lifecycle violation through
//!    [`PoolHandle::finish`].

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{error, info};

use crate::error::{PoolError, PoolResult};
use crate::feeder;
use crate::resolver::NameResolver;
use crate::worker::{self, WorkQueue};
use torhoney_core::{LookupResult, DEFAULT_ZONE};

/// Default number of resolver workers
pub const DEFAULT_WORKERS: usize = 10;

/// Default per-lookup timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How each address is turned into a query
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// http:BL access key
    pub token: String,

    /// Zone the reversed address is queried under
    pub zone: String,

    /// Upper bound on a single lookup
    pub timeout: Duration,
}

impl QueryConfig {
    /// Create a query configuration for the default zone and timeout
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            zone: DEFAULT_ZONE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the zone
    #[must_use]
    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = zone.into();
        self
    }

    /// Set the per-lookup timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers, at least 1
    pub workers: usize,

    /// Capacity of the work and result queues; defaults to `workers`
    pub queue_capacity: Option<usize>,

    /// Query settings shared by every worker
    pub query: QueryConfig,
}

impl PoolConfig {
    /// Create a configuration with [`DEFAULT_WORKERS`] workers and the
    /// default query settings
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_query(QueryConfig::new(token))
    }

    /// Create a configuration with [`DEFAULT_WORKERS`] workers around
    /// `query`
    #[must_use]
    pub const fn from_query(query: QueryConfig) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            query,
        }
    }

    /// Set the worker count
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the queue capacity
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    fn capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.workers).max(1)
    }
}

/// Counters reported once a run has fully shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Addresses pushed by the feeder
    pub fed: usize,
    /// Results pushed by all workers together
    pub processed: usize,
    /// Workers that ran
    pub workers: usize,
}

/// Fixed-size pool of resolver workers
pub struct ResolverPool {
    resolver: Arc<dyn NameResolver>,
    config: PoolConfig,
}

impl ResolverPool {
    /// Create a pool. Fails if the worker count is zero.
    pub fn new(resolver: Arc<dyn NameResolver>, config: PoolConfig) -> PoolResult<Self> {
        if config.workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        Ok(Self { resolver, config })
    }

    /// Start a run over `addresses`.
    ///
    /// Must be called from within a tokio runtime. Results must be drained
    /// from the returned handle for the run to make progress.
    pub fn start(&self, addresses: Vec<Ipv4Addr>) -> PoolHandle {
        let submitted = addresses.len();
        let workers = self.config.workers;
        let capacity = self.config.capacity();

        let (work_tx, work_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);
        let queue: WorkQueue = Arc::new(Mutex::new(work_rx));
        let query = Arc::new(self.config.query.clone());

        info!(addresses = submitted, workers, "starting resolver pool");

        let mut worker_set = JoinSet::new();
        for id in 0..workers {
            worker_set.spawn(worker::run(
                id,
                Arc::clone(&self.resolver),
                Arc::clone(&query),
                Arc::clone(&queue),
                result_tx.clone(),
            ));
        }
        // Workers now hold the only result senders
        drop(result_tx);

        let feeder = tokio::spawn(feeder::feed(addresses, work_tx));
        let supervisor = tokio::spawn(supervise(feeder, worker_set));

        PoolHandle {
            results: result_rx,
            submitted,
            supervisor,
        }
    }
}

/// Wait for the feeder and every worker to exit.
async fn supervise(
    feeder: JoinHandle<PoolResult<usize>>,
    mut workers: JoinSet<PoolResult<usize>>,
) -> PoolResult<PoolStats> {
    let worker_count = workers.len();
    let mut first_error = None;

    let fed = match feeder.await.map_err(task_error).and_then(|r| r) {
        Ok(fed) => fed,
        Err(e) => {
            first_error = Some(e);
            0
        }
    };

    let mut processed = 0;
    while let Some(joined) = workers.join_next().await {
        match joined.map_err(task_error).and_then(|r| r) {
            Ok(count) => processed += count,
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        error!(error = %e, "resolver pool shut down abnormally");
        return Err(e);
    }

    info!(fed, processed, workers = worker_count, "resolver pool finished");
    Ok(PoolStats {
        fed,
        processed,
        workers: worker_count,
    })
}

fn task_error(e: JoinError) -> PoolError {
    if e.is_panic() {
        PoolError::Task("task panicked".to_string())
    } else {
        PoolError::Task(e.to_string())
    }
}

/// A running pool: the result queue plus the supervisor of the run
pub struct PoolHandle {
    results: mpsc::Receiver<LookupResult>,
    submitted: usize,
    supervisor: JoinHandle<PoolResult<PoolStats>>,
}

impl PoolHandle {
    /// Number of addresses submitted, and so the number of results to expect
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Next result in completion order, or `None` once every worker exited
    pub async fn recv(&mut self) -> Option<LookupResult> {
        self.results.recv().await
    }

    /// Wait for the feeder and workers to exit
    pub async fn finish(self) -> PoolResult<PoolStats> {
        drop(self.results);
        self.supervisor.await.map_err(task_error).and_then(|r| r)
    }

    /// Drain every result in completion order, then wait for shutdown
    pub async fn collect(mut self) -> PoolResult<Vec<LookupResult>> {
        let expected = self.submitted;
        let mut results = Vec::with_capacity(expected);

        while results.len() < expected {
            match self.recv().await {
                Some(result) => results.push(result),
                None => {
                    let received = results.len();
                    self.finish().await?;
                    return Err(PoolError::ResultsLost { expected, received });
                }
            }
        }

        self.finish().await?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::{Answer, StubResolver};
    use std::collections::HashSet;
    use std::net::IpAddr;
    use torhoney_core::Verdict;

    fn addresses(n: u8) -> Vec<Ipv4Addr> {
        (1..=n).map(|i| Ipv4Addr::new(10, 0, 0, i)).collect()
    }

    fn pool(resolver: StubResolver, workers: usize) -> ResolverPool {
        let config = PoolConfig::from_query(QueryConfig::new("abc").timeout(Duration::from_millis(200)))
            .workers(workers);
        ResolverPool::new(Arc::new(resolver), config).unwrap()
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = PoolConfig::new("abc").workers(0);
        let outcome = ResolverPool::new(Arc::new(StubResolver::new()), config);
        assert!(matches!(outcome, Err(PoolError::NoWorkers)));
    }

    #[test]
    fn test_default_config() {
        let config = PoolConfig::new("abc");
        assert_eq!(config.workers, 10);
        assert_eq!(config.capacity(), 10);
        assert_eq!(config.query.zone, "dnsbl.httpbl.org");
        assert_eq!(config.query.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_one_result_per_address_for_any_pool_size() {
        let input = addresses(7);
        let expected: HashSet<Ipv4Addr> = input.iter().copied().collect();

        for workers in [1, 3, 7, 20] {
            let handle = pool(StubResolver::new(), workers).start(input.clone());
            assert_eq!(handle.submitted(), 7);

            let results = handle.collect().await.unwrap();
            assert_eq!(results.len(), 7, "workers = {workers}");

            let seen: HashSet<Ipv4Addr> = results.iter().map(|r| r.address).collect();
            assert_eq!(seen, expected, "workers = {workers}");

            let mut indices: Vec<usize> = results.iter().map(|r| r.index).collect();
            indices.sort_unstable();
            assert_eq!(indices, (0..7).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_single_worker_three_addresses() {
        let input = addresses(3);
        let results = pool(StubResolver::new(), 1).start(input.clone()).collect().await.unwrap();

        let mut seen: Vec<Ipv4Addr> = results.iter().map(|r| r.address).collect();
        seen.sort();
        assert_eq!(seen, input);
    }

    #[tokio::test]
    async fn test_minimal_queue_capacity() {
        let config = PoolConfig::new("abc").workers(4).queue_capacity(1);
        assert_eq!(config.capacity(), 1);

        let pool = ResolverPool::new(Arc::new(StubResolver::new()), config).unwrap();
        let results = pool.start(addresses(9)).collect().await.unwrap();
        assert_eq!(results.len(), 9);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        assert_eq!(PoolConfig::new("abc").queue_capacity(0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_shuts_down() {
        let handle = pool(StubResolver::new(), 4).start(Vec::new());
        let results = handle.collect().await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_finish_reports_stats() {
        let mut handle = pool(StubResolver::new(), 2).start(addresses(5));
        for _ in 0..5 {
            handle.recv().await.unwrap();
        }
        let stats = handle.finish().await.unwrap();
        assert_eq!(
            stats,
            PoolStats {
                fed: 5,
                processed: 5,
                workers: 2
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_does_not_block_others() {
        let input = addresses(6);
        let resolver = StubResolver::new().answer("abc.3.0.0.10.dnsbl.httpbl.org", Answer::Hang);

        let results = pool(resolver, 2).start(input).collect().await.unwrap();
        assert_eq!(results.len(), 6);

        let stalled: Vec<_> = results
            .iter()
            .filter(|r| r.verdict.error().is_some())
            .collect();
        assert_eq!(stalled.len(), 1);
        assert_eq!(stalled[0].address, Ipv4Addr::new(10, 0, 0, 3));
    }

    #[tokio::test]
    async fn test_mixed_outcomes_travel_as_data() {
        let resolver = StubResolver::new()
            .answer(
                "abc.1.0.0.10.dnsbl.httpbl.org",
                Answer::Records(vec![IpAddr::V4(Ipv4Addr::new(127, 1, 50, 4))]),
            )
            .answer(
                "abc.2.0.0.10.dnsbl.httpbl.org",
                Answer::Fail("SERVFAIL".to_string()),
            );

        let mut results = pool(resolver, 3).start(addresses(3)).collect().await.unwrap();
        results.sort_by_key(|r| r.index);

        assert!(results[0].verdict.is_listed());
        assert!(results[1].verdict.error().is_some());
        assert_eq!(results[2].verdict, Verdict::NotListed);
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        // First address is slow, the rest answer immediately
        let resolver = StubResolver::new().answer(
            "abc.1.0.0.10.dnsbl.httpbl.org",
            Answer::Delayed(Duration::from_millis(100), Vec::new()),
        );

        let results = pool(resolver, 3).start(addresses(3)).collect().await.unwrap();
        assert_eq!(results.last().map(|r| r.index), Some(0));
    }
}
