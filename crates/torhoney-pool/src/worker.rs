//! Resolver worker: pulls addresses off the shared work queue and pushes one
//! result per address.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

use crate::error::{PoolError, PoolResult};
use crate::pool::QueryConfig;
use crate::resolver::NameResolver;
use torhoney_core::{decode_response, encode_query_in, LookupError, LookupResult, Verdict};

/// One unit of work: an address and its position in the submitted list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkItem {
    pub index: usize,
    pub address: Ipv4Addr,
}

/// Receiving end of the work queue, shared by every worker.
pub(crate) type WorkQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// Encode, resolve and decode a single address.
///
/// Never fails: resolution errors, timeouts and undecodable answers all end
/// up in [`Verdict::Failed`].
pub async fn lookup(resolver: &dyn NameResolver, query: &QueryConfig, address: Ipv4Addr) -> Verdict {
    let name = encode_query_in(&query.token, address, &query.zone);

    let records = match tokio::time::timeout(query.timeout, resolver.resolve(&name)).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => return Verdict::Failed(e),
        Err(_) => return Verdict::Failed(LookupError::Timeout(query.timeout)),
    };

    match decode_response(&records) {
        Ok(verdict) => verdict,
        Err(e) => Verdict::Failed(e.into()),
    }
}

/// Worker loop. Returns how many addresses this worker processed once the
/// work queue is closed and drained.
pub(crate) async fn run(
    id: usize,
    resolver: Arc<dyn NameResolver>,
    query: Arc<QueryConfig>,
    queue: WorkQueue,
    results: mpsc::Sender<LookupResult>,
) -> PoolResult<usize> {
    let mut processed = 0;

    loop {
        // The lock is only held while waiting for the next item
        let next = queue.lock().await.recv().await;
        let Some(item) = next else { break };

        let verdict = lookup(resolver.as_ref(), &query, item.address).await;
        match &verdict {
            Verdict::Failed(e) => debug!(worker = id, ip = %item.address, error = %e, "lookup failed"),
            Verdict::NotListed => debug!(worker = id, ip = %item.address, "not listed"),
            Verdict::Listed(rep) => debug!(
                worker = id,
                ip = %item.address,
                score = rep.score,
                age_days = rep.age_days,
                class = rep.class.bits(),
                "listed"
            ),
        }

        results
            .send(LookupResult::new(item.index, item.address, verdict))
            .await
            .map_err(|_| PoolError::ResultQueueClosed)?;
        processed += 1;
    }

    trace!(worker = id, processed, "worker finished");
    Ok(processed)
}
