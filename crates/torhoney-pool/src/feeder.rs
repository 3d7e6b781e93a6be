//! Feeder: the single producer on the work queue.

use std::net::Ipv4Addr;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{PoolError, PoolResult};
use crate::worker::WorkItem;

/// Push every address in list order, then close the queue.
///
/// The queue is bounded, so this runs alongside the workers and waits
/// whenever they fall behind. Dropping `queue` on return is what closes it.
pub(crate) async fn feed(addresses: Vec<Ipv4Addr>, queue: mpsc::Sender<WorkItem>) -> PoolResult<usize> {
    let total = addresses.len();

    for (index, address) in addresses.into_iter().enumerate() {
        if queue.send(WorkItem { index, address }).await.is_err() {
            return Err(PoolError::WorkQueueClosed {
                remaining: total - index,
            });
        }
    }

    debug!(total, "feeder finished, closing work queue");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_preserves_order_and_closes() {
        let (tx, mut rx) = mpsc::channel(1);
        let addresses = vec![
            Ipv4Addr::new(3, 3, 3, 3),
            Ipv4Addr::new(1, 1, 1, 1),
            Ipv4Addr::new(2, 2, 2, 2),
        ];

        let feeder = tokio::spawn(feed(addresses.clone(), tx));

        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            assert_eq!(item.index, received.len());
            received.push(item.address);
        }

        assert_eq!(received, addresses);
        assert_eq!(feeder.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_feed_reports_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = feed(vec![Ipv4Addr::LOCALHOST, Ipv4Addr::BROADCAST], tx).await;
        assert!(matches!(
            outcome,
            Err(PoolError::WorkQueueClosed { remaining: 2 })
        ));
    }
}
