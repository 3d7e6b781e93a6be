//! Result consumer: drains a running pool and writes one line per address.

use std::collections::BTreeMap;
use std::io::Write;

use tracing::debug;

use crate::error::{PoolError, PoolResult};
use crate::pool::{PoolHandle, PoolStats};
use torhoney_core::LookupResult;

/// Order in which rendered results are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputOrder {
    /// As lookups complete
    #[default]
    Arrival,
    /// In the order addresses were submitted
    Input,
}

/// Writes each [`LookupResult`] as `address,age,score,class-triplet`
pub struct ResultConsumer<W> {
    out: W,
    order: OutputOrder,
}

impl<W: Write> ResultConsumer<W> {
    #[must_use]
    pub const fn new(out: W, order: OutputOrder) -> Self {
        Self { out, order }
    }

    /// Read exactly one result per submitted address, write them, then wait
    /// for the pool to shut down.
    pub async fn drain(&mut self, mut handle: PoolHandle) -> PoolResult<PoolStats> {
        let expected = handle.submitted();
        let mut reorder = Reorder::new(self.order);
        let mut received = 0;

        while received < expected {
            let Some(result) = handle.recv().await else {
                // A dead worker explains the shortfall better than the count
                handle.finish().await?;
                return Err(PoolError::ResultsLost { expected, received });
            };
            received += 1;

            for ready in reorder.push(result) {
                writeln!(self.out, "{ready}")?;
            }
        }

        self.out.flush()?;
        debug!(received, "all results written");
        handle.finish().await
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Holds early arrivals until every lower index has been written.
struct Reorder {
    order: OutputOrder,
    next: usize,
    pending: BTreeMap<usize, LookupResult>,
}

impl Reorder {
    const fn new(order: OutputOrder) -> Self {
        Self {
            order,
            next: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Accept a result and return those now ready to be written.
    fn push(&mut self, result: LookupResult) -> Vec<LookupResult> {
        if self.order == OutputOrder::Arrival {
            return vec![result];
        }

        self.pending.insert(result.index, result);
        let mut ready = Vec::new();
        while let Some(result) = self.pending.remove(&self.next) {
            ready.push(result);
            self.next += 1;
        }
        ready
    }
}
