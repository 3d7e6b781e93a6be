use thiserror::Error;

/// Result type alias for pool operations
pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// Errors that stop a whole run.
///
/// Per-address failures are not here; they are carried as data in
/// [`torhoney_core::Verdict::Failed`].
#[derive(Error, Debug)]
pub enum PoolError {
    /// Pool was configured with zero workers
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// The DNS resolver could not be built
    #[error("resolver setup failed: {0}")]
    Resolver(String),

    /// The work queue closed while the feeder still had addresses
    #[error("work queue closed with {remaining} addresses unsent")]
    WorkQueueClosed {
        /// Addresses that never reached a worker
        remaining: usize,
    },

    /// A worker produced a result after the consumer went away
    #[error("result queue closed while workers were still running")]
    ResultQueueClosed,

    /// A feeder or worker task panicked or was cancelled
    #[error("pool task failed: {0}")]
    Task(String),

    /// The result queue drained before every address was accounted for
    #[error("expected {expected} results, received {received}")]
    ResultsLost {
        /// Addresses submitted
        expected: usize,
        /// Results actually received
        received: usize,
    },

    /// Writing rendered results failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

impl PoolError {
    /// Returns true for coordination bugs (lost results, queues closed out
    /// of turn, dead tasks) as opposed to setup or I/O problems
    #[must_use]
    pub const fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            Self::WorkQueueClosed { .. }
                | Self::ResultQueueClosed
                | Self::Task(_)
                | Self::ResultsLost { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_violations() {
        assert!(PoolError::ResultQueueClosed.is_lifecycle_violation());
        assert!(PoolError::Task("task panicked".to_string()).is_lifecycle_violation());
        assert!(PoolError::WorkQueueClosed { remaining: 1 }.is_lifecycle_violation());
        assert!(PoolError::ResultsLost {
            expected: 3,
            received: 2
        }
        .is_lifecycle_violation());

        assert!(!PoolError::NoWorkers.is_lifecycle_violation());
        assert!(!PoolError::Resolver("no resolv.conf".to_string()).is_lifecycle_violation());
        assert!(!PoolError::Output(std::io::Error::other("broken pipe")).is_lifecycle_violation());
    }
}
