//! Bounded-concurrency http:BL lookups.
//!
//! A [`ResolverPool`] runs a fixed number of workers over a shared work
//! queue. A feeder task pushes the submitted addresses in order, each worker
//! resolves and decodes whatever it pulls, and every address produces exactly
//! one [`torhoney_core::LookupResult`] on the result queue. Results arrive in
//! completion order; [`ResultConsumer`] can restore input order on request.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::net::Ipv4Addr;
//! use std::sync::Arc;
//! use torhoney_pool::{HickoryResolver, OutputOrder, PoolConfig, PoolResult, ResolverPool, ResultConsumer};
//!
//! # async fn classify(addresses: Vec<Ipv4Addr>) -> PoolResult<()> {
//! let config = PoolConfig::new("abcdefghijkl").workers(10);
//! let resolver = Arc::new(HickoryResolver::from_system_conf(config.query.timeout)?);
//! let pool = ResolverPool::new(resolver, config)?;
//!
//! let handle = pool.start(addresses);
//! let mut consumer = ResultConsumer::new(std::io::stdout().lock(), OutputOrder::Arrival);
//! consumer.drain(handle).await?;
//! # Ok(())
//! # }
//! ```

pub mod consumer;
mod error;
mod feeder;
pub mod pool;
pub mod resolver;
mod worker;

pub use consumer::{OutputOrder, ResultConsumer};
pub use error::{PoolError, PoolResult};
pub use pool::{PoolConfig, PoolHandle, PoolStats, QueryConfig, ResolverPool};
pub use resolver::{HickoryResolver, NameResolver};
pub use worker::lookup;
