//! # torhoney-cli
//!
//! Command-line front end for the http:BL resolver pool.
//!
//! ## Output
//!
//! One line per exit node on stdout, in completion order unless `--ordered`
//! is given:
//!
//! ```text
//! 1.2.3.4,,,
//! 8.8.8.8,5,20,suspicious,harvester,
//! ```
//!
//! Fields are address, days since last seen, threat score, then the three
//! classification slots. Addresses that are not listed, or whose lookup
//! failed, keep their line with the reputation fields left empty. Logs go to
//! stderr.

pub mod cli;
pub mod config;
pub mod exits;

pub use cli::run;
