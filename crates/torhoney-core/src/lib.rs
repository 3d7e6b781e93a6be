//! Core types for Project Honeypot http:BL reputation lookups.
//!
//! This crate provides the pieces of a lookup that involve no I/O:
//!
//! - **Codec**: building the DNS query name for an address and decoding the
//!   `A` record that comes back
//! - **Types**: [`ClassFlags`], [`Reputation`], [`Verdict`] and
//!   [`LookupResult`]
//! - **Errors**: [`CodecError`] and the per-address [`LookupError`]
//!
//! # Example
//!
//! ```rust
//! use std::net::{IpAddr, Ipv4Addr};
//! use torhoney_core::{decode_response, encode_query, Verdict};
//!
//! let name = encode_query("abcdefghijkl", Ipv4Addr::new(1, 2, 3, 4));
//! assert_eq!(name, "abcdefghijkl.4.3.2.1.dnsbl.httpbl.org");
//!
//! let verdict = decode_response(&[IpAddr::V4(Ipv4Addr::new(127, 5, 20, 3))]).unwrap();
//! assert!(matches!(verdict, Verdict::Listed(_)));
//! ```

pub mod codec;
mod error;
pub mod types;

pub use codec::{decode_response, encode_query, encode_query_in, DEFAULT_ZONE};
pub use error::{CodecError, LookupError, Result};
pub use types::{ClassFlags, LookupResult, Reputation, Verdict};
