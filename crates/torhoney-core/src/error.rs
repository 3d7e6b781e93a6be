use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors from decoding an http:BL response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The first returned record cannot be read as four bytes
    #[error("response record {0} is not an IPv4 address")]
    NotIpv4(IpAddr),

    /// A classification label triplet did not have three slots
    #[error("expected 3 classification slots, got {0}")]
    SlotCount(usize),

    /// A classification slot held an unknown or misplaced label
    #[error("unknown classification label '{label}' in slot {slot}")]
    UnknownLabel {
        /// Zero-based slot position
        slot: usize,
        /// The offending text
        label: String,
    },
}

/// Why a single address could not be classified.
///
/// These travel inside a [`crate::LookupResult`]; they never abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Name resolution failed (network error, NXDOMAIN, SERVFAIL)
    #[error("lookup failed: {0}")]
    Resolve(String),

    /// Name resolution did not finish within the per-lookup timeout
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Resolution succeeded but the answer could not be decoded
    #[error("malformed response: {0}")]
    Malformed(#[from] CodecError),
}
