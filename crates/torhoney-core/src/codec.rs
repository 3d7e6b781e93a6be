//! http:BL encoding: maps an address and access key to a DNS query name and
//! decodes the `A` record returned for it.
//!
//! Standard DNSBL pattern with the access key prepended: reverse the IP
//! octets and query under the zone.
//! Example: checking 1.2.3.4 with key `abcdefghijkl` queries
//! `abcdefghijkl.4.3.2.1.dnsbl.httpbl.org`
//!
//! Response octets (A record `a.b.c.d`):
//! - `a` = 127 for a valid answer (reserved)
//! - `b` = days since the address was last seen (0-255)
//! - `c` = threat score (0-255)
//! - `d` = visitor type bit-set, see [`ClassFlags`]
//! - NXDOMAIN = not listed
//!
//! API: <http://www.projecthoneypot.org/httpbl_api.php>

use std::net::{IpAddr, Ipv4Addr};

use tracing::debug;

use crate::error::{CodecError, Result};
use crate::types::{ClassFlags, Reputation, Verdict};

/// The http:BL zone queried when none is configured.
pub const DEFAULT_ZONE: &str = "dnsbl.httpbl.org";

/// First octet of every well-formed http:BL answer.
const VALID_RESPONSE_OCTET: u8 = 127;

/// Reverse an IPv4 address for DNSBL lookup.
///
/// Converts `1.2.3.4` into `4.3.2.1` (without zone suffix).
#[must_use]
pub fn reverse_ipv4(ip: Ipv4Addr) -> String {
    let [o1, o2, o3, o4] = ip.octets();
    format!("{o4}.{o3}.{o2}.{o1}")
}

/// Build the query name for `ip` under [`DEFAULT_ZONE`].
#[must_use]
pub fn encode_query(token: &str, ip: Ipv4Addr) -> String {
    encode_query_in(token, ip, DEFAULT_ZONE)
}

/// Build the query name for `ip` under `zone`.
///
/// The token is not validated; a malformed one simply yields a name that
/// does not resolve.
#[must_use]
pub fn encode_query_in(token: &str, ip: Ipv4Addr, zone: &str) -> String {
    format!("{token}.{}.{zone}", reverse_ipv4(ip))
}

/// Decode the records returned for a query name.
///
/// Only the first record is consulted. No records means the address is not
/// listed.
pub fn decode_response(records: &[IpAddr]) -> Result<Verdict> {
    let Some(first) = records.first() else {
        return Ok(Verdict::NotListed);
    };

    let v4 = as_ipv4(*first).ok_or(CodecError::NotIpv4(*first))?;
    let [reserved, age_days, score, class] = v4.octets();

    if reserved != VALID_RESPONSE_OCTET {
        debug!(response = %v4, "unexpected first octet in http:BL response");
    }

    Ok(Verdict::Listed(Reputation {
        age_days,
        score,
        class: ClassFlags::from_bits_truncate(class),
    }))
}

/// Coerce a record to its 4-byte form.
fn as_ipv4(addr: IpAddr) -> Option<Ipv4Addr> {
    match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
