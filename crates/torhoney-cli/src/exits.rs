//! Tor exit node list loading.
//!
//! The list published by the Tor Project has entries like this:
//!
//! ```text
//! ExitNode 0017413E0BD04C427F79B51360031EC95043C012
//! Published 2014-09-22 15:12:27
//! LastStatus 2014-09-22 17:03:03
//! ExitAddress 105.237.199.197 2014-09-22 16:03:36
//! ```
//!
//! Only the `ExitAddress` lines matter.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

/// Where the Tor Project publishes the exit list
pub const DEFAULT_EXIT_LIST_URL: &str = "https://check.torproject.org/exit-addresses";

const EXIT_ADDRESS_PREFIX: &str = "ExitAddress ";

/// Errors loading the exit list
#[derive(Error, Debug)]
pub enum ExitListError {
    /// HTTP request failed
    #[error("failed to fetch exit list: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("exit list request to {url} returned HTTP {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Reading a local list failed
    #[error("failed to read exit list: {0}")]
    Io(#[from] std::io::Error),
}

/// Download and parse the exit list at `url`.
pub async fn fetch_exit_list(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Ipv4Addr>, ExitListError> {
    debug!(url, "fetching Tor exit node list");

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExitListError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(parse_exit_list(&body))
}

/// Parse an exit list saved to disk.
pub fn read_exit_list(path: &Path) -> Result<Vec<Ipv4Addr>, ExitListError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_exit_list(&content))
}

/// Extract the IPv4 address from every `ExitAddress` line, in order.
///
/// Duplicates are kept. Lines with a missing, unparsable or IPv6 address are
/// logged and skipped.
pub fn parse_exit_list(text: &str) -> Vec<Ipv4Addr> {
    text.lines()
        .filter(|line| line.starts_with(EXIT_ADDRESS_PREFIX))
        .filter_map(parse_exit_address)
        .collect()
}

fn parse_exit_address(line: &str) -> Option<Ipv4Addr> {
    let Some(token) = line.split_whitespace().nth(1) else {
        warn!(line, "bad ExitAddress line");
        return None;
    };

    match token.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => Some(v4),
        Ok(IpAddr::V6(v6)) => {
            let mapped = v6.to_ipv4_mapped();
            if mapped.is_none() {
                warn!(address = token, "exit address is not IPv4");
            }
            mapped
        }
        Err(e) => {
            warn!(address = token, error = %e, "failed to parse exit address");
            None
        }
    }
}
