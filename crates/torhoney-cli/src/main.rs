//! torhoney - classify Tor exit nodes with Project Honeypot
//!
//! Downloads the Tor exit node list, looks every address up in http:BL and
//! prints one CSV line per address.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    torhoney_cli::run().await
}
