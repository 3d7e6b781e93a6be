//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Classify Tor exit nodes using Project Honeypot http:BL
///
/// Downloads the Tor exit node list and prints one line per exit address:
/// address, days since last seen, threat score and the three
/// classification slots (suspicious, harvester, comment spammer).
///
/// Get an access key at: https://www.projecthoneypot.org/httpbl_configure.php
#[derive(Parser, Debug)]
#[command(name = "torhoney")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project Honeypot http:BL access key (or set HTTPBL_API_KEY env var)
    #[arg(short = 'k', long, env = "HTTPBL_API_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Tor exit node list URL [default: https://check.torproject.org/exit-addresses]
    #[arg(long, value_name = "URL")]
    pub exits: Option<String>,

    /// Read the exit node list from a file instead of downloading it
    #[arg(long, value_name = "PATH", conflicts_with = "exits")]
    pub exits_file: Option<PathBuf>,

    /// Number of resolver workers to run [default: 10]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Per-lookup timeout in seconds [default: 5]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// http:BL zone to query [default: dnsbl.httpbl.org]
    #[arg(long)]
    pub zone: Option<String>,

    /// Print results in exit list order instead of as they complete
    #[arg(long)]
    pub ordered: bool,

    /// Configuration file [default: platform config dir]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "torhoney",
            "--key",
            "abcdefghijkl",
            "--workers",
            "4",
            "--timeout",
            "2",
            "--ordered",
        ])
        .unwrap();

        assert_eq!(cli.key.as_deref(), Some("abcdefghijkl"));
        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.timeout, Some(2));
        assert!(cli.ordered);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_exits_and_exits_file_conflict() {
        let outcome = Cli::try_parse_from([
            "torhoney",
            "--exits",
            "https://example.com/list",
            "--exits-file",
            "list.txt",
        ]);
        assert!(outcome.is_err());
    }
}
