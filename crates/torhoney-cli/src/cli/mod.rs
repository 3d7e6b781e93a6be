//! CLI argument parsing and the run loop.

pub mod args;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use args::Cli;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::exits::{self, DEFAULT_EXIT_LIST_URL};
use torhoney_pool::pool::{DEFAULT_TIMEOUT, DEFAULT_WORKERS};
use torhoney_pool::{HickoryResolver, OutputOrder, PoolConfig, QueryConfig, ResolverPool, ResultConsumer};

/// Timeout for downloading the exit list
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the exit list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitSource {
    Url(String),
    File(PathBuf),
}

/// Command line merged over the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: String,
    pub workers: usize,
    pub timeout: Duration,
    pub zone: Option<String>,
    pub source: ExitSource,
    pub order: OutputOrder,
}

impl Settings {
    /// Merge `cli` over `config`. The access key is required; the worker
    /// count and timeout must be positive.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let token = cli
            .key
            .as_deref()
            .or(config.api_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let Some(token) = token else {
            bail!(
                "http:BL access key required.\n\n\
                 Set it with one of:\n  \
                 1. --key <KEY>\n  \
                 2. HTTPBL_API_KEY environment variable\n  \
                 3. api_key in {}\n\n\
                 Get your key at: https://www.projecthoneypot.org/httpbl_configure.php",
                Config::path().map_or_else(|_| "config.toml".to_string(), |p| p.display().to_string())
            );
        };

        let workers = cli.workers.or(config.workers).unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            bail!("--workers must be at least 1");
        }

        let timeout = cli
            .timeout
            .or(config.timeout_secs)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        if timeout.is_zero() {
            bail!("--timeout must be at least 1 second");
        }

        let source = match &cli.exits_file {
            Some(path) => ExitSource::File(path.clone()),
            None => ExitSource::Url(
                cli.exits
                    .clone()
                    .or_else(|| config.exits_url.clone())
                    .unwrap_or_else(|| DEFAULT_EXIT_LIST_URL.to_string()),
            ),
        };

        let order = if cli.ordered {
            OutputOrder::Input
        } else {
            OutputOrder::Arrival
        };

        Ok(Self {
            token,
            workers,
            timeout,
            zone: cli.zone.clone().or_else(|| config.zone.clone()),
            source,
            order,
        })
    }

    /// Pool configuration for these settings.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        let mut query = QueryConfig::new(self.token.as_str()).timeout(self.timeout);
        if let Some(zone) = &self.zone {
            query = query.zone(zone.as_str());
        }
        PoolConfig::from_query(query).workers(self.workers)
    }
}

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let settings = Settings::resolve(&cli, &config)?;

    let addresses = match &settings.source {
        ExitSource::Url(url) => {
            let client = reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(format!("torhoney/{}", env!("CARGO_PKG_VERSION")))
                .build()?;
            exits::fetch_exit_list(&client, url)
                .await
                .with_context(|| format!("Failed to get Tor exit node list {url}"))?
        }
        ExitSource::File(path) => exits::read_exit_list(path)
            .with_context(|| format!("Failed to read Tor exit node list {}", path.display()))?,
    };

    info!(count = addresses.len(), "Loaded exit nodes");

    let resolver = Arc::new(HickoryResolver::from_system_conf(settings.timeout)?);
    let pool = ResolverPool::new(resolver, settings.pool_config())?;
    let handle = pool.start(addresses);

    let mut consumer = ResultConsumer::new(std::io::stdout().lock(), settings.order);
    if let Err(e) = consumer.drain(handle).await {
        if e.is_lifecycle_violation() {
            error!(error = %e, "resolver pool coordination failed");
        }
        return Err(e.into());
    }

    Ok(())
}

/// Send logs to stderr; stdout carries the results.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
