//! valocache - Fetch and cache Valorant player data
//!
//! Looks up a player by `Name#Tag`, serving match history and rank data from
//! the local cache when it is fresh and refetching it from the HenrikDev API
//! otherwise. The payload is printed to stdout; logs go to stderr.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use valocache::api::HenrikClient;
use valocache::cache::PlayerCache;
use valocache::cli::{summary_line, Cli};
use valocache::config::Config;

/// Installs the stderr log subscriber, honouring `RUST_LOG`
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,rustls=warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Validate before touching the environment or the network
    let key = cli.player_key()?;

    if let Err(e) = dotenv::dotenv() {
        debug!("No .env file loaded: {}", e);
    }
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);
    debug!(data_dir = %config.data_dir.display(), region = %config.default_region, "Loaded configuration");

    let client = HenrikClient::new(&config)?;
    let mut cache = PlayerCache::open(client, &config.data_dir, config.default_region.clone())?;
    let payload = cache.get_or_refresh(&key.to_string(), cli.refresh_options())?;

    if cli.summary {
        println!("{}", summary_line(&payload));
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
