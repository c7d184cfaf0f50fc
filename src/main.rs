//! Dilbert Feed main entry point
//!
//! This is the command-line interface for mirroring the daily strip and
//! rebuilding the feed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dilbert_feed::config::{load_config_with_hash, Config};
use dilbert_feed::feed::gen_feed;
use dilbert_feed::heartbeat::{build_heartbeat_client, ping};
use dilbert_feed::storage::{MemoryStore, ObjectStore, S3Store};
use dilbert_feed::strip::get_strip;
use dilbert_feed::{with_deadline, ConfigError, DilbertError};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Dilbert Feed: daily strip mirror and RSS generator
///
/// Scrapes the daily strip, copies the image to object storage and rebuilds
/// an RSS feed of the most recent strips.
#[derive(Parser, Debug)]
#[command(name = "dilbert-feed")]
#[command(version)]
#[command(about = "Daily strip mirror and RSS generator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a strip and copy its image to storage
    GetStrip {
        /// Strip date as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,

        /// Keep the image in memory instead of uploading it
        #[arg(long)]
        dry_run: bool,
    },

    /// Regenerate the feed from stored strips and upload it
    GenFeed {
        /// Most recent day of the feed as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        start: Option<String>,

        /// Render the feed without uploading it
        #[arg(long)]
        dry_run: bool,
    },

    /// Ping the heartbeat endpoint
    Heartbeat {
        /// Endpoint to ping (default: heartbeat.endpoint from the config)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Validate the configuration and print the resolved settings
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))
        .inspect_err(|e| tracing::error!("{:#}", e))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let deadline = Duration::from_secs(config.run.deadline_secs);

    let result = match cli.command {
        Command::GetStrip { date, dry_run } => {
            let store = open_store(&config, dry_run).await;
            with_deadline(deadline, get_strip(&config, store, date.as_deref()))
                .await
                .and_then(print_json)
        }
        Command::GenFeed { start, dry_run } => {
            let store = open_store(&config, dry_run).await;
            with_deadline(deadline, gen_feed(&config, store, start.as_deref()))
                .await
                .and_then(print_json)
        }
        Command::Heartbeat { endpoint } => handle_heartbeat(&config, endpoint, deadline).await,
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!("Invocation failed ({:?}): {}", e.kind(), e);
    }

    Ok(result?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the JSON output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dilbert_feed=info,warn"),
            1 => EnvFilter::new("dilbert_feed=debug,info"),
            2 => EnvFilter::new("dilbert_feed=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn open_store(config: &Config, dry_run: bool) -> Arc<dyn ObjectStore> {
    if dry_run {
        tracing::info!("Dry run: objects are kept in memory");
        Arc::new(MemoryStore::new(&config.storage.public_base_url()))
    } else {
        Arc::new(S3Store::from_config(&config.storage).await)
    }
}

async fn handle_heartbeat(
    config: &Config,
    endpoint: Option<String>,
    deadline: Duration,
) -> dilbert_feed::Result<()> {
    let endpoint = endpoint
        .or_else(|| config.heartbeat.endpoint.clone())
        .ok_or_else(|| ConfigError::Missing("heartbeat.endpoint".to_string()))?;

    let client = build_heartbeat_client(&config.site.user_agent)
        .map_err(|e| DilbertError::Http {
            url: endpoint.clone(),
            source: e,
        })?;

    with_deadline(deadline, ping(&client, &endpoint))
        .await
        .and_then(print_json)
}

fn handle_check(config: &Config) {
    println!("=== Dilbert Feed Configuration ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Timeout: {}s", config.site.timeout_secs);
    println!("  User agent: {}", config.site.user_agent);

    println!("\nStorage:");
    println!("  Bucket: {}", config.storage.bucket);
    println!("  Strips dir: {}", config.storage.strips_prefix());
    println!(
        "  Region: {}",
        config.storage.region.as_deref().unwrap_or("(default chain)")
    );
    if let Some(endpoint) = &config.storage.endpoint_url {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  Public URL: {}", config.storage.public_base_url());

    println!("\nFeed:");
    println!("  Path: {}", config.feed.path);
    println!("  Length: {} days", config.feed.length);
    println!("  Concurrent lookups: {}", config.feed.concurrency);

    println!("\nRun:");
    println!("  Deadline: {}s", config.run.deadline_secs);

    println!(
        "\nHeartbeat: {}",
        config.heartbeat.endpoint.as_deref().unwrap_or("(not configured)")
    );

    println!("\n✓ Configuration is valid");
}

fn print_json<T: Serialize>(output: T) -> dilbert_feed::Result<()> {
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| DilbertError::FeedWrite(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    println!("{}", json);
    Ok(())
}
