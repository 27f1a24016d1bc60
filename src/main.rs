//! Components Hub main entry point
//!
//! Command-line interface for running a catalog refresh batch.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};

use components_hub::config::{load_config, Config};
use components_hub::fetch::{Fetcher, MemoryStore, ResponseCache, ResponseStore, SqliteStore};
use components_hub::output;
use components_hub::pipeline::{self, load_curated};
use tracing_subscriber::EnvFilter;

/// Components Hub: a catalog builder for community components
///
/// Discovers components from the forum tracker thread, the package index
/// and the repository host, merges and enriches them, and writes the
/// finalized catalog for the gallery frontend.
#[derive(Parser, Debug)]
#[command(name = "components-hub")]
#[command(version)]
#[command(about = "Build the community components catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore cached responses and hit every source again
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_refresh(config, cli.fresh).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("components_hub=info,warn"),
            1 => EnvFilter::new("components_hub=debug,info"),
            2 => EnvFilter::new("components_hub=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the run plan
fn handle_dry_run(config: &Config) {
    println!("=== Components Hub Dry Run ===\n");

    println!("Sources:");
    println!("  Tracker thread: {}", config.sources.tracker_url);
    println!("  Package index:  {}", config.sources.pypi_url);
    println!("  Repository API: {}", config.sources.github_api_url);
    println!("  Download stats: {}", config.sources.pypistats_url);
    println!(
        "  Demo patterns:  {}",
        config.sources.demo_hosts.join(", ")
    );

    println!("\nThrottling:");
    println!("  Readme delay:     {}ms", config.rate_limit.readme_delay_ms);
    println!(
        "  Downloads delay:  {}ms",
        config.rate_limit.downloads_delay_ms
    );
    println!(
        "  Retry backoff:    {}ms",
        config.rate_limit.downloads_retry_backoff_ms
    );

    println!("\nCurated data:");
    println!("  Overrides: {}", config.curated.overrides_path);
    println!("  Exclude:   {}", config.curated.exclude_path);

    println!("\nCache:");
    match &config.cache.database_path {
        Some(path) => println!("  Database: {} (ttl {}h)", path, config.cache.ttl_hours),
        None => println!("  In-memory (ttl {}h)", config.cache.ttl_hours),
    }

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.catalog_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Repository credential read from ${} at startup",
        config.sources.github_token_env
    );
}

/// Handles a full catalog refresh
async fn handle_refresh(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh refresh (ignoring cached responses)");
    } else {
        tracing::info!("Starting refresh");
    }

    let curated = load_curated(&config.curated).context("failed to load curated data")?;
    tracing::info!(
        overrides = curated.overrides.len(),
        excluded = curated.exclude.len(),
        "curated data loaded"
    );

    let store: Box<dyn ResponseStore> = match &config.cache.database_path {
        Some(path) => Box::new(SqliteStore::new(Path::new(path))?),
        None => Box::new(MemoryStore::new()),
    };
    let cache = ResponseCache::new(store, config.cache.ttl_hours).bypass_reads(fresh);
    let mut fetcher = Fetcher::new(&config, cache)?;

    let records = pipeline::run(&config, &mut fetcher, &curated).await?;

    let records = output::filter_excluded(records, &curated.exclude);
    let catalog_path = Path::new(&config.output.catalog_path);
    output::write_catalog(&records, catalog_path)?;

    tracing::info!(
        components = records.len(),
        path = %config.output.catalog_path,
        "catalog written"
    );
    Ok(())
}
