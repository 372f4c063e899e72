//! News-Sieve main entry point
//!
//! This is the command-line interface for the News-Sieve article harvester.

use anyhow::Context;
use clap::Parser;
use news_sieve::classifier::HttpClassifier;
use news_sieve::config::{load_config_with_hash, Config};
use news_sieve::crawler::{compile_sites, Coordinator};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// News-Sieve: a pattern-driven article harvester
///
/// News-Sieve walks each configured site breadth-first, extracts pages whose
/// links match the site's content pattern, keeps the ones an external
/// classifier judges relevant and recent enough, and stores them in SQLite.
#[derive(Parser, Debug)]
#[command(name = "news-sieve")]
#[command(version = "1.0.0")]
#[command(about = "A pattern-driven article harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config).await?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_sieve=info,warn"),
            1 => EnvFilter::new("news_sieve=debug,info"),
            2 => EnvFilter::new("news_sieve=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let plans = compile_sites(config)?;
    let classifier = HttpClassifier::from_settings(reqwest::Client::new(), &config.classifier)?;

    println!("=== News-Sieve Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Default workers: {}", config.crawler.worker_count);
    println!("  Channel capacity: {}", config.crawler.channel_capacity);
    println!("  Dedup cache capacity: {}", config.crawler.cache_capacity);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Fetch attempts: {}", config.crawler.fetch_max_attempts);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nClassifier:");
    println!("  Endpoint: {}", classifier.endpoint());
    println!("  Timeout: {}s", config.classifier.timeout_secs);
    println!("  Attempts: {}", config.classifier.max_attempts);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nSites ({}):", plans.len());
    for plan in &plans {
        let site = &plan.crawler;
        println!("  - {} [{}]", site.base_url, site.source_country);
        println!("    Navigable: {}", site.rules.navigable_pattern());
        println!("    Content: {}", site.rules.content_pattern());
        println!("    Date cutoff: {}", site.date_cutoff);
        println!("    Workers: {}", site.worker_count);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} site(s)", plans.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use news_sieve::output::{load_statistics, print_statistics};
    use news_sieve::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.storage.database_path);

    let store = SqliteStore::open(Path::new(&config.storage.database_path))
        .context("Failed to open database")?;

    let stats = load_statistics(&store).await?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Sites: {}", config.sites.len());

    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(config, cancel.clone())?;

    // Stop traversal and workers on Ctrl-C
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            signal_token.cancel();
        }
    });

    match coordinator.run().await {
        Ok(stats) => {
            if cancel.is_cancelled() {
                tracing::info!("Crawl interrupted");
            } else {
                tracing::info!("Crawl completed successfully");
            }
            println!("{}", stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
