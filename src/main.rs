//! Recipe-Scout main entry point
//!
//! This is the command-line interface for the Recipe-Scout recipe crawler.

use anyhow::{Context, Result};
use clap::Parser;
use recipe_scout::config::{load_config_with_hash, Config};
use recipe_scout::output::{format_run_report, load_statistics, print_statistics};
use recipe_scout::storage::open_store;
use recipe_scout::url::SiteScope;
use recipe_scout::{Harvester, PipelineMode, StartAck};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Recipe-Scout: a recipe discovery crawler
///
/// Recipe-Scout crawls a single recipe site, confirms recipe pages through
/// their JSON-LD metadata, keeps a resumable list of every recipe found,
/// and pushes that list to a recipe import API.
#[derive(Parser, Debug)]
#[command(name = "recipe-scout")]
#[command(version = "1.0.0")]
#[command(about = "A resumable recipe discovery crawler", long_about = None)]
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

    /// Forget every stored recipe before crawling
    #[arg(long, conflicts_with_all = ["export_only", "dry_run", "stats", "download"])]
    fresh: bool,

    /// Crawl without exporting afterwards
    #[arg(long, conflicts_with_all = ["export_only", "dry_run", "stats", "download"])]
    crawl_only: bool,

    /// Export the stored recipes without crawling
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "download"])]
    export_only: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "download"])]
    dry_run: bool,

    /// Show statistics for the recipe store and exit
    #[arg(long, conflicts_with = "download")]
    stats: bool,

    /// Print the stored recipe list as plain text and exit
    #[arg(long)]
    download: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config).await
    } else if cli.download {
        handle_download(&config).await
    } else {
        let mode = if cli.crawl_only {
            PipelineMode::CrawlOnly
        } else if cli.export_only {
            PipelineMode::ExportOnly
        } else {
            PipelineMode::Full
        };
        handle_run(config, mode, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recipe_scout=info,warn"),
            1 => EnvFilter::new("recipe_scout=debug,info"),
            2 => EnvFilter::new("recipe_scout=trace,debug"),
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
fn handle_dry_run(config: &Config) -> Result<()> {
    let scope = SiteScope::from_start_url(
        &config.crawler.start_url,
        &config.crawler.recipe_path_prefix,
    )?;

    println!("=== Recipe-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Site: {}", scope.authority());
    println!("  Recipe path prefix: {}", scope.recipe_prefix());
    println!("  Workers: {}", config.crawler.max_concurrency);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nOutput:");
    println!("  Recipes: {}", config.output.recipes_path);
    println!("  Destination settings: {}", config.output.destination_path);

    println!("\nPipeline:");
    println!(
        "  Export after cancelled crawl: {}",
        config.pipeline.export_after_cancelled_crawl
    );

    println!("\nDestination:");
    match &config.destination {
        Some(destination) if destination.is_configured() => {
            println!("  Endpoint: {}", destination.endpoint);
            println!("  Rate limit: {}s", destination.rate_limit_seconds);
        }
        _ => println!("  (none in config; persisted settings are used if present)"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics for the recipe store
async fn handle_stats(config: &Config) -> Result<()> {
    let store = open_store(Path::new(&config.output.recipes_path))
        .context("Failed to open recipe store")?;
    let stats = load_statistics(config, &store).await;
    print_statistics(&stats);
    Ok(())
}

/// Handles the --download mode: prints the recipe list to stdout
async fn handle_download(config: &Config) -> Result<()> {
    let harvester = Harvester::open(config.clone()).context("Failed to open recipe store")?;
    print!("{}", harvester.download().await);
    Ok(())
}

/// Handles the crawl and export pipeline
async fn handle_run(config: Config, mode: PipelineMode, fresh: bool) -> Result<()> {
    let harvester = Harvester::open(config).context("Failed to open recipe store")?;

    if fresh {
        tracing::info!("Starting fresh crawl (forgetting stored recipes)");
        harvester
            .store()
            .clear()
            .await
            .context("Failed to clear recipe store")?;
    } else {
        tracing::info!(
            "Resuming with {} stored recipes from {}",
            harvester.store().len().await,
            harvester.config().output.recipes_path
        );
    }

    // First Ctrl-C stops both pipelines at their next safe point
    let on_signal = harvester.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping...");
            on_signal.cancel();
        }
    });

    if harvester.start_with(mode, None).await? == StartAck::AlreadyRunning {
        anyhow::bail!("A run is already in progress");
    }

    let report = match harvester.wait().await {
        Ok(Some(report)) => report,
        Ok(None) => return Ok(()),
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    println!(
        "\n{}",
        format_run_report(
            &report,
            &harvester.crawl_progress(),
            &harvester.export_progress()
        )
    );

    Ok(())
}
