//! listing-sweep main entry point
//!
//! This is the command-line interface for the listing-sweep marketplace
//! harvester.

use clap::{Parser, Subcommand};
use listing_sweep::config::{load_config_with_hash, Config};
use listing_sweep::output::{
    load_results, print_collections, print_history, print_report, print_results, report_json,
};
use listing_sweep::storage::{open_storage, ListingStore};
use listing_sweep::{run_scrape, ListingQuery, OutcomeTier, SortOrder, SweepError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// listing-sweep: a marketplace listing harvester
///
/// listing-sweep fetches search-result pages for a query, extracts the
/// listings, stores them per query and reports how the run went.
#[derive(Parser, Debug)]
#[command(name = "listing-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A marketplace listing harvester", long_about = None)]
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
    /// Run one scrape for a search term and store the listings
    Scrape {
        /// Search term
        query: String,

        /// Lower price bound
        #[arg(long)]
        min_price: Option<String>,

        /// Upper price bound
        #[arg(long)]
        max_price: Option<String>,

        /// Result ordering requested from the marketplace
        #[arg(long, default_value = "price_desc")]
        sort: SortOrder,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored listings for a search term
    Results {
        /// Search term
        query: String,

        /// Price ordering
        #[arg(long, default_value = "price_asc")]
        sort: SortOrder,

        /// Maximum number of listings to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List stored collections with their sizes
    Collections,

    /// Show recent scrape runs
    History {
        /// Maximum number of runs to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(SweepError::from(e).into());
        }
    };

    match cli.command {
        Command::Scrape {
            query,
            min_price,
            max_price,
            sort,
            json,
        } => {
            handle_scrape(
                &config,
                &query,
                min_price.as_deref(),
                max_price.as_deref(),
                sort,
                json,
            )
            .await?
        }
        Command::Results { query, sort, limit } => handle_results(&config, &query, sort, limit)?,
        Command::Collections => handle_collections(&config)?,
        Command::History { limit } => handle_history(&config, limit)?,
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
            0 => EnvFilter::new("listing_sweep=info,warn"),
            1 => EnvFilter::new("listing_sweep=debug,info"),
            2 => EnvFilter::new("listing_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the scrape command: runs one scrape and reports its outcome
async fn handle_scrape(
    config: &Config,
    term: &str,
    min_price: Option<&str>,
    max_price: Option<&str>,
    sort: SortOrder,
    json: bool,
) -> listing_sweep::Result<()> {
    let query = ListingQuery::new(term, min_price, max_price, sort)?;

    tracing::info!(
        "Starting scrape for '{}' (min: {}, max: {}, sort: {})",
        query.term(),
        query.min_price().unwrap_or("-"),
        query.max_price().unwrap_or("-"),
        query.sort()
    );

    let report = run_scrape(config, query).await;

    if json {
        println!("{}", report_json(&report)?);
    } else {
        print_report(&report);
    }

    if report.tier() == OutcomeTier::PartialSuccess {
        tracing::warn!("Scrape finished with a partial success");
    }

    report.error_for_tier()
}

/// Handles the results command: shows stored listings for a query
fn handle_results(
    config: &Config,
    term: &str,
    sort: SortOrder,
    limit: Option<usize>,
) -> listing_sweep::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let results = load_results(&storage, term, sort, limit)?;
    print_results(&results);
    Ok(())
}

/// Handles the collections command
fn handle_collections(config: &Config) -> listing_sweep::Result<()> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let collections = storage.list_collections()?;
    print_collections(&collections);
    Ok(())
}

/// Handles the history command
fn handle_history(config: &Config, limit: usize) -> listing_sweep::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let runs = storage.recent_runs(limit)?;
    print_history(&runs);
    Ok(())
}
