//! Normativa-Harvest main entry point
//!
//! This is the command-line interface for the regulatory document pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use normativa_harvest::config::{load_config_with_hash, Config};
use normativa_harvest::output::{
    load_statistics, print_document, print_environment_report, print_run_summary,
    print_search_hits, print_stage_report, print_statistics,
};
use normativa_harvest::pipeline::Pipeline;
use normativa_harvest::politeness::{compliance_report, ComplianceCheck};
use normativa_harvest::storage::{open_store, DocumentStore, SqliteDocumentStore};
use normativa_harvest::HarvestError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Normativa-Harvest: a polite regulatory document harvester
///
/// Crawls one regulatory site, downloads the PDFs it links to, extracts
/// their text and loads it into a searchable document store. Every request
/// honors the domain allow-list, robots.txt and the configured rate limits.
#[derive(Parser, Debug)]
#[command(name = "normativa-harvest")]
#[command(version)]
#[command(about = "A polite regulatory document harvester", long_about = None)]
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
    /// Run every stage: crawl, download, extract, persist
    Run {
        /// Stop the crawl after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Crawl the site and write the link manifest
    Crawl {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Download every document listed in the manifest
    Download,

    /// Extract text from downloaded documents into record files
    Extract,

    /// Load record files into the document store
    Persist,

    /// Check that the document store is reachable
    CheckStore,

    /// Check extraction tools and that the seed page answers
    Check,

    /// Show document store statistics
    Stats {
        /// Documents listed in the preview
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Full-text search over stored documents
    Search {
        /// Words to search for
        term: String,

        /// Maximum results
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Show one stored document
    Show {
        /// Document file name, e.g. resolucion-123.pdf
        file: String,
    },

    /// Print the compliance report for the active settings
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let result = dispatch(cli.command, config).await;

    if let Err(e) = &result {
        if let Some(HarvestError::StoreUnavailable { location, .. }) =
            e.downcast_ref::<HarvestError>()
        {
            print_store_guidance(location);
        }
    }

    result
}

/// Runs one subcommand
async fn dispatch(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Run { max_pages } => handle_run(config, max_pages).await,
        Command::Crawl { max_pages } => {
            let report = Pipeline::new(config)?.run_crawl(max_pages).await?;
            print_stage_report(&report);
            Ok(())
        }
        Command::Download => {
            let report = Pipeline::new(config)?.run_download().await?;
            print_stage_report(&report);
            Ok(())
        }
        Command::Extract => {
            let report = Pipeline::new(config)?.run_extract().await?;
            print_stage_report(&report);
            Ok(())
        }
        Command::Persist => {
            let report = Pipeline::new(config)?.run_persist()?;
            print_stage_report(&report);
            Ok(())
        }
        Command::CheckStore => handle_check_store(&config),
        Command::Check => {
            let report = Pipeline::new(config)?.check_environment().await?;
            print_environment_report(&report);
            if !report.is_ready() {
                tracing::warn!("Environment is not ready for a full run");
            }
            Ok(())
        }
        Command::Stats { limit } => {
            let store = open(&config)?;
            print_statistics(&load_statistics(&store, limit)?);
            Ok(())
        }
        Command::Search { term, limit } => {
            let store = open(&config)?;
            print_search_hits(&term, &store.search(&term, limit)?);
            Ok(())
        }
        Command::Show { file } => {
            let store = open(&config)?;
            match store.find_by_file(&file)? {
                Some(doc) => print_document(&doc),
                None => println!("No stored document named '{}'", file),
            }
            Ok(())
        }
        Command::Report => {
            print!("{}", compliance_report(&config));
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("normativa_harvest=info,warn"),
            1 => EnvFilter::new("normativa_harvest=debug,info"),
            2 => EnvFilter::new("normativa_harvest=trace,debug"),
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

/// Runs the full pipeline and prints the summary
async fn handle_run(config: Config, max_pages: Option<usize>) -> Result<()> {
    tracing::info!(
        "Harvesting {} (allowed: {})",
        config.site.seed_url,
        config.site.allowed_domains.join(", ")
    );

    let pipeline = Pipeline::new(config)?;
    match pipeline.run_all(max_pages).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Pipeline stopped: {}", e);
            Err(e.into())
        }
    }
}

fn handle_check_store(config: &Config) -> Result<()> {
    ComplianceCheck::run(config)?;

    let store = open(config)?;
    store.ping()?;
    println!("✓ Document store reachable at {}", store.location());
    println!("  Documents: {}", store.count()?);
    Ok(())
}

fn open(config: &Config) -> Result<SqliteDocumentStore> {
    Ok(open_store(&config.store)?)
}

fn print_store_guidance(location: &str) {
    eprintln!();
    eprintln!("The document store at {} could not be opened.", location);
    eprintln!("  - Check that the parent directory exists and is writable");
    eprintln!("  - Check that no other process holds an exclusive lock on the file");
    eprintln!("  - Set [store] database-path in the configuration to another location");
}
