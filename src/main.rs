//! steam-price-gap - Compare Steam store prices between regions
//!
//! Ranks games by how much cheaper they are in Ukraine than in Indonesia.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use steam_price_gap::commands::{CompareCommand, ListCommand, RunReport};
use steam_price_gap::config::{Config, OutputFormat};
use steam_price_gap::format::{self, Formatter};
use steam_price_gap::pricing::{SOURCE_REGION, TARGET_REGION};
use steam_price_gap::steam::{CatalogSource, Region};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "steam-price-gap",
    version,
    about = "Compare Steam store prices between Ukraine and Indonesia",
    long_about = "Lists the Steam store catalog, fetches every game's price in the Ukrainian and \
                  Indonesian stores, converts UAH to IDR and ranks games by the savings."
)]
struct Cli {
    /// Number of search pages to scan (50 games per page)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Console output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Path of the CSV report
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Do not write the CSV report
    #[arg(long, global = true)]
    no_csv: bool,

    /// Concurrent comparison workers (keep small, the store rate-limits)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Catalog source: search or featured
    #[arg(long, global = true)]
    source: Option<CatalogSource>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare prices across the catalog (default)
    #[command(alias = "c")]
    Compare {
        /// Number of search pages to scan
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        pages: Option<u32>,
    },

    /// List catalog entries without fetching prices
    #[command(alias = "l")]
    List {
        /// Number of search pages to scan
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        pages: Option<u32>,
    },

    /// Compare specific apps by id
    #[command(alias = "a")]
    App {
        /// Steam app id(s)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the compared regions and exchange rate
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Layered: file, then STEAM_GAP_* environment, then flags
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(output) = cli.output {
        config.output = Some(output);
    }
    if cli.no_csv {
        config.output = None;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(source) = cli.source {
        config.source = source;
    }
    if let Some(delay) = cli.delay {
        config.page_delay_ms = delay;
        config.detail_delay_ms = delay;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command.unwrap_or(Commands::Compare { pages: cli.pages }) {
        Commands::Compare { pages } => {
            let pages = pages.unwrap_or(config.pages);
            let mut cmd = CompareCommand::new(config.clone());
            let report = cmd.execute(pages).await?;
            emit_report(&config, &report)?;
        }

        Commands::List { pages } => {
            let pages = pages.unwrap_or(config.pages);
            let cmd = ListCommand::new(config);
            let output = cmd.execute(pages).await?;
            println!("{}", output);
        }

        Commands::App { ids } => {
            let mut cmd = CompareCommand::new(config.clone());
            let report = cmd.execute_apps(&ids).await?;
            emit_report(&config, &report)?;
        }

        Commands::Regions => {
            println!("Compared regions:\n");
            println!("{:<6} {:<10} {:<8} {:<8}", "Code", "Role", "Currency", "Symbol");
            println!("{:-<6} {:-<10} {:-<8} {:-<8}", "", "", "", "");

            for region in Region::all() {
                let role = if *region == SOURCE_REGION { "source" } else { "target" };
                println!(
                    "{:<6} {:<10} {:<8} {:<8}",
                    region.to_string(),
                    role,
                    region.currency(),
                    region.symbol()
                );
            }

            println!(
                "\n1 {} = {} {}",
                SOURCE_REGION.currency(),
                config.exchange_rate.value(),
                TARGET_REGION.currency()
            );
        }
    }

    Ok(())
}

/// Prints the ranked records and writes the CSV report if configured.
fn emit_report(config: &Config, report: &RunReport) -> Result<()> {
    let formatter = Formatter::new(config.format);
    println!("{}", formatter.format_records(&report.records));

    let summary = &report.summary;
    info!(
        "{} of {} games priced in both regions ({} unavailable, {} dropped)",
        summary.compared, summary.listed, summary.unavailable, summary.dropped
    );

    if let Some(path) = &config.output {
        format::write_csv(path, &report.records)?;
        info!("CSV report written to {}", path.display());
    }

    Ok(())
}
