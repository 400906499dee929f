//! Wishlist-Scraper main entry point
//!
//! This is the command-line interface for the Wishlist-Scraper.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wishlist_scraper::config::{load_config_with_hash, Config};
use wishlist_scraper::Wishlist;

/// Wishlist-Scraper: lists the products on an Amazon wishlist
///
/// Fetches every page of a public wishlist and prints each product with
/// its price, date added, link and image.
#[derive(Parser, Debug)]
#[command(name = "wishlist-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Lists the products on an Amazon wishlist", long_about = None)]
struct Cli {
    /// URL of the Amazon wishlist
    #[arg(value_name = "WISHLIST_URL")]
    url: String,

    /// Log every request and save the fetched HTML
    #[arg(short, long)]
    debug: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Proxy to route requests through; repeat for round-robin
    #[arg(long = "proxy", value_name = "URL")]
    proxies: Vec<String>,

    /// Do not read or write the response cache
    #[arg(long)]
    no_cache: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.debug);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    tracing::info!("Got URL: {}", cli.url);
    let mut wishlist = Wishlist::new(&cli.url)?.with_config(config);

    if cli.debug {
        wishlist.set_debug_mode(true);
    }
    if cli.no_cache {
        wishlist.set_cache_results(false);
    }
    if !cli.proxies.is_empty() {
        wishlist.set_proxy_urls(&cli.proxies);
    }

    tracing::info!("Using URL: {}", wishlist);

    let result = wishlist.fetch_items().await.map(|items| items.len());

    match result {
        Ok(_) => {
            print_items(&wishlist);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            if wishlist.items().is_some_and(|items| !items.is_empty()) {
                println!("Partial results:");
                print_items(&wishlist);
            }
            Err(e.into())
        }
    }
}

/// Prints the numbered items of the last crawl
fn print_items(wishlist: &Wishlist) {
    let Some(items) = wishlist.items() else {
        return;
    };

    let mut items: Vec<_> = items.values().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));

    println!("Found {} item(s):", items.len());
    for (number, item) in items.iter().enumerate() {
        println!("{}) {}", number + 1, item);
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, debug: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 if debug => EnvFilter::new("wishlist_scraper=debug,info"),
            0 => EnvFilter::new("wishlist_scraper=info,warn"),
            1 => EnvFilter::new("wishlist_scraper=debug,info"),
            2 => EnvFilter::new("wishlist_scraper=trace,debug"),
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
