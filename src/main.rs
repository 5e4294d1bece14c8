//! Novel-Spider main entry point
//!
//! This is the command-line interface for the Novel-Spider downloader.

use anyhow::Context;
use clap::Parser;
use novel_spider::config::{load_config, Config};
use novel_spider::{SelectorParser, Spider, SpiderConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Novel-Spider: a polite chapter-by-chapter novel downloader
///
/// Novel-Spider follows the next-chapter links of a web novel, caching
/// every page on disk and appending the chapter text to a single file.
#[derive(Parser, Debug)]
#[command(name = "novel-spider")]
#[command(version)]
#[command(about = "A polite chapter-by-chapter novel downloader", long_about = None)]
struct Cli {
    /// Path to TOML book configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from this chapter URL instead of the configured one
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Index of the first chapter downloaded in this run
    #[arg(long, value_name = "N")]
    start_index: Option<u32>,

    /// Validate config and show what would be downloaded without downloading
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = load_config(&cli.config)
        .with_context(|| format!("load configuration {}", cli.config.display()))?;

    if let Some(url) = cli.start_url {
        config.book.start_url = url;
    }
    if let Some(index) = cli.start_index {
        config.book.start_index = index;
    }

    let parser = SelectorParser::from_config(&config.selectors)?;
    let spider_config = SpiderConfig::from_config(&config);

    if cli.dry_run {
        print_dry_run(&config, &spider_config);
        return Ok(());
    }

    handle_download(spider_config, parser).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("novel_spider=info,warn"),
            1 => EnvFilter::new("novel_spider=debug,info"),
            2 => EnvFilter::new("novel_spider=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved settings
fn print_dry_run(config: &Config, spider_config: &SpiderConfig) {
    println!("=== Novel-Spider Dry Run ===\n");

    println!("Book:");
    println!("  Name: {}", spider_config.book_name());
    println!(
        "  Start: {}://{}",
        spider_config.scheme(),
        spider_config.start_url()
    );
    println!("  Start index: {}", spider_config.start_index());
    println!("  Site root: {}", spider_config.site_root());

    println!("\nFiles:");
    println!("  Output: {}", spider_config.output_path().display());
    println!("  Cache: {}", spider_config.cache_dir().display());
    println!("  Cache keys: {:?}", spider_config.cache_key());

    println!("\nRequests:");
    println!("  Wait between chapters: {:?}", spider_config.wait());
    for name in spider_config.headers().keys() {
        println!("  Header: {}", name);
    }

    println!("\nSelectors:");
    println!("  Title: {}", config.selectors.title);
    println!("  Content: {}", config.selectors.content);
    println!("  Next link: {}", config.selectors.next_link);

    println!("\n✓ Configuration is valid");
}

/// Handles the download, stopping cleanly on Ctrl-C
async fn handle_download(config: SpiderConfig, parser: SelectorParser) -> anyhow::Result<()> {
    let mut spider = Spider::new(config, parser);

    let outcome = tokio::select! {
        result = spider.run() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let cursor = spider.cursor();
    match outcome {
        Some(Ok(summary)) => {
            tracing::info!(
                "Download completed: {} chapters written",
                summary.chapters_written
            );
            Ok(())
        }
        Some(Err(e)) => {
            tracing::error!("{}", e);
            tracing::error!(
                "Resume with --start-url '{}' --start-index {}",
                cursor.url(),
                cursor.index()
            );
            Err(e.into())
        }
        None => {
            tracing::warn!(
                "Interrupted; resume with --start-url '{}' --start-index {}",
                cursor.url(),
                cursor.index()
            );
            Ok(())
        }
    }
}
