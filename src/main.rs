//! Legaldoc-Crawler main entry point
//!
//! This is the command-line interface for crawling legal document pages
//! into Markdown files.

use anyhow::Context;
use clap::Parser;
use legaldoc_crawler::config::{load_config, validate, Config};
use legaldoc_crawler::output::print_batch_summary;
use legaldoc_crawler::Crawler;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Legaldoc-Crawler: legal document pages to portable Markdown
///
/// Each URL is fetched, its article body is taken from the site's content
/// container, and the result is saved as a Markdown file with provenance
/// frontmatter. URLs are crawled one at a time with a delay between them.
#[derive(Parser, Debug)]
#[command(name = "legaldoc-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Crawl legal document pages into Markdown", long_about = None)]
struct Cli {
    /// URLs to crawl, in order
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// File with one URL per line (blank lines and `#` comments ignored)
    #[arg(long, value_name = "FILE")]
    urls_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for Markdown files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Seconds to wait between consecutive requests
    #[arg(long, value_name = "SECONDS")]
    delay: Option<u64>,

    /// Whole-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Retries for transient fetch failures (0 disables retrying)
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Backslash-escape Markdown metacharacters in extracted text
    #[arg(long)]
    escape_markdown: bool,

    /// Number ordered list items 1, 2, 3... instead of all `1.`
    #[arg(long)]
    number_lists: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration and URL list without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let urls = collect_urls(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &urls);
        return Ok(ExitCode::SUCCESS);
    }

    if urls.is_empty() {
        anyhow::bail!("No URLs to crawl: pass URLs, --urls-file or set `urls` in the config");
    }

    handle_crawl(config, &urls).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("legaldoc_crawler=info,warn"),
            1 => EnvFilter::new("legaldoc_crawler=debug,info"),
            2 => EnvFilter::new("legaldoc_crawler=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay_seconds = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_seconds = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.crawler.user_agent = user_agent.clone();
    }
    if let Some(retries) = cli.retries {
        config.retry.max_retries = retries;
    }
    if cli.escape_markdown {
        config.render.escape_markdown = true;
    }
    if cli.number_lists {
        config.render.number_ordered_lists = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Positional URLs, then the URL file, then the config list
fn collect_urls(cli: &Cli, config: &Config) -> anyhow::Result<Vec<String>> {
    let mut urls = cli.urls.clone();

    if let Some(path) = &cli.urls_file {
        urls.extend(read_urls_file(path)?);
    }

    urls.extend(config.urls.iter().cloned());
    Ok(urls)
}

fn read_urls_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Legaldoc-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Timeout: {}s", config.crawler.timeout_seconds);
    println!("  Delay: {}s", config.crawler.delay_seconds);
    println!("  Container: div.{}", config.crawler.container_class);
    println!("  Title: {}", config.crawler.document_title);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Escape Markdown: {}", config.render.escape_markdown);
    println!("  Number ordered lists: {}", config.render.number_ordered_lists);

    println!("\nRetry:");
    if config.retry.max_retries == 0 {
        println!("  Disabled");
    } else {
        println!(
            "  {} retries, {}s initial backoff",
            config.retry.max_retries, config.retry.backoff_seconds
        );
    }

    println!("\nURLs ({}):", urls.len());
    for url in urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, urls: &[String]) -> anyhow::Result<ExitCode> {
    let delay = Duration::from_secs(config.crawler.delay_seconds);
    tracing::info!(
        "Crawling {} URLs into {} ({}s delay)",
        urls.len(),
        config.output.directory,
        delay.as_secs()
    );

    let crawler = Crawler::new(config).context("Failed to build HTTP client")?;
    let result = crawler.crawl_many(urls, None, Some(delay)).await;

    print_batch_summary(&result);

    if result.failed() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
