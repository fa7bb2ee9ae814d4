//! Crawler module for fetching legal document pages and exporting them
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and body decoding
//! - HTML parsing and content container lookup
//! - Content block extraction
//! - The single-URL pipeline and the sequential batch coordinator

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod pipeline;
mod scheduler;

pub use coordinator::{BatchResult, Coordinator, ItemOutcome, RetryPolicy};
pub use extractor::{normalize_text, ContentExtractor};
pub use fetcher::{
    build_http_client, decode_body, fetch_url, FetchOutcome, FetchedPage, HttpFetcher, PageFetcher,
};
pub use parser::{locate_container, DomNode, ParsedPage, ScraperNode};
pub use pipeline::{CrawlFailure, CrawlOverrides, CrawlTarget, SingleCrawlPipeline};
pub use scheduler::RateLimiter;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::output::{ExportedFile, ProgressReporter, TracingProgress};
use crate::FetchError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for single and batch crawls
///
/// # Example
///
/// ```no_run
/// use legaldoc_crawler::{Config, Crawler};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let crawler = Crawler::new(Config::default())?;
/// let file = crawler
///     .crawl_one("https://thuvienphapluat.vn/van-ban/Luat-Dat-dai-2024.aspx", None)
///     .await?;
/// println!("Saved {}", file.path.display());
/// # Ok(())
/// # }
/// ```
pub struct Crawler {
    config: Config,
    pipeline: Arc<SingleCrawlPipeline>,
    coordinator: Coordinator,
}

impl Crawler {
    /// Creates a crawler that talks HTTP, uses the system clock and logs progress
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config.crawler)?;
        Ok(Self::with_components(
            config,
            Arc::new(fetcher),
            Arc::new(SystemClock),
            Arc::new(TracingProgress),
        ))
    }

    /// Creates a crawler from explicit capabilities
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        clock: Arc<dyn Clock>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        let pipeline = Arc::new(SingleCrawlPipeline::new(
            fetcher,
            clock.clone(),
            &config.crawler,
            config.render,
        ));
        let coordinator = Coordinator::new(
            pipeline.clone(),
            clock,
            progress,
            RetryPolicy::from(&config.retry),
        );

        Self {
            config,
            pipeline,
            coordinator,
        }
    }

    /// Crawls one URL into `output_dir`, or the configured directory
    pub async fn crawl_one(
        &self,
        url: &str,
        output_dir: Option<&Path>,
    ) -> Result<ExportedFile, CrawlFailure> {
        let target = CrawlTarget::new(url, self.resolve_output_dir(output_dir));
        self.pipeline.run(&target).await
    }

    /// Crawls one fully specified target
    pub async fn crawl_target(&self, target: &CrawlTarget) -> Result<ExportedFile, CrawlFailure> {
        self.pipeline.run(target).await
    }

    /// Crawls `urls` in order, waiting `delay` (or the configured delay) between them
    pub async fn crawl_many(
        &self,
        urls: &[String],
        output_dir: Option<&Path>,
        delay: Option<Duration>,
    ) -> BatchResult {
        let output_dir = self.resolve_output_dir(output_dir);
        let delay = delay.unwrap_or(Duration::from_secs(self.config.crawler.delay_seconds));
        self.coordinator.run_batch(urls, &output_dir, delay).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resolve_output_dir(&self, output_dir: Option<&Path>) -> PathBuf {
        output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.output.directory))
    }
}
