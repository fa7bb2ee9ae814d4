//! Batch coordinator - sequential multi-URL crawling
//!
//! This module drives the single-URL pipeline over a list of URLs:
//! - Items run strictly in input order, one at a time
//! - A fixed delay separates consecutive items
//! - A failed item is recorded and the batch moves on
//! - Progress is reported after every item

use crate::clock::Clock;
use crate::config::RetryConfig;
use crate::crawler::pipeline::{CrawlFailure, CrawlTarget, SingleCrawlPipeline};
use crate::crawler::scheduler::RateLimiter;
use crate::output::{BatchProgress, ExportedFile, ProgressReporter};
use crate::{CrawlError, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Result of one batch item
#[derive(Debug)]
pub enum ItemOutcome {
    Success(ExportedFile),
    Failure(CrawlFailure),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<Result<ExportedFile, CrawlFailure>> for ItemOutcome {
    fn from(result: Result<ExportedFile, CrawlFailure>) -> Self {
        match result {
            Ok(file) => Self::Success(file),
            Err(failure) => Self::Failure(failure),
        }
    }
}

/// Outcomes of a batch, one per input URL in input order
#[derive(Debug, Default)]
pub struct BatchResult {
    outcomes: Vec<ItemOutcome>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    /// Number of exported items
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed items
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Files written by the batch, in input order
    pub fn exported_files(&self) -> impl Iterator<Item = &ExportedFile> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Success(file) => Some(file),
            ItemOutcome::Failure(_) => None,
        })
    }

    /// Failed items, in input order
    pub fn failures(&self) -> impl Iterator<Item = &CrawlFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            ItemOutcome::Failure(failure) => Some(failure),
            ItemOutcome::Success(_) => None,
        })
    }
}

impl From<Vec<ItemOutcome>> for BatchResult {
    fn from(outcomes: Vec<ItemOutcome>) -> Self {
        Self { outcomes }
    }
}

/// Retry behaviour for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one
    pub max_retries: u32,

    /// Wait before the first retry; doubled after each further attempt
    pub backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// True for network failures and for HTTP 403, 429 and 5xx
    pub fn is_retryable(error: &CrawlError) -> bool {
        let CrawlError::Fetch(fetch) = error else {
            return false;
        };
        match fetch.kind() {
            ErrorKind::Network => true,
            ErrorKind::HttpStatus => matches!(
                fetch.status_code(),
                Some(403) | Some(429) | Some(500..=599)
            ),
            _ => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_secs(config.backoff_seconds),
        }
    }
}

/// Runs batches of URLs through a [`SingleCrawlPipeline`]
pub struct Coordinator {
    pipeline: Arc<SingleCrawlPipeline>,
    clock: Arc<dyn Clock>,
    progress: Arc<dyn ProgressReporter>,
    retry: RetryPolicy,
}

impl Coordinator {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Per-URL pipeline
    /// * `clock` - Used for inter-item delays and retry backoff
    /// * `progress` - Notified after every item
    /// * `retry` - Retry policy for transient fetch failures
    pub fn new(
        pipeline: Arc<SingleCrawlPipeline>,
        clock: Arc<dyn Clock>,
        progress: Arc<dyn ProgressReporter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            pipeline,
            clock,
            progress,
            retry,
        }
    }

    /// Crawls `urls` one after another
    ///
    /// The result holds exactly one outcome per URL, in input order. An
    /// empty input performs no requests and no waits.
    pub async fn run_batch(&self, urls: &[String], output_dir: &Path, delay: Duration) -> BatchResult {
        let mut limiter = RateLimiter::new(delay);
        let mut progress = BatchProgress::new(urls.len());
        let mut outcomes = Vec::with_capacity(urls.len());

        tracing::info!("Starting batch of {} URLs", urls.len());

        for url in urls {
            limiter.wait_turn(self.clock.as_ref()).await;

            let target = CrawlTarget::new(url.clone(), output_dir);
            let outcome = ItemOutcome::from(self.run_with_retry(&target).await);

            progress.record(&outcome);
            self.progress.report(&progress, &outcome);
            outcomes.push(outcome);
        }

        tracing::info!(
            "Batch complete: {} succeeded, {} failed",
            progress.succeeded,
            progress.failed
        );

        BatchResult::from(outcomes)
    }

    /// Runs one target, retrying retryable failures per the policy
    pub async fn run_with_retry(&self, target: &CrawlTarget) -> Result<ExportedFile, CrawlFailure> {
        let mut attempt = 0;
        loop {
            match self.pipeline.run(target).await {
                Ok(file) => return Ok(file),
                Err(failure)
                    if attempt < self.retry.max_retries
                        && RetryPolicy::is_retryable(&failure.error) =>
                {
                    let backoff = self.retry.backoff_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        target.url,
                        backoff,
                        attempt,
                        self.retry.max_retries,
                        failure.error
                    );
                    self.clock.sleep(backoff).await;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{CrawlerConfig, RenderConfig};
    use crate::crawler::test_support::{start_time, MockFetcher, CONTENT_PAGE};
    use crate::output::RecordingProgress;
    use crate::state::CrawlStage;
    use crate::FetchError;
    use tempfile::TempDir;

    const U1: &str = "https://thuvienphapluat.vn/van-ban/a.aspx";
    const U2: &str = "https://thuvienphapluat.vn/van-ban/b.aspx";
    const U3: &str = "https://thuvienphapluat.vn/van-ban/c.aspx";

    struct Harness {
        coordinator: Coordinator,
        clock: Arc<ManualClock>,
        progress: Arc<RecordingProgress>,
        calls: Arc<std::sync::Mutex<Vec<String>>>,
    }

    fn harness(fetcher: MockFetcher, retry: RetryPolicy) -> Harness {
        let clock = Arc::new(ManualClock::new(start_time()));
        let progress = Arc::new(RecordingProgress::new());
        let calls = fetcher.calls();
        let pipeline = Arc::new(SingleCrawlPipeline::new(
            Arc::new(fetcher),
            clock.clone(),
            &CrawlerConfig::default(),
            RenderConfig::default(),
        ));
        Harness {
            coordinator: Coordinator::new(pipeline, clock.clone(), progress.clone(), retry),
            clock,
            progress,
            calls,
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_continues_past_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new()
            .page(U1, CONTENT_PAGE)
            .status(U2, 404)
            .page(U3, CONTENT_PAGE);
        let h = harness(fetcher, RetryPolicy::none());

        let result = h
            .coordinator
            .run_batch(&urls(&[U1, U2, U3]), dir.path(), Duration::from_secs(2))
            .await;

        assert_eq!(result.len(), 3);
        let outcomes = result.outcomes();
        assert!(outcomes[0].is_success());
        assert!(!outcomes[1].is_success());
        assert!(outcomes[2].is_success());

        let failure = result.failures().next().unwrap();
        assert_eq!(failure.url, U2);
        assert_eq!(failure.stage, CrawlStage::Fetching);
        assert_eq!(failure.error.kind(), ErrorKind::HttpStatus);

        assert_eq!(*h.calls.lock().unwrap(), urls(&[U1, U2, U3]));
    }

    #[tokio::test]
    async fn test_batch_waits_between_items() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new()
            .page(U1, CONTENT_PAGE)
            .page(U2, CONTENT_PAGE)
            .page(U3, CONTENT_PAGE);
        let h = harness(fetcher, RetryPolicy::none());

        let result = h
            .coordinator
            .run_batch(&urls(&[U1, U2, U3]), dir.path(), Duration::from_secs(2))
            .await;

        assert_eq!(result.succeeded(), 3);
        assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(2); 2]);
        assert!(h.clock.total_slept() >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let dir = TempDir::new().unwrap();
        let h = harness(MockFetcher::new(), RetryPolicy::none());

        let result = h
            .coordinator
            .run_batch(&[], dir.path(), Duration::from_secs(2))
            .await;

        assert!(result.is_empty());
        assert!(h.clock.sleeps().is_empty());
        assert!(h.calls.lock().unwrap().is_empty());
        assert!(h.progress.snapshots().is_empty());
    }

    #[tokio::test]
    async fn test_progress_reported_after_each_item() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().page(U1, CONTENT_PAGE).status(U2, 500);
        let h = harness(fetcher, RetryPolicy::none());

        h.coordinator
            .run_batch(&urls(&[U1, U2]), dir.path(), Duration::ZERO)
            .await;

        let snapshots = h.progress.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            snapshots[0],
            BatchProgress {
                total: 2,
                processed: 1,
                succeeded: 1,
                failed: 0
            }
        );
        assert_eq!(
            snapshots[1],
            BatchProgress {
                total: 2,
                processed: 2,
                succeeded: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().status(U1, 503);
        let h = harness(fetcher, RetryPolicy::default());

        let result = h
            .coordinator
            .run_batch(&urls(&[U1]), dir.path(), Duration::ZERO)
            .await;

        assert_eq!(result.failed(), 1);
        assert_eq!(h.calls.lock().unwrap().len(), 1);
        assert!(h.clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retry_with_exponential_backoff() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().status(U1, 429);
        let retry = RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_secs(5),
        };
        let h = harness(fetcher, retry);

        let result = h
            .coordinator
            .run_batch(&urls(&[U1]), dir.path(), Duration::ZERO)
            .await;

        assert_eq!(result.failed(), 1);
        assert_eq!(h.calls.lock().unwrap().len(), 3);
        assert_eq!(
            h.clock.sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failure() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new()
            .status(U1, 503)
            .page(U1, CONTENT_PAGE);
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        };
        let h = harness(fetcher, retry);

        let result = h
            .coordinator
            .run_batch(&urls(&[U1]), dir.path(), Duration::ZERO)
            .await;

        assert_eq!(result.succeeded(), 1);
        assert_eq!(h.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_content_not_found_is_not_retried() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().page(U1, "<p>no container</p>");
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        };
        let h = harness(fetcher, retry);

        let result = h
            .coordinator
            .run_batch(&urls(&[U1]), dir.path(), Duration::ZERO)
            .await;

        assert_eq!(result.failures().next().unwrap().stage, CrawlStage::Locating);
        assert_eq!(h.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_retryable_classification() {
        let status = |status| {
            CrawlError::Fetch(FetchError::HttpStatus {
                url: U1.to_string(),
                status,
            })
        };

        assert!(RetryPolicy::is_retryable(&status(403)));
        assert!(RetryPolicy::is_retryable(&status(429)));
        assert!(RetryPolicy::is_retryable(&status(502)));
        assert!(!RetryPolicy::is_retryable(&status(404)));
        assert!(!RetryPolicy::is_retryable(&status(203)));
        assert!(RetryPolicy::is_retryable(&CrawlError::Fetch(
            FetchError::Timeout {
                url: U1.to_string()
            }
        )));
        assert!(!RetryPolicy::is_retryable(&CrawlError::Fetch(
            FetchError::Decode {
                url: U1.to_string(),
                message: "bad".to_string()
            }
        )));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 2,
            backoff_seconds: 3,
        });
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff_for(0), Duration::from_secs(3));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(12));
    }
}
