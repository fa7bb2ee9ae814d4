//! Single-URL crawl pipeline
//!
//! Fetching -> Parsing -> Locating -> Extracting -> Rendering -> Exporting.
//! The first failing stage ends the run and is reported in the
//! [`CrawlFailure`]; nothing is written unless every earlier stage succeeded.

use crate::clock::Clock;
use crate::config::{CrawlerConfig, RenderConfig};
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{locate_container, ParsedPage};
use crate::output::{ContentBlock, DocumentExporter, ExportedFile, MarkdownRenderer};
use crate::state::CrawlStage;
use crate::url::parse_target_url;
use crate::CrawlError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Per-call settings that take precedence over the pipeline defaults
#[derive(Debug, Clone, Default)]
pub struct CrawlOverrides {
    /// Content container class to look for instead of the configured one
    pub container_class: Option<String>,

    /// Render options to use instead of the configured ones
    pub render: Option<RenderConfig>,
}

/// Input to one pipeline run
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// Page to crawl, recorded verbatim in the frontmatter
    pub url: String,

    /// Directory the Markdown file is written to
    pub output_dir: PathBuf,

    pub overrides: CrawlOverrides,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.into(),
            overrides: CrawlOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: CrawlOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// A pipeline run that stopped before `Done`
#[derive(Debug, Error)]
#[error("{url} failed while {stage}: {error}")]
pub struct CrawlFailure {
    pub url: String,

    /// Stage that failed
    pub stage: CrawlStage,

    #[source]
    pub error: CrawlError,
}

/// Composes fetch, extraction, rendering and export for one URL
pub struct SingleCrawlPipeline {
    fetcher: Arc<dyn PageFetcher>,
    clock: Arc<dyn Clock>,
    extractor: ContentExtractor,
    renderer: MarkdownRenderer,
    exporter: DocumentExporter,
    container_class: String,
}

impl SingleCrawlPipeline {
    /// Creates a pipeline
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Page download capability
    /// * `clock` - Source of the export timestamp
    /// * `config` - Container class and document title
    /// * `render` - Default Markdown rendering options
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        clock: Arc<dyn Clock>,
        config: &CrawlerConfig,
        render: RenderConfig,
    ) -> Self {
        Self {
            fetcher,
            clock,
            extractor: ContentExtractor::new(),
            renderer: MarkdownRenderer::new(render),
            exporter: DocumentExporter::new(config.document_title.clone()),
            container_class: config.container_class.clone(),
        }
    }

    /// Runs every stage for `target`
    pub async fn run(&self, target: &CrawlTarget) -> Result<ExportedFile, CrawlFailure> {
        let mut run = StageTracker::start(target);

        let url = parse_target_url(&target.url).map_err(|e| run.fail(e.into()))?;
        let page = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| run.fail(e.into()))?;
        if page.final_url != url.as_str() {
            tracing::debug!("{} redirected to {}", target.url, page.final_url);
        }

        let class = target
            .overrides
            .container_class
            .as_deref()
            .unwrap_or(&self.container_class);
        let blocks = self.extract_blocks(&mut run, &page.body, class)?;

        run.advance();
        let renderer = target
            .overrides
            .render
            .map(MarkdownRenderer::new)
            .unwrap_or(self.renderer);
        let body = renderer.render(&blocks);

        run.advance();
        let exported = self
            .exporter
            .export(&body, &target.url, &target.output_dir, self.clock.now())
            .map_err(|e| run.fail(e.into()))?;

        run.advance();
        Ok(exported)
    }

    /// Parsing, Locating and Extracting; the parsed tree never outlives this call
    fn extract_blocks(
        &self,
        run: &mut StageTracker<'_>,
        html: &str,
        class: &str,
    ) -> Result<Vec<ContentBlock>, CrawlFailure> {
        run.advance();
        let page = ParsedPage::parse(html);

        run.advance();
        let container = locate_container(&page.root(), class).ok_or_else(|| {
            run.fail(CrawlError::ContentNotFound {
                url: run.target.url.clone(),
                class: class.to_string(),
            })
        })?;

        run.advance();
        Ok(self.extractor.extract(&container))
    }
}

/// Current stage of one pipeline run
struct StageTracker<'a> {
    target: &'a CrawlTarget,
    stage: CrawlStage,
}

impl<'a> StageTracker<'a> {
    fn start(target: &'a CrawlTarget) -> Self {
        let tracker = Self {
            target,
            stage: CrawlStage::Fetching,
        };
        tracker.log();
        tracker
    }

    /// Moves to the following stage; stays on `Done` once reached
    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            self.stage = next;
            self.log();
        }
    }

    /// Failure at the current stage
    fn fail(&self, error: CrawlError) -> CrawlFailure {
        CrawlFailure {
            url: self.target.url.clone(),
            stage: self.stage,
            error,
        }
    }

    fn log(&self) {
        tracing::debug!("{}: {}", self.stage, self.target.url);
    }
}
