use serde::Deserialize;

/// Browser identity sent with every request unless configured otherwise
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Class token of the element holding the article body
pub const DEFAULT_CONTAINER_CLASS: &str = "content1";

/// Title written into every frontmatter block
pub const DEFAULT_DOCUMENT_TITLE: &str = "Nội dung từ thuvienphapluat.vn";

/// Directory exported files land in when none is given
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "../processed/";

/// Main configuration structure for Legaldoc-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    pub render: RenderConfig,
    pub retry: RetryConfig,
    /// URLs to crawl, in order
    pub urls: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Pause between consecutive batch items (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: u64,

    /// Class token identifying the content `div`
    #[serde(rename = "container-class")]
    pub container_class: String,

    /// Title written into the frontmatter
    #[serde(rename = "document-title")]
    pub document_title: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
            delay_seconds: 2,
            container_class: DEFAULT_CONTAINER_CLASS.to_string(),
            document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory exported Markdown files are written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIRECTORY.to_string(),
        }
    }
}

/// Markdown rendering switches
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Backslash-escape Markdown metacharacters in extracted text
    #[serde(rename = "escape-markdown")]
    pub escape_markdown: bool,

    /// Number ordered list items 1, 2, 3... instead of all `1.`
    #[serde(rename = "number-ordered-lists")]
    pub number_ordered_lists: bool,
}

/// Opt-in retry policy applied around each batch item
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first failure (0 disables retrying)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base backoff, doubled after every failed attempt (seconds)
    #[serde(rename = "backoff-seconds")]
    pub backoff_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff_seconds: 5,
        }
    }
}
