//! Legaldoc-Crawler: legal document pages to portable Markdown
//!
//! This crate fetches legal-document web pages, isolates the article body
//! held in the site's content container, and exports it as a Markdown file
//! with provenance frontmatter. Batches of URLs are crawled strictly in
//! order with a delay between requests.

pub mod clock;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for a single crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Content container div.{class} not found at {url}")]
    ContentNotFound { url: String, class: String },

    #[error(transparent)]
    Export(#[from] output::ExportError),
}

impl CrawlError {
    /// Returns the taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::Fetch(e) => e.kind(),
            Self::ContentNotFound { .. } => ErrorKind::ContentNotFound,
            Self::Export(_) => ErrorKind::Export,
        }
    }
}

/// Coarse classification of crawl failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// DNS, connection or timeout failure
    Network,
    /// Response arrived with a status other than 200
    HttpStatus,
    /// Response body could not be decoded to text
    Decode,
    /// The content container was absent from the page
    ContentNotFound,
    /// Filesystem failure while exporting
    Export,
    /// The target URL was rejected before any request
    InvalidUrl,
}

/// Fetch-specific errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode body of {url}: {message}")]
    Decode { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Returns the taxonomy bucket this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Client(_) => ErrorKind::Network,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns the HTTP status code, if the failure was a status error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchResult, CrawlFailure, CrawlTarget, Crawler, ItemOutcome};
pub use output::{ContentBlock, ExportedFile};
pub use state::CrawlStage;
