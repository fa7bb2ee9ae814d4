/// Stage definitions for a single crawl run
use std::fmt;

/// Represents the stage a single crawl is in
///
/// Stages are visited strictly in declaration order. There is no
/// backtracking: a run either reaches `Done` or stops at the stage that
/// failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CrawlStage {
    /// Downloading the page
    Fetching,

    /// Building the document tree
    Parsing,

    /// Finding the content container
    Locating,

    /// Walking the container into content blocks
    Extracting,

    /// Turning blocks into Markdown
    Rendering,

    /// Writing the Markdown file
    Exporting,

    /// File written
    Done,
}

impl CrawlStage {
    /// Returns the stage that follows this one, or None for `Done`
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Fetching => Some(Self::Parsing),
            Self::Parsing => Some(Self::Locating),
            Self::Locating => Some(Self::Extracting),
            Self::Extracting => Some(Self::Rendering),
            Self::Rendering => Some(Self::Exporting),
            Self::Exporting => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Stable lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Locating => "locating",
            Self::Extracting => "extracting",
            Self::Rendering => "rendering",
            Self::Exporting => "exporting",
            Self::Done => "done",
        }
    }

}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
