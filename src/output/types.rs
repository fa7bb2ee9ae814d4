//! Output data types
//!
//! Blocks produced by the extractor, the Markdown document assembled from
//! them, and the record of an exported file.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exporting a document
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Permission denied writing {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Disk full while writing {}", .path.display())]
    DiskFull { path: PathBuf },

    #[error("Refusing to overwrite existing file {}", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive export metadata from URL: {0}")]
    InvalidUrl(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// One semantic unit of page content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// `h1`..`h6`; level is always within 1..=6
    Heading { level: u8, text: String },

    /// A non-empty `p`
    Paragraph(String),

    /// An `li`; `ordered` is true when the nearest list ancestor is `ol`
    ///
    /// `list` is the document-order index of that list element, so items of
    /// adjacent or nested lists can be told apart.
    ListItem {
        ordered: bool,
        list: usize,
        text: String,
    },

    /// Stray text not wrapped in a recognized tag
    PlainText(String),
}

impl ContentBlock {
    /// The block's normalized text
    pub fn text(&self) -> &str {
        match self {
            Self::Heading { text, .. } => text,
            Self::Paragraph(text) => text,
            Self::ListItem { text, .. } => text,
            Self::PlainText(text) => text,
        }
    }
}

/// Provenance header written above the Markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: String,
    /// Source URL exactly as given by the caller
    pub url: String,
    /// Local timestamp, `YYYY-MM-DD HH:MM:SS`
    pub crawled_at: String,
    pub source: String,
}

impl Frontmatter {
    /// Renders the frontmatter block, including both `---` fences
    pub fn render(&self) -> String {
        format!(
            "---\ntitle: \"{}\"\nurl: {}\ncrawled_at: {}\nsource: {}\n---\n",
            escape_quoted(&self.title),
            self.url,
            self.crawled_at,
            self.source
        )
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A complete document ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl MarkdownDocument {
    /// Full file contents: frontmatter, one blank line, then the body
    pub fn to_file_contents(&self) -> String {
        let mut out = self.frontmatter.render();
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

/// A file written by the exporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub byte_size: u64,
}
