//! Output module for rendering and exporting documents
//!
//! This module handles:
//! - The content block and document data model
//! - Rendering blocks to Markdown
//! - Writing documents with frontmatter to disk
//! - Batch progress and summary reporting

mod exporter;
mod markdown;
pub mod stats;
mod types;

pub use exporter::{export_filename, DocumentExporter, CRAWLED_AT_FORMAT, FILENAME_TIMESTAMP_FORMAT};
pub use markdown::{escape_markdown, MarkdownRenderer};
pub use stats::{
    format_batch_summary, print_batch_summary, BatchProgress, ProgressReporter, RecordingProgress,
    TracingProgress,
};
pub use types::{
    ContentBlock, ExportError, ExportResult, ExportedFile, Frontmatter, MarkdownDocument,
};
