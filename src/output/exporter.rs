//! Document export
//!
//! Wraps a rendered Markdown body in frontmatter and writes it to
//! `<slug>_<YYYYMMDD_HHMMSS>.md` inside the output directory.
//!
//! Files are written to a temporary file in the output directory first and
//! then persisted without overwriting, so a reader never observes a partial
//! document and an earlier export is never replaced.

use crate::output::types::{ExportError, ExportResult, ExportedFile, Frontmatter, MarkdownDocument};
use crate::url::{filename_slug, source_domain};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

/// Format of the `crawled_at` frontmatter field
pub const CRAWLED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the timestamp embedded in filenames
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Builds frontmatter and writes documents to disk
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    title: String,
}

impl DocumentExporter {
    /// Creates an exporter that stamps `title` into every frontmatter block
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Assembles the document for `source_url` crawled at `crawled_at`
    pub fn build_document(
        &self,
        body: &str,
        source_url: &str,
        crawled_at: NaiveDateTime,
    ) -> ExportResult<MarkdownDocument> {
        let url = parse_source(source_url)?;
        let source = source_domain(&url)
            .ok_or_else(|| ExportError::InvalidUrl(format!("{} has no host", source_url)))?;

        Ok(MarkdownDocument {
            frontmatter: Frontmatter {
                title: self.title.clone(),
                url: source_url.to_string(),
                crawled_at: crawled_at.format(CRAWLED_AT_FORMAT).to_string(),
                source,
            },
            body: body.to_string(),
        })
    }

    /// Writes `body` with frontmatter into `output_dir`
    ///
    /// # Arguments
    ///
    /// * `body` - Rendered Markdown body
    /// * `source_url` - The crawled URL, recorded verbatim
    /// * `output_dir` - Target directory, created if absent
    /// * `crawled_at` - Timestamp used for both frontmatter and filename
    ///
    /// # Returns
    ///
    /// * `Ok(ExportedFile)` - Path and size of the new file
    /// * `Err(ExportError)` - Nothing was left behind in `output_dir`
    pub fn export(
        &self,
        body: &str,
        source_url: &str,
        output_dir: &Path,
        crawled_at: NaiveDateTime,
    ) -> ExportResult<ExportedFile> {
        let document = self.build_document(body, source_url, crawled_at)?;
        let url = parse_source(source_url)?;
        let path = output_dir.join(export_filename(&url, crawled_at));

        std::fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        if path.exists() {
            return Err(ExportError::AlreadyExists { path });
        }

        let contents = document.to_file_contents();
        write_new_file(&path, output_dir, contents.as_bytes())?;

        tracing::debug!("Exported {} bytes to {}", contents.len(), path.display());

        Ok(ExportedFile {
            path,
            byte_size: contents.len() as u64,
        })
    }
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_DOCUMENT_TITLE)
    }
}

/// Derives `<slug>_<YYYYMMDD_HHMMSS>.md` for a URL and timestamp
pub fn export_filename(url: &Url, crawled_at: NaiveDateTime) -> String {
    format!(
        "{}_{}.md",
        filename_slug(url),
        crawled_at.format(FILENAME_TIMESTAMP_FORMAT)
    )
}

fn parse_source(source_url: &str) -> ExportResult<Url> {
    Url::parse(source_url).map_err(|e| ExportError::InvalidUrl(format!("{}: {}", source_url, e)))
}

fn write_new_file(path: &Path, dir: &Path, bytes: &[u8]) -> ExportResult<()> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| classify_io(e, path))?;
    tmp.write_all(bytes).map_err(|e| classify_io(e, path))?;
    tmp.as_file().sync_all().map_err(|e| classify_io(e, path))?;

    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            ExportError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            classify_io(e.error, path)
        }
    })?;

    Ok(())
}

fn classify_io(error: std::io::Error, path: &Path) -> ExportError {
    let path: PathBuf = path.to_path_buf();
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        ExportError::PermissionDenied { path }
    } else if is_disk_full(&error) {
        ExportError::DiskFull { path }
    } else {
        ExportError::Io {
            path,
            source: error,
        }
    }
}

#[cfg(unix)]
fn is_disk_full(error: &std::io::Error) -> bool {
    // ENOSPC, EDQUOT
    matches!(error.raw_os_error(), Some(28) | Some(122))
}

#[cfg(windows)]
fn is_disk_full(error: &std::io::Error) -> bool {
    // ERROR_HANDLE_DISK_FULL, ERROR_DISK_FULL
    matches!(error.raw_os_error(), Some(39) | Some(112))
}

#[cfg(not(any(unix, windows)))]
fn is_disk_full(_error: &std::io::Error) -> bool {
    false
}
