//! URL handling module for Legaldoc-Crawler
//!
//! This module provides target URL validation, source-domain extraction and
//! the filename slug derived from a URL path.

mod domain;
mod slug;

pub use domain::{extract_domain, source_domain};
pub use slug::{filename_slug, FALLBACK_SLUG};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a crawl target URL
///
/// Only absolute `http` and `https` URLs with a host are accepted.
///
/// # Examples
///
/// ```
/// use legaldoc_crawler::url::parse_target_url;
///
/// assert!(parse_target_url("https://thuvienphapluat.vn/van-ban/abc.aspx").is_ok());
/// assert!(parse_target_url("ftp://example.com/file").is_err());
/// assert!(parse_target_url("not a url").is_err());
/// ```
pub fn parse_target_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
