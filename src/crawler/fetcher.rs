//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Error classification (network, timeout, status, decode)
//! - Body decoding with a charset fallback for non-UTF-8 pages
//!
//! No retries happen here. Retrying is an opt-in policy of the batch
//! coordinator.

use crate::config::CrawlerConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// How many leading bytes are scanned for a `<meta charset>` declaration
const META_SNIFF_LIMIT: usize = 2048;

/// A page fetched with HTTP 200
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code (always 200)
    pub status_code: u16,

    /// Decoded page body
    pub body: String,
}

/// Result of a fetch operation
pub type FetchOutcome = Result<FetchedPage, FetchError>;

/// Capability to download one page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchOutcome;
}

/// `PageFetcher` backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.timeout_seconds),
        )?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchOutcome {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Value of the `User-Agent` header
/// * `timeout` - Whole-request timeout, body download included
///
/// # Example
///
/// ```no_run
/// use legaldoc_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("Mozilla/5.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies any failure
///
/// # Failure Mapping
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout (connect or body) | `FetchError::Timeout` |
/// | DNS / connection refused / TLS | `FetchError::Network` |
/// | Any status other than 200 | `FetchError::HttpStatus` |
/// | Body not decodable as text | `FetchError::Decode` |
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    let body = decode_body(&bytes, content_type.as_deref(), url)?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: format!("Connection failed: {}", error),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Decodes a response body to text
///
/// UTF-8 is tried first. If the bytes are not valid UTF-8, the charset from
/// the `Content-Type` header is tried, then a `<meta charset>` found near the
/// start of the document. A header label that is unknown, names UTF-8 or
/// does not decode the body falls through to the meta declaration.
/// Decoding never substitutes replacement characters: when no declared
/// charset decodes cleanly the result is a `FetchError::Decode`.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>, url: &Url) -> Result<String, FetchError> {
    let utf8_error = match std::str::from_utf8(bytes) {
        Ok(text) => return Ok(text.to_string()),
        Err(e) => e,
    };

    let declared = [
        content_type.and_then(charset_from_content_type),
        sniff_meta_charset(bytes),
    ];

    let mut reasons = vec![utf8_error.to_string()];
    for label in declared.into_iter().flatten() {
        match decode_with_label(bytes, &label) {
            Ok(text) => return Ok(text),
            Err(reason) => reasons.push(reason),
        }
    }

    if reasons.len() == 1 {
        reasons.push("no charset declared".to_string());
    }

    Err(FetchError::Decode {
        url: url.to_string(),
        message: reasons.join("; "),
    })
}

fn decode_with_label(bytes: &[u8], label: &str) -> Result<String, String> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| format!("unknown charset '{}'", label))?;

    if encoding == encoding_rs::UTF_8 {
        return Err(format!("declared charset '{}' does not match the body", label));
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| format!("malformed {} content", encoding.name()))
}

/// Extracts the `charset` parameter of a Content-Type header value
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

/// Looks for `charset=...` in the first bytes of an HTML document
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let lower = head.to_ascii_lowercase();
    let needle = b"charset=";

    let start = lower.windows(needle.len()).position(|w| w == &needle[..])? + needle.len();
    let label: String = lower[start..]
        .iter()
        .skip_while(|b| **b == b'"' || **b == b'\'')
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(**b, b'-' | b'_' | b'.' | b':'))
        .map(|b| *b as char)
        .collect();

    (!label.is_empty()).then_some(label)
}
