use url::Url;

/// Slug used when a URL has no usable path segment
pub const FALLBACK_SLUG: &str = "index";

/// Derives the filename stem from the last non-empty path segment
///
/// The final extension (such as `.aspx`) is dropped and any character that
/// is unsafe in a filename is replaced with `_`. Segments keep their
/// percent-encoding so the slug stays ASCII.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use legaldoc_crawler::url::filename_slug;
///
/// let url = Url::parse("https://thuvienphapluat.vn/van-ban/Luat-Dat-dai-2024-31-2024-QH15.aspx").unwrap();
/// assert_eq!(filename_slug(&url), "Luat-Dat-dai-2024-31-2024-QH15");
/// ```
pub fn filename_slug(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    let stem = match segment.rfind('.') {
        Some(idx) if idx > 0 => &segment[..idx],
        _ => segment,
    };

    let slug: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '%') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
