use crate::{UrlError, UrlResult};
use url::Url;

/// Removes trailing slashes from a URL string
///
/// Every trailing slash goes, not just the last one, so `a//` and `a/`
/// normalize alike and applying this twice gives the same result as once.
///
/// # Examples
///
/// ```
/// use plainsight::url::strip_trailing_slash;
///
/// assert_eq!(strip_trailing_slash("https://example.com/"), "https://example.com");
/// assert_eq!(strip_trailing_slash("https://example.com/a"), "https://example.com/a");
/// ```
pub fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Renders a parsed URL in the crawler's normalized form
///
/// This is the serialization produced by the `url` crate (lowercase scheme and
/// host, default port dropped) with trailing slashes removed.
pub fn canonicalize(url: &Url) -> String {
    strip_trailing_slash(url.as_str()).to_string()
}

/// Normalizes the seed URL handed to the crawler
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Parse the URL; reject if malformed or relative
/// 3. Require an `http` or `https` scheme
/// 4. Require a host
/// 5. Strip trailing slashes
///
/// # Examples
///
/// ```
/// use plainsight::url::normalize_seed;
///
/// let seed = normalize_seed("https://Example.com/").unwrap();
/// assert_eq!(seed, "https://example.com");
/// ```
pub fn normalize_seed(raw: &str) -> UrlResult<String> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS seeds are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(canonicalize(&url))
}
