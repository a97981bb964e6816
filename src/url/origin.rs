use url::Url;

/// Extracts the lowercase host of a URL
///
/// Returns `None` for URLs without a host (`mailto:`, `data:`, ...).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use plainsight::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Builds the key used for same-origin comparisons
///
/// The key is the lowercase host with a leading `www.` removed, followed by
/// `:port` when the URL carries a non-default port.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use plainsight::url::origin_key;
///
/// let url = Url::parse("https://www.Example.com/page").unwrap();
/// assert_eq!(origin_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(origin_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn origin_key(url: &Url) -> Option<String> {
    let host = extract_host(url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host);

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Returns true when both URLs belong to the same site
///
/// Two URLs are the same origin when their hosts match once a leading `www.`
/// is stripped from each. The scheme is not part of the comparison.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    origin_key(a) == origin_key(b)
}
