use crate::url::normalize::canonicalize;
use crate::url::origin::same_origin;
use url::{ParseError, Url};

/// Outcome of inspecting an embedded resource reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceClass {
    /// Absolute URL fetched over a non-encrypted transport
    Insecure(String),
    /// Relative, protocol-relative, HTTPS, hostless or unparsable
    Skip,
}

/// Outcome of inspecting an `<a href>` value against the page it appears on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// Same-page fragment (`#top`)
    Anchor,
    /// Points at another site
    External,
    /// Same-site page to crawl, absolute and normalized
    Internal(String),
    /// The value or the base could not be parsed
    Unparsable,
}

/// Classifies the URL of an embedded resource (`img`, `iframe`, `object`)
///
/// # Rules
///
/// | Value | Result |
/// |-------|--------|
/// | `//host/path` (protocol-relative) | Skip |
/// | relative (`/x.png`, `x.png`) | Skip |
/// | scheme `https` | Skip |
/// | absolute without host (`data:`) | Skip |
/// | unparsable | Skip |
/// | anything else (`http://host/x.png`) | Insecure |
///
/// # Examples
///
/// ```
/// use plainsight::url::{classify_resource, ResourceClass};
///
/// assert_eq!(
///     classify_resource("http://a.com/x.png"),
///     ResourceClass::Insecure("http://a.com/x.png".to_string())
/// );
/// assert_eq!(classify_resource("https://a.com/x.png"), ResourceClass::Skip);
/// assert_eq!(classify_resource("//a.com/x.png"), ResourceClass::Skip);
/// ```
pub fn classify_resource(value: &str) -> ResourceClass {
    let value = value.trim();

    // Inherits the embedding page's scheme
    if value.starts_with("//") {
        return ResourceClass::Skip;
    }

    match Url::parse(value) {
        Ok(url) if url.scheme() == "https" => ResourceClass::Skip,
        Ok(url) if url.host_str().is_none() => ResourceClass::Skip,
        Ok(url) => ResourceClass::Insecure(url.to_string()),
        Err(_) => ResourceClass::Skip,
    }
}

/// Classifies an `<a href>` value found on the page at `base`
///
/// Parses `base` first; if it cannot be parsed the link is `Unparsable`.
/// See [`classify_link_against`] for the rules.
///
/// # Examples
///
/// ```
/// use plainsight::url::{classify_link, LinkClass};
///
/// let base = "https://example.com/dir/page";
/// assert_eq!(
///     classify_link("/about", base),
///     LinkClass::Internal("https://example.com/about".to_string())
/// );
/// assert_eq!(classify_link("#top", base), LinkClass::Anchor);
/// assert_eq!(classify_link("https://other.com/x", base), LinkClass::External);
/// ```
pub fn classify_link(value: &str, base: &str) -> LinkClass {
    if value.trim().starts_with('#') {
        return LinkClass::Anchor;
    }

    match Url::parse(base) {
        Ok(base) => classify_link_against(value, &base),
        Err(e) => {
            tracing::trace!("Unparsable base URL {}: {}", base, e);
            LinkClass::Unparsable
        }
    }
}

/// Classifies an `<a href>` value against an already parsed base URL
///
/// Rules, in order:
///
/// 1. A value starting with `#` is an `Anchor`.
/// 2. An absolute or protocol-relative value is `Internal` when it is the same
///    origin as `base` (a leading `www.` is ignored on both sides) and
///    `External` otherwise. Absolute values keep their own scheme.
/// 3. Anything else is resolved against `base` and is `Internal`.
///
/// Internal URLs have trailing slashes stripped.
pub fn classify_link_against(value: &str, base: &Url) -> LinkClass {
    let value = value.trim();

    if value.starts_with('#') {
        return LinkClass::Anchor;
    }

    if value.starts_with("//") {
        return match base.join(value) {
            Ok(url) => scope(&url, base),
            Err(_) => LinkClass::Unparsable,
        };
    }

    match Url::parse(value) {
        Ok(url) => scope(&url, base),
        Err(ParseError::RelativeUrlWithoutBase) => match base.join(value) {
            Ok(url) => LinkClass::Internal(canonicalize(&url)),
            Err(_) => LinkClass::Unparsable,
        },
        Err(_) => LinkClass::Unparsable,
    }
}

fn scope(url: &Url, base: &Url) -> LinkClass {
    if same_origin(url, base) {
        LinkClass::Internal(canonicalize(url))
    } else {
        LinkClass::External
    }
}
