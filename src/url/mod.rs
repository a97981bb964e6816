//! URL handling module for Plainsight
//!
//! This module decides what an attribute value found on a page means to the
//! crawler: an insecure resource, a same-site link to follow, an external link,
//! or noise. It also owns the normalized form URLs take inside the crawler
//! (absolute, no trailing slash) and the `www.`-insensitive origin rule.
//!
//! Everything here is a pure function of its inputs.

mod classify;
mod normalize;
mod origin;

// Re-export main functions
pub use classify::{
    classify_link, classify_link_against, classify_resource, LinkClass, ResourceClass,
};
pub use normalize::{canonicalize, normalize_seed, strip_trailing_slash};
pub use origin::{extract_host, origin_key, same_origin};
