//! Listing address recognition and rewriting.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::{JSON_LIST_PATH, SCRIPT_CALLBACK_SUFFIX};

/// Regex for addresses that belong to the feed: `http(s)://talks.ox.ac.uk/show/...`.
static LISTING_ADDRESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(http|https)://talks\.ox\.ac\.uk/show/").expect("Invalid listing address regex")
});

/// Regex for the `show/<anything>/` path segment replaced by the JSON listing.
///
/// Greedy, so everything up to the last `/` is replaced.
static SHOW_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"://talks\.ox\.ac\.uk/show/.+/").expect("Invalid show path regex")
});

/// Returns true if `address` is a feed address (any format: HTML, JSON, ...).
pub fn is_listing_address(address: &str) -> bool {
    LISTING_ADDRESS_REGEX.is_match(address)
}

/// Returns true if [`rewrite_address`] would replace a path segment of `address`.
pub fn has_show_path(address: &str) -> bool {
    SHOW_PATH_REGEX.is_match(address)
}

/// Rewrites a feed address into its script-callback JSON listing address.
///
/// The scheme is preserved and `?callback=?` is appended. Addresses without
/// the expected `show/<path>/` segment only get the suffix.
pub fn rewrite_address(address: &str) -> String {
    let rewritten = SHOW_PATH_REGEX.replace(address, NoExpand(JSON_LIST_PATH));
    format!("{rewritten}{SCRIPT_CALLBACK_SUFFIX}")
}
