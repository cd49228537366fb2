//! Glob matching for cache key patterns.
//!
//! Used by the diagnostic `list_keys` surface and the in-process backend.
//! `*` matches any sequence of characters, including the empty one.

/// Checks whether a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use storefront_core::cache::pattern_matches;
///
/// assert!(pattern_matches("product:7", "product:7"));
/// assert!(pattern_matches("products:*", "products:category:3"));
/// assert!(pattern_matches("*", "anything"));
/// assert!(!pattern_matches("user:*", "product:7"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        // No wildcard left: exact match required.
        None => pattern == key,
        Some((literal, rest)) => {
            if !key.starts_with(literal) {
                return false;
            }
            let key = &key[literal.len()..];
            if rest.is_empty() {
                // Trailing wildcard swallows the remainder.
                return true;
            }
            (0..=key.len())
                .filter(|&i| key.is_char_boundary(i))
                .any(|i| pattern_matches(rest, &key[i..]))
        }
    }
}
