//! Glob matching for cache key patterns.
//!
//! Invalidation patterns use `*` to match any run of characters, e.g.
//! `events:featured:*` or `attendees:{id}:page:*`.

/// Checks whether `key` matches a glob `pattern` where `*` matches any
/// (possibly empty) run of characters.
///
/// # Examples
///
/// ```
/// use gather_core::cache::pattern_matches;
///
/// assert!(pattern_matches("events:featured:*", "events:featured:2"));
/// assert!(pattern_matches("events:filter:*", "events:filter:public:page:1"));
/// assert!(!pattern_matches("events:featured:*", "event:abc"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    match_bytes(pattern.as_bytes(), key.as_bytes())
}

fn match_bytes(pattern: &[u8], key: &[u8]) -> bool {
    match (pattern.split_first(), key.split_first()) {
        (None, None) => true,
        (None, Some(_)) => false,
        // A star matches zero or more characters: try every split point.
        (Some((b'*', rest)), _) => (0..=key.len()).any(|skip| match_bytes(rest, &key[skip..])),
        (Some((pc, prest)), Some((kc, krest))) => pc == kc && match_bytes(prest, krest),
        (Some(_), None) => false,
    }
}
