//! Path utilities for the local media cache.
//!
//! File names come from the authority and are used as on-disk cache keys, so
//! they must be plain names that cannot escape the cache directory.

use std::path::Path;

/// Suffix of in-progress downloads.
const PARTIAL_SUFFIX: &str = ".part";

/// Check whether a name received from the authority is usable as a cache key.
///
/// Rejects empty names, hidden names, path separators, and parent references.
///
/// # Examples
///
/// ```
/// use signage_common::paths::is_safe_cache_name;
///
/// assert!(is_safe_cache_name("lobby_loop.mp4"));
/// assert!(!is_safe_cache_name("../etc/passwd"));
/// assert!(!is_safe_cache_name(".hidden.mp4"));
/// ```
pub fn is_safe_cache_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && name != ".."
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Name of the temporary file a download is streamed into.
///
/// ```
/// use signage_common::paths::partial_name;
///
/// assert_eq!(partial_name("a.mp4"), ".a.mp4.part");
/// ```
pub fn partial_name(name: &str) -> String {
    format!(".{name}{PARTIAL_SUFFIX}")
}

/// Check whether a cache entry is a leftover in-progress download.
pub fn is_partial_download(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX)
}
