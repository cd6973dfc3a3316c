//! Generators for unique test data.
//!
//! Display names must be unique across every registered player of a server,
//! so tests that share a directory should never hard-code them.

use ulid::Ulid;

/// Generate a unique display name with the given prefix.
///
/// ```
/// use backend_test_support::unique_helpers::unique_name;
///
/// let a = unique_name("alice");
/// let b = unique_name("alice");
/// assert_ne!(a, b);
/// assert!(a.starts_with("alice-"));
/// ```
pub fn unique_name(prefix: &str) -> String {
    let ulid = Ulid::new().to_string();
    // The random tail is enough to keep names apart and short enough to read in logs.
    format!("{}-{}", prefix, &ulid[ulid.len() - 8..])
}

/// Generate `count` distinct display names sharing a prefix.
pub fn unique_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| unique_name(&format!("{prefix}{i}")))
        .collect()
}
