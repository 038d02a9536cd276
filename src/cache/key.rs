//! Stable request keys shared by both cache tiers.
//!
//! The durable tier lives in an external store that outlives this process,
//! so keys must be stable across processes and restarts — the standard
//! library's `DefaultHasher` is seeded per process and is not. Keys are a
//! seahash of a canonical string built from the operation name and its
//! normalized parameters.
//!
//! Normalization trims and lowercases parameter values so semantically
//! identical requests collide: `"123 Main St "` and `"123 main st"`
//! describe the same property and must hit the same cache entry.

use std::fmt;

/// Stable cache key for one logical request.
///
/// The same operation and parameters always produce the same key,
/// regardless of caller, process, parameter order, or the case and
/// surrounding whitespace of parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from an operation name and `(name, value)` parameters.
    pub fn new(operation: &str, params: &[(&str, &str)]) -> Self {
        let mut normalized: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_lowercase()))
            .collect();
        normalized.sort();

        let mut canonical = String::from(operation);
        for (name, value) in &normalized {
            canonical.push('\u{1f}');
            canonical.push_str(name);
            canonical.push('=');
            canonical.push_str(value);
        }

        Self(format!(
            "{operation}:{:016x}",
            seahash::hash(canonical.as_bytes())
        ))
    }

    /// The key as a string slice — the form both cache tiers store under.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
