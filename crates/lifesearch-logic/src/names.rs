//! Planet name normalization.
//!
//! All lookups (catalogs, overrides, weight store) key on the normalized
//! form so that `"Kepler-22 b"`, `"kepler 22b"` and `"KEPLER22B"` match.

/// Lowercase and keep only alphanumeric characters.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
