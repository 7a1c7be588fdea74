//! Postcode cleaning and normalization.
//!
//! Postcodes arrive in many shapes: `"tv1 2ab"`, `"TV12AB"`, `" TV1  2AB "`.
//! This module normalizes them into the canonical uppercase single-space
//! form used as the cache key and sent to providers.

use regex::Regex;
use std::sync::LazyLock;

/// Regex for plausible UK-style postcodes in compact (no-space) form.
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]?[0-9][A-Z]{2}$").expect("valid regex")
});

/// Normalizes a raw postcode into canonical `OUTWARD INWARD` form.
///
/// Uppercases, strips all whitespace, then re-inserts the single space
/// before the three-character inward code. Inputs too short to carry an
/// inward code are returned compacted as-is.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let compact = compact(raw);
    if compact.len() > 3 {
        let (outward, inward) = compact.split_at(compact.len() - 3);
        format!("{outward} {inward}")
    } else {
        compact
    }
}

/// Uppercases and strips all whitespace from a postcode.
#[must_use]
pub fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Returns `true` when the input looks like a UK-style postcode.
///
/// This is a plausibility check, not validation — the geocoding provider
/// is the authority on whether a postcode exists.
#[must_use]
pub fn is_plausible(raw: &str) -> bool {
    POSTCODE_RE.is_match(&compact(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize("tv1 2ab"), "TV1 2AB");
        assert_eq!(normalize("TV12AB"), "TV1 2AB");
        assert_eq!(normalize("  sw1a  1aa "), "SW1A 1AA");
    }

    #[test]
    fn short_inputs_pass_through_compacted() {
        assert_eq!(normalize("tv1"), "TV1");
    }

    #[test]
    fn plausibility_check() {
        assert!(is_plausible("TV1 2AB"));
        assert!(is_plausible("sw1a1aa"));
        assert!(!is_plausible("NOT A POSTCODE"));
        assert!(!is_plausible(""));
    }
}
