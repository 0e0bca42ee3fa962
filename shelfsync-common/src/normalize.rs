//! Comparison-key normalization
//!
//! A normalized key is the textual form of a value with leading/trailing
//! whitespace stripped and every character lower-cased. Normalization is
//! total: a missing value becomes [`MISSING_PLACEHOLDER`].
//!
//! Known quirk: every missing value maps to the same placeholder, so two
//! missing names compare equal to each other (and to a literal `"None"` cell).
//! This is kept as observable behavior; see the tests below.

/// Text a missing value is coerced to before normalization
pub const MISSING_PLACEHOLDER: &str = "none";

/// Normalize an optional value into a comparison key
pub fn normalize(value: Option<&str>) -> String {
    normalize_text(value.unwrap_or(MISSING_PLACEHOLDER))
}

/// Normalize present text into a comparison key
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
