//! # shelfsync Common Library
//!
//! Shared code for the shelfsync services including:
//! - Error taxonomy (upstream fetch, malformed input, comparison)
//! - Configuration model and resolution
//! - Comparison-key normalization

pub mod config;
pub mod error;
pub mod normalize;

pub use error::{Error, Result};
pub use normalize::{normalize, normalize_text, MISSING_PLACEHOLDER};
