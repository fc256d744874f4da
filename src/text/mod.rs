//! Page text with OCR fallback.

pub mod provider;

pub use provider::{non_whitespace_chars, PageTextProvider};
