//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{contains_ignore_case, format_currency, format_discount, format_timestamp, truncate};
