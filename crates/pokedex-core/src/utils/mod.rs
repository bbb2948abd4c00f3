//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{artwork_url, contains_ignore_case, id_from_url, title_case, truncate_string};
