//! Content panels for the main area.

pub mod detail;
pub mod list;
pub mod sidebar;
