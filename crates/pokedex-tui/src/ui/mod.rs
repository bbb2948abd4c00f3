//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering and layout
//! - `input`: Keyboard event handling
//! - `styles`: Light and dark palettes and text styling
//! - `panels`: Page list, detail card, recent and favorites

pub mod input;
pub mod panels;
pub mod render;
pub mod styles;
