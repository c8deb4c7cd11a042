//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, status bar and help overlay
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `tabs`: per-screen content (dashboard, matches)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
