//! Rendering primitives (Cairo-based).
//!
//! This module defines the drawing types used by the raster map surface:
//! - [`Color`]: RGBA color representation with named color lookup
//! - Rendering functions for overlays, markers, circles and polylines

pub mod color;
pub mod render;

// Re-export commonly used types at module level
pub use color::Color;
pub use render::{
    render_background, render_circle, render_image, render_marker, render_polyline,
    render_popup_label,
};
