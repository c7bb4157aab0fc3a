//! Map annotation widget: pins, circles and freehand polygons over an
//! image map.
//!
//! The [`annotator::Annotator`] turns host pointer and keyboard events into
//! annotations drawn on a [`surface::MapSurface`], and reports the full
//! annotation set after every change. A Cairo raster surface is included
//! for headless rendering.

pub mod annotation;
pub mod annotator;
pub mod config;
pub mod draw;
pub mod geo;
pub mod input;
pub mod script;
pub mod surface;

pub use config::Config;
