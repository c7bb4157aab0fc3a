//! Rendering surface abstraction.
//!
//! The annotator never draws by itself: it asks a [`MapSurface`] to add and
//! remove layers and to toggle its pan/zoom interactions. Surfaces are
//! created asynchronously through a [`SurfaceLoader`], mirroring map
//! libraries that are loaded on demand.

pub mod raster;

pub use raster::{LayerId, RasterLayer, RasterLoader, RasterSurface};

use crate::config::Config;
use crate::draw::Color;
use crate::geo::{ImageRef, LatLng, View};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors raised while loading or rendering a surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to load map surface: {0}")]
    Load(String),

    #[error("Failed to read image data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render map surface: {0}")]
    Render(String),
}

/// Options a surface is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Viewport size in pixels (width, height)
    pub viewport: (u32, u32),
    /// Whether drag-panning starts enabled
    pub dragging: bool,
    /// Whether wheel zooming starts enabled
    pub scroll_zoom: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            min_zoom: -2.0,
            max_zoom: 5.0,
            viewport: (1280, 800),
            dragging: false,
            scroll_zoom: false,
        }
    }
}

impl SurfaceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_zoom: config.view.min_zoom,
            max_zoom: config.view.max_zoom,
            viewport: (config.view.viewport_width, config.view.viewport_height),
            dragging: false,
            scroll_zoom: false,
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Appearance of pin markers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Icon image; the raster surface draws it when PNG data is registered
    /// under this url and falls back to a pin shape in `color` otherwise
    pub icon_url: String,
    /// Icon size in pixels (width, height)
    pub icon_size: [f64; 2],
    /// Point of the icon placed on the marker location
    pub icon_anchor: [f64; 2],
    /// Offset of the popup label relative to the icon anchor
    pub popup_anchor: [f64; 2],
    pub color: Color,
}

/// Appearance of circles.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleStyle {
    /// Radius in map units
    pub radius: f64,
    pub color: Color,
    pub fill_color: Color,
    pub weight: f64,
}

/// Appearance of polylines (committed polygons and live traces).
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub color: Color,
    pub fill_color: Color,
    pub weight: f64,
}

/// Styles for every layer kind the annotator creates.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyles {
    pub marker: MarkerStyle,
    pub circle: CircleStyle,
    pub path: PathStyle,
}

impl LayerStyles {
    pub fn from_config(config: &Config) -> Self {
        Self {
            marker: MarkerStyle {
                icon_url: config.marker.icon_url.clone(),
                icon_size: config.marker.icon_size,
                icon_anchor: config.marker.icon_anchor,
                popup_anchor: config.marker.popup_anchor,
                color: config.marker.color.to_color(),
            },
            circle: CircleStyle {
                radius: config.circle.radius,
                color: config.circle.color.to_color(),
                fill_color: config.circle.fill_color.to_color(),
                weight: config.path.weight,
            },
            path: PathStyle {
                color: config.path.color.to_color(),
                fill_color: config.path.fill_color.to_color(),
                weight: config.path.weight,
            },
        }
    }
}

impl Default for LayerStyles {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A map rendering surface the annotator draws through.
///
/// Layers are identified by opaque handles; removing a handle that is not
/// on the surface is a no-op.
pub trait MapSurface {
    /// Handle of a layer placed on this surface.
    type Layer: Clone + PartialEq + fmt::Debug;

    /// Moves the camera. Zoom is clamped to the surface's zoom bounds.
    fn set_view(&mut self, center: LatLng, zoom: f64);

    fn view(&self) -> View;

    fn add_image_overlay(&mut self, image: &ImageRef) -> Self::Layer;

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle, popup: &str) -> Self::Layer;

    fn add_circle(&mut self, center: LatLng, style: &CircleStyle) -> Self::Layer;

    /// Adds a polyline, or returns `None` when the points cannot form one.
    fn add_polyline(&mut self, points: &[LatLng], style: &PathStyle) -> Option<Self::Layer>;

    fn remove_layer(&mut self, layer: &Self::Layer);

    /// Number of layers currently on the surface, overlays included.
    fn layer_count(&self) -> usize;

    fn set_dragging(&mut self, enabled: bool);

    fn set_scroll_zoom(&mut self, enabled: bool);

    fn dragging(&self) -> bool;

    fn scroll_zoom(&self) -> bool;

    /// Zooms by `steps` (positive zooms in) when scroll zoom is enabled.
    ///
    /// Returns whether the view changed.
    fn scroll_by(&mut self, steps: f64) -> bool;

    /// Pans by a pixel offset when dragging is enabled.
    ///
    /// Returns whether the view changed.
    fn pan_by(&mut self, dx: f64, dy: f64) -> bool;
}

/// Creates surfaces asynchronously.
#[async_trait]
pub trait SurfaceLoader: Send + Sync {
    type Surface: MapSurface + Send;

    async fn load(&self, options: &SurfaceOptions) -> Result<Self::Surface, SurfaceError>;
}
