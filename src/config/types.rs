//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Camera and viewport settings.
///
/// Zoom levels follow flat-map conventions: 0 shows the image at its
/// natural size, each step halves or doubles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ViewConfig {
    /// Most zoomed-out level allowed
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Most zoomed-in level allowed
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Larger image dimension above which the far zoom is used to fit the image
    #[serde(default = "default_fit_threshold")]
    pub fit_threshold: f64,

    /// Initial zoom for images up to the threshold
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Initial zoom for images larger than the threshold
    #[serde(default = "default_far_zoom")]
    pub far_zoom: f64,

    /// Viewport width in pixels used when rendering (valid range: 16 - 8192)
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Viewport height in pixels used when rendering (valid range: 16 - 8192)
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            fit_threshold: default_fit_threshold(),
            default_zoom: default_zoom(),
            far_zoom: default_far_zoom(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

/// Base image placed under the annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayConfig {
    /// Path or URL of the base image
    #[serde(default = "default_overlay_image")]
    pub image: String,

    /// Image bounds as `[height, width]` in map units
    #[serde(default = "default_overlay_bounds")]
    pub bounds: [f64; 2],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            image: default_overlay_image(),
            bounds: default_overlay_bounds(),
        }
    }
}

/// Pin marker appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MarkerConfig {
    /// Icon asset path (indexed icon files, e.g. `/options/0.svg`)
    #[serde(default = "default_icon_url")]
    pub icon_url: String,

    /// Icon size in pixels `[width, height]`
    #[serde(default = "default_icon_size")]
    pub icon_size: [f64; 2],

    /// Icon point placed on the marker location
    #[serde(default = "default_icon_anchor")]
    pub icon_anchor: [f64; 2],

    /// Popup label offset relative to the anchor
    #[serde(default = "default_popup_anchor")]
    pub popup_anchor: [f64; 2],

    /// Pin color used when the icon is drawn natively
    #[serde(default = "default_marker_color")]
    pub color: ColorSpec,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            icon_url: default_icon_url(),
            icon_size: default_icon_size(),
            icon_anchor: default_icon_anchor(),
            popup_anchor: default_popup_anchor(),
            color: default_marker_color(),
        }
    }
}

/// Circle appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CircleConfig {
    /// Radius in map units (minimum 1.0)
    #[serde(default = "default_circle_radius")]
    pub radius: f64,

    /// Outline color
    #[serde(default = "default_path_color")]
    pub color: ColorSpec,

    /// Fill color
    #[serde(default = "default_fill_color")]
    pub fill_color: ColorSpec,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            radius: default_circle_radius(),
            color: default_path_color(),
            fill_color: default_fill_color(),
        }
    }
}

/// Polyline appearance (polygons and live traces).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PathConfig {
    /// Stroke color
    #[serde(default = "default_path_color")]
    pub color: ColorSpec,

    /// Fill color
    #[serde(default = "default_fill_color")]
    pub fill_color: ColorSpec,

    /// Stroke width in pixels (valid range: 0.5 - 20.0)
    #[serde(default = "default_path_weight")]
    pub weight: f64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            color: default_path_color(),
            fill_color: default_fill_color(),
            weight: default_path_weight(),
        }
    }
}

/// Keys that temporarily unlock map interactions while held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeysConfig {
    /// Hold to enable wheel zooming
    #[serde(default = "default_zoom_key")]
    pub zoom: String,

    /// Hold to enable drag panning
    #[serde(default = "default_pan_key")]
    pub pan: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            zoom: default_zoom_key(),
            pan: default_pan_key(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

pub(super) fn default_min_zoom() -> f64 {
    -2.0
}

pub(super) fn default_max_zoom() -> f64 {
    5.0
}

pub(super) fn default_fit_threshold() -> f64 {
    1000.0
}

pub(super) fn default_zoom() -> f64 {
    -1.0
}

pub(super) fn default_far_zoom() -> f64 {
    -2.0
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

fn default_overlay_image() -> String {
    "/starter.png".to_string()
}

pub(super) fn default_overlay_bounds() -> [f64; 2] {
    [810.0, 1100.0]
}

fn default_icon_url() -> String {
    "/options/0.svg".to_string()
}

fn default_icon_size() -> [f64; 2] {
    [38.0, 60.0]
}

fn default_icon_anchor() -> [f64; 2] {
    [17.0, 45.0]
}

fn default_popup_anchor() -> [f64; 2] {
    [3.0, -30.0]
}

pub(super) fn default_marker_color() -> ColorSpec {
    ColorSpec::hex("#2a9d4b")
}

pub(super) fn default_circle_radius() -> f64 {
    40.0
}

pub(super) fn default_path_color() -> ColorSpec {
    ColorSpec::hex("#3388ff")
}

pub(super) fn default_fill_color() -> ColorSpec {
    ColorSpec::hex("#257ef4")
}

pub(super) fn default_path_weight() -> f64 {
    3.0
}

pub(super) fn default_zoom_key() -> String {
    "z".to_string()
}

pub(super) fn default_pan_key() -> String {
    "Alt".to_string()
}
