//! Map-space geometry: coordinates, image references and view fitting.
//!
//! The map uses a flat (CRS-simple) coordinate system where `lat` grows
//! upwards and `lng` grows to the right, both measured in image pixels at
//! zoom level 0.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in map space.
///
/// Accepts both the `[lat, lng]` array form and the `{"lat": .., "lng": ..}`
/// object form when deserializing; always serializes as an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LatLngRepr")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.lat, self.lng)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatLngRepr {
    Pair([f64; 2]),
    Object { lat: f64, lng: f64 },
}

impl From<LatLngRepr> for LatLng {
    fn from(repr: LatLngRepr) -> Self {
        match repr {
            LatLngRepr::Pair(pair) => pair.into(),
            LatLngRepr::Object { lat, lng } => Self { lat, lng },
        }
    }
}

/// Reference to an image placed as a map overlay.
///
/// `bounds` is `[height, width]` in map units; the overlay spans from
/// `(height, 0)` (top-left) to `(0, width)` (bottom-right).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImageRef {
    /// Path or URL of the image
    pub url: String,
    /// `[height, width]` of the image in map units
    pub bounds: [f64; 2],
}

impl ImageRef {
    pub fn new(url: impl Into<String>, bounds: [f64; 2]) -> Self {
        Self {
            url: url.into(),
            bounds,
        }
    }

    /// Top-left corner of the overlay.
    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.bounds[0], 0.0)
    }

    /// Bottom-right corner of the overlay.
    pub fn south_east(&self) -> LatLng {
        LatLng::new(0.0, self.bounds[1])
    }

    /// Midpoint of the image bounds.
    pub fn center(&self) -> LatLng {
        LatLng::new(self.bounds[0] / 2.0, self.bounds[1] / 2.0)
    }
}

/// Camera position of a map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}

impl Default for View {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            zoom: 0.0,
        }
    }
}

/// Zoom levels used when fitting an image into the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRule {
    /// Larger bound dimension above which the far zoom is used
    pub threshold: f64,
    /// Zoom used for images up to the threshold
    pub default_zoom: f64,
    /// Zoom used for images larger than the threshold
    pub far_zoom: f64,
}

impl Default for FitRule {
    fn default() -> Self {
        Self {
            threshold: 1000.0,
            default_zoom: -1.0,
            far_zoom: -2.0,
        }
    }
}

impl FitRule {
    /// Picks the zoom level for an image of the given `[height, width]` bounds.
    pub fn zoom_for(&self, bounds: [f64; 2]) -> f64 {
        if bounds[0].max(bounds[1]) > self.threshold {
            self.far_zoom
        } else {
            self.default_zoom
        }
    }

    /// Computes the view that centers `image` at its fitted zoom.
    pub fn fit(&self, image: &ImageRef) -> View {
        View {
            center: image.center(),
            zoom: self.zoom_for(image.bounds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_accepts_array_and_object_forms() {
        let from_pair: LatLng = serde_json::from_str("[10, 20.5]").unwrap();
        let from_object: LatLng = serde_json::from_str(r#"{"lat": 10, "lng": 20.5}"#).unwrap();
        assert_eq!(from_pair, LatLng::new(10.0, 20.5));
        assert_eq!(from_pair, from_object);
    }

    #[test]
    fn latlng_serializes_as_object() {
        let json = serde_json::to_value(LatLng::new(1.0, 2.0)).unwrap();
        assert_eq!(json, serde_json::json!({"lat": 1.0, "lng": 2.0}));
    }

    #[test]
    fn fit_uses_default_zoom_for_small_images() {
        let rule = FitRule::default();
        let view = rule.fit(&ImageRef::new("small.png", [400.0, 900.0]));
        assert_eq!(view.zoom, -1.0);
        assert_eq!(view.center, LatLng::new(200.0, 450.0));
    }

    #[test]
    fn fit_zooms_out_when_either_dimension_exceeds_threshold() {
        let rule = FitRule::default();
        assert_eq!(rule.zoom_for([810.0, 1100.0]), -2.0);
        assert_eq!(rule.zoom_for([1200.0, 300.0]), -2.0);
        assert_eq!(rule.zoom_for([1000.0, 1000.0]), -1.0);
    }

    #[test]
    fn overlay_corners_follow_bounds() {
        let image = ImageRef::new("base.png", [810.0, 1100.0]);
        assert_eq!(image.north_west(), LatLng::new(810.0, 0.0));
        assert_eq!(image.south_east(), LatLng::new(0.0, 1100.0));
    }
}
