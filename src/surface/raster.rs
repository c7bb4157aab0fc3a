//! Software map surface rendered through Cairo.
//!
//! [`RasterSurface`] keeps its layers as plain data and only touches Cairo
//! when asked to render, which keeps the surface `Send` and cheap to drive
//! from tests. Positions use a flat projection: one map unit is one pixel at
//! zoom 0, and every zoom step doubles the scale.

use super::{
    CircleStyle, MapSurface, MarkerStyle, PathStyle, SurfaceError, SurfaceLoader, SurfaceOptions,
};
use crate::draw;
use crate::geo::{ImageRef, LatLng, View};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

/// Handle of a layer on a [`RasterSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Layer content kept by the raster surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterLayer {
    Image {
        image: ImageRef,
    },
    Marker {
        at: LatLng,
        style: MarkerStyle,
        popup: String,
    },
    Circle {
        center: LatLng,
        style: CircleStyle,
    },
    Polyline {
        points: Vec<LatLng>,
        style: PathStyle,
    },
}

/// In-memory map surface that renders to PNG.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    options: SurfaceOptions,
    view: View,
    dragging: bool,
    scroll_zoom: bool,
    next_id: u64,
    /// Layers in draw order (first = bottom)
    layers: Vec<(LayerId, RasterLayer)>,
    /// Encoded image data keyed by image url
    images: HashMap<String, Vec<u8>>,
}

impl RasterSurface {
    pub fn new(options: SurfaceOptions) -> Self {
        Self {
            dragging: options.dragging,
            scroll_zoom: options.scroll_zoom,
            view: View {
                center: LatLng::new(0.0, 0.0),
                zoom: options.clamp_zoom(0.0),
            },
            options,
            next_id: 0,
            layers: Vec::new(),
            images: HashMap::new(),
        }
    }

    /// Registers encoded PNG data for the image overlay with `url`.
    pub fn with_image_data(mut self, url: impl Into<String>, png: Vec<u8>) -> Self {
        self.images.insert(url.into(), png);
        self
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    pub fn layer(&self, id: LayerId) -> Option<&RasterLayer> {
        self.layers
            .iter()
            .find(|(layer_id, _)| *layer_id == id)
            .map(|(_, layer)| layer)
    }

    /// Layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &RasterLayer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    fn scale(&self) -> f64 {
        self.view.zoom.exp2()
    }

    /// Projects a map coordinate to viewport pixels.
    pub fn project(&self, point: LatLng) -> (f64, f64) {
        let scale = self.scale();
        let (width, height) = self.options.viewport;
        (
            (point.lng - self.view.center.lng) * scale + width as f64 / 2.0,
            (self.view.center.lat - point.lat) * scale + height as f64 / 2.0,
        )
    }

    /// Converts viewport pixels back to a map coordinate.
    pub fn unproject(&self, x: f64, y: f64) -> LatLng {
        let scale = self.scale();
        let (width, height) = self.options.viewport;
        LatLng::new(
            self.view.center.lat - (y - height as f64 / 2.0) / scale,
            self.view.center.lng + (x - width as f64 / 2.0) / scale,
        )
    }

    fn push_layer(&mut self, layer: RasterLayer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, layer));
        id
    }

    /// Draws every layer onto `ctx`, which must cover the viewport.
    pub fn render(&self, ctx: &cairo::Context) {
        let (width, height) = self.options.viewport;
        draw::render_background(ctx, width as f64, height as f64);

        let scale = self.scale();
        for (_, layer) in &self.layers {
            match layer {
                RasterLayer::Image { image } => {
                    let (x0, y0) = self.project(image.north_west());
                    let (x1, y1) = self.project(image.south_east());
                    let png = self.images.get(&image.url).map(Vec::as_slice);
                    draw::render_image(ctx, png, x0, y0, x1 - x0, y1 - y0);
                }
                RasterLayer::Marker { at, style, popup } => {
                    let (x, y) = self.project(*at);
                    let icon = self.images.get(&style.icon_url).map(Vec::as_slice);
                    draw::render_marker(ctx, x, y, style, icon, popup);
                }
                RasterLayer::Circle { center, style } => {
                    let (x, y) = self.project(*center);
                    draw::render_circle(ctx, x, y, style.radius * scale, style);
                }
                RasterLayer::Polyline { points, style } => {
                    let projected: Vec<_> = points.iter().map(|p| self.project(*p)).collect();
                    draw::render_polyline(ctx, &projected, style);
                }
            }
        }
    }

    /// Renders the viewport and writes it as PNG.
    pub fn render_png<W: Write>(&self, out: &mut W) -> Result<(), SurfaceError> {
        let (width, height) = self.options.viewport;
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)
            .map_err(|err| SurfaceError::Render(err.to_string()))?;
        {
            let ctx =
                cairo::Context::new(&surface).map_err(|err| SurfaceError::Render(err.to_string()))?;
            self.render(&ctx);
        }
        surface.flush();
        surface
            .write_to_png(out)
            .map_err(|err| SurfaceError::Render(err.to_string()))?;
        debug!("Rendered {}x{} map with {} layers", width, height, self.layers.len());
        Ok(())
    }
}

impl MapSurface for RasterSurface {
    type Layer = LayerId;

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.view = View {
            center,
            zoom: self.options.clamp_zoom(zoom),
        };
    }

    fn view(&self) -> View {
        self.view
    }

    fn add_image_overlay(&mut self, image: &ImageRef) -> LayerId {
        if !self.images.contains_key(&image.url) {
            debug!("No image data for {}, rendering placeholder", image.url);
        }
        self.push_layer(RasterLayer::Image {
            image: image.clone(),
        })
    }

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle, popup: &str) -> LayerId {
        self.push_layer(RasterLayer::Marker {
            at,
            style: style.clone(),
            popup: popup.to_string(),
        })
    }

    fn add_circle(&mut self, center: LatLng, style: &CircleStyle) -> LayerId {
        self.push_layer(RasterLayer::Circle {
            center,
            style: style.clone(),
        })
    }

    fn add_polyline(&mut self, points: &[LatLng], style: &PathStyle) -> Option<LayerId> {
        if points.is_empty() {
            return None;
        }
        Some(self.push_layer(RasterLayer::Polyline {
            points: points.to_vec(),
            style: style.clone(),
        }))
    }

    fn remove_layer(&mut self, layer: &LayerId) {
        self.layers.retain(|(id, _)| id != layer);
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn set_dragging(&mut self, enabled: bool) {
        self.dragging = enabled;
    }

    fn set_scroll_zoom(&mut self, enabled: bool) {
        self.scroll_zoom = enabled;
    }

    fn dragging(&self) -> bool {
        self.dragging
    }

    fn scroll_zoom(&self) -> bool {
        self.scroll_zoom
    }

    fn scroll_by(&mut self, steps: f64) -> bool {
        if !self.scroll_zoom {
            return false;
        }
        let zoom = self.options.clamp_zoom(self.view.zoom + steps);
        if zoom == self.view.zoom {
            return false;
        }
        self.view.zoom = zoom;
        true
    }

    fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if !self.dragging || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        // Dragging the map right reveals what lies to the left.
        let scale = self.scale();
        self.view.center.lng -= dx / scale;
        self.view.center.lat += dy / scale;
        true
    }
}

/// Loads [`RasterSurface`]s, reading overlay images off the async runtime.
#[derive(Debug, Clone, Default)]
pub struct RasterLoader {
    images: Vec<(String, PathBuf)>,
}

impl RasterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the image for `image` from its url (a file path) when loading.
    pub fn preload(self, image: &ImageRef) -> Self {
        self.preload_url(&image.url)
    }

    /// Reads the file at `url` when loading, e.g. a marker icon.
    pub fn preload_url(mut self, url: &str) -> Self {
        self.images.push((url.to_string(), PathBuf::from(url)));
        self
    }

    /// Reads the image for `image` from `path` when loading.
    pub fn preload_from(mut self, image: &ImageRef, path: impl Into<PathBuf>) -> Self {
        self.images.push((image.url.clone(), path.into()));
        self
    }
}

#[async_trait]
impl SurfaceLoader for RasterLoader {
    type Surface = RasterSurface;

    async fn load(&self, options: &SurfaceOptions) -> Result<RasterSurface, SurfaceError> {
        let mut surface = RasterSurface::new(options.clone());

        for (url, path) in &self.images {
            let read_path = path.clone();
            let bytes = tokio::task::spawn_blocking(move || std::fs::read(read_path))
                .await
                .map_err(|err| SurfaceError::Load(err.to_string()))?;

            match bytes {
                Ok(bytes) => {
                    info!("Loaded overlay image {} ({} bytes)", path.display(), bytes.len());
                    surface = surface.with_image_data(url.clone(), bytes);
                }
                Err(err) => {
                    warn!("Overlay image {} unavailable: {}", path.display(), err);
                }
            }
        }

        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LayerStyles;

    fn surface() -> RasterSurface {
        RasterSurface::new(SurfaceOptions {
            viewport: (200, 100),
            ..SurfaceOptions::default()
        })
    }

    #[test]
    fn projection_round_trips_through_view() {
        let mut surface = surface();
        surface.set_view(LatLng::new(50.0, 80.0), 1.0);

        assert_eq!(surface.project(LatLng::new(50.0, 80.0)), (100.0, 50.0));
        assert_eq!(surface.project(LatLng::new(60.0, 90.0)), (120.0, 30.0));
        assert_eq!(surface.unproject(120.0, 30.0), LatLng::new(60.0, 90.0));
    }

    #[test]
    fn set_view_clamps_zoom() {
        let mut surface = surface();
        surface.set_view(LatLng::new(0.0, 0.0), 12.0);
        assert_eq!(surface.view().zoom, 5.0);
        surface.set_view(LatLng::new(0.0, 0.0), -9.0);
        assert_eq!(surface.view().zoom, -2.0);
    }

    #[test]
    fn empty_polyline_is_rejected() {
        let mut surface = surface();
        let styles = LayerStyles::default();
        assert!(surface.add_polyline(&[], &styles.path).is_none());
        assert_eq!(surface.layer_count(), 0);
    }

    #[test]
    fn removing_layers_keeps_others() {
        let mut surface = surface();
        let styles = LayerStyles::default();
        let marker = surface.add_marker(LatLng::new(1.0, 1.0), &styles.marker, "pin");
        let circle = surface.add_circle(LatLng::new(2.0, 2.0), &styles.circle);

        surface.remove_layer(&marker);
        surface.remove_layer(&marker);

        assert_eq!(surface.layer_count(), 1);
        assert!(surface.layer(marker).is_none());
        assert!(matches!(
            surface.layer(circle),
            Some(RasterLayer::Circle { .. })
        ));
    }

    #[test]
    fn wheel_and_drag_respect_flags() {
        let mut surface = surface();
        surface.set_view(LatLng::new(0.0, 0.0), 0.0);

        assert!(!surface.scroll_by(1.0));
        assert!(!surface.pan_by(10.0, 0.0));

        surface.set_scroll_zoom(true);
        assert!(surface.scroll_by(1.0));
        assert_eq!(surface.view().zoom, 1.0);

        surface.set_dragging(true);
        assert!(surface.pan_by(10.0, -4.0));
        assert_eq!(surface.view().center, LatLng::new(-2.0, -5.0));
    }

    #[test]
    fn scroll_stops_at_zoom_bounds() {
        let mut surface = surface();
        surface.set_scroll_zoom(true);
        surface.set_view(LatLng::new(0.0, 0.0), 5.0);
        assert!(!surface.scroll_by(1.0));
    }

    #[test]
    fn render_png_writes_png_signature() {
        let mut surface = surface();
        let styles = LayerStyles::default();
        surface.add_image_overlay(&ImageRef::new("missing.png", [50.0, 100.0]));
        surface.add_circle(LatLng::new(25.0, 50.0), &styles.circle);
        surface.add_polyline(&[LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)], &styles.path);
        surface.set_view(LatLng::new(25.0, 50.0), 0.0);

        let mut buffer = Vec::new();
        surface.render_png(&mut buffer).unwrap();
        assert_eq!(&buffer[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[tokio::test]
    async fn loader_reads_available_images_and_skips_missing() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("base.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let present = ImageRef::new("base", [10.0, 10.0]);
        let absent = ImageRef::new(temp.path().join("absent.png").display().to_string(), [1.0, 1.0]);
        let loader = RasterLoader::new()
            .preload_from(&present, &path)
            .preload(&absent);

        let surface = loader.load(&SurfaceOptions::default()).await.unwrap();
        assert_eq!(
            surface.images.get("base").map(Vec::len),
            Some(b"not really a png".len())
        );
        assert!(!surface.images.contains_key(&absent.url));
        assert!(!surface.dragging());
        assert!(!surface.scroll_zoom());
    }
}
