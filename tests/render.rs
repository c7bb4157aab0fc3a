use cairo::{Context, ImageSurface};
use mapmark::draw::color::RED;
use mapmark::geo::{ImageRef, LatLng};
use mapmark::surface::{LayerStyles, MapSurface, RasterSurface, SurfaceOptions};

const SIZE: u32 = 200;

fn raster() -> RasterSurface {
    let mut surface = RasterSurface::new(SurfaceOptions {
        viewport: (SIZE, SIZE),
        ..SurfaceOptions::default()
    });
    surface.set_view(LatLng::new(0.0, 0.0), 0.0);
    surface
}

fn rendered(surface: &RasterSurface) -> ImageSurface {
    let image = ImageSurface::create(cairo::Format::ARgb32, SIZE as i32, SIZE as i32).unwrap();
    {
        let ctx = Context::new(&image).unwrap();
        surface.render(&ctx);
    }
    image.flush();
    image
}

/// Returns (r, g, b) of the pixel at `(x, y)`.
fn pixel(image: &mut ImageSurface, x: usize, y: usize) -> (u8, u8, u8) {
    let stride = image.stride() as usize;
    let data = image.data().unwrap();
    let offset = y * stride + x * 4;
    // ARGB32 is stored native-endian: B, G, R, A on little-endian hosts.
    if cfg!(target_endian = "little") {
        (data[offset + 2], data[offset + 1], data[offset])
    } else {
        (data[offset + 1], data[offset + 2], data[offset + 3])
    }
}

#[test]
fn empty_surface_renders_background_only() {
    let mut image = rendered(&raster());

    let corner = pixel(&mut image, 2, 2);
    assert_eq!(corner, pixel(&mut image, 100, 100));
    assert_eq!(corner.0, corner.1);
    assert_eq!(corner.1, corner.2);
}

#[test]
fn circle_tints_its_area_blue() {
    let mut surface = raster();
    let styles = LayerStyles::default();
    surface.add_circle(LatLng::new(0.0, 0.0), &styles.circle);

    let mut image = rendered(&surface);
    let background = pixel(&mut image, 2, 2);
    let (r, _, b) = pixel(&mut image, 100, 100);

    assert!(b > r, "circle fill should lean blue, got r={r} b={b}");
    assert_ne!((r, b), (background.0, background.2));
}

#[test]
fn polyline_strokes_between_points() {
    let mut surface = raster();
    let styles = LayerStyles {
        path: mapmark::surface::PathStyle {
            color: RED,
            fill_color: RED,
            weight: 6.0,
        },
        ..LayerStyles::default()
    };
    surface.add_polyline(
        &[LatLng::new(0.0, -80.0), LatLng::new(0.0, 80.0)],
        &styles.path,
    );

    let mut image = rendered(&surface);
    let (r, g, b) = pixel(&mut image, 100, 100);
    assert!(r > 200 && g < 60 && b < 60, "expected red stroke, got {r},{g},{b}");

    let off_line = pixel(&mut image, 100, 20);
    assert_eq!(off_line, pixel(&mut image, 2, 2));
}

#[test]
fn marker_draws_pin_above_its_anchor() {
    let mut surface = raster();
    let styles = LayerStyles::default();
    surface.add_marker(LatLng::new(-40.0, 0.0), &styles.marker, "pin");

    let mut image = rendered(&surface);
    let background = pixel(&mut image, 2, 2);
    // The anchor sits at (100, 140); the pin head is above it.
    assert_ne!(pixel(&mut image, 100, 115), background);
    assert_eq!(pixel(&mut image, 100, 190), background);
}

#[test]
fn missing_overlay_image_renders_placeholder() {
    let mut surface = raster();
    surface.set_view(LatLng::new(50.0, 50.0), 0.0);
    surface.add_image_overlay(&ImageRef::new("missing.png", [100.0, 100.0]));

    let mut image = rendered(&surface);
    let background = pixel(&mut image, 2, 2);
    assert_ne!(pixel(&mut image, 75, 100), background);
}

fn solid_green_png() -> Vec<u8> {
    let green = ImageSurface::create(cairo::Format::ARgb32, 4, 4).unwrap();
    {
        let ctx = Context::new(&green).unwrap();
        ctx.set_source_rgb(0.0, 1.0, 0.0);
        ctx.paint().unwrap();
    }
    let mut png = Vec::new();
    green.write_to_png(&mut png).unwrap();
    png
}

#[test]
fn marker_uses_registered_icon_image() {
    let styles = LayerStyles::default();
    let mut surface = raster().with_image_data(styles.marker.icon_url.clone(), solid_green_png());
    surface.add_marker(LatLng::new(-40.0, 0.0), &styles.marker, "");

    let mut image = rendered(&surface);
    // Icon box: 38x60 with its (17, 45) anchor on (100, 140).
    let (r, g, b) = pixel(&mut image, 102, 125);
    assert!(g > 200 && r < 40 && b < 40, "expected green icon, got {r},{g},{b}");
    assert_eq!(pixel(&mut image, 100, 190), pixel(&mut image, 2, 2));
}

#[test]
fn overlay_png_is_scaled_into_bounds() {
    let mut surface = raster().with_image_data("green.png", solid_green_png());
    surface.set_view(LatLng::new(50.0, 50.0), 0.0);
    surface.add_image_overlay(&ImageRef::new("green.png", [100.0, 100.0]));

    let mut image = rendered(&surface);
    let (r, g, b) = pixel(&mut image, 100, 100);
    assert!(g > 200 && r < 40 && b < 40, "expected green overlay, got {r},{g},{b}");
    assert_eq!(pixel(&mut image, 10, 10), pixel(&mut image, 190, 190));
}
