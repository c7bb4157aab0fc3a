//! Cairo-based rendering functions for map layers.
//!
//! All functions take positions already projected to pixel space.

use super::color::Color;
use crate::surface::{CircleStyle, MarkerStyle, PathStyle};
use std::io::Cursor;

/// Fill opacity applied to circles.
const CIRCLE_FILL_OPACITY: f64 = 0.2;

/// Font used for marker popup labels.
const POPUP_FONT: &str = "Sans Bold 11";

/// Fills the whole canvas with the map background color.
pub fn render_background(ctx: &cairo::Context, width: f64, height: f64) {
    ctx.set_source_rgb(0.867, 0.867, 0.867);
    ctx.rectangle(0.0, 0.0, width, height);
    let _ = ctx.fill();
}

/// Renders an image overlay stretched over the given pixel rectangle.
///
/// `png` holds the encoded image when it could be loaded; otherwise a light
/// placeholder with a diagonal cross marks where the image belongs.
pub fn render_image(ctx: &cairo::Context, png: Option<&[u8]>, x: f64, y: f64, w: f64, h: f64) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }

    if let Some(image) = png.and_then(decode_png) {
        paint_scaled(ctx, &image, x, y, w, h);
        return;
    }

    let _ = ctx.save();
    ctx.set_source_rgb(0.96, 0.96, 0.96);
    ctx.rectangle(x, y, w, h);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgb(0.7, 0.7, 0.7);
    ctx.set_line_width(1.0);
    let _ = ctx.stroke();
    ctx.move_to(x, y);
    ctx.line_to(x + w, y + h);
    ctx.move_to(x + w, y);
    ctx.line_to(x, y + h);
    let _ = ctx.stroke();
    let _ = ctx.restore();
}

/// Render a polyline through the given points.
pub fn render_polyline(ctx: &cairo::Context, points: &[(f64, f64)], style: &PathStyle) {
    let Some(((x0, y0), rest)) = points.split_first() else {
        return;
    };

    set_source(ctx, style.color);
    ctx.set_line_width(style.weight);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(*x0, *y0);
    if rest.is_empty() {
        // Single point: draw a dot so the trace is visible.
        ctx.line_to(*x0, *y0);
    }
    for (x, y) in rest {
        ctx.line_to(*x, *y);
    }

    let _ = ctx.stroke();
}

/// Renders a filled circle with an outline.
pub fn render_circle(ctx: &cairo::Context, cx: f64, cy: f64, radius: f64, style: &CircleStyle) {
    let radius = radius.max(1.0);
    let _ = ctx.save();

    set_source(ctx, style.fill_color.with_alpha(style.fill_color.a * CIRCLE_FILL_OPACITY));
    ctx.arc(cx, cy, radius, 0.0, std::f64::consts::PI * 2.0);
    let _ = ctx.fill();

    if style.weight > 0.0 {
        set_source(ctx, style.color);
        ctx.set_line_width(style.weight);
        ctx.arc(cx, cy, radius, 0.0, std::f64::consts::PI * 2.0);
        let _ = ctx.stroke();
    }

    let _ = ctx.restore();
}

/// Renders a pin marker whose icon anchor sits on `(x, y)`, with its popup label.
///
/// `icon` holds the encoded PNG for `style.icon_url` when available; the
/// icon is stretched over `style.icon_size`. Without it a teardrop pin in
/// `style.color` is drawn.
pub fn render_marker(
    ctx: &cairo::Context,
    x: f64,
    y: f64,
    style: &MarkerStyle,
    icon: Option<&[u8]>,
    popup: &str,
) {
    let [width, height] = style.icon_size;
    let [anchor_x, anchor_y] = style.icon_anchor;
    let left = x - anchor_x;
    let top = y - anchor_y;

    match icon.and_then(decode_png) {
        Some(image) => paint_scaled(ctx, &image, left, top, width, height),
        None => render_pin(ctx, x, y, style),
    }

    if !popup.is_empty() {
        let [popup_x, popup_y] = style.popup_anchor;
        render_popup_label(ctx, x + popup_x, top + popup_y.min(0.0), popup);
    }
}

fn render_pin(ctx: &cairo::Context, x: f64, y: f64, style: &MarkerStyle) {
    let [width, height] = style.icon_size;
    let left = x - style.icon_anchor[0];
    let top = y - style.icon_anchor[1];

    let _ = ctx.save();

    // Teardrop: round head in the upper part of the icon box, tip at the anchor.
    let radius = (width / 2.0).min(height / 3.0).max(1.0);
    let head_x = left + width / 2.0;
    let head_y = top + radius;
    ctx.arc(head_x, head_y, radius, std::f64::consts::PI * 0.8, std::f64::consts::PI * 0.2);
    ctx.line_to(x, y);
    ctx.close_path();
    set_source(ctx, style.color);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.5);
    ctx.set_line_width(1.0);
    let _ = ctx.stroke();

    ctx.arc(head_x, head_y, radius * 0.4, 0.0, std::f64::consts::PI * 2.0);
    ctx.set_source_rgb(1.0, 1.0, 1.0);
    let _ = ctx.fill();

    let _ = ctx.restore();
}

/// Renders a popup label centered above `(x, bottom)`.
///
/// Uses Pango for layout so labels with any script render correctly.
pub fn render_popup_label(ctx: &cairo::Context, x: f64, bottom: f64, text: &str) {
    let _ = ctx.save();
    ctx.set_antialias(cairo::Antialias::Best);

    let layout = pangocairo::functions::create_layout(ctx);
    let font_desc = pango::FontDescription::from_string(POPUP_FONT);
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    let (_ink_rect, logical_rect) = layout.extents();
    let text_width = logical_rect.width() as f64 / pango::SCALE as f64;
    let text_height = logical_rect.height() as f64 / pango::SCALE as f64;

    let padding = 4.0;
    let box_x = x - text_width / 2.0 - padding;
    let box_y = bottom - text_height - padding * 2.0;

    ctx.rectangle(
        box_x,
        box_y,
        text_width + padding * 2.0,
        text_height + padding * 2.0,
    );
    ctx.set_source_rgba(1.0, 1.0, 1.0, 0.9);
    let _ = ctx.fill_preserve();
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.3);
    ctx.set_line_width(1.0);
    let _ = ctx.stroke();

    ctx.move_to(box_x + padding, box_y + padding);
    ctx.set_source_rgb(0.2, 0.2, 0.2);
    pangocairo::functions::show_layout(ctx, &layout);

    let _ = ctx.restore();
}

fn decode_png(bytes: &[u8]) -> Option<cairo::ImageSurface> {
    cairo::ImageSurface::create_from_png(&mut Cursor::new(bytes))
        .map_err(|err| log::warn!("Failed to decode PNG image: {err}"))
        .ok()
        .filter(|image| image.width() > 0 && image.height() > 0)
}

/// Paints `image` stretched over the given pixel rectangle.
fn paint_scaled(ctx: &cairo::Context, image: &cairo::ImageSurface, x: f64, y: f64, w: f64, h: f64) {
    let _ = ctx.save();
    ctx.translate(x, y);
    ctx.scale(w / image.width() as f64, h / image.height() as f64);
    if ctx.set_source_surface(image, 0.0, 0.0).is_ok() {
        let _ = ctx.paint();
    }
    let _ = ctx.restore();
}

fn set_source(ctx: &cairo::Context, color: Color) {
    ctx.set_source_rgba(color.r, color.g, color.b, color.a);
}
