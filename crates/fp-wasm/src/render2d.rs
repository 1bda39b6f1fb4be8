//! Canvas2D software renderer.
//!
//! Draws a `Frame` to an HTML `<canvas>` via `CanvasRenderingContext2d`.
//! World coordinates are mapped to device pixels with a single canvas
//! transform, so every shape is drawn in world units.

use fp_core::model::{Point, Rect};
use fp_core::view::ViewTransform;
use fp_render::frame::{AreaShape, Frame, Marker};
use fp_render::style::{self, Rgba};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

/// Loaded marker thumbnails, keyed by URL.
///
/// Every image shares one `onload` callback that asks the owner to redraw,
/// so a marker switches from its fallback tile to the thumbnail as soon as
/// the image arrives.
pub struct ImageCache {
    images: HashMap<String, HtmlImageElement>,
    on_load: Closure<dyn FnMut()>,
}

impl ImageCache {
    pub fn new(redraw: impl Fn() + 'static) -> Self {
        Self {
            images: HashMap::new(),
            on_load: Closure::wrap(Box::new(redraw) as Box<dyn FnMut()>),
        }
    }

    /// The decoded image for `url`, starting a load on first use.
    pub fn ready(&mut self, url: &str) -> Option<&HtmlImageElement> {
        if !self.images.contains_key(url) {
            let img = HtmlImageElement::new().ok()?;
            img.set_onload(Some(self.on_load.as_ref().unchecked_ref()));
            img.set_src(url);
            self.images.insert(url.to_string(), img);
        }
        self.images
            .get(url)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    pub fn clear(&mut self) {
        for img in self.images.values() {
            img.set_onload(None);
        }
        self.images.clear();
    }
}

impl Drop for ImageCache {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Render one frame.
///
/// `view` pairs the canvas's CSS-pixel size (origin at the canvas corner)
/// with the frame's view box; `dpr` is the device pixel ratio used for the
/// backing store.
pub fn render_frame(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    view: &ViewTransform,
    dpr: f64,
    images: &mut ImageCache,
) -> Result<(), JsValue> {
    let client = view.client;

    // Clear in device space; the letterbox bands stay blank.
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, client.width * dpr, client.height * dpr);

    let scale = view.scale();
    if scale == 0.0 {
        return Ok(());
    }
    let vb = frame.view_box;
    let origin = view.to_screen(Point::new(vb.x, vb.y));
    ctx.set_transform(
        dpr * scale,
        0.0,
        0.0,
        dpr * scale,
        dpr * (origin.x - vb.x * scale),
        dpr * (origin.y - vb.y * scale),
    )?;

    with_saved_state(ctx, || {
        ctx.begin_path();
        ctx.rect(vb.x, vb.y, vb.width, vb.height);
        ctx.clip();
        draw_layers(ctx, frame, scale, images)
    })
}

/// Canvas state stack (`save` / `restore`).
trait StateStack {
    fn save(&self);
    fn restore(&self);
}

impl StateStack for CanvasRenderingContext2d {
    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }
}

/// Run `body` between a `save` and a `restore`, restoring on error too so a
/// clip never outlives the frame that set it.
fn with_saved_state<S, T, E>(stack: &S, body: impl FnOnce() -> Result<T, E>) -> Result<T, E>
where
    S: StateStack + ?Sized,
{
    stack.save();
    let result = body();
    stack.restore();
    result
}

fn draw_layers(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    scale: f64,
    images: &mut ImageCache,
) -> Result<(), JsValue> {
    fill(ctx, frame.bounds, frame.background);
    draw_grid(ctx, frame, scale);

    for marker in frame.catalog_markers() {
        draw_marker(ctx, marker, images)?;
    }
    if let Some(area) = &frame.factory_area {
        draw_area(ctx, area);
    }
    for marker in frame.placed_markers() {
        draw_marker(ctx, marker, images)?;
    }
    if let Some(selection) = &frame.selection {
        draw_area(ctx, selection);
    }
    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, frame: &Frame, scale: f64) {
    if frame.grid.is_empty() {
        return;
    }
    ctx.set_stroke_style_str(&frame.grid_color.to_css());
    // One CSS pixel regardless of zoom.
    ctx.set_line_width(1.0 / scale);
    ctx.begin_path();
    for line in &frame.grid {
        ctx.move_to(line.from.x, line.from.y);
        ctx.line_to(line.to.x, line.to.y);
    }
    ctx.stroke();
}

fn draw_area(ctx: &CanvasRenderingContext2d, area: &AreaShape) {
    let r = area.rect;
    fill(ctx, r, area.fill);
    ctx.set_stroke_style_str(&area.stroke.to_css());
    ctx.set_line_width(area.stroke_width);
    ctx.stroke_rect(r.x, r.y, r.width, r.height);
}

fn draw_marker(
    ctx: &CanvasRenderingContext2d,
    marker: &Marker,
    images: &mut ImageCache,
) -> Result<(), JsValue> {
    let r = marker.rect;
    let image = marker
        .thumbnail_url
        .as_deref()
        .and_then(|url| images.ready(url));
    match image {
        Some(img) => {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, r.x, r.y, r.width, r.height)?
        }
        None => fill(ctx, r, style::MARKER_FALLBACK),
    }
    Ok(())
}

fn fill(ctx: &CanvasRenderingContext2d, r: Rect, color: Rgba) {
    ctx.set_fill_style_str(&color.to_css());
    ctx.fill_rect(r.x, r.y, r.width, r.height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Depth(Cell<i32>);

    impl StateStack for Depth {
        fn save(&self) {
            self.0.set(self.0.get() + 1);
        }

        fn restore(&self) {
            self.0.set(self.0.get() - 1);
        }
    }

    #[test]
    fn state_is_restored_after_a_failed_draw() {
        let depth = Depth::default();
        let result: Result<(), &str> = with_saved_state(&depth, || {
            assert_eq!(depth.0.get(), 1);
            Err("image decode failed")
        });
        assert_eq!(result, Err("image decode failed"));
        assert_eq!(depth.0.get(), 0);
    }

    #[test]
    fn state_is_restored_after_a_clean_draw() {
        let depth = Depth::default();
        let result: Result<u8, ()> = with_saved_state(&depth, || Ok(3));
        assert_eq!(result, Ok(3));
        assert_eq!(depth.0.get(), 0);
    }
}
