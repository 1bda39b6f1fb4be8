//! Frame → Vello drawing commands.
//!
//! The native counterpart of the browser's Canvas2D painter. Thumbnails are
//! not decoded here; every marker is drawn as its fallback tile.

use crate::frame::{AreaShape, Frame, Marker, MarkerSource};
use crate::style::{self, Rgba};
use fp_core::view::ViewTransform;
use kurbo::{Affine, Line, Rect, RoundedRect, Stroke as KurboStroke};
use peniko::{Color, Fill};
use vello::Scene;

/// Marker tiles are slightly rounded; radius as a fraction of the edge.
const MARKER_CORNER: f64 = 0.15;
const GRID_STROKE_WIDTH: f64 = 1.0;
const PLACED_OUTLINE_WIDTH: f64 = 1.5;

/// World → target-pixel transform for a view transform whose client rect is
/// the render target.
pub fn view_affine(view: &ViewTransform) -> Affine {
    let s = view.scale();
    let vb = view.view_box;
    let origin = view.to_screen(fp_core::model::Point::new(vb.x, vb.y));
    Affine::translate((origin.x - vb.x * s, origin.y - vb.y * s)) * Affine::scale(s)
}

/// Paint one frame into a freshly-cleared `Scene`.
///
/// The caller presents the scene via its own renderer.
pub fn paint_frame(scene: &mut Scene, frame: &Frame, transform: Affine) {
    fill_rect(scene, transform, to_kurbo(frame.bounds), frame.background);

    if !frame.grid.is_empty() {
        let stroke = KurboStroke::new(GRID_STROKE_WIDTH);
        let color = to_color(frame.grid_color);
        for line in &frame.grid {
            let shape = Line::new((line.from.x, line.from.y), (line.to.x, line.to.y));
            scene.stroke(&stroke, transform, color, None, &shape);
        }
    }

    for marker in frame.catalog_markers() {
        paint_marker(scene, transform, marker);
    }
    if let Some(area) = &frame.factory_area {
        paint_area(scene, transform, area);
    }
    for marker in frame.placed_markers() {
        paint_marker(scene, transform, marker);
    }
    if let Some(selection) = &frame.selection {
        paint_area(scene, transform, selection);
    }
}

// ─── Shape painters ──────────────────────────────────────────────────────────

fn paint_area(scene: &mut Scene, transform: Affine, area: &AreaShape) {
    let rect = to_kurbo(area.rect);
    fill_rect(scene, transform, rect, area.fill);
    let stroke = KurboStroke::new(area.stroke_width);
    scene.stroke(&stroke, transform, to_color(area.stroke), None, &rect);
}

fn paint_marker(scene: &mut Scene, transform: Affine, marker: &Marker) {
    let rect = to_kurbo(marker.rect);
    let shape: RoundedRect = rect.to_rounded_rect(rect.width() * MARKER_CORNER);
    let color = to_color(style::MARKER_FALLBACK);
    scene.fill(Fill::NonZero, transform, color, None, &shape);

    if marker.source == MarkerSource::Placed {
        let stroke = KurboStroke::new(PLACED_OUTLINE_WIDTH);
        scene.stroke(&stroke, transform, to_color(style::AREA_STROKE), None, &shape);
    }
}

fn fill_rect(scene: &mut Scene, transform: Affine, rect: Rect, color: Rgba) {
    scene.fill(Fill::NonZero, transform, to_color(color), None, &rect);
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn to_kurbo(r: fp_core::model::Rect) -> Rect {
    Rect::new(r.x, r.y, r.right(), r.bottom())
}

fn to_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.alpha_u8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::model::Rect as WorldRect;
    use fp_core::view::ClientRect;
    use kurbo::Point;

    #[test]
    fn affine_matches_view_transform() {
        let view = ViewTransform::new(
            ClientRect::sized(800.0, 800.0),
            WorldRect::new(0.0, 0.0, 2000.0, 1500.0),
        );
        let affine = view_affine(&view);
        for (x, y) in [(0.0, 0.0), (1000.0, 750.0), (2000.0, 1500.0), (37.5, 912.0)] {
            let expected = view.to_screen(fp_core::model::Point::new(x, y));
            let got = affine * Point::new(x, y);
            assert!((got.x - expected.x).abs() < 1e-9, "x for ({x}, {y})");
            assert!((got.y - expected.y).abs() < 1e-9, "y for ({x}, {y})");
        }
    }

    #[test]
    fn every_layer_reaches_the_scene() {
        use crate::frame::{FrameInput, build_frame};
        use fp_core::id::ResourceId;
        use fp_core::model::{LayoutDocument, PlacedNode, ResourceNode};

        let map = WorldRect::new(0.0, 0.0, 2000.0, 1500.0);
        let mut doc = LayoutDocument::default();
        doc.grid_on = false;
        doc.factory_area = Some(WorldRect::new(100.0, 100.0, 300.0, 200.0));
        doc.placed_nodes.push(PlacedNode {
            node_id: ResourceId(1),
            position: fp_core::model::Point::new(150.0, 150.0),
            thumbnail_url: None,
        });
        let catalog = [ResourceNode {
            id: ResourceId(2),
            name: "Copper".into(),
            resource_type: "copper_ore".into(),
            latitude: 900.0,
            longitude: 700.0,
            thumbnail_url: None,
        }];
        let frame = build_frame(&FrameInput {
            document: &doc,
            view_box: map,
            bounds: map,
            grid_spacing: 100.0,
            selection: None,
            catalog: &catalog,
            marker_size: 24.0,
        });

        let mut scene = Scene::new();
        let view = ViewTransform::new(ClientRect::sized(2000.0, 1500.0), map);
        paint_frame(&mut scene, &frame, view_affine(&view));
        // background, catalog tile, area fill + stroke, placed tile + outline
        assert_eq!(scene.encoding().n_paths, 6);
    }
}
