//! Render pass: planner state → display list.
//!
//! `build_frame` is the only place that decides what is visible. It is a pure
//! function of its input, so calling it twice with unchanged state yields the
//! same `Frame`, and a frame never holds more than one factory-area shape.
//! Painters (Canvas2D in the browser, Vello natively) draw a `Frame` and keep
//! no state of their own between frames.

use crate::grid::{GridLine, grid_lines};
use crate::style::{self, Rgba};
use fp_core::id::ResourceId;
use fp_core::model::{LayoutDocument, Point, Rect, ResourceNode};

/// Everything the render pass reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub document: &'a LayoutDocument,
    /// World rectangle currently shown.
    pub view_box: Rect,
    /// Full map extent.
    pub bounds: Rect,
    /// Grid spacing for the current zoom state.
    pub grid_spacing: f64,
    /// In-progress area selection, if a drag is under way.
    pub selection: Option<Rect>,
    /// Catalog nodes shown as clickable markers.
    pub catalog: &'a [ResourceNode],
    pub marker_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    Catalog,
    Placed,
}

/// A square thumbnail marker centered on a node position.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub source: MarkerSource,
    pub resource_id: ResourceId,
    pub rect: Rect,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaShape {
    pub rect: Rect,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

/// One complete display list, in paint order: background, grid, catalog
/// markers, factory area, placed markers, selection overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub view_box: Rect,
    pub bounds: Rect,
    pub background: Rgba,
    pub grid: Vec<GridLine>,
    pub grid_color: Rgba,
    pub factory_area: Option<AreaShape>,
    pub markers: Vec<Marker>,
    pub selection: Option<AreaShape>,
}

impl Frame {
    pub fn catalog_markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(|m| m.source == MarkerSource::Catalog)
    }

    pub fn placed_markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers
            .iter()
            .filter(|m| m.source == MarkerSource::Placed)
    }
}

/// Square of edge `size` centered on `center`.
pub fn marker_rect(center: Point, size: f64) -> Rect {
    Rect::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
}

pub fn build_frame(input: &FrameInput<'_>) -> Frame {
    let doc = input.document;

    let grid = if doc.grid_on {
        grid_lines(input.view_box, input.bounds, input.grid_spacing)
    } else {
        Vec::new()
    };

    let factory_area = doc.factory_area.map(|rect| AreaShape {
        rect,
        fill: style::foundation_fill(doc.foundation.material.as_ref()),
        stroke: style::AREA_STROKE,
        stroke_width: style::AREA_STROKE_WIDTH,
    });

    let catalog = input.catalog.iter().map(|node| Marker {
        source: MarkerSource::Catalog,
        resource_id: node.id,
        rect: marker_rect(node.position(), input.marker_size),
        thumbnail_url: node.thumbnail_url.clone(),
    });
    let placed = doc.placed_nodes.iter().map(|placed| Marker {
        source: MarkerSource::Placed,
        resource_id: placed.node_id,
        rect: marker_rect(placed.position, input.marker_size),
        thumbnail_url: placed.thumbnail_url.clone(),
    });
    let markers = catalog.chain(placed).collect();

    let selection = input.selection.map(|rect| AreaShape {
        rect,
        fill: style::DEFAULT_AREA_FILL,
        stroke: style::AREA_STROKE,
        stroke_width: style::AREA_STROKE_WIDTH,
    });

    log::trace!(
        "frame: view {:?}, {} grid lines, area {}, selection {}",
        input.view_box,
        grid.len(),
        factory_area.is_some(),
        selection.is_some()
    );

    Frame {
        view_box: input.view_box,
        bounds: input.bounds,
        background: style::BACKGROUND,
        grid,
        grid_color: style::GRID_LINE,
        factory_area,
        markers,
        selection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::model::{Material, PlacedNode};
    use pretty_assertions::assert_eq;

    const MAP: Rect = Rect::new(0.0, 0.0, 2000.0, 1500.0);

    fn input(doc: &LayoutDocument) -> FrameInput<'_> {
        FrameInput {
            document: doc,
            view_box: MAP,
            bounds: MAP,
            grid_spacing: 100.0,
            selection: None,
            catalog: &[],
            marker_size: 24.0,
        }
    }

    #[test]
    fn empty_document_draws_grid_only() {
        let doc = LayoutDocument::default();
        let frame = build_frame(&input(&doc));
        assert!(!frame.grid.is_empty());
        assert!(frame.factory_area.is_none());
        assert!(frame.markers.is_empty());
    }

    #[test]
    fn grid_off_draws_no_lines() {
        let mut doc = LayoutDocument::default();
        doc.grid_on = false;
        assert!(build_frame(&input(&doc)).grid.is_empty());
    }

    #[test]
    fn area_fill_follows_material() {
        let mut doc = LayoutDocument::default();
        doc.factory_area = Some(Rect::new(40.0, 20.0, 60.0, 80.0));
        let before = build_frame(&input(&doc)).factory_area.unwrap();
        assert_eq!(before.fill, style::DEFAULT_AREA_FILL);

        doc.foundation.material = Some(Material::Metal);
        let after = build_frame(&input(&doc)).factory_area.unwrap();
        assert_eq!(after.rect, before.rect);
        assert_ne!(after.fill, before.fill);
    }

    #[test]
    fn repeated_passes_are_identical() {
        let mut doc = LayoutDocument::default();
        doc.factory_area = Some(Rect::new(40.0, 20.0, 60.0, 80.0));
        let first = build_frame(&input(&doc));
        let second = build_frame(&input(&doc));
        assert_eq!(first, second);
    }

    #[test]
    fn placed_markers_are_centered_on_position() {
        let mut doc = LayoutDocument::default();
        doc.placed_nodes.push(PlacedNode {
            node_id: ResourceId(1),
            position: Point::new(400.0, 300.0),
            thumbnail_url: Some("/iron.png".into()),
        });
        let frame = build_frame(&input(&doc));
        let marker = frame.placed_markers().next().unwrap();
        assert_eq!(marker.rect, Rect::new(388.0, 288.0, 24.0, 24.0));
        assert_eq!(marker.rect.center(), Point::new(400.0, 300.0));
    }
}
