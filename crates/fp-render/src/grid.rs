//! Grid line generation.
//!
//! Lines sit on multiples of `spacing` in world space, so they stay anchored
//! to the map as the view changes. Only the part of the grid that is both
//! visible and inside the map is produced.

use fp_core::model::{Point, Rect};

/// Upper bound on lines per axis; a pathological spacing must not stall a frame.
const MAX_LINES_PER_AXIS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Grid lines covering `view_box ∩ bounds` at the given world spacing.
pub fn grid_lines(view_box: Rect, bounds: Rect, spacing: f64) -> Vec<GridLine> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Vec::new();
    }

    let left = view_box.x.max(bounds.x);
    let top = view_box.y.max(bounds.y);
    let right = view_box.right().min(bounds.right());
    let bottom = view_box.bottom().min(bounds.bottom());
    if right < left || bottom < top {
        return Vec::new();
    }

    let mut lines = Vec::new();

    for x in multiples_within(left, right, spacing) {
        lines.push(GridLine {
            from: Point::new(x, top),
            to: Point::new(x, bottom),
        });
    }
    for y in multiples_within(top, bottom, spacing) {
        lines.push(GridLine {
            from: Point::new(left, y),
            to: Point::new(right, y),
        });
    }

    lines
}

fn multiples_within(lo: f64, hi: f64, spacing: f64) -> impl Iterator<Item = f64> {
    let first = (lo / spacing).ceil() as i64;
    let last = (hi / spacing).floor() as i64;
    (first..=last)
        .take(MAX_LINES_PER_AXIS)
        .map(move |k| k as f64 * spacing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Rect {
        Rect::new(0.0, 0.0, 2000.0, 1500.0)
    }

    #[test]
    fn overview_grid_covers_map() {
        let lines = grid_lines(map(), map(), 100.0);
        // 0..=2000 step 100 → 21 vertical, 0..=1500 → 16 horizontal
        assert_eq!(lines.len(), 21 + 16);
    }

    #[test]
    fn detail_grid_is_finer_and_clipped_to_view() {
        let view = Rect::new(810.0, 600.0, 400.0, 300.0);
        let lines = grid_lines(view, map(), 20.0);
        let vertical: Vec<_> = lines.iter().filter(|l| l.from.x == l.to.x).collect();
        assert_eq!(vertical.first().unwrap().from.x, 820.0);
        assert_eq!(vertical.last().unwrap().from.x, 1200.0);
        assert!(lines.iter().all(|l| view.contains(l.from) && view.contains(l.to)));
    }

    #[test]
    fn regenerating_is_stable() {
        let view = Rect::new(100.0, 100.0, 400.0, 300.0);
        assert_eq!(grid_lines(view, map(), 20.0), grid_lines(view, map(), 20.0));
    }

    #[test]
    fn invalid_spacing_yields_nothing() {
        assert!(grid_lines(map(), map(), 0.0).is_empty());
        assert!(grid_lines(map(), map(), -5.0).is_empty());
    }

    #[test]
    fn view_outside_map_yields_nothing() {
        let view = Rect::new(3000.0, 3000.0, 100.0, 100.0);
        assert!(grid_lines(view, map(), 20.0).is_empty());
    }
}
