//! Grid snapping for world coordinates.
//!
//! The selection snap unit is independent of the grid line spacing used for
//! drawing, which changes with the zoom level.

use crate::model::Point;

/// Round `value` to the nearest multiple of `unit`.
///
/// A non-positive or non-finite unit leaves the value unchanged.
pub fn snap(value: f64, unit: f64) -> f64 {
    if !(unit.is_finite() && unit > 0.0) {
        return value;
    }
    (value / unit).round() * unit
}

/// Snap both axes of `p` when `enabled`, otherwise pass it through.
pub fn snap_point(p: Point, unit: f64, enabled: bool) -> Point {
    if !enabled {
        return p;
    }
    Point::new(snap(p.x, unit), snap(p.y, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_multiple() {
        assert_eq!(snap(9.9, 4.0), 8.0);
        assert_eq!(snap(10.0, 4.0), 12.0);
        assert_eq!(snap(-5.0, 4.0), -4.0);
        assert_eq!(snap(0.0, 4.0), 0.0);
    }

    #[test]
    fn snap_is_idempotent() {
        let units = [1.0, 2.5, 4.0, 20.0, 100.0];
        let mut v = -1234.567;
        while v < 2500.0 {
            for u in units {
                let once = snap(v, u);
                assert_eq!(snap(once, u), once, "v={v} u={u}");
            }
            v += 13.37;
        }
    }

    #[test]
    fn disabled_snapping_passes_through() {
        let p = Point::new(41.3, 18.9);
        assert_eq!(snap_point(p, 4.0, false), p);
        assert_eq!(snap_point(p, 4.0, true), Point::new(40.0, 20.0));
    }

    #[test]
    fn degenerate_unit_is_identity() {
        assert_eq!(snap(7.3, 0.0), 7.3);
        assert_eq!(snap(7.3, -4.0), 7.3);
        assert_eq!(snap(7.3, f64::NAN), 7.3);
    }
}
