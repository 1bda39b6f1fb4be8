//! Screen ↔ world coordinate transforms.
//!
//! The planner shows a *view box* (a rectangle of world space) inside the
//! canvas element. The view box is scaled uniformly to fit the element's
//! client rect and centered along the slack axis, the same framing an SVG
//! `viewBox` with `preserveAspectRatio="xMidYMid meet"` produces.
//! `to_world` and `to_screen` are exact inverses of each other.

use crate::model::{Point, Rect};

/// The canvas element's position and size in CSS pixels
/// (as reported by `getBoundingClientRect`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A client rect anchored at the page origin.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Pairing of a client rect with the world-space view box shown inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub client: ClientRect,
    pub view_box: Rect,
}

impl ViewTransform {
    pub const fn new(client: ClientRect, view_box: Rect) -> Self {
        Self { client, view_box }
    }

    /// Screen pixels per world unit. Zero when either rect is degenerate.
    pub fn scale(&self) -> f64 {
        let vb = &self.view_box;
        if vb.width <= 0.0 || vb.height <= 0.0 {
            return 0.0;
        }
        let s = (self.client.width / vb.width).min(self.client.height / vb.height);
        if s.is_finite() && s > 0.0 { s } else { 0.0 }
    }

    /// Screen position of the view box's top-left corner.
    fn origin(&self, scale: f64) -> Point {
        let vb = &self.view_box;
        Point::new(
            self.client.left + (self.client.width - vb.width * scale) / 2.0,
            self.client.top + (self.client.height - vb.height * scale) / 2.0,
        )
    }

    /// Map a pointer position (CSS pixels, client space) to world coordinates.
    ///
    /// With a degenerate client rect every point maps to the view box origin.
    pub fn to_world(&self, screen: Point) -> Point {
        let s = self.scale();
        if s == 0.0 {
            return Point::new(self.view_box.x, self.view_box.y);
        }
        let o = self.origin(s);
        Point::new(
            (screen.x - o.x) / s + self.view_box.x,
            (screen.y - o.y) / s + self.view_box.y,
        )
    }

    /// Map a world position to client-space CSS pixels.
    pub fn to_screen(&self, world: Point) -> Point {
        let s = self.scale();
        let o = self.origin(s);
        Point::new(
            (world.x - self.view_box.x) * s + o.x,
            (world.y - self.view_box.y) * s + o.y,
        )
    }
}

/// Build a `width × height` view box centered on `center`, shifted so it stays
/// inside `bounds`. On an axis where the box is larger than `bounds` it is
/// pinned to the bounds' origin.
pub fn clamped_view_box(center: Point, width: f64, height: f64, bounds: Rect) -> Rect {
    let clamp_axis = |c: f64, size: f64, lo: f64, extent: f64| -> f64 {
        let start = c - size / 2.0;
        let max_start = lo + extent - size;
        if max_start < lo {
            lo
        } else {
            start.clamp(lo, max_start)
        }
    };

    Rect::new(
        clamp_axis(center.x, width, bounds.x, bounds.width),
        clamp_axis(center.y, height, bounds.y, bounds.height),
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    #[test]
    fn identity_when_client_matches_view_box() {
        let t = ViewTransform::new(
            ClientRect::sized(2000.0, 1500.0),
            Rect::new(0.0, 0.0, 2000.0, 1500.0),
        );
        assert!(approx(t.to_world(Point::new(10.0, 20.0)), Point::new(10.0, 20.0)));
    }

    #[test]
    fn letterboxes_along_slack_axis() {
        // 1000×1000 element showing a 2000×1500 map: scale 0.5, 125px bands
        // above and below.
        let t = ViewTransform::new(
            ClientRect::sized(1000.0, 1000.0),
            Rect::new(0.0, 0.0, 2000.0, 1500.0),
        );
        assert!((t.scale() - 0.5).abs() < EPSILON);
        assert!(approx(t.to_screen(Point::new(0.0, 0.0)), Point::new(0.0, 125.0)));
        assert!(approx(t.to_world(Point::new(500.0, 500.0)), Point::new(1000.0, 750.0)));
    }

    #[test]
    fn accounts_for_element_offset_and_view_box_origin() {
        let t = ViewTransform::new(
            ClientRect::new(50.0, 80.0, 800.0, 600.0),
            Rect::new(600.0, 450.0, 400.0, 300.0),
        );
        // scale = 2, no slack
        assert!(approx(t.to_world(Point::new(50.0, 80.0)), Point::new(600.0, 450.0)));
        assert!(approx(t.to_world(Point::new(850.0, 680.0)), Point::new(1000.0, 750.0)));
    }

    #[test]
    fn to_screen_inverts_to_world() {
        let t = ViewTransform::new(
            ClientRect::new(13.0, 7.0, 917.0, 611.0),
            Rect::new(120.0, 40.0, 400.0, 300.0),
        );
        for (x, y) in [(0.0, 0.0), (13.0, 7.0), (500.5, 300.25), (930.0, 618.0)] {
            let p = Point::new(x, y);
            assert!(approx(t.to_screen(t.to_world(p)), p));
        }
    }

    #[test]
    fn degenerate_client_maps_to_view_origin() {
        let t = ViewTransform::new(ClientRect::sized(0.0, 0.0), Rect::new(5.0, 6.0, 400.0, 300.0));
        assert_eq!(t.to_world(Point::new(99.0, 99.0)), Point::new(5.0, 6.0));
    }

    #[test]
    fn clamped_view_box_stays_inside_bounds() {
        let bounds = Rect::new(0.0, 0.0, 2000.0, 1500.0);
        let vb = clamped_view_box(Point::new(10.0, 1490.0), 400.0, 300.0, bounds);
        assert_eq!(vb, Rect::new(0.0, 1200.0, 400.0, 300.0));
        let vb = clamped_view_box(Point::new(1000.0, 750.0), 400.0, 300.0, bounds);
        assert_eq!(vb, Rect::new(800.0, 600.0, 400.0, 300.0));
    }

    #[test]
    fn oversized_view_box_pins_to_origin() {
        let bounds = Rect::new(0.0, 0.0, 300.0, 200.0);
        let vb = clamped_view_box(Point::new(150.0, 100.0), 400.0, 100.0, bounds);
        assert_eq!(vb.x, 0.0);
        assert_eq!(vb.y, 50.0);
    }
}
