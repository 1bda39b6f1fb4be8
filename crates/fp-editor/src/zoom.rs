//! Zoom / view controller.
//!
//! Two states: the overview shows the whole map with a coarse grid; a click
//! zooms into a fixed-size detail view around the click point with a finer
//! grid. A click in the detail view goes back to the overview.

use fp_core::config::PlannerConfig;
use fp_core::model::{Point, Rect};
use fp_core::view::clamped_view_box;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomState {
    Overview,
    Detail { center: Point },
}

#[derive(Debug, Clone)]
pub struct ViewController {
    state: ZoomState,
    bounds: Rect,
    detail_width: f64,
    detail_height: f64,
    overview_grid: f64,
    detail_grid: f64,
}

impl ViewController {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            state: ZoomState::Overview,
            bounds: config.canvas_bounds(),
            detail_width: config.detail_width,
            detail_height: config.detail_height,
            overview_grid: config.overview_grid_spacing,
            detail_grid: config.detail_grid_spacing,
        }
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Toggle between overview and a detail view centered on `world`.
    pub fn click(&mut self, world: Point) -> ZoomState {
        self.state = match self.state {
            ZoomState::Overview => ZoomState::Detail { center: world },
            ZoomState::Detail { .. } => ZoomState::Overview,
        };
        log::debug!("zoom: {:?}", self.state);
        self.state
    }

    /// Return to the overview. Returns `true` if the view changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.state != ZoomState::Overview;
        self.state = ZoomState::Overview;
        changed
    }

    /// World rectangle currently shown. Always inside the map bounds unless
    /// the detail size itself exceeds them.
    pub fn view_box(&self) -> Rect {
        match self.state {
            ZoomState::Overview => self.bounds,
            ZoomState::Detail { center } => {
                clamped_view_box(center, self.detail_width, self.detail_height, self.bounds)
            }
        }
    }

    pub fn grid_spacing(&self) -> f64 {
        match self.state {
            ZoomState::Overview => self.overview_grid,
            ZoomState::Detail { .. } => self.detail_grid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn controller() -> ViewController {
        ViewController::new(&PlannerConfig::default())
    }

    #[test]
    fn starts_in_overview() {
        let z = controller();
        assert_eq!(z.state(), ZoomState::Overview);
        assert_eq!(z.view_box(), Rect::new(0.0, 0.0, 2000.0, 1500.0));
        assert_eq!(z.grid_spacing(), 100.0);
    }

    #[test]
    fn click_zooms_in_then_out() {
        let mut z = controller();
        z.click(Point::new(1000.0, 750.0));
        assert_eq!(z.view_box(), Rect::new(800.0, 600.0, 400.0, 300.0));
        assert_eq!(z.grid_spacing(), 20.0);
        z.click(Point::new(900.0, 700.0));
        assert_eq!(z.state(), ZoomState::Overview);
    }

    #[test]
    fn detail_view_is_clamped_at_every_edge() {
        let bounds = Rect::new(0.0, 0.0, 2000.0, 1500.0);
        let clicks = [
            (0.0, 0.0),
            (1990.0, 5.0),
            (10.0, 1495.0),
            (2000.0, 1500.0),
            (-50.0, 3000.0),
            (1000.0, 750.0),
        ];
        for (x, y) in clicks {
            let mut z = controller();
            z.click(Point::new(x, y));
            let vb = z.view_box();
            let inside = vb.x >= bounds.x
                && vb.y >= bounds.y
                && vb.right() <= bounds.right()
                && vb.bottom() <= bounds.bottom();
            assert!(inside, "{vb:?} escapes map for click ({x}, {y})");
        }
    }

    #[test]
    fn reset_reports_change() {
        let mut z = controller();
        assert!(!z.reset());
        z.click(Point::new(10.0, 10.0));
        assert!(z.reset());
        assert_eq!(z.state(), ZoomState::Overview);
    }
}
