//! Planner configuration.
//!
//! Every field has a default matching the reference deployment, so a host can
//! pass a partial JSON object (or nothing at all).

use crate::model::Rect;
use serde::{Deserialize, Serialize};

/// Tunables for the planner canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// World extent of the map. Default: **2000 × 1500**.
    pub canvas_width: f64,
    pub canvas_height: f64,

    /// Size of the zoomed-in view box. Default: **400 × 300**.
    pub detail_width: f64,
    pub detail_height: f64,

    /// Grid line spacing in world units while showing the whole map.
    pub overview_grid_spacing: f64,
    /// Grid line spacing in world units while zoomed in.
    pub detail_grid_spacing: f64,

    /// Unit that selection corners snap to when the grid is on.
    /// Not tied to the drawn grid spacing. Default: **4**.
    pub snap_unit: f64,

    /// Edge length of node markers in world units. Default: **24**.
    pub marker_size: f64,

    /// Prefix for every HTTP path (empty = same origin).
    pub api_base: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            canvas_width: 2000.0,
            canvas_height: 1500.0,
            detail_width: 400.0,
            detail_height: 300.0,
            overview_grid_spacing: 100.0,
            detail_grid_spacing: 20.0,
            snap_unit: 4.0,
            marker_size: 24.0,
            api_base: String::new(),
        }
    }
}

impl PlannerConfig {
    /// Parse a JSON config, falling back to defaults for an empty or invalid
    /// string. Missing keys take their default individually.
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("invalid planner config, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// The whole map as a world rectangle.
    pub fn canvas_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.canvas_width, self.canvas_height)
    }
}
