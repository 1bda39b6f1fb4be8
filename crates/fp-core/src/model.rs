//! Layout document model for a factory planner project.
//!
//! A project persists exactly one `LayoutDocument`: the nodes placed from the
//! resource catalog, the reserved entity collections (buildings, conveyors,
//! power lines, balancers), the single optional factory area, and the grid /
//! foundation settings. All coordinates live in one fixed world space (the
//! 2000×1500 map in the reference deployment), independent of zoom.
//!
//! Unknown top-level keys are kept in `extra` so a document loaded from a
//! newer client is written back without losing anything.

use crate::id::ResourceId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in world (or, for the view transform, screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Used for the factory area and for view boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a normalized rectangle from two opposite corners, in any order.
    /// The origin is the component-wise minimum; extents are never negative.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

// ─── Placed nodes ────────────────────────────────────────────────────────

/// A resource node dropped onto the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub node_id: ResourceId,
    pub position: Point,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

// ─── Foundation ──────────────────────────────────────────────────────────

/// Foundation material for the factory area.
///
/// The three known materials have fixed render colors. Any other string is
/// kept verbatim (so it survives a save) and renders with the fallback color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Material {
    Concrete,
    Metal,
    Fiberglass,
    Other(String),
}

impl Material {
    pub fn parse(s: &str) -> Self {
        match s {
            "concrete" => Self::Concrete,
            "metal" => Self::Metal,
            "fiberglass" => Self::Fiberglass,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Concrete => "concrete",
            Self::Metal => "metal",
            Self::Fiberglass => "fiberglass",
            Self::Other(s) => s,
        }
    }
}

impl Serialize for Material {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Material {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Material::parse(&s))
    }
}

/// Foundation settings applied to the factory area.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Foundation {
    /// Foundation size in grid units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Foundation {
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.material.is_none() && self.extra.is_empty()
    }
}

// ─── Document ────────────────────────────────────────────────────────────

fn default_grid_on() -> bool {
    true
}

/// The persisted layout of one factory project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Insertion order is display order. Duplicate node ids are allowed.
    #[serde(default)]
    pub placed_nodes: Vec<PlacedNode>,
    #[serde(default)]
    pub buildings: Vec<Value>,
    #[serde(default)]
    pub conveyors: Vec<Value>,
    #[serde(default)]
    pub power_lines: Vec<Value>,
    #[serde(default)]
    pub balancers: Vec<Value>,
    /// At most one factory area; serialized as `null` when absent.
    #[serde(default)]
    pub factory_area: Option<Rect>,
    #[serde(default = "default_grid_on")]
    pub grid_on: bool,
    #[serde(default)]
    pub foundation: Foundation,
    /// Keys this version does not know about, preserved across save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self {
            placed_nodes: Vec::new(),
            buildings: Vec::new(),
            conveyors: Vec::new(),
            power_lines: Vec::new(),
            balancers: Vec::new(),
            factory_area: None,
            grid_on: true,
            foundation: Foundation::default(),
            extra: Map::new(),
        }
    }
}

impl LayoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been placed and no settings differ from defaults.
    pub fn is_blank(&self) -> bool {
        self.placed_nodes.is_empty()
            && self.buildings.is_empty()
            && self.conveyors.is_empty()
            && self.power_lines.is_empty()
            && self.balancers.is_empty()
            && self.factory_area.is_none()
            && self.grid_on
            && self.foundation.is_empty()
    }
}

// ─── Resource catalog ────────────────────────────────────────────────────

/// Accept `null` wherever a plain default would do (catalog rows come from a
/// database with nullable columns).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A record from the resource-node catalog.
///
/// `latitude` / `longitude` are world x / y on the map, not geographic
/// coordinates; the names come from the catalog's storage schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: ResourceId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub latitude: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub longitude: f64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl ResourceNode {
    /// World position of the node marker.
    pub fn position(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }

    /// Human-readable resource type: first underscore becomes a space,
    /// then upper-cased (`iron_ore` → `IRON ORE`).
    pub fn type_label(&self) -> String {
        self.resource_type.replacen('_', " ", 1).to_uppercase()
    }
}
