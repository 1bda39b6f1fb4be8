//! Fixed palette for the planner canvas.

use fp_core::model::Material;

/// An 8-bit RGB color with a fractional alpha, as written in CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha scaled to a byte, for painters that want `rgba8`.
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Translucent fill for the factory area and for the in-progress selection.
pub const AREA_FILL_ALPHA: f32 = 0.3;

pub const DEFAULT_AREA_FILL: Rgba = Rgba::new(34, 197, 94, AREA_FILL_ALPHA);
pub const AREA_STROKE: Rgba = Rgba::opaque(0x22, 0xc5, 0x5e);
pub const AREA_STROKE_WIDTH: f64 = 2.0;

pub const BACKGROUND: Rgba = Rgba::opaque(0xf5, 0xf5, 0xf4);
pub const GRID_LINE: Rgba = Rgba::new(0, 0, 0, 0.08);
pub const MARKER_FALLBACK: Rgba = Rgba::opaque(0x4b, 0x55, 0x63);

/// Fill color of the factory area for the chosen foundation material.
/// Unset or unknown materials use the default translucent green.
pub fn foundation_fill(material: Option<&Material>) -> Rgba {
    match material {
        Some(Material::Concrete) => Rgba::new(107, 114, 128, AREA_FILL_ALPHA),
        Some(Material::Metal) => Rgba::new(156, 163, 175, AREA_FILL_ALPHA),
        Some(Material::Fiberglass) => Rgba::new(22, 163, 74, AREA_FILL_ALPHA),
        Some(Material::Other(_)) | None => DEFAULT_AREA_FILL,
    }
}
