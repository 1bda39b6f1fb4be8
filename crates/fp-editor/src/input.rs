//! Input abstraction layer.
//!
//! Normalizes DOM pointer and keyboard events into a unified `InputEvent`
//! consumed by the planner session. Positions are client-space CSS pixels;
//! the session maps them to world coordinates.

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// A completed click on the canvas (DOM `click`).
    Click { x: f64, y: f64 },
    /// Pointer moving over the canvas outside any drag (tooltips).
    Hover { x: f64, y: f64 },
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }
}

