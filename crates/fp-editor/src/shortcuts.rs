//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Area selection ──
    StartAreaSelect,
    CancelAreaSelect,

    // ── View ──
    ToggleGrid,
    ResetZoom,

    // ── Document ──
    Save,
    Export,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"a"`, `"Escape"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // Escape always cancels, whatever else is held.
        if key == "Escape" {
            return Some(ShortcutAction::CancelAreaSelect);
        }

        if cmd {
            if shift || alt {
                return None;
            }
            return match key {
                "s" | "S" => Some(ShortcutAction::Save),
                "e" | "E" => Some(ShortcutAction::Export),
                "0" => Some(ShortcutAction::ResetZoom),
                _ => None,
            };
        }

        if alt {
            return None;
        }

        match key {
            "a" | "A" => Some(ShortcutAction::StartAreaSelect),
            "g" | "G" => Some(ShortcutAction::ToggleGrid),
            "Home" => Some(ShortcutAction::ResetZoom),
            _ => None,
        }
    }
}
