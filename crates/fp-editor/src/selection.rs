//! Area selection: the rubber-band tool that picks the factory area.
//!
//! ```text
//!  Idle ──start──▶ Selecting ──pointer-down──▶ Dragging ──pointer-up──▶ Idle
//!    ▲                 │                          │        (commit)
//!    └────cancel───────┴──────────cancel──────────┘
//! ```
//!
//! Each state owns the listener guards it needs. Transitions move the state
//! out, build the next one, and let the previous variant drop whatever guards
//! it did not hand over.

use crate::listen::{ListenTarget, ListenerGuard, ListenerRegistry};
use fp_core::model::{Point, Rect};
use fp_core::snap::snap_point;

/// Whether pointer positions are snapped, and to what unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapping {
    pub enabled: bool,
    pub unit: f64,
}

impl Snapping {
    pub const OFF: Self = Self {
        enabled: false,
        unit: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        snap_point(p, self.unit, self.enabled)
    }
}

/// Cursor affordance for the canvas element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Crosshair,
}

impl Cursor {
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Crosshair => "crosshair",
        }
    }
}

#[derive(Debug, Default)]
enum SelectionState {
    #[default]
    Idle,
    Selecting {
        _pointer_down: ListenerGuard,
        escape: ListenerGuard,
    },
    Dragging {
        start: Point,
        overlay: Rect,
        _pointer_move: ListenerGuard,
        _pointer_up: ListenerGuard,
        _escape: ListenerGuard,
    },
}

/// Observable phase of an area selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Selecting,
    Dragging,
}

#[derive(Debug)]
pub struct AreaSelectTool {
    state: SelectionState,
    listeners: ListenerRegistry,
}

impl AreaSelectTool {
    pub fn new(listeners: ListenerRegistry) -> Self {
        Self {
            state: SelectionState::Idle,
            listeners,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        match self.state {
            SelectionState::Idle => SelectionPhase::Idle,
            SelectionState::Selecting { .. } => SelectionPhase::Selecting,
            SelectionState::Dragging { .. } => SelectionPhase::Dragging,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, SelectionState::Idle)
    }

    /// The in-progress rectangle, only while dragging.
    pub fn overlay(&self) -> Option<Rect> {
        match self.state {
            SelectionState::Dragging { overlay, .. } => Some(overlay),
            _ => None,
        }
    }

    pub fn cursor(&self) -> Cursor {
        if self.is_active() {
            Cursor::Crosshair
        } else {
            Cursor::Default
        }
    }

    /// Enter selection mode. Returns `false` if a selection is already active.
    pub fn start(&mut self) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = SelectionState::Selecting {
            _pointer_down: self.listeners.acquire(ListenTarget::CanvasPointerDown),
            escape: self.listeners.acquire(ListenTarget::WindowKeyDown),
        };
        log::debug!("selection: idle → selecting");
        true
    }

    /// Pointer pressed on the canvas. Begins a drag when selecting.
    pub fn pointer_down(&mut self, world: Point, snapping: Snapping) -> bool {
        match std::mem::take(&mut self.state) {
            SelectionState::Selecting { escape, .. } => {
                let start = snapping.apply(world);
                self.state = SelectionState::Dragging {
                    start,
                    overlay: Rect::new(start.x, start.y, 0.0, 0.0),
                    _pointer_move: self.listeners.acquire(ListenTarget::WindowPointerMove),
                    _pointer_up: self.listeners.acquire(ListenTarget::WindowPointerUp),
                    _escape: escape,
                };
                log::debug!("selection: selecting → dragging from {start:?}");
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Pointer moved during a drag. Returns the updated overlay.
    pub fn pointer_move(&mut self, world: Point, snapping: Snapping) -> Option<Rect> {
        match &mut self.state {
            SelectionState::Dragging { start, overlay, .. } => {
                *overlay = Rect::from_corners(*start, snapping.apply(world));
                Some(*overlay)
            }
            _ => None,
        }
    }

    /// Pointer released. The release point is the drag's last move; the
    /// overlay as it then stands is the committed rectangle.
    pub fn pointer_up(&mut self, world: Point, snapping: Snapping) -> Option<Rect> {
        self.pointer_move(world, snapping);
        match std::mem::take(&mut self.state) {
            SelectionState::Dragging { overlay, .. } => {
                log::debug!("selection: dragging → idle, committed {overlay:?}");
                Some(overlay)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Abandon any selection in progress. Safe in every state.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = SelectionState::Idle;
        if was_active {
            log::debug!("selection: cancelled");
        }
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GRID_ON: Snapping = Snapping {
        enabled: true,
        unit: 4.0,
    };

    fn tool() -> (AreaSelectTool, ListenerRegistry) {
        let registry = ListenerRegistry::new();
        (AreaSelectTool::new(registry.clone()), registry)
    }

    #[test]
    fn start_acquires_pointer_down_and_escape() {
        let (mut t, reg) = tool();
        assert!(t.start());
        assert_eq!(t.phase(), SelectionPhase::Selecting);
        assert_eq!(t.cursor(), Cursor::Crosshair);
        assert_eq!(
            reg.held().as_slice(),
            &[ListenTarget::CanvasPointerDown, ListenTarget::WindowKeyDown]
        );
    }

    #[test]
    fn start_twice_is_noop() {
        let (mut t, reg) = tool();
        t.start();
        assert!(!t.start());
        drop(t);
        assert!(reg.is_empty());
    }

    #[test]
    fn drag_swaps_pointer_down_for_move_and_up() {
        let (mut t, reg) = tool();
        t.start();
        assert!(t.pointer_down(Point::new(10.0, 10.0), Snapping::OFF));
        assert_eq!(
            reg.held().as_slice(),
            &[
                ListenTarget::WindowPointerMove,
                ListenTarget::WindowPointerUp,
                ListenTarget::WindowKeyDown
            ]
        );
        assert_eq!(t.overlay(), Some(Rect::new(10.0, 10.0, 0.0, 0.0)));
    }

    #[test]
    fn reverse_drag_normalizes() {
        let (mut t, _reg) = tool();
        t.start();
        t.pointer_down(Point::new(100.0, 100.0), Snapping::OFF);
        t.pointer_move(Point::new(70.0, 50.0), Snapping::OFF);
        assert_eq!(t.overlay(), Some(Rect::new(70.0, 50.0, 30.0, 50.0)));
        let area = t.pointer_up(Point::new(40.0, 20.0), Snapping::OFF);
        assert_eq!(area, Some(Rect::new(40.0, 20.0, 60.0, 80.0)));
    }

    #[test]
    fn corners_snap_when_grid_on() {
        let (mut t, _reg) = tool();
        t.start();
        t.pointer_down(Point::new(9.9, 1.0), GRID_ON);
        let area = t.pointer_up(Point::new(30.1, 21.0), GRID_ON).unwrap();
        assert_eq!(area, Rect::new(8.0, 0.0, 24.0, 20.0));
    }

    #[test]
    fn commit_is_the_overlay_last_drawn() {
        let (mut t, _reg) = tool();
        t.start();
        t.pointer_down(Point::new(10.0, 10.0), GRID_ON);
        let drawn = t.pointer_move(Point::new(61.0, 43.0), GRID_ON);
        let committed = t.pointer_up(Point::new(61.0, 43.0), GRID_ON);
        assert_eq!(committed, drawn);
        assert_eq!(committed, Some(Rect::new(12.0, 12.0, 48.0, 32.0)));
    }

    #[test]
    fn commit_releases_everything() {
        let (mut t, reg) = tool();
        t.start();
        t.pointer_down(Point::new(0.0, 0.0), Snapping::OFF);
        t.pointer_up(Point::new(5.0, 5.0), Snapping::OFF);
        assert_eq!(t.phase(), SelectionPhase::Idle);
        assert_eq!(t.cursor(), Cursor::Default);
        assert!(reg.is_empty());
    }

    #[test]
    fn cancel_from_each_state() {
        let (mut t, reg) = tool();
        assert!(!t.cancel());

        t.start();
        assert!(t.cancel());
        assert!(reg.is_empty());

        t.start();
        t.pointer_down(Point::new(1.0, 1.0), Snapping::OFF);
        assert!(t.cancel());
        assert!(t.overlay().is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn pointer_events_outside_a_selection_are_ignored() {
        let (mut t, reg) = tool();
        assert!(!t.pointer_down(Point::new(1.0, 1.0), Snapping::OFF));
        assert_eq!(t.pointer_move(Point::new(2.0, 2.0), Snapping::OFF), None);
        assert_eq!(t.pointer_up(Point::new(3.0, 3.0), Snapping::OFF), None);
        assert!(reg.is_empty());
    }
}
