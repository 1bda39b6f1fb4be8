//! Scoped event-listener ownership.
//!
//! Every live event registration the planner needs is represented by a
//! `ListenerGuard`. State machines keep their guards inside the state variant
//! that needs them, so leaving the variant drops the guard and releases the
//! registration. The browser bridge reads `ListenerRegistry::held` after each
//! transition and attaches or removes DOM listeners to match.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// An event source the planner may listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    /// `pointerdown` on the canvas element.
    CanvasPointerDown,
    /// `pointermove` on the window, so drags continue past the canvas edge.
    WindowPointerMove,
    /// `pointerup` on the window.
    WindowPointerUp,
    /// `keydown` on the window (Escape cancels a selection).
    WindowKeyDown,
}

impl ListenTarget {
    pub const ALL: [ListenTarget; 4] = [
        ListenTarget::CanvasPointerDown,
        ListenTarget::WindowPointerMove,
        ListenTarget::WindowPointerUp,
        ListenTarget::WindowKeyDown,
    ];

    /// DOM event type.
    pub fn event_type(self) -> &'static str {
        match self {
            ListenTarget::CanvasPointerDown => "pointerdown",
            ListenTarget::WindowPointerMove => "pointermove",
            ListenTarget::WindowPointerUp => "pointerup",
            ListenTarget::WindowKeyDown => "keydown",
        }
    }

    pub fn on_window(self) -> bool {
        !matches!(self, ListenTarget::CanvasPointerDown)
    }
}

type Held = Rc<RefCell<SmallVec<[ListenTarget; 4]>>>;

/// Shared record of held listener scopes. Cloning shares the record.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    held: Held,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a scope on `target`. It stays held until the guard drops.
    pub fn acquire(&self, target: ListenTarget) -> ListenerGuard {
        self.held.borrow_mut().push(target);
        log::debug!("listen: acquire {target:?}");
        ListenerGuard {
            target,
            held: Rc::clone(&self.held),
        }
    }

    pub fn is_held(&self, target: ListenTarget) -> bool {
        self.held.borrow().contains(&target)
    }

    /// Distinct targets with at least one live scope.
    pub fn held(&self) -> SmallVec<[ListenTarget; 4]> {
        ListenTarget::ALL
            .into_iter()
            .filter(|t| self.is_held(*t))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.held.borrow().is_empty()
    }
}

/// One live listener scope. Dropping it releases the registration.
#[derive(Debug)]
pub struct ListenerGuard {
    target: ListenTarget,
    held: Held,
}

impl ListenerGuard {
    pub fn target(&self) -> ListenTarget {
        self.target
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut held = self.held.borrow_mut();
        if let Some(pos) = held.iter().position(|t| *t == self.target) {
            held.remove(pos);
            log::debug!("listen: release {:?}", self.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let registry = ListenerRegistry::new();
        let guard = registry.acquire(ListenTarget::WindowKeyDown);
        assert!(registry.is_held(ListenTarget::WindowKeyDown));
        drop(guard);
        assert!(registry.is_empty());
    }

    #[test]
    fn overlapping_scopes_on_one_target() {
        let registry = ListenerRegistry::new();
        let a = registry.acquire(ListenTarget::WindowKeyDown);
        let b = registry.acquire(ListenTarget::WindowKeyDown);
        assert_eq!(registry.held().as_slice(), &[ListenTarget::WindowKeyDown]);
        drop(a);
        assert!(registry.is_held(ListenTarget::WindowKeyDown));
        drop(b);
        assert!(!registry.is_held(ListenTarget::WindowKeyDown));
    }

    #[test]
    fn held_is_reported_in_stable_order() {
        let registry = ListenerRegistry::new();
        let _up = registry.acquire(ListenTarget::WindowPointerUp);
        let _down = registry.acquire(ListenTarget::CanvasPointerDown);
        assert_eq!(
            registry.held().as_slice(),
            &[ListenTarget::CanvasPointerDown, ListenTarget::WindowPointerUp]
        );
    }
}
