//! DOM side of the listener scopes.
//!
//! The planner session decides which listener scopes are held; this keeps
//! the real DOM registrations in step with them. A closure removed from the
//! DOM may be the one currently running (a `pointerup` handler that commits
//! the selection retires itself), so retired closures are parked until the
//! next reconciliation instead of being dropped immediately.

use fp_editor::listen::ListenTarget;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, Window};

pub type Handler = Closure<dyn FnMut(Event)>;

pub struct DomListeners {
    canvas: HtmlCanvasElement,
    window: Window,
    attached: Vec<(ListenTarget, Handler)>,
    retired: Vec<Handler>,
}

impl DomListeners {
    pub fn new(canvas: HtmlCanvasElement, window: Window) -> Self {
        Self {
            canvas,
            window,
            attached: Vec::new(),
            retired: Vec::new(),
        }
    }

    fn event_target(&self, target: ListenTarget) -> &EventTarget {
        if target.on_window() {
            self.window.unchecked_ref()
        } else {
            self.canvas.unchecked_ref()
        }
    }

    /// Attach a handler for every target in `held` that lacks one and
    /// detach every handler whose target is no longer held.
    pub fn sync(&mut self, held: &[ListenTarget], mut make: impl FnMut(ListenTarget) -> Handler) {
        self.retired.clear();

        let (keep, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.attached)
            .into_iter()
            .partition(|(target, _)| held.contains(target));
        self.attached = keep;
        for (target, handler) in stale {
            self.detach(target, handler);
        }

        for &target in held {
            if self.attached.iter().any(|(t, _)| *t == target) {
                continue;
            }
            let handler = make(target);
            let result = self.event_target(target).add_event_listener_with_callback(
                target.event_type(),
                handler.as_ref().unchecked_ref(),
            );
            match result {
                Ok(()) => self.attached.push((target, handler)),
                Err(e) => log::warn!("listen: could not attach {target:?}: {e:?}"),
            }
        }
    }

    /// Remove every DOM registration.
    pub fn detach_all(&mut self) {
        for (target, handler) in std::mem::take(&mut self.attached) {
            self.detach(target, handler);
        }
    }

    fn detach(&mut self, target: ListenTarget, handler: Handler) {
        if let Err(e) = self.event_target(target).remove_event_listener_with_callback(
            target.event_type(),
            handler.as_ref().unchecked_ref(),
        ) {
            log::warn!("listen: could not detach {target:?}: {e:?}");
        }
        self.retired.push(handler);
    }

    pub fn attached(&self) -> impl Iterator<Item = ListenTarget> + '_ {
        self.attached.iter().map(|(t, _)| *t)
    }
}

impl Drop for DomListeners {
    fn drop(&mut self) {
        self.detach_all();
    }
}
