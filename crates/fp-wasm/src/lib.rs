//! WASM bridge for the factory planner: exposes the planner session to the
//! host page.
//!
//! Compiled via `wasm-pack build --target web`. The host page forwards
//! clicks, hover, and keyboard shortcuts; the bridge itself owns only the
//! scoped listeners an area selection needs, attaching and removing them
//! as the selection moves between states.

mod listeners;
mod net;
mod render2d;

use fp_core::config::PlannerConfig;
use fp_core::error::PlannerError;
use fp_core::id::ResourceId;
use fp_core::view::{ClientRect, ViewTransform};
use fp_editor::input::{InputEvent, Modifiers};
use fp_editor::listen::ListenTarget;
use fp_editor::placement::ResourceSelection;
use fp_editor::planner::{Handled, PlannerSession};
use fp_editor::shortcuts::ShortcutAction;
use listeners::{DomListeners, Handler};
use render2d::ImageCache;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent};

struct Shared {
    session: PlannerSession,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: ImageCache,
    /// Host callback receiving the save status JSON after each save.
    on_save_status: Option<js_sys::Function>,
}

impl Shared {
    /// Re-read the canvas position; page scroll and layout move it.
    fn refresh_client_rect(&mut self) {
        let r = self.canvas.get_bounding_client_rect();
        self.session
            .resize(ClientRect::new(r.left(), r.top(), r.width(), r.height()));
    }

    fn render(&mut self) {
        // Paint in canvas-local pixels; the page offset only matters for input.
        let current = self.session.view_transform();
        let view = ViewTransform::new(
            ClientRect::sized(current.client.width, current.client.height),
            current.view_box,
        );
        let frame = self.session.frame();
        let dpr = device_pixel_ratio();
        if let Err(e) = render2d::render_frame(&self.ctx, &frame, &view, dpr, &mut self.images) {
            log::warn!("render failed: {e:?}");
        }
        if let Err(e) = self
            .canvas
            .style()
            .set_property("cursor", self.session.cursor().as_css())
        {
            log::warn!("could not set cursor: {e:?}");
        }
    }

    fn save_status_json(&self) -> String {
        serde_json::to_string(self.session.save_status()).unwrap_or_default()
    }
}

/// The main WASM-facing planner controller.
///
/// Holds the planner session, the canvas, and the DOM listeners of the
/// current selection scope. All interaction from the host page goes through
/// this struct.
#[wasm_bindgen]
pub struct PlannerCanvas {
    shared: Rc<RefCell<Shared>>,
    dom: Rc<RefCell<DomListeners>>,
}

#[wasm_bindgen]
impl PlannerCanvas {
    /// Open a project on `canvas`. `project_data` is the stored layout JSON
    /// (empty or invalid input opens a blank layout); `config_json` may be
    /// empty.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        project_id: u32,
        project_data: &str,
        config_json: &str,
    ) -> Result<PlannerCanvas, JsValue> {
        init_logging();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let config = PlannerConfig::from_json(config_json);
        let session = PlannerSession::new(u64::from(project_id), project_data, config);

        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Shared>>| {
            let weak = weak.clone();
            RefCell::new(Shared {
                session,
                canvas: canvas.clone(),
                ctx,
                images: ImageCache::new(move || redraw(&weak)),
                on_save_status: None,
            })
        });
        let dom = Rc::new(RefCell::new(DomListeners::new(canvas, window)));

        let planner = Self { shared, dom };
        planner.resize();
        Ok(planner)
    }

    /// Draw the current state.
    pub fn render(&self) {
        self.shared.borrow_mut().render();
    }

    /// Match the backing store to the canvas's CSS size and redraw.
    pub fn resize(&self) {
        let mut shared = self.shared.borrow_mut();
        shared.refresh_client_rect();
        let client = shared.session.view_transform().client;
        let dpr = device_pixel_ratio();
        shared.canvas.set_width((client.width * dpr).round() as u32);
        shared.canvas.set_height((client.height * dpr).round() as u32);
        shared.render();
    }

    // ─── Area selection ──────────────────────────────────────────────────

    pub fn start_area_select(&self) -> bool {
        self.transition(|s| s.start_area_select())
    }

    pub fn cancel_area_select(&self) -> bool {
        self.transition(|s| s.cancel_area_select())
    }

    // ─── Document settings ───────────────────────────────────────────────

    pub fn toggle_grid(&self, on: bool) {
        self.transition(|s| {
            s.toggle_grid(on);
            true
        });
    }

    pub fn choose_foundation_size(&self, size: u32) {
        self.transition(|s| {
            s.choose_foundation_size(size);
            true
        });
    }

    pub fn choose_material(&self, material: &str) {
        self.transition(|s| {
            s.choose_material(material);
            true
        });
    }

    pub fn foundation_controls_visible(&self) -> bool {
        self.shared.borrow().session.foundation_controls_visible()
    }

    // ─── Resources ───────────────────────────────────────────────────────

    /// Place a node from a "resource selected" notification. Returns JSON:
    /// `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn select_resource(&self, json: &str) -> String {
        let result = ResourceSelection::from_json(json).map(|selection| {
            self.transition(|s| {
                s.select_resource(selection);
                true
            });
        });
        status_json(result)
    }

    /// Fetch one catalog record and place it.
    pub fn select_resource_by_id(&self, id: u32) {
        let url = self
            .shared
            .borrow()
            .session
            .resource_url(ResourceId::new(u64::from(id)));
        let shared = Rc::downgrade(&self.shared);
        spawn_local(async move {
            match net::fetch_resource(&url).await {
                Ok(node) => with_shared(&shared, |s| {
                    s.session.select_resource(node.into());
                    s.render();
                }),
                Err(e) => log::warn!("resource {id}: {e}"),
            }
        });
    }

    /// Fetch the resource catalog and show its markers.
    pub fn load_catalog(&self) {
        let url = self.shared.borrow().session.catalog_url();
        let shared = Rc::downgrade(&self.shared);
        spawn_local(async move {
            match net::fetch_catalog(&url).await {
                Ok(nodes) => with_shared(&shared, |s| {
                    s.session.set_catalog(nodes);
                    s.render();
                }),
                Err(e) => log::warn!("catalog: {e}"),
            }
        });
    }

    // ─── Host-forwarded input ────────────────────────────────────────────

    /// Canvas click at client coordinates. Returns true if anything changed.
    pub fn handle_click(&self, x: f64, y: f64) -> bool {
        dispatch(&self.shared, &self.dom, InputEvent::Click { x, y }).redraw
    }

    /// Pointer hover at client coordinates. Returns the tooltip JSON
    /// (`{"name","label","x","y"}`) or `null`.
    pub fn handle_pointer_hover(&self, x: f64, y: f64) -> String {
        let mut shared = self.shared.borrow_mut();
        shared.refresh_client_rect();
        let tooltip = shared.session.hover(x, y);
        serde_json::to_string(&tooltip).unwrap_or_else(|_| "null".to_string())
    }

    /// Keyboard shortcut. Returns true if the key was bound.
    pub fn handle_key(&self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let handled = dispatch(&self.shared, &self.dom, InputEvent::key(key, modifiers));
        match handled.host_action {
            Some(ShortcutAction::Save) => self.save(),
            Some(ShortcutAction::Export) => self.export_download(),
            _ => {}
        }
        handled.redraw || handled.host_action.is_some()
    }

    pub fn reset_zoom(&self) -> bool {
        self.transition(|s| s.reset_zoom())
    }

    pub fn cursor(&self) -> String {
        self.shared.borrow().session.cursor().as_css().to_string()
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Start saving the project. Progress is reported through
    /// `save_status` and the `on_save_status` callback.
    pub fn save(&self) {
        let (url, body) = {
            let mut shared = self.shared.borrow_mut();
            match shared.session.begin_save() {
                Ok(body) => (shared.session.save_url(), body),
                Err(e) => {
                    log::warn!("save: {e}");
                    drop(shared);
                    notify_save_status(&Rc::downgrade(&self.shared));
                    return;
                }
            }
        };
        let csrf = net::csrf_token();
        let shared = Rc::downgrade(&self.shared);
        notify_save_status(&shared);
        spawn_local(async move {
            let result = net::save_project(&url, body, csrf).await;
            with_shared(&shared, |s| s.session.finish_save(result));
            notify_save_status(&shared);
        });
    }

    /// Save status JSON: `{"state":"idle"|"saving"|"saved"}` or
    /// `{"state":"failed","message":"..."}`.
    pub fn save_status(&self) -> String {
        self.shared.borrow().save_status_json()
    }

    /// Register a callback invoked with the save status JSON.
    pub fn on_save_status(&self, callback: Option<js_sys::Function>) {
        self.shared.borrow_mut().on_save_status = callback;
    }

    /// Pretty-printed layout JSON, as downloaded by `export_download`.
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.shared
            .borrow()
            .session
            .export_json()
            .map_err(to_js)
    }

    /// Offer the layout as a `factory_project_{id}_layout.json` download.
    pub fn export_download(&self) {
        let export = {
            let shared = self.shared.borrow();
            shared
                .session
                .export_json()
                .map(|json| (json, shared.session.export_file_name()))
        };
        let result = export
            .map_err(to_js)
            .and_then(|(json, name)| download(&json, &name));
        if let Err(e) = result {
            log::warn!("export failed: {e:?}");
        }
    }

    /// Compact layout JSON.
    pub fn get_document_json(&self) -> Result<String, JsValue> {
        self.shared
            .borrow()
            .session
            .document_json()
            .map_err(to_js)
    }

    /// Cancel any selection and remove every listener the bridge added.
    pub fn teardown(&self) {
        {
            let mut shared = self.shared.borrow_mut();
            shared.session.teardown();
            shared.images.clear();
        }
        sync_listeners(&self.shared, &self.dom);
        self.dom.borrow_mut().detach_all();
    }
}

impl PlannerCanvas {
    /// Run a session operation, then redraw and reconcile listeners if it
    /// reports a change.
    fn transition(&self, op: impl FnOnce(&mut PlannerSession) -> bool) -> bool {
        let changed = {
            let mut shared = self.shared.borrow_mut();
            let changed = op(&mut shared.session);
            if changed {
                shared.render();
            }
            changed
        };
        sync_listeners(&self.shared, &self.dom);
        changed
    }
}

// ─── Event plumbing ──────────────────────────────────────────────────────

fn dispatch(shared: &Rc<RefCell<Shared>>, dom: &Rc<RefCell<DomListeners>>, event: InputEvent) -> Handled {
    let handled = {
        let mut s = shared.borrow_mut();
        s.refresh_client_rect();
        let handled = s.session.handle(&event);
        if handled.redraw {
            s.render();
        }
        handled
    };
    sync_listeners(shared, dom);
    handled
}

fn sync_listeners(shared: &Rc<RefCell<Shared>>, dom: &Rc<RefCell<DomListeners>>) {
    let held = shared.borrow().session.listeners().held();
    let weak_shared = Rc::downgrade(shared);
    let weak_dom = Rc::downgrade(dom);
    let mut dom = dom.borrow_mut();
    dom.sync(&held, |target| scoped_handler(target, weak_shared.clone(), weak_dom.clone()));
    log::trace!("listeners: {:?}", dom.attached().collect::<Vec<_>>());
}

/// The DOM callback for one listener scope.
fn scoped_handler(target: ListenTarget, shared: Weak<RefCell<Shared>>, dom: Weak<RefCell<DomListeners>>) -> Handler {
    Closure::wrap(Box::new(move |event: Event| {
        let (Some(shared), Some(dom)) = (shared.upgrade(), dom.upgrade()) else {
            return;
        };
        if let Some(input) = to_input(target, &event) {
            event.prevent_default();
            dispatch(&shared, &dom, input);
        }
    }) as Box<dyn FnMut(Event)>)
}

fn to_input(target: ListenTarget, event: &Event) -> Option<InputEvent> {
    if target == ListenTarget::WindowKeyDown {
        // Other keys reach the session through the host's `handle_key`.
        let key = event.dyn_ref::<KeyboardEvent>()?;
        return (key.key() == "Escape").then(|| InputEvent::key("Escape", Modifiers::NONE));
    }
    let mouse = event.dyn_ref::<MouseEvent>()?;
    let (x, y) = (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
    Some(match target {
        ListenTarget::CanvasPointerDown => InputEvent::PointerDown { x, y },
        ListenTarget::WindowPointerMove => InputEvent::PointerMove { x, y },
        ListenTarget::WindowPointerUp => InputEvent::PointerUp { x, y },
        ListenTarget::WindowKeyDown => return None,
    })
}

fn with_shared(shared: &Weak<RefCell<Shared>>, f: impl FnOnce(&mut Shared)) {
    if let Some(shared) = shared.upgrade()
        && let Ok(mut s) = shared.try_borrow_mut()
    {
        f(&mut s);
    }
}

fn redraw(shared: &Weak<RefCell<Shared>>) {
    with_shared(shared, Shared::render);
}

fn notify_save_status(shared: &Weak<RefCell<Shared>>) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let (callback, status) = {
        let s = shared.borrow();
        (s.on_save_status.clone(), s.save_status_json())
    };
    if let Some(callback) = callback
        && let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&status))
    {
        log::warn!("save status callback failed: {e:?}");
    }
}

// ─── Browser helpers ─────────────────────────────────────────────────────

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| *r > 0.0)
        .unwrap_or(1.0)
}

/// Delay before the export's object URL is released; revoking it in the same
/// task as the click can cancel the download.
const REVOKE_DELAY_MS: i32 = 1_000;

fn download(json: &str, file_name: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    let revoke = Closure::once_into_js(move || {
        if let Err(e) = web_sys::Url::revoke_object_url(&url) {
            log::warn!("planner: could not revoke export URL: {e:?}");
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        revoke.unchecked_ref(),
        REVOKE_DELAY_MS,
    )?;
    Ok(())
}

fn to_js(e: PlannerError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn status_json(result: Result<(), PlannerError>) -> String {
    match result {
        Ok(()) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("factory planner panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if let Err(e) = console_log::init_with_level(log::Level::Info) {
                web_sys::console::warn_1(&format!("logger already set: {e}").into());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_json_shapes() {
        assert_eq!(status_json(Ok(())), r#"{"ok":true}"#);
        let err = status_json(Err(PlannerError::SaveRejected { status: 500 }));
        let v: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"], "save rejected by server (status 500)");
    }
}
