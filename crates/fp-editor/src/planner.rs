//! Planner session: the authoritative layout document plus the interaction
//! state around it.
//!
//! Every document change goes through `apply_mutation`. Input arrives already
//! normalized (`InputEvent`) in client-space pixels; the session maps it to
//! world coordinates with the current view transform, routes it to the area
//! selection tool or the zoom controller, and reports whether a redraw is
//! needed. Rendering is `frame()`, a pure function of the session state.

use crate::input::{InputEvent, Modifiers};
use crate::listen::ListenerRegistry;
use crate::placement::ResourceSelection;
use crate::selection::{AreaSelectTool, Cursor, SelectionPhase, Snapping};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::zoom::{ViewController, ZoomState};
use fp_core::config::PlannerConfig;
use fp_core::error::PlannerError;
use fp_core::id::ResourceId;
use fp_core::model::{LayoutDocument, Material, PlacedNode, Point, Rect, ResourceNode};
use fp_core::persist;
use fp_core::view::{ClientRect, ViewTransform};
use fp_render::frame::{Frame, FrameInput, build_frame};
use fp_render::hit::hit_catalog;
use serde::Serialize;

/// A single change to the layout document.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutMutation {
    SetFactoryArea(Rect),
    SetGrid(bool),
    SetFoundationSize(u32),
    SetMaterial(Material),
    PlaceNode(PlacedNode),
}

/// Feedback for the last explicit save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed(String),
}

/// What a canvas click did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Ignored,
    Placed(ResourceId),
    Zoomed(ZoomState),
}

/// Hover card for a catalog marker, positioned in client pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub name: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

const TOOLTIP_OFFSET_X: f64 = 12.0;
const TOOLTIP_OFFSET_Y: f64 = -28.0;

/// Result of routing one input event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Handled {
    pub redraw: bool,
    /// Set when a shortcut asks the host to save or export.
    pub host_action: Option<ShortcutAction>,
}

impl Handled {
    fn redraw(redraw: bool) -> Self {
        Self {
            redraw,
            host_action: None,
        }
    }
}

pub struct PlannerSession {
    project_id: u64,
    document: LayoutDocument,
    config: PlannerConfig,
    client: ClientRect,
    listeners: ListenerRegistry,
    selection: AreaSelectTool,
    zoom: ViewController,
    catalog: Vec<ResourceNode>,
    save_status: SaveStatus,
    /// The DOM delivers a `click` right after the `pointerup` that ends a
    /// drag; that click must not zoom or place.
    suppress_click: bool,
}

impl PlannerSession {
    /// Open a project from its persisted JSON (empty or invalid input yields
    /// the empty document).
    pub fn new(project_id: u64, raw: &str, config: PlannerConfig) -> Self {
        Self::from_document(project_id, persist::load_document(raw), config)
    }

    pub fn from_document(project_id: u64, document: LayoutDocument, config: PlannerConfig) -> Self {
        let listeners = ListenerRegistry::new();
        let client = ClientRect::sized(config.canvas_width, config.canvas_height);
        log::info!(
            "planner: open project {project_id} ({} placed nodes, area {})",
            document.placed_nodes.len(),
            document.factory_area.is_some()
        );
        Self {
            project_id,
            selection: AreaSelectTool::new(listeners.clone()),
            zoom: ViewController::new(&config),
            document,
            config,
            client,
            listeners,
            catalog: Vec::new(),
            save_status: SaveStatus::Idle,
            suppress_click: false,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn catalog(&self) -> &[ResourceNode] {
        &self.catalog
    }

    pub fn selection_phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom.state()
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn cursor(&self) -> Cursor {
        self.selection.cursor()
    }

    /// Foundation size/material controls are shown once an area exists.
    pub fn foundation_controls_visible(&self) -> bool {
        self.document.factory_area.is_some()
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Track the canvas element's client rect.
    pub fn resize(&mut self, client: ClientRect) {
        self.client = client;
    }

    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform::new(self.client, self.zoom.view_box())
    }

    pub fn to_world(&self, x: f64, y: f64) -> Point {
        self.view_transform().to_world(Point::new(x, y))
    }

    /// Back to the overview. Refused while an area selection is in progress,
    /// since its start point was mapped through the current view.
    pub fn reset_zoom(&mut self) -> bool {
        if self.selection.is_active() {
            return false;
        }
        self.zoom.reset()
    }

    fn snapping(&self) -> Snapping {
        Snapping {
            enabled: self.document.grid_on,
            unit: self.config.snap_unit,
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    pub fn apply_mutation(&mut self, mutation: LayoutMutation) {
        log::debug!("planner: {mutation:?}");
        let doc = &mut self.document;
        match mutation {
            LayoutMutation::SetFactoryArea(area) => doc.factory_area = Some(area),
            LayoutMutation::SetGrid(on) => doc.grid_on = on,
            LayoutMutation::SetFoundationSize(size) => doc.foundation.size = Some(size),
            LayoutMutation::SetMaterial(material) => doc.foundation.material = Some(material),
            LayoutMutation::PlaceNode(node) => doc.placed_nodes.push(node),
        }
    }

    pub fn toggle_grid(&mut self, on: bool) {
        self.apply_mutation(LayoutMutation::SetGrid(on));
    }

    pub fn choose_foundation_size(&mut self, size: u32) {
        self.apply_mutation(LayoutMutation::SetFoundationSize(size));
    }

    pub fn choose_material(&mut self, material: &str) {
        self.apply_mutation(LayoutMutation::SetMaterial(Material::parse(material)));
    }

    /// Append a node for a "resource selected" notification.
    pub fn select_resource(&mut self, selection: ResourceSelection) {
        let node = selection.into_placed();
        log::info!("planner: placed {} at {:?}", node.node_id, node.position);
        self.apply_mutation(LayoutMutation::PlaceNode(node));
    }

    /// Replace the catalog markers.
    pub fn set_catalog(&mut self, nodes: Vec<ResourceNode>) {
        log::debug!("planner: catalog has {} nodes", nodes.len());
        self.catalog = nodes;
    }

    // ─── Area selection ──────────────────────────────────────────────────

    pub fn start_area_select(&mut self) -> bool {
        self.selection.start()
    }

    pub fn cancel_area_select(&mut self) -> bool {
        self.selection.cancel()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let world = self.to_world(x, y);
        let snapping = self.snapping();
        self.selection.pointer_down(world, snapping)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let world = self.to_world(x, y);
        let snapping = self.snapping();
        self.selection.pointer_move(world, snapping).is_some()
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        let world = self.to_world(x, y);
        let snapping = self.snapping();
        match self.selection.pointer_up(world, snapping) {
            Some(area) => {
                log::info!("planner: factory area {area:?}");
                self.apply_mutation(LayoutMutation::SetFactoryArea(area));
                self.suppress_click = true;
                true
            }
            None => false,
        }
    }

    // ─── Click / hover ───────────────────────────────────────────────────

    /// A click places the catalog node under the pointer, otherwise toggles
    /// the zoom. Ignored while a selection is active and right after one ends.
    pub fn click(&mut self, x: f64, y: f64) -> ClickOutcome {
        if std::mem::take(&mut self.suppress_click) || self.selection.is_active() {
            return ClickOutcome::Ignored;
        }
        let world = self.to_world(x, y);

        let hit = hit_catalog(&self.frame(), world)
            .and_then(|id| self.catalog.iter().rev().find(|n| n.id == id).cloned());
        if let Some(node) = hit {
            let id = node.id;
            self.select_resource(node.into());
            return ClickOutcome::Placed(id);
        }

        ClickOutcome::Zoomed(self.zoom.click(world))
    }

    /// Tooltip for the catalog marker under the pointer, if any.
    pub fn hover(&mut self, x: f64, y: f64) -> Option<Tooltip> {
        // Any movement after a drag means the next click is a fresh one.
        self.suppress_click = false;
        if self.selection.is_active() {
            return None;
        }
        let world = self.to_world(x, y);
        let id = hit_catalog(&self.frame(), world)?;
        let node = self.catalog.iter().rev().find(|n| n.id == id)?;
        Some(Tooltip {
            name: node.name.clone(),
            label: node.type_label(),
            x: x + TOOLTIP_OFFSET_X,
            y: y + TOOLTIP_OFFSET_Y,
        })
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and perform a shortcut. Save and export are returned for the
    /// host to carry out.
    pub fn key(&mut self, key: &str, modifiers: Modifiers) -> Handled {
        let Some(action) =
            ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta)
        else {
            return Handled::default();
        };
        log::debug!("planner: shortcut {key:?} → {action:?}");
        match action {
            ShortcutAction::StartAreaSelect => Handled::redraw(self.start_area_select()),
            ShortcutAction::CancelAreaSelect => Handled::redraw(self.cancel_area_select()),
            ShortcutAction::ToggleGrid => {
                let on = !self.document.grid_on;
                self.toggle_grid(on);
                Handled::redraw(true)
            }
            ShortcutAction::ResetZoom => Handled::redraw(self.reset_zoom()),
            ShortcutAction::Save | ShortcutAction::Export => Handled {
                redraw: false,
                host_action: Some(action),
            },
        }
    }

    /// Route one normalized input event.
    pub fn handle(&mut self, event: &InputEvent) -> Handled {
        match event {
            InputEvent::PointerDown { x, y } => Handled::redraw(self.pointer_down(*x, *y)),
            InputEvent::PointerMove { x, y } => Handled::redraw(self.pointer_move(*x, *y)),
            InputEvent::PointerUp { x, y } => Handled::redraw(self.pointer_up(*x, *y)),
            InputEvent::Click { x, y } => {
                Handled::redraw(self.click(*x, *y) != ClickOutcome::Ignored)
            }
            InputEvent::Hover { x, y } => {
                self.hover(*x, *y);
                Handled::default()
            }
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    // ─── Render pass ─────────────────────────────────────────────────────

    pub fn frame(&self) -> Frame {
        build_frame(&FrameInput {
            document: &self.document,
            view_box: self.zoom.view_box(),
            bounds: self.zoom.bounds(),
            grid_spacing: self.zoom.grid_spacing(),
            selection: self.selection.overlay(),
            catalog: &self.catalog,
            marker_size: self.config.marker_size,
        })
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save_url(&self) -> String {
        persist::project_url(&self.config.api_base, self.project_id)
    }

    pub fn catalog_url(&self) -> String {
        persist::catalog_url(&self.config.api_base)
    }

    pub fn resource_url(&self, id: ResourceId) -> String {
        persist::resource_url(&self.config.api_base, id)
    }

    /// Encode the save request body and mark the save as in flight.
    pub fn begin_save(&mut self) -> Result<String, PlannerError> {
        match persist::save_body(&self.document) {
            Ok(body) => {
                self.save_status = SaveStatus::Saving;
                Ok(body)
            }
            Err(e) => {
                self.save_status = SaveStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Record the outcome of a save request. The document is never touched.
    pub fn finish_save(&mut self, result: Result<(), PlannerError>) {
        self.save_status = match result {
            Ok(()) => {
                log::info!("planner: project {} saved", self.project_id);
                SaveStatus::Saved
            }
            Err(e) => {
                log::warn!("planner: save failed: {e}");
                SaveStatus::Failed(e.to_string())
            }
        };
    }

    pub fn export_json(&self) -> Result<String, PlannerError> {
        persist::to_pretty_json(&self.document)
    }

    pub fn export_file_name(&self) -> String {
        persist::export_file_name(self.project_id)
    }

    pub fn document_json(&self) -> Result<String, PlannerError> {
        persist::to_json(&self.document)
    }

    /// Release every listener scope and drop transient overlays.
    pub fn teardown(&mut self) {
        self.selection.cancel();
        self.suppress_click = false;
        log::debug!("planner: teardown of project {}", self.project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> PlannerSession {
        // Client rect equal to the map: screen pixels == world units in overview.
        PlannerSession::new(7, "", PlannerConfig::default())
    }

    #[test]
    fn blank_project_defaults() {
        let s = session();
        assert!(s.document().is_blank());
        assert!(s.document().grid_on);
        assert!(!s.foundation_controls_visible());
        assert_eq!(s.save_status(), &SaveStatus::Idle);
    }

    #[test]
    fn mutations_apply_in_order() {
        let mut s = session();
        s.apply_mutation(LayoutMutation::SetGrid(false));
        s.apply_mutation(LayoutMutation::SetFoundationSize(8));
        s.apply_mutation(LayoutMutation::SetMaterial(Material::Metal));
        let doc = s.document();
        assert!(!doc.grid_on);
        assert_eq!(doc.foundation.size, Some(8));
        assert_eq!(doc.foundation.material, Some(Material::Metal));
    }

    #[test]
    fn shortcut_toggles_grid() {
        let mut s = session();
        let handled = s.key("g", Modifiers::NONE);
        assert!(handled.redraw);
        assert!(!s.document().grid_on);
        s.key("g", Modifiers::NONE);
        assert!(s.document().grid_on);
    }

    #[test]
    fn save_shortcut_is_left_to_host() {
        let mut s = session();
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(s.key("s", cmd).host_action, Some(ShortcutAction::Save));
        assert_eq!(s.save_status(), &SaveStatus::Idle);
    }

    #[test]
    fn save_lifecycle() {
        let mut s = session();
        let body = s.begin_save().unwrap();
        assert!(body.starts_with(r#"{"data":"#));
        assert_eq!(s.save_status(), &SaveStatus::Saving);

        s.finish_save(Err(PlannerError::SaveRejected { status: 422 }));
        assert_eq!(
            s.save_status(),
            &SaveStatus::Failed("save rejected by server (status 422)".into())
        );
        assert!(s.document().is_blank());

        s.begin_save().unwrap();
        s.finish_save(Ok(()));
        assert_eq!(s.save_status(), &SaveStatus::Saved);
    }

    #[test]
    fn save_status_json_shape() {
        assert_eq!(
            serde_json::to_string(&SaveStatus::Failed("offline".into())).unwrap(),
            r#"{"state":"failed","message":"offline"}"#
        );
        assert_eq!(
            serde_json::to_string(&SaveStatus::Saved).unwrap(),
            r#"{"state":"saved"}"#
        );
    }

    #[test]
    fn export_does_not_touch_save_status() {
        let s = session();
        let json = s.export_json().unwrap();
        assert!(json.contains("\n  \"placed_nodes\""));
        assert_eq!(s.export_file_name(), "factory_project_7_layout.json");
        assert_eq!(s.save_status(), &SaveStatus::Idle);
    }
}
