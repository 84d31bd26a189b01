//! Viewport engine: routes input to the interaction components and reports back to the host.
//!
//! [`EngineCore`] holds all interaction state and is driven one
//! [`InputEvent`] at a time. Every handler returns the [`Action`]s the host
//! must perform (redraw, re-render from a new [`Snapshot`], suppress a browser
//! default, toggle camera navigation, ...). It has no listener plumbing, so it
//! can be tested directly.
//!
//! [`Engine`] binds an `EngineCore` to event sources through the listener
//! registry and forwards actions to a host sink. Its subscriptions detach when
//! it is unbound or dropped.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::camera::{Camera, ViewFace};
use crate::command::{Command, Direction};
use crate::config::EventConfig;
use crate::history::History;
use crate::input::{Button, ClientPoint, DropPayload, DroppedFile, EventKind, InputEvent, InputState, Key, Modifiers, Platform, PointerSample, ViewportRect};
use crate::listener::{ListenerTarget, Subscription, attach};
use crate::scene::{Aabb, AxesHelper, ClipSettings, GridHelper, Node, NodeId, Scene, Transform};
use crate::selection::{HoverOutcome, HoverProbe, SelectionState, is_click, resolve_click};
use crate::shortcut::{DropDisposition, Shortcut, classify_drop, context_menu_intercepts, first_touch, resolve_focus_target, resolve_key};
use crate::transform::{DragCoordinator, TransformMode};

/// Drop effect requested while something is dragged over the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
}

/// Instruction for the host, produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the viewport.
    RenderNeeded,
    /// State changed; re-render UI from the snapshot.
    Changed(Snapshot),
    /// Suppress the browser's default handling of the current event.
    PreventDefault,
    /// Enable or disable the camera's own orbit/pan navigation.
    SetNavigationEnabled(bool),
    /// Fit the selection indicator to `bounds`, or hide it.
    SelectionBoxChanged { node: Option<NodeId>, bounds: Option<Aabb> },
    /// Refresh any visual helper attached to this node.
    HelperUpdated(NodeId),
    /// The engine moved the camera; sync the navigation controls.
    CameraMoved(Camera),
    /// Show the viewport context menu at client coordinates.
    OpenContextMenu { x: f64, y: f64 },
    SetDropEffect(DropEffect),
    /// Load dropped data-transfer items.
    LoadItems(Vec<DroppedFile>),
    /// Load dropped files.
    LoadFiles(Vec<DroppedFile>),
}

/// Context menu UI state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContextMenu {
    pub open: bool,
    pub x: f64,
    pub y: f64,
}

/// Immutable view of the interaction state, handed to the host on every change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
    pub transform_mode: TransformMode,
    pub navigation_enabled: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub context_menu: ContextMenu,
}

/// Viewport UI state that is not part of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiState {
    pub transform_mode: TransformMode,
    pub navigation_enabled: bool,
    pub context_menu: ContextMenu,
}

impl Default for UiState {
    fn default() -> Self {
        Self { transform_mode: TransformMode::default(), navigation_enabled: true, context_menu: ContextMenu::default() }
    }
}

/// Core engine state: everything except listener binding.
#[derive(Debug, Clone)]
pub struct EngineCore {
    pub scene: Scene,
    pub camera: Camera,
    pub config: EventConfig,
    pub platform: Platform,
    pub selection: SelectionState,
    pub history: History,
    pub input: InputState,
    pub drag: DragCoordinator,
    pub ui: UiState,
    /// Viewport rectangle in client coordinates; pointer input is ignored until set.
    pub viewport: Option<ViewportRect>,
    /// Objects double-click focus may land on. Every attached mesh when `None`.
    pub focus_objects: Option<Vec<NodeId>>,
    hover: HoverProbe,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EventConfig::default(), Platform::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EventConfig, platform: Platform) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            platform,
            selection: SelectionState::default(),
            history: History::with_limit(config.history_limit),
            input: InputState::default(),
            drag: DragCoordinator::new(),
            ui: UiState::default(),
            viewport: None,
            focus_objects: None,
            hover: HoverProbe::new(config.hover_throttle()),
            config,
        }
    }

    /// Route one input event to its handler.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { client, button: Button::Primary } => self.on_pointer_down(*client),
            InputEvent::PointerUp { client, button: Button::Primary } => self.on_pointer_up(*client),
            InputEvent::PointerDown { button, .. } | InputEvent::PointerUp { button, .. } => {
                tracing::trace!(?button, "non-primary button ignored for selection");
                Vec::new()
            }
            InputEvent::PointerMove { client, time } => self.on_pointer_move(*client, *time),
            InputEvent::PointerCancel => self.on_pointer_cancel(),
            InputEvent::TouchStart { touches } => match first_touch(touches) {
                Some(touch) => self.on_pointer_down(touch),
                None => Vec::new(),
            },
            InputEvent::TouchEnd { touches } => match first_touch(touches) {
                Some(touch) => self.on_pointer_up(touch),
                None => Vec::new(),
            },
            InputEvent::DoubleClick { client } => self.on_double_click(*client),
            InputEvent::ContextMenu { client } => self.on_context_menu(*client),
            InputEvent::KeyDown { key, modifiers } => self.on_key_down(key, *modifiers),
            InputEvent::DragOver { payload } => self.on_drag_over(payload.as_ref()),
            InputEvent::Drop { payload } => self.on_drop(payload.as_ref()),
            InputEvent::Resize { rect } => self.resize(*rect),
            InputEvent::Blur => self.on_blur(),
            InputEvent::CameraChanged(camera) => self.on_camera_changed(*camera),
            InputEvent::GizmoDown => self.on_gizmo_down(),
            InputEvent::GizmoChange(transform) => self.on_gizmo_change(*transform),
            InputEvent::GizmoUp => self.on_gizmo_up(),
            InputEvent::ViewCubeClick { face } => self.on_view_cube(face),
        }
    }

    // --- Pointer ---

    pub fn on_pointer_down(&mut self, client: ClientPoint) -> Vec<Action> {
        let Some(down) = self.sample(client) else {
            return Vec::new();
        };
        self.input = InputState::Pressed { down };
        Vec::new()
    }

    /// Complete a gesture. Only a click (not a drag) changes the selection.
    pub fn on_pointer_up(&mut self, client: ClientPoint) -> Vec<Action> {
        let InputState::Pressed { down } = std::mem::take(&mut self.input) else {
            tracing::debug!("pointer up without a recorded pointer down");
            return Vec::new();
        };
        let Some(up) = self.sample(client) else {
            return Vec::new();
        };
        if !is_click(down, up, self.config.click_epsilon) {
            tracing::debug!(distance = down.distance_to(up), "gesture was a drag; selection unchanged");
            return Vec::new();
        }
        let hit = resolve_click(&self.scene, &self.camera, up);
        self.select(hit)
    }

    /// Throttled hover evaluation against every attached mesh.
    pub fn on_pointer_move(&mut self, client: ClientPoint, time: Duration) -> Vec<Action> {
        let Some(sample) = self.sample(client) else {
            return Vec::new();
        };
        let objects = self.scene.meshes();
        match self.hover.probe(time, &self.scene, &self.camera, sample, &objects) {
            HoverOutcome::Throttled => {
                tracing::trace!(?time, "hover evaluation throttled");
                Vec::new()
            }
            HoverOutcome::Resolved(node) => self.set_hovered(node),
        }
    }

    /// The platform interrupted the gesture. Any manipulation in progress ends here.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        if self.drag.is_dragging() { self.end_manipulation() } else { Vec::new() }
    }

    /// The window lost focus. Any manipulation in progress ends here.
    pub fn on_blur(&mut self) -> Vec<Action> {
        self.on_pointer_cancel()
    }

    /// Focus the camera on the nearest of the focus objects under the pointer.
    pub fn on_double_click(&mut self, client: ClientPoint) -> Vec<Action> {
        let Some(sample) = self.sample(client) else {
            return Vec::new();
        };
        let objects = match &self.focus_objects {
            Some(objects) => objects.clone(),
            None => self.scene.meshes(),
        };
        match resolve_focus_target(&self.scene, &self.camera, sample, &objects) {
            Some(node) => self.focus(node),
            None => Vec::new(),
        }
    }

    pub fn on_context_menu(&mut self, client: ClientPoint) -> Vec<Action> {
        if !context_menu_intercepts(&self.config) {
            return Vec::new();
        }
        self.ui.context_menu = ContextMenu { open: true, x: client.x, y: client.y };
        vec![Action::PreventDefault, Action::OpenContextMenu { x: client.x, y: client.y }, self.changed()]
    }

    pub fn close_context_menu(&mut self) -> Vec<Action> {
        if !self.ui.context_menu.open {
            return Vec::new();
        }
        self.ui.context_menu.open = false;
        vec![self.changed()]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let Some(shortcut) = resolve_key(key, modifiers, self.platform, &self.config) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if shortcut.prevents_default() {
            actions.push(Action::PreventDefault);
        }
        actions.extend(match shortcut {
            Shortcut::DeleteSelection => self.remove_selected(),
            Shortcut::SetMode(mode) => self.set_transform_mode(mode),
            Shortcut::Undo => self.undo(),
            Shortcut::Redo => self.redo(),
            Shortcut::Focus => match self.selection.selected {
                Some(node) => self.focus(node),
                None => Vec::new(),
            },
        });
        actions
    }

    // --- Drag and drop ---

    pub fn on_drag_over(&mut self, payload: Option<&DropPayload>) -> Vec<Action> {
        if payload.is_none() {
            return Vec::new();
        }
        vec![Action::PreventDefault, Action::SetDropEffect(DropEffect::Copy)]
    }

    pub fn on_drop(&mut self, payload: Option<&DropPayload>) -> Vec<Action> {
        if payload.is_none() {
            return Vec::new();
        }
        match classify_drop(payload) {
            DropDisposition::Ignore => {
                tracing::debug!("ignoring plain-text drop");
                vec![Action::PreventDefault]
            }
            DropDisposition::LoadItems(items) => vec![Action::PreventDefault, Action::LoadItems(items)],
            DropDisposition::LoadFiles(files) => vec![Action::PreventDefault, Action::LoadFiles(files)],
        }
    }

    // --- Viewport and camera ---

    /// Track the viewport rectangle and match the camera aspect to it.
    pub fn resize(&mut self, rect: ViewportRect) -> Vec<Action> {
        self.viewport = Some(rect);
        if self.camera.set_aspect(rect.width, rect.height) {
            vec![Action::RenderNeeded]
        } else {
            tracing::debug!(width = rect.width, height = rect.height, "viewport has no area");
            Vec::new()
        }
    }

    pub fn on_camera_changed(&mut self, camera: Camera) -> Vec<Action> {
        self.camera = camera;
        vec![Action::RenderNeeded]
    }

    pub fn on_view_cube(&mut self, face: &str) -> Vec<Action> {
        let Some(face) = ViewFace::from_id(face) else {
            tracing::debug!(face, "unknown view cube face");
            return Vec::new();
        };
        self.camera.orbit_to(face);
        vec![Action::CameraMoved(self.camera), Action::RenderNeeded]
    }

    /// Frame `node` with the camera, keeping the viewing direction.
    pub fn focus(&mut self, node: NodeId) -> Vec<Action> {
        let Some(position) = self.scene.world_position(node) else {
            tracing::debug!(%node, "focus target is not in the scene");
            return Vec::new();
        };
        self.camera.focus(self.scene.world_bounds(node), position);
        vec![Action::CameraMoved(self.camera), Action::RenderNeeded]
    }

    // --- Gizmo manipulation ---

    pub fn on_gizmo_down(&mut self) -> Vec<Action> {
        if !self.drag.begin(&self.scene, self.selection.selected) {
            return Vec::new();
        }
        self.ui.navigation_enabled = false;
        vec![Action::SetNavigationEnabled(false), self.changed()]
    }

    /// Mirror the gizmo's transform onto the dragged node and refresh visuals.
    pub fn on_gizmo_change(&mut self, transform: Transform) -> Vec<Action> {
        let Some(target) = self.drag.target() else {
            tracing::trace!("gizmo change outside a manipulation");
            return Vec::new();
        };
        if let Err(err) = self.scene.set_transform(target, transform) {
            tracing::error!(%err, "failed to apply gizmo transform");
            return Vec::new();
        }
        vec![
            Action::SelectionBoxChanged { node: Some(target), bounds: self.scene.world_bounds(target) },
            Action::HelperUpdated(target),
            Action::RenderNeeded,
        ]
    }

    pub fn on_gizmo_up(&mut self) -> Vec<Action> {
        self.end_manipulation()
    }

    /// Re-enable navigation and record the manipulation, if it changed anything.
    fn end_manipulation(&mut self) -> Vec<Action> {
        self.ui.navigation_enabled = true;
        let mut actions = vec![Action::SetNavigationEnabled(true)];
        let recorded = match self.drag.end(&self.scene, self.ui.transform_mode) {
            Some(command) => self.execute(command),
            None => Vec::new(),
        };
        if recorded.is_empty() {
            actions.push(self.changed());
        }
        actions.extend(recorded);
        actions
    }

    pub fn set_transform_mode(&mut self, mode: TransformMode) -> Vec<Action> {
        self.ui.transform_mode = mode;
        vec![self.changed()]
    }

    /// Switch mode by name. An unknown name is logged and ignored.
    pub fn set_transform_mode_by_name(&mut self, name: &str) -> Vec<Action> {
        match name.parse::<TransformMode>() {
            Ok(mode) => self.set_transform_mode(mode),
            Err(err) => {
                if self.config.debug {
                    tracing::error!(%err, "transform mode not changed");
                } else {
                    tracing::warn!(%err, "transform mode not changed");
                }
                Vec::new()
            }
        }
    }

    // --- Selection ---

    /// Replace the selection. Always reports a change.
    pub fn select(&mut self, node: Option<NodeId>) -> Vec<Action> {
        self.selection.select(node);
        vec![self.selection_box(), Action::RenderNeeded, self.changed()]
    }

    /// Replace the hovered node. Always reports a change.
    pub fn set_hovered(&mut self, node: Option<NodeId>) -> Vec<Action> {
        self.selection.set_hovered(node);
        vec![self.changed()]
    }

    // --- Commands ---

    /// Run `command` and record it for undo.
    pub fn execute(&mut self, command: Command) -> Vec<Action> {
        let effect = command.selection_effect(Direction::Forward, &self.scene, self.selection.selected);
        let name = command.name();
        match self.history.execute(command, &mut self.scene) {
            Ok(()) => {
                tracing::debug!(command = name, "executed");
                self.committed(effect)
            }
            Err(err) => {
                tracing::error!(command = name, %err, "command failed");
                Vec::new()
            }
        }
    }

    pub fn undo(&mut self) -> Vec<Action> {
        let selected = self.selection.selected;
        match self.history.undo(&mut self.scene) {
            Ok(Some(command)) => {
                let effect = command.selection_effect(Direction::Backward, &self.scene, selected);
                tracing::debug!(command = command.name(), "undone");
                self.committed(effect)
            }
            Ok(None) => {
                tracing::debug!("nothing to undo");
                Vec::new()
            }
            Err(err) => {
                tracing::error!(%err, "undo failed");
                Vec::new()
            }
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let selected = self.selection.selected;
        match self.history.redo(&mut self.scene) {
            Ok(Some(command)) => {
                let effect = command.selection_effect(Direction::Forward, &self.scene, selected);
                tracing::debug!(command = command.name(), "redone");
                self.committed(effect)
            }
            Ok(None) => {
                tracing::debug!("nothing to redo");
                Vec::new()
            }
            Err(err) => {
                tracing::error!(%err, "redo failed");
                Vec::new()
            }
        }
    }

    pub fn clear_history(&mut self) -> Vec<Action> {
        self.history.clear(&mut self.scene);
        vec![self.changed()]
    }

    /// Insert `node` and attach it under `parent` (the root when `None`) at
    /// `index` (appended when `None`).
    pub fn add_object(&mut self, node: Node, parent: Option<NodeId>, index: Option<usize>) -> Vec<Action> {
        let id = match self.scene.insert(node) {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(%err, "object not added");
                return Vec::new();
            }
        };
        let command = Command::add_object(&self.scene, id, parent, index);
        let actions = self.execute(command);
        if actions.is_empty() {
            self.scene.purge_detached(&[id], &HashSet::new());
        }
        actions
    }

    /// Detach `node` from its parent. A parentless node is left alone.
    pub fn remove_object(&mut self, node: NodeId) -> Vec<Action> {
        match Command::remove_object(&self.scene, node) {
            Some(command) => self.execute(command),
            None => {
                tracing::debug!(%node, "remove ignored; node has no parent");
                Vec::new()
            }
        }
    }

    pub fn remove_selected(&mut self) -> Vec<Action> {
        match self.selection.selected {
            Some(node) => self.remove_object(node),
            None => Vec::new(),
        }
    }

    pub fn add_camera(&mut self, id: NodeId, camera: Camera) -> Vec<Action> {
        self.execute(Command::AddCamera { id, camera })
    }

    pub fn update_grid(&mut self, grid: GridHelper) -> Vec<Action> {
        match Command::set_grid(&self.scene, grid) {
            Some(command) => self.execute(command),
            None => Vec::new(),
        }
    }

    pub fn update_axes(&mut self, axes: AxesHelper) -> Vec<Action> {
        match Command::set_axes(&self.scene, axes) {
            Some(command) => self.execute(command),
            None => Vec::new(),
        }
    }

    /// Apply a sparse update to the global clipping plane.
    pub fn clip_global(&mut self, settings: &ClipSettings) -> Vec<Action> {
        let plane = self.scene.helpers().clip.with_settings(settings);
        match Command::set_clip_plane(&self.scene, plane) {
            Some(command) => self.execute(command),
            None => Vec::new(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            selected: self.selection.selected,
            hovered: self.selection.hovered,
            transform_mode: self.ui.transform_mode,
            navigation_enabled: self.ui.navigation_enabled,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            context_menu: self.ui.context_menu,
        }
    }

    // --- Internal ---

    fn sample(&self, client: ClientPoint) -> Option<PointerSample> {
        let sample = self.viewport.as_ref().and_then(|rect| rect.normalize(client));
        if sample.is_none() {
            tracing::debug!("pointer input before the viewport has an area");
        }
        sample
    }

    fn changed(&self) -> Action {
        Action::Changed(self.snapshot())
    }

    fn selection_box(&self) -> Action {
        let node = self.selection.selected;
        Action::SelectionBoxChanged { node, bounds: node.and_then(|n| self.scene.world_bounds(n)) }
    }

    /// Actions after a history mutation: one render and one change notification.
    fn committed(&mut self, effect: Option<Option<NodeId>>) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(selected) = effect {
            self.selection.select(selected);
            actions.push(self.selection_box());
        }
        actions.push(Action::RenderNeeded);
        actions.push(self.changed());
        actions
    }
}

// =============================================================================
// BINDING
// =============================================================================

/// Host callback receiving every action the engine produces.
pub type ActionSink = Rc<dyn Fn(Action)>;

/// The event sources a viewport listens to.
pub struct Targets {
    pub window: Rc<dyn ListenerTarget>,
    pub document: Rc<dyn ListenerTarget>,
    /// The viewport element.
    pub canvas: Rc<dyn ListenerTarget>,
    /// The transform gizmo.
    pub gizmo: Rc<dyn ListenerTarget>,
    /// Camera navigation controls.
    pub controls: Rc<dyn ListenerTarget>,
    pub view_cube: Rc<dyn ListenerTarget>,
}

const WINDOW_EVENTS: &[EventKind] = &[EventKind::Resize, EventKind::Blur];
const DOCUMENT_EVENTS: &[EventKind] = &[EventKind::KeyDown, EventKind::DragOver, EventKind::Drop];
const CANVAS_EVENTS: &[EventKind] = &[
    EventKind::PointerDown,
    EventKind::PointerUp,
    EventKind::PointerMove,
    EventKind::PointerCancel,
    EventKind::TouchStart,
    EventKind::TouchEnd,
    EventKind::DoubleClick,
    EventKind::ContextMenu,
];
const GIZMO_EVENTS: &[EventKind] = &[EventKind::GizmoDown, EventKind::GizmoChange, EventKind::GizmoUp];
const CONTROLS_EVENTS: &[EventKind] = &[EventKind::CameraChanged];
const VIEW_CUBE_EVENTS: &[EventKind] = &[EventKind::ViewCubeClick];

/// An [`EngineCore`] bound to event sources.
pub struct Engine {
    core: Rc<RefCell<EngineCore>>,
    sink: ActionSink,
    subscriptions: Vec<Subscription>,
}

impl Engine {
    pub fn new<F>(core: EngineCore, sink: F) -> Self
    where
        F: Fn(Action) + 'static,
    {
        Self { core: Rc::new(RefCell::new(core)), sink: Rc::new(sink), subscriptions: Vec::new() }
    }

    /// Listen for each of `kinds` on `target`.
    pub fn bind(&mut self, target: &Rc<dyn ListenerTarget>, kinds: &[EventKind]) {
        for &kind in kinds {
            let core = Rc::downgrade(&self.core);
            let sink = Rc::clone(&self.sink);
            self.subscriptions.push(attach(target, kind, move |event| {
                deliver(&core, &sink, |core| core.handle(event));
            }));
        }
    }

    /// Listen on every viewport event source.
    pub fn bind_defaults(&mut self, targets: &Targets) {
        self.bind(&targets.window, WINDOW_EVENTS);
        self.bind(&targets.document, DOCUMENT_EVENTS);
        self.bind(&targets.canvas, CANVAS_EVENTS);
        self.bind(&targets.gizmo, GIZMO_EVENTS);
        self.bind(&targets.controls, CONTROLS_EVENTS);
        self.bind(&targets.view_cube, VIEW_CUBE_EVENTS);
    }

    /// Detach every listener.
    pub fn unbind(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.detach();
        }
        self.subscriptions.clear();
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Handle an event directly. Returns `false` if it was dropped as re-entrant.
    pub fn dispatch(&self, event: &InputEvent) -> bool {
        self.perform(|core| core.handle(event))
    }

    /// Run a host operation against the core and forward its actions.
    /// Returns `false` if it was dropped as re-entrant.
    pub fn perform<F>(&self, op: F) -> bool
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        deliver(&Rc::downgrade(&self.core), &self.sink, op)
    }

    /// Borrow the core for inspection.
    #[must_use]
    pub fn core(&self) -> Ref<'_, EngineCore> {
        self.core.borrow()
    }
}

/// Run `op` on the core, then hand its actions to the sink after releasing the borrow.
fn deliver<F>(core: &Weak<RefCell<EngineCore>>, sink: &ActionSink, op: F) -> bool
where
    F: FnOnce(&mut EngineCore) -> Vec<Action>,
{
    let Some(core) = core.upgrade() else {
        return false;
    };
    let actions = match core.try_borrow_mut() {
        Ok(mut core) => op(&mut core),
        Err(_) => {
            tracing::warn!("re-entrant dispatch dropped");
            return false;
        }
    };
    for action in actions {
        sink(action);
    }
    true
}
