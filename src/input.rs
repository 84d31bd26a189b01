//! Input model: events, modifier keys, buttons, platform, pointer samples, drop payloads.
//!
//! `InputEvent` is the single vocabulary every event source speaks, whether it
//! is the window, the document, the canvas element, or a control object such
//! as the transform gizmo. `InputState` is the pointer gesture being tracked
//! between pointer-down and pointer-up.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::time::Duration;

use crate::camera::Camera;
use crate::scene::Transform;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the platform's primary shortcut modifier is held.
    #[must_use]
    pub fn primary(self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.meta,
            Platform::Other => self.ctrl,
        }
    }
}

/// Host platform, which decides the primary shortcut modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Command (meta) is the primary modifier.
    Mac,
    /// Ctrl is the primary modifier.
    #[default]
    Other,
}

impl Platform {
    /// Classify a navigator platform string such as `"MacIntel"` or `"Win32"`.
    #[must_use]
    pub fn from_navigator(platform: &str) -> Self {
        if platform.to_uppercase().contains("MAC") {
            Self::Mac
        } else {
            Self::Other
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` index.
    #[must_use]
    pub fn from_index(index: i16) -> Self {
        match index {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Lowercased key name, used for all comparisons.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// The key as a single lowercase character, if it is one.
    #[must_use]
    pub fn letter(&self) -> Option<char> {
        let mut chars = self.0.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// Client-area position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientPoint {
    pub x: f64,
    pub y: f64,
}

impl ClientPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer position normalized to `[0, 1]` over the viewport rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The viewport element's bounding rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// `(coord - origin) / size` per axis. `None` for an empty rectangle.
    #[must_use]
    pub fn normalize(&self, point: ClientPoint) -> Option<PointerSample> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(PointerSample::new((point.x - self.left) / self.width, (point.y - self.top) / self.height))
    }
}

/// A dragged file or data-transfer item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub mime: String,
}

/// The data-transfer content of a drag-over or drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropPayload {
    /// Declared payload types in order (e.g. `"Files"`, `"text/plain"`).
    pub types: Vec<String>,
    /// The item list, when the host exposes one (supports folders).
    pub items: Option<Vec<DroppedFile>>,
    /// The flat file list.
    pub files: Vec<DroppedFile>,
}

/// Identifies an event variant, for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerDown,
    PointerUp,
    PointerMove,
    PointerCancel,
    TouchStart,
    TouchEnd,
    DoubleClick,
    ContextMenu,
    KeyDown,
    DragOver,
    Drop,
    Resize,
    Blur,
    CameraChanged,
    GizmoDown,
    GizmoChange,
    GizmoUp,
    ViewCubeClick,
}

/// Every input the interaction layer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { client: ClientPoint, button: Button },
    PointerUp { client: ClientPoint, button: Button },
    /// `time` is the host event timestamp, used for hover throttling.
    PointerMove { client: ClientPoint, time: Duration },
    /// The pointer gesture was interrupted by the platform.
    PointerCancel,
    /// `touches` holds the changed touches; only the first is used.
    TouchStart { touches: Vec<ClientPoint> },
    TouchEnd { touches: Vec<ClientPoint> },
    DoubleClick { client: ClientPoint },
    ContextMenu { client: ClientPoint },
    KeyDown { key: Key, modifiers: Modifiers },
    /// `payload` is `None` when the event carries no data transfer.
    DragOver { payload: Option<DropPayload> },
    Drop { payload: Option<DropPayload> },
    /// The viewport element was resized or moved.
    Resize { rect: ViewportRect },
    /// The window lost focus.
    Blur,
    /// Camera navigation controls moved the camera.
    CameraChanged(Camera),
    /// The gizmo handle was grabbed (mouse-down or touch-start).
    GizmoDown,
    /// The gizmo changed its object's transform.
    GizmoChange(Transform),
    /// The gizmo handle was released (mouse-up or touch-end).
    GizmoUp,
    /// A view-cube face element was clicked; `face` is the element id.
    ViewCubeClick { face: String },
}

impl InputEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerUp { .. } => EventKind::PointerUp,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerCancel => EventKind::PointerCancel,
            Self::TouchStart { .. } => EventKind::TouchStart,
            Self::TouchEnd { .. } => EventKind::TouchEnd,
            Self::DoubleClick { .. } => EventKind::DoubleClick,
            Self::ContextMenu { .. } => EventKind::ContextMenu,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::DragOver { .. } => EventKind::DragOver,
            Self::Drop { .. } => EventKind::Drop,
            Self::Resize { .. } => EventKind::Resize,
            Self::Blur => EventKind::Blur,
            Self::CameraChanged(_) => EventKind::CameraChanged,
            Self::GizmoDown => EventKind::GizmoDown,
            Self::GizmoChange(_) => EventKind::GizmoChange,
            Self::GizmoUp => EventKind::GizmoUp,
            Self::ViewCubeClick { .. } => EventKind::ViewCubeClick,
        }
    }
}

/// Pointer gesture state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A pointer is down; `down` is where it went down.
    Pressed { down: PointerSample },
}
