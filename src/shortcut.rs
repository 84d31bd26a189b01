//! Keyboard and gesture dispatch rules.
//!
//! Everything here is a pure mapping from an input to the intent it carries.
//! The engine decides what each intent does to the scene.

#[cfg(test)]
#[path = "shortcut_test.rs"]
mod shortcut_test;

use crate::camera::Camera;
use crate::config::EventConfig;
use crate::hit::intersect;
use crate::input::{ClientPoint, DropPayload, DroppedFile, Key, Modifiers, Platform, PointerSample};
use crate::scene::{NodeId, Scene};
use crate::transform::TransformMode;

/// Data-transfer type used by the host's own list reordering.
pub const PLAIN_TEXT: &str = "text/plain";

/// Intent carried by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    DeleteSelection,
    SetMode(TransformMode),
    Undo,
    Redo,
    Focus,
}

impl Shortcut {
    /// Whether the browser's own handling of the key combination must be suppressed.
    #[must_use]
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Undo | Self::Redo)
    }
}

/// Map a key press to its shortcut, if it has one.
///
/// Delete and Backspace are checked first and only when deletion is enabled.
/// The undo letter needs the platform's primary modifier; adding shift turns
/// it into redo. The mode and focus letters fire regardless of modifiers.
#[must_use]
pub fn resolve_key(key: &Key, modifiers: Modifiers, platform: Platform, config: &EventConfig) -> Option<Shortcut> {
    let name = key.normalized();
    if name == "backspace" || name == "delete" {
        return config.delete_enabled.then_some(Shortcut::DeleteSelection);
    }

    let letter = key.letter()?;
    if letter == config.translate {
        Some(Shortcut::SetMode(TransformMode::Translate))
    } else if letter == config.rotate {
        Some(Shortcut::SetMode(TransformMode::Rotate))
    } else if letter == config.scale {
        Some(Shortcut::SetMode(TransformMode::Scale))
    } else if letter == config.undo {
        if !modifiers.primary(platform) {
            return None;
        }
        Some(if modifiers.shift { Shortcut::Redo } else { Shortcut::Undo })
    } else if letter == config.focus {
        Some(Shortcut::Focus)
    } else {
        None
    }
}

/// Whether the viewport takes over the context-menu gesture. When it does not,
/// the host's default menu is left alone.
#[must_use]
pub fn context_menu_intercepts(config: &EventConfig) -> bool {
    config.context_menu_enabled
}

/// What to do with a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDisposition {
    /// Not ours: no payload, or the host's own plain-text reordering.
    Ignore,
    /// Load from the item list (which can carry folders).
    LoadItems(Vec<DroppedFile>),
    /// Load from the flat file list.
    LoadFiles(Vec<DroppedFile>),
}

/// Classify a drop payload.
#[must_use]
pub fn classify_drop(payload: Option<&DropPayload>) -> DropDisposition {
    let Some(payload) = payload else {
        return DropDisposition::Ignore;
    };
    if payload.types.first().is_some_and(|t| t == PLAIN_TEXT) {
        return DropDisposition::Ignore;
    }
    match &payload.items {
        Some(items) => DropDisposition::LoadItems(items.clone()),
        None => DropDisposition::LoadFiles(payload.files.clone()),
    }
}

/// Node a double-click at `sample` focuses on: the nearest hit among `objects`.
#[must_use]
pub fn resolve_focus_target(scene: &Scene, camera: &Camera, sample: PointerSample, objects: &[NodeId]) -> Option<NodeId> {
    intersect(scene, camera, sample, objects).first().map(|hit| hit.node)
}

/// The touch a touch gesture is tracked by.
#[must_use]
pub fn first_touch(touches: &[ClientPoint]) -> Option<ClientPoint> {
    touches.first().copied()
}
