//! Transform-drag coordinator: turns one gizmo manipulation into at most one command.
//!
//! ```text
//! Idle ──begin(target)──▶ Dragging { target, on_down } ──end()──▶ Idle
//! ```
//!
//! `begin` snapshots the target's transform by value. Change notifications
//! during the drag only refresh visuals. `end` compares the snapshot for the
//! active mode against the target's current transform and yields a command
//! only if that component changed. A pointer-cancel or window blur ends the
//! drag the same way, so camera navigation is never left disabled.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::str::FromStr;

use crate::command::Command;
use crate::scene::{NodeId, Scene, Transform};

/// Which component of the transform the gizmo manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transform mode: {0}")]
pub struct UnknownTransformMode(pub String);

impl FromStr for TransformMode {
    type Err = UnknownTransformMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(Self::Translate),
            "rotate" => Ok(Self::Rotate),
            "scale" => Ok(Self::Scale),
            other => Err(UnknownTransformMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        target: NodeId,
        /// Target transform when the handle was grabbed.
        on_down: Transform,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The node being dragged, if any.
    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        match self.state {
            DragState::Dragging { target, .. } => Some(target),
            DragState::Idle => None,
        }
    }

    /// Start a manipulation of `target`. Returns `false` (and stays idle) when
    /// there is no target or it is not in the scene. Beginning while already
    /// dragging replaces the stale snapshot.
    pub fn begin(&mut self, scene: &Scene, target: Option<NodeId>) -> bool {
        let Some(target) = target else {
            return false;
        };
        let Some(on_down) = scene.transform(target) else {
            tracing::debug!(%target, "gizmo grabbed on a node missing from the scene");
            return false;
        };
        if let DragState::Dragging { target: stale, .. } = self.state {
            tracing::debug!(%stale, %target, "manipulation restarted before the previous one ended");
        }
        self.state = DragState::Dragging { target, on_down };
        true
    }

    /// Finish the manipulation and return the command that records it, if the
    /// component for `mode` changed. Ending while idle yields nothing.
    pub fn end(&mut self, scene: &Scene, mode: TransformMode) -> Option<Command> {
        let DragState::Dragging { target, on_down } = std::mem::take(&mut self.state) else {
            tracing::debug!("manipulation ended without a matching start");
            return None;
        };
        let current = scene.transform(target)?;
        match mode {
            TransformMode::Translate => (on_down.position != current.position).then_some(Command::SetPosition {
                node: target,
                new: current.position,
                old: on_down.position,
            }),
            TransformMode::Rotate => (on_down.rotation != current.rotation).then_some(Command::SetRotation {
                node: target,
                new: current.rotation,
                old: on_down.rotation,
            }),
            TransformMode::Scale => (on_down.scale != current.scale).then_some(Command::SetScale {
                node: target,
                new: current.scale,
                old: on_down.scale,
            }),
        }
    }
}
