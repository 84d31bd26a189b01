//! Reversible scene commands.
//!
//! A command carries everything it needs to apply and to reverse a mutation:
//! the target and both the new and old values. It touches the scene only
//! through [`Scene`]'s mutation methods, so commands can be built and tested
//! without an engine. Construction helpers that read the scene (to capture a
//! removal's parent and index, for example) return `None` when the mutation
//! would be a no-op.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use cgmath::{Euler, Rad, Vector3};

use crate::camera::Camera;
use crate::scene::{AxesHelper, ClipPlane, GridHelper, NodeId, Scene, SceneError};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Attach a detached node under `parent` at `index` (`None` appends).
    AddObject { node: NodeId, parent: NodeId, index: Option<usize> },
    /// Detach a node, remembering where it was.
    RemoveObject { node: NodeId, parent: NodeId, index: usize },
    SetPosition { node: NodeId, new: Vector3<f64>, old: Vector3<f64> },
    SetRotation { node: NodeId, new: Euler<Rad<f64>>, old: Euler<Rad<f64>> },
    SetScale { node: NodeId, new: Vector3<f64>, old: Vector3<f64> },
    /// Register a camera under `id`.
    AddCamera { id: NodeId, camera: Camera },
    SetGrid { new: GridHelper, old: GridHelper },
    SetAxes { new: AxesHelper, old: AxesHelper },
    SetClipPlane { new: ClipPlane, old: ClipPlane },
}

/// Which way a command is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Command {
    /// Add `node` under `parent`, or under the scene root when `parent` is `None`.
    #[must_use]
    pub fn add_object(scene: &Scene, node: NodeId, parent: Option<NodeId>, index: Option<usize>) -> Self {
        Self::AddObject { node, parent: parent.unwrap_or_else(|| scene.root()), index }
    }

    /// Remove `node` from its parent. `None` if it has no parent.
    #[must_use]
    pub fn remove_object(scene: &Scene, node: NodeId) -> Option<Self> {
        let (parent, index) = scene.location(node)?;
        Some(Self::RemoveObject { node, parent, index })
    }

    /// Grid update from the scene's current grid. `None` if unchanged.
    #[must_use]
    pub fn set_grid(scene: &Scene, grid: GridHelper) -> Option<Self> {
        let old = scene.helpers().grid;
        (old != grid).then_some(Self::SetGrid { new: grid, old })
    }

    /// Axes update from the scene's current axes. `None` if unchanged.
    #[must_use]
    pub fn set_axes(scene: &Scene, axes: AxesHelper) -> Option<Self> {
        let old = scene.helpers().axes;
        (old != axes).then_some(Self::SetAxes { new: axes, old })
    }

    /// Clip-plane update from the scene's current plane. `None` if unchanged.
    #[must_use]
    pub fn set_clip_plane(scene: &Scene, clip: ClipPlane) -> Option<Self> {
        let old = scene.helpers().clip;
        (old != clip).then_some(Self::SetClipPlane { new: clip, old })
    }

    /// Human-readable name, for logs and history listings.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddObject { .. } => "Add Object",
            Self::RemoveObject { .. } => "Remove Object",
            Self::SetPosition { .. } => "Set Position",
            Self::SetRotation { .. } => "Set Rotation",
            Self::SetScale { .. } => "Set Scale",
            Self::AddCamera { .. } => "Add Camera",
            Self::SetGrid { .. } => "Set Grid",
            Self::SetAxes { .. } => "Set Axes",
            Self::SetClipPlane { .. } => "Set Clip Plane",
        }
    }

    /// Scene nodes this command needs to stay in the arena to apply or reverse.
    #[must_use]
    pub fn referenced_nodes(&self) -> Vec<NodeId> {
        match self {
            Self::AddObject { node, parent, .. } | Self::RemoveObject { node, parent, .. } => vec![*node, *parent],
            Self::SetPosition { node, .. } | Self::SetRotation { node, .. } | Self::SetScale { node, .. } => vec![*node],
            Self::AddCamera { .. } | Self::SetGrid { .. } | Self::SetAxes { .. } | Self::SetClipPlane { .. } => Vec::new(),
        }
    }

    /// Apply the mutation.
    pub fn execute(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match self {
            Self::AddObject { node, parent, index } => scene.attach(*node, *parent, *index).map(|_| ()),
            Self::RemoveObject { node, .. } => scene.detach(*node).map(|_| ()).ok_or(SceneError::NotAttached(*node)),
            Self::SetPosition { node, new, .. } => scene.set_position(*node, *new),
            Self::SetRotation { node, new, .. } => scene.set_rotation(*node, *new),
            Self::SetScale { node, new, .. } => scene.set_scale(*node, *new),
            Self::AddCamera { id, camera } => scene.add_camera(*id, *camera),
            Self::SetGrid { new, .. } => {
                scene.set_grid(*new);
                Ok(())
            }
            Self::SetAxes { new, .. } => {
                scene.set_axes(*new);
                Ok(())
            }
            Self::SetClipPlane { new, .. } => {
                scene.set_clip_plane(*new);
                Ok(())
            }
        }
    }

    /// Reverse the mutation.
    pub fn undo(&self, scene: &mut Scene) -> Result<(), SceneError> {
        match self {
            Self::AddObject { node, .. } => scene.detach(*node).map(|_| ()).ok_or(SceneError::NotAttached(*node)),
            Self::RemoveObject { node, parent, index } => scene.attach(*node, *parent, Some(*index)).map(|_| ()),
            Self::SetPosition { node, old, .. } => scene.set_position(*node, *old),
            Self::SetRotation { node, old, .. } => scene.set_rotation(*node, *old),
            Self::SetScale { node, old, .. } => scene.set_scale(*node, *old),
            Self::AddCamera { id, .. } => scene.remove_camera(*id).map(|_| ()),
            Self::SetGrid { old, .. } => {
                scene.set_grid(*old);
                Ok(())
            }
            Self::SetAxes { old, .. } => {
                scene.set_axes(*old);
                Ok(())
            }
            Self::SetClipPlane { old, .. } => {
                scene.set_clip_plane(*old);
                Ok(())
            }
        }
    }

    /// Apply in the given direction.
    pub fn apply(&self, scene: &mut Scene, direction: Direction) -> Result<(), SceneError> {
        match direction {
            Direction::Forward => self.execute(scene),
            Direction::Backward => self.undo(scene),
        }
    }

    /// How applying this command in `direction` changes the selection.
    ///
    /// Adding an object selects it and undoing the add clears the selection.
    /// Removing clears the selection when it lay inside the removed subtree,
    /// and undoing the removal selects the restored node. `None` leaves the
    /// selection alone.
    #[must_use]
    pub fn selection_effect(&self, direction: Direction, scene: &Scene, selected: Option<NodeId>) -> Option<Option<NodeId>> {
        match (self, direction) {
            (Self::AddObject { node, .. }, Direction::Forward) | (Self::RemoveObject { node, .. }, Direction::Backward) => {
                Some(Some(*node))
            }
            (Self::AddObject { .. }, Direction::Backward) => Some(None),
            (Self::RemoveObject { node, .. }, Direction::Forward) => {
                let current = selected?;
                scene.is_within(current, *node).then_some(None)
            }
            _ => None,
        }
    }
}
