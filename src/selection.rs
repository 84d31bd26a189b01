//! Selection and hover state, and the policies that resolve pointer input into them.
//!
//! Both `select` and `set_hovered` replace unconditionally. The engine reports
//! a change after every call, even when the new value equals the old one.
//!
//! A completed gesture selects only if it is a click: the pointer moved less
//! than the click epsilon between down and up. The click candidate set is
//! every visible mesh in the scene, and the nearest hit is redirected to its
//! logical owner when it has one. Hover takes the nearest raw hit, with no
//! redirection, and is throttled by a [`HoverProbe`] owned by the engine.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::time::Duration;

use crate::camera::Camera;
use crate::hit::{intersect, visible_meshes};
use crate::input::PointerSample;
use crate::scene::{NodeId, Scene};
use crate::throttle::Throttle;

/// The selected and hovered nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
}

impl SelectionState {
    /// Replace the selection. Returns the previous value.
    pub fn select(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.selected, node)
    }

    /// Replace the hovered node. Returns the previous value.
    pub fn set_hovered(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.hovered, node)
    }
}

/// Whether a down/up pair is close enough to be a click rather than a drag.
#[must_use]
pub fn is_click(down: PointerSample, up: PointerSample, epsilon: f64) -> bool {
    down.distance_to(up) < epsilon
}

/// The node selection should apply to when `node` is hit.
#[must_use]
pub fn logical_owner(scene: &Scene, node: NodeId) -> NodeId {
    scene.node(node).and_then(|n| n.owner).unwrap_or(node)
}

/// Resolve a click at `sample` to the node it selects, or `None` for empty space.
#[must_use]
pub fn resolve_click(scene: &Scene, camera: &Camera, sample: PointerSample) -> Option<NodeId> {
    let candidates = visible_meshes(scene);
    let hits = intersect(scene, camera, sample, &candidates);
    hits.first().map(|hit| logical_owner(scene, hit.node))
}

/// Resolve the hovered node at `sample` among `objects`: the nearest raw hit.
#[must_use]
pub fn resolve_hover(scene: &Scene, camera: &Camera, sample: PointerSample, objects: &[NodeId]) -> Option<NodeId> {
    intersect(scene, camera, sample, objects).first().map(|hit| hit.node)
}

/// Result of a throttled hover evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    /// The call fell inside the throttle window and was dropped.
    Throttled,
    /// Hover was evaluated; the new hovered node (or none).
    Resolved(Option<NodeId>),
}

/// Hover evaluator with its own throttle window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverProbe {
    throttle: Throttle,
}

impl HoverProbe {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self { throttle: Throttle::new(window) }
    }

    /// Evaluate hover at `now`, unless a previous evaluation is still inside the window.
    pub fn probe(
        &mut self,
        now: Duration,
        scene: &Scene,
        camera: &Camera,
        sample: PointerSample,
        objects: &[NodeId],
    ) -> HoverOutcome {
        if !self.throttle.ready(now) {
            return HoverOutcome::Throttled;
        }
        HoverOutcome::Resolved(resolve_hover(scene, camera, sample, objects))
    }
}
