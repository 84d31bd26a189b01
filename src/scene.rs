//! Scene graph model: nodes, their transforms and geometry, cameras, and view helpers.
//!
//! `Scene` is an arena of [`Node`]s keyed by id with a single root. Parent and
//! child links are owned by the scene and only change through [`Scene::attach`]
//! and [`Scene::detach`]. A detached node stays in the arena with its subtree
//! intact so that a removal can be reversed exactly; detached nodes are not
//! reachable from the root and are never traversed or hit-tested.
//!
//! The interaction layer reads and mutates this model; the host mirrors it
//! into whatever renderer it uses.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{BTreeMap, HashMap, HashSet};

use cgmath::{EuclideanSpace, Euler, InnerSpace, Matrix4, Point3, Quaternion, Rad, Vector3};
use serde::Deserialize;
use uuid::Uuid;

use crate::camera::Camera;

/// Unique identifier for a scene node (and for registered cameras).
pub type NodeId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("parent not found: {0}")]
    ParentNotFound(NodeId),
    #[error("node already in the scene: {0}")]
    DuplicateNode(NodeId),
    #[error("node already attached: {0}")]
    AlreadyAttached(NodeId),
    #[error("node is not attached to a parent: {0}")]
    NotAttached(NodeId),
    #[error("attaching {node} under {parent} would create a cycle")]
    CycleDetected { node: NodeId, parent: NodeId },
    #[error("camera not found: {0}")]
    CameraNotFound(NodeId),
    #[error("camera already registered: {0}")]
    CameraExists(NodeId),
}

// =============================================================================
// BOUNDS
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.min = Point3::new(aabb.min.x.min(p.x), aabb.min.y.min(p.y), aabb.min.z.min(p.z));
            aabb.max = Point3::new(aabb.max.x.max(p.x), aabb.max.y.max(p.y), aabb.max.z.max(p.z));
        }
        Some(aabb)
    }

    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        self.min.midpoint(self.max)
    }

    /// Radius of the sphere circumscribing the box.
    #[must_use]
    pub fn radius(&self) -> f64 {
        (self.max - self.min).magnitude() * 0.5
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            Point3::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y), self.min.z.min(other.min.z)),
            Point3::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y), self.max.z.max(other.max.z)),
        )
    }

    #[must_use]
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box after an affine transform.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Self {
        let corners = self.corners().map(|c| transform_point(matrix, c));
        Self::from_points(corners).unwrap_or(*self)
    }
}

/// Apply an affine matrix to a point.
#[must_use]
pub fn transform_point(matrix: &Matrix4<f64>, point: Point3<f64>) -> Point3<f64> {
    Point3::from_homogeneous(matrix * point.to_homogeneous())
}

// =============================================================================
// NODES
// =============================================================================

/// Geometry of a mesh node, in the node's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Box centered on the local origin.
    Cuboid { half_extents: Vector3<f64> },
    /// Sphere centered on the local origin.
    Sphere { radius: f64 },
    /// Arbitrary triangle soup.
    Triangles(Vec<[Point3<f64>; 3]>),
}

impl Geometry {
    /// Box with the given full width, height and depth.
    #[must_use]
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        Self::Cuboid { half_extents: Vector3::new(width * 0.5, height * 0.5, depth * 0.5) }
    }

    #[must_use]
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Local-space bounds, `None` for an empty triangle list.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Aabb> {
        match self {
            Self::Cuboid { half_extents: h } => Some(Aabb::new(Point3::new(-h.x, -h.y, -h.z), Point3::new(h.x, h.y, h.z))),
            Self::Sphere { radius: r } => Some(Aabb::new(Point3::new(-r, -r, -r), Point3::new(*r, *r, *r))),
            Self::Triangles(tris) => Aabb::from_points(tris.iter().flat_map(|t| t.iter().copied())),
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Container with no geometry of its own.
    Group,
    /// Hit-testable geometry.
    Mesh(Geometry),
}

/// Local transform of a node. Rotation is XYZ Euler angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: Euler<Rad<f64>>,
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    #[must_use]
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self { position: Vector3::new(x, y, z), ..Self::default() }
    }

    /// Local matrix: translation * rotation * scale.
    #[must_use]
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(Quaternion::from(self.rotation))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// Own visibility flag. Effective visibility also depends on ancestors.
    pub visible: bool,
    pub transform: Transform,
    /// Logical owner: selecting this node selects the owner instead.
    pub owner: Option<NodeId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            visible: true,
            transform: Transform::default(),
            owner: None,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn group(name: &str) -> Self {
        Self::with_kind(name, NodeKind::Group)
    }

    #[must_use]
    pub fn mesh(name: &str, geometry: Geometry) -> Self {
        Self::with_kind(name, NodeKind::Mesh(geometry))
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: NodeId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Mesh(geometry) => Some(geometry),
            NodeKind::Group => None,
        }
    }

    #[must_use]
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }
}

// =============================================================================
// VIEW HELPERS
// =============================================================================

/// Ground grid overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f64,
    pub divisions: u32,
    pub visible: bool,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self { size: 30.0, divisions: 30, visible: true }
    }
}

/// World axes overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesHelper {
    pub size: f64,
    pub visible: bool,
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self { size: 1.0, visible: true }
    }
}

/// Global clipping plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane {
    pub normal: Vector3<f64>,
    pub constant: f64,
    /// Edge length of the plane's visual helper.
    pub size: f64,
    pub enabled: bool,
    pub display_helper: bool,
}

impl Default for ClipPlane {
    fn default() -> Self {
        Self {
            normal: Vector3::new(0.0, -1.0, 0.0),
            constant: 0.0,
            size: 10.0,
            enabled: false,
            display_helper: false,
        }
    }
}

/// Sparse clip-plane update. Absent fields keep the current plane value,
/// except the three flags which default to `enable = true`, `negate = false`
/// and `display_helper = true`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClipSettings {
    #[serde(default)]
    pub normal: Option<[f64; 3]>,
    #[serde(default)]
    pub constant: Option<f64>,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub enable: Option<bool>,
    #[serde(default)]
    pub negate: Option<bool>,
    #[serde(default)]
    pub display_helper: Option<bool>,
}

impl ClipPlane {
    /// The plane that results from applying `settings` to this one.
    #[must_use]
    pub fn with_settings(&self, settings: &ClipSettings) -> Self {
        let mut next = *self;
        if let Some([x, y, z]) = settings.normal {
            next.normal = Vector3::new(x, y, z);
        }
        if let Some(constant) = settings.constant {
            next.constant = constant;
        }
        if let Some(size) = settings.size {
            next.size = size;
        }
        if settings.negate.unwrap_or(false) {
            next.normal = -next.normal;
            next.constant = -next.constant;
        }
        next.enabled = settings.enable.unwrap_or(true);
        next.display_helper = settings.display_helper.unwrap_or(true);
        next
    }
}

/// All view helpers owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewHelpers {
    pub grid: GridHelper,
    pub axes: AxesHelper,
    pub clip: ClipPlane,
}

// =============================================================================
// SCENE
// =============================================================================

/// Arena-backed scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    cameras: BTreeMap<NodeId, Camera>,
    helpers: ViewHelpers,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene containing only its root group.
    #[must_use]
    pub fn new() -> Self {
        let root = Node::group("Scene");
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self { nodes, root: root_id, cameras: BTreeMap::new(), helpers: ViewHelpers::default() }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes in the arena, attached or not, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Put a node into the arena without attaching it. Any parent/child links
    /// on the incoming value are discarded. Ids already in the arena are refused.
    pub fn insert(&mut self, mut node: Node) -> Result<NodeId, SceneError> {
        if self.nodes.contains_key(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        node.parent = None;
        node.children.clear();
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Link a detached node under `parent` at `index` (clamped; `None` appends).
    /// Returns the index the node ended up at.
    pub fn attach(&mut self, id: NodeId, parent: NodeId, index: Option<usize>) -> Result<usize, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        if node.parent.is_some() || id == self.root {
            return Err(SceneError::AlreadyAttached(id));
        }
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::ParentNotFound(parent));
        }
        if parent == id || self.ancestors(parent).any(|a| a == id) {
            return Err(SceneError::CycleDetected { node: id, parent });
        }

        let siblings = &mut self.nodes.get_mut(&parent).ok_or(SceneError::ParentNotFound(parent))?.children;
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        Ok(at)
    }

    /// Unlink a node from its parent. Returns the former parent and index,
    /// or `None` when the node has no parent (already detached, or the root).
    pub fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes.get(&id)?.parent?;
        let siblings = &mut self.nodes.get_mut(&parent)?.children;
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.remove(index);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Some((parent, index))
    }

    /// Free detached trees for good. Each candidate is traced up to the head
    /// of the tree holding it; that whole tree is dropped from the arena unless
    /// it is attached or contains a `retained` node. Returns the number of
    /// nodes freed.
    pub fn purge_detached(&mut self, candidates: &[NodeId], retained: &HashSet<NodeId>) -> usize {
        let mut freed = 0;
        for &candidate in candidates {
            if !self.contains(candidate) || self.is_attached(candidate) {
                continue;
            }
            let head = self.ancestors(candidate).last().unwrap_or(candidate);
            let tree = self.subtree(head);
            if tree.iter().any(|id| retained.contains(id)) {
                continue;
            }
            for id in &tree {
                self.nodes.remove(id);
            }
            freed += tree.len();
        }
        freed
    }

    /// Parent and sibling index of an attached node.
    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes.get(&id)?.parent?;
        let index = self.nodes.get(&parent)?.children.iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    /// Ancestors of `id`, nearest first. Does not include `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let this = current?;
            current = self.nodes.get(&this).and_then(|n| n.parent);
            Some(this)
        })
    }

    /// Whether `id` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_within(id, self.root)
    }

    /// Effective visibility: the node and every ancestor are visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) if node.visible => self.ancestors(id).all(|a| self.nodes.get(&a).is_some_and(|n| n.visible)),
            _ => false,
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    /// All nodes reachable from the root, pre-order, root first.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeId> {
        self.subtree(self.root)
    }

    /// `id` and all of its descendants, pre-order.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every attached mesh, regardless of visibility.
    #[must_use]
    pub fn meshes(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(Node::is_mesh))
            .collect()
    }

    // --- Transforms ---

    #[must_use]
    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(&id).map(|n| n.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    pub fn set_position(&mut self, id: NodeId, position: Vector3<f64>) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position = position;
        Ok(())
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Euler<Rad<f64>>) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.rotation = rotation;
        Ok(())
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vector3<f64>) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale = scale;
        Ok(())
    }

    /// Local-to-world matrix, composed through every ancestor.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f64>> {
        let mut matrix = self.nodes.get(&id)?.transform.matrix();
        for ancestor in self.ancestors(id) {
            let node = self.nodes.get(&ancestor)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Option<Point3<f64>> {
        self.world_matrix(id).map(|m| transform_point(&m, Point3::origin()))
    }

    /// World-space bounds of every mesh in the node's subtree.
    #[must_use]
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| {
                let local = self.nodes.get(&n)?.geometry()?.local_bounds()?;
                Some(local.transformed(&self.world_matrix(n)?))
            })
            .reduce(|a, b| a.union(&b))
    }

    // --- Cameras ---

    pub fn add_camera(&mut self, id: NodeId, camera: Camera) -> Result<(), SceneError> {
        if self.cameras.contains_key(&id) {
            return Err(SceneError::CameraExists(id));
        }
        self.cameras.insert(id, camera);
        Ok(())
    }

    pub fn remove_camera(&mut self, id: NodeId) -> Result<Camera, SceneError> {
        self.cameras.remove(&id).ok_or(SceneError::CameraNotFound(id))
    }

    #[must_use]
    pub fn camera(&self, id: NodeId) -> Option<&Camera> {
        self.cameras.get(&id)
    }

    #[must_use]
    pub fn cameras(&self) -> &BTreeMap<NodeId, Camera> {
        &self.cameras
    }

    // --- Helpers ---

    #[must_use]
    pub fn helpers(&self) -> &ViewHelpers {
        &self.helpers
    }

    pub fn set_grid(&mut self, grid: GridHelper) {
        self.helpers.grid = grid;
    }

    pub fn set_axes(&mut self, axes: AxesHelper) {
        self.helpers.axes = axes;
    }

    pub fn set_clip_plane(&mut self, clip: ClipPlane) {
        self.helpers.clip = clip;
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))
    }
}
