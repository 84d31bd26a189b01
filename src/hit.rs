//! Hit-testing: rays from the camera through a pointer sample, tested against scene geometry.
//!
//! Pointer samples arrive normalized to `[0, 1]` over the viewport rectangle.
//! They are mapped to normalized device coordinates, turned into a world ray
//! by the camera, and tested against each candidate mesh in that mesh's local
//! space. Results are ordered nearest-first by world-space distance.
//!
//! The resolver never returns a node that is hidden, by itself or through any
//! ancestor, whatever candidate list it is given.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};

use crate::camera::Camera;
use crate::consts::RAY_EPSILON;
use crate::input::PointerSample;
use crate::scene::{Geometry, NodeId, Scene, transform_point};

/// A point in normalized device coordinates (`[-1, 1]`, y up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f64,
    pub y: f64,
}

/// Map a normalized viewport sample (y down) to device coordinates (y up).
#[must_use]
pub fn to_ndc(sample: PointerSample) -> Ndc {
    Ndc { x: sample.x * 2.0 - 1.0, y: -(sample.y * 2.0 - 1.0) }
}

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Create a ray; the direction is normalized.
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction: direction.normalize() }
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Transform the ray by an affine matrix. The direction is renormalized, so
    /// distances along the result are in the target space's units.
    #[must_use]
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Self {
        let origin = transform_point(matrix, self.origin);
        let d = matrix * self.direction.extend(0.0);
        Self::new(origin, Vector3::new(d.x, d.y, d.z))
    }

    /// Möller–Trumbore, double-sided. Returns the distance along the ray.
    #[must_use]
    pub fn intersect_triangle(&self, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Option<f64> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < RAY_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        (t > RAY_EPSILON).then_some(t)
    }

    /// Slab test against a box. A ray starting inside reports the exit distance.
    #[must_use]
    pub fn intersect_box(&self, min: Point3<f64>, max: Point3<f64>) -> Option<f64> {
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        for axis in 0..3 {
            let (o, d, lo, hi) = (self.origin[axis], self.direction[axis], min[axis], max[axis]);
            if d.abs() < RAY_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t0, t1) = ((lo - o) / d, (hi - o) / d);
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }
        if t_near > t_far || t_far < RAY_EPSILON {
            return None;
        }
        Some(if t_near > RAY_EPSILON { t_near } else { t_far })
    }

    /// Sphere centered on the origin.
    #[must_use]
    pub fn intersect_sphere(&self, radius: f64) -> Option<f64> {
        let oc = self.origin.to_vec();
        let b = oc.dot(self.direction);
        let c = oc.magnitude2() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        [-b - root, -b + root].into_iter().find(|t| *t > RAY_EPSILON)
    }

    /// Nearest hit against local-space geometry.
    #[must_use]
    pub fn intersect_geometry(&self, geometry: &Geometry) -> Option<f64> {
        match geometry {
            Geometry::Cuboid { half_extents: h } => {
                self.intersect_box(Point3::new(-h.x, -h.y, -h.z), Point3::new(h.x, h.y, h.z))
            }
            Geometry::Sphere { radius } => self.intersect_sphere(*radius),
            Geometry::Triangles(tris) => tris
                .iter()
                .filter_map(|[a, b, c]| self.intersect_triangle(*a, *b, *c))
                .min_by(f64::total_cmp),
        }
    }
}

/// One ray hit: the node, its world-space distance from the ray origin, and the hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub distance: f64,
    pub point: Point3<f64>,
}

/// Cast a ray from `camera` through `sample` and test it against `candidates`.
///
/// Non-mesh candidates, unknown ids and hidden nodes are skipped. The result is
/// sorted ascending by distance and is empty when nothing is hit.
#[must_use]
pub fn intersect(scene: &Scene, camera: &Camera, sample: PointerSample, candidates: &[NodeId]) -> Vec<Intersection> {
    match camera.ray_through(to_ndc(sample)) {
        Some(ray) => intersect_ray(scene, &ray, candidates),
        None => Vec::new(),
    }
}

/// Test a world-space ray against `candidates`; see [`intersect`].
#[must_use]
pub fn intersect_ray(scene: &Scene, ray: &Ray, candidates: &[NodeId]) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = candidates
        .iter()
        .filter(|id| scene.is_visible(**id))
        .filter_map(|id| intersect_node(scene, ray, *id))
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn intersect_node(scene: &Scene, ray: &Ray, id: NodeId) -> Option<Intersection> {
    let geometry = scene.node(id)?.geometry()?;
    let world = scene.world_matrix(id)?;
    let local_ray = ray.transform(&world.invert()?);
    let t = local_ray.intersect_geometry(geometry)?;
    let point = transform_point(&world, local_ray.point_at(t));
    Some(Intersection { node: id, distance: (point - ray.origin).magnitude(), point })
}

/// Every attached mesh that is visible along with all of its ancestors, in traversal order.
#[must_use]
pub fn visible_meshes(scene: &Scene) -> Vec<NodeId> {
    scene.meshes().into_iter().filter(|id| scene.is_visible(*id)).collect()
}
