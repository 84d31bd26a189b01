#![allow(clippy::float_cmp)]

use cgmath::Vector3;

use super::*;
use crate::scene::{Node, Transform};

const EPSILON: f64 = 1e-6;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn front_camera() -> Camera {
    Camera { position: Point3::new(0.0, 0.0, 10.0), ..Camera::default() }
}

fn center() -> PointerSample {
    PointerSample::new(0.5, 0.5)
}

fn add(scene: &mut Scene, node: Node, parent: NodeId) -> NodeId {
    let id = scene.insert(node).unwrap();
    scene.attach(id, parent, None).unwrap();
    id
}

/// Unit cube whose face nearest the front camera is `distance` away.
fn cube_at_distance(name: &str, distance: f64) -> Node {
    Node::mesh(name, Geometry::cuboid(1.0, 1.0, 1.0)).with_transform(Transform::at(0.0, 0.0, 10.0 - distance - 0.5))
}

fn down_ray(z: f64) -> Ray {
    Ray::new(Point3::new(0.0, 0.0, z), Vector3::new(0.0, 0.0, -1.0))
}

// =============================================================
// Coordinates
// =============================================================

#[test]
fn ndc_corners_and_center() {
    assert_eq!(to_ndc(PointerSample::new(0.0, 0.0)), Ndc { x: -1.0, y: 1.0 });
    assert_eq!(to_ndc(PointerSample::new(0.5, 0.5)), Ndc { x: 0.0, y: 0.0 });
    assert_eq!(to_ndc(PointerSample::new(1.0, 1.0)), Ndc { x: 1.0, y: -1.0 });
}

// =============================================================
// Ray primitives
// =============================================================

#[test]
fn ray_new_normalizes() {
    let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -4.0));
    assert!(approx(ray.direction.magnitude(), 1.0));
    assert_eq!(ray.point_at(2.0), Point3::new(0.0, 0.0, -2.0));
}

#[test]
fn triangle_hit_from_either_side() {
    let (a, b, c) = (Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    assert!(approx(down_ray(5.0).intersect_triangle(a, b, c).unwrap(), 5.0));
    let up = Ray::new(Point3::new(0.0, 0.0, -3.0), Vector3::new(0.0, 0.0, 1.0));
    assert!(approx(up.intersect_triangle(a, b, c).unwrap(), 3.0));
}

#[test]
fn triangle_miss_and_parallel() {
    let (a, b, c) = (Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    let outside = Ray::new(Point3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(outside.intersect_triangle(a, b, c).is_none());
    let parallel = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0));
    assert!(parallel.intersect_triangle(a, b, c).is_none());
}

#[test]
fn triangle_behind_origin_is_missed() {
    let (a, b, c) = (Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, -1.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    assert!(down_ray(-2.0).intersect_triangle(a, b, c).is_none());
}

#[test]
fn box_hit_entry_distance() {
    let t = down_ray(5.0).intersect_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    assert!(approx(t.unwrap(), 4.0));
}

#[test]
fn box_hit_from_inside_reports_exit() {
    let t = down_ray(0.0).intersect_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    assert!(approx(t.unwrap(), 1.0));
}

#[test]
fn box_miss() {
    let ray = Ray::new(Point3::new(3.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(ray.intersect_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).is_none());
    assert!(down_ray(-5.0).intersect_box(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)).is_none());
}

#[test]
fn sphere_hit_and_miss() {
    assert!(approx(down_ray(5.0).intersect_sphere(1.0).unwrap(), 4.0));
    assert!(approx(down_ray(0.0).intersect_sphere(1.0).unwrap(), 1.0));
    let ray = Ray::new(Point3::new(2.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
    assert!(ray.intersect_sphere(1.0).is_none());
}

#[test]
fn triangle_soup_takes_nearest() {
    let tri = |z: f64| [Point3::new(-1.0, -1.0, z), Point3::new(1.0, -1.0, z), Point3::new(0.0, 1.0, z)];
    let geometry = Geometry::Triangles(vec![tri(-1.0), tri(1.0), tri(0.0)]);
    assert!(approx(down_ray(5.0).intersect_geometry(&geometry).unwrap(), 4.0));
}

// =============================================================
// Resolver
// =============================================================

#[test]
fn nearest_first_ordering() {
    let mut scene = Scene::new();
    let root = scene.root();
    let a = add(&mut scene, cube_at_distance("a", 5.0), root);
    let b = add(&mut scene, cube_at_distance("b", 3.0), root);

    let hits = intersect(&scene, &front_camera(), center(), &[a, b]);
    assert_eq!(hits.iter().map(|h| h.node).collect::<Vec<_>>(), vec![b, a]);
    assert!(approx(hits[0].distance, 3.0));
    assert!(approx(hits[1].distance, 5.0));
    assert!(approx(hits[0].point.z, 7.0));
}

#[test]
fn empty_candidates_yield_empty_result() {
    let scene = Scene::new();
    assert!(intersect(&scene, &front_camera(), center(), &[]).is_empty());
}

#[test]
fn miss_yields_empty_result() {
    let mut scene = Scene::new();
    let root = scene.root();
    let a = add(&mut scene, cube_at_distance("a", 5.0), root);
    assert!(intersect(&scene, &front_camera(), PointerSample::new(0.0, 0.0), &[a]).is_empty());
}

#[test]
fn hidden_nodes_are_never_returned() {
    let mut scene = Scene::new();
    let root = scene.root();
    let a = add(&mut scene, cube_at_distance("a", 5.0), root);
    let b = add(&mut scene, cube_at_distance("b", 3.0).hidden(), root);
    let hits = intersect(&scene, &front_camera(), center(), &[a, b]);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node, a);
}

#[test]
fn hidden_ancestor_hides_descendants() {
    let mut scene = Scene::new();
    let root = scene.root();
    let group = add(&mut scene, Node::group("g").hidden(), root);
    let a = add(&mut scene, cube_at_distance("a", 5.0), group);
    assert!(intersect(&scene, &front_camera(), center(), &[a]).is_empty());
    assert!(visible_meshes(&scene).is_empty());
}

#[test]
fn groups_and_unknown_ids_are_skipped() {
    let mut scene = Scene::new();
    let root = scene.root();
    let group = add(&mut scene, Node::group("g"), root);
    let hits = intersect(&scene, &front_camera(), center(), &[group, root, uuid::Uuid::new_v4()]);
    assert!(hits.is_empty());
}

#[test]
fn distance_is_measured_in_world_space() {
    let mut scene = Scene::new();
    let root = scene.root();
    let scaled = Node::mesh("big", Geometry::cuboid(1.0, 1.0, 1.0))
        .with_transform(Transform { scale: Vector3::new(2.0, 2.0, 2.0), ..Transform::default() });
    let id = add(&mut scene, scaled, root);
    let hits = intersect(&scene, &front_camera(), center(), &[id]);
    assert!(approx(hits[0].distance, 9.0));
}

#[test]
fn parent_transform_moves_children() {
    let mut scene = Scene::new();
    let root = scene.root();
    let group = add(&mut scene, Node::group("g").with_transform(Transform::at(0.0, 0.0, 4.0)), root);
    let sphere = add(&mut scene, Node::mesh("s", Geometry::sphere(1.0)), group);
    let hits = intersect(&scene, &front_camera(), center(), &[sphere]);
    assert!(approx(hits[0].distance, 5.0));
}

#[test]
fn visible_meshes_skip_detached_and_hidden() {
    let mut scene = Scene::new();
    let root = scene.root();
    let a = add(&mut scene, cube_at_distance("a", 5.0), root);
    add(&mut scene, cube_at_distance("b", 3.0).hidden(), root);
    scene.insert(cube_at_distance("c", 4.0)).unwrap();
    add(&mut scene, Node::group("g"), root);
    assert_eq!(visible_meshes(&scene), vec![a]);
}
