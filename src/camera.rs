//! Perspective camera: ray construction for hit-testing, framing, and view-cube snaps.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use cgmath::{Deg, EuclideanSpace, Euler, InnerSpace, Matrix4, Point3, Quaternion, Rad, Rotation, SquareMatrix, Vector3};

use crate::consts::{FOCUS_DISTANCE_FACTOR, FOCUS_FALLBACK_RADIUS, RAY_EPSILON, VIEW_CUBE_DISTANCE};
use crate::hit::{Ndc, Ray};
use crate::scene::{Aabb, transform_point};

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    /// Viewport width / height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 5.0, 10.0),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            fov_y_deg: 50.0,
            aspect: 1.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl Camera {
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4<f64> {
        cgmath::perspective(Deg(self.fov_y_deg), self.aspect, self.near, self.far)
    }

    /// Unit viewing direction, or `None` when position and target coincide.
    #[must_use]
    pub fn direction(&self) -> Option<Vector3<f64>> {
        let d = self.target - self.position;
        if d.magnitude2() < RAY_EPSILON {
            None
        } else {
            Some(d.normalize())
        }
    }

    /// World-space ray from the eye through a point in normalized device coordinates.
    ///
    /// Returns `None` for a degenerate camera (singular view-projection).
    #[must_use]
    pub fn ray_through(&self, ndc: Ndc) -> Option<Ray> {
        self.direction()?;
        let inverse = (self.projection_matrix() * self.view_matrix()).invert()?;
        let on_frustum = transform_point(&inverse, Point3::new(ndc.x, ndc.y, 0.5));
        let direction = on_frustum - self.position;
        if !direction.magnitude2().is_finite() || direction.magnitude2() < RAY_EPSILON {
            return None;
        }
        Some(Ray::new(self.position, direction))
    }

    /// Match the aspect ratio to a viewport size. Zero or negative sizes are ignored.
    pub fn set_aspect(&mut self, width: f64, height: f64) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.aspect = width / height;
        true
    }

    /// Recenter on `bounds`, keeping the viewing direction, backed off by four
    /// bounding radii. Without bounds (or with degenerate bounds) the camera
    /// frames `fallback` at a small fixed radius.
    pub fn focus(&mut self, bounds: Option<Aabb>, fallback: Point3<f64>) {
        let (center, radius) = match bounds {
            Some(b) if b.radius() > RAY_EPSILON => (b.center(), b.radius()),
            Some(b) => (b.center(), FOCUS_FALLBACK_RADIUS),
            None => (fallback, FOCUS_FALLBACK_RADIUS),
        };
        let back = -self.direction().unwrap_or(-Vector3::unit_z());
        self.target = center;
        self.position = center + back * (radius * FOCUS_DISTANCE_FACTOR);
    }

    /// Snap to look at the orbit target from one of the six cube faces.
    pub fn orbit_to(&mut self, face: ViewFace) {
        let rotation = Quaternion::from(face.euler());
        let forward = rotation.rotate_vector(-Vector3::unit_z()) * VIEW_CUBE_DISTANCE;
        self.position = self.target - forward;
        self.up = rotation.rotate_vector(Vector3::unit_y());
    }
}

/// A face of the navigation view cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFace {
    Front,
    Back,
    Top,
    Bottom,
    Left,
    Right,
}

impl ViewFace {
    /// Map a view-cube element id (`"front"`, `"top"`, ...) to a face.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Camera orientation for this face.
    #[must_use]
    pub fn euler(self) -> Euler<Rad<f64>> {
        let (x, y) = match self {
            Self::Front => (0.0, 0.0),
            Self::Back => (0.0, 180.0),
            Self::Top => (-90.0, 0.0),
            Self::Bottom => (90.0, 0.0),
            Self::Left => (0.0, -90.0),
            Self::Right => (0.0, 90.0),
        };
        Euler::new(Rad::from(Deg(x)), Rad::from(Deg(y)), Rad(0.0))
    }
}
