//! Shared numeric constants for the viewport crate.

// ── Gestures ────────────────────────────────────────────────────

/// Maximum distance, in normalized viewport units, between the pointer-down
/// and pointer-up samples for a gesture to count as a click.
pub const CLICK_EPSILON: f64 = 1e-3;

/// Minimum interval between hover evaluations, in milliseconds.
pub const HOVER_THROTTLE_MS: u64 = 200;

// ── Ray casting ─────────────────────────────────────────────────

/// Tolerance for parallel rays and hits at the ray origin.
pub const RAY_EPSILON: f64 = 1e-9;

// ── Camera ──────────────────────────────────────────────────────

/// Focus places the camera this many bounding radii away from the target.
pub const FOCUS_DISTANCE_FACTOR: f64 = 4.0;

/// Radius used when focusing a node without geometry.
pub const FOCUS_FALLBACK_RADIUS: f64 = 0.1;

/// Distance from the orbit target after snapping to a view-cube face.
pub const VIEW_CUBE_DISTANCE: f64 = 100.0;
