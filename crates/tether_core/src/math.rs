//! Axis selection and numeric helpers shared by the evaluation pipeline.
//!
//! All angles crossing a public boundary are in degrees; radians stay
//! internal to the routines that need them.

use nalgebra::Vector3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimal separation enforced between the min and max bounds.
///
/// Bound setters push the *other* bound away by this amount whenever a
/// write would leave `min >= max`, which keeps the normalization divisor
/// nonzero.
pub const BOUNDS_EPSILON: f64 = 1e-4;

/// World axis selector used by axis-scoped metrics and projections.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    /// Forward axis in the entity's local frame.
    #[default]
    Z,
}

impl Axis {
    /// Unit vector for this axis in world space.
    #[inline]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Component of `v` along this axis.
    #[inline]
    pub fn component(self, v: &Vector3<f64>) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Right-handed orthonormal basis `(u, v)` of the plane perpendicular
    /// to this axis, with `u x v = axis`.
    ///
    /// The basis is fixed per axis so azimuth-style measurements are
    /// deterministic across runs.
    pub fn plane_basis(self) -> (Vector3<f64>, Vector3<f64>) {
        match self {
            Axis::X => (Vector3::y(), Vector3::z()),
            Axis::Y => (Vector3::z(), Vector3::x()),
            Axis::Z => (Vector3::x(), Vector3::y()),
        }
    }
}

/// Affine map of `v` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Not clamped: inputs outside the source range map outside the target
/// range. Callers that need clamping apply it explicitly.
#[inline]
pub fn map_range(v: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    out_min + (v - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Clamp to the unit interval.
#[inline]
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
///
/// A zero-length input yields 0 rather than NaN; degenerate geometry is a
/// neutral measurement, not an error.
pub fn angle_between_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
