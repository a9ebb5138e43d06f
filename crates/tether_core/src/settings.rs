//! Metric-agnostic configuration record and the settings carry-over
//! policy.
//!
//! `MetricSettings` is deliberately flat: only a subset of fields is
//! meaningful for any given (family, metric) pair, the rest are inert.
//! Which fields a metric consumes is documented on the resolver routines.

use nalgebra::Vector3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::math::Axis;
use crate::status::Status;

/// Length unit applied to every length-typed raw value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Meters,
    Decimeters,
    Centimeters,
}

impl DistanceUnit {
    /// Scale factor from meters (the directory's native unit).
    #[inline]
    pub fn scale(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Decimeters => 10.0,
            DistanceUnit::Centimeters => 100.0,
        }
    }
}

/// Flat record of metric-agnostic configuration fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSettings {
    /// Axis for axis-scoped metrics (facing, azimuth).
    pub axis: Axis,
    /// Interpret `axis` in the leader's local frame instead of world space.
    pub use_local_axis: bool,
    /// Unit for length-typed raw values.
    pub distance_unit: DistanceUnit,
    /// Radius for trigger metrics, in `distance_unit`.
    pub threshold: f64,
    /// World-space reference point for single-member metrics.
    pub reference_point: Vector3<f64>,
    /// Auxiliary proxy entity name. When set and resolvable, its live
    /// position replaces `reference_point`. Survives metric changes.
    pub proxy: Option<String>,
    /// Range state a trigger metric maps `false` to (`true` always maps to
    /// in-range).
    pub trigger_false_state: Status,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            axis: Axis::default(),
            use_local_axis: false,
            distance_unit: DistanceUnit::default(),
            threshold: 1.0,
            reference_point: Vector3::zeros(),
            proxy: None,
            trigger_false_state: Status::Under,
        }
    }
}

/// Settings policy applied on a genuine (family, metric) change: reset
/// every field to defaults, carrying over only the auxiliary proxy.
///
/// Must run exactly once per actual selection change; the caller detects
/// the change against the last-observed selection.
pub fn reset_for_new_selection(current: &MetricSettings) -> MetricSettings {
    MetricSettings { proxy: current.proxy.clone(), ..MetricSettings::default() }
}
