//! Type-tagged raw measurement values.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// The unit of raw metric output: one type-tagged value, immutable once
/// produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Datum {
    Float(f64),
    Bool(bool),
    Vector(Vector3<f64>),
    Rotation(UnitQuaternion<f64>),
}

/// Tag-only view of a datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatumKind {
    Float,
    Bool,
    Vector,
    Rotation,
}

impl Datum {
    /// Neutral zero-valued float, the fallback for degraded numeric
    /// evaluation.
    pub const ZERO: Datum = Datum::Float(0.0);

    pub fn kind(&self) -> DatumKind {
        match self {
            Datum::Float(_) => DatumKind::Float,
            Datum::Bool(_) => DatumKind::Bool,
            Datum::Vector(_) => DatumKind::Vector,
            Datum::Rotation(_) => DatumKind::Rotation,
        }
    }

    /// Numeric projection fed to the converter.
    ///
    /// - Float: the value itself
    /// - Bool: 0 or 1
    /// - Vector: magnitude
    /// - Rotation: rotation angle in degrees
    pub fn raw(&self) -> f64 {
        match self {
            Datum::Float(v) => *v,
            Datum::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Datum::Vector(v) => v.norm(),
            Datum::Rotation(q) => q.angle().to_degrees(),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Datum::Bool(_))
    }
}
