//! Curve-shaping collaborator: `f: [0,1] -> [0,1]`, sampled, not computed,
//! by the evaluation core.
//!
//! Library curves are closed-form; user-authored curves are keyframe
//! tables with linear interpolation. Named curves resolve through a
//! process-wide registry so authoring tools can install tables once and
//! reference them from any relationship.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::math::clamp01;

/// Process-wide library of user-authored curve tables.
static CURVE_LIBRARY: Lazy<RwLock<HashMap<String, CurveTable>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Install (or replace) a named curve table in the process-wide library.
pub fn register_curve(name: impl Into<String>, table: CurveTable) {
    let mut library = CURVE_LIBRARY.write().unwrap_or_else(|e| e.into_inner());
    library.insert(name.into(), table);
}

/// Look up a named curve table.
pub fn lookup_curve(name: &str) -> Option<CurveTable> {
    let library = CURVE_LIBRARY.read().unwrap_or_else(|e| e.into_inner());
    library.get(name).cloned()
}

/// One keyframe of a user-authored curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurveKey {
    pub t: f64,
    pub v: f64,
}

/// Sorted keyframe table sampled with linear interpolation.
///
/// Inputs outside the key range clamp to the end keys; an empty table
/// degrades to the identity (linear) curve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CurveTable {
    keys: Vec<CurveKey>,
}

impl CurveTable {
    /// Build from (t, v) points. Points are sorted by t and values clamped
    /// into [0, 1].
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut keys: Vec<CurveKey> = points
            .into_iter()
            .map(|(t, v)| CurveKey { t: clamp01(t), v: clamp01(v) })
            .collect();
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn sample(&self, t: f64) -> f64 {
        let t = clamp01(t);
        if self.keys.is_empty() {
            return t;
        }
        if t <= self.keys[0].t {
            return self.keys[0].v;
        }
        if let Some(last) = self.keys.last() {
            if t >= last.t {
                return last.v;
            }
        }
        // t sits strictly between two keys here
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                if (b.t - a.t).abs() <= f64::EPSILON {
                    return b.v;
                }
                let frac = (t - a.t) / (b.t - a.t);
                return a.v + frac * (b.v - a.v);
            }
        }
        self.keys.last().map(|k| k.v).unwrap_or(t)
    }
}

/// Curve selection for the shaping stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Inline user-authored keyframe table.
    Table(CurveTable),
    /// Reference into the process-wide curve library. Unknown names fall
    /// back to linear with a warning rather than failing the read.
    Named(String),
}

impl Curve {
    /// Sample the curve at `t`. Input and output are both clamped to
    /// [0, 1].
    pub fn sample(&self, t: f64) -> f64 {
        let t = clamp01(t);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => t * t,
            Curve::EaseOut => t * (2.0 - t),
            Curve::EaseInOut => t * t * (3.0 - 2.0 * t),
            Curve::Table(table) => clamp01(table.sample(t)),
            Curve::Named(name) => match lookup_curve(name) {
                Some(table) => clamp01(table.sample(t)),
                None => {
                    log::warn!("curve library: unknown curve '{}', sampling linear", name);
                    t
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_curves_hit_endpoints() {
        for curve in [Curve::Linear, Curve::EaseIn, Curve::EaseOut, Curve::EaseInOut] {
            assert_eq!(curve.sample(0.0), 0.0, "{:?} at 0", curve);
            assert_eq!(curve.sample(1.0), 1.0, "{:?} at 1", curve);
        }
    }

    #[test]
    fn ease_shapes_bend_the_expected_way() {
        assert!(Curve::EaseIn.sample(0.5) < 0.5);
        assert!(Curve::EaseOut.sample(0.5) > 0.5);
        assert_eq!(Curve::EaseInOut.sample(0.5), 0.5);
    }

    #[test]
    fn sample_clamps_input() {
        assert_eq!(Curve::Linear.sample(2.0), 1.0);
        assert_eq!(Curve::Linear.sample(-1.0), 0.0);
    }

    #[test]
    fn table_interpolates_between_keys() {
        let table = CurveTable::from_points([(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        assert_eq!(table.sample(0.25), 0.5);
        assert_eq!(table.sample(0.5), 1.0);
        assert_eq!(table.sample(0.75), 0.5);
    }

    #[test]
    fn table_clamps_outside_key_range() {
        let table = CurveTable::from_points([(0.2, 0.4), (0.8, 0.6)]);
        assert_eq!(table.sample(0.0), 0.4);
        assert_eq!(table.sample(1.0), 0.6);
    }

    #[test]
    fn empty_table_degrades_to_linear() {
        let table = CurveTable::default();
        assert_eq!(table.sample(0.3), 0.3);
    }

    #[test]
    fn named_curve_resolves_through_the_library() {
        register_curve("test_flip", CurveTable::from_points([(0.0, 1.0), (1.0, 0.0)]));
        let curve = Curve::Named("test_flip".to_string());
        assert_eq!(curve.sample(0.0), 1.0);
        assert_eq!(curve.sample(1.0), 0.0);
    }

    #[test]
    fn unknown_named_curve_falls_back_to_linear() {
        let curve = Curve::Named("definitely_not_registered".to_string());
        assert_eq!(curve.sample(0.3), 0.3);
    }
}
