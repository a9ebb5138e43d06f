//! # tether_core - Spatial Relationship Evaluation Engine
//!
//! This library computes a single derived measurement ("how close, how
//! far, how aligned") from the live spatial state of a small group of
//! tracked entities, then classifies and shapes it for downstream
//! consumption via a JSON API that embeds cleanly in game engines.
//!
//! ## Features
//! - Family-scoped metric dispatch (single/couple/throuple/group)
//! - Normalization, axis mapping, and curve shaping over every raw value
//! - Edge-triggered status events with hysteresis
//! - Two-tier snapshot cache: structural rebuild on configuration change,
//!   dynamic refresh on every read
//! - Fully deterministic: same scene state in, same snapshot out

pub mod api;
pub mod converter;
pub mod curve;
pub mod datum;
pub mod debug_flags;
pub mod directory;
pub mod error;
pub mod family;
pub mod math;
pub mod relation;
pub mod relationship;
pub mod settings;
pub mod snapshot;
pub mod status;

// Re-export the main API surface
pub use api::{evaluate_scene_json, SceneRequest, SceneResponse};
pub use converter::{BoolMapping, Converter};
pub use curve::{lookup_curve, register_curve, Curve, CurveTable};
pub use datum::{Datum, DatumKind};
pub use directory::{LiveHandle, MemberRef, SceneDirectory, Transform};
pub use error::{RelationError, Result};
pub use family::{
    CoupleMetric, Family, GroupMetric, MetricSelection, SingleMetric, ThroupleMetric,
};
pub use math::Axis;
pub use relation::Relation;
pub use relationship::Relationship;
pub use settings::{DistanceUnit, MetricSettings};
pub use snapshot::{MemberInfo, RelationshipInfo, RelationshipPatch};
pub use status::{classify, RelationshipEvent, Status};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = api::json_api::SCHEMA_VERSION;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene_request() -> serde_json::Value {
        json!({
            "schema_version": 1,
            "entities": [
                {"name": "leader", "position": [0.0, 0.0, 0.0]},
                {"name": "follower", "position": [3.0, 0.0, 0.0]},
                {"name": "third", "position": [0.0, 4.0, 0.0]}
            ],
            "relationships": [
                {
                    "description": "pair distance",
                    "family": "couple",
                    "metric": "distance",
                    "members": ["leader", "follower"],
                    "min": 0.0,
                    "max": 5.0
                },
                {
                    "description": "formation angle",
                    "family": "throuple",
                    "metric": "angle",
                    "members": ["leader", "follower", "third"],
                    "min": 0.0,
                    "max": 180.0,
                    "curve": {"type": "ease_in"}
                }
            ]
        })
    }

    #[test]
    fn test_basic_evaluation() {
        let result = evaluate_scene_json(&scene_request().to_string());
        assert!(result.is_ok(), "evaluation should succeed");

        let parsed: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(parsed["schema_version"], 1);

        let pair = &parsed["relationships"][0];
        assert_eq!(pair["raw"], 3.0);
        assert_eq!(pair["status"], "in_range");

        let formation = &parsed["relationships"][1];
        assert_eq!(formation["raw"], 90.0);
        assert_eq!(formation["normalized"], 0.5);
        assert_eq!(formation["curved"], 0.25, "ease-in shaping applies");
    }

    #[test]
    fn test_determinism() {
        let request = scene_request().to_string();
        let first = evaluate_scene_json(&request).unwrap();
        let second = evaluate_scene_json(&request).unwrap();

        // ids are generated per build, everything else must match
        let strip_ids = |json: &str| -> serde_json::Value {
            let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
            if let Some(rels) = value["relationships"].as_array_mut() {
                for rel in rels {
                    rel["id"] = serde_json::Value::Null;
                }
            }
            value
        };
        assert_eq!(
            strip_ids(&first),
            strip_ids(&second),
            "same scene state must produce the same snapshot"
        );
    }

    #[test]
    fn test_library_level_read_loop() {
        use nalgebra::Vector3;

        let mut dir = SceneDirectory::new();
        dir.register("a", Transform::at(Vector3::zeros()));
        dir.register("b", Transform::at(Vector3::new(3.0, 0.0, 0.0)));

        let mut rel = Relationship::new("loop")
            .with_selection(MetricSelection::Couple(CoupleMetric::Distance))
            .with_bounds(0.0, 5.0);
        rel.bind(&dir, &["a", "b"]);

        assert_eq!(rel.read().status, Status::InRange);
        let first_events = rel.take_events();
        assert!(first_events.iter().any(|e| matches!(e, RelationshipEvent::InRange)));

        // move b out of range: one over transition
        dir.set_position("b", Vector3::new(9.0, 0.0, 0.0));
        assert_eq!(rel.read().status, Status::Over);
        let events = rel.take_events();
        assert_eq!(
            events.iter().filter(|e| matches!(e, RelationshipEvent::Over)).count(),
            1
        );
    }
}
