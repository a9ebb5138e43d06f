//! JSON API for engine integration.
//!
//! Scene-in, snapshots-out: the host serializes entity state plus
//! relationship configuration, and receives the evaluated snapshots and
//! fired events back. Configuration persistence stays on the host side;
//! this surface only evaluates.

pub mod json_api;

pub use json_api::{
    build_scene, evaluate_scene, evaluate_scene_json, DatumReport, EntityState, MemberReport,
    RelationshipConfig, RelationshipReport, SceneRequest, SceneResponse, SettingsOverride,
};
