//! Scene driver for the tether relationship engine.
//!
//! Two entry points: one-shot evaluation of a scene file, and a seeded
//! random-walk simulation that reports status transitions over time.

use std::path::Path;

use anyhow::{Context, Result};

pub mod simulate;

pub use simulate::{run_simulation, SimulationConfig, SimulationSummary};

use tether_core::api::SceneRequest;

/// Load a scene request from a JSON file.
pub fn load_scene(path: &Path) -> Result<SceneRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing scene file '{}'", path.display()))
}

/// Evaluate a scene file once and return the response JSON.
pub fn evaluate_file(path: &Path, pretty: bool) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene file '{}'", path.display()))?;
    let response = tether_core::evaluate_scene_json(&raw).context("evaluating scene")?;
    if pretty {
        let value: serde_json::Value = serde_json::from_str(&response)?;
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scene_json() -> &'static str {
        r#"{
            "schema_version": 1,
            "entities": [
                {"name": "a", "position": [0.0, 0.0, 0.0]},
                {"name": "b", "position": [3.0, 0.0, 0.0]}
            ],
            "relationships": [{
                "description": "pair",
                "family": "couple",
                "metric": "distance",
                "members": ["a", "b"],
                "min": 0.0,
                "max": 5.0
            }]
        }"#
    }

    #[test]
    fn evaluate_file_round_trips_a_scene() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(scene_json().as_bytes()).unwrap();

        let response = evaluate_file(file.path(), false).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["relationships"][0]["raw"], 3.0);
        assert_eq!(parsed["relationships"][0]["status"], "in_range");
    }

    #[test]
    fn load_scene_reports_bad_files_with_context() {
        let err = load_scene(Path::new("definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("not/here.json"));
    }
}
