use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::curve::Curve;
use crate::datum::Datum;
use crate::directory::{SceneDirectory, Transform};
use crate::error::{RelationError, Result};
use crate::family::{Family, MetricSelection};
use crate::math::Axis;
use crate::relationship::Relationship;
use crate::settings::{DistanceUnit, MetricSettings};
use crate::status::Status;
use nalgebra::{UnitQuaternion, Vector3};

/// Wire schema version accepted by this build.
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SceneRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub entities: Vec<EntityState>,
    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
}

/// One tracked entity's spatial state at evaluation time.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EntityState {
    pub name: String,
    /// World position in meters.
    pub position: [f64; 3],
    /// Euler angles in degrees (roll, pitch, yaw). Identity if absent.
    #[serde(default)]
    pub rotation_euler_deg: Option<[f64; 3]>,
    /// World velocity in meters per second. Zero if absent.
    #[serde(default)]
    pub velocity: Option<[f64; 3]>,
}

/// One relationship to evaluate.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RelationshipConfig {
    #[serde(default)]
    pub description: String,
    pub family: Family,
    /// Metric name within the family's closed set. Family default if
    /// absent; a foreign name rejects the request.
    #[serde(default)]
    pub metric: Option<String>,
    /// Member entity names in role order (index 0 = leader).
    pub members: Vec<String>,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default)]
    pub settings: Option<SettingsOverride>,
}

fn default_max() -> f64 {
    1.0
}

/// Sparse settings override; absent fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SettingsOverride {
    pub axis: Option<Axis>,
    pub use_local_axis: Option<bool>,
    pub distance_unit: Option<DistanceUnit>,
    pub threshold: Option<f64>,
    pub reference_point: Option<[f64; 3]>,
    pub proxy: Option<String>,
    pub trigger_false_state: Option<Status>,
}

impl SettingsOverride {
    pub fn apply_to(&self, mut settings: MetricSettings) -> MetricSettings {
        if let Some(axis) = self.axis {
            settings.axis = axis;
        }
        if let Some(local) = self.use_local_axis {
            settings.use_local_axis = local;
        }
        if let Some(unit) = self.distance_unit {
            settings.distance_unit = unit;
        }
        if let Some(threshold) = self.threshold {
            settings.threshold = threshold;
        }
        if let Some(point) = self.reference_point {
            settings.reference_point = Vector3::new(point[0], point[1], point[2]);
        }
        if let Some(proxy) = &self.proxy {
            settings.proxy = Some(proxy.clone());
        }
        if let Some(state) = self.trigger_false_state {
            settings.trigger_false_state = state;
        }
        settings
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SceneResponse {
    pub schema_version: u8,
    pub relationships: Vec<RelationshipReport>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RelationshipReport {
    pub id: String,
    pub description: String,
    pub family: Family,
    pub metric: String,
    pub status: Status,
    pub raw: f64,
    pub normalized: f64,
    pub as_axis: f64,
    pub curved: f64,
    pub over: bool,
    pub under: bool,
    pub in_range: bool,
    pub datum: DatumReport,
    pub members: Vec<MemberReport>,
    /// Event names fired by this evaluation, in queue order.
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MemberReport {
    pub role: String,
    pub name: String,
    pub resolved: bool,
}

/// Wire projection of a type-tagged datum.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DatumReport {
    pub kind: String,
    /// Numeric projection (same value the converter consumed).
    pub scalar: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quaternion: Option<[f64; 4]>,
}

impl DatumReport {
    fn from_datum(datum: &Datum) -> Self {
        let (kind, vector, quaternion) = match datum {
            Datum::Float(_) => ("float", None, None),
            Datum::Bool(_) => ("bool", None, None),
            Datum::Vector(v) => ("vector", Some([v.x, v.y, v.z]), None),
            Datum::Rotation(q) => {
                let c = q.quaternion().coords;
                ("rotation", None, Some([c.w, c.x, c.y, c.z]))
            }
        };
        Self { kind: kind.to_string(), scalar: datum.raw(), vector, quaternion }
    }
}

fn transform_of(entity: &EntityState) -> Transform {
    let mut transform =
        Transform::at(Vector3::new(entity.position[0], entity.position[1], entity.position[2]));
    if let Some([roll, pitch, yaw]) = entity.rotation_euler_deg {
        transform.rotation = UnitQuaternion::from_euler_angles(
            roll.to_radians(),
            pitch.to_radians(),
            yaw.to_radians(),
        );
    }
    if let Some([vx, vy, vz]) = entity.velocity {
        transform.velocity = Vector3::new(vx, vy, vz);
    }
    transform
}

/// Build the directory and relationships described by a request.
///
/// Strict at the trust boundary: a metric name outside its family's set
/// fails the whole request with `MetricFamilyMismatch`. Unknown member
/// names stay lenient (detached handles, neutral output) per the
/// availability policy.
pub fn build_scene(request: &SceneRequest) -> Result<(SceneDirectory, Vec<Relationship>)> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(RelationError::SchemaVersion {
            found: request.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let mut directory = SceneDirectory::new();
    for entity in &request.entities {
        if directory.get(&entity.name).is_some() {
            warn!(name = %entity.name, "duplicate entity in request, last state wins");
        }
        directory.register(entity.name.clone(), transform_of(entity));
    }

    let mut relationships = Vec::with_capacity(request.relationships.len());
    for config in &request.relationships {
        let selection = MetricSelection::from_parts(config.family, config.metric.as_deref())?;
        let settings = config
            .settings
            .as_ref()
            .map(|o| o.apply_to(MetricSettings::default()))
            .unwrap_or_default();

        let mut relationship = Relationship::new(config.description.clone())
            .with_selection(selection)
            .with_settings(settings)
            .with_bounds(config.min, config.max)
            .with_curve(config.curve.clone());
        relationship.bind(&directory, &config.members);

        // availability over failure: a degraded configuration still
        // evaluates (neutral output), but the host gets a signal
        if let Err(err) = relationship.validate() {
            warn!(description = %relationship.description(), %err, "degraded relationship configuration");
        }

        debug!(
            description = %relationship.description(),
            family = %relationship.family(),
            metric = relationship.selection().metric_name(),
            members = config.members.len(),
            "configured relationship"
        );
        relationships.push(relationship);
    }

    Ok((directory, relationships))
}

/// Evaluate every relationship in the request once.
pub fn evaluate_scene(request: &SceneRequest) -> Result<SceneResponse> {
    let (_directory, mut relationships) = build_scene(request)?;

    let reports = relationships
        .iter_mut()
        .map(|relationship| {
            let info = relationship.read().clone();
            let events: Vec<String> =
                relationship.take_events().iter().map(|e| e.name().to_string()).collect();
            debug!(
                description = %info.description,
                status = %info.status,
                raw = info.converter.raw,
                "evaluated relationship"
            );
            RelationshipReport {
                id: info.id.to_string(),
                description: info.description,
                family: info.family,
                metric: info.metric.metric_name().to_string(),
                status: info.status,
                raw: info.converter.raw,
                normalized: info.converter.normalized,
                as_axis: info.converter.as_axis,
                curved: info.curved,
                over: info.converter.over,
                under: info.converter.under,
                in_range: info.converter.in_range,
                datum: DatumReport::from_datum(&info.datum),
                members: info
                    .members
                    .iter()
                    .map(|m| MemberReport {
                        role: m.role.clone(),
                        name: m.name.clone(),
                        resolved: m.resolved,
                    })
                    .collect(),
                events,
            }
        })
        .collect();

    Ok(SceneResponse { schema_version: SCHEMA_VERSION, relationships: reports })
}

/// JSON-in, JSON-out entry point for engine bindings.
pub fn evaluate_scene_json(request_json: &str) -> Result<String> {
    let request: SceneRequest = serde_json::from_str(request_json)?;
    let response = evaluate_scene(&request)?;
    Ok(serde_json::to_string(&response)?)
}
