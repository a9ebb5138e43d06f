//! Cached read-model (`RelationshipInfo`) and the bulk-write patch.
//!
//! The info struct has two freshness tiers:
//! - structural fields (identity, configuration, member/role list) are
//!   rebuilt only on explicit invalidation;
//! - dynamic fields (datum, converter, curved, status) are recomputed on
//!   every read, so they are never stale, only absent before first build.
//!
//! Member `resolved` flags are refreshed with the dynamic tier: resolution
//! is a property of the live directory, not of the configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::converter::Converter;
use crate::curve::Curve;
use crate::datum::Datum;
use crate::family::{Family, MetricSelection};
use crate::settings::MetricSettings;
use crate::status::Status;

/// One resolved member slot with its positional role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub role: String,
    pub name: String,
    pub resolved: bool,
}

/// Read-only aggregate exposed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInfo {
    // ========== Structural tier ==========
    pub id: Uuid,
    pub description: String,
    pub family: Family,
    pub metric: MetricSelection,
    pub settings: MetricSettings,
    pub min: f64,
    pub max: f64,
    pub curve: Curve,
    pub members: Vec<MemberInfo>,

    // ========== Dynamic tier ==========
    pub datum: Datum,
    pub converter: Converter,
    /// Curve-shaped normalized value.
    pub curved: f64,
    pub status: Status,
}

impl RelationshipInfo {
    /// Structural projection used to compare snapshots across reads
    /// without the per-read dynamic fields.
    pub fn structural_eq(&self, other: &RelationshipInfo) -> bool {
        self.id == other.id
            && self.description == other.description
            && self.family == other.family
            && self.metric == other.metric
            && self.settings == other.settings
            && self.min == other.min
            && self.max == other.max
            && self.curve == other.curve
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.role == b.role && a.name == b.name)
    }
}

/// Bulk-write patch applied at the trust boundary.
///
/// Every field is optional; absent fields leave the relationship
/// untouched. A patch whose metric does not belong to the (possibly also
/// patched) family is rejected as a whole with
/// [`RelationError::MetricFamilyMismatch`](crate::error::RelationError).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipPatch {
    pub description: Option<String>,
    pub family: Option<Family>,
    pub metric: Option<MetricSelection>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub curve: Option<Curve>,
    pub settings: Option<MetricSettings>,
    /// Member entity names in role order (index 0 = leader).
    pub members: Option<Vec<String>>,
}

impl RelationshipPatch {
    /// Round-trip convenience: a patch that would reproduce `info`'s
    /// configuration, member order included.
    pub fn from_info(info: &RelationshipInfo) -> Self {
        Self {
            description: Some(info.description.clone()),
            family: Some(info.family),
            metric: Some(info.metric),
            min: Some(info.min),
            max: Some(info.max),
            curve: Some(info.curve.clone()),
            settings: Some(info.settings.clone()),
            members: Some(info.members.iter().map(|m| m.name.clone()).collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
