//! Family and metric taxonomy.
//!
//! A relationship's arity class (`Family`) decides which closed metric set
//! is legal. The active metric is a sum type with one variant per family,
//! each carrying only its own metric enum: a family holding a foreign
//! metric is unrepresentable, so the runtime check survives only at the
//! JSON/patch trust boundary (`MetricSelection::from_parts`).

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::converter::BoolMapping;
use crate::error::{RelationError, Result};
use crate::settings::MetricSettings;
use crate::status::Status;

/// Arity class of a relationship.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Single,
    #[default]
    Couple,
    Throuple,
    Group,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Single, Family::Couple, Family::Throuple, Family::Group];

    /// Required member count. `None` means variable arity (at least one).
    pub fn required_members(self) -> Option<usize> {
        match self {
            Family::Single => Some(1),
            Family::Couple => Some(2),
            Family::Throuple => Some(3),
            Family::Group => None,
        }
    }

    /// Positional role name. Index 0 is always the primary/leader role;
    /// this ordering is load-bearing for every multi-member metric.
    pub fn role_name(self, index: usize) -> String {
        match (self, index) {
            (Family::Single, 0) => "subject".to_string(),
            (Family::Couple, 0) => "leader".to_string(),
            (Family::Couple, 1) => "follower".to_string(),
            (Family::Throuple, 0) => "leader".to_string(),
            (Family::Throuple, 1) => "second".to_string(),
            (Family::Throuple, 2) => "third".to_string(),
            (Family::Group, 0) => "leader".to_string(),
            (_, i) => format!("member_{}", i),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Single => "single",
            Family::Couple => "couple",
            Family::Throuple => "throuple",
            Family::Group => "group",
        };
        write!(f, "{}", name)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SingleMetric {
    /// Offset of the subject from the reference point (or proxy).
    #[default]
    Position,
    /// Speed of the subject.
    Movement,
    /// Orientation of the subject.
    Rotation,
    /// Whether the subject sits within `threshold` of the reference.
    Trigger,
}

impl SingleMetric {
    pub const ALL: [SingleMetric; 4] = [
        SingleMetric::Position,
        SingleMetric::Movement,
        SingleMetric::Rotation,
        SingleMetric::Trigger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SingleMetric::Position => "position",
            SingleMetric::Movement => "movement",
            SingleMetric::Rotation => "rotation",
            SingleMetric::Trigger => "trigger",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CoupleMetric {
    /// Distance between leader and follower.
    #[default]
    Distance,
    /// Angle between the leader's facing axis and the direction to the
    /// follower.
    Angle,
    /// Signed azimuth of the follower around the leader's selected axis.
    RotationAroundAxis,
}

impl CoupleMetric {
    pub const ALL: [CoupleMetric; 3] =
        [CoupleMetric::Distance, CoupleMetric::Angle, CoupleMetric::RotationAroundAxis];

    pub fn name(self) -> &'static str {
        match self {
            CoupleMetric::Distance => "distance",
            CoupleMetric::Angle => "angle",
            CoupleMetric::RotationAroundAxis => "rotation_around_axis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ThroupleMetric {
    /// Vertex angle at the leader formed by the other two members.
    #[default]
    Angle,
    /// Mean pairwise distance of the three members.
    Density,
}

impl ThroupleMetric {
    pub const ALL: [ThroupleMetric; 2] = [ThroupleMetric::Angle, ThroupleMetric::Density];

    pub fn name(self) -> &'static str {
        match self {
            ThroupleMetric::Angle => "angle",
            ThroupleMetric::Density => "density",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupMetric {
    /// Mean member distance from the group centroid.
    #[default]
    Density,
    /// Group radius: max member distance from the centroid.
    Size,
    /// Whether every member sits within `threshold` of the centroid.
    Trigger,
}

impl GroupMetric {
    pub const ALL: [GroupMetric; 3] = [GroupMetric::Density, GroupMetric::Size, GroupMetric::Trigger];

    pub fn name(self) -> &'static str {
        match self {
            GroupMetric::Density => "density",
            GroupMetric::Size => "size",
            GroupMetric::Trigger => "trigger",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

/// The active (family, metric) selection.
///
/// Exactly one metric is active per relationship at a time, and it always
/// belongs to the metric set of the carried family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "family", content = "metric", rename_all = "snake_case")]
pub enum MetricSelection {
    Single(SingleMetric),
    Couple(CoupleMetric),
    Throuple(ThroupleMetric),
    Group(GroupMetric),
}

impl Default for MetricSelection {
    fn default() -> Self {
        MetricSelection::Couple(CoupleMetric::Distance)
    }
}

impl MetricSelection {
    pub fn family(&self) -> Family {
        match self {
            MetricSelection::Single(_) => Family::Single,
            MetricSelection::Couple(_) => Family::Couple,
            MetricSelection::Throuple(_) => Family::Throuple,
            MetricSelection::Group(_) => Family::Group,
        }
    }

    /// Default metric slot for a family, used when the family changes and
    /// the previous metric no longer applies.
    pub fn default_for(family: Family) -> Self {
        match family {
            Family::Single => MetricSelection::Single(SingleMetric::default()),
            Family::Couple => MetricSelection::Couple(CoupleMetric::default()),
            Family::Throuple => MetricSelection::Throuple(ThroupleMetric::default()),
            Family::Group => MetricSelection::Group(GroupMetric::default()),
        }
    }

    /// Trust-boundary constructor: parse a metric name within a family.
    ///
    /// `None` selects the family default. A name outside the family's
    /// closed set is the typed `MetricFamilyMismatch` rejection.
    pub fn from_parts(family: Family, metric: Option<&str>) -> Result<Self> {
        let Some(name) = metric else {
            return Ok(Self::default_for(family));
        };
        let selection = match family {
            Family::Single => SingleMetric::from_name(name).map(MetricSelection::Single),
            Family::Couple => CoupleMetric::from_name(name).map(MetricSelection::Couple),
            Family::Throuple => ThroupleMetric::from_name(name).map(MetricSelection::Throuple),
            Family::Group => GroupMetric::from_name(name).map(MetricSelection::Group),
        };
        selection.ok_or_else(|| RelationError::MetricFamilyMismatch {
            family,
            metric: name.to_string(),
        })
    }

    pub fn metric_name(&self) -> &'static str {
        match self {
            MetricSelection::Single(m) => m.name(),
            MetricSelection::Couple(m) => m.name(),
            MetricSelection::Throuple(m) => m.name(),
            MetricSelection::Group(m) => m.name(),
        }
    }

    /// Range mapping applied when this metric produces a boolean datum.
    ///
    /// Declared per metric rather than hard-coded in the converter: trigger
    /// metrics map `true` to in-range and draw the `false` state from
    /// settings. Metrics that never produce booleans still declare a
    /// defined mapping so the converter has no undefined input.
    pub fn bool_mapping(&self, settings: &MetricSettings) -> BoolMapping {
        match self {
            MetricSelection::Single(SingleMetric::Trigger)
            | MetricSelection::Group(GroupMetric::Trigger) => BoolMapping {
                on_true: Status::InRange,
                on_false: settings.trigger_false_state,
            },
            _ => BoolMapping { on_true: Status::InRange, on_false: Status::Under },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_carries_its_own_family() {
        assert_eq!(MetricSelection::Single(SingleMetric::Trigger).family(), Family::Single);
        assert_eq!(MetricSelection::Couple(CoupleMetric::Distance).family(), Family::Couple);
        assert_eq!(MetricSelection::Throuple(ThroupleMetric::Angle).family(), Family::Throuple);
        assert_eq!(MetricSelection::Group(GroupMetric::Size).family(), Family::Group);
    }

    #[test]
    fn from_parts_accepts_only_the_family_set() {
        let ok = MetricSelection::from_parts(Family::Couple, Some("distance")).unwrap();
        assert_eq!(ok, MetricSelection::Couple(CoupleMetric::Distance));

        let err = MetricSelection::from_parts(Family::Single, Some("distance")).unwrap_err();
        assert!(matches!(err, RelationError::MetricFamilyMismatch { family: Family::Single, .. }));
    }

    #[test]
    fn from_parts_without_metric_uses_family_default() {
        assert_eq!(
            MetricSelection::from_parts(Family::Group, None).unwrap(),
            MetricSelection::Group(GroupMetric::Density)
        );
    }

    #[test]
    fn every_metric_name_round_trips() {
        for m in SingleMetric::ALL {
            assert_eq!(SingleMetric::from_name(m.name()), Some(m));
        }
        for m in CoupleMetric::ALL {
            assert_eq!(CoupleMetric::from_name(m.name()), Some(m));
        }
        for m in ThroupleMetric::ALL {
            assert_eq!(ThroupleMetric::from_name(m.name()), Some(m));
        }
        for m in GroupMetric::ALL {
            assert_eq!(GroupMetric::from_name(m.name()), Some(m));
        }
    }

    #[test]
    fn selection_serializes_with_family_tag() {
        let json =
            serde_json::to_value(MetricSelection::Couple(CoupleMetric::Distance)).unwrap();
        assert_eq!(json["family"], "couple");
        assert_eq!(json["metric"], "distance");
    }

    #[test]
    fn trigger_false_state_comes_from_settings() {
        let mut settings = MetricSettings::default();
        settings.trigger_false_state = Status::Over;
        let mapping =
            MetricSelection::Single(SingleMetric::Trigger).bool_mapping(&settings);
        assert_eq!(mapping.on_true, Status::InRange);
        assert_eq!(mapping.on_false, Status::Over);
    }

    #[test]
    fn role_names_are_positional() {
        assert_eq!(Family::Couple.role_name(0), "leader");
        assert_eq!(Family::Couple.role_name(1), "follower");
        assert_eq!(Family::Group.role_name(3), "member_3");
    }
}
