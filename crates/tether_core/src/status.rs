//! Range status and the hysteresis classifier.
//!
//! The classifier is a pure function over (previous status, converter
//! flags) so it can be unit-tested in isolation from the evaluation
//! pipeline. Events are edge-triggered: one event per actual status
//! change, nothing on repeats.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::converter::Converter;
use crate::datum::Datum;

/// Classified range state. `None` only before the first evaluation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    None,
    Under,
    Over,
    InRange,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::None => "none",
            Status::Under => "under",
            Status::Over => "over",
            Status::InRange => "in_range",
        };
        write!(f, "{}", name)
    }
}

/// Events surfaced to consumers, drained via
/// [`Relationship::take_events`](crate::relationship::Relationship::take_events).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "datum", rename_all = "snake_case")]
pub enum RelationshipEvent {
    /// Something in the dynamic tier changed this read.
    Updated,
    /// The computed datum changed value.
    DatumUpdated(Datum),
    /// Status transitioned to Under.
    Under,
    /// Status transitioned to Over.
    Over,
    /// Status transitioned to InRange.
    InRange,
}

impl RelationshipEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RelationshipEvent::Updated => "updated",
            RelationshipEvent::DatumUpdated(_) => "datum_updated",
            RelationshipEvent::Under => "under",
            RelationshipEvent::Over => "over",
            RelationshipEvent::InRange => "in_range",
        }
    }
}

/// Classify the candidate status from converter flags and report the
/// transition event, if any.
///
/// The four candidate conditions are mutually exclusive under the
/// converter invariant; the trailing `None` arm is a defensive default,
/// unreachable given a correct converter.
pub fn classify(prev: Status, conv: &Converter) -> (Status, Option<RelationshipEvent>) {
    let candidate = if conv.under && !conv.over && !conv.in_range {
        Status::Under
    } else if conv.over && !conv.under && !conv.in_range {
        Status::Over
    } else if conv.in_range && !conv.over && !conv.under {
        Status::InRange
    } else {
        Status::None
    };

    if candidate == prev {
        return (candidate, None);
    }

    let event = match candidate {
        Status::Under => Some(RelationshipEvent::Under),
        Status::Over => Some(RelationshipEvent::Over),
        Status::InRange => Some(RelationshipEvent::InRange),
        Status::None => None,
    };
    (candidate, event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{BoolMapping, Converter};

    fn conv_for(raw: f64) -> Converter {
        Converter::derive(&Datum::Float(raw), 0.0, 10.0, BoolMapping::default())
    }

    #[test]
    fn first_classification_reports_exactly_once() {
        let (status, event) = classify(Status::None, &conv_for(5.0));
        assert_eq!(status, Status::InRange);
        assert_eq!(event, Some(RelationshipEvent::InRange));

        let (status, event) = classify(status, &conv_for(5.0));
        assert_eq!(status, Status::InRange);
        assert_eq!(event, None, "no event without an actual change");
    }

    #[test]
    fn transitions_fire_matching_events() {
        let (status, event) = classify(Status::InRange, &conv_for(11.0));
        assert_eq!(status, Status::Over);
        assert_eq!(event, Some(RelationshipEvent::Over));

        let (status, event) = classify(status, &conv_for(-1.0));
        assert_eq!(status, Status::Under);
        assert_eq!(event, Some(RelationshipEvent::Under));

        let (_, event) = classify(status, &conv_for(-2.0));
        assert_eq!(event, None, "under to under is not a transition");
    }

    #[test]
    fn boundary_raw_is_in_range() {
        // raw == max is not over, raw == min is not under
        let (status, _) = classify(Status::None, &conv_for(10.0));
        assert_eq!(status, Status::InRange);
        let (status, _) = classify(Status::None, &conv_for(0.0));
        assert_eq!(status, Status::InRange);
    }
}
