//! Normalization and threshold derivation over a datum.
//!
//! Invariant: exactly one of `over` / `under` / `in_range` is true for
//! every derived converter. Numeric datums get it from the raw-vs-bounds
//! comparison; boolean datums bypass the comparison through the
//! metric-declared [`BoolMapping`].

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::datum::Datum;
use crate::math::{clamp01, map_range};
use crate::status::Status;

/// Metric-declared mapping from a boolean datum to a range state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoolMapping {
    pub on_true: Status,
    pub on_false: Status,
}

impl Default for BoolMapping {
    fn default() -> Self {
        Self { on_true: Status::InRange, on_false: Status::Under }
    }
}

fn range_flags(status: Status) -> (bool, bool, bool) {
    match status {
        Status::Over => (true, false, false),
        Status::Under => (false, true, false),
        Status::InRange => (false, false, true),
        // `None` is not a range state; treat it as under so the
        // exactly-one invariant holds even for a misconfigured mapping.
        Status::None => (false, true, false),
    }
}

/// Derived view of one datum against a [min, max] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Converter {
    /// Numeric projection of the datum.
    pub raw: f64,
    /// Raw mapped into [0, 1], clamped.
    pub normalized: f64,
    pub over: bool,
    pub under: bool,
    pub in_range: bool,
    /// Raw affinely mapped into [-1, 1]. Not clamped; callers who need
    /// clamping apply it explicitly.
    pub as_axis: f64,
}

impl Converter {
    /// Derive the converter for `datum` against `[min, max]`.
    ///
    /// Precondition: `min < max` strictly. The owning relationship's bound
    /// setters enforce it; this function only debug-asserts.
    pub fn derive(datum: &Datum, min: f64, max: f64, mapping: BoolMapping) -> Self {
        debug_assert!(min < max, "converter bounds must satisfy min < max");

        let raw = datum.raw();
        let normalized = clamp01((raw - min) / (max - min));
        let as_axis = map_range(raw, min, max, -1.0, 1.0);

        let (over, under, in_range) = match datum {
            Datum::Bool(b) => range_flags(if *b { mapping.on_true } else { mapping.on_false }),
            _ => {
                let over = raw > max;
                let under = raw < min;
                (over, under, !over && !under)
            }
        };

        #[cfg(feature = "strict_contracts")]
        {
            let set = [over, under, in_range].iter().filter(|f| **f).count();
            assert_eq!(set, 1, "converter range flags must be mutually exclusive");
        }

        Self { raw, normalized, over, under, in_range, as_axis }
    }

    /// Curve-shaped normalized value in [0, 1].
    pub fn to_curve(&self, curve: &Curve) -> f64 {
        curve.sample(self.normalized)
    }

    /// Neutral converter for the pre-configuration snapshot.
    pub fn neutral() -> Self {
        Self::derive(&Datum::ZERO, 0.0, 1.0, BoolMapping::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(conv: &Converter) -> (bool, bool, bool) {
        (conv.over, conv.under, conv.in_range)
    }

    #[test]
    fn numeric_datum_inside_range() {
        let conv = Converter::derive(&Datum::Float(3.0), 0.0, 5.0, BoolMapping::default());
        assert_eq!(conv.raw, 3.0);
        assert!((conv.normalized - 0.6).abs() < 1e-12);
        assert_eq!(flags(&conv), (false, false, true));
        assert!((conv.as_axis - 0.2).abs() < 1e-12);
    }

    #[test]
    fn numeric_datum_over_and_under() {
        let over = Converter::derive(&Datum::Float(6.0), 0.0, 5.0, BoolMapping::default());
        assert_eq!(flags(&over), (true, false, false));
        assert_eq!(over.normalized, 1.0, "normalized clamps");
        assert!(over.as_axis > 1.0, "as_axis does not clamp");

        let under = Converter::derive(&Datum::Float(-2.0), 0.0, 5.0, BoolMapping::default());
        assert_eq!(flags(&under), (false, true, false));
        assert_eq!(under.normalized, 0.0);
        assert!(under.as_axis < -1.0);
    }

    #[test]
    fn bounds_are_inclusive_for_in_range() {
        let at_max = Converter::derive(&Datum::Float(5.0), 0.0, 5.0, BoolMapping::default());
        assert_eq!(flags(&at_max), (false, false, true));
        let at_min = Converter::derive(&Datum::Float(0.0), 0.0, 5.0, BoolMapping::default());
        assert_eq!(flags(&at_min), (false, false, true));
    }

    #[test]
    fn bool_datum_bypasses_the_numeric_comparison() {
        // true -> in range regardless of where raw=1.0 falls in the bounds
        let mapping = BoolMapping { on_true: Status::InRange, on_false: Status::Over };
        let truthy = Converter::derive(&Datum::Bool(true), 100.0, 200.0, mapping);
        assert_eq!(flags(&truthy), (false, false, true));

        let falsy = Converter::derive(&Datum::Bool(false), 100.0, 200.0, mapping);
        assert_eq!(flags(&falsy), (true, false, false));
    }

    #[test]
    fn bool_raw_still_feeds_the_numeric_outputs() {
        let conv = Converter::derive(&Datum::Bool(true), 0.0, 1.0, BoolMapping::default());
        assert_eq!(conv.raw, 1.0);
        assert_eq!(conv.normalized, 1.0);
        assert_eq!(conv.as_axis, 1.0);
    }

    #[test]
    fn misconfigured_none_mapping_degrades_to_under() {
        let mapping = BoolMapping { on_true: Status::InRange, on_false: Status::None };
        let conv = Converter::derive(&Datum::Bool(false), 0.0, 1.0, mapping);
        assert_eq!(flags(&conv), (false, true, false));
    }

    #[test]
    fn to_curve_shapes_normalized() {
        let conv = Converter::derive(&Datum::Float(2.5), 0.0, 5.0, BoolMapping::default());
        assert_eq!(conv.to_curve(&Curve::Linear), 0.5);
        assert_eq!(conv.to_curve(&Curve::EaseIn), 0.25);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: exactly one of over/under/in_range for any
            /// numeric datum and any valid bounds.
            #[test]
            fn prop_flags_mutually_exclusive(
                raw in -1000.0f64..1000.0,
                min in -500.0f64..500.0,
                span in 0.001f64..500.0
            ) {
                let conv = Converter::derive(&Datum::Float(raw), min, min + span, BoolMapping::default());
                let set = [conv.over, conv.under, conv.in_range].iter().filter(|f| **f).count();
                prop_assert_eq!(set, 1);
            }

            /// Property: normalized is always in [0,1]; as_axis is the
            /// exact affine image of raw and unclamped.
            #[test]
            fn prop_normalized_and_axis(
                raw in -1000.0f64..1000.0,
                min in -500.0f64..500.0,
                span in 0.001f64..500.0
            ) {
                let max = min + span;
                let conv = Converter::derive(&Datum::Float(raw), min, max, BoolMapping::default());
                prop_assert!((0.0..=1.0).contains(&conv.normalized));
                let expected_axis = -1.0 + 2.0 * (raw - min) / span;
                prop_assert!((conv.as_axis - expected_axis).abs() < 1e-6);
            }

            /// Property: boolean datums always land on exactly one flag,
            /// whatever the mapping says.
            #[test]
            fn prop_bool_flags_exclusive(b in any::<bool>(), on_false_over in any::<bool>()) {
                let mapping = BoolMapping {
                    on_true: Status::InRange,
                    on_false: if on_false_over { Status::Over } else { Status::Under },
                };
                let conv = Converter::derive(&Datum::Bool(b), 0.0, 1.0, mapping);
                let set = [conv.over, conv.under, conv.in_range].iter().filter(|f| **f).count();
                prop_assert_eq!(set, 1);
            }
        }
    }
}
