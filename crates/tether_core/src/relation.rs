//! Relation resolver: (family, metric, members, settings) -> datum.
//!
//! A `Relation` is an ephemeral, immutable computation request created
//! fresh on each evaluation. It owns nothing beyond borrowed references;
//! live spatial state is pulled through the member handles at call time.
//!
//! Error/edge policy: arity mismatch and unresolved members are not
//! errors. Every routine degrades to a defined neutral datum (zero vector,
//! identity rotation, false) and leaves a `log::warn!` for observability;
//! evaluation never halts. Role assignment is positional — index 0 is
//! always the leader — and every multi-member routine relies on it.
//!
//! Settings consumption per routine:
//!
//! | Metric                     | Settings fields used                     |
//! |----------------------------|------------------------------------------|
//! | single/position            | reference_point, proxy, distance_unit    |
//! | single/movement            | distance_unit                            |
//! | single/rotation            | (none)                                   |
//! | single/trigger             | reference_point, proxy, distance_unit, threshold |
//! | couple/distance            | distance_unit                            |
//! | couple/angle               | axis, use_local_axis                     |
//! | couple/rotation_around_axis| axis, use_local_axis                     |
//! | throuple/angle             | (none)                                   |
//! | throuple/density           | distance_unit                            |
//! | group/density, group/size  | distance_unit                            |
//! | group/trigger              | distance_unit, threshold                 |

use nalgebra::{UnitQuaternion, Vector3};

use crate::datum::Datum;
use crate::debug_flags;
use crate::directory::{MemberRef, Transform};
use crate::family::{CoupleMetric, GroupMetric, MetricSelection, SingleMetric, ThroupleMetric};
use crate::settings::MetricSettings;

/// Immutable computation request.
#[derive(Debug, Clone, Copy)]
pub struct Relation<'a> {
    selection: MetricSelection,
    members: &'a [MemberRef],
    settings: &'a MetricSettings,
    /// Bound auxiliary proxy, if `settings.proxy` resolved at bind time.
    proxy: Option<&'a MemberRef>,
}

impl<'a> Relation<'a> {
    pub fn new(
        selection: MetricSelection,
        members: &'a [MemberRef],
        settings: &'a MetricSettings,
        proxy: Option<&'a MemberRef>,
    ) -> Self {
        Self { selection, members, settings, proxy }
    }

    /// Compute the datum for this request from current spatial state.
    pub fn evaluate(&self) -> Datum {
        let family = self.selection.family();
        if let Some(required) = family.required_members() {
            if self.members.len() != required {
                log::warn!(
                    "relation: family {} requires {} members, found {}; yielding neutral datum",
                    family,
                    required,
                    self.members.len()
                );
                return self.neutral();
            }
        }

        let datum = match self.selection {
            MetricSelection::Single(metric) => self.evaluate_single(metric),
            MetricSelection::Couple(metric) => self.evaluate_couple(metric),
            MetricSelection::Throuple(metric) => self.evaluate_throuple(metric),
            MetricSelection::Group(metric) => self.evaluate_group(metric),
        };

        if debug_flags::eval_debug_enabled() {
            log::debug!(
                "relation: {}/{} -> {:?}",
                family,
                self.selection.metric_name(),
                datum
            );
        }
        datum
    }

    /// Defined fallback when members are missing or unresolved, matching
    /// the datum kind the metric would otherwise produce.
    pub fn neutral(&self) -> Datum {
        match self.selection {
            MetricSelection::Single(SingleMetric::Position) => Datum::Vector(Vector3::zeros()),
            MetricSelection::Single(SingleMetric::Rotation) => {
                Datum::Rotation(UnitQuaternion::identity())
            }
            MetricSelection::Single(SingleMetric::Trigger)
            | MetricSelection::Group(GroupMetric::Trigger) => Datum::Bool(false),
            _ => Datum::ZERO,
        }
    }

    fn transform(&self, index: usize) -> Option<Transform> {
        let member = self.members.get(index)?;
        match member.try_resolve() {
            Some(handle) => Some(*handle.borrow()),
            None => {
                log::warn!(
                    "relation: member '{}' did not resolve, degrading to neutral",
                    member.name()
                );
                None
            }
        }
    }

    /// Positions of the members that currently resolve, in role order.
    fn resolved_positions(&self) -> Vec<Vector3<f64>> {
        self.members
            .iter()
            .filter_map(|m| m.try_resolve().map(|h| h.borrow().position))
            .collect()
    }

    /// Reference point: the bound proxy's live position when available,
    /// otherwise the configured point.
    fn reference_point(&self) -> Vector3<f64> {
        if let Some(proxy) = self.proxy {
            if let Some(handle) = proxy.try_resolve() {
                return handle.borrow().position;
            }
            log::warn!(
                "relation: proxy '{}' did not resolve, using configured reference point",
                proxy.name()
            );
        }
        self.settings.reference_point
    }

    #[inline]
    fn scale(&self) -> f64 {
        self.settings.distance_unit.scale()
    }

    /// Selected axis, rotated into `frame`'s local space when configured.
    fn oriented_axis(&self, frame: &Transform) -> Vector3<f64> {
        if self.settings.use_local_axis {
            frame.rotation * self.settings.axis.unit()
        } else {
            self.settings.axis.unit()
        }
    }

    fn evaluate_single(&self, metric: SingleMetric) -> Datum {
        let Some(subject) = self.transform(0) else {
            return self.neutral();
        };
        match metric {
            SingleMetric::Position => {
                Datum::Vector((subject.position - self.reference_point()) * self.scale())
            }
            SingleMetric::Movement => Datum::Float(subject.velocity.norm() * self.scale()),
            SingleMetric::Rotation => Datum::Rotation(subject.rotation),
            SingleMetric::Trigger => {
                let offset = (subject.position - self.reference_point()).norm() * self.scale();
                Datum::Bool(offset <= self.settings.threshold)
            }
        }
    }

    fn evaluate_couple(&self, metric: CoupleMetric) -> Datum {
        let (Some(leader), Some(follower)) = (self.transform(0), self.transform(1)) else {
            return self.neutral();
        };
        match metric {
            CoupleMetric::Distance => {
                Datum::Float((follower.position - leader.position).norm() * self.scale())
            }
            CoupleMetric::Angle => {
                let facing = self.oriented_axis(&leader);
                let toward = follower.position - leader.position;
                Datum::Float(crate::math::angle_between_deg(&facing, &toward))
            }
            CoupleMetric::RotationAroundAxis => {
                let (u, v) = self.settings.axis.plane_basis();
                let (u, v) = if self.settings.use_local_axis {
                    (leader.rotation * u, leader.rotation * v)
                } else {
                    (u, v)
                };
                let offset = follower.position - leader.position;
                let (x, y) = (offset.dot(&u), offset.dot(&v));
                if x.abs() <= f64::EPSILON && y.abs() <= f64::EPSILON {
                    // follower sits on the axis: azimuth undefined, neutral
                    Datum::ZERO
                } else {
                    Datum::Float(y.atan2(x).to_degrees())
                }
            }
        }
    }

    fn evaluate_throuple(&self, metric: ThroupleMetric) -> Datum {
        let (Some(leader), Some(second), Some(third)) =
            (self.transform(0), self.transform(1), self.transform(2))
        else {
            return self.neutral();
        };
        match metric {
            ThroupleMetric::Angle => {
                let a = second.position - leader.position;
                let b = third.position - leader.position;
                Datum::Float(crate::math::angle_between_deg(&a, &b))
            }
            ThroupleMetric::Density => {
                let d01 = (second.position - leader.position).norm();
                let d02 = (third.position - leader.position).norm();
                let d12 = (third.position - second.position).norm();
                Datum::Float((d01 + d02 + d12) / 3.0 * self.scale())
            }
        }
    }

    fn evaluate_group(&self, metric: GroupMetric) -> Datum {
        let positions = self.resolved_positions();
        if positions.is_empty() {
            log::warn!("relation: group has no resolvable members, yielding neutral datum");
            return self.neutral();
        }
        let centroid =
            positions.iter().fold(Vector3::zeros(), |acc, p| acc + p) / positions.len() as f64;

        match metric {
            GroupMetric::Density => {
                let mean = positions.iter().map(|p| (p - centroid).norm()).sum::<f64>()
                    / positions.len() as f64;
                Datum::Float(mean * self.scale())
            }
            GroupMetric::Size => {
                let radius = positions
                    .iter()
                    .map(|p| (p - centroid).norm())
                    .fold(0.0f64, f64::max);
                Datum::Float(radius * self.scale())
            }
            GroupMetric::Trigger => {
                let threshold = self.settings.threshold;
                let scale = self.scale();
                let all_inside =
                    positions.iter().all(|p| (p - centroid).norm() * scale <= threshold);
                Datum::Bool(all_inside)
            }
        }
    }
}
