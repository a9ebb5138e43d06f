//! Relationship cache controller.
//!
//! Owns the structural snapshot and its two invalidation tiers: full
//! rebuild on configuration change, dynamic refresh on every read. All
//! structural mutation funnels through the setters here, and every setter
//! ends in `invalidate()` — there is no mutation path that can leave a
//! stale snapshot behind.

use uuid::Uuid;

use crate::converter::Converter;
use crate::curve::{lookup_curve, Curve};
use crate::datum::Datum;
use crate::directory::{MemberRef, SceneDirectory};
use crate::error::{RelationError, Result};
use crate::family::{Family, MetricSelection};
use crate::math::BOUNDS_EPSILON;
use crate::relation::Relation;
use crate::settings::{reset_for_new_selection, MetricSettings};
use crate::snapshot::{MemberInfo, RelationshipInfo, RelationshipPatch};
use crate::status::{classify, RelationshipEvent, Status};

/// One tracked relationship: configuration, cache, and event queue.
#[derive(Debug)]
pub struct Relationship {
    id: Uuid,
    description: String,
    selection: MetricSelection,
    members: Vec<MemberRef>,
    proxy_ref: Option<MemberRef>,
    settings: MetricSettings,
    min: f64,
    max: f64,
    curve: Curve,

    /// Structural cache. `None` marks it invalid; the next read rebuilds.
    info: Option<RelationshipInfo>,
    /// Last recorded status, the hysteresis input.
    last_status: Status,
    /// Last computed datum, for edge-triggered `DatumUpdated`.
    last_datum: Option<Datum>,
    /// Last-observed selection, the settings-policy change detector.
    last_selection: MetricSelection,
    events: Vec<RelationshipEvent>,
}

impl Relationship {
    pub fn new(description: impl Into<String>) -> Self {
        let selection = MetricSelection::default();
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            selection,
            members: Vec::new(),
            proxy_ref: None,
            settings: MetricSettings::default(),
            min: 0.0,
            max: 1.0,
            curve: Curve::default(),
            info: None,
            last_status: Status::None,
            last_datum: None,
            last_selection: selection,
            events: Vec::new(),
        }
    }

    pub fn with_selection(mut self, selection: MetricSelection) -> Self {
        self.set_metric(selection);
        self
    }

    pub fn with_members(mut self, members: Vec<MemberRef>) -> Self {
        self.set_members(members);
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.set_bounds(min, max);
        self
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.set_curve(curve);
        self
    }

    pub fn with_settings(mut self, settings: MetricSettings) -> Self {
        self.set_settings(settings);
        self
    }

    // ========== Accessors ==========

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn family(&self) -> Family {
        self.selection.family()
    }

    pub fn selection(&self) -> MetricSelection {
        self.selection
    }

    pub fn settings(&self) -> &MetricSettings {
        &self.settings
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn status(&self) -> Status {
        self.last_status
    }

    // ========== Structural mutation ==========

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.invalidate();
    }

    /// Switch family, selecting the new family's default metric. The old
    /// family's metric storage does not survive: the selection sum type
    /// carries exactly one family's slot.
    pub fn set_family(&mut self, family: Family) {
        if self.selection.family() != family {
            self.set_metric(MetricSelection::default_for(family));
        }
    }

    /// Replace the active (family, metric) selection.
    ///
    /// On a genuine selection change the settings policy runs exactly
    /// once: all fields reset to defaults, only the proxy carries over.
    pub fn set_metric(&mut self, selection: MetricSelection) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        if selection != self.last_selection {
            self.settings = reset_for_new_selection(&self.settings);
            self.last_selection = selection;
        }
        self.invalidate();
    }

    /// Set the lower bound. If the write would leave `min >= max`, the max
    /// bound (the one NOT being set) is pushed up by epsilon.
    pub fn set_min(&mut self, min: f64) {
        self.min = min;
        if self.max <= self.min {
            self.max = self.min + BOUNDS_EPSILON;
        }
        self.invalidate();
    }

    /// Set the upper bound. If the write would leave `min >= max`, the min
    /// bound (the one NOT being set) is pushed down by epsilon.
    pub fn set_max(&mut self, max: f64) {
        self.max = max;
        if self.min >= self.max {
            self.min = self.max - BOUNDS_EPSILON;
        }
        self.invalidate();
    }

    pub fn set_bounds(&mut self, min: f64, max: f64) {
        self.set_min(min);
        self.set_max(max);
    }

    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
        self.invalidate();
    }

    pub fn set_settings(&mut self, settings: MetricSettings) {
        self.settings = settings;
        self.invalidate();
    }

    /// Replace the member list. Order is role order; index 0 is leader.
    pub fn set_members(&mut self, members: Vec<MemberRef>) {
        self.members = members;
        self.invalidate();
    }

    /// Resolve and bind member names plus the settings proxy through the
    /// directory, in one step.
    pub fn bind(&mut self, directory: &SceneDirectory, names: &[impl AsRef<str>]) {
        self.members = directory.resolve_many(names);
        self.rebind_proxy(directory);
        self.invalidate();
    }

    /// Re-resolve the auxiliary proxy named in settings.
    pub fn rebind_proxy(&mut self, directory: &SceneDirectory) {
        self.proxy_ref = self.settings.proxy.as_deref().map(|name| {
            directory.resolve(name).unwrap_or_else(|| {
                log::warn!("relationship: proxy entity '{}' not in directory", name);
                MemberRef::detached(name)
            })
        });
    }

    /// Bulk-write from an externally supplied patch, then invalidate.
    ///
    /// Trust boundary: the whole patch is validated before any field is
    /// written. A metric outside the target family's closed set rejects
    /// the patch with `MetricFamilyMismatch`, leaving the relationship
    /// untouched.
    pub fn apply(&mut self, patch: &RelationshipPatch, directory: &SceneDirectory) -> Result<()> {
        let target_family = patch.family.unwrap_or_else(|| self.selection.family());
        let new_selection = match patch.metric {
            Some(selection) => {
                if selection.family() != target_family {
                    return Err(RelationError::MetricFamilyMismatch {
                        family: target_family,
                        metric: selection.metric_name().to_string(),
                    });
                }
                Some(selection)
            }
            None if target_family != self.selection.family() => {
                Some(MetricSelection::default_for(target_family))
            }
            None => None,
        };

        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(selection) = new_selection {
            // runs the settings policy on genuine change
            self.set_metric(selection);
        }
        // explicit settings override lands after the policy reset
        if let Some(settings) = &patch.settings {
            self.settings = settings.clone();
        }
        if let Some(min) = patch.min {
            self.set_min(min);
        }
        if let Some(max) = patch.max {
            self.set_max(max);
        }
        if let Some(curve) = &patch.curve {
            self.curve = curve.clone();
        }
        if let Some(names) = &patch.members {
            self.members = directory.resolve_many(names);
        }
        self.rebind_proxy(directory);
        self.invalidate();
        Ok(())
    }

    /// Pre-flight configuration check.
    ///
    /// Evaluation itself never fails — degraded members yield neutral
    /// output — but hosts that prefer to surface misconfiguration early
    /// can call this after binding. Reports the first problem found:
    /// member count vs family arity, an unresolvable member, or a named
    /// curve missing from the library.
    pub fn validate(&self) -> Result<()> {
        let family = self.selection.family();
        if let Some(expected) = family.required_members() {
            if self.members.len() != expected {
                return Err(RelationError::ArityMismatch {
                    family,
                    expected,
                    found: self.members.len(),
                });
            }
        }
        if let Some(member) = self.members.iter().find(|m| !m.is_valid()) {
            return Err(RelationError::UnknownEntity(member.name().to_string()));
        }
        if let Curve::Named(name) = &self.curve {
            if lookup_curve(name).is_none() {
                return Err(RelationError::UnknownCurve(name.clone()));
            }
        }
        Ok(())
    }

    // ========== Cache ==========

    /// Mark the structural cache stale. Idempotent, O(1).
    pub fn invalidate(&mut self) {
        self.info = None;
    }

    /// Ensure structural validity, recompute the dynamic tier, run the
    /// status classifier, queue edge-triggered events, and return the
    /// snapshot.
    ///
    /// Reading before any meaningful configuration exists is defined: the
    /// snapshot is neutral, never undefined.
    pub fn read(&mut self) -> &RelationshipInfo {
        let mut info = match self.info.take() {
            Some(info) => info,
            None => self.build_structural(),
        };

        let relation =
            Relation::new(self.selection, &self.members, &self.settings, self.proxy_ref.as_ref());
        let datum = relation.evaluate();
        let mapping = self.selection.bool_mapping(&self.settings);
        let converter = Converter::derive(&datum, self.min, self.max, mapping);
        let (status, status_event) = classify(self.last_status, &converter);

        let datum_changed = self.last_datum != Some(datum);
        if datum_changed {
            self.events.push(RelationshipEvent::DatumUpdated(datum));
        }
        let status_changed = status_event.is_some();
        if let Some(event) = status_event {
            self.events.push(event);
        }
        if datum_changed || status_changed {
            self.events.push(RelationshipEvent::Updated);
        }

        self.last_datum = Some(datum);
        self.last_status = status;

        info.datum = datum;
        info.converter = converter;
        info.curved = converter.to_curve(&self.curve);
        info.status = status;
        for (index, entry) in info.members.iter_mut().enumerate() {
            if let Some(member) = self.members.get(index) {
                entry.resolved = member.is_valid();
            }
        }

        self.info.insert(info)
    }

    /// Drain queued events. Edge-triggered: a read that changed nothing
    /// queued nothing.
    pub fn take_events(&mut self) -> Vec<RelationshipEvent> {
        std::mem::take(&mut self.events)
    }

    /// Full structural rebuild from current configuration.
    fn build_structural(&mut self) -> RelationshipInfo {
        // The setters maintain the bounds invariant; correct it here as
        // well so direct construction paths cannot poison the converter.
        if self.min >= self.max {
            self.max = self.min + BOUNDS_EPSILON;
        }
        let family = self.selection.family();
        let members = self
            .members
            .iter()
            .enumerate()
            .map(|(index, member)| MemberInfo {
                role: family.role_name(index),
                name: member.name().to_string(),
                resolved: member.is_valid(),
            })
            .collect();

        RelationshipInfo {
            id: self.id,
            description: self.description.clone(),
            family,
            metric: self.selection,
            settings: self.settings.clone(),
            min: self.min,
            max: self.max,
            curve: self.curve.clone(),
            members,
            datum: Datum::ZERO,
            converter: Converter::neutral(),
            curved: 0.0,
            status: self.last_status,
        }
    }
}
