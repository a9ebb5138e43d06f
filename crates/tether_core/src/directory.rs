//! In-memory directory service owning the live spatial state of tracked
//! entities.
//!
//! The evaluation core never owns transforms: it holds `MemberRef` handles
//! that resolve weakly into this directory at read time. Unregistering an
//! entity invalidates every outstanding handle without notifying anyone;
//! readers observe the dropout as an unresolved member and fall back to
//! neutral output.
//!
//! Single-threaded by design (`Rc`/`Weak`, no locks). If this core is ever
//! hosted behind an engine binding, the whole directory plus its
//! relationships must sit behind one mutual-exclusion boundary.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use nalgebra::{UnitQuaternion, Vector3};

/// Live spatial state of one tracked entity.
///
/// Read-only from the evaluation core's perspective; only the directory
/// owner (engine glue, test driver) mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    /// World-space velocity in meters per second.
    pub velocity: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
        }
    }

    pub fn at(position: Vector3<f64>) -> Self {
        Self { position, ..Self::identity() }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Shared ownership handle to a live transform.
pub type LiveHandle = Rc<RefCell<Transform>>;

/// Stable handle to one tracked entity inside a relationship.
///
/// Carries the display name plus a weak reference into the directory.
/// Validity is dynamic: `is_valid()` reports whether the entity is still
/// registered at this instant.
#[derive(Debug, Clone)]
pub struct MemberRef {
    name: String,
    handle: Weak<RefCell<Transform>>,
}

impl MemberRef {
    /// Handle that never resolves. Used for names the directory did not
    /// know at bind time; evaluation treats it as an unresolved member.
    pub fn detached(name: impl Into<String>) -> Self {
        Self { name: name.into(), handle: Weak::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upgrade to the live transform if the entity is still registered.
    pub fn try_resolve(&self) -> Option<LiveHandle> {
        self.handle.upgrade()
    }

    pub fn is_valid(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

/// Name-keyed registry of tracked entities.
#[derive(Debug, Default)]
pub struct SceneDirectory {
    entities: HashMap<String, LiveHandle>,
}

impl SceneDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an entity. Replacement drops the old handle,
    /// so stale `MemberRef`s to the previous registration stop resolving.
    pub fn register(&mut self, name: impl Into<String>, transform: Transform) -> LiveHandle {
        let handle = Rc::new(RefCell::new(transform));
        self.entities.insert(name.into(), Rc::clone(&handle));
        handle
    }

    /// Remove an entity. Outstanding `MemberRef`s become unresolved.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.entities.remove(name).is_some()
    }

    /// Name -> stable handle. `None` when the entity is not registered.
    pub fn resolve(&self, name: &str) -> Option<MemberRef> {
        self.entities.get(name).map(|handle| MemberRef {
            name: name.to_string(),
            handle: Rc::downgrade(handle),
        })
    }

    /// Resolve a name list in order, keeping position for role assignment.
    ///
    /// Unknown names yield detached handles rather than dropping out of the
    /// list; the caller sees them as unresolved members.
    pub fn resolve_many(&self, names: &[impl AsRef<str>]) -> Vec<MemberRef> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.resolve(name).unwrap_or_else(|| {
                    log::warn!("directory: unknown entity '{}', binding detached handle", name);
                    MemberRef::detached(name)
                })
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&LiveHandle> {
        self.entities.get(name)
    }

    pub fn set_position(&self, name: &str, position: Vector3<f64>) {
        if let Some(handle) = self.entities.get(name) {
            handle.borrow_mut().position = position;
        }
    }

    pub fn set_rotation(&self, name: &str, rotation: UnitQuaternion<f64>) {
        if let Some(handle) = self.entities.get(name) {
            handle.borrow_mut().rotation = rotation;
        }
    }

    pub fn set_velocity(&self, name: &str, velocity: Vector3<f64>) {
        if let Some(handle) = self.entities.get(name) {
            handle.borrow_mut().velocity = velocity;
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
