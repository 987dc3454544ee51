//! `ResourceTable` — the owning table of resources and their bindings.

use arb_core::{BehaviorId, ResourceId};

use crate::{Actuator, ResourceError, ResourceResult, ResourceSet, StateSnapshot};

/// Structure-of-Arrays storage for every resource on the robot.
///
/// Every `Vec` field has exactly `count` elements; the `ResourceId` value is
/// the index into all of them.  The `occupants` column is the binding table:
/// it holds the explicitly scheduled behavior instance that currently owns
/// each resource, or `None` when the resource is free and its default
/// behavior may run.
///
/// Create via [`ResourceTableBuilder`][crate::ResourceTableBuilder].
pub struct ResourceTable {
    /// Number of resources.  Equals the length of every SoA `Vec`.
    pub count: usize,

    names:     Vec<String>,
    occupants: Vec<Option<BehaviorId>>,
    actuators: Vec<Box<dyn Actuator>>,
}

impl ResourceTable {
    pub(crate) fn new(names: Vec<String>, actuators: Vec<Box<dyn Actuator>>) -> Self {
        debug_assert_eq!(names.len(), actuators.len());
        let count = names.len();
        Self {
            count,
            names,
            occupants: vec![None; count],
            actuators,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `ResourceId`s in ascending index order.
    pub fn ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        (0..self.count as u16).map(ResourceId)
    }

    /// The set of every resource in the table.
    pub fn all(&self) -> ResourceSet {
        self.ids().collect()
    }

    #[inline]
    pub fn contains(&self, id: ResourceId) -> bool {
        id.index() < self.count
    }

    /// `true` if every member of `set` exists in this table.
    pub fn contains_all(&self, set: ResourceSet) -> bool {
        set.iter().all(|id| self.contains(id))
    }

    /// Display name of `id`, or `"?"` for an id from another table.
    pub fn name(&self, id: ResourceId) -> &str {
        self.names.get(id.index()).map(String::as_str).unwrap_or("?")
    }

    /// Look a resource up by name.
    pub fn find(&self, name: &str) -> Option<ResourceId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| ResourceId(i as u16))
    }

    // ── Binding table ─────────────────────────────────────────────────────

    /// The explicit behavior currently bound to `id`.
    #[inline]
    pub fn occupant(&self, id: ResourceId) -> Option<BehaviorId> {
        self.occupants.get(id.index()).copied().flatten()
    }

    /// Bind `behavior` to `id`, returning the previous occupant.
    ///
    /// The scheduler ends the previous occupant *before* calling this; the
    /// return value exists so it can assert that it did.
    pub fn bind(&mut self, id: ResourceId, behavior: BehaviorId) -> ResourceResult<Option<BehaviorId>> {
        let slot = self
            .occupants
            .get_mut(id.index())
            .ok_or(ResourceError::Unknown(id))?;
        Ok(slot.replace(behavior))
    }

    /// Release `id` only if it is still bound to `behavior`.
    ///
    /// Returns `true` if the binding was cleared.
    pub fn release(&mut self, id: ResourceId, behavior: BehaviorId) -> bool {
        match self.occupants.get_mut(id.index()) {
            Some(slot) if *slot == Some(behavior) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Distinct behaviors bound to any member of `set`, in resource order.
    pub fn occupants_of(&self, set: ResourceSet) -> Vec<BehaviorId> {
        let mut found: Vec<BehaviorId> = Vec::new();
        for id in set.iter() {
            if let Some(b) = self.occupant(id) {
                if !found.contains(&b) {
                    found.push(b);
                }
            }
        }
        found
    }

    /// Resources with no explicit occupant, in ascending id order.
    pub fn unclaimed(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.ids().filter(|&id| self.occupant(id).is_none())
    }

    // ── Actuator access ───────────────────────────────────────────────────

    /// Latest observed state of `id`.
    pub fn observed(&self, id: ResourceId) -> ResourceResult<StateSnapshot> {
        self.actuators
            .get(id.index())
            .map(|a| a.observed_state())
            .ok_or(ResourceError::Unknown(id))
    }

    /// Mutable actuator handle.  Crate-private: outside this crate, writes go
    /// through [`Outputs`][crate::Outputs] or [`ResourceTable::stop`].
    pub(crate) fn actuator_mut(&mut self, id: ResourceId) -> ResourceResult<&mut dyn Actuator> {
        match self.actuators.get_mut(id.index()) {
            Some(a) => Ok(a.as_mut()),
            None => Err(ResourceError::Unknown(id)),
        }
    }

    /// Command `id` to stop.  Used by the scheduler for safe-state fallbacks
    /// (disabled robot, faulted default) when no behavior may drive it.
    pub fn stop(&mut self, id: ResourceId) -> ResourceResult<()> {
        self.actuator_mut(id)?.stop();
        Ok(())
    }
}
