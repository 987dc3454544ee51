//! `Outputs` — the only path from a behavior to an actuator.

use arb_core::ResourceId;

use crate::{ActuatorCommand, ResourceError, ResourceResult, ResourceSet, ResourceTable, StateSnapshot};

/// Write view over the resource table, scoped to one behavior's
/// requirement set.
///
/// The scheduler builds a fresh `Outputs` for every call into a behavior.
/// Commands to resources outside `held` are refused with
/// [`ResourceError::NotHeld`]; reads are allowed for any resource because
/// observing a mechanism never conflicts with driving it.
pub struct Outputs<'a> {
    table: &'a mut ResourceTable,
    held:  ResourceSet,
    owner: &'a str,
}

impl<'a> Outputs<'a> {
    pub fn new(table: &'a mut ResourceTable, held: ResourceSet, owner: &'a str) -> Self {
        Self { table, held, owner }
    }

    /// The requirement set this view may write to.
    #[inline]
    pub fn held(&self) -> ResourceSet {
        self.held
    }

    /// Name of the behavior this view was built for.
    pub fn owner(&self) -> &str {
        self.owner
    }

    pub fn apply(&mut self, id: ResourceId, command: ActuatorCommand) -> ResourceResult<()> {
        self.check(id)?;
        self.table.actuator_mut(id)?.apply_output(command);
        Ok(())
    }

    pub fn stop(&mut self, id: ResourceId) -> ResourceResult<()> {
        self.check(id)?;
        self.table.actuator_mut(id)?.stop();
        Ok(())
    }

    /// Stop every held resource.
    pub fn stop_all(&mut self) -> ResourceResult<()> {
        for id in self.held.iter() {
            self.table.actuator_mut(id)?.stop();
        }
        Ok(())
    }

    pub fn observed(&self, id: ResourceId) -> ResourceResult<StateSnapshot> {
        self.table.observed(id)
    }

    pub fn resource_name(&self, id: ResourceId) -> &str {
        self.table.name(id)
    }

    fn check(&self, id: ResourceId) -> ResourceResult<()> {
        if !self.table.contains(id) {
            return Err(ResourceError::Unknown(id));
        }
        if !self.held.contains(id) {
            log::warn!(
                "{} tried to command {} without holding it",
                self.owner,
                self.table.name(id)
            );
            return Err(ResourceError::NotHeld {
                behavior: self.owner.to_owned(),
                resource: self.table.name(id).to_owned(),
            });
        }
        Ok(())
    }
}
