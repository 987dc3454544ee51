//! Fluent builder for constructing a `ResourceTable`.
//!
//! # Usage
//!
//! ```rust
//! use arb_resource::{ResourceTableBuilder, SimulatedActuator};
//!
//! let mut builder = ResourceTableBuilder::new();
//! let wrist = builder.add("wrist", SimulatedActuator::new()).unwrap();
//! let table = builder.build();
//!
//! assert_eq!(table.count, 1);
//! assert_eq!(table.name(wrist), "wrist");
//! ```

use arb_core::ResourceId;

use crate::{Actuator, MAX_RESOURCES, ResourceError, ResourceResult, ResourceTable};

/// Collects named actuators and hands out their `ResourceId`s.
///
/// Ids are dense and assigned in registration order, so the first resource
/// added is `ResourceId(0)`.
#[derive(Default)]
pub struct ResourceTableBuilder {
    names:     Vec<String>,
    actuators: Vec<Box<dyn Actuator>>,
}

impl ResourceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actuator under `name`.
    ///
    /// Fails on a duplicate name or once [`MAX_RESOURCES`] are registered.
    pub fn add<A: Actuator + 'static>(&mut self, name: &str, actuator: A) -> ResourceResult<ResourceId> {
        self.add_boxed(name, Box::new(actuator))
    }

    pub fn add_boxed(&mut self, name: &str, actuator: Box<dyn Actuator>) -> ResourceResult<ResourceId> {
        if self.names.iter().any(|n| n == name) {
            return Err(ResourceError::DuplicateName(name.to_owned()));
        }
        if self.names.len() >= MAX_RESOURCES {
            return Err(ResourceError::Capacity { max: MAX_RESOURCES });
        }
        let id = ResourceId(self.names.len() as u16);
        self.names.push(name.to_owned());
        self.actuators.push(actuator);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn build(self) -> ResourceTable {
        ResourceTable::new(self.names, self.actuators)
    }
}
