//! `arb-resource` — exclusive actuator resources for the `arbiter` scheduler.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`actuator`]  | `Actuator` trait, `ActuatorCommand`, `StateSnapshot`       |
//! | [`set`]       | `ResourceSet` — 64-bit requirement set                     |
//! | [`table`]     | `ResourceTable` (SoA: name, occupant, actuator)            |
//! | [`builder`]   | `ResourceTableBuilder` (fluent construction)               |
//! | [`outputs`]   | `Outputs` — the write view handed to a running behavior    |
//! | [`sim`]       | `SimulatedActuator` — recording stand-in for hardware      |
//! | [`error`]     | `ResourceError`, `ResourceResult<T>`                       |
//!
//! # Binding model
//!
//! Behaviors never hold references to actuators.  They declare a
//! [`ResourceSet`] of ids; the table records which behavior instance
//! currently owns each id, and the scheduler hands the running behavior an
//! [`Outputs`] view that refuses writes outside its declared set.  Mutual
//! exclusion is therefore a property of the binding table, not of locks.

pub mod actuator;
pub mod builder;
pub mod error;
pub mod outputs;
pub mod set;
pub mod sim;
pub mod table;


pub use actuator::{Actuator, ActuatorCommand, StateSnapshot};
pub use builder::ResourceTableBuilder;
pub use error::{ResourceError, ResourceResult};
pub use outputs::Outputs;
pub use set::{MAX_RESOURCES, ResourceSet};
pub use sim::{SimHandle, SimulatedActuator};
pub use table::ResourceTable;
