//! `arb-input` — driver inputs, triggers and sensor collaborators.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`frame`]    | `InputFrame`, `InputSource`, `ScriptedInputs`               |
//! | [`trigger`]  | `Trigger`, `TriggerInput`                                   |
//! | [`edge`]     | `EdgeDetector`, `Edge`                                      |
//! | [`axis`]     | `Axis` — analog role with deadband/scale/invert             |
//! | [`bindings`] | `ControlBindings` — role → optional trigger/axis            |
//! | [`loader`]   | `load_bindings_csv`, `load_bindings_reader`                 |
//! | [`vision`]   | `VisionSource`, `TargetProfile`, `NoVision`, `FixedVision`  |
//! | [`error`]    | `InputError`, `InputResult<T>`                              |
//!
//! # Sampling model
//!
//! Each control cycle the robot produces one [`InputFrame`].  The scheduler
//! samples every registered [`Trigger`] against that frame exactly once and
//! feeds the boolean into the trigger's [`EdgeDetector`]; rising, falling and
//! level events are derived from consecutive samples only.

pub mod axis;
pub mod bindings;
pub mod edge;
pub mod error;
pub mod frame;
pub mod loader;
pub mod trigger;
pub mod vision;

#[cfg(test)]
mod tests;

pub use axis::Axis;
pub use bindings::ControlBindings;
pub use edge::{Edge, EdgeDetector};
pub use error::{InputError, InputResult};
pub use frame::{InputFrame, InputSource, ScriptedInputs};
pub use loader::{load_bindings_csv, load_bindings_reader};
pub use trigger::{Trigger, TriggerInput};
pub use vision::{FixedVision, NoVision, TargetProfile, VisionSource};

/// Name-keyed map used for frames and binding tables.
#[cfg(feature = "fx-hash")]
pub(crate) type NameMap<V> = rustc_hash::FxHashMap<String, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type NameMap<V> = std::collections::HashMap<String, V>;
