//! `arb-behavior` — behavior lifecycle, composition combinators and requests.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`action`]    | `Action` trait — primitive logic supplied by robot code        |
//! | [`fn_action`] | `FnAction` — an action built from closures                     |
//! | [`behavior`]  | `Behavior`, `Lifecycle`, the combinator tree and its interpreter |
//! | [`context`]   | `BehaviorContext<'a>` — read-only cycle snapshot               |
//! | [`request`]   | `Request`, `Effects` — what a behavior may do                  |
//! | [`noop`]      | `Neutral`, `Hold`                                              |
//! | [`probe`]     | `Probe` — recording action for tests                           |
//! | [`error`]     | `BehaviorError`, `BehaviorResult<T>`                           |
//!
//! # Design notes
//!
//! Behaviors never touch the scheduler directly.  Each call receives:
//!
//! 1. a read-only [`BehaviorContext`] (cycle, mode, inputs, vision, sensors);
//! 2. an [`Effects`] handle that can command only the resources the
//!    behavior holds and can queue [`Request`]s.
//!
//! The scheduler applies queued requests after the call returns, so a
//! behavior's view of the world is stable for the whole call.
//!
//! Composition is a closed tree of nodes (primitive, sequence,
//! parallel-until, conditional-select, start-end, timeout, then-schedule)
//! walked by one interpreter in [`behavior`].  The scheduler only ever sees
//! the root's `resolve`, `initialize`, `step` and `end`.

pub mod action;
pub mod behavior;
pub mod context;
pub mod error;
pub mod fn_action;
pub mod noop;
pub mod probe;
pub mod request;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use behavior::{factory, Behavior, BehaviorFactory, Lifecycle, Predicate};
pub use context::BehaviorContext;
pub use error::{BehaviorError, BehaviorResult};
pub use fn_action::FnAction;
pub use noop::{Hold, Neutral};
pub use probe::{Probe, ProbeAction, ProbeEvent};
pub use request::{Effects, Request};
