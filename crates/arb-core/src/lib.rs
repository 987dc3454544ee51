//! `arb-core` — foundational types for the `arbiter` behavior scheduler.
//!
//! This crate is a dependency of every other `arb-*` crate.  It intentionally
//! has no `arb-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                               |
//! |------------|--------------------------------------------------------|
//! | [`ids`]    | `ResourceId`, `BehaviorId`                             |
//! | [`time`]   | `Cycle`, `CycleClock`, `SchedulerConfig`               |
//! | [`mode`]   | `GamePiece` — the shared mode state                    |
//! | [`pose`]   | `Pose2d`, `TargetOffset`                               |
//! | [`error`]  | `ArbError`, `ArbResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod mode;
pub mod pose;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{ArbError, ArbResult};
pub use ids::{BehaviorId, ResourceId};
pub use mode::GamePiece;
pub use pose::{Pose2d, TargetOffset};
pub use time::{Cycle, CycleClock, SchedulerConfig};
