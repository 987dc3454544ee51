//! `arb-sched` — fixed-rate scheduler for the arbiter behavior core.
//!
//! # Control cycle
//!
//! ```text
//! every config.period_ms:
//!   ① Sample    — read every actuator once, sample every trigger once,
//!                 derive edges.  Apply schedules deferred from last cycle
//!                 and commands queued through the public API.
//!   ② One-shot  — on_true / on_false actions, in binding order.
//!   ③ Level     — while_true / while_false: schedule on start edge,
//!                 cancel on stop edge.
//!   ④ Step      — each running explicit behavior, in start order:
//!                   finished  → end(false), release resources
//!                   Err       → end(true), release resources, on_fault
//!   ⑤ Defaults  — each unclaimed resource steps its default
//!                 (created lazily, re-created after it finishes).
//! ```
//!
//! Every schedule, from any source, runs the same arbitration: occupants of
//! the required resources are ended first (`interrupted = true`), then the
//! new behavior is bound and initialized.  Requests a behavior queues
//! (`set_mode`, `schedule`, `cancel_all`) are applied right after the call
//! that queued them, in order.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use arb_behavior::factory;
//! use arb_sched::{NoopObserver, SchedulerBuilder};
//!
//! let mut builder = SchedulerBuilder::new(config, table);
//! builder.set_default(wrist, factory(move || park_wrist(wrist)));
//! builder
//!     .bind(controls.trigger("intake"))
//!     .while_true(factory(move || intake(elevator, wrist, shooter)));
//! let mut scheduler = builder.build()?;
//! scheduler.run(&mut inputs, &mut NoopObserver)?;
//! ```

pub mod binding;
pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;


pub use binding::{Binder, Control, ControlFn};
pub use builder::SchedulerBuilder;
pub use error::{SchedError, SchedResult};
pub use observer::{CycleSummary, EndReason, NoopObserver, Occupancy, SchedulerObserver};
pub use scheduler::Scheduler;
