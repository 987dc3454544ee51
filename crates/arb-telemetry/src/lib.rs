//! `arb-telemetry` — one-way telemetry for the arbiter behavior core.
//!
//! | Sink              | Destination                                      |
//! |-------------------|--------------------------------------------------|
//! | `MemoryTelemetry` | latest value per key, in memory                  |
//! | `CsvTelemetry`    | `telemetry.csv` (`cycle,key,value`) in a directory |
//!
//! All sinks implement [`TelemetrySink`] and are driven by
//! [`TelemetryObserver`], which implements `arb_sched::SchedulerObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use arb_telemetry::{CsvTelemetry, TelemetryObserver};
//!
//! let sink = CsvTelemetry::new(Path::new("./output"))?;
//! let mut obs = TelemetryObserver::new(sink);
//! scheduler.run(&mut inputs, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("telemetry error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod sink;


pub use csv::CsvTelemetry;
pub use error::{TelemetryError, TelemetryResult};
pub use observer::TelemetryObserver;
pub use sink::{MemoryTelemetry, TelemetrySink, TelemetryValue};
