//! `TelemetryObserver<S>` — bridges `SchedulerObserver` to a `TelemetrySink`.

use arb_behavior::BehaviorError;
use arb_core::{Cycle, GamePiece};
use arb_sched::{CycleSummary, Occupancy, SchedulerObserver};

use crate::{TelemetryError, TelemetryResult, TelemetrySink};

pub const ACTIVE_COUNT: &str = "Scheduler/ActiveCount";
pub const FAULTS: &str = "Scheduler/Faults";
pub const LAST_FAULT: &str = "Scheduler/LastFault";
pub const OVERRUNS: &str = "Scheduler/Overruns";
pub const CYCLE_TIME_US: &str = "Scheduler/CycleTimeUs";
pub const GAME_PIECE: &str = "Mode/GamePiece";
pub const ENABLED: &str = "Robot/Enabled";

/// A [`SchedulerObserver`] that publishes scheduler state to any
/// [`TelemetrySink`].
///
/// Sink errors are stored internally because observer methods have no
/// return value.  After `scheduler.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct TelemetryObserver<S: TelemetrySink> {
    sink:       S,
    faults:     u64,
    overruns:   u64,
    last_error: Option<TelemetryError>,
}

impl<S: TelemetrySink> TelemetryObserver<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, faults: 0, overruns: 0, last_error: None }
    }

    /// Take the stored sink error (if any).  Returns `None` if every write
    /// succeeded.
    pub fn take_error(&mut self) -> Option<TelemetryError> {
        self.last_error.take()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Unwrap the inner sink (e.g. to inspect values after the run).
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn store_err(&mut self, result: TelemetryResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::warn!("telemetry write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<S: TelemetrySink> SchedulerObserver for TelemetryObserver<S> {
    fn on_mode_change(&mut self, cycle: Cycle, _from: GamePiece, to: GamePiece) {
        let result = self.sink.put_text(cycle, GAME_PIECE, to.as_str());
        self.store_err(result);
    }

    fn on_enabled_change(&mut self, cycle: Cycle, enabled: bool) {
        let result = self.sink.put_bool(cycle, ENABLED, enabled);
        self.store_err(result);
    }

    fn on_fault(&mut self, cycle: Cycle, behavior: &str, error: &BehaviorError) {
        self.faults += 1;
        let text = format!("{behavior}: {error}");
        let result = self
            .sink
            .put_text(cycle, LAST_FAULT, &text)
            .and_then(|()| self.sink.put_number(cycle, FAULTS, self.faults as f64));
        self.store_err(result);
    }

    fn on_overrun(&mut self, cycle: Cycle, _elapsed_us: u64, _budget_us: u64) {
        self.overruns += 1;
        let result = self.sink.put_number(cycle, OVERRUNS, self.overruns as f64);
        self.store_err(result);
    }

    fn on_cycle_end(&mut self, summary: &CycleSummary) {
        let result = self
            .sink
            .put_number(summary.cycle, ACTIVE_COUNT, summary.active as f64)
            .and_then(|()| self.sink.put_number(summary.cycle, CYCLE_TIME_US, summary.elapsed_us as f64));
        self.store_err(result);
    }

    fn on_occupancy(&mut self, cycle: Cycle, table: &[Occupancy<'_>]) {
        for row in table {
            let key = format!("Resource/{}", row.resource);
            let result = self.sink.put_text(cycle, &key, row.behavior.unwrap_or("-"));
            self.store_err(result);
        }
    }

    fn on_run_end(&mut self, _final_cycle: Cycle) {
        let result = self.sink.flush();
        self.store_err(result);
    }
}
