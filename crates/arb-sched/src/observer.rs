//! Scheduler observer trait for telemetry and diagnostics.

use arb_behavior::BehaviorError;
use arb_core::{BehaviorId, Cycle, GamePiece};
use arb_resource::ResourceSet;

/// Why a behavior instance left the running set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// Its finished-predicate reported true.
    Finished,
    /// Cancelled by a released level binding, `cancel` or `cancel_all`.
    Cancelled,
    /// A newly scheduled behavior claimed one of its resources.
    Preempted,
    /// It returned an error and was force-ended.
    Faulted,
    /// The robot was disabled and it does not run while disabled.
    Disabled,
}

impl EndReason {
    /// The `interrupted` flag its cleanup was called with.
    pub fn interrupted(self) -> bool {
        !matches!(self, EndReason::Finished)
    }
}

/// What one cycle did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleSummary {
    pub cycle:      Cycle,
    /// Explicitly scheduled behaviors still running after the cycle.
    pub active:     usize,
    /// Behavior instances (explicit and default) initialized this cycle.
    pub started:    usize,
    /// Behavior instances ended this cycle, for any reason.
    pub ended:      usize,
    pub faults:     usize,
    pub mode:       GamePiece,
    /// Wall time spent inside the cycle.
    pub elapsed_us: u64,
}

/// One row of the occupancy table.
#[derive(Clone, Debug, PartialEq)]
pub struct Occupancy<'a> {
    pub resource:   &'a str,
    /// Name of the behavior driving the resource, if any.
    pub behavior:   Option<&'a str>,
    pub is_default: bool,
}

/// Callbacks invoked by the scheduler at key points in the cycle.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — fault printer
///
/// ```rust,ignore
/// struct FaultPrinter;
///
/// impl SchedulerObserver for FaultPrinter {
///     fn on_fault(&mut self, cycle: Cycle, behavior: &str, error: &BehaviorError) {
///         eprintln!("{cycle}: {behavior} faulted: {error}");
///     }
/// }
/// ```
pub trait SchedulerObserver {
    /// Called at the very start of each cycle, before triggers are sampled.
    fn on_cycle_start(&mut self, _cycle: Cycle) {}

    /// Called after a behavior's init has run (even if init faulted).
    fn on_behavior_start(&mut self, _cycle: Cycle, _id: BehaviorId, _name: &str, _requirements: ResourceSet) {}

    /// Called after a behavior's cleanup has run.
    fn on_behavior_end(&mut self, _cycle: Cycle, _id: BehaviorId, _name: &str, _reason: EndReason) {}

    fn on_mode_change(&mut self, _cycle: Cycle, _from: GamePiece, _to: GamePiece) {}

    fn on_enabled_change(&mut self, _cycle: Cycle, _enabled: bool) {}

    /// Called when behavior code returns an error, including from cleanup.
    fn on_fault(&mut self, _cycle: Cycle, _behavior: &str, _error: &BehaviorError) {}

    /// Called when a cycle took longer than `overrun_budget_us`.
    fn on_overrun(&mut self, _cycle: Cycle, _elapsed_us: u64, _budget_us: u64) {}

    /// Called at the end of each cycle.
    fn on_cycle_end(&mut self, _summary: &CycleSummary) {}

    /// Called every `config.telemetry_interval_cycles` cycles with the full
    /// occupancy table, one row per resource in id order.
    fn on_occupancy(&mut self, _cycle: Cycle, _table: &[Occupancy<'_>]) {}

    /// Called once after `run` completes its final cycle.
    fn on_run_end(&mut self, _final_cycle: Cycle) {}
}

/// A [`SchedulerObserver`] that does nothing.
pub struct NoopObserver;

impl SchedulerObserver for NoopObserver {}
