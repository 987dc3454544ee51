//! Control-loop time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Cycle` counter.  The
//! mapping to wall-clock time is held in `CycleClock`:
//!
//!   elapsed_ms = cycle * period_ms
//!
//! Using an integer cycle as the canonical time unit means every duration a
//! behavior waits for is exact (no floating-point drift) and comparisons are
//! O(1).  The loop itself is paced by the caller; this crate never sleeps.
//!
//! The default period is 20 ms (50 Hz), the usual robot control rate.

use std::fmt;

use crate::{ArbError, ArbResult};

// ── Cycle ────────────────────────────────────────────────────────────────────

/// An absolute control-cycle counter.
///
/// Stored as `u64`: at 50 Hz a u64 lasts ~11 billion years.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cycle(pub u64);

impl Cycle {
    pub const ZERO: Cycle = Cycle(0);

    /// Return the cycle `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Cycle {
        Cycle(self.0 + n)
    }

    /// Cycles elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Cycle) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Cycle {
    type Output = Cycle;
    #[inline]
    fn add(self, rhs: u64) -> Cycle {
        Cycle(self.0 + rhs)
    }
}

impl std::ops::Sub for Cycle {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Cycle) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

// ── CycleClock ───────────────────────────────────────────────────────────────

/// Converts between cycle counts and elapsed milliseconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleClock {
    /// Length of one control period in milliseconds.
    pub period_ms: u32,
    /// The current cycle, advanced by `CycleClock::advance()` each iteration.
    pub current: Cycle,
}

impl CycleClock {
    pub fn new(period_ms: u32) -> Self {
        Self { period_ms, current: Cycle::ZERO }
    }

    /// Advance the clock by one cycle.
    #[inline]
    pub fn advance(&mut self) {
        self.current = Cycle(self.current.0 + 1);
    }

    /// Elapsed milliseconds since cycle 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current.0 * self.period_ms as u64
    }

    /// How many cycles span `ms` milliseconds.  Rounds up, so a timeout
    /// never fires early.
    #[inline]
    pub fn cycles_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.period_ms.max(1) as u64)
    }
}

impl fmt::Display for CycleClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.elapsed_ms();
        write!(f, "{} ({}.{:03} s)", self.current, ms / 1_000, ms % 1_000)
    }
}

// ── SchedulerConfig ──────────────────────────────────────────────────────────

/// Top-level scheduler configuration.
///
/// Typically built in code by the robot crate, or loaded from a JSON/TOML
/// file (with the `serde` feature) and passed to the scheduler builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Control period in milliseconds.  Default: 20.
    pub period_ms: u32,

    /// Cycles executed by `Scheduler::run`.  A 2:30 match at 50 Hz is 7,500.
    pub total_cycles: u64,

    /// Wall-clock budget for one cycle's work in microseconds.  A cycle that
    /// takes longer is reported as an overrun.  `0` disables the check.
    pub overrun_budget_us: u64,

    /// Push the full resource occupancy table to telemetry every N cycles.
    /// `0` disables the occupancy push.
    pub telemetry_interval_cycles: u64,

    /// Whether the robot starts enabled.  Disabled robots only run behaviors
    /// flagged `runs_when_disabled`.
    pub start_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ms:                 20,
            total_cycles:              7_500,
            overrun_budget_us:         0,
            telemetry_interval_cycles: 50,
            start_enabled:             true,
        }
    }
}

impl SchedulerConfig {
    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> ArbResult<()> {
        if self.period_ms == 0 {
            return Err(ArbError::Config("period_ms must be > 0".into()));
        }
        Ok(())
    }

    /// The cycle at which `Scheduler::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_cycle(&self) -> Cycle {
        Cycle(self.total_cycles)
    }

    /// Construct a `CycleClock` pre-configured for this run.
    pub fn make_clock(&self) -> CycleClock {
        CycleClock::new(self.period_ms)
    }
}
