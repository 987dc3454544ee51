//! Resource registration and the physical constants of the demo robot.

use arb_core::{CycleClock, ResourceId};
use arb_resource::{ResourceResult, ResourceTableBuilder, SimHandle, SimulatedActuator};

// ── Drive ─────────────────────────────────────────────────────────────────────

pub const MAX_SPEED_MPS:  f64 = 4.0;
pub const MAX_OMEGA_RPS:  f64 = 3.0;
/// Proportional gain from heading error (rad) to turn rate (rad/s).
pub const HEADING_KP:     f64 = 2.5;
/// Fraction of full speed the driver gets while an intake is running.
pub const PICKUP_SPEED_SCALE: f64 = 0.25;
/// Proportional gain from target offset (rad) to turn rate while aiming.
pub const AIM_KP:         f64 = 1.8;
pub const APPROACH_MPS:   f64 = 0.6;

// ── Elevator and wrist (sim units: metres / radians) ──────────────────────────

pub const ELEVATOR_TOLERANCE:   f64 = 0.02;
pub const WRIST_PARKED:         f64 = 0.0;
pub const WRIST_PARK_TOLERANCE: f64 = 0.05;
pub const PICKUP_ELEVATOR:      f64 = 0.05;
pub const PICKUP_WRIST:         f64 = 1.1;
pub const DOUBLE_STATION_ELEVATOR: f64 = 0.95;
pub const DOUBLE_STATION_WRIST:    f64 = 0.35;

// ── Shooter ───────────────────────────────────────────────────────────────────

pub const INTAKE_DUTY:      f64 = -0.5;
/// Light inward pull that keeps a held piece seated.
pub const HOLD_DUTY:        f64 = -0.07;
pub const EJECT_MS:         u64 = 300;
pub const RAISE_TIMEOUT_MS: u64 = 3_000;

// ── Indicator patterns ────────────────────────────────────────────────────────

pub mod pattern {
    pub const OFF:        u32 = 0;
    pub const BLUE_GOLD:  u32 = 1;
    pub const HAS_CONE:   u32 = 2;
    pub const HAS_CUBE:   u32 = 3;
    pub const WANT_CONE:  u32 = 4;
    pub const WANT_CUBE:  u32 = 5;
    /// First of the boot animation frames.
    pub const BOOT_BASE:  u32 = 10;
}

pub const WANT_PIECE_MS: u64 = 1_000;
pub const BOOT_FRAMES:   u32 = 6;
pub const BOOT_FRAME_MS: u64 = 160;

// ── Drive housekeeping ────────────────────────────────────────────────────────

pub const AFTER_DOUBLE_STATION_MS: u64 = 2_000;
/// Steer encoders are re-zeroed this often while the robot is disabled.
pub const RESEED_PERIOD_MS: u64 = 1_000;

// ── Registration ──────────────────────────────────────────────────────────────

/// Ids of every resource on the robot.
#[derive(Copy, Clone, Debug)]
pub struct Subsystems {
    pub drivetrain: ResourceId,
    pub elevator:   ResourceId,
    pub wrist:      ResourceId,
    pub shooter:    ResourceId,
    pub indicator:  ResourceId,
    pub camera:     ResourceId,
    pub period_ms:  u32,
}

/// Handles kept by `main` so the session script can poke sensors and the
/// summary can read final states.
pub struct SimHandles {
    pub shooter: SimHandle,
    pub all:     Vec<(&'static str, ResourceId, SimHandle)>,
}

impl Subsystems {
    /// Register one simulated actuator per subsystem, in a fixed order.
    pub fn register(table: &mut ResourceTableBuilder, period_ms: u32) -> ResourceResult<(Self, SimHandles)> {
        let dt = f64::from(period_ms) / 1_000.0;
        let mut all = Vec::new();
        let mut add = |name: &'static str, sim: SimulatedActuator| -> ResourceResult<ResourceId> {
            let handle = sim.handle();
            let id = table.add(name, sim)?;
            all.push((name, id, handle));
            Ok(id)
        };

        let shooter_sim    = SimulatedActuator::with_model(1.0, dt);
        let shooter_handle = shooter_sim.handle();

        let drivetrain = add("drivetrain", SimulatedActuator::with_model(MAX_SPEED_MPS, dt))?;
        let elevator   = add("elevator", SimulatedActuator::with_model(1.5, dt))?;
        let wrist      = add("wrist", SimulatedActuator::with_model(3.0, dt))?;
        let shooter    = add("shooter", shooter_sim)?;
        let indicator  = add("indicator", SimulatedActuator::with_model(1.0, dt))?;
        let camera     = add("camera", SimulatedActuator::with_model(1.0, dt))?;

        let ids = Self { drivetrain, elevator, wrist, shooter, indicator, camera, period_ms };
        Ok((ids, SimHandles { shooter: shooter_handle, all }))
    }

    /// Cycles covering `ms` at the registered control period.
    pub fn cycles(&self, ms: u64) -> u64 {
        CycleClock::new(self.period_ms).cycles_for_ms(ms)
    }
}
