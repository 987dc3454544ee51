//! The actuator interface implemented by hardware drivers.

/// One output command for an actuator.
///
/// The variants cover what the robot's subsystems accept; a driver is free
/// to reject variants that make no sense for it (the indicator ignores
/// `Velocity`, say) by treating them as `stop()`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActuatorCommand {
    /// Open-loop output in `[-1.0, 1.0]`.
    DutyCycle(f64),
    /// Closed-loop position target in the mechanism's native units.
    Position(f64),
    /// Closed-loop velocity target in native units per second.
    Velocity(f64),
    /// Field-relative chassis speeds for a holonomic drivetrain.
    Chassis {
        vx_mps:    f64,
        vy_mps:    f64,
        omega_rps: f64,
    },
    /// Indicator pattern / camera pipeline selector.
    Pattern(u32),
}

/// What the driver last observed about its mechanism.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSnapshot {
    pub position: f64,
    pub velocity: f64,
    /// Last applied open-loop output (`0.0` after `stop`).
    pub output:   f64,
    /// Binary sensor on the mechanism, e.g. a game-piece beam break.
    pub sensor:   bool,
    /// Last selected pattern/pipeline, if any.
    pub pattern:  Option<u32>,
}

/// The narrow driver interface the core commands.
///
/// # Contract
///
/// - Every method must return promptly; the scheduler calls them inside a
///   hard real-time control cycle.
/// - The scheduler only calls `apply_output`/`stop` on behalf of the
///   behavior currently bound to the resource.
pub trait Actuator: Send {
    fn apply_output(&mut self, command: ActuatorCommand);

    fn stop(&mut self);

    fn observed_state(&self) -> StateSnapshot;
}
