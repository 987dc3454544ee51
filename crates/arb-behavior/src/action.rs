//! The `Action` trait — primitive behavior logic supplied by robot code.

use crate::{BehaviorContext, BehaviorResult, Effects};

/// The body of a primitive behavior.
///
/// The scheduler drives an action through
/// `initialize → execute* → end(interrupted)`.  `initialize` runs once per
/// activation; `end` runs exactly once per activation on every exit path.
/// `is_finished` is checked after every `execute`.
///
/// Only [`execute`][Self::execute] is required.  An action that never
/// reports finished runs until it is cancelled or preempted.
///
/// No method may block: every call must return well within one control
/// period.  Returning `Err` is a fault; the scheduler force-ends the
/// behavior and falls back to defaults.
///
/// # Example
///
/// ```rust,ignore
/// struct MoveWrist { wrist: ResourceId, speed: f64 }
///
/// impl Action for MoveWrist {
///     fn execute(&mut self, _ctx: &BehaviorContext, fx: &mut Effects) -> BehaviorResult<()> {
///         fx.apply(self.wrist, ActuatorCommand::DutyCycle(self.speed))?;
///         Ok(())
///     }
///
///     fn end(&mut self, _interrupted: bool, _ctx: &BehaviorContext, fx: &mut Effects) -> BehaviorResult<()> {
///         fx.stop(self.wrist)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Action: Send + 'static {
    fn initialize(&mut self, _ctx: &BehaviorContext<'_>, _fx: &mut Effects<'_>) -> BehaviorResult<()> {
        Ok(())
    }

    fn execute(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()>;

    /// Default: never finishes on its own.
    fn is_finished(&self) -> bool {
        false
    }

    /// `interrupted` is `false` only for natural completion.
    fn end(
        &mut self,
        _interrupted: bool,
        _ctx:         &BehaviorContext<'_>,
        _fx:          &mut Effects<'_>,
    ) -> BehaviorResult<()> {
        Ok(())
    }
}
