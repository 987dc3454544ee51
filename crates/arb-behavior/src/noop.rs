//! Built-in actions with no robot-specific logic.

use crate::{Action, BehaviorContext, BehaviorResult, Effects};

/// Stops every held resource each cycle and never finishes.
///
/// The scheduler installs this as the default of any resource that was not
/// given one, so an unclaimed actuator is always actively commanded to a
/// safe state.
pub struct Neutral;

impl Action for Neutral {
    fn execute(&mut self, _ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        fx.stop_all()?;
        Ok(())
    }
}

/// An action that does nothing and never finishes.
///
/// Useful as a placeholder that simply holds its resources.
pub struct Hold;

impl Action for Hold {
    fn execute(&mut self, _ctx: &BehaviorContext<'_>, _fx: &mut Effects<'_>) -> BehaviorResult<()> {
        Ok(())
    }
}
