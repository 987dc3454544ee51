//! Read-only cycle state passed to every behavior callback.

use arb_core::{Cycle, GamePiece, ResourceId};
use arb_input::{InputFrame, TriggerInput, VisionSource};
use arb_resource::StateSnapshot;

/// A read-only snapshot of the robot for one call into a behavior.
///
/// The scheduler builds a fresh context for every call, so `mode` always
/// reflects mode changes applied earlier in the same cycle.  `sensors` is
/// the observed state of every resource, sampled once at the start of the
/// cycle and indexed by `ResourceId`.
pub struct BehaviorContext<'a> {
    /// Current control cycle.
    pub cycle: Cycle,

    /// Length of one control period in milliseconds.
    pub period_ms: u32,

    /// Current mode state.
    pub mode: GamePiece,

    /// This cycle's driver inputs.
    pub inputs: &'a InputFrame,

    /// Pose and target queries.
    pub vision: &'a dyn VisionSource,

    /// Observed actuator state, indexed by `ResourceId`.
    pub sensors: &'a [StateSnapshot],
}

impl<'a> BehaviorContext<'a> {
    #[inline]
    pub fn new(
        cycle:     Cycle,
        period_ms: u32,
        mode:      GamePiece,
        inputs:    &'a InputFrame,
        vision:    &'a dyn VisionSource,
        sensors:   &'a [StateSnapshot],
    ) -> Self {
        Self { cycle, period_ms, mode, inputs, vision, sensors }
    }

    /// The view a trigger would see right now.
    #[inline]
    pub fn trigger_input(&self) -> TriggerInput<'a> {
        TriggerInput::new(self.inputs, self.mode)
    }

    /// Start-of-cycle observed state of `id`.
    pub fn observed(&self, id: ResourceId) -> Option<&StateSnapshot> {
        self.sensors.get(id.index())
    }

    /// Game-piece sensor of `id`; `false` for an unknown resource.
    pub fn sensor(&self, id: ResourceId) -> bool {
        self.observed(id).is_some_and(|s| s.sensor)
    }
}
