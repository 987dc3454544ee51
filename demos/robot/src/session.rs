//! A scripted teleop session: controller keyframes plus the world events
//! (pieces arriving, targets coming into view) a real match would supply.

use arb_core::{Cycle, Pose2d, TargetOffset};
use arb_input::{FixedVision, InputFrame, InputSource, ScriptedInputs, TargetProfile};
use arb_resource::SimHandle;

#[derive(Copy, Clone, Debug)]
pub enum WorldEvent {
    /// The beam break sees a piece.
    PieceIn,
    PieceOut,
    TargetInView(TargetProfile, TargetOffset),
    TargetLost(TargetProfile),
    /// Odometry drift, or the robot having turned.
    Pose(Pose2d),
}

/// Replays controller keyframes and applies world events at their cycle,
/// before the frame for that cycle is returned.
pub struct DriverSession {
    script:  ScriptedInputs,
    events:  Vec<(Cycle, WorldEvent)>,
    next:    usize,
    shooter: SimHandle,
    vision:  FixedVision,
}

impl DriverSession {
    pub fn new(script: ScriptedInputs, shooter: SimHandle, vision: FixedVision) -> Self {
        Self { script, events: Vec::new(), next: 0, shooter, vision }
    }

    pub fn event(mut self, cycle: u64, event: WorldEvent) -> Self {
        let at = self.events.partition_point(|(c, _)| c.0 <= cycle);
        self.events.insert(at, (Cycle(cycle), event));
        self
    }

    pub fn keyframes(&self) -> usize {
        self.script.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn apply(&self, cycle: Cycle, event: WorldEvent) {
        log::debug!("{cycle}: world event {event:?}");
        match event {
            WorldEvent::PieceIn => self.shooter.set_sensor(true),
            WorldEvent::PieceOut => self.shooter.set_sensor(false),
            WorldEvent::TargetInView(profile, offset) => self.vision.set_target(profile, offset),
            WorldEvent::TargetLost(profile) => self.vision.clear_target(profile),
            WorldEvent::Pose(pose) => self.vision.set_pose(pose),
        }
    }
}

impl InputSource for DriverSession {
    fn poll(&mut self, cycle: Cycle) -> InputFrame {
        while let Some(&(at, event)) = self.events.get(self.next) {
            if at > cycle {
                break;
            }
            self.apply(at, event);
            self.next += 1;
        }
        self.script.poll(cycle)
    }
}

fn press(buttons: &[&str]) -> InputFrame {
    buttons
        .iter()
        .fold(InputFrame::new(), |frame, b| frame.with_button(b, true))
}

/// About thirty seconds of play: a cube from the floor scored high, a cone
/// from the double substation scored mid, then the drive-mode controls.
pub fn match_session(shooter: SimHandle, vision: FixedVision) -> DriverSession {
    let script = ScriptedInputs::new()
        .at(120, InputFrame::new().with_axis("driver.left_y", -0.6))
        .at(180, InputFrame::new())
        // Cube from the floor.
        .at(200, press(&["operator.right_bumper"]))
        .at(205, InputFrame::new())
        .at(220, press(&["driver.left_bumper"]))
        .at(330, InputFrame::new())
        .at(380, press(&["operator.y"]))
        .at(385, InputFrame::new())
        // Cone from the double substation.
        .at(500, press(&["operator.left_bumper"]))
        .at(505, InputFrame::new())
        .at(560, press(&["driver.y"]))
        .at(680, InputFrame::new())
        .at(760, press(&["operator.a"]))
        .at(765, InputFrame::new())
        // Wheel lock, broken by the driver.
        .at(900, press(&["driver.x"]))
        .at(905, InputFrame::new())
        .at(960, InputFrame::new().with_axis("driver.left_x", 0.8))
        .at(1_000, InputFrame::new())
        // Heading drive.
        .at(1_050, press(&["driver.pov_down"]))
        .at(1_055, InputFrame::new().with_axis("driver.right_y", -1.0))
        .at(1_120, InputFrame::new())
        // Manual wrist, then housekeeping.
        .at(1_150, press(&["operator.pov_up"]))
        .at(1_200, InputFrame::new())
        .at(1_250, press(&["driver.back"]))
        .at(1_255, InputFrame::new())
        .at(1_300, press(&["driver.start"]))
        .at(1_305, InputFrame::new());

    DriverSession::new(script, shooter, vision)
        .event(230, WorldEvent::TargetInView(TargetProfile::PickupCubeFloor, TargetOffset::new(6.0, -4.0)))
        .event(300, WorldEvent::PieceIn)
        .event(305, WorldEvent::TargetLost(TargetProfile::PickupCubeFloor))
        .event(440, WorldEvent::PieceOut)
        .event(640, WorldEvent::PieceIn)
        .event(830, WorldEvent::PieceOut)
        .event(1_000, WorldEvent::Pose(Pose2d::new(3.2, 1.4, 0.6)))
}
