//! The pose/vision collaborator interface.

use std::sync::{Arc, Mutex, MutexGuard};

use arb_core::{Pose2d, TargetOffset};

/// Which target the camera is asked to find.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetProfile {
    PickupConeFloor,
    PickupCubeFloor,
    PickupConeDoubleStation,
    ScoreConeTop,
    ScoreConeMiddle,
    ScoreCube,
}

impl TargetProfile {
    /// Camera pipeline index for this profile.
    pub fn pipeline(self) -> u32 {
        match self {
            TargetProfile::PickupConeFloor => 0,
            TargetProfile::PickupCubeFloor => 1,
            TargetProfile::PickupConeDoubleStation => 2,
            TargetProfile::ScoreConeTop => 3,
            TargetProfile::ScoreConeMiddle => 4,
            TargetProfile::ScoreCube => 5,
        }
    }
}

/// Read-only pose and target queries.
///
/// "No target in view" is `None`, a normal answer that behaviors branch on.
pub trait VisionSource {
    fn current_pose(&self) -> Pose2d;

    fn target_offset(&self, profile: TargetProfile) -> Option<TargetOffset>;
}

/// A vision source that sees nothing and never moves.
pub struct NoVision;

impl VisionSource for NoVision {
    fn current_pose(&self) -> Pose2d {
        Pose2d::default()
    }

    fn target_offset(&self, _profile: TargetProfile) -> Option<TargetOffset> {
        None
    }
}

#[derive(Debug, Default)]
struct FixedState {
    pose:    Pose2d,
    targets: Vec<(TargetProfile, TargetOffset)>,
}

/// A vision source whose answers are set by hand.
///
/// Clones share state, so a test can keep one clone and move targets in and
/// out of view while the scheduler holds another.
#[derive(Clone, Default)]
pub struct FixedVision {
    state: Arc<Mutex<FixedState>>,
}

impl FixedVision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pose(&self, pose: Pose2d) {
        self.lock().pose = pose;
    }

    pub fn set_target(&self, profile: TargetProfile, offset: TargetOffset) {
        let mut state = self.lock();
        state.targets.retain(|(p, _)| *p != profile);
        state.targets.push((profile, offset));
    }

    pub fn clear_target(&self, profile: TargetProfile) {
        self.lock().targets.retain(|(p, _)| *p != profile);
    }

    fn lock(&self) -> MutexGuard<'_, FixedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl VisionSource for FixedVision {
    fn current_pose(&self) -> Pose2d {
        self.lock().pose
    }

    fn target_offset(&self, profile: TargetProfile) -> Option<TargetOffset> {
        self.lock()
            .targets
            .iter()
            .find(|(p, _)| *p == profile)
            .map(|(_, offset)| *offset)
    }
}
