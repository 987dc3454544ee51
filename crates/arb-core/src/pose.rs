//! Field pose and vision target offset value types.
//!
//! These are the shapes the pose/vision collaborator hands back.  Estimation
//! itself happens elsewhere; this module only carries the numbers.

/// A robot pose on the field.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose2d {
    pub x_m:         f64,
    pub y_m:         f64,
    /// Heading in radians, counter-clockwise positive.
    pub heading_rad: f64,
}

impl Pose2d {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self { x_m, y_m, heading_rad }
    }
}

/// Angular offset from the camera crosshair to a vision target.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetOffset {
    pub horizontal_deg: f64,
    pub vertical_deg:   f64,
}

impl TargetOffset {
    pub fn new(horizontal_deg: f64, vertical_deg: f64) -> Self {
        Self { horizontal_deg, vertical_deg }
    }

    /// `true` if both components are within `tolerance_deg` of zero.
    pub fn is_centered(self, tolerance_deg: f64) -> bool {
        self.horizontal_deg.abs() <= tolerance_deg && self.vertical_deg.abs() <= tolerance_deg
    }
}
