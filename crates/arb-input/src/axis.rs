//! `Axis` — an analog control role.

use crate::{InputFrame, Trigger};

/// Reads one named analog source and shapes it.
///
/// Values inside `deadband` read as `0.0`; outside it the remaining travel
/// is rescaled to `[0, 1]` so the output is continuous at the deadband edge,
/// then multiplied by `scale` and optionally inverted.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub source:   String,
    pub deadband: f64,
    pub scale:    f64,
    pub inverted: bool,
}

impl Axis {
    pub fn new(source: &str) -> Self {
        Self {
            source:   source.to_owned(),
            deadband: 0.0,
            scale:    1.0,
            inverted: false,
        }
    }

    pub fn with_deadband(mut self, deadband: f64) -> Self {
        self.deadband = deadband.clamp(0.0, 0.99);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    pub fn read(&self, frame: &InputFrame) -> f64 {
        let raw = frame.axis(&self.source).clamp(-1.0, 1.0);
        let shaped = if raw.abs() <= self.deadband {
            0.0
        } else {
            raw.signum() * (raw.abs() - self.deadband) / (1.0 - self.deadband)
        };
        let value = shaped * self.scale;
        if self.inverted { -value } else { value }
    }

    /// True while the shaped value's magnitude exceeds `threshold`, e.g.
    /// "the driver is steering".
    pub fn active(&self, threshold: f64) -> Trigger {
        let axis = self.clone();
        Trigger::new(&format!("|{}|>{threshold}", self.source), move |t| {
            axis.read(t.inputs).abs() > threshold
        })
    }
}
