//! Per-cycle snapshot of the physical controls.

use arb_core::Cycle;

use crate::NameMap;

/// Every named button and axis value read for one control cycle.
///
/// Names that were never set read as released / centred.  A missing control
/// is therefore indistinguishable from an idle one, which is exactly what a
/// robot without that control wants.
#[derive(Clone, Debug, Default)]
pub struct InputFrame {
    buttons: NameMap<bool>,
    axes:    NameMap<f64>,
}

impl InputFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set_button`.
    pub fn with_button(mut self, name: &str, pressed: bool) -> Self {
        self.set_button(name, pressed);
        self
    }

    /// Builder-style `set_axis`.
    pub fn with_axis(mut self, name: &str, value: f64) -> Self {
        self.set_axis(name, value);
        self
    }

    pub fn set_button(&mut self, name: &str, pressed: bool) {
        self.buttons.insert(name.to_owned(), pressed);
    }

    pub fn set_axis(&mut self, name: &str, value: f64) {
        self.axes.insert(name.to_owned(), value);
    }

    pub fn button(&self, name: &str) -> bool {
        self.buttons.get(name).copied().unwrap_or(false)
    }

    pub fn axis(&self, name: &str) -> f64 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }
}

/// Where the robot loop gets its frame from each cycle.
pub trait InputSource {
    fn poll(&mut self, cycle: Cycle) -> InputFrame;
}

/// Replays keyframes: frame `k` is in effect from its cycle until the next
/// keyframe's cycle.  Before the first keyframe the frame is empty.
///
/// ```rust
/// use arb_core::Cycle;
/// use arb_input::{InputFrame, InputSource, ScriptedInputs};
///
/// let mut script = ScriptedInputs::new()
///     .at(2, InputFrame::new().with_button("a", true))
///     .at(4, InputFrame::new());
/// assert!(!script.poll(Cycle(1)).button("a"));
/// assert!(script.poll(Cycle(3)).button("a"));
/// assert!(!script.poll(Cycle(4)).button("a"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedInputs {
    /// Keyframes sorted ascending by start cycle.
    keyframes: Vec<(Cycle, InputFrame)>,
}

impl ScriptedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyframe taking effect at `cycle`.  A later call for the same
    /// cycle replaces the earlier frame.
    pub fn at(mut self, cycle: u64, frame: InputFrame) -> Self {
        let cycle = Cycle(cycle);
        match self.keyframes.binary_search_by_key(&cycle, |(c, _)| *c) {
            Ok(i) => self.keyframes[i].1 = frame,
            Err(i) => self.keyframes.insert(i, (cycle, frame)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// The frame in effect at `cycle`.
    pub fn frame_at(&self, cycle: Cycle) -> InputFrame {
        let idx = self.keyframes.partition_point(|(c, _)| *c <= cycle);
        if idx == 0 {
            InputFrame::default()
        } else {
            self.keyframes[idx - 1].1.clone()
        }
    }
}

impl InputSource for ScriptedInputs {
    fn poll(&mut self, cycle: Cycle) -> InputFrame {
        self.frame_at(cycle)
    }
}
