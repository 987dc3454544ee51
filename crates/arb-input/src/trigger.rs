//! `Trigger` — a named, pure boolean condition over inputs and mode state.

use std::fmt;
use std::sync::Arc;

use arb_core::GamePiece;

use crate::InputFrame;

/// Everything a trigger may look at: this cycle's inputs and the mode state.
#[derive(Copy, Clone, Debug)]
pub struct TriggerInput<'a> {
    pub inputs: &'a InputFrame,
    pub mode:   GamePiece,
}

impl<'a> TriggerInput<'a> {
    pub fn new(inputs: &'a InputFrame, mode: GamePiece) -> Self {
        Self { inputs, mode }
    }
}

type Condition = dyn Fn(&TriggerInput<'_>) -> bool + Send + Sync;

/// A cloneable predicate with a display name.
///
/// Triggers hold no state: edge detection lives in the scheduler next to
/// each registered trigger, which is what lets one `Trigger` value be reused
/// inside several compound conditions safely.
///
/// ```rust
/// use arb_core::GamePiece;
/// use arb_input::{InputFrame, Trigger, TriggerInput};
///
/// let shoot_cube = Trigger::button("rb").and(Trigger::mode_is(GamePiece::Cube));
/// let frame = InputFrame::new().with_button("rb", true);
/// assert!(!shoot_cube.sample(&TriggerInput::new(&frame, GamePiece::Cone)));
/// assert!(shoot_cube.sample(&TriggerInput::new(&frame, GamePiece::Cube)));
/// ```
#[derive(Clone)]
pub struct Trigger {
    name: Arc<str>,
    cond: Arc<Condition>,
}

impl Trigger {
    pub fn new<F>(name: &str, cond: F) -> Self
    where
        F: Fn(&TriggerInput<'_>) -> bool + Send + Sync + 'static,
    {
        Self { name: Arc::from(name), cond: Arc::new(cond) }
    }

    /// True while the named button is held.
    pub fn button(source: &str) -> Self {
        let key = source.to_owned();
        Self::new(source, move |t| t.inputs.button(&key))
    }

    /// True while the named axis reads strictly above `threshold`.
    pub fn axis_above(source: &str, threshold: f64) -> Self {
        let key = source.to_owned();
        Self::new(&format!("{source}>{threshold}"), move |t| t.inputs.axis(&key) > threshold)
    }

    /// True while the named axis reads strictly below `threshold`.
    pub fn axis_below(source: &str, threshold: f64) -> Self {
        let key = source.to_owned();
        Self::new(&format!("{source}<{threshold}"), move |t| t.inputs.axis(&key) < threshold)
    }

    /// True while the mode state equals `piece`.
    pub fn mode_is(piece: GamePiece) -> Self {
        Self::new(&format!("mode=={piece}"), move |t| t.mode == piece)
    }

    pub fn always() -> Self {
        Self::new("always", |_| true)
    }

    pub fn never() -> Self {
        Self::new("never", |_| false)
    }

    pub fn and(self, other: Trigger) -> Self {
        let name = format!("({} && {})", self.name, other.name);
        Self::new(&name, move |t| self.sample(t) && other.sample(t))
    }

    pub fn or(self, other: Trigger) -> Self {
        let name = format!("({} || {})", self.name, other.name);
        Self::new(&name, move |t| self.sample(t) || other.sample(t))
    }

    pub fn negate(self) -> Self {
        let name = format!("!{}", self.name);
        Self::new(&name, move |t| !self.sample(t))
    }

    /// Evaluate the condition.  Pure: calling it twice with the same input
    /// returns the same value.
    #[inline]
    pub fn sample(&self, input: &TriggerInput<'_>) -> bool {
        (self.cond)(input)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trigger").field(&self.name).finish()
    }
}
