//! Trigger bindings and the `Control` handle given to one-shot actions.

use arb_behavior::{Behavior, BehaviorFactory, Request};
use arb_core::{BehaviorId, GamePiece, ResourceId};
use arb_input::{EdgeDetector, Trigger};

use crate::SchedulerBuilder;

/// A one-shot action body.  Runs inside step (b) of the cycle.
pub type ControlFn = Box<dyn FnMut(&mut Control) + Send>;

/// A change queued by a one-shot action, a behavior, or the public API.
/// Applied in order by the scheduler's request loop.
pub(crate) enum Op {
    Request(Request),
    SetDefault(ResourceId, BehaviorFactory),
    Schedule(BehaviorId, Behavior),
    Cancel(BehaviorId),
    SetEnabled(bool),
}

/// Handle passed to `on_true_do` / `on_false_do` closures.
///
/// Every call queues an operation; the scheduler applies them in call order
/// as soon as the closure returns.
pub struct Control {
    mode: GamePiece,
    ops:  Vec<Op>,
}

impl Control {
    pub(crate) fn new(mode: GamePiece) -> Self {
        Self { mode, ops: Vec::new() }
    }

    pub(crate) fn into_ops(self) -> Vec<Op> {
        self.ops
    }

    /// Mode state as of the call, including earlier `set_mode` calls made
    /// through this handle.
    pub fn mode(&self) -> GamePiece {
        self.mode
    }

    pub fn set_mode(&mut self, piece: GamePiece) {
        self.mode = piece;
        self.ops.push(Op::Request(Request::SetMode(piece)));
    }

    pub fn schedule(&mut self, behavior: Behavior) {
        self.ops.push(Op::Request(Request::Schedule(behavior)));
    }

    /// Replace the default behavior of `resource`.  The current default, if
    /// running, is ended; the new one starts the next time the resource is
    /// unclaimed during the default step.
    pub fn set_default(&mut self, resource: ResourceId, factory: BehaviorFactory) {
        self.ops.push(Op::SetDefault(resource, factory));
    }

    pub fn cancel_all(&mut self) {
        self.ops.push(Op::Request(Request::CancelAll));
    }
}

// ── Binding storage ───────────────────────────────────────────────────────────

pub(crate) enum OneShot {
    Schedule {
        factory: BehaviorFactory,
        /// Most recent instance this action scheduled.
        last:    Option<BehaviorId>,
    },
    Run(ControlFn),
}

pub(crate) struct Level {
    pub(crate) factory: BehaviorFactory,
    pub(crate) running: Option<BehaviorId>,
}

/// One registered trigger and everything attached to it.  The trigger is
/// sampled once per cycle no matter how many actions hang off it.
pub(crate) struct Binding {
    pub(crate) trigger:     Trigger,
    pub(crate) detector:    EdgeDetector,
    /// Edges of the negated stream, which drive `while_false`.
    pub(crate) inverse:     EdgeDetector,
    pub(crate) on_true:     Vec<OneShot>,
    pub(crate) on_false:    Vec<OneShot>,
    pub(crate) while_true:  Vec<Level>,
    pub(crate) while_false: Vec<Level>,
}

impl Binding {
    pub(crate) fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            detector:    EdgeDetector::new(),
            inverse:     EdgeDetector::new(),
            on_true:     Vec::new(),
            on_false:    Vec::new(),
            while_true:  Vec::new(),
            while_false: Vec::new(),
        }
    }

    /// Every factory attached to this binding, for build-time validation.
    pub(crate) fn factories(&self) -> impl Iterator<Item = &BehaviorFactory> {
        let shots = self.on_true.iter().chain(self.on_false.iter()).filter_map(|s| match s {
            OneShot::Schedule { factory, .. } => Some(factory),
            OneShot::Run(_) => None,
        });
        let levels = self
            .while_true
            .iter()
            .chain(self.while_false.iter())
            .map(|l| &l.factory);
        shots.chain(levels)
    }
}

/// Which action of which binding scheduled an instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    OnTrue(usize),
    OnFalse(usize),
    WhileTrue(usize),
    WhileFalse(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SourceKey {
    pub(crate) binding: usize,
    pub(crate) slot:    Slot,
}

// ── Binder ────────────────────────────────────────────────────────────────────

/// Attaches actions to one trigger.  Returned by
/// [`SchedulerBuilder::bind`].
///
/// When the trigger is absent (`None`, e.g. a role the control profile
/// does not map) every method is a silent no-op.
///
/// ```rust,ignore
/// builder
///     .bind(controls.trigger("wrist_up"))
///     .while_true(factory(move || move_wrist(wrist, 0.2)));
/// ```
pub struct Binder<'a> {
    builder: &'a mut SchedulerBuilder,
    index:   Option<usize>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(builder: &'a mut SchedulerBuilder, index: Option<usize>) -> Self {
        Self { builder, index }
    }

    /// Schedule a new instance on the false→true edge.
    pub fn on_true(self, factory: BehaviorFactory) -> Self {
        self.with(|b| b.on_true.push(OneShot::Schedule { factory, last: None }))
    }

    /// Schedule a new instance on the true→false edge.
    pub fn on_false(self, factory: BehaviorFactory) -> Self {
        self.with(|b| b.on_false.push(OneShot::Schedule { factory, last: None }))
    }

    /// Run `f` once on the false→true edge.
    pub fn on_true_do<F>(self, f: F) -> Self
    where
        F: FnMut(&mut Control) + Send + 'static,
    {
        self.with(|b| b.on_true.push(OneShot::Run(Box::new(f))))
    }

    /// Run `f` once on the true→false edge.
    pub fn on_false_do<F>(self, f: F) -> Self
    where
        F: FnMut(&mut Control) + Send + 'static,
    {
        self.with(|b| b.on_false.push(OneShot::Run(Box::new(f))))
    }

    /// Schedule on true, cancel on false if still running.
    pub fn while_true(self, factory: BehaviorFactory) -> Self {
        self.with(|b| b.while_true.push(Level { factory, running: None }))
    }

    /// Schedule while the trigger reads false, including from the first
    /// cycle; cancel when it turns true.
    pub fn while_false(self, factory: BehaviorFactory) -> Self {
        self.with(|b| b.while_false.push(Level { factory, running: None }))
    }

    /// `true` if a trigger was supplied.
    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }

    fn with(self, f: impl FnOnce(&mut Binding)) -> Self {
        if let Some(i) = self.index {
            if let Some(binding) = self.builder.binding_mut(i) {
                f(binding);
            }
        }
        self
    }
}
