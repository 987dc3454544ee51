//! `Behavior` — a schedulable instance and the combinator tree it runs.

use std::fmt;
use std::sync::Arc;

use arb_core::GamePiece;
use arb_input::Trigger;
use arb_resource::ResourceSet;

use crate::fn_action::Step;
use crate::{Action, BehaviorContext, BehaviorResult, Effects, FnAction, Request};

/// Builds a fresh behavior instance.  Bindings hold factories, never
/// instances, so every activation starts from a clean state.
pub type BehaviorFactory = Arc<dyn Fn() -> Behavior + Send + Sync>;

/// Schedule-time predicate for [`Behavior::select`].
pub type Predicate = Arc<dyn Fn(&BehaviorContext<'_>) -> bool + Send + Sync>;

/// Lifecycle of one behavior instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Initializing,
    Running,
    Ending,
}

/// The combinator tree.  Closed on purpose: the interpreter below is the only
/// code that knows how nodes compose, and the scheduler only sees
/// `initialize`/`step`/`end` on the root.
enum Node {
    Primitive(Box<dyn Action>),
    Sequence {
        children: Vec<Behavior>,
        current:  usize,
    },
    ParallelUntil {
        main:  Box<Behavior>,
        until: Trigger,
    },
    ConditionalSelect {
        if_true:   Box<Behavior>,
        if_false:  Box<Behavior>,
        predicate: Predicate,
        selected:  Option<bool>,
    },
    StartEnd {
        start: Step,
        end:   Step,
    },
    Timeout {
        inner:    Box<Behavior>,
        cycles:   u64,
        executed: u64,
    },
    ThenSchedule {
        inner: Box<Behavior>,
        next:  BehaviorFactory,
    },
}

/// One schedulable unit of control logic.
///
/// A behavior declares the resources it needs at construction; the set never
/// changes afterwards, except that a top-level conditional-select narrows to
/// the branch chosen by [`resolve`](Self::resolve) before arbitration.
///
/// Lifecycle: `Idle → Initializing → Running → Ending → Idle`.
/// [`end`](Self::end) is a no-op on an `Idle` behavior, which is what makes
/// cleanup run exactly once no matter how many exit paths race to it.
pub struct Behavior {
    name:               String,
    requirements:       ResourceSet,
    runs_when_disabled: bool,
    state:              Lifecycle,
    node:               Node,
}

impl Behavior {
    // ── Primitive constructors ────────────────────────────────────────────

    pub fn new(name: &str, requirements: impl Into<ResourceSet>, action: impl Action) -> Self {
        Self::from_node(name, requirements.into(), Node::Primitive(Box::new(action)))
    }

    /// Runs `f` once at init and finishes immediately.
    pub fn instant<F>(name: &str, requirements: impl Into<ResourceSet>, f: F) -> Self
    where
        F: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        Self::new(name, requirements, FnAction::new().on_init(f).once())
    }

    /// Runs `f` every cycle and never finishes.
    pub fn run<F>(name: &str, requirements: impl Into<ResourceSet>, f: F) -> Self
    where
        F: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        Self::new(name, requirements, FnAction::new().on_execute(f))
    }

    /// Runs `start` at init, nothing while running, `end` on every exit.
    /// The hold-button-to-actuate idiom.
    pub fn start_end<S, E>(name: &str, requirements: impl Into<ResourceSet>, start: S, end: E) -> Self
    where
        S: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
        E: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        Self::from_node(
            name,
            requirements.into(),
            Node::StartEnd { start: Box::new(start), end: Box::new(end) },
        )
    }

    // ── Combinators ───────────────────────────────────────────────────────

    /// Runs each child to completion in order.  Requirements are the union.
    pub fn sequence(name: &str, children: Vec<Behavior>) -> Self {
        let requirements = children
            .iter()
            .fold(ResourceSet::EMPTY, |acc, c| acc.union(c.requirements));
        let runs_when_disabled = !children.is_empty() && children.iter().all(|c| c.runs_when_disabled);
        let mut b = Self::from_node(name, requirements, Node::Sequence { children, current: 0 });
        b.runs_when_disabled = runs_when_disabled;
        b
    }

    /// `self`, then `next`.  Appends to an existing sequence instead of
    /// nesting.
    pub fn and_then(self, next: Behavior) -> Self {
        match self.node {
            Node::Sequence { mut children, current } if self.state == Lifecycle::Idle => {
                let name = format!("{} -> {}", self.name, next.name);
                children.push(next);
                let mut b = Self::sequence(&name, children);
                if let Node::Sequence { current: c, .. } = &mut b.node {
                    *c = current;
                }
                b
            }
            node => {
                let first = Behavior { node, ..self };
                let name = format!("{} -> {}", first.name, next.name);
                Self::sequence(&name, vec![first, next])
            }
        }
    }

    /// Runs `self` until it finishes or `condition` samples true.
    pub fn until(self, condition: Trigger) -> Self {
        let name = format!("{} until {}", self.name, condition.name());
        let requirements = self.requirements;
        let runs_when_disabled = self.runs_when_disabled;
        let mut b = Self::from_node(
            &name,
            requirements,
            Node::ParallelUntil { main: Box::new(self), until: condition },
        );
        b.runs_when_disabled = runs_when_disabled;
        b
    }

    /// Picks one branch when scheduled.  Until resolved, requirements are
    /// the union of both branches.
    pub fn select<P>(name: &str, predicate: P, if_true: Behavior, if_false: Behavior) -> Self
    where
        P: Fn(&BehaviorContext<'_>) -> bool + Send + Sync + 'static,
    {
        let requirements = if_true.requirements.union(if_false.requirements);
        let runs_when_disabled = if_true.runs_when_disabled && if_false.runs_when_disabled;
        let mut b = Self::from_node(
            name,
            requirements,
            Node::ConditionalSelect {
                if_true:   Box::new(if_true),
                if_false:  Box::new(if_false),
                predicate: Arc::new(predicate),
                selected:  None,
            },
        );
        b.runs_when_disabled = runs_when_disabled;
        b
    }

    /// `select` on the mode state: `cone` when the robot is in cone mode.
    pub fn by_mode(name: &str, cone: Behavior, cube: Behavior) -> Self {
        Self::select(name, |ctx| ctx.mode == GamePiece::Cone, cone, cube)
    }

    /// Bounded duration: finished when `self` finishes or after `cycles`
    /// executions, whichever comes first.  On timeout `self` is ended with
    /// `interrupted = true`.
    pub fn with_timeout(self, cycles: u64) -> Self {
        let name = format!("{} (timeout {cycles})", self.name);
        let requirements = self.requirements;
        let runs_when_disabled = self.runs_when_disabled;
        let mut b = Self::from_node(
            &name,
            requirements,
            Node::Timeout { inner: Box::new(self), cycles, executed: 0 },
        );
        b.runs_when_disabled = runs_when_disabled;
        b
    }

    /// Runs `self`; on natural completion only, schedules `next()`.
    pub fn then_schedule(self, next: BehaviorFactory) -> Self {
        let name = format!("{} then ...", self.name);
        let requirements = self.requirements;
        let runs_when_disabled = self.runs_when_disabled;
        let mut b = Self::from_node(
            &name,
            requirements,
            Node::ThenSchedule { inner: Box::new(self), next },
        );
        b.runs_when_disabled = runs_when_disabled;
        b
    }

    // ── Builder-style setters ─────────────────────────────────────────────

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Allow this behavior to keep running while the robot is disabled.
    pub fn ignoring_disable(mut self, runs: bool) -> Self {
        self.runs_when_disabled = runs;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn requirements(&self) -> ResourceSet {
        self.requirements
    }

    #[inline]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn runs_when_disabled(&self) -> bool {
        self.runs_when_disabled
    }

    /// Branch chosen by a root conditional-select, once resolved.
    pub fn selected_branch(&self) -> Option<bool> {
        match &self.node {
            Node::ConditionalSelect { selected, .. } => *selected,
            _ => None,
        }
    }

    // ── Lifecycle (driven by the scheduler) ───────────────────────────────

    /// Sample schedule-time predicates.
    ///
    /// A conditional-select at the root (or under `until`, `with_timeout` or
    /// `then_schedule`) picks its branch now, and the requirement set
    /// narrows to that branch so the other branch's resources are never
    /// touched.  Conditionals nested inside a sequence resolve when the
    /// sequence reaches them.  Calling `resolve` twice keeps the first
    /// choice.
    pub fn resolve(&mut self, ctx: &BehaviorContext<'_>) {
        if self.state != Lifecycle::Idle {
            return;
        }
        let narrowed = match &mut self.node {
            Node::ConditionalSelect { if_true, if_false, predicate, selected } => {
                let pick = *selected.get_or_insert_with(|| (**predicate)(ctx));
                let branch = if pick { if_true } else { if_false };
                branch.resolve(ctx);
                Some(branch.requirements)
            }
            Node::ParallelUntil { main: inner, .. }
            | Node::Timeout { inner, .. }
            | Node::ThenSchedule { inner, .. } => {
                inner.resolve(ctx);
                Some(inner.requirements)
            }
            _ => None,
        };
        if let Some(req) = narrowed {
            self.requirements = req;
        }
    }

    /// One-time init side effect.  Leaves the behavior `Running` on success;
    /// on error it stays `Initializing` and must still be ended.
    pub fn initialize(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        self.state = Lifecycle::Initializing;
        self.init_node(ctx, fx)?;
        self.state = Lifecycle::Running;
        Ok(())
    }

    /// One per-cycle update followed by the finished check.
    pub fn step(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<bool> {
        if self.state != Lifecycle::Running {
            return Ok(false);
        }
        self.step_node(ctx, fx)
    }

    /// One-time cleanup.  No-op unless the behavior has been initialized
    /// and not yet ended.
    pub fn end(
        &mut self,
        interrupted: bool,
        ctx:         &BehaviorContext<'_>,
        fx:          &mut Effects<'_>,
    ) -> BehaviorResult<()> {
        if matches!(self.state, Lifecycle::Idle | Lifecycle::Ending) {
            return Ok(());
        }
        self.state = Lifecycle::Ending;
        let result = self.end_node(interrupted, ctx, fx);
        self.state = Lifecycle::Idle;
        result
    }

    // ── Interpreter ───────────────────────────────────────────────────────

    fn from_node(name: &str, requirements: ResourceSet, node: Node) -> Self {
        Self {
            name: name.to_owned(),
            requirements,
            runs_when_disabled: false,
            state: Lifecycle::Idle,
            node,
        }
    }

    fn init_node(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        match &mut self.node {
            Node::Primitive(action) => action.initialize(ctx, fx),
            Node::Sequence { children, current } => {
                *current = 0;
                match children.first_mut() {
                    Some(first) => first.initialize(ctx, fx),
                    None => Ok(()),
                }
            }
            Node::ParallelUntil { main, .. } => main.initialize(ctx, fx),
            Node::ConditionalSelect { if_true, if_false, predicate, selected } => {
                let pick = *selected.get_or_insert_with(|| (**predicate)(ctx));
                if pick { if_true.initialize(ctx, fx) } else { if_false.initialize(ctx, fx) }
            }
            Node::StartEnd { start, .. } => start(ctx, fx),
            Node::Timeout { inner, executed, .. } => {
                *executed = 0;
                inner.initialize(ctx, fx)
            }
            Node::ThenSchedule { inner, .. } => inner.initialize(ctx, fx),
        }
    }

    fn step_node(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<bool> {
        match &mut self.node {
            Node::Primitive(action) => {
                action.execute(ctx, fx)?;
                Ok(action.is_finished())
            }
            Node::Sequence { children, current } => {
                let Some(child) = children.get_mut(*current) else {
                    return Ok(true);
                };
                if !child.step(ctx, fx)? {
                    return Ok(false);
                }
                child.end(false, ctx, fx)?;
                *current += 1;
                match children.get_mut(*current) {
                    // The next child executes from the following cycle.
                    Some(next) => {
                        next.initialize(ctx, fx)?;
                        Ok(false)
                    }
                    None => Ok(true),
                }
            }
            Node::ParallelUntil { main, until } => {
                let main_done = main.step(ctx, fx)?;
                let stop = main_done || until.sample(&ctx.trigger_input());
                if stop {
                    main.end(!main_done, ctx, fx)?;
                }
                Ok(stop)
            }
            Node::ConditionalSelect { if_true, if_false, selected, .. } => {
                let branch = if selected.unwrap_or(false) { if_true } else { if_false };
                let done = branch.step(ctx, fx)?;
                if done {
                    branch.end(false, ctx, fx)?;
                }
                Ok(done)
            }
            Node::StartEnd { .. } => Ok(false),
            Node::Timeout { inner, cycles, executed } => {
                let done = inner.step(ctx, fx)?;
                *executed += 1;
                if done {
                    inner.end(false, ctx, fx)?;
                    return Ok(true);
                }
                if *executed >= *cycles {
                    log::debug!("{} timed out after {} cycles", inner.name, cycles);
                    inner.end(true, ctx, fx)?;
                    return Ok(true);
                }
                Ok(false)
            }
            Node::ThenSchedule { inner, next } => {
                let done = inner.step(ctx, fx)?;
                if done {
                    inner.end(false, ctx, fx)?;
                    fx.request(Request::Schedule((**next)()));
                }
                Ok(done)
            }
        }
    }

    fn end_node(&mut self, interrupted: bool, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        match &mut self.node {
            Node::Primitive(action) => action.end(interrupted, ctx, fx),
            Node::Sequence { children, current } => match children.get_mut(*current) {
                Some(child) => child.end(interrupted, ctx, fx),
                None => Ok(()),
            },
            Node::ConditionalSelect { if_true, if_false, selected, .. } => match selected {
                Some(true) => if_true.end(interrupted, ctx, fx),
                Some(false) => if_false.end(interrupted, ctx, fx),
                None => Ok(()),
            },
            Node::StartEnd { end, .. } => end(ctx, fx),
            Node::ParallelUntil { main: inner, .. }
            | Node::Timeout { inner, .. }
            | Node::ThenSchedule { inner, .. } => inner.end(interrupted, ctx, fx),
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.name)
            .field("requirements", &self.requirements)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`BehaviorFactory`].
pub fn factory<F>(f: F) -> BehaviorFactory
where
    F: Fn() -> Behavior + Send + Sync + 'static,
{
    Arc::new(f)
}
