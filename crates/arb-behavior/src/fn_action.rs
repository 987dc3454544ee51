//! `FnAction` — an [`Action`] assembled from closures.

use crate::{Action, BehaviorContext, BehaviorResult, Effects};

/// A closure run at init or on every cycle.
pub type Step = Box<dyn FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send>;

/// A closure run at end; receives the `interrupted` flag.
pub type Cleanup =
    Box<dyn FnMut(bool, &BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send>;

type Finish = Box<dyn FnMut(&BehaviorContext<'_>, &Effects<'_>) -> bool + Send>;

/// Inline behavior logic for the common shapes: run-once, run-forever,
/// run-until-predicate.
///
/// ```rust,ignore
/// let settle = FnAction::new()
///     .on_execute(move |_, fx| Ok(fx.apply(elevator, ActuatorCommand::Position(0.0))?))
///     .finish_when(move |ctx, _| ctx.observed(elevator).is_some_and(|s| s.position.abs() < 0.01));
/// ```
#[derive(Default)]
pub struct FnAction {
    init:     Option<Step>,
    step:     Option<Step>,
    end:      Option<Cleanup>,
    finish:   Option<Finish>,
    /// Finished as soon as `initialize` has run.
    once:     bool,
    finished: bool,
}

impl FnAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        self.init = Some(Box::new(f));
        self
    }

    pub fn on_execute<F>(mut self, f: F) -> Self
    where
        F: FnMut(&BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        self.step = Some(Box::new(f));
        self
    }

    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut(bool, &BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send + 'static,
    {
        self.end = Some(Box::new(f));
        self
    }

    /// Finished once `f` returns true; checked after every execute.
    pub fn finish_when<F>(mut self, f: F) -> Self
    where
        F: FnMut(&BehaviorContext<'_>, &Effects<'_>) -> bool + Send + 'static,
    {
        self.finish = Some(Box::new(f));
        self
    }

    /// Finished on the first check after initialize.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

impl Action for FnAction {
    fn initialize(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        self.finished = false;
        if let Some(init) = self.init.as_mut() {
            init(ctx, fx)?;
        }
        self.finished = self.once;
        Ok(())
    }

    fn execute(&mut self, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        if self.once {
            return Ok(());
        }
        if let Some(step) = self.step.as_mut() {
            step(ctx, fx)?;
        }
        if let Some(finish) = self.finish.as_mut() {
            self.finished = finish(ctx, fx);
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn end(&mut self, interrupted: bool, ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        match self.end.as_mut() {
            Some(end) => end(interrupted, ctx, fx),
            None => Ok(()),
        }
    }
}
