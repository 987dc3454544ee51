//! `Probe` — a recording action for tests and bring-up.
//!
//! Every lifecycle call of every action a probe hands out is appended to one
//! shared log, so a test can assert on the exact interleaving of init,
//! execute and end across several behaviors.

use std::sync::{Arc, Mutex, MutexGuard};

use arb_core::ResourceId;
use arb_resource::ActuatorCommand;

use crate::{Action, BehaviorContext, BehaviorError, BehaviorResult, Effects};

/// One recorded lifecycle call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeEvent {
    Init(String),
    Execute(String),
    End { name: String, interrupted: bool },
}

/// Shared event log.  Clones share the same log.
#[derive(Clone, Default)]
pub struct Probe {
    log: Arc<Mutex<Vec<ProbeEvent>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new action recording into this probe under `name`.
    pub fn action(&self, name: &str) -> ProbeAction {
        ProbeAction {
            name:         name.to_owned(),
            log:          Arc::clone(&self.log),
            finish_after: None,
            fail_at:      None,
            fail_on_init: false,
            fail_on_end:  false,
            drive:        None,
            executed:     0,
        }
    }

    pub fn events(&self) -> Vec<ProbeEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn inits(&self, name: &str) -> usize {
        self.count(|e| matches!(e, ProbeEvent::Init(n) if n == name))
    }

    pub fn executes(&self, name: &str) -> usize {
        self.count(|e| matches!(e, ProbeEvent::Execute(n) if n == name))
    }

    /// The `interrupted` flag of every end call for `name`, in order.
    pub fn ends(&self, name: &str) -> Vec<bool> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ProbeEvent::End { name: n, interrupted } if n == name => Some(*interrupted),
                _ => None,
            })
            .collect()
    }

    /// Names in the order they were initialized.
    pub fn init_order(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ProbeEvent::Init(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&ProbeEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ProbeEvent>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An action that records its lifecycle and can be told to finish or fail.
pub struct ProbeAction {
    name:         String,
    log:          Arc<Mutex<Vec<ProbeEvent>>>,
    finish_after: Option<u32>,
    fail_at:      Option<u32>,
    fail_on_init: bool,
    fail_on_end:  bool,
    drive:        Option<(ResourceId, f64)>,
    executed:     u32,
}

impl ProbeAction {
    /// Report finished after `n` executes.
    pub fn finishing_after(mut self, n: u32) -> Self {
        self.finish_after = Some(n);
        self
    }

    /// Return an error from the `n`th execute (1-based).
    pub fn failing_at(mut self, n: u32) -> Self {
        self.fail_at = Some(n);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_on_init = true;
        self
    }

    pub fn failing_end(mut self) -> Self {
        self.fail_on_end = true;
        self
    }

    /// Apply `DutyCycle(output)` to `resource` on every execute.
    pub fn driving(mut self, resource: ResourceId, output: f64) -> Self {
        self.drive = Some((resource, output));
        self
    }

    fn record(&self, event: ProbeEvent) {
        self.log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

impl Action for ProbeAction {
    fn initialize(&mut self, _ctx: &BehaviorContext<'_>, _fx: &mut Effects<'_>) -> BehaviorResult<()> {
        self.executed = 0;
        self.record(ProbeEvent::Init(self.name.clone()));
        if self.fail_on_init {
            return Err(BehaviorError::fault(format!("{} failed to initialize", self.name)));
        }
        Ok(())
    }

    fn execute(&mut self, _ctx: &BehaviorContext<'_>, fx: &mut Effects<'_>) -> BehaviorResult<()> {
        self.executed += 1;
        self.record(ProbeEvent::Execute(self.name.clone()));
        if self.fail_at == Some(self.executed) {
            return Err(BehaviorError::fault(format!("{} failed on execute {}", self.name, self.executed)));
        }
        if let Some((resource, output)) = self.drive {
            fx.apply(resource, ActuatorCommand::DutyCycle(output))?;
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finish_after.is_some_and(|n| self.executed >= n)
    }

    fn end(&mut self, interrupted: bool, _ctx: &BehaviorContext<'_>, _fx: &mut Effects<'_>) -> BehaviorResult<()> {
        self.record(ProbeEvent::End { name: self.name.clone(), interrupted });
        if self.fail_on_end {
            return Err(BehaviorError::fault(format!("{} failed during cleanup", self.name)));
        }
        Ok(())
    }
}
