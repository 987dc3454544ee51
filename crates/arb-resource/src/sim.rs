//! A simulated actuator for tests, demos and bench runs without hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Actuator, ActuatorCommand, StateSnapshot};

/// Commands a [`SimulatedActuator`] remembers unless told otherwise.
pub const DEFAULT_LOG_LIMIT: usize = 1_024;

/// Shared state behind a [`SimulatedActuator`] and its [`SimHandle`]s.
#[derive(Debug)]
struct SimState {
    snapshot:   StateSnapshot,
    commands:   VecDeque<ActuatorCommand>,
    log_limit:  usize,
    stop_count: usize,
}

impl SimState {
    fn new(log_limit: usize) -> Self {
        Self {
            snapshot:   StateSnapshot::default(),
            commands:   VecDeque::new(),
            log_limit,
            stop_count: 0,
        }
    }

    fn record(&mut self, command: ActuatorCommand) {
        if self.log_limit == 0 {
            return;
        }
        if self.commands.len() == self.log_limit {
            self.commands.pop_front();
        }
        self.commands.push_back(command);
    }
}

/// First-order stand-in for a motor/indicator driver.
///
/// Every `apply_output` call advances the model by one control period:
///
/// | Command            | Effect                                               |
/// |--------------------|------------------------------------------------------|
/// | `DutyCycle(d)`     | `velocity = d * max_speed`, position integrates       |
/// | `Position(p)`      | position moves toward `p` by at most `max_speed * dt` |
/// | `Velocity(v)`      | `velocity = v`, position integrates                   |
/// | `Chassis{..}`      | `velocity = vx`, position integrates                  |
/// | `Pattern(p)`       | records the pattern                                   |
///
/// The most recent commands are also kept in a bounded log
/// ([`DEFAULT_LOG_LIMIT`] unless set with [`with_log_limit`]) so tests can
/// assert on exactly what a behavior sent.
///
/// [`with_log_limit`]: SimulatedActuator::with_log_limit
pub struct SimulatedActuator {
    state:     Arc<Mutex<SimState>>,
    max_speed: f64,
    dt_secs:   f64,
}

impl SimulatedActuator {
    /// 1 unit/s full-scale speed at a 20 ms period.
    pub fn new() -> Self {
        Self::with_model(1.0, 0.02)
    }

    pub fn with_model(max_speed: f64, dt_secs: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState::new(DEFAULT_LOG_LIMIT))),
            max_speed,
            dt_secs,
        }
    }

    /// Keep at most `limit` commands in the log; `0` disables logging.
    pub fn with_log_limit(self, limit: usize) -> Self {
        {
            let mut state = self.state();
            state.log_limit = limit;
            while state.commands.len() > limit {
                state.commands.pop_front();
            }
        }
        self
    }

    /// A handle that keeps observing (and poking) this actuator after it has
    /// been moved into a resource table.
    pub fn handle(&self) -> SimHandle {
        SimHandle { state: Arc::clone(&self.state) }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        lock(&self.state)
    }
}

impl Default for SimulatedActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for SimulatedActuator {
    fn apply_output(&mut self, command: ActuatorCommand) {
        let (max_speed, dt) = (self.max_speed, self.dt_secs);
        let mut state = self.state();
        state.record(command);
        let snap = &mut state.snapshot;
        match command {
            ActuatorCommand::DutyCycle(d) => {
                let d = d.clamp(-1.0, 1.0);
                snap.output = d;
                snap.velocity = d * max_speed;
                snap.position += snap.velocity * dt;
            }
            ActuatorCommand::Position(target) => {
                let step = (target - snap.position).clamp(-max_speed * dt, max_speed * dt);
                snap.position += step;
                snap.velocity = step / dt;
                snap.output = snap.velocity / max_speed;
            }
            ActuatorCommand::Velocity(v) => {
                snap.velocity = v;
                snap.output = v / max_speed;
                snap.position += v * dt;
            }
            ActuatorCommand::Chassis { vx_mps, .. } => {
                snap.velocity = vx_mps;
                snap.output = vx_mps / max_speed;
                snap.position += vx_mps * dt;
            }
            ActuatorCommand::Pattern(p) => {
                snap.pattern = Some(p);
            }
        }
    }

    fn stop(&mut self) {
        let mut state = self.state();
        state.stop_count += 1;
        state.snapshot.output = 0.0;
        state.snapshot.velocity = 0.0;
    }

    fn observed_state(&self) -> StateSnapshot {
        self.state().snapshot
    }
}

/// Observer/injector for a [`SimulatedActuator`] that lives in a table.
#[derive(Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    pub fn snapshot(&self) -> StateSnapshot {
        lock(&self.state).snapshot
    }

    /// The logged commands, oldest first.
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        lock(&self.state).commands.iter().copied().collect()
    }

    pub fn last_command(&self) -> Option<ActuatorCommand> {
        lock(&self.state).commands.back().copied()
    }

    pub fn stop_count(&self) -> usize {
        lock(&self.state).stop_count
    }

    /// Drive the binary sensor (e.g. a piece entering the intake).
    pub fn set_sensor(&self, value: bool) {
        lock(&self.state).snapshot.sensor = value;
    }

    pub fn set_position(&self, position: f64) {
        lock(&self.state).snapshot.position = position;
    }

    /// Forget the command log and stop counter (state is kept).
    pub fn clear_log(&self) {
        let mut state = lock(&self.state);
        state.commands.clear();
        state.stop_count = 0;
    }
}

/// Lock, recovering the data if a panicking test thread poisoned it.
fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
