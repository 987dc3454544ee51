//! The `Scheduler` struct and its control cycle.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use arb_behavior::{Behavior, BehaviorContext, BehaviorError, BehaviorFactory, Effects, Request};
use arb_core::{BehaviorId, Cycle, CycleClock, GamePiece, ResourceId, SchedulerConfig};
use arb_input::{Edge, InputFrame, InputSource, TriggerInput, VisionSource};
use arb_resource::{Outputs, ResourceSet, ResourceTable, StateSnapshot};

use crate::binding::{Binding, Op, OneShot, Slot, SourceKey};
use crate::{Control, CycleSummary, EndReason, Occupancy, SchedResult, SchedulerObserver};

/// Upper bound on queued operations applied in one drain.  Behaviors that
/// keep scheduling each other from their cleanup would otherwise spin the
/// cycle forever.
const MAX_OPS_PER_DRAIN: usize = 256;

// ── Default slots ─────────────────────────────────────────────────────────────

/// The default behavior of one resource.
///
/// A fresh instance is built from `factory` each time the default (re)starts:
/// when the resource becomes unclaimed, and after the previous instance
/// finished naturally.
pub(crate) struct DefaultSlot {
    factory:            BehaviorFactory,
    name:               String,
    runs_when_disabled: bool,
    running:            Option<(BehaviorId, Behavior)>,
}

impl DefaultSlot {
    pub(crate) fn new(factory: BehaviorFactory, probe: &Behavior) -> Self {
        Self {
            factory,
            name: probe.name().to_owned(),
            runs_when_disabled: probe.runs_when_disabled(),
            running: None,
        }
    }
}

/// A schedule postponed to the next cycle because the instance it replaces
/// was ended earlier in the same cycle.
struct Deferred {
    key:     SourceKey,
    factory: BehaviorFactory,
}

#[derive(Default)]
struct CycleStats {
    started: usize,
    ended:   usize,
    faults:  usize,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// The fixed-rate behavior scheduler.
///
/// Each call to [`run_cycle`](Self::run_cycle) performs, in order:
///
/// 1. **Sample** every trigger exactly once and derive its edges.  Then
///    apply schedules deferred from the previous cycle and commands queued
///    through the public API.
/// 2. **One-shots**: fire `on_true`/`on_false` actions in binding order.
/// 3. **Levels**: `while_true`/`while_false` bindings schedule on their
///    start edge and cancel on their stop edge.
/// 4. **Step** every running explicit behavior in start order; finished
///    ones are ended with `interrupted = false` and release their resources.
/// 5. **Defaults**: every resource with no explicit occupant steps its
///    default behavior, starting it first if needed.
///
/// Every schedule goes through the same arbitration: occupants of any
/// required resource are ended (`interrupted = true`, cleanup runs), active
/// defaults on those resources are ended, then the new behavior is bound and
/// initialized.  Requests are applied in evaluation order, so when two
/// actions in one cycle claim the same resource the later one wins.
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct Scheduler {
    /// Loop configuration.
    pub config: SchedulerConfig,

    /// Cycle counter.  Advanced once at the end of every cycle.
    pub clock: CycleClock,

    resources: ResourceTable,
    vision:    Box<dyn VisionSource>,
    mode:      GamePiece,
    enabled:   bool,
    bindings:  Vec<Binding>,
    defaults:  Vec<DefaultSlot>,

    /// Running explicit behaviors.  Ids are allocated in increasing order, so
    /// iteration order is start order.
    active:  BTreeMap<BehaviorId, Behavior>,
    next_id: u64,

    /// Operations queued through the public API, applied next cycle.
    pending:          Vec<Op>,
    deferred:         Vec<Deferred>,
    ended_this_cycle: Vec<BehaviorId>,

    frame:   InputFrame,
    sensors: Vec<StateSnapshot>,

    stats:          CycleStats,
    faults_total:   u64,
    overruns_total: u64,
}

impl Scheduler {
    pub(crate) fn new(
        config:    SchedulerConfig,
        resources: ResourceTable,
        vision:    Box<dyn VisionSource>,
        mode:      GamePiece,
        bindings:  Vec<Binding>,
        defaults:  Vec<DefaultSlot>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            enabled: config.start_enabled,
            config,
            resources,
            vision,
            mode,
            bindings,
            defaults,
            active: BTreeMap::new(),
            next_id: 0,
            pending: Vec::new(),
            deferred: Vec::new(),
            ended_this_cycle: Vec::new(),
            frame: InputFrame::new(),
            sensors: Vec::new(),
            stats: CycleStats::default(),
            faults_total: 0,
            overruns_total: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current cycle to `config.end_cycle()`, polling `inputs`
    /// once per cycle.
    pub fn run<I, O>(&mut self, inputs: &mut I, observer: &mut O) -> SchedResult<()>
    where
        I: InputSource,
        O: SchedulerObserver,
    {
        while self.clock.current < self.config.end_cycle() {
            let frame = inputs.poll(self.clock.current);
            self.run_cycle(&frame, observer)?;
        }
        observer.on_run_end(self.clock.current);
        Ok(())
    }

    /// Run exactly `n` cycles from the current position (ignores
    /// `total_cycles`).
    pub fn run_cycles<I, O>(&mut self, n: u64, inputs: &mut I, observer: &mut O) -> SchedResult<()>
    where
        I: InputSource,
        O: SchedulerObserver,
    {
        for _ in 0..n {
            let frame = inputs.poll(self.clock.current);
            self.run_cycle(&frame, observer)?;
        }
        Ok(())
    }

    /// Run one control cycle against `frame`.
    ///
    /// Behavior faults never surface here; the only errors are internal
    /// resource-table failures.
    pub fn run_cycle<O: SchedulerObserver>(&mut self, frame: &InputFrame, observer: &mut O) -> SchedResult<CycleSummary> {
        let now = self.clock.current;
        observer.on_cycle_start(now);
        let summary = self.process_cycle(frame, observer)?;
        observer.on_cycle_end(&summary);

        let interval = self.config.telemetry_interval_cycles;
        if interval > 0 && now.0 % interval == 0 {
            observer.on_occupancy(now, &self.occupancy());
        }

        self.clock.advance();
        Ok(summary)
    }

    /// Queue `behavior` for scheduling at the start of the next cycle.
    ///
    /// Returns the id the instance will run under.  If the schedule is
    /// rejected (robot disabled, no valid requirements) the id never becomes
    /// active.
    pub fn schedule(&mut self, behavior: Behavior) -> BehaviorId {
        let id = self.alloc_id();
        self.pending.push(Op::Schedule(id, behavior));
        id
    }

    /// Queue cancellation of `id` for the next cycle.
    pub fn cancel(&mut self, id: BehaviorId) {
        self.pending.push(Op::Cancel(id));
    }

    /// Queue cancellation of every explicit behavior for the next cycle.
    pub fn cancel_all(&mut self) {
        self.pending.push(Op::Request(Request::CancelAll));
    }

    /// Queue an enable/disable transition for the next cycle.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.pending.push(Op::SetEnabled(enabled));
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn mode(&self) -> GamePiece {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_cycle(&self) -> Cycle {
        self.clock.current
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    /// Explicit behavior bound to `resource`.
    pub fn occupant(&self, resource: ResourceId) -> Option<BehaviorId> {
        self.resources.occupant(resource)
    }

    /// `true` if `id` is a running explicit behavior or a running default.
    pub fn is_active(&self, id: BehaviorId) -> bool {
        self.active.contains_key(&id)
            || self
                .defaults
                .iter()
                .any(|slot| slot.running.as_ref().is_some_and(|(d, _)| *d == id))
    }

    /// Names of running explicit behaviors, in start order.
    pub fn active_names(&self) -> Vec<&str> {
        self.active.values().map(Behavior::name).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Name of the current default of `resource`, running or not.
    pub fn default_name(&self, resource: ResourceId) -> Option<&str> {
        self.defaults.get(resource.index()).map(|s| s.name.as_str())
    }

    /// Name of whatever drives `resource` right now.
    pub fn running_on(&self, resource: ResourceId) -> Option<&str> {
        if let Some(id) = self.resources.occupant(resource) {
            return self.active.get(&id).map(Behavior::name);
        }
        self.defaults
            .get(resource.index())
            .and_then(|s| s.running.as_ref())
            .map(|(_, b)| b.name())
    }

    /// One row per resource, in id order.
    pub fn occupancy(&self) -> Vec<Occupancy<'_>> {
        self.resources
            .ids()
            .map(|r| Occupancy {
                resource:   self.resources.name(r),
                behavior:   self.running_on(r),
                is_default: self.resources.occupant(r).is_none(),
            })
            .collect()
    }

    pub fn fault_count(&self) -> u64 {
        self.faults_total
    }

    pub fn overrun_count(&self) -> u64 {
        self.overruns_total
    }

    // ── Core cycle processing ─────────────────────────────────────────────

    fn process_cycle<O: SchedulerObserver>(&mut self, frame: &InputFrame, observer: &mut O) -> SchedResult<CycleSummary> {
        let started_at = Instant::now();
        let now = self.clock.current;
        self.stats = CycleStats::default();
        self.ended_this_cycle.clear();
        self.frame = frame.clone();

        // ── (a) Sample sensors and triggers, once each ────────────────────
        self.sensors.clear();
        for r in self.resources.ids() {
            self.sensors.push(self.resources.observed(r)?);
        }

        let input = TriggerInput::new(&self.frame, self.mode);
        let edges: Vec<(Edge, Edge)> = self
            .bindings
            .iter_mut()
            .map(|b| {
                let sample = b.trigger.sample(&input);
                (b.detector.update(sample), b.inverse.update(!sample))
            })
            .collect();
        for (binding, (edge, _)) in self.bindings.iter().zip(&edges) {
            if edge.rising || edge.falling {
                log::trace!("{now}: trigger {} -> {}", binding.trigger.name(), edge.level);
            }
        }

        self.apply_deferred(observer);
        let pending: VecDeque<Op> = std::mem::take(&mut self.pending).into();
        self.drain(pending, observer);

        // ── (b) One-shot actions ──────────────────────────────────────────
        for (i, (edge, _)) in edges.iter().enumerate() {
            if edge.rising {
                self.fire_one_shots(i, true, observer);
            }
            if edge.falling {
                self.fire_one_shots(i, false, observer);
            }
        }

        // ── (c) Level bindings ────────────────────────────────────────────
        for (i, (edge, inverse)) in edges.iter().enumerate() {
            self.fire_levels(i, true, *edge, observer);
            self.fire_levels(i, false, *inverse, observer);
        }

        // ── (d) Step explicit behaviors ───────────────────────────────────
        self.step_active(observer);

        // ── (e) Defaults on unclaimed resources ───────────────────────────
        self.step_defaults(observer);

        let elapsed_us = u64::try_from(started_at.elapsed().as_micros()).unwrap_or(u64::MAX);
        let budget = self.config.overrun_budget_us;
        if budget > 0 && elapsed_us > budget {
            self.overruns_total += 1;
            log::warn!("{now}: cycle overran its budget ({elapsed_us} us > {budget} us)");
            observer.on_overrun(now, elapsed_us, budget);
        }

        Ok(CycleSummary {
            cycle: now,
            active: self.active.len(),
            started: self.stats.started,
            ended: self.stats.ended,
            faults: self.stats.faults,
            mode: self.mode,
            elapsed_us,
        })
    }

    fn fire_one_shots<O: SchedulerObserver>(&mut self, index: usize, rising: bool, observer: &mut O) {
        let Some(binding) = self.bindings.get_mut(index) else { return };
        let list = if rising { &mut binding.on_true } else { &mut binding.on_false };
        let mut shots = std::mem::take(list);

        for (j, shot) in shots.iter_mut().enumerate() {
            let mut work = VecDeque::new();
            match shot {
                OneShot::Schedule { factory, last } => {
                    let slot = if rising { Slot::OnTrue(j) } else { Slot::OnFalse(j) };
                    let key = SourceKey { binding: index, slot };
                    if let Some(id) = self.schedule_keyed(key, factory, *last, observer, &mut work) {
                        *last = Some(id);
                    }
                }
                OneShot::Run(action) => {
                    let mut control = Control::new(self.mode);
                    action(&mut control);
                    work.extend(control.into_ops());
                }
            }
            self.drain(work, observer);
        }

        if let Some(binding) = self.bindings.get_mut(index) {
            let list = if rising { &mut binding.on_true } else { &mut binding.on_false };
            *list = shots;
        }
    }

    /// `positive` selects `while_true` (driven by the trigger's edges) or
    /// `while_false` (driven by the negated stream's edges).
    fn fire_levels<O: SchedulerObserver>(&mut self, index: usize, positive: bool, edge: Edge, observer: &mut O) {
        if !edge.rising && !edge.falling {
            return;
        }
        let Some(binding) = self.bindings.get_mut(index) else { return };
        let list = if positive { &mut binding.while_true } else { &mut binding.while_false };
        let mut levels = std::mem::take(list);

        for (j, level) in levels.iter_mut().enumerate() {
            let mut work = VecDeque::new();
            if edge.falling {
                if let Some(id) = level.running.take() {
                    self.end_explicit(id, EndReason::Cancelled, observer, &mut work);
                }
            }
            if edge.rising {
                let slot = if positive { Slot::WhileTrue(j) } else { Slot::WhileFalse(j) };
                let key = SourceKey { binding: index, slot };
                let last = level.running;
                level.running = self.schedule_keyed(key, &level.factory, last, observer, &mut work);
            }
            self.drain(work, observer);
        }

        if let Some(binding) = self.bindings.get_mut(index) {
            let list = if positive { &mut binding.while_true } else { &mut binding.while_false };
            *list = levels;
        }
    }

    fn step_active<O: SchedulerObserver>(&mut self, observer: &mut O) {
        let ids: Vec<BehaviorId> = self.active.keys().copied().collect();
        for id in ids {
            // Ended earlier in this loop by another behavior's request.
            let Some(mut behavior) = self.active.remove(&id) else { continue };
            let mut work = VecDeque::new();
            let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.step(ctx, fx));
            work.extend(requests.into_iter().map(Op::Request));
            match result {
                Ok(false) => {
                    self.active.insert(id, behavior);
                }
                Ok(true) => self.retire(id, behavior, EndReason::Finished, observer, &mut work),
                Err(err) => self.fault(id, behavior, err, observer, &mut work),
            }
            self.drain(work, observer);
        }
    }

    fn step_defaults<O: SchedulerObserver>(&mut self, observer: &mut O) {
        let ids: Vec<ResourceId> = self.resources.ids().collect();
        for r in ids {
            if self.resources.occupant(r).is_some() {
                continue;
            }
            let Some(slot) = self.defaults.get_mut(r.index()) else { continue };
            if !self.enabled && !slot.runs_when_disabled {
                if let Err(e) = self.resources.stop(r) {
                    log::error!("stopping {} while disabled failed: {e}", self.resources.name(r));
                }
                continue;
            }

            let mut work = VecDeque::new();
            let (id, mut behavior) = match slot.running.take() {
                Some(running) => running,
                None => {
                    let mut behavior = (slot.factory)();
                    let id = self.alloc_id();
                    let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.initialize(ctx, fx));
                    work.extend(requests.into_iter().map(Op::Request));
                    self.note_start(id, &behavior, observer);
                    if let Err(err) = result {
                        self.fault_default(r, id, behavior, err, observer, &mut work);
                        self.drain(work, observer);
                        continue;
                    }
                    (id, behavior)
                }
            };

            let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.step(ctx, fx));
            work.extend(requests.into_iter().map(Op::Request));
            match result {
                Ok(false) => {
                    if let Some(slot) = self.defaults.get_mut(r.index()) {
                        slot.running = Some((id, behavior));
                    }
                }
                Ok(true) => {
                    // Restarts from a fresh instance next cycle.
                    self.finish_default(id, behavior, false, EndReason::Finished, observer, &mut work);
                }
                Err(err) => self.fault_default(r, id, behavior, err, observer, &mut work),
            }
            self.drain(work, observer);
        }
    }

    // ── Arbitration ───────────────────────────────────────────────────────

    /// Schedule on behalf of a binding action.  A no-op while the action's
    /// previous instance is still running; deferred to the next cycle if
    /// that instance was ended earlier in this one.
    fn schedule_keyed<O: SchedulerObserver>(
        &mut self,
        key:      SourceKey,
        factory:  &BehaviorFactory,
        last:     Option<BehaviorId>,
        observer: &mut O,
        work:     &mut VecDeque<Op>,
    ) -> Option<BehaviorId> {
        if let Some(id) = last {
            if self.active.contains_key(&id) {
                log::trace!("{}: {id} already running", self.clock.current);
                return Some(id);
            }
            if self.ended_this_cycle.contains(&id) {
                log::debug!("{}: {id} ended this cycle; replacement deferred", self.clock.current);
                self.deferred.push(Deferred { key, factory: factory.clone() });
                return None;
            }
        }
        self.start(factory(), None, observer, work)
    }

    fn apply_deferred<O: SchedulerObserver>(&mut self, observer: &mut O) {
        for deferred in std::mem::take(&mut self.deferred) {
            let Some(binding) = self.bindings.get(deferred.key.binding) else { continue };
            let wanted = match deferred.key.slot {
                Slot::WhileTrue(_) => binding.detector.previous(),
                Slot::WhileFalse(_) => binding.inverse.previous(),
                Slot::OnTrue(_) | Slot::OnFalse(_) => true,
            };
            if !wanted {
                log::debug!("{}: deferred schedule dropped, trigger released", self.clock.current);
                continue;
            }
            let mut work = VecDeque::new();
            if let Some(id) = self.start((deferred.factory)(), None, observer, &mut work) {
                self.set_last(deferred.key, id);
            }
            self.drain(work, observer);
        }
    }

    fn set_last(&mut self, key: SourceKey, id: BehaviorId) {
        let Some(binding) = self.bindings.get_mut(key.binding) else { return };
        match key.slot {
            Slot::OnTrue(j) | Slot::OnFalse(j) => {
                let list = if matches!(key.slot, Slot::OnTrue(_)) { &mut binding.on_true } else { &mut binding.on_false };
                if let Some(OneShot::Schedule { last, .. }) = list.get_mut(j) {
                    *last = Some(id);
                }
            }
            Slot::WhileTrue(j) => {
                if let Some(level) = binding.while_true.get_mut(j) {
                    level.running = Some(id);
                }
            }
            Slot::WhileFalse(j) => {
                if let Some(level) = binding.while_false.get_mut(j) {
                    level.running = Some(id);
                }
            }
        }
    }

    /// The arbitration algorithm.  Returns the new instance's id, or `None`
    /// if the schedule was dropped or the behavior faulted during init.
    fn start<O: SchedulerObserver>(
        &mut self,
        mut behavior: Behavior,
        id:           Option<BehaviorId>,
        observer:     &mut O,
        work:         &mut VecDeque<Op>,
    ) -> Option<BehaviorId> {
        let now = self.clock.current;
        if !self.enabled && !behavior.runs_when_disabled() {
            log::debug!("{now}: robot disabled, dropped {}", behavior.name());
            return None;
        }

        // Schedule-time predicates see the mode as of this request.
        {
            let ctx = BehaviorContext::new(
                now,
                self.config.period_ms,
                self.mode,
                &self.frame,
                self.vision.as_ref(),
                &self.sensors,
            );
            behavior.resolve(&ctx);
        }

        let req = behavior.requirements();
        if req.is_empty() || !self.resources.contains_all(req) {
            log::warn!("{now}: {} has invalid requirements {req:?}; not scheduled", behavior.name());
            return None;
        }

        // ① Preempt every explicit occupant; their cleanup runs first.
        for victim in self.resources.occupants_of(req) {
            self.end_explicit(victim, EndReason::Preempted, observer, work);
        }
        // ② Active defaults on the claimed resources end too.
        for r in req.iter() {
            self.end_default(r, EndReason::Preempted, observer, work);
        }

        // ③ Bind, then initialize.
        let id = id.unwrap_or_else(|| self.alloc_id());
        for r in req.iter() {
            if let Err(e) = self.resources.bind(r, id) {
                log::error!("{now}: binding {} for {} failed: {e}", self.resources.name(r), behavior.name());
            }
        }
        let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.initialize(ctx, fx));
        work.extend(requests.into_iter().map(Op::Request));
        self.note_start(id, &behavior, observer);

        match result {
            Ok(()) => {
                self.active.insert(id, behavior);
                Some(id)
            }
            Err(err) => {
                self.fault(id, behavior, err, observer, work);
                None
            }
        }
    }

    // ── Ending ────────────────────────────────────────────────────────────

    fn end_explicit<O: SchedulerObserver>(&mut self, id: BehaviorId, reason: EndReason, observer: &mut O, work: &mut VecDeque<Op>) {
        if let Some(behavior) = self.active.remove(&id) {
            self.retire(id, behavior, reason, observer, work);
        }
    }

    /// Run cleanup, release resources and report.  `behavior` must already be
    /// out of the active map.
    fn retire<O: SchedulerObserver>(
        &mut self,
        id:           BehaviorId,
        mut behavior: Behavior,
        reason:       EndReason,
        observer:     &mut O,
        work:         &mut VecDeque<Op>,
    ) {
        let now = self.clock.current;
        let interrupted = reason.interrupted();
        let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.end(interrupted, ctx, fx));
        work.extend(requests.into_iter().map(Op::Request));
        if let Err(err) = result {
            self.cleanup_failed(&behavior, &err, observer);
        }
        for r in behavior.requirements().iter() {
            self.resources.release(r, id);
        }
        self.ended_this_cycle.push(id);
        self.stats.ended += 1;
        log::debug!("{now}: ended {} ({reason:?})", behavior.name());
        observer.on_behavior_end(now, id, behavior.name(), reason);
    }

    fn fault<O: SchedulerObserver>(
        &mut self,
        id:       BehaviorId,
        behavior: Behavior,
        err:      BehaviorError,
        observer: &mut O,
        work:     &mut VecDeque<Op>,
    ) {
        self.report_fault(behavior.name(), &err, observer);
        self.retire(id, behavior, EndReason::Faulted, observer, work);
    }

    fn end_default<O: SchedulerObserver>(&mut self, resource: ResourceId, reason: EndReason, observer: &mut O, work: &mut VecDeque<Op>) {
        let running = self.defaults.get_mut(resource.index()).and_then(|s| s.running.take());
        if let Some((id, behavior)) = running {
            self.finish_default(id, behavior, reason.interrupted(), reason, observer, work);
        }
    }

    fn finish_default<O: SchedulerObserver>(
        &mut self,
        id:           BehaviorId,
        mut behavior: Behavior,
        interrupted:  bool,
        reason:       EndReason,
        observer:     &mut O,
        work:         &mut VecDeque<Op>,
    ) {
        let now = self.clock.current;
        let (result, requests) = self.invoke(&mut behavior, |b, ctx, fx| b.end(interrupted, ctx, fx));
        work.extend(requests.into_iter().map(Op::Request));
        if let Err(err) = result {
            self.cleanup_failed(&behavior, &err, observer);
        }
        self.stats.ended += 1;
        log::debug!("{now}: default {} ended ({reason:?})", behavior.name());
        observer.on_behavior_end(now, id, behavior.name(), reason);
    }

    /// A faulted default is ended and its actuator stopped; a fresh instance
    /// is tried again next cycle.
    fn fault_default<O: SchedulerObserver>(
        &mut self,
        resource: ResourceId,
        id:       BehaviorId,
        behavior: Behavior,
        err:      BehaviorError,
        observer: &mut O,
        work:     &mut VecDeque<Op>,
    ) {
        self.report_fault(behavior.name(), &err, observer);
        self.finish_default(id, behavior, true, EndReason::Faulted, observer, work);
        if let Err(e) = self.resources.stop(resource) {
            log::error!("stopping {} after fault failed: {e}", self.resources.name(resource));
        }
    }

    fn report_fault<O: SchedulerObserver>(&mut self, name: &str, err: &BehaviorError, observer: &mut O) {
        let now = self.clock.current;
        self.stats.faults += 1;
        self.faults_total += 1;
        log::error!("{now}: {name} faulted: {err}; force-ending");
        observer.on_fault(now, name, err);
    }

    fn cleanup_failed<O: SchedulerObserver>(&mut self, behavior: &Behavior, err: &BehaviorError, observer: &mut O) {
        let now = self.clock.current;
        self.stats.faults += 1;
        self.faults_total += 1;
        log::error!("{now}: cleanup of {} failed: {err}", behavior.name());
        observer.on_fault(now, behavior.name(), err);
    }

    fn note_start<O: SchedulerObserver>(&mut self, id: BehaviorId, behavior: &Behavior, observer: &mut O) {
        let now = self.clock.current;
        self.stats.started += 1;
        log::debug!("{now}: started {} as {id}", behavior.name());
        observer.on_behavior_start(now, id, behavior.name(), behavior.requirements());
    }

    // ── Request loop ──────────────────────────────────────────────────────

    /// Apply queued operations in order.  Operations produced while applying
    /// (cleanup requests, init requests) join the back of the queue.
    fn drain<O: SchedulerObserver>(&mut self, mut work: VecDeque<Op>, observer: &mut O) {
        let mut applied = 0;
        while let Some(op) = work.pop_front() {
            applied += 1;
            if applied > MAX_OPS_PER_DRAIN {
                log::warn!(
                    "{}: request limit reached, dropping {} queued operations",
                    self.clock.current,
                    work.len() + 1
                );
                break;
            }
            match op {
                Op::Request(Request::SetMode(piece)) => self.set_mode_now(piece, observer),
                Op::Request(Request::Schedule(behavior)) => {
                    self.start(behavior, None, observer, &mut work);
                }
                Op::Request(Request::CancelAll) => {
                    let ids: Vec<BehaviorId> = self.active.keys().copied().collect();
                    for id in ids {
                        self.end_explicit(id, EndReason::Cancelled, observer, &mut work);
                    }
                }
                Op::Schedule(id, behavior) => {
                    self.start(behavior, Some(id), observer, &mut work);
                }
                Op::Cancel(id) => self.end_explicit(id, EndReason::Cancelled, observer, &mut work),
                Op::SetDefault(resource, factory) => self.swap_default(resource, factory, observer, &mut work),
                Op::SetEnabled(enabled) => self.set_enabled_now(enabled, observer, &mut work),
            }
        }
    }

    fn set_mode_now<O: SchedulerObserver>(&mut self, piece: GamePiece, observer: &mut O) {
        if piece == self.mode {
            return;
        }
        let from = self.mode;
        self.mode = piece;
        log::debug!("{}: mode {from} -> {piece}", self.clock.current);
        observer.on_mode_change(self.clock.current, from, piece);
    }

    fn swap_default<O: SchedulerObserver>(
        &mut self,
        resource: ResourceId,
        factory:  BehaviorFactory,
        observer: &mut O,
        work:     &mut VecDeque<Op>,
    ) {
        let probe = factory();
        if probe.requirements() != ResourceSet::single(resource) || !self.resources.contains(resource) {
            log::warn!(
                "{}: {} cannot be the default of {}; keeping the current default",
                self.clock.current,
                probe.name(),
                self.resources.name(resource)
            );
            return;
        }
        self.end_default(resource, EndReason::Cancelled, observer, work);
        if let Some(slot) = self.defaults.get_mut(resource.index()) {
            *slot = DefaultSlot::new(factory, &probe);
            log::info!(
                "{}: default for {} is now {}",
                self.clock.current,
                self.resources.name(resource),
                probe.name()
            );
        }
    }

    fn set_enabled_now<O: SchedulerObserver>(&mut self, enabled: bool, observer: &mut O, work: &mut VecDeque<Op>) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        log::info!("{}: robot {}", self.clock.current, if enabled { "enabled" } else { "disabled" });
        observer.on_enabled_change(self.clock.current, enabled);
        if enabled {
            return;
        }

        let doomed: Vec<BehaviorId> = self
            .active
            .iter()
            .filter(|(_, b)| !b.runs_when_disabled())
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            self.end_explicit(id, EndReason::Disabled, observer, work);
        }
        let resources: Vec<ResourceId> = self.resources.ids().collect();
        for r in resources {
            let keep = self.defaults.get(r.index()).is_some_and(|s| s.runs_when_disabled);
            if !keep {
                self.end_default(r, EndReason::Disabled, observer, work);
            }
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn alloc_id(&mut self) -> BehaviorId {
        let id = BehaviorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Call into `behavior` with a fresh context and an output view limited
    /// to its requirements.  Returns the call's result and the requests it
    /// queued.
    fn invoke<R>(
        &mut self,
        behavior: &mut Behavior,
        call:     impl FnOnce(&mut Behavior, &BehaviorContext<'_>, &mut Effects<'_>) -> R,
    ) -> (R, Vec<Request>) {
        let mut requests = Vec::new();
        let owner = behavior.name().to_owned();
        let ctx = BehaviorContext::new(
            self.clock.current,
            self.config.period_ms,
            self.mode,
            &self.frame,
            self.vision.as_ref(),
            &self.sensors,
        );
        let outputs = Outputs::new(&mut self.resources, behavior.requirements(), &owner);
        let mut fx = Effects::new(outputs, &mut requests);
        let result = call(behavior, &ctx, &mut fx);
        drop(fx);
        (result, requests)
    }
}
