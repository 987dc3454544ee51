//! Unit tests for arb-behavior.

use arb_core::{Cycle, GamePiece, ResourceId};
use arb_input::{InputFrame, NoVision, Trigger};
use arb_resource::{
    ActuatorCommand, Outputs, ResourceError, ResourceSet, ResourceTable, ResourceTableBuilder,
    SimHandle, SimulatedActuator, StateSnapshot,
};

use crate::{
    factory, Behavior, BehaviorContext, BehaviorError, BehaviorResult, Effects, FnAction, Lifecycle,
    Neutral, Probe, ProbeEvent, Request,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const ELEVATOR: ResourceId = ResourceId(0);
const WRIST: ResourceId = ResourceId(1);
const SHOOTER: ResourceId = ResourceId(2);

/// Drives one behavior by hand, outside any scheduler.
struct Rig {
    table:    ResourceTable,
    handles:  Vec<SimHandle>,
    frame:    InputFrame,
    mode:     GamePiece,
    cycle:    u64,
    requests: Vec<Request>,
}

impl Rig {
    fn new() -> Self {
        let mut builder = ResourceTableBuilder::new();
        let mut handles = Vec::new();
        for name in ["elevator", "wrist", "shooter"] {
            let act = SimulatedActuator::new();
            handles.push(act.handle());
            builder.add(name, act).unwrap();
        }
        Self {
            table: builder.build(),
            handles,
            frame: InputFrame::new(),
            mode: GamePiece::Cone,
            cycle: 1,
            requests: Vec::new(),
        }
    }

    fn with<R>(&mut self, held: ResourceSet, f: impl FnOnce(&BehaviorContext<'_>, &mut Effects<'_>) -> R) -> R {
        let sensors: Vec<StateSnapshot> = self
            .table
            .ids()
            .map(|id| self.table.observed(id).unwrap_or_default())
            .collect();
        let vision = NoVision;
        let ctx = BehaviorContext::new(Cycle(self.cycle), 20, self.mode, &self.frame, &vision, &sensors);
        let outputs = Outputs::new(&mut self.table, held, "rig");
        let mut fx = Effects::new(outputs, &mut self.requests);
        f(&ctx, &mut fx)
    }

    /// Resolve, then initialize: what the scheduler does on schedule.
    fn start(&mut self, b: &mut Behavior) -> BehaviorResult<()> {
        self.with(ResourceSet::EMPTY, |ctx, _| b.resolve(ctx));
        let held = b.requirements();
        self.with(held, |ctx, fx| b.initialize(ctx, fx))
    }

    fn step(&mut self, b: &mut Behavior) -> BehaviorResult<bool> {
        let held = b.requirements();
        let done = self.with(held, |ctx, fx| b.step(ctx, fx));
        self.cycle += 1;
        done
    }

    fn end(&mut self, b: &mut Behavior, interrupted: bool) -> BehaviorResult<()> {
        let held = b.requirements();
        self.with(held, |ctx, fx| b.end(interrupted, ctx, fx))
    }

    /// Step until finished (at most `limit` cycles), then end naturally.
    fn run_to_end(&mut self, b: &mut Behavior, limit: u32) -> u32 {
        for n in 1..=limit {
            if self.step(b).unwrap() {
                self.end(b, false).unwrap();
                return n;
            }
        }
        panic!("{} did not finish within {limit} cycles", b.name());
    }
}

fn probe_behavior(probe: &Probe, name: &str, req: ResourceId, finish_after: Option<u32>) -> Behavior {
    let action = match finish_after {
        Some(n) => probe.action(name).finishing_after(n),
        None => probe.action(name),
    };
    Behavior::new(name, req, action)
}

// ── Primitive lifecycle ───────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn idle_running_idle() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "A", WRIST, Some(2));
        assert_eq!(b.state(), Lifecycle::Idle);
        rig.start(&mut b).unwrap();
        assert_eq!(b.state(), Lifecycle::Running);
        assert!(!rig.step(&mut b).unwrap());
        assert!(rig.step(&mut b).unwrap());
        rig.end(&mut b, false).unwrap();
        assert_eq!(b.state(), Lifecycle::Idle);
        assert_eq!(probe.inits("A"), 1);
        assert_eq!(probe.executes("A"), 2);
        assert_eq!(probe.ends("A"), vec![false]);
    }

    #[test]
    fn end_runs_cleanup_exactly_once() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "A", WRIST, None);
        rig.start(&mut b).unwrap();
        rig.end(&mut b, true).unwrap();
        rig.end(&mut b, true).unwrap();
        rig.end(&mut b, false).unwrap();
        assert_eq!(probe.ends("A"), vec![true]);
    }

    #[test]
    fn ending_an_unstarted_behavior_is_a_noop() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "A", WRIST, None);
        rig.end(&mut b, true).unwrap();
        assert!(probe.events().is_empty());
    }

    #[test]
    fn failed_init_can_still_be_cleaned_up() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = Behavior::new("A", WRIST, probe.action("A").failing_init());
        assert!(rig.start(&mut b).is_err());
        assert_eq!(b.state(), Lifecycle::Initializing);
        assert!(!rig.step(&mut b).unwrap(), "a behavior that failed init is never stepped");
        rig.end(&mut b, true).unwrap();
        assert_eq!(probe.executes("A"), 0);
        assert_eq!(probe.ends("A"), vec![true]);
    }

    #[test]
    fn instant_finishes_without_execute() {
        let mut rig = Rig::new();
        let mut b = Behavior::instant("Zero", ELEVATOR, |_, fx| {
            fx.apply(ELEVATOR, ActuatorCommand::Position(0.0))?;
            Ok(())
        });
        rig.start(&mut b).unwrap();
        assert_eq!(rig.handles[0].last_command(), Some(ActuatorCommand::Position(0.0)));
        assert!(rig.step(&mut b).unwrap());
    }

    #[test]
    fn start_end_runs_until_cancelled() {
        let mut rig = Rig::new();
        let mut b = Behavior::start_end(
            "WristUp",
            WRIST,
            |_, fx| Ok(fx.apply(WRIST, ActuatorCommand::DutyCycle(0.2))?),
            |_, fx| Ok(fx.stop(WRIST)?),
        );
        rig.start(&mut b).unwrap();
        for _ in 0..10 {
            assert!(!rig.step(&mut b).unwrap());
        }
        assert_eq!(rig.handles[1].stop_count(), 0);
        rig.end(&mut b, true).unwrap();
        assert_eq!(rig.handles[1].stop_count(), 1);
        assert_eq!(rig.handles[1].snapshot().output, 0.0);
    }

    #[test]
    fn fn_action_finish_when_reads_context() {
        let mut rig = Rig::new();
        let mut b = Behavior::new(
            "WaitForPiece",
            SHOOTER,
            FnAction::new()
                .on_execute(|_, fx| Ok(fx.apply(SHOOTER, ActuatorCommand::DutyCycle(-0.5))?))
                .finish_when(|ctx, _| ctx.sensor(SHOOTER)),
        );
        rig.start(&mut b).unwrap();
        assert!(!rig.step(&mut b).unwrap());
        rig.handles[2].set_sensor(true);
        assert!(rig.step(&mut b).unwrap());
    }

    #[test]
    fn commanding_an_unheld_resource_is_a_fault() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = Behavior::new("Rogue", WRIST, probe.action("Rogue").driving(ELEVATOR, 1.0));
        rig.start(&mut b).unwrap();
        let err = rig.step(&mut b).unwrap_err();
        assert!(matches!(err, BehaviorError::Resource(ResourceError::NotHeld { .. })));
        assert!(rig.handles[0].commands().is_empty());
    }

    #[test]
    fn neutral_stops_held_resources() {
        let mut rig = Rig::new();
        let mut b = Behavior::new("Neutral", ResourceSet::from([ELEVATOR, WRIST]), Neutral);
        rig.start(&mut b).unwrap();
        rig.step(&mut b).unwrap();
        rig.step(&mut b).unwrap();
        assert_eq!(rig.handles[0].stop_count(), 2);
        assert_eq!(rig.handles[1].stop_count(), 2);
        assert_eq!(rig.handles[2].stop_count(), 0);
    }
}

// ── Sequence ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sequence_tests {
    use super::*;

    #[test]
    fn requirements_are_the_union() {
        let probe = Probe::new();
        let seq = probe_behavior(&probe, "B1", ELEVATOR, Some(1))
            .and_then(probe_behavior(&probe, "B2", WRIST, Some(1)));
        assert_eq!(seq.requirements(), ResourceSet::from([ELEVATOR, WRIST]));
        assert_eq!(seq.name(), "B1 -> B2");
    }

    #[test]
    fn b2_starts_only_after_b1_finishes() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut seq = probe_behavior(&probe, "B1", ELEVATOR, Some(2))
            .and_then(probe_behavior(&probe, "B2", WRIST, Some(1)));
        rig.start(&mut seq).unwrap();
        assert!(!rig.step(&mut seq).unwrap());
        assert_eq!(probe.inits("B2"), 0);
        // B1 finishes: ended, then B2 initialized in the same step.
        assert!(!rig.step(&mut seq).unwrap());
        assert_eq!(probe.ends("B1"), vec![false]);
        assert_eq!(probe.inits("B2"), 1);
        assert_eq!(probe.executes("B2"), 0);
        assert!(rig.step(&mut seq).unwrap());
        rig.end(&mut seq, false).unwrap();
        assert_eq!(probe.ends("B2"), vec![false]);
        assert_eq!(probe.ends("B1"), vec![false]);
    }

    #[test]
    fn cancel_mid_b1_never_starts_b2() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut seq = probe_behavior(&probe, "B1", ELEVATOR, Some(5))
            .and_then(probe_behavior(&probe, "B2", WRIST, Some(1)));
        rig.start(&mut seq).unwrap();
        rig.step(&mut seq).unwrap();
        rig.end(&mut seq, true).unwrap();
        assert_eq!(probe.ends("B1"), vec![true]);
        assert_eq!(probe.inits("B2"), 0);
        assert!(probe.ends("B2").is_empty());
    }

    #[test]
    fn and_then_appends_to_an_existing_sequence() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut seq = probe_behavior(&probe, "A", ELEVATOR, Some(1))
            .and_then(probe_behavior(&probe, "B", WRIST, Some(1)))
            .and_then(probe_behavior(&probe, "C", SHOOTER, Some(1)));
        assert_eq!(seq.requirements().len(), 3);
        rig.start(&mut seq).unwrap();
        let cycles = rig.run_to_end(&mut seq, 10);
        assert_eq!(cycles, 3);
        assert_eq!(probe.init_order(), vec!["A", "B", "C"]);
        for name in ["A", "B", "C"] {
            assert_eq!(probe.ends(name), vec![false]);
        }
    }

    #[test]
    fn empty_sequence_finishes_immediately() {
        let mut rig = Rig::new();
        let mut seq = Behavior::sequence("Empty", vec![]);
        assert!(seq.requirements().is_empty());
        rig.start(&mut seq).unwrap();
        assert!(rig.step(&mut seq).unwrap());
    }
}

// ── Parallel-until ────────────────────────────────────────────────────────────

#[cfg(test)]
mod until_tests {
    use super::*;

    #[test]
    fn condition_forces_end_with_cleanup() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "WheelsX", ELEVATOR, None).until(Trigger::button("steer"));
        rig.start(&mut b).unwrap();
        assert!(!rig.step(&mut b).unwrap());
        rig.frame.set_button("steer", true);
        assert!(rig.step(&mut b).unwrap());
        assert_eq!(probe.ends("WheelsX"), vec![true]);
        rig.end(&mut b, false).unwrap();
        assert_eq!(probe.ends("WheelsX"), vec![true], "main cleanup runs once");
    }

    #[test]
    fn main_finishing_first_is_natural() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "Short", ELEVATOR, Some(1)).until(Trigger::never());
        assert!(rig.step(&mut b).is_ok_and(|done| !done), "not started yet");
        rig.start(&mut b).unwrap();
        assert!(rig.step(&mut b).unwrap());
        assert_eq!(probe.ends("Short"), vec![false]);
    }

    #[test]
    fn condition_sees_mode_state() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "Hold", WRIST, None).until(Trigger::mode_is(GamePiece::Cube));
        rig.start(&mut b).unwrap();
        assert!(!rig.step(&mut b).unwrap());
        rig.mode = GamePiece::Cube;
        assert!(rig.step(&mut b).unwrap());
    }
}

// ── Conditional-select ────────────────────────────────────────────────────────

#[cfg(test)]
mod select_tests {
    use super::*;

    fn cone_cube(probe: &Probe, cone_req: ResourceSet, cube_req: ResourceSet) -> Behavior {
        Behavior::by_mode(
            "Intake",
            Behavior::new("ConeIntake", cone_req, probe.action("ConeIntake").finishing_after(1)),
            Behavior::new("CubeIntake", cube_req, probe.action("CubeIntake").finishing_after(1)),
        )
    }

    #[test]
    fn unresolved_requirements_are_the_union() {
        let probe = Probe::new();
        let b = cone_cube(&probe, ResourceSet::single(ELEVATOR), ResourceSet::single(SHOOTER));
        assert_eq!(b.requirements(), ResourceSet::from([ELEVATOR, SHOOTER]));
        assert_eq!(b.selected_branch(), None);
    }

    #[test]
    fn resolve_narrows_to_chosen_branch() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        rig.mode = GamePiece::Cube;
        let mut b = cone_cube(&probe, ResourceSet::single(ELEVATOR), ResourceSet::single(SHOOTER));
        rig.start(&mut b).unwrap();
        assert_eq!(b.selected_branch(), Some(false));
        assert_eq!(b.requirements(), ResourceSet::single(SHOOTER));
        rig.run_to_end(&mut b, 5);
        assert_eq!(probe.inits("ConeIntake"), 0);
        assert_eq!(probe.inits("CubeIntake"), 1);
        assert_eq!(probe.ends("CubeIntake"), vec![false]);
    }

    #[test]
    fn choice_is_not_reevaluated_mid_run() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = Behavior::by_mode(
            "Hold",
            Behavior::new("Cone", WRIST, probe.action("Cone")),
            Behavior::new("Cube", WRIST, probe.action("Cube")),
        );
        rig.start(&mut b).unwrap();
        rig.step(&mut b).unwrap();
        rig.mode = GamePiece::Cube;
        rig.step(&mut b).unwrap();
        rig.end(&mut b, true).unwrap();
        assert_eq!(probe.executes("Cone"), 2);
        assert_eq!(probe.executes("Cube"), 0);
        assert_eq!(probe.ends("Cone"), vec![true]);
    }

    #[test]
    fn nested_select_resolves_when_reached() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let set_cube = Behavior::instant("SetCube", ELEVATOR, |_, fx| {
            fx.set_mode(GamePiece::Cube);
            Ok(())
        });
        let mut seq = set_cube.and_then(Behavior::by_mode(
            "Place",
            Behavior::new("PlaceCone", WRIST, probe.action("PlaceCone").finishing_after(1)),
            Behavior::new("PlaceCube", WRIST, probe.action("PlaceCube").finishing_after(1)),
        ));
        rig.start(&mut seq).unwrap();
        // Apply the mode request the way the scheduler would.
        for req in rig.requests.drain(..) {
            if let Request::SetMode(piece) = req {
                rig.mode = piece;
            }
        }
        rig.run_to_end(&mut seq, 5);
        assert_eq!(probe.inits("PlaceCube"), 1);
        assert_eq!(probe.inits("PlaceCone"), 0);
    }

    #[test]
    fn resolve_twice_keeps_first_choice() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = cone_cube(&probe, ResourceSet::single(ELEVATOR), ResourceSet::single(SHOOTER));
        rig.with(ResourceSet::EMPTY, |ctx, _| b.resolve(ctx));
        rig.mode = GamePiece::Cube;
        rig.with(ResourceSet::EMPTY, |ctx, _| b.resolve(ctx));
        assert_eq!(b.selected_branch(), Some(true));
        assert_eq!(b.requirements(), ResourceSet::single(ELEVATOR));
    }
}

// ── Timeout / then-schedule ───────────────────────────────────────────────────

#[cfg(test)]
mod timeout_tests {
    use super::*;

    #[test]
    fn times_out_with_interrupted_inner() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "Spin", SHOOTER, None).with_timeout(3);
        rig.start(&mut b).unwrap();
        assert_eq!(rig.run_to_end(&mut b, 10), 3);
        assert_eq!(probe.executes("Spin"), 3);
        assert_eq!(probe.ends("Spin"), vec![true]);
    }

    #[test]
    fn inner_finishing_first_is_natural() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = probe_behavior(&probe, "Spin", SHOOTER, Some(1)).with_timeout(3);
        rig.start(&mut b).unwrap();
        assert_eq!(rig.run_to_end(&mut b, 10), 1);
        assert_eq!(probe.ends("Spin"), vec![false]);
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;

    fn pickup_then_settle(probe: &Probe) -> Behavior {
        let settle_probe = probe.clone();
        probe_behavior(probe, "Pickup", ELEVATOR, Some(2)).then_schedule(factory(move || {
            Behavior::new("Settle", ELEVATOR, settle_probe.action("Settle"))
        }))
    }

    #[test]
    fn natural_finish_requests_next() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = pickup_then_settle(&probe);
        rig.start(&mut b).unwrap();
        rig.run_to_end(&mut b, 5);
        assert_eq!(rig.requests.len(), 1);
        assert!(matches!(&rig.requests[0], Request::Schedule(next) if next.name() == "Settle"));
    }

    #[test]
    fn cancellation_requests_nothing() {
        let probe = Probe::new();
        let mut rig = Rig::new();
        let mut b = pickup_then_settle(&probe);
        rig.start(&mut b).unwrap();
        rig.step(&mut b).unwrap();
        rig.end(&mut b, true).unwrap();
        assert!(rig.requests.is_empty());
        assert_eq!(probe.ends("Pickup"), vec![true]);
        assert!(probe.events().iter().all(|e| !matches!(e, ProbeEvent::Init(n) if n == "Settle")));
    }

    #[test]
    fn runs_when_disabled_propagates_through_wrappers() {
        let probe = Probe::new();
        let b = probe_behavior(&probe, "Led", SHOOTER, None)
            .ignoring_disable(true)
            .with_timeout(5)
            .until(Trigger::never());
        assert!(b.runs_when_disabled());
        let seq = Behavior::sequence(
            "Mixed",
            vec![
                probe_behavior(&probe, "A", WRIST, None).ignoring_disable(true),
                probe_behavior(&probe, "B", WRIST, None),
            ],
        );
        assert!(!seq.runs_when_disabled());
    }
}
