//! robot — a simulated competition robot on the arbiter behavior core.
//!
//! Six simulated subsystems, two control profiles, and a scripted thirty
//! second teleop session.  The robot boots disabled (only the indicator
//! and camera defaults, the boot animation and the steer reseed run), is
//! enabled after two seconds, then the driver script plays out.
//!
//! ```text
//! cargo run -p robot                          # gamepad profile
//! cargo run -p robot -- --joystick            # flight-stick profile
//! cargo run -p robot -- --config robot.json   # SchedulerConfig as JSON
//! ```
//!
//! Telemetry lands in `output/robot/telemetry.csv` unless `--output` says
//! otherwise.

mod behaviors;
mod controls;
mod session;
mod subsystems;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use arb_behavior::BehaviorError;
use arb_core::{BehaviorId, Cycle, GamePiece, SchedulerConfig};
use arb_input::FixedVision;
use arb_resource::{ResourceSet, ResourceTableBuilder};
use arb_sched::{CycleSummary, EndReason, Occupancy, SchedulerBuilder, SchedulerObserver};
use arb_telemetry::{CsvTelemetry, TelemetryObserver};

use controls::Profile;
use subsystems::Subsystems;

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR:      &str = "output/robot";
const SESSION_CYCLES:  u64  = 1_500; // 30 s at 50 Hz
const DISABLED_CYCLES: u64  = 100;

// ── Command line ──────────────────────────────────────────────────────────────

/// Run the demo robot through its scripted teleop session.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Use the flight-stick profile instead of the gamepad.
    #[arg(long)]
    joystick: bool,

    /// `SchedulerConfig` as JSON.  Without it the robot boots disabled with
    /// a 5 ms overrun budget.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for `telemetry.csv`.
    #[arg(long, default_value = OUTPUT_DIR)]
    output: PathBuf,
}

impl Args {
    fn profile(&self) -> Profile {
        if self.joystick { Profile::Joystick } else { Profile::Gamepad }
    }
}

fn load_config(path: Option<&Path>) -> Result<SchedulerConfig> {
    let Some(path) = path else {
        return Ok(SchedulerConfig {
            total_cycles:      SESSION_CYCLES,
            overrun_budget_us: 5_000,
            start_enabled:     false,
            ..SchedulerConfig::default()
        });
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── Observer wrapper to count events ─────────────────────────────────────────

struct CountingObserver<O: SchedulerObserver> {
    inner:  O,
    starts: BTreeMap<String, usize>,
    ends:   BTreeMap<&'static str, usize>,
    faults: Vec<String>,
    cycles: u64,
}

impl<O: SchedulerObserver> CountingObserver<O> {
    fn new(inner: O) -> Self {
        Self { inner, starts: BTreeMap::new(), ends: BTreeMap::new(), faults: Vec::new(), cycles: 0 }
    }
}

impl<O: SchedulerObserver> SchedulerObserver for CountingObserver<O> {
    fn on_cycle_start(&mut self, cycle: Cycle) {
        self.inner.on_cycle_start(cycle);
    }

    fn on_behavior_start(&mut self, cycle: Cycle, id: BehaviorId, name: &str, requirements: ResourceSet) {
        *self.starts.entry(name.to_owned()).or_default() += 1;
        self.inner.on_behavior_start(cycle, id, name, requirements);
    }

    fn on_behavior_end(&mut self, cycle: Cycle, id: BehaviorId, name: &str, reason: EndReason) {
        let key = match reason {
            EndReason::Finished => "finished",
            EndReason::Cancelled => "cancelled",
            EndReason::Preempted => "preempted",
            EndReason::Faulted => "faulted",
            EndReason::Disabled => "disabled",
        };
        *self.ends.entry(key).or_default() += 1;
        self.inner.on_behavior_end(cycle, id, name, reason);
    }

    fn on_mode_change(&mut self, cycle: Cycle, from: GamePiece, to: GamePiece) {
        log::info!("{cycle}: mode {} -> {}", from.as_str(), to.as_str());
        self.inner.on_mode_change(cycle, from, to);
    }

    fn on_enabled_change(&mut self, cycle: Cycle, enabled: bool) {
        log::info!("{cycle}: {}", if enabled { "enabled" } else { "disabled" });
        self.inner.on_enabled_change(cycle, enabled);
    }

    fn on_fault(&mut self, cycle: Cycle, behavior: &str, error: &BehaviorError) {
        self.faults.push(format!("{cycle} {behavior}: {error}"));
        self.inner.on_fault(cycle, behavior, error);
    }

    fn on_overrun(&mut self, cycle: Cycle, elapsed_us: u64, budget_us: u64) {
        self.inner.on_overrun(cycle, elapsed_us, budget_us);
    }

    fn on_cycle_end(&mut self, summary: &CycleSummary) {
        self.cycles += 1;
        self.inner.on_cycle_end(summary);
    }

    fn on_occupancy(&mut self, cycle: Cycle, table: &[Occupancy<'_>]) {
        self.inner.on_occupancy(cycle, table);
    }

    fn on_run_end(&mut self, final_cycle: Cycle) {
        self.inner.on_run_end(final_cycle);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Command line and scheduler config.
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    config.validate()?;

    println!("=== robot — arbiter behavior core ===");
    println!(
        "Period: {} ms  |  Cycles: {}  |  Overrun budget: {} us",
        config.period_ms, config.total_cycles, config.overrun_budget_us
    );
    println!();

    // 2. Register the subsystems.
    let mut table = ResourceTableBuilder::new();
    let (s, handles) = Subsystems::register(&mut table, config.period_ms)?;
    let table = table.build();
    println!("Resources: {}", table.count);

    // 3. Load the control profile.
    let controls = Arc::new(args.profile().load()?);
    println!("Profile {:?}: {} roles bound", controls.name, controls.roles().len());

    // 4. Wire defaults and triggers.
    let vision = FixedVision::new();
    let mut builder = SchedulerBuilder::new(config.clone(), table);
    builder.vision(vision.clone()).initial_mode(GamePiece::Cone);
    controls::wire_defaults(&mut builder, s, &controls);
    controls::wire_bindings(&mut builder, s, &controls, &vision);
    let mut scheduler = builder.build()?;

    // 5. Boot animation and steer reseed; both run while disabled.
    scheduler.schedule(behaviors::boot_animation(s));
    let reseed = (!config.start_enabled).then(|| scheduler.schedule(behaviors::disabled_reseed(s)));

    // 6. Set up telemetry.
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let sink = CsvTelemetry::new(&args.output)?;
    let mut obs = CountingObserver::new(TelemetryObserver::new(sink));

    // 7. Run: disabled, then enabled for the rest of the session.
    let mut driver = session::match_session(handles.shooter.clone(), vision.clone());
    println!(
        "Session: {} keyframes, {} world events",
        driver.keyframes(),
        driver.event_count()
    );
    println!();

    let t0 = Instant::now();
    if !config.start_enabled {
        scheduler.run_cycles(DISABLED_CYCLES.min(config.total_cycles), &mut driver, &mut obs)?;
        if let Some(id) = reseed {
            scheduler.cancel(id);
        }
        scheduler.set_enabled(true);
    }
    scheduler.run(&mut driver, &mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("telemetry error: {e}");
    }

    // 8. Summary.
    println!("Session complete in {:.3} s", elapsed.as_secs_f64());
    println!("  robot clock : {}", scheduler.clock);
    println!("  cycles      : {}", obs.cycles);
    println!("  telemetry   : {} rows", obs.inner.sink().rows_written());
    println!("  faults      : {}", scheduler.fault_count());
    println!("  overruns    : {}", scheduler.overrun_count());
    println!("  final mode  : {}", scheduler.mode().as_str());
    for fault in &obs.faults {
        println!("    {fault}");
    }
    println!();

    println!("{:<28} {:>6}", "Behavior", "Starts");
    println!("{}", "-".repeat(35));
    for (name, n) in &obs.starts {
        println!("{name:<28} {n:>6}");
    }
    println!();

    let ends: Vec<String> = obs.ends.iter().map(|(k, n)| format!("{k}={n}")).collect();
    println!("Ends: {}", ends.join("  "));
    println!();

    // 9. Final resource table.
    println!("{:<12} {:<22} {:>9} {:>8}", "Resource", "Running", "Position", "Pattern");
    println!("{}", "-".repeat(54));
    for (name, id, handle) in &handles.all {
        let state = handle.snapshot();
        println!(
            "{:<12} {:<22} {:>9.3} {:>8}",
            name,
            scheduler.running_on(*id).unwrap_or("-"),
            state.position,
            state.pattern.map_or_else(|| "-".to_owned(), |p| p.to_string()),
        );
    }

    Ok(())
}
