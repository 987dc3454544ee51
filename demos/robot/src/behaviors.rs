//! Behaviors of the demo robot.
//!
//! Defaults come first, then the hold-to-run manual controls, then the
//! multi-resource intake and scoring routines.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use arb_behavior::{Behavior, BehaviorContext, BehaviorResult, Effects, FnAction};
use arb_core::{GamePiece, ResourceId};
use arb_input::{ControlBindings, TargetProfile, Trigger};
use arb_resource::ActuatorCommand;

use crate::subsystems::*;

// ── Drive helpers ─────────────────────────────────────────────────────────────

/// Rotate a field-relative request into the robot frame.
pub fn field_to_robot(vx: f64, vy: f64, omega: f64, heading_rad: f64) -> ActuatorCommand {
    let (sin, cos) = heading_rad.sin_cos();
    ActuatorCommand::Chassis {
        vx_mps:    vx * cos + vy * sin,
        vy_mps:    -vx * sin + vy * cos,
        omega_rps: omega,
    }
}

fn wrap_angle(rad: f64) -> f64 {
    (rad + PI).rem_euclid(TAU) - PI
}

fn translation(controls: &ControlBindings, ctx: &BehaviorContext<'_>, scale: f64) -> (f64, f64) {
    (
        controls.axis_value("translation_x", ctx.inputs) * MAX_SPEED_MPS * scale,
        controls.axis_value("translation_y", ctx.inputs) * MAX_SPEED_MPS * scale,
    )
}

/// True while the driver deflects any drive axis past half travel.  A
/// profile with no drive axes never asks for control back.
pub fn driver_wants_control(controls: &ControlBindings) -> Trigger {
    ["translation_x", "translation_y", "omega"]
        .iter()
        .filter_map(|role| controls.axis(role))
        .map(|axis| axis.active(0.5))
        .reduce(Trigger::or)
        .unwrap_or_else(Trigger::never)
}

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Field-oriented drive from the translation and rotation axes.
pub fn field_oriented_drive(s: Subsystems, controls: Arc<ControlBindings>) -> Behavior {
    Behavior::run("FieldOrientedDrive", s.drivetrain, move |ctx, fx| {
        let (vx, vy) = translation(&controls, ctx, 1.0);
        let omega = controls.axis_value("omega", ctx.inputs) * MAX_OMEGA_RPS;
        let heading = ctx.vision.current_pose().heading_rad;
        fx.apply(s.drivetrain, field_to_robot(vx, vy, omega, heading))?;
        Ok(())
    })
}

/// Field-oriented translation with the right stick pointing the robot at a
/// field heading.  A centred stick holds the current heading.
pub fn field_heading_drive(s: Subsystems, controls: Arc<ControlBindings>) -> Behavior {
    Behavior::run("FieldHeadingDrive", s.drivetrain, move |ctx, fx| {
        let (vx, vy) = translation(&controls, ctx, 1.0);
        let hx = controls.axis_value("heading_x", ctx.inputs);
        let hy = controls.axis_value("heading_y", ctx.inputs);
        let heading = ctx.vision.current_pose().heading_rad;
        let omega = if hx.hypot(hy) > 0.5 {
            (HEADING_KP * wrap_angle(hy.atan2(hx) - heading)).clamp(-MAX_OMEGA_RPS, MAX_OMEGA_RPS)
        } else {
            0.0
        };
        fx.apply(s.drivetrain, field_to_robot(vx, vy, omega, heading))?;
        Ok(())
    })
}

pub fn park_wrist(s: Subsystems) -> Behavior {
    Behavior::run("ParkWrist", s.wrist, move |_, fx| {
        fx.apply(s.wrist, ActuatorCommand::Position(WRIST_PARKED))?;
        Ok(())
    })
}

/// Lower the elevator once the wrist is tucked; otherwise hold still.
pub fn settle_elevator(s: Subsystems) -> Behavior {
    Behavior::run("SettleElevator", s.elevator, move |ctx, fx| {
        let parked = ctx
            .observed(s.wrist)
            .is_some_and(|w| (w.position - WRIST_PARKED).abs() < WRIST_PARK_TOLERANCE);
        if parked {
            fx.apply(s.elevator, ActuatorCommand::Position(0.0))?;
        } else {
            fx.stop(s.elevator)?;
        }
        Ok(())
    })
}

pub fn idle_shooter(s: Subsystems) -> Behavior {
    Behavior::run("IdleShooter", s.shooter, move |ctx, fx| {
        if ctx.sensor(s.shooter) {
            fx.apply(s.shooter, ActuatorCommand::DutyCycle(HOLD_DUTY))?;
        } else {
            fx.stop(s.shooter)?;
        }
        Ok(())
    })
}

/// Shows what the robot holds, or the idle colours when empty.  Keeps
/// running while disabled.
pub fn game_piece_led(s: Subsystems) -> Behavior {
    Behavior::run("GamePieceLed", s.indicator, move |ctx, fx| {
        let shown = match (ctx.sensor(s.shooter), ctx.mode) {
            (true, GamePiece::Cone) => pattern::HAS_CONE,
            (true, GamePiece::Cube) => pattern::HAS_CUBE,
            (false, _) => pattern::BLUE_GOLD,
        };
        fx.apply(s.indicator, ActuatorCommand::Pattern(shown))?;
        Ok(())
    })
    .ignoring_disable(true)
}

/// Picks the camera pipeline: scoring targets while holding a piece,
/// floor pickup targets otherwise.
pub fn aim_camera(s: Subsystems) -> Behavior {
    Behavior::run("AimCamera", s.camera, move |ctx, fx| {
        let profile = camera_profile(ctx.sensor(s.shooter), ctx.mode);
        fx.apply(s.camera, ActuatorCommand::Pattern(profile.pipeline()))?;
        Ok(())
    })
    .ignoring_disable(true)
}

pub fn camera_profile(holding: bool, mode: GamePiece) -> TargetProfile {
    match (holding, mode) {
        (true, GamePiece::Cone) => TargetProfile::ScoreConeMiddle,
        (true, GamePiece::Cube) => TargetProfile::ScoreCube,
        (false, GamePiece::Cone) => TargetProfile::PickupConeFloor,
        (false, GamePiece::Cube) => TargetProfile::PickupCubeFloor,
    }
}

// ── Manual controls ───────────────────────────────────────────────────────────

/// Drive `resource` at `duty` while held; stop on release.
pub fn hold_duty(name: &str, resource: ResourceId, duty: f64) -> Behavior {
    Behavior::start_end(
        name,
        resource,
        move |_, fx| Ok(fx.apply(resource, ActuatorCommand::DutyCycle(duty))?),
        move |_, fx| Ok(fx.stop(resource)?),
    )
}

/// Lock the wheels until the driver moves a stick.
pub fn wheels_to_x(s: Subsystems, controls: &ControlBindings) -> Behavior {
    Behavior::run("WheelsToX", s.drivetrain, move |_, fx| {
        fx.apply(s.drivetrain, ActuatorCommand::Chassis { vx_mps: 0.0, vy_mps: 0.0, omega_rps: 0.0 })?;
        Ok(())
    })
    .until(driver_wants_control(controls))
}

/// Re-zero the drivetrain encoders.
pub fn reseed_steer(s: Subsystems) -> Behavior {
    Behavior::instant("ReseedSteer", s.drivetrain, move |_, fx| {
        fx.stop(s.drivetrain)?;
        Ok(())
    })
}

/// Keeps the drivetrain while disabled and re-zeroes the steer encoders
/// once a second, starting on its first cycle.  Cancelled on enable.
pub fn disabled_reseed(s: Subsystems) -> Behavior {
    let every = s.cycles(RESEED_PERIOD_MS).max(1);
    let mut since = None;
    Behavior::run("DisabledReseed", s.drivetrain, move |ctx, fx| {
        let first = *since.get_or_insert(ctx.cycle);
        if ctx.cycle.since(first) % every == 0 {
            log::debug!("{}: reseeding steer encoders", ctx.cycle);
            fx.stop(s.drivetrain)?;
        }
        Ok(())
    })
    .ignoring_disable(true)
}

/// Blink the "bring me a piece" pattern for a second.
pub fn want_game_piece(s: Subsystems, piece: GamePiece) -> Behavior {
    let (name, shown) = match piece {
        GamePiece::Cone => ("WantCone", pattern::WANT_CONE),
        GamePiece::Cube => ("WantCube", pattern::WANT_CUBE),
    };
    Behavior::run(name, s.indicator, move |ctx, fx| {
        let lit = (ctx.cycle.0 / 5) % 2 == 0;
        fx.apply(s.indicator, ActuatorCommand::Pattern(if lit { shown } else { pattern::OFF }))?;
        Ok(())
    })
    .with_timeout(s.cycles(WANT_PIECE_MS))
    .named(name)
}

pub fn boot_animation(s: Subsystems) -> Behavior {
    let frame_cycles = s.cycles(BOOT_FRAME_MS);
    let frames = (0..BOOT_FRAMES)
        .map(|i| {
            Behavior::run(&format!("BootFrame{i}"), s.indicator, move |_, fx| {
                fx.apply(s.indicator, ActuatorCommand::Pattern(pattern::BOOT_BASE + i))?;
                Ok(())
            })
            .with_timeout(frame_cycles)
        })
        .collect();
    Behavior::sequence("BootAnimation", frames).ignoring_disable(true)
}

// ── Intake ────────────────────────────────────────────────────────────────────

type EndFn = Box<dyn FnMut(bool, &BehaviorContext<'_>, &mut Effects<'_>) -> BehaviorResult<()> + Send>;

fn stop_intake(s: Subsystems) -> EndFn {
    Box::new(move |_: bool, _: &BehaviorContext<'_>, fx: &mut Effects<'_>| -> BehaviorResult<()> {
        fx.stop(s.shooter)?;
        fx.stop(s.drivetrain)?;
        Ok(())
    })
}

/// Floor pickup with the driver steering at reduced speed; finishes when
/// the beam break sees a piece, then parks the wrist.
pub fn manual_intake(s: Subsystems, controls: Arc<ControlBindings>) -> Behavior {
    let requirements = [s.drivetrain, s.elevator, s.wrist, s.shooter];
    let pickup = FnAction::new()
        .on_execute(move |ctx, fx| {
            fx.apply(s.elevator, ActuatorCommand::Position(PICKUP_ELEVATOR))?;
            fx.apply(s.wrist, ActuatorCommand::Position(PICKUP_WRIST))?;
            fx.apply(s.shooter, ActuatorCommand::DutyCycle(INTAKE_DUTY))?;
            let (vx, vy) = translation(&controls, ctx, PICKUP_SPEED_SCALE);
            let omega = controls.axis_value("omega", ctx.inputs) * MAX_OMEGA_RPS * PICKUP_SPEED_SCALE;
            fx.apply(s.drivetrain, field_to_robot(vx, vy, omega, ctx.vision.current_pose().heading_rad))?;
            Ok(())
        })
        .on_end(stop_intake(s))
        .finish_when(move |ctx, _| ctx.sensor(s.shooter));
    Behavior::new("TeleopPickup", requirements, pickup).and_then(park_wrist(s))
}

/// Vision-guided floor pickup.  With no target in view the chassis holds
/// still while the intake keeps running.
fn vision_pickup(s: Subsystems, name: &str, profile: TargetProfile) -> Behavior {
    let requirements = [s.drivetrain, s.elevator, s.wrist, s.shooter];
    let pickup = FnAction::new()
        .on_execute(move |ctx, fx| {
            fx.apply(s.elevator, ActuatorCommand::Position(PICKUP_ELEVATOR))?;
            fx.apply(s.wrist, ActuatorCommand::Position(PICKUP_WRIST))?;
            fx.apply(s.shooter, ActuatorCommand::DutyCycle(INTAKE_DUTY))?;
            let drive = match ctx.vision.target_offset(profile) {
                Some(offset) => ActuatorCommand::Chassis {
                    vx_mps:    APPROACH_MPS,
                    vy_mps:    0.0,
                    omega_rps: -AIM_KP * offset.horizontal_deg.to_radians(),
                },
                None => ActuatorCommand::Chassis { vx_mps: 0.0, vy_mps: 0.0, omega_rps: 0.0 },
            };
            fx.apply(s.drivetrain, drive)?;
            Ok(())
        })
        .on_end(stop_intake(s))
        .finish_when(move |ctx, _| ctx.sensor(s.shooter));
    Behavior::new(name, requirements, pickup).and_then(park_wrist(s))
}

pub fn auto_intake(s: Subsystems) -> Behavior {
    Behavior::by_mode(
        "AutoIntake",
        vision_pickup(s, "PickupCone", TargetProfile::PickupConeFloor),
        vision_pickup(s, "PickupCube", TargetProfile::PickupCubeFloor),
    )
}

/// Raise to the double substation and intake until a piece arrives.
pub fn double_station(s: Subsystems) -> Behavior {
    let requirements = [s.drivetrain, s.elevator, s.wrist, s.shooter];
    let station = FnAction::new()
        .on_execute(move |ctx, fx| {
            fx.apply(s.elevator, ActuatorCommand::Position(DOUBLE_STATION_ELEVATOR))?;
            fx.apply(s.wrist, ActuatorCommand::Position(DOUBLE_STATION_WRIST))?;
            fx.apply(s.shooter, ActuatorCommand::DutyCycle(INTAKE_DUTY))?;
            let omega = ctx
                .vision
                .target_offset(TargetProfile::PickupConeDoubleStation)
                .map_or(0.0, |o| -AIM_KP * o.horizontal_deg.to_radians());
            fx.apply(s.drivetrain, ActuatorCommand::Chassis { vx_mps: 0.0, vy_mps: 0.0, omega_rps: omega })?;
            Ok(())
        })
        .on_end(stop_intake(s))
        .finish_when(move |ctx, _| ctx.sensor(s.shooter));
    Behavior::new("DoubleStation", requirements, station)
}

/// Back away from the substation while the elevator comes down.
pub fn after_double_station(s: Subsystems) -> Behavior {
    let retreat = FnAction::new()
        .on_execute(move |_, fx| {
            fx.apply(s.elevator, ActuatorCommand::Position(0.0))?;
            fx.apply(s.wrist, ActuatorCommand::Position(WRIST_PARKED))?;
            fx.apply(s.drivetrain, ActuatorCommand::Chassis { vx_mps: -0.5, vy_mps: 0.0, omega_rps: 0.0 })?;
            Ok(())
        })
        .on_end(move |_, _, fx| Ok(fx.stop(s.drivetrain)?))
        .finish_when(move |ctx, _| {
            ctx.observed(s.elevator).is_some_and(|e| e.position.abs() < ELEVATOR_TOLERANCE)
        });
    Behavior::new("AfterDoubleStation", [s.drivetrain, s.elevator, s.wrist], retreat)
        .with_timeout(s.cycles(AFTER_DOUBLE_STATION_MS))
        .named("AfterDoubleStation")
}

// ── Scoring ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShotLevel {
    High,
    Mid,
    Low,
}

struct Shot {
    elevator: f64,
    wrist:    f64,
    duty:     f64,
}

impl ShotLevel {
    fn name(self) -> &'static str {
        match self {
            ShotLevel::High => "High",
            ShotLevel::Mid => "Mid",
            ShotLevel::Low => "Low",
        }
    }

    fn shot(self, piece: GamePiece) -> Shot {
        match (self, piece) {
            (ShotLevel::High, GamePiece::Cone) => Shot { elevator: 1.20, wrist: 0.60, duty: 0.30 },
            (ShotLevel::High, GamePiece::Cube) => Shot { elevator: 1.10, wrist: 0.50, duty: 0.48 },
            (ShotLevel::Mid, GamePiece::Cone) => Shot { elevator: 0.85, wrist: 0.55, duty: 0.25 },
            (ShotLevel::Mid, GamePiece::Cube) => Shot { elevator: 0.70, wrist: 0.45, duty: 0.35 },
            (ShotLevel::Low, _) => Shot { elevator: 0.0, wrist: 0.40, duty: 0.25 },
        }
    }
}

/// Raise to the scoring pose, then eject for a fixed window.
fn shoot_piece(s: Subsystems, level: ShotLevel, piece: GamePiece) -> Behavior {
    let Shot { elevator, wrist, duty } = level.shot(piece);
    let name = format!("Shoot{}{}", level.name(), if piece == GamePiece::Cone { "Cone" } else { "Cube" });

    let raise = FnAction::new()
        .on_execute(move |_, fx| {
            fx.apply(s.elevator, ActuatorCommand::Position(elevator))?;
            fx.apply(s.wrist, ActuatorCommand::Position(wrist))?;
            Ok(())
        })
        .finish_when(move |ctx, _| {
            ctx.observed(s.elevator).is_some_and(|e| (e.position - elevator).abs() < ELEVATOR_TOLERANCE)
        });
    let eject = Behavior::run(&format!("{name}Eject"), s.shooter, move |_, fx| {
        fx.apply(s.shooter, ActuatorCommand::DutyCycle(duty))?;
        Ok(())
    })
    .with_timeout(s.cycles(EJECT_MS));

    Behavior::new(&format!("{name}Raise"), [s.elevator, s.wrist], raise)
        .with_timeout(s.cycles(RAISE_TIMEOUT_MS))
        .and_then(eject)
        .named(&name)
}

/// Shoot whatever is held at `level`.  A held piece in cone mode is shot
/// as a cone, everything else as a cube.
pub fn shoot(s: Subsystems, level: ShotLevel) -> Behavior {
    Behavior::select(
        &format!("Shoot{}", level.name()),
        move |ctx| ctx.sensor(s.shooter) && ctx.mode == GamePiece::Cone,
        shoot_piece(s, level, GamePiece::Cone),
        shoot_piece(s, level, GamePiece::Cube),
    )
}
