//! Control profiles and trigger wiring.
//!
//! Two profiles ship with the robot.  Both read a driver and an operator
//! controller out of the same input frame (`driver.*` / `operator.*`
//! sources).  The joystick profile has no heading stick, so the roles that
//! need one stay unbound and their bindings are skipped.

use std::io::Cursor;
use std::sync::Arc;

use arb_behavior::factory;
use arb_core::{GamePiece, Pose2d};
use arb_input::{ControlBindings, FixedVision, InputResult, load_bindings_reader};
use arb_sched::SchedulerBuilder;

use crate::behaviors::{self, ShotLevel};
use crate::subsystems::Subsystems;

// ── Profiles ──────────────────────────────────────────────────────────────────

const GAMEPAD_CSV: &str = "\
role,kind,source,threshold,deadband,scale,inverted\n\
translation_x,axis,driver.left_y,,0.1,1.0,true\n\
translation_y,axis,driver.left_x,,0.1,1.0,true\n\
omega,axis,driver.right_x,,0.1,1.0,true\n\
heading_x,axis,driver.right_y,,0.1,1.0,true\n\
heading_y,axis,driver.right_x,,0.1,1.0,true\n\
reset_pose,button,driver.back,,,,\n\
reseed_steer,button,driver.start,,,,\n\
field_oriented,button,driver.pov_up,,,,\n\
field_heading,button,driver.pov_down,,,,\n\
wheels_to_x,button,driver.x,,,,\n\
manual_intake,button,driver.right_bumper,,,,\n\
auto_intake,button,driver.left_bumper,,,,\n\
double_station,button,driver.y,,,,\n\
cancel,button,driver.b,,,,\n\
cone_mode,button,operator.left_bumper,,,,\n\
cube_mode,button,operator.right_bumper,,,,\n\
elevator_up,axis_above,operator.right_trigger,0.5,,,\n\
elevator_down,axis_above,operator.left_trigger,0.5,,,\n\
wrist_up,button,operator.pov_up,,,,\n\
wrist_down,button,operator.pov_down,,,,\n\
shooter_in,button,operator.x,,,,\n\
shooter_out,button,operator.b,,,,\n\
shoot_high,button,operator.y,,,,\n\
shoot_mid,button,operator.a,,,,\n\
shoot_low,button,operator.start,,,,\n\
";

const JOYSTICK_CSV: &str = "\
role,kind,source,threshold,deadband,scale,inverted\n\
translation_x,axis,driver.stick_y,,0.08,1.0,true\n\
translation_y,axis,driver.stick_x,,0.08,1.0,true\n\
omega,axis,driver.twist,,0.15,0.7,true\n\
reset_pose,button,driver.button_7,,,,\n\
reseed_steer,button,driver.button_8,,,,\n\
wheels_to_x,button,driver.button_3,,,,\n\
manual_intake,button,driver.trigger,,,,\n\
auto_intake,button,driver.thumb,,,,\n\
cancel,button,driver.button_4,,,,\n\
cone_mode,button,operator.left_bumper,,,,\n\
cube_mode,button,operator.right_bumper,,,,\n\
elevator_up,axis_above,operator.right_trigger,0.5,,,\n\
elevator_down,axis_above,operator.left_trigger,0.5,,,\n\
wrist_up,button,operator.pov_up,,,,\n\
wrist_down,button,operator.pov_down,,,,\n\
shooter_in,button,operator.x,,,,\n\
shooter_out,button,operator.b,,,,\n\
shoot_high,button,operator.y,,,,\n\
shoot_mid,button,operator.a,,,,\n\
shoot_low,button,operator.start,,,,\n\
";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Profile {
    Gamepad,
    Joystick,
}

impl Profile {
    pub fn load(self) -> InputResult<ControlBindings> {
        match self {
            Profile::Gamepad => load_bindings_reader(Cursor::new(GAMEPAD_CSV), "gamepad"),
            Profile::Joystick => load_bindings_reader(Cursor::new(JOYSTICK_CSV), "joystick"),
        }
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// One default per resource.
pub fn wire_defaults(builder: &mut SchedulerBuilder, s: Subsystems, controls: &Arc<ControlBindings>) {
    let drive = Arc::clone(controls);
    builder
        .set_default(s.drivetrain, factory(move || behaviors::field_oriented_drive(s, Arc::clone(&drive))))
        .set_default(s.elevator, factory(move || behaviors::settle_elevator(s)))
        .set_default(s.wrist, factory(move || behaviors::park_wrist(s)))
        .set_default(s.shooter, factory(move || behaviors::idle_shooter(s)))
        .set_default(s.indicator, factory(move || behaviors::game_piece_led(s)))
        .set_default(s.camera, factory(move || behaviors::aim_camera(s)));
}

/// Bind every role the profile provides.
pub fn wire_bindings(
    builder: &mut SchedulerBuilder,
    s: Subsystems,
    controls: &Arc<ControlBindings>,
    vision: &FixedVision,
) {
    // ── Drive ─────────────────────────────────────────────────────────────
    let pose = vision.clone();
    builder.bind_role(controls, "reset_pose").on_true_do(move |_| {
        log::info!("pose reset to origin");
        pose.set_pose(Pose2d::default());
    });
    builder
        .bind_role(controls, "reseed_steer")
        .on_true(factory(move || behaviors::reseed_steer(s)));

    let oriented = Arc::clone(controls);
    builder.bind_role(controls, "field_oriented").on_true_do(move |ctl| {
        let c = Arc::clone(&oriented);
        ctl.set_default(s.drivetrain, factory(move || behaviors::field_oriented_drive(s, Arc::clone(&c))));
    });
    let heading = Arc::clone(controls);
    builder.bind_role(controls, "field_heading").on_true_do(move |ctl| {
        let c = Arc::clone(&heading);
        ctl.set_default(s.drivetrain, factory(move || behaviors::field_heading_drive(s, Arc::clone(&c))));
    });

    let x_lock = Arc::clone(controls);
    builder
        .bind_role(controls, "wheels_to_x")
        .on_true(factory(move || behaviors::wheels_to_x(s, &x_lock)));
    builder.bind_role(controls, "cancel").on_true_do(|ctl| ctl.cancel_all());

    // ── Intake ────────────────────────────────────────────────────────────
    let intake = Arc::clone(controls);
    builder
        .bind_role(controls, "manual_intake")
        .while_true(factory(move || behaviors::manual_intake(s, Arc::clone(&intake))));
    builder
        .bind_role(controls, "auto_intake")
        .while_true(factory(move || behaviors::auto_intake(s)));
    builder
        .bind_role(controls, "double_station")
        .while_true(factory(move || behaviors::double_station(s)))
        .on_false(factory(move || behaviors::after_double_station(s)));

    // ── Mode ──────────────────────────────────────────────────────────────
    for (role, piece) in [("cone_mode", GamePiece::Cone), ("cube_mode", GamePiece::Cube)] {
        builder.bind_role(controls, role).on_true_do(move |ctl| {
            ctl.set_mode(piece);
            ctl.schedule(behaviors::want_game_piece(s, piece));
        });
    }

    // ── Manual mechanism control ──────────────────────────────────────────
    let manual = [
        ("elevator_up", "ElevatorUp", s.elevator, 0.1),
        ("elevator_down", "ElevatorDown", s.elevator, -0.05),
        ("wrist_up", "WristUp", s.wrist, 0.2),
        ("wrist_down", "WristDown", s.wrist, -0.1),
        ("shooter_out", "ShooterOut", s.shooter, 0.4825),
        ("shooter_in", "ShooterIn", s.shooter, -0.15),
    ];
    for (role, name, resource, duty) in manual {
        builder
            .bind_role(controls, role)
            .while_true(factory(move || behaviors::hold_duty(name, resource, duty)));
    }

    // ── Scoring ───────────────────────────────────────────────────────────
    for (role, level) in [
        ("shoot_high", ShotLevel::High),
        ("shoot_mid", ShotLevel::Mid),
        ("shoot_low", ShotLevel::Low),
    ] {
        builder.bind_role(controls, role).on_true(factory(move || behaviors::shoot(s, level)));
    }
}
