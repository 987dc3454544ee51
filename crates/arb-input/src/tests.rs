//! Unit tests for arb-input.

use std::io::Cursor;

use arb_core::{Cycle, GamePiece, Pose2d, TargetOffset};

use crate::{
    load_bindings_reader, Axis, ControlBindings, EdgeDetector, FixedVision, InputError, InputFrame,
    InputSource, NoVision, ScriptedInputs, TargetProfile, Trigger, TriggerInput, VisionSource,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn sample(trigger: &Trigger, frame: &InputFrame, mode: GamePiece) -> bool {
    trigger.sample(&TriggerInput::new(frame, mode))
}

const PROFILE_CSV: &str = "\
role,kind,source,threshold,deadband,scale,inverted
wrist_up,button,y,,,,
elevator_up,axis_above,right_trigger,0.5,,,
elevator_down,axis_below,left_stick_y,-0.5,,,
translation_x,axis,left_y,,0.1,2.0,true
";

// ── InputFrame / ScriptedInputs ───────────────────────────────────────────────

#[cfg(test)]
mod frame_tests {
    use super::*;

    #[test]
    fn absent_controls_read_idle() {
        let frame = InputFrame::new();
        assert!(!frame.button("a"));
        assert_eq!(frame.axis("left_x"), 0.0);
    }

    #[test]
    fn set_overwrites() {
        let mut frame = InputFrame::new().with_button("a", true).with_axis("x", 0.3);
        frame.set_button("a", false);
        frame.set_axis("x", -0.7);
        assert!(!frame.button("a"));
        assert_eq!(frame.axis("x"), -0.7);
    }

    #[test]
    fn scripted_keyframes_hold_until_next() {
        let mut script = ScriptedInputs::new()
            .at(5, InputFrame::new().with_button("b", true))
            .at(1, InputFrame::new().with_axis("x", 1.0))
            .at(8, InputFrame::new());
        assert_eq!(script.len(), 3);
        assert_eq!(script.poll(Cycle(0)).axis("x"), 0.0);
        assert_eq!(script.poll(Cycle(1)).axis("x"), 1.0);
        assert_eq!(script.poll(Cycle(4)).axis("x"), 1.0);
        assert!(script.poll(Cycle(5)).button("b"));
        assert!(script.poll(Cycle(7)).button("b"));
        assert!(!script.poll(Cycle(8)).button("b"));
        assert!(!script.poll(Cycle(1000)).button("b"));
    }

    #[test]
    fn scripted_same_cycle_replaces() {
        let script = ScriptedInputs::new()
            .at(2, InputFrame::new().with_button("a", true))
            .at(2, InputFrame::new().with_button("b", true));
        assert_eq!(script.len(), 1);
        let frame = script.frame_at(Cycle(2));
        assert!(!frame.button("a"));
        assert!(frame.button("b"));
    }
}

// ── EdgeDetector ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod edge_tests {
    use super::*;

    #[test]
    fn rising_and_falling_from_consecutive_samples() {
        let mut det = EdgeDetector::new();
        let samples = [false, true, true, false, false, true];
        let edges: Vec<(bool, bool)> =
            samples.iter().map(|&s| { let e = det.update(s); (e.rising, e.falling) }).collect();
        assert_eq!(
            edges,
            vec![
                (false, false),
                (true, false),
                (false, false),
                (false, true),
                (false, false),
                (true, false),
            ]
        );
    }

    #[test]
    fn true_on_first_sample_is_a_rising_edge() {
        let mut det = EdgeDetector::new();
        let e = det.update(true);
        assert!(e.rising);
        assert!(e.level);
        assert!(det.previous());
    }

    #[test]
    fn false_at_start_is_not_a_falling_edge() {
        let mut det = EdgeDetector::new();
        assert!(!det.update(false).falling);
    }
}

// ── Trigger ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trigger_tests {
    use super::*;

    #[test]
    fn button_follows_frame() {
        let t = Trigger::button("a");
        assert!(sample(&t, &InputFrame::new().with_button("a", true), GamePiece::Cone));
        assert!(!sample(&t, &InputFrame::new(), GamePiece::Cone));
    }

    #[test]
    fn axis_thresholds_are_strict() {
        let above = Trigger::axis_above("rt", 0.5);
        let below = Trigger::axis_below("ly", -0.5);
        assert!(!sample(&above, &InputFrame::new().with_axis("rt", 0.5), GamePiece::Cone));
        assert!(sample(&above, &InputFrame::new().with_axis("rt", 0.51), GamePiece::Cone));
        assert!(!sample(&below, &InputFrame::new().with_axis("ly", -0.5), GamePiece::Cone));
        assert!(sample(&below, &InputFrame::new().with_axis("ly", -0.9), GamePiece::Cone));
    }

    #[test]
    fn mode_trigger_reads_mode_state() {
        let cube = Trigger::mode_is(GamePiece::Cube);
        let frame = InputFrame::new();
        assert!(sample(&cube, &frame, GamePiece::Cube));
        assert!(!sample(&cube, &frame, GamePiece::Cone));
    }

    #[test]
    fn combinators() {
        let a = Trigger::button("a");
        let b = Trigger::button("b");
        let both = a.clone().and(b.clone());
        let either = a.clone().or(b);
        let not_a = a.negate();

        let only_a = InputFrame::new().with_button("a", true);
        assert!(!sample(&both, &only_a, GamePiece::Cone));
        assert!(sample(&either, &only_a, GamePiece::Cone));
        assert!(!sample(&not_a, &only_a, GamePiece::Cone));
        assert!(sample(&not_a, &InputFrame::new(), GamePiece::Cone));
    }

    #[test]
    fn names_compose() {
        let t = Trigger::button("a").and(Trigger::button("b").negate());
        assert_eq!(t.name(), "(a && !b)");
        assert_eq!(format!("{t:?}"), "Trigger(\"(a && !b)\")");
    }

    #[test]
    fn always_and_never() {
        let frame = InputFrame::new();
        assert!(sample(&Trigger::always(), &frame, GamePiece::Cone));
        assert!(!sample(&Trigger::never(), &frame, GamePiece::Cube));
    }
}

// ── Axis ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod axis_tests {
    use super::*;

    #[test]
    fn deadband_zeroes_small_values() {
        let axis = Axis::new("x").with_deadband(0.1);
        assert_eq!(axis.read(&InputFrame::new().with_axis("x", 0.05)), 0.0);
        assert_eq!(axis.read(&InputFrame::new().with_axis("x", -0.1)), 0.0);
    }

    #[test]
    fn deadband_rescales_remaining_travel() {
        let axis = Axis::new("x").with_deadband(0.2);
        assert!((axis.read(&InputFrame::new().with_axis("x", 1.0)) - 1.0).abs() < 1e-12);
        assert!((axis.read(&InputFrame::new().with_axis("x", 0.6)) - 0.5).abs() < 1e-12);
        assert!((axis.read(&InputFrame::new().with_axis("x", -0.6)) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn scale_and_invert() {
        let axis = Axis::new("x").with_scale(3.0).inverted(true);
        assert!((axis.read(&InputFrame::new().with_axis("x", 0.5)) + 1.5).abs() < 1e-12);
    }

    #[test]
    fn raw_values_clamped() {
        let axis = Axis::new("x");
        assert_eq!(axis.read(&InputFrame::new().with_axis("x", 4.0)), 1.0);
    }

    #[test]
    fn active_trigger_uses_shaped_value() {
        let axis = Axis::new("x").with_deadband(0.1);
        let steering = axis.active(0.05);
        assert!(!sample(&steering, &InputFrame::new().with_axis("x", 0.1), GamePiece::Cone));
        assert!(sample(&steering, &InputFrame::new().with_axis("x", -0.5), GamePiece::Cone));
    }
}

// ── ControlBindings ───────────────────────────────────────────────────────────

#[cfg(test)]
mod bindings_tests {
    use super::*;

    #[test]
    fn absent_roles_are_none() {
        let bindings = ControlBindings::new("empty");
        assert!(bindings.trigger("wrist_up").is_none());
        assert!(bindings.axis("translation_x").is_none());
        assert_eq!(bindings.axis_value("translation_x", &InputFrame::new()), 0.0);
    }

    #[test]
    fn insert_and_list_roles() {
        let mut bindings = ControlBindings::new("pad");
        assert!(bindings.insert_trigger("b_role", Trigger::button("b")).is_none());
        bindings.insert_axis("a_role", Axis::new("x"));
        assert!(bindings.insert_trigger("b_role", Trigger::button("c")).is_some());
        assert_eq!(bindings.roles(), vec!["a_role", "b_role"]);
        assert!(bindings.has_role("a_role"));
        assert!(!bindings.has_role("c_role"));
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn loads_every_kind() {
        let bindings = load_bindings_reader(Cursor::new(PROFILE_CSV), "pad").unwrap();
        assert_eq!(bindings.name, "pad");
        assert_eq!(bindings.roles().len(), 4);

        let frame = InputFrame::new()
            .with_button("y", true)
            .with_axis("right_trigger", 0.8)
            .with_axis("left_stick_y", 0.0)
            .with_axis("left_y", 1.0);
        assert!(sample(&bindings.trigger("wrist_up").unwrap(), &frame, GamePiece::Cone));
        assert!(sample(&bindings.trigger("elevator_up").unwrap(), &frame, GamePiece::Cone));
        assert!(!sample(&bindings.trigger("elevator_down").unwrap(), &frame, GamePiece::Cone));
        assert!((bindings.axis_value("translation_x", &frame) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn duplicate_role_rejected() {
        let csv = "role,kind,source,threshold,deadband,scale,inverted\n\
                   a,button,x,,,,\n\
                   a,button,y,,,,\n";
        let err = load_bindings_reader(Cursor::new(csv), "dup").unwrap_err();
        assert!(matches!(err, InputError::DuplicateRole(ref r) if r == "a"));
    }

    #[test]
    fn unknown_kind_rejected() {
        let csv = "role,kind,source,threshold,deadband,scale,inverted\n\
                   a,dial,x,,,,\n";
        let err = load_bindings_reader(Cursor::new(csv), "bad").unwrap_err();
        assert!(matches!(err, InputError::Parse(_)));
    }

    #[test]
    fn threshold_required_for_axis_triggers() {
        let csv = "role,kind,source,threshold,deadband,scale,inverted\n\
                   a,axis_above,x,,,,\n";
        let err = load_bindings_reader(Cursor::new(csv), "bad").unwrap_err();
        assert!(matches!(err, InputError::Parse(ref m) if m.contains("threshold")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = crate::load_bindings_csv(std::path::Path::new("/nonexistent/pad.csv")).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }
}

// ── Vision ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vision_tests {
    use super::*;

    #[test]
    fn no_vision_sees_nothing() {
        assert!(NoVision.target_offset(TargetProfile::ScoreCube).is_none());
        assert_eq!(NoVision.current_pose(), Pose2d::default());
    }

    #[test]
    fn fixed_vision_clones_share_state() {
        let vision = FixedVision::new();
        let view = vision.clone();
        assert!(view.target_offset(TargetProfile::PickupConeFloor).is_none());

        vision.set_target(TargetProfile::PickupConeFloor, TargetOffset::new(3.0, -1.0));
        vision.set_pose(Pose2d::new(1.0, 2.0, 0.5));
        assert_eq!(
            view.target_offset(TargetProfile::PickupConeFloor),
            Some(TargetOffset::new(3.0, -1.0))
        );
        assert!(view.target_offset(TargetProfile::PickupCubeFloor).is_none());
        assert_eq!(view.current_pose().x_m, 1.0);

        vision.set_target(TargetProfile::PickupConeFloor, TargetOffset::new(0.0, 0.0));
        assert!(view.target_offset(TargetProfile::PickupConeFloor).unwrap().is_centered(0.5));

        vision.clear_target(TargetProfile::PickupConeFloor);
        assert!(view.target_offset(TargetProfile::PickupConeFloor).is_none());
    }

    #[test]
    fn pipelines_are_distinct() {
        let profiles = [
            TargetProfile::PickupConeFloor,
            TargetProfile::PickupCubeFloor,
            TargetProfile::PickupConeDoubleStation,
            TargetProfile::ScoreConeTop,
            TargetProfile::ScoreConeMiddle,
            TargetProfile::ScoreCube,
        ];
        let mut pipes: Vec<u32> = profiles.iter().map(|p| p.pipeline()).collect();
        pipes.sort_unstable();
        pipes.dedup();
        assert_eq!(pipes.len(), profiles.len());
    }
}
