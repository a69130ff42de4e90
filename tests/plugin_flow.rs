use eyetracker_plugins::gaze_core::{AbortSignal, Key, Position};
use eyetracker_plugins::gaze_experiment::parse_items;
use eyetracker_plugins::gaze_timing::ManualTimer;
use eyetracker_plugins::gaze_tracker::scripted::{RecordingSynth, ScriptedKeyboard, ScriptedPointer};
use eyetracker_plugins::{
    ExperimentContext, EyeTracker, HostServices, Item, Resolution, Sequence, TrackerKind,
};

#[test]
fn test_mouse_trial_from_item_list() {
    let timer = ManualTimer::new();
    let abort = AbortSignal::new();
    let pointer = ScriptedPointer::full().abort_when_exhausted(&abort);
    let keyboard = ScriptedKeyboard::new([Some(Key::Space)]);
    let synth = RecordingSynth::new();
    let host = HostServices::new(
        timer.clone(),
        pointer.clone(),
        keyboard.clone(),
        synth.clone(),
        abort,
    );
    let mut ctx = ExperimentContext::new(Resolution::new(800, 600), host);
    ctx.set_var("subject_nr", 7);

    let setup = parse_items(
        r#"[{"name": "cal", "item_type": "eyetracker_calibrate",
             "tracker_type": "extended dummy mode (use mouse to simulate eye movement)"}]"#,
    )
    .unwrap();
    let mut setup: Sequence<ManualTimer> =
        Sequence::new("setup", setup.into_iter().map(|s| s.build()).collect());
    setup.prepare(&mut ctx).unwrap();
    setup.run(&mut ctx).unwrap();
    assert_eq!(ctx.tracker().unwrap().kind(), TrackerKind::ExtendedDummy);

    // one sample at the key press, then a saccade away from the fixation
    pointer.moves([(410.0, 300.0), (410.0, 300.0), (411.0, 300.0), (420.0, 300.0)]);
    let target = Position::new(400.0, 300.0);
    assert!(ctx.tracker_mut().unwrap().drift_correction(Some(target), false).unwrap());
    assert!(synth.played().is_empty());
    ctx.tracker_mut().unwrap().start_recording().unwrap();

    let trial = parse_items(
        r#"[
            {"name": "wait", "item_type": "eyetracker_wait", "event": "Saccade start"},
            {"name": "log", "item_type": "eyetracker_log", "msg": "subject [subject_nr]"},
            {"name": "stop", "item_type": "eyetracker_stop_recording", "log_msg": "end [subject_nr]"}
        ]"#,
    )
    .unwrap();
    let mut trial: Sequence<ManualTimer> =
        Sequence::new("trial", trial.into_iter().map(|s| s.build()).collect());
    trial.prepare(&mut ctx).unwrap();
    trial.run(&mut ctx).unwrap();

    let tracker = ctx.tracker().unwrap();
    assert!(!tracker.is_recording());
    assert_eq!(
        tracker.as_simulated().unwrap().messages(),
        ["subject 7", "end 7"]
    );
    assert_eq!(pointer.remaining(), 0);
    assert_eq!(keyboard.remaining(), 0);

    assert!(ctx.finish().unwrap());
    assert!(!ctx.has_tracker());
}

#[test]
fn test_simple_dummy_accepts_everything() {
    let timer = ManualTimer::new();
    let host = HostServices::new(
        timer.clone(),
        ScriptedPointer::position_only(),
        ScriptedKeyboard::default(),
        RecordingSynth::new(),
        AbortSignal::new(),
    );
    let mut ctx = ExperimentContext::new(Resolution::default(), host);
    let items = parse_items(
        r#"[
            {"name": "cal", "item_type": "eyetracker_calibrate"},
            {"name": "wait", "item_type": "eyetracker_wait", "event": "Fixation start"},
            {"name": "stop", "item_type": "eyetracker_stop_recording"}
        ]"#,
    )
    .unwrap();
    let mut seq: Sequence<ManualTimer> =
        Sequence::new("block", items.into_iter().map(|s| s.build()).collect());
    seq.prepare(&mut ctx).unwrap();
    seq.run(&mut ctx).unwrap();

    let tracker = ctx.tracker_mut().unwrap();
    assert_eq!(tracker.kind(), TrackerKind::SimpleDummy);
    assert!(tracker.as_simulated().is_none());
    assert!(tracker.drift_correction(None, true).unwrap());
    assert!(ctx.finish().unwrap());
}
