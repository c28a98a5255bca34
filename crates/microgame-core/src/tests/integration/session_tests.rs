use std::sync::{Arc, Mutex};

use crate::event::TransitionEvent;
use crate::host::HostApp;
use crate::kernel::constants;
use crate::stage_manager::Stage;

use super::common::{next_frame_transition, setup_app, stage_names, EventLog};

#[test]
fn test_full_round_of_microgames() {
    let mut app = setup_app();
    app.register_transition("quick", next_frame_transition).unwrap();

    // Lose one, clear one, speed up, then face the boss and clear it
    let rounds: [&[Stage]; 4] = [
        &[Stage::Prep],
        &[Stage::Lose, Stage::Prep],
        &[Stage::Win, Stage::Speed, Stage::BossPrep],
        &[Stage::BossWin],
    ];
    for stages in rounds {
        let report = app.play("quick", stages, |_, _| {}).unwrap();
        assert_eq!(report.frames, stages.len() as u64);
        assert_eq!(report.events.last(), Some(&TransitionEvent::TransitionEnd));
    }

    let state = app.session().snapshot();
    assert_eq!(state.lives, constants::DEFAULT_LIVES - 1);
    assert_eq!(state.score, 2);
    assert_eq!(state.speed, 1.0 + constants::DEFAULT_SPEED_STEP);
}

#[test]
fn test_speed_up_shortens_later_stages() {
    let mut app = setup_app();

    let before = app.play(constants::DEFAULT_TRANSITION, &[Stage::Speed], |_, _| {}).unwrap();
    assert_eq!(app.session().speed(), 1.25);
    let after = app.play(constants::DEFAULT_TRANSITION, &[Stage::Win], |_, _| {}).unwrap();

    // 4 beats at 120 bpm: 2s at 1x, 1.6s at 1.25x
    assert!((before.elapsed - 2.0).abs() < 0.05);
    assert!((after.elapsed - 1.6).abs() < 0.05);
}

#[test]
fn test_outside_subscribers_see_stage_boundaries_in_order() {
    let app = setup_app();
    let handle = app.transition(constants::DEFAULT_TRANSITION).unwrap();
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    handle.observe(move |event| sink.lock().unwrap().push(event));

    handle.trigger(&[Stage::BossPrep, Stage::BossLose]).unwrap();
    while handle.is_running() {
        app.engine().tick(app.config().engine.frame_time());
    }

    assert_eq!(
        stage_names(&log.lock().unwrap()),
        vec![
            "stage.start bossPrep",
            "prompt.time",
            "input.time",
            "stage.end bossPrep",
            "stage.start bossLose",
            "stage.end bossLose",
            "transition.end",
        ]
    );
}

#[test]
fn test_banner_reflects_lives_after_loss() {
    let mut app = setup_app();
    app.play(constants::DEFAULT_TRANSITION, &[Stage::Lose], |_, _| {}).unwrap();

    let handle = app.transition(constants::DEFAULT_TRANSITION).unwrap();
    handle.trigger(&[Stage::Prep]).unwrap();

    let parent = app.engine().find_node("default.parent").unwrap();
    let banner = &parent.children()[0];
    let expected = format!("GET READY! lives: {}", constants::DEFAULT_LIVES - 1);
    assert_eq!(banner.text().as_deref(), Some(expected.as_str()));
}
