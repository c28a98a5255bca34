use std::fs;

use tempfile::tempdir;

use crate::event::TransitionEvent;
use crate::host::HostApp;
use crate::kernel::constants;
use crate::kernel::{Application, Error};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{Stage, TransitionContext};
use crate::storage::{RuntimeConfig, StorageSystemError};

fn app() -> Application {
    Application::new(RuntimeConfig::default()).expect("default config should build")
}

/// Stages finish as soon as they are entered
fn instant(context: TransitionContext) -> Result<(), crate::stage_manager::DefinitionError> {
    for stage in Stage::ALL {
        let controller = context.controller.clone();
        context.controller.define_stage(stage, move || {
            let _ = controller.finish_stage(stage);
        });
    }
    Ok(())
}

#[test]
fn test_default_transition_is_registered() {
    let app = app();

    assert_eq!(app.transition_names(), vec![constants::DEFAULT_TRANSITION.to_string()]);
    assert!(app.transition(constants::DEFAULT_TRANSITION).is_ok());
    assert_eq!(app.session().lives(), constants::DEFAULT_LIVES);
}

#[test]
fn test_duplicate_and_missing_transitions() {
    let mut app = app();

    let err = app.register_transition(constants::DEFAULT_TRANSITION, instant).unwrap_err();
    assert!(matches!(err, Error::TransitionAlreadyExists { .. }));

    let err = app.transition("nope").unwrap_err();
    assert!(matches!(err, Error::TransitionNotFound { .. }));
    assert!(app.play("nope", &[Stage::Win], |_, _| {}).is_err());
}

#[test]
fn test_play_default_transition_to_completion() {
    let mut app = app();
    let mut seen = Vec::new();

    let report = app
        .play(constants::DEFAULT_TRANSITION, &[Stage::Prep, Stage::Win], |frame, event| {
            seen.push((frame, event))
        })
        .unwrap();

    assert_eq!(
        report.events,
        vec![
            TransitionEvent::StageStart(Stage::Prep),
            TransitionEvent::PromptTime,
            TransitionEvent::InputPromptTime,
            TransitionEvent::StageEnd(Stage::Prep),
            TransitionEvent::StageStart(Stage::Win),
            TransitionEvent::StageEnd(Stage::Win),
            TransitionEvent::TransitionEnd,
        ]
    );
    // Two 4-beat stages at 120 bpm and 60 fps
    assert!((235..=245).contains(&report.frames), "frames = {}", report.frames);
    assert!((report.elapsed - 4.0).abs() < 0.05);
    assert_eq!(seen.len(), report.events.len());
    assert_eq!(seen[0].0, 0);
    assert!(seen.windows(2).all(|pair| pair[0].0 <= pair[1].0));
    assert_eq!(app.session().score(), 1);
}

#[test]
fn test_session_reacts_to_finished_stages() {
    let mut app = app();
    app.register_transition("instant", instant).unwrap();

    let report = app
        .play("instant", &[Stage::Lose, Stage::Speed, Stage::BossLose, Stage::BossWin], |_, _| {})
        .unwrap();

    assert_eq!(report.frames, 0, "Instant stages finish inside the trigger");
    let state = app.session().snapshot();
    assert_eq!(state.lives, constants::DEFAULT_LIVES - 2);
    assert_eq!(state.speed, 1.0 + constants::DEFAULT_SPEED_STEP);
    assert_eq!(state.score, 1);
}

#[test]
fn test_runs_can_be_replayed() {
    let mut app = app();
    app.register_transition("instant", instant).unwrap();

    for _ in 0..3 {
        app.play("instant", &[Stage::Win], |_, _| {}).unwrap();
    }

    assert_eq!(app.session().score(), 3);
    assert_eq!(app.transition("instant").unwrap().controller().run_count(), 3);
}

#[test]
fn test_stalled_run_is_reported() {
    let mut config = RuntimeConfig::default();
    config.engine.max_frames = 10;
    let mut app = Application::new(config).unwrap();
    app.register_transition("stuck", |context: TransitionContext| {
        context.controller.define_stage(Stage::Prep, || {});
        Ok(())
    })
    .unwrap();

    let err = app.play("stuck", &[Stage::Prep], |_, _| {}).unwrap_err();

    match err {
        Error::RunStalled { transition, frames, stage } => {
            assert_eq!(transition, "stuck");
            assert_eq!(frames, 10);
            assert_eq!(stage, Some(Stage::Prep));
        }
        other => panic!("Unexpected error: {other}"),
    }
}

#[test]
fn test_failed_trigger_is_reported() {
    let app = app();

    let err = app.start(constants::DEFAULT_TRANSITION, &[]).unwrap_err();

    assert!(matches!(err, Error::StageSystem(StageSystemError::EmptySequence { .. })));
    let handle = app.transition(constants::DEFAULT_TRANSITION).unwrap();
    assert_eq!(handle.channels().subscriber_count(), 0);
}

#[test]
fn test_recorder_drains_incrementally() {
    let mut app = app();
    let recorder = app.start(constants::DEFAULT_TRANSITION, &[Stage::Win]).unwrap();

    assert_eq!(recorder.transition(), constants::DEFAULT_TRANSITION);
    assert_eq!(recorder.drain(), vec![TransitionEvent::StageStart(Stage::Win)]);
    assert!(recorder.drain().is_empty());
    assert!(!recorder.is_finished());

    while !recorder.is_finished() {
        app.step();
    }
    assert_eq!(
        recorder.drain(),
        vec![TransitionEvent::StageEnd(Stage::Win), TransitionEvent::TransitionEnd]
    );
}

#[test]
fn test_step_advances_beat_clock() {
    let mut app = app();

    // 60 frames is one second, two beats at 120 bpm
    for _ in 0..60 {
        app.step();
    }

    assert_eq!(app.engine().frame(), 60);
    assert!((1..=2).contains(&app.beat().beat()));
}

#[test]
fn test_from_config_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(constants::DEFAULT_CONFIG_FILE);
    fs::write(&path, "[session]\nlives = 7\n\n[transition]\nbpm = 240.0\n").unwrap();

    let app = Application::from_config_path(&path).unwrap();

    assert_eq!(app.session().lives(), 7);
    assert_eq!(app.config().transition.bpm, 240.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = RuntimeConfig::default();
    config.session.speed = 0.0;

    let err = Application::new(config).unwrap_err();

    assert!(matches!(
        err,
        Error::StorageSystem(StorageSystemError::InvalidValue { .. })
    ));
}
