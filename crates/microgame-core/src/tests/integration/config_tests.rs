use std::fs;

use tempfile::tempdir;

use crate::kernel::{constants, Application};
use crate::stage_manager::{Stage, TriggerPolicy};

#[test]
fn test_yaml_config_drives_timing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("microgame.yaml");
    fs::write(
        &path,
        "transition:\n  bpm: 60.0\n  beats:\n    win: 1.0\nengine:\n  frame_rate: 10\n",
    )
    .unwrap();
    let mut app = Application::from_config_path(&path).unwrap();

    let report = app.play(constants::DEFAULT_TRANSITION, &[Stage::Win], |_, _| {}).unwrap();

    // One beat at 60 bpm, ten frames per second
    assert_eq!(report.frames, 10);
}

#[test]
fn test_replace_policy_from_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("microgame.json");
    fs::write(&path, r#"{"transition": {"controller": {"trigger_policy": "replace"}}}"#).unwrap();
    let app = Application::from_config_path(&path).unwrap();
    assert_eq!(app.config().transition.controller.trigger_policy, TriggerPolicy::Replace);

    let handle = app.transition(constants::DEFAULT_TRANSITION).unwrap();
    handle.trigger(&[Stage::Prep]).unwrap();
    handle.trigger(&[Stage::Lose]).unwrap();

    assert_eq!(handle.controller().current_stage(), Some(Stage::Lose));
}
