use std::sync::{Arc, Mutex};

use crate::event::TransitionEvent;
use crate::host::{GameSession, HeadlessEngine, HostApp, HostEngine, Viewport};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{create_transition, ControllerOptions, Stage, TransitionContext, TransitionHandle};

/// Transition whose stages finish as soon as they are entered
fn instant_transition(name: &str) -> TransitionHandle {
    let app: Arc<dyn HostApp> = Arc::new(GameSession::default());
    let engine: Arc<dyn HostEngine> = Arc::new(HeadlessEngine::new(Viewport::new(800.0, 600.0)));
    create_transition(
        name,
        |context: TransitionContext| {
            for stage in Stage::ALL {
                let controller = context.controller.clone();
                context.controller.define_stage(stage, move || {
                    if stage.is_prep() {
                        controller.call_prompt();
                        controller.call_input();
                    }
                    controller.finish_stage(stage).unwrap();
                });
            }
            Ok(())
        },
        app,
        engine,
        ControllerOptions::default(),
    )
    .unwrap()
}

fn observe_all(handle: &TransitionHandle) -> Arc<Mutex<Vec<TransitionEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    handle.observe(move |event| sink.lock().unwrap().push(event));
    events
}

#[test]
fn test_prep_then_win_emits_lifecycle_in_order() {
    let handle = instant_transition("default");
    let events = observe_all(&handle);

    handle.trigger(&[Stage::Prep, Stage::Win]).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
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
    assert!(!handle.is_running());
}

#[test]
fn test_stage_specific_subscriptions_filter_by_stage() {
    let handle = instant_transition("filter");
    let log = Arc::new(Mutex::new(Vec::new()));
    let l = Arc::clone(&log);
    handle.on_stage_start(Stage::Lose, move || l.lock().unwrap().push("lose started"));
    let l = Arc::clone(&log);
    handle.on_stage_end(Stage::Lose, move || l.lock().unwrap().push("lose ended"));
    let l = Arc::clone(&log);
    handle.on_stage_end(Stage::Win, move || l.lock().unwrap().push("win ended"));
    let l = Arc::clone(&log);
    handle.on_transition_end(move || l.lock().unwrap().push("done"));

    handle.trigger(&[Stage::Lose]).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["lose started", "lose ended", "done"]);
}

#[test]
fn test_subscriptions_last_one_run() {
    let handle = instant_transition("one-run");
    let count = Arc::new(Mutex::new(0));
    let c = Arc::clone(&count);
    handle.on_stage_start(Stage::Speed, move || *c.lock().unwrap() += 1);

    handle.trigger(&[Stage::Speed]).unwrap();
    handle.trigger(&[Stage::Speed]).unwrap();

    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(handle.channels().subscriber_count(), 0);
}

#[test]
fn test_transition_end_subscriber_can_trigger_again() {
    let handle = Arc::new(instant_transition("chain"));
    let ends = Arc::new(Mutex::new(0));

    // Weak reference, the handle owns the channel this closure lives in
    let weak = Arc::downgrade(&handle);
    let e = Arc::clone(&ends);
    handle.on_transition_end(move || {
        *e.lock().unwrap() += 1;
        if let Some(handle) = weak.upgrade() {
            let e = Arc::clone(&e);
            handle.on_transition_end(move || *e.lock().unwrap() += 10);
            handle.trigger(&[Stage::Win]).unwrap();
        }
    });

    handle.trigger(&[Stage::Lose]).unwrap();

    assert_eq!(*ends.lock().unwrap(), 11);
}

#[test]
fn test_stages_reflect_the_current_run() {
    let app: Arc<dyn HostApp> = Arc::new(GameSession::default());
    let engine: Arc<dyn HostEngine> = Arc::new(HeadlessEngine::new(Viewport::new(800.0, 600.0)));
    let handle = create_transition(
        "manual",
        |context: TransitionContext| {
            for stage in Stage::ALL {
                context.controller.define_stage(stage, || {});
            }
            Ok(())
        },
        app,
        engine,
        ControllerOptions::default(),
    )
    .unwrap();
    assert!(handle.stages().is_empty());

    handle.trigger(&[Stage::BossPrep, Stage::BossWin]).unwrap();
    assert_eq!(handle.stages(), vec![Stage::BossPrep, Stage::BossWin]);
    assert!(handle.is_running());

    let err = handle.trigger(&[Stage::Prep]).unwrap_err();
    assert!(matches!(err, StageSystemError::RunInProgress { .. }));

    let controller = handle.controller().clone();
    controller.finish_stage(Stage::BossPrep).unwrap();
    controller.finish_stage(Stage::BossWin).unwrap();
    assert!(!handle.is_running());
    assert_eq!(handle.stages(), vec![Stage::BossPrep, Stage::BossWin]);
}

#[test]
fn test_cancelled_observer_sees_nothing() {
    let handle = instant_transition("cancel");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let observer = handle.observe(move |event| sink.lock().unwrap().push(event));
    assert!(observer.is_active());

    observer.cancel();
    handle.trigger(&[Stage::Win]).unwrap();

    assert!(!observer.is_active());
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_observer_detaches_at_transition_end() {
    let handle = instant_transition("detach");
    let observer = handle.observe(|_| {});

    handle.trigger(&[Stage::Win]).unwrap();

    assert!(!observer.is_active());
}

#[test]
fn test_dropping_handle_disposes_behaviors() {
    let handle = instant_transition("drop");
    let controller = handle.controller().clone();
    assert!(controller.has_behavior(Stage::Win, 0));

    drop(handle);

    assert!(!controller.has_behavior(Stage::Win, 0));
}

/// Deterministic sequences of every length from 1 to 8. A stride of zero
/// repeats one stage for the whole sequence.
fn generated_sequences() -> Vec<Vec<Stage>> {
    let mut sequences = Vec::new();
    for len in 1..=8 {
        for stride in 0..4 {
            let sequence = (0..len)
                .map(|i| Stage::ALL[(len + i * stride) % Stage::ALL.len()])
                .collect();
            sequences.push(sequence);
        }
    }
    sequences
}

#[test]
fn test_every_sequence_pairs_starts_with_ends_and_ends_once() {
    let handle = instant_transition("generated");

    for sequence in generated_sequences() {
        let events = observe_all(&handle);
        handle.trigger(&sequence).unwrap();
        let events = events.lock().unwrap().clone();

        let lifecycle: Vec<TransitionEvent> = events
            .iter()
            .copied()
            .filter(|e| matches!(e, TransitionEvent::StageStart(_) | TransitionEvent::StageEnd(_)))
            .collect();
        let expected: Vec<TransitionEvent> = sequence
            .iter()
            .flat_map(|&stage| [TransitionEvent::StageStart(stage), TransitionEvent::StageEnd(stage)])
            .collect();
        assert_eq!(lifecycle, expected, "Start/end pairing broken for {sequence:?}");

        let ends = events.iter().filter(|e| **e == TransitionEvent::TransitionEnd).count();
        assert_eq!(ends, 1, "Expected one transition end for {sequence:?}");
        assert_eq!(events.last(), Some(&TransitionEvent::TransitionEnd));
        assert!(!handle.is_running());
    }
}
