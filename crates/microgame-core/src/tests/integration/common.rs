use std::sync::{Arc, Mutex};

use crate::event::TransitionEvent;
use crate::kernel::Application;
use crate::stage_manager::{DefinitionError, Stage, TransitionContext};
use crate::storage::RuntimeConfig;

/// Order of events as seen by an outside subscriber
pub type EventLog = Arc<Mutex<Vec<TransitionEvent>>>;

pub fn setup_app() -> Application {
    Application::new(RuntimeConfig::default()).expect("Failed to build application")
}

/// Definition whose stages complete on the frame after they start
pub fn next_frame_transition(context: TransitionContext) -> Result<(), DefinitionError> {
    for stage in Stage::ALL {
        let controller = context.controller.clone();
        let engine = Arc::clone(&context.engine);
        context.controller.define_stage(stage, move || {
            let controller = controller.clone();
            engine.wait(
                0.0,
                Box::new(move || {
                    let _ = controller.finish_stage(stage);
                }),
            );
        });
    }
    Ok(())
}

pub fn stage_names(events: &[TransitionEvent]) -> Vec<String> {
    events.iter().map(|event| event.to_string()).collect()
}
