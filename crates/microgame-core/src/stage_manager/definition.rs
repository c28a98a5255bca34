use std::sync::Arc;

use log::debug;

use crate::host::{CameraNode, HostApp, HostEngine, ParentNode};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{ControllerOptions, LifecycleChannels, StageController, TransitionHandle};

/// Error type a definition may fail with
pub type DefinitionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Capabilities handed to a transition definition.
///
/// Behaviors registered on `controller` are `'static`, so clone whatever
/// they need out of the context before moving it into the closure.
#[derive(Clone)]
pub struct TransitionContext {
    /// Root of the transition's scene content
    pub parent: ParentNode,
    /// Frames the transition's visuals
    pub camera: CameraNode,
    pub controller: StageController,
    /// Ambient run state, read-only
    pub app: Arc<dyn HostApp>,
    pub engine: Arc<dyn HostEngine>,
}

/// Build a transition: create its scene nodes and channels, run the
/// one-shot `definition` to register stage behaviors, and hand back the
/// handle.
///
/// The parent and camera nodes are created through `engine` as
/// `<name>.parent` and `<name>.camera`, paused and hidden until the first
/// trigger.
pub fn create_transition<F>(
    name: &str,
    definition: F,
    app: Arc<dyn HostApp>,
    engine: Arc<dyn HostEngine>,
    options: ControllerOptions,
) -> Result<TransitionHandle, StageSystemError>
where
    F: FnOnce(TransitionContext) -> Result<(), DefinitionError>,
{
    let parent = engine.add_node(&format!("{name}.parent"));
    let camera = engine.add_node(&format!("{name}.camera"));
    let channels = LifecycleChannels::new();
    let controller = StageController::new(name, channels.clone(), vec![parent.clone(), camera.clone()], options);

    let context = TransitionContext {
        parent: ParentNode::new(parent),
        camera: CameraNode::new(camera),
        controller: controller.clone(),
        app,
        engine,
    };
    // Built before running the definition so a failure still disposes the
    // behaviors registered so far.
    let handle = TransitionHandle::new(controller, channels);
    definition(context).map_err(|source| StageSystemError::DefinitionFailed {
        transition: name.to_string(),
        source,
    })?;

    debug!("Transition '{}' defined", name);
    Ok(handle)
}
