use std::fmt;
use std::sync::Arc;

use crate::event::{Subscription, TransitionEvent};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{LifecycleChannels, Stage, StageController};

/// A configured, reusable transition.
///
/// Built by [`create_transition`](crate::stage_manager::create_transition).
/// Subscriptions made through the handle last until the end of the current
/// run: when the last stage finishes, `on_transition_end` handlers fire and
/// every lifecycle channel is emptied. Subscribe again before each
/// `trigger`.
///
/// Dropping the handle drops every registered behavior.
pub struct TransitionHandle {
    controller: StageController,
    channels: LifecycleChannels,
}

impl TransitionHandle {
    pub(crate) fn new(controller: StageController, channels: LifecycleChannels) -> Self {
        Self { controller, channels }
    }

    pub fn name(&self) -> &str {
        self.controller.name()
    }

    /// Play `stages`, starting with the first one.
    ///
    /// The owned scene nodes are shown and unpaused. While a run is in
    /// flight the controller's [`TriggerPolicy`](crate::stage_manager::TriggerPolicy)
    /// decides between refusing and replacing; wait for `on_transition_end`
    /// to chain runs safely.
    pub fn trigger(&self, stages: &[Stage]) -> Result<(), StageSystemError> {
        self.controller.begin_run(stages)
    }

    /// Run `action` when `stage` is entered
    pub fn on_stage_start<F>(&self, stage: Stage, action: F) -> Subscription<Stage>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.channels.stage_start.subscribe(move |s: &Stage| {
            if *s == stage {
                action();
            }
        })
    }

    /// Run `action` when `stage` finishes
    pub fn on_stage_end<F>(&self, stage: Stage, action: F) -> Subscription<Stage>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.channels.stage_end.subscribe(move |s: &Stage| {
            if *s == stage {
                action();
            }
        })
    }

    pub fn on_prompt_time<F>(&self, action: F) -> Subscription<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.channels.prompt_time.subscribe(move |_: &()| action())
    }

    pub fn on_input_prompt_time<F>(&self, action: F) -> Subscription<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.channels.input_prompt_time.subscribe(move |_: &()| action())
    }

    pub fn on_transition_end<F>(&self, action: F) -> Subscription<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.channels.transition_end.subscribe(move |_: &()| action())
    }

    /// Subscribe `observer` to all five lifecycle channels at once.
    pub fn observe<F>(&self, observer: F) -> TransitionObserver
    where
        F: Fn(TransitionEvent) + Send + Sync + 'static,
    {
        let observer = Arc::new(observer);
        let on_start = Arc::clone(&observer);
        let on_end = Arc::clone(&observer);
        let on_prompt = Arc::clone(&observer);
        let on_input = Arc::clone(&observer);
        TransitionObserver {
            stage_start: self
                .channels
                .stage_start
                .subscribe(move |stage: &Stage| on_start(TransitionEvent::StageStart(*stage))),
            stage_end: self
                .channels
                .stage_end
                .subscribe(move |stage: &Stage| on_end(TransitionEvent::StageEnd(*stage))),
            prompt_time: self
                .channels
                .prompt_time
                .subscribe(move |_: &()| on_prompt(TransitionEvent::PromptTime)),
            input_prompt_time: self
                .channels
                .input_prompt_time
                .subscribe(move |_: &()| on_input(TransitionEvent::InputPromptTime)),
            transition_end: self
                .channels
                .transition_end
                .subscribe(move |_: &()| observer(TransitionEvent::TransitionEnd)),
        }
    }

    /// The current run's sequence, read live from the controller
    pub fn stages(&self) -> Vec<Stage> {
        self.controller.stages()
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    pub fn controller(&self) -> &StageController {
        &self.controller
    }

    pub fn channels(&self) -> &LifecycleChannels {
        &self.channels
    }
}

impl Drop for TransitionHandle {
    fn drop(&mut self) {
        // Behaviors usually capture controller clones; clearing them breaks
        // the reference cycle.
        self.controller.dispose();
    }
}

impl fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("controller", &self.controller)
            .field("subscribers", &self.channels.subscriber_count())
            .finish()
    }
}

/// Subscriptions made by [`TransitionHandle::observe`]
#[derive(Debug)]
pub struct TransitionObserver {
    stage_start: Subscription<Stage>,
    stage_end: Subscription<Stage>,
    prompt_time: Subscription<()>,
    input_prompt_time: Subscription<()>,
    transition_end: Subscription<()>,
}

impl TransitionObserver {
    /// Unsubscribe from every channel still holding the observer
    pub fn cancel(&self) {
        self.stage_start.cancel();
        self.stage_end.cancel();
        self.prompt_time.cancel();
        self.input_prompt_time.cancel();
        self.transition_end.cancel();
    }

    /// Whether the observer is still attached to any channel
    pub fn is_active(&self) -> bool {
        self.stage_start.is_active()
            || self.stage_end.is_active()
            || self.prompt_time.is_active()
            || self.input_prompt_time.is_active()
            || self.transition_end.is_active()
    }
}
