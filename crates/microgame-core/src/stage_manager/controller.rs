use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::event::{EventChannel, Subscription};
use crate::host::SceneNode;
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::Stage;

/// Behavior registered against a stage
pub type StageAction = Arc<dyn Fn() + Send + Sync>;

/// What happens when `trigger` is called while a run is still in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Refuse with [`StageSystemError::RunInProgress`]
    #[default]
    Reject,
    /// Overwrite the sequence and jump to the new first stage. Timers started
    /// by the old run keep running; their `finish_stage` calls fail with
    /// `StageNotActive`.
    Replace,
}

/// Tunables for a [`StageController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    pub trigger_policy: TriggerPolicy,
    /// Refuse to trigger a sequence containing a stage with no behavior,
    /// instead of only logging a warning when it is entered
    pub strict_behaviors: bool,
}

/// The externally visible channels of a transition.
///
/// Owned by the [`TransitionHandle`](crate::stage_manager::TransitionHandle);
/// the controller holds clones so it can dispatch into them.
#[derive(Debug, Clone)]
pub struct LifecycleChannels {
    pub stage_start: EventChannel<Stage>,
    pub stage_end: EventChannel<Stage>,
    pub prompt_time: EventChannel<()>,
    pub input_prompt_time: EventChannel<()>,
    pub transition_end: EventChannel<()>,
}

impl LifecycleChannels {
    pub fn new() -> Self {
        Self {
            stage_start: EventChannel::new("stage.start"),
            stage_end: EventChannel::new("stage.end"),
            prompt_time: EventChannel::new("prompt.time"),
            input_prompt_time: EventChannel::new("input.time"),
            transition_end: EventChannel::new("transition.end"),
        }
    }

    /// Total subscriptions across the five channels
    pub fn subscriber_count(&self) -> usize {
        self.stage_start.len()
            + self.stage_end.len()
            + self.prompt_time.len()
            + self.input_prompt_time.len()
            + self.transition_end.len()
    }

    fn clear_all_but_end(&self) {
        self.stage_start.clear();
        self.stage_end.clear();
        self.prompt_time.clear();
        self.input_prompt_time.clear();
    }
}

impl Default for LifecycleChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BehaviorKey {
    /// Whatever stage sits at index 0 of the current run
    First,
    Stage(Stage),
}

struct StageBehavior {
    key: BehaviorKey,
    action: StageAction,
}

impl StageBehavior {
    fn matches(&self, stage: Stage, position: usize) -> bool {
        match self.key {
            BehaviorKey::First => position == 0,
            BehaviorKey::Stage(s) => s == stage,
        }
    }
}

#[derive(Debug, Default)]
struct RunState {
    stages: Vec<Stage>,
    /// Position of the active stage; `None` while idle
    cursor: Option<usize>,
    /// Set between a `finish_stage` call and the advancement it causes
    finishing: bool,
    /// Bumped by every trigger, so a stale advancement can tell it lost
    run_id: u64,
}

impl RunState {
    fn current(&self) -> Option<Stage> {
        self.cursor.and_then(|i| self.stages.get(i).copied())
    }
}

struct ControllerInner {
    name: String,
    options: ControllerOptions,
    run: Mutex<RunState>,
    behaviors: Mutex<Vec<StageBehavior>>,
    stage_started: EventChannel<Stage>,
    stage_ended: EventChannel<Stage>,
    channels: LifecycleChannels,
    nodes: Vec<SceneNode>,
}

/// Drives one transition's stage sequence.
///
/// Cheap to clone; clones share the same run state, behaviors and channels.
/// No lock is held while behaviors or subscribers run, so they may call back
/// into the controller (typically `finish_stage` from a timer, or
/// synchronously for an un-animated stage).
#[derive(Clone)]
pub struct StageController {
    inner: Arc<ControllerInner>,
}

impl StageController {
    /// Create a controller dispatching into `channels`. `nodes` are paused
    /// and hidden between runs.
    pub fn new(
        name: impl Into<String>,
        channels: LifecycleChannels,
        nodes: Vec<SceneNode>,
        options: ControllerOptions,
    ) -> Self {
        for node in &nodes {
            node.set_paused(true);
            node.set_hidden(true);
        }
        Self {
            inner: Arc::new(ControllerInner {
                name: name.into(),
                options,
                run: Mutex::new(RunState::default()),
                behaviors: Mutex::new(Vec::new()),
                stage_started: EventChannel::new("controller.stage_started"),
                stage_ended: EventChannel::new("controller.stage_ended"),
                channels,
                nodes,
            }),
        }
    }

    fn run(&self) -> MutexGuard<'_, RunState> {
        self.inner.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn behaviors(&self) -> MutexGuard<'_, Vec<StageBehavior>> {
        self.inner.behaviors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> ControllerOptions {
        self.inner.options
    }

    /// Run `action` whenever the first stage of a run is entered.
    pub fn on_start<F>(&self, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.behaviors().push(StageBehavior {
            key: BehaviorKey::First,
            action: Arc::new(action),
        });
    }

    /// Run `action` every time `stage` is entered, in this run and later ones.
    pub fn define_stage<F>(&self, stage: Stage, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.behaviors().push(StageBehavior {
            key: BehaviorKey::Stage(stage),
            action: Arc::new(action),
        });
    }

    /// Whether any behavior would run for `stage` at `position`
    pub fn has_behavior(&self, stage: Stage, position: usize) -> bool {
        self.behaviors().iter().any(|b| b.matches(stage, position))
    }

    /// Listen to stage entries for the current run only; cleared at teardown.
    pub fn subscribe_stage_started<F>(&self, handler: F) -> Subscription<Stage>
    where
        F: Fn(&Stage) + Send + Sync + 'static,
    {
        self.inner.stage_started.subscribe(handler)
    }

    /// Listen to stage completions for the current run only; cleared at
    /// teardown.
    pub fn subscribe_stage_ended<F>(&self, handler: F) -> Subscription<Stage>
    where
        F: Fn(&Stage) + Send + Sync + 'static,
    {
        self.inner.stage_ended.subscribe(handler)
    }

    /// Re-dispatch the start notification of the active stage.
    ///
    /// Advancement already enters each stage; this is for callers that need
    /// to replay the entry of the stage that is currently active.
    pub fn enter_stage(&self, stage: Stage) -> Result<(), StageSystemError> {
        let position = {
            let run = self.run();
            let cursor = run.cursor.ok_or_else(|| self.no_active_run())?;
            if run.finishing || run.stages[cursor] != stage {
                return Err(self.not_active(stage, run.current()));
            }
            cursor
        };
        self.dispatch_enter(stage, position);
        Ok(())
    }

    /// Mark `stage` as done and advance to the next stage, or end the run.
    pub fn finish_stage(&self, stage: Stage) -> Result<(), StageSystemError> {
        let (run_id, next) = {
            let mut run = self.run();
            let cursor = run.cursor.ok_or_else(|| self.no_active_run())?;
            if run.finishing || run.stages[cursor] != stage {
                return Err(self.not_active(stage, run.current()));
            }
            run.finishing = true;
            let next = cursor + 1;
            (run.run_id, run.stages.get(next).map(|s| (*s, next)))
        };

        debug!("Transition '{}': stage '{}' finished", self.inner.name, stage);
        self.inner.channels.stage_end.trigger(&stage);
        self.inner.stage_ended.trigger(&stage);

        match next {
            Some((next_stage, position)) => {
                {
                    let mut run = self.run();
                    if run.run_id != run_id {
                        // A stage-end subscriber started another run.
                        return Ok(());
                    }
                    run.cursor = Some(position);
                    run.finishing = false;
                }
                self.dispatch_enter(next_stage, position);
            }
            None => self.complete_run(run_id),
        }
        Ok(())
    }

    /// Tell subscribers the prompt text should appear now.
    pub fn call_prompt(&self) {
        self.inner.channels.prompt_time.trigger(&());
    }

    /// Tell subscribers player input is accepted from now on.
    pub fn call_input(&self) {
        self.inner.channels.input_prompt_time.trigger(&());
    }

    /// Live copy of the current run's sequence
    pub fn stages(&self) -> Vec<Stage> {
        self.run().stages.clone()
    }

    pub fn current_stage(&self) -> Option<Stage> {
        self.run().current()
    }

    pub fn is_running(&self) -> bool {
        self.run().cursor.is_some()
    }

    /// Number of runs started so far
    pub fn run_count(&self) -> u64 {
        self.run().run_id
    }

    /// Start a run of `stages`, entering the first one.
    pub(crate) fn begin_run(&self, stages: &[Stage]) -> Result<(), StageSystemError> {
        let Some(&first) = stages.first() else {
            return Err(StageSystemError::EmptySequence {
                transition: self.inner.name.clone(),
            });
        };
        if self.inner.options.strict_behaviors {
            if let Some((_, stage)) = stages
                .iter()
                .enumerate()
                .find(|(position, stage)| !self.has_behavior(**stage, *position))
            {
                return Err(StageSystemError::MissingBehavior {
                    transition: self.inner.name.clone(),
                    stage: *stage,
                });
            }
        }

        let run_id = {
            let mut run = self.run();
            if let Some(current) = run.current() {
                match self.inner.options.trigger_policy {
                    TriggerPolicy::Reject => {
                        return Err(StageSystemError::RunInProgress {
                            transition: self.inner.name.clone(),
                            current,
                        });
                    }
                    TriggerPolicy::Replace => warn!(
                        "Transition '{}': replacing in-flight run at stage '{}'",
                        self.inner.name, current
                    ),
                }
            }
            run.stages = stages.to_vec();
            run.cursor = Some(0);
            run.finishing = false;
            run.run_id += 1;
            run.run_id
        };

        for node in &self.inner.nodes {
            node.set_paused(false);
            node.set_hidden(false);
        }
        info!(
            "Transition '{}': run #{} started with {} stage(s)",
            self.inner.name,
            run_id,
            stages.len()
        );
        self.dispatch_enter(first, 0);
        Ok(())
    }

    /// Drop every behavior and subscription. Called when the owning handle
    /// goes away.
    pub(crate) fn dispose(&self) {
        self.behaviors().clear();
        self.clear_run_channels();
        self.inner.channels.transition_end.clear();
    }

    fn dispatch_enter(&self, stage: Stage, position: usize) {
        debug!(
            "Transition '{}': entering stage '{}' at position {}",
            self.inner.name, stage, position
        );
        self.inner.channels.stage_start.trigger(&stage);
        self.inner.stage_started.trigger(&stage);

        let actions: Vec<StageAction> = self
            .behaviors()
            .iter()
            .filter(|b| b.matches(stage, position))
            .map(|b| Arc::clone(&b.action))
            .collect();
        if actions.is_empty() {
            warn!(
                "Transition '{}': no behavior registered for stage '{}'; the run will stall",
                self.inner.name, stage
            );
        }
        for action in actions {
            action();
        }
    }

    fn complete_run(&self, run_id: u64) {
        {
            let mut run = self.run();
            if run.run_id != run_id {
                return;
            }
            run.cursor = None;
            run.finishing = false;
        }

        // Clear before notifying so a run chained from a transition-end
        // handler starts without this run's subscribers.
        self.clear_run_channels();
        info!("Transition '{}': run #{} complete", self.inner.name, run_id);
        self.inner.channels.transition_end.take_and_trigger(&());

        let idle = {
            let run = self.run();
            run.run_id == run_id && run.cursor.is_none()
        };
        if !idle {
            return;
        }
        self.clear_run_channels();
        self.inner.channels.transition_end.clear();
        for node in &self.inner.nodes {
            node.set_paused(true);
            node.set_hidden(true);
        }
    }

    fn clear_run_channels(&self) {
        self.inner.stage_started.clear();
        self.inner.stage_ended.clear();
        self.inner.channels.clear_all_but_end();
    }

    fn no_active_run(&self) -> StageSystemError {
        StageSystemError::NoActiveRun {
            transition: self.inner.name.clone(),
        }
    }

    fn not_active(&self, stage: Stage, current: Option<Stage>) -> StageSystemError {
        StageSystemError::StageNotActive {
            transition: self.inner.name.clone(),
            stage,
            current,
        }
    }
}

// Manual Debug implementation
impl fmt::Debug for StageController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run();
        f.debug_struct("StageController")
            .field("name", &self.inner.name)
            .field("stages", &run.stages)
            .field("cursor", &run.cursor)
            .field("behaviors", &self.behaviors().len())
            .finish()
    }
}
