use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};

use crate::event::{Subscription, TransitionEvent};
use crate::host::{BeatClock, GameSession, HeadlessEngine, HostApp, HostEngine};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::stage_manager::{
    create_transition, DefaultTransition, DefinitionError, Stage, TransitionContext, TransitionHandle,
    TransitionObserver,
};
use crate::storage::RuntimeConfig;

/// Collects the lifecycle events of one run.
#[derive(Debug)]
pub struct RunRecorder {
    transition: String,
    events: Arc<Mutex<Vec<TransitionEvent>>>,
    observer: TransitionObserver,
}

impl RunRecorder {
    /// Take the events recorded since the last call
    pub fn drain(&self) -> Vec<TransitionEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn transition(&self) -> &str {
        &self.transition
    }

    /// Whether the observed run reached its transition end
    pub fn is_finished(&self) -> bool {
        // Teardown empties every channel the observer was attached to.
        !self.observer.is_active()
    }
}

/// Report of a run played to completion by [`Application::play`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayReport {
    pub frames: u64,
    /// Engine time spent in the run, in seconds
    pub elapsed: f64,
    pub events: Vec<TransitionEvent>,
}

/// Headless runtime: a game session, an engine and the transitions built on
/// them, stepped frame by frame.
pub struct Application {
    config: RuntimeConfig,
    session: GameSession,
    engine: Arc<HeadlessEngine>,
    beat: BeatClock,
    transitions: HashMap<String, TransitionHandle>,
}

impl Application {
    /// Build the runtime from `config` and register the default transition
    /// under [`constants::DEFAULT_TRANSITION`].
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let session = GameSession::new(config.session.speed, config.session.lives, config.session.difficulty);
        let engine = Arc::new(HeadlessEngine::new(config.engine.viewport()));
        let beat = BeatClock::new(config.transition.bpm);
        beat.on_beat(|beat| debug!("Beat {}", beat));

        let mut app = Self {
            config,
            session,
            engine,
            beat,
            transitions: HashMap::new(),
        };
        let default = DefaultTransition::new(app.config.transition.bpm, app.config.transition.beats);
        app.register_transition(constants::DEFAULT_TRANSITION, move |context| default.define(context))?;
        Ok(app)
    }

    /// Load the config file at `path` and build the runtime from it
    pub fn from_config_path(path: &Path) -> Result<Self> {
        let config = RuntimeConfig::load(path)?;
        info!("Loaded config from {}", path.display());
        Self::new(config)
    }

    /// Build a transition against this runtime's session and engine.
    pub fn register_transition<F>(&mut self, name: &str, definition: F) -> Result<()>
    where
        F: FnOnce(TransitionContext) -> std::result::Result<(), DefinitionError>,
    {
        if self.transitions.contains_key(name) {
            return Err(Error::TransitionAlreadyExists { name: name.to_string() });
        }
        let app: Arc<dyn HostApp> = Arc::new(self.session.clone());
        let engine: Arc<dyn HostEngine> = self.engine.clone();
        let handle = create_transition(name, definition, app, engine, self.config.transition.controller)?;
        self.transitions.insert(name.to_string(), handle);
        Ok(())
    }

    pub fn transition(&self, name: &str) -> Result<&TransitionHandle> {
        self.transitions
            .get(name)
            .ok_or_else(|| Error::TransitionNotFound { name: name.to_string() })
    }

    /// Registered transition names, sorted
    pub fn transition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.transitions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn engine(&self) -> &Arc<HeadlessEngine> {
        &self.engine
    }

    pub fn beat(&self) -> &BeatClock {
        &self.beat
    }

    /// Trigger `stages` on the named transition and start recording its
    /// events. The session reacts to finished stages: wins score, losses
    /// cost a life, speed stages raise the speed.
    pub fn start(&self, name: &str, stages: &[Stage]) -> Result<RunRecorder> {
        let handle = self.transition(name)?;

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let observer = handle.observe(move |event| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).push(event);
        });
        let bookkeeping = self.track_session(handle);

        if let Err(e) = handle.trigger(stages) {
            observer.cancel();
            for subscription in &bookkeeping {
                subscription.cancel();
            }
            return Err(e.into());
        }
        Ok(RunRecorder {
            transition: name.to_string(),
            events,
            observer,
        })
    }

    /// Advance the engine and the beat clock by one frame
    pub fn step(&mut self) -> usize {
        let dt = self.config.engine.frame_time();
        let fired = self.engine.tick(dt);
        self.beat
            .advance(f64::from(dt) * f64::from(self.session.speed()));
        fired
    }

    /// Play `stages` to completion as fast as possible.
    ///
    /// Fails with [`Error::RunStalled`] when the run is still going after the
    /// configured frame budget.
    pub fn play<F>(&mut self, name: &str, stages: &[Stage], mut on_event: F) -> Result<PlayReport>
    where
        F: FnMut(u64, TransitionEvent),
    {
        let recorder = self.start(name, stages)?;
        let started_at = self.engine.time();
        let mut events = Vec::new();
        let mut frames = 0;

        // Un-animated stages can finish inside the trigger call itself.
        for event in recorder.drain() {
            on_event(frames, event);
            events.push(event);
        }
        while !recorder.is_finished() {
            if frames >= self.config.engine.max_frames {
                let stage = self.transition(name)?.controller().current_stage();
                warn!("Transition '{}' stalled at stage {:?}", name, stage);
                return Err(Error::RunStalled {
                    transition: name.to_string(),
                    frames,
                    stage,
                });
            }
            self.step();
            frames += 1;
            for event in recorder.drain() {
                on_event(frames, event);
                events.push(event);
            }
        }

        Ok(PlayReport {
            frames,
            elapsed: self.engine.time() - started_at,
            events,
        })
    }

    fn track_session(&self, handle: &TransitionHandle) -> Vec<Subscription<Stage>> {
        Stage::ALL
            .into_iter()
            .filter_map(|stage| {
                let session = self.session.clone();
                let step = self.config.session.speed_step;
                let action: Box<dyn Fn() + Send + Sync> = match stage {
                    Stage::Win | Stage::BossWin => Box::new(move || {
                        session.record_win();
                    }),
                    Stage::Lose | Stage::BossLose => Box::new(move || {
                        session.lose_life();
                    }),
                    Stage::Speed => Box::new(move || {
                        session.speed_up(step);
                    }),
                    Stage::Prep | Stage::BossPrep => return None,
                };
                Some(handle.on_stage_end(stage, action))
            })
            .collect()
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("session", &self.session.snapshot())
            .field("engine", &self.engine)
            .field("transitions", &self.transition_names())
            .finish()
    }
}
