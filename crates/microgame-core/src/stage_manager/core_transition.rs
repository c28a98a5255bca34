use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::host::{BeatClock, CameraNode, HostApp, HostEngine, ParentNode, Vec2};
use crate::kernel::constants;
use crate::stage_manager::definition::{DefinitionError, TransitionContext};
use crate::stage_manager::{Stage, StageController};

/// Length of each stage, in beats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageBeats {
    pub prep: f32,
    pub win: f32,
    pub lose: f32,
    pub boss_prep: f32,
    pub boss_win: f32,
    pub boss_lose: f32,
    pub speed: f32,
}

impl StageBeats {
    pub fn get(&self, stage: Stage) -> f32 {
        match stage {
            Stage::Prep => self.prep,
            Stage::Win => self.win,
            Stage::Lose => self.lose,
            Stage::BossPrep => self.boss_prep,
            Stage::BossWin => self.boss_win,
            Stage::BossLose => self.boss_lose,
            Stage::Speed => self.speed,
        }
    }

    /// Every stage lasting `beats`
    pub fn uniform(beats: f32) -> Self {
        Self {
            prep: beats,
            win: beats,
            lose: beats,
            boss_prep: beats,
            boss_win: beats,
            boss_lose: beats,
            speed: beats,
        }
    }
}

impl Default for StageBeats {
    fn default() -> Self {
        Self {
            prep: 4.0,
            win: 4.0,
            lose: 4.0,
            boss_prep: 8.0,
            boss_win: 8.0,
            boss_lose: 8.0,
            speed: 4.0,
        }
    }
}

/// Point inside a prep stage where the prompt appears, as a fraction of its
/// length
const PROMPT_AT: f32 = 0.5;
/// Point inside a prep stage where input opens
const INPUT_AT: f32 = 0.75;
const BOSS_ZOOM: f32 = 1.2;
const SPEED_TILT: f32 = -8.0;

/// The built-in transition: a banner per stage, timed in beats.
///
/// Every stage puts a text node under the parent, frames it with the camera
/// and finishes after its configured beat count at the current speed. Prep
/// stages also fire the prompt and input moments partway through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultTransition {
    pub bpm: f32,
    pub beats: StageBeats,
}

impl DefaultTransition {
    pub fn new(bpm: f32, beats: StageBeats) -> Self {
        Self { bpm, beats }
    }

    /// Register behaviors for every stage kind on the context's controller.
    pub fn define(self, context: TransitionContext) -> Result<(), DefinitionError> {
        if !(self.bpm > 0.0) {
            return Err(format!("bpm must be positive, got {}", self.bpm).into());
        }

        let camera = context.camera.clone();
        let engine = Arc::clone(&context.engine);
        context.controller.on_start(move || {
            camera.set_position(engine.viewport().center());
            camera.set_scale(Vec2::ONE);
            camera.set_angle(0.0);
        });

        for stage in Stage::ALL {
            let behavior = StageBehavior {
                stage,
                beats: self.beats.get(stage),
                bpm: self.bpm,
                parent: context.parent.clone(),
                camera: context.camera.clone(),
                controller: context.controller.clone(),
                app: Arc::clone(&context.app),
                engine: Arc::clone(&context.engine),
            };
            context.controller.define_stage(stage, move || behavior.play());
        }
        Ok(())
    }
}

impl Default for DefaultTransition {
    fn default() -> Self {
        Self::new(constants::DEFAULT_BPM, StageBeats::default())
    }
}

/// Banner text for a stage
pub fn banner_text(stage: Stage, app: &dyn HostApp) -> String {
    match stage {
        Stage::Prep => format!("GET READY! lives: {}", app.lives()),
        Stage::Win => "NICE!".to_string(),
        Stage::Lose => format!("OOPS! lives: {}", app.lives()),
        Stage::BossPrep => format!("BOSS STAGE! lives: {}", app.lives()),
        Stage::BossWin => "BOSS CLEARED!".to_string(),
        Stage::BossLose => format!("BOSS FAILED! lives: {}", app.lives()),
        Stage::Speed => format!("SPEED UP! {:.2}x", app.speed()),
    }
}

struct StageBehavior {
    stage: Stage,
    beats: f32,
    bpm: f32,
    parent: ParentNode,
    camera: CameraNode,
    controller: StageController,
    app: Arc<dyn HostApp>,
    engine: Arc<dyn HostEngine>,
}

impl StageBehavior {
    fn play(&self) {
        let viewport = self.engine.viewport();
        self.camera.set_position(viewport.center());
        if self.stage.is_boss() {
            self.camera.set_scale(Vec2::splat(BOSS_ZOOM));
        }
        if self.stage == Stage::Speed {
            self.camera.set_angle(SPEED_TILT);
        }

        let banner = self.parent.add_child(format!("banner.{}", self.stage));
        banner.set_position(viewport.center());
        banner.set_text(banner_text(self.stage, self.app.as_ref()));

        let duration = BeatClock::beats_to_seconds(self.beats, self.bpm, self.app.speed());
        debug!("Stage '{}' plays for {:.3}s", self.stage, duration);

        if self.stage.is_prep() {
            let controller = self.controller.clone();
            self.engine
                .wait(duration * PROMPT_AT, Box::new(move || controller.call_prompt()));
            let controller = self.controller.clone();
            self.engine
                .wait(duration * INPUT_AT, Box::new(move || controller.call_input()));
        }

        let stage = self.stage;
        let parent = self.parent.clone();
        let camera = self.camera.clone();
        let controller = self.controller.clone();
        self.engine.wait(
            duration,
            Box::new(move || {
                parent.remove_child(&banner);
                camera.set_scale(Vec2::ONE);
                camera.set_angle(0.0);
                if let Err(e) = controller.finish_stage(stage) {
                    warn!("Stage '{}' timer fired outside its run: {}", stage, e);
                }
            }),
        );
    }
}
