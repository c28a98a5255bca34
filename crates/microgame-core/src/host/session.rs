use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;
use serde::{Deserialize, Serialize};

use crate::host::{Difficulty, HostApp};

/// Snapshot of a player's run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub speed: f32,
    pub lives: u32,
    pub difficulty: Difficulty,
    /// Microgames cleared so far
    pub score: u32,
}

/// In-memory game session backing the [`HostApp`] view.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: Arc<Mutex<SessionState>>,
}

impl GameSession {
    pub fn new(speed: f32, lives: u32, difficulty: Difficulty) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                speed,
                lives,
                difficulty,
                score: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionState {
        *self.lock()
    }

    pub fn score(&self) -> u32 {
        self.lock().score
    }

    pub fn record_win(&self) -> u32 {
        let mut state = self.lock();
        state.score += 1;
        state.score
    }

    /// Lose a life, saturating at zero. Returns the lives left.
    pub fn lose_life(&self) -> u32 {
        let mut state = self.lock();
        state.lives = state.lives.saturating_sub(1);
        state.lives
    }

    /// Raise the speed multiplier by `step`. Returns the new speed.
    pub fn speed_up(&self, step: f32) -> f32 {
        let mut state = self.lock();
        state.speed += step;
        info!("Speed raised to {:.2}x", state.speed);
        state.speed
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.lock().difficulty = difficulty;
    }

    pub fn is_over(&self) -> bool {
        self.lock().lives == 0
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(1.0, crate::kernel::constants::DEFAULT_LIVES, Difficulty::default())
    }
}

impl HostApp for GameSession {
    fn speed(&self) -> f32 {
        self.lock().speed
    }

    fn lives(&self) -> u32 {
        self.lock().lives
    }

    fn difficulty(&self) -> Difficulty {
        self.lock().difficulty
    }
}
