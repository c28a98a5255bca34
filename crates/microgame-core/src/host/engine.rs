use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::host::{HostEngine, SceneNode, Viewport, WaitCallback};

/// Identifier of a scheduled callback
pub type TimerId = u64;

struct Timer {
    id: TimerId,
    deadline: f64,
    callback: WaitCallback,
}

struct EngineState {
    now: f64,
    frame: u64,
    next_timer_id: TimerId,
    timers: Vec<Timer>,
    nodes: Vec<SceneNode>,
}

/// Frame-driven engine without a renderer.
///
/// Time only moves when [`HeadlessEngine::tick`] is called. Callbacks
/// scheduled with `wait` fire from `tick` in deadline order, ties broken by
/// scheduling order. A callback scheduled while timers are firing runs on a
/// later tick at the earliest.
pub struct HeadlessEngine {
    viewport: Viewport,
    state: Mutex<EngineState>,
}

impl HeadlessEngine {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            state: Mutex::new(EngineState {
                now: 0.0,
                frame: 0,
                next_timer_id: 1,
                timers: Vec::new(),
                nodes: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the clock by `dt` seconds and fire every due callback.
    /// Returns how many callbacks fired.
    pub fn tick(&self, dt: f32) -> usize {
        let due = {
            let mut state = self.lock();
            state.frame += 1;
            state.now += f64::from(dt.max(0.0));
            let now = state.now;
            let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
                state.timers.drain(..).partition(|t| t.deadline <= now);
            state.timers = pending;
            due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline).then(a.id.cmp(&b.id)));
            due
        };

        let fired = due.len();
        for timer in due {
            trace!("Firing timer {} (deadline {:.3}s)", timer.id, timer.deadline);
            (timer.callback)();
        }
        fired
    }

    /// Drop a pending callback. Returns `false` if it already fired.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut state = self.lock();
        let len_before = state.timers.len();
        state.timers.retain(|t| t.id != id);
        state.timers.len() < len_before
    }

    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    pub fn frame(&self) -> u64 {
        self.lock().frame
    }

    /// Root-level nodes created through [`HostEngine::add_node`]
    pub fn nodes(&self) -> Vec<SceneNode> {
        self.lock().nodes.clone()
    }

    pub fn find_node(&self, name: &str) -> Option<SceneNode> {
        self.lock().nodes.iter().find(|n| n.name() == name).cloned()
    }
}

impl HostEngine for HeadlessEngine {
    fn add_node(&self, name: &str) -> SceneNode {
        let node = SceneNode::new(name);
        self.lock().nodes.push(node.clone());
        debug!("Added scene node '{}'", name);
        node
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn time(&self) -> f64 {
        self.lock().now
    }

    fn wait(&self, seconds: f32, callback: WaitCallback) -> TimerId {
        let mut state = self.lock();
        let id = state.next_timer_id;
        state.next_timer_id += 1;
        let deadline = state.now + f64::from(seconds.max(0.0));
        state.timers.push(Timer { id, deadline, callback });
        id
    }
}

impl fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("HeadlessEngine")
            .field("viewport", &self.viewport)
            .field("now", &state.now)
            .field("frame", &state.frame)
            .field("pending_timers", &state.timers.len())
            .field("nodes", &state.nodes.len())
            .finish()
    }
}
