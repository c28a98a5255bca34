use std::fmt;
use std::ops::{Add, Mul};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// 2D vector used for positions and scales
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(value: f32) -> Self {
        Self { x: value, y: value }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug)]
struct NodeState {
    name: String,
    position: Vec2,
    scale: Vec2,
    angle: f32,
    paused: bool,
    hidden: bool,
    text: Option<String>,
    children: Vec<SceneNode>,
}

/// Shared handle to a node in the host's scene graph.
///
/// Clones refer to the same node. Paused and hidden flags are plain state
/// here; the host engine decides what they mean for updates and drawing.
#[derive(Clone)]
pub struct SceneNode {
    state: Arc<Mutex<NodeState>>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(NodeState {
                name: name.into(),
                position: Vec2::ZERO,
                scale: Vec2::ONE,
                angle: 0.0,
                paused: false,
                hidden: false,
                text: None,
                children: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn position(&self) -> Vec2 {
        self.lock().position
    }

    pub fn set_position(&self, position: Vec2) {
        self.lock().position = position;
    }

    pub fn scale(&self) -> Vec2 {
        self.lock().scale
    }

    pub fn set_scale(&self, scale: Vec2) {
        self.lock().scale = scale;
    }

    /// Rotation in degrees
    pub fn angle(&self) -> f32 {
        self.lock().angle
    }

    pub fn set_angle(&self, angle: f32) {
        self.lock().angle = angle;
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.lock().paused = paused;
    }

    pub fn is_hidden(&self) -> bool {
        self.lock().hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.lock().hidden = hidden;
    }

    /// Text drawn by the node, if it is a text node
    pub fn text(&self) -> Option<String> {
        self.lock().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.lock().text = Some(text.into());
    }

    /// Create a child node and attach it
    pub fn add_child(&self, name: impl Into<String>) -> SceneNode {
        let child = SceneNode::new(name);
        self.lock().children.push(child.clone());
        child
    }

    /// Detach a child. Returns `false` if it was not a child of this node.
    pub fn remove_child(&self, child: &SceneNode) -> bool {
        let mut state = self.lock();
        let len_before = state.children.len();
        state.children.retain(|c| !c.ptr_eq(child));
        state.children.len() < len_before
    }

    pub fn children(&self) -> Vec<SceneNode> {
        self.lock().children.clone()
    }

    pub fn clear_children(&self) {
        self.lock().children.clear();
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(&self, other: &SceneNode) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SceneNode")
            .field("name", &state.name)
            .field("position", &state.position)
            .field("paused", &state.paused)
            .field("hidden", &state.hidden)
            .field("children", &state.children.len())
            .finish()
    }
}

/// Position-only view of a transition's parent node.
#[derive(Debug, Clone)]
pub struct ParentNode {
    node: SceneNode,
}

impl ParentNode {
    pub(crate) fn new(node: SceneNode) -> Self {
        Self { node }
    }

    pub fn position(&self) -> Vec2 {
        self.node.position()
    }

    pub fn set_position(&self, position: Vec2) {
        self.node.set_position(position);
    }

    pub fn add_child(&self, name: impl Into<String>) -> SceneNode {
        self.node.add_child(name)
    }

    pub fn remove_child(&self, child: &SceneNode) -> bool {
        self.node.remove_child(child)
    }

    pub fn children(&self) -> Vec<SceneNode> {
        self.node.children()
    }
}

/// Camera-like view: position, scale and rotation for framing a transition.
#[derive(Debug, Clone)]
pub struct CameraNode {
    node: SceneNode,
}

impl CameraNode {
    pub(crate) fn new(node: SceneNode) -> Self {
        Self { node }
    }

    pub fn position(&self) -> Vec2 {
        self.node.position()
    }

    pub fn set_position(&self, position: Vec2) {
        self.node.set_position(position);
    }

    pub fn scale(&self) -> Vec2 {
        self.node.scale()
    }

    pub fn set_scale(&self, scale: Vec2) {
        self.node.set_scale(scale);
    }

    pub fn angle(&self) -> f32 {
        self.node.angle()
    }

    pub fn set_angle(&self, angle: f32) {
        self.node.set_angle(angle);
    }

    pub fn add_child(&self, name: impl Into<String>) -> SceneNode {
        self.node.add_child(name)
    }

    pub fn remove_child(&self, child: &SceneNode) -> bool {
        self.node.remove_child(child)
    }
}
