use std::fmt;

use crate::stage_manager::Stage;

/// One notification from a transition's lifecycle channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionEvent {
    /// A stage was entered
    StageStart(Stage),
    /// A stage finished
    StageEnd(Stage),
    /// A stage behavior asked for the prompt text to be shown
    PromptTime,
    /// A stage behavior opened the input window
    InputPromptTime,
    /// The last stage of the run finished
    TransitionEnd,
}

impl TransitionEvent {
    /// Dotted event name, as used in logs and CLI output
    pub fn name(&self) -> &'static str {
        match self {
            TransitionEvent::StageStart(_) => "stage.start",
            TransitionEvent::StageEnd(_) => "stage.end",
            TransitionEvent::PromptTime => "prompt.time",
            TransitionEvent::InputPromptTime => "input.time",
            TransitionEvent::TransitionEnd => "transition.end",
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            TransitionEvent::StageStart(stage) | TransitionEvent::StageEnd(stage) => Some(*stage),
            _ => None,
        }
    }
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage() {
            Some(stage) => write!(f, "{} {}", self.name(), stage),
            None => f.write_str(self.name()),
        }
    }
}
