use microgame_core::host::SessionState;
use microgame_core::{PlayReport, Stage, TransitionEvent};

/// Line printed for each lifecycle event of a run
pub fn event_line(frame: u64, event: &TransitionEvent) -> String {
    format!("[frame {:>5}] {}", frame, event)
}

pub fn summary_lines(transition: &str, report: &PlayReport, session: &SessionState) -> Vec<String> {
    vec![
        format!(
            "Transition '{}' finished after {} frames ({:.2}s)",
            transition, report.frames, report.elapsed
        ),
        format!(
            "Session: lives {}, score {}, speed {:.2}x, difficulty {}",
            session.lives, session.score, session.speed, session.difficulty
        ),
    ]
}

/// One line per stage kind for the `stages` command
pub fn stage_line(stage: Stage) -> String {
    let kind = match (stage.is_boss(), stage.is_prep()) {
        (true, true) => "boss, prompts",
        (true, false) => "boss",
        (false, true) => "prompts",
        (false, false) => "",
    };
    if kind.is_empty() {
        stage.name().to_string()
    } else {
        format!("{:<9} ({})", stage.name(), kind)
    }
}
