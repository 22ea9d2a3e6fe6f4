use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    NotStarted,
    Running,
    Completed,
    TimedOut,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::NotStarted
    }
}

impl SessionState {
    /// Completed and TimedOut accept no further placements, hints or ticks.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::TimedOut)
    }
}
