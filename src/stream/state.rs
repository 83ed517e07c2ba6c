//! Session lifecycle states.

use std::fmt;

/// `Idle -> Requesting -> Streaming -> {Completed | Failed}`.
///
/// `Requesting` may also go straight to `Failed`. Nothing leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }

    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Requesting)
                | (Requesting, Streaming)
                | (Requesting, Failed)
                | (Streaming, Completed)
                | (Streaming, Failed)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Requesting => "requesting",
            SessionPhase::Streaming => "streaming",
            SessionPhase::Completed => "completed",
            SessionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
