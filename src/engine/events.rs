use crate::engine::achievements::Achievement;

/// Notification severity, mirrored by the TUI toast colors and the CLI ANSI
/// colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Soft,
    Strong,
}

/// Side effects of an engine operation. Mutations never call collaborators
/// directly; they queue events the caller drains on its own turn, so a
/// playback-ended handler can never re-enter the engine mid-mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Haptic cue. No message; the UI may flash instead.
    Haptic(Pulse),
    /// Completion-bell cue for the playback layer.
    Chime,
    MalaCompleted { session_malas: u32 },
    GoalAchieved { goal: u32 },
    AchievementUnlocked(Achievement),
    PlaybackToggled { playing: bool },
    SpeedChanged { speed: f64 },
    GoalChanged { goal: u32 },
    AutoRepeatToggled { enabled: bool },
    SessionReset,
    AllReset,
    PlaybackFailed { reason: String },
}

impl EngineEvent {
    /// Human-readable notification text. `None` for pure driver cues.
    pub fn message(&self) -> Option<String> {
        match self {
            EngineEvent::Haptic(_) | EngineEvent::Chime => None,
            EngineEvent::MalaCompleted { session_malas } => {
                Some(format!("Mala completed ({})", session_malas))
            }
            EngineEvent::GoalAchieved { goal } => {
                Some(format!("Daily goal achieved — {} malas", goal))
            }
            EngineEvent::AchievementUnlocked(a) => {
                Some(format!("Achievement unlocked: {}", a.display_name()))
            }
            EngineEvent::PlaybackToggled { playing } => Some(
                if *playing {
                    "Playback started".to_string()
                } else {
                    "Playback paused".to_string()
                },
            ),
            EngineEvent::SpeedChanged { speed } => Some(format!("Playback speed ×{}", speed)),
            EngineEvent::GoalChanged { goal } => {
                Some(format!("Daily goal set to {} malas", goal))
            }
            EngineEvent::AutoRepeatToggled { enabled } => Some(
                if *enabled {
                    "Auto-count enabled".to_string()
                } else {
                    "Auto-count disabled".to_string()
                },
            ),
            EngineEvent::SessionReset => Some("Session count reset".to_string()),
            EngineEvent::AllReset => Some("All counts have been reset".to_string()),
            EngineEvent::PlaybackFailed { reason } => Some(format!("Playback failed: {}", reason)),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            EngineEvent::GoalAchieved { .. }
            | EngineEvent::AchievementUnlocked(_)
            | EngineEvent::AllReset => Kind::Success,
            EngineEvent::PlaybackFailed { .. } => Kind::Error,
            _ => Kind::Info,
        }
    }
}
