pub mod achievements;
pub mod autocount;
pub mod events;
pub mod practice;
pub mod streak;

use thiserror::Error;

pub use achievements::Achievement;
pub use events::{EngineEvent, Kind, Pulse};
pub use practice::{EngineOptions, PracticeEngine, Session};

/// Invalid configuration input, rejected at the engine boundary.
/// State is unchanged when one of these comes back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("goal must be between 1 and 108 malas, got {0}")]
    GoalOutOfRange(u32),
    #[error("playback speed must be positive, got {0}")]
    NonPositiveSpeed(f64),
}
