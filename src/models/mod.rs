pub mod sound;
pub mod stats;

pub use sound::Sound;
pub use stats::{
    date_str, Achievements, DayRecord, Snapshot, Stats, DATE_FMT, DEFAULT_GOAL_MALAS,
    MANTRAS_PER_MALA, MAX_GOAL_MALAS, MIN_GOAL_MALAS,
};
