use crate::models::{Achievements, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    FirstMala,
    TenMalas,
    FiftyMalas,
    HundredMalas,
    ConsistentWeek,
}

impl Achievement {
    pub fn all() -> [Achievement; 5] {
        [
            Achievement::FirstMala,
            Achievement::TenMalas,
            Achievement::FiftyMalas,
            Achievement::HundredMalas,
            Achievement::ConsistentWeek,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Achievement::FirstMala => "First Mala",
            Achievement::TenMalas => "10 Malas",
            Achievement::FiftyMalas => "50 Malas",
            Achievement::HundredMalas => "100 Malas",
            Achievement::ConsistentWeek => "Consistent Week",
        }
    }

    pub fn is_set(&self, a: &Achievements) -> bool {
        match self {
            Achievement::FirstMala => a.first_mala,
            Achievement::TenMalas => a.ten_malas,
            Achievement::FiftyMalas => a.fifty_malas,
            Achievement::HundredMalas => a.hundred_malas,
            Achievement::ConsistentWeek => a.consistent_week,
        }
    }
}

/// Achievement flags implied by the current stats, from scratch.
/// `consistent_week` keys off the streak: seven consecutive practiced days
/// ending today.
pub fn derive(stats: &Stats) -> Achievements {
    Achievements {
        first_mala: stats.total_malas >= 1,
        ten_malas: stats.total_malas >= 10,
        fifty_malas: stats.total_malas >= 50,
        hundred_malas: stats.total_malas >= 100,
        consistent_week: stats.streak >= 7,
    }
}

/// Flags only ever go false → true. A derived set is merged over the stored
/// one so recomputation can never unset a previously earned flag.
pub fn merge(prev: Achievements, derived: Achievements) -> Achievements {
    Achievements {
        first_mala: prev.first_mala || derived.first_mala,
        ten_malas: prev.ten_malas || derived.ten_malas,
        fifty_malas: prev.fifty_malas || derived.fifty_malas,
        hundred_malas: prev.hundred_malas || derived.hundred_malas,
        consistent_week: prev.consistent_week || derived.consistent_week,
    }
}

/// Achievements present in `next` but not in `prev`, in announcement order.
pub fn newly_unlocked(prev: Achievements, next: Achievements) -> Vec<Achievement> {
    Achievement::all()
        .into_iter()
        .filter(|a| a.is_set(&next) && !a.is_set(&prev))
        .collect()
}
