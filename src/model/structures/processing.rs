use crate::model::structures::{player_rating::PlayerRating, rating_system::RatingSystem, side::Side};
use serde::{Deserialize, Serialize};

/// Audit record written onto an appearance by a rating pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppearanceSnapshot {
    pub match_id: i32,
    pub player_id: i32,
    pub system: RatingSystem,
    pub rating_before_match: f64,
    pub rating_change: f64
}

/// Why a match contributed nothing to a pass. Skips are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Excluded,
    SingleSided,
    NoRatedPlayers(Side)
}

/// Result of computing one match against the pre-match state.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRating<U> {
    Rated(Vec<U>),
    Skipped(SkipReason)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFailure {
    pub match_id: i32,
    pub reason: String
}

/// Summary of a single replay pass over the match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    pub system: RatingSystem,
    pub processed: usize,
    pub skipped: usize,
    pub failures: Vec<MatchFailure>
}

impl PassReport {
    pub fn new(system: RatingSystem) -> PassReport {
        PassReport {
            system,
            processed: 0,
            skipped: 0,
            failures: Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationResult {
    pub ratings: Vec<PlayerRating>,
    pub snapshots: Vec<AppearanceSnapshot>,
    pub reports: Vec<PassReport>
}
