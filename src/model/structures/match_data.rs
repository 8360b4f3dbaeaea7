use crate::model::structures::side::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i32,
    pub username: Option<String>,
    #[serde(default)]
    pub seed: RatingSeed
}

/// Seed values supplied by the caller. Absent values are defaulted per rating system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSeed {
    pub elo: Option<f64>,
    pub custom_rating: Option<f64>,
    pub glicko_rating: Option<f64>,
    pub glicko_deviation: Option<f64>,
    pub glicko_volatility: Option<f64>
}

/// Total order of the match history, compared field by field in declaration order.
/// The engine only compares keys; it never re-sorts the history it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchOrderKey {
    pub game_version: u32,
    #[serde(default)]
    pub manual_sequence: i64,
    pub map_version: u32,
    pub played_at: DateTime<Utc>,
    pub ingestion_id: i64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: i32,
    pub order: MatchOrderKey,
    pub team_one_won: bool,
    /// Set by the ingester for invalidated matches
    #[serde(default)]
    pub excluded: bool,
    pub duration_seconds: f64,
    pub appearances: Vec<Appearance>
}

impl Match {
    pub fn winning_side(&self) -> Side {
        if self.team_one_won {
            Side::One
        } else {
            Side::Two
        }
    }

    pub fn team(&self, side: Side) -> impl Iterator<Item = &Appearance> {
        self.appearances.iter().filter(move |a| a.side == side)
    }

    pub fn team_size(&self, side: Side) -> usize {
        self.team(side).count()
    }

    /// A match is rated only when it is not excluded and both sides are represented.
    pub fn is_rateable(&self) -> bool {
        !self.excluded && self.team(Side::One).next().is_some() && self.team(Side::Two).next().is_some()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.appearances.iter().map(|a| a.player_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appearance {
    pub player_id: i32,
    pub side: Side,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub counters: Option<AppearanceCounters>,
    #[serde(default)]
    pub lifespans: Vec<Lifespan>
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AppearanceCounters {
    pub hero_kills: u32,
    pub hero_deaths: u32,
    pub unit_kills: u32,
    pub objective_kills: u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Hero,
    Unit
}

/// One life of a hero or unit, in seconds from match start.
/// `died_at` is `None` when it survived to the end of the match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifespan {
    pub kind: UnitKind,
    pub spawned_at: f64,
    pub died_at: Option<f64>
}
