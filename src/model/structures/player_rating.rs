use crate::model::{
    constants::{
        CUSTOM_DEFAULT_SEED, DEFAULT_RATING, GLICKO_DEFAULT_DEVIATION, GLICKO_DEFAULT_RATING, GLICKO_DEFAULT_VOLATILITY,
        NEUTRAL_SCORE
    },
    structures::match_data::{MatchOrderKey, Player}
};
use serde::{Deserialize, Serialize};

/// A player's rating state across every rating system.
/// Seed fields are fixed at creation; everything else is rebuilt by replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub player_id: i32,
    pub elo: f64,
    pub elo_seed: f64,
    pub custom_rating: f64,
    pub custom_rating_seed: f64,
    pub custom_rating_games_played: u32,
    pub custom_rating_bonus_wins_remaining: u32,
    pub custom_rating_reached_high_watermark: bool,
    pub glicko_rating: f64,
    pub glicko_rating_seed: f64,
    pub glicko_deviation: f64,
    pub glicko_deviation_seed: f64,
    pub glicko_volatility: f64,
    pub glicko_volatility_seed: f64,
    pub composite_score: f64,
    /// Order key of the most recent match applied to this player
    #[serde(default)]
    pub last_match: Option<MatchOrderKey>
}

impl PlayerRating {
    /// Creates a record at seed values, defaulting any seed the player lacks.
    pub fn seeded(player: &Player) -> PlayerRating {
        let seed = player.seed;
        let elo_seed = seed.elo.unwrap_or(DEFAULT_RATING);
        let custom_rating_seed = seed.custom_rating.unwrap_or(CUSTOM_DEFAULT_SEED);
        let glicko_rating_seed = seed.glicko_rating.unwrap_or(GLICKO_DEFAULT_RATING);
        let glicko_deviation_seed = seed.glicko_deviation.unwrap_or(GLICKO_DEFAULT_DEVIATION);
        let glicko_volatility_seed = seed.glicko_volatility.unwrap_or(GLICKO_DEFAULT_VOLATILITY);

        PlayerRating {
            player_id: player.id,
            elo: elo_seed,
            elo_seed,
            custom_rating: custom_rating_seed,
            custom_rating_seed,
            custom_rating_games_played: 0,
            custom_rating_bonus_wins_remaining: 0,
            custom_rating_reached_high_watermark: false,
            glicko_rating: glicko_rating_seed,
            glicko_rating_seed,
            glicko_deviation: glicko_deviation_seed,
            glicko_deviation_seed,
            glicko_volatility: glicko_volatility_seed,
            glicko_volatility_seed,
            composite_score: NEUTRAL_SCORE,
            last_match: None
        }
    }
}
