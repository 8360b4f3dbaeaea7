use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{
    constants::{DEFAULT_CONTRIBUTION, RATING_FEATURE_SCALE},
    features::{FeatureSet, PerformanceAccumulator},
    rating_tracker::RatingState,
    score::ScoreEngine,
    structures::{feature_key::FeatureKey, feature_vector::FeatureVector, player_rating::PlayerRating}
};

/// Everything the lobby tools need to know about a player after a full pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: i32,
    pub games_played: u32,
    /// Lifetime features, with `rating` taken from current Elo
    pub features: FeatureVector,
    pub elo: f64,
    pub custom_rating: f64,
    pub composite_score: f64,
    pub faction_games: BTreeMap<String, u32>
}

impl PlayerProfile {
    pub fn new(rating: &PlayerRating, accumulator: &PerformanceAccumulator) -> PlayerProfile {
        let mut features = accumulator.features(DEFAULT_CONTRIBUTION);
        features[FeatureKey::Rating] = rating.elo / RATING_FEATURE_SCALE;
        features[FeatureKey::RatingDifferential] = 0.0;

        PlayerProfile {
            player_id: rating.player_id,
            games_played: accumulator.games_played,
            features,
            elo: rating.elo,
            custom_rating: rating.custom_rating,
            composite_score: rating.composite_score,
            faction_games: accumulator.faction_games.clone()
        }
    }

    pub fn faction_games(&self, faction: &str) -> u32 {
        self.faction_games.get(faction).copied().unwrap_or(0)
    }
}

/// Builds and scores a profile for every player in `state`, keeping its order.
///
/// Runs after replay is complete, so players are independent and handled in parallel.
pub fn build_profiles(state: &RatingState, features: &FeatureSet, scorer: &ScoreEngine) -> IndexMap<i32, PlayerProfile> {
    let empty = PerformanceAccumulator::default();
    let ratings: Vec<&PlayerRating> = state.ratings().collect();

    let profiles: Vec<PlayerProfile> = ratings
        .par_iter()
        .map(|rating| {
            let accumulator = features.accumulators.get(&rating.player_id).unwrap_or(&empty);
            let mut profile = PlayerProfile::new(rating, accumulator);
            profile.composite_score = scorer.score(&profile.features, profile.games_played);

            profile
        })
        .collect();

    profiles.into_iter().map(|p| (p.player_id, p)).collect()
}
