use crate::model::{
    constants::{ELO_K_FACTOR, ELO_SCALE},
    engine::{ensure_finite, RatingEngine, RatingUpdate},
    error::ProcessingError,
    rating_tracker::RatingState,
    structures::{
        match_data::Match,
        processing::MatchRating,
        rating_system::RatingSystem
    },
    teams::{actual_score, skip_reason, team_averages, validate_match}
};

/// Logistic expected score of `player` against `opponent`.
pub fn expected_score(player: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - player) / ELO_SCALE))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloUpdate {
    pub player_id: i32,
    pub rating_before: f64,
    pub rating_change: f64
}

impl RatingUpdate for EloUpdate {
    fn player_id(&self) -> i32 {
        self.player_id
    }

    fn rating_before(&self) -> f64 {
        self.rating_before
    }

    fn rating_change(&self) -> f64 {
        self.rating_change
    }
}

/// Classic Elo where each player is rated against the opposing team's mean rating.
#[derive(Debug, Clone, Copy)]
pub struct EloEngine {
    pub k_factor: f64
}

impl Default for EloEngine {
    fn default() -> Self {
        EloEngine {
            k_factor: ELO_K_FACTOR
        }
    }
}

impl RatingEngine for EloEngine {
    type Update = EloUpdate;

    fn system(&self) -> RatingSystem {
        RatingSystem::Elo
    }

    fn reset(&self, mut state: RatingState) -> RatingState {
        for rating in state.ratings_mut() {
            rating.elo = rating.elo_seed;
        }

        state
    }

    fn rate(&self, state: &RatingState, match_: &Match) -> Result<MatchRating<EloUpdate>, ProcessingError> {
        if let Some(reason) = skip_reason(match_) {
            return Ok(MatchRating::Skipped(reason));
        }
        validate_match(match_)?;

        let averages = match team_averages(state, match_, |r| r.elo) {
            Ok(averages) => averages,
            Err(reason) => return Ok(MatchRating::Skipped(reason))
        };

        let mut updates = Vec::with_capacity(match_.appearances.len());
        for appearance in &match_.appearances {
            let Some(rating) = state.get_rating(appearance.player_id) else {
                continue;
            };

            let opponent = *averages.get(appearance.side.opposite());
            let expected = expected_score(rating.elo, opponent);
            let actual = actual_score(match_, appearance.side);
            let rating_change = (self.k_factor * (actual - expected)).round();

            ensure_finite(match_.id, rating.player_id, &[rating.elo + rating_change])?;

            updates.push(EloUpdate {
                player_id: rating.player_id,
                rating_before: rating.elo,
                rating_change
            });
        }

        Ok(MatchRating::Rated(updates))
    }

    fn apply(&self, mut state: RatingState, updates: &[EloUpdate]) -> RatingState {
        for update in updates {
            if let Some(rating) = state.get_rating_mut(update.player_id) {
                rating.elo = update.rating_before + update.rating_change;
            }
        }

        state
    }
}
