use crate::model::{
    constants::{
        BONUS_BANK_MAX, BONUS_SEED_CEILING, BONUS_SEED_FLOOR, CUSTOM_INDIVIDUAL_WEIGHT, CUSTOM_TEAM_WEIGHT,
        ESTABLISHED_RATING, HIGH_WATERMARK_RATING, K_FACTOR_ESTABLISHED, K_FACTOR_PROVISIONAL, K_FACTOR_STANDARD,
        PROVISIONAL_GAMES
    },
    elo::expected_score,
    engine::{ensure_finite, RatingEngine, RatingUpdate},
    error::ProcessingError,
    rating_tracker::RatingState,
    structures::{
        match_data::Match,
        player_rating::PlayerRating,
        processing::MatchRating,
        rating_system::RatingSystem
    },
    teams::{actual_score, skip_reason, team_averages, validate_match}
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomRatingUpdate {
    pub player_id: i32,
    pub rating_before: f64,
    /// Includes any win bonus
    pub rating_change: f64,
    pub k_factor: f64,
    pub bonus: u32
}

impl RatingUpdate for CustomRatingUpdate {
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

/// Team-weighted Elo variant with a decaying K-factor and a bonus bank for
/// low-seeded players.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomRatingEngine;

/// Number of bonus wins granted to a player seeded at `seed`.
pub fn bonus_bank(seed: f64) -> u32 {
    let span = BONUS_SEED_CEILING - BONUS_SEED_FLOOR;
    let fraction = ((BONUS_SEED_CEILING - seed) / span).clamp(0.0, 1.0);

    (BONUS_BANK_MAX as f64 * fraction).round() as u32
}

/// K-factor for the player's next match, evaluated against pre-match state.
pub fn k_factor(rating: &PlayerRating) -> f64 {
    if rating.custom_rating_reached_high_watermark || rating.custom_rating >= HIGH_WATERMARK_RATING {
        return K_FACTOR_ESTABLISHED;
    }

    if rating.custom_rating >= ESTABLISHED_RATING {
        return K_FACTOR_ESTABLISHED;
    }

    if rating.custom_rating_games_played < PROVISIONAL_GAMES {
        return K_FACTOR_PROVISIONAL;
    }

    K_FACTOR_STANDARD
}

impl RatingEngine for CustomRatingEngine {
    type Update = CustomRatingUpdate;

    fn system(&self) -> RatingSystem {
        RatingSystem::Custom
    }

    fn reset(&self, mut state: RatingState) -> RatingState {
        for rating in state.ratings_mut() {
            let seed = rating.custom_rating_seed;

            rating.custom_rating = seed;
            rating.custom_rating_games_played = 0;
            rating.custom_rating_bonus_wins_remaining = bonus_bank(seed);
            rating.custom_rating_reached_high_watermark = seed >= HIGH_WATERMARK_RATING;
        }

        state
    }

    fn rate(&self, state: &RatingState, match_: &Match) -> Result<MatchRating<CustomRatingUpdate>, ProcessingError> {
        if let Some(reason) = skip_reason(match_) {
            return Ok(MatchRating::Skipped(reason));
        }
        validate_match(match_)?;

        let averages = match team_averages(state, match_, |r| r.custom_rating) {
            Ok(averages) => averages,
            Err(reason) => return Ok(MatchRating::Skipped(reason))
        };

        let mut updates = Vec::with_capacity(match_.appearances.len());
        for appearance in &match_.appearances {
            let Some(rating) = state.get_rating(appearance.player_id) else {
                continue;
            };

            let own_team = *averages.get(appearance.side);
            let opponent = *averages.get(appearance.side.opposite());
            let effective = CUSTOM_INDIVIDUAL_WEIGHT * rating.custom_rating + CUSTOM_TEAM_WEIGHT * own_team;

            let k = k_factor(rating);
            let actual = actual_score(match_, appearance.side);
            let base_change = (k * (actual - expected_score(effective, opponent))).round();

            let bonus = if actual > 0.0 {
                rating.custom_rating_bonus_wins_remaining
            } else {
                0
            };
            let rating_change = base_change + bonus as f64;

            ensure_finite(match_.id, rating.player_id, &[rating.custom_rating + rating_change])?;

            updates.push(CustomRatingUpdate {
                player_id: rating.player_id,
                rating_before: rating.custom_rating,
                rating_change,
                k_factor: k,
                bonus
            });
        }

        Ok(MatchRating::Rated(updates))
    }

    fn apply(&self, mut state: RatingState, updates: &[CustomRatingUpdate]) -> RatingState {
        for update in updates {
            let Some(rating) = state.get_rating_mut(update.player_id) else {
                continue;
            };

            rating.custom_rating = update.rating_before + update.rating_change;
            rating.custom_rating_games_played += 1;

            if update.bonus > 0 {
                rating.custom_rating_bonus_wins_remaining -= 1;
            }

            if rating.custom_rating >= HIGH_WATERMARK_RATING {
                rating.custom_rating_reached_high_watermark = true;
            }
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            constants::{K_FACTOR_ESTABLISHED, K_FACTOR_PROVISIONAL, K_FACTOR_STANDARD},
            custom_rating::{bonus_bank, k_factor, CustomRatingEngine, CustomRatingUpdate},
            elo::expected_score,
            engine::RatingEngine,
            rating_tracker::RatingState,
            structures::{match_data::Match, processing::MatchRating}
        },
        utils::test_utils::{generate_match, generate_player}
    };

    fn play(engine: &CustomRatingEngine, state: RatingState, m: &Match) -> (RatingState, Vec<CustomRatingUpdate>) {
        let updates = match engine.rate(&state, m).unwrap() {
            MatchRating::Rated(updates) => updates,
            MatchRating::Skipped(reason) => panic!("Match {} skipped: {:?}", m.id, reason)
        };

        (engine.apply(state, &updates), updates)
    }

    #[test]
    fn test_bonus_bank_by_seed() {
        assert_eq!(bonus_bank(1300.0), 20);
        assert_eq!(bonus_bank(1000.0), 20);
        assert_eq!(bonus_bank(1400.0), 10);
        assert_eq!(bonus_bank(1500.0), 0);
        assert_eq!(bonus_bank(1900.0), 0);
    }

    #[test]
    fn test_reset_sets_bank_and_watermark() {
        let engine = CustomRatingEngine;
        let state = RatingState::seeded(&[generate_player(1, Some(1300.0)), generate_player(2, Some(2050.0))]);

        let state = engine.reset(state);

        let low = state.get_rating(1).unwrap();
        assert_eq!(low.custom_rating_bonus_wins_remaining, 20);
        assert!(!low.custom_rating_reached_high_watermark);

        let high = state.get_rating(2).unwrap();
        assert_eq!(high.custom_rating_bonus_wins_remaining, 0);
        assert!(high.custom_rating_reached_high_watermark);
    }

    #[test]
    fn test_k_factor_precedence() {
        let mut rating = engine_reset_rating(1300.0);
        assert_eq!(k_factor(&rating), K_FACTOR_PROVISIONAL);

        rating.custom_rating_games_played = 30;
        assert_eq!(k_factor(&rating), K_FACTOR_STANDARD);

        rating.custom_rating = 1850.0;
        rating.custom_rating_games_played = 0;
        assert_eq!(k_factor(&rating), K_FACTOR_ESTABLISHED);

        // The watermark outlives a drop in rating
        rating.custom_rating = 1200.0;
        rating.custom_rating_reached_high_watermark = true;
        assert_eq!(k_factor(&rating), K_FACTOR_ESTABLISHED);
    }

    fn engine_reset_rating(seed: f64) -> crate::model::structures::player_rating::PlayerRating {
        let state = CustomRatingEngine.reset(RatingState::seeded(&[generate_player(1, Some(seed))]));
        state.get_rating(1).unwrap().clone()
    }

    #[test]
    fn test_watermark_ratchet_after_crossing() {
        let engine = CustomRatingEngine;
        let mut state = engine.reset(RatingState::seeded(&[
            generate_player(1, Some(1995.0)),
            generate_player(2, Some(1995.0))
        ]));

        let (next, _) = play(&engine, state, &generate_match(1, &[1], &[2], true));
        state = next;
        assert!(state.get_rating(1).unwrap().custom_rating >= 2000.0);
        assert!(state.get_rating(1).unwrap().custom_rating_reached_high_watermark);

        let mut id = 2;
        while state.get_rating(1).unwrap().custom_rating >= 1800.0 {
            assert!(id < 200, "rating never dropped below 1800");
            let (next, _) = play(&engine, state, &generate_match(id, &[1], &[2], false));
            state = next;
            id += 1;
        }

        let rating = state.get_rating(1).unwrap();
        assert!(rating.custom_rating < 1800.0);
        assert!(rating.custom_rating_reached_high_watermark);
        assert_eq!(k_factor(rating), K_FACTOR_ESTABLISHED);

        let (own, opponent) = (rating.custom_rating, state.get_rating(2).unwrap().custom_rating);
        let (_, updates) = play(&engine, state, &generate_match(id, &[1], &[2], false));
        assert_eq!(updates[0].k_factor, K_FACTOR_ESTABLISHED);
        assert_eq!(
            updates[0].rating_change,
            (K_FACTOR_ESTABLISHED * -expected_score(own, opponent)).round()
        );
    }

    #[test]
    fn test_bonus_exhausts_after_twenty_wins() {
        let engine = CustomRatingEngine;
        let mut state = engine.reset(RatingState::seeded(&[
            generate_player(1, Some(1300.0)),
            generate_player(2, Some(1300.0))
        ]));

        let mut total_bonus = 0;
        for id in 1..=20 {
            let (next, updates) = play(&engine, state, &generate_match(id, &[1], &[2], true));
            state = next;
            total_bonus += updates[0].bonus;
            // The loser never spends bonus
            assert_eq!(updates[1].bonus, 0);
        }

        assert_eq!(total_bonus, 210);
        assert_eq!(state.get_rating(1).unwrap().custom_rating_bonus_wins_remaining, 0);

        let (state, updates) = play(&engine, state, &generate_match(21, &[1], &[2], true));
        assert_eq!(updates[0].bonus, 0);
        assert_eq!(state.get_rating(1).unwrap().custom_rating_games_played, 21);
        assert_eq!(state.get_rating(2).unwrap().custom_rating_games_played, 21);
    }

    #[test]
    fn test_effective_rating_blends_team() {
        let engine = CustomRatingEngine;
        let state = engine.reset(RatingState::seeded(&[
            generate_player(1, Some(1500.0)),
            generate_player(2, Some(1500.0)),
            generate_player(3, Some(1500.0))
        ]));

        // Equal effective and opposing ratings, provisional K of 40
        let (_, updates) = play(&engine, state, &generate_match(1, &[1, 2], &[3], true));
        assert_eq!(updates[0].rating_change, 20.0);
        assert_eq!(updates[2].rating_change, -20.0);
    }
}
