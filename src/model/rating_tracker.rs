use indexmap::IndexMap;

use crate::model::{
    error::FastPathError,
    structures::{
        match_data::{Match, Player},
        player_rating::PlayerRating
    }
};

/// Rating state for every known player, threaded by value through replay.
///
/// Players are kept in insertion order so that every iteration over the state
/// (and every output built from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingState {
    ratings: IndexMap<i32, PlayerRating>
}

impl RatingState {
    pub fn new() -> RatingState {
        RatingState {
            ratings: IndexMap::new()
        }
    }

    /// Builds a state with every player at their seed values.
    pub fn seeded(players: &[Player]) -> RatingState {
        let mut state = RatingState::new();
        for player in players {
            state.insert_player(player);
        }

        state
    }

    /// Seeds a player that is not yet tracked. Existing players are left untouched.
    pub fn insert_player(&mut self, player: &Player) {
        self.ratings
            .entry(player.id)
            .or_insert_with(|| PlayerRating::seeded(player));
    }

    pub fn insert_or_update(&mut self, rating: PlayerRating) {
        self.ratings.insert(rating.player_id, rating);
    }

    /// Returns the current rating record for the player.
    pub fn get_rating(&self, player_id: i32) -> Option<&PlayerRating> {
        self.ratings.get(&player_id)
    }

    pub fn get_rating_mut(&mut self, player_id: i32) -> Option<&mut PlayerRating> {
        self.ratings.get_mut(&player_id)
    }

    pub fn ratings(&self) -> impl Iterator<Item = &PlayerRating> {
        self.ratings.values()
    }

    pub fn ratings_mut(&mut self) -> impl Iterator<Item = &mut PlayerRating> {
        self.ratings.values_mut()
    }

    pub fn into_ratings(self) -> Vec<PlayerRating> {
        self.ratings.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Records `match_` as the latest match applied to each tracked participant.
    pub fn mark_processed(&mut self, match_: &Match) {
        for player_id in match_.player_ids() {
            if let Some(rating) = self.ratings.get_mut(&player_id) {
                rating.last_match = rating.last_match.max(Some(match_.order));
            }
        }
    }

    /// Clears every player's processed-match marker ahead of a full pass.
    pub fn clear_processed(&mut self) {
        for rating in self.ratings.values_mut() {
            rating.last_match = None;
        }
    }

    /// The fast path is only sound when `match_` orders strictly after every
    /// participant's most recently applied match.
    pub fn check_fast_path(&self, match_: &Match) -> Result<(), FastPathError> {
        let stale = match_.player_ids().find(|player_id| {
            self.get_rating(*player_id)
                .and_then(|r| r.last_match)
                .is_some_and(|last| last >= match_.order)
        });

        match stale {
            Some(player_id) => Err(FastPathError::OutOfOrder {
                match_id: match_.id,
                player_id
            }),
            None => Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{error::FastPathError, rating_tracker::RatingState},
        utils::test_utils::{generate_match, generate_player}
    };

    #[test]
    fn test_seeded_preserves_insertion_order() {
        let players = vec![generate_player(3, None), generate_player(1, None), generate_player(2, None)];
        let state = RatingState::seeded(&players);

        let ids: Vec<i32> = state.ratings().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_player_does_not_reset_existing() {
        let mut state = RatingState::seeded(&[generate_player(1, None)]);
        state.get_rating_mut(1).unwrap().elo = 1600.0;

        state.insert_player(&generate_player(1, None));

        assert_eq!(state.get_rating(1).unwrap().elo, 1600.0);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_mark_processed_tracks_latest() {
        let mut state = RatingState::seeded(&[generate_player(1, None), generate_player(2, None)]);
        let first = generate_match(1, &[1], &[2], true);
        let second = generate_match(2, &[1], &[2], true);

        state.mark_processed(&second);
        state.mark_processed(&first);

        assert_eq!(state.get_rating(1).unwrap().last_match, Some(second.order));
    }

    #[test]
    fn test_fast_path_rejects_out_of_order_match() {
        let mut state = RatingState::seeded(&[generate_player(1, None), generate_player(2, None)]);
        let first = generate_match(1, &[1], &[2], true);
        let second = generate_match(2, &[1], &[2], true);

        state.mark_processed(&second);

        assert_eq!(
            state.check_fast_path(&first),
            Err(FastPathError::OutOfOrder {
                match_id: 1,
                player_id: 1
            })
        );
        assert_eq!(state.check_fast_path(&generate_match(3, &[1], &[2], true)), Ok(()));
    }

    #[test]
    fn test_fast_path_rejects_replayed_match() {
        let mut state = RatingState::seeded(&[generate_player(1, None), generate_player(2, None)]);
        let m = generate_match(1, &[1], &[2], true);

        state.mark_processed(&m);

        assert!(state.check_fast_path(&m).is_err());
    }
}
