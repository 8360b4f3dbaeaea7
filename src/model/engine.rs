use crate::model::{
    error::ProcessingError,
    rating_tracker::RatingState,
    structures::{
        match_data::Match,
        processing::{AppearanceSnapshot, MatchRating},
        rating_system::RatingSystem
    }
};

/// A rating system that can be replayed over an ordered match history.
///
/// `rate` reads only the pre-match state, so a failure leaves the state untouched
/// and no update within a match depends on the order appearances are listed in.
/// `apply` consumes the state and returns the post-match state.
pub trait RatingEngine {
    type Update: RatingUpdate;

    fn system(&self) -> RatingSystem;

    /// Returns every player's fields for this system to their seed values.
    fn reset(&self, state: RatingState) -> RatingState;

    fn rate(&self, state: &RatingState, match_: &Match) -> Result<MatchRating<Self::Update>, ProcessingError>;

    fn apply(&self, state: RatingState, updates: &[Self::Update]) -> RatingState;
}

/// A single player's rating movement for one match.
pub trait RatingUpdate {
    fn player_id(&self) -> i32;

    fn rating_before(&self) -> f64;

    fn rating_change(&self) -> f64;

    fn snapshot(&self, match_id: i32, system: RatingSystem) -> AppearanceSnapshot {
        AppearanceSnapshot {
            match_id,
            player_id: self.player_id(),
            system,
            rating_before_match: self.rating_before(),
            rating_change: self.rating_change()
        }
    }
}

/// Fails the match if any computed rating is NaN or infinite.
pub fn ensure_finite(match_id: i32, player_id: i32, values: &[f64]) -> Result<(), ProcessingError> {
    if values.iter().all(|v| v.is_finite()) {
        return Ok(());
    }

    Err(ProcessingError::NonFiniteRating { match_id, player_id })
}
