use thiserror::Error;

/// A data-quality problem with a single match. Recorded against the match and
/// never allowed to abort a pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("player {player_id} appears more than once in match {match_id}")]
    DuplicateAppearance { match_id: i32, player_id: i32 },

    #[error("match {match_id} has an invalid duration of {duration}s")]
    InvalidDuration { match_id: i32, duration: f64 },

    #[error("player {player_id} has an invalid lifespan in match {match_id}")]
    InvalidLifespan { match_id: i32, player_id: i32 },

    #[error("rating for player {player_id} became non-finite in match {match_id}")]
    NonFiniteRating { match_id: i32, player_id: i32 }
}

/// The single-match fast path could not be used; the caller must run a full pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FastPathError {
    #[error("match {match_id} does not order after player {player_id}'s last processed match")]
    OutOfOrder { match_id: i32, player_id: i32 },

    #[error(transparent)]
    Processing(#[from] ProcessingError)
}
