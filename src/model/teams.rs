use itertools::Itertools;

use crate::model::{
    error::ProcessingError,
    rating_tracker::RatingState,
    structures::{
        match_data::Match,
        player_rating::PlayerRating,
        processing::SkipReason,
        side::{Side, Sides}
    }
};

/// Rejects matches whose appearances cannot be rated consistently.
pub fn validate_match(match_: &Match) -> Result<(), ProcessingError> {
    if let Some(player_id) = match_.player_ids().duplicates().next() {
        return Err(ProcessingError::DuplicateAppearance {
            match_id: match_.id,
            player_id
        });
    }

    if !match_.duration_seconds.is_finite() || match_.duration_seconds < 0.0 {
        return Err(ProcessingError::InvalidDuration {
            match_id: match_.id,
            duration: match_.duration_seconds
        });
    }

    Ok(())
}

/// Returns why `match_` cannot be rated at all, if it can't.
pub fn skip_reason(match_: &Match) -> Option<SkipReason> {
    if match_.excluded {
        return Some(SkipReason::Excluded);
    }

    if !match_.is_rateable() {
        return Some(SkipReason::SingleSided);
    }

    None
}

/// Mean of `value` over the rated members of one side. Unrated players are ignored;
/// a side with nobody rated has no average.
pub fn team_average(state: &RatingState, match_: &Match, side: Side, value: impl Fn(&PlayerRating) -> f64) -> Option<f64> {
    let (sum, count) = match_
        .team(side)
        .filter_map(|a| state.get_rating(a.player_id))
        .fold((0.0, 0usize), |(sum, count), r| (sum + value(r), count + 1));

    if count == 0 {
        return None;
    }

    Some(sum / count as f64)
}

/// Pre-match averages for both sides, or the side that has nobody rated.
pub fn team_averages(
    state: &RatingState,
    match_: &Match,
    value: impl Fn(&PlayerRating) -> f64
) -> Result<Sides<f64>, SkipReason> {
    let averages = Sides::from_fn(|side| team_average(state, match_, side, &value));

    match (averages.one, averages.two) {
        (Some(one), Some(two)) => Ok(Sides::new(one, two)),
        (None, _) => Err(SkipReason::NoRatedPlayers(Side::One)),
        (_, None) => Err(SkipReason::NoRatedPlayers(Side::Two))
    }
}

/// 1.0 for the winning side, 0.0 otherwise.
pub fn actual_score(match_: &Match, side: Side) -> f64 {
    if side == match_.winning_side() {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            error::ProcessingError,
            rating_tracker::RatingState,
            structures::{processing::SkipReason, side::Side},
            teams::{actual_score, team_average, team_averages, validate_match}
        },
        utils::test_utils::{generate_match, generate_player}
    };
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_duplicate_appearance_is_rejected() {
        let m = generate_match(4, &[1, 2], &[2, 3], true);

        assert_eq!(
            validate_match(&m),
            Err(ProcessingError::DuplicateAppearance {
                match_id: 4,
                player_id: 2
            })
        );
    }

    #[test]
    fn test_team_average_ignores_unrated_players() {
        let mut state = RatingState::seeded(&[generate_player(1, Some(1400.0)), generate_player(2, Some(1600.0))]);
        state.insert_player(&generate_player(3, Some(2000.0)));
        let m = generate_match(1, &[1, 2, 99], &[3], true);

        assert_abs_diff_eq!(team_average(&state, &m, Side::One, |r| r.elo).unwrap(), 1500.0);
    }

    #[test]
    fn test_team_averages_reports_unrated_side() {
        let state = RatingState::seeded(&[generate_player(1, None)]);
        let m = generate_match(1, &[1], &[50, 51], true);

        assert_eq!(
            team_averages(&state, &m, |r| r.elo),
            Err(SkipReason::NoRatedPlayers(Side::Two))
        );
    }

    #[test]
    fn test_actual_score() {
        let m = generate_match(1, &[1], &[2], false);

        assert_eq!(actual_score(&m, Side::One), 0.0);
        assert_eq!(actual_score(&m, Side::Two), 1.0);
    }
}
