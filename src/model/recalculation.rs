use tracing::{debug, info, warn};

use crate::{
    model::{
        custom_rating::CustomRatingEngine,
        elo::EloEngine,
        engine::{RatingEngine, RatingUpdate},
        error::FastPathError,
        glicko2::Glicko2Engine,
        rating_tracker::RatingState,
        structures::{
            match_data::{Match, Player},
            processing::{AppearanceSnapshot, MatchFailure, MatchRating, PassReport, RecalculationResult}
        }
    },
    utils::progress_utils::progress_span
};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Replays `matches` in the given order through a single rating system.
///
/// Each match is rated against the pre-match state. A failed match is recorded
/// and leaves the state untouched; the pass always continues.
pub fn replay<E: RatingEngine>(
    engine: &E,
    mut state: RatingState,
    matches: &[Match]
) -> (RatingState, Vec<AppearanceSnapshot>, PassReport) {
    let system = engine.system();
    let mut report = PassReport::new(system);
    let mut snapshots = Vec::new();

    let span = progress_span(matches.len() as u64, &format!("Replaying {}", system));
    let guard = span.enter();
    for match_ in matches {
        match engine.rate(&state, match_) {
            Ok(MatchRating::Rated(updates)) => {
                snapshots.extend(updates.iter().map(|u| u.snapshot(match_.id, system)));
                state = engine.apply(state, &updates);
                state.mark_processed(match_);
                report.processed += 1;
            }
            Ok(MatchRating::Skipped(reason)) => {
                debug!(match_id = match_.id, ?reason, %system, "Skipping match");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(match_id = match_.id, %system, "Failed to rate match: {}", e);
                report.failures.push(MatchFailure {
                    match_id: match_.id,
                    reason: e.to_string()
                });
            }
        }

        span.pb_inc(1);
    }
    drop(guard);

    info!(
        %system,
        processed = report.processed,
        skipped = report.skipped,
        failures = report.failures.len(),
        "Replay complete"
    );

    (state, snapshots, report)
}

/// Rebuilds every rating system from seeds, or advances all of them by one match.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecalculationPipeline {
    pub elo: EloEngine,
    pub custom: CustomRatingEngine,
    pub glicko: Glicko2Engine
}

impl RecalculationPipeline {
    pub fn new() -> RecalculationPipeline {
        RecalculationPipeline::default()
    }

    /// Full pass from seeds for `players` over the ordered history.
    pub fn run(&self, players: &[Player], matches: &[Match]) -> RecalculationResult {
        let (state, snapshots, reports) = self.recalculate(RatingState::seeded(players), matches);

        RecalculationResult {
            ratings: state.into_ratings(),
            snapshots,
            reports
        }
    }

    /// Resets every system to seed values and replays each in turn.
    pub fn recalculate(
        &self,
        mut state: RatingState,
        matches: &[Match]
    ) -> (RatingState, Vec<AppearanceSnapshot>, Vec<PassReport>) {
        info!("Recalculating {} players over {} matches", state.len(), matches.len());
        state.clear_processed();

        let (state, mut snapshots, elo_report) = replay(&self.elo, self.elo.reset(state), matches);
        let (state, custom_snapshots, custom_report) = replay(&self.custom, self.custom.reset(state), matches);
        let (state, glicko_snapshots, glicko_report) = replay(&self.glicko, self.glicko.reset(state), matches);

        snapshots.extend(custom_snapshots);
        snapshots.extend(glicko_snapshots);

        (state, snapshots, vec![elo_report, custom_report, glicko_report])
    }

    /// Seeds players not yet tracked, with every system at its reset values.
    /// Players already in `state` are untouched.
    pub fn seed_players(&self, state: &mut RatingState, players: &[Player]) {
        let new_players: Vec<Player> = players
            .iter()
            .filter(|p| state.get_rating(p.id).is_none())
            .cloned()
            .collect();

        if new_players.is_empty() {
            return;
        }

        let seeded = RatingState::seeded(&new_players);
        let seeded = self.glicko.reset(self.custom.reset(self.elo.reset(seeded)));
        for rating in seeded.into_ratings() {
            state.insert_or_update(rating);
        }
    }

    /// Applies one match to an already-replayed state in every system.
    ///
    /// The result matches a full pass ending in `match_`. Nothing is written
    /// unless all three systems rate the match successfully.
    pub fn apply_single_match(
        &self,
        state: &mut RatingState,
        match_: &Match
    ) -> Result<Vec<AppearanceSnapshot>, FastPathError> {
        state.check_fast_path(match_)?;

        let elo = self.elo.rate(state, match_)?;
        let custom = self.custom.rate(state, match_)?;
        let glicko = self.glicko.rate(state, match_)?;

        let (MatchRating::Rated(elo), MatchRating::Rated(custom), MatchRating::Rated(glicko)) = (elo, custom, glicko)
        else {
            debug!(match_id = match_.id, "Match is not rateable, nothing to apply");
            return Ok(Vec::new());
        };

        let mut snapshots = Vec::with_capacity(elo.len() + custom.len() + glicko.len());
        snapshots.extend(elo.iter().map(|u| u.snapshot(match_.id, self.elo.system())));
        snapshots.extend(custom.iter().map(|u| u.snapshot(match_.id, self.custom.system())));
        snapshots.extend(glicko.iter().map(|u| u.snapshot(match_.id, self.glicko.system())));

        let mut next = std::mem::take(state);
        next = self.elo.apply(next, &elo);
        next = self.custom.apply(next, &custom);
        next = self.glicko.apply(next, &glicko);
        next.mark_processed(match_);
        *state = next;

        Ok(snapshots)
    }
}
