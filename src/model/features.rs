use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::{
    model::{
        constants::{DEFAULT_RATING, RATING_FEATURE_SCALE},
        error::ProcessingError,
        structures::{
            feature_key::FeatureKey,
            feature_vector::FeatureVector,
            match_data::{Appearance, AppearanceCounters, Lifespan, Match, UnitKind},
            processing::{AppearanceSnapshot, MatchFailure},
            rating_system::RatingSystem,
            side::{Side, Sides}
        },
        teams::{skip_reason, validate_match}
    },
    utils::progress_utils::progress_span
};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Sum and count of observed values. Empty means "no data", not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMean {
    pub sum: f64,
    pub count: u32
}

impl RunningMean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }

        Some(self.sum / self.count as f64)
    }

    pub fn mean_or(&self, default: f64) -> f64 {
        self.mean().unwrap_or(default)
    }
}

/// Everything known about one appearance once its match is over.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearanceObservation {
    pub counters: Option<AppearanceCounters>,
    pub hero_kill_share: Option<f64>,
    pub unit_kill_share: Option<f64>,
    pub objective_share: Option<f64>,
    pub hero_uptime: Option<f64>,
    pub unit_uptime: Option<f64>,
    pub faction: Option<String>
}

/// A player's lifetime performance, folded one match at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAccumulator {
    pub games_played: u32,
    /// Games that reported raw counters
    pub counted_games: u32,
    pub hero_kills: u64,
    pub hero_deaths: u64,
    pub hero_kill_share: RunningMean,
    pub unit_kill_share: RunningMean,
    pub objective_share: RunningMean,
    pub hero_uptime: RunningMean,
    pub unit_uptime: RunningMean,
    pub faction_games: BTreeMap<String, u32>
}

impl PerformanceAccumulator {
    pub fn record(&mut self, observation: &AppearanceObservation) {
        self.games_played += 1;

        if let Some(counters) = observation.counters {
            self.counted_games += 1;
            self.hero_kills += counters.hero_kills as u64;
            self.hero_deaths += counters.hero_deaths as u64;
        }

        let means = [
            (&mut self.hero_kill_share, observation.hero_kill_share),
            (&mut self.unit_kill_share, observation.unit_kill_share),
            (&mut self.objective_share, observation.objective_share),
            (&mut self.hero_uptime, observation.hero_uptime),
            (&mut self.unit_uptime, observation.unit_uptime)
        ];
        for (mean, value) in means {
            if let Some(value) = value {
                mean.push(value);
            }
        }

        if let Some(faction) = &observation.faction {
            *self.faction_games.entry(faction.clone()).or_default() += 1;
        }
    }

    pub fn hero_kd(&self) -> f64 {
        if self.counted_games == 0 {
            return FeatureKey::HeroKd.neutral();
        }

        self.hero_kills as f64 / self.hero_deaths.max(1) as f64
    }

    /// Performance features, with missing contribution shares defaulting to
    /// `default_contribution`. Rating features are left neutral.
    pub fn features(&self, default_contribution: f64) -> FeatureVector {
        let mut features = FeatureVector::neutral();

        features[FeatureKey::HeroKd] = self.hero_kd();
        features[FeatureKey::HeroKillContribution] = self.hero_kill_share.mean_or(default_contribution);
        features[FeatureKey::UnitKillContribution] = self.unit_kill_share.mean_or(default_contribution);
        features[FeatureKey::ObjectiveContribution] = self.objective_share.mean_or(default_contribution);
        features[FeatureKey::HeroUptime] = self.hero_uptime.mean_or(FeatureKey::HeroUptime.neutral());
        features[FeatureKey::UnitUptime] = self.unit_uptime.mean_or(FeatureKey::UnitUptime.neutral());
        features[FeatureKey::GamesPlayedLog] = (1.0 + self.games_played as f64).ln();

        features
    }

    pub fn faction_games(&self, faction: &str) -> u32 {
        self.faction_games.get(faction).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFeatures {
    pub player_id: i32,
    pub side: Side,
    pub features: FeatureVector
}

/// Pre-match features for every participant of one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFeatures {
    pub match_id: i32,
    pub team_one_won: bool,
    pub players: Vec<PlayerFeatures>
}

impl MatchFeatures {
    pub fn side_mean(&self, side: Side) -> Option<FeatureVector> {
        FeatureVector::mean(self.players.iter().filter(|p| p.side == side).map(|p| &p.features))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub matches: Vec<MatchFeatures>,
    /// Lifetime accumulators after the final match, in first-seen order
    pub accumulators: IndexMap<i32, PerformanceAccumulator>,
    pub failures: Vec<MatchFailure>
}

fn validate_lifespan(lifespan: &Lifespan) -> bool {
    let spawn_ok = lifespan.spawned_at.is_finite() && lifespan.spawned_at >= 0.0;
    let death_ok = lifespan
        .died_at
        .map_or(true, |died_at| died_at.is_finite() && died_at >= 0.0 && died_at >= lifespan.spawned_at);

    spawn_ok && death_ok
}

/// Fraction of the match the hero spent alive, across all of its lives.
fn hero_uptime(lifespans: &[Lifespan], duration: f64) -> Option<f64> {
    if duration <= 0.0 {
        return None;
    }

    let mut heroes = lifespans.iter().filter(|l| l.kind == UnitKind::Hero).peekable();
    heroes.peek()?;

    let alive: f64 = heroes
        .map(|l| (l.died_at.unwrap_or(duration).min(duration) - l.spawned_at).max(0.0))
        .sum();

    Some((alive / duration).clamp(0.0, 1.0))
}

/// Mean fraction of the remaining match time each unit survived.
fn unit_uptime(lifespans: &[Lifespan], duration: f64) -> Option<f64> {
    let mut uptime = RunningMean::default();
    for lifespan in lifespans.iter().filter(|l| l.kind == UnitKind::Unit) {
        let remaining = duration - lifespan.spawned_at;
        if remaining <= 0.0 {
            continue;
        }

        let alive = lifespan.died_at.unwrap_or(duration).min(duration) - lifespan.spawned_at;
        uptime.push((alive / remaining).clamp(0.0, 1.0));
    }

    uptime.mean()
}

/// Team totals for each counter, over members that reported counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TeamTotals {
    hero_kills: u64,
    unit_kills: u64,
    objective_kills: u64
}

fn team_totals(match_: &Match, side: Side) -> TeamTotals {
    match_
        .team(side)
        .filter_map(|a| a.counters)
        .fold(TeamTotals::default(), |total, c| TeamTotals {
            hero_kills: total.hero_kills + c.hero_kills as u64,
            unit_kills: total.unit_kills + c.unit_kills as u64,
            objective_kills: total.objective_kills + c.objective_kills as u64
        })
}

fn share(own: u32, total: u64, team_size: usize) -> f64 {
    if total == 0 {
        return 1.0 / team_size as f64;
    }

    own as f64 / total as f64
}

/// Reads one finished match into per-appearance observations.
pub fn observe_match(match_: &Match) -> Result<Vec<AppearanceObservation>, ProcessingError> {
    let totals = Sides::from_fn(|side| team_totals(match_, side));
    let sizes = Sides::from_fn(|side| match_.team_size(side));

    match_
        .appearances
        .iter()
        .map(|appearance| observe_appearance(match_, appearance, totals.get(appearance.side), *sizes.get(appearance.side)))
        .collect()
}

fn observe_appearance(
    match_: &Match,
    appearance: &Appearance,
    totals: &TeamTotals,
    team_size: usize
) -> Result<AppearanceObservation, ProcessingError> {
    if !appearance.lifespans.iter().all(validate_lifespan) {
        return Err(ProcessingError::InvalidLifespan {
            match_id: match_.id,
            player_id: appearance.player_id
        });
    }

    let counters = appearance.counters;
    let shares = counters.map(|c| {
        (
            share(c.hero_kills, totals.hero_kills, team_size),
            share(c.unit_kills, totals.unit_kills, team_size),
            share(c.objective_kills, totals.objective_kills, team_size)
        )
    });

    Ok(AppearanceObservation {
        counters,
        hero_kill_share: shares.map(|s| s.0),
        unit_kill_share: shares.map(|s| s.1),
        objective_share: shares.map(|s| s.2),
        hero_uptime: hero_uptime(&appearance.lifespans, match_.duration_seconds),
        unit_uptime: unit_uptime(&appearance.lifespans, match_.duration_seconds),
        faction: appearance.faction.clone()
    })
}

/// Builds strictly causal per-player features over the ordered history.
///
/// Rating features come from the Elo pass's pre-match snapshots.
pub struct FeatureExtractor {
    elo_before: HashMap<(i32, i32), f64>
}

impl FeatureExtractor {
    pub fn new(snapshots: &[AppearanceSnapshot]) -> FeatureExtractor {
        let elo_before = snapshots
            .iter()
            .filter(|s| s.system == RatingSystem::Elo)
            .map(|s| ((s.match_id, s.player_id), s.rating_before_match))
            .collect();

        FeatureExtractor { elo_before }
    }

    fn pre_match_elo(&self, match_id: i32, player_id: i32) -> f64 {
        self.elo_before.get(&(match_id, player_id)).copied().unwrap_or(DEFAULT_RATING)
    }

    pub fn extract(&self, matches: &[Match]) -> FeatureSet {
        let mut set = FeatureSet::default();

        let span = progress_span(matches.len() as u64, "Extracting features");
        let guard = span.enter();
        for match_ in matches {
            if skip_reason(match_).is_none() {
                if let Err(e) = self.extract_match(match_, &mut set) {
                    warn!(match_id = match_.id, "Failed to extract features: {}", e);
                    set.failures.push(MatchFailure {
                        match_id: match_.id,
                        reason: e.to_string()
                    });
                }
            }

            span.pb_inc(1);
        }
        drop(guard);

        info!(
            matches = set.matches.len(),
            players = set.accumulators.len(),
            failures = set.failures.len(),
            "Feature extraction complete"
        );

        set
    }

    fn extract_match(&self, match_: &Match, set: &mut FeatureSet) -> Result<(), ProcessingError> {
        validate_match(match_)?;
        let observations = observe_match(match_)?;

        let opposing_elo = Sides::from_fn(|side| {
            let ratings: Vec<f64> = match_
                .team(side.opposite())
                .map(|a| self.pre_match_elo(match_.id, a.player_id))
                .collect();

            ratings.iter().sum::<f64>() / ratings.len() as f64
        });

        let players = match_
            .appearances
            .iter()
            .map(|appearance| {
                let default_contribution = 1.0 / match_.team_size(appearance.side) as f64;
                let elo = self.pre_match_elo(match_.id, appearance.player_id);

                let mut features = set
                    .accumulators
                    .get(&appearance.player_id)
                    .map(|acc| acc.features(default_contribution))
                    .unwrap_or_else(|| PerformanceAccumulator::default().features(default_contribution));
                features[FeatureKey::Rating] = elo / RATING_FEATURE_SCALE;
                features[FeatureKey::RatingDifferential] =
                    (elo - opposing_elo.get(appearance.side)) / RATING_FEATURE_SCALE;

                PlayerFeatures {
                    player_id: appearance.player_id,
                    side: appearance.side,
                    features
                }
            })
            .collect();

        set.matches.push(MatchFeatures {
            match_id: match_.id,
            team_one_won: match_.team_one_won,
            players
        });

        for (appearance, observation) in match_.appearances.iter().zip(&observations) {
            set.accumulators
                .entry(appearance.player_id)
                .or_default()
                .record(observation);
        }

        Ok(())
    }
}
