use itertools::iproduct;
use tracing::debug;

use crate::{
    config::BalancerConfig,
    model::{
        constants::{
            BALANCE_CR_CEILING, BALANCE_CR_FLOOR, BALANCE_CR_WEIGHT_NEW, BALANCE_CR_WEIGHT_VETERAN,
            BALANCE_EXPERIENCE_GAMES, CUSTOM_DEFAULT_SEED, FACTION_EXPERIENCE_DECAY, NEUTRAL_SCORE,
            UNPROVEN_FACTION_PENALTY
        },
        predictor::LobbyPredictor,
        structures::{
            lobby::{BalanceResult, Lobby, LobbyBalance, LobbySlot, Swap, UnavailableReason},
            side::{Side, Sides}
        }
    }
};

/// Greedy swap search that narrows the strength gap between two sides.
pub struct LobbyBalancer<'a> {
    predictor: LobbyPredictor<'a>,
    config: BalancerConfig
}

impl<'a> LobbyBalancer<'a> {
    pub fn new(predictor: LobbyPredictor<'a>, config: BalancerConfig) -> LobbyBalancer<'a> {
        LobbyBalancer { predictor, config }
    }

    /// Strength of one occupant when playing for a side with `faction`.
    ///
    /// Custom rating counts for more as a player gains experience, and players
    /// new to the side's faction are marked down.
    pub fn slot_score(&self, slot: LobbySlot, faction: Option<&str>) -> f64 {
        let profile = self.predictor.profile(slot);
        let custom_rating = profile.map_or(CUSTOM_DEFAULT_SEED, |p| p.custom_rating);
        let composite = profile.map_or(NEUTRAL_SCORE, |p| p.composite_score);
        let games = profile.map_or(0, |p| p.games_played);

        let experience = (games as f64 / BALANCE_EXPERIENCE_GAMES).min(1.0);
        let weight = BALANCE_CR_WEIGHT_NEW + (BALANCE_CR_WEIGHT_VETERAN - BALANCE_CR_WEIGHT_NEW) * experience;
        let cr_points =
            ((custom_rating - BALANCE_CR_FLOOR) / (BALANCE_CR_CEILING - BALANCE_CR_FLOOR) * 100.0).clamp(0.0, 100.0);

        let penalty = faction.map_or(0.0, |faction| {
            let faction_games = profile.map_or(0, |p| p.faction_games(faction));
            UNPROVEN_FACTION_PENALTY * (-(faction_games as f64) / FACTION_EXPERIENCE_DECAY).exp()
        });

        weight * cr_points + (1.0 - weight) * composite - penalty
    }

    fn side_score(&self, lobby: &Lobby, side: Side) -> f64 {
        let slots = lobby.slots(side);
        let faction = lobby.faction(side);

        slots.iter().map(|s| self.slot_score(*s, faction)).sum::<f64>() / slots.len() as f64
    }

    /// |mean(side one) - mean(side two)| of slot scores.
    pub fn gap(&self, lobby: &Lobby) -> f64 {
        let scores = Sides::from_fn(|side| self.side_score(lobby, side));

        (scores.one - scores.two).abs()
    }

    /// The first strictly best swap, scanning side-one slots outermost.
    fn best_swap(&self, lobby: &Lobby, gap: f64) -> Option<Swap> {
        let n_one = lobby.slots(Side::One).len();
        let n_two = lobby.slots(Side::Two).len();

        let mut best: Option<Swap> = None;
        for (i, j) in iproduct!(0..n_one, 0..n_two) {
            let mut candidate = lobby.clone();
            candidate.swap(i, j);
            let gap_after = self.gap(&candidate);

            if best.as_ref().map_or(true, |b| gap_after < b.gap_after) {
                best = Some(Swap {
                    side_one_slot: i,
                    side_two_slot: j,
                    moved_to_side_two: lobby.slots(Side::One)[i],
                    moved_to_side_one: lobby.slots(Side::Two)[j],
                    gap_before: gap,
                    gap_after
                });
            }
        }

        best
    }

    pub fn balance(&self, lobby: &Lobby) -> LobbyBalance {
        if let Some(side) = lobby.empty_side() {
            return LobbyBalance::Unavailable(UnavailableReason::EmptySide(side));
        }

        let initial_gap = self.gap(lobby);
        let mut current = lobby.clone();
        let mut gap = initial_gap;
        let mut swaps: Vec<Swap> = Vec::new();

        for _ in 0..self.config.max_iterations {
            if gap < self.config.balanced_gap {
                break;
            }

            let threshold = if swaps.is_empty() {
                self.config.first_swap_min_improvement
            } else {
                self.config.swap_min_improvement
            };

            let Some(swap) = self.best_swap(&current, gap).filter(|s| s.improvement() > threshold) else {
                break;
            };

            debug!(
                side_one_slot = swap.side_one_slot,
                side_two_slot = swap.side_two_slot,
                gap_before = swap.gap_before,
                gap_after = swap.gap_after,
                "Accepted swap"
            );
            current.swap(swap.side_one_slot, swap.side_two_slot);
            gap = swap.gap_after;
            swaps.push(swap);
        }

        let prediction = self.predictor.predict(&current);

        LobbyBalance::Balanced(BalanceResult {
            initial_gap,
            final_gap: gap,
            swaps,
            lobby: current,
            prediction
        })
    }
}
