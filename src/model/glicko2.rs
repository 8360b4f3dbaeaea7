use itertools::Itertools;
use std::f64::consts::PI;

use crate::model::{
    constants::{
        GLICKO_CONVERGENCE_TOLERANCE, GLICKO_DEFAULT_RATING, GLICKO_MAX_DEVIATION, GLICKO_MAX_ITERATIONS,
        GLICKO_MAX_RATING, GLICKO_MAX_VOLATILITY, GLICKO_MIN_DEVIATION, GLICKO_MIN_RATING, GLICKO_MIN_VOLATILITY,
        GLICKO_SCALE, GLICKO_TAU
    },
    engine::{ensure_finite, RatingEngine, RatingUpdate},
    error::ProcessingError,
    rating_tracker::RatingState,
    structures::{
        match_data::Match,
        processing::{MatchRating, SkipReason},
        rating_system::RatingSystem,
        side::{Side, Sides}
    },
    teams::{actual_score, skip_reason, team_average, validate_match}
};

/// A rating on the public Glicko scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlickoRating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64
}

/// One game against an opponent, with `score` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub rating: f64,
    pub deviation: f64,
    pub score: f64
}

#[derive(Debug, Clone, Copy)]
pub struct Glicko2Params {
    pub tau: f64,
    pub tolerance: f64,
    pub max_iterations: usize
}

impl Default for Glicko2Params {
    fn default() -> Self {
        Glicko2Params {
            tau: GLICKO_TAU,
            tolerance: GLICKO_CONVERGENCE_TOLERANCE,
            max_iterations: GLICKO_MAX_ITERATIONS
        }
    }
}

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

fn expected(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// The function whose root is `ln(σ'²)`.
#[derive(Debug, Clone, Copy)]
struct VolatilityObjective {
    delta_sq: f64,
    phi_sq: f64,
    v: f64,
    a: f64,
    tau: f64
}

impl VolatilityObjective {
    fn eval(&self, x: f64) -> f64 {
        let ex = x.exp();
        let denom = self.phi_sq + self.v + ex;

        ex * (self.delta_sq - self.phi_sq - self.v - ex) / (2.0 * denom * denom) - (x - self.a) / (self.tau * self.tau)
    }

    /// Upper end of the initial bracket.
    fn initial_upper(&self, max_iterations: usize) -> f64 {
        let excess = self.delta_sq - self.phi_sq - self.v;
        if excess > 0.0 {
            return excess.ln();
        }

        (1..=max_iterations.max(1))
            .map(|k| self.a - k as f64 * self.tau)
            .find(|x| self.eval(*x) >= 0.0)
            .unwrap_or(self.a - max_iterations.max(1) as f64 * self.tau)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bracket {
    a: f64,
    b: f64,
    f_a: f64,
    f_b: f64
}

impl Bracket {
    fn converged(&self, tolerance: f64) -> bool {
        (self.b - self.a).abs() <= tolerance
    }

    /// One Illinois (modified regula falsi) step.
    fn step(&self, objective: &VolatilityObjective) -> Bracket {
        let c = self.a + (self.a - self.b) * self.f_a / (self.f_b - self.f_a);
        let f_c = objective.eval(c);

        let (a, f_a) = if f_c * self.f_b <= 0.0 {
            (self.b, self.f_b)
        } else {
            (self.a, self.f_a / 2.0)
        };

        Bracket { a, b: c, f_a, f_b: f_c }
    }
}

fn solve_volatility(objective: &VolatilityObjective, params: &Glicko2Params) -> f64 {
    let b = objective.initial_upper(params.max_iterations);
    let start = Bracket {
        a: objective.a,
        b,
        f_a: objective.eval(objective.a),
        f_b: objective.eval(b)
    };

    let solved = std::iter::successors(Some(start), |bracket| Some(bracket.step(objective)))
        .take(params.max_iterations + 1)
        .take_while_inclusive(|bracket| !bracket.converged(params.tolerance))
        .last()
        .unwrap_or(start);

    (solved.a / 2.0).exp()
}

/// Standard Glicko-2 rating period update against any number of opponents.
/// No clamping is applied here.
pub fn update(player: GlickoRating, opponents: &[Opponent], params: &Glicko2Params) -> GlickoRating {
    let mu = (player.rating - GLICKO_DEFAULT_RATING) / GLICKO_SCALE;
    let phi = player.deviation / GLICKO_SCALE;

    if opponents.is_empty() {
        let phi_star = (phi * phi + player.volatility * player.volatility).sqrt();
        return GlickoRating {
            rating: player.rating,
            deviation: phi_star * GLICKO_SCALE,
            volatility: player.volatility
        };
    }

    let (v_inv, score_sum) = opponents.iter().fold((0.0, 0.0), |(v_inv, score_sum), opponent| {
        let mu_j = (opponent.rating - GLICKO_DEFAULT_RATING) / GLICKO_SCALE;
        let phi_j = opponent.deviation / GLICKO_SCALE;
        let g_j = g(phi_j);
        let e = expected(mu, mu_j, phi_j);

        (v_inv + g_j * g_j * e * (1.0 - e), score_sum + g_j * (opponent.score - e))
    });

    let v = 1.0 / v_inv;
    let delta = v * score_sum;

    let objective = VolatilityObjective {
        delta_sq: delta * delta,
        phi_sq: phi * phi,
        v,
        a: (player.volatility * player.volatility).ln(),
        tau: params.tau
    };
    let volatility = solve_volatility(&objective, params);

    let phi_star = (phi * phi + volatility * volatility).sqrt();
    let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
    let mu_new = mu + phi_new * phi_new * score_sum;

    GlickoRating {
        rating: mu_new * GLICKO_SCALE + GLICKO_DEFAULT_RATING,
        deviation: phi_new * GLICKO_SCALE,
        volatility
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glicko2Update {
    pub player_id: i32,
    pub rating_before: f64,
    pub rating_change: f64,
    pub deviation: f64,
    pub volatility: f64
}

impl RatingUpdate for Glicko2Update {
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

/// Glicko-2 where each side is collapsed into a single composite opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Glicko2Engine {
    pub params: Glicko2Params
}

impl Glicko2Engine {
    /// Mean rating and volatility, pooled deviation `sqrt(mean(rd²))`.
    fn composite(&self, state: &RatingState, match_: &Match, side: Side) -> Option<GlickoRating> {
        Some(GlickoRating {
            rating: team_average(state, match_, side, |r| r.glicko_rating)?,
            deviation: team_average(state, match_, side, |r| r.glicko_deviation.powi(2))?.sqrt(),
            volatility: team_average(state, match_, side, |r| r.glicko_volatility)?
        })
    }
}

impl RatingEngine for Glicko2Engine {
    type Update = Glicko2Update;

    fn system(&self) -> RatingSystem {
        RatingSystem::Glicko2
    }

    fn reset(&self, mut state: RatingState) -> RatingState {
        for rating in state.ratings_mut() {
            rating.glicko_rating = rating.glicko_rating_seed;
            rating.glicko_deviation = rating.glicko_deviation_seed;
            rating.glicko_volatility = rating.glicko_volatility_seed;
        }

        state
    }

    fn rate(&self, state: &RatingState, match_: &Match) -> Result<MatchRating<Glicko2Update>, ProcessingError> {
        if let Some(reason) = skip_reason(match_) {
            return Ok(MatchRating::Skipped(reason));
        }
        validate_match(match_)?;

        let composites = Sides::from_fn(|side| self.composite(state, match_, side));
        let composites = match (composites.one, composites.two) {
            (Some(one), Some(two)) => Sides::new(one, two),
            (None, _) => return Ok(MatchRating::Skipped(SkipReason::NoRatedPlayers(Side::One))),
            (_, None) => return Ok(MatchRating::Skipped(SkipReason::NoRatedPlayers(Side::Two)))
        };

        let mut updates = Vec::with_capacity(match_.appearances.len());
        for appearance in &match_.appearances {
            let Some(rating) = state.get_rating(appearance.player_id) else {
                continue;
            };

            let opposing = composites.get(appearance.side.opposite());
            let player = GlickoRating {
                rating: rating.glicko_rating,
                deviation: rating.glicko_deviation,
                volatility: rating.glicko_volatility.clamp(GLICKO_MIN_VOLATILITY, GLICKO_MAX_VOLATILITY)
            };
            let opponent = Opponent {
                rating: opposing.rating,
                deviation: opposing.deviation,
                score: actual_score(match_, appearance.side)
            };

            let updated = update(player, &[opponent], &self.params);
            let new_rating = updated.rating.clamp(GLICKO_MIN_RATING, GLICKO_MAX_RATING);
            let deviation = updated.deviation.clamp(GLICKO_MIN_DEVIATION, GLICKO_MAX_DEVIATION);
            let volatility = updated.volatility.clamp(GLICKO_MIN_VOLATILITY, GLICKO_MAX_VOLATILITY);

            ensure_finite(match_.id, rating.player_id, &[new_rating, deviation, volatility])?;

            updates.push(Glicko2Update {
                player_id: rating.player_id,
                rating_before: rating.glicko_rating,
                rating_change: new_rating - rating.glicko_rating,
                deviation,
                volatility
            });
        }

        Ok(MatchRating::Rated(updates))
    }

    fn apply(&self, mut state: RatingState, updates: &[Glicko2Update]) -> RatingState {
        for update in updates {
            if let Some(rating) = state.get_rating_mut(update.player_id) {
                rating.glicko_rating = update.rating_before + update.rating_change;
                rating.glicko_deviation = update.deviation;
                rating.glicko_volatility = update.volatility;
            }
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            engine::RatingEngine,
            glicko2::{update, Glicko2Engine, Glicko2Params, GlickoRating, Opponent},
            rating_tracker::RatingState,
            structures::{processing::MatchRating, side::Side}
        },
        utils::test_utils::{generate_match, generate_player}
    };
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_paper_example() {
        let player = GlickoRating {
            rating: 1500.0,
            deviation: 200.0,
            volatility: 0.06
        };
        let opponents = [
            Opponent {
                rating: 1400.0,
                deviation: 30.0,
                score: 1.0
            },
            Opponent {
                rating: 1550.0,
                deviation: 100.0,
                score: 0.0
            },
            Opponent {
                rating: 1700.0,
                deviation: 300.0,
                score: 0.0
            }
        ];

        let updated = update(player, &opponents, &Glicko2Params::default());

        assert_abs_diff_eq!(updated.rating, 1464.06, epsilon = 0.01);
        assert_abs_diff_eq!(updated.deviation, 151.52, epsilon = 0.01);
        assert_abs_diff_eq!(updated.volatility, 0.05999, epsilon = 1e-4);
    }

    #[test]
    fn test_no_games_only_inflates_deviation() {
        let player = GlickoRating {
            rating: 1600.0,
            deviation: 50.0,
            volatility: 0.06
        };

        let updated = update(player, &[], &Glicko2Params::default());

        assert_eq!(updated.rating, 1600.0);
        assert!(updated.deviation > 50.0);
    }

    #[test]
    fn test_winner_gains_and_loser_drops() {
        let engine = Glicko2Engine::default();
        let state = engine.reset(RatingState::seeded(&[generate_player(1, None), generate_player(2, None)]));

        let updates = match engine.rate(&state, &generate_match(1, &[1], &[2], true)).unwrap() {
            MatchRating::Rated(updates) => updates,
            MatchRating::Skipped(reason) => panic!("Skipped: {:?}", reason)
        };

        assert!(updates[0].rating_change > 0.0);
        assert_abs_diff_eq!(updates[0].rating_change, -updates[1].rating_change, epsilon = 1e-9);

        let state = engine.apply(state, &updates);
        let rating = state.get_rating(1).unwrap();
        assert!(rating.glicko_deviation < 350.0);
        assert!((0.01..=0.15).contains(&rating.glicko_volatility));
    }

    #[test]
    fn test_composite_deviation_is_pooled() {
        let engine = Glicko2Engine::default();
        let players = [generate_player(1, None), generate_player(2, None), generate_player(3, None)];
        let mut state = engine.reset(RatingState::seeded(&players));
        state.get_rating_mut(2).unwrap().glicko_deviation = 50.0;
        state.get_rating_mut(3).unwrap().glicko_deviation = 350.0;
        let m = generate_match(1, &[1], &[2, 3], true);

        let composite = engine.composite(&state, &m, Side::Two).unwrap();
        assert_abs_diff_eq!(composite.rating, 1500.0);
        assert_abs_diff_eq!(composite.deviation, 250.0, epsilon = 1e-9);

        let updates = match engine.rate(&state, &m).unwrap() {
            MatchRating::Rated(updates) => updates,
            MatchRating::Skipped(reason) => panic!("Skipped: {:?}", reason)
        };
        let expected = update(
            GlickoRating {
                rating: 1500.0,
                deviation: 350.0,
                volatility: 0.06
            },
            &[Opponent {
                rating: 1500.0,
                deviation: 250.0,
                score: 1.0
            }],
            &Glicko2Params::default()
        );

        assert_eq!(updates[0].player_id, 1);
        assert_abs_diff_eq!(updates[0].rating_change, expected.rating - 1500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(updates[0].deviation, expected.deviation, epsilon = 1e-9);
    }

    #[test]
    fn test_results_are_clamped() {
        let engine = Glicko2Engine::default();
        let mut state = engine.reset(RatingState::seeded(&[generate_player(1, None), generate_player(2, None)]));
        {
            let low = state.get_rating_mut(1).unwrap();
            low.glicko_rating = 100.0;
            low.glicko_deviation = 350.0;
            low.glicko_volatility = 0.5;
        }

        let updates = match engine.rate(&state, &generate_match(1, &[1], &[2], false)).unwrap() {
            MatchRating::Rated(updates) => updates,
            MatchRating::Skipped(reason) => panic!("Skipped: {:?}", reason)
        };
        let state = engine.apply(state, &updates);
        let rating = state.get_rating(1).unwrap();

        assert_eq!(rating.glicko_rating, 100.0);
        assert!(rating.glicko_deviation <= 350.0);
        assert!(rating.glicko_volatility <= 0.15);
    }
}
