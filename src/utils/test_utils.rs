use chrono::DateTime;
use indexmap::IndexMap;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::model::{
    constants::RATING_FEATURE_SCALE,
    profile::PlayerProfile,
    structures::{
        feature_key::FeatureKey,
        feature_vector::FeatureVector,
        match_data::{Appearance, AppearanceCounters, Lifespan, Match, MatchOrderKey, Player, RatingSeed, UnitKind},
        side::Side
    }
};

const BASE_TIMESTAMP: i64 = 1_704_067_200;
const FACTIONS: [&str; 2] = ["north", "south"];

/// A player whose Elo and custom rating are both seeded at `rating`, when given.
pub fn generate_player(id: i32, rating: Option<f64>) -> Player {
    Player {
        id,
        username: Some(format!("player{}", id)),
        seed: RatingSeed {
            elo: rating,
            custom_rating: rating,
            ..RatingSeed::default()
        }
    }
}

/// Players `1..=n` with reproducible random seeds.
pub fn generate_players(n: i32) -> Vec<Player> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    (1..=n)
        .map(|id| {
            let mut player = generate_player(id, None);
            player.seed.elo = Some(rng.random_range(1200.0..1800.0));
            player.seed.custom_rating = Some(rng.random_range(1100.0..1700.0));

            player
        })
        .collect()
}

/// Order key `n` of a single-version history, one minute per match.
pub fn generate_order_key(n: i64) -> MatchOrderKey {
    MatchOrderKey {
        game_version: 1,
        manual_sequence: 0,
        map_version: 1,
        played_at: DateTime::from_timestamp(BASE_TIMESTAMP + n * 60, 0).unwrap_or_default(),
        ingestion_id: n
    }
}

pub fn generate_appearance(player_id: i32, side: Side) -> Appearance {
    Appearance {
        player_id,
        side,
        faction: None,
        counters: None,
        lifespans: Vec::new()
    }
}

/// A bare match with no counters or lifespans, ordered by `id`.
pub fn generate_match(id: i32, side_one: &[i32], side_two: &[i32], team_one_won: bool) -> Match {
    let appearances = side_one
        .iter()
        .map(|p| generate_appearance(*p, Side::One))
        .chain(side_two.iter().map(|p| generate_appearance(*p, Side::Two)))
        .collect();

    Match {
        id,
        order: generate_order_key(id as i64),
        team_one_won,
        excluded: false,
        duration_seconds: 600.0,
        appearances
    }
}

fn random_lifespans(rng: &mut ChaCha8Rng, duration: f64) -> Vec<Lifespan> {
    let mut lifespans = Vec::new();

    let mut spawned_at = 0.0;
    while spawned_at < duration {
        let died_at = spawned_at + rng.random_range(60.0..duration);
        if died_at >= duration {
            lifespans.push(Lifespan {
                kind: UnitKind::Hero,
                spawned_at,
                died_at: None
            });
            break;
        }

        lifespans.push(Lifespan {
            kind: UnitKind::Hero,
            spawned_at,
            died_at: Some(died_at)
        });
        spawned_at = died_at + 30.0;
    }

    for _ in 0..rng.random_range(0..4) {
        let spawned_at = rng.random_range(0.0..duration);
        let died_at = rng.random_bool(0.7).then(|| rng.random_range(spawned_at..=duration));

        lifespans.push(Lifespan {
            kind: UnitKind::Unit,
            spawned_at,
            died_at
        });
    }

    lifespans
}

/// `n` reproducible matches between random even teams of `players`, with
/// counters, lifespans and factions filled in.
pub fn generate_matches(n: i32, players: &[Player]) -> Vec<Match> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut ids: Vec<i32> = players.iter().map(|p| p.id).collect();
    let max_team = (ids.len() / 2).clamp(1, 5);

    (1..=n)
        .map(|id| {
            ids.shuffle(&mut rng);
            let team_size = rng.random_range(1..=max_team);
            let duration = rng.random_range(600.0..1800.0);
            let factions = [FACTIONS[rng.random_range(0..2)], FACTIONS[rng.random_range(0..2)]];

            let mut m = generate_match(id, &ids[..team_size], &ids[team_size..team_size * 2], rng.random_bool(0.5));
            m.duration_seconds = duration;
            for appearance in &mut m.appearances {
                appearance.faction = Some(factions[appearance.side as usize - 1].to_string());
                appearance.counters = Some(AppearanceCounters {
                    hero_kills: rng.random_range(0..15),
                    hero_deaths: rng.random_range(0..10),
                    unit_kills: rng.random_range(0..120),
                    objective_kills: rng.random_range(0..4)
                });
                appearance.lifespans = random_lifespans(&mut rng, duration);
            }

            m
        })
        .collect()
}

/// Profiles from `(player_id, elo, custom_rating, composite_score)` rows,
/// each with 20 games and otherwise neutral features.
pub fn generate_profiles(rows: &[(i32, f64, f64, f64)]) -> IndexMap<i32, PlayerProfile> {
    rows.iter()
        .map(|(player_id, elo, custom_rating, composite_score)| {
            let mut features = FeatureVector::neutral();
            features[FeatureKey::Rating] = elo / RATING_FEATURE_SCALE;

            let profile = PlayerProfile {
                player_id: *player_id,
                games_played: 20,
                features,
                elo: *elo,
                custom_rating: *custom_rating,
                composite_score: *composite_score,
                faction_games: BTreeMap::new()
            };

            (*player_id, profile)
        })
        .collect()
}
