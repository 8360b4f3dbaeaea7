mod common;

use common::{init_test_env, league};
use rating_engine::{
    config::EngineConfig,
    model::{
        processor::RatingProcessor,
        structures::{
            lobby::{Lobby, LobbyBalance, LobbySlot},
            side::Side
        }
    }
};

#[test]
fn test_predict_and_balance_a_league_lobby() {
    init_test_env();
    let (players, matches) = league(10, 120);
    let processor = RatingProcessor::new(EngineConfig::default());
    let output = processor.process(&players, &matches, None, true);

    // Strongest three against the weakest two plus a newcomer
    let mut by_elo: Vec<_> = output.profiles.values().collect();
    by_elo.sort_by(|a, b| b.elo.total_cmp(&a.elo));
    let lobby = Lobby::new(
        by_elo[..3].iter().map(|p| LobbySlot::Known(p.player_id)).collect(),
        vec![
            LobbySlot::Known(by_elo[8].player_id),
            LobbySlot::Known(by_elo[9].player_id),
            LobbySlot::Unknown
        ]
    )
    .with_factions(Some("north"), Some("south"));

    let prediction = output.predictor().predict(&lobby);
    let prediction = prediction.prediction().unwrap();
    assert!((prediction.win_probability.one + prediction.win_probability.two - 100.0).abs() < 1e-9);

    let LobbyBalance::Balanced(result) = processor.balancer(&output).balance(&lobby) else {
        panic!("Expected a balanced lobby");
    };

    assert!(result.swaps.len() <= 10);
    assert!(result.final_gap <= result.initial_gap);
    assert_eq!(result.lobby.slots(Side::One).len(), 3);
    assert_eq!(result.lobby.slots(Side::Two).len(), 3);
    for pair in result.swaps.windows(2) {
        assert_eq!(pair[0].gap_after, pair[1].gap_before);
    }
}

#[test]
fn test_unknown_lobby_from_empty_history() {
    init_test_env();
    let output = RatingProcessor::new(EngineConfig::default()).process(&[], &[], None, true);

    let lobby = Lobby::new(vec![LobbySlot::Unknown; 2], vec![LobbySlot::Unknown; 2]);
    let prediction = output.predictor().predict(&lobby);

    assert_eq!(prediction.prediction().unwrap().win_probability.one, 50.0);
}
