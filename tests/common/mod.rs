use rating_engine::{
    model::structures::match_data::{Match, Player},
    utils::test_utils::{generate_matches, generate_players}
};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A reproducible league of `n_players` and `n_matches`.
pub fn league(n_players: i32, n_matches: i32) -> (Vec<Player>, Vec<Match>) {
    let players = generate_players(n_players);
    let matches = generate_matches(n_matches, &players);

    (players, matches)
}
