// Elo constants
pub const DEFAULT_RATING: f64 = 1500.0;
pub const ELO_K_FACTOR: f64 = 32.0;
pub const ELO_SCALE: f64 = 400.0;

// Custom rating constants
pub const CUSTOM_DEFAULT_SEED: f64 = 1300.0;
pub const CUSTOM_INDIVIDUAL_WEIGHT: f64 = 0.2;
pub const CUSTOM_TEAM_WEIGHT: f64 = 0.8;
pub const K_FACTOR_ESTABLISHED: f64 = 20.0;
pub const K_FACTOR_PROVISIONAL: f64 = 40.0;
pub const K_FACTOR_STANDARD: f64 = 30.0;
pub const HIGH_WATERMARK_RATING: f64 = 2000.0;
pub const ESTABLISHED_RATING: f64 = 1800.0;
pub const PROVISIONAL_GAMES: u32 = 30;
// Empirically tuned; no derivation behind these values
pub const BONUS_BANK_MAX: u32 = 20;
pub const BONUS_SEED_CEILING: f64 = 1500.0;
pub const BONUS_SEED_FLOOR: f64 = 1300.0;

// Glicko-2 constants
pub const GLICKO_DEFAULT_RATING: f64 = 1500.0;
pub const GLICKO_DEFAULT_DEVIATION: f64 = 350.0;
pub const GLICKO_DEFAULT_VOLATILITY: f64 = 0.06;
pub const GLICKO_TAU: f64 = 0.5;
pub const GLICKO_SCALE: f64 = 173.7178;
pub const GLICKO_CONVERGENCE_TOLERANCE: f64 = 1e-6;
pub const GLICKO_MAX_ITERATIONS: usize = 100;
pub const GLICKO_MIN_DEVIATION: f64 = 30.0;
pub const GLICKO_MAX_DEVIATION: f64 = 350.0;
pub const GLICKO_MIN_VOLATILITY: f64 = 0.01;
pub const GLICKO_MAX_VOLATILITY: f64 = 0.15;
pub const GLICKO_MIN_RATING: f64 = 100.0;
pub const GLICKO_MAX_RATING: f64 = 3500.0;

// Feature neutral values. Shared by extraction, scoring and lobby prediction.
pub const DEFAULT_TEAM_SIZE: usize = 5;
pub const DEFAULT_CONTRIBUTION: f64 = 1.0 / DEFAULT_TEAM_SIZE as f64;
pub const NEUTRAL_HERO_KD: f64 = 1.0;
pub const NEUTRAL_UPTIME: f64 = 0.5;
pub const RATING_FEATURE_SCALE: f64 = 400.0;

// Model training
pub const TRAINING_ITERATIONS: usize = 1000;
pub const LEARNING_RATE: f64 = 0.01;
pub const L2_LAMBDA: f64 = 0.001;
pub const STD_FLOOR: f64 = 1e-6;
pub const DECISION_THRESHOLD: f64 = 0.5;

// Baseline weights used before any model has been trained
pub const BASELINE_RATING_WEIGHT: f64 = 1.0;
pub const BASELINE_CONTRIBUTION_WEIGHT: f64 = 0.1;

// Composite score
pub const NEUTRAL_SCORE: f64 = 50.0;
pub const SCORE_LOGIT_SCALE: f64 = 0.5;
pub const CONFIDENCE_GAMES: f64 = 10.0;

// Lobby balancing
pub const BALANCE_MAX_ITERATIONS: usize = 10;
pub const FIRST_SWAP_MIN_IMPROVEMENT: f64 = 0.5;
pub const SWAP_MIN_IMPROVEMENT: f64 = 0.1;
pub const BALANCED_GAP: f64 = 1.0;
pub const BALANCE_CR_FLOOR: f64 = 1000.0;
pub const BALANCE_CR_CEILING: f64 = 2200.0;
pub const BALANCE_CR_WEIGHT_NEW: f64 = 0.5;
pub const BALANCE_CR_WEIGHT_VETERAN: f64 = 0.8;
pub const BALANCE_EXPERIENCE_GAMES: f64 = 50.0;
// Empirically tuned; no derivation behind these values
pub const UNPROVEN_FACTION_PENALTY: f64 = 10.0;
pub const FACTION_EXPERIENCE_DECAY: f64 = 5.0;
