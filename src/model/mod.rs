pub mod balancer;
pub mod constants;
pub mod custom_rating;
pub mod elo;
pub mod engine;
pub mod error;
pub mod features;
pub mod glicko2;
pub mod predictor;
pub mod processor;
pub mod profile;
pub mod rating_tracker;
pub mod recalculation;
pub mod score;
pub mod structures;
pub mod teams;
pub mod trainer;
