use serde::{Deserialize, Serialize};
use std::{env, str::FromStr};
use thiserror::Error;

use crate::model::constants::{
    BALANCED_GAP, BALANCE_MAX_ITERATIONS, FIRST_SWAP_MIN_IMPROVEMENT, L2_LAMBDA, LEARNING_RATE, SWAP_MIN_IMPROVEMENT,
    TRAINING_ITERATIONS
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String }
}

/// Gradient descent parameters for the outcome model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Full-batch iterations (default: 1000)
    pub iterations: usize,
    pub learning_rate: f64,
    /// L2 penalty on weights, never on the bias
    pub l2_lambda: f64
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: TRAINING_ITERATIONS,
            learning_rate: LEARNING_RATE,
            l2_lambda: L2_LAMBDA
        }
    }
}

/// Swap search parameters for lobby balancing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancerConfig {
    pub max_iterations: usize,
    /// Minimum gap reduction for the first swap
    pub first_swap_min_improvement: f64,
    /// Minimum gap reduction for every later swap
    pub swap_min_improvement: f64,
    /// Search stops once the gap is below this
    pub balanced_gap: f64
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            max_iterations: BALANCE_MAX_ITERATIONS,
            first_swap_min_improvement: FIRST_SWAP_MIN_IMPROVEMENT,
            swap_min_improvement: SWAP_MIN_IMPROVEMENT,
            balanced_gap: BALANCED_GAP
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub training: TrainingConfig,
    pub balancer: BalancerConfig
}

/// Reads `key` from the environment, keeping `default` when it is unset.
fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default)
    }
}

impl EngineConfig {
    /// Creates a configuration from the defaults, overridden by any environment variables set
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            training: TrainingConfig {
                iterations: env_or("TRAINING_ITERATIONS", defaults.training.iterations)?,
                learning_rate: env_or("TRAINING_LEARNING_RATE", defaults.training.learning_rate)?,
                l2_lambda: env_or("TRAINING_L2_LAMBDA", defaults.training.l2_lambda)?
            },
            balancer: BalancerConfig {
                max_iterations: env_or("BALANCER_MAX_ITERATIONS", defaults.balancer.max_iterations)?,
                balanced_gap: env_or("BALANCER_BALANCED_GAP", defaults.balancer.balanced_gap)?,
                ..defaults.balancer
            }
        })
    }
}
