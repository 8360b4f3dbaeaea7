use crate::model::{
    constants::{BASELINE_CONTRIBUTION_WEIGHT, BASELINE_RATING_WEIGHT},
    structures::{feature_key::FeatureKey, feature_vector::FeatureVector}
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trained logistic-regression weight set, expressed on the raw (unnormalized) feature scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub id: Uuid,
    pub weights: FeatureVector,
    pub bias: f64,
    pub games_trained_on: usize,
    pub training_accuracy: f64,
    pub trained_at: DateTime<Utc>
}

impl ModelWeights {
    /// The weight set used before any training run has produced one.
    pub fn baseline() -> ModelWeights {
        let weights = FeatureVector::from_fn(|key| match key {
            FeatureKey::Rating => BASELINE_RATING_WEIGHT,
            k if k.is_contribution() => BASELINE_CONTRIBUTION_WEIGHT,
            _ => 0.0
        });

        ModelWeights {
            id: Uuid::nil(),
            weights,
            bias: 0.0,
            games_trained_on: 0,
            training_accuracy: 0.0,
            trained_at: DateTime::<Utc>::default()
        }
    }

    /// Linear predictor `bias + w·x`.
    pub fn logit(&self, features: &FeatureVector) -> f64 {
        self.bias + self.weights.dot(features)
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
