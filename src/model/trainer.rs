use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::TrainingConfig,
    model::{
        constants::{DECISION_THRESHOLD, STD_FLOOR},
        features::FeatureSet,
        structures::{
            feature_key::FeatureKey,
            feature_vector::FeatureVector,
            model_weights::{sigmoid, ModelWeights},
            side::Side
        }
    }
};

/// One match seen from side one: the difference of mean team features and
/// whether side one won.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: bool
}

impl TrainingExample {
    fn target(&self) -> f64 {
        if self.label {
            1.0
        } else {
            0.0
        }
    }
}

/// Per-feature mean and (floored) population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Normalization {
    mean: FeatureVector,
    std: FeatureVector
}

impl Normalization {
    fn fit(examples: &[TrainingExample]) -> Option<Normalization> {
        let mean = FeatureVector::mean(examples.iter().map(|e| &e.features))?;
        let variance = FeatureVector::mean(
            examples
                .iter()
                .map(|e| e.features.difference(&mean))
                .map(|d| FeatureVector::from_fn(|key| d[key] * d[key]))
                .collect::<Vec<_>>()
                .iter()
        )?;

        Some(Normalization {
            mean,
            std: FeatureVector::from_fn(|key| variance[key].sqrt().max(STD_FLOOR))
        })
    }

    fn apply(&self, features: &FeatureVector) -> FeatureVector {
        FeatureVector::from_fn(|key| (features[key] - self.mean[key]) / self.std[key])
    }
}

/// Full-batch logistic regression over per-match feature differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelTrainer {
    pub config: TrainingConfig
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> ModelTrainer {
        ModelTrainer { config }
    }

    /// Builds one example per match that has both sides and finite features.
    pub fn examples(feature_set: &FeatureSet) -> Vec<TrainingExample> {
        feature_set
            .matches
            .iter()
            .filter_map(|m| {
                let one = m.side_mean(Side::One)?;
                let two = m.side_mean(Side::Two)?;

                Some(TrainingExample {
                    features: one.difference(&two),
                    label: m.team_one_won
                })
            })
            .filter(|e| e.features.is_finite())
            .collect()
    }

    pub fn train(&self, feature_set: &FeatureSet) -> Option<ModelWeights> {
        self.train_examples(&Self::examples(feature_set))
    }

    /// Trains on normalized features and returns weights on the raw scale.
    /// Returns `None` when there is nothing to learn from.
    pub fn train_examples(&self, examples: &[TrainingExample]) -> Option<ModelWeights> {
        let Some(normalization) = Normalization::fit(examples) else {
            warn!("No training examples, keeping existing model");
            return None;
        };

        let normalized: Vec<(FeatureVector, f64)> = examples
            .iter()
            .map(|e| (normalization.apply(&e.features), e.target()))
            .collect();
        let n = normalized.len() as f64;

        let mut weights = FeatureVector::zeros();
        let mut bias = 0.0;
        for _ in 0..self.config.iterations {
            let (grad_w, grad_b) =
                normalized
                    .iter()
                    .fold((FeatureVector::zeros(), 0.0), |(grad_w, grad_b), (x, y)| {
                        let error = sigmoid(bias + weights.dot(x)) - y;
                        (grad_w.add(&x.scale(error)), grad_b + error)
                    });

            let grad_w = grad_w.scale(1.0 / n).add(&weights.scale(self.config.l2_lambda));
            weights = weights.difference(&grad_w.scale(self.config.learning_rate));
            bias -= self.config.learning_rate * grad_b / n;
        }

        let correct = normalized
            .iter()
            .filter(|(x, y)| (sigmoid(bias + weights.dot(x)) >= DECISION_THRESHOLD) == (*y > 0.5))
            .count();
        let training_accuracy = correct as f64 / n;

        let raw_weights = FeatureVector::from_fn(|key| weights[key] / normalization.std[key]);
        let raw_bias = bias - raw_weights.dot(&normalization.mean);

        info!(
            examples = normalized.len(),
            accuracy = training_accuracy,
            rating_weight = raw_weights[FeatureKey::Rating],
            "Model training complete"
        );

        Some(ModelWeights {
            id: Uuid::new_v4(),
            weights: raw_weights,
            bias: raw_bias,
            games_trained_on: normalized.len(),
            training_accuracy,
            trained_at: Utc::now()
        })
    }
}
