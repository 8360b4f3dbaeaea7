use crate::model::{
    constants::{CONFIDENCE_GAMES, NEUTRAL_SCORE, SCORE_LOGIT_SCALE},
    structures::{
        feature_vector::FeatureVector,
        model_weights::{sigmoid, ModelWeights}
    }
};

/// Maps lifetime features onto a 0-100 composite score, shrunk toward 50 for
/// players with few games.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    weights: ModelWeights,
    neutral: FeatureVector
}

impl ScoreEngine {
    pub fn new(weights: ModelWeights) -> ScoreEngine {
        ScoreEngine {
            weights,
            neutral: FeatureVector::neutral()
        }
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    /// Score before confidence shrinkage.
    pub fn raw_score(&self, features: &FeatureVector) -> f64 {
        let raw = self.weights.logit(&features.difference(&self.neutral));

        sigmoid(raw * SCORE_LOGIT_SCALE) * 100.0
    }

    pub fn confidence(games_played: u32) -> f64 {
        1.0 - (-(games_played as f64) / CONFIDENCE_GAMES).exp()
    }

    pub fn score(&self, features: &FeatureVector, games_played: u32) -> f64 {
        NEUTRAL_SCORE + (self.raw_score(features) - NEUTRAL_SCORE) * Self::confidence(games_played)
    }
}
