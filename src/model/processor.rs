use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::EngineConfig,
    model::{
        balancer::LobbyBalancer,
        features::FeatureExtractor,
        predictor::LobbyPredictor,
        profile::{build_profiles, PlayerProfile},
        rating_tracker::RatingState,
        recalculation::RecalculationPipeline,
        score::ScoreEngine,
        structures::{
            match_data::{Match, Player},
            model_weights::ModelWeights,
            player_rating::PlayerRating,
            processing::{AppearanceSnapshot, MatchFailure, PassReport}
        },
        trainer::ModelTrainer
    }
};

/// Every record produced by one full processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutput {
    pub ratings: Vec<PlayerRating>,
    pub snapshots: Vec<AppearanceSnapshot>,
    pub reports: Vec<PassReport>,
    pub feature_failures: Vec<MatchFailure>,
    /// Only set when this run trained a new model
    pub trained_weights: Option<ModelWeights>,
    /// The weights used for scoring
    pub weights: ModelWeights,
    pub profiles: IndexMap<i32, PlayerProfile>
}

impl ProcessingOutput {
    pub fn predictor(&self) -> LobbyPredictor<'_> {
        LobbyPredictor::new(&self.profiles, &self.weights)
    }
}

pub struct RatingProcessor {
    pub pipeline: RecalculationPipeline,
    pub trainer: ModelTrainer,
    pub config: EngineConfig
}

impl RatingProcessor {
    pub fn new(config: EngineConfig) -> RatingProcessor {
        RatingProcessor {
            pipeline: RecalculationPipeline::new(),
            trainer: ModelTrainer::new(config.training),
            config
        }
    }

    pub fn balancer<'a>(&self, output: &'a ProcessingOutput) -> LobbyBalancer<'a> {
        LobbyBalancer::new(output.predictor(), self.config.balancer)
    }

    /// # Processing
    ///
    /// Rebuilds everything derived from the match history.
    ///
    /// Steps:
    /// 1. Replay every rating system from seeds.
    /// 2. Extract causal features using the Elo pass's pre-match ratings.
    /// 3. Optionally train a new model. Scoring uses, in order of preference, the
    ///     newly trained weights, `current_weights`, or the baseline.
    /// 4. Build and score lifetime profiles, writing composite scores onto the ratings.
    pub fn process(
        &self,
        players: &[Player],
        matches: &[Match],
        current_weights: Option<&ModelWeights>,
        train: bool
    ) -> ProcessingOutput {
        let (mut state, snapshots, reports) = self.pipeline.recalculate(RatingState::seeded(players), matches);

        let features = FeatureExtractor::new(&snapshots).extract(matches);
        let trained_weights = if train { self.trainer.train(&features) } else { None };

        let weights = trained_weights
            .clone()
            .or_else(|| current_weights.cloned())
            .unwrap_or_else(ModelWeights::baseline);
        let scorer = ScoreEngine::new(weights.clone());

        let profiles = build_profiles(&state, &features, &scorer);
        for rating in state.ratings_mut() {
            if let Some(profile) = profiles.get(&rating.player_id) {
                rating.composite_score = profile.composite_score;
            }
        }

        info!(
            players = state.len(),
            matches = matches.len(),
            trained = trained_weights.is_some(),
            "Processing complete"
        );

        ProcessingOutput {
            ratings: state.into_ratings(),
            snapshots,
            reports,
            feature_failures: features.failures,
            trained_weights,
            weights,
            profiles
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::EngineConfig,
        model::{
            processor::RatingProcessor,
            structures::{
                lobby::{Lobby, LobbyBalance, LobbySlot},
                model_weights::ModelWeights
            }
        },
        utils::test_utils::{generate_matches, generate_players}
    };

    #[test]
    fn test_empty_run() {
        let output = RatingProcessor::new(EngineConfig::default()).process(&[], &[], None, true);

        assert!(output.ratings.is_empty());
        assert!(output.trained_weights.is_none());
        assert_eq!(output.weights, ModelWeights::baseline());
    }

    #[test]
    fn test_composite_scores_are_written() {
        let players = generate_players(10);
        let matches = generate_matches(40, &players);

        let output = RatingProcessor::new(EngineConfig::default()).process(&players, &matches, None, true);

        assert!(output.trained_weights.is_some());
        assert_eq!(output.weights, output.trained_weights.clone().unwrap());
        for rating in &output.ratings {
            assert_eq!(rating.composite_score, output.profiles[&rating.player_id].composite_score);
            assert!((0.0..=100.0).contains(&rating.composite_score));
        }
    }

    #[test]
    fn test_current_weights_used_without_training() {
        let players = generate_players(6);
        let matches = generate_matches(10, &players);
        let mut current = ModelWeights::baseline();
        current.bias = 0.25;

        let output = RatingProcessor::new(EngineConfig::default()).process(&players, &matches, Some(&current), false);

        assert!(output.trained_weights.is_none());
        assert_eq!(output.weights, current);
    }

    #[test]
    fn test_lobby_tools_from_output() {
        let players = generate_players(8);
        let matches = generate_matches(30, &players);
        let processor = RatingProcessor::new(EngineConfig::default());
        let output = processor.process(&players, &matches, None, false);

        let lobby = Lobby::new(
            vec![LobbySlot::Known(players[0].id), LobbySlot::Known(players[1].id)],
            vec![LobbySlot::Known(players[2].id), LobbySlot::Unknown]
        );

        assert!(output.predictor().predict(&lobby).prediction().is_some());
        assert!(matches!(processor.balancer(&output).balance(&lobby), LobbyBalance::Balanced(_)));
    }
}
