use indexmap::IndexMap;

use crate::model::{
    constants::{DEFAULT_RATING, RATING_FEATURE_SCALE},
    profile::PlayerProfile,
    structures::{
        feature_key::FeatureKey,
        feature_vector::FeatureVector,
        lobby::{Lobby, LobbyPrediction, LobbySlot, Prediction, UnavailableReason},
        model_weights::{sigmoid, ModelWeights},
        side::{Side, Sides}
    }
};

/// Predicts lobby outcomes from current profiles. Read-only.
pub struct LobbyPredictor<'a> {
    profiles: &'a IndexMap<i32, PlayerProfile>,
    weights: &'a ModelWeights
}

impl<'a> LobbyPredictor<'a> {
    pub fn new(profiles: &'a IndexMap<i32, PlayerProfile>, weights: &'a ModelWeights) -> LobbyPredictor<'a> {
        LobbyPredictor { profiles, weights }
    }

    pub fn profile(&self, slot: LobbySlot) -> Option<&'a PlayerProfile> {
        match slot {
            LobbySlot::Known(player_id) => self.profiles.get(&player_id),
            LobbySlot::Unknown => None
        }
    }

    fn slot_elo(&self, slot: LobbySlot) -> f64 {
        self.profile(slot).map_or(DEFAULT_RATING, |p| p.elo)
    }

    fn team_elo(&self, slots: &[LobbySlot]) -> f64 {
        slots.iter().map(|s| self.slot_elo(*s)).sum::<f64>() / slots.len() as f64
    }

    /// Mean member features for each side. Both sides must be non-empty.
    fn team_features(&self, lobby: &Lobby) -> Sides<FeatureVector> {
        let team_elo = Sides::from_fn(|side| self.team_elo(lobby.slots(side)));

        Sides::from_fn(|side| {
            let opposing = *team_elo.get(side.opposite());
            let members: Vec<FeatureVector> = lobby
                .slots(side)
                .iter()
                .map(|slot| {
                    let elo = self.slot_elo(*slot);
                    let mut features = self.profile(*slot).map_or_else(FeatureVector::neutral, |p| p.features);
                    features[FeatureKey::Rating] = elo / RATING_FEATURE_SCALE;
                    features[FeatureKey::RatingDifferential] = (elo - opposing) / RATING_FEATURE_SCALE;

                    features
                })
                .collect();

            FeatureVector::mean(&members).unwrap_or_else(FeatureVector::neutral)
        })
    }

    pub fn predict(&self, lobby: &Lobby) -> LobbyPrediction {
        if let Some(side) = lobby.empty_side() {
            return LobbyPrediction::Unavailable(UnavailableReason::EmptySide(side));
        }

        let team_features = self.team_features(lobby);
        let difference = team_features.one.difference(&team_features.two);
        let side_one = sigmoid(self.weights.logit(&difference)) * 100.0;

        LobbyPrediction::Predicted(Prediction {
            win_probability: Sides::new(side_one, 100.0 - side_one),
            team_features,
            difference
        })
    }

    pub fn win_probability(&self, lobby: &Lobby, side: Side) -> Option<f64> {
        self.predict(lobby).prediction().map(|p| *p.win_probability.get(side))
    }
}
