use crate::model::constants::{
    DEFAULT_CONTRIBUTION, DEFAULT_RATING, NEUTRAL_HERO_KD, NEUTRAL_UPTIME, RATING_FEATURE_SCALE
};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumCount, EnumIter};

/// Named performance signals used as regression inputs.
/// The declaration order is the storage order inside a `FeatureVector`.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureKey {
    HeroKd,
    HeroKillContribution,
    UnitKillContribution,
    ObjectiveContribution,
    HeroUptime,
    UnitUptime,
    GamesPlayedLog,
    Rating,
    RatingDifferential
}

impl FeatureKey {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The value a player with no underlying data is assumed to have.
    /// "No data" must never look like "bad performance" to the model.
    pub fn neutral(self) -> f64 {
        match self {
            FeatureKey::HeroKd => NEUTRAL_HERO_KD,
            FeatureKey::HeroKillContribution | FeatureKey::UnitKillContribution | FeatureKey::ObjectiveContribution => {
                DEFAULT_CONTRIBUTION
            }
            FeatureKey::HeroUptime | FeatureKey::UnitUptime => NEUTRAL_UPTIME,
            FeatureKey::GamesPlayedLog => 0.0,
            FeatureKey::Rating => DEFAULT_RATING / RATING_FEATURE_SCALE,
            FeatureKey::RatingDifferential => 0.0
        }
    }

    pub fn is_contribution(self) -> bool {
        matches!(
            self,
            FeatureKey::HeroKillContribution | FeatureKey::UnitKillContribution | FeatureKey::ObjectiveContribution
        )
    }
}
