use crate::model::structures::{
    feature_vector::FeatureVector,
    side::{Side, Sides}
};
use serde::{Deserialize, Serialize};

/// A lobby slot: a known player, or a new player with no history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "player_id", rename_all = "snake_case")]
pub enum LobbySlot {
    Known(i32),
    Unknown
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LobbyTeam {
    #[serde(default)]
    pub faction: Option<String>,
    pub slots: Vec<LobbySlot>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lobby {
    pub teams: Sides<LobbyTeam>
}

impl Lobby {
    pub fn new(side_one: Vec<LobbySlot>, side_two: Vec<LobbySlot>) -> Lobby {
        Lobby {
            teams: Sides::new(
                LobbyTeam {
                    faction: None,
                    slots: side_one
                },
                LobbyTeam {
                    faction: None,
                    slots: side_two
                }
            )
        }
    }

    pub fn with_factions(mut self, side_one: Option<&str>, side_two: Option<&str>) -> Lobby {
        self.teams.one.faction = side_one.map(str::to_string);
        self.teams.two.faction = side_two.map(str::to_string);
        self
    }

    pub fn slots(&self, side: Side) -> &[LobbySlot] {
        &self.teams.get(side).slots
    }

    pub fn faction(&self, side: Side) -> Option<&str> {
        self.teams.get(side).faction.as_deref()
    }

    /// The first side with nobody in it, if any.
    pub fn empty_side(&self) -> Option<Side> {
        [Side::One, Side::Two].into_iter().find(|side| self.slots(*side).is_empty())
    }

    /// Exchanges a side-one slot with a side-two slot.
    pub fn swap(&mut self, side_one_slot: usize, side_two_slot: usize) {
        std::mem::swap(
            &mut self.teams.one.slots[side_one_slot],
            &mut self.teams.two.slots[side_two_slot]
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    EmptySide(Side)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Win probability per side, as percentages summing to 100
    pub win_probability: Sides<f64>,
    pub team_features: Sides<FeatureVector>,
    /// Side one minus side two
    pub difference: FeatureVector
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyPrediction {
    Predicted(Prediction),
    Unavailable(UnavailableReason)
}

impl LobbyPrediction {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            LobbyPrediction::Predicted(p) => Some(p),
            LobbyPrediction::Unavailable(_) => None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swap {
    pub side_one_slot: usize,
    pub side_two_slot: usize,
    /// The occupant moved from side one to side two
    pub moved_to_side_two: LobbySlot,
    /// The occupant moved from side two to side one
    pub moved_to_side_one: LobbySlot,
    pub gap_before: f64,
    pub gap_after: f64
}

impl Swap {
    pub fn improvement(&self) -> f64 {
        self.gap_before - self.gap_after
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResult {
    pub initial_gap: f64,
    pub final_gap: f64,
    pub swaps: Vec<Swap>,
    pub lobby: Lobby,
    pub prediction: LobbyPrediction
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyBalance {
    Balanced(BalanceResult),
    Unavailable(UnavailableReason)
}

#[cfg(test)]
mod tests {
    use crate::model::structures::{
        lobby::{Lobby, LobbySlot},
        side::Side
    };

    #[test]
    fn test_swap() {
        let mut lobby = Lobby::new(
            vec![LobbySlot::Known(1), LobbySlot::Known(2)],
            vec![LobbySlot::Known(3), LobbySlot::Unknown]
        );

        lobby.swap(1, 1);

        assert_eq!(lobby.slots(Side::One), &[LobbySlot::Known(1), LobbySlot::Unknown]);
        assert_eq!(lobby.slots(Side::Two), &[LobbySlot::Known(3), LobbySlot::Known(2)]);
    }

    #[test]
    fn test_empty_side() {
        let lobby = Lobby::new(vec![LobbySlot::Unknown], vec![]);
        assert_eq!(lobby.empty_side(), Some(Side::Two));

        let lobby = Lobby::new(vec![LobbySlot::Unknown], vec![LobbySlot::Unknown]);
        assert_eq!(lobby.empty_side(), None);
    }

    #[test]
    fn test_slot_serialization() {
        assert_eq!(
            serde_json::to_string(&LobbySlot::Known(7)).unwrap(),
            r#"{"kind":"known","player_id":7}"#
        );
        assert_eq!(serde_json::to_string(&LobbySlot::Unknown).unwrap(), r#"{"kind":"unknown"}"#);
    }
}
