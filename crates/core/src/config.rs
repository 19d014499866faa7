use serde::{Deserialize, Serialize};

/// Session constants. Every field falls back to the tabletop default when missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub max_turns: u32,
    pub starting_mission_points: i64,
    pub base_action_points: u32,
    pub bonus_action_points: u32,
    pub take_joker_cost: u32,
    pub starting_defects: usize,
    pub starting_features: usize,
    pub defects_per_turn: usize,
    pub features_per_turn: usize,
    /// Turn on which the defect/feature supply is replaced by a joker offer.
    pub joker_turn: u32,
    pub jokers_offered: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: 20,
            starting_mission_points: 100,
            base_action_points: 5,
            bonus_action_points: 1,
            take_joker_cost: 4,
            starting_defects: 1,
            starting_features: 3,
            defects_per_turn: 1,
            features_per_turn: 3,
            joker_turn: 10,
            jokers_offered: 3,
        }
    }
}
