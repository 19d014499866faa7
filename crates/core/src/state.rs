use crate::{linked_crash_id, Card, DeferredQueue, DiceRoll, GameConfig, RollEvent, TurnFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Planning,
    DiceRoll,
    Results,
    Terminal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: usize,
    pub name: String,
    pub is_captain: bool,
}

/// Roll parked until the holder of an interactive joker decides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingChoice {
    pub joker_id: String,
    pub roll: DiceRoll,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EndReason {
    MissionPointsDepleted,
    TurnsCompleted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum MissionRating {
    TotalLoss,
    VergeOfFailure,
    DisasterAverted,
    BarelyMadeIt,
    Accomplished,
    Excellent,
    Legendary,
}

impl MissionRating {
    pub fn from_points(points: i64) -> Self {
        match points {
            p if p >= 150 => Self::Legendary,
            p if p >= 120 => Self::Excellent,
            p if p >= 80 => Self::Accomplished,
            p if p >= 50 => Self::BarelyMadeIt,
            p if p >= 20 => Self::DisasterAverted,
            p if p > 0 => Self::VergeOfFailure,
            _ => Self::TotalLoss,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Legendary => "Legendary victory",
            Self::Excellent => "Excellent result",
            Self::Accomplished => "Mission accomplished",
            Self::BarelyMadeIt => "Barely made it",
            Self::DisasterAverted => "Disaster averted",
            Self::VergeOfFailure => "On the verge of failure",
            Self::TotalLoss => "Total loss",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameOutcome {
    pub reason: EndReason,
    pub mission_points: i64,
    pub rating: MissionRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player: usize,
    pub turn: u32,
    pub max_turns: u32,
    pub phase: Phase,
    pub mission_points: i64,
    pub action_points: u32,
    pub dice: DiceRoll,
    pub active_defects: Vec<Card>,
    pub active_crashes: Vec<Card>,
    pub installed_features: Vec<Card>,
    pub available_features: Vec<Card>,
    pub available_jokers: Vec<Card>,
    pub hand_jokers: Vec<Card>,
    #[serde(default)]
    pub used_defect_ids: Vec<String>,
    #[serde(default)]
    pub used_joker_ids: Vec<String>,
    #[serde(default)]
    pub shown_feature_ids: Vec<String>,
    #[serde(default)]
    pub deferred: DeferredQueue,
    #[serde(default)]
    pub flags: TurnFlags,
    #[serde(default)]
    pub jokers_given: bool,
    #[serde(default)]
    pub pending_choice: Option<PendingChoice>,
    #[serde(default)]
    pub last_roll_events: Vec<RollEvent>,
    #[serde(default)]
    pub outcome: Option<GameOutcome>,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            players: Vec::new(),
            current_player: 0,
            turn: 1,
            max_turns: config.max_turns,
            phase: Phase::Setup,
            mission_points: config.starting_mission_points,
            action_points: config.base_action_points,
            dice: DiceRoll::default(),
            active_defects: Vec::new(),
            active_crashes: Vec::new(),
            installed_features: Vec::new(),
            available_features: Vec::new(),
            available_jokers: Vec::new(),
            hand_jokers: Vec::new(),
            used_defect_ids: Vec::new(),
            used_joker_ids: Vec::new(),
            shown_feature_ids: Vec::new(),
            deferred: DeferredQueue::default(),
            flags: TurnFlags::default(),
            jokers_given: false,
            pending_choice: None,
            last_roll_events: Vec::new(),
            outcome: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    /// Last player's slot of the last turn.
    pub fn is_final_turn(&self) -> bool {
        self.turn >= self.max_turns && self.current_player + 1 >= self.players.len()
    }

    pub fn installed_feature(&self, id: &str) -> Option<&Card> {
        self.installed_features.iter().find(|card| card.id() == id)
    }

    pub fn has_active_crash(&self, id: &str) -> bool {
        self.active_crashes.iter().any(|card| card.id() == id)
    }

    /// Broken rules of the board, empty when the state is consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.players.is_empty() && self.current_player >= self.players.len() {
            problems.push(format!(
                "current player {} out of {} players",
                self.current_player,
                self.players.len()
            ));
        }
        for (label, set) in [
            ("active defects", &self.active_defects),
            ("active crashes", &self.active_crashes),
            ("installed features", &self.installed_features),
            ("available features", &self.available_features),
            ("available jokers", &self.available_jokers),
            ("hand jokers", &self.hand_jokers),
        ] {
            let mut seen = HashSet::new();
            for card in set {
                if !seen.insert(card.id()) {
                    problems.push(format!("{label} hold {} twice", card.id()));
                }
            }
        }
        for feature in &self.installed_features {
            let crash_active = linked_crash_id(feature.id())
                .map(|crash_id| self.has_active_crash(&crash_id))
                .unwrap_or(false);
            if feature.is_broken != crash_active {
                problems.push(format!(
                    "feature {} broken={} but crash active={}",
                    feature.id(),
                    feature.is_broken,
                    crash_active
                ));
            }
        }
        for crash in &self.active_crashes {
            let feature_broken = crate::linked_feature_id(crash.id())
                .and_then(|feature_id| self.installed_feature(&feature_id))
                .map(|feature| feature.is_broken)
                .unwrap_or(false);
            if !feature_broken {
                problems.push(format!("crash {} active without a broken feature", crash.id()));
            }
        }
        for feature in &self.available_features {
            if self.installed_feature(feature.id()).is_some() {
                problems.push(format!("feature {} offered while installed", feature.id()));
            }
        }
        problems
    }
}
