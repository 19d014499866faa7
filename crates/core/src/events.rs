use crate::{CardKind, Deferred, DiceRoll, EndReason, MissionRating, Phase};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RollEventKind {
    Defect,
    Crash,
    Profit,
    Breakdown,
    JokerBonus,
    JokerPenalty,
}

/// Side effect attached to a roll event, applied after its point deltas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Special {
    EndGame,
    NoProfit,
    LoseFeature,
    SkipTurn,
    AddDefect,
    BonusNextTurn,
    PenaltyNextTurn,
    FixBonusNextTurn,
}

/// One triggered card effect produced by the roll evaluator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollEvent {
    pub kind: RollEventKind,
    pub source_id: String,
    pub name: String,
    pub message: String,
    pub mission_delta: i64,
    #[serde(default)]
    pub action_delta: Option<i64>,
    #[serde(default)]
    pub special: Option<Special>,
    /// Crash activated by a breakdown.
    #[serde(default)]
    pub linked_id: Option<String>,
}

impl RollEvent {
    pub fn new(
        kind: RollEventKind,
        source_id: &str,
        name: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source_id: source_id.to_string(),
            name: name.to_string(),
            message: message.into(),
            mission_delta: 0,
            action_delta: None,
            special: None,
            linked_id: None,
        }
    }

    pub fn with_mission(mut self, delta: i64) -> Self {
        self.mission_delta = delta;
        self
    }

    pub fn with_action(mut self, delta: i64) -> Self {
        self.action_delta = Some(delta);
        self
    }

    pub fn with_special(mut self, special: Special) -> Self {
        self.special = Some(special);
        self
    }

    pub fn with_linked(mut self, id: String) -> Self {
        self.linked_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RemovalReason {
    Fixed,
    Repaired,
    Destroyed,
    Used,
    Taken,
    Installed,
    RemovedByJoker,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiceAdjustment {
    DoubleDropped,
    Rerolled { die: u8, from: u8, to: u8 },
    Kept,
}

/// Session-level notification for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    GameStarted {
        players: usize,
        mission_points: i64,
        action_points: u32,
    },
    TurnStarted {
        turn: u32,
        player: usize,
        action_points: u32,
    },
    PhaseChanged {
        phase: Phase,
    },
    DiceRolled {
        roll: DiceRoll,
    },
    DiceAdjusted {
        roll: DiceRoll,
        adjustment: DiceAdjustment,
    },
    RerollChoiceRequired {
        joker_id: String,
        roll: DiceRoll,
    },
    EffectApplied {
        event: RollEvent,
        mission_points: i64,
        action_points: u32,
    },
    FeatureBroken {
        feature_id: String,
        crash_id: String,
    },
    CardDrawn {
        id: String,
        kind: CardKind,
    },
    DeckReshuffled {
        kind: CardKind,
    },
    CardRemoved {
        id: String,
        reason: RemovalReason,
    },
    ActionPointsSpent {
        id: String,
        cost: u32,
        remaining: u32,
    },
    ActionPointsRefunded {
        amount: u32,
        action_points: u32,
    },
    DeferredApplied {
        modifier: Deferred,
        action_points: u32,
    },
    PermanentEffect {
        id: String,
        mission_delta: i64,
        action_delta: i64,
    },
    DataIntegrity {
        message: String,
    },
    GameOver {
        reason: EndReason,
        mission_points: i64,
        rating: MissionRating,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
