use crate::{Magnitude, TriggerRange};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Defect,
    Feature,
    Crash,
    Joker,
}

impl CardKind {
    pub fn prefix(self) -> char {
        match self {
            Self::Defect => 'D',
            Self::Feature => 'F',
            Self::Crash => 'C',
            Self::Joker => 'J',
        }
    }

    /// Category encoded by the first letter of a card id.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.chars().next()? {
            'D' => Some(Self::Defect),
            'F' => Some(Self::Feature),
            'C' => Some(Self::Crash),
            'J' => Some(Self::Joker),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Defect => "defect",
            Self::Feature => "feature",
            Self::Crash => "crash",
            Self::Joker => "joker",
        }
    }
}

/// Severity band printed on the card template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
    Extreme,
    Special,
    Joker,
    Normal,
}

impl Tier {
    /// Reads the band out of a template name such as `DEFECT_EASY.svg` or `FEATURE_STABLE.svg`.
    pub fn from_template(template: &str) -> Self {
        let upper = template.to_ascii_uppercase();
        // UNSTABLE contains STABLE, so the harder bands are checked first.
        if upper.contains("HARD") || upper.contains("UNSTABLE") {
            Self::Hard
        } else if upper.contains("EXTREME") || upper.contains("RISKY") {
            Self::Extreme
        } else if upper.contains("EASY") || upper.contains("STABLE") {
            Self::Easy
        } else if upper.contains("MEDIUM") || upper.contains("NORMAL") {
            Self::Medium
        } else if upper.contains("SPECIAL") {
            Self::Special
        } else if upper.contains("JOKER") {
            Self::Joker
        } else {
            Self::Normal
        }
    }

    pub fn is_light(self) -> bool {
        matches!(self, Self::Easy | Self::Medium)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JokerMode {
    /// Evaluated automatically after every roll.
    Passive,
    /// Needs an explicit player decision.
    Interactive,
}

/// What a joker in hand does. Trigger ranges come from the card's own loss/profit columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JokerEffect {
    /// Profit range: +1 AP next turn. Loss range: 0 AP next turn.
    DeferredActionPoints,
    /// Reroll one die once per turn; on a double the second die is dropped.
    Reroll,
    /// Profit range: +1 AP per defect fixed next turn. Loss range: a random defect arrives.
    DefectMorale,
    /// Profit range: +1 MP per feature that paid out.
    /// Loss range: half of this roll's income is lost.
    ProfitResonance,
    /// On an even roll, remove one light defect for free once per turn.
    RemoveDefect,
}

impl JokerEffect {
    pub fn mode(self) -> JokerMode {
        match self {
            Self::Reroll | Self::RemoveDefect => JokerMode::Interactive,
            Self::DeferredActionPoints | Self::DefectMorale | Self::ProfitResonance => {
                JokerMode::Passive
            }
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::DeferredActionPoints => "deferred_action_points",
            Self::Reroll => "reroll",
            Self::DefectMorale => "defect_morale",
            Self::ProfitResonance => "profit_resonance",
            Self::RemoveDefect => "remove_defect",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "deferred_action_points" | "ai_priority" => Some(Self::DeferredActionPoints),
            "reroll" | "quantum_luck" => Some(Self::Reroll),
            "defect_morale" | "morale" => Some(Self::DefectMorale),
            "profit_resonance" | "resonator" => Some(Self::ProfitResonance),
            "remove_defect" | "mobius" => Some(Self::RemoveDefect),
            _ => None,
        }
    }
}

/// Immutable catalog row with its columns already parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDef {
    pub id: String,
    pub kind: CardKind,
    pub tier: Tier,
    pub header: String,
    #[serde(default)]
    pub text: String,
    pub cost: u32,
    /// Primary magnitude slot. Features keep their income here, not in `profit`.
    pub loss: Magnitude,
    #[serde(default)]
    pub loss_text: String,
    pub loss_trigger: TriggerRange,
    pub profit: Magnitude,
    #[serde(default)]
    pub profit_text: String,
    pub profit_trigger: TriggerRange,
    #[serde(default)]
    pub joker_positive: String,
    #[serde(default)]
    pub joker_negative: String,
    /// Marks the defect that must be checked before any feature income.
    #[serde(default)]
    pub overload: bool,
    #[serde(default)]
    pub joker_effect: Option<JokerEffect>,
}

impl CardDef {
    /// Income of a feature. Read from the loss slot, where the card data stores it.
    pub fn feature_income(&self) -> u32 {
        self.loss.amount()
    }

    pub fn is_permanent(&self) -> bool {
        self.loss_trigger == TriggerRange::Always
    }
}

/// A card on the table: a copy of its catalog row plus per-instance play state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub def: CardDef,
    #[serde(default)]
    pub is_broken: bool,
}

impl Card {
    pub fn from_def(def: &CardDef) -> Self {
        Self {
            def: def.clone(),
            is_broken: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn header(&self) -> &str {
        &self.def.header
    }
}

/// `F07` -> `C07`. `None` for ids that are not features.
pub fn linked_crash_id(feature_id: &str) -> Option<String> {
    swap_prefix(feature_id, CardKind::Feature, CardKind::Crash)
}

/// `C07` -> `F07`. `None` for ids that are not crashes.
pub fn linked_feature_id(crash_id: &str) -> Option<String> {
    swap_prefix(crash_id, CardKind::Crash, CardKind::Feature)
}

fn swap_prefix(id: &str, from: CardKind, to: CardKind) -> Option<String> {
    let rest = id.strip_prefix(from.prefix())?;
    Some(format!("{}{}", to.prefix(), rest))
}
