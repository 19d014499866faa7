use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleParseError {
    #[error("unrecognized trigger range `{0}`")]
    Trigger(String),
    #[error("empty span in trigger range `{0}`")]
    EmptySpan(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerSpan {
    pub min: u8,
    pub max: u8,
}

impl TriggerSpan {
    pub fn contains(&self, total: u8) -> bool {
        total >= self.min && total <= self.max
    }
}

/// Dice totals on which a card fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerRange {
    Spans(Vec<TriggerSpan>),
    Odd,
    Even,
    /// Permanent effect applied at turn start, never on a roll.
    Always,
    /// The `double` sentinel. Never matches a total.
    Double,
    /// Empty column.
    Never,
}

impl TriggerRange {
    pub fn parse(raw: &str) -> Result<Self, RuleParseError> {
        let text = raw.trim();
        let lowered = text.to_lowercase();
        match lowered.as_str() {
            "" | "-" | "–" | "—" => return Ok(Self::Never),
            "всегда" | "always" => return Ok(Self::Always),
            "нечет." | "нечет" | "odd" => return Ok(Self::Odd),
            "четные" | "чет." | "чет" | "even" => return Ok(Self::Even),
            "дубль" | "double" => return Ok(Self::Double),
            _ => {}
        }

        let mut spans = Vec::new();
        for part in text.split(',').map(str::trim) {
            if part.is_empty() {
                return Err(RuleParseError::EmptySpan(raw.to_string()));
            }
            let bounds: Vec<&str> = part.split(['-', '–']).map(str::trim).collect();
            let span = match bounds.as_slice() {
                [single] => {
                    let value = parse_face(single, raw)?;
                    TriggerSpan {
                        min: value,
                        max: value,
                    }
                }
                [min, max] => TriggerSpan {
                    min: parse_face(min, raw)?,
                    max: parse_face(max, raw)?,
                },
                _ => return Err(RuleParseError::Trigger(raw.to_string())),
            };
            spans.push(span);
        }
        Ok(Self::Spans(spans))
    }

    pub fn matches(&self, total: u8) -> bool {
        match self {
            Self::Spans(spans) => spans.iter().any(|span| span.contains(total)),
            Self::Odd => total % 2 == 1,
            Self::Even => total % 2 == 0,
            Self::Always => true,
            Self::Double | Self::Never => false,
        }
    }
}

fn parse_face(value: &str, raw: &str) -> Result<u8, RuleParseError> {
    value
        .parse::<u8>()
        .map_err(|_| RuleParseError::Trigger(raw.to_string()))
}

/// Non-numeric outcomes printed on defect cards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SpecialEffect {
    EndGame,
    NoProfit,
    LoseFeature,
    SkipTurn,
}

impl SpecialEffect {
    pub fn from_text(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "конец игры" | "end of game" | "game over" => Some(Self::EndGame),
            "ход без прибыли" | "no profit turn" | "no profit" => Some(Self::NoProfit),
            "минус фича" | "lose feature" | "lose a feature" => Some(Self::LoseFeature),
            "пропуск хода" | "skip turn" | "skip a turn" => Some(Self::SkipTurn),
            _ => None,
        }
    }
}

/// Parsed effect column. Classification order: action points, then mission points,
/// then the special phrases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Magnitude {
    ActionPoints(u32),
    MissionPoints(u32),
    Special(SpecialEffect),
    /// A number without a unit.
    Points(u32),
    None,
}

impl Magnitude {
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.contains("ОД") || has_token(text, "AP") {
            return Self::ActionPoints(parse_points(text));
        }
        if text.contains("ОМ") || has_token(text, "MP") {
            return Self::MissionPoints(parse_points(text));
        }
        if let Some(special) = SpecialEffect::from_text(text) {
            return Self::Special(special);
        }
        if text.chars().any(|ch| ch.is_ascii_digit()) {
            return Self::Points(parse_points(text));
        }
        Self::None
    }

    pub fn amount(&self) -> u32 {
        match self {
            Self::ActionPoints(value) | Self::MissionPoints(value) | Self::Points(value) => *value,
            Self::Special(_) | Self::None => 0,
        }
    }
}

/// First run of digits in a cost or effect column, sign ignored. `0` when there is none.
pub fn parse_points(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn has_token(text: &str, token: &str) -> bool {
    text.split(|ch: char| !ch.is_alphanumeric())
        .any(|word| word == token)
}
