use serde::{Deserialize, Serialize};

pub use zvezdolet_core::{Catalog, GameConfig};

/// One row of `cards.json`, columns as printed on the card. Parsed into a `CardDef` on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardRow {
    pub id: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub loss: String,
    #[serde(default)]
    pub dice_loss: String,
    #[serde(default)]
    pub profit: String,
    #[serde(default)]
    pub dice_profit: String,
    #[serde(default)]
    pub joker_positive: String,
    #[serde(default)]
    pub joker_negative: String,
    #[serde(default)]
    pub overload: bool,
    #[serde(default)]
    pub joker_effect: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardFile {
    pub cards: Vec<CardRow>,
}
