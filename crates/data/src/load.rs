use crate::schema::{CardFile, CardRow, Catalog, GameConfig};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use zvezdolet_core::{
    linked_crash_id, linked_feature_id, parse_points, CardDef, CardKind, JokerEffect, Magnitude,
    Tier, TriggerRange,
};

pub const CARDS_FILE: &str = "cards.json";
pub const CONFIG_FILE: &str = "config.json";

const LOG_TARGET: &str = "zvezdolet::data";

/// A loaded catalog plus every non-fatal problem found in it.
#[derive(Debug)]
pub struct CatalogReport {
    pub catalog: Catalog,
    pub warnings: Vec<String>,
}

pub fn load_catalog(dir: &Path) -> anyhow::Result<CatalogReport> {
    let file: CardFile = load_json(dir.join(CARDS_FILE))?;
    let report = build_catalog(file.cards)
        .with_context(|| format!("build catalog from {}", dir.join(CARDS_FILE).display()))?;
    for warning in &report.warnings {
        tracing::warn!(target: LOG_TARGET, %warning, "catalog.warning");
    }
    tracing::info!(
        target: LOG_TARGET,
        cards = report.catalog.len(),
        warnings = report.warnings.len(),
        "catalog.loaded"
    );
    Ok(report)
}

/// Missing `config.json` means the tabletop defaults.
pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(GameConfig::default());
    }
    let config: GameConfig = load_json(path)?;
    if config.max_turns == 0 {
        bail!("max_turns must be at least 1");
    }
    Ok(config)
}

/// Parses raw rows. Broken ids are errors; anything the engine can still play around is a
/// warning.
pub fn build_catalog(rows: Vec<CardRow>) -> anyhow::Result<CatalogReport> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut cards = Vec::with_capacity(rows.len());

    for row in rows {
        let id = row.id.trim().to_string();
        if id.is_empty() {
            bail!("card id cannot be empty");
        }
        let Some(kind) = CardKind::from_id(&id) else {
            bail!("card {id} has an unknown category prefix");
        };
        if !seen.insert(id.clone()) {
            bail!("duplicate card {id}");
        }
        cards.push(parse_row(id, kind, row, &mut warnings));
    }

    let overloads: Vec<&str> = cards
        .iter()
        .filter(|card| card.overload)
        .map(|card| card.id.as_str())
        .collect();
    if overloads.len() > 1 {
        warnings.push(format!(
            "several overload defects ({}); only the first one drawn acts first",
            overloads.join(", ")
        ));
    }
    for card in &cards {
        match card.kind {
            CardKind::Feature => {
                let linked = linked_crash_id(&card.id).filter(|crash| seen.contains(crash));
                if linked.is_none() {
                    warnings.push(format!("feature {} has no crash card", card.id));
                }
            }
            CardKind::Crash => {
                let linked = linked_feature_id(&card.id).filter(|feature| seen.contains(feature));
                if linked.is_none() {
                    warnings.push(format!("crash {} has no feature card", card.id));
                }
            }
            CardKind::Defect | CardKind::Joker => {}
        }
    }

    Ok(CatalogReport {
        catalog: Catalog::new(cards),
        warnings,
    })
}

fn parse_row(id: String, kind: CardKind, row: CardRow, warnings: &mut Vec<String>) -> CardDef {
    let loss_trigger = parse_trigger(&id, "dice_loss", &row.dice_loss, warnings);
    let profit_trigger = parse_trigger(&id, "dice_profit", &row.dice_profit, warnings);

    let joker_effect = match (kind, row.joker_effect.as_deref()) {
        (CardKind::Joker, Some(keyword)) => {
            let effect = JokerEffect::from_keyword(keyword);
            if effect.is_none() {
                warnings.push(format!("joker {id} has unknown effect '{keyword}'"));
            }
            effect
        }
        (CardKind::Joker, None) => {
            warnings.push(format!("joker {id} has no effect and will do nothing"));
            None
        }
        (_, Some(_)) => {
            warnings.push(format!("card {id} is not a joker; joker_effect ignored"));
            None
        }
        (_, None) => None,
    };
    if row.overload && kind != CardKind::Defect {
        warnings.push(format!("card {id} is not a defect; overload ignored"));
    }

    let header = if row.header.trim().is_empty() {
        id.clone()
    } else {
        row.header.trim().to_string()
    };
    let tier = if kind == CardKind::Joker && row.template.is_empty() {
        Tier::Joker
    } else {
        Tier::from_template(&row.template)
    };

    CardDef {
        overload: row.overload && kind == CardKind::Defect,
        id,
        kind,
        tier,
        header,
        text: row.text,
        cost: parse_points(&row.cost),
        loss: Magnitude::parse(&row.loss),
        loss_text: row.loss,
        loss_trigger,
        profit: Magnitude::parse(&row.profit),
        profit_text: row.profit,
        profit_trigger,
        joker_positive: row.joker_positive,
        joker_negative: row.joker_negative,
        joker_effect,
    }
}

fn parse_trigger(id: &str, column: &str, raw: &str, warnings: &mut Vec<String>) -> TriggerRange {
    match TriggerRange::parse(raw) {
        Ok(range) => range,
        Err(err) => {
            warnings.push(format!("card {id} {column}: {err}; treated as never"));
            TriggerRange::Never
        }
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
