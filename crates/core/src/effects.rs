//! Roll evaluation: which active cards fire for a dice total, in which order.
//!
//! The evaluator is a pure function of the roll, a read-only view of the board and the
//! catalog. It never mutates state; the session applies the returned events one by one.

use crate::{
    Card, Catalog, DiceRoll, GameState, JokerEffect, JokerMode, Magnitude, RollEvent, RollEventKind,
    Special, SpecialEffect, TriggerRange,
};

const LOG_TARGET: &str = "zvezdolet::effects";

/// Read-only view of the card sets a roll is checked against.
#[derive(Debug, Clone, Copy)]
pub struct Board<'a> {
    pub defects: &'a [Card],
    pub crashes: &'a [Card],
    pub features: &'a [Card],
    pub jokers: &'a [Card],
}

impl<'a> Board<'a> {
    pub fn from_state(state: &'a GameState) -> Self {
        Self {
            defects: &state.active_defects,
            crashes: &state.active_crashes,
            features: &state.installed_features,
            jokers: &state.hand_jokers,
        }
    }
}

/// Evaluates every active card against `roll`.
///
/// Order is part of the rules:
/// 1. the overload defect, which can shut off feature income for this roll;
/// 2. the remaining defects;
/// 3. crashes;
/// 4. working features (income, then breakdown);
/// 5. passive jokers, which read the income tally from step 4.
///
/// Cards whose loss trigger is `always` are skipped; they act at turn start.
pub fn evaluate_roll(roll: DiceRoll, board: &Board<'_>, catalog: &Catalog) -> Vec<RollEvent> {
    let total = roll.total();
    let mut events = Vec::new();

    let no_profit = check_overload(total, board, &mut events);
    check_defects(total, board, &mut events);
    check_crashes(total, board, &mut events);
    check_features(total, board, catalog, no_profit, &mut events);
    check_jokers(total, board, &mut events);

    events
}

fn check_overload(total: u8, board: &Board<'_>, events: &mut Vec<RollEvent>) -> bool {
    let Some(overload) = board.defects.iter().find(|card| card.def.overload) else {
        return false;
    };
    if !overload.def.loss_trigger.matches(total) {
        return false;
    }
    events.push(
        RollEvent::new(
            RollEventKind::Defect,
            overload.id(),
            overload.header(),
            format!("{} (features earn nothing)", overload.def.loss_text),
        )
        .with_special(Special::NoProfit),
    );
    true
}

fn check_defects(total: u8, board: &Board<'_>, events: &mut Vec<RollEvent>) {
    for defect in board.defects {
        if defect.def.overload || defect.def.loss_trigger == TriggerRange::Always {
            continue;
        }
        if !defect.def.loss_trigger.matches(total) {
            continue;
        }
        events.push(defect_event(defect));
    }
}

fn defect_event(defect: &Card) -> RollEvent {
    let event = RollEvent::new(
        RollEventKind::Defect,
        defect.id(),
        defect.header(),
        defect.def.loss_text.clone(),
    );
    match defect.def.loss {
        Magnitude::ActionPoints(amount) => event.with_action(-(amount as i64)),
        Magnitude::MissionPoints(amount) => event.with_mission(-(amount as i64)),
        Magnitude::Special(special) => event.with_special(match special {
            SpecialEffect::EndGame => Special::EndGame,
            SpecialEffect::NoProfit => Special::NoProfit,
            SpecialEffect::LoseFeature => Special::LoseFeature,
            SpecialEffect::SkipTurn => Special::SkipTurn,
        }),
        Magnitude::Points(_) | Magnitude::None => event,
    }
}

fn check_crashes(total: u8, board: &Board<'_>, events: &mut Vec<RollEvent>) {
    for crash in board.crashes {
        if crash.def.loss_trigger == TriggerRange::Always {
            continue;
        }
        if !crash.def.loss_trigger.matches(total) {
            continue;
        }
        events.push(
            RollEvent::new(
                RollEventKind::Crash,
                crash.id(),
                crash.header(),
                crash.def.loss_text.clone(),
            )
            .with_mission(-(crash.def.loss.amount() as i64)),
        );
    }
}

fn check_features(
    total: u8,
    board: &Board<'_>,
    catalog: &Catalog,
    no_profit: bool,
    events: &mut Vec<RollEvent>,
) {
    for feature in board.features {
        if feature.is_broken {
            continue;
        }
        if !no_profit && feature.def.profit_trigger.matches(total) {
            events.push(
                RollEvent::new(
                    RollEventKind::Profit,
                    feature.id(),
                    feature.header(),
                    feature.def.loss_text.clone(),
                )
                .with_mission(feature.def.feature_income() as i64),
            );
        }
        if feature.def.loss_trigger.matches(total) {
            match catalog.crash_for_feature(feature.id()) {
                Some(crash) => events.push(
                    RollEvent::new(
                        RollEventKind::Breakdown,
                        feature.id(),
                        feature.header(),
                        format!("Crash: {}", crash.header()),
                    )
                    .with_linked(crash.def.id),
                ),
                None => tracing::warn!(
                    target: LOG_TARGET,
                    feature = %feature.id(),
                    "feature broke but the catalog has no linked crash; breakdown skipped"
                ),
            }
        }
    }
}

fn check_jokers(total: u8, board: &Board<'_>, events: &mut Vec<RollEvent>) {
    let profit: Vec<i64> = events
        .iter()
        .filter(|event| event.kind == RollEventKind::Profit)
        .map(|event| event.mission_delta)
        .collect();
    let profit_count = profit.len() as i64;
    let profit_total: i64 = profit.iter().sum();

    for joker in board.jokers {
        let Some(effect) = joker.def.joker_effect else {
            continue;
        };
        // Interactive jokers act through their own session operations.
        if effect.mode() == JokerMode::Interactive {
            continue;
        }
        let loss_hit = joker.def.loss_trigger.matches(total);
        let profit_hit = joker.def.profit_trigger.matches(total);
        let bonus = |message: String| {
            RollEvent::new(RollEventKind::JokerBonus, joker.id(), joker.header(), message)
        };
        let penalty = |message: String| {
            RollEvent::new(RollEventKind::JokerPenalty, joker.id(), joker.header(), message)
        };
        match effect {
            JokerEffect::DeferredActionPoints => {
                if profit_hit {
                    events.push(
                        bonus("+1 AP next turn".to_string()).with_special(Special::BonusNextTurn),
                    );
                } else if loss_hit {
                    events.push(
                        penalty("0 AP next turn".to_string())
                            .with_special(Special::PenaltyNextTurn),
                    );
                }
            }
            JokerEffect::ProfitResonance => {
                if loss_hit {
                    if profit_total > 0 {
                        let half = profit_total / 2;
                        events.push(
                            penalty(format!("-{half} MP (half of the income)")).with_mission(-half),
                        );
                    }
                } else if profit_count > 0 && profit_hit {
                    events.push(
                        bonus(format!("+{profit_count} MP ({profit_count} features paid out)"))
                            .with_mission(profit_count),
                    );
                }
            }
            JokerEffect::DefectMorale => {
                if loss_hit {
                    events.push(
                        penalty("+1 random defect".to_string()).with_special(Special::AddDefect),
                    );
                } else if profit_hit {
                    events.push(
                        bonus("+1 AP per defect fixed next turn".to_string())
                            .with_special(Special::FixBonusNextTurn),
                    );
                }
            }
            JokerEffect::Reroll | JokerEffect::RemoveDefect => {}
        }
    }
}
