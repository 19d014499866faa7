#![allow(dead_code)]

use zvezdolet_core::{
    Card, CardDef, CardKind, Catalog, EventBus, GameConfig, JokerEffect, Magnitude, Phase,
    ScriptedDice, Session, Tier, TriggerRange,
};

pub fn card(
    id: &str,
    tier: Tier,
    cost: u32,
    loss: &str,
    loss_trigger: &str,
    profit_trigger: &str,
) -> CardDef {
    let kind = CardKind::from_id(id).expect("known prefix");
    CardDef {
        id: id.to_string(),
        kind,
        tier,
        header: format!("{} {id}", kind.label()),
        text: String::new(),
        cost,
        loss: Magnitude::parse(loss),
        loss_text: loss.to_string(),
        loss_trigger: TriggerRange::parse(loss_trigger).expect("loss trigger"),
        profit: Magnitude::None,
        profit_text: String::new(),
        profit_trigger: TriggerRange::parse(profit_trigger).expect("profit trigger"),
        joker_positive: String::new(),
        joker_negative: String::new(),
        overload: false,
        joker_effect: None,
    }
}

pub fn joker(id: &str, effect: JokerEffect, loss_trigger: &str, profit_trigger: &str) -> CardDef {
    CardDef {
        joker_effect: Some(effect),
        ..card(id, Tier::Joker, 2, "", loss_trigger, profit_trigger)
    }
}

/// Small hand-written deck. Triggers are chosen so that a given total hits few cards.
///
/// Defects: D01 easy -1 AP on 2, D02 medium -5 MP on 3, D03 hard -2 AP on 11,
/// D15 overload on 7, D16 lose feature on 12, D20 skip turn on 9, D21 end game on 6,
/// D30 -1 AP always.
/// Features F01..F05 earn on even totals and break on 11; F05 has no crash row.
/// Crashes C01..C04 cost 10 MP on 5.
pub fn test_catalog() -> Catalog {
    let mut cards = vec![
        card("D01", Tier::Easy, 1, "-1 AP", "2", ""),
        card("D02", Tier::Medium, 2, "-5 MP", "3", ""),
        card("D03", Tier::Hard, 3, "-2 AP", "11", ""),
        CardDef {
            overload: true,
            ..card("D15", Tier::Special, 3, "No profit", "7", "")
        },
        card("D16", Tier::Extreme, 4, "Lose feature", "12", ""),
        card("D20", Tier::Hard, 3, "Skip turn", "9", ""),
        card("D21", Tier::Extreme, 5, "Game over", "6", ""),
        card("D30", Tier::Medium, 2, "-1 AP", "always", ""),
    ];
    for index in 1..=5 {
        let mut feature = card(&format!("F0{index}"), Tier::Easy, 2, "+10 MP", "11", "even");
        feature.cost = index;
        cards.push(feature);
    }
    for index in 1..=4 {
        cards.push(card(&format!("C0{index}"), Tier::Hard, 2, "-10 MP", "5", ""));
    }
    cards.extend([
        joker("J01", JokerEffect::DeferredActionPoints, "7", "1-6, 8-12"),
        joker("J02", JokerEffect::Reroll, "", ""),
        joker("J03", JokerEffect::DefectMorale, "6, 12", "2-5, 7-11"),
        joker("J04", JokerEffect::ProfitResonance, "7", "1-6, 8-12"),
        joker("J05", JokerEffect::RemoveDefect, "", "even"),
    ]);
    Catalog::new(cards)
}

pub fn session_with_dice(faces: &[u8]) -> Session {
    Session::with_dice(
        GameConfig::default(),
        test_catalog(),
        7,
        Box::new(ScriptedDice::new(faces.iter().copied())),
    )
}

/// Started two-player game with an empty board, in Planning with 5 AP.
pub fn started(faces: &[u8]) -> (Session, EventBus) {
    let mut session = session_with_dice(faces);
    let mut events = EventBus::default();
    session
        .start_game(vec!["Ada".to_string(), "Lev".to_string()], &mut events)
        .expect("start game");
    clear_board(&mut session);
    events.drain().for_each(drop);
    (session, events)
}

pub fn clear_board(session: &mut Session) {
    let state = session.state_mut();
    state.active_defects.clear();
    state.active_crashes.clear();
    state.installed_features.clear();
    state.available_features.clear();
    state.available_jokers.clear();
    state.hand_jokers.clear();
}

pub fn instance(session: &Session, id: &str) -> Card {
    session.catalog().instantiate(id).expect("card in catalog")
}

pub fn add_defect(session: &mut Session, id: &str) {
    let card = instance(session, id);
    session.state_mut().active_defects.push(card);
}

pub fn install(session: &mut Session, id: &str) {
    let card = instance(session, id);
    session.state_mut().installed_features.push(card);
}

pub fn offer_feature(session: &mut Session, id: &str) {
    let card = instance(session, id);
    session.state_mut().available_features.push(card);
}

pub fn give_joker(session: &mut Session, id: &str) {
    let card = instance(session, id);
    session.state_mut().hand_jokers.push(card);
}

/// Planning -> DiceRoll -> roll.
pub fn roll(session: &mut Session, events: &mut EventBus) {
    session.end_phase(events).expect("end planning");
    session.roll_dice(events).expect("roll");
}

/// Plays out turns until `player` is in Planning on `turn`. Every roll is a quiet 3+5.
pub fn advance_to(session: &mut Session, events: &mut EventBus, turn: u32, player: usize) {
    while session.state().turn < turn
        || session.state().current_player != player
        || session.state().phase != Phase::Planning
    {
        assert!(!session.is_over(), "game ended early");
        match session.state().phase {
            Phase::Planning => {
                session.end_phase(events).expect("end planning");
            }
            Phase::DiceRoll => {
                session.set_dice(Box::new(ScriptedDice::new([3, 5])));
                session.roll_dice(events).expect("roll");
            }
            Phase::Results => {
                session.end_phase(events).expect("end results");
            }
            other => panic!("unexpected phase {other:?}"),
        }
    }
}
