mod common;

use common::*;
use zvezdolet_core::{
    evaluate_roll, Action, ActionReport, Board, CardKind, Deferred, DiceAdjustment, DiceRoll,
    EndReason, Event, EventBus, GameConfig, GameError, MissionRating, Phase, RemovalReason,
    RerollChoice, RollEventKind, RollOutcome, Session, Special, TriggerRange,
};

fn ids(cards: &[zvezdolet_core::Card]) -> Vec<&str> {
    cards.iter().map(|card| card.id()).collect()
}

#[test]
fn start_game_deals_the_opening_board() {
    let mut session = session_with_dice(&[]);
    let mut events = EventBus::default();
    session
        .start_game(vec!["Ada".to_string(), "Lev".to_string()], &mut events)
        .expect("start");

    let state = session.state();
    assert_eq!(state.phase, Phase::Planning);
    assert_eq!(state.turn, 1);
    assert_eq!(state.current_player, 0);
    assert!(state.players[0].is_captain);
    assert!(!state.players[1].is_captain);
    assert_eq!(state.mission_points, 100);
    assert_eq!(state.action_points, 5);
    assert_eq!(state.active_defects.len(), 1);
    assert_eq!(state.available_features.len(), 3);
    assert_eq!(state.used_defect_ids.len(), 1);
    assert_eq!(state.shown_feature_ids.len(), 3);
    assert!(state.invariant_violations().is_empty());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::GameStarted { players: 2, .. })));
}

#[test]
fn start_game_needs_players() {
    let mut session = session_with_dice(&[]);
    let result = session.start_game(Vec::new(), &mut EventBus::default());
    assert_eq!(result, Err(GameError::NoPlayers));
    assert_eq!(session.state().phase, Phase::Setup);
}

#[test]
fn overload_fires_first_and_blocks_income() {
    let (mut session, mut events) = started(&[3, 4]);
    add_defect(&mut session, "D15");
    install(&mut session, "F01");
    install(&mut session, "F02");
    for feature in &mut session.state_mut().installed_features {
        feature.def.profit_trigger = TriggerRange::Always;
    }

    roll(&mut session, &mut events);

    let triggered = &session.state().last_roll_events;
    assert_eq!(triggered[0].source_id, "D15");
    assert_eq!(triggered[0].special, Some(Special::NoProfit));
    assert!(triggered
        .iter()
        .all(|event| event.kind != RollEventKind::Profit));
    assert_eq!(session.state().mission_points, 100);
    assert!(session.state().flags.no_profit);
}

#[test]
fn crash_drains_mission_points_and_ends_at_the_boundary() {
    let (mut session, mut events) = started(&[2, 3]);
    install(&mut session, "F01");
    let crash = instance(&session, "C01");
    {
        let state = session.state_mut();
        state.mission_points = 5;
        state.installed_features[0].is_broken = true;
        state.active_crashes.push(crash);
    }

    roll(&mut session, &mut events);
    assert_eq!(session.state().mission_points, -5);
    assert_eq!(session.state().phase, Phase::Results);

    assert_eq!(session.end_phase(&mut events), Ok(Phase::Terminal));
    let outcome = session.state().outcome.expect("outcome");
    assert_eq!(outcome.reason, EndReason::MissionPointsDepleted);
    assert_eq!(outcome.rating, MissionRating::TotalLoss);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::GameOver { .. })));
}

#[test]
fn terminal_rejects_everything_without_mutation() {
    let (mut session, mut events) = started(&[3, 3]);
    add_defect(&mut session, "D21");
    roll(&mut session, &mut events);
    assert_eq!(session.state().mission_points, 0);
    session.end_phase(&mut events).expect("end results");
    assert!(session.is_over());

    let before = format!("{:?}", session.state());
    assert_eq!(session.end_phase(&mut events), Err(GameError::AlreadyTerminal));
    assert_eq!(session.roll_dice(&mut events), Err(GameError::AlreadyTerminal));
    assert_eq!(
        session.fix_defect("D21", &mut events),
        Err(GameError::AlreadyTerminal)
    );
    assert_eq!(
        session.resolve_joker_choice(RerollChoice::Keep, &mut events),
        Err(GameError::AlreadyTerminal)
    );
    assert_eq!(before, format!("{:?}", session.state()));
}

#[test]
fn joker_turn_offers_three_jokers_once() {
    let (mut session, mut events) = started(&[]);
    advance_to(&mut session, &mut events, 10, 0);

    let state = session.state();
    assert!(state.available_features.is_empty());
    assert_eq!(state.available_jokers.len(), 3);
    let mut offered = ids(&state.available_jokers);
    offered.sort();
    offered.dedup();
    assert_eq!(offered.len(), 3);
    assert!(state.jokers_given);

    advance_to(&mut session, &mut events, 11, 0);
    let state = session.state();
    assert!(state.available_jokers.is_empty());
    assert_eq!(state.available_features.len(), 3);
    assert!(state.jokers_given);
}

#[test]
fn reroll_joker_drops_the_second_die_on_a_double() {
    let (mut session, mut events) = started(&[4, 4]);
    give_joker(&mut session, "J02");
    install(&mut session, "F01");
    session.end_phase(&mut events).expect("end planning");

    let outcome = session.roll_dice(&mut events).expect("roll");
    let RollOutcome::Resolved(resolution) = outcome else {
        panic!("double must not prompt");
    };
    assert_eq!(resolution.roll, DiceRoll::new(4, 0));
    assert_eq!(resolution.roll.total(), 4);
    assert!(session.state().pending_choice.is_none());
    assert_eq!(session.state().mission_points, 110);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::DiceAdjusted {
            adjustment: DiceAdjustment::DoubleDropped,
            ..
        }
    )));
}

#[test]
fn reroll_choice_parks_the_session() {
    let (mut session, mut events) = started(&[2, 5, 6]);
    give_joker(&mut session, "J02");
    add_defect(&mut session, "D03");
    session.end_phase(&mut events).expect("end planning");

    let outcome = session.roll_dice(&mut events).expect("roll");
    assert_eq!(outcome, RollOutcome::AwaitingRerollChoice(DiceRoll::new(2, 5)));
    assert_eq!(session.end_phase(&mut events), Err(GameError::ChoicePending));
    assert_eq!(
        session.fix_defect("D03", &mut events),
        Err(GameError::ChoicePending)
    );

    let resolution = session
        .resolve_joker_choice(RerollChoice::RerollFirst, &mut events)
        .expect("resolve");
    assert_eq!(resolution.roll, DiceRoll::new(6, 5));
    assert_eq!(session.state().phase, Phase::Results);
    assert_eq!(session.state().action_points, 3);
    assert_eq!(
        session.resolve_joker_choice(RerollChoice::Keep, &mut events),
        Err(GameError::NoChoicePending)
    );
}

#[test]
fn parked_roll_blocks_a_restart() {
    let (mut session, mut events) = started(&[2, 5]);
    give_joker(&mut session, "J02");
    session.state_mut().mission_points = 42;
    session.end_phase(&mut events).expect("end planning");
    session.roll_dice(&mut events).expect("roll");
    let before = format!("{:?}", session.state());

    assert_eq!(
        session.start_game(vec!["Kim".to_string()], &mut events),
        Err(GameError::ChoicePending)
    );
    assert_eq!(before, format!("{:?}", session.state()));
    assert_eq!(session.state().mission_points, 42);
    assert_eq!(session.state().phase, Phase::DiceRoll);
    assert!(session.state().pending_choice.is_some());
}

#[test]
fn keeping_the_roll_evaluates_it_unchanged() {
    let (mut session, mut events) = started(&[1, 2]);
    give_joker(&mut session, "J02");
    add_defect(&mut session, "D02");
    session.end_phase(&mut events).expect("end planning");
    session.roll_dice(&mut events).expect("roll");

    let resolution = session
        .resolve_joker_choice(RerollChoice::Keep, &mut events)
        .expect("resolve");
    assert_eq!(resolution.roll, DiceRoll::new(1, 2));
    assert_eq!(session.state().mission_points, 95);
}

#[test]
fn breakdown_links_feature_and_crash() {
    let (mut session, mut events) = started(&[5, 6]);
    install(&mut session, "F01");
    roll(&mut session, &mut events);

    let state = session.state();
    assert!(state.installed_features[0].is_broken);
    assert_eq!(ids(&state.active_crashes), vec!["C01"]);
    assert!(state.invariant_violations().is_empty());
    assert!(events.iter().any(|event| matches!(
        event,
        Event::FeatureBroken { feature_id, crash_id } if feature_id == "F01" && crash_id == "C01"
    )));
}

#[test]
fn feature_pays_out_and_breaks_on_the_same_roll() {
    let (mut session, mut events) = started(&[3, 5]);
    install(&mut session, "F01");
    session.state_mut().installed_features[0].def.loss_trigger =
        TriggerRange::parse("8").expect("trigger");
    roll(&mut session, &mut events);

    let state = session.state();
    let kinds: Vec<RollEventKind> = state.last_roll_events.iter().map(|event| event.kind).collect();
    assert_eq!(kinds, vec![RollEventKind::Profit, RollEventKind::Breakdown]);
    assert_eq!(state.mission_points, 110);
    assert!(state.installed_features[0].is_broken);
    assert_eq!(ids(&state.active_crashes), vec!["C01"]);
    assert!(state.invariant_violations().is_empty());
}

#[test]
fn interactive_jokers_stay_out_of_evaluation() {
    let (mut session, _) = started(&[]);
    give_joker(&mut session, "J02");
    give_joker(&mut session, "J05");

    let board = Board::from_state(session.state());
    let events = evaluate_roll(DiceRoll::new(4, 4), &board, session.catalog());
    assert!(events.is_empty(), "{events:?}");
}

#[test]
fn missing_crash_row_skips_the_breakdown() {
    let (mut session, mut events) = started(&[5, 6]);
    install(&mut session, "F05");
    roll(&mut session, &mut events);

    let state = session.state();
    assert!(!state.installed_features[0].is_broken);
    assert!(state.active_crashes.is_empty());
    assert!(state
        .last_roll_events
        .iter()
        .all(|event| event.kind != RollEventKind::Breakdown));
    assert!(state.invariant_violations().is_empty());
}

#[test]
fn fixing_a_crash_restores_the_feature() {
    let (mut session, mut events) = started(&[]);
    install(&mut session, "F01");
    let crash = instance(&session, "C01");
    session.state_mut().installed_features[0].is_broken = true;
    session.state_mut().active_crashes.push(crash);

    session.fix_crash("C01", &mut events).expect("fix crash");
    let state = session.state();
    assert_eq!(state.action_points, 3);
    assert!(!state.installed_features[0].is_broken);
    assert!(state.active_crashes.is_empty());
    assert!(state.invariant_violations().is_empty());
}

#[test]
fn repair_charges_the_feature_cost_and_clears_the_crash() {
    let (mut session, mut events) = started(&[]);
    install(&mut session, "F01");
    install(&mut session, "F02");
    let crash = instance(&session, "C01");
    session.state_mut().installed_features[0].is_broken = true;
    session.state_mut().active_crashes.push(crash);

    assert_eq!(
        session.repair_feature("F02", &mut events),
        Err(GameError::NotFound("F02".to_string()))
    );
    session.repair_feature("F01", &mut events).expect("repair");
    let state = session.state();
    assert_eq!(state.action_points, 4);
    assert!(state.active_crashes.is_empty());
    assert!(!state.installed_features[0].is_broken);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::CardRemoved { id, reason: RemovalReason::Repaired } if id == "C01"
    )));
}

#[test]
fn install_moves_the_card_and_fails_cleanly_when_broke() {
    let (mut session, mut events) = started(&[]);
    offer_feature(&mut session, "F03");
    offer_feature(&mut session, "F04");

    session.install_feature("F03", &mut events).expect("install");
    assert_eq!(session.state().action_points, 2);
    assert_eq!(ids(&session.state().installed_features), vec!["F03"]);

    let before = format!("{:?}", session.state());
    assert_eq!(
        session.install_feature("F04", &mut events),
        Err(GameError::InsufficientActionPoints { need: 4, have: 2 })
    );
    assert_eq!(before, format!("{:?}", session.state()));
}

#[test]
fn lifecycle_actions_need_planning() {
    let (mut session, mut events) = started(&[]);
    add_defect(&mut session, "D01");
    assert_eq!(
        session.fix_defect("D99", &mut events),
        Err(GameError::NotFound("D99".to_string()))
    );
    session.end_phase(&mut events).expect("end planning");
    assert_eq!(
        session.fix_defect("D01", &mut events),
        Err(GameError::InvalidPhase(Phase::DiceRoll))
    );
    assert_eq!(
        session.end_phase(&mut events),
        Err(GameError::InvalidPhase(Phase::DiceRoll))
    );
}

#[test]
fn taking_and_using_jokers_marks_them_used() {
    let (mut session, mut events) = started(&[]);
    let joker = instance(&session, "J01");
    session.state_mut().available_jokers.push(joker);
    give_joker(&mut session, "J04");

    session.take_joker("J01", &mut events).expect("take");
    assert_eq!(session.state().action_points, 1);
    assert_eq!(ids(&session.state().hand_jokers), vec!["J04", "J01"]);
    assert!(session.state().used_joker_ids.contains(&"J01".to_string()));
    assert_eq!(
        session.use_joker("J04", &mut events),
        Err(GameError::InsufficientActionPoints { need: 2, have: 1 })
    );

    session.state_mut().action_points = 5;
    session.use_joker("J04", &mut events).expect("use");
    assert_eq!(session.state().action_points, 3);
    assert_eq!(ids(&session.state().hand_jokers), vec!["J01"]);
    assert!(session.state().used_joker_ids.contains(&"J04".to_string()));
}

#[test]
fn morale_joker_refunds_fixes_on_the_next_turn() {
    let (mut session, mut events) = started(&[1, 2]);
    give_joker(&mut session, "J03");
    roll(&mut session, &mut events);
    session.end_phase(&mut events).expect("end results");

    assert_eq!(session.state().current_player, 1);
    assert!(session.state().flags.fix_bonus_active);
    add_defect(&mut session, "D01");
    session.fix_defect("D01", &mut events).expect("fix");
    assert_eq!(session.state().action_points, 5);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ActionPointsRefunded { amount: 1, .. })));
}

#[test]
fn morale_joker_loss_adds_a_defect() {
    let (mut session, mut events) = started(&[3, 3]);
    give_joker(&mut session, "J03");
    roll(&mut session, &mut events);
    assert_eq!(session.state().active_defects.len(), 1);
}

#[test]
fn deferred_action_points_follow_priority() {
    let (mut session, mut events) = started(&[3, 4]);
    give_joker(&mut session, "J01");
    roll(&mut session, &mut events);
    session.end_phase(&mut events).expect("end results");
    assert_eq!(session.state().action_points, 0);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::DeferredApplied {
            modifier: Deferred::ActionPenalty,
            action_points: 0
        }
    )));

    let (mut session, mut events) = started(&[1, 1]);
    give_joker(&mut session, "J01");
    roll(&mut session, &mut events);
    session.end_phase(&mut events).expect("end results");
    assert_eq!(session.state().action_points, 6);

    let (mut session, mut events) = started(&[4, 5]);
    give_joker(&mut session, "J01");
    add_defect(&mut session, "D20");
    roll(&mut session, &mut events);
    session.end_phase(&mut events).expect("end results");
    assert_eq!(session.state().action_points, 0);

    // Consumed by the turn it applied to.
    clear_board(&mut session);
    session.end_phase(&mut events).expect("end planning");
    session.roll_dice(&mut events).expect("roll");
    session.end_phase(&mut events).expect("end results");
    assert!(session.state().action_points > 0);
}

#[test]
fn resonance_joker_counts_income() {
    let (mut session, mut events) = started(&[1, 3]);
    give_joker(&mut session, "J04");
    install(&mut session, "F01");
    install(&mut session, "F02");
    roll(&mut session, &mut events);
    assert_eq!(session.state().mission_points, 122);

    let (mut session, mut events) = started(&[3, 4]);
    give_joker(&mut session, "J04");
    install(&mut session, "F01");
    session.state_mut().installed_features[0].def.profit_trigger = TriggerRange::Odd;
    roll(&mut session, &mut events);
    assert_eq!(session.state().mission_points, 105);
}

#[test]
fn remove_defect_joker_takes_light_defects_after_even_rolls() {
    let (mut session, mut events) = started(&[1, 3]);
    give_joker(&mut session, "J05");
    add_defect(&mut session, "D01");
    add_defect(&mut session, "D03");
    add_defect(&mut session, "D02");
    assert_eq!(
        session.use_remove_defect_joker("D01", &mut events),
        Err(GameError::InvalidPhase(Phase::Planning))
    );
    roll(&mut session, &mut events);

    assert_eq!(
        session.use_remove_defect_joker("D03", &mut events),
        Err(GameError::JokerUnavailable("J05".to_string()))
    );
    session
        .use_remove_defect_joker("D01", &mut events)
        .expect("remove");
    assert_eq!(session.state().action_points, 5);
    assert_eq!(ids(&session.state().hand_jokers), vec!["J05"]);
    assert_eq!(
        session.use_remove_defect_joker("D02", &mut events),
        Err(GameError::JokerUnavailable("J05".to_string()))
    );
}

#[test]
fn remove_defect_joker_rejects_odd_rolls() {
    let (mut session, mut events) = started(&[1, 2]);
    give_joker(&mut session, "J05");
    add_defect(&mut session, "D01");
    roll(&mut session, &mut events);
    assert_eq!(
        session.use_remove_defect_joker("D01", &mut events),
        Err(GameError::JokerUnavailable("J05".to_string()))
    );
}

#[test]
fn lose_feature_destroys_a_broken_feature_with_its_crash() {
    let (mut session, mut events) = started(&[6, 6]);
    add_defect(&mut session, "D16");
    install(&mut session, "F01");
    let crash = instance(&session, "C01");
    session.state_mut().installed_features[0].is_broken = true;
    session.state_mut().active_crashes.push(crash);

    roll(&mut session, &mut events);
    let state = session.state();
    assert!(state.installed_features.is_empty());
    assert!(state.active_crashes.is_empty());
    assert!(events.iter().any(|event| matches!(
        event,
        Event::CardRemoved { id, reason: RemovalReason::Destroyed } if id == "F01"
    )));
}

#[test]
fn action_points_clamp_at_zero() {
    let (mut session, mut events) = started(&[5, 6]);
    add_defect(&mut session, "D03");
    session.state_mut().action_points = 1;
    roll(&mut session, &mut events);
    assert_eq!(session.state().action_points, 0);
}

#[test]
fn final_turn_ends_after_the_last_player() {
    let (mut session, mut events) = started(&[3, 5, 3, 5]);
    session.state_mut().turn = 20;
    roll(&mut session, &mut events);
    assert_eq!(session.end_phase(&mut events), Ok(Phase::Planning));
    assert_eq!(session.state().current_player, 1);

    roll(&mut session, &mut events);
    assert_eq!(session.end_phase(&mut events), Ok(Phase::Terminal));
    let outcome = session.state().outcome.expect("outcome");
    assert_eq!(outcome.reason, EndReason::TurnsCompleted);
    assert_eq!(outcome.rating, MissionRating::Accomplished);
    assert_eq!(session.end_phase(&mut events), Err(GameError::AlreadyTerminal));
}

#[test]
fn permanent_defects_act_at_turn_start() {
    let (mut session, mut events) = started(&[3, 5]);
    add_defect(&mut session, "D30");
    roll(&mut session, &mut events);
    assert_eq!(session.state().action_points, 5);
    session.end_phase(&mut events).expect("end results");
    assert_eq!(session.state().action_points, 4);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::PermanentEffect { id, action_delta: -1, .. } if id == "D30"
    )));
}

#[test]
fn feature_offer_reshuffles_when_short() {
    let (mut session, mut events) = started(&[]);
    advance_to(&mut session, &mut events, 2, 0);

    let mut offered = ids(&session.state().available_features);
    offered.sort();
    offered.dedup();
    assert_eq!(offered.len(), 3);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::DeckReshuffled {
            kind: CardKind::Feature
        }
    )));
}

#[test]
fn evaluator_is_pure() {
    let (mut session, _) = started(&[]);
    add_defect(&mut session, "D15");
    add_defect(&mut session, "D02");
    install(&mut session, "F01");
    give_joker(&mut session, "J04");
    let before = format!("{:?}", session.state());

    let board = Board::from_state(session.state());
    for first in 1..=6 {
        for second in 1..=6 {
            let roll = DiceRoll::new(first, second);
            let once = evaluate_roll(roll, &board, session.catalog());
            let twice = evaluate_roll(roll, &board, session.catalog());
            assert_eq!(once, twice);
        }
    }
    assert_eq!(before, format!("{:?}", session.state()));
}

#[test]
fn same_seed_same_game() {
    let script = [
        Action::StartGame {
            players: vec!["Ada".to_string(), "Lev".to_string(), "Kim".to_string()],
        },
        Action::EndPhase,
        Action::RollDice,
        Action::EndPhase,
        Action::EndPhase,
        Action::RollDice,
        Action::EndPhase,
        Action::EndPhase,
        Action::RollDice,
        Action::EndPhase,
    ];
    let play = || {
        let mut session = Session::new(GameConfig::default(), test_catalog(), 99);
        let mut events = EventBus::default();
        for action in &script {
            if let Ok(ActionReport::Rolled(RollOutcome::AwaitingRerollChoice(_))) =
                session.perform(action, &mut events)
            {
                session
                    .resolve_joker_choice(RerollChoice::Keep, &mut events)
                    .expect("keep");
            }
        }
        format!("{:?}", session.state())
    };
    assert_eq!(play(), play());
}

#[test]
fn perform_routes_actions() {
    let mut session = session_with_dice(&[3, 5]);
    let mut events = EventBus::default();
    let start = Action::StartGame {
        players: vec!["Ada".to_string()],
    };
    assert_eq!(start.stable_key(), "start_game:Ada");
    assert_eq!(
        session.perform(&start, &mut events),
        Ok(ActionReport::PhaseEntered(Phase::Planning))
    );
    assert_eq!(
        session.perform(&Action::EndPhase, &mut events),
        Ok(ActionReport::PhaseEntered(Phase::DiceRoll))
    );
    let rolled = session
        .perform(&Action::RollDice, &mut events)
        .expect("roll");
    assert!(matches!(rolled, ActionReport::Rolled(RollOutcome::Resolved(_))));
    assert_eq!(
        session.perform(&Action::FixDefect { id: "D01".to_string() }, &mut events),
        Err(GameError::InvalidPhase(Phase::Results))
    );
}
