use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use zvezdolet_core::{
    Action, ActionReport, Card, Event, EventBus, GameError, Phase, RerollChoice, RollEvent,
    RollOutcome, Session,
};
use zvezdolet_data::{load_catalog, load_game_config};

const DEFAULT_SEED: u64 = 0xC0FFEE;
const DEFAULT_PLAYERS: &str = "Captain,Engineer";

#[derive(Debug, Clone)]
struct CliOptions {
    auto: bool,
    seed: u64,
    assets: PathBuf,
    players: Vec<String>,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut auto = false;
    let mut seed = DEFAULT_SEED;
    let mut assets = PathBuf::from("assets");
    let mut players_arg =
        std::env::var("ZVEZDOLET_PLAYERS").unwrap_or_else(|_| DEFAULT_PLAYERS.to_string());
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--auto" => auto = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    seed = value.parse::<u64>().unwrap_or(DEFAULT_SEED);
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    assets = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--players" | "-p" => {
                if let Some(value) = args.get(idx + 1) {
                    players_arg = value.clone();
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    let players = players_arg
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    CliOptions {
        auto,
        seed,
        assets,
        players,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let mut session = match build_session(&options) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("load error: {err:#}");
            std::process::exit(1);
        }
    };
    let mut events = EventBus::default();
    let start = Action::StartGame {
        players: options.players.clone(),
    };
    if let Err(err) = session.perform(&start, &mut events) {
        eprintln!("cannot start: {err}");
        std::process::exit(1);
    }
    print_events(&mut events);
    print_board(&session);

    if options.auto {
        run_auto(&mut session, &mut events);
    } else {
        run_repl(&mut session, &mut events);
    }
}

fn build_session(options: &CliOptions) -> anyhow::Result<Session> {
    let config = load_game_config(&options.assets)?;
    let report = load_catalog(&options.assets)?;
    for warning in &report.warnings {
        eprintln!("catalog warning: {warning}");
    }
    tracing::info!(
        target: "zvezdolet::cli",
        seed = options.seed,
        assets = %options.assets.display(),
        "session.built"
    );
    println!(
        "seed: {}  cards: {}  players: {}",
        options.seed,
        report.catalog.len(),
        options.players.join(", ")
    );
    Ok(Session::new(config, report.catalog, options.seed))
}

/// Ends phases and rolls until the game is over. Reroll prompts are always kept.
fn run_auto(session: &mut Session, events: &mut EventBus) {
    while !session.is_over() {
        let action = if session.state().pending_choice.is_some() {
            Action::ResolveJokerChoice {
                choice: RerollChoice::Keep,
            }
        } else if session.state().phase == Phase::DiceRoll {
            Action::RollDice
        } else {
            Action::EndPhase
        };
        if let Err(err) = session.perform(&action, events) {
            eprintln!("auto: {} failed: {err}", action.short_label());
            break;
        }
        print_events(events);
    }
    print_summary(session);
}

fn run_repl(session: &mut Session, events: &mut EventBus) {
    print_help();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}> ", prompt(session));
        let _ = io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, rest)) = words.split_first() else {
            continue;
        };
        match *command {
            "quit" | "exit" | "q" => break,
            "help" | "h" | "?" => print_help(),
            "board" | "b" | "ls" => print_board(session),
            "state" => match serde_json::to_string_pretty(session.state()) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("error: {err}"),
            },
            _ => match parse_action(command, rest) {
                Ok(action) => match session.perform(&action, events) {
                    Ok(report) => {
                        print_events(events);
                        print_report(&report);
                    }
                    Err(err) => {
                        events.drain().for_each(drop);
                        println!("{}", describe_error(&err));
                    }
                },
                Err(message) => println!("{message}"),
            },
        }
        if session.is_over() {
            print_summary(session);
            break;
        }
    }
}

fn parse_action(command: &str, rest: &[&str]) -> Result<Action, String> {
    let id = || {
        rest.first()
            .map(|value| value.to_ascii_uppercase())
            .ok_or_else(|| format!("{command} needs a card id"))
    };
    let action = match command {
        "next" | "n" | "end" => Action::EndPhase,
        "roll" | "r" => Action::RollDice,
        "reroll" => {
            let choice = match rest.first().copied() {
                Some("1") | Some("first") => RerollChoice::RerollFirst,
                Some("2") | Some("second") => RerollChoice::RerollSecond,
                Some("keep") | Some("k") | None => RerollChoice::Keep,
                Some(other) => return Err(format!("unknown reroll choice '{other}'")),
            };
            Action::ResolveJokerChoice { choice }
        }
        "keep" => Action::ResolveJokerChoice {
            choice: RerollChoice::Keep,
        },
        "fix" => {
            let id = id()?;
            if id.starts_with('C') {
                Action::FixCrash { id }
            } else {
                Action::FixDefect { id }
            }
        }
        "install" | "i" => Action::InstallFeature { id: id()? },
        "repair" => Action::RepairFeature { id: id()? },
        "take" => Action::TakeJoker { id: id()? },
        "use" => Action::UseJoker { id: id()? },
        "remove" => Action::UseRemoveDefectJoker { defect_id: id()? },
        other => return Err(format!("unknown command '{other}', try help")),
    };
    Ok(action)
}

fn prompt(session: &Session) -> String {
    let state = session.state();
    let player = state
        .current_player()
        .map(|player| player.name.as_str())
        .unwrap_or("-");
    format!(
        "[turn {}/{} {} {:?} MP {} AP {}]",
        state.turn, state.max_turns, player, state.phase, state.mission_points, state.action_points
    )
}

fn print_help() {
    println!("Commands:");
    println!("  help|h|?            show help");
    println!("  board|b|ls          show the board");
    println!("  state               dump the game state as JSON");
    println!("  next|n              end the current phase");
    println!("  roll|r              roll the dice");
    println!("  reroll 1|2|keep     answer the reroll joker");
    println!("  fix <id>            fix a defect (Dxx) or crash (Cxx)");
    println!("  install <id>        install an offered feature");
    println!("  repair <id>         repair a broken feature");
    println!("  take <id>           take an offered joker");
    println!("  use <id>            play a joker from hand");
    println!("  remove <id>         remove a light defect with the Mobius joker");
    println!("  quit|exit           exit");
}

fn print_board(session: &Session) {
    let state = session.state();
    println!("{}", prompt(session));
    print_cards("defects", &state.active_defects);
    print_cards("crashes", &state.active_crashes);
    print_cards("installed", &state.installed_features);
    print_cards("offered features", &state.available_features);
    print_cards("offered jokers", &state.available_jokers);
    print_cards("hand", &state.hand_jokers);
}

fn print_cards(label: &str, cards: &[Card]) {
    if cards.is_empty() {
        return;
    }
    println!("  {label}:");
    for card in cards {
        let broken = if card.is_broken { " [BROKEN]" } else { "" };
        println!(
            "    {} {}{} cost {} | {} on {:?}",
            card.id(),
            card.header(),
            broken,
            card.def.cost,
            card.def.loss_text,
            card.def.loss_trigger
        );
    }
}

fn print_roll_event(event: &RollEvent) {
    let mut line = format!("    {:?} {}: {}", event.kind, event.name, event.message);
    if event.mission_delta != 0 {
        line.push_str(&format!(" ({:+} MP)", event.mission_delta));
    }
    if let Some(delta) = event.action_delta {
        line.push_str(&format!(" ({delta:+} AP)"));
    }
    println!("{line}");
}

fn print_events(events: &mut EventBus) {
    for event in events.drain() {
        match event {
            Event::TurnStarted {
                turn,
                player,
                action_points,
            } => println!("-- turn {turn}, player {} ({action_points} AP)", player + 1),
            Event::DiceRolled { roll } => println!("  dice: {} + {}", roll.first, roll.second),
            Event::DiceAdjusted { roll, adjustment } => {
                println!("  dice now {} + {} ({adjustment:?})", roll.first, roll.second)
            }
            Event::RerollChoiceRequired { joker_id, roll } => println!(
                "  {joker_id}: reroll a die? {} + {} (reroll 1|2|keep)",
                roll.first, roll.second
            ),
            Event::EffectApplied { event, .. } => print_roll_event(&event),
            Event::FeatureBroken {
                feature_id,
                crash_id,
            } => println!("  {feature_id} broke down, {crash_id} is active"),
            Event::CardDrawn { id, kind } => println!("  drawn {} {id}", kind.label()),
            Event::DeckReshuffled { kind } => println!("  {} deck reshuffled", kind.label()),
            Event::CardRemoved { id, reason } => println!("  {id} removed ({reason:?})"),
            Event::ActionPointsRefunded { amount, .. } => println!("  refunded {amount} AP"),
            Event::DeferredApplied {
                modifier,
                action_points,
            } => println!("  {modifier:?}: starting with {action_points} AP"),
            Event::PermanentEffect {
                id,
                mission_delta,
                action_delta,
            } => println!("  {id} drains {mission_delta} MP / {action_delta} AP"),
            Event::DataIntegrity { message } => eprintln!("  data warning: {message}"),
            Event::GameOver {
                reason,
                mission_points,
                rating,
            } => println!(
                "== game over ({reason:?}): {mission_points} MP, {}",
                rating.title()
            ),
            Event::GameStarted { .. }
            | Event::PhaseChanged { .. }
            | Event::ActionPointsSpent { .. } => {}
        }
    }
}

fn print_report(report: &ActionReport) {
    match report {
        ActionReport::PhaseEntered(phase) => println!("phase: {phase:?}"),
        ActionReport::Rolled(RollOutcome::Resolved(resolution))
        | ActionReport::Resolved(resolution) => {
            if resolution.events.is_empty() {
                println!("  nothing happened on {}", resolution.roll.total());
            }
        }
        ActionReport::Rolled(RollOutcome::AwaitingRerollChoice(_)) | ActionReport::Done => {}
    }
}

fn print_summary(session: &Session) {
    let state = session.state();
    match state.outcome {
        Some(outcome) => println!(
            "final: {} MP after turn {}, {} ({:?})",
            outcome.mission_points,
            state.turn,
            outcome.rating.title(),
            outcome.reason
        ),
        None => println!("game not finished: {}", prompt(session)),
    }
}

fn describe_error(err: &GameError) -> String {
    match err {
        GameError::InvalidPhase(phase) => format!("not allowed during {phase:?}"),
        GameError::ChoicePending => "answer the reroll first (reroll 1|2|keep)".to_string(),
        other => other.to_string(),
    }
}
