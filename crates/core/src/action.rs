use crate::{EventBus, GameError, Phase, RerollChoice, Resolution, RollOutcome, Session};
use serde::{Deserialize, Serialize};

/// Every operation a player (or a replay) can submit to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    StartGame { players: Vec<String> },
    EndPhase,
    RollDice,
    ResolveJokerChoice { choice: RerollChoice },
    FixDefect { id: String },
    FixCrash { id: String },
    InstallFeature { id: String },
    RepairFeature { id: String },
    TakeJoker { id: String },
    UseJoker { id: String },
    UseRemoveDefectJoker { defect_id: String },
}

impl Action {
    pub fn stable_key(&self) -> String {
        match self {
            Self::StartGame { players } => format!("start_game:{}", players.join(",")),
            Self::EndPhase => "end_phase".to_string(),
            Self::RollDice => "roll_dice".to_string(),
            Self::ResolveJokerChoice { choice } => format!("resolve_joker_choice:{choice:?}"),
            Self::FixDefect { id } => format!("fix_defect:{id}"),
            Self::FixCrash { id } => format!("fix_crash:{id}"),
            Self::InstallFeature { id } => format!("install_feature:{id}"),
            Self::RepairFeature { id } => format!("repair_feature:{id}"),
            Self::TakeJoker { id } => format!("take_joker:{id}"),
            Self::UseJoker { id } => format!("use_joker:{id}"),
            Self::UseRemoveDefectJoker { defect_id } => {
                format!("use_remove_defect_joker:{defect_id}")
            }
        }
    }

    pub fn short_label(&self) -> String {
        match self {
            Self::StartGame { players } => format!("start {} players", players.len()),
            Self::EndPhase => "end phase".to_string(),
            Self::RollDice => "roll".to_string(),
            Self::ResolveJokerChoice { choice } => format!("reroll {choice:?}"),
            Self::FixDefect { id } => format!("fix {id}"),
            Self::FixCrash { id } => format!("fix {id}"),
            Self::InstallFeature { id } => format!("install {id}"),
            Self::RepairFeature { id } => format!("repair {id}"),
            Self::TakeJoker { id } => format!("take {id}"),
            Self::UseJoker { id } => format!("use {id}"),
            Self::UseRemoveDefectJoker { defect_id } => format!("remove {defect_id}"),
        }
    }
}

/// What an accepted action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReport {
    Done,
    PhaseEntered(Phase),
    Rolled(RollOutcome),
    Resolved(Resolution),
}

impl Session {
    /// Routes an action to its operation. Rejections leave the session untouched.
    pub fn perform(
        &mut self,
        action: &Action,
        events: &mut EventBus,
    ) -> Result<ActionReport, GameError> {
        let result = match action {
            Action::StartGame { players } => self
                .start_game(players.clone(), events)
                .map(|_| ActionReport::PhaseEntered(self.state().phase)),
            Action::EndPhase => self.end_phase(events).map(ActionReport::PhaseEntered),
            Action::RollDice => self.roll_dice(events).map(ActionReport::Rolled),
            Action::ResolveJokerChoice { choice } => self
                .resolve_joker_choice(*choice, events)
                .map(ActionReport::Resolved),
            Action::FixDefect { id } => self.fix_defect(id, events).map(|_| ActionReport::Done),
            Action::FixCrash { id } => self.fix_crash(id, events).map(|_| ActionReport::Done),
            Action::InstallFeature { id } => {
                self.install_feature(id, events).map(|_| ActionReport::Done)
            }
            Action::RepairFeature { id } => {
                self.repair_feature(id, events).map(|_| ActionReport::Done)
            }
            Action::TakeJoker { id } => self.take_joker(id, events).map(|_| ActionReport::Done),
            Action::UseJoker { id } => self.use_joker(id, events).map(|_| ActionReport::Done),
            Action::UseRemoveDefectJoker { defect_id } => self
                .use_remove_defect_joker(defect_id, events)
                .map(|_| ActionReport::Done),
        };
        if let Err(err) = &result {
            tracing::debug!(
                target: "zvezdolet::session",
                action = %action.stable_key(),
                error = %err,
                "action.rejected"
            );
        }
        result
    }
}
