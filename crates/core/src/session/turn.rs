use super::*;
use crate::*;

const LOG_TARGET: &str = "zvezdolet::turn";

impl Session {
    /// Starts (or restarts) a game with the given crew. The first name is the captain.
    /// A finished game can be restarted; a roll parked on a joker decision cannot.
    pub fn start_game(
        &mut self,
        players: Vec<String>,
        events: &mut EventBus,
    ) -> Result<(), GameError> {
        if self.state.pending_choice.is_some() {
            return Err(GameError::ChoicePending);
        }
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let mut state = GameState::new(&self.config);
        state.players = players
            .into_iter()
            .enumerate()
            .map(|(id, name)| Player {
                id,
                name,
                is_captain: id == 0,
            })
            .collect();
        state.phase = Phase::Planning;
        self.state = state;
        self.deal_starting_board(events);

        tracing::info!(
            target: LOG_TARGET,
            players = self.state.players.len(),
            seed = self.rng.seed(),
            "game.started"
        );
        events.push(Event::GameStarted {
            players: self.state.players.len(),
            mission_points: self.state.mission_points,
            action_points: self.state.action_points,
        });
        events.push(Event::TurnStarted {
            turn: self.state.turn,
            player: self.state.current_player,
            action_points: self.state.action_points,
        });
        Ok(())
    }

    /// Closes the current phase: Planning opens the roll, Results hands over to the next
    /// player or ends the game.
    pub fn end_phase(&mut self, events: &mut EventBus) -> Result<Phase, GameError> {
        self.ensure_accepting()?;
        match self.state.phase {
            Phase::Planning => {
                self.set_phase(Phase::DiceRoll, events);
            }
            Phase::Results => {
                if self.state.mission_points <= 0 {
                    self.finish(EndReason::MissionPointsDepleted, events);
                } else if self.state.is_final_turn() {
                    self.finish(EndReason::TurnsCompleted, events);
                } else {
                    self.advance_turn(events);
                }
            }
            other => return Err(GameError::InvalidPhase(other)),
        }
        Ok(self.state.phase)
    }

    pub(super) fn set_phase(&mut self, phase: Phase, events: &mut EventBus) {
        self.state.phase = phase;
        events.push(Event::PhaseChanged { phase });
    }

    fn advance_turn(&mut self, events: &mut EventBus) {
        let pending = self.state.deferred.take();

        self.state.current_player += 1;
        if self.state.current_player >= self.state.players.len() {
            self.state.current_player = 0;
            self.state.turn += 1;
            tracing::info!(target: LOG_TARGET, turn = self.state.turn, "turn.started");
            self.new_turn_supply(events);
        }

        let (action_points, decided_by) = starting_action_points(
            &pending,
            self.config.base_action_points,
            self.config.bonus_action_points,
        );
        self.state.action_points = action_points;
        if let Some(modifier) = decided_by {
            tracing::debug!(target: LOG_TARGET, ?modifier, action_points, "deferred.applied");
            events.push(Event::DeferredApplied {
                modifier,
                action_points,
            });
        }
        self.state.flags = TurnFlags {
            fix_bonus_active: pending.contains(&Deferred::FixBonus),
            ..TurnFlags::default()
        };
        self.state.dice = DiceRoll::default();
        self.state.last_roll_events.clear();
        self.set_phase(Phase::Planning, events);

        self.apply_permanent_effects(events);
        events.push(Event::TurnStarted {
            turn: self.state.turn,
            player: self.state.current_player,
            action_points: self.state.action_points,
        });
    }

    /// Cards triggered `always` act once at the start of every turn.
    fn apply_permanent_effects(&mut self, events: &mut EventBus) {
        let permanent: Vec<Card> = self
            .state
            .active_defects
            .iter()
            .chain(self.state.active_crashes.iter())
            .filter(|card| card.def.is_permanent())
            .cloned()
            .collect();
        for card in permanent {
            let (mission_delta, action_delta) = match card.def.loss {
                Magnitude::ActionPoints(amount) => (0, -(amount as i64)),
                Magnitude::MissionPoints(amount) => (-(amount as i64), 0),
                _ => continue,
            };
            self.state.add_mission_points(mission_delta);
            self.state.adjust_action_points(action_delta);
            tracing::debug!(
                target: LOG_TARGET,
                card = %card.id(),
                mission_delta,
                action_delta,
                "permanent.applied"
            );
            events.push(Event::PermanentEffect {
                id: card.def.id,
                mission_delta,
                action_delta,
            });
        }
    }

    fn finish(&mut self, reason: EndReason, events: &mut EventBus) {
        let mission_points = self.state.mission_points;
        let rating = MissionRating::from_points(mission_points);
        self.state.outcome = Some(GameOutcome {
            reason,
            mission_points,
            rating,
        });
        self.set_phase(Phase::Terminal, events);
        tracing::info!(
            target: LOG_TARGET,
            ?reason,
            mission_points,
            ?rating,
            turn = self.state.turn,
            "game.over"
        );
        events.push(Event::GameOver {
            reason,
            mission_points,
            rating,
        });
    }
}
