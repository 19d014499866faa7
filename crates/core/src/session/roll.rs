use super::*;
use crate::*;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "zvezdolet::roll";

/// Decision for a parked reroll.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RerollChoice {
    RerollFirst,
    RerollSecond,
    Keep,
}

/// Everything a roll triggered, in application order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resolution {
    pub roll: DiceRoll,
    pub events: Vec<RollEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RollOutcome {
    /// The reroll joker needs a decision before anything is evaluated.
    AwaitingRerollChoice(DiceRoll),
    Resolved(Resolution),
}

impl Session {
    pub fn roll_dice(&mut self, events: &mut EventBus) -> Result<RollOutcome, GameError> {
        self.require_phase(Phase::DiceRoll)?;
        let roll = roll_pair(self.dice.as_mut());
        self.state.dice = roll;
        tracing::debug!(
            target: LOG_TARGET,
            first = roll.first,
            second = roll.second,
            "dice.rolled"
        );
        events.push(Event::DiceRolled { roll });

        if let Some(joker_id) = self.reroll_joker() {
            self.state.flags.reroll_used = true;
            if roll.is_double() {
                self.state.dice.second = 0;
                events.push(Event::DiceAdjusted {
                    roll: self.state.dice,
                    adjustment: DiceAdjustment::DoubleDropped,
                });
            } else {
                self.state.pending_choice = Some(PendingChoice {
                    joker_id: joker_id.clone(),
                    roll,
                });
                events.push(Event::RerollChoiceRequired { joker_id, roll });
                return Ok(RollOutcome::AwaitingRerollChoice(roll));
            }
        }

        Ok(RollOutcome::Resolved(self.resolve_roll(events)))
    }

    /// Settles a parked roll and evaluates it.
    pub fn resolve_joker_choice(
        &mut self,
        choice: RerollChoice,
        events: &mut EventBus,
    ) -> Result<Resolution, GameError> {
        if self.state.is_terminal() {
            return Err(GameError::AlreadyTerminal);
        }
        if self.state.pending_choice.is_none() {
            return Err(GameError::NoChoicePending);
        }
        let adjustment = match choice {
            RerollChoice::RerollFirst => {
                let from = self.state.dice.first;
                let to = self.dice.roll_die();
                self.state.dice.first = to;
                DiceAdjustment::Rerolled { die: 1, from, to }
            }
            RerollChoice::RerollSecond => {
                let from = self.state.dice.second;
                let to = self.dice.roll_die();
                self.state.dice.second = to;
                DiceAdjustment::Rerolled { die: 2, from, to }
            }
            RerollChoice::Keep => DiceAdjustment::Kept,
        };
        self.state.pending_choice = None;
        events.push(Event::DiceAdjusted {
            roll: self.state.dice,
            adjustment,
        });
        Ok(self.resolve_roll(events))
    }

    fn reroll_joker(&self) -> Option<String> {
        if self.state.flags.reroll_used {
            return None;
        }
        self.state
            .hand_jokers
            .iter()
            .find(|joker| joker.def.joker_effect == Some(JokerEffect::Reroll))
            .map(|joker| joker.def.id.clone())
    }

    fn resolve_roll(&mut self, events: &mut EventBus) -> Resolution {
        self.state.flags.no_profit = false;
        let roll = self.state.dice;
        let triggered = evaluate_roll(roll, &Board::from_state(&self.state), &self.catalog);
        for event in &triggered {
            self.apply_roll_event(event, events);
        }
        self.state.last_roll_events = triggered.clone();
        self.set_phase(Phase::Results, events);
        Resolution {
            roll,
            events: triggered,
        }
    }

    /// Point deltas first, then the special, then any structural change.
    fn apply_roll_event(&mut self, event: &RollEvent, events: &mut EventBus) {
        self.state.add_mission_points(event.mission_delta);
        if let Some(delta) = event.action_delta {
            self.state.adjust_action_points(delta);
        }
        if let Some(special) = event.special {
            match special {
                Special::EndGame => self.state.mission_points = 0,
                Special::NoProfit => self.state.flags.no_profit = true,
                Special::LoseFeature => self.remove_random_feature(events),
                Special::SkipTurn => self.state.deferred.push(Deferred::SkipTurn),
                Special::AddDefect => self.add_random_defect(events),
                Special::BonusNextTurn => self.state.deferred.push(Deferred::ActionBonus),
                Special::PenaltyNextTurn => self.state.deferred.push(Deferred::ActionPenalty),
                Special::FixBonusNextTurn => self.state.deferred.push(Deferred::FixBonus),
            }
        }
        if event.kind == RollEventKind::Breakdown {
            self.break_feature(event, events);
        }
        tracing::debug!(
            target: LOG_TARGET,
            source = %event.source_id,
            kind = ?event.kind,
            mission_delta = event.mission_delta,
            mission_points = self.state.mission_points,
            action_points = self.state.action_points,
            "effect.applied"
        );
        events.push(Event::EffectApplied {
            event: event.clone(),
            mission_points: self.state.mission_points,
            action_points: self.state.action_points,
        });
    }

    fn break_feature(&mut self, event: &RollEvent, events: &mut EventBus) {
        let Some(crash_id) = event.linked_id.as_deref() else {
            return;
        };
        let Some(crash) = self.catalog.instantiate(crash_id) else {
            let message = format!("crash {crash_id} for feature {} is missing", event.source_id);
            tracing::warn!(target: LOG_TARGET, %message, "data.integrity");
            events.push(Event::DataIntegrity { message });
            return;
        };
        let Some(feature) = self
            .state
            .installed_features
            .iter_mut()
            .find(|card| card.def.id == event.source_id && !card.is_broken)
        else {
            // Destroyed or already broken earlier in this roll.
            return;
        };
        feature.is_broken = true;
        if !self.state.has_active_crash(crash_id) {
            self.state.active_crashes.push(crash);
        }
        events.push(Event::FeatureBroken {
            feature_id: event.source_id.clone(),
            crash_id: crash_id.to_string(),
        });
    }
}
