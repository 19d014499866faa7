use super::*;
use crate::*;

const LOG_TARGET: &str = "zvezdolet::actions";

impl Session {
    pub fn fix_defect(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let index = position(&self.state.active_defects, id)?;
        let cost = self.state.active_defects[index].def.cost;
        self.charge(id, cost, events)?;
        self.state.active_defects.remove(index);
        events.push(Event::CardRemoved {
            id: id.to_string(),
            reason: RemovalReason::Fixed,
        });
        if self.state.flags.fix_bonus_active {
            let action_points = self.state.adjust_action_points(1);
            events.push(Event::ActionPointsRefunded {
                amount: 1,
                action_points,
            });
        }
        Ok(())
    }

    /// Clears the crash and puts its feature back to work.
    pub fn fix_crash(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let index = position(&self.state.active_crashes, id)?;
        let cost = self.state.active_crashes[index].def.cost;
        self.charge(id, cost, events)?;
        self.state.active_crashes.remove(index);
        if let Some(feature_id) = linked_feature_id(id) {
            self.set_feature_broken(&feature_id, false);
        }
        events.push(Event::CardRemoved {
            id: id.to_string(),
            reason: RemovalReason::Fixed,
        });
        Ok(())
    }

    pub fn install_feature(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let index = position(&self.state.available_features, id)?;
        let cost = self.state.available_features[index].def.cost;
        self.charge(id, cost, events)?;
        let mut card = self.state.available_features.remove(index);
        card.is_broken = false;
        self.state.installed_features.push(card);
        events.push(Event::CardRemoved {
            id: id.to_string(),
            reason: RemovalReason::Installed,
        });
        Ok(())
    }

    /// Repairs a broken installed feature for its own cost; the linked crash goes away.
    pub fn repair_feature(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let cost = self
            .state
            .installed_features
            .iter()
            .find(|card| card.id() == id && card.is_broken)
            .map(|card| card.def.cost)
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        self.charge(id, cost, events)?;
        self.set_feature_broken(id, false);
        if let Some(crash_id) = linked_crash_id(id) {
            self.remove_crash(&crash_id, RemovalReason::Repaired, events);
        }
        Ok(())
    }

    pub fn take_joker(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let index = position(&self.state.available_jokers, id)?;
        self.charge(id, self.config.take_joker_cost, events)?;
        let card = self.state.available_jokers.remove(index);
        self.mark_joker_used(id);
        self.state.hand_jokers.push(card);
        events.push(Event::CardRemoved {
            id: id.to_string(),
            reason: RemovalReason::Taken,
        });
        Ok(())
    }

    /// Plays a joker from hand. It leaves the game for good.
    pub fn use_joker(&mut self, id: &str, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Planning)?;
        let index = position(&self.state.hand_jokers, id)?;
        let cost = self.state.hand_jokers[index].def.cost;
        self.charge(id, cost, events)?;
        self.state.hand_jokers.remove(index);
        self.mark_joker_used(id);
        events.push(Event::CardRemoved {
            id: id.to_string(),
            reason: RemovalReason::Used,
        });
        Ok(())
    }

    /// Removes an easy or medium defect for free after an even roll. Once per turn; the
    /// joker stays in hand.
    pub fn use_remove_defect_joker(
        &mut self,
        defect_id: &str,
        events: &mut EventBus,
    ) -> Result<(), GameError> {
        self.require_phase(Phase::Results)?;
        let joker_id = self
            .state
            .hand_jokers
            .iter()
            .find(|card| card.def.joker_effect == Some(JokerEffect::RemoveDefect))
            .map(|card| card.def.id.clone())
            .ok_or_else(|| GameError::NotFound(JokerEffect::RemoveDefect.keyword().to_string()))?;
        let total = self.state.dice.total();
        if self.state.flags.remove_defect_used || total == 0 || total % 2 != 0 {
            return Err(GameError::JokerUnavailable(joker_id));
        }
        let index = position(&self.state.active_defects, defect_id)?;
        if !self.state.active_defects[index].def.tier.is_light() {
            return Err(GameError::JokerUnavailable(joker_id));
        }

        self.state.active_defects.remove(index);
        self.state.flags.remove_defect_used = true;
        tracing::debug!(
            target: LOG_TARGET,
            joker = %joker_id,
            defect = %defect_id,
            "defect.removed_by_joker"
        );
        events.push(Event::CardRemoved {
            id: defect_id.to_string(),
            reason: RemovalReason::RemovedByJoker,
        });
        Ok(())
    }

    fn charge(&mut self, id: &str, cost: u32, events: &mut EventBus) -> Result<(), GameError> {
        let remaining = self.state.spend_action_points(cost)?;
        tracing::debug!(target: LOG_TARGET, card = %id, cost, remaining, "action_points.spent");
        events.push(Event::ActionPointsSpent {
            id: id.to_string(),
            cost,
            remaining,
        });
        Ok(())
    }

    fn set_feature_broken(&mut self, id: &str, broken: bool) {
        if let Some(feature) = self
            .state
            .installed_features
            .iter_mut()
            .find(|card| card.id() == id)
        {
            feature.is_broken = broken;
        }
    }

    fn mark_joker_used(&mut self, id: &str) {
        if !self.state.used_joker_ids.iter().any(|used| used == id) {
            self.state.used_joker_ids.push(id.to_string());
        }
    }
}

fn position(cards: &[Card], id: &str) -> Result<usize, GameError> {
    cards
        .iter()
        .position(|card| card.id() == id)
        .ok_or_else(|| GameError::NotFound(id.to_string()))
}
