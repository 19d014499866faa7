use crate::{GameError, GameState};
use serde::{Deserialize, Serialize};

/// A modifier earned during one turn and consumed at the next turn boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Deferred {
    /// Forced skip from a defect: the next turn starts with 0 AP.
    SkipTurn,
    /// Joker penalty: the next turn starts with 0 AP.
    ActionPenalty,
    /// Joker bonus: the next turn starts with one extra AP.
    ActionBonus,
    /// Every defect fixed during the next turn refunds 1 AP.
    FixBonus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeferredQueue {
    pending: Vec<Deferred>,
}

impl DeferredQueue {
    /// Queues a modifier. The same modifier twice in one turn still counts once.
    pub fn push(&mut self, modifier: Deferred) {
        if !self.pending.contains(&modifier) {
            self.pending.push(modifier);
        }
    }

    pub fn contains(&self, modifier: Deferred) -> bool {
        self.pending.contains(&modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn take(&mut self) -> Vec<Deferred> {
        std::mem::take(&mut self.pending)
    }
}

/// Starting Action Points for a turn and the modifier that decided it.
/// Priority: skip, then penalty, then bonus, then the base budget.
pub fn starting_action_points(
    pending: &[Deferred],
    base: u32,
    bonus: u32,
) -> (u32, Option<Deferred>) {
    let priority = [Deferred::SkipTurn, Deferred::ActionPenalty, Deferred::ActionBonus];
    match priority.into_iter().find(|modifier| pending.contains(modifier)) {
        Some(Deferred::ActionBonus) => (base.saturating_add(bonus), Some(Deferred::ActionBonus)),
        Some(modifier) => (0, Some(modifier)),
        None => (base, None),
    }
}

/// Single-turn conditions, reset at every turn boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnFlags {
    pub no_profit: bool,
    pub reroll_used: bool,
    pub remove_defect_used: bool,
    pub fix_bonus_active: bool,
}

impl GameState {
    pub fn can_afford(&self, cost: u32) -> bool {
        self.action_points >= cost
    }

    /// Takes `cost` AP or fails without touching the balance.
    pub fn spend_action_points(&mut self, cost: u32) -> Result<u32, GameError> {
        if !self.can_afford(cost) {
            return Err(GameError::InsufficientActionPoints {
                need: cost,
                have: self.action_points,
            });
        }
        self.action_points -= cost;
        Ok(self.action_points)
    }

    /// Applies a signed AP change, clamping at zero.
    pub fn adjust_action_points(&mut self, delta: i64) -> u32 {
        let next = (self.action_points as i64).saturating_add(delta).max(0);
        self.action_points = u32::try_from(next).unwrap_or(u32::MAX);
        self.action_points
    }

    pub fn add_mission_points(&mut self, delta: i64) -> i64 {
        self.mission_points = self.mission_points.saturating_add(delta);
        self.mission_points
    }
}
