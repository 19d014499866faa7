use crate::RngState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A pair of dice. A zero face means the die is unset or was removed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceRoll {
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    pub fn total(&self) -> u8 {
        self.first + self.second
    }

    /// Both dice show the same face. A removed second die never counts as a double.
    pub fn is_double(&self) -> bool {
        self.second != 0 && self.first == self.second
    }
}

/// Source of single die faces in `1..=6`.
pub trait DiceSource: std::fmt::Debug {
    fn roll_die(&mut self) -> u8;
}

impl DiceSource for RngState {
    fn roll_die(&mut self) -> u8 {
        RngState::roll_die(self)
    }
}

pub fn roll_pair(source: &mut dyn DiceSource) -> DiceRoll {
    let first = source.roll_die();
    let second = source.roll_die();
    DiceRoll::new(first, second)
}

/// Replays a fixed list of faces, then falls back to a seeded generator.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
    fallback: RngState,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces.into_iter().map(|face| face.clamp(1, 6)).collect(),
            fallback: RngState::from_seed(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        match self.faces.pop_front() {
            Some(face) => face,
            None => self.fallback.roll_die(),
        }
    }
}
