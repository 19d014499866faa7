use crate::{Catalog, DiceSource, GameConfig, GameState, Phase, RngState};
use thiserror::Error;

mod actions;
mod roll;
mod supply;
mod turn;

pub use roll::{RerollChoice, Resolution, RollOutcome};

const DICE_SEED_SALT: u64 = 0x5EED_D1CE;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid phase: {0:?}")]
    InvalidPhase(Phase),
    #[error("not enough action points: need {need}, have {have}")]
    InsufficientActionPoints { need: u32, have: u32 },
    #[error("card {0} not found")]
    NotFound(String),
    #[error("the game is already over")]
    AlreadyTerminal,
    #[error("a joker decision is pending")]
    ChoicePending,
    #[error("no joker decision is pending")]
    NoChoicePending,
    #[error("at least one player is required")]
    NoPlayers,
    #[error("joker {0} cannot be used now")]
    JokerUnavailable(String),
}

/// One game session: the rules engine's state machine and the only owner of `GameState`.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    catalog: Catalog,
    state: GameState,
    rng: RngState,
    dice: Box<dyn DiceSource>,
}

impl Session {
    /// Seeds both the card shuffles and the dice from `seed`.
    pub fn new(config: GameConfig, catalog: Catalog, seed: u64) -> Self {
        let dice = RngState::from_seed(seed ^ DICE_SEED_SALT);
        Self::with_dice(config, catalog, seed, Box::new(dice))
    }

    pub fn with_dice(
        config: GameConfig,
        catalog: Catalog,
        seed: u64,
        dice: Box<dyn DiceSource>,
    ) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            catalog,
            state,
            rng: RngState::from_seed(seed),
            dice,
        }
    }

    pub fn set_dice(&mut self, dice: Box<dyn DiceSource>) {
        self.dice = dice;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Raw access for scenario setup in tests. Bypasses every rule check.
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }

    /// Rejects everything once the game is over or while a roll is parked on a joker decision.
    fn ensure_accepting(&self) -> Result<(), GameError> {
        if self.state.is_terminal() {
            return Err(GameError::AlreadyTerminal);
        }
        if self.state.pending_choice.is_some() {
            return Err(GameError::ChoicePending);
        }
        Ok(())
    }

    fn require_phase(&self, phase: Phase) -> Result<(), GameError> {
        self.ensure_accepting()?;
        if self.state.phase != phase {
            return Err(GameError::InvalidPhase(self.state.phase));
        }
        Ok(())
    }
}
