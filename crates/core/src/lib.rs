//! Rules engine for the Mission: Starship board game. Keep this crate free of IO and platform
//! concerns.

pub mod action;
pub mod cards;
pub mod catalog;
pub mod config;
pub mod dice;
pub mod effects;
pub mod events;
pub mod ledger;
pub mod rng;
pub mod rules;
pub mod session;
pub mod state;

pub use action::*;
pub use cards::*;
pub use catalog::*;
pub use config::*;
pub use dice::*;
pub use effects::*;
pub use events::*;
pub use ledger::*;
pub use rng::*;
pub use rules::*;
pub use session::*;
pub use state::*;
