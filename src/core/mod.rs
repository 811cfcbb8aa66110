pub mod config;
pub mod dice;
pub mod error;
pub mod types;

pub use config::{load_config, EncounterConfig};
pub use dice::{Dice, ScriptedDice, SeededDice, TwoD6};
pub use error::{EngineError, Result};
pub use types::*;
