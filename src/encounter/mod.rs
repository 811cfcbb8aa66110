//! Tactical encounter: the round phase machine and everything it drives
//!
//! `Encounter` owns the context (tank, units, map) and the dice. Commands
//! are methods on it, each checked against the current phase; the
//! automatic work of a phase runs when the phase is left. The phase
//! handlers are split across the submodules below, each adding its own
//! `impl Encounter` block.

pub mod autopilot;
pub mod commands;
pub mod context;
pub mod enemy;
pub mod events;
pub mod execution;
pub mod gunnery;
pub mod machine_guns;
pub mod movement;
pub mod outcome;
pub mod phase;
pub mod spotting;
pub mod support;
pub mod upkeep;

pub use autopilot::AutoCommander;
pub use commands::CommandRejected;
pub use context::{EncounterContext, Scenario};
pub use events::{EncounterEvent, EncounterEventLog, EncounterEventType};
pub use execution::{Encounter, GunneryState};
pub use outcome::{victory_points, EncounterReport, EncounterResult, EncounterStats};
pub use phase::Phase;
pub use spotting::{default_spot_sector, spot_sector_allowed};
pub use support::RandomEvent;
