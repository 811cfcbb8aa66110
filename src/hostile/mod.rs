//! Hostile units: model, morale, activation and AI

pub mod ai;
pub mod morale;
pub mod spawn;
pub mod unit;

pub use ai::{choose_action, unit_allows, ActionTable, AiAction, AiChoice};
pub use morale::{morale_recovery, pin_test, stun_test, PinResult};
pub use spawn::{dismount_squad, morale_from_roll, roll_unit_class, spawn_unit, spawn_units, unit_count};
pub use unit::{HitRecord, HostileUnit, UnitClass, UnitFate};
