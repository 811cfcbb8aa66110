//! Combat math - To-Hit, To-Kill and the Infantry Fire Table
//!
//! Every calculator is a pure function returning a `Resolution`: the base
//! score, each named modifier, and the required roll. Dice are drawn by the
//! separate `roll_*` helpers.

pub mod constants;
pub mod ift;
pub mod modifiers;
pub mod to_hit;
pub mod to_kill;

pub use constants::*;
pub use ift::{resolve_ift, roll_ift, IftInput, IftOutcome, IftWeapon, MgDirection};
pub use modifiers::{is_critical, Modifier, Resolution, ResolutionKind, RollKind, RollRecord};
pub use to_hit::{resolve_to_hit, roll_to_hit, FireDirection, FiringMotion, ToHitInput, ToHitRoll};
pub use to_kill::{
    kill_check, resolve_hit_location, resolve_to_kill, roll_to_kill, KillCheck, ToKillInput,
    ToKillRoll,
};
