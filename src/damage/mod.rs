//! Damage model: tank malfunctions, crew wounds, penetrations and bail-outs

pub mod bail_out;
pub mod malfunction;
pub mod penetration;
pub mod wounds;

pub use bail_out::{abandon_tank, bail_out_check, knock_out_cascade, CrewFate};
pub use malfunction::{
    attempt_repair, post_encounter_repair, DamageDescriptor, DamageKind, DamageList,
    RepairHelp, RepairOutcome, DAMAGE_TABLE,
};
pub use penetration::{
    resolve_penetration, roll_minor_damage, roll_penetration, PenetrationReport,
    PenetrationResult,
};
pub use wounds::{
    recovery_check, resist_stun, stun_check, wound_check, WoundCause, WoundReport, WoundResult,
    COLLATERAL_MODIFIER,
};
