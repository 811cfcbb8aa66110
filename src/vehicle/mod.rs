//! Vehicles, crews and ammunition
//!
//! Stat blocks live in `catalog`; everything the player mutates during an
//! encounter hangs off `PlayerTank`.

pub mod ammo;
pub mod catalog;
pub mod crew;
pub mod orders;
pub mod skills;
pub mod spec;
pub mod tank;

pub use ammo::{AmmoStores, LoadSource};
pub use crew::{Crew, CrewMember, CrewPosition, Hatch, WoundLevel};
pub use orders::{check_order, legal_orders, CrewOrder};
pub use skills::{Skill, SkillKind, BATTLE_LEADERSHIP_BONUS};
pub use spec::{
    rear_armour, AmmoType, ArmourProfile, FireMode, GunType, GunVelocity, LoaderHatch,
    TargetSize, VehicleSpec, ARMOUR_STEPS,
};
pub use tank::{AcquiredTarget, MgMount, PlayerTank, DEFAULT_SMOKE_GRENADES};
