//! Infantry Fire Table resolution against soft targets

use serde::{Deserialize, Serialize};

use crate::combat::constants::{ift_gun_base, ift_mg_range_bonus, ARTILLERY_IFT_BASE, IFT_PIN_MARGIN};
use crate::combat::modifiers::{Resolution, ResolutionKind};
use crate::core::dice::{Dice, TwoD6};
use crate::core::types::{RangeBand, Terrain};
use crate::vehicle::spec::{FireMode, GunType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IftWeapon {
    /// Machine gun with its firepower rating
    Mg { firepower: u8 },
    /// Main gun firing HE
    Gun(GunType),
    /// Off-board friendly artillery
    Artillery,
}

impl IftWeapon {
    pub fn is_mg(&self) -> bool {
        matches!(self, IftWeapon::Mg { .. })
    }
}

/// Who is steering an MG burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MgDirection {
    pub commander_directing: bool,
    pub fire_direction_skill: bool,
    /// Bow gunner's Apprentice Gunner activated
    pub apprentice_gunner: bool,
    /// Turret rotated this round before the co-ax fired
    pub coax_after_rotation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IftInput {
    pub weapon: IftWeapon,
    pub range: RangeBand,
    pub mode: FireMode,
    /// Critical direct hit from the To-Hit roll
    pub critical: bool,
    pub terrain: Terrain,
    pub emplaced: bool,
    pub target_moving: bool,
    /// Mud or snow on the ground
    pub soft_ground: bool,
    pub attacker_moving: bool,
    pub direction: MgDirection,
}

impl IftInput {
    pub fn new(weapon: IftWeapon, range: RangeBand, mode: FireMode, terrain: Terrain) -> Self {
        Self {
            weapon,
            range,
            mode,
            critical: false,
            terrain,
            emplaced: false,
            target_moving: false,
            soft_ground: false,
            attacker_moving: false,
            direction: MgDirection::default(),
        }
    }
}

/// Compute the IFT requirement
///
/// Terrain helps an area attack and hinders a critical direct hit. Emplaced
/// guns swap terrain for a flat exposure bonus.
pub fn resolve_ift(input: &IftInput) -> Resolution {
    let base = match input.weapon {
        IftWeapon::Mg { firepower } => firepower as i32 + ift_mg_range_bonus(input.range),
        IftWeapon::Gun(gun) => ift_gun_base(gun),
        IftWeapon::Artillery => ARTILLERY_IFT_BASE,
    };
    let mut res = Resolution::new(ResolutionKind::Ift, base);

    let tem = input.terrain.tem();
    if input.emplaced {
        res.push("Emplaced gun crew exposed", -1);
    } else if input.mode == FireMode::Area {
        res.push(format!("{} TEM", input.terrain.name()), -tem);
    } else if input.critical {
        res.push(format!("{} TEM (critical hit)", input.terrain.name()), tem);
    }

    if input.target_moving && input.terrain == Terrain::Open {
        res.push("Target moving in the open", -1);
    }

    if input.soft_ground && !input.weapon.is_mg() {
        res.push("HE in mud or snow", 1);
    }

    if input.weapon.is_mg() {
        if input.attacker_moving {
            res.push("Firing on the move", 1);
        }
        let dir = input.direction;
        if dir.commander_directing {
            if dir.fire_direction_skill {
                res.push("Commander directing fire (Fire Direction)", -2);
            } else {
                res.push("Commander directing fire", -1);
            }
        }
        if dir.apprentice_gunner {
            res.push("Apprentice Gunner", -1);
        }
        if dir.coax_after_rotation {
            res.push("Turret rotated", 1);
        }
    }

    res
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IftOutcome {
    Destroyed,
    PinTest,
    NoEffect,
}

impl IftOutcome {
    pub fn from_roll(total: i32, required: i32) -> Self {
        if total <= required {
            IftOutcome::Destroyed
        } else if total <= required + IFT_PIN_MARGIN {
            IftOutcome::PinTest
        } else {
            IftOutcome::NoEffect
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            IftOutcome::Destroyed => "Destroyed",
            IftOutcome::PinTest => "Pin Test",
            IftOutcome::NoEffect => "No Effect",
        }
    }
}

pub fn roll_ift(resolution: &Resolution, dice: &mut dyn Dice) -> (IftOutcome, TwoD6) {
    let roll = dice.two_d6();
    (IftOutcome::from_roll(roll.total(), resolution.required), roll)
}
