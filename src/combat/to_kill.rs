//! To-Kill resolution against vehicles, and hit location

use serde::{Deserialize, Serialize};

use crate::combat::constants::{to_kill_armoured_base, to_kill_unarmoured_base};
use crate::combat::modifiers::{is_critical, Resolution, ResolutionKind};
use crate::core::dice::{Dice, TwoD6};
use crate::core::types::{Facing, HitLocation, RangeBand};
use crate::vehicle::spec::{AmmoType, GunType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToKillInput {
    pub gun: GunType,
    pub ammo: AmmoType,
    pub range: RangeBand,
    pub location: HitLocation,
    pub facing: Facing,
    /// Armour on the struck facet; None or 0 is an unarmoured location
    pub armour: Option<u8>,
    pub critical: bool,
}

fn facet_name(location: HitLocation, facing: Facing) -> String {
    let side = match facing {
        Facing::Front => "Front",
        Facing::Side => "Side",
        Facing::Rear => "Rear",
    };
    format!("{} {}", location.name(), side)
}

/// Compute the To-Kill requirement
///
/// Unarmoured locations use a fixed base, doubled on a critical hit, with no
/// armour modifier. Range modifiers apply only to armour-piercing rounds.
pub fn resolve_to_kill(input: &ToKillInput) -> Resolution {
    let armour = input.armour.filter(|a| *a > 0);

    let mut res = match armour {
        None => {
            let mut base = to_kill_unarmoured_base(input.gun, input.ammo);
            if input.critical {
                base *= 2;
            }
            Resolution::new(ResolutionKind::ToKill, base)
        }
        Some(value) => {
            let base = to_kill_armoured_base(input.gun, input.ammo);
            let mut res = Resolution::new(ResolutionKind::ToKill, base);
            res.push(
                format!("{} armour", facet_name(input.location, input.facing)),
                -(value as i32),
            );
            res
        }
    };

    if input.ammo.is_armour_piercing() {
        match input.range {
            RangeBand::Close => res.push("Close range", 1),
            RangeBand::Medium => {}
            RangeBand::Long => res.push("Long range", -1),
        }
    }

    res
}

/// What a To-Kill requirement means before any dice are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCheck {
    /// Cannot fail; the roll is skipped
    AutomaticKill,
    /// Cannot succeed; the roll is skipped
    NoChance,
    Roll,
}

pub fn kill_check(required: i32) -> KillCheck {
    if required > 12 {
        KillCheck::AutomaticKill
    } else if required < 2 {
        KillCheck::NoChance
    } else {
        KillCheck::Roll
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToKillRoll {
    pub check: KillCheck,
    pub roll: Option<TwoD6>,
    pub kill: bool,
    /// A critical kill makes the penetration roll twice
    pub critical: bool,
}

impl ToKillRoll {
    pub fn outcome_text(&self) -> &'static str {
        match (self.check, self.kill) {
            (KillCheck::AutomaticKill, _) => "Automatic Kill",
            (KillCheck::NoChance, _) => "No Chance",
            (KillCheck::Roll, true) => "Armour Penetrated",
            (KillCheck::Roll, false) => "Armour Saved",
        }
    }

    pub fn dice(&self) -> Vec<u8> {
        self.roll.map(|r| r.faces()).unwrap_or_default()
    }
}

/// Roll against a To-Kill requirement: under the score or a natural 2 kills
pub fn roll_to_kill(resolution: &Resolution, dice: &mut dyn Dice) -> ToKillRoll {
    let required = resolution.required;
    match kill_check(required) {
        KillCheck::AutomaticKill => ToKillRoll {
            check: KillCheck::AutomaticKill,
            roll: None,
            kill: true,
            critical: false,
        },
        KillCheck::NoChance => ToKillRoll {
            check: KillCheck::NoChance,
            roll: None,
            kill: false,
            critical: false,
        },
        KillCheck::Roll => {
            let roll = dice.two_d6();
            let kill = roll.is_snake_eyes() || roll.total() < required;
            ToKillRoll {
                check: KillCheck::Roll,
                roll: Some(roll),
                kill,
                critical: kill && is_critical(&roll, required),
            }
        }
    }
}

/// Where a hit lands: 1-2 turret, 3-5 hull, 6 track
///
/// A hull-down vehicle can only be hit in the turret; anything else misses.
pub fn resolve_hit_location(hull_down: bool, dice: &mut dyn Dice) -> (HitLocation, u8) {
    let roll = dice.d6();
    let location = match (hull_down, roll) {
        (_, 1..=2) => HitLocation::Turret,
        (true, _) => HitLocation::Miss,
        (false, 3..=5) => HitLocation::Hull,
        (false, _) => HitLocation::Track,
    };
    (location, roll)
}
