//! To-Hit resolution for main gun fire
//!
//! Skill activations are rolled by the caller and passed in as flags, so the
//! calculator itself never draws dice.

use serde::{Deserialize, Serialize};

use crate::combat::constants::to_hit_base;
use crate::combat::modifiers::{is_critical, Resolution, ResolutionKind};
use crate::core::dice::{Dice, TwoD6};
use crate::core::types::{RangeBand, Terrain, Weather};
use crate::map::SMOKE_DRM_PER_FACTOR;
use crate::vehicle::spec::{AmmoType, FireMode, GunType, GunVelocity, TargetSize};

/// Commander's part in a shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FireDirection {
    pub directing: bool,
    pub fire_direction_skill: bool,
    /// Commander is buttoned up in a tank without a vision cupola
    pub buttoned_without_cupola: bool,
}

/// Firer state for a moving shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FiringMotion {
    #[default]
    Stationary,
    Moving {
        gyrostabilizer_activated: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToHitInput {
    pub gun: GunType,
    pub ammo: AmmoType,
    pub mode: FireMode,
    pub range: RangeBand,
    pub target_armoured: bool,
    pub target_moving: bool,
    /// Cancels the moving-target penalty
    pub target_tracking: bool,
    /// Vehicle silhouette; None for infantry and guns
    pub target_size: Option<TargetSize>,
    pub terrain: Terrain,
    pub emplaced: bool,
    pub smoke_factors: u8,
    pub weather: Weather,
    pub turret_rotated: bool,
    pub motion: FiringMotion,
    pub acquired: u8,
    pub commander: FireDirection,
}

impl ToHitInput {
    /// A plain stationary shot with no situational modifiers
    pub fn basic(
        gun: GunType,
        ammo: AmmoType,
        mode: FireMode,
        range: RangeBand,
        target_armoured: bool,
    ) -> Self {
        Self {
            gun,
            ammo,
            mode,
            range,
            target_armoured,
            target_moving: false,
            target_tracking: false,
            target_size: None,
            terrain: Terrain::Open,
            emplaced: false,
            smoke_factors: 0,
            weather: Weather::clear(),
            turret_rotated: false,
            motion: FiringMotion::Stationary,
            acquired: 0,
            commander: FireDirection::default(),
        }
    }
}

/// Compute the To-Hit requirement and every modifier that went into it
pub fn resolve_to_hit(input: &ToHitInput) -> Resolution {
    let base = to_hit_base(input.target_armoured, input.mode, input.range);
    let mut res = Resolution::new(ResolutionKind::ToHit, base);

    match (input.gun.velocity(), input.range) {
        (GunVelocity::Long, RangeBand::Close) => res.push("Long gun at Close range", 1),
        (GunVelocity::Long, RangeBand::Long) => res.push("Long gun at Long range", -1),
        (GunVelocity::VeryLong, RangeBand::Close) => res.push("Very long gun at Close range", 2),
        (GunVelocity::VeryLong, RangeBand::Long) => res.push("Very long gun at Long range", -2),
        (GunVelocity::Standard, RangeBand::Long) => res.push("Standard gun at Long range", 1),
        _ => {}
    }

    if input.ammo.is_smoke() && input.range == RangeBand::Close {
        res.push("Smoke round at Close range", 1);
    }

    if input.turret_rotated {
        res.push("Turret rotated", 1);
    }

    let cmd = input.commander;
    if cmd.directing {
        if cmd.fire_direction_skill {
            res.push("Commander directing fire (Fire Direction)", -2);
        } else {
            res.push("Commander directing fire", -1);
        }
        if cmd.buttoned_without_cupola {
            res.push("Commander buttoned up", 1);
        }
    }

    if let FiringMotion::Moving {
        gyrostabilizer_activated,
    } = input.motion
    {
        if gyrostabilizer_activated {
            res.push("Firing on the move (Gyrostabilizer)", 2);
        } else {
            res.push("Firing on the move", 4);
        }
    }

    match input.acquired {
        0 => {}
        1 => res.push("Acquired target", -1),
        _ => res.push("Acquired target", -2),
    }

    if input.target_moving && !input.target_tracking {
        res.push("Target moving", 2);
    }

    if let Some(size) = input.target_size {
        res.push(format!("Target size {}", size.name()), size.to_hit_modifier());
    }

    if input.mode == FireMode::Direct {
        if input.emplaced {
            res.push("Emplaced gun", 2);
        } else {
            res.push(input.terrain.name(), input.terrain.direct_fire_cover());
        }
    }

    if input.smoke_factors > 0 {
        res.push(
            format!("Smoke x{}", input.smoke_factors),
            SMOKE_DRM_PER_FACTOR * input.smoke_factors as i32,
        );
    }

    if input.weather.is_adverse() && input.range != RangeBand::Close {
        res.push("Adverse weather", 1);
    }

    res
}

/// Result of rolling against a To-Hit requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToHitRoll {
    pub roll: TwoD6,
    pub hit: bool,
    pub critical: bool,
    /// Double six: the weapon jams regardless of the result
    pub malfunction: bool,
}

impl ToHitRoll {
    pub fn from_roll(roll: TwoD6, required: i32) -> Self {
        let malfunction = roll.is_double_six();
        let hit = !malfunction && roll.total() <= required;
        Self {
            roll,
            hit,
            critical: hit && is_critical(&roll, required),
            malfunction,
        }
    }

    pub fn outcome_text(&self) -> &'static str {
        match (self.malfunction, self.hit, self.critical) {
            (true, _, _) => "Malfunction",
            (false, true, true) => "Critical Hit",
            (false, true, false) => "Hit",
            (false, false, _) => "Miss",
        }
    }
}

pub fn roll_to_hit(resolution: &Resolution, dice: &mut dyn Dice) -> ToHitRoll {
    ToHitRoll::from_roll(dice.two_d6(), resolution.required)
}
