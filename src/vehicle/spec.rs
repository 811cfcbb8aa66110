//! Vehicle specification types
//!
//! Stats are plain data. Optional mounts are `Option` fields rather than
//! absent keys, so every query is a direct field access.

use serde::{Deserialize, Serialize};

use crate::core::types::{Facing, HitLocation};

/// Main gun calibre and barrel class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GunType {
    Gun20L,
    Gun50L,
    Gun75,
    Gun75L,
    Gun75LL,
    Gun76L,
    Gun76LL,
    Gun88L,
    Gun88LL,
    Panzerfaust,
}

/// Muzzle velocity class, drives the To-Hit range modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GunVelocity {
    Standard,
    Long,
    VeryLong,
}

impl GunType {
    pub fn velocity(&self) -> GunVelocity {
        match self {
            GunType::Gun20L | GunType::Gun50L | GunType::Gun75 | GunType::Panzerfaust => {
                GunVelocity::Standard
            }
            GunType::Gun75L | GunType::Gun76L | GunType::Gun88L => GunVelocity::Long,
            GunType::Gun75LL | GunType::Gun76LL | GunType::Gun88LL => GunVelocity::VeryLong,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GunType::Gun20L => "20L",
            GunType::Gun50L => "50L",
            GunType::Gun75 => "75",
            GunType::Gun75L => "75L",
            GunType::Gun75LL => "75LL",
            GunType::Gun76L => "76L",
            GunType::Gun76LL => "76LL",
            GunType::Gun88L => "88L",
            GunType::Gun88LL => "88LL",
            GunType::Panzerfaust => "Panzerfaust",
        }
    }

    /// Whether this gun can ever fire the given ammunition
    pub fn fires(&self, ammo: AmmoType) -> bool {
        match ammo {
            AmmoType::Pf => *self == GunType::Panzerfaust,
            _ if *self == GunType::Panzerfaust => false,
            AmmoType::He | AmmoType::Ap => true,
            AmmoType::Wp | AmmoType::Hcbi => *self == GunType::Gun75,
            AmmoType::Hvap => *self == GunType::Gun76L,
            AmmoType::Apds => *self == GunType::Gun76LL,
        }
    }
}

/// Direct fire aims at the target, area fire drops rounds around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireMode {
    Direct,
    Area,
}

/// Main gun ammunition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AmmoType {
    He,
    Ap,
    Wp,
    Hcbi,
    Hvap,
    Apds,
    /// Panzerfaust warhead, enemy infantry only
    Pf,
}

impl AmmoType {
    pub const COUNT: usize = 7;

    pub const ALL: [AmmoType; 7] = [
        AmmoType::He,
        AmmoType::Ap,
        AmmoType::Wp,
        AmmoType::Hcbi,
        AmmoType::Hvap,
        AmmoType::Apds,
        AmmoType::Pf,
    ];

    pub fn index(&self) -> usize {
        match self {
            AmmoType::He => 0,
            AmmoType::Ap => 1,
            AmmoType::Wp => 2,
            AmmoType::Hcbi => 3,
            AmmoType::Hvap => 4,
            AmmoType::Apds => 5,
            AmmoType::Pf => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AmmoType::He => "HE",
            AmmoType::Ap => "AP",
            AmmoType::Wp => "WP",
            AmmoType::Hcbi => "HCBI",
            AmmoType::Hvap => "HVAP",
            AmmoType::Apds => "APDS",
            AmmoType::Pf => "PF",
        }
    }

    /// Armour-piercing rounds (range modifiers apply to these on To-Kill)
    pub fn is_armour_piercing(&self) -> bool {
        matches!(self, AmmoType::Ap | AmmoType::Hvap | AmmoType::Apds)
    }

    pub fn is_smoke(&self) -> bool {
        matches!(self, AmmoType::Wp | AmmoType::Hcbi)
    }

    /// Smoke factors placed in the target hex on a hit
    pub fn smoke_factors(&self) -> u8 {
        match self {
            AmmoType::Wp => 1,
            AmmoType::Hcbi => 2,
            _ => 0,
        }
    }

    pub fn allows(&self, mode: FireMode) -> bool {
        match self {
            AmmoType::Ap | AmmoType::Hvap | AmmoType::Apds | AmmoType::Pf => {
                mode == FireMode::Direct
            }
            AmmoType::Wp | AmmoType::Hcbi => mode == FireMode::Area,
            AmmoType::He => true,
        }
    }
}

/// Armour thicknesses in game steps
pub const ARMOUR_STEPS: [u8; 11] = [0, 1, 2, 3, 4, 6, 8, 11, 14, 18, 26];

/// Rear armour is one step below the side value, clamping at the lowest step
pub fn rear_armour(side: u8) -> u8 {
    let index = ARMOUR_STEPS
        .iter()
        .position(|&step| step == side)
        .unwrap_or_else(|| panic!("armour value {} is not on the armour step table", side));
    ARMOUR_STEPS[index.saturating_sub(1)]
}

/// Armour values per facet; `None` marks an open or unarmoured facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArmourProfile {
    pub hull_front: Option<u8>,
    pub hull_side: Option<u8>,
    pub turret_front: Option<u8>,
    pub turret_side: Option<u8>,
}

impl ArmourProfile {
    pub fn new(hull_front: u8, hull_side: u8, turret_front: u8, turret_side: u8) -> Self {
        Self {
            hull_front: Some(hull_front),
            hull_side: Some(hull_side),
            turret_front: Some(turret_front),
            turret_side: Some(turret_side),
        }
    }

    pub fn unarmoured() -> Self {
        Self::default()
    }

    /// Armour value protecting a hit location from the given facing
    ///
    /// Track hits and misses never meet armour.
    pub fn value(&self, location: HitLocation, facing: Facing) -> Option<u8> {
        let (front, side) = match location {
            HitLocation::Turret => (self.turret_front, self.turret_side),
            HitLocation::Hull => (self.hull_front, self.hull_side),
            HitLocation::Track | HitLocation::Miss => return None,
        };
        match facing {
            Facing::Front => front,
            Facing::Side => side,
            Facing::Rear => side.map(rear_armour),
        }
    }
}

/// Silhouette size of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetSize {
    Small,
    #[default]
    Normal,
    Large,
    VeryLarge,
}

impl TargetSize {
    pub fn to_hit_modifier(&self) -> i32 {
        match self {
            TargetSize::Small => 1,
            TargetSize::Normal => 0,
            TargetSize::Large => -1,
            TargetSize::VeryLarge => -2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetSize::Small => "Small",
            TargetSize::Normal => "Normal",
            TargetSize::Large => "Large",
            TargetSize::VeryLarge => "Very Large",
        }
    }
}

/// Loader's hatch fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoaderHatch {
    #[default]
    None,
    Oval,
    Split,
}

/// Full stat block of one vehicle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    pub gun: Option<GunType>,
    /// Firepower of each MG mount, if fitted
    pub coax_mg: Option<u8>,
    pub bow_mg: Option<u8>,
    pub aa_mg: Option<u8>,
    pub armour: ArmourProfile,
    pub size: TargetSize,
    pub has_turret: bool,
    pub main_gun_rounds: u16,
    pub ready_rack: u8,
    /// Rate of Fire number; 2D6 at or below keeps firing
    pub rof: u8,
    pub loader_hatch: LoaderHatch,
    pub smoke_mortar: bool,
    pub vision_cupola: bool,
    pub wet_stowage: bool,
    pub assistant_driver: bool,
}

impl VehicleSpec {
    pub fn is_armoured(&self) -> bool {
        let a = &self.armour;
        [a.hull_front, a.hull_side, a.turret_front, a.turret_side]
            .iter()
            .any(|v| v.is_some())
    }
}
