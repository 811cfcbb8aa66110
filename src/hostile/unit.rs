//! Hostile units on the encounter map
//!
//! Classes are a closed set; everything the engine needs to know about a
//! class is asked through its capability queries.

use serde::{Deserialize, Serialize};

use crate::core::types::{Facing, HitLocation, RangeBand, Terrain, UnitId};
use crate::map::hex::HexCoord;
use crate::vehicle::spec::{AmmoType, FireMode, GunType, TargetSize, VehicleSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Tank,
    Spg,
    AtGun,
    /// Machine gun team
    Mg,
    /// Light weapons infantry squad
    Lw,
    Truck,
    Apc,
    /// Armoured car
    Ac,
}

impl UnitClass {
    pub const ALL: [UnitClass; 8] = [
        UnitClass::Tank,
        UnitClass::Spg,
        UnitClass::AtGun,
        UnitClass::Mg,
        UnitClass::Lw,
        UnitClass::Truck,
        UnitClass::Apc,
        UnitClass::Ac,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UnitClass::Tank => "Tank",
            UnitClass::Spg => "Self-Propelled Gun",
            UnitClass::AtGun => "Anti-Tank Gun",
            UnitClass::Mg => "MG Team",
            UnitClass::Lw => "Light Weapons Infantry",
            UnitClass::Truck => "Truck",
            UnitClass::Apc => "APC",
            UnitClass::Ac => "Armoured Car",
        }
    }

    /// Carries facing-dependent armour
    pub fn is_armoured(&self) -> bool {
        matches!(
            self,
            UnitClass::Tank | UnitClass::Spg | UnitClass::Apc | UnitClass::Ac
        )
    }

    pub fn is_vehicle(&self) -> bool {
        self.is_armoured() || *self == UnitClass::Truck
    }

    /// Facing matters for hits or for the unit's own fire arc
    pub fn has_facing(&self) -> bool {
        self.is_vehicle() || *self == UnitClass::AtGun
    }

    pub fn can_be_pinned(&self) -> bool {
        matches!(self, UnitClass::Mg | UnitClass::Lw | UnitClass::AtGun)
    }

    pub fn can_move(&self) -> bool {
        *self != UnitClass::AtGun
    }

    /// Destroyed through the Infantry Fire Table rather than To-Kill
    pub fn resolves_on_ift(&self) -> bool {
        matches!(self, UnitClass::Mg | UnitClass::Lw | UnitClass::AtGun)
    }

    /// Infantry-like targets that MGs and HE are effective against
    pub fn is_soft(&self) -> bool {
        !self.is_armoured()
    }

    pub fn victory_points(&self) -> u32 {
        match self {
            UnitClass::Lw | UnitClass::Mg | UnitClass::Truck | UnitClass::Apc => 1,
            UnitClass::AtGun | UnitClass::Ac => 2,
            UnitClass::Spg => 5,
            UnitClass::Tank => 6,
        }
    }

    /// Base percent chance friendly support destroys a unit of this class
    pub fn support_chance(&self) -> u8 {
        match self {
            UnitClass::Lw | UnitClass::Mg | UnitClass::Apc | UnitClass::Ac => 5,
            UnitClass::AtGun => 4,
            UnitClass::Truck => 6,
            UnitClass::Spg => 3,
            UnitClass::Tank => 2,
        }
    }
}

/// A hit scored by the player, resolved in the ResolveHits phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    pub gun: GunType,
    pub ammo: AmmoType,
    pub mode: FireMode,
    pub range: RangeBand,
    pub critical: bool,
}

/// How a unit left the encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitFate {
    DestroyedByPlayer,
    DestroyedBySupport,
    /// Failed a pin test while already pinned
    Broken,
    LeftMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostileUnit {
    pub id: UnitId,
    pub class: UnitClass,
    /// Stat block for vehicles
    pub spec: Option<VehicleSpec>,
    /// Gun carried by AT guns and gun-armed vehicles
    pub gun: Option<GunType>,
    pub name: String,
    pub hex: HexCoord,
    pub band: RangeBand,
    pub sector: u8,
    /// Side of the unit presented to the player tank
    pub facing: Facing,
    pub terrain: Terrain,
    pub emplaced: bool,
    pub alive: bool,
    pub fate: Option<UnitFate>,
    pub spotted: bool,
    pub identified: bool,
    pub hidden: bool,
    pub pinned: bool,
    pub stunned: bool,
    pub morale: u8,
    pub moving: bool,
    pub immobilized: bool,
    pub fired_this_round: bool,
    pub fired_last_round: bool,
    /// Acquired-target level against the player tank
    pub acquired: u8,
    /// Armoured car spotting for the other enemy units
    pub spotting_player: bool,
    /// APC still carrying its infantry section
    pub carrying_infantry: bool,
    pub hits: Vec<HitRecord>,
}

impl HostileUnit {
    pub fn new(
        id: UnitId,
        class: UnitClass,
        name: impl Into<String>,
        hex: HexCoord,
        band: RangeBand,
        sector: u8,
    ) -> Self {
        Self {
            id,
            class,
            spec: None,
            gun: None,
            name: name.into(),
            hex,
            band,
            sector,
            facing: Facing::Front,
            terrain: Terrain::Open,
            emplaced: false,
            alive: true,
            fate: None,
            spotted: false,
            identified: false,
            hidden: false,
            pinned: false,
            stunned: false,
            morale: 8,
            moving: false,
            immobilized: false,
            fired_this_round: false,
            fired_last_round: false,
            acquired: 0,
            spotting_player: false,
            carrying_infantry: false,
            hits: Vec::new(),
        }
    }

    /// Attach a vehicle stat block, taking its gun
    pub fn with_spec(mut self, spec: VehicleSpec) -> Self {
        self.gun = spec.gun;
        self.name = spec.name.clone();
        self.spec = Some(spec);
        self
    }

    pub fn with_gun(mut self, gun: GunType) -> Self {
        self.gun = Some(gun);
        self
    }

    /// Label shown to the player: full name once identified
    pub fn label(&self) -> String {
        if self.identified || !self.class.is_vehicle() {
            format!("{} {}", self.name, self.id)
        } else {
            format!("{} {}", self.class.name(), self.id)
        }
    }

    pub fn is_targetable(&self) -> bool {
        self.alive && self.spotted && !self.hidden
    }

    /// Can be struck through the armour table
    pub fn is_armoured(&self) -> bool {
        self.class.is_armoured()
    }

    /// Armour on a facet; None for soft targets and unarmoured facets
    pub fn armour(&self, location: HitLocation) -> Option<u8> {
        if !self.class.is_armoured() {
            return None;
        }
        self.spec
            .as_ref()
            .and_then(|s| s.armour.value(location, self.facing))
    }

    pub fn has_turret(&self) -> bool {
        self.spec.as_ref().map(|s| s.has_turret).unwrap_or(false)
    }

    pub fn target_size(&self) -> Option<TargetSize> {
        self.spec.as_ref().map(|s| s.size)
    }

    /// Machine gun firepower the unit can bring against soft targets
    pub fn mg_firepower(&self) -> Option<u8> {
        match self.class {
            UnitClass::Mg => Some(4),
            UnitClass::Lw => Some(2),
            _ => self
                .spec
                .as_ref()
                .and_then(|s| s.coax_mg.or(s.bow_mg)),
        }
    }

    pub fn can_move(&self) -> bool {
        self.alive && self.class.can_move() && !self.immobilized
    }

    pub fn move_to(&mut self, hex: HexCoord, band: RangeBand, sector: u8) {
        self.hex = hex;
        self.band = band;
        self.sector = sector;
        self.moving = true;
        self.acquired = 0;
        self.emplaced = false;
    }

    /// Remove the unit from play
    pub fn eliminate(&mut self, fate: UnitFate) {
        self.alive = false;
        self.fate = Some(fate);
        self.pinned = false;
        self.stunned = false;
        self.spotting_player = false;
        self.hits.clear();
    }

    pub fn start_round(&mut self) {
        self.fired_last_round = self.fired_this_round;
        self.fired_this_round = false;
        self.moving = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::catalog;

    fn tiger() -> HostileUnit {
        HostileUnit::new(
            UnitId(3),
            UnitClass::Tank,
            "Tank",
            HexCoord::new(2, 0),
            RangeBand::Medium,
            0,
        )
        .with_spec(catalog::lookup(catalog::TIGER).unwrap())
    }

    #[test]
    fn test_capabilities() {
        for class in UnitClass::ALL {
            if !class.is_armoured() && class != UnitClass::Truck {
                assert!(!class.is_vehicle());
            }
            if class.can_be_pinned() {
                assert!(!class.is_armoured());
            }
        }
        assert!(UnitClass::AtGun.has_facing());
        assert!(!UnitClass::AtGun.can_move());
        assert!(!UnitClass::Lw.has_facing());
    }

    #[test]
    fn test_soft_units_never_carry_armour() {
        let gun = HostileUnit::new(
            UnitId(1),
            UnitClass::AtGun,
            "PaK 40",
            HexCoord::new(1, 0),
            RangeBand::Close,
            0,
        )
        .with_gun(GunType::Gun75L);
        assert_eq!(gun.armour(HitLocation::Hull), None);
    }

    #[test]
    fn test_armour_follows_facing() {
        let mut unit = tiger();
        assert_eq!(unit.armour(HitLocation::Hull), Some(11));
        unit.facing = Facing::Side;
        assert_eq!(unit.armour(HitLocation::Turret), Some(8));
    }

    #[test]
    fn test_label_hides_type_until_identified() {
        let mut unit = tiger();
        assert_eq!(unit.label(), "Tank #3");
        unit.identified = true;
        assert_eq!(unit.label(), format!("{} #3", catalog::TIGER));
    }

    #[test]
    fn test_eliminate_clears_state() {
        let mut unit = tiger();
        unit.pinned = true;
        unit.eliminate(UnitFate::DestroyedByPlayer);
        assert!(!unit.alive);
        assert!(!unit.pinned);
        assert_eq!(unit.fate, Some(UnitFate::DestroyedByPlayer));
    }
}
