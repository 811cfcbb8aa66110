//! The player's tank: spec, crew, stores and mutable combat state

use serde::{Deserialize, Serialize};

use crate::core::types::{Facing, HitLocation, Nation, UnitId};
use crate::damage::{DamageKind, DamageList};
use crate::vehicle::ammo::AmmoStores;
use crate::vehicle::crew::{Crew, CrewPosition};
use crate::vehicle::spec::VehicleSpec;

/// Number of smoke grenades carried by default
pub const DEFAULT_SMOKE_GRENADES: u8 = 6;

/// Machine gun mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MgMount {
    Coax,
    Bow,
    Aa,
}

impl MgMount {
    pub const ALL: [MgMount; 3] = [MgMount::Coax, MgMount::Bow, MgMount::Aa];

    pub fn name(&self) -> &'static str {
        match self {
            MgMount::Coax => "Co-ax MG",
            MgMount::Bow => "Bow MG",
            MgMount::Aa => "AA MG",
        }
    }

    pub fn malfunction(&self) -> DamageKind {
        match self {
            MgMount::Coax => DamageKind::CoaxMgMalfunction,
            MgMount::Bow => DamageKind::BowMgMalfunction,
            MgMount::Aa => DamageKind::AaMgMalfunction,
        }
    }

    pub fn broken(&self) -> DamageKind {
        match self {
            MgMount::Coax => DamageKind::CoaxMgBroken,
            MgMount::Bow => DamageKind::BowMgBroken,
            MgMount::Aa => DamageKind::AaMgBroken,
        }
    }
}

/// Acquired-target tracker for one shooter
///
/// Repeated shots at the same target earn an escalating bonus; any new
/// target, turret rotation or movement resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AcquiredTarget {
    pub target: Option<UnitId>,
    pub level: u8,
}

impl AcquiredTarget {
    pub const MAX_LEVEL: u8 = 2;

    /// Register a shot at `target`; returns the level that applies to this shot
    pub fn engage(&mut self, target: UnitId) -> u8 {
        if self.target != Some(target) {
            self.target = Some(target);
            self.level = 0;
        }
        let current = self.level;
        self.level = (self.level + 1).min(Self::MAX_LEVEL);
        current
    }

    /// Level a shot at `target` would get, without registering it
    pub fn level_for(&self, target: UnitId) -> u8 {
        if self.target == Some(target) {
            self.level
        } else {
            0
        }
    }

    pub fn reset(&mut self) {
        self.target = None;
        self.level = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTank {
    pub spec: VehicleSpec,
    pub crew: Crew,
    pub ammo: AmmoStores,
    /// Sector the hull front points to
    pub hull_facing: u8,
    /// Sector the turret points to
    pub turret_facing: u8,
    pub hull_down: bool,
    pub bogged: bool,
    pub immobilized: bool,
    pub moving: bool,
    pub active_mg: Option<MgMount>,
    pub damage: DamageList,
    pub smoke_grenades: u8,
    pub smoke_bombs: u8,
    pub acquired: AcquiredTarget,
    /// Turret has been rotated this round
    pub turret_rotated: bool,
    pub mgs_fired: Vec<MgMount>,
    /// Activation bonus from Battle Leadership for this round
    pub leadership_bonus: u8,
}

impl PlayerTank {
    pub fn new(spec: VehicleSpec, nation: Nation) -> Self {
        let crew = Crew::standard(&spec, nation);
        let ammo = AmmoStores::standard_loadout(&spec);
        let smoke_bombs = if spec.smoke_mortar { 15 } else { 0 };
        let mut tank = Self {
            spec,
            crew,
            ammo,
            hull_facing: 4,
            turret_facing: 4,
            hull_down: false,
            bogged: false,
            immobilized: false,
            moving: false,
            active_mg: None,
            damage: DamageList::default(),
            smoke_grenades: DEFAULT_SMOKE_GRENADES,
            smoke_bombs,
            acquired: AcquiredTarget::default(),
            turret_rotated: false,
            mgs_fired: Vec::new(),
            leadership_bonus: 0,
        };
        tank.active_mg = tank.available_mgs().first().copied();
        tank
    }

    pub fn main_gun_operational(&self) -> bool {
        self.spec.gun.is_some()
            && !self.damage.contains(DamageKind::MainGunMalfunction)
            && !self.damage.contains(DamageKind::MainGunBroken)
    }

    pub fn gun_sight_operational(&self) -> bool {
        !self.damage.contains(DamageKind::GunSightBroken)
    }

    pub fn turret_traverse_operational(&self) -> bool {
        self.spec.has_turret
            && !self.damage.contains(DamageKind::TurretTraverseMalfunction)
            && !self.damage.contains(DamageKind::TurretTraverseBroken)
    }

    pub fn radio_operational(&self) -> bool {
        !self.damage.contains(DamageKind::RadioMalfunction)
            && !self.damage.contains(DamageKind::RadioBroken)
    }

    pub fn intercom_operational(&self) -> bool {
        !self.damage.contains(DamageKind::IntercomMalfunction)
            && !self.damage.contains(DamageKind::IntercomBroken)
    }

    pub fn mg_firepower(&self, mount: MgMount) -> Option<u8> {
        match mount {
            MgMount::Coax => self.spec.coax_mg,
            MgMount::Bow => self.spec.bow_mg,
            MgMount::Aa => self.spec.aa_mg,
        }
    }

    pub fn mg_operational(&self, mount: MgMount) -> bool {
        self.mg_firepower(mount).is_some()
            && !self.damage.contains(mount.malfunction())
            && !self.damage.contains(mount.broken())
            && (mount != MgMount::Bow || self.crew.get(CrewPosition::AssistantDriver).is_some())
    }

    /// Mounts fitted and working, in selector order
    pub fn available_mgs(&self) -> Vec<MgMount> {
        MgMount::ALL
            .iter()
            .copied()
            .filter(|m| self.mg_operational(*m))
            .collect()
    }

    /// Step the MG selector to the next working mount, wrapping
    pub fn cycle_active_mg(&mut self) -> Option<MgMount> {
        let mounts = self.available_mgs();
        if mounts.is_empty() {
            self.active_mg = None;
            return None;
        }
        let next = match self.active_mg.and_then(|m| mounts.iter().position(|x| *x == m)) {
            Some(i) => mounts[(i + 1) % mounts.len()],
            None => mounts[0],
        };
        self.active_mg = Some(next);
        self.active_mg
    }

    /// Facing the tank presents to an attacker in `attacker_sector`
    pub fn facing_towards(&self, attacker_sector: u8, location: HitLocation) -> Facing {
        let front = match location {
            HitLocation::Turret if self.spec.has_turret => self.turret_facing,
            _ => self.hull_facing,
        };
        Facing::from_sectors(front, attacker_sector)
    }

    /// Sectors covered by the bow MG and hull-mounted weapons
    pub fn in_hull_arc(&self, sector: u8) -> bool {
        sector == self.hull_facing
    }

    pub fn in_turret_arc(&self, sector: u8) -> bool {
        sector == self.turret_facing
    }

    /// Clear per-round flags at the start of a round
    pub fn start_round(&mut self) {
        self.turret_rotated = false;
        self.mgs_fired.clear();
        self.leadership_bonus = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::catalog;

    fn m4() -> PlayerTank {
        PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa)
    }

    #[test]
    fn test_acquired_target_progression() {
        let mut acq = AcquiredTarget::default();
        assert_eq!(acq.engage(UnitId(1)), 0);
        assert_eq!(acq.engage(UnitId(1)), 1);
        assert_eq!(acq.engage(UnitId(1)), 2);
        assert_eq!(acq.engage(UnitId(1)), 2);
        assert_eq!(acq.engage(UnitId(2)), 0);
        assert_eq!(acq.level_for(UnitId(1)), 0);
    }

    #[test]
    fn test_new_tank_defaults() {
        let tank = m4();
        assert_eq!(tank.active_mg, Some(MgMount::Coax));
        assert_eq!(tank.smoke_bombs, 15);
        assert!(tank.main_gun_operational());
        assert_eq!(tank.ammo.loaded, Some(crate::vehicle::spec::AmmoType::Ap));
    }

    #[test]
    fn test_mg_selector_skips_broken_mounts() {
        let mut tank = m4();
        tank.damage.add(DamageKind::BowMgBroken);
        assert_eq!(tank.cycle_active_mg(), Some(MgMount::Aa));
        assert_eq!(tank.cycle_active_mg(), Some(MgMount::Coax));
    }

    #[test]
    fn test_facing_uses_turret_for_turret_hits() {
        let mut tank = m4();
        tank.hull_facing = 4;
        tank.turret_facing = 1;
        assert_eq!(tank.facing_towards(1, HitLocation::Turret), Facing::Front);
        assert_eq!(tank.facing_towards(1, HitLocation::Hull), Facing::Rear);
    }

    #[test]
    fn test_gun_malfunction_closes_main_gun() {
        let mut tank = m4();
        tank.damage.add(DamageKind::MainGunMalfunction);
        assert!(!tank.main_gun_operational());
    }
}
