//! Core type definitions used throughout the encounter engine

use serde::{Deserialize, Serialize};

/// Identifier of a hostile unit, unique within one encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Encounter round counter
pub type Round = u32;

/// Range band of a map hex relative to the player tank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RangeBand {
    Close,
    Medium,
    Long,
}

impl RangeBand {
    /// Ring index on the hex map (1 = adjacent to the player)
    pub fn ring(&self) -> u32 {
        match self {
            RangeBand::Close => 1,
            RangeBand::Medium => 2,
            RangeBand::Long => 3,
        }
    }

    pub fn from_ring(ring: u32) -> Option<Self> {
        match ring {
            1 => Some(RangeBand::Close),
            2 => Some(RangeBand::Medium),
            3 => Some(RangeBand::Long),
            _ => None,
        }
    }

    pub fn closer(&self) -> Option<Self> {
        Self::from_ring(self.ring() - 1)
    }

    pub fn further(&self) -> Option<Self> {
        Self::from_ring(self.ring() + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RangeBand::Close => "Close",
            RangeBand::Medium => "Medium",
            RangeBand::Long => "Long",
        }
    }
}

/// Facing of a vehicle relative to whoever is shooting at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Front,
    Side,
    Rear,
}

impl Facing {
    /// Facing of a vehicle whose front points at `facing_sector`, seen from `attacker_sector`
    pub fn from_sectors(facing_sector: u8, attacker_sector: u8) -> Self {
        let diff = (attacker_sector as i32 - facing_sector as i32).rem_euclid(6);
        match diff {
            0 => Facing::Front,
            3 => Facing::Rear,
            _ => Facing::Side,
        }
    }
}

/// Where a hit on a vehicle landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitLocation {
    Turret,
    Hull,
    Track,
    Miss,
}

impl HitLocation {
    pub fn name(&self) -> &'static str {
        match self {
            HitLocation::Turret => "Turret",
            HitLocation::Hull => "Hull",
            HitLocation::Track => "Track",
            HitLocation::Miss => "Miss",
        }
    }
}

/// Terrain occupied by a hostile unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Open,
    Woods,
    Hedgerow,
    WoodenBuilding,
    StoneBuilding,
    Fortification,
}

impl Terrain {
    /// Terrain effect modifier used on the Infantry Fire Table
    pub fn tem(&self) -> i32 {
        match self {
            Terrain::Open => 0,
            Terrain::Woods | Terrain::Hedgerow => 1,
            Terrain::WoodenBuilding => 2,
            Terrain::StoneBuilding | Terrain::Fortification => 3,
        }
    }

    /// To-Hit penalty for direct fire into this terrain
    pub fn direct_fire_cover(&self) -> i32 {
        match self {
            Terrain::Open => 0,
            Terrain::Woods | Terrain::Hedgerow => 1,
            Terrain::WoodenBuilding => 2,
            Terrain::StoneBuilding | Terrain::Fortification => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Open => "Open",
            Terrain::Woods => "Woods",
            Terrain::Hedgerow => "Hedgerow",
            Terrain::WoodenBuilding => "Wooden Building",
            Terrain::StoneBuilding => "Stone Building",
            Terrain::Fortification => "Fortification",
        }
    }
}

/// Encounter mission type, set by the campaign layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionType {
    Advance,
    Battle,
    Counterattack,
}

/// Expected enemy resistance in the map area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resistance {
    Light,
    Medium,
    Heavy,
}

/// Player nation; affects a couple of fixed modifiers and crew titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nation {
    Usa,
    Commonwealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Precipitation {
    #[default]
    None,
    Rain,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ground {
    #[default]
    Dry,
    Mud,
    Snow,
}

/// Weather state at the encounter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weather {
    pub precipitation: Precipitation,
    pub fog: bool,
    pub ground: Ground,
}

impl Weather {
    pub fn clear() -> Self {
        Self::default()
    }

    /// Rain, snow or fog all count against shots beyond Close range
    pub fn is_adverse(&self) -> bool {
        self.fog || self.precipitation != Precipitation::None
    }

    /// Furthest band at which targets can be engaged
    pub fn max_range(&self) -> RangeBand {
        if self.fog {
            RangeBand::Medium
        } else {
            RangeBand::Long
        }
    }

    pub fn soft_ground(&self) -> bool {
        matches!(self.ground, Ground::Mud | Ground::Snow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_band_stepping() {
        assert_eq!(RangeBand::Close.closer(), None);
        assert_eq!(RangeBand::Medium.closer(), Some(RangeBand::Close));
        assert_eq!(RangeBand::Long.further(), None);
        assert_eq!(RangeBand::Close.further(), Some(RangeBand::Medium));
    }

    #[test]
    fn test_facing_from_sectors() {
        assert_eq!(Facing::from_sectors(4, 4), Facing::Front);
        assert_eq!(Facing::from_sectors(4, 1), Facing::Rear);
        assert_eq!(Facing::from_sectors(4, 5), Facing::Side);
        assert_eq!(Facing::from_sectors(0, 3), Facing::Rear);
        assert_eq!(Facing::from_sectors(5, 0), Facing::Side);
    }

    #[test]
    fn test_terrain_tem_ordering() {
        assert_eq!(Terrain::Open.tem(), 0);
        assert!(Terrain::StoneBuilding.tem() > Terrain::Woods.tem());
        assert_eq!(Terrain::Fortification.direct_fire_cover(), 3);
    }

    #[test]
    fn test_weather_adverse() {
        assert!(!Weather::clear().is_adverse());
        let fog = Weather {
            fog: true,
            ..Weather::default()
        };
        assert!(fog.is_adverse());
        assert_eq!(fog.max_range(), RangeBand::Medium);

        let mud = Weather {
            ground: Ground::Mud,
            ..Weather::default()
        };
        assert!(!mud.is_adverse());
        assert!(mud.soft_ground());
    }
}
