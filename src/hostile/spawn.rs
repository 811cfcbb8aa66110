//! Enemy activation: how many units appear, what they are and where

use crate::core::dice::Dice;
use crate::core::types::{Facing, MissionType, RangeBand, Resistance, Terrain, UnitId};
use crate::hostile::unit::{HostileUnit, UnitClass};
use crate::map::encounter_map::EncounterMap;
use crate::vehicle::catalog;
use crate::vehicle::spec::GunType;

/// Number of units activated for a resistance level
pub fn unit_count(resistance: Resistance, dice: &mut dyn Dice) -> usize {
    let roll = dice.d6() as usize;
    match resistance {
        Resistance::Light => 2 + usize::from(roll >= 4),
        Resistance::Medium => 3 + usize::from(roll >= 4),
        Resistance::Heavy => 4 + (roll - 1) / 2,
    }
}

/// Unit class from the mission's d10 activation table
pub fn roll_unit_class(mission: MissionType, dice: &mut dyn Dice) -> UnitClass {
    let roll = dice.d10();
    match mission {
        MissionType::Advance => match roll {
            1..=2 => UnitClass::Lw,
            3 => UnitClass::Mg,
            4..=5 => UnitClass::AtGun,
            6 => UnitClass::Truck,
            7 => UnitClass::Apc,
            8 => UnitClass::Ac,
            9 => UnitClass::Spg,
            _ => UnitClass::Tank,
        },
        MissionType::Battle => match roll {
            1 => UnitClass::Lw,
            2 => UnitClass::Mg,
            3..=4 => UnitClass::AtGun,
            5 => UnitClass::Apc,
            6 => UnitClass::Ac,
            7..=8 => UnitClass::Spg,
            _ => UnitClass::Tank,
        },
        MissionType::Counterattack => match roll {
            1 => UnitClass::Lw,
            2 => UnitClass::Mg,
            3 => UnitClass::AtGun,
            4 => UnitClass::Apc,
            5 => UnitClass::Ac,
            6..=7 => UnitClass::Spg,
            _ => UnitClass::Tank,
        },
    }
}

fn at_gun(roll: u8) -> (GunType, &'static str) {
    match roll {
        1..=2 => (GunType::Gun50L, "PaK 38"),
        3..=5 => (GunType::Gun75L, "PaK 40"),
        _ => (GunType::Gun88L, "PaK 43"),
    }
}

fn vehicle_name(class: UnitClass, dice: &mut dyn Dice) -> Option<&'static str> {
    let name = match class {
        UnitClass::Tank => match dice.d10() {
            1..=4 => catalog::PZ_IV_H,
            5..=7 => catalog::PANTHER,
            8..=9 => catalog::TIGER,
            _ => catalog::KING_TIGER,
        },
        UnitClass::Spg => match dice.d6() {
            1..=2 => catalog::STUG_III_G,
            3 => catalog::MARDER_II,
            4 => catalog::MARDER_III_H,
            5 => catalog::JGDPZ_IV,
            _ => catalog::JGDPZ_38T,
        },
        UnitClass::Apc => catalog::SPW_251,
        UnitClass::Ac => catalog::PSW_232,
        UnitClass::Truck => catalog::OPEL_TRUCK,
        _ => return None,
    };
    Some(name)
}

fn infantry_terrain(roll: u8) -> Terrain {
    match roll {
        1..=3 => Terrain::Open,
        4..=5 => Terrain::Woods,
        6 => Terrain::Hedgerow,
        7 => Terrain::WoodenBuilding,
        8 => Terrain::StoneBuilding,
        9 => Terrain::Fortification,
        _ => Terrain::Woods,
    }
}

fn vehicle_terrain(roll: u8) -> Terrain {
    match roll {
        1..=5 => Terrain::Open,
        6..=8 => Terrain::Woods,
        _ => Terrain::Hedgerow,
    }
}

/// Morale value from a 2D6 roll at spawn
pub fn morale_from_roll(total: i32) -> u8 {
    match total {
        i32::MIN..=3 => 10,
        4..=6 => 9,
        7..=9 => 8,
        _ => 7,
    }
}

fn roll_morale(dice: &mut dyn Dice) -> u8 {
    morale_from_roll(dice.two_d6().total())
}

/// Spawn one unit of a given class at a random map position
///
/// Draw order: type, sector, band, hex, terrain, facing, morale, hidden.
pub fn spawn_unit(id: UnitId, class: UnitClass, map: &EncounterMap, dice: &mut dyn Dice) -> HostileUnit {
    let mut unit = match class {
        UnitClass::AtGun => {
            let (gun, name) = at_gun(dice.d6());
            HostileUnit::new(id, class, name, map.close_hex(0), RangeBand::Close, 0).with_gun(gun)
        }
        UnitClass::Mg | UnitClass::Lw => {
            let name = if class == UnitClass::Mg {
                "MG Team"
            } else {
                "Rifle Squad"
            };
            HostileUnit::new(id, class, name, map.close_hex(0), RangeBand::Close, 0)
        }
        _ => {
            let name = vehicle_name(class, dice).unwrap_or(catalog::OPEL_TRUCK);
            let spec = catalog::lookup(name)
                .unwrap_or_else(|e| panic!("spawn table names a missing vehicle: {}", e));
            HostileUnit::new(id, class, name, map.close_hex(0), RangeBand::Close, 0).with_spec(spec)
        }
    };

    let sector = dice.d6() - 1;
    let band = match dice.d6() {
        1 => RangeBand::Close,
        2..=3 => RangeBand::Medium,
        _ => RangeBand::Long,
    };
    let hexes = map.hexes_in(band, sector);
    let pick = (dice.d6() as usize - 1) % hexes.len().max(1);
    let hex = hexes.get(pick).copied().unwrap_or_else(|| map.close_hex(sector));
    unit.hex = hex;
    unit.band = band;
    unit.sector = sector;

    unit.terrain = if class.is_vehicle() {
        vehicle_terrain(dice.d10())
    } else {
        infantry_terrain(dice.d10())
    };
    unit.emplaced = class == UnitClass::AtGun;

    if class.has_facing() {
        unit.facing = match dice.d6() {
            1..=3 => Facing::Front,
            4..=5 => Facing::Side,
            _ => Facing::Rear,
        };
    }
    unit.morale = roll_morale(dice);
    unit.hidden = dice.d6() == 6;
    unit.carrying_infantry = class == UnitClass::Apc;

    tracing::debug!(
        "Spawned {} at {} range, sector {}",
        unit.label(),
        band.name(),
        sector
    );
    unit
}

/// Roll the whole enemy force for an encounter; ids start at `first_id`
pub fn spawn_units(
    mission: MissionType,
    resistance: Resistance,
    map: &EncounterMap,
    first_id: u32,
    dice: &mut dyn Dice,
) -> Vec<HostileUnit> {
    let count = unit_count(resistance, dice);
    (0..count)
        .map(|i| {
            let class = roll_unit_class(mission, dice);
            spawn_unit(UnitId(first_id + i as u32), class, map, dice)
        })
        .collect()
}

/// Infantry section climbing out of an APC into the same hex
pub fn dismount_squad(id: UnitId, apc: &HostileUnit, dice: &mut dyn Dice) -> HostileUnit {
    let mut squad = HostileUnit::new(id, UnitClass::Lw, "Rifle Squad", apc.hex, apc.band, apc.sector);
    squad.terrain = apc.terrain;
    squad.spotted = apc.spotted;
    squad.identified = apc.spotted;
    squad.morale = roll_morale(dice);
    squad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::{ScriptedDice, SeededDice};

    #[test]
    fn test_unit_counts() {
        assert_eq!(unit_count(Resistance::Light, &mut ScriptedDice::new([3])), 2);
        assert_eq!(unit_count(Resistance::Light, &mut ScriptedDice::new([4])), 3);
        assert_eq!(unit_count(Resistance::Medium, &mut ScriptedDice::new([6])), 4);
        assert_eq!(unit_count(Resistance::Heavy, &mut ScriptedDice::new([1])), 4);
        assert_eq!(unit_count(Resistance::Heavy, &mut ScriptedDice::new([6])), 6);
    }

    #[test]
    fn test_class_tables() {
        let mut dice = ScriptedDice::new([10, 1, 8]);
        assert_eq!(roll_unit_class(MissionType::Advance, &mut dice), UnitClass::Tank);
        assert_eq!(roll_unit_class(MissionType::Battle, &mut dice), UnitClass::Lw);
        assert_eq!(roll_unit_class(MissionType::Counterattack, &mut dice), UnitClass::Tank);
    }

    #[test]
    fn test_morale_table() {
        assert_eq!(morale_from_roll(2), 10);
        assert_eq!(morale_from_roll(6), 9);
        assert_eq!(morale_from_roll(9), 8);
        assert_eq!(morale_from_roll(12), 7);
    }

    #[test]
    fn test_spawn_at_gun() {
        let map = EncounterMap::new();
        // gun 4 (PaK 40), sector 2 -> index 1, band 2 Medium, hex 1,
        // terrain 8 stone building, facing 5 side, morale 3+3 -> 9, hidden 6
        let mut dice = ScriptedDice::new([4, 2, 2, 1, 8, 5, 3, 3, 6]);
        let unit = spawn_unit(UnitId(7), UnitClass::AtGun, &map, &mut dice);
        assert_eq!(unit.gun, Some(GunType::Gun75L));
        assert_eq!(unit.band, RangeBand::Medium);
        assert_eq!(unit.sector, 1);
        assert_eq!(map.band_of(unit.hex), Some(RangeBand::Medium));
        assert_eq!(map.sector_of(unit.hex), Some(1));
        assert_eq!(unit.terrain, Terrain::StoneBuilding);
        assert!(unit.emplaced);
        assert_eq!(unit.facing, Facing::Side);
        assert_eq!(unit.morale, 9);
        assert!(unit.hidden);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_spawned_units_sit_on_their_band_and_sector() {
        let map = EncounterMap::new();
        let mut dice = SeededDice::new(42);
        for mission in [MissionType::Advance, MissionType::Battle, MissionType::Counterattack] {
            let units = spawn_units(mission, Resistance::Heavy, &map, 1, &mut dice);
            assert!((4..=6).contains(&units.len()));
            for unit in &units {
                assert_eq!(map.band_of(unit.hex), Some(unit.band));
                assert_eq!(map.sector_of(unit.hex), Some(unit.sector));
                if unit.class.is_soft() {
                    assert_eq!(unit.armour(crate::core::types::HitLocation::Hull), None);
                }
            }
        }
    }
}
