//! Spot sectors and the spotting roll

use crate::combat::constants::{spot_number, IDENTIFY_MARGIN};
use crate::combat::modifiers::{Resolution, ResolutionKind, RollKind, RollRecord};
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::map::hex::rotate_sector;
use crate::vehicle::crew::{CrewPosition, Hatch};
use crate::vehicle::skills::SkillKind;
use crate::vehicle::tank::PlayerTank;

fn sectors_apart(a: u8, b: u8) -> u8 {
    let diff = (a as i32 - b as i32).rem_euclid(6) as u8;
    diff.min(6 - diff)
}

/// Sectors a crew position can watch from where it sits
///
/// An open hatch or a vision cupola gives the commander all-round vision.
/// The gunner only looks down the gun.
pub fn spot_sector_allowed(tank: &PlayerTank, position: CrewPosition, sector: u8) -> bool {
    if sector > 5 {
        return false;
    }
    match position {
        CrewPosition::Commander => {
            let all_round = tank.spec.vision_cupola
                || tank.crew.get(position).is_some_and(|m| m.hatch == Hatch::Open);
            all_round || sectors_apart(sector, tank.turret_facing) <= 1
        }
        CrewPosition::Gunner => sector == tank.turret_facing,
        CrewPosition::Loader => sectors_apart(sector, tank.turret_facing) <= 1,
        CrewPosition::Driver | CrewPosition::AssistantDriver => sectors_apart(sector, tank.hull_facing) <= 1,
    }
}

/// Sector a position watches unless told otherwise
pub fn default_spot_sector(tank: &PlayerTank, position: CrewPosition) -> u8 {
    match position {
        CrewPosition::Commander | CrewPosition::Gunner => tank.turret_facing,
        CrewPosition::Loader => rotate_sector(tank.turret_facing, 1),
        CrewPosition::Driver => tank.hull_facing,
        CrewPosition::AssistantDriver => rotate_sector(tank.hull_facing, -1),
    }
}

impl Encounter {
    pub(crate) fn assign_default_spot_sectors(&mut self) {
        let tank = &mut self.ctx.tank;
        let defaults: Vec<(CrewPosition, u8)> = tank
            .crew
            .positions()
            .into_iter()
            .map(|p| (p, default_spot_sector(tank, p)))
            .collect();
        for (position, sector) in defaults {
            if let Some(member) = tank.crew.get_mut(position) {
                member.spot_sector = Some(sector);
            }
        }
    }

    /// Every crew member free to look rolls for each unseen unit in their sector
    pub(crate) fn phase_spotting(&mut self) {
        let spotters: Vec<(CrewPosition, u8)> = self
            .ctx
            .tank
            .crew
            .iter()
            .filter(|m| m.can_act() && m.order.spots())
            .filter_map(|m| m.spot_sector.map(|s| (m.position, s)))
            .collect();

        for (position, sector) in spotters {
            for id in self.ctx.live_ids() {
                let Some(unit) = self.ctx.unit(id) else {
                    continue;
                };
                if unit.hidden || unit.sector != sector || !self.ctx.in_weather_range(unit.band) {
                    continue;
                }
                let needs_identify = unit.class.is_vehicle() && !unit.identified;
                if unit.spotted && !needs_identify {
                    continue;
                }
                let Some(member) = self.ctx.tank.crew.get(position) else {
                    continue;
                };

                let mut res = Resolution::new(ResolutionKind::ToHit, spot_number(unit.band));
                if member.hatch == Hatch::Open {
                    res.push("Hatch open", -1);
                }
                let bonus = self.ctx.tank.leadership_bonus;
                if member.skill_check(SkillKind::EagleEyed, bonus, self.dice.as_mut()) {
                    res.push("Eagle Eyed", -1);
                }
                if unit.fired_last_round {
                    res.push("Fired last round", -1);
                }

                let roll = self.dice.two_d6();
                let spotted = roll.total() <= res.required;
                let identified = roll.total() <= res.required - IDENTIFY_MARGIN;
                let outcome = if identified {
                    "Identified"
                } else if spotted {
                    "Spotted"
                } else {
                    "Not spotted"
                };
                let old_label = unit.label();
                let spotter = member.name.clone();
                let record = RollRecord::from_resolution(
                    RollKind::Spotting,
                    spotter.clone(),
                    old_label.clone(),
                    &res,
                    roll.faces(),
                    outcome,
                );
                self.record(record);

                let Some(unit) = self.ctx.unit_mut(id) else {
                    continue;
                };
                if spotted && !unit.spotted {
                    unit.spotted = true;
                    self.event(
                        EncounterEventType::UnitSpotted { unit_id: id },
                        format!("{} spots {}", spotter, old_label),
                    );
                }
                let Some(unit) = self.ctx.unit_mut(id) else {
                    continue;
                };
                if identified && !unit.identified {
                    unit.identified = true;
                    let label = unit.label();
                    self.event(
                        EncounterEventType::UnitIdentified { unit_id: id },
                        format!("{} identified as {}", old_label, label),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, RangeBand, Resistance, UnitId};
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::encounter::phase::Phase;
    use crate::hostile::unit::{HostileUnit, UnitClass};
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;

    fn encounter(unit: HostileUnit, faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        ctx.add_units(vec![unit]);
        let mut encounter = Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)));
        encounter.phase = Phase::Spotting;
        encounter
    }

    fn tiger_at_medium() -> HostileUnit {
        HostileUnit::new(UnitId(1), UnitClass::Tank, "Tank", HexCoord::new(0, -2), RangeBand::Medium, 4)
            .with_spec(catalog::lookup(catalog::TIGER).unwrap())
    }

    #[test]
    fn test_sector_limits() {
        let mut tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        assert!(spot_sector_allowed(&tank, CrewPosition::Commander, 5));
        assert!(!spot_sector_allowed(&tank, CrewPosition::Commander, 1));
        tank.crew.get_mut(CrewPosition::Commander).unwrap().hatch = Hatch::Open;
        assert!(spot_sector_allowed(&tank, CrewPosition::Commander, 1));
        assert!(spot_sector_allowed(&tank, CrewPosition::Gunner, 4));
        assert!(!spot_sector_allowed(&tank, CrewPosition::Gunner, 3));
        assert!(spot_sector_allowed(&tank, CrewPosition::Driver, 5));
        assert!(!spot_sector_allowed(&tank, CrewPosition::Driver, 1));
        assert!(!spot_sector_allowed(&tank, CrewPosition::Loader, 6));
    }

    #[test]
    fn test_low_roll_identifies_and_stops_further_rolls() {
        // commander 2+1 = 3 <= 6 - 3
        let mut encounter = encounter(tiger_at_medium(), vec![2, 1]);
        encounter.phase_spotting();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert!(unit.spotted);
        assert!(unit.identified);
        assert_eq!(encounter.log.rolls().count(), 1);
    }

    #[test]
    fn test_spotted_vehicle_keeps_rolling_to_identify() {
        // commander 3+2 = 5 spots, gunner 1+1 identifies
        let mut encounter = encounter(tiger_at_medium(), vec![3, 2, 1, 1]);
        encounter.phase_spotting();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert!(unit.spotted && unit.identified);
    }

    #[test]
    fn test_open_hatch_and_firing_help() {
        let mut unit = tiger_at_medium();
        unit.fired_last_round = true;
        // commander 4+4 = 8 against 6 +1 hatch +1 fired = 8
        let mut encounter = encounter(unit, vec![4, 4, 6, 6, 6, 6]);
        encounter.ctx.tank.crew.get_mut(CrewPosition::Commander).unwrap().hatch = Hatch::Open;
        encounter.phase_spotting();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert!(unit.spotted);
        assert!(!unit.identified);
        let first = encounter.log.rolls().next().unwrap();
        assert_eq!(first.required, 8);
    }

    #[test]
    fn test_hidden_units_are_not_rolled_for() {
        let mut unit = tiger_at_medium();
        unit.hidden = true;
        let mut encounter = encounter(unit, vec![]);
        encounter.phase_spotting();
        assert!(!encounter.ctx.unit(UnitId(1)).unwrap().spotted);
    }
}
