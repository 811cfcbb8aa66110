//! Tank movement, pivots and turret traverse

use tracing::debug;

use crate::combat::constants::{
    BOG_THRESHOLD, HULL_DOWN_TARGET, MOVE_RANGE_CHANGE_D6, PIVOT_LOSE_HULL_DOWN_D6, UNBOG_TARGET,
};
use crate::combat::modifiers::{Modifier, RollKind, RollRecord};
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::map::hex::rotate_sector;
use crate::vehicle::crew::{CrewPosition, Hatch};
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::SkillKind;

/// Sectors within one step of the hull front make up the front arc
fn in_front_arc(hull_facing: u8, sector: u8) -> bool {
    let diff = (sector as i32 - hull_facing as i32).rem_euclid(6);
    matches!(diff, 0 | 1 | 5)
}

fn modified_total(faces: &[u8], modifiers: &[Modifier]) -> i32 {
    faces.iter().map(|f| *f as i32).sum::<i32>() + modifiers.iter().map(|m| m.value).sum::<i32>()
}

impl Encounter {
    pub(crate) fn phase_movement(&mut self) {
        let order = self.ctx.tank.crew.order_of(CrewPosition::Driver);
        match order {
            CrewOrder::Stop => {
                self.ctx.tank.moving = false;
                debug!("Tank stops");
            }
            CrewOrder::Forward
            | CrewOrder::ForwardToHullDown
            | CrewOrder::Reverse
            | CrewOrder::ReverseToHullDown => self.drive(order),
            CrewOrder::AttemptUnbog => self.attempt_unbog(),
            _ => {}
        }
    }

    fn driver_name(&self) -> String {
        self.ctx
            .tank
            .crew
            .get(CrewPosition::Driver)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| self.ctx.tank.spec.name.clone())
    }

    fn driver_hatch_open(&self) -> bool {
        self.ctx
            .tank
            .crew
            .get(CrewPosition::Driver)
            .is_some_and(|m| m.hatch == Hatch::Open)
    }

    fn commander_directs_movement(&self) -> bool {
        self.ctx.tank.crew.order_of(CrewPosition::Commander) == CrewOrder::DirectMovement
    }

    fn drive(&mut self, order: CrewOrder) {
        let tank = &self.ctx.tank;
        if tank.bogged || tank.immobilized {
            return;
        }
        let bonus = tank.leadership_bonus;
        let from_stop = !tank.moving;
        let driver = self.driver_name();

        // ===== BOG CHECK =====
        let mut threshold = BOG_THRESHOLD;
        if self.ctx.scenario.weather.soft_ground() {
            threshold -= 1;
        }
        let mut modifiers = Vec::new();
        if self.commander_directs_movement() {
            modifiers.push(Modifier::new("Commander directing movement", -1));
            let crew = &self.ctx.tank.crew;
            if crew.skill_check(CrewPosition::Commander, SkillKind::DriverDirection, bonus, self.dice.as_mut()) {
                modifiers.push(Modifier::new("Driver Direction", -1));
            }
        }
        let roll = self.dice.two_d6();
        let bogged = modified_total(&roll.faces(), &modifiers) >= threshold;
        let record = RollRecord::simple(
            RollKind::Movement,
            driver.clone(),
            "Bog Check",
            threshold,
            roll.faces(),
            if bogged { "Bogged Down" } else { "Moved" },
        )
        .with_modifiers(modifiers);
        self.record(record);

        let tank = &mut self.ctx.tank;
        tank.acquired.reset();
        if bogged {
            tank.bogged = true;
            tank.moving = false;
            tank.hull_down = false;
            self.event(EncounterEventType::TankBogged, "Tank bogged down".into());
            return;
        }
        tank.moving = true;
        tank.hull_down = false;

        // ===== HULL DOWN =====
        if matches!(order, CrewOrder::ForwardToHullDown | CrewOrder::ReverseToHullDown) {
            let mut modifiers = Vec::new();
            let crew = &self.ctx.tank.crew;
            if self.driver_hatch_open()
                && crew.skill_check(CrewPosition::Driver, SkillKind::EyeForCover, bonus, self.dice.as_mut())
            {
                modifiers.push(Modifier::new("Eye for Cover", -1));
            }
            let roll = self.dice.two_d6();
            let success = modified_total(&roll.faces(), &modifiers) <= HULL_DOWN_TARGET;
            self.ctx.tank.hull_down = success;
            let record = RollRecord::simple(
                RollKind::Movement,
                driver.clone(),
                "Hull Down",
                HULL_DOWN_TARGET,
                roll.faces(),
                if success { "Hull Down" } else { "No Cover Found" },
            )
            .with_modifiers(modifiers);
            self.record(record);
        }

        // ===== RANGE CHANGES =====
        let forward = matches!(order, CrewOrder::Forward | CrewOrder::ForwardToHullDown);
        let crew = &self.ctx.tank.crew;
        let drag_racer =
            from_stop && crew.skill_check(CrewPosition::Driver, SkillKind::DragRacer, bonus, self.dice.as_mut());
        let chance = if drag_racer {
            MOVE_RANGE_CHANGE_D6 + 1
        } else {
            MOVE_RANGE_CHANGE_D6
        };
        let hull_facing = self.ctx.tank.hull_facing;

        for id in self.ctx.live_ids() {
            let Some(unit) = self.ctx.unit_mut(id) else {
                continue;
            };
            unit.acquired = 0;
            let closing = in_front_arc(hull_facing, unit.sector) == forward;
            let roll = self.dice.d6();
            let Some(unit) = self.ctx.unit(id) else {
                continue;
            };
            let new_band = if roll <= chance {
                if closing {
                    unit.band.closer()
                } else {
                    unit.band.further()
                }
            } else {
                None
            };
            let outcome = match new_band {
                Some(band) => format!("Now at {} range", band.name()),
                None => "No change".to_string(),
            };
            let record = RollRecord::simple(
                RollKind::Movement,
                driver.clone(),
                unit.label(),
                chance as i32,
                vec![roll],
                outcome,
            );
            self.record(record);

            let Some(band) = new_band else {
                continue;
            };
            let Some(unit) = self.ctx.units.iter_mut().find(|u| u.id == id) else {
                continue;
            };
            let from = unit.hex;
            let Some(hex) = self
                .ctx
                .map
                .hexes_in(band, unit.sector)
                .into_iter()
                .min_by_key(|h| h.distance(&from))
            else {
                continue;
            };
            let was_moving = unit.moving;
            unit.move_to(hex, band, unit.sector);
            unit.moving = was_moving;
            unit.hidden = false;
            let description = format!("{} now at {} range", unit.label(), band.name());
            self.event(EncounterEventType::UnitMoved { unit_id: id }, description);
        }
    }

    fn attempt_unbog(&mut self) {
        let tank = &self.ctx.tank;
        if !tank.bogged || tank.immobilized {
            return;
        }
        let mut modifiers = Vec::new();
        if tank.crew.get(CrewPosition::Driver).is_some_and(|m| m.buttoned_up()) {
            modifiers.push(Modifier::new("Driver buttoned up", 1));
        }
        let commander_open = tank
            .crew
            .get(CrewPosition::Commander)
            .is_some_and(|m| m.hatch == Hatch::Open);
        if self.commander_directs_movement() && commander_open {
            modifiers.push(Modifier::new("Commander directing from open hatch", -1));
        }
        let bonus = tank.leadership_bonus;
        if self.driver_hatch_open()
            && tank
                .crew
                .skill_check(CrewPosition::Driver, SkillKind::ToughMudder, bonus, self.dice.as_mut())
        {
            modifiers.push(Modifier::new("Tough Mudder", -1));
        }
        let roll = self.dice.two_d6();
        let freed = modified_total(&roll.faces(), &modifiers) <= UNBOG_TARGET;
        let record = RollRecord::simple(
            RollKind::Movement,
            self.driver_name(),
            "Unbog",
            UNBOG_TARGET,
            roll.faces(),
            if freed { "Unbogged" } else { "Still Bogged" },
        )
        .with_modifiers(modifiers);
        self.record(record);
        if freed {
            self.ctx.tank.bogged = false;
        }
    }

    /// Turn the hull to face `sector`, carrying the turret round with it
    pub(crate) fn pivot_tank(&mut self, sector: u8) {
        let tank = &mut self.ctx.tank;
        let delta = sector as i32 - tank.hull_facing as i32;
        tank.hull_facing = sector;
        tank.turret_facing = rotate_sector(tank.turret_facing, delta);
        tank.moving = true;
        tank.acquired.reset();
        self.gunnery.pivoted = true;
        debug!("Tank pivots to sector {}", sector);

        if self.ctx.tank.hull_down {
            let roll = self.dice.d6();
            let lost = roll <= PIVOT_LOSE_HULL_DOWN_D6;
            if lost {
                self.ctx.tank.hull_down = false;
            }
            let record = RollRecord::simple(
                RollKind::Movement,
                self.driver_name(),
                "Pivot",
                PIVOT_LOSE_HULL_DOWN_D6 as i32,
                vec![roll],
                if lost { "Hull Down Lost" } else { "Still Hull Down" },
            );
            self.record(record);
        }
    }

    /// Traverse the turret by `steps` sectors; returns the new facing
    pub(crate) fn traverse_turret(&mut self, steps: i32) -> u8 {
        let tank = &mut self.ctx.tank;
        tank.turret_facing = rotate_sector(tank.turret_facing, steps);
        tank.turret_rotated = true;
        tank.acquired.reset();
        tank.turret_facing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{Ground, MissionType, Nation, RangeBand, Resistance, UnitId, Weather};
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::hostile::unit::{HostileUnit, UnitClass};
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;
    use crate::vehicle::tank::PlayerTank;

    fn encounter(weather: Weather, faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario =
            Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa).with_weather(weather);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        let mut squad = HostileUnit::new(
            UnitId(1),
            UnitClass::Lw,
            "Rifle Squad",
            HexCoord::new(0, -2),
            RangeBand::Medium,
            4,
        );
        squad.hidden = true;
        ctx.add_units(vec![squad]);
        Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)))
    }

    fn order_driver(encounter: &mut Encounter, order: CrewOrder) {
        encounter.ctx.tank.crew.get_mut(CrewPosition::Driver).unwrap().order = order;
    }

    #[test]
    fn test_front_arc() {
        assert!(in_front_arc(4, 4));
        assert!(in_front_arc(4, 3));
        assert!(in_front_arc(0, 5));
        assert!(!in_front_arc(4, 1));
        assert!(!in_front_arc(4, 2));
    }

    #[test]
    fn test_stop_order_halts_tank() {
        let mut encounter = encounter(Weather::clear(), vec![]);
        encounter.ctx.tank.moving = true;
        order_driver(&mut encounter, CrewOrder::Stop);
        encounter.phase_movement();
        assert!(!encounter.ctx.tank.moving);
    }

    #[test]
    fn test_forward_brings_front_units_closer() {
        // bog 1+1, range change 1
        let mut encounter = encounter(Weather::clear(), vec![1, 1, 1]);
        encounter.ctx.tank.hull_down = true;
        order_driver(&mut encounter, CrewOrder::Forward);
        encounter.phase_movement();
        let tank = &encounter.ctx.tank;
        assert!(tank.moving);
        assert!(!tank.hull_down);
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.band, RangeBand::Close);
        assert_eq!(unit.hex, HexCoord::new(0, -1));
        assert!(!unit.hidden);
        assert!(!unit.moving);
    }

    #[test]
    fn test_mud_bogs_on_ten() {
        let mud = Weather {
            ground: Ground::Mud,
            ..Weather::clear()
        };
        let mut encounter = encounter(mud, vec![5, 5]);
        order_driver(&mut encounter, CrewOrder::Forward);
        encounter.phase_movement();
        assert!(encounter.ctx.tank.bogged);
        assert!(!encounter.ctx.tank.moving);
        assert_eq!(encounter.ctx.unit(UnitId(1)).unwrap().band, RangeBand::Medium);
        assert!(encounter
            .events()
            .iter()
            .any(|e| e.event_type == EncounterEventType::TankBogged));
    }

    #[test]
    fn test_reverse_to_hull_down_opens_range() {
        // bog 1+1, hull down 3+3, range change 2
        let mut encounter = encounter(Weather::clear(), vec![1, 1, 3, 3, 2]);
        order_driver(&mut encounter, CrewOrder::ReverseToHullDown);
        encounter.phase_movement();
        assert!(encounter.ctx.tank.hull_down);
        assert_eq!(encounter.ctx.unit(UnitId(1)).unwrap().band, RangeBand::Long);
    }

    #[test]
    fn test_pivot_carries_turret_and_can_lose_hull_down() {
        let mut encounter = encounter(Weather::clear(), vec![3]);
        encounter.ctx.tank.hull_down = true;
        encounter.ctx.tank.turret_facing = 5;
        encounter.pivot_tank(1);
        let tank = &encounter.ctx.tank;
        assert_eq!(tank.hull_facing, 1);
        assert_eq!(tank.turret_facing, 2);
        assert!(!tank.hull_down);
        assert!(encounter.gunnery.pivoted);
    }

    #[test]
    fn test_unbog_with_buttoned_driver() {
        // 1+2 +1 buttoned = 4
        let mut encounter = encounter(Weather::clear(), vec![1, 2]);
        encounter.ctx.tank.bogged = true;
        order_driver(&mut encounter, CrewOrder::AttemptUnbog);
        encounter.phase_movement();
        assert!(!encounter.ctx.tank.bogged);
        let record = encounter.log.rolls().last().unwrap();
        assert_eq!(record.total_modifier, 1);
    }

    fn give_driver(encounter: &mut Encounter, kind: SkillKind) {
        let driver = encounter.ctx.tank.crew.get_mut(CrewPosition::Driver).unwrap();
        driver.skills.push(crate::vehicle::skills::Skill::new(kind, 0));
    }

    #[test]
    fn test_drag_racer_only_from_a_stop() {
        // already moving: bog 1+1, range change 3 misses without the skill roll
        let mut moving = encounter(Weather::clear(), vec![1, 1, 3]);
        give_driver(&mut moving, SkillKind::DragRacer);
        moving.ctx.tank.moving = true;
        order_driver(&mut moving, CrewOrder::Forward);
        moving.phase_movement();
        assert_eq!(moving.ctx.unit(UnitId(1)).unwrap().band, RangeBand::Medium);

        // from a stop: bog 1+1, Drag Racer 5, range change 3 now closes
        let mut stopped = encounter(Weather::clear(), vec![1, 1, 5, 3]);
        give_driver(&mut stopped, SkillKind::DragRacer);
        stopped.ctx.tank.moving = false;
        order_driver(&mut stopped, CrewOrder::Forward);
        stopped.phase_movement();
        assert_eq!(stopped.ctx.unit(UnitId(1)).unwrap().band, RangeBand::Close);
    }

    #[test]
    fn test_eye_for_cover_needs_an_open_hatch() {
        // buttoned: bog 1+1, hull down 4+3 fails, range change 6
        let mut buttoned = encounter(Weather::clear(), vec![1, 1, 4, 3, 6]);
        give_driver(&mut buttoned, SkillKind::EyeForCover);
        order_driver(&mut buttoned, CrewOrder::ForwardToHullDown);
        buttoned.phase_movement();
        assert!(!buttoned.ctx.tank.hull_down);

        // open hatch: Eye for Cover 1 turns the same 7 into 6
        let mut open = encounter(Weather::clear(), vec![1, 1, 1, 4, 3, 6]);
        give_driver(&mut open, SkillKind::EyeForCover);
        open.ctx.tank.crew.get_mut(CrewPosition::Driver).unwrap().hatch = Hatch::Open;
        order_driver(&mut open, CrewOrder::ForwardToHullDown);
        open.phase_movement();
        assert!(open.ctx.tank.hull_down);
    }

    #[test]
    fn test_tough_mudder_helps_unbog_not_bog() {
        // bog 5+6 with Tough Mudder held: no skill roll, still bogged
        let mut driving = encounter(Weather::clear(), vec![5, 6]);
        give_driver(&mut driving, SkillKind::ToughMudder);
        order_driver(&mut driving, CrewOrder::Forward);
        driving.phase_movement();
        assert!(driving.ctx.tank.bogged);

        // open hatch: Tough Mudder 2, then 2+3 -1 = 4 frees the tank
        let mut stuck = encounter(Weather::clear(), vec![2, 2, 3]);
        give_driver(&mut stuck, SkillKind::ToughMudder);
        stuck.ctx.tank.bogged = true;
        stuck.ctx.tank.crew.get_mut(CrewPosition::Driver).unwrap().hatch = Hatch::Open;
        order_driver(&mut stuck, CrewOrder::AttemptUnbog);
        stuck.phase_movement();
        assert!(!stuck.ctx.tank.bogged);
        let record = stuck.log.rolls().last().unwrap();
        assert_eq!(record.total_modifier, -1);
    }

    #[test]
    fn test_turret_traverse_wraps() {
        let mut encounter = encounter(Weather::clear(), vec![]);
        encounter.ctx.tank.turret_facing = 5;
        assert_eq!(encounter.traverse_turret(1), 0);
        assert!(encounter.ctx.tank.turret_rotated);
    }
}
