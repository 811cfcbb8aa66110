//! Machine gun fire against soft targets

use crate::combat::ift::{resolve_ift, roll_ift, IftInput, IftOutcome, IftWeapon, MgDirection};
use crate::combat::modifiers::{RollKind, RollRecord};
use crate::core::types::{RangeBand, UnitId};
use crate::encounter::commands::CommandRejected;
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::vehicle::crew::{CrewPosition, Hatch};
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::SkillKind;
use crate::vehicle::spec::FireMode;
use crate::vehicle::tank::MgMount;

impl Encounter {
    /// Crew member manning a mount this round, if anyone is
    pub fn mg_gunner(&self, mount: MgMount) -> Option<CrewPosition> {
        let crew = &self.ctx.tank.crew;
        let ordered = |position: CrewPosition, order: CrewOrder| crew.order_of(position) == order;
        match mount {
            MgMount::Coax => ordered(CrewPosition::Gunner, CrewOrder::FireCoaxMg).then_some(CrewPosition::Gunner),
            MgMount::Bow => ordered(CrewPosition::AssistantDriver, CrewOrder::FireBowMg)
                .then_some(CrewPosition::AssistantDriver),
            MgMount::Aa => [CrewPosition::Commander, CrewPosition::Loader]
                .into_iter()
                .find(|p| ordered(*p, CrewOrder::FireAaMg)),
        }
    }

    pub(crate) fn mg_orders_present(&self) -> bool {
        MgMount::ALL
            .iter()
            .any(|m| self.ctx.tank.mg_operational(*m) && self.mg_gunner(*m).is_some())
    }

    /// Soft targets a mount can reach this round
    pub fn mg_targets(&self, mount: MgMount) -> Vec<UnitId> {
        let tank = &self.ctx.tank;
        self.ctx
            .live_units()
            .filter(|u| u.is_targetable() && u.class.is_soft() && self.ctx.in_weather_range(u.band))
            .filter(|u| match mount {
                MgMount::Coax => tank.in_turret_arc(u.sector) && u.band <= RangeBand::Medium,
                MgMount::Bow => tank.in_hull_arc(u.sector) && u.band == RangeBand::Close && !tank.hull_down,
                MgMount::Aa => u.band <= RangeBand::Medium,
            })
            .map(|u| u.id)
            .collect()
    }

    pub(crate) fn shoot_active_mg(&mut self) -> Result<IftOutcome, CommandRejected> {
        let tank = &self.ctx.tank;
        let mount = tank
            .active_mg
            .ok_or(CommandRejected::Unavailable("no machine gun selected"))?;
        let firepower = match tank.mg_firepower(mount) {
            Some(fp) if tank.mg_operational(mount) => fp,
            _ => return Err(CommandRejected::Unavailable("that machine gun is out of action")),
        };
        if tank.mgs_fired.contains(&mount) {
            return Err(CommandRejected::Unavailable("that machine gun has already fired this round"));
        }
        let position = self
            .mg_gunner(mount)
            .ok_or(CommandRejected::Unavailable("nobody is ordered to fire that machine gun"))?;
        let Some(gunner) = tank.crew.get(position) else {
            return Err(CommandRejected::NoCrewMember(position));
        };
        if mount == MgMount::Aa && gunner.hatch != Hatch::Open {
            return Err(CommandRejected::Unavailable("the AA gunner must be out of the hatch"));
        }
        let target = self.gunnery.mg_target.ok_or(CommandRejected::NoTarget)?;
        if !self.mg_targets(mount).contains(&target) {
            return Err(CommandRejected::NoTarget);
        }
        let Some(unit) = self.ctx.unit(target) else {
            return Err(CommandRejected::NoTarget);
        };

        let bonus = tank.leadership_bonus;
        let crew = &tank.crew;
        let mut direction = MgDirection::default();
        let directing_order = match mount {
            MgMount::Coax => Some(CrewOrder::DirectCoaxMgFire),
            MgMount::Bow => Some(CrewOrder::DirectBowMgFire),
            MgMount::Aa => None,
        };
        if directing_order.is_some_and(|o| crew.order_of(CrewPosition::Commander) == o) {
            direction.commander_directing = true;
            direction.fire_direction_skill =
                crew.skill_check(CrewPosition::Commander, SkillKind::FireDirection, bonus, self.dice.as_mut());
        }
        match mount {
            MgMount::Coax => direction.coax_after_rotation = tank.turret_rotated,
            MgMount::Bow => {
                direction.apprentice_gunner =
                    gunner.skill_check(SkillKind::ApprenticeGunner, bonus, self.dice.as_mut());
            }
            MgMount::Aa => {}
        }

        let mut input = IftInput::new(IftWeapon::Mg { firepower }, unit.band, FireMode::Direct, unit.terrain);
        input.emplaced = unit.emplaced;
        input.target_moving = unit.moving;
        input.attacker_moving = tank.moving;
        input.direction = direction;
        let label = unit.label();
        let firer = gunner.name.clone();

        let res = resolve_ift(&input);
        let (rolled, roll) = roll_ift(&res, self.dice.as_mut());
        let malfunction = roll.is_double_six();
        let outcome = if malfunction { IftOutcome::NoEffect } else { rolled };
        let text = if malfunction {
            format!("{} Malfunction", mount.name())
        } else {
            outcome.text().to_string()
        };
        let record = RollRecord::from_resolution(RollKind::Ift, firer.clone(), label, &res, roll.faces(), text);
        self.record(record);

        self.ctx.tank.mgs_fired.push(mount);
        self.ctx.stats.mg_bursts += 1;
        if malfunction {
            let damage = mount.malfunction();
            self.ctx.tank.damage.add(damage);
            self.event(
                EncounterEventType::Malfunction { damage },
                format!("{} malfunction", mount.name()),
            );
            return Ok(outcome);
        }
        self.apply_ift_outcome(target, outcome, &firer);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, Resistance};
    use crate::damage::DamageKind;
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::encounter::phase::Phase;
    use crate::hostile::unit::{HostileUnit, UnitClass, UnitFate};
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;
    use crate::vehicle::tank::PlayerTank;

    fn encounter(unit: HostileUnit, faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        ctx.add_units(vec![unit]);
        let mut encounter = Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)));
        encounter.phase = Phase::MgFire;
        encounter.gunnery.mg_target = Some(UnitId(1));
        encounter
    }

    fn squad_at_close() -> HostileUnit {
        let mut unit = HostileUnit::new(UnitId(1), UnitClass::Lw, "Rifle Squad", HexCoord::new(0, -1), RangeBand::Close, 4);
        unit.spotted = true;
        unit
    }

    fn order(encounter: &mut Encounter, position: CrewPosition, order: CrewOrder) {
        encounter.ctx.tank.crew.get_mut(position).unwrap().order = order;
    }

    #[test]
    fn test_orders_present_only_with_a_gunner() {
        let mut encounter = encounter(squad_at_close(), vec![]);
        assert!(!encounter.mg_orders_present());
        order(&mut encounter, CrewPosition::Loader, CrewOrder::FireAaMg);
        assert_eq!(encounter.mg_gunner(MgMount::Aa), Some(CrewPosition::Loader));
        assert!(encounter.mg_orders_present());
    }

    #[test]
    fn test_coax_burst_destroys_and_fires_once() {
        // firepower 4 +3 at Close = 7
        let mut encounter = encounter(squad_at_close(), vec![1, 1]);
        order(&mut encounter, CrewPosition::Gunner, CrewOrder::FireCoaxMg);
        assert_eq!(encounter.fire_active_mg(), Ok(IftOutcome::Destroyed));
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.fate, Some(UnitFate::DestroyedByPlayer));
        assert_eq!(encounter.ctx.stats.mg_bursts, 1);
        assert_eq!(
            encounter.fire_active_mg(),
            Err(CommandRejected::Unavailable("that machine gun has already fired this round"))
        );
    }

    #[test]
    fn test_double_six_jams_the_mount() {
        let mut encounter = encounter(squad_at_close(), vec![6, 6]);
        order(&mut encounter, CrewPosition::Gunner, CrewOrder::FireCoaxMg);
        assert_eq!(encounter.fire_active_mg(), Ok(IftOutcome::NoEffect));
        assert!(encounter.ctx.tank.damage.contains(DamageKind::CoaxMgMalfunction));
        assert!(encounter.ctx.unit(UnitId(1)).unwrap().alive);
    }

    #[test]
    fn test_bow_mg_masked_when_hull_down() {
        let mut encounter = encounter(squad_at_close(), vec![]);
        order(&mut encounter, CrewPosition::AssistantDriver, CrewOrder::FireBowMg);
        encounter.ctx.tank.active_mg = Some(MgMount::Bow);
        assert_eq!(encounter.mg_targets(MgMount::Bow), vec![UnitId(1)]);
        encounter.ctx.tank.hull_down = true;
        assert_eq!(encounter.fire_active_mg(), Err(CommandRejected::NoTarget));
    }

    #[test]
    fn test_armour_is_not_an_mg_target() {
        let mut unit = HostileUnit::new(UnitId(1), UnitClass::Tank, "Tank", HexCoord::new(0, -1), RangeBand::Close, 4)
            .with_spec(catalog::lookup(catalog::PZ_IV_H).unwrap());
        unit.spotted = true;
        let encounter = encounter(unit, vec![]);
        assert!(encounter.mg_targets(MgMount::Coax).is_empty());
        assert!(encounter.mg_targets(MgMount::Aa).is_empty());
    }

    #[test]
    fn test_aa_gunner_must_open_hatch() {
        let mut encounter = encounter(squad_at_close(), vec![1, 1]);
        order(&mut encounter, CrewPosition::Commander, CrewOrder::FireAaMg);
        encounter.ctx.tank.active_mg = Some(MgMount::Aa);
        assert!(encounter.fire_active_mg().is_err());
        encounter.ctx.tank.crew.get_mut(CrewPosition::Commander).unwrap().hatch = Hatch::Open;
        assert_eq!(encounter.fire_active_mg(), Ok(IftOutcome::Destroyed));
    }
}
