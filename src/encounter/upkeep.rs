//! Smoke, restocking, crew recovery, repairs and end-of-round bookkeeping

use tracing::debug;

use crate::core::types::UnitId;
use crate::damage::{attempt_repair, recovery_check, RepairHelp, RepairOutcome};
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::map::hex::HexCoord;
use crate::vehicle::crew::CrewPosition;
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::{SkillKind, BATTLE_LEADERSHIP_BONUS};
use crate::vehicle::spec::AmmoType;

impl Encounter {
    // ===== SMOKE AND RESTOCK =====

    pub(crate) fn phase_smoke_and_restock(&mut self) {
        let crew = &self.ctx.tank.crew;
        let loader = crew.order_of(CrewPosition::Loader);
        let throwers: Vec<CrewPosition> = [CrewPosition::Commander, CrewPosition::Loader]
            .into_iter()
            .filter(|p| crew.order_of(*p) == CrewOrder::ThrowSmokeGrenade)
            .collect();

        if loader == CrewOrder::FireSmokeMortar && self.ctx.tank.spec.smoke_mortar && self.ctx.tank.smoke_bombs > 0 {
            self.ctx.tank.smoke_bombs -= 1;
            let hex = self.ctx.map.close_hex(self.ctx.tank.turret_facing);
            self.place_smoke(hex, "Smoke mortar fired");
        }

        for _ in throwers {
            if self.ctx.tank.smoke_grenades == 0 {
                break;
            }
            self.ctx.tank.smoke_grenades -= 1;
            self.place_smoke(HexCoord::ORIGIN, "Smoke grenade thrown");
        }

        if loader == CrewOrder::RestockReadyRack {
            let ammo = &mut self.ctx.tank.ammo;
            let space = ammo.ready_rack_capacity();
            let mut order: Vec<AmmoType> = ammo.reload.into_iter().collect();
            order.extend([AmmoType::Ap, AmmoType::He]);
            let moved: u16 = order.into_iter().map(|a| ammo.restock_ready_rack(a, space)).sum();
            debug!("Ready rack restocked with {} round(s)", moved);
        }
    }

    fn place_smoke(&mut self, hex: HexCoord, description: &str) {
        if self.ctx.map.add_smoke(hex, 1) {
            self.event(EncounterEventType::SmokePlaced { factors: 1 }, description.to_string());
        }
    }

    // ===== CREW RECOVERY =====

    pub(crate) fn phase_crew_recovery(&mut self) {
        for position in self.ctx.tank.crew.positions() {
            let Some(member) = self.ctx.tank.crew.get_mut(position) else {
                continue;
            };
            let Some(record) = recovery_check(member, self.dice.as_mut()) else {
                continue;
            };
            let recovered = !member.stunned && !member.unconscious;
            let name = member.name.clone();
            self.record(record);
            if recovered {
                self.event(EncounterEventType::CrewRecovered { position }, format!("{} recovers", name));
            }
        }
    }

    // ===== REPAIRS =====

    pub(crate) fn phase_repairs(&mut self) {
        let helping = self.ctx.tank.crew.order_of(CrewPosition::Gunner) == CrewOrder::HelpRepair;
        for position in self.ctx.tank.crew.positions() {
            let tank = &self.ctx.tank;
            let Some(member) = tank.crew.get(position).filter(|m| m.can_act()) else {
                continue;
            };
            let Some(kind) = member.order.repairs().filter(|k| tank.damage.contains(*k)) else {
                continue;
            };
            let name = member.name.clone();
            let help = RepairHelp {
                mechanic: member.skill_check(SkillKind::Mechanic, tank.leadership_bonus, self.dice.as_mut()),
                help_repair: helping,
            };
            let (outcome, record) = attempt_repair(&mut self.ctx.tank.damage, kind, help, &name, self.dice.as_mut());
            self.record(record);
            match outcome {
                RepairOutcome::Repaired => {
                    self.event(EncounterEventType::Repaired { damage: kind }, format!("{} repaired", kind.name()));
                }
                RepairOutcome::Broken(broken) => {
                    self.event(EncounterEventType::Malfunction { damage: broken }, broken.name().to_string());
                }
                RepairOutcome::NoChange => {}
            }
        }
    }

    // ===== END OF ROUND =====

    pub(crate) fn phase_end_of_round(&mut self) {
        let threshold = self.ctx.config.smoke_dispersal_threshold;
        let weather = self.ctx.scenario.weather;
        let removed = self.ctx.map.disperse_smoke(threshold, &weather, self.dice.as_mut());
        if removed > 0 {
            debug!("{} smoke factor(s) dispersed", removed);
        }

        let tank = &mut self.ctx.tank;
        tank.start_round();
        tank.moving = false;
        for unit in self.ctx.units.iter_mut().filter(|u| u.alive) {
            unit.start_round();
        }
        self.gunnery.start_round();
        let ctx = &self.ctx;
        let alive = |target: &UnitId| ctx.unit(*target).is_some_and(|u| u.alive);
        self.gunnery.target = self.gunnery.target.filter(alive);
        self.gunnery.mg_target = self.gunnery.mg_target.filter(alive);

        let crew = &self.ctx.tank.crew;
        if crew.skill_check(CrewPosition::Commander, SkillKind::BattleLeadership, 0, self.dice.as_mut()) {
            self.ctx.tank.leadership_bonus = BATTLE_LEADERSHIP_BONUS;
            debug!("Battle Leadership active for the next round");
        }
        self.ctx.round += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, RangeBand, Resistance, UnitId};
    use crate::damage::DamageKind;
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::hostile::unit::{HostileUnit, UnitClass};
    use crate::vehicle::ammo::AmmoStores;
    use crate::vehicle::catalog;
    use crate::vehicle::tank::PlayerTank;

    fn encounter(faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        ctx.add_units(vec![HostileUnit::new(
            UnitId(1),
            UnitClass::Mg,
            "MG Team",
            HexCoord::new(0, -2),
            RangeBand::Medium,
            4,
        )]);
        Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)))
    }

    fn order(encounter: &mut Encounter, position: CrewPosition, order: CrewOrder) {
        encounter.ctx.tank.crew.get_mut(position).unwrap().order = order;
    }

    #[test]
    fn test_mortar_smokes_close_hex_of_turret_sector() {
        let mut encounter = encounter(vec![]);
        order(&mut encounter, CrewPosition::Loader, CrewOrder::FireSmokeMortar);
        encounter.phase_smoke_and_restock();
        assert_eq!(encounter.ctx.tank.smoke_bombs, 14);
        let hex = encounter.ctx.map.close_hex(4);
        assert_eq!(encounter.ctx.map.smoke_at(hex), 1);
    }

    #[test]
    fn test_grenades_smoke_player_hex() {
        let mut encounter = encounter(vec![]);
        order(&mut encounter, CrewPosition::Commander, CrewOrder::ThrowSmokeGrenade);
        order(&mut encounter, CrewPosition::Loader, CrewOrder::ThrowSmokeGrenade);
        encounter.ctx.tank.smoke_grenades = 1;
        encounter.phase_smoke_and_restock();
        assert_eq!(encounter.ctx.tank.smoke_grenades, 0);
        assert_eq!(encounter.ctx.map.smoke_at(HexCoord::ORIGIN), 1);
    }

    #[test]
    fn test_restock_fills_with_reload_type_first() {
        let mut encounter = encounter(vec![]);
        let mut stores = AmmoStores::empty(8);
        stores.stow(AmmoType::He, 5);
        stores.stow(AmmoType::Ap, 10);
        stores.reload = Some(AmmoType::He);
        encounter.ctx.tank.ammo = stores;
        order(&mut encounter, CrewPosition::Loader, CrewOrder::RestockReadyRack);
        encounter.phase_smoke_and_restock();
        let ammo = &encounter.ctx.tank.ammo;
        assert_eq!(ammo.ready(AmmoType::He), 5);
        assert_eq!(ammo.ready(AmmoType::Ap), 3);
    }

    #[test]
    fn test_stunned_crew_recover() {
        let mut encounter = encounter(vec![4, 4]);
        encounter.ctx.tank.crew.get_mut(CrewPosition::Driver).unwrap().stunned = true;
        encounter.phase_crew_recovery();
        assert!(encounter.ctx.tank.crew.can_act(CrewPosition::Driver));
        assert!(encounter.events().iter().any(|e| matches!(
            e.event_type,
            EncounterEventType::CrewRecovered {
                position: CrewPosition::Driver
            }
        )));
    }

    #[test]
    fn test_loader_repairs_main_gun() {
        let mut encounter = encounter(vec![1, 2]);
        encounter.ctx.tank.damage.add(DamageKind::MainGunMalfunction);
        order(&mut encounter, CrewPosition::Loader, CrewOrder::RepairMainGun);
        encounter.phase_repairs();
        assert!(!encounter.ctx.tank.damage.contains(DamageKind::MainGunMalfunction));
        assert!(encounter.ctx.tank.main_gun_operational());
    }

    #[test]
    fn test_end_of_round_rolls_flags_forward() {
        let mut encounter = encounter(vec![1]);
        encounter.ctx.map.add_smoke(HexCoord::ORIGIN, 1);
        encounter.ctx.tank.moving = true;
        encounter.ctx.tank.turret_rotated = true;
        encounter.ctx.unit_mut(UnitId(1)).unwrap().fired_this_round = true;
        encounter.gunnery.shots = 2;
        encounter.phase_end_of_round();
        assert_eq!(encounter.round(), 2);
        assert_eq!(encounter.ctx.map.smoke_at(HexCoord::ORIGIN), 0);
        assert!(!encounter.ctx.tank.moving);
        assert!(!encounter.ctx.tank.turret_rotated);
        assert!(encounter.ctx.unit(UnitId(1)).unwrap().fired_last_round);
        assert_eq!(encounter.gunnery.shots, 0);
    }
}
