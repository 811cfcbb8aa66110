//! Hostile unit actions: morale, movement and fire on the player and friendly forces

use tracing::debug;

use crate::combat::ift::{resolve_ift, roll_ift, IftInput, IftOutcome, IftWeapon};
use crate::combat::modifiers::{RollKind, RollRecord};
use crate::combat::to_hit::{resolve_to_hit, roll_to_hit, FiringMotion, ToHitInput};
use crate::combat::to_kill::{resolve_hit_location, resolve_to_kill, roll_to_kill, ToKillInput};
use crate::core::types::{Facing, HitLocation, RangeBand, Terrain, UnitId};
use crate::damage::{resolve_penetration, wound_check, WoundCause};
use crate::encounter::context::EncounterContext;
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::hostile::ai::{choose_action, AiAction};
use crate::hostile::morale::morale_recovery;
use crate::hostile::spawn::dismount_squad;
use crate::hostile::unit::{HostileUnit, UnitClass, UnitFate};
use crate::map::hex::rotate_sector;
use crate::vehicle::spec::{AmmoType, FireMode, GunType};
use crate::vehicle::tank::AcquiredTarget;

/// An armoured car keeps calling out the player on 1D6 at or below this
pub const KEEP_SPOTTING_D6: u8 = 4;

/// Friendly infantry or armour is lost on 1D6 at or below this
pub const FRIENDLY_LOSS_D6: u8 = 2;

/// An attack on friendly armour switches to the player on 1D6 at or below this
pub const RETARGET_D6: u8 = 2;

/// How a unit can hurt the player tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerAttack {
    Gun(GunType),
    Panzerfaust,
    /// Small arms against crew with their heads out
    SmallArms { firepower: u8 },
    /// Armoured car calling out the tank's position
    Spot,
}

fn player_attack(ctx: &EncounterContext, unit: &HostileUnit) -> Option<PlayerAttack> {
    if !ctx.in_weather_range(unit.band) {
        return None;
    }
    if unit.class == UnitClass::Ac {
        return Some(PlayerAttack::Spot);
    }
    if let Some(gun) = unit.gun.filter(|g| *g != GunType::Panzerfaust) {
        return Some(PlayerAttack::Gun(gun));
    }
    if unit.class == UnitClass::Lw && unit.band == RangeBand::Close {
        return Some(PlayerAttack::Panzerfaust);
    }
    let exposed = ctx.tank.crew.iter().any(|m| m.is_exposed());
    match unit.mg_firepower() {
        Some(firepower) if exposed && unit.band <= RangeBand::Medium => {
            Some(PlayerAttack::SmallArms { firepower })
        }
        _ => None,
    }
}

fn dismounts(unit: &HostileUnit) -> bool {
    unit.class == UnitClass::Apc && unit.carrying_infantry && unit.band <= RangeBand::Medium
}

/// Situational checks on top of `unit_allows`
fn action_legal(ctx: &EncounterContext, unit: &HostileUnit, action: AiAction) -> bool {
    match action {
        AiAction::Idle | AiAction::Lateral | AiAction::Retreat => true,
        AiAction::Approach => dismounts(unit) || unit.band.closer().is_some(),
        AiAction::AttackSoft => unit.gun.is_some() || unit.mg_firepower().is_some(),
        AiAction::AttackArmour => unit.gun.is_some(),
        AiAction::AttackPlayer => player_attack(ctx, unit).is_some(),
    }
}

impl Encounter {
    pub(crate) fn phase_enemy_action(&mut self) {
        let ambush_bonus = if self.ctx.ambushed && self.ctx.round == 1 {
            self.ctx.config.ambush_bonus
        } else {
            0
        };
        for id in self.ctx.live_ids() {
            if self.ctx.tank_lost() {
                break;
            }
            self.unit_action(id, ambush_bonus);
        }
    }

    fn unit_action(&mut self, id: UnitId, ambush_bonus: u8) {
        let Some(unit) = self.ctx.unit_mut(id).filter(|u| u.alive) else {
            return;
        };

        if let Some((recovered, record)) = morale_recovery(unit, self.dice.as_mut()) {
            let label = unit.label();
            self.record(record);
            if !recovered {
                return;
            }
            self.event(EncounterEventType::UnitRecovered { unit_id: id }, format!("{} recovers", label));
        }

        let Some(unit) = self.ctx.unit_mut(id) else {
            return;
        };
        if unit.spotting_player {
            let roll = self.dice.d6();
            let keep = roll <= KEEP_SPOTTING_D6;
            unit.spotting_player = keep;
            let record = RollRecord::simple(
                RollKind::Spotting,
                unit.label(),
                "Player tank",
                KEEP_SPOTTING_D6 as i32,
                vec![roll],
                if keep { "Keeps spotting" } else { "Loses contact" },
            );
            self.record(record);
            if keep {
                return;
            }
        }

        let ctx = &self.ctx;
        let Some(unit) = ctx.unit(id) else {
            return;
        };
        let choice = choose_action(
            unit,
            ctx.scenario.mission,
            ambush_bonus,
            ctx.config.ai_max_attempts,
            self.dice.as_mut(),
            |action| action_legal(ctx, unit, action),
        );
        if !choice.settled {
            debug!("{} found no legal action in {} draw(s)", unit.label(), choice.rolls.len());
        }

        match choice.action {
            AiAction::Idle => {}
            AiAction::Approach => self.enemy_approach(id),
            AiAction::Lateral => self.enemy_lateral(id),
            AiAction::Retreat => self.enemy_retreat(id),
            AiAction::AttackSoft => self.enemy_attack_friendly(id, false),
            AiAction::AttackArmour => self.enemy_attack_armour(id),
            AiAction::AttackPlayer => self.enemy_attack_player(id),
        }
    }

    fn mark_fired(&mut self, id: UnitId) {
        if let Some(unit) = self.ctx.unit_mut(id) {
            unit.fired_this_round = true;
            unit.hidden = false;
        }
    }

    // ===== MOVEMENT =====

    /// Move a unit to the nearest hex of a band and sector
    fn relocate(&mut self, id: UnitId, band: RangeBand, sector: u8) {
        let Some(unit) = self.ctx.units.iter_mut().find(|u| u.id == id) else {
            return;
        };
        let from = unit.hex;
        let Some(hex) = self
            .ctx
            .map
            .hexes_in(band, sector)
            .into_iter()
            .min_by_key(|h| h.distance(&from))
        else {
            return;
        };
        unit.move_to(hex, band, sector);
        let description = format!("{} moves to {} range, sector {}", unit.label(), band.name(), sector);
        self.event(EncounterEventType::UnitMoved { unit_id: id }, description);
    }

    fn enemy_approach(&mut self, id: UnitId) {
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        if !dismounts(unit) {
            if let Some(band) = unit.band.closer() {
                let sector = unit.sector;
                self.relocate(id, band, sector);
            }
            return;
        }

        let apc = unit.clone();
        let squad_id = self.ctx.allocate_id();
        let squad = dismount_squad(squad_id, &apc, self.dice.as_mut());
        let description = format!("{} dismounts from {}", squad.label(), apc.label());
        if let Some(apc) = self.ctx.unit_mut(id) {
            apc.carrying_infantry = false;
        }
        self.ctx.add_units(vec![squad]);
        self.event(EncounterEventType::Reinforcement { unit_id: squad_id }, description);
    }

    fn enemy_lateral(&mut self, id: UnitId) {
        let steps = if self.dice.d6() <= 3 { 1 } else { -1 };
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let (band, sector) = (unit.band, rotate_sector(unit.sector, steps));
        self.relocate(id, band, sector);
    }

    fn enemy_retreat(&mut self, id: UnitId) {
        let Some(unit) = self.ctx.unit_mut(id) else {
            return;
        };
        match unit.band.further() {
            Some(band) => {
                let sector = unit.sector;
                self.relocate(id, band, sector);
            }
            None => {
                unit.eliminate(UnitFate::LeftMap);
                let label = unit.label();
                self.event(EncounterEventType::UnitLeftMap { unit_id: id }, format!("{} leaves the area", label));
            }
        }
    }

    // ===== FRIENDLY FORCES =====

    fn enemy_attack_friendly(&mut self, id: UnitId, armour: bool) {
        let roll = self.dice.d6();
        let lost = roll <= FRIENDLY_LOSS_D6;
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let label = unit.label();
        let target = if armour { "Friendly armour" } else { "Friendly infantry" };
        let record = RollRecord::simple(
            RollKind::ToHit,
            label.clone(),
            target,
            FRIENDLY_LOSS_D6 as i32,
            vec![roll],
            if lost { "Destroyed" } else { "No Effect" },
        );
        self.record(record);
        self.mark_fired(id);
        if !lost {
            return;
        }
        if armour {
            self.ctx.stats.friendly_armour_lost += 1;
        } else {
            self.ctx.stats.friendly_infantry_lost += 1;
        }
        self.event(
            EncounterEventType::FriendlyLoss,
            format!("{} knocks out {}", label, target.to_lowercase()),
        );
    }

    fn enemy_attack_armour(&mut self, id: UnitId) {
        let roll = self.dice.d6();
        let can_switch = self
            .ctx
            .unit(id)
            .is_some_and(|u| player_attack(&self.ctx, u).is_some());
        if roll <= RETARGET_D6 && can_switch {
            debug!("Unit {} switches fire to the player tank", id);
            self.enemy_attack_player(id);
        } else {
            self.enemy_attack_friendly(id, true);
        }
    }

    // ===== ATTACKS ON THE PLAYER =====

    fn enemy_attack_player(&mut self, id: UnitId) {
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let Some(attack) = player_attack(&self.ctx, unit) else {
            return;
        };
        let label = unit.label();

        if unit.class == UnitClass::AtGun && unit.facing != Facing::Front {
            if let Some(gun) = self.ctx.unit_mut(id) {
                gun.facing = Facing::Front;
            }
            self.event(EncounterEventType::UnitMoved { unit_id: id }, format!("{} turns to face the tank", label));
            return;
        }

        match attack {
            PlayerAttack::Spot => {
                if let Some(unit) = self.ctx.unit_mut(id) {
                    unit.spotting_player = true;
                }
                self.event(
                    EncounterEventType::PlayerSpotted { unit_id: id },
                    format!("{} is spotting the tank", label),
                );
                return;
            }
            PlayerAttack::Gun(gun) => self.enemy_gun_attack(id, gun, AmmoType::Ap),
            PlayerAttack::Panzerfaust => self.enemy_gun_attack(id, GunType::Panzerfaust, AmmoType::Pf),
            PlayerAttack::SmallArms { firepower } => self.enemy_small_arms(id, firepower),
        }
        self.mark_fired(id);
    }

    fn enemy_gun_attack(&mut self, id: UnitId, gun: GunType, ammo: AmmoType) {
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let tank = &self.ctx.tank;
        let mut input = ToHitInput::basic(gun, ammo, FireMode::Direct, unit.band, true);
        input.target_size = Some(tank.spec.size);
        input.target_moving = tank.moving;
        input.smoke_factors = self.ctx.map.smoke_between(unit.hex);
        input.weather = self.ctx.scenario.weather;
        input.acquired = unit.acquired;
        if unit.moving {
            input.motion = FiringMotion::Moving {
                gyrostabilizer_activated: false,
            };
        }
        let mut res = resolve_to_hit(&input);
        if unit.class != UnitClass::Ac && self.ctx.spotter_active() {
            res.push("Armoured car spotting", -1);
        }
        let (label, band, sector) = (unit.label(), unit.band, unit.sector);
        let tank_name = tank.spec.name.clone();

        let shot = roll_to_hit(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(
            RollKind::ToHit,
            label.clone(),
            tank_name.clone(),
            &res,
            shot.roll.faces(),
            shot.outcome_text(),
        );
        self.record(record);
        if let Some(unit) = self.ctx.unit_mut(id) {
            unit.acquired = (unit.acquired + 1).min(AcquiredTarget::MAX_LEVEL);
        }
        if !shot.hit {
            return;
        }
        self.ctx.stats.hits_taken += 1;

        let (location, face) = resolve_hit_location(self.ctx.tank.hull_down, self.dice.as_mut());
        let record = RollRecord::simple(RollKind::HitLocation, label.clone(), tank_name.clone(), 0, vec![face], location.name());
        self.record(record);
        match location {
            HitLocation::Miss => {
                debug!("Shot from {} strikes the cover in front of the hull", label);
                return;
            }
            HitLocation::Track => {
                let tank = &mut self.ctx.tank;
                if !tank.immobilized {
                    tank.immobilized = true;
                    tank.moving = false;
                    self.event(EncounterEventType::TankImmobilized, format!("Track hit from {}", label));
                }
                return;
            }
            HitLocation::Turret | HitLocation::Hull => {}
        }

        let tank = &self.ctx.tank;
        let facing = tank.facing_towards(sector, location);
        let input = ToKillInput {
            gun,
            ammo,
            range: band,
            location,
            facing,
            armour: tank.spec.armour.value(location, facing),
            critical: shot.critical,
        };
        let res = resolve_to_kill(&input);
        let kill = roll_to_kill(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(
            RollKind::ToKill,
            label.clone(),
            tank_name,
            &res,
            kill.dice(),
            kill.outcome_text(),
        );
        self.record(record);

        if kill.kill {
            let report = resolve_penetration(
                &mut self.ctx.tank,
                location,
                facing,
                kill.critical,
                &label,
                self.dice.as_mut(),
            );
            self.report_penetration(report);
        } else {
            self.event(EncounterEventType::TankHit, format!("Hit by {}: armour saved", label));
        }
    }

    /// Small arms fire at the first crew member with an open hatch
    fn enemy_small_arms(&mut self, id: UnitId, firepower: u8) {
        let crew = &self.ctx.tank.crew;
        let Some(member) = crew.iter().find(|m| m.is_exposed()) else {
            return;
        };
        let (position, target) = (member.position, member.name.clone());
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let mut input = IftInput::new(IftWeapon::Mg { firepower }, unit.band, FireMode::Direct, Terrain::Open);
        input.attacker_moving = unit.moving;
        let label = unit.label();

        let res = resolve_ift(&input);
        let (outcome, roll) = roll_ift(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(RollKind::Ift, label, target, &res, roll.faces(), outcome.text());
        self.record(record);
        if outcome == IftOutcome::NoEffect {
            return;
        }

        let bonus = self.ctx.tank.leadership_bonus;
        let Some(member) = self.ctx.tank.crew.get_mut(position) else {
            return;
        };
        let report = wound_check(member, WoundCause::Collateral, bonus, self.dice.as_mut());
        self.record_all(report.records);
        self.report_wound(position, report.result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, Resistance};
    use crate::damage::WoundResult;
    use crate::encounter::context::Scenario;
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;
    use crate::vehicle::crew::{CrewPosition, Hatch};
    use crate::vehicle::tank::PlayerTank;

    fn encounter(unit: HostileUnit, faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        ctx.add_units(vec![unit]);
        Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)))
    }

    fn unit(class: UnitClass, band: RangeBand) -> HostileUnit {
        HostileUnit::new(UnitId(1), class, class.name(), HexCoord::new(0, -1), band, 4)
    }

    #[test]
    fn test_pinned_unit_fails_recovery_and_waits() {
        let mut mg = unit(UnitClass::Mg, RangeBand::Close);
        mg.pinned = true;
        mg.morale = 7;
        let mut encounter = encounter(mg, vec![6, 6]);
        encounter.phase_enemy_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert!(unit.pinned);
        assert!(!unit.fired_this_round);
    }

    #[test]
    fn test_recovered_unit_goes_on_to_act() {
        // 2+2 recovers against morale 10, 70 draws Attack Soft, 1 knocks out infantry
        let mut mg = unit(UnitClass::Mg, RangeBand::Medium);
        mg.pinned = true;
        mg.morale = 10;
        let mut encounter = encounter(mg, vec![2, 2, 70, 1]);
        encounter.phase_enemy_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert!(!unit.pinned);
        assert!(unit.fired_this_round);
        assert_eq!(encounter.ctx.stats.friendly_infantry_lost, 1);
        assert!(encounter
            .events()
            .iter()
            .any(|e| e.event_type == EncounterEventType::UnitRecovered { unit_id: UnitId(1) }));
    }

    #[test]
    fn test_armoured_car_keeps_spotting() {
        let mut car = unit(UnitClass::Ac, RangeBand::Medium)
            .with_spec(catalog::lookup(catalog::PSW_232).unwrap());
        car.spotting_player = true;
        let mut encounter = encounter(car, vec![4]);
        encounter.phase_enemy_action();
        assert!(encounter.ctx.spotter_active());
    }

    #[test]
    fn test_approach_from_close_is_redrawn() {
        // 35 draws Approach, illegal at Close; 5 settles on Idle
        let squad = unit(UnitClass::Lw, RangeBand::Close);
        let mut encounter = encounter(squad, vec![35, 5]);
        encounter.phase_enemy_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.band, RangeBand::Close);
        assert!(!unit.moving);
    }

    #[test]
    fn test_retreat_from_long_leaves_the_map() {
        let squad = unit(UnitClass::Lw, RangeBand::Long);
        let mut encounter = encounter(squad, vec![65]);
        encounter.phase_enemy_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.fate, Some(UnitFate::LeftMap));
        assert_eq!(encounter.ctx.live_count(), 0);
    }

    #[test]
    fn test_apc_dismounts_its_squad() {
        let mut apc = unit(UnitClass::Apc, RangeBand::Medium).with_spec(catalog::lookup(catalog::SPW_251).unwrap());
        apc.carrying_infantry = true;
        let mut encounter = encounter(apc, vec![40, 3, 4]);
        encounter.phase_enemy_action();
        assert_eq!(encounter.ctx.live_count(), 2);
        assert!(!encounter.ctx.unit(UnitId(1)).unwrap().carrying_infantry);
        let squad = encounter.ctx.unit(UnitId(2)).unwrap();
        assert_eq!(squad.class, UnitClass::Lw);
        assert_eq!(squad.band, RangeBand::Medium);
    }

    #[test]
    fn test_mg_attacks_friendly_infantry() {
        let mg = unit(UnitClass::Mg, RangeBand::Medium);
        let mut encounter = encounter(mg, vec![70, 1]);
        encounter.phase_enemy_action();
        assert_eq!(encounter.ctx.stats.friendly_infantry_lost, 1);
        assert!(encounter.ctx.unit(UnitId(1)).unwrap().fired_this_round);
    }

    #[test]
    fn test_at_gun_turns_before_firing() {
        let mut gun = unit(UnitClass::AtGun, RangeBand::Close).with_gun(GunType::Gun75L);
        gun.facing = Facing::Side;
        let mut encounter = encounter(gun, vec![100]);
        encounter.phase_enemy_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.facing, Facing::Front);
        assert!(!unit.fired_this_round);
    }

    #[test]
    fn test_gun_hit_saved_by_hull_front() {
        // To-Hit 10 needs 3; hull hit; To-Kill 9 - 8 + 1 = 2 fails on 12
        let tank = unit(UnitClass::Tank, RangeBand::Close).with_gun(GunType::Gun50L);
        let mut encounter = encounter(tank, vec![100, 1, 2, 3, 6, 6]);
        encounter.phase_enemy_action();
        assert_eq!(encounter.ctx.stats.hits_taken, 1);
        assert!(!encounter.ctx.knocked_out);
        assert_eq!(encounter.ctx.unit(UnitId(1)).unwrap().acquired, 1);
        assert!(encounter
            .events()
            .iter()
            .any(|e| e.event_type == EncounterEventType::TankHit && e.description.contains("armour saved")));
    }

    #[test]
    fn test_mg_needs_exposed_crew_and_wounds_them() {
        let mg = unit(UnitClass::Mg, RangeBand::Close);
        let mut encounter = encounter(mg, vec![95, 1, 1, 3, 3]);
        encounter.ctx.tank.crew.get_mut(CrewPosition::Commander).unwrap().hatch = Hatch::Open;
        encounter.phase_enemy_action();
        let commander = encounter.ctx.tank.crew.get(CrewPosition::Commander).unwrap();
        assert_eq!(commander.wound, crate::vehicle::crew::WoundLevel::Light);
        assert!(encounter.events().iter().any(|e| matches!(
            e.event_type,
            EncounterEventType::CrewWounded {
                position: CrewPosition::Commander,
                result: WoundResult::Light
            }
        )));
    }
}
