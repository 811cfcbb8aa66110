//! Main gun fire, Rate of Fire and resolution of the hits it scored

use tracing::debug;

use crate::combat::ift::{resolve_ift, roll_ift, IftInput, IftOutcome, IftWeapon};
use crate::combat::modifiers::{Resolution, ResolutionKind, RollKind, RollRecord};
use crate::combat::to_hit::{resolve_to_hit, roll_to_hit, FireDirection, FiringMotion, ToHitInput, ToHitRoll};
use crate::combat::to_kill::{resolve_hit_location, resolve_to_kill, roll_to_kill, ToKillInput};
use crate::core::types::{HitLocation, UnitId};
use crate::damage::DamageKind;
use crate::encounter::commands::CommandRejected;
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::hostile::morale::{
    pin_test, stun_test, PinResult, CRITICAL_HIT_STUN_THRESHOLD, HE_HIT_STUN_THRESHOLD,
};
use crate::hostile::unit::{HitRecord, UnitFate};
use crate::vehicle::ammo::LoadSource;
use crate::vehicle::crew::CrewPosition;
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::SkillKind;
use crate::vehicle::spec::{AmmoType, FireMode};

/// Unmodified To-Hit roll that Knows Weak Spots turns into a critical hit
pub const WEAK_SPOT_ROLL: i32 = 3;

impl Encounter {
    /// Leaving Orders: the loader swaps the shell or fills an empty breech
    pub(crate) fn prepare_main_gun(&mut self) {
        if self.ctx.tank.spec.gun.is_none() {
            return;
        }
        let ammo = &mut self.ctx.tank.ammo;
        match self.ctx.tank.crew.order_of(CrewPosition::Loader) {
            CrewOrder::ChangeGunLoad => {
                if ammo.change_load().is_some() {
                    debug!("Loader changes the gun load to {:?}", ammo.loaded);
                }
            }
            CrewOrder::Reload if ammo.loaded.is_none() => {
                ammo.load();
            }
            _ => {}
        }
    }

    /// Live, spotted, visible units in the turret sector within weather range
    pub fn main_gun_targets(&self) -> Vec<UnitId> {
        let turret = self.ctx.tank.turret_facing;
        self.ctx
            .live_units()
            .filter(|u| u.is_targetable() && u.sector == turret && self.ctx.in_weather_range(u.band))
            .map(|u| u.id)
            .collect()
    }

    pub(crate) fn shoot_main_gun(&mut self) -> Result<ToHitRoll, CommandRejected> {
        let tank = &self.ctx.tank;
        if tank.crew.order_of(CrewPosition::Gunner) != CrewOrder::FireMainGun {
            return Err(CommandRejected::Unavailable("the gunner has no Fire Main Gun order"));
        }
        let gun = match tank.spec.gun {
            Some(gun) if tank.main_gun_operational() => gun,
            _ => return Err(CommandRejected::Unavailable("the main gun is out of action")),
        };
        if self.gunnery.shots > 0 && !self.gunnery.rof {
            return Err(CommandRejected::Unavailable("no Rate of Fire for another shot"));
        }
        let mode = self.gunnery.mode;
        if mode == FireMode::Direct && !tank.gun_sight_operational() {
            return Err(CommandRejected::Unavailable("direct fire needs a working gun sight"));
        }
        let ammo = tank
            .ammo
            .loaded
            .ok_or(CommandRejected::Unavailable("the main gun is not loaded"))?;
        if !ammo.allows(mode) {
            return Err(CommandRejected::Unavailable("the loaded round cannot fire in this mode"));
        }
        if tank.moving && !tank.crew.has_skill(CrewPosition::Gunner, SkillKind::Gyrostabilizer) {
            return Err(CommandRejected::Unavailable("firing on the move needs a Gyrostabilizer"));
        }
        let target = self.gunnery.target.ok_or(CommandRejected::NoTarget)?;
        if !self.main_gun_targets().contains(&target) {
            return Err(CommandRejected::NoTarget);
        }
        let Some(unit) = self.ctx.unit(target) else {
            return Err(CommandRejected::NoTarget);
        };

        // ===== TO-HIT =====
        let bonus = tank.leadership_bonus;
        let crew = &tank.crew;
        let tracking =
            unit.moving && crew.skill_check(CrewPosition::Gunner, SkillKind::TargetTracking, bonus, self.dice.as_mut());
        let motion = if tank.moving {
            FiringMotion::Moving {
                gyrostabilizer_activated: crew.skill_check(
                    CrewPosition::Gunner,
                    SkillKind::Gyrostabilizer,
                    bonus,
                    self.dice.as_mut(),
                ),
            }
        } else {
            FiringMotion::Stationary
        };
        let directing = crew.order_of(CrewPosition::Commander) == CrewOrder::DirectMainGunFire;
        let commander = FireDirection {
            directing,
            fire_direction_skill: directing
                && crew.skill_check(CrewPosition::Commander, SkillKind::FireDirection, bonus, self.dice.as_mut()),
            buttoned_without_cupola: !tank.spec.vision_cupola
                && crew.get(CrewPosition::Commander).is_some_and(|m| m.buttoned_up()),
        };
        let input = ToHitInput {
            gun,
            ammo,
            mode,
            range: unit.band,
            target_armoured: unit.is_armoured(),
            target_moving: unit.moving,
            target_tracking: tracking,
            target_size: unit.target_size(),
            terrain: unit.terrain,
            emplaced: unit.emplaced,
            smoke_factors: self.ctx.map.smoke_between(unit.hex),
            weather: self.ctx.scenario.weather,
            turret_rotated: tank.turret_rotated,
            motion,
            acquired: tank.acquired.level_for(target),
            commander,
        };
        let (label, hex, band) = (unit.label(), unit.hex, unit.band);
        let res = resolve_to_hit(&input);
        let mut shot = roll_to_hit(&res, self.dice.as_mut());
        if shot.hit
            && !shot.critical
            && shot.roll.total() == WEAK_SPOT_ROLL
            && crew.skill_check(CrewPosition::Gunner, SkillKind::KnowsWeakSpots, bonus, self.dice.as_mut())
        {
            debug!("Knows Weak Spots turns the hit critical");
            shot.critical = true;
        }

        let tank = &mut self.ctx.tank;
        tank.acquired.engage(target);
        tank.ammo.fire();
        let firer = tank.spec.name.clone();
        self.gunnery.shots += 1;
        self.ctx.stats.shots_fired += 1;
        let record = RollRecord::from_resolution(
            RollKind::ToHit,
            firer.clone(),
            label.clone(),
            &res,
            shot.roll.faces(),
            shot.outcome_text(),
        );
        self.record(record);

        if shot.malfunction {
            self.ctx.tank.damage.add(DamageKind::MainGunMalfunction);
            self.gunnery.rof = false;
            self.event(
                EncounterEventType::Malfunction {
                    damage: DamageKind::MainGunMalfunction,
                },
                "Main gun malfunction".into(),
            );
            return Ok(shot);
        }

        if shot.hit {
            self.ctx.stats.hits += 1;
            if ammo.is_smoke() {
                let factors = ammo.smoke_factors();
                self.ctx.map.add_smoke(hex, factors);
                self.event(
                    EncounterEventType::SmokePlaced { factors },
                    format!("{} smoke lands on {}", ammo.name(), label),
                );
                if ammo == AmmoType::Wp {
                    self.apply_ift_outcome(target, IftOutcome::PinTest, &firer);
                }
            } else if let Some(unit) = self.ctx.unit_mut(target) {
                unit.hits.push(HitRecord {
                    gun,
                    ammo,
                    mode,
                    range: band,
                    critical: shot.critical,
                });
            }
        }

        self.reload_after_shot();
        Ok(shot)
    }

    /// Loader refills the breech; a Reload order also rolls to keep Rate of Fire
    fn reload_after_shot(&mut self) {
        self.gunnery.rof = false;
        let loader_order = self.ctx.tank.crew.order_of(CrewPosition::Loader);
        if !matches!(loader_order, CrewOrder::Reload | CrewOrder::ChangeGunLoad) {
            return;
        }
        let tank = &mut self.ctx.tank;
        let bonus = tank.leadership_bonus;
        let juggled = tank.ammo.draws_from_ready_rack()
            && tank.ammo.reload.is_some_and(|a| tank.ammo.general(a) > 0)
            && tank
                .crew
                .skill_check(CrewPosition::Loader, SkillKind::ShellJuggler, bonus, self.dice.as_mut());
        let loaded = if juggled {
            tank.ammo.load_from_general()
        } else {
            tank.ammo.load()
        };
        let Some(source) = loaded else {
            debug!("No {:?} left to reload", tank.ammo.reload);
            return;
        };
        if loader_order != CrewOrder::Reload {
            return;
        }

        // ===== RATE OF FIRE =====
        let tank = &self.ctx.tank;
        let crew = &tank.crew;
        let mut res = Resolution::new(ResolutionKind::ToHit, tank.spec.rof as i32);
        if juggled {
            res.push("Ready rack (Shell Juggler)", -2);
        } else if source == LoadSource::ReadyRack {
            res.push("Ready rack", -2);
        }
        if crew.order_of(CrewPosition::AssistantDriver) == CrewOrder::PassAmmo {
            if crew.skill_check(CrewPosition::AssistantDriver, SkillKind::ShellTosser, bonus, self.dice.as_mut()) {
                res.push("Passing ammo (Shell Tosser)", -2);
            } else {
                res.push("Passing ammo", -1);
            }
        }
        if crew.skill_check(CrewPosition::Gunner, SkillKind::QuickTrigger, bonus, self.dice.as_mut()) {
            res.push("Quick Trigger", -1);
        }
        if crew.skill_check(CrewPosition::Loader, SkillKind::FastHands, bonus, self.dice.as_mut()) {
            res.push("Fast Hands", -1);
        }
        let roll = self.dice.two_d6();
        let compatible = tank.ammo.loaded.is_some_and(|a| a.allows(self.gunnery.mode));
        let rof = roll.total() <= res.required && compatible;
        let firer = tank.spec.name.clone();
        let record = RollRecord::from_resolution(
            RollKind::RateOfFire,
            firer,
            "Rate of Fire",
            &res,
            roll.faces(),
            if rof { "Rate of Fire" } else { "No Rate of Fire" },
        );
        self.gunnery.rof = rof;
        self.record(record);
    }

    // ===== PHASE: RESOLVE HITS =====

    pub(crate) fn phase_resolve_hits(&mut self) {
        let firer = self.ctx.tank.spec.name.clone();
        for id in self.ctx.live_ids() {
            let hits = match self.ctx.unit_mut(id) {
                Some(unit) => std::mem::take(&mut unit.hits),
                None => continue,
            };
            for hit in hits {
                if !self.ctx.unit(id).is_some_and(|u| u.alive) {
                    break;
                }
                let on_ift = self.ctx.unit(id).is_some_and(|u| u.class.resolves_on_ift());
                if on_ift {
                    self.resolve_ift_hit(id, hit, &firer);
                } else {
                    self.resolve_vehicle_hit(id, hit, &firer);
                }
            }
        }
    }

    pub(crate) fn destroy_unit(&mut self, id: UnitId, fate: UnitFate) {
        let Some(unit) = self.ctx.unit_mut(id) else {
            return;
        };
        unit.eliminate(fate);
        let label = unit.label();
        if fate == UnitFate::DestroyedByPlayer {
            self.ctx.stats.kills += 1;
        }
        self.event(EncounterEventType::UnitDestroyed { unit_id: id }, format!("{} destroyed", label));
    }

    fn resolve_ift_hit(&mut self, id: UnitId, hit: HitRecord, firer: &str) {
        if hit.ammo.is_armour_piercing() {
            debug!("{} round has no effect on a soft target", hit.ammo.name());
            return;
        }
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let mut input = IftInput::new(IftWeapon::Gun(hit.gun), hit.range, hit.mode, unit.terrain);
        input.critical = hit.critical;
        input.emplaced = unit.emplaced;
        input.target_moving = unit.moving;
        input.soft_ground = self.ctx.scenario.weather.soft_ground();
        let label = unit.label();
        let res = resolve_ift(&input);
        let (outcome, roll) = roll_ift(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(RollKind::Ift, firer, label, &res, roll.faces(), outcome.text());
        self.record(record);
        self.apply_ift_outcome(id, outcome, firer);
    }

    /// Kill or pin-test a soft unit on an IFT result
    pub(crate) fn apply_ift_outcome(&mut self, id: UnitId, outcome: IftOutcome, firer: &str) {
        match outcome {
            IftOutcome::Destroyed => self.destroy_unit(id, UnitFate::DestroyedByPlayer),
            IftOutcome::PinTest => {
                let Some(unit) = self.ctx.unit_mut(id) else {
                    return;
                };
                let (result, record) = pin_test(unit, firer, self.dice.as_mut());
                let label = unit.label();
                if let Some(record) = record {
                    self.record(record);
                }
                match result {
                    PinResult::Passed => {}
                    PinResult::Pinned => {
                        self.event(EncounterEventType::UnitPinned { unit_id: id }, format!("{} pinned", label));
                    }
                    PinResult::Broken => {
                        self.event(EncounterEventType::UnitDestroyed { unit_id: id }, format!("{} broken", label));
                    }
                }
            }
            IftOutcome::NoEffect => {}
        }
    }

    fn resolve_vehicle_hit(&mut self, id: UnitId, hit: HitRecord, firer: &str) {
        let (location, face) = resolve_hit_location(false, self.dice.as_mut());
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let label = unit.label();
        let record = RollRecord::simple(RollKind::HitLocation, firer, label.clone(), 0, vec![face], location.name());
        self.record(record);

        match location {
            HitLocation::Miss => return,
            HitLocation::Track => {
                if let Some(unit) = self.ctx.unit_mut(id) {
                    unit.immobilized = true;
                    debug!("{} immobilized by a track hit", label);
                }
                return;
            }
            HitLocation::Turret | HitLocation::Hull => {}
        }

        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let input = ToKillInput {
            gun: hit.gun,
            ammo: hit.ammo,
            range: hit.range,
            location,
            facing: unit.facing,
            armour: unit.armour(location),
            critical: hit.critical,
        };
        let res = resolve_to_kill(&input);
        let kill = roll_to_kill(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(RollKind::ToKill, firer, label, &res, kill.dice(), kill.outcome_text());
        self.record(record);
        if kill.kill {
            self.destroy_unit(id, UnitFate::DestroyedByPlayer);
            return;
        }

        let threshold = if hit.critical {
            CRITICAL_HIT_STUN_THRESHOLD
        } else if hit.ammo == AmmoType::He {
            HE_HIT_STUN_THRESHOLD
        } else {
            return;
        };
        self.stun_vehicle_crew(id, threshold, firer);
    }

    /// The armour held but the crew inside may still be stunned
    fn stun_vehicle_crew(&mut self, id: UnitId, threshold: i32, firer: &str) {
        let Some(unit) = self.ctx.unit_mut(id) else {
            return;
        };
        let Some((stunned, record)) = stun_test(unit, firer, threshold, self.dice.as_mut()) else {
            return;
        };
        let label = unit.label();
        self.record(record);
        if stunned {
            self.event(EncounterEventType::UnitStunned { unit_id: id }, format!("{} crew stunned", label));
        }
    }
}
