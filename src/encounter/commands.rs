//! Inbound player commands
//!
//! Every command checks the phase and the vehicle state before touching
//! anything; a rejected command leaves the encounter exactly as it was.

use thiserror::Error;
use tracing::{debug, warn};

use crate::combat::ift::IftOutcome;
use crate::combat::to_hit::ToHitRoll;
use crate::core::types::UnitId;
use crate::encounter::execution::Encounter;
use crate::encounter::outcome::EncounterResult;
use crate::encounter::phase::Phase;
use crate::encounter::spotting::spot_sector_allowed;
use crate::vehicle::crew::{CrewPosition, Hatch};
use crate::vehicle::orders::{check_order, CrewOrder};
use crate::vehicle::spec::{AmmoType, FireMode};
use crate::vehicle::tank::MgMount;

/// Why a command was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandRejected {
    #[error("The encounter is over")]
    EncounterOver,

    #[error("Not possible during the {0} phase")]
    WrongPhase(Phase),

    #[error("No crew member in the {} position", .0.name())]
    NoCrewMember(CrewPosition),

    #[error("Illegal order: {reason}")]
    IllegalOrder { reason: &'static str },

    #[error("Sector {0} cannot be watched from that position")]
    InvalidSector(u8),

    #[error("No eligible target")]
    NoTarget,

    #[error("{0}")]
    Unavailable(&'static str),
}

fn logged<T>(command: &str, result: Result<T, CommandRejected>) -> Result<T, CommandRejected> {
    if let Err(err) = &result {
        warn!("{} rejected: {}", command, err);
    }
    result
}

impl Encounter {
    /// Point a crew member's spotting at one of the six sectors
    pub fn set_spot_sector(&mut self, position: CrewPosition, sector: u8) -> Result<(), CommandRejected> {
        let result = self.ensure_phase(Phase::SetSpotSectors).and_then(|_| {
            let tank = &self.ctx.tank;
            if tank.crew.get(position).is_none() {
                return Err(CommandRejected::NoCrewMember(position));
            }
            if !spot_sector_allowed(tank, position, sector) {
                return Err(CommandRejected::InvalidSector(sector));
            }
            if let Some(member) = self.ctx.tank.crew.get_mut(position) {
                member.spot_sector = Some(sector);
            }
            Ok(())
        });
        logged("set_spot_sector", result)
    }

    pub fn set_crew_order(&mut self, position: CrewPosition, order: CrewOrder) -> Result<(), CommandRejected> {
        let result = self.ensure_phase(Phase::Orders).and_then(|_| {
            let tank = &self.ctx.tank;
            let member = tank.crew.get(position).ok_or(CommandRejected::NoCrewMember(position))?;
            check_order(order, member, tank).map_err(|reason| CommandRejected::IllegalOrder { reason })?;
            if let Some(member) = self.ctx.tank.crew.get_mut(position) {
                debug!("{} ordered to {}", member.name, order.name());
                member.order = order;
            }
            Ok(())
        });
        logged("set_crew_order", result)
    }

    /// Open a shut hatch or shut an open one; returns the new state
    pub fn toggle_hatch(&mut self, position: CrewPosition) -> Result<Hatch, CommandRejected> {
        let result = self.ensure_phase(Phase::Orders).and_then(|_| {
            let member = self
                .ctx
                .tank
                .crew
                .get_mut(position)
                .ok_or(CommandRejected::NoCrewMember(position))?;
            if !member.can_act() {
                return Err(CommandRejected::Unavailable("crew member cannot act"));
            }
            member.hatch = match member.hatch {
                Hatch::None => return Err(CommandRejected::Unavailable("no hatch at this position")),
                Hatch::Open => Hatch::Shut,
                Hatch::Shut => Hatch::Open,
            };
            Ok(member.hatch)
        });
        logged("toggle_hatch", result)
    }

    /// Move the roster cursor to the next crew member
    pub fn cycle_crew(&mut self) -> Result<CrewPosition, CommandRejected> {
        let result = self.ensure_running().and_then(|_| {
            self.ctx
                .tank
                .crew
                .next()
                .map(|m| m.position)
                .ok_or(CommandRejected::Unavailable("no crew aboard"))
        });
        logged("cycle_crew", result)
    }

    /// Pivot the hull to face a sector; the turret turns with it
    pub fn pivot_to(&mut self, sector: u8) -> Result<(), CommandRejected> {
        let result = self.ensure_phase(Phase::Pivot).and_then(|_| {
            if sector > 5 {
                return Err(CommandRejected::InvalidSector(sector));
            }
            let tank = &self.ctx.tank;
            if self.gunnery.pivoted {
                return Err(CommandRejected::Unavailable("the tank has already pivoted this round"));
            }
            if tank.bogged || tank.immobilized {
                return Err(CommandRejected::Unavailable("the tank cannot move"));
            }
            if tank.hull_facing == sector {
                return Err(CommandRejected::Unavailable("the hull already faces that sector"));
            }
            self.pivot_tank(sector);
            Ok(())
        });
        logged("pivot_to", result)
    }

    /// Traverse the turret one sector; returns the new turret facing
    pub fn rotate_turret(&mut self, clockwise: bool) -> Result<u8, CommandRejected> {
        let result = self.ensure_phase(Phase::RotateTurret).and_then(|_| {
            if !self.ctx.tank.turret_traverse_operational() {
                return Err(CommandRejected::Unavailable("turret traverse is out of action"));
            }
            Ok(self.traverse_turret(if clockwise { 1 } else { -1 }))
        });
        logged("rotate_turret", result)
    }

    /// Cycle to the next eligible target for the weapon of the current phase
    pub fn select_next_target(&mut self) -> Result<UnitId, CommandRejected> {
        let result = self.ensure_running().and_then(|_| {
            let eligible = match self.phase {
                Phase::MainGunFire => self.main_gun_targets(),
                Phase::MgFire => {
                    let mount = self
                        .ctx
                        .tank
                        .active_mg
                        .ok_or(CommandRejected::Unavailable("no machine gun selected"))?;
                    self.mg_targets(mount)
                }
                other => return Err(CommandRejected::WrongPhase(other)),
            };
            let current = self.gunnery.target_in(self.phase);
            let next = match current.and_then(|t| eligible.iter().position(|id| *id == t)) {
                Some(i) => eligible.get((i + 1) % eligible.len()),
                None => eligible.first(),
            };
            let target = *next.ok_or(CommandRejected::NoTarget)?;
            if self.phase == Phase::MgFire {
                self.gunnery.mg_target = Some(target);
            } else {
                self.gunnery.target = Some(target);
            }
            Ok(target)
        });
        logged("select_next_target", result)
    }

    /// Switch the main gun between direct and area fire
    pub fn toggle_area_fire(&mut self) -> Result<FireMode, CommandRejected> {
        let result = self.ensure_phase(Phase::MainGunFire).map(|_| {
            self.gunnery.mode = match self.gunnery.mode {
                FireMode::Direct => FireMode::Area,
                FireMode::Area => FireMode::Direct,
            };
            self.gunnery.mode
        });
        logged("toggle_area_fire", result)
    }

    /// Choose the shell type the loader reaches for next
    pub fn set_reload_ammo(&mut self, ammo: AmmoType) -> Result<(), CommandRejected> {
        let result = self.ensure_running().and_then(|_| {
            let gun = self
                .ctx
                .tank
                .spec
                .gun
                .ok_or(CommandRejected::Unavailable("the tank has no main gun"))?;
            if !gun.fires(ammo) {
                return Err(CommandRejected::Unavailable("the main gun cannot fire that round"));
            }
            self.ctx.tank.ammo.reload = Some(ammo);
            Ok(())
        });
        logged("set_reload_ammo", result)
    }

    /// Draw reloads from the ready rack or from general stores; returns the new setting
    pub fn toggle_ready_rack(&mut self) -> Result<bool, CommandRejected> {
        let result = self.ensure_running().and_then(|_| {
            let ammo = &mut self.ctx.tank.ammo;
            if ammo.ready_rack_capacity() == 0 {
                return Err(CommandRejected::Unavailable("the tank has no ready rack"));
            }
            ammo.use_ready_rack = !ammo.use_ready_rack;
            Ok(ammo.use_ready_rack)
        });
        logged("toggle_ready_rack", result)
    }

    pub fn fire_main_gun(&mut self) -> Result<ToHitRoll, CommandRejected> {
        let result = self
            .ensure_phase(Phase::MainGunFire)
            .and_then(|_| self.shoot_main_gun());
        logged("fire_main_gun", result)
    }

    /// Step the MG selector to the next working mount
    pub fn cycle_active_mg(&mut self) -> Result<MgMount, CommandRejected> {
        let result = self.ensure_running().and_then(|_| {
            self.ctx
                .tank
                .cycle_active_mg()
                .ok_or(CommandRejected::Unavailable("no working machine gun"))
        });
        logged("cycle_active_mg", result)
    }

    pub fn fire_active_mg(&mut self) -> Result<IftOutcome, CommandRejected> {
        let result = self.ensure_phase(Phase::MgFire).and_then(|_| self.shoot_active_mg());
        logged("fire_active_mg", result)
    }

    /// End the encounter from outside, e.g. when the campaign day runs out
    pub fn end_externally(&mut self) -> Result<(), CommandRejected> {
        let result = self.ensure_running().map(|_| self.finish(EncounterResult::Undetermined));
        logged("end_externally", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, RangeBand, Resistance};
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::hostile::unit::{HostileUnit, UnitClass};
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;
    use crate::vehicle::tank::PlayerTank;

    fn encounter(phase: Phase) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, EncounterConfig::default());
        ctx.add_units(vec![HostileUnit::new(
            UnitId(1),
            UnitClass::Lw,
            "Rifle Squad",
            HexCoord::new(0, -2),
            RangeBand::Medium,
            4,
        )]);
        let mut encounter = Encounter::from_context(ctx, Box::new(ScriptedDice::new([])));
        encounter.phase = phase;
        encounter
    }

    #[test]
    fn test_orders_only_in_orders_phase() {
        let mut encounter = encounter(Phase::Spotting);
        assert_eq!(
            encounter.set_crew_order(CrewPosition::Gunner, CrewOrder::FireMainGun),
            Err(CommandRejected::WrongPhase(Phase::Spotting))
        );
        encounter.phase = Phase::Orders;
        encounter
            .set_crew_order(CrewPosition::Gunner, CrewOrder::FireMainGun)
            .unwrap();
        assert_eq!(encounter.ctx.tank.crew.order_of(CrewPosition::Gunner), CrewOrder::FireMainGun);
    }

    #[test]
    fn test_illegal_order_leaves_state_alone() {
        let mut encounter = encounter(Phase::Orders);
        let err = encounter
            .set_crew_order(CrewPosition::Driver, CrewOrder::AttemptUnbog)
            .unwrap_err();
        assert!(matches!(err, CommandRejected::IllegalOrder { .. }));
        assert_eq!(encounter.ctx.tank.crew.order_of(CrewPosition::Driver), CrewOrder::None);
        assert_eq!(
            encounter.set_crew_order(CrewPosition::Driver, CrewOrder::FireMainGun),
            Err(CommandRejected::IllegalOrder {
                reason: "order not available to this position"
            })
        );
    }

    #[test]
    fn test_spot_sector_limits() {
        let mut encounter = encounter(Phase::SetSpotSectors);
        assert_eq!(
            encounter.set_spot_sector(CrewPosition::Gunner, 2),
            Err(CommandRejected::InvalidSector(2))
        );
        encounter.set_spot_sector(CrewPosition::Driver, 3).unwrap();
        assert_eq!(encounter.ctx.tank.crew.get(CrewPosition::Driver).unwrap().spot_sector, Some(3));
    }

    #[test]
    fn test_hatch_toggles() {
        let mut encounter = encounter(Phase::Orders);
        assert_eq!(encounter.toggle_hatch(CrewPosition::Commander), Ok(Hatch::Open));
        assert_eq!(encounter.toggle_hatch(CrewPosition::Commander), Ok(Hatch::Shut));
    }

    #[test]
    fn test_reload_ammo_must_suit_gun() {
        let mut encounter = encounter(Phase::Orders);
        assert!(encounter.set_reload_ammo(AmmoType::Apds).is_err());
        encounter.set_reload_ammo(AmmoType::Wp).unwrap();
        assert_eq!(encounter.ctx.tank.ammo.reload, Some(AmmoType::Wp));
        assert_eq!(encounter.toggle_ready_rack(), Ok(true));
    }

    #[test]
    fn test_target_selection_needs_spotted_units() {
        let mut encounter = encounter(Phase::MainGunFire);
        assert_eq!(encounter.select_next_target(), Err(CommandRejected::NoTarget));
        encounter.ctx.unit_mut(UnitId(1)).unwrap().spotted = true;
        assert_eq!(encounter.select_next_target(), Ok(UnitId(1)));
        // a single target wraps onto itself
        assert_eq!(encounter.select_next_target(), Ok(UnitId(1)));
    }

    #[test]
    fn test_mg_target_is_kept_apart_from_the_main_gun() {
        let mut encounter = encounter(Phase::MainGunFire);
        let mut second = HostileUnit::new(UnitId(2), UnitClass::Mg, "MG Team", HexCoord::new(0, -1), RangeBand::Close, 4);
        second.spotted = true;
        encounter.ctx.add_units(vec![second]);
        encounter.ctx.unit_mut(UnitId(1)).unwrap().spotted = true;
        assert_eq!(encounter.select_next_target(), Ok(UnitId(1)));

        encounter.phase = Phase::MgFire;
        encounter.ctx.tank.active_mg = Some(MgMount::Coax);
        assert_eq!(encounter.select_next_target(), Ok(UnitId(1)));
        assert_eq!(encounter.select_next_target(), Ok(UnitId(2)));
        assert_eq!(encounter.gunnery.mg_target, Some(UnitId(2)));
        assert_eq!(encounter.gunnery.target, Some(UnitId(1)));
        assert_eq!(encounter.gunnery.target_in(Phase::MgFire), Some(UnitId(2)));
    }

    #[test]
    fn test_end_externally_is_undetermined() {
        let mut encounter = encounter(Phase::Orders);
        encounter.end_externally().unwrap();
        assert_eq!(encounter.result(), Some(EncounterResult::Undetermined));
        assert_eq!(encounter.end_externally(), Err(CommandRejected::EncounterOver));
        assert_eq!(encounter.cycle_crew(), Err(CommandRejected::EncounterOver));
    }
}
