//! Autopilot commander
//!
//! Plays an encounter through the same commands a player would use. The
//! policy draws no dice of its own, so a seeded encounter driven by it is
//! fully reproducible.

use tracing::{debug, info};

use crate::core::types::{RangeBand, UnitId};
use crate::encounter::commands::CommandRejected;
use crate::encounter::context::EncounterContext;
use crate::encounter::execution::Encounter;
use crate::encounter::outcome::EncounterReport;
use crate::encounter::phase::Phase;
use crate::hostile::unit::HostileUnit;
use crate::vehicle::crew::{CrewPosition, Hatch};
use crate::vehicle::orders::{check_order, CrewOrder};
use crate::vehicle::spec::AmmoType;
use crate::vehicle::tank::MgMount;

/// Main gun shots attempted per round before giving up on Rate of Fire
const MAX_SHOTS_PER_ROUND: usize = 8;

/// Steps of the command loop before the autopilot stops the encounter
const MAX_STEPS_PER_ROUND: u32 = 64;

/// Deterministic commander policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCommander {
    /// Put the commander on the AA MG against infantry when no armour is in sight
    pub use_aa_mg: bool,
    /// Pivot to face armour that appears outside the front arc
    pub pivot_to_armour: bool,
}

impl Default for AutoCommander {
    fn default() -> Self {
        Self {
            use_aa_mg: true,
            pivot_to_armour: true,
        }
    }
}

/// Most pressing visible threat: closest first, armour before soft targets
fn priority_target(ctx: &EncounterContext) -> Option<&HostileUnit> {
    ctx.live_units()
        .filter(|u| u.is_targetable() && ctx.in_weather_range(u.band))
        .min_by_key(|u| (u.band, !u.is_armoured(), u.id))
}

/// Direction and number of steps to turn from one sector to another
fn turn_towards(from: u8, to: u8) -> (bool, u8) {
    let clockwise = (to as i32 - from as i32).rem_euclid(6) as u8;
    if clockwise <= 3 {
        (true, clockwise)
    } else {
        (false, 6 - clockwise)
    }
}

impl AutoCommander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play until the encounter ends or `max_rounds` rounds have passed
    ///
    /// An encounter still running after the last round is ended externally.
    pub fn play(&self, encounter: &mut Encounter, max_rounds: u32) -> Result<EncounterReport, CommandRejected> {
        let mut steps = 0;
        let mut round = encounter.round();
        while !encounter.is_finished() && encounter.round() <= max_rounds {
            if encounter.round() != round {
                round = encounter.round();
                steps = 0;
            }
            steps += 1;
            if steps > MAX_STEPS_PER_ROUND {
                debug!("Autopilot step limit reached in round {}", round);
                break;
            }
            self.act(encounter);
            if !encounter.is_finished() {
                encounter.advance_phase()?;
            }
        }
        if !encounter.is_finished() {
            encounter.end_externally()?;
        }
        let report = encounter
            .report()
            .ok_or(CommandRejected::Unavailable("encounter did not finish"))?;
        info!(
            "Autopilot finished: {} after {} round(s), {} VP",
            report.result.name(),
            report.rounds,
            report.victory_points
        );
        Ok(report)
    }

    /// Issue the commands that belong to the current phase
    pub fn act(&self, encounter: &mut Encounter) {
        match encounter.phase() {
            Phase::Orders => self.issue_orders(encounter),
            Phase::Pivot => self.pivot(encounter),
            Phase::RotateTurret => self.traverse(encounter),
            Phase::MainGunFire => self.fire_main_gun(encounter),
            Phase::MgFire => self.fire_mgs(encounter),
            _ => {}
        }
    }

    // ===== ORDERS =====

    fn issue_orders(&self, encounter: &mut Encounter) {
        let ctx = encounter.context();
        let tank = &ctx.tank;
        let target = priority_target(ctx).map(|u| (u.sector, u.band, u.is_armoured()));
        let armour_in_sight = ctx
            .live_units()
            .any(|u| u.is_targetable() && u.is_armoured());
        let soft_close = ctx
            .live_units()
            .any(|u| u.is_targetable() && !u.is_armoured() && u.band <= RangeBand::Medium);
        let gun_jammed = !tank.main_gun_operational();
        let stopped = !tank.moving;
        let ammo_for_target = match target {
            Some((_, _, true)) => AmmoType::Ap,
            _ => AmmoType::He,
        };
        let ready_rack_low = tank.ammo.ready_rack_total() * 2 < tank.ammo.ready_rack_capacity();

        let driver = if tank.bogged {
            CrewOrder::AttemptUnbog
        } else if self.pivot_to_armour
            && target.is_some_and(|(sector, _, armoured)| armoured && sector != tank.hull_facing)
        {
            CrewOrder::PivotTank
        } else if tank.hull_down || target.is_some() {
            CrewOrder::Stop
        } else {
            CrewOrder::ForwardToHullDown
        };

        let gunner = match target {
            _ if gun_jammed => CrewOrder::HelpRepair,
            Some((sector, _, _)) if sector == tank.turret_facing && stopped => CrewOrder::FireMainGun,
            Some((sector, _, _)) if sector != tank.turret_facing => CrewOrder::RotateTurret,
            Some(_) => CrewOrder::FireCoaxMg,
            None => CrewOrder::None,
        };

        let loader = if gun_jammed {
            CrewOrder::RepairMainGun
        } else if target.is_none() && ready_rack_low {
            CrewOrder::RestockReadyRack
        } else {
            CrewOrder::Reload
        };

        let aa = self.use_aa_mg && soft_close && !armour_in_sight;
        let commander = if aa {
            CrewOrder::FireAaMg
        } else if gunner == CrewOrder::FireMainGun {
            CrewOrder::DirectMainGunFire
        } else {
            CrewOrder::DirectMovement
        };

        let assistant = if soft_close { CrewOrder::FireBowMg } else { CrewOrder::PassAmmo };

        // Hatches first: they decide which orders are open
        let want_open = aa;
        let commander_hatch = tank.crew.get(CrewPosition::Commander).map(|m| m.hatch);
        if matches!(
            (commander_hatch, want_open),
            (Some(Hatch::Shut), true) | (Some(Hatch::Open), false)
        ) {
            encounter.toggle_hatch(CrewPosition::Commander).ok();
        }

        let gun_fires_it = encounter.context().tank.spec.gun.is_some_and(|g| g.fires(ammo_for_target));
        if gun_fires_it {
            encounter.set_reload_ammo(ammo_for_target).ok();
        }

        for (position, order) in [
            (CrewPosition::Driver, driver),
            (CrewPosition::Gunner, gunner),
            (CrewPosition::Loader, loader),
            (CrewPosition::Commander, commander),
            (CrewPosition::AssistantDriver, assistant),
        ] {
            self.give(encounter, position, order);
        }
    }

    /// Set an order when it is open, otherwise stand the crew member down
    fn give(&self, encounter: &mut Encounter, position: CrewPosition, order: CrewOrder) {
        let tank = &encounter.context().tank;
        let Some(member) = tank.crew.get(position) else {
            return;
        };
        let order = if check_order(order, member, tank).is_ok() {
            order
        } else {
            CrewOrder::None
        };
        if member.can_act() && member.order != order {
            encounter.set_crew_order(position, order).ok();
        }
    }

    // ===== MOVEMENT AND TURRET =====

    fn pivot(&self, encounter: &mut Encounter) {
        let ctx = encounter.context();
        let Some(sector) = priority_target(ctx).map(|u| u.sector) else {
            return;
        };
        if sector != ctx.tank.hull_facing {
            encounter.pivot_to(sector).ok();
        }
    }

    fn traverse(&self, encounter: &mut Encounter) {
        let ctx = encounter.context();
        let Some(sector) = priority_target(ctx).map(|u| u.sector) else {
            return;
        };
        let (clockwise, steps) = turn_towards(ctx.tank.turret_facing, sector);
        for _ in 0..steps {
            if encounter.rotate_turret(clockwise).is_err() {
                break;
            }
        }
    }

    // ===== FIRE =====

    /// Select the priority target if the gun can see it, else the first eligible one
    fn select_target(&self, encounter: &mut Encounter, eligible: &[UnitId]) -> bool {
        let wanted = priority_target(encounter.context())
            .map(|u| u.id)
            .filter(|id| eligible.contains(id))
            .or_else(|| eligible.first().copied());
        let Some(wanted) = wanted else {
            return false;
        };
        for _ in 0..eligible.len() {
            if encounter.gunnery().target_in(encounter.phase()) == Some(wanted) {
                return true;
            }
            if encounter.select_next_target().is_err() {
                return false;
            }
        }
        encounter.gunnery().target_in(encounter.phase()) == Some(wanted)
    }

    fn fire_main_gun(&self, encounter: &mut Encounter) {
        for _ in 0..MAX_SHOTS_PER_ROUND {
            let eligible = encounter.main_gun_targets();
            if !self.select_target(encounter, &eligible) {
                return;
            }
            if encounter.fire_main_gun().is_err() || !encounter.gunnery().rof {
                return;
            }
        }
    }

    fn fire_mgs(&self, encounter: &mut Encounter) {
        let mounts = encounter.context().tank.available_mgs();
        for _ in 0..mounts.len() {
            let Ok(mount) = encounter.cycle_active_mg() else {
                return;
            };
            if !self.mount_ready(encounter, mount) {
                continue;
            }
            let eligible = encounter.mg_targets(mount);
            if self.select_target(encounter, &eligible) {
                encounter.fire_active_mg().ok();
            }
        }
    }

    fn mount_ready(&self, encounter: &Encounter, mount: MgMount) -> bool {
        let tank = &encounter.context().tank;
        let Some(position) = encounter.mg_gunner(mount) else {
            return false;
        };
        let hatch_ok = mount != MgMount::Aa || tank.crew.get(position).is_some_and(|m| m.hatch == Hatch::Open);
        hatch_ok && !tank.mgs_fired.contains(&mount) && !encounter.mg_targets(mount).is_empty()
    }
}
