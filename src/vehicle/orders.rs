//! Crew orders and their legality
//!
//! Position decides which orders a crew member may take at all; crew
//! condition and vehicle state decide which of those are open right now.

use serde::{Deserialize, Serialize};

use crate::damage::DamageKind;
use crate::vehicle::crew::CrewPosition::{AssistantDriver, Commander, Driver, Gunner, Loader};
use crate::vehicle::crew::{CrewMember, CrewPosition, Hatch};
use crate::vehicle::skills::SkillKind;
use crate::vehicle::spec::LoaderHatch;
use crate::vehicle::tank::{MgMount, PlayerTank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CrewOrder {
    #[default]
    None,
    // Commander
    DirectMovement,
    DirectMainGunFire,
    DirectCoaxMgFire,
    DirectBowMgFire,
    // Gunner
    FireMainGun,
    FireCoaxMg,
    RotateTurret,
    HelpRepair,
    // Loader
    Reload,
    RepairMainGun,
    RepairCoaxMg,
    RepairTurretTraverse,
    RepairRadio,
    RepairIntercom,
    FireSmokeMortar,
    ChangeGunLoad,
    RestockReadyRack,
    // Driver
    Stop,
    Forward,
    ForwardToHullDown,
    Reverse,
    ReverseToHullDown,
    PivotTank,
    AttemptUnbog,
    // Assistant driver
    FireBowMg,
    RepairBowMg,
    PassAmmo,
    // Commander or loader
    ThrowSmokeGrenade,
    FireAaMg,
    RepairAaMg,
    // Anyone
    AbandonTank,
}

impl CrewOrder {
    pub const ALL: [CrewOrder; 32] = [
        CrewOrder::None,
        CrewOrder::DirectMovement,
        CrewOrder::DirectMainGunFire,
        CrewOrder::DirectCoaxMgFire,
        CrewOrder::DirectBowMgFire,
        CrewOrder::FireMainGun,
        CrewOrder::FireCoaxMg,
        CrewOrder::RotateTurret,
        CrewOrder::HelpRepair,
        CrewOrder::Reload,
        CrewOrder::RepairMainGun,
        CrewOrder::RepairCoaxMg,
        CrewOrder::RepairTurretTraverse,
        CrewOrder::RepairRadio,
        CrewOrder::RepairIntercom,
        CrewOrder::FireSmokeMortar,
        CrewOrder::ChangeGunLoad,
        CrewOrder::RestockReadyRack,
        CrewOrder::Stop,
        CrewOrder::Forward,
        CrewOrder::ForwardToHullDown,
        CrewOrder::Reverse,
        CrewOrder::ReverseToHullDown,
        CrewOrder::PivotTank,
        CrewOrder::AttemptUnbog,
        CrewOrder::FireBowMg,
        CrewOrder::RepairBowMg,
        CrewOrder::PassAmmo,
        CrewOrder::ThrowSmokeGrenade,
        CrewOrder::FireAaMg,
        CrewOrder::RepairAaMg,
        CrewOrder::AbandonTank,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CrewOrder::None => "None",
            CrewOrder::DirectMovement => "Direct Movement",
            CrewOrder::DirectMainGunFire => "Direct Main Gun Fire",
            CrewOrder::DirectCoaxMgFire => "Direct Co-ax MG Fire",
            CrewOrder::DirectBowMgFire => "Direct Bow MG Fire",
            CrewOrder::FireMainGun => "Fire Main Gun",
            CrewOrder::FireCoaxMg => "Fire Co-Axial MG",
            CrewOrder::RotateTurret => "Rotate Turret",
            CrewOrder::HelpRepair => "Help Repair",
            CrewOrder::Reload => "Reload",
            CrewOrder::RepairMainGun => "Repair Main Gun",
            CrewOrder::RepairCoaxMg => "Repair Co-ax MG",
            CrewOrder::RepairTurretTraverse => "Repair Turret Traverse",
            CrewOrder::RepairRadio => "Repair Radio",
            CrewOrder::RepairIntercom => "Repair Intercom",
            CrewOrder::FireSmokeMortar => "Fire Smoke Mortar",
            CrewOrder::ChangeGunLoad => "Change Gun Load",
            CrewOrder::RestockReadyRack => "Restock Ready Rack",
            CrewOrder::Stop => "Stop",
            CrewOrder::Forward => "Forward",
            CrewOrder::ForwardToHullDown => "Forward to Hull Down",
            CrewOrder::Reverse => "Reverse",
            CrewOrder::ReverseToHullDown => "Reverse to Hull Down",
            CrewOrder::PivotTank => "Pivot Tank",
            CrewOrder::AttemptUnbog => "Attempt Unbog",
            CrewOrder::FireBowMg => "Fire Bow MG",
            CrewOrder::RepairBowMg => "Repair Bow MG",
            CrewOrder::PassAmmo => "Pass Ammo",
            CrewOrder::ThrowSmokeGrenade => "Throw Smoke Grenade",
            CrewOrder::FireAaMg => "Fire AA MG",
            CrewOrder::RepairAaMg => "Repair AA MG",
            CrewOrder::AbandonTank => "Abandon Tank",
        }
    }

    /// Positions that may be given this order
    pub fn positions(&self) -> &'static [CrewPosition] {
        match self {
            CrewOrder::None | CrewOrder::AbandonTank => &CrewPosition::ALL,
            CrewOrder::DirectMovement
            | CrewOrder::DirectMainGunFire
            | CrewOrder::DirectCoaxMgFire
            | CrewOrder::DirectBowMgFire => &[Commander],
            CrewOrder::FireMainGun
            | CrewOrder::FireCoaxMg
            | CrewOrder::RotateTurret
            | CrewOrder::HelpRepair => &[Gunner],
            CrewOrder::Reload
            | CrewOrder::RepairMainGun
            | CrewOrder::RepairCoaxMg
            | CrewOrder::RepairTurretTraverse
            | CrewOrder::RepairRadio
            | CrewOrder::RepairIntercom
            | CrewOrder::FireSmokeMortar
            | CrewOrder::ChangeGunLoad
            | CrewOrder::RestockReadyRack => &[Loader],
            CrewOrder::Stop
            | CrewOrder::Forward
            | CrewOrder::ForwardToHullDown
            | CrewOrder::Reverse
            | CrewOrder::ReverseToHullDown
            | CrewOrder::PivotTank
            | CrewOrder::AttemptUnbog => &[Driver],
            CrewOrder::FireBowMg | CrewOrder::RepairBowMg | CrewOrder::PassAmmo => {
                &[AssistantDriver]
            }
            CrewOrder::ThrowSmokeGrenade | CrewOrder::FireAaMg | CrewOrder::RepairAaMg => {
                &[Commander, Loader]
            }
        }
    }

    /// Whether the crew member can still spot while carrying out the order
    pub fn spots(&self) -> bool {
        !matches!(
            self,
            CrewOrder::FireMainGun
                | CrewOrder::HelpRepair
                | CrewOrder::RepairMainGun
                | CrewOrder::RepairCoaxMg
                | CrewOrder::RepairTurretTraverse
                | CrewOrder::RepairRadio
                | CrewOrder::RepairIntercom
                | CrewOrder::FireSmokeMortar
                | CrewOrder::ChangeGunLoad
                | CrewOrder::RestockReadyRack
                | CrewOrder::AttemptUnbog
                | CrewOrder::AbandonTank
        )
    }

    /// The malfunction this order repairs, if it is a repair order
    pub fn repairs(&self) -> Option<DamageKind> {
        match self {
            CrewOrder::RepairMainGun => Some(DamageKind::MainGunMalfunction),
            CrewOrder::RepairCoaxMg => Some(DamageKind::CoaxMgMalfunction),
            CrewOrder::RepairTurretTraverse => Some(DamageKind::TurretTraverseMalfunction),
            CrewOrder::RepairRadio => Some(DamageKind::RadioMalfunction),
            CrewOrder::RepairIntercom => Some(DamageKind::IntercomMalfunction),
            CrewOrder::RepairBowMg => Some(DamageKind::BowMgMalfunction),
            CrewOrder::RepairAaMg => Some(DamageKind::AaMgMalfunction),
            _ => None,
        }
    }

    /// Driver orders that move the tank through the map
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            CrewOrder::Forward
                | CrewOrder::ForwardToHullDown
                | CrewOrder::Reverse
                | CrewOrder::ReverseToHullDown
        )
    }
}

/// Check an order for one crew member against the tank's current state
///
/// Returns the reason the order is closed, if it is.
pub fn check_order(
    order: CrewOrder,
    member: &CrewMember,
    tank: &PlayerTank,
) -> Result<(), &'static str> {
    if !order.positions().contains(&member.position) {
        return Err("order not available to this position");
    }
    if order == CrewOrder::None {
        return Ok(());
    }
    if !member.can_act() {
        return Err("crew member cannot act");
    }
    let crew = &tank.crew;
    let mobile = !tank.immobilized && !tank.bogged;

    let open = match order {
        CrewOrder::None => true,
        CrewOrder::DirectMovement => crew.get(Driver).is_some() && tank.intercom_operational(),
        CrewOrder::DirectMainGunFire => tank.spec.gun.is_some(),
        CrewOrder::DirectCoaxMgFire => tank.spec.coax_mg.is_some(),
        CrewOrder::DirectBowMgFire => {
            tank.spec.bow_mg.is_some() && crew.get(AssistantDriver).is_some()
        }
        // Firing on the move needs a stabilised gun
        CrewOrder::FireMainGun => {
            tank.main_gun_operational()
                && (!tank.moving || member.has_skill(SkillKind::Gyrostabilizer))
        }
        CrewOrder::FireCoaxMg => tank.mg_operational(MgMount::Coax),
        CrewOrder::RotateTurret => tank.turret_traverse_operational(),
        CrewOrder::HelpRepair => tank.damage.has_repairable(),
        CrewOrder::Reload | CrewOrder::ChangeGunLoad => tank.spec.gun.is_some(),
        CrewOrder::RestockReadyRack => tank.ammo.ready_rack_capacity() > 0,
        CrewOrder::FireSmokeMortar => tank.spec.smoke_mortar && tank.smoke_bombs > 0,
        CrewOrder::Stop
        | CrewOrder::Forward
        | CrewOrder::ForwardToHullDown
        | CrewOrder::Reverse
        | CrewOrder::ReverseToHullDown
        | CrewOrder::PivotTank => mobile,
        CrewOrder::AttemptUnbog => tank.bogged && !tank.immobilized,
        CrewOrder::FireBowMg => tank.mg_operational(MgMount::Bow),
        CrewOrder::PassAmmo => tank.spec.gun.is_some(),
        CrewOrder::ThrowSmokeGrenade => tank.smoke_grenades > 0 && member.hatch != Hatch::None,
        CrewOrder::FireAaMg => {
            tank.mg_operational(MgMount::Aa)
                && member.hatch != Hatch::None
                && (member.position == Commander || tank.spec.loader_hatch == LoaderHatch::Split)
        }
        CrewOrder::AbandonTank => crew.any_incapacitated(),
        repair => match repair.repairs() {
            Some(kind) => tank.damage.contains(kind),
            None => false,
        },
    };
    if open {
        Ok(())
    } else {
        Err("order not possible in the current vehicle state")
    }
}

/// Orders currently open to a crew member, in menu order
pub fn legal_orders(member: &CrewMember, tank: &PlayerTank) -> Vec<CrewOrder> {
    CrewOrder::ALL
        .iter()
        .copied()
        .filter(|o| check_order(*o, member, tank).is_ok())
        .collect()
}
