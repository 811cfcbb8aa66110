//! Penetration severity and minor damage against the player tank

use serde::{Deserialize, Serialize};

use crate::combat::modifiers::{Modifier, RollKind, RollRecord};
use crate::core::dice::Dice;
use crate::core::types::{Facing, HitLocation};
use crate::damage::bail_out::{knock_out_cascade, CrewFate};
use crate::damage::malfunction::DamageKind;
use crate::damage::wounds::{wound_check, WoundCause, WoundResult};
use crate::vehicle::crew::CrewPosition;
use crate::vehicle::tank::{MgMount, PlayerTank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PenetrationResult {
    MinorDamage,
    Fire,
    Spalling,
    KnockedOut,
    Explodes,
}

impl PenetrationResult {
    pub fn from_total(total: i32) -> Self {
        match total {
            i32::MIN..=4 => PenetrationResult::MinorDamage,
            5..=6 => PenetrationResult::Fire,
            7..=8 => PenetrationResult::Spalling,
            9..=10 => PenetrationResult::KnockedOut,
            _ => PenetrationResult::Explodes,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            PenetrationResult::MinorDamage => "Minor Damage",
            PenetrationResult::Fire => "Fire",
            PenetrationResult::Spalling => "Spalling",
            PenetrationResult::KnockedOut => "Knocked Out",
            PenetrationResult::Explodes => "Tank Explodes",
        }
    }

    /// Minor damage rolls and random crew wounds this result calls for
    fn secondary_effects(&self) -> (usize, usize) {
        match self {
            PenetrationResult::MinorDamage => (1, 0),
            PenetrationResult::Fire => (1, 1),
            PenetrationResult::Spalling => (2, 2),
            PenetrationResult::KnockedOut | PenetrationResult::Explodes => (0, 0),
        }
    }

    pub fn destroys_tank(&self) -> bool {
        matches!(self, PenetrationResult::KnockedOut | PenetrationResult::Explodes)
    }
}

/// Everything that happened when a shell got through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenetrationReport {
    pub result: PenetrationResult,
    pub damage: Vec<DamageKind>,
    pub wounds: Vec<(CrewPosition, WoundResult)>,
    /// Per-crew fate when the tank was knocked out
    pub fates: Vec<CrewFate>,
    pub records: Vec<RollRecord>,
}

impl PenetrationReport {
    pub fn tank_lost(&self) -> bool {
        self.result.destroys_tank()
    }
}

/// Roll the penetration table; a critical kill rolls twice and keeps the worse
pub fn roll_penetration(
    critical: bool,
    wet_stowage: bool,
    attacker: &str,
    dice: &mut dyn Dice,
) -> (PenetrationResult, RollRecord) {
    let mut roll = dice.two_d6();
    if critical {
        let second = dice.two_d6();
        if second.total() > roll.total() {
            roll = second;
        }
    }
    let mut modifiers = Vec::new();
    if wet_stowage {
        modifiers.push(Modifier::new("Wet stowage", -1));
    }
    let total = roll.total() + modifiers.iter().map(|m| m.value).sum::<i32>();
    let result = PenetrationResult::from_total(total);
    let record = RollRecord::simple(
        RollKind::Penetration,
        attacker,
        "Player tank",
        total,
        roll.faces(),
        result.text(),
    )
    .with_modifiers(modifiers);
    (result, record)
}

/// Minor damage d10 result; None for "no effect" or a mount the tank lacks
fn minor_damage_kind(tank: &PlayerTank, roll: u8) -> Option<DamageKind> {
    let kind = match roll {
        1 => DamageKind::RadioMalfunction,
        2 => DamageKind::IntercomMalfunction,
        3 if tank.spec.has_turret => DamageKind::TurretTraverseMalfunction,
        4 if tank.spec.gun.is_some() => DamageKind::MainGunMalfunction,
        5 => MgMount::Coax.malfunction(),
        6 => MgMount::Bow.malfunction(),
        7 => MgMount::Aa.malfunction(),
        8 => DamageKind::GunSightBroken,
        9 => DamageKind::EngineKnockedOut,
        _ => return None,
    };
    let mount = match roll {
        5 => Some(MgMount::Coax),
        6 => Some(MgMount::Bow),
        7 => Some(MgMount::Aa),
        _ => None,
    };
    match mount {
        Some(m) if tank.mg_firepower(m).is_none() => None,
        _ => Some(kind),
    }
}

/// Roll once on the minor damage table and apply it to the tank
pub fn roll_minor_damage(tank: &mut PlayerTank, dice: &mut dyn Dice) -> (Option<DamageKind>, RollRecord) {
    let roll = dice.d10();
    let kind = minor_damage_kind(tank, roll);
    if let Some(kind) = kind {
        tank.damage.add(kind);
        if kind == DamageKind::EngineKnockedOut {
            tank.immobilized = true;
            tank.moving = false;
        }
        if tank.active_mg.is_some_and(|m| !tank.mg_operational(m)) {
            tank.cycle_active_mg();
        }
    }
    let text = kind.map(|k| k.name()).unwrap_or("No Effect");
    let record = RollRecord::simple(
        RollKind::MinorDamage,
        "Penetration",
        "Player tank",
        0,
        vec![roll],
        text,
    );
    (kind, record)
}

/// Apply a penetrating hit to the player tank
///
/// Explosions kill the whole crew, knock-outs run the bail-out cascade and
/// lesser results roll minor damage and random crew wounds.
pub fn resolve_penetration(
    tank: &mut PlayerTank,
    location: HitLocation,
    facing: Facing,
    critical: bool,
    attacker: &str,
    dice: &mut dyn Dice,
) -> PenetrationReport {
    let (result, record) = roll_penetration(critical, tank.spec.wet_stowage, attacker, dice);
    let mut report = PenetrationReport {
        result,
        damage: Vec::new(),
        wounds: Vec::new(),
        fates: Vec::new(),
        records: vec![record],
    };
    tracing::debug!("Penetration by {}: {}", attacker, result.text());

    let cause = WoundCause::Penetration { location, facing };
    match result {
        PenetrationResult::Explodes => {
            for member in tank.crew.iter_mut() {
                if member.alive {
                    member.alive = false;
                    member.stunned = false;
                    member.unconscious = false;
                    report.wounds.push((member.position, WoundResult::Killed));
                }
            }
        }
        PenetrationResult::KnockedOut => {
            let (fates, records) = knock_out_cascade(tank, cause, dice);
            report.fates = fates;
            report.records.extend(records);
        }
        _ => {
            let (minor, wounds) = result.secondary_effects();
            for _ in 0..minor {
                let (kind, record) = roll_minor_damage(tank, dice);
                report.records.push(record);
                report.damage.extend(kind);
            }
            for _ in 0..wounds {
                if tank.crew.is_empty() {
                    break;
                }
                let index = (dice.d6() as usize - 1) % tank.crew.len();
                let bonus = tank.leadership_bonus;
                let position = tank.crew.positions()[index];
                if let Some(member) = tank.crew.get_mut(position) {
                    let wound = wound_check(member, cause, bonus, dice);
                    report.wounds.push((position, wound.result));
                    report.records.extend(wound.records);
                }
            }
        }
    }
    report
}
