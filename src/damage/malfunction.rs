//! Vehicle damage table, damage list and repair rolls
//!
//! A malfunction and its broken form are never both on the list: a break
//! replaces the malfunction, and nothing removes a break within an encounter.

use serde::{Deserialize, Serialize};

use crate::combat::modifiers::{Modifier, RollKind, RollRecord};
use crate::core::dice::Dice;
use crate::vehicle::orders::CrewOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    MainGunMalfunction,
    MainGunBroken,
    TurretTraverseMalfunction,
    TurretTraverseBroken,
    RadioMalfunction,
    RadioBroken,
    IntercomMalfunction,
    IntercomBroken,
    AaMgMalfunction,
    AaMgBroken,
    CoaxMgMalfunction,
    CoaxMgBroken,
    BowMgMalfunction,
    BowMgBroken,
    GunSightBroken,
    EngineKnockedOut,
}

/// Static repair rules for one kind of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageDescriptor {
    pub kind: DamageKind,
    pub name: &'static str,
    pub repair_order: Option<CrewOrder>,
    /// 2D6 at or below repairs
    pub repair_score: i32,
    /// 2D6 at or above breaks; 0 never breaks on the score
    pub break_score: i32,
    pub broken: Option<DamageKind>,
    pub auto_repair: bool,
}

const fn malfunction(
    kind: DamageKind,
    name: &'static str,
    order: CrewOrder,
    repair_score: i32,
    break_score: i32,
    broken: DamageKind,
) -> DamageDescriptor {
    DamageDescriptor {
        kind,
        name,
        repair_order: Some(order),
        repair_score,
        break_score,
        broken: Some(broken),
        auto_repair: true,
    }
}

const fn permanent(kind: DamageKind, name: &'static str) -> DamageDescriptor {
    DamageDescriptor {
        kind,
        name,
        repair_order: None,
        repair_score: 0,
        break_score: 0,
        broken: None,
        auto_repair: false,
    }
}

pub static DAMAGE_TABLE: [DamageDescriptor; 16] = [
    malfunction(
        DamageKind::MainGunMalfunction,
        "Main Gun Malfunction",
        CrewOrder::RepairMainGun,
        4,
        11,
        DamageKind::MainGunBroken,
    ),
    permanent(DamageKind::MainGunBroken, "Main Gun Broken"),
    malfunction(
        DamageKind::TurretTraverseMalfunction,
        "Turret Traverse Malfunction",
        CrewOrder::RepairTurretTraverse,
        4,
        0,
        DamageKind::TurretTraverseBroken,
    ),
    permanent(DamageKind::TurretTraverseBroken, "Turret Traverse Broken"),
    malfunction(
        DamageKind::RadioMalfunction,
        "Radio Malfunction",
        CrewOrder::RepairRadio,
        6,
        12,
        DamageKind::RadioBroken,
    ),
    permanent(DamageKind::RadioBroken, "Radio Broken"),
    malfunction(
        DamageKind::IntercomMalfunction,
        "Intercom Malfunction",
        CrewOrder::RepairIntercom,
        8,
        12,
        DamageKind::IntercomBroken,
    ),
    permanent(DamageKind::IntercomBroken, "Intercom Broken"),
    malfunction(
        DamageKind::AaMgMalfunction,
        "AA MG Malfunction",
        CrewOrder::RepairAaMg,
        8,
        12,
        DamageKind::AaMgBroken,
    ),
    permanent(DamageKind::AaMgBroken, "AA MG Broken"),
    malfunction(
        DamageKind::CoaxMgMalfunction,
        "Co-ax MG Malfunction",
        CrewOrder::RepairCoaxMg,
        8,
        12,
        DamageKind::CoaxMgBroken,
    ),
    permanent(DamageKind::CoaxMgBroken, "Co-ax MG Broken"),
    malfunction(
        DamageKind::BowMgMalfunction,
        "Bow MG Malfunction",
        CrewOrder::RepairBowMg,
        8,
        12,
        DamageKind::BowMgBroken,
    ),
    permanent(DamageKind::BowMgBroken, "Bow MG Broken"),
    permanent(DamageKind::GunSightBroken, "Gun Sight Broken"),
    permanent(DamageKind::EngineKnockedOut, "Engine Knocked Out"),
];

impl DamageKind {
    pub fn descriptor(&self) -> &'static DamageDescriptor {
        DAMAGE_TABLE
            .iter()
            .find(|d| d.kind == *self)
            .unwrap_or_else(|| panic!("{:?} missing from the damage table", self))
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn is_repairable(&self) -> bool {
        self.descriptor().repair_order.is_some()
    }

    /// The malfunction this kind is the broken form of
    pub fn malfunction_form(&self) -> Option<DamageKind> {
        DAMAGE_TABLE
            .iter()
            .find(|d| d.broken == Some(*self))
            .map(|d| d.kind)
    }
}

/// Damage currently affecting the player tank
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageList {
    entries: Vec<DamageKind>,
}

impl DamageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: DamageKind) -> bool {
        self.entries.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DamageKind> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add damage; returns true when the list changed
    ///
    /// A malfunction is ignored while its broken form is present, and adding
    /// a broken form removes the malfunction it supersedes.
    pub fn add(&mut self, kind: DamageKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        if let Some(broken) = kind.descriptor().broken {
            if self.contains(broken) {
                return false;
            }
        }
        if let Some(malfunction) = kind.malfunction_form() {
            self.entries.retain(|k| *k != malfunction);
        }
        self.entries.push(kind);
        true
    }

    /// Remove a repaired malfunction; broken entries cannot be removed
    fn clear_malfunction(&mut self, kind: DamageKind) {
        if kind.is_repairable() {
            self.entries.retain(|k| *k != kind);
        }
    }

    pub fn has_repairable(&self) -> bool {
        self.entries.iter().any(|k| k.is_repairable())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|k| k.name()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairOutcome {
    Repaired,
    NoChange,
    Broken(DamageKind),
}

/// Bonuses that lower the effective repair roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairHelp {
    pub mechanic: bool,
    pub help_repair: bool,
}

fn worsens(descriptor: &DamageDescriptor, raw: i32, double_six: bool) -> bool {
    descriptor.broken.is_some()
        && ((descriptor.break_score > 0 && raw >= descriptor.break_score) || double_six)
}

/// Attempt to repair one malfunction during an encounter
///
/// Panics when asked to repair damage that is not on the list or has no
/// repair order.
pub fn attempt_repair(
    damage: &mut DamageList,
    kind: DamageKind,
    help: RepairHelp,
    repairer: &str,
    dice: &mut dyn Dice,
) -> (RepairOutcome, RollRecord) {
    assert!(damage.contains(kind), "{:?} is not on the damage list", kind);
    let descriptor = kind.descriptor();
    assert!(descriptor.repair_order.is_some(), "{:?} cannot be repaired", kind);

    let roll = dice.two_d6();
    let raw = roll.total();
    let mut modifiers = Vec::new();
    if help.mechanic {
        modifiers.push(Modifier::new("Mechanic", -1));
    }
    if help.help_repair {
        modifiers.push(Modifier::new("Gunner helping", -1));
    }
    let effective = raw + modifiers.iter().map(|m| m.value).sum::<i32>();

    let outcome = if worsens(descriptor, raw, roll.is_double_six()) {
        let broken = descriptor.broken.unwrap_or(kind);
        damage.add(broken);
        RepairOutcome::Broken(broken)
    } else if effective <= descriptor.repair_score {
        damage.clear_malfunction(kind);
        RepairOutcome::Repaired
    } else {
        RepairOutcome::NoChange
    };

    let text = match outcome {
        RepairOutcome::Repaired => format!("{} repaired", descriptor.name),
        RepairOutcome::NoChange => "No change".to_string(),
        RepairOutcome::Broken(b) => b.name().to_string(),
    };
    tracing::debug!("{} repair by {}: {} -> {}", descriptor.name, repairer, raw, text);
    let record = RollRecord::simple(
        RollKind::Repair,
        repairer,
        descriptor.name,
        descriptor.repair_score,
        roll.faces(),
        text,
    )
    .with_modifiers(modifiers);
    (outcome, record)
}

/// After an encounter, every auto-repair malfunction rolls once: it breaks on
/// its break score and is otherwise cleared
pub fn post_encounter_repair(
    damage: &mut DamageList,
    dice: &mut dyn Dice,
) -> Vec<(DamageKind, RepairOutcome)> {
    let pending: Vec<DamageKind> = damage
        .iter()
        .copied()
        .filter(|k| k.descriptor().auto_repair)
        .collect();

    let mut results = Vec::with_capacity(pending.len());
    for kind in pending {
        let descriptor = kind.descriptor();
        let raw = dice.two_d6().total();
        let outcome = match descriptor.broken {
            Some(broken) if descriptor.break_score > 0 && raw >= descriptor.break_score => {
                damage.add(broken);
                RepairOutcome::Broken(broken)
            }
            _ => {
                damage.clear_malfunction(kind);
                RepairOutcome::Repaired
            }
        };
        results.push((kind, outcome));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use proptest::prelude::*;

    #[test]
    fn test_table_is_complete_and_consistent() {
        for descriptor in DAMAGE_TABLE.iter() {
            assert_eq!(descriptor.kind.descriptor().name, descriptor.name);
            if let Some(order) = descriptor.repair_order {
                assert_eq!(order.repairs(), Some(descriptor.kind));
            }
            if let Some(broken) = descriptor.broken {
                assert!(!broken.is_repairable());
                assert_eq!(broken.malfunction_form(), Some(descriptor.kind));
            }
        }
    }

    #[test]
    fn test_break_supersedes_malfunction() {
        let mut list = DamageList::new();
        assert!(list.add(DamageKind::RadioMalfunction));
        assert!(list.add(DamageKind::RadioBroken));
        assert!(!list.contains(DamageKind::RadioMalfunction));
        assert!(!list.add(DamageKind::RadioMalfunction));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_repair_success() {
        let mut list = DamageList::new();
        list.add(DamageKind::MainGunMalfunction);
        let mut dice = ScriptedDice::new([2, 3]);
        let help = RepairHelp {
            mechanic: true,
            help_repair: false,
        };
        let (outcome, record) =
            attempt_repair(&mut list, DamageKind::MainGunMalfunction, help, "Loader", &mut dice);
        assert_eq!(outcome, RepairOutcome::Repaired);
        assert!(list.is_empty());
        assert_eq!(record.total_modifier, -1);
    }

    #[test]
    fn test_repair_failure_keeps_malfunction() {
        let mut list = DamageList::new();
        list.add(DamageKind::MainGunMalfunction);
        let mut dice = ScriptedDice::new([3, 4]);
        let (outcome, _) = attempt_repair(
            &mut list,
            DamageKind::MainGunMalfunction,
            RepairHelp::default(),
            "Loader",
            &mut dice,
        );
        assert_eq!(outcome, RepairOutcome::NoChange);
        assert!(list.contains(DamageKind::MainGunMalfunction));
    }

    #[test]
    fn test_break_score_worsens() {
        let mut list = DamageList::new();
        list.add(DamageKind::MainGunMalfunction);
        let mut dice = ScriptedDice::new([5, 6]);
        let (outcome, _) = attempt_repair(
            &mut list,
            DamageKind::MainGunMalfunction,
            RepairHelp::default(),
            "Loader",
            &mut dice,
        );
        assert_eq!(outcome, RepairOutcome::Broken(DamageKind::MainGunBroken));
        assert!(list.contains(DamageKind::MainGunBroken));
        assert!(!list.contains(DamageKind::MainGunMalfunction));
    }

    #[test]
    fn test_double_six_breaks_traverse_without_break_score() {
        let mut list = DamageList::new();
        list.add(DamageKind::TurretTraverseMalfunction);
        let mut dice = ScriptedDice::new([6, 6]);
        let (outcome, _) = attempt_repair(
            &mut list,
            DamageKind::TurretTraverseMalfunction,
            RepairHelp::default(),
            "Loader",
            &mut dice,
        );
        assert_eq!(outcome, RepairOutcome::Broken(DamageKind::TurretTraverseBroken));
    }

    #[test]
    fn test_post_encounter_repair() {
        let mut list = DamageList::new();
        list.add(DamageKind::TurretTraverseMalfunction);
        list.add(DamageKind::MainGunMalfunction);
        list.add(DamageKind::EngineKnockedOut);
        // traverse rolls 12 but has no break score; main gun rolls 11 and breaks
        let mut dice = ScriptedDice::new([6, 6, 5, 6]);
        let results = post_encounter_repair(&mut list, &mut dice);
        assert_eq!(results.len(), 2);
        assert!(!list.contains(DamageKind::TurretTraverseMalfunction));
        assert!(list.contains(DamageKind::MainGunBroken));
        assert!(list.contains(DamageKind::EngineKnockedOut));
    }

    fn damage_kind() -> impl Strategy<Value = DamageKind> {
        (0usize..DAMAGE_TABLE.len()).prop_map(|i| DAMAGE_TABLE[i].kind)
    }

    proptest! {
        #[test]
        fn prop_malfunction_and_break_never_coexist(
            adds in proptest::collection::vec(damage_kind(), 0..30),
            faces in proptest::collection::vec(1u8..=6, 60),
        ) {
            let mut list = DamageList::new();
            let mut dice = ScriptedDice::new(faces);
            let mut broken_seen = Vec::new();
            for kind in adds {
                list.add(kind);
                if kind.is_repairable() && list.contains(kind) && dice.remaining() >= 2 {
                    attempt_repair(&mut list, kind, RepairHelp::default(), "Loader", &mut dice);
                }
                for d in DAMAGE_TABLE.iter() {
                    if let Some(broken) = d.broken {
                        prop_assert!(!(list.contains(d.kind) && list.contains(broken)));
                        if list.contains(broken) && !broken_seen.contains(&broken) {
                            broken_seen.push(broken);
                        }
                    }
                }
                for broken in &broken_seen {
                    prop_assert!(list.contains(*broken));
                }
            }
        }
    }
}
