//! Crew wound, stun and recovery resolution

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    STUN_RECOVERY_TARGET, STUN_THRESHOLD, UNCONSCIOUS_RECOVERY_TARGET,
};
use crate::combat::modifiers::{Modifier, RollKind, RollRecord};
use crate::core::dice::Dice;
use crate::core::types::{Facing, HitLocation};
use crate::vehicle::crew::{CrewMember, CrewPosition, WoundLevel};
use crate::vehicle::skills::SkillKind;

/// Modified wound roll that collateral damage adds for exposed crew
pub const COLLATERAL_MODIFIER: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WoundCause {
    /// Shell penetrated the vehicle
    Penetration {
        location: HitLocation,
        facing: Facing,
    },
    /// Small arms, splinters or blast striking a crewman outside the armour
    Collateral,
}

impl WoundCause {
    pub fn name(&self) -> &'static str {
        match self {
            WoundCause::Penetration { .. } => "Penetration",
            WoundCause::Collateral => "Collateral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WoundResult {
    None,
    Light,
    Serious,
    SeriousStunned,
    VerySeriousUnconscious,
    Killed,
}

impl WoundResult {
    /// Look up the wound table on a modified total
    pub fn from_total(total: i32) -> Self {
        match total {
            i32::MIN..=6 => WoundResult::None,
            7..=8 => WoundResult::Light,
            9 => WoundResult::Serious,
            10 => WoundResult::SeriousStunned,
            11 => WoundResult::VerySeriousUnconscious,
            _ => WoundResult::Killed,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            WoundResult::None => "No Effect",
            WoundResult::Light => "Light Wound",
            WoundResult::Serious => "Serious Wound",
            WoundResult::SeriousStunned => "Serious Wound, Stunned",
            WoundResult::VerySeriousUnconscious => "Very Serious Wound, Unconscious",
            WoundResult::Killed => "Killed",
        }
    }
}

/// Every roll made while resolving one wound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundReport {
    pub result: WoundResult,
    pub records: Vec<RollRecord>,
}

fn location_modifier(position: CrewPosition, location: HitLocation) -> i32 {
    use CrewPosition::*;
    match (location, position) {
        (HitLocation::Turret, Commander | Gunner | Loader) => 1,
        (HitLocation::Turret, Driver | AssistantDriver) => -1,
        (HitLocation::Hull, Commander | Gunner) => -1,
        (HitLocation::Hull, Driver | AssistantDriver) => 1,
        _ => 0,
    }
}

fn facing_modifier(position: CrewPosition, facing: Facing) -> i32 {
    use CrewPosition::*;
    match (facing, position) {
        (Facing::Front, Driver | AssistantDriver) => 1,
        (Facing::Rear, Commander | Loader) => 1,
        (Facing::Rear, Driver | AssistantDriver) => -1,
        _ => 0,
    }
}

/// Resolve a wound roll against one crew member and apply the result
///
/// Dead crew are skipped without drawing dice.
pub fn wound_check(
    member: &mut CrewMember,
    cause: WoundCause,
    bonus: u8,
    dice: &mut dyn Dice,
) -> WoundReport {
    let mut records = Vec::new();
    if !member.alive {
        return WoundReport {
            result: WoundResult::None,
            records,
        };
    }

    let roll = dice.two_d6();
    let mut modifiers = Vec::new();

    let prior = member.wound.prior_wound_modifier();
    if prior > 0 {
        modifiers.push(Modifier::new("Already wounded", prior));
    }

    match cause {
        WoundCause::Penetration { location, facing } => {
            let mut loc = location_modifier(member.position, location);
            if member.is_exposed() {
                loc = -loc;
            }
            if loc != 0 {
                modifiers.push(Modifier::new(format!("{} hit", location.name()), loc));
            }
            let face = facing_modifier(member.position, facing);
            if face != 0 {
                modifiers.push(Modifier::new("Facing", face));
            }
        }
        WoundCause::Collateral => {
            modifiers.push(Modifier::new("Collateral damage", COLLATERAL_MODIFIER));
        }
    }

    if member.skill_check(SkillKind::TrueGrit, bonus, dice) {
        modifiers.push(Modifier::new("True Grit", -1));
    }

    let total = roll.total() + modifiers.iter().map(|m| m.value).sum::<i32>();
    let mut result = if roll.is_double_six() {
        WoundResult::Killed
    } else {
        WoundResult::from_total(total)
    };

    if result == WoundResult::Killed && member.skill_check(SkillKind::PocketBible, bonus, dice) {
        result = WoundResult::VerySeriousUnconscious;
    }
    if cause == WoundCause::Collateral
        && result != WoundResult::None
        && member.skill_check(SkillKind::LightningReflexes, bonus, dice)
    {
        result = WoundResult::None;
    }

    records.push(
        RollRecord::simple(
            RollKind::Wound,
            cause.name(),
            member.name.clone(),
            total,
            roll.faces(),
            result.text(),
        )
        .with_modifiers(modifiers),
    );

    match result {
        WoundResult::None => {}
        WoundResult::Light => {
            member.wound = member.wound.max(WoundLevel::Light);
        }
        WoundResult::Serious => {
            member.wound = member.wound.max(WoundLevel::Serious);
            let (_, record) = stun_check(member, STUN_THRESHOLD, bonus, dice);
            records.push(record);
        }
        WoundResult::SeriousStunned => {
            member.wound = member.wound.max(WoundLevel::Serious);
            if !member.unconscious {
                member.stunned = true;
            }
        }
        WoundResult::VerySeriousUnconscious => {
            member.wound = WoundLevel::VerySerious;
            member.unconscious = true;
            member.stunned = false;
        }
        WoundResult::Killed => {
            member.alive = false;
            member.stunned = false;
            member.unconscious = false;
        }
    }

    tracing::debug!("Wound roll for {}: {}", member.name, result.text());
    WoundReport { result, records }
}

/// Stun-resistance roll shared by crew and hostile vehicle crews
///
/// 2D6 plus whatever `modifiers` adds, at or below `threshold`, resists.
/// `modifiers` runs after the dice so skill checks draw in a fixed order.
pub fn resist_stun(
    source: impl Into<String>,
    subject: impl Into<String>,
    threshold: i32,
    dice: &mut dyn Dice,
    modifiers: impl FnOnce(&mut dyn Dice) -> Vec<Modifier>,
) -> (bool, RollRecord) {
    let roll = dice.two_d6();
    let modifiers = modifiers(dice);
    let total = roll.total() + modifiers.iter().map(|m| m.value).sum::<i32>();
    let resisted = total <= threshold;
    let record = RollRecord::simple(
        RollKind::StunCheck,
        source,
        subject,
        threshold,
        roll.faces(),
        if resisted { "Resisted" } else { "Stunned" },
    )
    .with_modifiers(modifiers);
    (resisted, record)
}

/// Crew stun check: True Grit -1 on the roll
///
/// A failed check stuns a conscious crew member. Returns whether it resisted.
pub fn stun_check(
    member: &mut CrewMember,
    threshold: i32,
    bonus: u8,
    dice: &mut dyn Dice,
) -> (bool, RollRecord) {
    let (resisted, record) = resist_stun("Stun", member.name.clone(), threshold, dice, |dice| {
        let mut modifiers = Vec::new();
        if member.skill_check(SkillKind::TrueGrit, bonus, dice) {
            modifiers.push(Modifier::new("True Grit", -1));
        }
        modifiers
    });
    if !resisted && member.alive && !member.unconscious {
        member.stunned = true;
    }
    (resisted, record)
}

/// Recovery roll for a stunned or unconscious crew member
///
/// Stunned crew shake it off on 2D6 <= 8; unconscious crew come round
/// (still stunned) on 2D6 <= 5. Returns None when there is nothing to recover.
pub fn recovery_check(member: &mut CrewMember, dice: &mut dyn Dice) -> Option<RollRecord> {
    if !member.alive || !(member.stunned || member.unconscious) {
        return None;
    }
    let roll = dice.two_d6();
    let (target, outcome) = if member.unconscious {
        if roll.total() <= UNCONSCIOUS_RECOVERY_TARGET {
            member.unconscious = false;
            member.stunned = true;
            (UNCONSCIOUS_RECOVERY_TARGET, "Regains consciousness")
        } else {
            (UNCONSCIOUS_RECOVERY_TARGET, "Remains unconscious")
        }
    } else if roll.total() <= STUN_RECOVERY_TARGET {
        member.stunned = false;
        (STUN_RECOVERY_TARGET, "Recovers")
    } else {
        (STUN_RECOVERY_TARGET, "Remains stunned")
    };
    Some(RollRecord::simple(
        RollKind::Recovery,
        "Recovery",
        member.name.clone(),
        target,
        roll.faces(),
        outcome,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;
    use crate::vehicle::crew::Hatch;

    fn gunner() -> CrewMember {
        CrewMember::new("Cpl. Novak", CrewPosition::Gunner, Hatch::Shut)
    }

    const HULL_FRONT: WoundCause = WoundCause::Penetration {
        location: HitLocation::Hull,
        facing: Facing::Front,
    };

    #[test]
    fn test_wound_table_bands() {
        assert_eq!(WoundResult::from_total(6), WoundResult::None);
        assert_eq!(WoundResult::from_total(8), WoundResult::Light);
        assert_eq!(WoundResult::from_total(9), WoundResult::Serious);
        assert_eq!(WoundResult::from_total(10), WoundResult::SeriousStunned);
        assert_eq!(WoundResult::from_total(11), WoundResult::VerySeriousUnconscious);
        assert_eq!(WoundResult::from_total(14), WoundResult::Killed);
    }

    #[test]
    fn test_position_and_prior_wound_modifiers() {
        let mut member = gunner();
        member.wound = WoundLevel::Serious;
        // +2 prior wound, -1 gunner on a hull hit, front facing is neutral
        let mut dice = ScriptedDice::new([4, 5]);
        let report = wound_check(&mut member, HULL_FRONT, 0, &mut dice);
        assert_eq!(report.records[0].total_modifier, 1);
        assert_eq!(report.result, WoundResult::SeriousStunned);
        assert!(member.stunned);
    }

    #[test]
    fn test_modified_eleven_is_very_serious_and_clears_stun() {
        let mut member = CrewMember::new("Pvt. Russo", CrewPosition::Loader, Hatch::Shut);
        member.wound = WoundLevel::Serious;
        member.stunned = true;
        // loader takes no hull or front modifiers: 4+5 +2 = 11
        let mut dice = ScriptedDice::new([4, 5]);
        let report = wound_check(&mut member, HULL_FRONT, 0, &mut dice);
        assert_eq!(report.result, WoundResult::VerySeriousUnconscious);
        assert!(member.unconscious);
        assert!(!member.stunned);
        assert_eq!(member.wound, WoundLevel::VerySerious);
    }

    #[test]
    fn test_natural_twelve_kills() {
        let mut member = gunner();
        let mut dice = ScriptedDice::new([6, 6]);
        let report = wound_check(&mut member, HULL_FRONT, 0, &mut dice);
        assert_eq!(report.result, WoundResult::Killed);
        assert!(!member.alive);
    }

    #[test]
    fn test_pocket_bible_saves() {
        let mut member = gunner().with_skill(SkillKind::PocketBible, 2);
        let mut dice = ScriptedDice::new([6, 6, 30]);
        let report = wound_check(&mut member, HULL_FRONT, 0, &mut dice);
        assert_eq!(report.result, WoundResult::VerySeriousUnconscious);
        assert!(member.alive);
    }

    #[test]
    fn test_exposed_crew_invert_location_modifier() {
        let mut member = CrewMember::new("Sgt. Walker", CrewPosition::Commander, Hatch::Open);
        // turret hit normally +1 for the commander, inverted to -1
        let cause = WoundCause::Penetration {
            location: HitLocation::Turret,
            facing: Facing::Front,
        };
        let mut dice = ScriptedDice::new([4, 4]);
        let report = wound_check(&mut member, cause, 0, &mut dice);
        assert_eq!(report.records[0].total_modifier, -1);
        assert_eq!(report.result, WoundResult::Light);
    }

    #[test]
    fn test_collateral_penalty_and_lightning_reflexes() {
        let mut member = gunner().with_skill(SkillKind::LightningReflexes, 0);
        // 3+3 +2 = 8 light wound, reflexes roll 40 <= 40 ignores it
        let mut dice = ScriptedDice::new([3, 3, 40]);
        let report = wound_check(&mut member, WoundCause::Collateral, 0, &mut dice);
        assert_eq!(report.result, WoundResult::None);
        assert_eq!(member.wound, WoundLevel::None);
    }

    #[test]
    fn test_serious_wound_rolls_stun_check() {
        let mut member = CrewMember::new("Pvt. Russo", CrewPosition::Loader, Hatch::Shut);
        // 4+5 = 9 serious, stun check 5+4 = 9 > 7 stuns
        let mut dice = ScriptedDice::new([4, 5, 5, 4]);
        let report = wound_check(&mut member, HULL_FRONT, 0, &mut dice);
        assert_eq!(report.result, WoundResult::Serious);
        assert_eq!(report.records.len(), 2);
        assert!(member.stunned);
    }

    #[test]
    fn test_dead_crew_draw_no_dice() {
        let mut member = gunner();
        member.alive = false;
        let mut dice = ScriptedDice::new([]);
        assert_eq!(wound_check(&mut member, HULL_FRONT, 0, &mut dice).result, WoundResult::None);
    }

    #[test]
    fn test_recovery() {
        let mut member = gunner();
        assert!(recovery_check(&mut member, &mut ScriptedDice::new([])).is_none());

        member.unconscious = true;
        recovery_check(&mut member, &mut ScriptedDice::new([2, 3]));
        assert!(!member.unconscious);
        assert!(member.stunned);

        recovery_check(&mut member, &mut ScriptedDice::new([6, 3]));
        assert!(member.stunned);
        recovery_check(&mut member, &mut ScriptedDice::new([4, 4]));
        assert!(!member.stunned);
    }
}
