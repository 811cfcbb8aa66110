//! Bailing out of a knocked-out tank

use serde::{Deserialize, Serialize};

use crate::combat::constants::BAIL_OUT_TARGET;
use crate::combat::modifiers::{Modifier, RollKind, RollRecord};
use crate::core::dice::Dice;
use crate::damage::wounds::{wound_check, WoundCause, WoundResult};
use crate::vehicle::crew::{CrewMember, CrewPosition, Hatch};
use crate::vehicle::skills::SkillKind;
use crate::vehicle::tank::PlayerTank;

/// What became of one crew member when the tank was knocked out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewFate {
    pub position: CrewPosition,
    pub name: String,
    pub wound: WoundResult,
    /// None when the crew member was in no state to try
    pub bailed_out: Option<bool>,
    pub post_bail_wound: Option<WoundResult>,
    pub survived: bool,
}

/// Bail-out roll: 2D6 <= 9, harder through a shut or missing hatch or while
/// stunned
pub fn bail_out_check(member: &CrewMember, bonus: u8, dice: &mut dyn Dice) -> (bool, RollRecord) {
    let roll = dice.two_d6();
    let mut modifiers = Vec::new();
    match member.hatch {
        Hatch::Open => {}
        Hatch::Shut => modifiers.push(Modifier::new("Hatch shut", 1)),
        Hatch::None => modifiers.push(Modifier::new("No hatch", 2)),
    }
    if member.stunned {
        modifiers.push(Modifier::new("Stunned", 2));
    }
    if member.skill_check(SkillKind::Gymnast, bonus, dice) {
        modifiers.push(Modifier::new("Gymnast", -2));
    }
    let total = roll.total() + modifiers.iter().map(|m| m.value).sum::<i32>();
    let success = total <= BAIL_OUT_TARGET;
    let record = RollRecord::simple(
        RollKind::BailOut,
        member.name.clone(),
        "Bail Out",
        BAIL_OUT_TARGET,
        roll.faces(),
        if success { "Bailed Out" } else { "Trapped" },
    )
    .with_modifiers(modifiers);
    (success, record)
}

/// Bail-out attempt and collateral wound for one crew member, then the
/// outcome for anyone left inside
fn bail_out_or_die(
    member: &mut CrewMember,
    fate: &mut CrewFate,
    bonus: u8,
    dice: &mut dyn Dice,
    records: &mut Vec<RollRecord>,
) {
    if member.alive && !member.unconscious {
        let (out, record) = bail_out_check(member, bonus, dice);
        records.push(record);
        fate.bailed_out = Some(out);
        if out {
            member.hatch = Hatch::Open;
            let post = wound_check(member, WoundCause::Collateral, bonus, dice);
            records.extend(post.records);
            fate.post_bail_wound = Some(post.result);
        }
    }

    if fate.bailed_out != Some(true) && member.alive {
        member.alive = false;
        member.stunned = false;
        member.unconscious = false;
    }
    fate.survived = member.alive;
    tracing::debug!(
        "{} ({}): {}",
        member.name,
        member.position.name(),
        member.status_text()
    );
}

/// Resolve every crew member's fate in roster order
///
/// Each rolls a wound from the penetration, then a bail-out if still
/// conscious, then a collateral wound once outside. Anyone left inside dies
/// with the tank.
pub fn knock_out_cascade(
    tank: &mut PlayerTank,
    cause: WoundCause,
    dice: &mut dyn Dice,
) -> (Vec<CrewFate>, Vec<RollRecord>) {
    let bonus = tank.leadership_bonus;
    let mut fates = Vec::with_capacity(tank.crew.len());
    let mut records = Vec::new();

    for member in tank.crew.iter_mut() {
        if !member.alive {
            continue;
        }
        let wound = wound_check(member, cause, bonus, dice);
        records.extend(wound.records);

        let mut fate = CrewFate {
            position: member.position,
            name: member.name.clone(),
            wound: wound.result,
            bailed_out: None,
            post_bail_wound: None,
            survived: false,
        };

        bail_out_or_die(member, &mut fate, bonus, dice, &mut records);
        fates.push(fate);
    }
    (fates, records)
}

/// Every living crew member tries to bail out of an abandoned tank
///
/// Same as the knock-out cascade without the penetration wound: conscious
/// crew roll to get out and take a collateral wound once outside, the
/// unconscious and the trapped are lost with the tank.
pub fn abandon_tank(tank: &mut PlayerTank, dice: &mut dyn Dice) -> (Vec<CrewFate>, Vec<RollRecord>) {
    let bonus = tank.leadership_bonus;
    let mut fates = Vec::with_capacity(tank.crew.len());
    let mut records = Vec::new();

    for member in tank.crew.iter_mut() {
        if !member.alive {
            continue;
        }
        let mut fate = CrewFate {
            position: member.position,
            name: member.name.clone(),
            wound: WoundResult::None,
            bailed_out: None,
            post_bail_wound: None,
            survived: false,
        };
        bail_out_or_die(member, &mut fate, bonus, dice, &mut records);
        fates.push(fate);
    }
    (fates, records)
}
