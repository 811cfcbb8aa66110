//! Pin tests and morale recovery for hostile units

use serde::{Deserialize, Serialize};

use crate::combat::modifiers::{RollKind, RollRecord};
use crate::core::dice::Dice;
use crate::damage::wounds::resist_stun;
use crate::hostile::unit::{HostileUnit, UnitFate};

/// A critical hit the armour stopped stuns the crew unless 2D6 <= 6
pub const CRITICAL_HIT_STUN_THRESHOLD: i32 = 6;

/// An HE hit the armour stopped stuns the crew unless 2D6 <= 8
pub const HE_HIT_STUN_THRESHOLD: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinResult {
    Passed,
    Pinned,
    /// Failed while already pinned; the unit is gone
    Broken,
}

impl PinResult {
    pub fn text(&self) -> &'static str {
        match self {
            PinResult::Passed => "Passed",
            PinResult::Pinned => "Pinned",
            PinResult::Broken => "Broken",
        }
    }
}

/// Pin test: 2D6 at or below morale passes
///
/// Classes that cannot be pinned pass without a roll.
pub fn pin_test(unit: &mut HostileUnit, attacker: &str, dice: &mut dyn Dice) -> (PinResult, Option<RollRecord>) {
    if !unit.alive || !unit.class.can_be_pinned() {
        return (PinResult::Passed, None);
    }
    let roll = dice.two_d6();
    let morale = unit.morale as i32;
    let result = if roll.total() <= morale {
        PinResult::Passed
    } else if unit.pinned {
        PinResult::Broken
    } else {
        PinResult::Pinned
    };
    match result {
        PinResult::Passed => {}
        PinResult::Pinned => unit.pinned = true,
        PinResult::Broken => unit.eliminate(UnitFate::Broken),
    }
    tracing::debug!("Pin test for {}: {}", unit.label(), result.text());
    let record = RollRecord::simple(
        RollKind::PinTest,
        attacker,
        unit.label(),
        morale,
        roll.faces(),
        result.text(),
    );
    (result, Some(record))
}

/// Stun test for the crew of an armoured unit that survived a hit
///
/// Returns whether the crew was stunned, or None when there is no crew to
/// stun or it is already stunned.
pub fn stun_test(
    unit: &mut HostileUnit,
    attacker: &str,
    threshold: i32,
    dice: &mut dyn Dice,
) -> Option<(bool, RollRecord)> {
    if !unit.alive || unit.stunned || !unit.class.is_armoured() {
        return None;
    }
    let (resisted, record) = resist_stun(attacker, unit.label(), threshold, dice, |_| Vec::new());
    if !resisted {
        unit.stunned = true;
    }
    tracing::debug!(
        "Stun test for {}: {}",
        unit.label(),
        if resisted { "resisted" } else { "stunned" }
    );
    Some((!resisted, record))
}

/// Pinned or stunned units try to steady themselves on 2D6 <= morale
///
/// Returns None when the unit has nothing to recover from.
pub fn morale_recovery(unit: &mut HostileUnit, dice: &mut dyn Dice) -> Option<(bool, RollRecord)> {
    if !unit.alive || !(unit.pinned || unit.stunned) {
        return None;
    }
    let roll = dice.two_d6();
    let recovered = roll.total() <= unit.morale as i32;
    if recovered {
        unit.pinned = false;
        unit.stunned = false;
    }
    let record = RollRecord::simple(
        RollKind::MoraleRecovery,
        unit.label(),
        "Morale",
        unit.morale as i32,
        roll.faces(),
        if recovered { "Recovered" } else { "No Change" },
    );
    Some((recovered, record))
}
