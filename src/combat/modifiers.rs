//! Named dice roll modifiers, resolutions and roll records

use serde::{Deserialize, Serialize};

use crate::core::dice::TwoD6;

/// A named, signed Dice Roll Modifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    pub value: i32,
}

impl Modifier {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Which way modifiers move the required roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionKind {
    /// required = base - sum(modifiers); positive modifiers make a hit harder
    ToHit,
    /// required = base + sum(modifiers); negative modifiers make a kill harder
    ToKill,
    /// required = base - sum(modifiers); same sense as To-Hit
    Ift,
}

/// Output of a combat calculator: base score, every modifier applied, and
/// the final required roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub kind: ResolutionKind,
    pub base: i32,
    pub modifiers: Vec<Modifier>,
    pub required: i32,
}

impl Resolution {
    pub fn new(kind: ResolutionKind, base: i32) -> Self {
        Self {
            kind,
            base,
            modifiers: Vec::new(),
            required: base,
        }
    }

    /// Record a modifier; zero-valued modifiers are dropped
    pub fn push(&mut self, name: impl Into<String>, value: i32) {
        if value == 0 {
            return;
        }
        self.modifiers.push(Modifier::new(name, value));
        self.required = self.compute_required();
    }

    pub fn total_modifier(&self) -> i32 {
        self.modifiers.iter().map(|m| m.value).sum()
    }

    fn compute_required(&self) -> i32 {
        match self.kind {
            ResolutionKind::ToHit | ResolutionKind::Ift => self.base - self.total_modifier(),
            ResolutionKind::ToKill => self.base + self.total_modifier(),
        }
    }

    /// Base, modifiers and required roll agree with each other
    pub fn is_consistent(&self) -> bool {
        self.required == self.compute_required()
    }
}

/// Is a roll critical against this requirement?
///
/// Natural 2, or a total under half the required score.
pub fn is_critical(roll: &TwoD6, required: i32) -> bool {
    roll.is_snake_eyes() || roll.total() * 2 < required
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollKind {
    ToHit,
    ToKill,
    Ift,
    HitLocation,
    Penetration,
    MinorDamage,
    Wound,
    StunCheck,
    BailOut,
    Recovery,
    Repair,
    Spotting,
    Movement,
    RateOfFire,
    PinTest,
    MoraleRecovery,
    FriendlySupport,
    RandomEvent,
    Ambush,
    SkillCheck,
}

/// One resolved roll, reported outward and then discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub kind: RollKind,
    pub attacker: String,
    pub target: String,
    pub base: i32,
    pub modifiers: Vec<Modifier>,
    pub total_modifier: i32,
    pub required: i32,
    /// Raw die faces as drawn
    pub dice: Vec<u8>,
    pub outcome: String,
}

impl RollRecord {
    pub fn from_resolution(
        kind: RollKind,
        attacker: impl Into<String>,
        target: impl Into<String>,
        resolution: &Resolution,
        dice: Vec<u8>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            attacker: attacker.into(),
            target: target.into(),
            base: resolution.base,
            modifiers: resolution.modifiers.clone(),
            total_modifier: resolution.total_modifier(),
            required: resolution.required,
            dice,
            outcome: outcome.into(),
        }
    }

    /// A roll against a fixed target number with no modifiers
    pub fn simple(
        kind: RollKind,
        attacker: impl Into<String>,
        target: impl Into<String>,
        required: i32,
        dice: Vec<u8>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            attacker: attacker.into(),
            target: target.into(),
            base: required,
            modifiers: Vec::new(),
            total_modifier: 0,
            required,
            dice,
            outcome: outcome.into(),
        }
    }

    /// Attach modifiers that adjusted the roll rather than the target number
    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.total_modifier = modifiers.iter().map(|m| m.value).sum();
        self.modifiers = modifiers;
        self
    }

    pub fn dice_total(&self) -> i32 {
        self.dice.iter().map(|d| *d as i32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hit_modifiers_subtract() {
        let mut res = Resolution::new(ResolutionKind::ToHit, 10);
        res.push("Turret rotated", 1);
        res.push("Acquired target", -2);
        assert_eq!(res.required, 11);
        assert_eq!(res.base - res.required, res.total_modifier());
    }

    #[test]
    fn test_to_kill_modifiers_add() {
        let mut res = Resolution::new(ResolutionKind::ToKill, 10);
        res.push("Hull Front armour", -8);
        res.push("Close range", 1);
        assert_eq!(res.required, 3);
        assert_eq!(res.required - res.base, res.total_modifier());
    }

    #[test]
    fn test_zero_modifiers_are_not_listed() {
        let mut res = Resolution::new(ResolutionKind::Ift, 7);
        res.push("Terrain", 0);
        assert!(res.modifiers.is_empty());
        assert!(res.is_consistent());
    }

    #[test]
    fn test_critical_rule() {
        assert!(is_critical(&TwoD6::new(1, 1), 3));
        assert!(is_critical(&TwoD6::new(1, 2), 7));
        assert!(!is_critical(&TwoD6::new(2, 2), 7));
        assert!(!is_critical(&TwoD6::new(2, 2), 8));
        assert!(is_critical(&TwoD6::new(2, 2), 9));
    }
}
