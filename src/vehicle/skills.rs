//! Crew skills and activation checks
//!
//! A skill activates on 1D100 at or below its chance for the crew member's
//! level in it. Battle Leadership, when it activates for the commander at the
//! start of a round, raises every other activation chance by 5 for that round.

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;

/// Bonus added to other skill checks while Battle Leadership is active
pub const BATTLE_LEADERSHIP_BONUS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    FireDirection,
    DriverDirection,
    BattleLeadership,
    KeenSenses,
    QuickTrigger,
    KnowsWeakSpots,
    TargetTracking,
    Gyrostabilizer,
    FastHands,
    ShellJuggler,
    DragRacer,
    EyeForCover,
    ToughMudder,
    CautiousDriver,
    ApprenticeGunner,
    ShellTosser,
    EagleEyed,
    PocketBible,
    Gymnast,
    LightningReflexes,
    TrueGrit,
    Mechanic,
}

impl SkillKind {
    /// Activation chance at each level of the skill
    pub fn chances(&self) -> &'static [u8] {
        match self {
            SkillKind::FireDirection => &[3, 5, 7],
            SkillKind::DriverDirection => &[3, 5, 7],
            SkillKind::BattleLeadership => &[2, 4, 6],
            SkillKind::KeenSenses => &[10, 20, 30],
            SkillKind::QuickTrigger => &[5, 10, 15],
            SkillKind::KnowsWeakSpots => &[5, 10, 15],
            SkillKind::TargetTracking => &[5, 10, 15],
            SkillKind::Gyrostabilizer => &[15, 30, 60, 100],
            SkillKind::FastHands => &[5, 10, 15],
            SkillKind::ShellJuggler => &[3, 5, 7],
            SkillKind::DragRacer => &[10, 20, 30],
            SkillKind::EyeForCover => &[3, 5, 7],
            SkillKind::ToughMudder => &[3, 5, 7],
            SkillKind::CautiousDriver => &[5, 10, 15],
            SkillKind::ApprenticeGunner => &[10, 20, 30],
            SkillKind::ShellTosser => &[10, 20, 30],
            SkillKind::EagleEyed => &[5, 10, 15],
            SkillKind::PocketBible => &[25, 50, 75],
            SkillKind::Gymnast => &[40, 60, 80],
            SkillKind::LightningReflexes => &[40, 60, 80],
            SkillKind::TrueGrit => &[20, 40, 60, 80, 100],
            SkillKind::Mechanic => &[25, 60, 90],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillKind::FireDirection => "Fire Direction",
            SkillKind::DriverDirection => "Driver Direction",
            SkillKind::BattleLeadership => "Battle Leadership",
            SkillKind::KeenSenses => "Keen Senses",
            SkillKind::QuickTrigger => "Quick Trigger",
            SkillKind::KnowsWeakSpots => "Knows Weak Spots",
            SkillKind::TargetTracking => "Target Tracking",
            SkillKind::Gyrostabilizer => "Gyrostabilizer",
            SkillKind::FastHands => "Fast Hands",
            SkillKind::ShellJuggler => "Shell Juggler",
            SkillKind::DragRacer => "Drag Racer",
            SkillKind::EyeForCover => "Eye for Cover",
            SkillKind::ToughMudder => "Tough Mudder",
            SkillKind::CautiousDriver => "Cautious Driver",
            SkillKind::ApprenticeGunner => "Apprentice Gunner",
            SkillKind::ShellTosser => "Shell Tosser",
            SkillKind::EagleEyed => "Eagle Eyed",
            SkillKind::PocketBible => "Pocket Bible",
            SkillKind::Gymnast => "Gymnast",
            SkillKind::LightningReflexes => "Lightning Reflexes",
            SkillKind::TrueGrit => "True Grit",
            SkillKind::Mechanic => "Mechanic",
        }
    }
}

/// A skill held by a crew member, with a 0-based level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub kind: SkillKind,
    pub level: u8,
}

impl Skill {
    pub fn new(kind: SkillKind, level: u8) -> Self {
        Self { kind, level }
    }

    /// Activation chance, capped at the highest level the skill has
    pub fn chance(&self) -> u8 {
        let chances = self.kind.chances();
        let index = (self.level as usize).min(chances.len() - 1);
        chances[index]
    }

    /// Roll to activate; `bonus` comes from Battle Leadership
    pub fn check(&self, bonus: u8, dice: &mut dyn Dice) -> bool {
        let bonus = if self.kind == SkillKind::BattleLeadership {
            0
        } else {
            bonus
        };
        let chance = self.chance().saturating_add(bonus).min(100);
        dice.percent(chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::ScriptedDice;

    #[test]
    fn test_chance_by_level() {
        assert_eq!(Skill::new(SkillKind::Gyrostabilizer, 0).chance(), 15);
        assert_eq!(Skill::new(SkillKind::Gyrostabilizer, 3).chance(), 100);
        assert_eq!(Skill::new(SkillKind::Mechanic, 9).chance(), 90);
    }

    #[test]
    fn test_check_uses_leadership_bonus() {
        let skill = Skill::new(SkillKind::FireDirection, 0);
        let mut dice = ScriptedDice::new([8]);
        assert!(skill.check(BATTLE_LEADERSHIP_BONUS, &mut dice));
        let mut dice = ScriptedDice::new([8]);
        assert!(!skill.check(0, &mut dice));
    }

    #[test]
    fn test_leadership_does_not_boost_itself() {
        let skill = Skill::new(SkillKind::BattleLeadership, 0);
        let mut dice = ScriptedDice::new([5]);
        assert!(!skill.check(BATTLE_LEADERSHIP_BONUS, &mut dice));
    }
}
