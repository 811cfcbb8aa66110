//! Crew roster
//!
//! The roster is an ordered vector with a cursor for UI cycling. Each
//! position is held by at most one crew member.

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::types::Nation;
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::{Skill, SkillKind};
use crate::vehicle::spec::{LoaderHatch, VehicleSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrewPosition {
    Commander,
    Gunner,
    Loader,
    Driver,
    AssistantDriver,
}

impl CrewPosition {
    pub const ALL: [CrewPosition; 5] = [
        CrewPosition::Commander,
        CrewPosition::Gunner,
        CrewPosition::Loader,
        CrewPosition::Driver,
        CrewPosition::AssistantDriver,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CrewPosition::Commander => "Commander",
            CrewPosition::Gunner => "Gunner",
            CrewPosition::Loader => "Loader",
            CrewPosition::Driver => "Driver",
            CrewPosition::AssistantDriver => "Asst. Driver",
        }
    }

    /// Crew title shown in reports, which differs for Commonwealth crews
    pub fn title(&self, nation: Nation) -> &'static str {
        match (self, nation) {
            (CrewPosition::AssistantDriver, Nation::Commonwealth) => "Co-Driver",
            (CrewPosition::Loader, Nation::Commonwealth) => "Operator",
            _ => self.name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hatch {
    None,
    Open,
    Shut,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum WoundLevel {
    #[default]
    None,
    Light,
    Serious,
    VerySerious,
}

impl WoundLevel {
    /// Penalty to the next wound roll for an already wounded crew member
    pub fn prior_wound_modifier(&self) -> i32 {
        match self {
            WoundLevel::None => 0,
            WoundLevel::Light => 1,
            WoundLevel::Serious => 2,
            WoundLevel::VerySerious => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub position: CrewPosition,
    pub alive: bool,
    pub stunned: bool,
    pub unconscious: bool,
    pub wound: WoundLevel,
    pub order: CrewOrder,
    pub hatch: Hatch,
    /// Sector this crew member watches during spotting
    pub spot_sector: Option<u8>,
    pub skills: Vec<Skill>,
}

impl CrewMember {
    pub fn new(name: impl Into<String>, position: CrewPosition, hatch: Hatch) -> Self {
        Self {
            name: name.into(),
            position,
            alive: true,
            stunned: false,
            unconscious: false,
            wound: WoundLevel::None,
            order: CrewOrder::None,
            hatch,
            spot_sector: None,
            skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, kind: SkillKind, level: u8) -> Self {
        self.skills.push(Skill::new(kind, level));
        self
    }

    pub fn skill(&self, kind: SkillKind) -> Option<&Skill> {
        self.skills.iter().find(|s| s.kind == kind)
    }

    pub fn has_skill(&self, kind: SkillKind) -> bool {
        self.skill(kind).is_some()
    }

    /// Activation check; a missing skill fails without drawing a die
    pub fn skill_check(&self, kind: SkillKind, bonus: u8, dice: &mut dyn Dice) -> bool {
        match self.skill(kind) {
            Some(skill) if self.alive => skill.check(bonus, dice),
            _ => false,
        }
    }

    /// Dead or unconscious
    pub fn is_incapacitated(&self) -> bool {
        !self.alive || self.unconscious
    }

    /// Able to carry out an order this round
    pub fn can_act(&self) -> bool {
        self.alive && !self.unconscious && !self.stunned
    }

    /// Head out of an open hatch
    pub fn is_exposed(&self) -> bool {
        self.alive && self.hatch == Hatch::Open
    }

    pub fn buttoned_up(&self) -> bool {
        self.hatch != Hatch::Open
    }

    /// Knocked out of the fight for the rest of the campaign day
    pub fn is_out_of_action(&self) -> bool {
        !self.alive || self.wound == WoundLevel::VerySerious
    }

    pub fn status_text(&self) -> String {
        if !self.alive {
            return "Dead".into();
        }
        let mut parts = Vec::new();
        match self.wound {
            WoundLevel::None => {}
            WoundLevel::Light => parts.push("Light Wound"),
            WoundLevel::Serious => parts.push("Serious Wound"),
            WoundLevel::VerySerious => parts.push("Very Serious Wound"),
        }
        if self.unconscious {
            parts.push("Unconscious");
        } else if self.stunned {
            parts.push("Stunned");
        }
        if parts.is_empty() {
            "OK".into()
        } else {
            parts.join(", ")
        }
    }
}

/// Ordered crew roster with a selection cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    members: Vec<CrewMember>,
    cursor: usize,
}

impl Crew {
    /// Build a roster; panics when two members share a position
    pub fn new(mut members: Vec<CrewMember>) -> Self {
        members.sort_by_key(|m| m.position);
        for pair in members.windows(2) {
            assert!(
                pair[0].position != pair[1].position,
                "duplicate crew position {:?}",
                pair[0].position
            );
        }
        Self { members, cursor: 0 }
    }

    /// A fresh, unskilled crew for a vehicle
    pub fn standard(spec: &VehicleSpec, nation: Nation) -> Self {
        let names: [&str; 5] = match nation {
            Nation::Usa => [
                "Sgt. Walker",
                "Cpl. Novak",
                "Pvt. Russo",
                "T/5 Becker",
                "Pvt. Delgado",
            ],
            Nation::Commonwealth => [
                "Sgt. Ashby",
                "Tpr. Hughes",
                "L/Cpl. Finch",
                "Tpr. Doyle",
                "Tpr. MacLeod",
            ],
        };
        let mut members = Vec::new();
        for (position, name) in CrewPosition::ALL.iter().zip(names) {
            let hatch = match position {
                CrewPosition::AssistantDriver if !spec.assistant_driver => continue,
                CrewPosition::Loader if spec.loader_hatch == LoaderHatch::None => Hatch::None,
                _ => Hatch::Shut,
            };
            members.push(CrewMember::new(name, *position, hatch));
        }
        Self::new(members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrewMember> {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CrewMember> {
        self.members.iter_mut()
    }

    pub fn get(&self, position: CrewPosition) -> Option<&CrewMember> {
        self.members.iter().find(|m| m.position == position)
    }

    pub fn get_mut(&mut self, position: CrewPosition) -> Option<&mut CrewMember> {
        self.members.iter_mut().find(|m| m.position == position)
    }

    pub fn positions(&self) -> Vec<CrewPosition> {
        self.members.iter().map(|m| m.position).collect()
    }

    pub fn selected(&self) -> Option<&CrewMember> {
        self.members.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor forward, wrapping to the first member
    pub fn next(&mut self) -> Option<&CrewMember> {
        if self.members.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.members.len();
        self.selected()
    }

    /// Move the cursor back, wrapping to the last member
    pub fn previous(&mut self) -> Option<&CrewMember> {
        if self.members.is_empty() {
            return None;
        }
        let len = self.members.len();
        self.cursor = (self.cursor + len - 1) % len;
        self.selected()
    }

    /// True when the named crew member can act
    pub fn can_act(&self, position: CrewPosition) -> bool {
        self.get(position).map(|m| m.can_act()).unwrap_or(false)
    }

    /// Whether an active crew member holds a skill
    pub fn has_skill(&self, position: CrewPosition, kind: SkillKind) -> bool {
        self.get(position)
            .map(|m| m.can_act() && m.has_skill(kind))
            .unwrap_or(false)
    }

    /// Skill check for one position; fails without a roll when absent
    pub fn skill_check(
        &self,
        position: CrewPosition,
        kind: SkillKind,
        bonus: u8,
        dice: &mut dyn Dice,
    ) -> bool {
        self.get(position)
            .map(|m| m.skill_check(kind, bonus, dice))
            .unwrap_or(false)
    }

    pub fn order_of(&self, position: CrewPosition) -> CrewOrder {
        self.get(position)
            .filter(|m| m.can_act())
            .map(|m| m.order)
            .unwrap_or(CrewOrder::None)
    }

    pub fn any_incapacitated(&self) -> bool {
        self.members.iter().any(|m| m.is_incapacitated())
    }

    pub fn all_out_of_action(&self) -> bool {
        self.members.iter().all(|m| m.is_incapacitated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::catalog;

    fn m4_crew() -> Crew {
        Crew::standard(&catalog::lookup(catalog::M4).unwrap(), Nation::Usa)
    }

    #[test]
    fn test_standard_crew_fills_positions() {
        let crew = m4_crew();
        assert_eq!(crew.len(), 5);
        assert_eq!(crew.positions(), CrewPosition::ALL.to_vec());
    }

    #[test]
    fn test_firefly_has_four_crew() {
        let crew = Crew::standard(&catalog::lookup(catalog::FIREFLY).unwrap(), Nation::Commonwealth);
        assert_eq!(crew.len(), 4);
        assert!(crew.get(CrewPosition::AssistantDriver).is_none());
    }

    #[test]
    fn test_loader_without_hatch() {
        let crew = Crew::standard(&catalog::lookup(catalog::SHERMAN_V).unwrap(), Nation::Commonwealth);
        assert_eq!(crew.get(CrewPosition::Loader).unwrap().hatch, Hatch::None);
    }

    #[test]
    fn test_cursor_wraps_both_ways() {
        let mut crew = m4_crew();
        assert_eq!(crew.selected().unwrap().position, CrewPosition::Commander);
        assert_eq!(crew.previous().unwrap().position, CrewPosition::AssistantDriver);
        assert_eq!(crew.next().unwrap().position, CrewPosition::Commander);
        assert_eq!(crew.next().unwrap().position, CrewPosition::Gunner);
    }

    #[test]
    #[should_panic(expected = "duplicate crew position")]
    fn test_duplicate_positions_rejected() {
        Crew::new(vec![
            CrewMember::new("A", CrewPosition::Gunner, Hatch::Shut),
            CrewMember::new("B", CrewPosition::Gunner, Hatch::Shut),
        ]);
    }

    #[test]
    fn test_status_text() {
        let mut member = CrewMember::new("A", CrewPosition::Driver, Hatch::Shut);
        assert_eq!(member.status_text(), "OK");
        member.wound = WoundLevel::Serious;
        member.stunned = true;
        assert_eq!(member.status_text(), "Serious Wound, Stunned");
        member.alive = false;
        assert_eq!(member.status_text(), "Dead");
    }

    #[test]
    fn test_missing_skill_check_draws_nothing() {
        let member = CrewMember::new("A", CrewPosition::Gunner, Hatch::Shut);
        let mut dice = crate::core::dice::ScriptedDice::new([]);
        assert!(!member.skill_check(SkillKind::QuickTrigger, 0, &mut dice));
    }
}
