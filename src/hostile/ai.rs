//! Hostile unit action selection
//!
//! Each live unit draws a d100 against a seven-bucket table for its class,
//! shifted by mission and ambush. The draw repeats until the engine accepts
//! the action as legal, up to a fixed number of attempts.

use serde::{Deserialize, Serialize};

use crate::core::dice::Dice;
use crate::core::types::MissionType;
use crate::hostile::unit::{HostileUnit, UnitClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiAction {
    Idle,
    Approach,
    Lateral,
    Retreat,
    /// Fire on friendly infantry or soft targets
    AttackSoft,
    /// Fire on friendly armour, possibly switching to the player
    AttackArmour,
    AttackPlayer,
}

impl AiAction {
    pub const ALL: [AiAction; 7] = [
        AiAction::Idle,
        AiAction::Approach,
        AiAction::Lateral,
        AiAction::Retreat,
        AiAction::AttackSoft,
        AiAction::AttackArmour,
        AiAction::AttackPlayer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AiAction::Idle => "Idle",
            AiAction::Approach => "Move Closer",
            AiAction::Lateral => "Move Laterally",
            AiAction::Retreat => "Move Away",
            AiAction::AttackSoft => "Attack Friendly Infantry",
            AiAction::AttackArmour => "Attack Friendly Armour",
            AiAction::AttackPlayer => "Attack Player",
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, AiAction::Approach | AiAction::Lateral | AiAction::Retreat)
    }

    pub fn is_attack(&self) -> bool {
        matches!(
            self,
            AiAction::AttackSoft | AiAction::AttackArmour | AiAction::AttackPlayer
        )
    }
}

/// Widths of the seven buckets, in `AiAction::ALL` order, summing to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
    pub widths: [u8; 7],
}

impl ActionTable {
    pub fn for_class(class: UnitClass) -> Self {
        let widths = match class {
            UnitClass::Tank => [15, 15, 10, 5, 10, 15, 30],
            UnitClass::Spg => [20, 5, 5, 5, 10, 20, 35],
            UnitClass::AtGun => [25, 0, 0, 0, 10, 20, 45],
            UnitClass::Mg => [30, 10, 10, 10, 30, 0, 10],
            UnitClass::Lw => [30, 20, 10, 10, 20, 0, 10],
            UnitClass::Truck => [40, 10, 10, 40, 0, 0, 0],
            UnitClass::Apc => [30, 30, 10, 10, 10, 0, 10],
            UnitClass::Ac => [30, 20, 15, 15, 10, 0, 10],
        };
        Self { widths }
    }

    /// Class table adjusted for the mission
    ///
    /// Counterattacks push half the idle weight into approach; in a battle
    /// nobody retreats and the retreat weight goes to idle.
    pub fn for_unit(class: UnitClass, mission: MissionType) -> Self {
        let mut table = Self::for_class(class);
        let w = &mut table.widths;
        match mission {
            MissionType::Advance => {}
            MissionType::Counterattack => {
                if class.can_move() {
                    let shift = w[0] / 2;
                    w[0] -= shift;
                    w[1] += shift;
                }
            }
            MissionType::Battle => {
                w[0] += w[3];
                w[3] = 0;
            }
        }
        table
    }

    /// Action for a d100 roll (1..=100)
    pub fn pick(&self, roll: u8) -> AiAction {
        let mut ceiling = 0u16;
        for (action, width) in AiAction::ALL.iter().zip(self.widths) {
            ceiling += width as u16;
            if (roll as u16) <= ceiling && width > 0 {
                return *action;
            }
        }
        AiAction::ALL
            .iter()
            .zip(self.widths)
            .rev()
            .find(|(_, w)| *w > 0)
            .map(|(a, _)| *a)
            .unwrap_or(AiAction::Idle)
    }
}

/// Outcome of the selection loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiChoice {
    pub action: AiAction,
    /// Every modified d100 drawn, in order
    pub rolls: Vec<u8>,
    /// False when the attempt budget ran out and the unit fell back to idle
    pub settled: bool,
}

/// Preconditions that depend only on the unit itself
pub fn unit_allows(unit: &HostileUnit, action: AiAction) -> bool {
    match action {
        AiAction::Idle => true,
        a if a.is_move() => unit.can_move(),
        _ => !unit.hidden && unit.alive,
    }
}

/// Draw actions until `legal` accepts one, at most `max_attempts` times
///
/// The ambush bonus is added to every draw and capped at 100.
pub fn choose_action(
    unit: &HostileUnit,
    mission: MissionType,
    ambush_bonus: u8,
    max_attempts: u8,
    dice: &mut dyn Dice,
    mut legal: impl FnMut(AiAction) -> bool,
) -> AiChoice {
    let table = ActionTable::for_unit(unit.class, mission);
    let mut rolls = Vec::new();
    for _ in 0..max_attempts.max(1) {
        let roll = dice.d100().saturating_add(ambush_bonus).min(100);
        rolls.push(roll);
        let action = table.pick(roll);
        if unit_allows(unit, action) && legal(action) {
            tracing::debug!("{} chooses {}", unit.label(), action.name());
            return AiChoice {
                action,
                rolls,
                settled: true,
            };
        }
    }
    AiChoice {
        action: AiAction::Idle,
        rolls,
        settled: false,
    }
}
