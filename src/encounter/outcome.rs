//! Encounter result and the report handed back to the campaign layer

use serde::{Deserialize, Serialize};

use crate::core::types::Round;
use crate::damage::{DamageKind, RepairOutcome};
use crate::hostile::unit::{HostileUnit, UnitFate};
use crate::vehicle::tank::PlayerTank;

/// Encounter outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterResult {
    /// No live hostile units remain
    Victory,
    /// Tank exploded, knocked out or abandoned
    TankLost,
    /// Ended from outside before either side won
    Undetermined,
}

impl EncounterResult {
    pub fn name(&self) -> &'static str {
        match self {
            EncounterResult::Victory => "Victory",
            EncounterResult::TankLost => "Tank Lost",
            EncounterResult::Undetermined => "Undetermined",
        }
    }
}

/// Running tallies kept through the encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncounterStats {
    pub shots_fired: u32,
    pub hits: u32,
    pub kills: u32,
    pub mg_bursts: u32,
    pub hits_taken: u32,
    pub friendly_infantry_lost: u32,
    pub friendly_armour_lost: u32,
    pub support_kills: u32,
    pub reinforcements: u32,
}

/// Final encounter result for the campaign layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub result: EncounterResult,
    pub victory_points: u32,
    pub rounds: Round,
    pub stats: EncounterStats,
    /// Post-encounter rolls on auto-repairing malfunctions
    pub repairs: Vec<(DamageKind, RepairOutcome)>,
    pub tank: PlayerTank,
}

/// Victory points earned: class values of units the player accounted for
///
/// Units broken by a failed pin test count alongside outright kills; kills by
/// friendly support and units that left the map earn nothing.
pub fn victory_points(units: &[HostileUnit]) -> u32 {
    units
        .iter()
        .filter(|u| matches!(u.fate, Some(UnitFate::DestroyedByPlayer | UnitFate::Broken)))
        .map(|u| u.class.victory_points())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{RangeBand, UnitId};
    use crate::hostile::unit::UnitClass;
    use crate::map::hex::HexCoord;

    fn unit(id: u32, class: UnitClass, fate: Option<UnitFate>) -> HostileUnit {
        let mut unit = HostileUnit::new(UnitId(id), class, "Unit", HexCoord::new(1, 0), RangeBand::Close, 0);
        if let Some(fate) = fate {
            unit.eliminate(fate);
        }
        unit
    }

    #[test]
    fn test_victory_points_count_player_kills_only() {
        let units = vec![
            unit(1, UnitClass::Tank, Some(UnitFate::DestroyedByPlayer)),
            unit(2, UnitClass::Lw, Some(UnitFate::Broken)),
            unit(3, UnitClass::Spg, Some(UnitFate::DestroyedBySupport)),
            unit(4, UnitClass::Ac, Some(UnitFate::LeftMap)),
            unit(5, UnitClass::AtGun, None),
        ];
        assert_eq!(victory_points(&units), 7);
    }

    #[test]
    fn test_result_names() {
        assert_eq!(EncounterResult::TankLost.name(), "Tank Lost");
    }
}
