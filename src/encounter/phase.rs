//! Round phases of an encounter

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    SetSpotSectors,
    Spotting,
    Orders,
    Pivot,
    Movement,
    RotateTurret,
    MainGunFire,
    ResolveHits,
    MgFire,
    SmokeAndRestock,
    CrewRecovery,
    EnemyAction,
    FriendlyAction,
    RandomEvent,
    Repairs,
    EndOfRound,
    /// Encounter over; no further phases
    Finished,
}

impl Phase {
    /// Phases of one round in order
    pub const ROUND: [Phase; 16] = [
        Phase::SetSpotSectors,
        Phase::Spotting,
        Phase::Orders,
        Phase::Pivot,
        Phase::Movement,
        Phase::RotateTurret,
        Phase::MainGunFire,
        Phase::ResolveHits,
        Phase::MgFire,
        Phase::SmokeAndRestock,
        Phase::CrewRecovery,
        Phase::EnemyAction,
        Phase::FriendlyAction,
        Phase::RandomEvent,
        Phase::Repairs,
        Phase::EndOfRound,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::SetSpotSectors => "Set Spot Sectors",
            Phase::Spotting => "Spotting",
            Phase::Orders => "Orders",
            Phase::Pivot => "Tank Pivot",
            Phase::Movement => "Tank Movement",
            Phase::RotateTurret => "Rotate Turret",
            Phase::MainGunFire => "Main Gun Fire",
            Phase::ResolveHits => "Resolve Hits",
            Phase::MgFire => "MG Fire",
            Phase::SmokeAndRestock => "Smoke and Restock",
            Phase::CrewRecovery => "Crew Recovery",
            Phase::EnemyAction => "Enemy Action",
            Phase::FriendlyAction => "Friendly Action",
            Phase::RandomEvent => "Random Event",
            Phase::Repairs => "Repairs",
            Phase::EndOfRound => "End of Round",
            Phase::Finished => "Finished",
        }
    }

    /// The phase after this one in the fixed sequence, wrapping at the end
    /// of the round
    pub fn next(&self) -> Phase {
        match self {
            Phase::Finished => Phase::Finished,
            Phase::EndOfRound => Phase::SetSpotSectors,
            phase => {
                let index = Phase::ROUND
                    .iter()
                    .position(|p| p == phase)
                    .unwrap_or(Phase::ROUND.len() - 1);
                Phase::ROUND[index + 1]
            }
        }
    }

    /// Phases that may be skipped when nothing in them applies
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Phase::Pivot
                | Phase::Movement
                | Phase::RotateTurret
                | Phase::MainGunFire
                | Phase::ResolveHits
                | Phase::MgFire
                | Phase::SmokeAndRestock
                | Phase::CrewRecovery
                | Phase::Repairs
        )
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_wraps() {
        assert_eq!(Phase::SetSpotSectors.next(), Phase::Spotting);
        assert_eq!(Phase::Repairs.next(), Phase::EndOfRound);
        assert_eq!(Phase::EndOfRound.next(), Phase::SetSpotSectors);
        assert_eq!(Phase::Finished.next(), Phase::Finished);
    }

    #[test]
    fn test_every_round_phase_has_a_successor() {
        let mut phase = Phase::SetSpotSectors;
        for _ in 0..Phase::ROUND.len() {
            phase = phase.next();
        }
        assert_eq!(phase, Phase::SetSpotSectors);
    }
}
