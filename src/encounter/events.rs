//! Outbound event stream: roll reports and short status changes

use serde::{Deserialize, Serialize};

use crate::combat::modifiers::RollRecord;
use crate::core::types::{Round, UnitId};
use crate::damage::{DamageKind, WoundResult};
use crate::encounter::outcome::EncounterResult;
use crate::encounter::phase::Phase;
use crate::vehicle::crew::CrewPosition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterEventType {
    EncounterStarted { ambushed: bool },
    PhaseEntered { phase: Phase },
    Roll { record: RollRecord },
    UnitSpotted { unit_id: UnitId },
    UnitIdentified { unit_id: UnitId },
    UnitMoved { unit_id: UnitId },
    UnitPinned { unit_id: UnitId },
    UnitStunned { unit_id: UnitId },
    UnitRecovered { unit_id: UnitId },
    UnitDestroyed { unit_id: UnitId },
    UnitLeftMap { unit_id: UnitId },
    PlayerSpotted { unit_id: UnitId },
    Reinforcement { unit_id: UnitId },
    TankHit,
    TankImmobilized,
    TankBogged,
    CrewWounded { position: CrewPosition, result: WoundResult },
    CrewRecovered { position: CrewPosition },
    CrewFate { position: CrewPosition, survived: bool },
    Malfunction { damage: DamageKind },
    Repaired { damage: DamageKind },
    SmokePlaced { factors: u8 },
    FriendlyLoss,
    EncounterEnded { result: EncounterResult },
}

/// Log entry for encounter events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterEvent {
    pub round: Round,
    pub event_type: EncounterEventType,
    pub description: String,
}

/// Ordered events not yet collected by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterEventLog {
    pub events: Vec<EncounterEvent>,
}

impl EncounterEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event_type: EncounterEventType, description: String, round: Round) {
        self.events.push(EncounterEvent {
            round,
            event_type,
            description,
        });
    }

    /// Report a resolved roll
    pub fn roll(&mut self, record: RollRecord, round: Round) {
        let description = format!(
            "{} vs {}: {:?} {} -> {}",
            record.attacker, record.target, record.kind, record.required, record.outcome
        );
        self.push(EncounterEventType::Roll { record }, description, round);
    }

    pub fn rolls(&self) -> impl Iterator<Item = &RollRecord> {
        self.events.iter().filter_map(|e| match &e.event_type {
            EncounterEventType::Roll { record } => Some(record),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hand every pending event to the caller
    pub fn drain(&mut self) -> Vec<EncounterEvent> {
        std::mem::take(&mut self.events)
    }
}
