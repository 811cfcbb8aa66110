//! Encounter context - the single owner of everything a battle mutates

use serde::{Deserialize, Serialize};

use crate::core::config::EncounterConfig;
use crate::core::types::{MissionType, Nation, RangeBand, Resistance, Round, UnitId, Weather};
use crate::encounter::outcome::EncounterStats;
use crate::hostile::unit::HostileUnit;
use crate::map::encounter_map::EncounterMap;
use crate::vehicle::tank::PlayerTank;

/// Scenario parameters handed in by the campaign layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub mission: MissionType,
    pub resistance: Resistance,
    pub weather: Weather,
    pub nation: Nation,
    /// Forced ambush state; None rolls the ambush check at start-up
    pub ambush: Option<bool>,
}

impl Scenario {
    pub fn new(mission: MissionType, resistance: Resistance, nation: Nation) -> Self {
        Self {
            mission,
            resistance,
            weather: Weather::clear(),
            nation,
            ambush: None,
        }
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_ambush(mut self, ambush: bool) -> Self {
        self.ambush = Some(ambush);
        self
    }
}

/// Vehicle, hostile units, map and counters for one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterContext {
    pub tank: PlayerTank,
    pub units: Vec<HostileUnit>,
    pub map: EncounterMap,
    pub scenario: Scenario,
    pub config: EncounterConfig,
    pub round: Round,
    pub stats: EncounterStats,
    pub ambushed: bool,
    /// Penetration exploded or knocked out the tank
    pub knocked_out: bool,
    /// Crew left the tank on an Abandon Tank order
    pub abandoned: bool,
    next_unit_id: u32,
}

impl EncounterContext {
    pub fn new(scenario: Scenario, tank: PlayerTank, config: EncounterConfig) -> Self {
        Self {
            tank,
            units: Vec::new(),
            map: EncounterMap::new(),
            scenario,
            config,
            round: 1,
            stats: EncounterStats::default(),
            ambushed: false,
            knocked_out: false,
            abandoned: false,
            next_unit_id: 1,
        }
    }

    /// Reserve the next unit id
    pub fn allocate_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    /// Peek at the id the next spawned unit will receive
    pub fn next_unit_id(&self) -> u32 {
        self.next_unit_id
    }

    /// Add units, keeping the id counter ahead of them
    pub fn add_units(&mut self, units: Vec<HostileUnit>) {
        for unit in units {
            self.next_unit_id = self.next_unit_id.max(unit.id.0 + 1);
            self.units.push(unit);
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&HostileUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut HostileUnit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn live_units(&self) -> impl Iterator<Item = &HostileUnit> {
        self.units.iter().filter(|u| u.alive)
    }

    /// Ids of live units in roster order
    pub fn live_ids(&self) -> Vec<UnitId> {
        self.live_units().map(|u| u.id).collect()
    }

    pub fn live_count(&self) -> usize {
        self.live_units().count()
    }

    /// Band can be seen and engaged in the current weather
    pub fn in_weather_range(&self, band: RangeBand) -> bool {
        band <= self.scenario.weather.max_range()
    }

    /// Explosion, knock-out, abandonment or a crew with nobody left standing
    pub fn tank_lost(&self) -> bool {
        self.knocked_out || self.abandoned || self.tank.crew.iter().all(|m| !m.alive)
    }

    /// An armoured car is currently calling out the player's position
    pub fn spotter_active(&self) -> bool {
        self.live_units().any(|u| u.spotting_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Precipitation;
    use crate::hostile::unit::UnitClass;
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;

    fn context(weather: Weather) -> EncounterContext {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa).with_weather(weather);
        EncounterContext::new(scenario, tank, EncounterConfig::default())
    }

    #[test]
    fn test_ids_stay_ahead_of_added_units() {
        let mut ctx = context(Weather::clear());
        ctx.add_units(vec![HostileUnit::new(
            UnitId(4),
            UnitClass::Mg,
            "MG Team",
            HexCoord::new(1, 0),
            RangeBand::Close,
            0,
        )]);
        assert_eq!(ctx.allocate_id(), UnitId(5));
        assert_eq!(ctx.allocate_id(), UnitId(6));
        assert!(ctx.unit(UnitId(4)).is_some());
    }

    #[test]
    fn test_fog_limits_range() {
        let fog = Weather {
            precipitation: Precipitation::None,
            fog: true,
            ..Weather::default()
        };
        let ctx = context(fog);
        assert!(ctx.in_weather_range(RangeBand::Medium));
        assert!(!ctx.in_weather_range(RangeBand::Long));
        assert!(context(Weather::clear()).in_weather_range(RangeBand::Long));
    }

    #[test]
    fn test_tank_lost_when_crew_dead() {
        let mut ctx = context(Weather::clear());
        assert!(!ctx.tank_lost());
        for member in ctx.tank.crew.iter_mut() {
            member.alive = false;
        }
        assert!(ctx.tank_lost());
    }
}
