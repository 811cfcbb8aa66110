//! Smoke factors on the encounter map
//!
//! Factors only ever saturate at zero; a hex never holds negative smoke.

use crate::core::dice::Dice;
use crate::core::types::{Precipitation, Weather};
use crate::map::encounter_map::EncounterMap;
use crate::map::hex::HexCoord;

/// To-Hit penalty per smoke factor along the line of sight
pub const SMOKE_DRM_PER_FACTOR: i32 = 2;

impl EncounterMap {
    pub fn smoke_at(&self, coord: HexCoord) -> u8 {
        self.hex(coord).map(|h| h.smoke).unwrap_or(0)
    }

    /// Add smoke factors to a hex; returns false when the hex is off the map
    pub fn add_smoke(&mut self, coord: HexCoord, factors: u8) -> bool {
        match self.hex_mut(coord) {
            Some(hex) => {
                hex.smoke = hex.smoke.saturating_add(factors);
                true
            }
            None => false,
        }
    }

    /// Smoke between the player and a target hex
    ///
    /// Counts the player hex and every hex along the line up to and
    /// including the target.
    pub fn smoke_between(&self, target: HexCoord) -> u8 {
        HexCoord::ORIGIN
            .line_to(&target)
            .into_iter()
            .map(|c| self.smoke_at(c))
            .fold(0u8, |acc, s| acc.saturating_add(s))
    }

    pub fn total_smoke(&self) -> u32 {
        self.hexes.iter().map(|h| h.smoke as u32).sum()
    }

    /// End-of-round dispersal: each smoked hex loses one factor on 1D6 <= threshold
    ///
    /// Rain and snow lower the roll by one. Returns the number of factors removed.
    pub fn disperse_smoke(&mut self, threshold: u8, weather: &Weather, dice: &mut dyn Dice) -> u32 {
        let wet = weather.precipitation != Precipitation::None;
        let mut removed = 0;
        for hex in self.hexes.iter_mut().filter(|h| h.smoke > 0) {
            let mut roll = dice.d6() as i32;
            if wet {
                roll -= 1;
            }
            if roll <= threshold as i32 {
                hex.smoke -= 1;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!("Smoke dispersal removed {} factor(s)", removed);
        }
        removed
    }
}
