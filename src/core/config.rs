//! Encounter configuration with documented constants
//!
//! The combat tables themselves are fixed game rules and live in
//! `combat::constants`. The values here are pacing knobs the campaign layer
//! may tune per difficulty.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// Configuration for one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    // === HOSTILE AI ===
    /// How many times a unit redraws its action table before idling
    ///
    /// Draws that land on an action the unit cannot currently take are
    /// retried. Ten draws make an idle fallback rare for every unit class.
    pub ai_max_attempts: u8,

    /// d100 shift applied to enemy action draws while they ambush the player
    ///
    /// Higher rolls land in the attack buckets, so this makes the
    /// ambushing side aggressive in its first round.
    pub ambush_bonus: u8,

    // === SMOKE ===
    /// 1D6 at or below this removes one smoke factor from a hex each round
    pub smoke_dispersal_threshold: u8,

    // === SUPPORT AND EVENTS ===
    /// Percentage scaling of the per-class friendly support kill chance
    ///
    /// 100 uses the table values unchanged, 0 disables supporting fire.
    pub friendly_support_percent: u8,

    /// d100 band for an enemy reinforcement at the end of a round
    pub reinforcement_percent: u8,

    /// d100 band (after reinforcements) for friendly artillery
    pub artillery_percent: u8,

    // === STORES ===
    /// Smoke grenades carried at encounter start
    pub smoke_grenades: u8,

    /// Smoke mortar bombs carried at encounter start (if fitted)
    pub smoke_bombs: u8,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            ai_max_attempts: 10,
            ambush_bonus: 20,
            smoke_dispersal_threshold: 3,
            friendly_support_percent: 100,
            reinforcement_percent: 5,
            artillery_percent: 5,
            smoke_grenades: 6,
            smoke_bombs: 15,
        }
    }
}

impl EncounterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EncounterConfig = toml::from_str(content)?;
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.ai_max_attempts == 0 {
            return Err("ai_max_attempts must be at least 1".into());
        }

        if self.smoke_dispersal_threshold > 6 {
            return Err(format!(
                "smoke_dispersal_threshold ({}) must be a 1D6 result (0-6)",
                self.smoke_dispersal_threshold
            ));
        }

        if self.friendly_support_percent > 100 {
            return Err("friendly_support_percent cannot exceed 100".into());
        }

        let event_band = self.reinforcement_percent as u32 + self.artillery_percent as u32;
        if event_band > 100 {
            return Err(format!(
                "reinforcement_percent + artillery_percent ({}) exceeds 100",
                event_band
            ));
        }

        Ok(())
    }
}

/// Load a config file from disk
pub fn load_config(path: &Path) -> Result<EncounterConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = EncounterConfig::from_toml_str(&content)?;
    tracing::debug!("Loaded encounter config from {:?}", path);
    Ok(config)
}
