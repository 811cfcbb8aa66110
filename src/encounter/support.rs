//! Friendly supporting fire and the end-of-round random event

use tracing::{debug, info};

use crate::combat::ift::{resolve_ift, roll_ift, IftInput, IftOutcome, IftWeapon};
use crate::combat::modifiers::{RollKind, RollRecord};
use crate::core::types::UnitId;
use crate::encounter::events::EncounterEventType;
use crate::encounter::execution::Encounter;
use crate::hostile::spawn::{roll_unit_class, spawn_unit};
use crate::hostile::unit::UnitFate;
use crate::vehicle::spec::FireMode;

const ARTILLERY: &str = "Friendly artillery";

/// What the random event roll produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomEvent {
    Reinforcement,
    Artillery,
    Quiet,
}

impl Encounter {
    // ===== FRIENDLY ACTION =====

    /// Supporting units knock out enemies on a percentage roll
    ///
    /// Calls for support go out over the radio, so nothing happens while it
    /// is out of action.
    pub(crate) fn phase_friendly_action(&mut self) {
        if !self.ctx.tank.radio_operational() {
            debug!("Radio out of action, no supporting fire");
            return;
        }
        let percent = self.ctx.config.friendly_support_percent as u32;
        for id in self.ctx.live_ids() {
            let Some(unit) = self.ctx.unit(id) else {
                continue;
            };
            let chance = unit.class.support_chance() as u32 * percent / 100;
            if chance == 0 {
                continue;
            }
            let label = unit.label();
            let roll = self.dice.d100();
            let destroyed = roll as u32 <= chance;
            let record = RollRecord::simple(
                RollKind::FriendlySupport,
                "Friendly support",
                label,
                chance as i32,
                vec![roll],
                if destroyed { "Destroyed" } else { "No Effect" },
            );
            self.record(record);
            if destroyed {
                self.destroy_unit(id, UnitFate::DestroyedBySupport);
                self.ctx.stats.support_kills += 1;
            }
        }
    }

    // ===== RANDOM EVENT =====

    pub(crate) fn phase_random_event(&mut self) -> RandomEvent {
        let reinforcement = self.ctx.config.reinforcement_percent;
        let artillery = reinforcement.saturating_add(self.ctx.config.artillery_percent);
        let roll = self.dice.d100();
        let event = if roll <= reinforcement {
            RandomEvent::Reinforcement
        } else if roll <= artillery {
            RandomEvent::Artillery
        } else {
            RandomEvent::Quiet
        };
        let outcome = match event {
            RandomEvent::Reinforcement => "Enemy reinforcement",
            RandomEvent::Artillery => "Friendly artillery",
            RandomEvent::Quiet => "No event",
        };
        let record = RollRecord::simple(RollKind::RandomEvent, "Random event", "-", artillery as i32, vec![roll], outcome);
        self.record(record);

        match event {
            RandomEvent::Reinforcement => self.reinforce(),
            RandomEvent::Artillery => self.artillery_strike(),
            RandomEvent::Quiet => {}
        }
        event
    }

    fn reinforce(&mut self) {
        let class = roll_unit_class(self.ctx.scenario.mission, self.dice.as_mut());
        let id = self.ctx.allocate_id();
        let unit = spawn_unit(id, class, &self.ctx.map, self.dice.as_mut());
        let description = format!("{} arrives at {} range", unit.label(), unit.band.name());
        info!("Enemy reinforcement: {}", description);
        self.ctx.add_units(vec![unit]);
        self.ctx.stats.reinforcements += 1;
        self.event(EncounterEventType::Reinforcement { unit_id: id }, description);
    }

    /// Barrage on one soft unit chosen at random
    fn artillery_strike(&mut self) {
        let targets: Vec<UnitId> = self
            .ctx
            .live_units()
            .filter(|u| u.class.resolves_on_ift())
            .map(|u| u.id)
            .collect();
        if targets.is_empty() {
            debug!("No soft targets for the artillery");
            return;
        }
        let pick = (self.dice.d100() as usize - 1) % targets.len();
        let id = targets[pick];
        let Some(unit) = self.ctx.unit(id) else {
            return;
        };
        let mut input = IftInput::new(IftWeapon::Artillery, unit.band, FireMode::Area, unit.terrain);
        input.emplaced = unit.emplaced;
        input.target_moving = unit.moving;
        input.soft_ground = self.ctx.scenario.weather.soft_ground();
        let label = unit.label();

        let res = resolve_ift(&input);
        let (outcome, roll) = roll_ift(&res, self.dice.as_mut());
        let record = RollRecord::from_resolution(RollKind::Ift, ARTILLERY, label, &res, roll.faces(), outcome.text());
        self.record(record);

        match outcome {
            IftOutcome::Destroyed => {
                self.destroy_unit(id, UnitFate::DestroyedBySupport);
                self.ctx.stats.support_kills += 1;
            }
            other => self.apply_ift_outcome(id, other, ARTILLERY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EncounterConfig;
    use crate::core::dice::ScriptedDice;
    use crate::core::types::{MissionType, Nation, RangeBand, Resistance};
    use crate::damage::DamageKind;
    use crate::encounter::context::{EncounterContext, Scenario};
    use crate::hostile::unit::{HostileUnit, UnitClass};
    use crate::map::hex::HexCoord;
    use crate::vehicle::catalog;
    use crate::vehicle::tank::PlayerTank;

    fn encounter(config: EncounterConfig, faces: Vec<u8>) -> Encounter {
        let tank = PlayerTank::new(catalog::lookup(catalog::M4).unwrap(), Nation::Usa);
        let scenario = Scenario::new(MissionType::Advance, Resistance::Light, Nation::Usa);
        let mut ctx = EncounterContext::new(scenario, tank, config);
        ctx.add_units(vec![HostileUnit::new(
            UnitId(1),
            UnitClass::Lw,
            "Rifle Squad",
            HexCoord::new(0, -2),
            RangeBand::Medium,
            4,
        )]);
        Encounter::from_context(ctx, Box::new(ScriptedDice::new(faces)))
    }

    #[test]
    fn test_support_destroys_on_low_roll() {
        let mut encounter = encounter(EncounterConfig::default(), vec![5]);
        encounter.phase_friendly_action();
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.fate, Some(UnitFate::DestroyedBySupport));
        assert_eq!(encounter.ctx.stats.support_kills, 1);
        assert_eq!(encounter.ctx.stats.kills, 0);
    }

    #[test]
    fn test_support_needs_radio() {
        let mut encounter = encounter(EncounterConfig::default(), vec![]);
        encounter.ctx.tank.damage.add(DamageKind::RadioMalfunction);
        encounter.phase_friendly_action();
        assert_eq!(encounter.ctx.live_count(), 1);
    }

    #[test]
    fn test_zero_percent_disables_support() {
        let config = EncounterConfig {
            friendly_support_percent: 0,
            ..EncounterConfig::default()
        };
        let mut encounter = encounter(config, vec![]);
        encounter.phase_friendly_action();
        assert_eq!(encounter.ctx.live_count(), 1);
    }

    #[test]
    fn test_reinforcement_spawns_unit() {
        // d100, class d10, sector, band, hex, terrain d10, morale 2d6, hidden
        let mut encounter = encounter(EncounterConfig::default(), vec![3, 1, 1, 1, 1, 1, 3, 4, 1]);
        assert_eq!(encounter.phase_random_event(), RandomEvent::Reinforcement);
        assert_eq!(encounter.ctx.live_count(), 2);
        assert_eq!(encounter.ctx.stats.reinforcements, 1);
        let unit = encounter.ctx.unit(UnitId(2)).unwrap();
        assert_eq!(unit.class, UnitClass::Lw);
        assert_eq!(unit.band, RangeBand::Close);
    }

    #[test]
    fn test_artillery_strikes_soft_unit() {
        let mut encounter = encounter(EncounterConfig::default(), vec![8, 1, 1, 1]);
        assert_eq!(encounter.phase_random_event(), RandomEvent::Artillery);
        let unit = encounter.ctx.unit(UnitId(1)).unwrap();
        assert_eq!(unit.fate, Some(UnitFate::DestroyedBySupport));
    }

    #[test]
    fn test_quiet_round() {
        let mut encounter = encounter(EncounterConfig::default(), vec![50]);
        assert_eq!(encounter.phase_random_event(), RandomEvent::Quiet);
        assert_eq!(encounter.ctx.live_count(), 1);
    }
}
