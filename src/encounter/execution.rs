//! Encounter execution: start-up, the round phase machine and terminal checks
//!
//! Each round: spot sectors -> spotting -> orders -> pivot -> movement ->
//! turret -> main gun -> hits -> MGs -> smoke/restock -> recovery ->
//! enemy -> friendly -> random event -> repairs -> end of round.
//!
//! Phases that wait on the player stay current until `advance_phase`; the
//! automatic work of a phase runs as it is left.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::modifiers::{RollKind, RollRecord};
use crate::core::config::EncounterConfig;
use crate::core::dice::Dice;
use crate::core::types::{MissionType, UnitId};
use crate::damage::{
    abandon_tank, post_encounter_repair, CrewFate, DamageKind, PenetrationReport, RepairOutcome,
    WoundResult,
};
use crate::encounter::commands::CommandRejected;
use crate::encounter::context::{EncounterContext, Scenario};
use crate::encounter::events::{EncounterEvent, EncounterEventLog, EncounterEventType};
use crate::encounter::outcome::{victory_points, EncounterReport, EncounterResult};
use crate::encounter::phase::Phase;
use crate::hostile::spawn::spawn_units;
use crate::vehicle::crew::CrewPosition;
use crate::vehicle::orders::CrewOrder;
use crate::vehicle::skills::SkillKind;
use crate::vehicle::spec::FireMode;
use crate::vehicle::tank::PlayerTank;

/// Ambush on 1D10 at or below this in Advance and Battle missions
pub const AMBUSH_D10: u8 = 2;

/// Starting hull down on 1D6 at or below this
pub const START_HULL_DOWN_D6: u8 = 2;

/// Weapon targeting and main gun Rate of Fire for the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GunneryState {
    /// Main gun target
    pub target: Option<UnitId>,
    /// Target of the active machine gun
    pub mg_target: Option<UnitId>,
    pub mode: FireMode,
    /// Main gun shots this round
    pub shots: u32,
    /// Rate of Fire held: another shot may follow this round
    pub rof: bool,
    /// The tank has pivoted this round
    pub pivoted: bool,
}

impl Default for GunneryState {
    fn default() -> Self {
        Self {
            target: None,
            mg_target: None,
            mode: FireMode::Direct,
            shots: 0,
            rof: false,
            pivoted: false,
        }
    }
}

impl GunneryState {
    /// Target held by the weapon that fires in `phase`
    pub fn target_in(&self, phase: Phase) -> Option<UnitId> {
        match phase {
            Phase::MgFire => self.mg_target,
            _ => self.target,
        }
    }

    pub fn start_round(&mut self) {
        self.shots = 0;
        self.rof = false;
        self.pivoted = false;
    }
}

/// One running encounter
///
/// Owns the context, the dice and the event log; every inbound command and
/// phase transition goes through here.
#[derive(Debug)]
pub struct Encounter {
    pub(crate) ctx: EncounterContext,
    pub(crate) dice: Box<dyn Dice>,
    pub(crate) phase: Phase,
    pub(crate) log: EncounterEventLog,
    pub(crate) gunnery: GunneryState,
    result: Option<EncounterResult>,
    repairs: Vec<(DamageKind, RepairOutcome)>,
}

impl Encounter {
    /// Start an encounter: spawn the enemy force, check for ambush and set
    /// the tank's starting posture
    pub fn new(scenario: Scenario, tank: PlayerTank, config: EncounterConfig, dice: Box<dyn Dice>) -> Self {
        let mut tank = tank;
        tank.smoke_grenades = config.smoke_grenades;
        if tank.spec.smoke_mortar {
            tank.smoke_bombs = config.smoke_bombs;
        }
        let ctx = EncounterContext::new(scenario, tank, config);
        let mut encounter = Self::from_context(ctx, dice);
        encounter.start();
        encounter
    }

    /// Wrap a prepared context without drawing any dice
    ///
    /// The encounter begins at SetSpotSectors with the units already in the
    /// context and default spot sectors assigned.
    pub fn from_context(ctx: EncounterContext, dice: Box<dyn Dice>) -> Self {
        let mut encounter = Self {
            ctx,
            dice,
            phase: Phase::SetSpotSectors,
            log: EncounterEventLog::new(),
            gunnery: GunneryState::default(),
            result: None,
            repairs: Vec::new(),
        };
        encounter.assign_default_spot_sectors();
        encounter
    }

    fn start(&mut self) {
        let scenario = self.ctx.scenario;
        let units = spawn_units(
            scenario.mission,
            scenario.resistance,
            &self.ctx.map,
            self.ctx.next_unit_id(),
            self.dice.as_mut(),
        );
        info!("Encounter start: {} hostile unit(s)", units.len());
        self.ctx.add_units(units);

        let ambushed = match (scenario.ambush, scenario.mission) {
            (Some(forced), _) => forced,
            (None, MissionType::Counterattack) => false,
            (None, _) => self.roll_ambush(),
        };
        self.ctx.ambushed = ambushed;

        let tank = &mut self.ctx.tank;
        if scenario.mission == MissionType::Counterattack {
            tank.hull_down = true;
            tank.moving = false;
        } else {
            let bonus = tank.leadership_bonus;
            let cautious = tank
                .crew
                .skill_check(CrewPosition::Driver, SkillKind::CautiousDriver, bonus, self.dice.as_mut());
            if cautious || self.dice.d6() <= START_HULL_DOWN_D6 {
                tank.hull_down = true;
                tank.moving = false;
            } else {
                tank.hull_down = false;
                tank.moving = true;
            }
        }

        let description = format!(
            "{} encounter begins{}; tank {}",
            match scenario.mission {
                MissionType::Advance => "Advance",
                MissionType::Battle => "Battle",
                MissionType::Counterattack => "Counterattack",
            },
            if ambushed { ", AMBUSH!" } else { "" },
            if self.ctx.tank.hull_down { "hull down" } else { "moving" },
        );
        self.log.push(EncounterEventType::EncounterStarted { ambushed }, description, self.ctx.round);

        if ambushed {
            self.enter_phase(Phase::EnemyAction);
        } else {
            self.enter_phase(Phase::SetSpotSectors);
        }
    }

    fn roll_ambush(&mut self) -> bool {
        let roll = self.dice.d10();
        let mut ambushed = roll <= AMBUSH_D10;
        let mut outcome = if ambushed { "Ambush" } else { "No Ambush" };
        if ambushed {
            let crew = &self.ctx.tank.crew;
            if crew.skill_check(CrewPosition::Commander, SkillKind::KeenSenses, 0, self.dice.as_mut()) {
                ambushed = false;
                outcome = "Ambush avoided (Keen Senses)";
            }
        }
        let record = RollRecord::simple(
            RollKind::Ambush,
            "Enemy",
            "Player",
            AMBUSH_D10 as i32,
            vec![roll],
            outcome,
        );
        self.record(record);
        ambushed
    }

    // ===== ACCESSORS =====

    pub fn context(&self) -> &EncounterContext {
        &self.ctx
    }

    /// Direct access for campaign-layer setup and tests
    pub fn context_mut(&mut self) -> &mut EncounterContext {
        &mut self.ctx
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.ctx.round
    }

    pub fn gunnery(&self) -> &GunneryState {
        &self.gunnery
    }

    pub fn result(&self) -> Option<EncounterResult> {
        self.result
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Events not yet collected
    pub fn events(&self) -> &[EncounterEvent] {
        &self.log.events
    }

    /// Collect and clear pending events
    pub fn take_events(&mut self) -> Vec<EncounterEvent> {
        self.log.drain()
    }

    /// Final report, once the encounter is over
    pub fn report(&self) -> Option<EncounterReport> {
        let result = self.result?;
        Some(EncounterReport {
            result,
            victory_points: victory_points(&self.ctx.units),
            rounds: self.ctx.round,
            stats: self.ctx.stats,
            repairs: self.repairs.clone(),
            tank: self.ctx.tank.clone(),
        })
    }

    // ===== LOGGING HELPERS =====

    pub(crate) fn record(&mut self, record: RollRecord) {
        debug!(
            "{:?}: {} vs {} need {} rolled {:?} -> {}",
            record.kind, record.attacker, record.target, record.required, record.dice, record.outcome
        );
        self.log.roll(record, self.ctx.round);
    }

    pub(crate) fn record_all(&mut self, records: Vec<RollRecord>) {
        for record in records {
            self.record(record);
        }
    }

    pub(crate) fn event(&mut self, event_type: EncounterEventType, description: String) {
        self.log.push(event_type, description, self.ctx.round);
    }

    /// Log everything a penetrating hit on the player did
    pub(crate) fn report_penetration(&mut self, report: PenetrationReport) {
        let lost = report.tank_lost();
        let PenetrationReport {
            result,
            damage,
            wounds,
            fates,
            records,
        } = report;
        self.record_all(records);
        self.event(EncounterEventType::TankHit, format!("Penetration: {}", result.text()));
        for kind in damage {
            self.event(EncounterEventType::Malfunction { damage: kind }, format!("Malfunction: {}", kind.name()));
        }
        for (position, wound) in wounds {
            self.report_wound(position, wound);
        }
        self.report_fates(fates);
        if lost {
            self.ctx.knocked_out = true;
        }
        if self.ctx.tank.immobilized {
            self.event(EncounterEventType::TankImmobilized, "Tank immobilized".into());
        }
    }

    fn report_fates(&mut self, fates: Vec<CrewFate>) {
        for fate in fates {
            self.report_wound(fate.position, fate.wound);
            if let Some(post) = fate.post_bail_wound {
                self.report_wound(fate.position, post);
            }
            let status = match (fate.survived, fate.bailed_out) {
                (true, _) => "bails out",
                (false, Some(false)) => "fails to bail out and is killed",
                (false, _) => "is killed",
            };
            self.event(
                EncounterEventType::CrewFate {
                    position: fate.position,
                    survived: fate.survived,
                },
                format!("{} {}", fate.name, status),
            );
        }
    }

    pub(crate) fn report_wound(&mut self, position: CrewPosition, result: WoundResult) {
        if result == WoundResult::None {
            return;
        }
        let name = self
            .ctx
            .tank
            .crew
            .get(position)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| position.name().to_string());
        self.event(
            EncounterEventType::CrewWounded { position, result },
            format!("Crew wounded: {} - {}", name, result.text()),
        );
    }

    // ===== PHASE MACHINE =====

    /// Finish the current phase and move to the next one that applies
    ///
    /// Runs the automatic work of the phase being left, then checks for a
    /// terminal state before entering the next phase.
    pub fn advance_phase(&mut self) -> Result<Phase, CommandRejected> {
        self.ensure_running()?;
        let leaving = self.phase;
        self.finish_phase(leaving);

        if self.check_terminal() {
            return Ok(self.phase);
        }

        let mut next = leaving.next();
        while next.is_optional() && !self.phase_applies(next) {
            next = next.next();
        }
        self.enter_phase(next);
        Ok(next)
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        debug!("Round {}: {}", self.ctx.round, phase.name());
        self.event(EncounterEventType::PhaseEntered { phase }, format!("Phase: {}", phase.name()));
    }

    /// Whether an optional phase has anything to do this round
    pub fn phase_applies(&self, phase: Phase) -> bool {
        let tank = &self.ctx.tank;
        let crew = &tank.crew;
        match phase {
            Phase::Pivot => {
                crew.order_of(CrewPosition::Driver) == CrewOrder::PivotTank
                    && !tank.bogged
                    && !tank.immobilized
            }
            Phase::Movement => matches!(
                crew.order_of(CrewPosition::Driver),
                CrewOrder::Stop
                    | CrewOrder::Forward
                    | CrewOrder::ForwardToHullDown
                    | CrewOrder::Reverse
                    | CrewOrder::ReverseToHullDown
                    | CrewOrder::AttemptUnbog
            ),
            Phase::RotateTurret => {
                crew.order_of(CrewPosition::Gunner) == CrewOrder::RotateTurret
                    && tank.turret_traverse_operational()
            }
            Phase::MainGunFire => {
                crew.order_of(CrewPosition::Gunner) == CrewOrder::FireMainGun && tank.main_gun_operational()
            }
            Phase::ResolveHits => self.ctx.units.iter().any(|u| u.alive && !u.hits.is_empty()),
            Phase::MgFire => self.mg_orders_present(),
            Phase::SmokeAndRestock => {
                matches!(
                    crew.order_of(CrewPosition::Loader),
                    CrewOrder::FireSmokeMortar | CrewOrder::RestockReadyRack | CrewOrder::ThrowSmokeGrenade
                ) || crew.order_of(CrewPosition::Commander) == CrewOrder::ThrowSmokeGrenade
            }
            Phase::CrewRecovery => crew.iter().any(|m| m.alive && (m.stunned || m.unconscious)),
            Phase::Repairs => crew.iter().any(|m| {
                m.can_act() && m.order.repairs().is_some_and(|k| tank.damage.contains(k))
            }),
            _ => true,
        }
    }

    fn finish_phase(&mut self, phase: Phase) {
        match phase {
            // ===== PHASE: SPOTTING =====
            Phase::Spotting => self.phase_spotting(),

            // ===== PHASE: ORDERS =====
            Phase::Orders => self.phase_orders(),

            // ===== PHASE: MOVEMENT =====
            Phase::Movement => self.phase_movement(),

            // ===== PHASE: RESOLVE HITS =====
            Phase::ResolveHits => self.phase_resolve_hits(),

            // ===== PHASE: SMOKE AND RESTOCK =====
            Phase::SmokeAndRestock => self.phase_smoke_and_restock(),

            // ===== PHASE: CREW RECOVERY =====
            Phase::CrewRecovery => self.phase_crew_recovery(),

            // ===== PHASE: ENEMY ACTION =====
            Phase::EnemyAction => self.phase_enemy_action(),

            // ===== PHASE: FRIENDLY ACTION =====
            Phase::FriendlyAction => self.phase_friendly_action(),

            // ===== PHASE: RANDOM EVENT =====
            Phase::RandomEvent => {
                self.phase_random_event();
            }

            // ===== PHASE: REPAIRS =====
            Phase::Repairs => self.phase_repairs(),

            // ===== PHASE: END OF ROUND =====
            Phase::EndOfRound => self.phase_end_of_round(),

            // Player-driven phases resolve through commands
            Phase::SetSpotSectors
            | Phase::Pivot
            | Phase::RotateTurret
            | Phase::MainGunFire
            | Phase::MgFire
            | Phase::Finished => {}
        }
    }

    /// Leaving the Orders phase: abandonment, then the loader's breech work
    fn phase_orders(&mut self) {
        let abandon = self
            .ctx
            .tank
            .crew
            .iter()
            .any(|m| m.can_act() && m.order == CrewOrder::AbandonTank);
        if abandon {
            self.event(EncounterEventType::FriendlyLoss, "Crew abandons the tank".into());
            let (fates, records) = abandon_tank(&mut self.ctx.tank, self.dice.as_mut());
            self.record_all(records);
            self.report_fates(fates);
            self.ctx.abandoned = true;
            return;
        }
        self.prepare_main_gun();
    }

    /// Check for victory or loss; finishes the encounter when one applies
    fn check_terminal(&mut self) -> bool {
        let result = if self.ctx.tank_lost() {
            EncounterResult::TankLost
        } else if self.ctx.live_count() == 0 {
            EncounterResult::Victory
        } else {
            return false;
        };
        self.finish(result);
        true
    }

    pub(crate) fn finish(&mut self, result: EncounterResult) {
        if self.result.is_some() {
            return;
        }
        if result != EncounterResult::TankLost {
            self.repairs = post_encounter_repair(&mut self.ctx.tank.damage, self.dice.as_mut());
            for (kind, outcome) in self.repairs.clone() {
                let event_type = match outcome {
                    RepairOutcome::Broken(broken) => EncounterEventType::Malfunction { damage: broken },
                    _ => EncounterEventType::Repaired { damage: kind },
                };
                self.event(event_type, format!("Post-encounter repair of {}: {:?}", kind.name(), outcome));
            }
        }
        self.result = Some(result);
        self.phase = Phase::Finished;
        info!(
            "Encounter ended after {} round(s): {} ({} VP)",
            self.ctx.round,
            result.name(),
            victory_points(&self.ctx.units)
        );
        self.event(
            EncounterEventType::EncounterEnded { result },
            format!("Encounter ended: {}", result.name()),
        );
    }

    pub(crate) fn ensure_running(&self) -> Result<(), CommandRejected> {
        if self.is_finished() {
            Err(CommandRejected::EncounterOver)
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_phase(&self, phase: Phase) -> Result<(), CommandRejected> {
        self.ensure_running()?;
        if self.phase == phase {
            Ok(())
        } else {
            Err(CommandRejected::WrongPhase(self.phase))
        }
    }
}
