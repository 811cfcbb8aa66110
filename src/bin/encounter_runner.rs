//! Headless Encounter Runner
//!
//! Plays one encounter with the autopilot commander and prints the report.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use steel_commander::core::{
    load_config, EncounterConfig, Ground, MissionType, Nation, Precipitation, Resistance,
    SeededDice, Weather,
};
use steel_commander::encounter::{AutoCommander, Encounter, EncounterEvent, EncounterReport, Scenario};
use steel_commander::vehicle::{catalog, PlayerTank};
use tracing_subscriber::EnvFilter;

/// Headless Encounter Runner - autopilot play for balance checks
#[derive(Parser, Debug)]
#[command(name = "encounter_runner")]
#[command(about = "Play a tank encounter with the autopilot and report the result")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Mission type: advance, battle or counterattack
    #[arg(long, default_value = "advance")]
    mission: String,

    /// Enemy resistance: light, medium or heavy
    #[arg(long, default_value = "medium")]
    resistance: String,

    /// Player vehicle model from the catalog
    #[arg(long, default_value = catalog::M4)]
    vehicle: String,

    /// Commonwealth crew and titles instead of US
    #[arg(long)]
    commonwealth: bool,

    /// Rounds played before the encounter is ended externally
    #[arg(long, default_value_t = 20)]
    rounds: u32,

    /// Encounter config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rain falling
    #[arg(long)]
    rain: bool,

    /// Fog over the battlefield
    #[arg(long)]
    fog: bool,

    /// Muddy ground
    #[arg(long)]
    mud: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the full event log in the output
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunOutput {
    seed: u64,
    vehicle: String,
    report: EncounterReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<EncounterEvent>>,
}

fn parse_mission(name: &str) -> Option<MissionType> {
    match name.to_ascii_lowercase().as_str() {
        "advance" => Some(MissionType::Advance),
        "battle" => Some(MissionType::Battle),
        "counterattack" => Some(MissionType::Counterattack),
        _ => None,
    }
}

fn parse_resistance(name: &str) -> Option<Resistance> {
    match name.to_ascii_lowercase().as_str() {
        "light" => Some(Resistance::Light),
        "medium" => Some(Resistance::Medium),
        "heavy" => Some(Resistance::Heavy),
        _ => None,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("steel_commander=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let Some(mission) = parse_mission(&args.mission) else {
        eprintln!("Unknown mission '{}'", args.mission);
        return ExitCode::FAILURE;
    };
    let Some(resistance) = parse_resistance(&args.resistance) else {
        eprintln!("Unknown resistance '{}'", args.resistance);
        return ExitCode::FAILURE;
    };
    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {:?}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => EncounterConfig::default(),
    };
    let spec = match catalog::lookup(&args.vehicle) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let nation = if args.commonwealth { Nation::Commonwealth } else { Nation::Usa };
    let weather = Weather {
        precipitation: if args.rain { Precipitation::Rain } else { Precipitation::None },
        fog: args.fog,
        ground: if args.mud { Ground::Mud } else { Ground::Dry },
    };
    let scenario = Scenario::new(mission, resistance, nation).with_weather(weather);
    let tank = PlayerTank::new(spec, nation);
    let mut encounter = Encounter::new(scenario, tank, config, Box::new(SeededDice::new(seed)));

    let report = match AutoCommander::new().play(&mut encounter, args.rounds) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Encounter stopped: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = RunOutput {
        seed,
        vehicle: args.vehicle.clone(),
        report,
        events: args.verbose.then(|| encounter.events().to_vec()),
    };

    match args.format.as_str() {
        "text" => print_text(&output),
        "json" => print_json(&output),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            print_json(&output);
        }
    }
    ExitCode::SUCCESS
}

fn print_json(output: &RunOutput) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialise report: {}", e),
    }
}

fn print_text(output: &RunOutput) {
    let report = &output.report;
    let stats = &report.stats;
    println!("Encounter Result");
    println!("================");
    println!("Outcome: {}", report.result.name());
    println!("Rounds: {}", report.rounds);
    println!("Victory points: {}", report.victory_points);
    println!();
    println!("Shots fired: {} ({} hits, {} kills)", stats.shots_fired, stats.hits, stats.kills);
    println!("MG bursts: {}", stats.mg_bursts);
    println!("Hits taken: {}", stats.hits_taken);
    println!(
        "Friendly losses: {} infantry, {} armour",
        stats.friendly_infantry_lost, stats.friendly_armour_lost
    );
    println!("Support kills: {}", stats.support_kills);
    println!("Reinforcements: {}", stats.reinforcements);
    for (damage, outcome) in &report.repairs {
        println!("Post-encounter repair: {:?} -> {:?}", damage, outcome);
    }
    println!();
    for member in report.tank.crew.iter() {
        println!("  {:<16} {}", member.name, member.status_text());
    }
    if let Some(events) = &output.events {
        println!();
        for event in events {
            println!("  [{}] {}", event.round, event.description);
        }
    }
    println!();
    println!("Vehicle: {}", output.vehicle);
    println!("Seed: {}", output.seed);
}
