//! Headless schedule driver.
//!
//! Generates one session's sickness schedule and prints it for audit, the
//! way researchers review a session before (or after) a participant plays
//! it. The telemetry payload is also written to disk so a stored session
//! can be replayed through the restore path.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use ashfall_core::{Config, Group, ManualClock, MemorySink, SicknessManager};
use ashfall_events::sickness_rounds;

/// Command line arguments for the schedule driver
#[derive(Parser, Debug)]
#[command(name = "ashfall_sim")]
#[command(about = "Pre-computes an NPC sickness schedule for one session")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run under the adherent experimental condition
    #[arg(long)]
    adherence: bool,

    /// Tuning file to load instead of ashfall.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the emitted schedule payload
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    println!("Ashfall schedule driver");
    println!("=======================");
    println!("Seed: {}", args.seed);
    println!("Adherence condition: {}", args.adherence);
    println!();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };

    let sink = MemorySink::new();
    let mut manager = SicknessManager::new(
        config,
        args.adherence,
        args.seed,
        Box::new(ManualClock::new()),
        Box::new(sink.clone()),
    );
    manager.compute_schedule();

    println!("=================NPC SICKNESS EVENTS GENERATED=====================");
    for round_no in sickness_rounds() {
        for event in manager.queues().round(round_no) {
            println!("{}", event);
        }
    }
    println!();

    let adherence = manager.adherence();
    for &group in Group::all() {
        let ids: Vec<u32> = adherence.set(group).iter().copied().collect();
        println!(
            "{}: {} adhering {:?}, {} scheduled deaths",
            group,
            ids.len(),
            ids,
            manager.scheduled_death_count(group)
        );
    }

    if let Some(payload) = sink.last_named("npc_status") {
        if let Err(e) = fs::create_dir_all(&args.output) {
            eprintln!("Warning: could not create output directory: {}", e);
        }
        let path = args.output.join("schedule.json");
        match write_payload(&path, &payload) {
            Ok(()) => println!("\nWrote {}", path.display()),
            Err(e) => eprintln!("Warning: could not write schedule: {}", e),
        }
    }
}

/// Writes the telemetry payload as pretty JSON.
fn write_payload(path: &Path, payload: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(path, json)?;
    Ok(())
}
