#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Castle Rooms match headlessly.

mod scenario;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    scenario::{Scenario, BUILTIN_SKIRMISH},
    simulation::{RunOptions, Summary},
};

/// Command-line arguments accepted by the Castle Rooms binary.
#[derive(Debug, Parser)]
#[command(name = "castle-rooms", about = "Plays a scripted Castle Rooms match headlessly")]
struct CliArgs {
    /// Scenario file to play; the bundled skirmish is used when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Seed for ammunition choices and spawn scatter.
    #[arg(long, default_value_t = 0x6361_7374)]
    seed: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, value_name = "MS", default_value_t = 50)]
    tick_millis: u64,
    /// Print the final summary as JSON instead of text.
    #[arg(long)]
    summary_json: bool,
}

/// Entry point for the Castle Rooms command-line interface.
fn main() -> Result<()> {
    init_logging();
    let args = CliArgs::parse();

    let scenario = match args.scenario.as_deref() {
        Some(path) => Scenario::load(path)?,
        None => Scenario::parse(BUILTIN_SKIRMISH).context("bundled skirmish is invalid")?,
    };
    let options = RunOptions {
        ticks: args.ticks,
        tick: Duration::from_millis(args.tick_millis),
        seed: args.seed,
    };

    let summary = simulation::run(&scenario, options);
    if args.summary_json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialise summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(summary: &Summary) {
    println!(
        "{} ticks ({:.1} s simulated)",
        summary.ticks,
        summary.elapsed_ms as f64 / 1_000.0
    );

    println!("players:");
    for player in &summary.players {
        println!(
            "  #{} {:<10} {:?} money {:>6}  income {:>+4}",
            player.id, player.name, player.team, player.money, player.income
        );
    }

    println!("rooms:");
    for room in &summary.rooms {
        let state = match room.bought {
            Some(true) => "bought",
            Some(false) => "for sale",
            None => "-",
        };
        println!(
            "  #{:<3} {:<6} cost {:>5}  {state}",
            room.id, room.kind, room.cost
        );
    }

    let events = &summary.events;
    println!(
        "events: {} purchases, {} rejected, {} reverted, {} units, {} payouts",
        events.purchases, events.rejections, events.reversions, events.unit_spawns, events.payouts
    );
    println!(
        "        {} announcements, {} structures destroyed",
        events.announcements, events.destructions
    );

    for delivery in &summary.deliveries {
        println!(
            "delivered {} {} to {:?}",
            delivery.amount,
            delivery.item.name(),
            delivery.team
        );
    }
}
