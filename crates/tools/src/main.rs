use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use burrow_core::{AdvanceStopReason, Pos, Rect, SimConfig, SimEvent, Simulation};
use clap::Parser;
use log::LevelFilter;
use serde::Serialize;
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(author, version, about = "Runs a headless tunnel simulation and reports the network")]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 3000)]
    ticks: u32,
    /// Overrides the starting level from the config
    #[arg(short, long)]
    level: Option<u32>,
    /// TOML file with playfield and roster settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Keep going after the digger is lost, respawning it at the entrance
    #[arg(long)]
    respawn: bool,
    /// Move on to the next level when the current one is cleared instead of stopping
    #[arg(long)]
    next_level: bool,
    /// Include every live segment in the report
    #[arg(long)]
    segments: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct SegmentReport {
    start: Pos,
    end: Pos,
    rect: Rect,
    links: usize,
}

#[derive(Serialize)]
struct RunReport {
    seed: u64,
    level: u32,
    ticks: u64,
    stop_reason: String,
    losses: u32,
    levels_cleared: u32,
    snapshot_hash: u64,
    segment_count: usize,
    dug_cells: usize,
    enemies: usize,
    roamers: usize,
    boulders: usize,
    nuggets_left: usize,
    segments_added: usize,
    events: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    segments: Vec<SegmentReport>,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(level) = args.level {
        config.level = level;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    SimpleLogger::new().with_level(level).init()?;

    let config = load_config(&args)?;
    let mut sim = Simulation::new(args.seed, config).context("Failed to build simulation")?;
    let segments_at_start = sim.graph().len();

    let mut losses = 0;
    let mut levels_cleared = 0;
    let mut left = args.ticks;
    let mut stop_reason = AdvanceStopReason::BudgetExhausted;
    while left > 0 {
        let result = sim.advance(left);
        left = left.saturating_sub(result.simulated_ticks);
        stop_reason = result.stop_reason;
        match &stop_reason {
            AdvanceStopReason::BudgetExhausted => {}
            AdvanceStopReason::DiggerLost(cause) => {
                losses += 1;
                log::info!("digger lost at tick {}: {cause:?}", sim.tick());
                if !args.respawn {
                    break;
                }
                sim.respawn_digger().context("Failed to respawn digger")?;
            }
            AdvanceStopReason::LevelCleared => {
                levels_cleared += 1;
                log::info!("level {} cleared at tick {}", sim.level(), sim.tick());
                if !args.next_level {
                    break;
                }
                sim.start_level(sim.level() + 1).context("Failed to start the next level")?;
            }
            AdvanceStopReason::EngineFailure(err) => {
                bail!("Simulation failed at tick {}: {err}", sim.tick());
            }
        }
    }

    let dug_segments = sim.graph().len().saturating_sub(segments_at_start);
    let report = RunReport {
        seed: sim.seed(),
        level: sim.level(),
        ticks: sim.tick(),
        stop_reason: format!("{stop_reason:?}"),
        losses,
        levels_cleared,
        snapshot_hash: sim.snapshot_hash(),
        segment_count: sim.graph().len(),
        dug_cells: sim.grid().dug_cell_count(),
        enemies: sim.enemies().count(),
        roamers: sim.roamers().count(),
        boulders: sim.boulders().count(),
        nuggets_left: sim.nuggets().count(),
        segments_added: dug_segments,
        events: sim.log().len(),
        segments: if args.segments {
            sim.graph()
                .segments()
                .map(|(_, seg)| SegmentReport {
                    start: seg.start(),
                    end: seg.end(),
                    rect: seg.rect(),
                    links: seg.links().len(),
                })
                .collect()
        } else {
            Vec::new()
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Simulation complete.");
    println!("Seed: {}  Level: {}  Ticks: {}", report.seed, report.level, report.ticks);
    println!("Stop reason: {}", report.stop_reason);
    println!("Losses: {}  Levels cleared: {}", report.losses, report.levels_cleared);
    println!("Segments: {}  Dug cells: {}", report.segment_count, report.dug_cells);
    println!(
        "Enemies: {}  Roamers: {}  Boulders: {}  Nuggets left: {}",
        report.enemies, report.roamers, report.boulders, report.nuggets_left
    );
    let eaten = sim.log().iter().filter(|e| matches!(e, SimEvent::BoulderEaten { .. })).count();
    println!("Boulders eaten: {eaten}");
    println!("Snapshot Hash: {}", report.snapshot_hash);
    for seg in &report.segments {
        println!(
            "  ({},{})-({},{}) rect [{},{}]-[{},{}] links {}",
            seg.start.x,
            seg.start.y,
            seg.end.x,
            seg.end.y,
            seg.rect.min_x,
            seg.rect.min_y,
            seg.rect.max_x,
            seg.rect.max_y,
            seg.links
        );
    }
    Ok(())
}
