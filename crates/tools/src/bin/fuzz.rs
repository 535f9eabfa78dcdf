use anyhow::{Result, bail};
use burrow_core::agents::EnemyStage;
use burrow_core::{AdvanceStopReason, SimConfig, Simulation};
use clap::Parser;
use log::LevelFilter;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use simple_logger::SimpleLogger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 10000)]
    ticks: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn main() -> Result<()> {
    let args = Args::parse();
    SimpleLogger::new().with_level(LevelFilter::Warn).init()?;

    println!("Starting Fuzz harness on seed {} for max {} steps...", args.seed, args.ticks);
    let mut sim = Simulation::new(args.seed, SimConfig::default())?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut dug = sim.grid().dug_cell_count();

    let mut total_steps = 0;
    while total_steps < args.ticks {
        let result = sim.advance(10);
        total_steps += result.simulated_ticks.max(1);

        match result.stop_reason {
            AdvanceStopReason::BudgetExhausted => {}
            AdvanceStopReason::DiggerLost(cause) => {
                println!("Digger lost ({:?}) at tick {}", cause, sim.tick());
                // Alternate between retrying the level and moving on to a harder one
                if choose(&mut rng, &[true, true, false]) {
                    sim.respawn_digger()?;
                } else {
                    sim.start_level(sim.level() + 1)?;
                    dug = sim.grid().dug_cell_count();
                }
                continue;
            }
            AdvanceStopReason::LevelCleared => {
                println!("Level {} cleared at tick {}", sim.level(), sim.tick());
                sim.start_level(sim.level() + 1)?;
                dug = sim.grid().dug_cell_count();
                continue;
            }
            AdvanceStopReason::EngineFailure(err) => {
                bail!("Engine failure at tick {}: {err}", sim.tick());
            }
        }

        // Assert invariants
        let violations = sim.graph().link_violations();
        assert!(violations.is_empty(), "Invariant failed: broken links {violations:?}");
        assert!(sim.grid().dug_cell_count() >= dug, "Invariant failed: ground refilled");
        dug = sim.grid().dug_cell_count();
        for (id, enemy) in sim.enemies() {
            if enemy.stage() == EnemyStage::Materialising {
                continue;
            }
            let current = enemy.nav().current.and_then(|seg| sim.graph().resolve(seg));
            assert!(current.is_some(), "Invariant failed: {id:?} has no live segment");
        }
    }

    println!(
        "Fuzzing completed successfully at level {} with {} segments (hash {}).",
        sim.level(),
        sim.graph().len(),
        sim.snapshot_hash()
    );
    Ok(())
}
