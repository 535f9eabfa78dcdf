//! Seeded tick driver that owns the playfield and everything moving through it.
//! This module exists to sequence digging, boulders, enemies, roamers and drifters within a
//! tick.
//! It does not own navigation rules; those live with the agents and the tunnel graph.

use std::error::Error;
use std::fmt;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use slotmap::SlotMap;

use crate::agents::{Digger, Enemy, Forage, Meal, PowerUp, Quarry, Roamer, Species, Surroundings};
use crate::bodies::{
    Boulder, BoulderEvent, Drifter, DrifterKind, Nugget, place_boulders, place_nuggets,
};
use crate::config::{ConfigError, SimConfig};
use crate::grid::OccupancyGrid;
use crate::tunnels::{TunnelGraph, reset_level};
use crate::types::{AgentId, BodyId, NavError, SegmentId};

mod autopilot;
mod contacts;
mod hash;
mod roster;

use autopilot::Autopilot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossCause {
    Caught { by: Species },
    Crushed,
    Spiked,
    /// Ran into a roamer without a power-up to protect it.
    Ambushed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    BudgetExhausted,
    DiggerLost(LossCause),
    /// Every nugget is gone; the caller decides whether to start the next level.
    LevelCleared,
    /// A graph handle held by the simulation stopped resolving; the run cannot continue.
    EngineFailure(NavError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvanceResult {
    pub simulated_ticks: u32,
    pub stop_reason: AdvanceStopReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    LevelStarted { level: u32 },
    EnemySpawned { enemy: AgentId, species: Species },
    SpikySpawned { drifter: BodyId },
    BallThrown { drifter: BodyId },
    BoulderWobbling { boulder: BodyId },
    BoulderLanded { boulder: BodyId, segment: Option<SegmentId> },
    BoulderShattered { boulder: BodyId },
    BoulderEaten { boulder: BodyId, by: AgentId },
    EnemyCrushed { enemy: AgentId },
    EnemyKnockedOut { enemy: AgentId },
    SpikyCrushed { drifter: BodyId },
    /// A spiky destroyed a ball it ran into.
    BallDestroyed { drifter: BodyId },
    BallCaught { drifter: BodyId },
    RoamerSpawned { roamer: AgentId },
    RoamerKilled { roamer: AgentId },
    NuggetCollected { nugget: BodyId, power: Option<PowerUp> },
    NuggetSpoiled { nugget: BodyId, by: AgentId },
    LevelCleared { level: u32 },
    DiggerLost { cause: LossCause },
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    Config(ConfigError),
    Nav(NavError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(err) => write!(f, "{err}"),
            SimError::Nav(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SimError {}

impl From<ConfigError> for SimError {
    fn from(err: ConfigError) -> Self {
        SimError::Config(err)
    }
}

impl From<NavError> for SimError {
    fn from(err: NavError) -> Self {
        SimError::Nav(err)
    }
}

pub struct Simulation {
    seed: u64,
    tick: u64,
    level: u32,
    /// Ticks since the level (or the current life) started; drives the spawn schedule.
    level_tick: u64,
    rng: ChaCha8Rng,
    config: SimConfig,
    grid: OccupancyGrid,
    graph: TunnelGraph,
    digger: Digger,
    autopilot: Autopilot,
    enemies: SlotMap<AgentId, Enemy>,
    roamers: SlotMap<AgentId, Roamer>,
    /// Roamers the digger has squashed this level; they do not come back until the next.
    roamers_killed: usize,
    drifters: SlotMap<BodyId, Drifter>,
    boulders: SlotMap<BodyId, Boulder>,
    nuggets: SlotMap<BodyId, Nugget>,
    log: Vec<SimEvent>,
    lost: Option<LossCause>,
    cleared: bool,
}

impl Simulation {
    pub fn new(seed: u64, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let playfield = &config.playfield;
        let mut grid = OccupancyGrid::new(playfield);
        let mut graph = TunnelGraph::new(playfield.corridor_width);
        reset_level(&mut graph, &mut grid, playfield, config.level)?;
        let digger = Digger::spawn(&mut graph, playfield, config.level)?;

        let mut sim = Self {
            seed,
            tick: 0,
            level: config.level,
            level_tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            grid,
            graph,
            digger,
            autopilot: Autopilot::default(),
            enemies: SlotMap::with_key(),
            roamers: SlotMap::with_key(),
            roamers_killed: 0,
            drifters: SlotMap::with_key(),
            boulders: SlotMap::with_key(),
            nuggets: SlotMap::with_key(),
            log: Vec::new(),
            lost: None,
            cleared: false,
            config,
        };
        sim.scatter_boulders();
        sim.scatter_nuggets();
        sim.log.push(SimEvent::LevelStarted { level: sim.level });
        Ok(sim)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn graph(&self) -> &TunnelGraph {
        &self.graph
    }

    pub fn digger(&self) -> &Digger {
        &self.digger
    }

    pub fn enemies(&self) -> impl Iterator<Item = (AgentId, &Enemy)> + '_ {
        self.enemies.iter()
    }

    pub fn boulders(&self) -> impl Iterator<Item = (BodyId, &Boulder)> + '_ {
        self.boulders.iter()
    }

    pub fn drifters(&self) -> impl Iterator<Item = (BodyId, &Drifter)> + '_ {
        self.drifters.iter()
    }

    pub fn roamers(&self) -> impl Iterator<Item = (AgentId, &Roamer)> + '_ {
        self.roamers.iter()
    }

    pub fn nuggets(&self) -> impl Iterator<Item = (BodyId, &Nugget)> + '_ {
        self.nuggets.iter()
    }

    pub fn log(&self) -> &[SimEvent] {
        &self.log
    }

    pub fn lost(&self) -> Option<LossCause> {
        self.lost
    }

    /// True once the last nugget of the level has been collected.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn advance(&mut self, max_ticks: u32) -> AdvanceResult {
        if let Some(cause) = self.lost {
            return AdvanceResult {
                simulated_ticks: 0,
                stop_reason: AdvanceStopReason::DiggerLost(cause),
            };
        }
        if self.cleared {
            return AdvanceResult {
                simulated_ticks: 0,
                stop_reason: AdvanceStopReason::LevelCleared,
            };
        }

        let mut ticks = 0;
        while ticks < max_ticks {
            if let Err(err) = self.step() {
                log::error!("tick {} aborted: {err}", self.tick);
                return AdvanceResult {
                    simulated_ticks: ticks,
                    stop_reason: AdvanceStopReason::EngineFailure(err),
                };
            }
            self.tick += 1;
            ticks += 1;

            if let Some(cause) = self.lost {
                return AdvanceResult {
                    simulated_ticks: ticks,
                    stop_reason: AdvanceStopReason::DiggerLost(cause),
                };
            }
            if self.cleared {
                return AdvanceResult {
                    simulated_ticks: ticks,
                    stop_reason: AdvanceStopReason::LevelCleared,
                };
            }
        }
        AdvanceResult { simulated_ticks: ticks, stop_reason: AdvanceStopReason::BudgetExhausted }
    }

    /// Rebuilds the playfield for `level` and respawns everything on it.
    pub fn start_level(&mut self, level: u32) -> Result<(), NavError> {
        let playfield = &self.config.playfield;
        reset_level(&mut self.graph, &mut self.grid, playfield, level)?;
        self.level = level;
        self.boulders.clear();
        self.scatter_boulders();
        self.respawn_digger()?;
        self.nuggets.clear();
        self.scatter_nuggets();
        self.roamers_killed = 0;
        self.cleared = false;
        self.log.push(SimEvent::LevelStarted { level });
        Ok(())
    }

    /// Brings the digger back at the spawn point after a loss, keeping the dug network and
    /// boulders and nuggets but clearing every enemy, roamer and drifter.
    pub fn respawn_digger(&mut self) -> Result<(), NavError> {
        self.digger = Digger::spawn(&mut self.graph, &self.config.playfield, self.level)?;
        self.enemies.clear();
        self.roamers.clear();
        self.drifters.clear();
        self.autopilot = Autopilot::default();
        self.level_tick = 0;
        self.lost = None;
        Ok(())
    }

    fn step(&mut self) -> Result<(), NavError> {
        self.level_tick += 1;
        self.spawn_scheduled();

        self.steer_digger()?;
        self.digger.advance(&mut self.graph, &mut self.grid, &self.config.playfield)?;

        self.advance_boulders();
        self.advance_enemies();
        self.advance_roamers();
        self.advance_drifters();

        self.resolve_contacts()
    }

    fn scatter_boulders(&mut self) {
        let placed =
            place_boulders(&self.config.playfield, self.config.boulders, self.level, &mut self.rng);
        for boulder in placed {
            self.boulders.insert(boulder);
        }
    }

    fn scatter_nuggets(&mut self) {
        if !self.config.nuggets {
            return;
        }
        let obstacles: Vec<_> = self.boulders.values().map(|b| (b.pos(), b.radius())).collect();
        let placed = place_nuggets(
            &self.grid,
            &self.config.playfield,
            self.level,
            &obstacles,
            &mut self.rng,
        );
        for nugget in placed {
            self.nuggets.insert(nugget);
        }
    }

    fn advance_boulders(&mut self) {
        let ids: Vec<BodyId> = self.boulders.keys().collect();
        for id in ids {
            let Some(event) = self.boulders[id].advance(&self.graph, &self.grid) else {
                continue;
            };
            match event {
                BoulderEvent::StartedWobbling => {
                    self.log.push(SimEvent::BoulderWobbling { boulder: id });
                }
                BoulderEvent::Landed { segment } => {
                    self.log.push(SimEvent::BoulderLanded { boulder: id, segment });
                }
                BoulderEvent::Shattered => {
                    self.boulders.remove(id);
                    self.log.push(SimEvent::BoulderShattered { boulder: id });
                }
            }
        }
    }

    fn advance_enemies(&mut self) {
        let meals: Vec<Meal> = self
            .boulders
            .iter()
            .filter(|(_, boulder)| boulder.is_resting())
            .filter_map(|(id, boulder)| {
                boulder.segment(&self.graph).map(|segment| Meal { id, pos: boulder.pos(), segment })
            })
            .collect();
        let quarry = Quarry {
            pos: self.digger.pos(),
            segment: self.graph.resolve(self.digger.segment()),
        };
        let env = Surroundings {
            graph: &self.graph,
            grid: &self.grid,
            quarry,
            meals: &meals,
            powers: self.digger.powers(),
        };
        for enemy in self.enemies.values_mut() {
            enemy.advance(&env, &mut self.rng);
        }
    }

    fn advance_roamers(&mut self) {
        let forage: Vec<Forage> = self
            .nuggets
            .iter()
            .filter(|(_, nugget)| !nugget.is_spoiled())
            .map(|(id, nugget)| Forage { id, pos: nugget.pos(), power: nugget.power() })
            .collect();
        let frozen = self.digger.powers().is_frozen();
        for roamer in self.roamers.values_mut() {
            roamer.advance(&self.grid, &forage, frozen, &mut self.rng);
        }
    }

    fn advance_drifters(&mut self) {
        let frozen = self.digger.powers().is_frozen();
        for drifter in self.drifters.values_mut() {
            if frozen && drifter.kind() == DrifterKind::Spiky {
                continue;
            }
            drifter.advance(&self.grid, &mut self.rng);
        }
        self.drifters.retain(|_, drifter| !drifter.is_expired());
    }
}
