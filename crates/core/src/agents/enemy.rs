//! Pursuit enemies walking the tunnel graph.
//! This module exists to turn the navigator's per-tick decisions into species behaviour.
//! It does not own contact handling; the simulation reports blocks and meals back in.

use rand_chacha::ChaCha8Rng;

use super::powers::PowerUps;
use super::species::{Behavior, DINNER_SEARCH_DEPTH, Species, eating_ticks, materialise_step};
use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::nav::{NavState, Resolution};
use crate::random::one_in;
use crate::tunnels::TunnelGraph;
use crate::types::{BodyId, Direction, Point, SegmentId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStage {
    /// Descending onto the spawn point; ignores the grid and cannot catch anything.
    Materialising,
    Hunting,
    Eating { ticks_left: u32 },
}

/// What enemies are chasing this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quarry {
    pub pos: Point,
    pub segment: Option<SegmentId>,
}

/// A resting boulder a forager could eat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meal {
    pub id: BodyId,
    pub pos: Point,
    pub segment: SegmentId,
}

/// Read-only view of the world an enemy decides against.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    pub graph: &'a TunnelGraph,
    pub grid: &'a OccupancyGrid,
    pub quarry: Quarry,
    pub meals: &'a [Meal],
    /// The digger's active power-ups.
    pub powers: PowerUps,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    species: Species,
    behavior: Behavior,
    /// Current step length; doubles while the digger's turbo power-up runs.
    speed: f64,
    level: u32,
    stage: EnemyStage,
    pos: Point,
    prev_pos: Point,
    landing_y: f64,
    nav: NavState,
    dinner: Option<BodyId>,
}

impl Enemy {
    /// Starts materialising above the spawn point, bound for the home segment.
    pub fn spawn(
        species: Species,
        graph: &TunnelGraph,
        config: &PlayfieldConfig,
        level: u32,
    ) -> Option<Self> {
        let home = graph.home()?;
        let behavior = species.behavior(level);
        let spawn = Point::from(config.spawn());
        let pos = Point::new(spawn.x, -2.0 * behavior.radius);
        Some(Self {
            species,
            behavior,
            speed: behavior.speed,
            level,
            stage: EnemyStage::Materialising,
            pos,
            prev_pos: pos,
            landing_y: spawn.y,
            nav: NavState::starting_in(home),
            dinner: None,
        })
    }

    /// An enemy already hunting from `pos` inside `segment`.
    pub fn placed(species: Species, level: u32, pos: Point, segment: SegmentId) -> Self {
        let behavior = species.behavior(level);
        Self {
            species,
            behavior,
            speed: behavior.speed,
            level,
            stage: EnemyStage::Hunting,
            pos,
            prev_pos: pos,
            landing_y: pos.y,
            nav: NavState::starting_in(segment),
            dinner: None,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn stage(&self) -> EnemyStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnemyStage::Materialising
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn dir(&self) -> Direction {
        self.nav.dir
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn dinner(&self) -> Option<BodyId> {
        self.dinner
    }

    pub fn advance(&mut self, env: &Surroundings<'_>, rng: &mut ChaCha8Rng) {
        if self.stage == EnemyStage::Materialising {
            self.pos.y += materialise_step(self.level);
            if self.pos.y >= self.landing_y {
                self.pos.y = self.landing_y;
                self.prev_pos = self.pos;
                self.stage = EnemyStage::Hunting;
            }
            return;
        }
        if env.powers.is_frozen() {
            return;
        }
        self.speed =
            if env.powers.is_turbo() { 2.0 * self.behavior.speed } else { self.behavior.speed };

        match self.stage {
            EnemyStage::Eating { ticks_left } if ticks_left > 1 => {
                self.stage = EnemyStage::Eating { ticks_left: ticks_left - 1 };
                return;
            }
            EnemyStage::Eating { .. } => {
                self.stage = EnemyStage::Hunting;
                self.dinner = None;
            }
            EnemyStage::Hunting | EnemyStage::Materialising => {}
        }

        self.nav.refresh(env.graph);
        let cell = self.pos.cell();
        if env.grid.is_outside(cell.x, cell.y) {
            log::trace!("{:?} strayed into ground at {cell:?}, recovering", self.species);
            self.pos = self.prev_pos;
            self.nav.pick_random_link(env.graph, rng);
            self.resolve(env.graph);
            self.step();
            return;
        }

        match self.species {
            Species::Pursuer => self.pursue(env, rng),
            Species::Forager => self.forage(env, rng),
        }
    }

    /// Undoes the last move and heads back to the segment it came from; used when the way
    /// ahead is blocked.
    pub fn reverse(&mut self, graph: &TunnelGraph) {
        self.pos = self.prev_pos;
        self.nav.next = self.nav.previous.and_then(|previous| graph.resolve(previous));
        self.resolve(graph);
    }

    pub fn start_eating(&mut self, boulder: BodyId) {
        self.stage = EnemyStage::Eating { ticks_left: eating_ticks(self.level) };
        self.dinner = Some(boulder);
        self.nav.next = None;
        self.nav.dir = Direction::Stop;
    }

    /// Forgets a dinner that can no longer be eaten.
    pub fn drop_dinner(&mut self, boulder: BodyId) {
        if self.dinner == Some(boulder) {
            self.dinner = None;
        }
    }

    /// Chases the quarry. An invisible digger leaves nothing to chase, so the pursuer only
    /// wanders.
    fn pursue(&mut self, env: &Surroundings<'_>, rng: &mut ChaCha8Rng) {
        let graph = env.graph;
        let hidden = env.powers.is_invisible();
        if !hidden && self.shares_segment(graph, env.quarry.segment) {
            self.nav.head_toward(graph, self.pos, env.quarry.pos);
        } else if self.nav.next.is_some() {
            if !self.resolve(graph).direction().is_moving() {
                return;
            }
        } else if !hidden && one_in(rng, self.behavior.path_odds.0, self.behavior.path_odds.1) {
            match self.path_to(graph, env.quarry.segment, self.behavior.search_depth) {
                Some(next) => self.nav.next = Some(next),
                None => self.nav.pick_link_toward(graph, self.pos, env.quarry.pos, rng),
            }
            self.resolve(graph);
        } else {
            self.nav.pick_random_link(graph, rng);
            self.resolve(graph);
        }
        self.step();
    }

    fn forage(&mut self, env: &Surroundings<'_>, rng: &mut ChaCha8Rng) {
        let graph = env.graph;
        if self.nav.next.is_some() {
            if !self.resolve(graph).direction().is_moving() {
                return;
            }
        } else if let Some(dinner) = self.dinner {
            let Some(meal) = env.meals.iter().find(|meal| meal.id == dinner) else {
                self.dinner = None;
                return;
            };
            if self.shares_segment(graph, Some(meal.segment)) {
                self.nav.head_toward(graph, self.pos, meal.pos);
            } else {
                match self.path_to(graph, Some(meal.segment), self.behavior.search_depth) {
                    Some(next) => self.nav.next = Some(next),
                    None => {
                        self.dinner = None;
                        self.nav.pick_random_link(graph, rng);
                    }
                }
                self.resolve(graph);
            }
        } else if env.powers.is_invisible() {
            self.nav.pick_random_link(graph, rng);
            self.resolve(graph);
        } else if self.shares_segment(graph, env.quarry.segment) {
            self.nav.head_toward(graph, self.pos, env.quarry.pos);
        } else if !self.find_dinner(env) {
            match self.path_to(graph, env.quarry.segment, self.behavior.search_depth) {
                Some(next) => self.nav.next = Some(next),
                None => self.nav.pick_random_link(graph, rng),
            }
            self.resolve(graph);
        }
        self.step();
    }

    fn find_dinner(&mut self, env: &Surroundings<'_>) -> bool {
        for meal in env.meals {
            if let Some(next) = self.path_to(env.graph, Some(meal.segment), DINNER_SEARCH_DEPTH) {
                log::debug!("forager heading for boulder {:?}", meal.id);
                self.dinner = Some(meal.id);
                self.nav.next = Some(next);
                self.resolve(env.graph);
                return true;
            }
        }
        false
    }

    fn shares_segment(&self, graph: &TunnelGraph, other: Option<SegmentId>) -> bool {
        let here = self.nav.current.and_then(|current| graph.resolve(current));
        here.is_some() && here == other.and_then(|other| graph.resolve(other))
    }

    fn path_to(
        &self,
        graph: &TunnelGraph,
        goal: Option<SegmentId>,
        depth: u32,
    ) -> Option<SegmentId> {
        let from = self.nav.current?;
        graph.find_path(depth, from, goal?).map(|step| step.next)
    }

    fn resolve(&mut self, graph: &TunnelGraph) -> Resolution {
        self.nav.resolve_direction(graph, &mut self.pos, self.speed)
    }

    fn step(&mut self) {
        self.prev_pos = self.pos;
        let (dx, dy) = self.nav.dir.delta();
        self.pos.x += dx * self.speed;
        self.pos.y += dy * self.speed;
    }
}
