//! Roamers burrow through solid ground after nuggets and keep clear of the corridors.
//! They read the occupancy grid inverted: open cells are walls. They never touch the graph.

use rand_chacha::ChaCha8Rng;

use super::powers::PowerUp;
use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::random::random_index;
use crate::types::{BodyId, Point};

/// Radius of each tail section.
pub const ROAMER_RADIUS: f64 = 10.0;
pub const ROAMER_HEAD_RADIUS: f64 = 20.0;
const TRAIL_LEN: usize = 10;
/// Ticks between tail shuffles.
const TRAIL_PERIOD: u32 = 5;
const MATERIALISE_STEP: f64 = 15.0;
const SPOT_TRIES: usize = 20;
const SPAWN_ROUNDS: usize = 10;
const HEADING_TRIES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoamerStage {
    Materialising,
    Roaming,
    Eating { ticks_left: u32 },
}

/// A nugget still worth going after.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Forage {
    pub id: BodyId,
    pub pos: Point,
    pub power: Option<PowerUp>,
}

/// Roamers allowed on the field at `level`.
pub fn roamer_quota(level: u32) -> usize {
    match level {
        0..=2 => 0,
        3..=6 => 1,
        _ => 2,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Roamer {
    stage: RoamerStage,
    pos: Point,
    landing_y: f64,
    level: u32,
    speed: f64,
    step: (i32, i32),
    target: Option<BodyId>,
    random_moves: u32,
    /// Alternates between chasing the nearest nugget and the first one listed.
    pick_first: bool,
    shoved: bool,
    trail: Vec<Point>,
    age: u32,
}

impl Roamer {
    /// Picks a buried spot away from the spawn point and the listed obstacles, then starts
    /// materialising above it. `None` when the ground has no room left.
    pub fn spawn(
        grid: &OccupancyGrid,
        config: &PlayfieldConfig,
        level: u32,
        obstacles: &[(Point, f64)],
        rng: &mut ChaCha8Rng,
    ) -> Option<Self> {
        let diameter = (2.0 * ROAMER_RADIUS) as i32;
        let x_span = (config.size - diameter).max(1) as usize;
        let y_span = (config.size - config.play_area_top - diameter).max(1) as usize;
        let spawn = Point::from(config.spawn());
        let keep_clear = f64::from(config.corridor_width * 2);

        for _ in 0..SPAWN_ROUNDS {
            let spot = (0..SPOT_TRIES)
                .map(|_| {
                    let x = random_index(rng, x_span) as i32 + diameter / 2;
                    let y =
                        config.play_area_top + random_index(rng, y_span) as i32 + diameter / 2;
                    Point::new(f64::from(x), f64::from(y))
                })
                .find(|&at| {
                    buried(grid, at, ROAMER_HEAD_RADIUS) && at.distance_to(spawn) >= keep_clear
                })?;
            let crowded = obstacles
                .iter()
                .any(|&(pos, radius)| pos.distance_to(spot) < radius + ROAMER_RADIUS);
            if !crowded {
                let mut roamer = Self::placed(spot, level);
                roamer.stage = RoamerStage::Materialising;
                roamer.pos.y = -2.0 * ROAMER_RADIUS;
                return Some(roamer);
            }
        }
        None
    }

    /// A roamer already burrowing at `pos`.
    pub fn placed(pos: Point, level: u32) -> Self {
        Self {
            stage: RoamerStage::Roaming,
            pos,
            landing_y: pos.y,
            level,
            speed: if level < 10 { 0.8 + 0.1 * f64::from(level) } else { 2.0 },
            step: (0, 0),
            target: None,
            random_moves: 0,
            pick_first: false,
            shoved: false,
            trail: vec![pos; TRAIL_LEN],
            age: 0,
        }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn stage(&self) -> RoamerStage {
        self.stage
    }

    pub fn is_active(&self) -> bool {
        self.stage != RoamerStage::Materialising
    }

    pub fn target(&self) -> Option<BodyId> {
        self.target
    }

    /// Head first.
    pub fn trail(&self) -> &[Point] {
        &self.trail
    }

    /// True when a body of `radius` at `at` overlaps the head or any tail section.
    pub fn touches(&self, at: Point, radius: f64) -> bool {
        self.is_active()
            && self.trail.iter().enumerate().any(|(i, &section)| {
                let reach = if i == 0 { ROAMER_HEAD_RADIUS } else { ROAMER_RADIUS };
                section.distance_to(at) < reach + radius
            })
    }

    pub fn advance(
        &mut self,
        grid: &OccupancyGrid,
        forage: &[Forage],
        frozen: bool,
        rng: &mut ChaCha8Rng,
    ) {
        self.age = self.age.wrapping_add(1);
        if self.stage == RoamerStage::Materialising {
            self.pos.y += MATERIALISE_STEP;
            if self.pos.y >= self.landing_y {
                self.pos.y = self.landing_y;
                self.stage = RoamerStage::Roaming;
                self.find_nugget(forage);
            }
            return;
        }

        // A corridor dug through the roamer traps it where it is.
        let cell = self.pos.cell();
        if !grid.is_solid_ground(cell.x, cell.y) {
            self.stage = RoamerStage::Roaming;
            return;
        }
        if frozen {
            return;
        }
        if let RoamerStage::Eating { ticks_left } = self.stage {
            self.stage = if ticks_left > 1 {
                RoamerStage::Eating { ticks_left: ticks_left - 1 }
            } else {
                RoamerStage::Roaming
            };
            return;
        }

        if let Some(target) = self.target {
            let Some(food) = forage.iter().find(|f| f.id == target) else {
                self.target = None;
                return;
            };
            self.step = (toward(self.pos.x, food.pos.x), toward(self.pos.y, food.pos.y));
            if self.step == (0, 0) || !self.clear_ahead(grid) {
                self.target = None;
                self.pick_random_move(grid, rng);
            }
        } else if self.random_moves > 0 {
            self.random_moves -= 1;
            if !self.clear_ahead(grid) {
                self.random_moves = 0;
                return;
            }
        } else if self.shoved {
            self.shoved = false;
            self.pick_random_move(grid, rng);
        } else {
            self.find_nugget(forage);
            if self.target.is_some() {
                return;
            }
            self.pick_random_move(grid, rng);
        }

        self.pos.x += f64::from(self.step.0) * self.speed;
        self.pos.y += f64::from(self.step.1) * self.speed;
        if self.age % TRAIL_PERIOD == 0 {
            self.trail.rotate_right(1);
        }
        self.trail[0] = self.pos;
    }

    /// Turns away from a boulder it ran into and wanders off for a few ticks.
    pub fn shove_from(&mut self, boulder: Point) {
        self.step = (
            if boulder.x < self.pos.x { 1 } else { -1 },
            if boulder.y < self.pos.y { 1 } else { -1 },
        );
        self.target = None;
        self.random_moves = 5;
        self.shoved = true;
    }

    /// Starts eating the nugget it was after. Returns false when `nugget` was not its target.
    pub fn start_eating(&mut self, nugget: BodyId) -> bool {
        if self.stage != RoamerStage::Roaming || self.target != Some(nugget) {
            return false;
        }
        self.target = None;
        let ticks = if self.level < 10 { 200 - 10 * self.level } else { 100 };
        self.stage = RoamerStage::Eating { ticks_left: ticks };
        true
    }

    fn find_nugget(&mut self, forage: &[Forage]) {
        let level = self.level;
        let mut edible = forage.iter().filter(|f| match f.power {
            None => true,
            Some(PowerUp::Freeze) => level >= 6,
            Some(PowerUp::Invisibility | PowerUp::TurboEnemy) => false,
        });
        let pick = if self.pick_first {
            edible.next()
        } else {
            edible.min_by(|a, b| {
                let (da, db) = (a.pos.distance_to(self.pos), b.pos.distance_to(self.pos));
                da.total_cmp(&db)
            })
        };
        self.target = pick.map(|f| f.id);
    }

    fn pick_random_move(&mut self, grid: &OccupancyGrid, rng: &mut ChaCha8Rng) {
        self.random_moves = 50 + random_index(rng, 50) as u32;
        self.pick_first = !self.pick_first;
        for _ in 0..HEADING_TRIES {
            self.step = (0, 0);
            while self.step == (0, 0) {
                self.step = (random_index(rng, 3) as i32 - 1, random_index(rng, 3) as i32 - 1);
            }
            if self.clear_ahead(grid) {
                break;
            }
        }
    }

    /// The leading edge of the head after one more step stays in solid ground.
    fn clear_ahead(&self, grid: &OccupancyGrid) -> bool {
        let reach = self.speed + ROAMER_HEAD_RADIUS;
        let edge = Point::new(
            self.pos.x + f64::from(self.step.0) * reach,
            self.pos.y + f64::from(self.step.1) * reach,
        )
        .cell();
        grid.is_solid_ground(edge.x, edge.y)
    }
}

fn toward(from: f64, to: f64) -> i32 {
    if (to - from).abs() <= ROAMER_RADIUS {
        0
    } else if to > from {
        1
    } else {
        -1
    }
}

/// Solid ground under `at` and `reach` away on each side.
fn buried(grid: &OccupancyGrid, at: Point, reach: f64) -> bool {
    [(0.0, 0.0), (reach, 0.0), (-reach, 0.0), (0.0, reach), (0.0, -reach)]
        .iter()
        .all(|&(dx, dy)| {
            let cell = Point::new(at.x + dx, at.y + dy).cell();
            grid.is_solid_ground(cell.x, cell.y)
        })
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;
    use slotmap::SlotMap;

    use super::*;
    use crate::types::Rect;

    fn ground() -> (OccupancyGrid, PlayfieldConfig) {
        let config = PlayfieldConfig::default();
        (OccupancyGrid::new(&config), config)
    }

    fn nugget(at: Point, power: Option<PowerUp>) -> Forage {
        let mut ids: SlotMap<BodyId, ()> = SlotMap::with_key();
        Forage { id: ids.insert(()), pos: at, power }
    }

    #[test]
    fn spawns_buried_and_materialises_into_place() {
        let (mut grid, config) = ground();
        grid.carve_rect(Rect::new(0, 50, 650, 300));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut roamer = Roamer::spawn(&grid, &config, 3, &[], &mut rng).unwrap();
        assert_eq!(roamer.stage(), RoamerStage::Materialising);
        assert!(!roamer.touches(roamer.pos(), 100.0));

        for _ in 0..60 {
            roamer.advance(&grid, &[], false, &mut rng);
        }
        assert!(roamer.is_active());
        let at = roamer.pos().cell();
        assert!(at.y > 310);
        assert!(grid.is_solid_ground(at.x, at.y));
    }

    #[test]
    fn no_room_means_no_roamer() {
        let (mut grid, config) = ground();
        grid.carve_rect(Rect::new(0, 0, 650, 650));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(Roamer::spawn(&grid, &config, 3, &[], &mut rng).is_none());
    }

    #[test]
    fn heads_for_the_nearest_plain_nugget() {
        let (grid, _) = ground();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let near = nugget(Point::new(300.0, 450.0), None);
        let guarded = nugget(Point::new(250.0, 300.0), Some(PowerUp::Invisibility));
        let far = nugget(Point::new(500.0, 300.0), None);
        let forage = [guarded, far, near];

        let mut roamer = Roamer::placed(Point::new(300.0, 300.0), 3);
        roamer.advance(&grid, &forage, false, &mut rng);
        assert_eq!(roamer.target(), Some(near.id));

        let start = roamer.pos();
        for _ in 0..20 {
            roamer.advance(&grid, &forage, false, &mut rng);
        }
        assert!(roamer.pos().y > start.y + 20.0);
        assert_eq!(roamer.pos().x, start.x);
    }

    #[test]
    fn keeps_out_of_corridors() {
        let (mut grid, _) = ground();
        grid.carve_rect(Rect::new(0, 350, 650, 400));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let bait = nugget(Point::new(300.0, 500.0), None);

        let mut roamer = Roamer::placed(Point::new(300.0, 300.0), 3);
        for _ in 0..400 {
            roamer.advance(&grid, &[bait], false, &mut rng);
            assert!(roamer.pos().y < 350.0);
        }
    }

    #[test]
    fn eats_only_its_own_target() {
        let (grid, _) = ground();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let food = nugget(Point::new(300.0, 320.0), None);
        let other = nugget(Point::new(100.0, 600.0), None);
        let mut roamer = Roamer::placed(Point::new(300.0, 300.0), 4);
        roamer.advance(&grid, &[food, other], false, &mut rng);

        assert!(!roamer.start_eating(other.id));
        assert!(roamer.start_eating(food.id));
        assert_eq!(roamer.stage(), RoamerStage::Eating { ticks_left: 160 });
        let pos = roamer.pos();
        for _ in 0..159 {
            roamer.advance(&grid, &[other], false, &mut rng);
        }
        assert_eq!(roamer.pos(), pos);
        roamer.advance(&grid, &[other], false, &mut rng);
        assert_eq!(roamer.stage(), RoamerStage::Roaming);
    }

    #[test]
    fn freeze_holds_it_still() {
        let (grid, _) = ground();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut roamer = Roamer::placed(Point::new(300.0, 300.0), 5);
        for _ in 0..30 {
            roamer.advance(&grid, &[], true, &mut rng);
        }
        assert_eq!(roamer.pos(), Point::new(300.0, 300.0));
    }

    #[test]
    fn tail_follows_the_head() {
        let (grid, _) = ground();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bait = nugget(Point::new(300.0, 600.0), None);
        let mut roamer = Roamer::placed(Point::new(300.0, 200.0), 3);
        for _ in 0..50 {
            roamer.advance(&grid, &[bait], false, &mut rng);
        }
        let trail = roamer.trail();
        assert_eq!(trail[0], roamer.pos());
        assert!(trail[1].y < trail[0].y);
        assert!(trail[2].y < trail[1].y);
        assert!(roamer.touches(trail[3], 1.0));
        assert!(!roamer.touches(Point::new(100.0, 100.0), 1.0));
    }

    #[test]
    fn quota_grows_with_level() {
        assert_eq!(roamer_quota(2), 0);
        assert_eq!(roamer_quota(3), 1);
        assert_eq!(roamer_quota(7), 2);
    }
}
