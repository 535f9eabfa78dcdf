//! Free bodies that bounce around the dug corridors without using the graph.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::grid::OccupancyGrid;
use crate::random::random_index;
use crate::tunnels::TunnelGraph;
use crate::types::{Direction, Orientation, Point, SegmentId};

const BALL_RADIUS: i32 = 10;
const BALL_SPEED: f64 = 3.0;
const BALL_LIFESPAN: u32 = 200;
const SPIKY_RADIUS: i32 = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrifterKind {
    /// Thrown by the digger; knocks out enemies it touches.
    Ball,
    /// Wanders on its own and is deadly to the digger.
    Spiky,
}

/// Which axes reversed during the last move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drifter {
    kind: DrifterKind,
    pos: Point,
    radius: i32,
    x_mult: i32,
    y_mult: i32,
    speed: f64,
    age: u32,
    lifespan: u32,
    /// Ticks until a spiky picks a fresh diagonal.
    turn_in: Option<u32>,
}

impl Drifter {
    pub fn ball(from: Point, facing: Direction) -> Self {
        let (x_mult, y_mult) = match facing {
            Direction::Left | Direction::Down => (-1, 1),
            Direction::Up => (1, -1),
            Direction::Right | Direction::Stop => (1, 1),
        };
        Self {
            kind: DrifterKind::Ball,
            pos: from,
            radius: BALL_RADIUS,
            x_mult,
            y_mult,
            speed: BALL_SPEED,
            age: 0,
            lifespan: BALL_LIFESPAN,
            turn_in: None,
        }
    }

    /// Drops a spiky at a random spot along a random segment, preferring one other than
    /// `avoid` (usually the digger's) when the network has a choice.
    pub fn spiky(
        graph: &TunnelGraph,
        level: u32,
        avoid: Option<SegmentId>,
        rng: &mut ChaCha8Rng,
    ) -> Option<Self> {
        let all: Vec<SegmentId> = graph.segments().map(|(id, _)| id).collect();
        if all.is_empty() {
            return None;
        }
        let avoid = avoid.and_then(|id| graph.resolve(id));
        let elsewhere: Vec<SegmentId> =
            all.iter().copied().filter(|&id| Some(id) != avoid).collect();
        let choices = if elsewhere.is_empty() { &all } else { &elsewhere };
        let seg = graph.get(choices[random_index(rng, choices.len())])?;
        let rect = seg.rect();
        let centre = f64::from(seg.centreline());
        let pos = match seg.orientation() {
            Orientation::Vertical => {
                Point::new(centre, f64::from(rect.min_y + spread(rng, rect.max_y - rect.min_y)))
            }
            Orientation::Horizontal => {
                Point::new(f64::from(rect.min_x + spread(rng, rect.max_x - rect.min_x)), centre)
            }
        };
        Some(Self::spiky_at(pos, level, rng))
    }

    /// A spiky starting at `pos` on a random diagonal.
    pub fn spiky_at(pos: Point, level: u32, rng: &mut ChaCha8Rng) -> Self {
        let mut spiky = Self {
            kind: DrifterKind::Spiky,
            pos,
            radius: SPIKY_RADIUS,
            x_mult: 0,
            y_mult: 0,
            speed: if level < 20 { 3.0 + 0.2 * f64::from(level) } else { 7.0 },
            age: 0,
            lifespan: level.saturating_mul(20).saturating_add(400),
            turn_in: None,
        };
        spiky.pick_diagonal(rng);
        spiky
    }

    pub fn kind(&self) -> DrifterKind {
        self.kind
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn radius(&self) -> f64 {
        f64::from(self.radius)
    }

    pub fn heading(&self) -> (i32, i32) {
        (self.x_mult, self.y_mult)
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifespan
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Probes from the leading edge along x, then along y, reversing any axis that meets
    /// solid ground within one step, then moves.
    pub fn advance(&mut self, grid: &OccupancyGrid, rng: &mut ChaCha8Rng) -> Bounce {
        self.age += 1;
        if let Some(turn_in) = self.turn_in {
            if turn_in <= 1 {
                self.pick_diagonal(rng);
            } else {
                self.turn_in = Some(turn_in - 1);
            }
        }

        let start_x = self.pos.x as i32 + self.x_mult * self.radius;
        let start_y = self.pos.y as i32 + self.y_mult * self.radius;
        let reach = self.speed as i32;
        let end_x = start_x + self.x_mult * reach;
        let end_y = start_y + self.y_mult * reach;

        let mut bounce = Bounce::default();
        if let Some(wall) = first_solid(start_x, end_x, |x| grid.is_outside(x, start_y)) {
            self.x_mult = -self.x_mult;
            self.pos.x += f64::from(wall - start_x);
            bounce.x = true;
        }
        if let Some(wall) = first_solid(start_y, end_y, |y| grid.is_outside(start_x, y)) {
            self.y_mult = -self.y_mult;
            self.pos.y += f64::from(wall - start_y);
            bounce.y = true;
        }
        self.pos.x += self.speed * f64::from(self.x_mult);
        self.pos.y += self.speed * f64::from(self.y_mult);
        bounce
    }

    /// Reverses both axes, as after glancing off another body.
    pub fn rebound(&mut self) {
        self.x_mult = -self.x_mult;
        self.y_mult = -self.y_mult;
    }

    /// Rebounds off a body at `other` unless already moving away from it, so a drifter
    /// still overlapping after one bounce does not flip back into it. Returns whether it
    /// turned.
    pub fn rebound_from(&mut self, other: Point) -> bool {
        let closing = (other.x - self.pos.x) * f64::from(self.x_mult)
            + (other.y - self.pos.y) * f64::from(self.y_mult);
        if closing > 0.0 {
            self.rebound();
            return true;
        }
        false
    }

    fn pick_diagonal(&mut self, rng: &mut ChaCha8Rng) {
        loop {
            let x_mult = if rng.next_u64() % 2 == 0 { -1 } else { 1 };
            let y_mult = if rng.next_u64() % 2 == 0 { -1 } else { 1 };
            if (x_mult, y_mult) != (self.x_mult, self.y_mult) {
                self.x_mult = x_mult;
                self.y_mult = y_mult;
                break;
            }
        }
        self.turn_in = Some(20 + random_index(rng, 130) as u32);
    }
}

/// Offset into a span of `len` cells that keeps clear of both ends.
fn spread(rng: &mut ChaCha8Rng, len: i32) -> i32 {
    let room = (len - 2).max(1);
    random_index(rng, room as usize) as i32 + 1
}

/// First coordinate from `from` to `to` inclusive where `solid` holds.
fn first_solid(from: i32, to: i32, solid: impl Fn(i32) -> bool) -> Option<i32> {
    let step = if to > from { 1 } else { -1 };
    let mut probe = from;
    loop {
        if solid(probe) {
            return Some(probe);
        }
        if probe == to {
            return None;
        }
        probe += step;
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::config::PlayfieldConfig;
    use crate::types::Rect;

    fn open_room() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(&PlayfieldConfig::default());
        grid.carve_rect(Rect::new(100, 100, 300, 300));
        grid
    }

    #[test]
    fn ball_heading_follows_facing() {
        let from = Point::new(200.0, 200.0);
        assert_eq!(Drifter::ball(from, Direction::Left).heading(), (-1, 1));
        assert_eq!(Drifter::ball(from, Direction::Up).heading(), (1, -1));
        assert_eq!(Drifter::ball(from, Direction::Right).heading(), (1, 1));
    }

    #[test]
    fn ball_moves_diagonally_in_open_space() {
        let grid = open_room();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ball = Drifter::ball(Point::new(200.0, 200.0), Direction::Right);

        assert_eq!(ball.advance(&grid, &mut rng), Bounce::default());
        assert_eq!(ball.pos(), Point::new(203.0, 203.0));
    }

    #[test]
    fn ball_bounces_off_right_wall() {
        let grid = open_room();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // leading edge at x=299; ground starts at x=301
        let mut ball = Drifter::ball(Point::new(289.0, 200.0), Direction::Right);

        let bounce = ball.advance(&grid, &mut rng);
        assert_eq!(bounce, Bounce { x: true, y: false });
        assert_eq!(ball.heading(), (-1, 1));
        assert_eq!(ball.pos(), Point::new(289.0 + 2.0 - 3.0, 203.0));
    }

    #[test]
    fn ball_stays_inside_room_for_its_lifetime() {
        let grid = open_room();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut ball = Drifter::ball(Point::new(150.0, 260.0), Direction::Down);
        while !ball.is_expired() {
            ball.advance(&grid, &mut rng);
            let pos = ball.pos();
            assert!((100.0..=300.0).contains(&pos.x), "x escaped: {pos:?}");
            assert!((100.0..=300.0).contains(&pos.y), "y escaped: {pos:?}");
        }
    }

    #[test]
    fn spiky_spawns_on_a_segment_centreline_away_from_avoided_one() {
        let mut graph = TunnelGraph::new(50);
        let a = graph.create_segment(100, 100);
        graph.grow_segment(a, 100, 400).unwrap();
        let b = graph.create_segment(100, 500);
        graph.grow_segment(b, 500, 500).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        for _ in 0..20 {
            let spiky = Drifter::spiky(&graph, 1, Some(a), &mut rng).unwrap();
            assert_eq!(spiky.kind(), DrifterKind::Spiky);
            assert_eq!(spiky.pos().y, 500.0);
            assert!(spiky.pos().x > 75.0 && spiky.pos().x < 525.0);
        }
    }

    #[test]
    fn spiky_lifespan_saturates_on_huge_levels() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let spiky = Drifter::spiky_at(Point::new(200.0, 200.0), 300_000_000, &mut rng);
        assert!(!spiky.is_expired());
        assert_eq!(spiky.radius(), 15.0);

        let early = Drifter::spiky_at(Point::new(200.0, 200.0), 4, &mut rng);
        assert_eq!(early.lifespan, 480);
    }

    #[test]
    fn rebound_only_turns_a_drifter_closing_in() {
        let mut ball = Drifter::ball(Point::new(200.0, 200.0), Direction::Right);
        let ahead = Point::new(240.0, 240.0);

        assert!(ball.rebound_from(ahead));
        assert_eq!(ball.heading(), (-1, -1));
        assert!(!ball.rebound_from(ahead));
        assert_eq!(ball.heading(), (-1, -1));
    }

    #[test]
    fn probe_walks_inclusive_range_in_either_direction() {
        assert_eq!(first_solid(5, 9, |x| x == 9), Some(9));
        assert_eq!(first_solid(5, 1, |x| x <= 3), Some(3));
        assert_eq!(first_solid(5, 9, |_| false), None);
    }
}
