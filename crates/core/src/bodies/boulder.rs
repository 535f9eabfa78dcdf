//! Boulders embedded in the ground.
//! This module exists to model the rest, wobble and fall cycle against the occupancy grid.
//! It does not own what a falling boulder does to agents; the simulation resolves contacts.

use std::mem;

use rand_chacha::ChaCha8Rng;

use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::random::random_index;
use crate::tunnels::TunnelGraph;
use crate::types::{Direction, Point, SegmentId};

pub const BOULDER_RADIUS: i32 = 30;
pub const FALL_SPEED: i32 = 4;
pub const PUSH_SPEED: f64 = 0.5;
/// Ticks a touching neighbour keeps a boulder from being pushed toward it.
const PUSH_GUARD_TICKS: u32 = 2;
/// Extra depth probed below a resting boulder, so one that has only just landed does not
/// immediately find a corridor under itself.
const FALL_CHECK: i32 = 4;
/// Quadrant centres (as quarters of the field) for each of the two placement layouts.
const LAYOUTS: [[(i32, i32); 4]; 2] = [
    [(1, 1), (3, 3), (3, 1), (1, 3)],
    [(3, 1), (1, 3), (1, 1), (3, 3)],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoulderStage {
    Resting,
    Wobbling { ticks_left: u32 },
    Falling { from_y: f64 },
    /// Broke apart on landing; inert until removed.
    Broken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoulderEvent {
    StartedWobbling,
    /// Came to rest; `segment` is the corridor it sits in, if any.
    Landed { segment: Option<SegmentId> },
    /// Dropped far enough to break apart.
    Shattered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boulder {
    pos: Point,
    stage: BoulderStage,
    fall_check: i32,
    wobble_ticks: u32,
    break_height: f64,
    segment: Option<SegmentId>,
    /// Set by contact resolution while another boulder supports this one; cleared every tick.
    on_boulder: bool,
    cant_push: Option<(Direction, u32)>,
}

pub fn wobble_ticks(level: u32) -> u32 {
    if level < 10 { 60 - 3 * level } else { 30 }
}

pub fn break_height(level: u32) -> f64 {
    if level < 15 { f64::from(400 - 20 * level) } else { 100.0 }
}

impl Boulder {
    pub fn new(pos: Point, level: u32) -> Self {
        Self {
            pos,
            stage: BoulderStage::Resting,
            fall_check: FALL_CHECK,
            wobble_ticks: wobble_ticks(level),
            break_height: break_height(level),
            segment: None,
            on_boulder: false,
            cant_push: None,
        }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn radius(&self) -> f64 {
        f64::from(BOULDER_RADIUS)
    }

    pub fn stage(&self) -> BoulderStage {
        self.stage
    }

    pub fn is_resting(&self) -> bool {
        self.stage == BoulderStage::Resting
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.stage, BoulderStage::Falling { .. })
    }

    /// Corridor the boulder landed in, resolved through merges.
    pub fn segment(&self, graph: &TunnelGraph) -> Option<SegmentId> {
        self.segment.and_then(|id| graph.resolve(id))
    }

    pub fn advance(&mut self, graph: &TunnelGraph, grid: &OccupancyGrid) -> Option<BoulderEvent> {
        let supported = mem::take(&mut self.on_boulder);
        match self.stage {
            BoulderStage::Resting => {
                self.cant_push = match self.cant_push {
                    Some((dir, ticks)) if ticks > 0 => Some((dir, ticks - 1)),
                    _ => None,
                };
                if !supported && grid.is_inside(self.pos.x as i32, self.probe_y()) {
                    self.stage = BoulderStage::Wobbling { ticks_left: self.wobble_ticks };
                    return Some(BoulderEvent::StartedWobbling);
                }
                None
            }
            BoulderStage::Wobbling { ticks_left } => {
                self.stage = if ticks_left > 1 {
                    BoulderStage::Wobbling { ticks_left: ticks_left - 1 }
                } else {
                    BoulderStage::Falling { from_y: self.pos.y }
                };
                None
            }
            BoulderStage::Falling { from_y } => {
                self.pos.y += f64::from(FALL_SPEED);
                self.fall_check = (self.fall_check - FALL_SPEED).max(0);
                if !grid.is_outside(self.pos.x as i32, self.probe_y()) {
                    return None;
                }
                self.fall_check = FALL_CHECK;
                self.segment = graph.segment_at(self.pos);
                if self.pos.y - from_y >= self.break_height {
                    log::debug!("boulder shattered after {:.0} units", self.pos.y - from_y);
                    self.stage = BoulderStage::Broken;
                    return Some(BoulderEvent::Shattered);
                }
                self.stage = BoulderStage::Resting;
                Some(BoulderEvent::Landed { segment: self.segment })
            }
            BoulderStage::Broken => None,
        }
    }

    /// Props the boulder up on another one. A falling boulder lands where it is and a
    /// wobbling one settles back; either way it will not start wobbling next tick.
    pub fn rest_on_boulder(&mut self, graph: &TunnelGraph) -> Option<BoulderEvent> {
        self.on_boulder = true;
        match self.stage {
            BoulderStage::Resting | BoulderStage::Broken => None,
            BoulderStage::Wobbling { .. } => {
                self.stage = BoulderStage::Resting;
                None
            }
            BoulderStage::Falling { .. } => {
                self.stage = BoulderStage::Resting;
                self.fall_check = FALL_CHECK;
                self.segment = graph.segment_at(self.pos);
                Some(BoulderEvent::Landed { segment: self.segment })
            }
        }
    }

    /// Keeps the boulder from being pushed toward `toward`, where something it must not
    /// squash is touching it.
    pub fn block_push(&mut self, toward: Direction) {
        self.cant_push = Some((toward, PUSH_GUARD_TICKS));
    }

    /// Rolls the boulder sideways by [`PUSH_SPEED`] when the corridor beside it is clear on
    /// three rows. Returns the signed distance moved, zero when blocked.
    pub fn push(&mut self, dir: Direction, grid: &OccupancyGrid) -> f64 {
        let shift = match dir {
            Direction::Left => -PUSH_SPEED,
            Direction::Right => PUSH_SPEED,
            _ => return 0.0,
        };
        let blocked = matches!(self.cant_push, Some((toward, _)) if toward == dir);
        if blocked || self.is_falling() || self.stage == BoulderStage::Broken {
            return 0.0;
        }

        let x = self.pos.x as i32;
        let y = self.pos.y as i32;
        let probe_x = if dir == Direction::Left {
            x - BOULDER_RADIUS - 1
        } else {
            x + BOULDER_RADIUS + 1
        };
        let half = BOULDER_RADIUS / 2;
        if [y + half, y, y - half].into_iter().all(|probe_y| grid.is_inside(probe_x, probe_y)) {
            self.pos.x += shift;
            return shift;
        }
        0.0
    }

    fn probe_y(&self) -> i32 {
        self.pos.y as i32 + BOULDER_RADIUS + self.fall_check
    }
}

/// Scatters up to four boulders, one per quadrant, each jittered around its quadrant centre.
pub fn place_boulders(
    config: &PlayfieldConfig,
    count: usize,
    level: u32,
    rng: &mut ChaCha8Rng,
) -> Vec<Boulder> {
    let quarter = config.size / 4;
    let leeway = quarter / 2;
    let layout = &LAYOUTS[random_index(rng, LAYOUTS.len())];
    layout
        .iter()
        .take(count)
        .map(|&(qx, qy)| {
            let x = qx * quarter + random_index(rng, quarter as usize) as i32 - leeway;
            let y = qy * quarter + random_index(rng, quarter as usize) as i32 - leeway;
            Boulder::new(Point::new(f64::from(x), f64::from(y)), level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::types::Rect;

    fn field() -> (TunnelGraph, OccupancyGrid) {
        let config = PlayfieldConfig::default();
        (TunnelGraph::new(config.corridor_width), OccupancyGrid::new(&config))
    }

    #[test]
    fn resting_boulder_stays_on_solid_ground() {
        let (graph, grid) = field();
        let mut boulder = Boulder::new(Point::new(200.0, 200.0), 1);
        for _ in 0..10 {
            assert_eq!(boulder.advance(&graph, &grid), None);
        }
        assert!(boulder.is_resting());
    }

    #[test]
    fn digging_underneath_wobbles_then_drops_into_corridor() {
        let (mut graph, mut grid) = field();
        let corridor = graph.create_segment(100, 350);
        graph.grow_segment(corridor, 400, 350).unwrap();
        graph.complete_segment(corridor).unwrap();
        grid.carve_rect(Rect::new(75, 325, 425, 375));
        // shaft from just under the boulder down into the corridor
        grid.carve_rect(Rect::new(180, 234, 220, 325));
        let mut boulder = Boulder::new(Point::new(200.0, 200.0), 1);

        assert_eq!(boulder.advance(&graph, &grid), Some(BoulderEvent::StartedWobbling));
        for _ in 0..wobble_ticks(1) {
            assert_eq!(boulder.advance(&graph, &grid), None);
        }
        assert!(boulder.is_falling());

        let mut landed = None;
        for _ in 0..100 {
            if let Some(event) = boulder.advance(&graph, &grid) {
                landed = Some(event);
                break;
            }
        }
        assert_eq!(landed, Some(BoulderEvent::Landed { segment: Some(corridor) }));
        assert!(boulder.is_resting());
        assert_eq!(boulder.segment(&graph), Some(corridor));
        assert_eq!(boulder.pos().y, 348.0);
    }

    #[test]
    fn long_drop_shatters() {
        let (graph, mut grid) = field();
        grid.carve_rect(Rect::new(180, 100, 220, 649));
        let mut boulder = Boulder::new(Point::new(200.0, 70.0), 1);

        let events: Vec<_> = (0..200).filter_map(|_| boulder.advance(&graph, &grid)).collect();
        assert_eq!(events, vec![BoulderEvent::StartedWobbling, BoulderEvent::Shattered]);
        assert_eq!(boulder.stage(), BoulderStage::Broken);
    }

    #[test]
    fn push_needs_clear_corridor_beside() {
        let (_, mut grid) = field();
        grid.carve_rect(Rect::new(150, 170, 229, 230));
        let mut boulder = Boulder::new(Point::new(200.0, 200.0), 1);

        assert_eq!(boulder.push(Direction::Right, &grid), 0.0);
        assert_eq!(boulder.push(Direction::Up, &grid), 0.0);
        assert_eq!(boulder.push(Direction::Left, &grid), -PUSH_SPEED);
        assert_eq!(boulder.pos(), Point::new(199.5, 200.0));
    }

    #[test]
    fn touching_neighbour_blocks_push_toward_it() {
        let (graph, mut grid) = field();
        grid.carve_rect(Rect::new(100, 170, 300, 230));
        let mut boulder = Boulder::new(Point::new(200.0, 200.0), 1);

        boulder.block_push(Direction::Right);
        assert_eq!(boulder.push(Direction::Right, &grid), 0.0);
        assert_eq!(boulder.push(Direction::Left, &grid), -PUSH_SPEED);

        for _ in 0..3 {
            boulder.advance(&graph, &grid);
        }
        assert_eq!(boulder.push(Direction::Right, &grid), PUSH_SPEED);
    }

    #[test]
    fn boulder_underneath_stops_a_fall() {
        let (graph, mut grid) = field();
        grid.carve_rect(Rect::new(170, 100, 230, 400));
        let mut boulder = Boulder::new(Point::new(200.0, 120.0), 1);
        while !boulder.is_falling() {
            boulder.advance(&graph, &grid);
        }
        boulder.advance(&graph, &grid);

        assert_eq!(boulder.rest_on_boulder(&graph), Some(BoulderEvent::Landed { segment: None }));
        assert!(boulder.is_resting());
        let landed_at = boulder.pos();

        // still propped up, so the open shaft below does not start a wobble
        assert_eq!(boulder.advance(&graph, &grid), None);
        assert!(boulder.is_resting());
        assert_eq!(boulder.pos(), landed_at);
        // support gone: it wobbles again
        assert_eq!(boulder.advance(&graph, &grid), Some(BoulderEvent::StartedWobbling));
    }

    #[test]
    fn placement_keeps_one_boulder_per_quadrant() {
        let config = PlayfieldConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let boulders = place_boulders(&config, 4, 1, &mut rng);
        assert_eq!(boulders.len(), 4);

        let mut quadrants: Vec<(bool, bool)> = boulders
            .iter()
            .map(|b| (b.pos().x >= 325.0, b.pos().y >= 325.0))
            .collect();
        quadrants.sort();
        quadrants.dedup();
        assert_eq!(quadrants.len(), 4);
    }

    #[test]
    fn level_timings() {
        assert_eq!(wobble_ticks(1), 57);
        assert_eq!(wobble_ticks(10), 30);
        assert_eq!(break_height(2), 360.0);
        assert_eq!(break_height(20), 100.0);
    }
}
