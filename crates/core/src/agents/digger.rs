//! The player-side digger: moves through solid ground, carving corridors and feeding the
//! tunnel graph one segment per straight run.

use std::mem;

use super::powers::{PowerUp, PowerUps};
use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::tunnels::TunnelGraph;
use crate::types::{Direction, NavError, Point, Rect, SegmentId};

#[derive(Clone, Debug, PartialEq)]
pub struct Digger {
    pos: Point,
    prev_pos: Point,
    dir: Direction,
    /// Last moving direction; a stop does not reset it, so resuming the same way keeps digging
    /// the same segment.
    heading: Direction,
    facing: Direction,
    speed: f64,
    segment: SegmentId,
    previous: Option<SegmentId>,
    /// Set when the last move ran into the field edge or an immovable boulder.
    blocked: bool,
    level: u32,
    powers: PowerUps,
}

pub fn digger_speed(level: u32) -> f64 {
    if level < 20 { 1.3 + 0.15 * f64::from(level) } else { 4.3 }
}

impl Digger {
    /// Places the digger at the spawn point with a fresh segment. When a network already
    /// exists the fresh segment is linked to the home segment so enemies can follow it.
    pub fn spawn(
        graph: &mut TunnelGraph,
        config: &PlayfieldConfig,
        level: u32,
    ) -> Result<Self, NavError> {
        let spawn = config.spawn();
        let home = graph.home();
        let segment = graph.create_segment(spawn.x, spawn.y);
        let previous = match home {
            Some(home) => {
                graph.link(segment, home)?;
                Some(home)
            }
            None => None,
        };
        let pos = Point::from(spawn);
        Ok(Self {
            pos,
            prev_pos: pos,
            dir: Direction::Stop,
            heading: Direction::Stop,
            facing: Direction::Right,
            speed: digger_speed(level),
            segment,
            previous,
            blocked: false,
            level,
            powers: PowerUps::default(),
        })
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn dir(&self) -> Direction {
        self.dir
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Segment currently being dug.
    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    /// Segment dug before the current one, if any.
    pub fn previous(&self) -> Option<SegmentId> {
        self.previous
    }

    pub fn powers(&self) -> PowerUps {
        self.powers
    }

    pub fn grant(&mut self, power: PowerUp) {
        self.powers.grant(power, self.level);
    }

    /// Reports and clears the flag raised when the last move was stopped short.
    pub fn take_blocked(&mut self) -> bool {
        mem::take(&mut self.blocked)
    }

    /// Undoes this tick's move into a resting boulder. Sideways the digger keeps whatever
    /// ground the boulder gave way (`pushed`, signed); vertically it stops dead.
    pub fn bump(&mut self, pushed: f64) {
        match self.dir {
            Direction::Left | Direction::Right => self.pos.x = self.prev_pos.x + pushed,
            _ => {
                self.pos.y = self.prev_pos.y;
                self.dir = Direction::Stop;
            }
        }
        if pushed == 0.0 {
            self.blocked = true;
        }
    }

    /// Starts moving in `dir`. Turning from one moving direction to another completes the
    /// current segment and opens a new one at the turn, linked to the one just finished.
    pub fn steer(&mut self, graph: &mut TunnelGraph, dir: Direction) -> Result<(), NavError> {
        if !dir.is_moving() {
            self.halt();
            return Ok(());
        }
        self.dir = dir;
        self.facing = dir;
        if dir == self.heading {
            return Ok(());
        }
        if self.heading.is_moving() {
            let finished = self.finish(graph)?;
            let turn = self.pos.cell();
            self.segment = graph.create_segment(turn.x, turn.y);
            graph.link(self.segment, finished)?;
        }
        self.heading = dir;
        Ok(())
    }

    /// Stops without completing the segment; resuming the same direction keeps extending it.
    pub fn halt(&mut self) {
        self.dir = Direction::Stop;
    }

    /// Completes the current segment and returns the live segment that now covers it.
    pub fn finish(&mut self, graph: &mut TunnelGraph) -> Result<SegmentId, NavError> {
        let finished = graph.complete_segment(self.segment)?.unwrap_or(self.segment);
        self.segment = finished;
        self.previous = Some(finished);
        Ok(finished)
    }

    /// Moves one tick, clamped to the playfield, growing the segment and carving the strip
    /// swept this tick.
    pub fn advance(
        &mut self,
        graph: &mut TunnelGraph,
        grid: &mut OccupancyGrid,
        config: &PlayfieldConfig,
    ) -> Result<(), NavError> {
        self.prev_pos = self.pos;
        self.powers.tick();
        if !self.dir.is_moving() {
            return Ok(());
        }
        let (dx, dy) = self.dir.delta();
        self.pos.x += dx * self.speed;
        self.pos.y += dy * self.speed;
        self.clamp_to_field(config);

        let cell = self.pos.cell();
        graph.grow_segment(self.segment, cell.x, cell.y)?;
        if let Some(strip) = self.swept_strip(config.half_width()) {
            grid.carve_rect(strip);
        }
        Ok(())
    }

    fn clamp_to_field(&mut self, config: &PlayfieldConfig) {
        let half = f64::from(config.half_width());
        let size = f64::from(config.size);
        let top = f64::from(config.play_area_top) + half;

        if self.pos.x > size - half {
            self.pos.x = size - half;
            self.stop_at_edge();
        } else if self.pos.x < half {
            self.pos.x = half;
            self.stop_at_edge();
        }
        if self.pos.y < top {
            self.pos.y = top;
            self.stop_at_edge();
        } else if self.pos.y > size - half {
            self.pos.y = size - half;
            self.stop_at_edge();
        }
    }

    fn stop_at_edge(&mut self) {
        self.dir = Direction::Stop;
        self.blocked = true;
    }

    fn swept_strip(&self, half: i32) -> Option<Rect> {
        let now = self.pos.cell();
        let before = self.prev_pos.cell();
        let strip = match self.dir {
            Direction::Stop => return None,
            Direction::Left => Rect::new(now.x - half, now.y - half, before.x - half, now.y + half),
            Direction::Right => {
                Rect::new(before.x + half, now.y - half, now.x + half, now.y + half)
            }
            Direction::Up => Rect::new(now.x - half, now.y - half, now.x + half, before.y - half),
            Direction::Down => {
                Rect::new(now.x - half, before.y + half, now.x + half, now.y + half)
            }
        };
        Some(strip)
    }
}
