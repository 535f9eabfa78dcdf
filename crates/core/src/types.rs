use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct SegmentId;
    pub struct AgentId;
    pub struct BodyId;
}

/// Integral playfield coordinate used for segment endpoints and grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    /// Coordinate along the axis a segment of the given orientation runs on.
    pub fn along(self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Vertical => self.y,
            Orientation::Horizontal => self.x,
        }
    }

    pub(crate) fn set_along(&mut self, orientation: Orientation, value: i32) {
        match orientation {
            Orientation::Vertical => self.y = value,
            Orientation::Horizontal => self.x = value,
        }
    }
}

/// Continuous position of a moving body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Cell the point falls in, truncating toward zero like the grid probes do.
    pub fn cell(self) -> Pos {
        Pos { y: self.y as i32, x: self.x as i32 }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<Pos> for Point {
    fn from(pos: Pos) -> Self {
        Self { x: f64::from(pos.x), y: f64::from(pos.y) }
    }
}

/// Inclusive axis-aligned rectangle in playfield cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Square of side `2 * half` centred on `pos`.
    pub fn around(pos: Pos, half: i32) -> Self {
        Self { min_x: pos.x - half, min_y: pos.y - half, max_x: pos.x + half, max_y: pos.y + half }
    }

    pub fn overlap_x(&self, other: &Rect) -> i32 {
        overlap_len(self.min_x, self.max_x, other.min_x, other.max_x)
    }

    pub fn overlap_y(&self, other: &Rect) -> i32 {
        overlap_len(self.min_y, self.max_y, other.min_y, other.max_y)
    }

    /// Span of the rectangle along the axis a segment of `orientation` runs on.
    pub fn span(&self, orientation: Orientation) -> (i32, i32) {
        match orientation {
            Orientation::Vertical => (self.min_y, self.max_y),
            Orientation::Horizontal => (self.min_x, self.max_x),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= f64::from(self.min_x)
            && point.x <= f64::from(self.max_x)
            && point.y >= f64::from(self.min_y)
            && point.y <= f64::from(self.max_y)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn encloses(&self, other: &Rect) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }
}

/// Length of the overlap of `[lo_a, hi_a]` and `[lo_b, hi_b]`; touching spans overlap by 0.
pub fn overlap_len(lo_a: i32, hi_a: i32, lo_b: i32, hi_b: i32) -> i32 {
    debug_assert!(lo_a <= hi_a && lo_b <= hi_b);
    (hi_a.min(hi_b) - lo_a.max(lo_b)).max(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Stop,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const MOVING: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step for the direction; screen y grows downward.
    pub fn delta(self) -> (f64, f64) {
        match self {
            Direction::Stop => (0.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    pub fn is_moving(self) -> bool {
        self != Direction::Stop
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavError {
    /// The handle was never issued by this graph, or was cleared by a level reset.
    UnknownSegment(SegmentId),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::UnknownSegment(id) => write!(f, "segment {id:?} is not part of the graph"),
        }
    }
}

impl Error for NavError {}
