//! Per-agent walking of the tunnel network, one segment at a time.
//! An agent heads for `next` until it sits on that segment's centreline, then snaps onto it
//! and adopts it as `current`, so turns only ever happen from a centred position.

use rand_chacha::ChaCha8Rng;

use crate::random::random_index;
use crate::tunnels::{TunnelGraph, TunnelSegment};
use crate::types::{Direction, Orientation, Point, SegmentId};

/// Outcome of a single direction resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No target segment (stuck or between decisions).
    NoTarget,
    Approaching(Direction),
    /// The target was reached and is now the current segment.
    Arrived(SegmentId),
}

impl Resolution {
    pub fn direction(self) -> Direction {
        match self {
            Resolution::Approaching(dir) => dir,
            Resolution::NoTarget | Resolution::Arrived(_) => Direction::Stop,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavState {
    pub current: Option<SegmentId>,
    pub previous: Option<SegmentId>,
    pub next: Option<SegmentId>,
    pub dir: Direction,
}

impl NavState {
    pub fn starting_in(segment: SegmentId) -> Self {
        Self { current: Some(segment), ..Self::default() }
    }

    /// Re-points handles left stale by merges elsewhere in the graph.
    ///
    /// A stale current segment adopts its survivor and drops `next`, since the planned hop
    /// may no longer make sense; a stale `next` is dropped; a stale previous adopts its
    /// survivor.
    pub fn refresh(&mut self, graph: &TunnelGraph) {
        if let Some(previous) = self.previous
            && !graph.is_live(previous)
        {
            self.previous = graph.resolve(previous);
        }
        if let Some(current) = self.current
            && !graph.is_live(current)
        {
            self.current = graph.resolve(current);
            self.next = None;
        }
        if let Some(next) = self.next
            && !graph.is_live(next)
        {
            self.next = None;
        }
    }

    /// Picks the direction toward `next`, completing the hop when the agent is centred on it.
    pub fn resolve_direction(
        &mut self,
        graph: &TunnelGraph,
        pos: &mut Point,
        speed: f64,
    ) -> Resolution {
        let Some(target) = self.next.and_then(|next| graph.get(next)) else {
            self.next = None;
            self.dir = Direction::Stop;
            return Resolution::NoTarget;
        };
        let from = self.current.and_then(|current| graph.get(current)).map(|seg| seg.orientation());

        let dir = direction_to_segment(from, target, *pos, speed, graph.half_width());
        self.dir = dir;
        if dir.is_moving() {
            return Resolution::Approaching(dir);
        }

        let centre = f64::from(target.centreline());
        match target.orientation() {
            Orientation::Vertical => pos.x = centre,
            Orientation::Horizontal => pos.y = centre,
        }
        let arrived = self.next.and_then(|next| graph.resolve(next));
        self.previous = self.current;
        self.current = arrived;
        self.next = None;
        match arrived {
            Some(id) => Resolution::Arrived(id),
            None => Resolution::NoTarget,
        }
    }

    /// Aims `next` at a uniformly random link of the current segment, avoiding the one just
    /// left unless nothing else exists. A segment without links targets itself.
    pub fn pick_random_link(&mut self, graph: &TunnelGraph, rng: &mut ChaCha8Rng) {
        let Some(current) = self.current.and_then(|current| graph.resolve(current)) else {
            self.next = None;
            return;
        };
        let links = graph.links(current);
        self.next = match links {
            [] => Some(current),
            [only] => Some(*only),
            _ => {
                let onward: Vec<SegmentId> =
                    links.iter().copied().filter(|&link| Some(link) != self.previous).collect();
                let choices = if onward.is_empty() { links } else { &onward[..] };
                Some(choices[random_index(rng, choices.len())])
            }
        };
    }

    /// Aims `next` at a link that extends past the current segment toward `goal` along the
    /// dominant axis, falling back to a random link when none does.
    pub fn pick_link_toward(
        &mut self,
        graph: &TunnelGraph,
        pos: Point,
        goal: Point,
        rng: &mut ChaCha8Rng,
    ) {
        let dx = goal.x - pos.x;
        let dy = goal.y - pos.y;
        let vertical = dy.abs() > dx.abs();

        if let Some(current) = self.current.and_then(|current| graph.get(current)) {
            let here = current.rect();
            for &link in current.links() {
                if Some(link) == self.previous {
                    continue;
                }
                let Some(candidate) = graph.get(link) else {
                    continue;
                };
                let there = candidate.rect();
                let heads_there = if vertical {
                    candidate.is_vertical()
                        && ((dy < 0.0 && there.min_y < here.min_y)
                            || (dy > 0.0 && there.max_y > here.max_y))
                } else {
                    !candidate.is_vertical()
                        && ((dx < 0.0 && there.min_x < here.min_x)
                            || (dx > 0.0 && there.max_x > here.max_x))
                };
                if heads_there {
                    self.next = Some(link);
                    return;
                }
            }
        }
        log::trace!("no link heads toward ({:.0}, {:.0}), wandering", goal.x, goal.y);
        self.pick_random_link(graph, rng);
    }

    /// Moves along the current segment toward `goal`, for when both share a segment.
    pub fn head_toward(&mut self, graph: &TunnelGraph, pos: Point, goal: Point) -> Direction {
        let Some(current) = self.current.and_then(|current| graph.get(current)) else {
            self.dir = Direction::Stop;
            return self.dir;
        };
        self.dir = if current.is_vertical() {
            if pos.y < goal.y { Direction::Down } else { Direction::Up }
        } else if pos.x < goal.x {
            Direction::Right
        } else {
            Direction::Left
        };
        self.dir
    }
}

/// Direction from a segment of orientation `from` toward `to`; `Stop` means arrived.
///
/// With no current segment the agent is treated as approaching across `to`, which only needs
/// the centreline alignment.
pub fn direction_to_segment(
    from: Option<Orientation>,
    to: &TunnelSegment,
    pos: Point,
    speed: f64,
    half_width: i32,
) -> Direction {
    let rect = to.rect();
    let half = f64::from(half_width);
    let centre = f64::from(to.centreline());
    let from = from.unwrap_or(match to.orientation() {
        Orientation::Vertical => Orientation::Horizontal,
        Orientation::Horizontal => Orientation::Vertical,
    });

    match (from, to.orientation()) {
        (Orientation::Vertical, Orientation::Vertical) => {
            if pos.y < f64::from(rect.min_y) + half {
                return Direction::Down;
            }
            if pos.y > f64::from(rect.max_y) - half {
                return Direction::Up;
            }
            toward_x(pos.x, centre, speed)
        }
        (Orientation::Horizontal, Orientation::Horizontal) => {
            if pos.x < f64::from(rect.min_x) + half {
                return Direction::Right;
            }
            if pos.x > f64::from(rect.max_x) - half {
                return Direction::Left;
            }
            toward_y(pos.y, centre, speed)
        }
        (Orientation::Vertical, Orientation::Horizontal) => toward_y(pos.y, centre, speed),
        (Orientation::Horizontal, Orientation::Vertical) => toward_x(pos.x, centre, speed),
    }
}

fn toward_x(x: f64, centre: f64, speed: f64) -> Direction {
    if (x - centre).abs() < speed {
        Direction::Stop
    } else if x < centre {
        Direction::Right
    } else {
        Direction::Left
    }
}

fn toward_y(y: f64, centre: f64, speed: f64) -> Direction {
    if (y - centre).abs() < speed {
        Direction::Stop
    } else if y < centre {
        Direction::Down
    } else {
        Direction::Up
    }
}
