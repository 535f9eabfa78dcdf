//! A single dug corridor: two endpoints, an orientation and the rectangle it has swept.

use crate::types::{Orientation, Point, Pos, Rect, SegmentId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TunnelSegment {
    pub(super) start: Pos,
    pub(super) end: Pos,
    pub(super) orientation: Orientation,
    pub(super) orientation_locked: bool,
    pub(super) rect: Rect,
    pub(super) links: Vec<SegmentId>,
}

impl TunnelSegment {
    pub(super) fn new(start: Pos, half_width: i32) -> Self {
        Self {
            start,
            end: start,
            orientation: Orientation::Vertical,
            orientation_locked: false,
            rect: Rect::around(start, half_width),
            links: Vec::new(),
        }
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn end(&self) -> Pos {
        self.end
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn links(&self) -> &[SegmentId] {
        &self.links
    }

    pub fn is_linked_to(&self, other: SegmentId) -> bool {
        self.links.contains(&other)
    }

    /// The fixed perpendicular coordinate agents centre on: x for vertical, y for horizontal.
    pub fn centreline(&self) -> i32 {
        match self.orientation {
            Orientation::Vertical => self.start.x,
            Orientation::Horizontal => self.start.y,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect.contains(point)
    }

    /// Distance from `point` to the centreline, measured across the corridor.
    pub fn offset_from_centreline(&self, point: Point) -> f64 {
        let centre = f64::from(self.centreline());
        match self.orientation {
            Orientation::Vertical => (point.x - centre).abs(),
            Orientation::Horizontal => (point.y - centre).abs(),
        }
    }

    pub(super) fn grow(&mut self, end: Pos, half_width: i32) {
        self.end = end;
        if !self.orientation_locked && self.start != self.end {
            self.orientation = if self.start.x == self.end.x {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            self.orientation_locked = true;
        }
        self.extend_rect(half_width);
    }

    /// Widens the rectangle along the segment's axis to cover both endpoints plus padding.
    /// Never shrinks: links derived against an earlier rectangle stay valid.
    pub(super) fn extend_rect(&mut self, half_width: i32) {
        let orientation = self.orientation;
        let a = self.start.along(orientation);
        let b = self.end.along(orientation);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        match orientation {
            Orientation::Vertical => {
                self.rect.min_y = self.rect.min_y.min(low - half_width);
                self.rect.max_y = self.rect.max_y.max(high + half_width);
            }
            Orientation::Horizontal => {
                self.rect.min_x = self.rect.min_x.min(low - half_width);
                self.rect.max_x = self.rect.max_x.max(high + half_width);
            }
        }
    }

    /// Pushes this segment's endpoints outward to cover `values` along its axis.
    ///
    /// Whichever endpoint started out lower keeps that role: low values only ever move the
    /// low endpoint and high values the high one, so the ordering survives chained merges.
    pub(super) fn absorb_span(&mut self, values: [i32; 2]) {
        let orientation = self.orientation;
        let mut first = self.start.along(orientation);
        let mut second = self.end.along(orientation);
        for value in values {
            if first < second {
                if value < first {
                    first = value;
                } else if value > second {
                    second = value;
                }
            } else if value < second {
                second = value;
            } else if value > first {
                first = value;
            }
        }
        self.start.set_along(orientation, first);
        self.end.set_along(orientation, second);
    }
}
