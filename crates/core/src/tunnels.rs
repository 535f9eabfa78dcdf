//! Live tunnel network: segment arena, growth, and handle resolution.
//! Completion (merge and link derivation) lives in `merge`, path search in `path`, and the
//! per-level starting layout in `layout`.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::types::{NavError, Point, Pos, SegmentId};

mod layout;
mod merge;
mod path;
mod segment;

pub use layout::{StartingTunnels, reset_level};
pub use path::{PathStep, find_path};
pub use segment::TunnelSegment;

#[derive(Clone, Debug)]
pub struct TunnelGraph {
    half_width: i32,
    corridor_width: i32,
    segments: SlotMap<SegmentId, TunnelSegment>,
    /// Creation order of live segments; the first entry is the home segment.
    order: Vec<SegmentId>,
    /// Merged-away segment -> segment that absorbed it.
    redirects: BTreeMap<SegmentId, SegmentId>,
}

impl TunnelGraph {
    pub fn new(corridor_width: i32) -> Self {
        Self {
            half_width: corridor_width / 2,
            corridor_width,
            segments: SlotMap::with_key(),
            order: Vec::new(),
            redirects: BTreeMap::new(),
        }
    }

    pub fn corridor_width(&self) -> i32 {
        self.corridor_width
    }

    pub fn half_width(&self) -> i32 {
        self.half_width
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The oldest live segment. Enemies appear here.
    pub fn home(&self) -> Option<SegmentId> {
        self.order.first().copied()
    }

    /// Drops every segment and every redirect. Handles issued before this never resolve again.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.order.clear();
        self.redirects.clear();
    }

    /// Opens a degenerate segment at `(x, y)`; its direction is decided by the first growth.
    pub fn create_segment(&mut self, x: i32, y: i32) -> SegmentId {
        let id = self.segments.insert(TunnelSegment::new(Pos { y, x }, self.half_width));
        self.order.push(id);
        id
    }

    /// Moves the free end of a segment that is still being dug.
    pub fn grow_segment(&mut self, id: SegmentId, x: i32, y: i32) -> Result<(), NavError> {
        let id = self.require(id)?;
        let half_width = self.half_width;
        self.segments[id].grow(Pos { y, x }, half_width);
        Ok(())
    }

    /// Links two segments both ways. Linking a segment to itself is a no-op.
    pub fn link(&mut self, a: SegmentId, b: SegmentId) -> Result<(), NavError> {
        let a = self.require(a)?;
        let b = self.require(b)?;
        self.connect(a, b);
        Ok(())
    }

    /// Follows merge redirects until a live segment is reached.
    pub fn resolve(&self, id: SegmentId) -> Option<SegmentId> {
        let mut current = id;
        for _ in 0..=self.redirects.len() {
            if self.segments.contains_key(current) {
                return Some(current);
            }
            current = *self.redirects.get(&current)?;
        }
        None
    }

    pub fn is_live(&self, id: SegmentId) -> bool {
        self.segments.contains_key(id)
    }

    pub fn get(&self, id: SegmentId) -> Option<&TunnelSegment> {
        self.resolve(id).and_then(|live| self.segments.get(live))
    }

    pub fn links(&self, id: SegmentId) -> &[SegmentId] {
        self.get(id).map(TunnelSegment::links).unwrap_or(&[])
    }

    /// Live segments in creation order, for drawing and diagnostics.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &TunnelSegment)> + '_ {
        self.order.iter().filter_map(|&id| self.segments.get(id).map(|seg| (id, seg)))
    }

    /// The segment whose centreline is nearest among those whose rectangle holds `point`.
    pub fn segment_at(&self, point: Point) -> Option<SegmentId> {
        let mut best: Option<(SegmentId, f64)> = None;
        for (id, seg) in self.segments() {
            if !seg.contains(point) {
                continue;
            }
            let offset = seg.offset_from_centreline(point);
            if best.is_none_or(|(_, best_offset)| offset < best_offset) {
                best = Some((id, offset));
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn find_path(&self, max_depth: u32, from: SegmentId, to: SegmentId) -> Option<PathStep> {
        find_path(self, max_depth, from, to)
    }

    /// Pairs that break link symmetry, link to themselves, or point at dead segments.
    pub fn link_violations(&self) -> Vec<(SegmentId, SegmentId)> {
        let mut violations = Vec::new();
        for (id, seg) in self.segments() {
            for &other in seg.links() {
                let symmetric = self.segments.get(other).is_some_and(|o| o.is_linked_to(id));
                if other == id || !symmetric {
                    violations.push((id, other));
                }
            }
        }
        violations
    }

    fn require(&self, id: SegmentId) -> Result<SegmentId, NavError> {
        self.resolve(id).ok_or(NavError::UnknownSegment(id))
    }

    fn connect(&mut self, a: SegmentId, b: SegmentId) {
        if a == b {
            return;
        }
        if !self.segments[a].is_linked_to(b) {
            self.segments[a].links.push(b);
        }
        if !self.segments[b].is_linked_to(a) {
            self.segments[b].links.push(a);
        }
    }

    fn remove_segment(&mut self, id: SegmentId) -> Option<TunnelSegment> {
        let removed = self.segments.remove(id)?;
        for &other in &removed.links {
            if let Some(seg) = self.segments.get_mut(other) {
                seg.links.retain(|&link| link != id);
            }
        }
        self.order.retain(|&live| live != id);
        Some(removed)
    }
}
