//! Segment completion: folding re-dug corridors into the segment that already covers them,
//! and deriving junction links for segments that survive on their own.

use super::TunnelGraph;
use crate::types::{NavError, Rect, SegmentId, overlap_len};

impl TunnelGraph {
    /// Finishes digging `id`.
    ///
    /// Returns `Some(survivor)` when the segment merely continued an existing collinear
    /// corridor and was folded into it; the completed handle then resolves to the survivor.
    /// Returns `None` when the segment stands on its own and has been linked into the graph.
    pub fn complete_segment(&mut self, id: SegmentId) -> Result<Option<SegmentId>, NavError> {
        let id = self.require(id)?;
        let half_width = self.half_width;

        let Some(target) = self.find_collinear(id) else {
            self.segments[id].extend_rect(half_width);
            self.derive_links(id);
            return Ok(None);
        };

        let Some(absorbed) = self.remove_segment(id) else {
            return Err(NavError::UnknownSegment(id));
        };
        let orientation = absorbed.orientation();
        let span = [absorbed.start().along(orientation), absorbed.end().along(orientation)];

        let survivor = &mut self.segments[target];
        survivor.absorb_span(span);
        survivor.rect = survivor.rect.union(&absorbed.rect());
        survivor.extend_rect(half_width);

        self.redirects.insert(id, target);
        self.derive_links(target);
        log::debug!("segment {id:?} folded into {target:?}, {} live", self.order.len());
        Ok(Some(target))
    }

    /// A live segment that `id` is a continuation of: same orientation and centreline, with a
    /// strictly positive overlap along the shared axis.
    fn find_collinear(&self, id: SegmentId) -> Option<SegmentId> {
        let seg = &self.segments[id];
        let orientation = seg.orientation();
        let (lo, hi) = seg.rect().span(orientation);
        self.order.iter().copied().find(|&other| {
            if other == id {
                return false;
            }
            let Some(candidate) = self.segments.get(other) else {
                return false;
            };
            let (other_lo, other_hi) = candidate.rect().span(orientation);
            candidate.orientation() == orientation
                && candidate.centreline() == seg.centreline()
                && overlap_len(lo, hi, other_lo, other_hi) > 0
        })
    }

    fn derive_links(&mut self, id: SegmentId) {
        let seg = &self.segments[id];
        let rect = seg.rect();
        let candidates: Vec<SegmentId> = self
            .order
            .iter()
            .copied()
            .filter(|&other| other != id && !seg.is_linked_to(other))
            .filter(|&other| {
                self.segments
                    .get(other)
                    .is_some_and(|o| forms_junction(&rect, &o.rect(), self.corridor_width))
            })
            .collect();
        for other in candidates {
            self.connect(id, other);
        }
    }
}

/// Both axes must overlap, and one of them by at least a full corridor width; a thinner
/// corner touch would let agents cut diagonally through solid ground.
pub(super) fn forms_junction(a: &Rect, b: &Rect, corridor_width: i32) -> bool {
    let x_overlap = a.overlap_x(b);
    let y_overlap = a.overlap_y(b);
    x_overlap > 0 && y_overlap > 0 && (x_overlap >= corridor_width || y_overlap >= corridor_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Orientation;

    const WIDTH: i32 = 50;

    fn dig(graph: &mut TunnelGraph, from: (i32, i32), to: (i32, i32)) -> SegmentId {
        let id = graph.create_segment(from.0, from.1);
        graph.grow_segment(id, to.0, to.1).unwrap();
        id
    }

    #[test]
    fn lone_vertical_segment_completes_without_merge() {
        let mut graph = TunnelGraph::new(WIDTH);
        let first = dig(&mut graph, (100, 100), (100, 200));

        assert_eq!(graph.complete_segment(first).unwrap(), None);
        let seg = graph.get(first).unwrap();
        assert!(seg.is_vertical());
        assert_eq!(seg.rect(), Rect::new(75, 75, 125, 225));
        assert!(seg.links().is_empty());
    }

    #[test]
    fn overlapping_collinear_segment_merges_into_existing_one() {
        let mut graph = TunnelGraph::new(WIDTH);
        let first = dig(&mut graph, (100, 100), (100, 200));
        graph.complete_segment(first).unwrap();
        let second = dig(&mut graph, (100, 150), (100, 250));

        assert_eq!(graph.complete_segment(second).unwrap(), Some(first));
        assert_eq!(graph.len(), 1);
        assert!(!graph.is_live(second));
        assert_eq!(graph.resolve(second), Some(first));

        let seg = graph.get(first).unwrap();
        assert_eq!((seg.start().y, seg.end().y), (100, 250));
        assert_eq!(seg.rect(), Rect::new(75, 75, 125, 275));
    }

    #[test]
    fn merged_rectangle_is_union_of_both() {
        let mut graph = TunnelGraph::new(WIDTH);
        let first = dig(&mut graph, (100, 300), (300, 300));
        graph.complete_segment(first).unwrap();
        let before = graph.get(first).unwrap().rect();
        let second = dig(&mut graph, (50, 300), (120, 300));
        let other = graph.get(second).unwrap().rect();

        graph.complete_segment(second).unwrap();
        assert_eq!(graph.get(first).unwrap().rect(), before.union(&other));
    }

    #[test]
    fn different_centreline_does_not_merge() {
        let mut graph = TunnelGraph::new(WIDTH);
        let first = dig(&mut graph, (100, 100), (100, 200));
        graph.complete_segment(first).unwrap();
        let second = dig(&mut graph, (101, 150), (101, 250));

        assert_eq!(graph.complete_segment(second).unwrap(), None);
        assert_eq!(graph.len(), 2);
        assert!(graph.get(first).unwrap().is_linked_to(second));
    }

    #[test]
    fn touching_end_to_end_does_not_merge() {
        let mut graph = TunnelGraph::new(WIDTH);
        let first = dig(&mut graph, (100, 100), (100, 200));
        graph.complete_segment(first).unwrap();
        // rect of first ends at 225, second starts at 225 + 50 = 275 -> rect from 250
        let second = dig(&mut graph, (100, 275), (100, 400));
        assert_eq!(graph.complete_segment(second).unwrap(), None);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn crossing_corridors_are_linked() {
        let mut graph = TunnelGraph::new(WIDTH);
        let vertical = dig(&mut graph, (50, 0), (50, 100));
        graph.complete_segment(vertical).unwrap();
        let horizontal = dig(&mut graph, (40, 50), (200, 50));
        graph.complete_segment(horizontal).unwrap();

        // x overlap: [25,75] vs [15,225] = 50; y overlap: [-25,125] vs [25,75] = 50
        assert!(graph.get(vertical).unwrap().is_linked_to(horizontal));
        assert!(graph.get(horizontal).unwrap().is_linked_to(vertical));
    }

    #[test]
    fn diagonal_corner_touch_is_not_linked() {
        let mut graph = TunnelGraph::new(WIDTH);
        let vertical = dig(&mut graph, (50, 0), (50, 100));
        graph.complete_segment(vertical).unwrap();
        let horizontal = dig(&mut graph, (70, 140), (200, 140));
        graph.complete_segment(horizontal).unwrap();

        // x overlap: [25,75] vs [45,225] = 30; y overlap: [-25,125] vs [115,165] = 10
        assert!(graph.links(vertical).is_empty());
        assert!(graph.links(horizontal).is_empty());
    }

    #[test]
    fn junction_needs_one_full_width_overlap() {
        let a = Rect::new(0, 0, 100, 100);
        assert!(forms_junction(&a, &Rect::new(50, 90, 200, 300), WIDTH));
        assert!(!forms_junction(&a, &Rect::new(60, 60, 200, 300), WIDTH));
        assert!(!forms_junction(&a, &Rect::new(100, 0, 200, 100), WIDTH));
    }

    #[test]
    fn merge_drops_links_to_absorbed_segment_and_relinks_survivor() {
        let mut graph = TunnelGraph::new(WIDTH);
        let trunk = dig(&mut graph, (100, 300), (400, 300));
        graph.complete_segment(trunk).unwrap();
        let branch = dig(&mut graph, (400, 300), (400, 500));
        graph.link(branch, trunk).unwrap();
        graph.complete_segment(branch).unwrap();

        let redo = dig(&mut graph, (400, 500), (400, 450));
        graph.link(redo, branch).unwrap();
        let survivor = graph.complete_segment(redo).unwrap();

        assert_eq!(survivor, Some(branch));
        assert!(graph.link_violations().is_empty());
        assert!(graph.links(branch).contains(&trunk));
        assert!(!graph.links(branch).iter().any(|&l| l == redo));
    }

    #[test]
    fn chained_redirects_resolve_to_final_survivor() {
        let mut graph = TunnelGraph::new(WIDTH);
        let base = dig(&mut graph, (300, 100), (300, 200));
        graph.complete_segment(base).unwrap();
        let second = dig(&mut graph, (300, 180), (300, 260));
        graph.complete_segment(second).unwrap();
        let third = dig(&mut graph, (300, 250), (300, 330));
        graph.complete_segment(third).unwrap();

        assert_eq!(graph.resolve(second), Some(base));
        assert_eq!(graph.resolve(third), Some(base));
        let seg = graph.get(base).unwrap();
        assert_eq!(seg.orientation(), Orientation::Vertical);
        assert_eq!((seg.start().y, seg.end().y), (100, 330));
    }
}
