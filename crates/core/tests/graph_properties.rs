use std::collections::{BTreeMap, VecDeque};

use burrow_core::{OccupancyGrid, PlayfieldConfig, Rect, SegmentId, TunnelGraph};
use proptest::prelude::*;

const WIDTH: i32 = 50;

fn dig(graph: &mut TunnelGraph, from: (i32, i32), to: (i32, i32)) -> SegmentId {
    let id = graph.create_segment(from.0, from.1);
    graph.grow_segment(id, to.0, to.1).expect("fresh segment should grow");
    id
}

fn live_rects(graph: &TunnelGraph) -> BTreeMap<SegmentId, Rect> {
    graph.segments().map(|(id, seg)| (id, seg.rect())).collect()
}

/// Link distance from `from` to `to` by breadth-first search, without a depth cap.
fn link_distance(graph: &TunnelGraph, from: SegmentId, to: SegmentId) -> Option<u32> {
    let mut seen = BTreeMap::from([(from, 0u32)]);
    let mut queue = VecDeque::from([from]);
    while let Some(at) = queue.pop_front() {
        let hops = seen[&at];
        if at == to {
            return Some(hops);
        }
        for &link in graph.links(at) {
            if !seen.contains_key(&link) {
                seen.insert(link, hops + 1);
                queue.push_back(link);
            }
        }
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Re-digging along one column in any order never shrinks a live rectangle, and a
    /// survivor always covers what it absorbed without flipping its endpoint order.
    #[test]
    fn merged_rects_only_grow(spans in prop::collection::vec((60i32..600, 1i32..150, any::<bool>()), 1..16)) {
        let mut graph = TunnelGraph::new(WIDTH);
        let mut ordering: BTreeMap<SegmentId, bool> = BTreeMap::new();

        for (lo, len, downward) in spans {
            let (from, to) = if downward { (lo, lo + len) } else { (lo + len, lo) };
            let before = live_rects(&graph);
            let seg = dig(&mut graph, (300, from), (300, to));
            let absorbed = graph.get(seg).unwrap().rect();

            if let Some(survivor) = graph.complete_segment(seg).unwrap() {
                prop_assert!(graph.get(survivor).unwrap().rect().encloses(&absorbed));
                prop_assert_eq!(graph.resolve(seg), Some(survivor));
            }
            for (id, rect) in before {
                if graph.is_live(id) {
                    let now = graph.get(id).unwrap().rect();
                    prop_assert!(now.encloses(&rect), "{:?} shrank", id);
                }
            }
            for (id, seg) in graph.segments() {
                let rising = seg.start().y <= seg.end().y;
                let first = *ordering.entry(id).or_insert(rising);
                prop_assert_eq!(first, rising, "{:?} flipped its endpoints", id);
            }
        }
        prop_assert!(graph.link_violations().is_empty());
    }

    /// Random digging leaves links symmetric, and every link is a real junction.
    #[test]
    fn links_stay_symmetric_and_walkable(digs in prop::collection::vec((1i32..12, 1i32..12, any::<bool>(), 1i32..6), 1..20)) {
        let mut graph = TunnelGraph::new(WIDTH);
        for (cx, cy, vertical, len) in digs {
            let from = (cx * 50, cy * 50);
            let to = if vertical { (from.0, from.1 + len * 50) } else { (from.0 + len * 50, from.1) };
            let seg = dig(&mut graph, from, to);
            graph.complete_segment(seg).unwrap();
        }

        prop_assert!(graph.link_violations().is_empty());
        for (id, seg) in graph.segments() {
            for &other in seg.links() {
                let a = seg.rect();
                let b = graph.get(other).unwrap().rect();
                let (x, y) = (a.overlap_x(&b), a.overlap_y(&b));
                prop_assert!(x > 0 && y > 0 && (x >= WIDTH || y >= WIDTH),
                    "{:?} -> {:?} overlaps only {}x{}", id, other, x, y);
            }
        }
    }

    /// Search terminates on cyclic graphs and never undercuts the true link distance.
    #[test]
    fn path_search_never_beats_true_distance(
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..20),
        depth in 0u32..8,
    ) {
        let mut graph = TunnelGraph::new(WIDTH);
        let ids: Vec<SegmentId> = (0..8).map(|i| graph.create_segment(i * 100, 100)).collect();
        for (a, b) in edges {
            graph.link(ids[a], ids[b]).unwrap();
        }

        for &to in &ids {
            let found = graph.find_path(depth, ids[0], to);
            let truth = link_distance(&graph, ids[0], to);
            match (found, truth) {
                (Some(step), Some(distance)) => {
                    prop_assert!(step.hops >= distance);
                    prop_assert!(step.hops <= depth);
                    if step.hops > 0 {
                        prop_assert!(graph.links(ids[0]).contains(&step.next));
                    }
                }
                (Some(_), None) => prop_assert!(false, "found a path where none exists"),
                (None, Some(distance)) => prop_assert!(distance > depth),
                (None, None) => {}
            }
        }
    }

    /// A cell reported dug stays dug until the grid is reset.
    #[test]
    fn carving_is_monotonic(rects in prop::collection::vec((0i32..700, 0i32..700, 0i32..120, 0i32..120), 1..12)) {
        let mut grid = OccupancyGrid::new(&PlayfieldConfig::default());
        let mut dug: Vec<(i32, i32)> = Vec::new();
        let mut count = 0;

        for (x, y, w, h) in rects {
            grid.carve_rect(Rect::new(x, y, x + w, y + h));
            for &(px, py) in &dug {
                prop_assert!(grid.is_inside(px, py));
            }
            for probe in [(x, y), (x + w, y + h), (x + w / 2, y + h / 2)] {
                if grid.is_inside(probe.0, probe.1) {
                    dug.push(probe);
                }
            }
            prop_assert!(grid.dug_cell_count() >= count);
            count = grid.dug_cell_count();
        }

        grid.reset();
        prop_assert_eq!(grid.dug_cell_count(), 0);
        for (px, py) in dug {
            prop_assert!(grid.is_outside(px, py));
        }
    }
}
