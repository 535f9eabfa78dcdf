//! Depth-capped next-hop search over segment links.
//! The cap keeps per-tick cost bounded as the network grows; callers treat a miss as a cue to
//! wander rather than as an error.

use std::collections::BTreeSet;

use super::TunnelGraph;
use crate::types::SegmentId;

/// First hop of the shortest route found, counted in links rather than distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub hops: u32,
    /// The link of the starting segment to take, or the destination itself when already there.
    pub next: SegmentId,
}

/// Searches at most `max_depth` links deep from `from` toward `to`.
///
/// Among the links of each segment the one with the fewest reported hops wins, the earliest
/// link on ties. Stale handles are resolved through merge redirects first.
pub fn find_path(
    graph: &TunnelGraph,
    max_depth: u32,
    from: SegmentId,
    to: SegmentId,
) -> Option<PathStep> {
    let from = graph.resolve(from)?;
    let to = graph.resolve(to)?;
    let mut on_route = BTreeSet::new();
    search(graph, 0, max_depth, from, to, &mut on_route)
}

fn search(
    graph: &TunnelGraph,
    depth: u32,
    max_depth: u32,
    from: SegmentId,
    to: SegmentId,
    on_route: &mut BTreeSet<SegmentId>,
) -> Option<PathStep> {
    if from == to {
        return Some(PathStep { hops: 0, next: to });
    }
    if depth >= max_depth || !on_route.insert(from) {
        return None;
    }

    let mut best: Option<(u32, SegmentId)> = None;
    for &link in graph.links(from) {
        if let Some(step) = search(graph, depth + 1, max_depth, link, to, on_route)
            && best.is_none_or(|(hops, _)| step.hops < hops)
        {
            best = Some((step.hops, link));
        }
    }
    on_route.remove(&from);

    best.map(|(hops, next)| PathStep { hops: hops + 1, next })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut TunnelGraph, len: usize) -> Vec<SegmentId> {
        let ids: Vec<SegmentId> =
            (0..len).map(|i| graph.create_segment(100 * i as i32, 100)).collect();
        for pair in ids.windows(2) {
            graph.link(pair[0], pair[1]).unwrap();
        }
        ids
    }

    #[test]
    fn same_segment_is_zero_hops() {
        let mut graph = TunnelGraph::new(50);
        let ids = chain(&mut graph, 2);
        assert_eq!(find_path(&graph, 0, ids[0], ids[0]), Some(PathStep { hops: 0, next: ids[0] }));
    }

    #[test]
    fn chain_reports_first_hop_and_length() {
        let mut graph = TunnelGraph::new(50);
        let ids = chain(&mut graph, 4);
        let step = find_path(&graph, 5, ids[0], ids[3]).expect("reachable within depth");
        assert_eq!(step, PathStep { hops: 3, next: ids[1] });
    }

    #[test]
    fn depth_cap_hides_far_destination() {
        let mut graph = TunnelGraph::new(50);
        let ids = chain(&mut graph, 4);
        assert_eq!(find_path(&graph, 2, ids[0], ids[3]), None);
        assert!(find_path(&graph, 3, ids[0], ids[3]).is_some());
    }

    #[test]
    fn shorter_branch_wins_over_earlier_longer_one() {
        let mut graph = TunnelGraph::new(50);
        let start = graph.create_segment(0, 0);
        let detour_a = graph.create_segment(100, 0);
        let detour_b = graph.create_segment(200, 0);
        let direct = graph.create_segment(0, 100);
        let goal = graph.create_segment(100, 100);
        graph.link(start, detour_a).unwrap();
        graph.link(detour_a, detour_b).unwrap();
        graph.link(detour_b, goal).unwrap();
        graph.link(start, direct).unwrap();
        graph.link(direct, goal).unwrap();

        let step = find_path(&graph, 6, start, goal).unwrap();
        assert_eq!(step, PathStep { hops: 2, next: direct });
    }

    #[test]
    fn ties_keep_first_link() {
        let mut graph = TunnelGraph::new(50);
        let start = graph.create_segment(0, 0);
        let left = graph.create_segment(100, 0);
        let right = graph.create_segment(200, 0);
        let goal = graph.create_segment(300, 0);
        graph.link(start, left).unwrap();
        graph.link(start, right).unwrap();
        graph.link(left, goal).unwrap();
        graph.link(right, goal).unwrap();

        assert_eq!(find_path(&graph, 4, start, goal).unwrap().next, left);
    }

    #[test]
    fn cycles_terminate_and_unreachable_is_none() {
        let mut graph = TunnelGraph::new(50);
        let ring = chain(&mut graph, 4);
        graph.link(ring[3], ring[0]).unwrap();
        let island = graph.create_segment(900, 900);

        assert_eq!(find_path(&graph, 50, ring[0], island), None);
        assert_eq!(find_path(&graph, 50, ring[0], ring[3]).unwrap().hops, 1);
    }
}
