//! Fresh-level setup: wipes the network and the grid, then digs the two starting tunnels.

use super::TunnelGraph;
use crate::config::PlayfieldConfig;
use crate::grid::OccupancyGrid;
use crate::types::{NavError, Rect, SegmentId};

/// Handles of the segments every level begins with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartingTunnels {
    /// Runs down from the spawn point; this is the home segment.
    pub vertical: SegmentId,
    /// Crosses the field along its middle row.
    pub horizontal: SegmentId,
}

/// Rebuilds the network for `level`. Starting tunnels reach further on later levels.
pub fn reset_level(
    graph: &mut TunnelGraph,
    grid: &mut OccupancyGrid,
    config: &PlayfieldConfig,
    level: u32,
) -> Result<StartingTunnels, NavError> {
    graph.clear();
    grid.reset();

    let half = config.half_width();
    let mid = config.mid();
    let spawn = config.spawn();
    let reach = config.start_tunnel_reach
        + config.start_tunnel_growth.saturating_mul(i32::try_from(level).unwrap_or(i32::MAX));

    let vertical_bottom = mid.saturating_add(reach).min(config.size);
    let vertical = graph.create_segment(spawn.x, spawn.y);
    graph.grow_segment(vertical, spawn.x, vertical_bottom - half)?;
    grid.carve_rect(Rect::new(spawn.x - half, spawn.y - half, spawn.x + half, vertical_bottom));

    let left = (mid - reach).max(0);
    let right = mid.saturating_add(reach).min(config.size);
    let horizontal = graph.create_segment(left + half, mid);
    graph.grow_segment(horizontal, right - half, mid)?;
    grid.carve_rect(Rect::new(left, mid - half, right, mid + half));

    graph.complete_segment(vertical)?;
    graph.complete_segment(horizontal)?;
    log::info!("level {level} laid out: starting tunnels reach {reach} from centre");

    Ok(StartingTunnels { vertical, horizontal })
}
