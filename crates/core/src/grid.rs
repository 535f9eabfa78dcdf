//! Dense dug/solid occupancy field over the playfield.
//! Every moving body probes this directly for wall contact, independent of the tunnel graph.

use crate::config::PlayfieldConfig;
use crate::types::{Pos, Rect};

#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    play_area_top: i32,
    solid: Vec<bool>,
    dug_cells: usize,
}

impl OccupancyGrid {
    pub fn new(config: &PlayfieldConfig) -> Self {
        let side = usize::try_from(config.size).unwrap_or(0);
        Self {
            width: side,
            height: side,
            play_area_top: config.play_area_top,
            solid: vec![true; side * side],
            dug_cells: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Restores every cell to solid ground.
    pub fn reset(&mut self) {
        self.solid.fill(true);
        self.dug_cells = 0;
    }

    /// Digs out every in-bounds cell of the inclusive `rect`. Cells past the edge are skipped.
    pub fn carve_rect(&mut self, rect: Rect) {
        let min_x = rect.min_x.max(0);
        let min_y = rect.min_y.max(0);
        let max_x = rect.max_x.min(self.width as i32 - 1);
        let max_y = rect.max_y.min(self.height as i32 - 1);
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let idx = self.index(Pos { y, x });
                if self.solid[idx] {
                    self.solid[idx] = false;
                    self.dug_cells += 1;
                }
            }
        }
    }

    /// True when `(x, y)` is off the play area or still solid ground.
    pub fn is_outside(&self, x: i32, y: i32) -> bool {
        if self.off_field(x, y) {
            return true;
        }
        self.solid[self.index(Pos { y, x })]
    }

    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        !self.is_outside(x, y)
    }

    /// True only for undug cells on the play area. Bodies that burrow through the ground
    /// treat everything else, corridors and the field edge alike, as a wall.
    pub fn is_solid_ground(&self, x: i32, y: i32) -> bool {
        !self.off_field(x, y) && self.solid[self.index(Pos { y, x })]
    }

    pub fn dug_cell_count(&self) -> usize {
        self.dug_cells
    }

    fn off_field(&self, x: i32, y: i32) -> bool {
        x < 0 || y < self.play_area_top || x as usize >= self.width || y as usize >= self.height
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}
