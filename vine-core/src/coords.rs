//! World-space ↔ grid-index conversion for the offset (brick-like) lattice.
//!
//! Column `c` sits at `origin.x + c * h`. Even columns put row `r` at
//! `origin.y + r * v`; odd columns are raised by half a cell, `v / 2`.

use crate::{config::Config, types::GridPos};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeMapper {
    /// World position of node `(0, 0)`.
    pub origin: Vec2,
    /// Horizontal distance between columns.
    pub h: f32,
    /// Vertical distance between rows.
    pub v: f32,
}

impl LatticeMapper {
    pub fn new(origin: Vec2, cfg: &Config) -> Self {
        Self {
            origin,
            h: cfg.horizontal_spacing(),
            v: cfg.vertical_spacing(),
        }
    }

    /// Maps a world position to the nearest lattice index.
    ///
    /// Total: the result may lie outside any particular grid and must be
    /// bounds-checked by the caller before indexing.
    pub fn world_to_grid(&self, p: Vec2) -> GridPos {
        let col = ((p.x - self.origin.x) / self.h).round() as i32;
        let mut y = p.y - self.origin.y;
        if col & 1 == 1 {
            y -= self.v * 0.5;
        }
        let row = (y / self.v).round() as i32;
        GridPos::new(col, row)
    }

    /// World position of the node at `pos`. Defined for any index, in bounds or not.
    pub fn grid_to_world(&self, pos: GridPos) -> Vec2 {
        let x = self.origin.x + pos.col as f32 * self.h;
        let mut y = self.origin.y + pos.row as f32 * self.v;
        if pos.is_offset_column() {
            y += self.v * 0.5;
        }
        Vec2::new(x, y)
    }
}
