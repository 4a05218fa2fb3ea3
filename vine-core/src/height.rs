//! Highest point of the plant.
//!
//! Leaf growth updates the marker greedily in O(1). Destruction cannot do
//! that (the marker does not know when its own node disappears), so after
//! destructive events the caller runs [`HeightTracker::recalculate`], which
//! walks the whole plant. Do not call it every tick.

use crate::{
    grid::{Grid, adjacent_node_position},
    types::{Direction, GridPos},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeightTracker {
    highest: Option<GridPos>,
}

impl HeightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known highest node. May be stale after destruction until
    /// [`HeightTracker::recalculate`] runs.
    pub fn highest(&self) -> Option<GridPos> {
        self.highest
    }

    pub fn clear(&mut self) {
        self.highest = None;
    }

    /// Raises the marker to `pos` if it is higher than the current one.
    pub fn note_leaf(&mut self, grid: &Grid, pos: GridPos) {
        let y = grid.grid_to_world(pos).y;
        let higher = match self.highest {
            Some(current) => y > grid.grid_to_world(current).y,
            None => true,
        };
        if higher {
            self.highest = Some(pos);
        }
    }

    /// Recomputes the marker from scratch and returns it.
    ///
    /// 1. Visits the ground anchors in column order.
    /// 2. From each, walks existing branches upward with an explicit stack,
    ///    skipping nodes already reached from an earlier anchor.
    /// 3. Keeps the highest node seen. On equal heights the first one found
    ///    wins; anchors themselves never count.
    ///
    /// Linear in the number of nodes. Call it after destruction, not every tick.
    ///
    /// ### Parameters
    /// - `grid` - Lattice to walk; only read access is required.
    ///
    /// ### Returns
    /// The new marker, or `None` when no branch grows from the ground.
    pub fn recalculate(&mut self, grid: &Grid) -> Option<GridPos> {
        let mut visited = vec![false; grid.width() * grid.height()];
        let mut stack: Vec<GridPos> = Vec::with_capacity(64);
        let mut best: Option<(GridPos, f32)> = None;

        let anchors = (0..grid.width() as i32)
            .step_by(2)
            .map(|col| GridPos::new(col, 0))
            .filter(|&pos| grid.in_bounds(pos));

        for anchor in anchors {
            stack.push(anchor);
            while let Some(pos) = stack.pop() {
                if pos != anchor {
                    let y = grid.grid_to_world(pos).y;
                    if best.is_none_or(|(_, best_y)| y > best_y) {
                        best = Some((pos, y));
                    }
                }
                // Reversed so that LEFT is explored first, as a recursive walk would.
                for dir in Direction::ALL.into_iter().rev() {
                    if !grid.branch_exists(pos, dir) {
                        continue;
                    }
                    let next = adjacent_node_position(pos, dir);
                    if !grid.in_bounds(next) {
                        continue;
                    }
                    let idx = next.col as usize * grid.height() + next.row as usize;
                    if !visited[idx] {
                        visited[idx] = true;
                        stack.push(next);
                    }
                }
            }
        }

        self.highest = best.map(|(pos, _)| pos);
        self.highest
    }
}
