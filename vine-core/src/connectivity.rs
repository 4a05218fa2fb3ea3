//! Support rule: which nodes can currently be grown from.

use crate::{
    grid::{Grid, Node, adjacent_node_position},
    types::{Direction, GridPos},
};

/// The three lower neighbors that could hold a branch reaching `pos`,
/// paired with the direction that branch must have.
///
/// For an even column the diagonal neighbors are the raised odd columns one
/// row down; for an odd column they are the even columns on the same row.
pub fn supporting_neighbors(pos: GridPos) -> [(GridPos, Direction); 3] {
    let side_row = if pos.is_offset_column() {
        pos.row
    } else {
        pos.row - 1
    };
    [
        (GridPos::new(pos.col, pos.row - 1), Direction::Middle),
        (GridPos::new(pos.col - 1, side_row), Direction::Right),
        (GridPos::new(pos.col + 1, side_row), Direction::Left),
    ]
}

impl Grid {
    /// Whether growth may start at `pos`.
    ///
    /// Ground anchors always qualify. Any other node must be in bounds,
    /// enabled, and reached by a branch from one of its three lower neighbors.
    pub fn can_grow_at_grid_position(&self, pos: GridPos) -> bool {
        if pos.is_ground_anchor() && self.in_bounds(pos) {
            return true;
        }
        if !self.is_enabled(pos) {
            return false;
        }
        supporting_neighbors(pos)
            .into_iter()
            .any(|(below, dir)| self.branch_exists(below, dir))
    }

    /// Enabled, growable nodes with at least one free branch slot whose
    /// target is also enabled. The render layer glows these.
    pub fn growable_anchors(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.iter()
            .filter(|(pos, node)| {
                node.enabled() && self.can_grow_at_grid_position(*pos) && self.has_free_slot(*pos, node)
            })
            .map(|(pos, _)| pos)
    }

    fn has_free_slot(&self, pos: GridPos, node: &Node) -> bool {
        Direction::ALL.into_iter().any(|dir| {
            node.branch(dir).is_none()
                && self.is_enabled(adjacent_node_position(pos, dir))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        types::{BranchType, WorldRect},
    };
    use glam::Vec2;

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::with_dimensions(width, height, Vec2::ZERO, &Config::default(), &|_: WorldRect| false)
    }

    #[test]
    fn supporting_neighbors_invert_adjacency() {
        for pos in [GridPos::new(2, 3), GridPos::new(3, 3), GridPos::new(4, 1)] {
            for (below, dir) in supporting_neighbors(pos) {
                assert_eq!(adjacent_node_position(below, dir), pos);
            }
        }
    }

    #[test]
    fn ground_anchors_are_always_growable() {
        let grid = open_grid(6, 4);
        for col in (0..6).step_by(2) {
            assert!(grid.can_grow_at_grid_position(GridPos::new(col, 0)));
        }
        // Raised ground-row nodes are not anchors.
        assert!(!grid.can_grow_at_grid_position(GridPos::new(1, 0)));
    }

    #[test]
    fn bare_nodes_above_ground_are_not_growable() {
        let grid = open_grid(6, 4);
        assert!(!grid.can_grow_at_grid_position(GridPos::new(2, 1)));
        assert!(!grid.can_grow_at_grid_position(GridPos::new(3, 2)));
    }

    #[test]
    fn each_qualifying_branch_supports_the_node() {
        let target = GridPos::new(2, 2);
        for (below, dir) in supporting_neighbors(target) {
            let mut grid = open_grid(6, 5);
            assert!(grid.set_branch(below, dir, BranchType::Normal));
            assert!(grid.can_grow_at_grid_position(target), "{dir:?} from {below:?}");
        }
    }

    #[test]
    fn branches_pointing_elsewhere_do_not_support() {
        let mut grid = open_grid(6, 5);
        let target = GridPos::new(2, 2);
        // Node directly below, but its branch leans left.
        assert!(grid.set_branch(GridPos::new(2, 1), Direction::Left, BranchType::Normal));
        assert!(!grid.can_grow_at_grid_position(target));
    }

    #[test]
    fn out_of_bounds_nodes_are_never_growable() {
        let grid = open_grid(4, 4);
        assert!(!grid.can_grow_at_grid_position(GridPos::new(-2, 0)));
        assert!(!grid.can_grow_at_grid_position(GridPos::new(8, 0)));
        assert!(!grid.can_grow_at_grid_position(GridPos::new(1, 9)));
    }

    #[test]
    fn growable_anchors_follow_branches() {
        let mut grid = open_grid(4, 4);
        let before: Vec<_> = grid.growable_anchors().collect();
        assert_eq!(before, vec![GridPos::new(0, 0), GridPos::new(2, 0)]);

        assert!(grid.set_branch(GridPos::new(0, 0), Direction::Middle, BranchType::Normal));
        let after: Vec<_> = grid.growable_anchors().collect();
        assert!(after.contains(&GridPos::new(0, 1)));
    }
}
