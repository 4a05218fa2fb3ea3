//! The growth lattice: a fixed-size `[column][row]` array of [`Node`]s.
//!
//! Nodes never reference each other. Neighbors are derived from
//! `(column, row, direction, parity)` by [`adjacent_node_position`].

use crate::{
    collab::CollisionProbe,
    config::Config,
    coords::LatticeMapper,
    types::{BranchType, Direction, GridPos, HazardId, LeafType, WorldRect},
};
use glam::Vec2;
use rand::Rng;

/// Terminal attachment of a node. Hazards feed on `health`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leaf {
    pub kind: LeafType,
    pub health: f32,
    /// Visual width in world units, chosen by the caller at growth time.
    pub width: f32,
}

impl Leaf {
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.health <= 0.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    offset: bool,
    enabled: bool,
    pub(crate) branches: [Option<BranchType>; 3],
    pub(crate) leaf: Option<Leaf>,
    pub(crate) hazard: Option<HazardId>,
}

impl Node {
    fn new(offset: bool, enabled: bool) -> Self {
        Self {
            offset,
            enabled,
            ..Self::default()
        }
    }

    /// Whether this node's column is raised half a cell.
    pub fn offset(&self) -> bool {
        self.offset
    }

    /// `false` when static terrain occupied this spot when the grid was built.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn branch(&self, dir: Direction) -> Option<BranchType> {
        self.branches[dir.index()]
    }

    pub fn leaf(&self) -> Option<&Leaf> {
        self.leaf.as_ref()
    }

    pub fn hazard(&self) -> Option<HazardId> {
        self.hazard
    }

    pub fn has_branches(&self) -> bool {
        self.branches.iter().any(Option::is_some)
    }

    /// No leaf and no branches. Hazards do not count as structure.
    pub fn is_empty(&self) -> bool {
        self.leaf.is_none() && !self.has_branches()
    }
}

/// Upward neighbor of `pos` in direction `dir`.
///
/// An even column's right/left neighbors are the raised odd columns on the
/// same row; an odd column's are the even columns one row up.
pub fn adjacent_node_position(pos: GridPos, dir: Direction) -> GridPos {
    let side_row = if pos.is_offset_column() {
        pos.row + 1
    } else {
        pos.row
    };
    match dir {
        Direction::Left => GridPos::new(pos.col - 1, side_row),
        Direction::Middle => GridPos::new(pos.col, pos.row + 1),
        Direction::Right => GridPos::new(pos.col + 1, side_row),
    }
}

#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    nodes: Vec<Node>,
    mapper: LatticeMapper,
}

impl Grid {
    /// Builds a grid covering `world_size`, horizontally centered.
    ///
    /// Width is `round(tile_columns * sqrt(3))`; height is enough rows to
    /// reach the top of the world plus `cfg.row_buffer`.
    pub fn new(world_size: Vec2, cfg: &Config, probe: &impl CollisionProbe) -> Self {
        let tile_columns = world_size.x / cfg.tile_size;
        let width = (tile_columns * 3.0_f32.sqrt()).round().max(0.0) as usize;
        let height =
            (world_size.y / cfg.vertical_spacing()).round().max(0.0) as usize + cfg.row_buffer;
        let span = width.saturating_sub(1) as f32 * cfg.horizontal_spacing();
        let origin = Vec2::new((world_size.x - span) * 0.5, 0.0);
        Self::with_dimensions(width, height, origin, cfg, probe)
    }

    /// Builds a grid of exactly `width` x `height` nodes with node `(0, 0)` at `origin`.
    ///
    /// Every node is probed once here; a hit disables it for the grid's
    /// lifetime. Ground anchors also probe a band below themselves.
    pub fn with_dimensions(
        width: usize,
        height: usize,
        origin: Vec2,
        cfg: &Config,
        probe: &impl CollisionProbe,
    ) -> Self {
        let mapper = LatticeMapper::new(origin, cfg);
        let half = Vec2::splat(cfg.probe_half_extent);
        let mut nodes = Vec::with_capacity(width * height);
        let mut disabled = 0usize;

        for col in 0..width {
            for row in 0..height {
                let pos = GridPos::new(col as i32, row as i32);
                let center = mapper.grid_to_world(pos);
                let mut blocked =
                    probe.query_occupied(WorldRect::from_center_half_extents(center, half));
                if !blocked && pos.is_ground_anchor() {
                    let band = WorldRect {
                        min: Vec2::new(center.x - half.x, center.y - cfg.ground_probe_depth),
                        max: Vec2::new(center.x + half.x, center.y),
                    };
                    blocked = probe.query_occupied(band);
                }
                if blocked {
                    disabled += 1;
                }
                nodes.push(Node::new(pos.is_offset_column(), !blocked));
            }
        }

        log::info!("built {width}x{height} growth grid, {disabled} nodes blocked by terrain");

        Self {
            width,
            height,
            nodes,
            mapper,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mapper(&self) -> &LatticeMapper {
        &self.mapper
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as usize) < self.width
            && (pos.row as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.col as usize * self.height + pos.row as usize)
    }

    pub fn node(&self, pos: GridPos) -> Option<&Node> {
        self.index(pos).map(|i| &self.nodes[i])
    }

    pub(crate) fn node_mut(&mut self, pos: GridPos) -> Option<&mut Node> {
        self.index(pos).map(move |i| &mut self.nodes[i])
    }

    /// In bounds and not blocked by terrain.
    pub fn is_enabled(&self, pos: GridPos) -> bool {
        self.node(pos).is_some_and(Node::enabled)
    }

    pub fn world_to_grid(&self, p: Vec2) -> GridPos {
        self.mapper.world_to_grid(p)
    }

    pub fn grid_to_world(&self, pos: GridPos) -> Vec2 {
        self.mapper.grid_to_world(pos)
    }

    /// Every index in the grid, column-major.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + use<> {
        let height = self.height as i32;
        (0..self.width as i32)
            .flat_map(move |col| (0..height).map(move |row| GridPos::new(col, row)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &Node)> + '_ {
        self.positions().zip(self.nodes.iter())
    }

    pub fn branch(&self, pos: GridPos, dir: Direction) -> Option<BranchType> {
        self.node(pos).and_then(|n| n.branch(dir))
    }

    pub fn branch_exists(&self, pos: GridPos, dir: Direction) -> bool {
        self.branch(pos, dir).is_some()
    }

    /// Installs a branch, replacing whatever occupied the slot.
    ///
    /// Returns `false` without touching the grid if the branch would start
    /// or end outside the grid.
    pub(crate) fn set_branch(&mut self, pos: GridPos, dir: Direction, kind: BranchType) -> bool {
        if !self.in_bounds(adjacent_node_position(pos, dir)) {
            return false;
        }
        match self.node_mut(pos) {
            Some(node) => {
                node.branches[dir.index()] = Some(kind);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_branch(&mut self, pos: GridPos, dir: Direction) -> Option<BranchType> {
        self.node_mut(pos)
            .and_then(|n| n.branches[dir.index()].take())
    }

    pub fn leaf(&self, pos: GridPos) -> Option<&Leaf> {
        self.node(pos).and_then(Node::leaf)
    }

    /// Lets something eat `amount` of the leaf at `pos`.
    ///
    /// Health saturates at zero. Returns the remaining health, or `None` if
    /// there is no leaf there.
    pub fn consume_leaf(&mut self, pos: GridPos, amount: f32) -> Option<f32> {
        let leaf = self.node_mut(pos)?.leaf.as_mut()?;
        leaf.health = (leaf.health - amount.max(0.0)).max(0.0);
        Some(leaf.health)
    }

    pub fn branch_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.branches.iter().flatten().count())
            .sum()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.leaf.is_some()).count()
    }

    /// Picks a random node holding a leaf and no hazard, for a hazard to land on.
    pub fn random_leaf_node(&self, rng: &mut impl Rng) -> Option<GridPos> {
        let free: Vec<GridPos> = self
            .iter()
            .filter(|(_, n)| n.leaf.is_some() && n.hazard.is_none())
            .map(|(pos, _)| pos)
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[rng.random_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::with_dimensions(width, height, Vec2::ZERO, &Config::default(), &|_: WorldRect| false)
    }

    #[test]
    fn new_derives_dimensions_from_world_size() {
        let cfg = Config::default();
        let world = Vec2::new(cfg.tile_size * 4.0, cfg.vertical_spacing() * 10.0);
        let grid = Grid::new(world, &cfg, &|_: WorldRect| false);

        // 4 tile columns * sqrt(3) = 6.93 -> 7 lattice columns.
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.height(), 10 + cfg.row_buffer);

        // Horizontally centered.
        let left = grid.grid_to_world(GridPos::new(0, 0)).x;
        let right = grid.grid_to_world(GridPos::new(6, 0)).x;
        assert!((left - (world.x - right)).abs() < 1e-3);
    }

    #[test]
    fn adjacency_depends_on_column_parity() {
        let even = GridPos::new(2, 3);
        assert_eq!(adjacent_node_position(even, Direction::Middle), GridPos::new(2, 4));
        assert_eq!(adjacent_node_position(even, Direction::Left), GridPos::new(1, 3));
        assert_eq!(adjacent_node_position(even, Direction::Right), GridPos::new(3, 3));

        let odd = GridPos::new(3, 3);
        assert_eq!(adjacent_node_position(odd, Direction::Middle), GridPos::new(3, 4));
        assert_eq!(adjacent_node_position(odd, Direction::Left), GridPos::new(2, 4));
        assert_eq!(adjacent_node_position(odd, Direction::Right), GridPos::new(4, 4));
    }

    #[test]
    fn adjacent_nodes_are_above_and_equidistant() {
        let grid = open_grid(6, 6);
        let v = grid.mapper().v;
        for pos in [GridPos::new(2, 2), GridPos::new(3, 2)] {
            let here = grid.grid_to_world(pos);
            for dir in Direction::ALL {
                let there = grid.grid_to_world(adjacent_node_position(pos, dir));
                assert!(there.y > here.y, "{dir:?} from {pos:?} must point upward");
                assert!(((there - here).length() - v).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn probe_hits_disable_nodes() {
        let cfg = Config::default();
        let blocked_at = GridPos::new(1, 1);
        let center = LatticeMapper::new(Vec2::ZERO, &cfg).grid_to_world(blocked_at);
        let grid = Grid::with_dimensions(4, 4, Vec2::ZERO, &cfg, &|r: WorldRect| {
            r.intersects(&WorldRect::from_center_half_extents(center, Vec2::splat(0.1)))
        });

        assert!(!grid.is_enabled(blocked_at));
        assert!(grid.is_enabled(GridPos::new(0, 0)));
        assert!(grid.is_enabled(GridPos::new(2, 2)));
    }

    #[test]
    fn ground_anchor_probes_band_below() {
        let cfg = Config::default();
        // Terrain below the anchors' own probe square, inside their band.
        let below = WorldRect {
            min: Vec2::new(-1000.0, -100.0),
            max: Vec2::new(1000.0, -cfg.probe_half_extent - 1.0),
        };
        let grid = Grid::with_dimensions(4, 3, Vec2::ZERO, &cfg, &|r: WorldRect| {
            r.intersects(&below)
        });

        assert!(!grid.is_enabled(GridPos::new(0, 0)));
        assert!(!grid.is_enabled(GridPos::new(2, 0)));
        assert!(grid.is_enabled(GridPos::new(1, 0)));
        assert!(grid.is_enabled(GridPos::new(0, 1)));
    }

    #[test]
    fn set_branch_refuses_to_point_outside_the_grid() {
        let mut grid = open_grid(3, 3);
        assert!(!grid.set_branch(GridPos::new(0, 0), Direction::Left, BranchType::Normal));
        assert!(!grid.set_branch(GridPos::new(1, 2), Direction::Middle, BranchType::Normal));
        assert!(grid.set_branch(GridPos::new(0, 0), Direction::Right, BranchType::Normal));
        assert!(grid.branch_exists(GridPos::new(0, 0), Direction::Right));
        assert_eq!(grid.branch_count(), 1);
    }

    #[test]
    fn out_of_bounds_lookups_are_none() {
        let grid = open_grid(3, 3);
        assert!(grid.node(GridPos::new(-1, 0)).is_none());
        assert!(grid.node(GridPos::new(0, 3)).is_none());
        assert!(!grid.branch_exists(GridPos::new(5, 5), Direction::Middle));
    }

    #[test]
    fn consume_leaf_saturates_at_zero() {
        let mut grid = open_grid(3, 3);
        let pos = GridPos::new(1, 0);
        assert_eq!(grid.consume_leaf(pos, 1.0), None);

        grid.node_mut(pos).unwrap().leaf = Some(Leaf {
            kind: LeafType::Normal,
            health: 1.0,
            width: 10.0,
        });
        assert_eq!(grid.consume_leaf(pos, 0.25), Some(0.75));
        assert_eq!(grid.consume_leaf(pos, 5.0), Some(0.0));
        assert!(grid.leaf(pos).unwrap().is_consumed());
    }

    #[test]
    fn random_leaf_node_skips_hazard_hosts() {
        let mut grid = open_grid(3, 3);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(grid.random_leaf_node(&mut rng), None);

        let leaf = Leaf {
            kind: LeafType::Normal,
            health: 1.0,
            width: 10.0,
        };
        let taken = GridPos::new(1, 0);
        let free = GridPos::new(1, 1);
        grid.node_mut(taken).unwrap().leaf = Some(leaf);
        grid.node_mut(taken).unwrap().hazard = Some(HazardId(1));
        grid.node_mut(free).unwrap().leaf = Some(leaf);

        for _ in 0..10 {
            assert_eq!(grid.random_leaf_node(&mut rng), Some(free));
        }
    }
}
