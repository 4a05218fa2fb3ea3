use glam::Vec2;

/// Index of a node in a [`crate::grid::Grid`], as `(column, row)`.
///
/// Coordinates are signed so that positions produced by
/// [`crate::coords::LatticeMapper::world_to_grid`] outside the grid are still
/// representable; callers check them with [`crate::grid::Grid::in_bounds`]
/// before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Even columns sit on whole rows; odd columns are shifted up half a cell.
    #[inline]
    pub const fn is_offset_column(self) -> bool {
        self.col & 1 == 1
    }

    /// Row 0 of a non-offset column: the ground anchor.
    #[inline]
    pub const fn is_ground_anchor(self) -> bool {
        self.row == 0 && !self.is_offset_column()
    }
}

/// Outward branch slot of a node. Branches only ever point upward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Middle,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Middle, Direction::Right];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Middle => 1,
            Direction::Right => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BranchType {
    #[default]
    Normal,
    Thorny,
    Reinforced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LeafType {
    #[default]
    Normal,
    Bouncy,
}

/// Handle of a hazard owned by the actor layer. Nodes only record presence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HazardId(pub u32);

/// A branch as seen from outside the grid: where it starts, where it points, what it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    pub pos: GridPos,
    pub dir: Direction,
    pub kind: BranchType,
}

/// Axis-aligned rectangle in world space, handed to the collision probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldRect {
    pub fn from_center_half_extents(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}
