//! Player-driven growth: choosing a branch direction from the cursor,
//! growing branches and leaves, and upgrading what already exists.
//!
//! Every operation either mutates the grid and returns what it built, or
//! returns a [`GrowthError`] and leaves the grid untouched. Failed attempts
//! play [`SoundId::Error`]; failures for lack of resources also raise the
//! resource layer's insufficient flag.

use crate::{
    collab::{ResourceAuthority, SoundId, SoundSink},
    error::GrowthError,
    grid::{Grid, Leaf, adjacent_node_position},
    height::HeightTracker,
    types::{Branch, BranchType, Direction, GridPos, LeafType},
};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_3, PI, TAU};

/// Outcome of a successful [`grow_leaf`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafGrowth {
    /// A new leaf was attached.
    Planted(GridPos),
    /// An existing leaf was turned bouncy.
    Upgraded(GridPos),
}

/// Maps a cursor angle (radians, counter-clockwise from +x) to a branch
/// direction. Only the upper half-plane is valid; it is split into three
/// 60° sectors: right, middle, left.
pub fn direction_for_angle(angle: f32) -> Option<Direction> {
    let angle = angle.rem_euclid(TAU);
    if !(0.0..PI).contains(&angle) {
        return None;
    }
    match (angle / FRAC_PI_3) as usize {
        0 => Some(Direction::Right),
        1 => Some(Direction::Middle),
        _ => Some(Direction::Left),
    }
}

fn resolve_branch_target(grid: &Grid, world: Vec2) -> Result<(GridPos, Direction), GrowthError> {
    let pos = grid.world_to_grid(world);
    if !grid.in_bounds(pos) {
        return Err(GrowthError::OutOfBounds(pos));
    }
    if !grid.is_enabled(pos) {
        return Err(GrowthError::Disabled(pos));
    }

    let rel = world - grid.grid_to_world(pos);
    let dir = direction_for_angle(rel.y.atan2(rel.x)).ok_or(GrowthError::NoDirection)?;

    if grid.branch_exists(pos, dir) {
        return Err(GrowthError::Occupied(pos));
    }
    if !grid.can_grow_at_grid_position(pos) {
        return Err(GrowthError::Disconnected(pos));
    }
    Ok((pos, dir))
}

/// Node and direction a branch would grow in for a cursor at `world`.
///
/// `None` if the node is blocked, the cursor is below the node center, the
/// slot is taken, or the node is not connected to the ground.
pub fn determine_branch_direction(grid: &Grid, world: Vec2) -> Option<(GridPos, Direction)> {
    resolve_branch_target(grid, world).ok()
}

/// The source node's own enabled state is checked by [`resolve_branch_target`].
fn validate_branch(
    grid: &Grid,
    world: Vec2,
    resources: &impl ResourceAuthority,
) -> Result<Branch, GrowthError> {
    let (pos, dir) = resolve_branch_target(grid, world)?;
    if !resources.can_grow_branch() {
        return Err(GrowthError::InsufficientResources);
    }
    let target = adjacent_node_position(pos, dir);
    if !grid.in_bounds(target) {
        return Err(GrowthError::OutOfBounds(target));
    }
    if !grid.is_enabled(target) {
        return Err(GrowthError::Disabled(target));
    }
    Ok(Branch {
        pos,
        dir,
        kind: BranchType::Normal,
    })
}

/// Ghost preview for the render layer: the branch [`grow_branch`] would
/// build at `world`, ignoring resources. Never mutates anything.
pub fn preview_branch(grid: &Grid, world: Vec2) -> Option<Branch> {
    let (pos, dir) = resolve_branch_target(grid, world).ok()?;
    grid.is_enabled(adjacent_node_position(pos, dir))
        .then_some(Branch {
            pos,
            dir,
            kind: BranchType::Normal,
        })
}

fn report<T>(
    result: Result<T, GrowthError>,
    success: SoundId,
    resources: &mut impl ResourceAuthority,
    sounds: &mut impl SoundSink,
) -> Result<T, GrowthError> {
    match &result {
        Ok(_) => sounds.play_sound(success),
        Err(err) => {
            log::debug!("growth rejected: {err}");
            if err.is_resource() {
                resources.set_insufficient_flag();
            }
            sounds.play_sound(SoundId::Error);
        }
    }
    result
}

/// Grows a [`BranchType::Normal`] branch from the node under `world`, in
/// the direction picked by [`determine_branch_direction`].
///
/// Checks run in this order, and the first failure wins:
///
/// 1. The node under `world` is in bounds and enabled, the cursor is in the
///    upper half-plane, the slot is free and the node is connected.
/// 2. `resources` allows a branch.
/// 3. The neighbor the branch would reach is in bounds and enabled.
///
/// On success plays [`SoundId::Grow`]. On failure plays [`SoundId::Error`],
/// and raises the insufficient flag if step 2 failed. The core never
/// spends growth resources itself.
///
/// ### Parameters
/// - `grid` - Lattice the branch is written into.
/// - `world` - Cursor position in world space.
/// - `resources` - Gate for branch growth.
/// - `sounds` - Receives the success or error cue.
///
/// ### Returns
/// The branch that was built, or why nothing was built.
pub fn grow_branch(
    grid: &mut Grid,
    world: Vec2,
    resources: &mut impl ResourceAuthority,
    sounds: &mut impl SoundSink,
) -> Result<Branch, GrowthError> {
    let result = validate_branch(grid, world, &*resources).and_then(|branch| {
        if grid.set_branch(branch.pos, branch.dir, branch.kind) {
            Ok(branch)
        } else {
            Err(GrowthError::OutOfBounds(adjacent_node_position(branch.pos, branch.dir)))
        }
    });
    report(result, SoundId::Grow, resources, sounds)
}

fn plant_leaf(
    grid: &mut Grid,
    height: &mut HeightTracker,
    world: Vec2,
    leaf: Leaf,
    resources: &mut impl ResourceAuthority,
) -> Result<LeafGrowth, GrowthError> {
    let pos = grid.world_to_grid(world);

    // Growing onto a plain leaf makes it bouncy instead.
    if let Some(existing) = grid.leaf(pos).copied() {
        if existing.kind == LeafType::Bouncy {
            return Err(GrowthError::Occupied(pos));
        }
        if !resources.can_upgrade() {
            return Err(GrowthError::InsufficientResources);
        }
        resources.decrement_upgrade();
        if let Some(node) = grid.node_mut(pos)
            && let Some(leaf) = node.leaf.as_mut()
        {
            leaf.kind = LeafType::Bouncy;
        }
        return Ok(LeafGrowth::Upgraded(pos));
    }

    if !resources.can_grow_leaf() {
        return Err(GrowthError::InsufficientResources);
    }
    if !grid.in_bounds(pos) {
        return Err(GrowthError::OutOfBounds(pos));
    }
    if pos.is_ground_anchor() {
        return Err(GrowthError::GroundAnchor(pos));
    }
    if !grid.can_grow_at_grid_position(pos) {
        return Err(GrowthError::Disconnected(pos));
    }

    let node = grid.node_mut(pos).ok_or(GrowthError::OutOfBounds(pos))?;
    node.leaf = Some(leaf);
    height.note_leaf(grid, pos);
    Ok(LeafGrowth::Planted(pos))
}

/// Attaches `leaf` to the node under `world`, or upgrades the plain leaf
/// already there to [`LeafType::Bouncy`].
///
/// The upgrade path spends an upgrade token rather than a growth resource,
/// and ignores `leaf`. A leaf that is already bouncy is left alone.
///
/// For a node without a leaf:
///
/// 1. `resources` must allow a leaf.
/// 2. The node must be in bounds and not a ground anchor.
/// 3. The node must be connected to the ground.
/// 4. The leaf is attached and `height` is raised if the leaf is higher.
///
/// ### Parameters
/// - `grid` - Lattice the leaf is attached to.
/// - `height` - Highest-point marker, updated greedily.
/// - `world` - Cursor position in world space.
/// - `leaf` - Leaf to attach when planting.
/// - `resources` - Gate for leaves and source of upgrade tokens.
/// - `sounds` - Receives [`SoundId::Grow`], [`SoundId::Upgrade`] or [`SoundId::Error`].
///
/// ### Returns
/// Whether a leaf was planted or upgraded, and where.
pub fn grow_leaf(
    grid: &mut Grid,
    height: &mut HeightTracker,
    world: Vec2,
    leaf: Leaf,
    resources: &mut impl ResourceAuthority,
    sounds: &mut impl SoundSink,
) -> Result<LeafGrowth, GrowthError> {
    let result = plant_leaf(grid, height, world, leaf, resources);
    let success = match result {
        Ok(LeafGrowth::Upgraded(_)) => SoundId::Upgrade,
        _ => SoundId::Grow,
    };
    report(result, success, resources, sounds)
}

/// Replaces an existing branch with one of type `kind`, spending an
/// upgrade token. Connectivity is not rechecked; the branch already exists.
pub fn upgrade_branch(
    grid: &mut Grid,
    pos: GridPos,
    dir: Direction,
    kind: BranchType,
    resources: &mut impl ResourceAuthority,
    sounds: &mut impl SoundSink,
) -> Result<Branch, GrowthError> {
    let result = if !grid.branch_exists(pos, dir) {
        Err(GrowthError::MissingBranch(pos))
    } else if !resources.can_upgrade() {
        Err(GrowthError::InsufficientResources)
    } else {
        resources.decrement_upgrade();
        grid.remove_branch(pos, dir);
        grid.set_branch(pos, dir, kind);
        Ok(Branch { pos, dir, kind })
    };
    report(result, SoundId::Upgrade, resources, sounds)
}
