//! [`PlantSim`] ties the grid, the destruction propagator and the height
//! marker together with the collaborators injected by the game layer.
//!
//! One [`PlantSim::step`] per frame; growth calls complete synchronously.

use crate::{
    collab::{CollisionProbe, ResourceAuthority, SoundSink},
    config::Config,
    destruction::DestructionPropagator,
    error::GrowthError,
    grid::{Grid, Leaf},
    growth::{self, LeafGrowth},
    height::HeightTracker,
    types::{Branch, BranchType, Direction, GridPos, HazardId, LeafType},
};
use glam::Vec2;
use rand::Rng;

/// What one [`PlantSim::step`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Hazards knocked off by a destruction wave.
    pub destroyed_hazards: Vec<HazardId>,
    /// Hazards released because the leaf under them was eaten.
    pub eaten_hazards: Vec<HazardId>,
    /// A destruction wave drained this step.
    pub wave_drained: bool,
}

impl StepReport {
    pub fn is_quiet(&self) -> bool {
        !self.wave_drained && self.eaten_hazards.is_empty()
    }
}

#[derive(Debug)]
pub struct PlantSim<R, S> {
    cfg: Config,
    grid: Grid,
    destruction: DestructionPropagator,
    height: HeightTracker,
    resources: R,
    sounds: S,
}

impl<R: ResourceAuthority, S: SoundSink> PlantSim<R, S> {
    pub fn new(
        cfg: Config,
        world_size: Vec2,
        probe: &impl CollisionProbe,
        resources: R,
        sounds: S,
    ) -> Self {
        Self {
            grid: Grid::new(world_size, &cfg, probe),
            destruction: DestructionPropagator::new(cfg.propagation_delay),
            height: HeightTracker::new(),
            cfg,
            resources,
            sounds,
        }
    }

    /// Wraps an already built grid, e.g. one with explicit dimensions.
    pub fn from_grid(cfg: Config, grid: Grid, resources: R, sounds: S) -> Self {
        Self {
            grid,
            destruction: DestructionPropagator::new(cfg.propagation_delay),
            height: HeightTracker::new(),
            cfg,
            resources,
            sounds,
        }
    }

    /// Throws the old grid away and builds a fresh one, probing terrain again.
    pub fn reset(&mut self, world_size: Vec2, probe: &impl CollisionProbe) {
        self.grid = Grid::new(world_size, &self.cfg, probe);
        self.destruction.clear();
        self.height.clear();
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Lattice settings take effect on the next [`PlantSim::reset`]; the
    /// propagation delay applies from the next queued destruction.
    pub fn set_config(&mut self, cfg: Config) {
        self.destruction.set_delay(cfg.propagation_delay);
        self.cfg = cfg;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn destruction(&self) -> &DestructionPropagator {
        &self.destruction
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    pub fn sounds(&self) -> &S {
        &self.sounds
    }

    pub fn sounds_mut(&mut self) -> &mut S {
        &mut self.sounds
    }

    pub fn can_grow_at_grid_position(&self, pos: GridPos) -> bool {
        self.grid.can_grow_at_grid_position(pos)
    }

    pub fn determine_branch_direction(&self, world: Vec2) -> Option<(GridPos, Direction)> {
        growth::determine_branch_direction(&self.grid, world)
    }

    pub fn preview_branch(&self, world: Vec2) -> Option<Branch> {
        growth::preview_branch(&self.grid, world)
    }

    pub fn grow_branch(&mut self, world: Vec2) -> Result<Branch, GrowthError> {
        growth::grow_branch(&mut self.grid, world, &mut self.resources, &mut self.sounds)
    }

    pub fn grow_leaf(
        &mut self,
        world: Vec2,
        kind: LeafType,
        width: f32,
    ) -> Result<LeafGrowth, GrowthError> {
        let leaf = Leaf {
            kind,
            health: self.cfg.leaf_health,
            width,
        };
        growth::grow_leaf(
            &mut self.grid,
            &mut self.height,
            world,
            leaf,
            &mut self.resources,
            &mut self.sounds,
        )
    }

    pub fn upgrade_branch(
        &mut self,
        pos: GridPos,
        dir: Direction,
        kind: BranchType,
    ) -> Result<Branch, GrowthError> {
        growth::upgrade_branch(
            &mut self.grid,
            pos,
            dir,
            kind,
            &mut self.resources,
            &mut self.sounds,
        )
    }

    pub fn queue_destruction(&mut self, pos: GridPos) {
        self.destruction.queue_destruction(pos);
    }

    /// Queues the node under `world`, if there is one with structure on it.
    pub fn destroy_at(&mut self, world: Vec2) -> Option<GridPos> {
        let pos = self.grid.world_to_grid(world);
        let node = self.grid.node(pos)?;
        if node.is_empty() {
            return None;
        }
        self.destruction.queue_destruction(pos);
        Some(pos)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Drains a destruction wave if one is due, then releases hazards whose
    /// leaves have been eaten. The height marker is not touched; call
    /// [`PlantSim::recalculate_max_plant_position`] when
    /// [`StepReport::wave_drained`] is set.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let waves_before = self.destruction.waves_drained();
        let destroyed_hazards =
            self.destruction
                .propagate_destruction(&mut self.grid, dt, &mut self.sounds);
        let eaten_hazards = self.grid.remove_dead_leaf_bugs();
        StepReport {
            destroyed_hazards,
            eaten_hazards,
            wave_drained: self.destruction.waves_drained() != waves_before,
        }
    }

    /// Highest node as last tracked. Cheap, possibly stale after destruction.
    pub fn highest_point(&self) -> Option<GridPos> {
        self.height.highest()
    }

    /// Walks the whole plant to rebuild the highest-point marker. Expensive.
    pub fn recalculate_max_plant_position(&mut self) -> Option<GridPos> {
        self.height.recalculate(&self.grid)
    }

    pub fn set_hazard(&mut self, pos: GridPos, hazard: HazardId) -> bool {
        self.grid.set_hazard(pos, hazard)
    }

    pub fn remove_hazard(&mut self, pos: GridPos) -> Option<HazardId> {
        self.grid.remove_hazard(pos)
    }

    pub fn remove_hazard_from_all_nodes(&mut self, hazard: HazardId) -> Option<GridPos> {
        self.grid.remove_hazard_from_all_nodes(hazard)
    }

    pub fn consume_leaf(&mut self, pos: GridPos, amount: f32) -> Option<f32> {
        self.grid.consume_leaf(pos, amount)
    }

    /// Lands `hazard` on a random free leaf. Returns where it landed.
    pub fn land_hazard(&mut self, hazard: HazardId, rng: &mut impl Rng) -> Option<GridPos> {
        let pos = self.grid.random_leaf_node(rng)?;
        self.grid.set_hazard(pos, hazard).then_some(pos)
    }
}
