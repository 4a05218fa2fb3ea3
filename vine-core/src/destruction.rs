//! Delayed, wave-by-wave collapse of unsupported structure.
//!
//! The propagator has three states:
//! - **idle**: the queue is empty.
//! - **countdown**: entries are waiting and the shared timer is still positive.
//! - **draining**: the timer ran out; one wave is processed on this tick.
//!
//! A wave only destroys what was queued before it started. Nodes that lose
//! support while it runs are queued for the *next* wave, which re-arms the
//! timer, so collapse travels one hop per [`crate::config::Config::propagation_delay`].

use crate::{
    collab::{SoundId, SoundSink},
    grid::{Grid, adjacent_node_position},
    types::{Direction, GridPos, HazardId},
};

#[derive(Clone, Debug)]
pub struct DestructionPropagator {
    queue: Vec<GridPos>,
    timer: f32,
    delay: f32,
    waves: u64,
}

impl DestructionPropagator {
    pub fn new(delay: f32) -> Self {
        Self {
            queue: Vec::with_capacity(16),
            timer: 0.0,
            delay,
            waves: 0,
        }
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn set_delay(&mut self, delay: f32) {
        self.delay = delay;
    }

    /// Coordinates waiting for the next wave, oldest first.
    pub fn pending(&self) -> &[GridPos] {
        &self.queue
    }

    /// Number of waves drained since construction.
    pub fn waves_drained(&self) -> u64 {
        self.waves
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Seconds left before the next wave drains.
    pub fn time_remaining(&self) -> f32 {
        self.timer.max(0.0)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.timer = 0.0;
    }

    /// Schedules `pos` for destruction and re-arms the shared timer to the
    /// full delay.
    ///
    /// A coordinate already waiting is not pushed again, so a drain pass
    /// never visits the same node twice even when it loses support from two
    /// sides in one wave. The timer is re-armed either way.
    pub fn queue_destruction(&mut self, pos: GridPos) {
        if !self.queue.contains(&pos) {
            self.queue.push(pos);
        }
        self.timer = self.delay;
    }

    /// Advances the timer by `dt` and, once it has run out, drains one wave.
    ///
    /// A drain works on a snapshot of the queue:
    ///
    /// 1. Copies the coordinates queued so far.
    /// 2. For each one, calls [`DestructionPropagator::destroy_node_recursively`],
    ///    then drops it from the live queue.
    /// 3. Neighbors queued during step 2 stay for the next wave, which the
    ///    re-armed timer holds back for another full delay.
    ///
    /// ### Parameters
    /// - `grid` - Lattice to remove structure from.
    /// - `dt` - Elapsed seconds since the previous call.
    /// - `sounds` - Receives one [`SoundId::Destroy`] per cleared node.
    ///
    /// ### Returns
    /// The hazards removed by this wave; empty while idle or counting down.
    pub fn propagate_destruction(
        &mut self,
        grid: &mut Grid,
        dt: f32,
        sounds: &mut impl SoundSink,
    ) -> Vec<HazardId> {
        self.timer -= dt;
        let mut removed = Vec::new();
        if self.queue.is_empty() || self.timer > 0.0 {
            return removed;
        }

        self.waves += 1;
        let wave = self.queue.clone();
        for pos in &wave {
            self.destroy_node_recursively(grid, *pos, sounds, &mut removed);
            if let Some(i) = self.queue.iter().position(|p| p == pos) {
                self.queue.remove(i);
            }
        }

        log::debug!(
            "destruction wave: {} nodes, {} hazards freed, {} queued next",
            wave.len(),
            removed.len(),
            self.queue.len()
        );
        removed
    }

    /// Clears the node at `pos` and queues every neighbor that its removed
    /// branches leave without support.
    ///
    /// Hazards found on the node are pushed onto `removed`. Does nothing for
    /// positions outside the grid or nodes without structure.
    pub fn destroy_node_recursively(
        &mut self,
        grid: &mut Grid,
        pos: GridPos,
        sounds: &mut impl SoundSink,
        removed: &mut Vec<HazardId>,
    ) {
        let Some(node) = grid.node_mut(pos) else {
            return;
        };
        if node.is_empty() {
            return;
        }

        if let Some(hazard) = node.hazard.take() {
            removed.push(hazard);
        }
        node.leaf = None;

        for dir in Direction::ALL {
            if grid.remove_branch(pos, dir).is_none() {
                continue;
            }
            let neighbor = adjacent_node_position(pos, dir);
            if !grid.can_grow_at_grid_position(neighbor) {
                self.queue_destruction(neighbor);
            }
        }

        log::trace!("destroyed node {pos:?}");
        sounds.play_sound(SoundId::Destroy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        grid::Leaf,
        growth::tests::Recorder,
        types::{BranchType, LeafType, WorldRect},
    };
    use glam::Vec2;

    const DELAY: f32 = 0.5;

    fn open_grid(width: usize, height: usize) -> Grid {
        Grid::with_dimensions(width, height, Vec2::ZERO, &Config::default(), &|_: WorldRect| false)
    }

    fn stalk(grid: &mut Grid, col: i32, len: i32) {
        for row in 0..len {
            assert!(grid.set_branch(GridPos::new(col, row), Direction::Middle, BranchType::Normal));
        }
    }

    #[test]
    fn idle_propagator_does_nothing() {
        let mut grid = open_grid(4, 4);
        stalk(&mut grid, 0, 2);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();

        assert!(prop.propagate_destruction(&mut grid, 10.0, &mut sounds).is_empty());
        assert_eq!(grid.branch_count(), 2);
        assert!(sounds.0.is_empty());
    }

    #[test]
    fn nothing_happens_while_counting_down() {
        let mut grid = open_grid(4, 4);
        stalk(&mut grid, 0, 2);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();

        prop.queue_destruction(GridPos::new(0, 0));
        let _ = prop.propagate_destruction(&mut grid, DELAY * 0.5, &mut sounds);
        assert_eq!(grid.branch_count(), 2);
        assert_eq!(prop.pending(), &[GridPos::new(0, 0)]);

        let _ = prop.propagate_destruction(&mut grid, DELAY * 0.5, &mut sounds);
        assert!(!grid.branch_exists(GridPos::new(0, 0), Direction::Middle));
        assert_eq!(prop.pending(), &[GridPos::new(0, 1)]);
        assert_eq!(sounds.0, vec![SoundId::Destroy]);
    }

    #[test]
    fn requeueing_rearms_without_duplicating() {
        let mut prop = DestructionPropagator::new(DELAY);
        let mut grid = open_grid(4, 4);
        let mut sounds = Recorder::default();

        prop.queue_destruction(GridPos::new(0, 0));
        let _ = prop.propagate_destruction(&mut grid, DELAY * 0.8, &mut sounds);
        prop.queue_destruction(GridPos::new(0, 0));
        prop.queue_destruction(GridPos::new(2, 0));

        assert_eq!(prop.pending(), &[GridPos::new(0, 0), GridPos::new(2, 0)]);
        assert_eq!(prop.time_remaining(), DELAY);
    }

    #[test]
    fn supported_neighbors_are_not_queued() {
        let mut grid = open_grid(6, 4);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();
        let mut removed = Vec::new();

        // (2,1) is held by (2,0) middle and by (1,0) right.
        assert!(grid.set_branch(GridPos::new(2, 0), Direction::Middle, BranchType::Normal));
        assert!(grid.set_branch(GridPos::new(0, 0), Direction::Right, BranchType::Normal));
        assert!(grid.set_branch(GridPos::new(1, 0), Direction::Right, BranchType::Normal));

        prop.destroy_node_recursively(&mut grid, GridPos::new(2, 0), &mut sounds, &mut removed);
        assert!(prop.is_idle());
        assert!(grid.can_grow_at_grid_position(GridPos::new(2, 1)));
    }

    #[test]
    fn destroying_clears_leaf_and_reports_hazard() {
        let mut grid = open_grid(4, 4);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();
        let mut removed = Vec::new();
        let pos = GridPos::new(0, 1);

        {
            let node = grid.node_mut(pos).unwrap();
            node.leaf = Some(Leaf {
                kind: LeafType::Normal,
                health: 1.0,
                width: 8.0,
            });
            node.hazard = Some(HazardId(9));
        }

        prop.destroy_node_recursively(&mut grid, pos, &mut sounds, &mut removed);
        assert_eq!(removed, vec![HazardId(9)]);
        assert!(grid.leaf(pos).is_none());
        assert!(grid.node(pos).unwrap().hazard().is_none());
    }

    #[test]
    fn empty_and_out_of_bounds_nodes_are_ignored() {
        let mut grid = open_grid(4, 4);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();
        let mut removed = Vec::new();

        prop.destroy_node_recursively(&mut grid, GridPos::new(1, 1), &mut sounds, &mut removed);
        prop.destroy_node_recursively(&mut grid, GridPos::new(-3, 9), &mut sounds, &mut removed);
        assert!(sounds.0.is_empty());
        assert!(removed.is_empty());
    }

    #[test]
    fn one_wave_never_cascades_past_one_hop() {
        let mut grid = open_grid(4, 6);
        stalk(&mut grid, 0, 4);
        let mut prop = DestructionPropagator::new(DELAY);
        let mut sounds = Recorder::default();

        prop.queue_destruction(GridPos::new(0, 0));
        let _ = prop.propagate_destruction(&mut grid, DELAY, &mut sounds);

        assert_eq!(grid.branch_count(), 3);
        assert_eq!(prop.pending(), &[GridPos::new(0, 1)]);
        assert_eq!(prop.time_remaining(), DELAY);
    }
}
