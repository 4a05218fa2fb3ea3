//! Which nodes host a hazard. The actor layer owns the hazards themselves;
//! a node only remembers that one is sitting on it.

use crate::{
    grid::Grid,
    types::{GridPos, HazardId},
};

impl Grid {
    /// Places `hazard` on `pos`. Refused if `pos` is outside the grid or
    /// already hosts a hazard.
    pub fn set_hazard(&mut self, pos: GridPos, hazard: HazardId) -> bool {
        match self.node_mut(pos) {
            Some(node) if node.hazard.is_none() => {
                node.hazard = Some(hazard);
                true
            }
            _ => false,
        }
    }

    pub fn remove_hazard(&mut self, pos: GridPos) -> Option<HazardId> {
        self.node_mut(pos).and_then(|n| n.hazard.take())
    }

    /// Finds `hazard` wherever it sits and clears it, along with the leaf
    /// under it if that leaf has been eaten down to nothing.
    ///
    /// Linear in the size of the grid. Returns where the hazard was.
    pub fn remove_hazard_from_all_nodes(&mut self, hazard: HazardId) -> Option<GridPos> {
        let pos = self
            .iter()
            .find(|(_, n)| n.hazard == Some(hazard))
            .map(|(pos, _)| pos)?;
        let node = self.node_mut(pos)?;
        node.hazard = None;
        if node.leaf.is_some_and(|l| l.is_consumed()) {
            node.leaf = None;
        }
        Some(pos)
    }

    /// Clears every hazard sitting on a fully eaten leaf, and the leaf with
    /// it. Meant to run once per tick; returns the hazards released.
    pub fn remove_dead_leaf_bugs(&mut self) -> Vec<HazardId> {
        let dead: Vec<GridPos> = self
            .iter()
            .filter(|(_, n)| n.hazard.is_some() && n.leaf.is_some_and(|l| l.is_consumed()))
            .map(|(pos, _)| pos)
            .collect();

        let mut removed = Vec::with_capacity(dead.len());
        for pos in dead {
            if let Some(node) = self.node_mut(pos) {
                removed.extend(node.hazard.take());
                node.leaf = None;
            }
        }
        removed
    }
}
