//! Core simulation of a climbing plant grown on a 2-D offset lattice.
//!
//! Players extend the plant upward branch by branch; cutting support makes
//! everything above it collapse, one hop per propagation delay.
//!
//! Main components:
//! - [`coords`]: world-space ↔ grid-index mapping for the brick-like lattice.
//! - [`grid`]: the node array, adjacency, leaves and construction-time terrain probing.
//! - [`connectivity`]: the support rule deciding where growth may start.
//! - [`growth`]: direction selection, branch/leaf growth and upgrades.
//! - [`destruction`]: the timer-gated, wave-by-wave collapse queue.
//! - [`height`]: the highest-point marker.
//! - [`hazard`]: which nodes host externally owned hazards.
//! - [`sim`]: [`sim::PlantSim`], the per-frame facade over all of the above.
//! - [`collab`]: capabilities the game layer injects (terrain, resources, sound).
//! - [`config`]: tunables for the lattice and the simulation.
//! - [`error`]: why growth requests are refused.
//! - [`types`]: shared value types.

pub mod collab;
pub mod config;
pub mod connectivity;
pub mod coords;
pub mod destruction;
pub mod error;
pub mod grid;
pub mod growth;
pub mod hazard;
pub mod height;
pub mod sim;
pub mod types;
