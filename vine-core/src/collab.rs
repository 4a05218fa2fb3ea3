//! Capabilities the simulation consults but does not own.
//!
//! The game layer supplies these; the core never tracks currency, plays
//! audio, or queries physics on its own.

use crate::types::WorldRect;

/// Static terrain query. Only consulted while a grid is being built.
pub trait CollisionProbe {
    fn query_occupied(&self, rect: WorldRect) -> bool;
}

impl<F> CollisionProbe for F
where
    F: Fn(WorldRect) -> bool,
{
    fn query_occupied(&self, rect: WorldRect) -> bool {
        self(rect)
    }
}

/// Gatekeeper for everything growth costs.
///
/// The `can_*` methods are pure gates; the core only ever consumes upgrade
/// tokens itself, through [`ResourceAuthority::decrement_upgrade`].
pub trait ResourceAuthority {
    fn can_grow_branch(&self) -> bool;
    fn can_grow_leaf(&self) -> bool;
    fn can_upgrade(&self) -> bool;
    fn decrement_upgrade(&mut self);
    /// Tells the resource layer that an attempt failed for lack of resources.
    fn set_insufficient_flag(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    Grow,
    Upgrade,
    Error,
    Destroy,
}

/// Fire-and-forget notification sink.
pub trait SoundSink {
    fn play_sound(&mut self, id: SoundId);
}
