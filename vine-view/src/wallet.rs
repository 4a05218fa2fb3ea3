//! The viewer's stand-ins for the game's currency and audio layers.

use vine_core::collab::{ResourceAuthority, SoundId, SoundSink};

pub const BRANCH_COST: f32 = 1.0;
pub const LEAF_COST: f32 = 2.0;

/// Seeds regenerate over time and pay for growth; upgrade tokens are
/// spent by the simulation itself.
#[derive(Clone, Debug)]
pub struct Wallet {
    pub seeds: f32,
    pub max_seeds: f32,
    /// Seeds gained per second.
    pub seed_rate: f32,
    pub upgrades: u32,
    /// Seconds left on the "not enough" flash in the status bar.
    pub insufficient_flash: f32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            seeds: 10.0,
            max_seeds: 20.0,
            seed_rate: 0.5,
            upgrades: 3,
            insufficient_flash: 0.0,
        }
    }
}

impl Wallet {
    pub fn regenerate(&mut self, dt: f32) {
        self.seeds = (self.seeds + self.seed_rate * dt).min(self.max_seeds);
        self.insufficient_flash = (self.insufficient_flash - dt).max(0.0);
    }

    pub fn spend(&mut self, cost: f32) {
        self.seeds = (self.seeds - cost).max(0.0);
    }
}

impl ResourceAuthority for Wallet {
    fn can_grow_branch(&self) -> bool {
        self.seeds >= BRANCH_COST
    }

    fn can_grow_leaf(&self) -> bool {
        self.seeds >= LEAF_COST
    }

    fn can_upgrade(&self) -> bool {
        self.upgrades > 0
    }

    fn decrement_upgrade(&mut self) {
        self.upgrades = self.upgrades.saturating_sub(1);
    }

    fn set_insufficient_flag(&mut self) {
        self.insufficient_flash = 1.0;
    }
}

/// Logs every cue instead of playing it, and remembers the last one.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSounds {
    pub last: Option<SoundId>,
}

impl SoundSink for LogSounds {
    fn play_sound(&mut self, id: SoundId) {
        log::info!("sound cue: {id:?}");
        self.last = Some(id);
    }
}
