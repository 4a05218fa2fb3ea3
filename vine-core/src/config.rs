#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Edge length of one terrain tile in world units; sets the lattice spacing.
    pub tile_size: f32,
    /// Extra rows kept above the visible top so upward neighbor lookups stay in bounds.
    pub row_buffer: usize,
    /// Seconds between two destruction waves.
    pub propagation_delay: f32,
    /// Half width/height of the square probed around each node at construction.
    pub probe_half_extent: f32,
    /// Depth of the band probed below a ground anchor.
    pub ground_probe_depth: f32,
    /// Health a freshly grown leaf starts with.
    pub leaf_health: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_size: 48.0,
            row_buffer: 3,
            propagation_delay: 0.35,
            probe_half_extent: 2.0,
            ground_probe_depth: 12.0,
            leaf_health: 1.0,
        }
    }
}

impl Config {
    /// Distance between two neighboring columns.
    #[inline]
    pub fn horizontal_spacing(&self) -> f32 {
        self.tile_size / 3.0_f32.sqrt()
    }

    /// Distance between two rows of the same column.
    #[inline]
    pub fn vertical_spacing(&self) -> f32 {
        self.tile_size * 2.0 / 3.0
    }
}
