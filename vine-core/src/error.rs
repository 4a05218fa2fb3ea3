use crate::types::GridPos;
use thiserror::Error;

/// Why a growth or upgrade request was turned down. The grid is untouched
/// whenever one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GrowthError {
    #[error("{0:?} is outside the grid")]
    OutOfBounds(GridPos),
    #[error("{0:?} is blocked by terrain")]
    Disabled(GridPos),
    #[error("no upward branch direction at the cursor")]
    NoDirection,
    #[error("{0:?} is not connected to the ground")]
    Disconnected(GridPos),
    #[error("{0:?} is already occupied")]
    Occupied(GridPos),
    #[error("no branch to upgrade at {0:?}")]
    MissingBranch(GridPos),
    #[error("leaves cannot root on the ground anchor {0:?}")]
    GroundAnchor(GridPos),
    #[error("not enough resources")]
    InsufficientResources,
}

impl GrowthError {
    /// The request was geometrically fine but could not be paid for.
    pub fn is_resource(&self) -> bool {
        matches!(self, GrowthError::InsufficientResources)
    }
}
