//! Load-time validation failures.

use thiserror::Error;
use waypoint_defence_core::{EnemyKind, TowerKind};

/// Malformed or missing level, wave, catalogue, or rules data.
///
/// Raised only while constructing static data; a [`crate::GameState`] never
/// exists with data that failed these checks.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The level grid has no columns or no rows.
    #[error("level grid must have at least one column and one row")]
    EmptyGrid,
    /// The number of tiles does not match the grid dimensions.
    #[error("level grid expects {expected} tiles but {actual} were provided")]
    TileCountMismatch {
        /// Tiles implied by `columns * rows`.
        expected: usize,
        /// Tiles actually provided.
        actual: usize,
    },
    /// Tile size is zero, negative, or not finite.
    #[error("tile size {0} must be a positive finite number")]
    InvalidTileSize(f32),
    /// The waypoint path cannot describe a route.
    #[error("waypoint path needs at least two waypoints, found {0}")]
    PathTooShort(usize),
    /// A waypoint contains a non-finite coordinate.
    #[error("waypoint {0} has a non-finite coordinate")]
    NonFiniteWaypoint(usize),
    /// The campaign contains no levels.
    #[error("campaign must contain at least one level")]
    NoLevels,
    /// A wave lists spawn offsets out of order.
    #[error("wave {wave} of level {level} has decreasing spawn offsets")]
    UnorderedWave {
        /// One-based level counter.
        level: usize,
        /// One-based wave counter.
        wave: usize,
    },
    /// A wave references an enemy kind without catalogue stats.
    #[error("enemy kind {0:?} is used by a wave but missing from the catalogue")]
    MissingEnemyStats(EnemyKind),
    /// A tower kind has no catalogue stats.
    #[error("tower kind {0:?} is missing from the catalogue")]
    MissingTowerStats(TowerKind),
    /// An enemy kind spawns without hit points.
    #[error("enemy kind {0:?} must have a positive maximum health")]
    ZeroMaxHealth(EnemyKind),
    /// A tower kind cannot fire without a positive interval.
    #[error("tower kind {0:?} must have a positive fire interval")]
    ZeroFireInterval(TowerKind),
    /// A catalogue number is NaN or infinite.
    #[error("catalogue field `{0}` must be finite")]
    NonFiniteStat(&'static str),
    /// A rules value is out of range.
    #[error("rules field `{0}` is out of range")]
    InvalidRules(&'static str),
}
