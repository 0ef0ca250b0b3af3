//! Static level geometry: tile grid and waypoint path.

use serde::{Deserialize, Serialize};
use waypoint_defence_core::{PathProgress, TileCoord, WorldPoint};

use crate::ConfigurationError;

/// Classification of a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Towers may be placed on the tile.
    Buildable,
    /// Enemies walk across the tile.
    Path,
    /// Scenery that accepts no towers.
    Blocked,
}

/// Immutable geometry of one level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelModel {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<TileKind>,
    path: WaypointPath,
}

impl LevelModel {
    /// Validates and assembles a level.
    ///
    /// `tiles` are laid out row by row and must contain exactly
    /// `columns * rows` entries.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: f32,
        tiles: Vec<TileKind>,
        waypoints: Vec<WorldPoint>,
    ) -> Result<Self, ConfigurationError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigurationError::EmptyGrid);
        }

        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| ConfigurationError::EmptyGrid)?;
        if tiles.len() != expected {
            return Err(ConfigurationError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }

        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(ConfigurationError::InvalidTileSize(tile_size));
        }

        let path = WaypointPath::new(waypoints)?;

        Ok(Self {
            columns,
            rows,
            tile_size,
            tiles,
            path,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a square tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Shared waypoint path enemies follow.
    #[must_use]
    pub const fn path(&self) -> &WaypointPath {
        &self.path
    }

    /// Kind of the tile, or `None` outside the grid.
    #[must_use]
    pub fn tile_kind(&self, tile: TileCoord) -> Option<TileKind> {
        self.index(tile).and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the terrain of `tile` accepts towers.
    ///
    /// Occupancy by existing towers is tracked by the tower registry.
    #[must_use]
    pub fn is_buildable(&self, tile: TileCoord) -> bool {
        self.tile_kind(tile) == Some(TileKind::Buildable)
    }

    /// Centre of `tile` in world units.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> WorldPoint {
        WorldPoint::new(
            (tile.column() as f32 + 0.5) * self.tile_size,
            (tile.row() as f32 + 0.5) * self.tile_size,
        )
    }

    /// Tile containing the world position, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, point: WorldPoint) -> Option<TileCoord> {
        if !point.x().is_finite() || !point.y().is_finite() || point.x() < 0.0 || point.y() < 0.0
        {
            return None;
        }

        let tile = TileCoord::new(
            (point.x() / self.tile_size) as u32,
            (point.y() / self.tile_size) as u32,
        );
        self.index(tile).map(|_| tile)
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.column() < self.columns && tile.row() < self.rows {
            let row = usize::try_from(tile.row()).ok()?;
            let column = usize::try_from(tile.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Position along the waypoint path: segment index plus distance travelled
/// inside that segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathCursor {
    segment: usize,
    offset: f32,
}

impl PathCursor {
    /// Cursor placed on the first waypoint.
    pub const START: Self = Self {
        segment: 0,
        offset: 0.0,
    };

    /// Index of the segment currently travelled.
    #[must_use]
    pub const fn segment(&self) -> usize {
        self.segment
    }

    /// Distance travelled inside the current segment.
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }
}

/// Result of moving a cursor along the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Traversal {
    /// Cursor after the move.
    pub cursor: PathCursor,
    /// World position after the move.
    pub position: WorldPoint,
    /// Whether the final waypoint was reached.
    pub arrived: bool,
}

/// Ordered, immutable polyline from the spawn to the base.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointPath {
    points: Vec<WorldPoint>,
    segment_lengths: Vec<f32>,
}

impl WaypointPath {
    /// Validates the waypoints and precomputes segment lengths.
    pub fn new(points: Vec<WorldPoint>) -> Result<Self, ConfigurationError> {
        if points.len() < 2 {
            return Err(ConfigurationError::PathTooShort(points.len()));
        }

        if let Some(index) = points
            .iter()
            .position(|point| !point.x().is_finite() || !point.y().is_finite())
        {
            return Err(ConfigurationError::NonFiniteWaypoint(index));
        }

        let segment_lengths = points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();

        Ok(Self {
            points,
            segment_lengths,
        })
    }

    /// Waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[WorldPoint] {
        &self.points
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn start(&self) -> WorldPoint {
        self.points[0]
    }

    /// Final waypoint, the base.
    #[must_use]
    pub fn end(&self) -> WorldPoint {
        self.points[self.points.len() - 1]
    }

    /// Total length of the path in world units.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.segment_lengths.iter().sum()
    }

    /// Moves `cursor` forward by `distance`, carrying leftover distance across
    /// waypoints so no waypoint is skipped and the total travelled distance
    /// does not depend on how the movement is split into ticks.
    #[must_use]
    pub fn advance(&self, cursor: PathCursor, distance: f32) -> Traversal {
        let mut remaining = if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        };
        let mut segment = cursor.segment;
        let mut offset = cursor.offset;

        while let Some(&length) = self.segment_lengths.get(segment) {
            let left = length - offset;
            if remaining < left {
                offset += remaining;
                let cursor = PathCursor { segment, offset };
                return Traversal {
                    cursor,
                    position: self.position(cursor),
                    arrived: false,
                };
            }

            remaining -= left.max(0.0);
            segment += 1;
            offset = 0.0;
        }

        Traversal {
            cursor: PathCursor {
                segment: self.segment_lengths.len(),
                offset: 0.0,
            },
            position: self.end(),
            arrived: true,
        }
    }

    /// World position of a cursor.
    #[must_use]
    pub fn position(&self, cursor: PathCursor) -> WorldPoint {
        let Some(&length) = self.segment_lengths.get(cursor.segment) else {
            return self.end();
        };
        let from = self.points[cursor.segment];
        let to = self.points[cursor.segment + 1];
        if length <= 0.0 {
            return from;
        }
        from.lerp(to, (cursor.offset / length).clamp(0.0, 1.0))
    }

    /// Remaining waypoints and distance to the next one for a cursor.
    #[must_use]
    pub fn progress(&self, cursor: PathCursor) -> PathProgress {
        let next_waypoint = cursor.segment.saturating_add(1).min(self.points.len());
        let waypoints_remaining = self.points.len() - next_waypoint;
        let distance_to_waypoint = self
            .segment_lengths
            .get(cursor.segment)
            .map_or(0.0, |length| (length - cursor.offset).max(0.0));

        PathProgress {
            waypoints_remaining: u32::try_from(waypoints_remaining).unwrap_or(u32::MAX),
            distance_to_waypoint,
        }
    }
}
