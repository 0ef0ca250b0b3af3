#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game state, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values so
//! collaborators can react. Systems read immutable snapshots such as
//! [`EnemyView`] and [`TowerView`] and respond exclusively with new commands.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waypoint Defence.";

/// Fixed simulation rate targeted by adapters, in ticks per second.
pub const DEFAULT_TICK_RATE_HZ: u32 = 24;

/// Number of discrete stages used when presenting enemy health bars.
pub const HEALTH_BAR_STAGES: u8 = 10;

/// Types of enemies that waves may spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EnemyKind {
    /// Enemy themed after mathematics.
    Math,
    /// Enemy themed after programming.
    Code,
    /// Enemy themed after economics.
    Economics,
    /// Enemy themed after social sciences.
    Social,
    /// Enemy themed after hardware engineering.
    Hardware,
    /// Enemy themed after theoretical computer science.
    Theory,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 6] = [
        Self::Math,
        Self::Code,
        Self::Economics,
        Self::Social,
        Self::Hardware,
        Self::Theory,
    ];
}

/// Types of towers that can be constructed on buildable tiles.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TowerKind {
    /// Tower themed after mathematics.
    Math,
    /// Tower themed after programming.
    Code,
    /// Tower themed after economics.
    Economics,
    /// Tower themed after social sciences.
    Social,
    /// Tower themed after hardware engineering.
    Hardware,
    /// Tower themed after theoretical computer science.
    Theory,
}

impl TowerKind {
    /// Every tower kind in declaration order, matching the HUD hotkeys `1`-`6`.
    pub const ALL: [TowerKind; 6] = [
        Self::Math,
        Self::Code,
        Self::Economics,
        Self::Social,
        Self::Hardware,
        Self::Theory,
    ];

    /// Resolves the tower kind bound to a one-based HUD slot.
    #[must_use]
    pub fn from_slot(slot: u8) -> Option<Self> {
        let index = usize::from(slot.checked_sub(1)?);
        Self::ALL.get(index).copied()
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated in spawn order, so a smaller identifier always
/// denotes an earlier spawn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous position measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linearly interpolates towards `other` by `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: WorldPoint, t: f32) -> WorldPoint {
        WorldPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Hit points carried by an enemy.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit point count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Single scheduled spawn within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEntry {
    kind: EnemyKind,
    offset: Duration,
}

impl SpawnEntry {
    /// Creates a spawn entry for `kind` released `offset` after the wave starts.
    #[must_use]
    pub const fn new(kind: EnemyKind, offset: Duration) -> Self {
        Self { kind, offset }
    }

    /// Kind of enemy released by the entry.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Time after the wave start at which the enemy is released.
    #[must_use]
    pub const fn offset(&self) -> Duration {
        self.offset
    }
}

/// Ordered list of spawns released during one wave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    spawns: Vec<SpawnEntry>,
}

impl Wave {
    /// Creates a wave from spawn entries in declaration order.
    #[must_use]
    pub fn new(spawns: Vec<SpawnEntry>) -> Self {
        Self { spawns }
    }

    /// Spawn entries in declaration order.
    #[must_use]
    pub fn spawns(&self) -> &[SpawnEntry] {
        &self.spawns
    }

    /// Reports whether spawn offsets never decrease.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.spawns
            .windows(2)
            .all(|pair| pair[0].offset <= pair[1].offset)
    }
}

/// How far an enemy still is from the base.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathProgress {
    /// Waypoints the enemy has not reached yet, including the final one.
    pub waypoints_remaining: u32,
    /// Straight-line distance to the next waypoint in world units.
    pub distance_to_waypoint: f32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy, ordered by spawn time.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Zero-based index of the wave that spawned the enemy.
    pub wave: u32,
    /// Position of the enemy in world units.
    pub position: WorldPoint,
    /// Remaining hit points.
    pub health: Health,
    /// Hit points the enemy spawned with.
    pub max_health: Health,
    /// Progress along the waypoint path.
    pub progress: PathProgress,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of maximum health in `[0, 1]`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health.is_zero() {
            return 0.0;
        }
        (self.health.get() as f32 / self.max_health.get() as f32).clamp(0.0, 1.0)
    }

    /// Health bar stage in `0..HEALTH_BAR_STAGES` used by presentation layers.
    #[must_use]
    pub fn health_bar_stage(&self) -> u8 {
        let scaled = (self.health_fraction() * f32::from(HEALTH_BAR_STAGES)) as u8;
        scaled.min(HEALTH_BAR_STAGES - 1)
    }
}

/// Read-only snapshot describing all active enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// Centre of the tower in world units.
    pub position: WorldPoint,
    /// Targeting radius in world units.
    pub range: f32,
    /// Time until the tower may fire again.
    pub cooldown: Duration,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Overall status of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// No run in progress; the simulation does not advance.
    Idle,
    /// A run is in progress.
    Running,
    /// Every wave of every level was defeated.
    Won,
    /// Lifepoints dropped to zero.
    Lost,
}

impl RunStatus {
    /// Reports whether the status only changes again through a reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Discrete actions produced by screens that may change the UI mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserAction {
    /// Starts a fresh run.
    NewGame,
    /// Returns to the running game without resetting it.
    ResumeGame,
    /// Terminates the process.
    QuitGame,
    /// Returns to the main menu.
    MainMenu,
    /// Opens the in-game menu.
    IngameMenu,
    /// No mode change requested.
    None,
}

/// Most recent HUD-level action, retained for UI feedback only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastAction {
    /// Nothing happened since the last reset.
    None,
    /// A tower kind was selected for placement.
    SelectTower(TowerKind),
    /// A tower placement was attempted.
    PlaceTower(TowerKind),
    /// The pause state was changed.
    PlayPause,
    /// The fast-forward state was changed.
    FastForward,
}

/// Commands that express all permissible game state mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Requests placement of a tower on the provided tile.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Tile the tower should occupy.
        tile: TileCoord,
    },
    /// Records that the player selected a tower kind for placement.
    SelectTower {
        /// Kind of tower the player selected.
        kind: TowerKind,
    },
    /// Clears the paused flag and starts an idle run.
    Play,
    /// Sets the paused flag.
    Pause,
    /// Flips the paused flag.
    TogglePause,
    /// Enables the fast-forward multiplier.
    FastForwardOn,
    /// Disables the fast-forward multiplier.
    FastForwardOff,
    /// Flips the fast-forward flag.
    ToggleFastForward,
    /// Reinitialises the run to level-one defaults.
    Reset,
    /// Forces the idle status without resetting progress.
    GoIdle,
    /// Requests that an enemy enter the path start.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Zero-based wave index the enemy belongs to.
        wave: u32,
        /// Portion of the current tick the enemy may already travel.
        head_start: Duration,
    },
}

/// Events reported by the game state after processing commands and ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Wave that spawned the enemy.
        wave: u32,
    },
    /// Reports that an enemy ran out of health.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Credits awarded for the kill.
        bounty: u32,
    },
    /// Reports that an enemy reached the final waypoint.
    EnemyArrived {
        /// Identifier of the arriving enemy.
        enemy: EnemyId,
        /// Lifepoints deducted for the arrival.
        penalty: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Tile occupied by the tower.
        tile: TileCoord,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Tile provided in the placement request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: InvalidPlacement,
    },
    /// Reports that a tower hit an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage dealt by the hit.
        damage: u32,
    },
    /// Announces that a new wave began.
    WaveStarted {
        /// One-based level counter.
        level: u32,
        /// One-based wave counter within the level.
        wave: u32,
    },
    /// Announces that a new level was loaded.
    LevelStarted {
        /// One-based level counter.
        level: u32,
    },
    /// Announces a run status transition.
    StatusChanged {
        /// Status before the transition.
        from: RunStatus,
        /// Status after the transition.
        to: RunStatus,
    },
    /// Announces a change of the paused flag.
    PauseChanged {
        /// Whether the simulation is paused now.
        paused: bool,
    },
    /// Announces a change of the fast-forward flag.
    FastForwardChanged {
        /// Whether fast-forward is enabled now.
        enabled: bool,
    },
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum InvalidPlacement {
    /// The player cannot afford the tower.
    #[error("tower costs {cost} credits but only {available} are available")]
    InsufficientCredits {
        /// Price of the requested tower.
        cost: u32,
        /// Credits held at the time of the request.
        available: u32,
    },
    /// The tile lies outside the grid.
    #[error("tile lies outside the level grid")]
    OutOfBounds,
    /// The tile is part of the path or otherwise not buildable.
    #[error("tile is not buildable")]
    NotBuildable,
    /// Another tower already occupies the tile.
    #[error("tile is already occupied by a tower")]
    Occupied,
    /// The run already ended.
    #[error("the run has already finished")]
    RunFinished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    fn snapshot(health: u32, max_health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(1),
            kind: EnemyKind::Math,
            wave: 0,
            position: WorldPoint::default(),
            health: Health::new(health),
            max_health: Health::new(max_health),
            progress: PathProgress {
                waypoints_remaining: 1,
                distance_to_waypoint: 0.0,
            },
        }
    }

    #[test]
    fn placement_rejection_round_trips_through_bincode() {
        assert_round_trip(&Event::TowerPlacementRejected {
            kind: TowerKind::Code,
            tile: TileCoord::new(3, 4),
            reason: InvalidPlacement::InsufficientCredits {
                cost: 50,
                available: 40,
            },
        });
    }

    #[test]
    fn spawn_command_round_trips_through_bincode() {
        assert_round_trip(&Command::SpawnEnemy {
            kind: EnemyKind::Theory,
            wave: 2,
            head_start: std::time::Duration::from_millis(250),
        });
    }

    #[test]
    fn health_subtraction_clamps_at_zero() {
        assert_eq!(Health::new(5).saturating_sub(9), Health::new(0));
        assert!(Health::new(5).saturating_sub(5).is_zero());
    }

    #[test]
    fn health_bar_stage_covers_ten_buckets() {
        assert_eq!(snapshot(100, 100).health_bar_stage(), 9);
        assert_eq!(snapshot(95, 100).health_bar_stage(), 9);
        assert_eq!(snapshot(50, 100).health_bar_stage(), 5);
        assert_eq!(snapshot(9, 100).health_bar_stage(), 0);
        assert_eq!(snapshot(0, 100).health_bar_stage(), 0);
    }

    #[test]
    fn health_fraction_handles_zero_maximum() {
        assert_eq!(snapshot(0, 0).health_fraction(), 0.0);
        assert!((snapshot(25, 100).health_fraction() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn tower_slots_map_to_kinds() {
        assert_eq!(TowerKind::from_slot(1), Some(TowerKind::Math));
        assert_eq!(TowerKind::from_slot(6), Some(TowerKind::Theory));
        assert_eq!(TowerKind::from_slot(0), None);
        assert_eq!(TowerKind::from_slot(7), None);
    }

    #[test]
    fn wave_monotonicity_detects_out_of_order_offsets() {
        let ordered = Wave::new(vec![
            SpawnEntry::new(EnemyKind::Math, Duration::ZERO),
            SpawnEntry::new(EnemyKind::Code, Duration::ZERO),
            SpawnEntry::new(EnemyKind::Code, Duration::from_secs(1)),
        ]);
        assert!(ordered.is_monotonic());

        let unordered = Wave::new(vec![
            SpawnEntry::new(EnemyKind::Math, Duration::from_secs(2)),
            SpawnEntry::new(EnemyKind::Code, Duration::from_secs(1)),
        ]);
        assert!(!unordered.is_monotonic());
    }

    #[test]
    fn terminal_statuses_are_won_and_lost() {
        assert!(RunStatus::Won.is_terminal());
        assert!(RunStatus::Lost.is_terminal());
        assert!(!RunStatus::Idle.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }
}
