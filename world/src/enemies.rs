//! Authoritative enemy state: spawning, path traversal and damage.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{EnemyId, EnemyKind, EnemySnapshot, EnemyView, Health, WorldPoint};

use crate::{
    catalogue::EnemyStats,
    level::{PathCursor, WaypointPath},
};

/// Enemy travelling along the waypoint path.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    id: EnemyId,
    kind: EnemyKind,
    wave: u32,
    stats: EnemyStats,
    health: Health,
    cursor: PathCursor,
    position: WorldPoint,
    travelled: Duration,
    head_start: Option<Duration>,
}

/// Enemy that reached the final waypoint during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Arrival {
    pub(crate) enemy: EnemyId,
    pub(crate) penalty: u32,
}

/// Result of hitting an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The enemy survived the hit.
    Wounded,
    /// The enemy died and was removed; the bounty is owed to the player.
    Killed {
        /// Credits awarded for the kill.
        bounty: u32,
    },
}

/// Registry that stores active enemies and allocates identifiers in spawn
/// order.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Places a new enemy on the first waypoint.
    ///
    /// `head_start` limits how long the enemy travels during its first
    /// advance; later advances use the full tick.
    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        wave: u32,
        stats: EnemyStats,
        path: &WaypointPath,
        head_start: Duration,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));

        let previous = self.entries.insert(
            id,
            EnemyState {
                id,
                kind,
                wave,
                stats,
                health: Health::new(stats.max_health),
                cursor: PathCursor::START,
                position: path.start(),
                travelled: Duration::ZERO,
                head_start: Some(head_start),
            },
        );
        debug_assert!(previous.is_none(), "enemy identifiers are never reused");
        id
    }

    /// Moves every enemy along the path and removes those that arrived.
    ///
    /// Positions derive from the total time each enemy has travelled, so
    /// splitting the same span into more advances lands on the same spot.
    /// Arrivals are reported in identifier order.
    pub(crate) fn advance(&mut self, path: &WaypointPath, dt: Duration) -> Vec<Arrival> {
        let mut arrivals = Vec::new();

        for enemy in self.entries.values_mut() {
            let travel = enemy.head_start.take().map_or(dt, |head| head.min(dt));
            enemy.travelled = enemy.travelled.saturating_add(travel);
            let distance = f64::from(enemy.stats.speed) * enemy.travelled.as_secs_f64();
            let traversal = path.advance(PathCursor::START, distance as f32);
            enemy.cursor = traversal.cursor;
            enemy.position = traversal.position;

            if traversal.arrived {
                arrivals.push(Arrival {
                    enemy: enemy.id,
                    penalty: enemy.stats.penalty,
                });
            }
        }

        for arrival in &arrivals {
            let _ = self.entries.remove(&arrival.enemy);
        }

        arrivals
    }

    /// Subtracts `damage` from the enemy's health, clamping at zero.
    ///
    /// Returns `None` when the enemy is no longer active.
    pub(crate) fn apply_damage(&mut self, id: EnemyId, damage: u32) -> Option<DamageOutcome> {
        let enemy = self.entries.get_mut(&id)?;
        enemy.health = enemy.health.saturating_sub(damage);

        if enemy.health.is_zero() {
            let bounty = enemy.stats.bounty;
            let _ = self.entries.remove(&id);
            Some(DamageOutcome::Killed { bounty })
        } else {
            Some(DamageOutcome::Wounded)
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Captures snapshots of every active enemy in spawn order.
    pub(crate) fn snapshots(&self, path: &WaypointPath) -> Vec<EnemySnapshot> {
        self.entries
            .values()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                wave: enemy.wave,
                position: enemy.position,
                health: enemy.health,
                max_health: Health::new(enemy.stats.max_health),
                progress: path.progress(enemy.cursor),
            })
            .collect()
    }

    pub(crate) fn view(&self, path: &WaypointPath) -> EnemyView {
        EnemyView::from_snapshots(self.snapshots(path))
    }
}
