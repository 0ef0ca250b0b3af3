//! Authoritative tower state management and firing resolution.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{
    EnemyId, EnemySnapshot, Event, TileCoord, TowerId, TowerKind, TowerSnapshot, TowerView,
    WorldPoint,
};
use waypoint_defence_system_tower_targeting::TowerTargeting;

use crate::{
    catalogue::TowerStats,
    enemies::{DamageOutcome, EnemyRegistry},
    level::WaypointPath,
};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    id: TowerId,
    kind: TowerKind,
    tile: TileCoord,
    position: WorldPoint,
    stats: TowerStats,
    cooldown: Duration,
}

/// Registry that stores towers, tracks tile occupancy and allocates
/// identifiers.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    occupancy: BTreeMap<TileCoord, TowerId>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn is_occupied(&self, tile: TileCoord) -> bool {
        self.occupancy.contains_key(&tile)
    }

    /// Inserts a ready-to-fire tower on `tile`.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        tile: TileCoord,
        position: WorldPoint,
        stats: TowerStats,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));

        let _ = self.occupancy.insert(tile, id);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                tile,
                position,
                stats,
                cooldown: Duration::ZERO,
            },
        );
        id
    }

    /// Removes every tower, keeping identifiers monotonic.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.occupancy.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolves every shot fired during a tick of length `dt`.
    ///
    /// Towers act in identifier order. A tower fires at each instant within
    /// `[0, dt)` at which its cooldown reaches zero and an enemy is in range;
    /// without a target the cooldown stays at zero. Returns the credits earned
    /// from kills.
    pub(crate) fn fire(
        &mut self,
        dt: Duration,
        targeting: &TowerTargeting,
        enemies: &mut EnemyRegistry,
        path: &WaypointPath,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        let mut targets = enemies.snapshots(path);
        let mut earned = 0_u32;

        for tower in self.entries.values_mut() {
            let mut elapsed = Duration::ZERO;

            loop {
                if !tower.cooldown.is_zero() {
                    let left = dt.saturating_sub(elapsed);
                    if tower.cooldown >= left {
                        tower.cooldown -= left;
                        break;
                    }
                    elapsed += tower.cooldown;
                    tower.cooldown = Duration::ZERO;
                }

                let Some(target) = targeting.select(tower.position, tower.stats.range, &targets)
                else {
                    break;
                };

                out_events.push(Event::TowerFired {
                    tower: tower.id,
                    enemy: target,
                    damage: tower.stats.damage,
                });
                if let Some(DamageOutcome::Killed { bounty }) =
                    enemies.apply_damage(target, tower.stats.damage)
                {
                    tracing::debug!(
                        tower = tower.id.get(),
                        enemy = target.get(),
                        bounty,
                        "enemy killed"
                    );
                    out_events.push(Event::EnemyKilled {
                        enemy: target,
                        bounty,
                    });
                    earned = earned.saturating_add(bounty);
                    remove_target(&mut targets, target);
                }
                tower.cooldown = tower.stats.fire_interval;
            }
        }

        earned
    }

    /// Captures snapshots of every tower in identifier order.
    pub(crate) fn view(&self) -> TowerView {
        TowerView::from_snapshots(
            self.entries
                .values()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    kind: tower.kind,
                    tile: tower.tile,
                    position: tower.position,
                    range: tower.stats.range,
                    cooldown: tower.cooldown,
                })
                .collect(),
        )
    }
}

fn remove_target(targets: &mut Vec<EnemySnapshot>, enemy: EnemyId) {
    targets.retain(|snapshot| snapshot.id != enemy);
}
