#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from enemy snapshots.
//!
//! Among the enemies inside a tower's Euclidean range the preferred target is
//! the one closest to the exit: fewest remaining waypoints first, then the
//! shortest distance to its next waypoint, then the earliest spawn. The order
//! is total, so identical inputs always select the same enemy.

use std::cmp::Ordering;

use waypoint_defence_core::{EnemyId, EnemySnapshot, WorldPoint};

/// Tower targeting system shared by every tower of the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Selects the enemy a tower at `origin` with the given `range` should hit.
    ///
    /// Returns `None` when no enemy lies within range. Non-positive or
    /// non-finite ranges never select a target.
    #[must_use]
    pub fn select<'a, I>(&self, origin: WorldPoint, range: f32, enemies: I) -> Option<EnemyId>
    where
        I: IntoIterator<Item = &'a EnemySnapshot>,
    {
        if !range.is_finite() || range < 0.0 {
            return None;
        }

        let max_distance_sq = range * range;
        let mut best: Option<Candidate> = None;

        for enemy in enemies {
            let dx = enemy.position.x() - origin.x();
            let dy = enemy.position.y() - origin.y();
            if dx * dx + dy * dy > max_distance_sq {
                continue;
            }

            let current = Candidate::from_snapshot(enemy);
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        best.map(|candidate| candidate.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    waypoints_remaining: u32,
    distance_to_waypoint: f32,
}

impl Candidate {
    fn from_snapshot(snapshot: &EnemySnapshot) -> Self {
        Self {
            id: snapshot.id,
            waypoints_remaining: snapshot.progress.waypoints_remaining,
            distance_to_waypoint: snapshot.progress.distance_to_waypoint,
        }
    }

    fn precedes(&self, other: &Self) -> bool {
        self.ordering(other) == Ordering::Less
    }

    fn ordering(&self, other: &Self) -> Ordering {
        self.waypoints_remaining
            .cmp(&other.waypoints_remaining)
            .then_with(|| {
                self.distance_to_waypoint
                    .total_cmp(&other.distance_to_waypoint)
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}
