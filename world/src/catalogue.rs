//! Attribute tables mapping enemy and tower kinds to their statistics.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{EnemyKind, TowerKind};

use crate::ConfigurationError;

/// Statistics shared by every enemy of one kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Hit points an enemy spawns with.
    pub max_health: u32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Credits awarded for a kill.
    pub bounty: u32,
    /// Lifepoints lost when the enemy reaches the base.
    pub penalty: u32,
}

/// Statistics shared by every tower of one kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Credits required to place the tower.
    pub cost: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage dealt per hit.
    pub damage: u32,
    /// Time between two consecutive shots.
    pub fire_interval: Duration,
}

/// Validated lookup table of enemy and tower statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalogue {
    enemies: BTreeMap<EnemyKind, EnemyStats>,
    towers: Vec<TowerStats>,
}

impl Catalogue {
    /// Validates the provided tables.
    ///
    /// Every tower kind must be present because the HUD offers all of them.
    /// Enemy kinds only need stats when a wave spawns them, which is checked
    /// when the campaign is paired with the catalogue.
    pub fn new(
        enemies: BTreeMap<EnemyKind, EnemyStats>,
        towers: BTreeMap<TowerKind, TowerStats>,
    ) -> Result<Self, ConfigurationError> {
        let mut enemies = enemies;
        for (kind, stats) in &mut enemies {
            if stats.max_health == 0 {
                return Err(ConfigurationError::ZeroMaxHealth(*kind));
            }
            if !stats.speed.is_finite() {
                return Err(ConfigurationError::NonFiniteStat("speed"));
            }
            if stats.speed < 0.0 {
                tracing::warn!(?kind, speed = stats.speed, "clamping negative enemy speed to zero");
                stats.speed = 0.0;
            }
        }

        let mut ordered = Vec::with_capacity(TowerKind::ALL.len());
        for kind in TowerKind::ALL {
            let Some(mut stats) = towers.get(&kind).copied() else {
                return Err(ConfigurationError::MissingTowerStats(kind));
            };
            if stats.fire_interval.is_zero() {
                return Err(ConfigurationError::ZeroFireInterval(kind));
            }
            if !stats.range.is_finite() {
                return Err(ConfigurationError::NonFiniteStat("range"));
            }
            if stats.range < 0.0 {
                tracing::warn!(?kind, range = stats.range, "clamping negative tower range to zero");
                stats.range = 0.0;
            }
            ordered.push(stats);
        }

        Ok(Self {
            enemies,
            towers: ordered,
        })
    }

    /// Statistics for an enemy kind, if known.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyStats> {
        self.enemies.get(&kind)
    }

    /// Statistics for a tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> &TowerStats {
        &self.towers[kind as usize]
    }

    /// Reports whether the catalogue knows the enemy kind.
    #[must_use]
    pub fn has_enemy(&self, kind: EnemyKind) -> bool {
        self.enemies.contains_key(&kind)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tower_stats(cost: u32) -> TowerStats {
        TowerStats {
            cost,
            range: 100.0,
            damage: 10,
            fire_interval: Duration::from_secs(1),
        }
    }

    pub(crate) fn all_towers(stats: TowerStats) -> BTreeMap<TowerKind, TowerStats> {
        TowerKind::ALL.into_iter().map(|kind| (kind, stats)).collect()
    }

    fn enemy_stats(speed: f32) -> EnemyStats {
        EnemyStats {
            max_health: 25,
            speed,
            bounty: 5,
            penalty: 5,
        }
    }

    #[test]
    fn missing_tower_kind_is_rejected() {
        let mut towers = all_towers(tower_stats(50));
        let _ = towers.remove(&TowerKind::Hardware);
        assert_eq!(
            Catalogue::new(BTreeMap::new(), towers),
            Err(ConfigurationError::MissingTowerStats(TowerKind::Hardware))
        );
    }

    #[test]
    fn zero_fire_interval_is_rejected() {
        let mut stats = tower_stats(50);
        stats.fire_interval = Duration::ZERO;
        assert_eq!(
            Catalogue::new(BTreeMap::new(), all_towers(stats)),
            Err(ConfigurationError::ZeroFireInterval(TowerKind::Math))
        );
    }

    #[test]
    fn zero_max_health_is_rejected() {
        let mut stats = enemy_stats(10.0);
        stats.max_health = 0;
        let enemies = BTreeMap::from([(EnemyKind::Code, stats)]);
        assert_eq!(
            Catalogue::new(enemies, all_towers(tower_stats(50))),
            Err(ConfigurationError::ZeroMaxHealth(EnemyKind::Code))
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let enemies = BTreeMap::from([(EnemyKind::Math, enemy_stats(f32::NAN))]);
        assert_eq!(
            Catalogue::new(enemies, all_towers(tower_stats(50))),
            Err(ConfigurationError::NonFiniteStat("speed"))
        );

        let mut stats = tower_stats(50);
        stats.range = f32::INFINITY;
        assert_eq!(
            Catalogue::new(BTreeMap::new(), all_towers(stats)),
            Err(ConfigurationError::NonFiniteStat("range"))
        );
    }

    #[test]
    fn negative_speed_and_range_are_clamped() {
        let enemies = BTreeMap::from([(EnemyKind::Math, enemy_stats(-3.0))]);
        let mut stats = tower_stats(50);
        stats.range = -1.0;
        let catalogue = Catalogue::new(enemies, all_towers(stats)).expect("valid catalogue");

        assert_eq!(catalogue.enemy(EnemyKind::Math).map(|s| s.speed), Some(0.0));
        assert_eq!(catalogue.tower(TowerKind::Theory).range, 0.0);
        assert!(!catalogue.has_enemy(EnemyKind::Social));
    }
}
