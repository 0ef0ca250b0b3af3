//! Ordered list of levels that make up a run.

use waypoint_defence_core::Wave;

use crate::{Catalogue, ConfigurationError, LevelModel};

/// Geometry and wave schedule of a single level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDefinition {
    layout: LevelModel,
    waves: Vec<Wave>,
}

impl LevelDefinition {
    /// Pairs a level layout with its waves.
    #[must_use]
    pub fn new(layout: LevelModel, waves: Vec<Wave>) -> Self {
        Self { layout, waves }
    }

    /// Static geometry of the level.
    #[must_use]
    pub const fn layout(&self) -> &LevelModel {
        &self.layout
    }

    /// Waves in the order they run.
    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }
}

/// Levels played one after another during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Campaign {
    levels: Vec<LevelDefinition>,
}

impl Campaign {
    /// Creates a campaign, rejecting empty level lists and unordered waves.
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, ConfigurationError> {
        if levels.is_empty() {
            return Err(ConfigurationError::NoLevels);
        }

        for (level_index, level) in levels.iter().enumerate() {
            if let Some(wave_index) = level.waves.iter().position(|wave| !wave.is_monotonic()) {
                return Err(ConfigurationError::UnorderedWave {
                    level: level_index + 1,
                    wave: wave_index + 1,
                });
            }
        }

        Ok(Self { levels })
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Campaigns always hold at least one level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at the provided zero-based index.
    #[must_use]
    pub fn level(&self, index: usize) -> Option<&LevelDefinition> {
        self.levels.get(index)
    }

    pub(crate) fn first(&self) -> &LevelDefinition {
        &self.levels[0]
    }

    /// Ensures every enemy kind spawned by a wave has catalogue stats.
    pub(crate) fn check_against(&self, catalogue: &Catalogue) -> Result<(), ConfigurationError> {
        let missing = self
            .levels
            .iter()
            .flat_map(|level| level.waves.iter())
            .flat_map(|wave| wave.spawns().iter())
            .map(|entry| entry.kind())
            .find(|kind| !catalogue.has_enemy(*kind));

        match missing {
            Some(kind) => Err(ConfigurationError::MissingEnemyStats(kind)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use waypoint_defence_core::{EnemyKind, SpawnEntry, WorldPoint};

    use super::*;
    use crate::{
        catalogue::tests::{all_towers, tower_stats},
        TileKind,
    };

    fn layout() -> LevelModel {
        LevelModel::new(
            1,
            1,
            32.0,
            vec![TileKind::Path],
            vec![WorldPoint::new(0.0, 16.0), WorldPoint::new(32.0, 16.0)],
        )
        .expect("valid layout")
    }

    fn spawn(kind: EnemyKind, offset_ms: u64) -> SpawnEntry {
        SpawnEntry::new(kind, Duration::from_millis(offset_ms))
    }

    #[test]
    fn empty_campaign_is_rejected() {
        assert_eq!(Campaign::new(Vec::new()), Err(ConfigurationError::NoLevels));
    }

    #[test]
    fn unordered_wave_is_reported_with_one_based_counters() {
        let levels = vec![
            LevelDefinition::new(layout(), vec![Wave::new(vec![spawn(EnemyKind::Math, 0)])]),
            LevelDefinition::new(
                layout(),
                vec![
                    Wave::default(),
                    Wave::new(vec![spawn(EnemyKind::Math, 500), spawn(EnemyKind::Math, 100)]),
                ],
            ),
        ];
        assert_eq!(
            Campaign::new(levels),
            Err(ConfigurationError::UnorderedWave { level: 2, wave: 2 })
        );
    }

    #[test]
    fn enemy_kinds_must_be_catalogued() {
        let campaign = Campaign::new(vec![LevelDefinition::new(
            layout(),
            vec![Wave::new(vec![spawn(EnemyKind::Economics, 0)])],
        )])
        .expect("valid campaign");
        let catalogue =
            Catalogue::new(BTreeMap::new(), all_towers(tower_stats(10))).expect("valid catalogue");

        assert_eq!(
            campaign.check_against(&catalogue),
            Err(ConfigurationError::MissingEnemyStats(EnemyKind::Economics))
        );
    }
}
