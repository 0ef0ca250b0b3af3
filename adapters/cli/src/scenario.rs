//! TOML scenario loading: rules, catalogue and campaign.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use waypoint_defence_core::{EnemyKind, SpawnEntry, TowerKind, Wave, WorldPoint};
use waypoint_defence_world::{
    Campaign, Catalogue, EnemyStats, GameState, LevelDefinition, LevelModel, Rules, TileKind,
    TowerStats,
};

const BUILTIN_SCENARIO: &str = include_str!("../scenarios/default.toml");

/// Fully validated static data of a run.
#[derive(Debug)]
pub(crate) struct Scenario {
    rules: Rules,
    catalogue: Catalogue,
    campaign: Campaign,
}

impl Scenario {
    /// Loads a scenario from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Scenario compiled into the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SCENARIO).context("invalid built-in scenario")
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;

        let mut enemies = BTreeMap::new();
        for (name, entry) in file.enemies {
            let kind = parse_enemy_kind(&name)?;
            let _ = enemies.insert(kind, entry.into_stats());
        }

        let mut towers = BTreeMap::new();
        for (name, entry) in file.towers {
            let kind = parse_tower_kind(&name)?;
            let _ = towers.insert(kind, entry.into_stats());
        }

        let catalogue = Catalogue::new(enemies, towers).context("invalid catalogue")?;

        let mut levels = Vec::with_capacity(file.levels.len());
        for (index, level) in file.levels.into_iter().enumerate() {
            let definition = level
                .into_definition()
                .with_context(|| format!("invalid level {}", index + 1))?;
            levels.push(definition);
        }
        let campaign = Campaign::new(levels).context("invalid campaign")?;

        Ok(Self {
            rules: file.rules,
            catalogue,
            campaign,
        })
    }

    /// Builds an idle game state from the scenario.
    pub(crate) fn into_game_state(self) -> Result<GameState> {
        GameState::new(self.campaign, self.catalogue, self.rules)
            .context("scenario does not describe a playable run")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    rules: Rules,
    #[serde(default)]
    enemies: BTreeMap<String, EnemyEntry>,
    towers: BTreeMap<String, TowerEntry>,
    levels: Vec<LevelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyEntry {
    max_health: u32,
    speed: f32,
    bounty: u32,
    penalty: u32,
}

impl EnemyEntry {
    fn into_stats(self) -> EnemyStats {
        EnemyStats {
            max_health: self.max_health,
            speed: self.speed,
            bounty: self.bounty,
            penalty: self.penalty,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TowerEntry {
    cost: u32,
    range: f32,
    damage: u32,
    fire_interval_ms: u64,
}

impl TowerEntry {
    fn into_stats(self) -> TowerStats {
        TowerStats {
            cost: self.cost,
            range: self.range,
            damage: self.damage,
            fire_interval: Duration::from_millis(self.fire_interval_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelEntry {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<String>,
    waypoints: Vec<[f32; 2]>,
    #[serde(default)]
    waves: Vec<WaveEntry>,
}

impl LevelEntry {
    fn into_definition(self) -> Result<LevelDefinition> {
        if self.tiles.len() != self.rows as usize {
            bail!(
                "level declares {} rows but lists {} tile rows",
                self.rows,
                self.tiles.len()
            );
        }

        let mut tiles = Vec::with_capacity(self.tiles.len() * self.columns as usize);
        for (row, line) in self.tiles.iter().enumerate() {
            let width = line.chars().count();
            if width != self.columns as usize {
                bail!(
                    "tile row {row} has {width} tiles but the level declares {} columns",
                    self.columns
                );
            }
            for symbol in line.chars() {
                tiles.push(parse_tile(symbol).with_context(|| format!("in tile row {row}"))?);
            }
        }

        let waypoints = self
            .waypoints
            .into_iter()
            .map(|[x, y]| WorldPoint::new(x, y))
            .collect();
        let layout = LevelModel::new(self.columns, self.rows, self.tile_size, tiles, waypoints)
            .context("invalid level layout")?;

        let mut waves = Vec::with_capacity(self.waves.len());
        for (index, wave) in self.waves.into_iter().enumerate() {
            let mut spawns = Vec::with_capacity(wave.spawns.len());
            for spawn in wave.spawns {
                let kind = parse_enemy_kind(&spawn.kind)
                    .with_context(|| format!("in wave {}", index + 1))?;
                spawns.push(SpawnEntry::new(kind, Duration::from_millis(spawn.offset_ms)));
            }
            waves.push(Wave::new(spawns));
        }

        Ok(LevelDefinition::new(layout, waves))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WaveEntry {
    spawns: Vec<SpawnFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpawnFile {
    kind: String,
    offset_ms: u64,
}

fn parse_tile(symbol: char) -> Result<TileKind> {
    match symbol {
        '.' => Ok(TileKind::Buildable),
        '#' => Ok(TileKind::Path),
        'x' => Ok(TileKind::Blocked),
        _ => bail!("unknown tile symbol `{symbol}`"),
    }
}

fn parse_enemy_kind(name: &str) -> Result<EnemyKind> {
    match name {
        "Math" => Ok(EnemyKind::Math),
        "Code" => Ok(EnemyKind::Code),
        "Economics" => Ok(EnemyKind::Economics),
        "Social" => Ok(EnemyKind::Social),
        "Hardware" => Ok(EnemyKind::Hardware),
        "Theory" => Ok(EnemyKind::Theory),
        _ => bail!("unknown enemy kind `{name}`"),
    }
}

fn parse_tower_kind(name: &str) -> Result<TowerKind> {
    match name {
        "Math" => Ok(TowerKind::Math),
        "Code" => Ok(TowerKind::Code),
        "Economics" => Ok(TowerKind::Economics),
        "Social" => Ok(TowerKind::Social),
        "Hardware" => Ok(TowerKind::Hardware),
        "Theory" => Ok(TowerKind::Theory),
        _ => bail!("unknown tower kind `{name}`"),
    }
}
