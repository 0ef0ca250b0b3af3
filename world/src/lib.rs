#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Waypoint Defence.
//!
//! [`GameState`] owns the level geometry, the wave controller, every enemy and
//! tower, the economy and the run status. Mutations arrive as
//! [`Command`] values, either applied immediately through [`apply`] or queued
//! with [`GameState::enqueue`] and flushed at the start of the next
//! [`GameState::update`]. Each tick runs the wave controller, enemy movement
//! and tower fire in that fixed order before evaluating loss, wave progression
//! and victory. Read access goes through the [`query`] module.

mod campaign;
mod catalogue;
mod enemies;
mod error;
mod level;
mod rules;
mod towers;

use std::{mem, time::Duration};

use waypoint_defence_core::{
    Command, EnemyKind, Event, InvalidPlacement, LastAction, RunStatus, TileCoord, TowerId,
    TowerKind, WELCOME_BANNER,
};
use waypoint_defence_system_spawning::{WaveAdvance, WaveController};
use waypoint_defence_system_tower_targeting::TowerTargeting;

pub use campaign::{Campaign, LevelDefinition};
pub use catalogue::{Catalogue, EnemyStats, TowerStats};
pub use error::ConfigurationError;
pub use level::{LevelModel, PathCursor, TileKind, Traversal, WaypointPath};
pub use rules::Rules;

use enemies::EnemyRegistry;
use towers::TowerRegistry;

/// Represents the authoritative Waypoint Defence game state.
#[derive(Debug)]
pub struct GameState {
    banner: &'static str,
    rules: Rules,
    campaign: Campaign,
    catalogue: Catalogue,
    targeting: TowerTargeting,
    level_index: usize,
    waves: WaveController,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    credits: u32,
    lifepoints: u32,
    status: RunStatus,
    paused: bool,
    fast_forward: bool,
    last_action: LastAction,
    pending: Vec<Command>,
    events: Vec<Event>,
}

impl GameState {
    /// Validates the static data and prepares an idle run on the first level.
    pub fn new(
        campaign: Campaign,
        catalogue: Catalogue,
        rules: Rules,
    ) -> Result<Self, ConfigurationError> {
        rules.validate()?;
        campaign.check_against(&catalogue)?;

        let waves = WaveController::new(campaign.first().waves().to_vec());
        let mut state = Self {
            banner: WELCOME_BANNER,
            rules,
            campaign,
            catalogue,
            targeting: TowerTargeting::new(),
            level_index: 0,
            waves,
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            credits: rules.starting_credits,
            lifepoints: rules.starting_lifepoints,
            status: RunStatus::Idle,
            paused: false,
            fast_forward: false,
            last_action: LastAction::None,
            pending: Vec::new(),
            events: Vec::new(),
        };
        state.announce_level();
        Ok(state)
    }

    /// Defers a command until the start of the next [`GameState::update`].
    pub fn enqueue(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Applies every queued command immediately.
    ///
    /// [`GameState::update`] does this first; callers that derive the tick
    /// delta from the state call it beforehand so toggles apply to the same
    /// tick.
    pub fn flush_commands(&mut self) {
        for command in mem::take(&mut self.pending) {
            self.execute(command);
        }
    }

    /// Advances the simulation by `dt`.
    ///
    /// Queued commands are applied first. The simulation itself only moves
    /// while the run is active and not paused. Deltas longer than
    /// [`Rules::tick_duration`] run as consecutive base ticks, so a
    /// fast-forwarded tick plays out exactly like the base ticks it covers.
    /// Fast-forward scaling is the caller's responsibility, see
    /// [`Rules::scale_delta`].
    pub fn update(&mut self, dt: Duration) {
        self.flush_commands();

        let base = self.rules.tick_duration();
        let mut remaining = dt;
        loop {
            if self.status != RunStatus::Running || self.paused {
                return;
            }

            let slice = if base.is_zero() {
                remaining
            } else {
                remaining.min(base)
            };
            remaining -= slice;
            self.step(slice);

            if remaining.is_zero() {
                return;
            }
        }
    }

    fn step(&mut self, dt: Duration) {
        let mut spawns = Vec::new();
        self.waves.update(dt, &mut spawns);
        for command in spawns {
            self.execute(command);
        }

        self.advance_enemies(dt);
        self.fire_towers(dt);
        self.check_progress();
    }

    /// Attempts to place a tower of `kind` on `tile`.
    ///
    /// On failure no state besides the last action changes. Success deducts
    /// the cost and inserts the tower in one step.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        tile: TileCoord,
    ) -> Result<TowerId, InvalidPlacement> {
        self.last_action = LastAction::PlaceTower(kind);

        match self.try_place(kind, tile) {
            Ok(tower) => {
                tracing::debug!(
                    ?kind,
                    ?tile,
                    tower = tower.get(),
                    credits = self.credits,
                    "tower placed"
                );
                self.events.push(Event::TowerPlaced { tower, kind, tile });
                Ok(tower)
            }
            Err(reason) => {
                tracing::debug!(?kind, ?tile, %reason, "tower placement rejected");
                self.events.push(Event::TowerPlacementRejected { kind, tile, reason });
                Err(reason)
            }
        }
    }

    fn try_place(&mut self, kind: TowerKind, tile: TileCoord) -> Result<TowerId, InvalidPlacement> {
        if self.status.is_terminal() {
            return Err(InvalidPlacement::RunFinished);
        }

        let layout = current_layout(&self.campaign, self.level_index);
        match layout.tile_kind(tile) {
            None => return Err(InvalidPlacement::OutOfBounds),
            Some(TileKind::Buildable) => {}
            Some(TileKind::Path | TileKind::Blocked) => {
                return Err(InvalidPlacement::NotBuildable)
            }
        }

        if self.towers.is_occupied(tile) {
            return Err(InvalidPlacement::Occupied);
        }

        let stats = *self.catalogue.tower(kind);
        if self.credits < stats.cost {
            return Err(InvalidPlacement::InsufficientCredits {
                cost: stats.cost,
                available: self.credits,
            });
        }

        self.credits -= stats.cost;
        Ok(self
            .towers
            .insert(kind, tile, layout.tile_center(tile), stats))
    }

    /// Records the tower kind the player picked for placement.
    pub fn select_tower(&mut self, kind: TowerKind) {
        self.last_action = LastAction::SelectTower(kind);
    }

    /// Clears the paused flag and starts an idle run.
    ///
    /// Finished runs stay finished until [`GameState::reset`].
    pub fn play(&mut self) {
        self.set_paused(false);
        if self.status == RunStatus::Idle {
            self.set_status(RunStatus::Running);
        }
    }

    /// Sets the paused flag.
    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    /// Enables the fast-forward multiplier.
    pub fn fast_forward_on(&mut self) {
        self.set_fast_forward(true);
    }

    /// Disables the fast-forward multiplier.
    pub fn fast_forward_off(&mut self) {
        self.set_fast_forward(false);
    }

    /// Reinitialises the run to level-one defaults and goes idle.
    pub fn reset(&mut self) {
        tracing::info!("resetting run");
        self.level_index = 0;
        self.waves = WaveController::new(self.campaign.first().waves().to_vec());
        self.enemies = EnemyRegistry::new();
        self.towers = TowerRegistry::new();
        self.credits = self.rules.starting_credits;
        self.lifepoints = self.rules.starting_lifepoints;
        self.set_paused(false);
        self.set_fast_forward(false);
        self.last_action = LastAction::None;
        self.set_status(RunStatus::Idle);
        self.announce_level();
    }

    /// Forces the idle status without touching progress.
    pub fn go_idle(&mut self) {
        self.set_paused(false);
        self.set_status(RunStatus::Idle);
    }

    /// Removes and returns every event reported so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    /// Credits available for tower placement.
    #[must_use]
    pub const fn credits(&self) -> u32 {
        self.credits
    }

    /// Lifepoints left before the run is lost.
    #[must_use]
    pub const fn lifepoints(&self) -> u32 {
        self.lifepoints
    }

    /// Overall status of the run.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether fast-forward is enabled.
    #[must_use]
    pub const fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    /// Most recent HUD-level action.
    #[must_use]
    pub const fn last_action(&self) -> LastAction {
        self.last_action
    }

    /// Run-wide tunables.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// One-based counter of the active level.
    #[must_use]
    pub fn level_number(&self) -> u32 {
        one_based(self.level_index)
    }

    /// One-based counter of the active wave, capped at the level's wave count.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        let count = u32::try_from(self.waves.wave_count()).unwrap_or(u32::MAX);
        self.waves.current_wave().saturating_add(1).min(count)
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.campaign.len()
    }

    /// Number of waves in the active level.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.wave_count()
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::PlaceTower { kind, tile } => {
                let _ = self.place_tower(kind, tile);
            }
            Command::SelectTower { kind } => self.select_tower(kind),
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::TogglePause => {
                self.last_action = LastAction::PlayPause;
                if self.paused || self.status == RunStatus::Idle {
                    self.play();
                } else {
                    self.pause();
                }
            }
            Command::FastForwardOn => self.fast_forward_on(),
            Command::FastForwardOff => self.fast_forward_off(),
            Command::ToggleFastForward => {
                self.last_action = LastAction::FastForward;
                self.set_fast_forward(!self.fast_forward);
            }
            Command::Reset => self.reset(),
            Command::GoIdle => self.go_idle(),
            Command::SpawnEnemy {
                kind,
                wave,
                head_start,
            } => self.spawn_enemy(kind, wave, head_start),
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, wave: u32, head_start: Duration) {
        let Some(stats) = self.catalogue.enemy(kind).copied() else {
            tracing::warn!(?kind, "ignoring spawn of an enemy kind without catalogue stats");
            return;
        };

        let path = current_layout(&self.campaign, self.level_index).path();
        let enemy = self.enemies.spawn(kind, wave, stats, path, head_start);
        tracing::trace!(enemy = enemy.get(), ?kind, wave, "enemy spawned");
        self.events.push(Event::EnemySpawned { enemy, kind, wave });
    }

    fn advance_enemies(&mut self, dt: Duration) {
        let path = current_layout(&self.campaign, self.level_index).path();
        for arrival in self.enemies.advance(path, dt) {
            self.lifepoints = self.lifepoints.saturating_sub(arrival.penalty);
            tracing::debug!(
                enemy = arrival.enemy.get(),
                penalty = arrival.penalty,
                lifepoints = self.lifepoints,
                "enemy reached the base"
            );
            self.events.push(Event::EnemyArrived {
                enemy: arrival.enemy,
                penalty: arrival.penalty,
            });
        }
    }

    fn fire_towers(&mut self, dt: Duration) {
        let path = current_layout(&self.campaign, self.level_index).path();
        let earned = self.towers.fire(
            dt,
            &self.targeting,
            &mut self.enemies,
            path,
            &mut self.events,
        );
        self.credits = self.credits.saturating_add(earned);
    }

    fn check_progress(&mut self) {
        if self.lifepoints == 0 {
            self.set_status(RunStatus::Lost);
            return;
        }

        if self.waves.level_complete() {
            if self.enemies.is_empty() {
                self.finish_level();
            }
            return;
        }

        let view = self
            .enemies
            .view(current_layout(&self.campaign, self.level_index).path());
        if !self.waves.wave_complete(&view) {
            return;
        }

        match self.waves.advance_wave() {
            WaveAdvance::Started { wave } => {
                let level = self.level_number();
                tracing::info!(level, wave = wave + 1, "wave started");
                self.events.push(Event::WaveStarted {
                    level,
                    wave: wave + 1,
                });
            }
            WaveAdvance::LevelComplete => {
                if self.enemies.is_empty() {
                    self.finish_level();
                }
            }
        }
    }

    fn finish_level(&mut self) {
        let next = self.level_index + 1;
        let Some(level) = self.campaign.level(next) else {
            self.set_status(RunStatus::Won);
            return;
        };

        self.waves = WaveController::new(level.waves().to_vec());
        self.level_index = next;
        self.towers.clear();
        self.announce_level();
    }

    fn announce_level(&mut self) {
        let level = self.level_number();
        tracing::info!(level, waves = self.waves.wave_count(), "level loaded");
        self.events.push(Event::LevelStarted { level });
        if !self.waves.level_complete() {
            self.events.push(Event::WaveStarted { level, wave: 1 });
        }
    }

    fn set_status(&mut self, to: RunStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        tracing::info!(?from, ?to, "run status changed");
        self.events.push(Event::StatusChanged { from, to });
    }

    fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            self.events.push(Event::PauseChanged { paused });
        }
    }

    fn set_fast_forward(&mut self, enabled: bool) {
        if self.fast_forward != enabled {
            self.fast_forward = enabled;
            self.events.push(Event::FastForwardChanged { enabled });
        }
    }
}

fn current_layout(campaign: &Campaign, index: usize) -> &LevelModel {
    campaign
        .level(index)
        .unwrap_or_else(|| campaign.first())
        .layout()
}

fn one_based(index: usize) -> u32 {
    u32::try_from(index).map_or(u32::MAX, |index| index.saturating_add(1))
}

/// Applies the provided command to the game state immediately.
///
/// Events produced by the command are appended to `out_events`; events that
/// were reported earlier stay buffered for [`GameState::drain_events`].
pub fn apply(state: &mut GameState, command: Command, out_events: &mut Vec<Event>) {
    let start = state.events.len();
    state.execute(command);
    out_events.extend(state.events.drain(start..));
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use waypoint_defence_core::{EnemyView, TowerView};

    use super::{current_layout, GameState, LevelModel};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(state: &GameState) -> &'static str {
        state.banner
    }

    /// Provides read-only access to the active level's geometry.
    #[must_use]
    pub fn level(state: &GameState) -> &LevelModel {
        current_layout(&state.campaign, state.level_index)
    }

    /// Captures a read-only view of the active enemies.
    #[must_use]
    pub fn enemy_view(state: &GameState) -> EnemyView {
        state.enemies.view(level(state).path())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(state: &GameState) -> TowerView {
        state.towers.view()
    }

    /// Number of enemies currently on the path.
    #[must_use]
    pub fn enemy_count(state: &GameState) -> usize {
        state.enemies.len()
    }

    /// Number of towers currently placed.
    #[must_use]
    pub fn tower_count(state: &GameState) -> usize {
        state.towers.len()
    }

    /// Number of commands waiting for the next update.
    #[must_use]
    pub fn pending_commands(state: &GameState) -> usize {
        state.pending.len()
    }
}
