//! Fixed-step driver that feeds scripted input through the UI into the game.

use std::{fmt, thread, time::Duration};

use waypoint_defence_core::{Command, Event, RunStatus};
use waypoint_defence_system_screens::{Flow, ScreenContext, ScreenSet, UiState, UiStateMachine};
use waypoint_defence_world::{query, GameState};

use crate::script::InputScript;

/// Switches that alter how a session is driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SessionOptions {
    /// Enables fast-forward as soon as the run starts.
    pub(crate) fast_forward: bool,
    /// Sleeps one tick duration between updates.
    pub(crate) realtime: bool,
}

/// Game state plus the UI state machine driving it.
#[derive(Debug)]
pub(crate) struct Session {
    state: GameState,
    ui: UiStateMachine,
    script: InputScript,
    options: SessionOptions,
    kills: u32,
    arrivals: u32,
    game_time: Duration,
}

impl Session {
    pub(crate) fn new(state: GameState, script: InputScript, options: SessionOptions) -> Self {
        Self {
            state,
            ui: UiStateMachine::new(ScreenSet::keyboard()),
            script,
            options,
            kills: 0,
            arrivals: 0,
            game_time: Duration::ZERO,
        }
    }

    /// Runs at most `ticks` fixed steps.
    ///
    /// Stops early when the player quits, or when the run has finished and
    /// the script holds no further input.
    pub(crate) fn run(mut self, ticks: u64) -> Summary {
        let step = self.state.rules().tick_duration();
        let mut elapsed = 0;

        for tick in 0..ticks {
            if self.step(tick) == Flow::Quit {
                break;
            }
            elapsed = tick + 1;

            if self.state.status().is_terminal() && !self.script.has_remaining() {
                tracing::info!(tick, status = ?self.state.status(), "run finished");
                break;
            }
            if self.options.realtime {
                thread::sleep(step);
            }
        }

        self.summary(elapsed)
    }

    fn step(&mut self, tick: u64) -> Flow {
        let context = ScreenContext {
            tile_size: query::level(&self.state).tile_size(),
        };

        let mut commands = Vec::new();
        for input in self.script.take_due(tick) {
            tracing::debug!(tick, ?input, "scripted input");
            if self.ui.dispatch(input, &context, &mut commands) == Flow::Quit {
                return Flow::Quit;
            }
        }
        for command in commands {
            self.state.enqueue(command);
        }

        if self.options.fast_forward
            && self.state.status() == RunStatus::Running
            && !self.state.is_fast_forward()
        {
            self.state.enqueue(Command::FastForwardOn);
        }

        self.state.flush_commands();
        let rules = *self.state.rules();
        let dt = rules.scale_delta(rules.tick_duration(), self.state.is_fast_forward());
        if self.state.status() == RunStatus::Running && !self.state.is_paused() {
            self.game_time = self.game_time.saturating_add(dt);
        }
        self.state.update(dt);

        for event in self.state.drain_events() {
            match event {
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyArrived { .. } => self.arrivals += 1,
                Event::TowerPlacementRejected { kind, tile, reason } => {
                    tracing::info!(tick, ?kind, ?tile, %reason, "placement rejected");
                }
                Event::LevelStarted { level } => tracing::info!(tick, level, "level started"),
                Event::StatusChanged { from, to } => {
                    tracing::info!(tick, ?from, ?to, "status changed");
                }
                _ => tracing::trace!(tick, ?event, "event"),
            }
        }

        self.ui.observe(self.state.status(), self.state.is_paused());
        Flow::Continue
    }

    fn summary(&self, ticks: u64) -> Summary {
        Summary {
            status: self.state.status(),
            level: self.state.level_number(),
            levels: self.state.level_count(),
            wave: self.state.wave_number(),
            waves: self.state.wave_count(),
            credits: self.state.credits(),
            lifepoints: self.state.lifepoints(),
            towers: query::tower_count(&self.state),
            enemies: query::enemy_count(&self.state),
            kills: self.kills,
            arrivals: self.arrivals,
            ticks,
            game_time: self.game_time,
            screen: self.ui.state(),
        }
    }
}

/// Final report printed after a headless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) status: RunStatus,
    pub(crate) level: u32,
    pub(crate) levels: usize,
    pub(crate) wave: u32,
    pub(crate) waves: usize,
    pub(crate) credits: u32,
    pub(crate) lifepoints: u32,
    pub(crate) towers: usize,
    pub(crate) enemies: usize,
    pub(crate) kills: u32,
    pub(crate) arrivals: u32,
    pub(crate) ticks: u64,
    pub(crate) game_time: Duration,
    pub(crate) screen: UiState,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {:?}", self.status)?;
        writeln!(f, "level: {}/{}", self.level, self.levels)?;
        writeln!(f, "wave: {}/{}", self.wave, self.waves)?;
        writeln!(f, "credits: {}", self.credits)?;
        writeln!(f, "lifepoints: {}", self.lifepoints)?;
        writeln!(f, "towers: {}", self.towers)?;
        writeln!(f, "enemies: {}", self.enemies)?;
        writeln!(f, "kills: {}", self.kills)?;
        writeln!(f, "arrivals: {}", self.arrivals)?;
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(f, "game time: {:.2}s", self.game_time.as_secs_f64())?;
        write!(f, "screen: {:?}", self.screen)
    }
}
