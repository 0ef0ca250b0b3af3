#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave controller responsible for emitting enemy spawn commands.
//!
//! The controller owns the per-level spawn schedule. Each call to
//! [`WaveController::update`] advances the in-wave timer and emits one
//! [`Command::SpawnEnemy`] per scheduled entry whose offset has elapsed, in
//! declaration order. The world applies those commands; the controller never
//! touches enemy state directly and instead inspects an [`EnemyView`] to decide
//! whether a wave is complete.

use std::time::Duration;

use waypoint_defence_core::{Command, EnemyView, Wave};

/// Outcome of advancing the controller past a completed wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveAdvance {
    /// The next wave of the level became active.
    Started {
        /// Zero-based index of the wave that started.
        wave: u32,
    },
    /// The level has no waves left.
    LevelComplete,
}

/// Pure system that releases enemies according to the level's wave schedule.
#[derive(Clone, Debug)]
pub struct WaveController {
    waves: Vec<Wave>,
    wave_index: usize,
    elapsed: Duration,
    next_spawn: usize,
}

impl WaveController {
    /// Creates a controller positioned at the start of the first wave.
    #[must_use]
    pub fn new(waves: Vec<Wave>) -> Self {
        Self {
            waves,
            wave_index: 0,
            elapsed: Duration::ZERO,
            next_spawn: 0,
        }
    }

    /// Advances the in-wave timer and emits spawn commands for due entries.
    ///
    /// Every emitted command carries the time that passed between the entry's
    /// scheduled offset and the end of this update, so the spawned enemy only
    /// travels for that long during its first tick.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let Some(wave) = self.waves.get(self.wave_index) else {
            return;
        };

        self.elapsed = self.elapsed.saturating_add(dt);

        while let Some(entry) = wave.spawns().get(self.next_spawn) {
            if entry.offset() > self.elapsed {
                break;
            }

            let head_start = self.elapsed - entry.offset();
            tracing::trace!(
                wave = self.wave_index,
                entry = self.next_spawn,
                kind = ?entry.kind(),
                "releasing scheduled spawn"
            );
            out.push(Command::SpawnEnemy {
                kind: entry.kind(),
                wave: self.current_wave(),
                head_start: head_start.min(dt),
            });
            self.next_spawn += 1;
        }
    }

    /// Reports whether every entry of the current wave has been released.
    #[must_use]
    pub fn spawns_exhausted(&self) -> bool {
        self.waves
            .get(self.wave_index)
            .map_or(true, |wave| self.next_spawn >= wave.spawns().len())
    }

    /// Reports whether the current wave has released all entries and none of
    /// its enemies remain active.
    #[must_use]
    pub fn wave_complete(&self, enemies: &EnemyView) -> bool {
        if !self.spawns_exhausted() {
            return false;
        }

        let wave = self.current_wave();
        !enemies.iter().any(|enemy| enemy.wave == wave)
    }

    /// Moves on to the next wave definition, resetting timer and spawn pointer.
    pub fn advance_wave(&mut self) -> WaveAdvance {
        if self.wave_index < self.waves.len() {
            self.wave_index += 1;
        }
        self.elapsed = Duration::ZERO;
        self.next_spawn = 0;

        if self.level_complete() {
            WaveAdvance::LevelComplete
        } else {
            WaveAdvance::Started {
                wave: self.current_wave(),
            }
        }
    }

    /// Reports whether the level has no wave left to run.
    #[must_use]
    pub fn level_complete(&self) -> bool {
        self.wave_index >= self.waves.len()
    }

    /// Zero-based index of the active wave.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        u32::try_from(self.wave_index).unwrap_or(u32::MAX)
    }

    /// Number of waves scheduled for the level.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Time elapsed since the active wave started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Index of the next entry the active wave will release.
    #[must_use]
    pub fn next_spawn_index(&self) -> usize {
        self.next_spawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{EnemyKind, SpawnEntry};

    fn wave(offsets_ms: &[u64]) -> Wave {
        Wave::new(
            offsets_ms
                .iter()
                .map(|offset| SpawnEntry::new(EnemyKind::Math, Duration::from_millis(*offset)))
                .collect(),
        )
    }

    #[test]
    fn empty_schedule_is_complete_immediately() {
        let mut controller = WaveController::new(Vec::new());
        let mut out = Vec::new();
        controller.update(Duration::from_secs(1), &mut out);

        assert!(out.is_empty());
        assert!(controller.level_complete());
        assert!(controller.spawns_exhausted());
        assert_eq!(controller.elapsed(), Duration::ZERO);
    }

    #[test]
    fn head_start_never_exceeds_tick() {
        let mut controller = WaveController::new(vec![wave(&[0, 250])]);
        let mut out = Vec::new();
        controller.update(Duration::from_millis(500), &mut out);

        let head_starts: Vec<_> = out
            .iter()
            .map(|command| match command {
                Command::SpawnEnemy { head_start, .. } => *head_start,
                other => panic!("unexpected command {other:?}"),
            })
            .collect();
        assert_eq!(
            head_starts,
            vec![Duration::from_millis(500), Duration::from_millis(250)]
        );
    }

    #[test]
    fn advancing_past_last_wave_reports_level_complete() {
        let mut controller = WaveController::new(vec![wave(&[0]), wave(&[0])]);
        assert_eq!(controller.advance_wave(), WaveAdvance::Started { wave: 1 });
        assert_eq!(controller.advance_wave(), WaveAdvance::LevelComplete);
        assert_eq!(controller.advance_wave(), WaveAdvance::LevelComplete);
        assert_eq!(controller.current_wave(), 2);
    }
}
