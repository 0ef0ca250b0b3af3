//! Run-wide tunables shared by every level.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use waypoint_defence_core::DEFAULT_TICK_RATE_HZ;

use crate::ConfigurationError;

const DEFAULT_STARTING_CREDITS: u32 = 100;
const DEFAULT_STARTING_LIFEPOINTS: u32 = 20;
const DEFAULT_FAST_FORWARD_FACTOR: f32 = 2.0;

/// Starting economy and timing parameters of a run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rules {
    /// Credits available when a run starts.
    pub starting_credits: u32,
    /// Lifepoints available when a run starts.
    pub starting_lifepoints: u32,
    /// Multiplier applied to the tick delta while fast-forward is enabled.
    pub fast_forward_factor: f32,
    /// Fixed simulation rate in ticks per second.
    pub tick_rate_hz: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_credits: DEFAULT_STARTING_CREDITS,
            starting_lifepoints: DEFAULT_STARTING_LIFEPOINTS,
            fast_forward_factor: DEFAULT_FAST_FORWARD_FACTOR,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl Rules {
    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.starting_lifepoints == 0 {
            return Err(ConfigurationError::InvalidRules("starting_lifepoints"));
        }
        if !self.fast_forward_factor.is_finite() || self.fast_forward_factor < 1.0 {
            return Err(ConfigurationError::InvalidRules("fast_forward_factor"));
        }
        if self.tick_rate_hz == 0 {
            return Err(ConfigurationError::InvalidRules("tick_rate_hz"));
        }
        Ok(())
    }

    /// Real time covered by one tick at normal speed.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// Delta handed to the simulation for a tick of length `dt`.
    ///
    /// Whole-number factors scale without rounding, so a fast-forwarded base
    /// tick covers exactly that many base ticks.
    #[must_use]
    pub fn scale_delta(&self, dt: Duration, fast_forward: bool) -> Duration {
        if !fast_forward {
            return dt;
        }

        let factor = self.fast_forward_factor;
        if factor.fract() == 0.0 && factor >= 0.0 && factor <= u32::MAX as f32 {
            dt.checked_mul(factor as u32).unwrap_or(Duration::MAX)
        } else {
            dt.mul_f64(f64::from(factor))
        }
    }
}
