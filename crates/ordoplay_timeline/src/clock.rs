// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clock boundary between the host and the timeline.
//!
//! The timeline never measures time itself. The host reports one delta per
//! tick for each [`ClockMode`]; a timeline picks the one matching its mode.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Which host delta drives a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Frame delta multiplied by the host time scale
    #[default]
    Scaled,
    /// Fixed simulation step
    FixedStep,
    /// Real time, ignoring the time scale
    Unscaled,
}

impl ClockMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scaled => "Scaled",
            Self::FixedStep => "FixedStep",
            Self::Unscaled => "Unscaled",
        }
    }
}

/// Source of per-tick deltas, implemented by the host
pub trait Clock {
    /// Seconds elapsed during the current tick for the given mode
    fn delta(&self, mode: ClockMode) -> f32;
}

/// Clock whose deltas are set explicitly by the host every frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManualClock {
    /// Scaled frame delta
    pub scaled: f32,
    /// Fixed step delta
    pub fixed: f32,
    /// Unscaled frame delta
    pub unscaled: f32,
}

impl ManualClock {
    /// Clock reporting the same delta for every mode
    pub fn uniform(delta: f32) -> Self {
        Self {
            scaled: delta,
            fixed: delta,
            unscaled: delta,
        }
    }

    /// Record a new frame
    pub fn set_frame(&mut self, real_delta: f32, time_scale: f32, fixed_step: f32) {
        self.unscaled = real_delta;
        self.scaled = real_delta * time_scale;
        self.fixed = fixed_step;
    }
}

impl Clock for ManualClock {
    fn delta(&self, mode: ClockMode) -> f32 {
        match mode {
            ClockMode::Scaled => self.scaled,
            ClockMode::FixedStep => self.fixed,
            ClockMode::Unscaled => self.unscaled,
        }
    }
}

/// Host clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Clock mode for timelines created by the host
    pub mode: ClockMode,
    /// Target tick rate in ticks per second
    pub frame_rate: f32,
    /// Fixed step duration in seconds
    pub fixed_step: f32,
    /// Multiplier applied to scaled deltas
    pub time_scale: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            mode: ClockMode::Scaled,
            frame_rate: 60.0,
            fixed_step: 0.02,
            time_scale: 1.0,
        }
    }
}

impl ClockConfig {
    /// Nominal duration of one tick
    pub fn frame_delta(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            0.0
        }
    }

    /// Manual clock pre-filled with nominal deltas
    pub fn nominal_clock(&self) -> ManualClock {
        let mut clock = ManualClock::default();
        clock.set_frame(self.frame_delta(), self.time_scale, self.fixed_step);
        clock
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON
    pub fn from_ron(s: &str) -> Result<Self> {
        Ok(ron::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_modes() {
        let mut clock = ManualClock::default();
        clock.set_frame(0.1, 0.5, 0.02);
        assert_eq!(clock.delta(ClockMode::Unscaled), 0.1);
        assert_eq!(clock.delta(ClockMode::Scaled), 0.05);
        assert_eq!(clock.delta(ClockMode::FixedStep), 0.02);

        let uniform = ManualClock::uniform(0.25);
        assert_eq!(uniform.delta(ClockMode::Scaled), 0.25);
        assert_eq!(uniform.delta(ClockMode::FixedStep), 0.25);
    }

    #[test]
    fn test_config_partial_ron() {
        let config = ClockConfig::from_ron("(mode: FixedStep, fixed_step: 0.25)").unwrap();
        assert_eq!(config.mode, ClockMode::FixedStep);
        assert_eq!(config.fixed_step, 0.25);
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.nominal_clock().delta(ClockMode::FixedStep), 0.25);
    }

    #[test]
    fn test_config_serialization() {
        let config = ClockConfig {
            time_scale: 2.0,
            ..Default::default()
        };
        let ron_str = config.to_ron().unwrap();
        let loaded = ClockConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_parse_error() {
        let err = ClockConfig::from_ron("(mode: Sideways)").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
