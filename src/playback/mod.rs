pub mod clock;
pub mod controller;
pub mod engine;

pub use engine::{PlaybackEngine, PlaybackHandle};

use crate::core::step::step_at;
use crate::core::{StepDescriptor, STEPS, TERMINAL_STEP};
use std::time::Duration;
use thiserror::Error;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Playback configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub step_duration: Duration,  // time spent on each step
    pub tick_resolution: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step_duration: Duration::from_millis(Self::DEFAULT_STEP_DURATION_MS),
            tick_resolution: Duration::from_millis(Self::TICK_RESOLUTION_MS),
        }
    }
}

impl PlaybackConfig {
    pub const DEFAULT_STEP_DURATION_MS: u64 = 3000;
    pub const MIN_STEP_DURATION_MS: u64 = 1000;
    pub const MAX_STEP_DURATION_MS: u64 = 10_000;
    pub const TICK_RESOLUTION_MS: u64 = 50;

    /// Set the step duration, clamped to 1s..=10s
    pub fn with_step_duration(mut self, step_duration: Duration) -> Self {
        self.step_duration = step_duration.clamp(
            Duration::from_millis(Self::MIN_STEP_DURATION_MS),
            Duration::from_millis(Self::MAX_STEP_DURATION_MS),
        );
        self
    }
}

/// Where the walkthrough is and whether it is moving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub step_index: usize,
    pub elapsed: Duration,  // time spent in the current step
    pub playback: PlaybackState,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            step_index: 0,
            elapsed: Duration::ZERO,
            playback: PlaybackState::Stopped,
        }
    }
}

impl ControllerState {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// The step being shown
    pub fn step(&self) -> &'static StepDescriptor {
        step_at(self.step_index).unwrap_or(&STEPS[TERMINAL_STEP])
    }

    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }
}

/// What the engine publishes after every change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSnapshot {
    pub state: ControllerState,
    pub config: PlaybackConfig,
}

/// Errors from the playback control surface
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("playback engine is no longer running")]
    EngineClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_duration_clamped() {
        let config = PlaybackConfig::default();
        assert_eq!(config.step_duration, Duration::from_millis(3000));
        assert_eq!(config.tick_resolution, Duration::from_millis(50));

        let fast = config.with_step_duration(Duration::from_millis(10));
        assert_eq!(fast.step_duration, Duration::from_millis(1000));
        let slow = config.with_step_duration(Duration::from_secs(60));
        assert_eq!(slow.step_duration, Duration::from_millis(10_000));
        let custom = config.with_step_duration(Duration::from_millis(4500));
        assert_eq!(custom.step_duration, Duration::from_millis(4500));
    }

    #[test]
    fn test_initial_state() {
        let state = ControllerState::default();
        assert_eq!(state.step_index, 0);
        assert_eq!(state.elapsed_ms(), 0);
        assert_eq!(state.playback, PlaybackState::Stopped);
        assert_eq!(state.step().label, "Contract");
    }
}
