use crate::core::step::{is_terminal, TERMINAL_STEP};
use crate::playback::clock::{Clock, Tick};
use crate::playback::{ControllerState, PlaybackConfig, PlaybackState};
use crate::scenario::{ScenarioGenerator, ScenarioStore};
use std::time::Duration;
use tracing::{debug, info, trace};

/// What a tick did to the walkthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing, or left over from an earlier clock run
    Ignored,
    /// Time accumulated within the current step
    Progressed,
    /// Moved on to the given step
    Advanced(usize),
    /// The last step ran out and playback stopped
    Finished,
}

/// The walkthrough state machine.
///
/// Owns the controller state and the clock. Every mutation goes through
/// `&mut self`, so commands and ticks are applied one at a time by whoever
/// owns the controller (see [`crate::playback::PlaybackEngine`]).
pub struct PlaybackController<C: Clock> {
    state: ControllerState,
    config: PlaybackConfig,
    clock: C,
    store: ScenarioStore,
    generator: ScenarioGenerator,
}

impl<C: Clock> PlaybackController<C> {
    pub fn new(
        config: PlaybackConfig,
        clock: C,
        store: ScenarioStore,
        generator: ScenarioGenerator,
    ) -> Self {
        Self {
            state: ControllerState::default(),
            config,
            clock,
            store,
            generator,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    #[cfg(test)]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start or resume playback; restarts from the first step when sitting on
    /// the last one
    pub fn play(&mut self) {
        if self.state.playback == PlaybackState::Playing {
            return;
        }

        if is_terminal(self.state.step_index) {
            self.state.step_index = 0;
            self.state.elapsed = Duration::ZERO;
        }

        self.state.playback = PlaybackState::Playing;
        let epoch = self.clock.start();
        info!(step = self.state.step().label, epoch, "play");
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        if self.state.playback != PlaybackState::Playing {
            return;
        }

        self.clock.stop();
        self.state.playback = PlaybackState::Paused;
        info!(
            step = self.state.step().label,
            elapsed_ms = self.state.elapsed_ms(),
            "pause"
        );
    }

    /// Stop playback and jump to the last step
    pub fn stop(&mut self) {
        self.clock.stop();
        self.state = ControllerState {
            step_index: TERMINAL_STEP,
            elapsed: Duration::ZERO,
            playback: PlaybackState::Stopped,
        };
        info!("stop");
    }

    /// Restart from the first step with a freshly generated scenario
    pub fn replay(&mut self) {
        self.clock.stop();
        self.state.step_index = 0;
        self.state.elapsed = Duration::ZERO;

        let next = self.generator.generate(&self.store.current(), None);
        info!(transaction_id = next.transaction_id, "replay");
        self.store.replace(next);

        self.state.playback = PlaybackState::Playing;
        self.clock.start();
    }

    /// Change the step duration; applies to the step in progress
    pub fn set_step_duration(&mut self, step_duration: Duration) {
        self.config = self.config.with_step_duration(step_duration);
        info!(
            step_duration_ms = self.config.step_duration.as_millis() as u64,
            "step duration changed"
        );
    }

    /// Accept a tick from the clock, dropping it if it belongs to a run that
    /// has since been stopped
    pub fn deliver(&mut self, tick: Tick) -> TickOutcome {
        if !self.clock.is_running() || tick.epoch != self.clock.epoch() {
            trace!(
                tick_epoch = tick.epoch,
                clock_epoch = self.clock.epoch(),
                "discarding stale tick"
            );
            return TickOutcome::Ignored;
        }
        self.on_tick(tick.delta)
    }

    /// Account for `delta` of playing time.
    ///
    /// At most one step boundary is crossed per tick; time beyond the
    /// boundary is dropped.
    pub fn on_tick(&mut self, delta: Duration) -> TickOutcome {
        if self.state.playback != PlaybackState::Playing {
            return TickOutcome::Ignored;
        }

        self.state.elapsed = self.state.elapsed.saturating_add(delta);
        if self.state.elapsed < self.config.step_duration {
            trace!(elapsed_ms = self.state.elapsed_ms(), "tick");
            return TickOutcome::Progressed;
        }

        self.state.elapsed = Duration::ZERO;
        if self.state.step_index < TERMINAL_STEP {
            self.state.step_index += 1;
            debug!(
                step_index = self.state.step_index,
                step = self.state.step().label,
                "advanced"
            );
            TickOutcome::Advanced(self.state.step_index)
        } else {
            self.clock.stop();
            self.state.playback = PlaybackState::Stopped;
            info!("walkthrough complete");
            TickOutcome::Finished
        }
    }

    /// Release the clock
    pub fn shutdown(&mut self) {
        self.clock.stop();
    }
}
