//! Tick sources for the playback controller.
//!
//! A clock only decides *when* ticks happen. Ticks are stamped with the epoch
//! of the run that produced them so a consumer can drop ticks left over from
//! a run that has since been stopped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// One timing pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u64,
    pub delta: Duration,
}

/// A periodic tick source that can be started and stopped
pub trait Clock: Send {
    /// Begin ticking and return the epoch of the run. Starting a running
    /// clock keeps the current run.
    fn start(&mut self) -> u64;

    /// Cancel future ticks. No-op when already stopped.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Epoch of the latest run
    fn epoch(&self) -> u64;
}

/// Clock backed by a tokio interval task.
///
/// Ticks go into a bounded channel; the task waits on a full channel rather
/// than dropping or bunching pulses. The task is aborted on `stop` and when
/// the clock is dropped.
pub struct IntervalClock {
    resolution: Duration,
    ticks: mpsc::Sender<Tick>,
    task: Option<JoinHandle<()>>,
    epoch: u64,
}

impl IntervalClock {
    pub fn new(resolution: Duration, ticks: mpsc::Sender<Tick>) -> Self {
        Self {
            resolution,
            ticks,
            task: None,
            epoch: 0,
        }
    }
}

impl Clock for IntervalClock {
    fn start(&mut self) -> u64 {
        if self.task.is_some() {
            return self.epoch;
        }

        self.epoch += 1;
        let epoch = self.epoch;
        let resolution = self.resolution;
        let ticks = self.ticks.clone();

        self.task = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + resolution, resolution);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = Tick {
                    epoch,
                    delta: resolution,
                };
                if ticks.send(tick).await.is_err() {
                    break;
                }
            }
        }));

        debug!(epoch, resolution_ms = resolution.as_millis() as u64, "clock started");
        epoch
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(epoch = self.epoch, "clock stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Clock driven by hand, for exercising the controller without a runtime
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    running: bool,
    epoch: u64,
    pub starts: usize,
    pub stops: usize,
}

#[cfg(test)]
impl Clock for ManualClock {
    fn start(&mut self) -> u64 {
        if !self.running {
            self.running = true;
            self.epoch += 1;
            self.starts += 1;
        }
        self.epoch
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<Tick>) -> Vec<Tick> {
        let mut out = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            out.push(tick);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_clock_ticks_at_resolution() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(50), tx);

        let epoch = clock.start();
        assert_eq!(epoch, 1);
        assert!(clock.is_running());

        time::sleep(Duration::from_millis(175)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 3);
        assert!(ticks
            .iter()
            .all(|t| t.epoch == 1 && t.delta == Duration::from_millis(50)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_clock_stop_cancels_ticks() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(50), tx);

        clock.start();
        time::sleep(Duration::from_millis(120)).await;
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
        assert_eq!(drain(&mut rx).len(), 2);

        time::sleep(Duration::from_millis(500)).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_uses_new_epoch() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(50), tx);

        assert_eq!(clock.start(), 1);
        assert_eq!(clock.start(), 1);
        clock.stop();
        assert_eq!(clock.start(), 2);

        time::sleep(Duration::from_millis(60)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].epoch, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_clock_ends_task() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut clock = IntervalClock::new(Duration::from_millis(50), tx);
        clock.start();
        drop(clock);

        time::sleep(Duration::from_millis(200)).await;
        assert!(rx.recv().await.is_none());
    }
}
