use crate::playback::clock::{IntervalClock, Tick};
use crate::playback::controller::{PlaybackController, TickOutcome};
use crate::playback::{ControllerState, PlaybackConfig, PlaybackError, PlaybackSnapshot};
use crate::scenario::{ScenarioGenerator, ScenarioStore};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Pending user commands
const COMMAND_QUEUE_SIZE: usize = 32;

/// Ticks buffered between the clock task and the engine
const TICK_QUEUE_SIZE: usize = 8;

#[derive(Debug, Clone, Copy)]
enum Command {
    Play,
    Pause,
    Stop,
    Replay,
    SetStepDuration(Duration),
}

enum Control {
    Apply(Command, oneshot::Sender<ControllerState>),
    Shutdown,
}

/// Runs the playback controller on its own task.
///
/// Commands and clock ticks arrive on two queues drained by a single loop,
/// so the controller sees exactly one of them at a time. Commands win when
/// both are ready. The clock lives inside the controller and is released
/// when the loop ends.
pub struct PlaybackEngine {
    controller: PlaybackController<IntervalClock>,
    commands: mpsc::Receiver<Control>,
    ticks: mpsc::Receiver<Tick>,
    snapshots: watch::Sender<PlaybackSnapshot>,
}

impl PlaybackEngine {
    /// Start the engine task
    pub fn spawn(
        config: PlaybackConfig,
        store: ScenarioStore,
        generator: ScenarioGenerator,
    ) -> (PlaybackHandle, JoinHandle<()>) {
        let (tick_tx, ticks) = mpsc::channel(TICK_QUEUE_SIZE);
        let (command_tx, commands) = mpsc::channel(COMMAND_QUEUE_SIZE);

        let clock = IntervalClock::new(config.tick_resolution, tick_tx);
        let controller = PlaybackController::new(config, clock, store, generator);
        let (snapshots, snapshot_rx) = watch::channel(PlaybackSnapshot {
            state: controller.state(),
            config: controller.config(),
        });

        let engine = Self {
            controller,
            commands,
            ticks,
            snapshots,
        };
        let task = tokio::spawn(engine.run());

        let handle = PlaybackHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(self) {
        let Self {
            mut controller,
            mut commands,
            mut ticks,
            snapshots,
        } = self;
        debug!("playback engine running");

        loop {
            tokio::select! {
                biased;

                control = commands.recv() => match control {
                    Some(Control::Apply(command, ack)) => {
                        match command {
                            Command::Play => controller.play(),
                            Command::Pause => controller.pause(),
                            Command::Stop => controller.stop(),
                            Command::Replay => controller.replay(),
                            Command::SetStepDuration(duration) => {
                                controller.set_step_duration(duration)
                            }
                        }
                        publish(&snapshots, &controller);
                        // Caller may have stopped waiting
                        let _ = ack.send(controller.state());
                    }
                    Some(Control::Shutdown) | None => break,
                },

                Some(tick) = ticks.recv() => {
                    if controller.deliver(tick) != TickOutcome::Ignored {
                        publish(&snapshots, &controller);
                    }
                }
            }
        }

        controller.shutdown();
        debug!("playback engine stopped");
    }
}

fn publish(
    snapshots: &watch::Sender<PlaybackSnapshot>,
    controller: &PlaybackController<IntervalClock>,
) {
    let next = PlaybackSnapshot {
        state: controller.state(),
        config: controller.config(),
    };
    snapshots.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

/// Control surface for a running [`PlaybackEngine`].
///
/// Each command resolves once the engine has applied it; by then any clock
/// run it stopped delivers nothing further.
#[derive(Clone)]
pub struct PlaybackHandle {
    commands: mpsc::Sender<Control>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
}

impl PlaybackHandle {
    pub async fn play(&self) -> Result<ControllerState, PlaybackError> {
        self.request(Command::Play).await
    }

    pub async fn pause(&self) -> Result<ControllerState, PlaybackError> {
        self.request(Command::Pause).await
    }

    pub async fn stop(&self) -> Result<ControllerState, PlaybackError> {
        self.request(Command::Stop).await
    }

    pub async fn replay(&self) -> Result<ControllerState, PlaybackError> {
        self.request(Command::Replay).await
    }

    pub async fn set_step_duration(
        &self,
        step_duration: Duration,
    ) -> Result<ControllerState, PlaybackError> {
        self.request(Command::SetStepDuration(step_duration)).await
    }

    /// Latest published state
    pub fn state(&self) -> ControllerState {
        self.snapshots.borrow().state
    }

    /// Latest published state and configuration
    pub fn snapshot(&self) -> PlaybackSnapshot {
        *self.snapshots.borrow()
    }

    /// Receive a notification on every state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Ask the engine to exit; pending commands queued before this still run
    pub async fn shutdown(&self) {
        // Already gone is fine
        let _ = self.commands.send(Control::Shutdown).await;
    }

    async fn request(&self, command: Command) -> Result<ControllerState, PlaybackError> {
        let (ack, applied) = oneshot::channel();
        self.commands
            .send(Control::Apply(command, ack))
            .await
            .map_err(|_| PlaybackError::EngineClosed)?;
        applied.await.map_err(|_| PlaybackError::EngineClosed)
    }
}
