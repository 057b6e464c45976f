//! Async driver for [`AlarmEngine`].
//!
//! [`spawn`] moves the engine into a tokio task that is its only writer.
//! Periodic ticks come from `tokio::time::interval`; user actions arrive
//! as [`Command`]s over an mpsc channel and are answered on a oneshot.
//! Observer events fan out on a broadcast channel. Saves run on the
//! blocking pool and the loop never waits for them.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::alarm::{Alarm, NewAlarm};
use crate::alert::{ActiveAlert, JobHandle};
use crate::clock::ClockSource;
use crate::engine::AlarmEngine;
use crate::error::{CoreError, Result, ValidationError};
use crate::events::{Event, TriggerEvent};
use crate::storage::DurableStore;
use crate::timer::SessionState;

const COMMAND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownCommand {
    Start(Duration),
    Pause,
    Resume,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchCommand {
    Start,
    Pause,
    Reset,
    Lap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownView {
    pub state: SessionState,
    pub remaining_ms: u64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwatchView {
    pub state: SessionState,
    pub elapsed_ms: u64,
    pub laps: Vec<u64>,
    pub display: String,
}

/// Requests handled by the engine task.
#[derive(Debug)]
pub enum Command {
    ListAlarms(Reply<Vec<Alarm>>),
    AddAlarm(NewAlarm, Reply<Alarm>),
    UpdateAlarm {
        id: String,
        edit: NewAlarm,
        reply: Reply<Result<Alarm, ValidationError>>,
    },
    RemoveAlarm {
        id: String,
        reply: Reply<Result<Alarm, ValidationError>>,
    },
    SetEnabled {
        id: String,
        enabled: bool,
        reply: Reply<Result<bool, ValidationError>>,
    },
    Dismiss(Reply<Option<TriggerEvent>>),
    /// `None` uses the configured delay.
    Snooze {
        delay: Option<Duration>,
        reply: Reply<Result<Option<JobHandle>, ValidationError>>,
    },
    TriggerTest {
        alarm_id: Option<String>,
        reply: Reply<Result<TriggerEvent, ValidationError>>,
    },
    ActiveAlert(Reply<Option<ActiveAlert>>),
    Countdown(CountdownCommand, Reply<Result<CountdownView, ValidationError>>),
    Stopwatch(StopwatchCommand, Reply<StopwatchView>),
    Shutdown(Reply<()>),
}

/// Cloneable handle to a running engine task.
#[derive(Debug, Clone)]
pub struct AlarmHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

/// Start driving `engine` on the current tokio runtime.
pub fn spawn(
    engine: AlarmEngine,
    clock: Arc<dyn ClockSource>,
    store: Arc<dyn DurableStore>,
) -> AlarmHandle {
    let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    let driver = Driver {
        engine,
        clock,
        saver: Saver::new(store),
        events: events.clone(),
    };
    tokio::spawn(driver.run(command_rx));
    AlarmHandle { commands, events }
}

impl AlarmHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    pub async fn alarms(&self) -> Result<Vec<Alarm>> {
        self.request(Command::ListAlarms).await
    }

    pub async fn add_alarm(&self, new: NewAlarm) -> Result<Alarm> {
        self.request(|reply| Command::AddAlarm(new, reply)).await
    }

    pub async fn update_alarm(&self, id: impl Into<String>, edit: NewAlarm) -> Result<Alarm> {
        let id = id.into();
        Ok(self
            .request(|reply| Command::UpdateAlarm { id, edit, reply })
            .await??)
    }

    pub async fn remove_alarm(&self, id: impl Into<String>) -> Result<Alarm> {
        let id = id.into();
        Ok(self.request(|reply| Command::RemoveAlarm { id, reply }).await??)
    }

    pub async fn set_enabled(&self, id: impl Into<String>, enabled: bool) -> Result<bool> {
        let id = id.into();
        Ok(self
            .request(|reply| Command::SetEnabled { id, enabled, reply })
            .await??)
    }

    pub async fn dismiss(&self) -> Result<Option<TriggerEvent>> {
        self.request(Command::Dismiss).await
    }

    pub async fn snooze(&self, delay: Option<Duration>) -> Result<Option<JobHandle>> {
        Ok(self.request(|reply| Command::Snooze { delay, reply }).await??)
    }

    pub async fn trigger_test(&self, alarm_id: Option<String>) -> Result<TriggerEvent> {
        Ok(self
            .request(|reply| Command::TriggerTest { alarm_id, reply })
            .await??)
    }

    pub async fn active_alert(&self) -> Result<Option<ActiveAlert>> {
        self.request(Command::ActiveAlert).await
    }

    pub async fn countdown(&self, command: CountdownCommand) -> Result<CountdownView> {
        Ok(self
            .request(|reply| Command::Countdown(command, reply))
            .await??)
    }

    pub async fn stopwatch(&self, command: StopwatchCommand) -> Result<StopwatchView> {
        self.request(|reply| Command::Stopwatch(command, reply)).await
    }

    /// Stop the engine task. Calling it again, or after the task ended, is
    /// a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        match self.request(Command::Shutdown).await {
            Ok(()) | Err(CoreError::EngineStopped) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| CoreError::EngineStopped)?;
        response.await.map_err(|_| CoreError::EngineStopped)
    }
}

struct Driver {
    engine: AlarmEngine,
    clock: Arc<dyn ClockSource>,
    saver: Saver,
    events: broadcast::Sender<Event>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let config = self.engine.config().clone();
        let mut evaluate = ticker(config.evaluate_interval_ms);
        let mut countdown = ticker(config.countdown_interval_ms);
        let mut stopwatch = ticker(config.stopwatch_interval_ms);
        tracing::info!(alarms = self.engine.alarms().len(), "alarm engine started");

        loop {
            let countdown_running = self.engine.countdown().state() == SessionState::Running;
            let stopwatch_running = self.engine.stopwatch().state() == SessionState::Running;

            tokio::select! {
                _ = evaluate.tick() => {
                    let now = self.clock.now();
                    self.engine.tick(now);
                }
                _ = countdown.tick(), if countdown_running => {
                    let now = self.clock.now();
                    self.engine.tick_countdown(now);
                }
                _ = stopwatch.tick(), if stopwatch_running => {
                    let now = self.clock.now();
                    self.engine.tick_stopwatch(now);
                }
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command).is_break() {
                            break;
                        }
                    }
                    None => {
                        tracing::debug!("all alarm handles dropped");
                        self.stop();
                        break;
                    }
                },
            }
            self.flush();
        }
    }

    /// Apply one command. `Break` once the engine has been shut down.
    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        // A dropped receiver only means the caller stopped waiting.
        let now = self.clock.now();
        match command {
            Command::ListAlarms(reply) => {
                let _ = reply.send(self.engine.alarms().to_vec());
            }
            Command::AddAlarm(new, reply) => {
                let _ = reply.send(self.engine.add_alarm(new));
            }
            Command::UpdateAlarm { id, edit, reply } => {
                let _ = reply.send(self.engine.update_alarm(&id, edit));
            }
            Command::RemoveAlarm { id, reply } => {
                let _ = reply.send(self.engine.remove_alarm(&id));
            }
            Command::SetEnabled { id, enabled, reply } => {
                let _ = reply.send(self.engine.set_enabled(&id, enabled));
            }
            Command::Dismiss(reply) => {
                let _ = reply.send(self.engine.dismiss(now));
            }
            Command::Snooze { delay, reply } => {
                let result = match delay {
                    Some(delay) => self.engine.snooze(delay, now),
                    None => Ok(self.engine.snooze_default(now)),
                };
                let _ = reply.send(result);
            }
            Command::TriggerTest { alarm_id, reply } => {
                let _ = reply.send(self.engine.trigger_test(alarm_id.as_deref(), now));
            }
            Command::ActiveAlert(reply) => {
                let _ = reply.send(self.engine.active_alert().cloned());
            }
            Command::Countdown(command, reply) => {
                let result = match command {
                    CountdownCommand::Start(duration) => {
                        self.engine.start_countdown(duration, now).map(|_| ())
                    }
                    CountdownCommand::Pause => {
                        self.engine.pause_countdown(now);
                        Ok(())
                    }
                    CountdownCommand::Resume => {
                        self.engine.resume_countdown(now);
                        Ok(())
                    }
                    CountdownCommand::Reset => {
                        self.engine.reset_countdown(now);
                        Ok(())
                    }
                };
                let _ = reply.send(result.map(|()| countdown_view(&self.engine)));
            }
            Command::Stopwatch(command, reply) => {
                match command {
                    StopwatchCommand::Start => {
                        self.engine.start_stopwatch(now);
                    }
                    StopwatchCommand::Pause => {
                        self.engine.pause_stopwatch(now);
                    }
                    StopwatchCommand::Reset => {
                        self.engine.reset_stopwatch(now);
                    }
                    StopwatchCommand::Lap => {
                        self.engine.lap_stopwatch(now);
                    }
                }
                let _ = reply.send(stopwatch_view(&self.engine));
            }
            Command::Shutdown(reply) => {
                self.stop();
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn stop(&mut self) {
        self.engine.shutdown(self.clock.now());
        self.flush();
        tracing::info!("alarm engine stopped");
    }

    /// Publish pending events and hand any changed alarm list to the saver.
    fn flush(&mut self) {
        for event in self.engine.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        if let Some(snapshot) = self.engine.take_pending_save() {
            self.saver.save(snapshot);
        }
    }
}

fn ticker(period_ms: u64) -> Interval {
    let mut interval = time::interval(std::time::Duration::from_millis(period_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

fn countdown_view(engine: &AlarmEngine) -> CountdownView {
    let countdown = engine.countdown();
    CountdownView {
        state: countdown.state(),
        remaining_ms: countdown.remaining_ms(),
        display: countdown.remaining_display(),
    }
}

fn stopwatch_view(engine: &AlarmEngine) -> StopwatchView {
    let stopwatch = engine.stopwatch();
    StopwatchView {
        state: stopwatch.state(),
        elapsed_ms: stopwatch.elapsed_ms(),
        laps: stopwatch.laps().to_vec(),
        display: stopwatch.display(),
    }
}

/// Fire-and-forget persistence on the blocking pool.
///
/// Each snapshot gets a generation number; a save that finds a newer
/// generation already written is dropped, so the file never goes back in
/// time when two saves race.
struct Saver {
    store: Arc<dyn DurableStore>,
    written: Arc<Mutex<u64>>,
    next: u64,
}

impl Saver {
    fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            written: Arc::new(Mutex::new(0)),
            next: 0,
        }
    }

    fn save(&mut self, snapshot: Vec<Alarm>) {
        self.next += 1;
        let generation = self.next;
        let store = Arc::clone(&self.store);
        let written = Arc::clone(&self.written);
        tokio::task::spawn_blocking(move || {
            let mut written = written.lock().unwrap_or_else(|e| e.into_inner());
            if *written > generation {
                return;
            }
            match store.save(&snapshot) {
                Ok(()) => {
                    *written = generation;
                    tracing::debug!(count = snapshot.len(), generation, "alarms saved");
                }
                Err(e) => tracing::warn!(error = %e, "failed to save alarms"),
            }
        });
    }
}
