//! Reminder engine event loop.
//!
//! A single tokio task owns all mutable state (task store, permission
//! gate) and multiplexes three inputs with `select!`: the evaluation
//! interval, the display interval, and the command channel from the
//! presentation layer. Nothing else touches the state, so no locking is
//! needed; user mutations land between passes and take effect on the next
//! evaluation.
//!
//! Both intervals fire immediately on start-up, which gives the
//! launch-minute evaluation pass. Dropping out of the loop (shutdown
//! command, closed channel) tears both timers down.

use crate::alert::AlertDispatcher;
use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::error::{Result, RoutineError};
use crate::matcher::evaluate;
use crate::notify::{PermissionGate, PermissionState};
use crate::tasks::{Task, TaskKind, TaskStore};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Commands from the presentation layer.
///
/// All mutations are applied on the engine task; none block the sender.
#[derive(Debug)]
pub enum Command {
    /// Append a task (silently rejected when name/time is empty or invalid).
    AddTask {
        /// Display label.
        name: String,
        /// Scheduled time as `HH:MM`.
        time: String,
        /// Alert message category.
        kind: TaskKind,
    },
    /// Remove a task by id (no-op on unknown ids).
    RemoveTask {
        /// Task id.
        id: u64,
    },
    /// Flip a task's enabled flag (no-op on unknown ids).
    ToggleTask {
        /// Task id.
        id: u64,
    },
    /// Trigger the one-time notification permission prompt.
    RequestPermission,
    /// Record the user's answer to the permission prompt.
    ResolvePermission {
        /// `true` = granted, `false` = denied.
        granted: bool,
    },
    /// Run an evaluation pass immediately.
    TickNow,
    /// Request the current engine state.
    Snapshot {
        /// Reply channel.
        reply: oneshot::Sender<Snapshot>,
    },
    /// Stop the engine loop.
    Shutdown,
}

/// Point-in-time engine state for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Tasks in display order.
    pub tasks: Vec<Task>,
    /// Notification authorization state.
    pub permission: PermissionState,
}

/// Events pushed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Display clock tick (`HH:MM:SS`).
    Clock {
        /// Formatted current time.
        time: String,
    },
    /// The task collection changed.
    TasksChanged {
        /// Tasks in display order.
        tasks: Vec<Task>,
    },
    /// The host should show the OS permission prompt.
    PermissionPrompt,
    /// The permission state was resolved.
    PermissionChanged {
        /// New authorization state.
        state: PermissionState,
    },
    /// A task matched the current minute and its alerts were dispatched.
    Alert {
        /// The matched task.
        task: Task,
    },
    /// A notification to render (emitted by the bridge notifier).
    Notify {
        /// Notification title (the task name).
        title: String,
        /// Notification body.
        body: String,
    },
}

/// Cloneable handle for sending commands into a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| RoutineError::Channel("engine stopped".into()))
    }

    /// Add a task.
    pub fn add_task(&self, name: impl Into<String>, time: impl Into<String>, kind: TaskKind) -> Result<()> {
        self.send(Command::AddTask {
            name: name.into(),
            time: time.into(),
            kind,
        })
    }

    /// Remove a task by id.
    pub fn remove_task(&self, id: u64) -> Result<()> {
        self.send(Command::RemoveTask { id })
    }

    /// Flip a task's enabled flag.
    pub fn toggle_task(&self, id: u64) -> Result<()> {
        self.send(Command::ToggleTask { id })
    }

    /// Trigger the permission prompt.
    pub fn request_permission(&self) -> Result<()> {
        self.send(Command::RequestPermission)
    }

    /// Record the user's answer to the permission prompt.
    pub fn resolve_permission(&self, granted: bool) -> Result<()> {
        self.send(Command::ResolvePermission { granted })
    }

    /// Run an evaluation pass immediately.
    pub fn tick_now(&self) -> Result<()> {
        self.send(Command::TickNow)
    }

    /// Fetch the current engine state.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await
            .map_err(|_| RoutineError::Channel("engine stopped".into()))
    }

    /// Stop the engine loop.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }
}

/// The reminder engine: task store, permission gate, and alert dispatch
/// driven by a periodic evaluation tick.
pub struct Engine {
    store: TaskStore,
    gate: PermissionGate,
    dispatcher: AlertDispatcher,
    clock: Box<dyn Clock>,
    cadence: SchedulerConfig,
    command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl Engine {
    /// Create an engine and its command handle.
    ///
    /// Events are pushed on `event_tx`; the loop stops when the receiver
    /// side is dropped.
    pub fn new(
        store: TaskStore,
        gate: PermissionGate,
        dispatcher: AlertDispatcher,
        clock: Box<dyn Clock>,
        cadence: SchedulerConfig,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        (
            Self {
                store,
                gate,
                dispatcher,
                clock,
                cadence,
                command_rx,
                event_tx,
            },
            EngineHandle { command_tx },
        )
    }

    /// Run one evaluation pass: match every enabled task scheduled for the
    /// current minute and dispatch alerts for each.
    pub fn tick(&mut self) {
        let now = self.clock.time_of_day();
        let matched: Vec<Task> = evaluate(now, self.store.tasks())
            .into_iter()
            .cloned()
            .collect();

        for task in matched {
            debug!(task = %task.name, time = %now, "task matched, dispatching alerts");
            self.dispatcher.dispatch(&task, self.gate.is_granted());
            let _ = self.event_tx.send(Event::Alert { task });
        }
    }

    /// Current engine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.store.tasks().to_vec(),
            permission: self.gate.state(),
        }
    }

    fn emit_tasks(&self) {
        let _ = self.event_tx.send(Event::TasksChanged {
            tasks: self.store.tasks().to_vec(),
        });
    }

    /// Apply one command. Returns `true` when the engine should stop.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::AddTask { name, time, kind } => match self.store.add(&name, &time, kind) {
                Some(id) => {
                    debug!(id, task = %name, "task added");
                    self.emit_tasks();
                }
                None => debug!(task = %name, "task rejected (empty name or invalid time)"),
            },
            Command::RemoveTask { id } => {
                if self.store.remove(id) {
                    debug!(id, "task removed");
                    self.emit_tasks();
                }
            }
            Command::ToggleTask { id } => {
                if self.store.toggle(id) {
                    self.emit_tasks();
                }
            }
            Command::RequestPermission => self.gate.request(),
            Command::ResolvePermission { granted } => {
                self.gate.resolve(granted);
                info!(state = %self.gate.state(), "notification permission resolved");
                let _ = self.event_tx.send(Event::PermissionChanged {
                    state: self.gate.state(),
                });
            }
            Command::TickNow => self.tick(),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => {
                info!("engine shutdown requested");
                return true;
            }
        }
        false
    }

    /// Start the engine loop.
    pub fn run(mut self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                tasks = self.store.len(),
                eval_interval_secs = self.cadence.eval_interval_secs,
                "reminder engine started"
            );

            let mut eval = tokio::time::interval(Duration::from_secs(
                self.cadence.eval_interval_secs.max(1),
            ));
            let mut display = tokio::time::interval(Duration::from_secs(
                self.cadence.display_interval_secs.max(1),
            ));

            loop {
                tokio::select! {
                    _ = eval.tick() => self.tick(),
                    _ = display.tick() => {
                        let event = Event::Clock { time: self.clock.display_time() };
                        if self.event_tx.send(event).is_err() {
                            debug!("event channel closed, stopping engine");
                            break;
                        }
                    }
                    command = self.command_rx.recv() => match command {
                        Some(command) => {
                            if self.handle_command(command) {
                                break;
                            }
                        }
                        None => {
                            debug!("command channel closed, stopping engine");
                            break;
                        }
                    },
                }
            }

            info!("reminder engine stopped");
        })
    }
}
