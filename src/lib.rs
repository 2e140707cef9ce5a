//! Routine: daily reminder engine with notification and chime alerts.
//!
//! Tracks a small list of daily scheduled tasks (meals, sleep, prayers,
//! custom reminders), compares the wall clock against each task's time
//! once a minute, and fires a notification plus an audible tone on a
//! match.
//!
//! # Architecture
//!
//! A single engine task owns all state and is driven by timers and a
//! command channel:
//! - **Task store**: insertion-ordered reminders with add/remove/toggle
//! - **Clock**: local wall-clock source behind a trait for testability
//! - **Matcher**: pure exact-minute evaluation over the store
//! - **Alert dispatch**: best-effort notification + chime per match
//! - **Permission gate**: one-time notification authorization flow
//! - **Host bridge**: newline-delimited JSON protocol for the shell UI

pub mod alert;
pub mod chime;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod matcher;
pub mod notify;
pub mod tasks;

pub use engine::{Engine, EngineHandle, Event, Snapshot};
pub use error::{Result, RoutineError};
pub use tasks::{Task, TaskKind, TaskStore, TimeOfDay};
