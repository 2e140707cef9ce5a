//! Reminder task definitions and the in-memory task store.
//!
//! Defines the [`Task`] type, the [`TimeOfDay`] value type used for
//! minute-granularity scheduling, and the [`TaskStore`] collection with
//! its seeded default routine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A time of day at minute granularity (24-hour clock, no seconds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Create a time of day, validating ranges (0-23, 0-59).
    pub fn new(hour: u8, minute: u8) -> std::result::Result<Self, TimeParseError> {
        if hour > 23 || minute > 59 {
            return Err(TimeParseError(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Hour of day (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of hour (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| TimeParseError(s.to_owned()))?;
        let hour: u8 = h.parse().map_err(|_| TimeParseError(s.to_owned()))?;
        let minute: u8 = m.parse().map_err(|_| TimeParseError(s.to_owned()))?;
        Self::new(hour, minute).map_err(|_| TimeParseError(s.to_owned()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Error returned when parsing an invalid `HH:MM` string.
#[derive(Debug, Clone)]
pub struct TimeParseError(pub String);

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time of day: {:?}", self.0)
    }
}

impl std::error::Error for TimeParseError {}

/// Category of a reminder task.
///
/// Selects the alert message body only; it has no scheduling effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Meal reminder.
    Food,
    /// Bedtime reminder.
    Sleep,
    /// Prayer-time reminder.
    Prayer,
    /// Everything else.
    #[default]
    Custom,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskKind::Food => "food",
            TaskKind::Sleep => "sleep",
            TaskKind::Prayer => "prayer",
            TaskKind::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// A daily reminder with a scheduled time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier, stable for the task's lifetime.
    pub id: u64,
    /// Display label.
    pub name: String,
    /// Time of day this task fires.
    pub time: TimeOfDay,
    /// Category used to pick the alert message.
    pub kind: TaskKind,
    /// Disabled tasks are retained but never matched.
    pub enabled: bool,
}

/// Insertion-ordered collection of reminder tasks.
///
/// Ids are assigned from a monotonic counter and stay unique for the
/// lifetime of the store. Order has no effect on matching, only display.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a store seeded with the default daily routine: three meals,
    /// bedtime, the five daily prayers, and a leave-for-work reminder.
    pub fn with_default_routine() -> Self {
        let mut store = Self::new();
        for (name, time, kind) in DEFAULT_ROUTINE {
            store.add(name, time, *kind);
        }
        store
    }

    /// Append a new enabled task, returning its id.
    ///
    /// Silently rejects (returns `None`, store unchanged) when the name is
    /// empty, the time is empty, or the time is not a valid `HH:MM`.
    pub fn add(&mut self, name: &str, time: &str, kind: TaskKind) -> Option<u64> {
        if name.is_empty() || time.is_empty() {
            return None;
        }
        let time: TimeOfDay = time.parse().ok()?;

        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            name: name.to_owned(),
            time,
            kind,
            enabled: true,
        });
        Some(id)
    }

    /// Remove the task with the given id. Returns `true` when found.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Flip the enabled flag of the task with the given id. Returns `true`
    /// when found.
    pub fn toggle(&mut self, id: u64) -> bool {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.enabled = !task.enabled;
            return true;
        }
        false
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks in the store.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Seeded default routine (name, time, kind).
const DEFAULT_ROUTINE: &[(&str, &str, TaskKind)] = &[
    ("Khana (Breakfast)", "08:00", TaskKind::Food),
    ("Khana (Lunch)", "13:00", TaskKind::Food),
    ("Khana (Dinner)", "20:00", TaskKind::Food),
    ("Sone ka Time", "21:30", TaskKind::Sleep),
    ("Fajr Namaz", "05:30", TaskKind::Prayer),
    ("Zuhr Namaz", "12:30", TaskKind::Prayer),
    ("Asr Namaz", "15:45", TaskKind::Prayer),
    ("Maghrib Namaz", "17:45", TaskKind::Prayer),
    ("Isha Namaz", "19:15", TaskKind::Prayer),
    ("Job ke liye nikalna", "08:00", TaskKind::Custom),
];
