//! Wall-clock sources for the evaluation and display ticks.

use crate::tasks::TimeOfDay;
use chrono::{Local, Timelike};

/// A source of the current local time.
///
/// The engine reads [`Clock::time_of_day`] once per evaluation pass and
/// [`Clock::display_time`] once per display tick; implementations own no
/// task state and trigger nothing themselves.
pub trait Clock: Send + Sync {
    /// Current local time at minute granularity (drives matching).
    fn time_of_day(&self) -> TimeOfDay;

    /// Current local time as `HH:MM:SS` for display.
    fn display_time(&self) -> String;
}

/// The device's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> TimeOfDay {
        let now = Local::now();
        // Hour and minute from chrono are always in range.
        TimeOfDay::new(now.hour() as u8, now.minute() as u8).unwrap_or_default()
    }

    fn display_time(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}

/// A clock pinned to a fixed time of day, for tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The time this clock always reports.
    pub time: TimeOfDay,
}

impl FixedClock {
    /// Create a clock pinned to the given time.
    pub fn new(time: TimeOfDay) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn time_of_day(&self) -> TimeOfDay {
        self.time
    }

    fn display_time(&self) -> String {
        format!("{}:00", self.time)
    }
}
