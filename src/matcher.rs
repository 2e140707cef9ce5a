//! Task matching against the current time of day.
//!
//! A task matches iff it is enabled and its scheduled time equals the
//! current time at minute granularity. Nothing else participates: no
//! ranges, no "time has passed" comparison, no per-day dedupe. A task
//! fires during the specific minute its time equals the clock, every day,
//! bounded to one fire per evaluation pass.

use crate::tasks::{Task, TimeOfDay};

/// Return every enabled task scheduled for exactly `now`.
///
/// All ties fire; the result preserves store order but callers must not
/// rely on it. Pure function: identical inputs yield identical matches.
pub fn evaluate(now: TimeOfDay, tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.enabled && t.time == now)
        .collect()
}
