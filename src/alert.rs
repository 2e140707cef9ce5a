//! Alert dispatch for matched tasks.
//!
//! Each matched task triggers two independent effects: a notification
//! (gated on permission and capability availability) and the audible
//! chime. Either may fail without affecting the other.

use crate::chime::Chime;
use crate::config::ToneConfig;
use crate::notify::Notifier;
use crate::tasks::{Task, TaskKind};
use std::sync::Arc;
use tracing::debug;

/// Fixed notification body per task category.
pub fn alert_body(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Food => "🍽️ Khane ka time ho gaya hai!",
        TaskKind::Sleep => "😴 Sone ka time ho gaya hai!",
        TaskKind::Prayer => "🕌 Namaz ka time ho gaya hai!",
        TaskKind::Custom => "⏰ Reminder!",
    }
}

/// Fires the notification and chime for matched tasks.
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    chime: Arc<dyn Chime>,
    tone: ToneConfig,
}

impl AlertDispatcher {
    /// Create a dispatcher over the given capabilities.
    pub fn new(notifier: Arc<dyn Notifier>, chime: Arc<dyn Chime>, tone: ToneConfig) -> Self {
        Self {
            notifier,
            chime,
            tone,
        }
    }

    /// Dispatch both alert effects for one matched task.
    ///
    /// The notification is skipped silently when `notify_allowed` is false
    /// or the capability is absent. The chime runs on a detached thread;
    /// playback errors are logged at debug level and discarded. Never
    /// blocks and never propagates a failure.
    pub fn dispatch(&self, task: &Task, notify_allowed: bool) {
        if notify_allowed && self.notifier.is_available() {
            self.notifier.show(&task.name, alert_body(task.kind));
        } else {
            debug!(task = %task.name, "notification skipped (unauthorized or unavailable)");
        }

        let chime = Arc::clone(&self.chime);
        let tone = self.tone.clone();
        std::thread::spawn(move || {
            if let Err(e) = chime.play(&tone) {
                debug!("chime playback failed: {e}");
            }
        });
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("tone", &self.tone)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::error::RoutineError;
    use crate::notify::test_support::MockNotifier;
    use crate::notify::{NullNotifier, PermissionState};
    use std::sync::mpsc;

    /// Chime that reports each play over a channel, optionally failing.
    struct ProbeChime {
        played: std::sync::Mutex<mpsc::Sender<()>>,
        fail: bool,
    }

    impl ProbeChime {
        fn new(fail: bool) -> (Self, mpsc::Receiver<()>) {
            let (tx, rx) = mpsc::channel();
            (
                Self {
                    played: std::sync::Mutex::new(tx),
                    fail,
                },
                rx,
            )
        }
    }

    impl Chime for ProbeChime {
        fn play(&self, _tone: &ToneConfig) -> crate::error::Result<()> {
            let _ = self.played.lock().expect("probe lock").send(());
            if self.fail {
                return Err(RoutineError::Audio("synthesis exploded".into()));
            }
            Ok(())
        }
    }

    fn task(name: &str, kind: TaskKind) -> Task {
        Task {
            id: 1,
            name: name.to_owned(),
            time: "12:30".parse().unwrap(),
            kind,
            enabled: true,
        }
    }

    fn wait_for_chime(rx: &mpsc::Receiver<()>) {
        rx.recv_timeout(std::time::Duration::from_secs(2))
            .expect("chime should have been played");
    }

    #[test]
    fn message_table_covers_every_kind() {
        assert!(alert_body(TaskKind::Food).contains("Khane"));
        assert!(alert_body(TaskKind::Sleep).contains("Sone"));
        assert!(alert_body(TaskKind::Prayer).contains("Namaz"));
        assert!(alert_body(TaskKind::Custom).contains("Reminder"));
    }

    #[test]
    fn dispatch_shows_notification_when_allowed() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Granted));
        let (chime, rx) = ProbeChime::new(false);
        let dispatcher = AlertDispatcher::new(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::new(chime),
            ToneConfig::default(),
        );

        dispatcher.dispatch(&task("Zuhr Namaz", TaskKind::Prayer), true);
        wait_for_chime(&rx);

        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, "Zuhr Namaz");
        assert_eq!(shown[0].1, alert_body(TaskKind::Prayer));
    }

    #[test]
    fn dispatch_skips_notification_when_not_allowed() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Default));
        let (chime, rx) = ProbeChime::new(false);
        let dispatcher = AlertDispatcher::new(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::new(chime),
            ToneConfig::default(),
        );

        dispatcher.dispatch(&task("Sone ka Time", TaskKind::Sleep), false);
        // The chime still fires even when the notification is skipped.
        wait_for_chime(&rx);
        assert!(notifier.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn dispatch_skips_notification_when_capability_absent() {
        let (chime, rx) = ProbeChime::new(false);
        let dispatcher = AlertDispatcher::new(
            Arc::new(NullNotifier),
            Arc::new(chime),
            ToneConfig::default(),
        );

        // `notify_allowed` true but no capability: must not panic.
        dispatcher.dispatch(&task("Khana (Lunch)", TaskKind::Food), true);
        wait_for_chime(&rx);
    }

    #[test]
    fn chime_failure_does_not_affect_notification_or_later_dispatches() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Granted));
        let (chime, rx) = ProbeChime::new(true);
        let dispatcher = AlertDispatcher::new(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::new(chime),
            ToneConfig::default(),
        );

        dispatcher.dispatch(&task("Khana (Breakfast)", TaskKind::Food), true);
        wait_for_chime(&rx);
        dispatcher.dispatch(&task("Job ke liye nikalna", TaskKind::Custom), true);
        wait_for_chime(&rx);

        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 2, "both dispatches must notify");
    }
}
