//! Notification capability backed by the host shell.
//!
//! The headless engine cannot post OS notifications itself; the shell on
//! the other side of the stdio bridge owns that, along with the real
//! permission prompt. This notifier forwards `show` and
//! `request_permission` as engine events, and the shell answers the
//! prompt with `permission.grant` / `permission.deny` commands.

use crate::engine::Event;
use crate::notify::{Notifier, PermissionState};
use tokio::sync::mpsc;
use tracing::debug;

/// `Notifier` that delegates delivery and the permission prompt to the
/// host shell via the engine event channel.
#[derive(Debug, Clone)]
pub struct BridgeNotifier {
    events: mpsc::UnboundedSender<Event>,
}

impl BridgeNotifier {
    /// Create a notifier forwarding onto the given event channel.
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self { events }
    }
}

impl Notifier for BridgeNotifier {
    fn is_available(&self) -> bool {
        // The shell is assumed present as long as the event channel is open.
        !self.events.is_closed()
    }

    fn current_permission(&self) -> PermissionState {
        // The shell pushes the persisted OS state with a grant/deny command
        // right after connecting; until then the state is unknown.
        PermissionState::Default
    }

    fn request_permission(&self) {
        if self.events.send(Event::PermissionPrompt).is_err() {
            debug!("event channel closed; dropping permission prompt");
        }
    }

    fn show(&self, title: &str, body: &str) {
        let event = Event::Notify {
            title: title.to_owned(),
            body: body.to_owned(),
        };
        if self.events.send(event).is_err() {
            debug!("event channel closed; dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn show_forwards_as_notify_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = BridgeNotifier::new(tx);

        notifier.show("Zuhr Namaz", "🕌 Namaz ka time ho gaya hai!");
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::Notify {
                title: "Zuhr Namaz".to_owned(),
                body: "🕌 Namaz ka time ho gaya hai!".to_owned(),
            }
        );
    }

    #[test]
    fn request_permission_forwards_prompt_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = BridgeNotifier::new(tx);

        notifier.request_permission();
        assert_eq!(rx.try_recv().unwrap(), Event::PermissionPrompt);
    }

    #[test]
    fn closed_channel_makes_capability_unavailable() {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let notifier = BridgeNotifier::new(tx);
        assert!(notifier.is_available());

        drop(rx);
        assert!(!notifier.is_available());
        // Must not panic once the shell is gone.
        notifier.show("title", "body");
        notifier.request_permission();
    }

    #[test]
    fn permission_starts_unknown() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let notifier = BridgeNotifier::new(tx);
        assert_eq!(notifier.current_permission(), PermissionState::Default);
    }
}
