//! Notification capability and the permission gate in front of it.
//!
//! The engine never talks to the host notification system directly; it
//! goes through a [`Notifier`] implementation behind a [`PermissionGate`]
//! that tracks whether delivery is authorized. Permission resolution is
//! asynchronous: [`Notifier::request_permission`] fires the user-facing
//! prompt and the eventual answer arrives via [`PermissionGate::resolve`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Authorization state of the notification capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// Not yet asked.
    #[default]
    Default,
    /// The user authorized notifications.
    Granted,
    /// The user refused notifications.
    Denied,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        };
        f.write_str(s)
    }
}

/// Host notification capability.
///
/// All methods are best-effort and must never block the evaluation loop.
pub trait Notifier: Send + Sync {
    /// Whether the capability exists in this environment.
    fn is_available(&self) -> bool;

    /// The capability's current authorization state.
    fn current_permission(&self) -> PermissionState;

    /// Trigger the one-time user-facing permission prompt.
    ///
    /// Fire-and-forget: the resolved answer is delivered later through
    /// [`PermissionGate::resolve`].
    fn request_permission(&self);

    /// Deliver a notification. Fails silently when unauthorized.
    fn show(&self, title: &str, body: &str);
}

/// Capability-absent notifier: everything is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn is_available(&self) -> bool {
        false
    }

    fn current_permission(&self) -> PermissionState {
        PermissionState::Default
    }

    fn request_permission(&self) {}

    fn show(&self, _title: &str, _body: &str) {}
}

/// Tracks notification authorization and mediates the one-time request flow.
pub struct PermissionGate {
    notifier: Arc<dyn Notifier>,
    state: PermissionState,
}

impl PermissionGate {
    /// Create a gate over the given capability, reading its current state
    /// when the capability exists. An absent capability stays [`Default`],
    /// which keeps the permission call-to-action visible.
    ///
    /// [`Default`]: PermissionState::Default
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let state = if notifier.is_available() {
            notifier.current_permission()
        } else {
            PermissionState::Default
        };
        Self { notifier, state }
    }

    /// Current authorization state.
    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Whether notifications may be delivered right now.
    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    /// Trigger the permission prompt.
    ///
    /// Only meaningful from the [`Default`] state; hosts refuse to
    /// re-prompt, so any other state makes this a no-op.
    ///
    /// [`Default`]: PermissionState::Default
    pub fn request(&self) {
        if !self.notifier.is_available() {
            debug!("notification capability absent; skipping permission request");
            return;
        }
        if self.state != PermissionState::Default {
            debug!(state = %self.state, "permission already resolved; skipping request");
            return;
        }
        self.notifier.request_permission();
    }

    /// Record the user's answer to the permission prompt.
    pub fn resolve(&mut self, granted: bool) {
        self.state = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
    }
}

impl fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::test_support::MockNotifier;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn gate_stays_default_when_capability_absent() {
        let gate = PermissionGate::new(Arc::new(NullNotifier));
        assert_eq!(gate.state(), PermissionState::Default);
        assert!(!gate.is_granted());
    }

    #[test]
    fn gate_reads_current_state_at_startup() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Granted));
        let gate = PermissionGate::new(notifier);
        assert!(gate.is_granted());
    }

    #[test]
    fn request_prompts_only_from_default() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Default));
        let gate = PermissionGate::new(Arc::clone(&notifier) as Arc<dyn Notifier>);

        gate.request();
        assert_eq!(notifier.prompts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn request_is_noop_once_resolved() {
        let notifier = Arc::new(MockNotifier::available_with(PermissionState::Default));
        let mut gate = PermissionGate::new(Arc::clone(&notifier) as Arc<dyn Notifier>);

        gate.resolve(false);
        gate.request();
        assert_eq!(notifier.prompts.load(Ordering::SeqCst), 0);

        gate.resolve(true);
        gate.request();
        assert_eq!(notifier.prompts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn request_is_noop_when_capability_absent() {
        let gate = PermissionGate::new(Arc::new(NullNotifier));
        // NullNotifier ignores prompts; this must not panic or change state.
        gate.request();
        assert_eq!(gate.state(), PermissionState::Default);
    }

    #[test]
    fn resolve_updates_state() {
        let mut gate = PermissionGate::new(Arc::new(NullNotifier));
        gate.resolve(true);
        assert_eq!(gate.state(), PermissionState::Granted);
        gate.resolve(false);
        assert_eq!(gate.state(), PermissionState::Denied);
    }

    #[test]
    fn permission_state_serde_is_snake_case() {
        let json = serde_json::to_string(&PermissionState::Granted).unwrap();
        assert_eq!(json, "\"granted\"");
        let restored: PermissionState = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(restored, PermissionState::Denied);
    }
}
