//! Versioned command/event envelopes for the host shell protocol.

use serde::{Deserialize, Serialize};

use crate::tasks::TaskKind;

/// Contract version for host command/event envelopes.
pub const EVENT_VERSION: u32 = 1;

/// Command set accepted over the stdio bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "host.ping")]
    HostPing,
    #[serde(rename = "task.list")]
    TaskList,
    #[serde(rename = "task.add")]
    TaskAdd,
    #[serde(rename = "task.remove")]
    TaskRemove,
    #[serde(rename = "task.toggle")]
    TaskToggle,
    #[serde(rename = "permission.request")]
    PermissionRequest,
    #[serde(rename = "permission.grant")]
    PermissionGrant,
    #[serde(rename = "permission.deny")]
    PermissionDeny,
    #[serde(rename = "scheduler.tick_now")]
    SchedulerTickNow,
    #[serde(rename = "runtime.stop")]
    RuntimeStop,
}

impl CommandName {
    /// Render command name to wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostPing => "host.ping",
            Self::TaskList => "task.list",
            Self::TaskAdd => "task.add",
            Self::TaskRemove => "task.remove",
            Self::TaskToggle => "task.toggle",
            Self::PermissionRequest => "permission.request",
            Self::PermissionGrant => "permission.grant",
            Self::PermissionDeny => "permission.deny",
            Self::SchedulerTickNow => "scheduler.tick_now",
            Self::RuntimeStop => "runtime.stop",
        }
    }

    /// Parse a command name from wire format.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "host.ping" => Some(Self::HostPing),
            "task.list" => Some(Self::TaskList),
            "task.add" => Some(Self::TaskAdd),
            "task.remove" => Some(Self::TaskRemove),
            "task.toggle" => Some(Self::TaskToggle),
            "permission.request" => Some(Self::PermissionRequest),
            "permission.grant" => Some(Self::PermissionGrant),
            "permission.deny" => Some(Self::PermissionDeny),
            "scheduler.tick_now" => Some(Self::SchedulerTickNow),
            "runtime.stop" => Some(Self::RuntimeStop),
            _ => None,
        }
    }
}

/// Payload for `task.add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAddParams {
    /// Display label.
    pub name: String,
    /// Scheduled time as `HH:MM`.
    pub time: String,
    /// Alert category; defaults to `custom` when omitted.
    #[serde(default)]
    pub kind: TaskKind,
}

/// Payload for `task.remove` and `task.toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskIdParams {
    /// Target task id.
    pub id: u64,
}

/// A versioned command envelope from shell -> engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub v: u32,
    pub request_id: String,
    pub command: CommandName,
    pub payload: serde_json::Value,
}

impl CommandEnvelope {
    /// Build a v1 command envelope.
    #[must_use]
    pub fn new(
        request_id: impl Into<String>,
        command: CommandName,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            command,
            payload,
        }
    }

    /// Validate envelope version and required identifiers.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.v != EVENT_VERSION {
            return Err(ContractError::new(
                ContractErrorKind::UnsupportedVersion,
                format!(
                    "unsupported contract version {}; expected {}",
                    self.v, EVENT_VERSION
                ),
            ));
        }
        if self.request_id.trim().is_empty() {
            return Err(ContractError::new(
                ContractErrorKind::InvalidEnvelope,
                "request_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// A versioned response envelope from engine -> shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub v: u32,
    pub request_id: String,
    pub ok: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Build a successful response envelope.
    #[must_use]
    pub fn ok(request_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: true,
            payload,
            error: None,
        }
    }

    /// Build an error response envelope.
    #[must_use]
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            v: EVENT_VERSION,
            request_id: request_id.into(),
            ok: false,
            payload: serde_json::Value::Null,
            error: Some(message.into()),
        }
    }
}

/// A versioned event envelope from engine -> shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub v: u32,
    pub event_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Build a v1 event envelope.
    #[must_use]
    pub fn new(
        event_id: impl Into<String>,
        event: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            v: EVENT_VERSION,
            event_id: event_id.into(),
            event: event.into(),
            payload,
        }
    }
}

/// Contract validation error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    UnsupportedVersion,
    InvalidEnvelope,
}

/// Contract validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    #[must_use]
    pub fn new(kind: ContractErrorKind, message: String) -> Self {
        Self { kind, message }
    }
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ContractError {}
