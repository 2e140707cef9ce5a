//! Stdin/stdout JSON bridge for the host shell.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages from stdin,
//! applies them through the [`EngineHandle`], and writes
//! `ResponseEnvelope` and `EventEnvelope` messages as newline-delimited
//! JSON to stdout.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use crate::engine::{Event, EngineHandle};
use crate::error::RoutineError;
use crate::host::contract::{
    CommandEnvelope, CommandName, EventEnvelope, ResponseEnvelope, TaskAddParams, TaskIdParams,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::{Mutex, mpsc};

/// Run the stdin/stdout JSON bridge until stdin closes or a
/// `runtime.stop` command is received.
///
/// Two tasks operate in parallel: a forwarder writing engine events to
/// stdout, and the reader (on the current task) dispatching commands and
/// writing responses. On exit the engine is asked to shut down so both
/// tick timers are torn down.
pub async fn run_stdio_bridge(
    handle: EngineHandle,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
) -> crate::Result<()> {
    let stdout = tokio::io::stdout();
    let writer = Arc::new(Mutex::new(BufWriter::new(stdout)));

    let event_writer = Arc::clone(&writer);
    let event_handle = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let envelope = envelope_for(&event);
            match serde_json::to_string(&envelope) {
                Ok(json) => {
                    let mut w = event_writer.lock().await;
                    if let Err(e) = write_line(&mut w, &json).await {
                        tracing::warn!(
                            error = %e,
                            "failed to write event envelope to stdout; stopping event forwarder"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize event envelope; skipping");
                }
            }
        }
    });

    let reader_result = run_reader(&handle, Arc::clone(&writer)).await;

    // Stop the engine (tears down both intervals), then the forwarder.
    let _ = handle.shutdown();
    event_handle.abort();
    let _ = event_handle.await;

    reader_result
}

/// Read stdin line-by-line, dispatch each command, and write responses.
async fn run_reader(
    handle: &EngineHandle,
    writer: Arc<Mutex<BufWriter<tokio::io::Stdout>>>,
) -> crate::Result<()> {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| RoutineError::Channel(format!("failed to read from stdin: {e}")))?;

        // EOF
        if bytes_read == 0 {
            tracing::info!("stdin closed (EOF); shutting down stdio bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    raw_line = %trimmed,
                    "failed to parse command envelope from stdin"
                );
                let response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &response).await?;
                continue;
            }
        };

        let is_stop = envelope.command == CommandName::RuntimeStop;
        let response = dispatch(handle, envelope).await;
        write_response(&writer, &response).await?;

        if is_stop {
            tracing::info!("runtime.stop received; shutting down stdio bridge");
            break;
        }
    }

    Ok(())
}

/// Apply one command envelope through the engine handle.
async fn dispatch(handle: &EngineHandle, envelope: CommandEnvelope) -> ResponseEnvelope {
    if let Err(e) = envelope.validate() {
        return ResponseEnvelope::error(envelope.request_id, e.to_string());
    }
    let request_id = envelope.request_id;

    let result = match envelope.command {
        CommandName::HostPing => {
            return ResponseEnvelope::ok(request_id, serde_json::json!({"pong": true}));
        }
        CommandName::TaskList => {
            return match handle.snapshot().await {
                Ok(snapshot) => match serde_json::to_value(&snapshot) {
                    Ok(payload) => ResponseEnvelope::ok(request_id, payload),
                    Err(e) => ResponseEnvelope::error(request_id, e.to_string()),
                },
                Err(e) => ResponseEnvelope::error(request_id, e.to_string()),
            };
        }
        CommandName::TaskAdd => match serde_json::from_value::<TaskAddParams>(envelope.payload) {
            Ok(params) => handle.add_task(params.name, params.time, params.kind),
            Err(e) => return ResponseEnvelope::error(request_id, format!("invalid payload: {e}")),
        },
        CommandName::TaskRemove => match serde_json::from_value::<TaskIdParams>(envelope.payload) {
            Ok(params) => handle.remove_task(params.id),
            Err(e) => return ResponseEnvelope::error(request_id, format!("invalid payload: {e}")),
        },
        CommandName::TaskToggle => match serde_json::from_value::<TaskIdParams>(envelope.payload) {
            Ok(params) => handle.toggle_task(params.id),
            Err(e) => return ResponseEnvelope::error(request_id, format!("invalid payload: {e}")),
        },
        CommandName::PermissionRequest => handle.request_permission(),
        CommandName::PermissionGrant => handle.resolve_permission(true),
        CommandName::PermissionDeny => handle.resolve_permission(false),
        CommandName::SchedulerTickNow => handle.tick_now(),
        CommandName::RuntimeStop => handle.shutdown(),
    };

    match result {
        Ok(()) => ResponseEnvelope::ok(request_id, serde_json::Value::Null),
        Err(e) => ResponseEnvelope::error(request_id, e.to_string()),
    }
}

/// Wrap an engine event in a wire envelope.
fn envelope_for(event: &Event) -> EventEnvelope {
    let event_id = uuid::Uuid::new_v4().to_string();
    let (name, payload) = match event {
        Event::Clock { time } => ("clock.tick", serde_json::json!({"time": time})),
        Event::TasksChanged { tasks } => ("tasks.changed", serde_json::json!({"tasks": tasks})),
        Event::PermissionPrompt => ("permission.prompt", serde_json::Value::Null),
        Event::PermissionChanged { state } => {
            ("permission.changed", serde_json::json!({"state": state}))
        }
        Event::Alert { task } => ("task.alert", serde_json::json!({"task": task})),
        Event::Notify { title, body } => (
            "notification.show",
            serde_json::json!({"title": title, "body": body}),
        ),
    };
    EventEnvelope::new(event_id, name, payload)
}

async fn write_response(
    writer: &Arc<Mutex<BufWriter<tokio::io::Stdout>>>,
    response: &ResponseEnvelope,
) -> crate::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| RoutineError::Channel(format!("failed to serialize response: {e}")))?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line to the buffered writer and flush.
async fn write_line(writer: &mut BufWriter<tokio::io::Stdout>, json: &str) -> crate::Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| RoutineError::Channel(format!("failed to write to stdout: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| RoutineError::Channel(format!("failed to write newline to stdout: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| RoutineError::Channel(format!("failed to flush stdout: {e}")))?;
    Ok(())
}
