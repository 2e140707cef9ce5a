//! Headless reminder engine binary for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin,
//! applies them to the running engine, and writes `ResponseEnvelope` and
//! `EventEnvelope` messages to stdout. The shell on the other side renders
//! the task list, shows OS notifications, and answers the permission
//! prompt with `permission.grant` / `permission.deny`.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use routine::alert::AlertDispatcher;
use routine::chime::CpalChime;
use routine::clock::SystemClock;
use routine::config::RoutineConfig;
use routine::engine::Engine;
use routine::host::{BridgeNotifier, run_stdio_bridge};
use routine::notify::{Notifier, PermissionGate};
use routine::tasks::TaskStore;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("routine-host starting");

    let config = RoutineConfig::load();

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let notifier: Arc<dyn Notifier> = Arc::new(BridgeNotifier::new(event_tx.clone()));
    let gate = PermissionGate::new(Arc::clone(&notifier));
    let dispatcher = AlertDispatcher::new(notifier, Arc::new(CpalChime), config.tone.clone());

    let (engine, handle) = Engine::new(
        TaskStore::with_default_routine(),
        gate,
        dispatcher,
        Box::new(SystemClock),
        config.scheduler.clone(),
        event_tx,
    );
    let engine_task = engine.run();

    run_stdio_bridge(handle, event_rx).await.map_err(|e| {
        tracing::error!(error = %e, "routine-host exited with error");
        anyhow::anyhow!("routine-host failed: {e}")
    })?;

    let _ = engine_task.await;
    tracing::info!("routine-host shut down cleanly");
    Ok(())
}
