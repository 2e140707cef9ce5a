//! Error types for the reminder engine.

/// Top-level error type for the routine reminder system.
#[derive(Debug, thiserror::Error)]
pub enum RoutineError {
    /// Audio device or playback error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Command/event channel error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, RoutineError>;
