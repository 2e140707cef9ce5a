//! Host shell integration.
//!
//! The presentation layer is an external process (a native shell or UI)
//! talking newline-delimited JSON over stdin/stdout.

pub mod bridge;
pub mod contract;
pub mod stdio;

pub use bridge::BridgeNotifier;
pub use stdio::run_stdio_bridge;
