//! Logger backed by the `tracing` facade

use super::traits::Logger;

/// Forwards messages to `tracing` events
///
/// The binaries install a `tracing-subscriber` with an env filter; every
/// event emitted here carries the `ghagent_core` target so it can be
/// filtered independently (`RUST_LOG=ghagent_core=debug`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "ghagent_core", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "ghagent_core", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "ghagent_core", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "ghagent_core", "{}", message);
    }
}
