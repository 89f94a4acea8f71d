//! Logger trait definition

use std::sync::Arc;

/// Logging seam for library code
///
/// The core never installs a global subscriber. Binaries hand in a
/// [`TracingLogger`](super::TracingLogger); tests use [`NoOpLogger`](super::NoOpLogger).
/// Messages are prefixed with the emitting component, e.g. `"[SessionManager] ..."`.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str);

    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Shared logger handle passed between components
pub type SharedLogger = Arc<dyn Logger>;
