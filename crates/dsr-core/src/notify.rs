//! User-facing notifications
//!
//! Non-blocking toast-style messages. Failures never propagate past the
//! controller as faults; they end up here.

/// Receives user-visible messages
pub trait Notifier: Send + Sync {
    /// Mutation succeeded
    fn success(&self, message: &str);
    /// Operation failed
    fn error(&self, message: &str);
}

/// Notifier writing to the `tracing` pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "dsr::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "dsr::notify", "{message}");
    }
}
