//! Navigation collaborator for the rule editor

/// Performs route transitions
///
/// Opening or closing the editor is a navigation; whoever renders the modal
/// derives its state from the resulting path.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`
    fn navigate(&self, path: &str);
}

/// Navigator that only logs transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(target: "dsr::navigation", %path, "navigate");
    }
}
