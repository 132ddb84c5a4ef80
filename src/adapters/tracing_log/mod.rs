// Tracing log adapter - Structured logging using tracing crate

use crate::ports::*;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

/// Tracing log adapter
///
/// Events are emitted with target `quickedit::orchestrator` so the
/// request lifecycle can be filtered on its own.
pub struct TracingLogAdapter;

impl TracingLogAdapter {
    /// Create new tracing log adapter
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!(target: "quickedit::orchestrator", "{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!(target: "quickedit::orchestrator", "{}", message);
    }

    async fn error(&self, message: &str) {
        error!(target: "quickedit::orchestrator", "{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!(target: "quickedit::orchestrator", "{}", message);
    }
}
