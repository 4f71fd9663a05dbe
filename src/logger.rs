//! Instance-scoped logging capability.
//!
//! The loader reports through a [`Logger`] handed in at construction rather
//! than a process-global sink, so host applications can route or capture its
//! output per instance. The default implementation forwards to `tracing`.

use std::sync::Arc;

use crate::error::ApiError;

/// The two channels the loader reports on.
pub trait Logger: Send + Sync {
    /// Informational channel, e.g. fetch summaries.
    fn log(&self, message: &str);

    /// Error channel. `context` carries a method-identifying prefix such as
    /// `Loader.fetch_page error`.
    fn error(&self, context: &str, error: &ApiError);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, context: &str, error: &ApiError) {
        tracing::error!(error = %error, "{context}");
    }
}

pub(crate) fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}
