//! Sink for errors that cannot be reported to the client.

use std::error::Error;

/// Receives errors the transport layer cannot surface in a response,
/// such as request decoding or response encoding failures.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, context: &str, error: &(dyn Error + 'static));
}

/// Reports errors as `tracing` events at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorHandler;

impl ErrorHandler for TracingErrorHandler {
    fn handle(&self, context: &str, error: &(dyn Error + 'static)) {
        tracing::error!(error = %error, "{context}");
    }
}

/// Drops every error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorHandler;

impl ErrorHandler for NoopErrorHandler {
    fn handle(&self, _context: &str, _error: &(dyn Error + 'static)) {}
}
