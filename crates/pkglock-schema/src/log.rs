//! Logging capability handed to the lock file reader.

/// Receives warnings about lock files that could not be read.
pub trait Logger {
    fn warn(&self, message: &str);
}

/// Forwards warnings to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Drops every warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(&self, _message: &str) {}
}
