//! User-facing diagnostics.
//!
//! The pipeline's informational diagnostics (unused rules, recoverable
//! generation failures) go through this interface rather than being errors;
//! they never fail the run.

use std::sync::Mutex;

pub trait Logger {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes diagnostics to the `tracing` subscriber. The default choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Collects diagnostics in memory, for tests and embedders that surface
/// them out-of-band.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    messages: Mutex<Vec<(Level, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message logged so far, in order.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Just the message texts, in order.
    pub fn texts(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

impl Logger for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
