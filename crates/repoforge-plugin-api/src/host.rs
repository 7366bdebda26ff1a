//! Logging capability handed to plugins by their host.
//!
//! Plugins never write to a process-wide stream directly. They receive a
//! [`PluginLogger`] at construction; the default [`TracingLogger`] forwards to
//! `tracing`, while [`MemoryLogger`] records events so tests can assert on them.

use std::sync::{Arc, Mutex};

/// Log level for plugin logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured logging sink injected into a plugin.
pub trait PluginLogger: Send + Sync {
    /// Log a message on behalf of the plugin.
    fn log(&self, level: LogLevel, message: &str);
}

/// Logger that emits `tracing` events tagged with the plugin ID.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    plugin_id: String,
}

impl TracingLogger {
    pub fn new(plugin_id: impl Into<String>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
        }
    }

    /// Shared handle, ready to pass to a plugin constructor.
    pub fn shared(plugin_id: impl Into<String>) -> Arc<dyn PluginLogger> {
        Arc::new(Self::new(plugin_id))
    }
}

impl PluginLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(plugin = %self.plugin_id, "{}", message),
            LogLevel::Debug => tracing::debug!(plugin = %self.plugin_id, "{}", message),
            LogLevel::Info => tracing::info!(plugin = %self.plugin_id, "{}", message),
            LogLevel::Warn => tracing::warn!(plugin = %self.plugin_id, "{}", message),
            LogLevel::Error => tracing::error!(plugin = %self.plugin_id, "{}", message),
        }
    }
}

/// A recorded log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// In-memory logger for tests.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the plugin.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|record| record.message.contains(needle))
    }

    /// Recorded messages at `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .map(|record| record.message)
            .collect()
    }
}

impl PluginLogger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                level,
                message: message.to_string(),
            });
        }
    }
}
