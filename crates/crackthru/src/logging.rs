//! Logging setup and an in-memory log buffer for diagnostics.
//!
//! [`init`] installs a `tracing-subscriber` registry with an
//! [`EnvFilter`] (`RUST_LOG`, default `info`), a formatting layer, and a
//! [`LogBuffer`] that keeps the most recent events for a support screen
//! or a bug report.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, fmt as fmt_layer};

/// Events kept by a default [`LogBuffer`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 500;

/// One captured event.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: SystemTime,
    pub level: Level,
    pub target: String,
    pub message: String,
    /// Structured fields other than the message, in recording order.
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5} {}: {}", self.level, self.target, self.message)?;
        for (k, v) in &self.fields {
            write!(f, " {k}={v}")?;
        }
        Ok(())
    }
}

/// A bounded ring buffer of recent log events.
///
/// Cloning shares the buffer: keep one clone for reading and hand the
/// other to the subscriber as a layer. When full, the oldest event is
/// dropped.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    capacity: usize,
    records: Arc<Mutex<VecDeque<LogRecord>>>,
}

impl LogBuffer {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, record: LogRecord) {
        let mut records = self.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl<S: Subscriber> Layer<S> for LogBuffer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        self.push(LogRecord {
            timestamp: SystemTime::now(),
            level: *meta.level(),
            target: meta.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl RecordVisitor {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

/// Installs the global subscriber with the default `info` filter and
/// returns the attached [`LogBuffer`].
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<LogBuffer, TryInitError> {
    init_with(LogBuffer::default(), "info")
}

/// Installs the global subscriber with `buffer` attached. `RUST_LOG`
/// wins over `default_directive` when set.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_with(
    buffer: LogBuffer,
    default_directive: &str,
) -> Result<LogBuffer, TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer::layer().with_target(true))
        .with(buffer.clone())
        .try_init()?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::Registry;

    use super::*;

    fn capture(buffer: &LogBuffer, f: impl FnOnce()) {
        let subscriber = Registry::default().with(buffer.clone());
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_buffer_captures_message_and_fields() {
        let buffer = LogBuffer::new(10);

        capture(&buffer, || {
            tracing::info!(user_id = "u-1", attempts = 2, "authenticated");
        });

        let records = buffer.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.level, Level::INFO);
        assert_eq!(record.message, "authenticated");
        assert_eq!(record.field("user_id"), Some("u-1"));
        assert_eq!(record.field("attempts"), Some("2"));
        assert!(record.to_string().contains("authenticated user_id=u-1"));
    }

    #[test]
    fn test_buffer_drops_oldest_when_full() {
        let buffer = LogBuffer::new(3);

        capture(&buffer, || {
            for i in 0..5 {
                tracing::warn!(i, "event");
            }
        });

        let kept: Vec<_> = buffer
            .records()
            .iter()
            .map(|r| r.field("i").unwrap_or_default().to_string())
            .collect();
        assert_eq!(kept, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_buffers_are_isolated() {
        let a = LogBuffer::new(5);
        let b = LogBuffer::new(5);

        capture(&a, || tracing::error!("only in a"));

        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        a.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(LogBuffer::new(0).capacity(), 1);
    }
}
