//! Tracing setup and an in-memory status feed.
//!
//! `RunLogLayer` copies every event into a shared `LogBuffer` so a front end
//! can show run progress; the buffer can also be flushed to a log file.
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use tracing::{Event, Subscriber, field::Visit};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Result;

const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: tracing::Level,
    pub timestamp: String,
    pub message: String,
    pub target: String,
}

impl LogEntry {
    pub fn new(level: tracing::Level, message: String, target: String) -> Self {
        let timestamp = chrono::Utc::now().format("%H:%M:%S").to_string();
        Self {
            level,
            timestamp,
            message,
            target,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>5} {}: {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Bounded, shared list of recent log entries. Oldest entries are dropped first.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut buf) = self.entries.lock() {
            buf.push(entry);
            if buf.len() > MAX_ENTRIES {
                let excess = buf.len() - MAX_ENTRIES;
                buf.drain(..excess);
            }
        }
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for entry in self.snapshot() {
            writeln!(file, "{}", entry)?;
        }
        file.flush()?;
        Ok(())
    }
}

pub struct RunLogLayer {
    buffer: LogBuffer,
}

impl RunLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

impl<S> Layer<S> for RunLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        let message = if visitor.message.is_empty() {
            metadata.target().to_string()
        } else {
            visitor.message
        };
        self.buffer.push(LogEntry::new(
            *metadata.level(),
            message,
            metadata.target().to_string(),
        ));
    }
}

static GLOBAL_BUFFER: OnceCell<LogBuffer> = OnceCell::new();

/// Install the global subscriber once: stderr output filtered by `RUST_LOG`
/// (or `default_directive`), plus the shared run log. Later calls return the same buffer.
pub fn init_logging(default_directive: &str) -> LogBuffer {
    GLOBAL_BUFFER
        .get_or_init(|| {
            let buffer = LogBuffer::new();
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive));
            // Another subscriber may already be installed (e.g. by an embedding app)
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(RunLogLayer::new(buffer.clone()))
                .try_init();
            buffer
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    #[test]
    fn layer_captures_messages() {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(RunLogLayer::new(buffer.clone()));
        with_default(subscriber, || {
            tracing::info!("Processing {}", "2024-05");
            tracing::warn!(month = "2024-06", "no imagery");
        });
        let entries = buffer.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "Processing 2024-05");
        assert_eq!(entries[1].level, tracing::Level::WARN);
    }

    #[test]
    fn buffer_is_bounded_and_writable() {
        let buffer = LogBuffer::new();
        for i in 0..(MAX_ENTRIES + 5) {
            buffer.push(LogEntry::new(tracing::Level::INFO, i.to_string(), "t".into()));
        }
        assert_eq!(buffer.len(), MAX_ENTRIES);
        assert_eq!(buffer.snapshot()[0].message, "5");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        buffer.write_to(&path).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), MAX_ENTRIES);
    }
}
