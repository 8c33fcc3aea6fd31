//! Logging utilities and the injectable diagnostic sink
//!
//! Components never print. They record through a [`Logger`], which forwards
//! to an injected `log::Log` implementation or, when none was injected, to
//! the global `log` facade. The record target carries the component
//! category (for example `pal::window`).

use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Record};

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Diagnostic sink handed to every platform component
#[derive(Clone)]
pub struct Logger {
    sink: Option<Arc<dyn Log>>,
    category: &'static str,
}

impl Logger {
    /// A logger that forwards to the global `log` facade
    pub fn global() -> Self {
        Self {
            sink: None,
            category: "pal",
        }
    }

    /// A logger that forwards to `sink`
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink: Some(sink),
            category: "pal",
        }
    }

    /// Same sink, different category
    #[must_use]
    pub fn with_category(&self, category: &'static str) -> Self {
        Self {
            sink: self.sink.clone(),
            category,
        }
    }

    /// The category (record target) of this logger
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Record a message with the given severity
    pub fn record(&self, level: Level, args: fmt::Arguments<'_>) {
        let sink: &dyn Log = match &self.sink {
            Some(sink) => sink.as_ref(),
            None => {
                if level > log::max_level() {
                    return;
                }
                log::logger()
            }
        };

        let record = Record::builder()
            .args(args)
            .level(level)
            .target(self.category)
            .build();
        if sink.enabled(record.metadata()) {
            sink.log(&record);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("injected", &self.sink.is_some())
            .finish()
    }
}

/// `pal_log!(logger, Info, "created {:?}", handle)`
macro_rules! pal_log {
    ($logger:expr, $level:ident, $($arg:tt)+) => {
        $logger.record(::log::Level::$level, format_args!($($arg)+))
    };
}

pub(crate) use pal_log;

/// A `log::Log` that keeps every record in memory, for tests
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingLogger {
    records: std::sync::Mutex<Vec<(Level, String, String)>>,
}

#[cfg(test)]
impl RecordingLogger {
    /// (level, target, message) of every record so far
    pub fn records(&self) -> Vec<(Level, String, String)> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// True if any record's target equals `category`
    pub fn saw_category(&self, category: &str) -> bool {
        self.records().iter().any(|(_, target, _)| target == category)
    }
}

#[cfg(test)]
impl Log for RecordingLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_sink_receives_category_and_level() {
        let sink = Arc::new(RecordingLogger::default());
        let logger = Logger::new(sink.clone()).with_category("pal::window");

        pal_log!(logger, Warn, "window {} lost", 3);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, Level::Warn);
        assert_eq!(records[0].1, "pal::window");
        assert_eq!(records[0].2, "window 3 lost");
    }

    #[test]
    fn test_with_category_keeps_sink() {
        let sink = Arc::new(RecordingLogger::default());
        let base = Logger::new(sink.clone());
        let display = base.with_category("pal::display");

        pal_log!(display, Debug, "enumerated");
        assert_eq!(base.category(), "pal");
        assert!(sink.saw_category("pal::display"));
    }

    #[test]
    fn test_global_logger_does_not_panic_without_backend() {
        let logger = Logger::global();
        pal_log!(logger, Trace, "nobody is listening");
        assert_eq!(format!("{logger:?}"), "Logger { category: \"pal\", injected: false }");
    }
}
