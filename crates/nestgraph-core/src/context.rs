use crate::backend::{Backend, LeafHandle};
use crate::config::ComposerConfig;
use crate::error::BackendError;
use crate::log::{LogLevel, LogRecord, LogSink};
use std::sync::{Arc, OnceLock};

/// State shared by every node of one tree.
pub(crate) struct Context {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) config: ComposerConfig,
    sink: Arc<dyn LogSink>,
    output_sink: OnceLock<Result<LeafHandle, BackendError>>,
}

impl Context {
    pub(crate) fn new(backend: Arc<dyn Backend>, sink: Arc<dyn LogSink>, config: ComposerConfig) -> Self {
        Self {
            backend,
            config,
            sink,
            output_sink: OnceLock::new(),
        }
    }

    /// The shared output sink, fetched from the backend on first use.
    pub(crate) fn output_sink(&self) -> Result<LeafHandle, BackendError> {
        self.output_sink
            .get_or_init(|| self.backend.output_sink())
            .clone()
    }

    pub(crate) fn log(&self, level: LogLevel, path: &str, text: impl Into<String>) {
        self.sink.record(LogRecord::new(level, path, text));
    }

    pub(crate) fn trace(&self, path: &str, text: impl Into<String>) {
        self.log(LogLevel::Trace, path, text);
    }

    pub(crate) fn debug(&self, path: &str, text: impl Into<String>) {
        self.log(LogLevel::Debug, path, text);
    }

    pub(crate) fn info(&self, path: &str, text: impl Into<String>) {
        self.log(LogLevel::Info, path, text);
    }

    pub(crate) fn warn(&self, path: &str, text: impl Into<String>) {
        self.log(LogLevel::Warn, path, text);
    }

    pub(crate) fn error(&self, path: &str, text: impl Into<String>) {
        self.log(LogLevel::Error, path, text);
    }
}
