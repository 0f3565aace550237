//! Construction entry point.

use crate::backend::Backend;
use crate::config::ComposerConfig;
use crate::context::Context;
use crate::log::{LogLevel, LogRecord, LogSink, TracingSink};
use crate::node::NestedNode;
use crate::template::Library;
use serde_json::Value;
use std::sync::Arc;

/// Builder for a top-level [`NestedNode`].
///
/// # Example
/// ```ignore
/// let node = NestedNode::builder(backend)
///     .library(&library)
///     .node_type("synth")
///     .init(json!({"volume": 0.5}))
///     .build();
/// ```
pub struct NestedNodeBuilder<'a> {
    backend: Arc<dyn Backend>,
    library: Option<&'a Library>,
    node_type: Option<String>,
    init: Value,
    path: Option<String>,
    log_sink: Option<Arc<dyn LogSink>>,
    config: Option<ComposerConfig>,
}

impl NestedNode {
    pub fn builder<'a>(backend: Arc<dyn Backend>) -> NestedNodeBuilder<'a> {
        NestedNodeBuilder {
            backend,
            library: None,
            node_type: None,
            init: Value::Null,
            path: None,
            log_sink: None,
            config: None,
        }
    }
}

impl<'a> NestedNodeBuilder<'a> {
    pub fn library(mut self, library: &'a Library) -> Self {
        self.library = Some(library);
        self
    }

    pub fn node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Values applied over the composed API once it is built.
    pub fn init(mut self, init: Value) -> Self {
        self.init = init;
        self
    }

    /// Log tag of the top-level node (default from the config, `"1"`).
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn config(mut self, config: ComposerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the node. Never fails: problems are logged and leave the node
    /// partly built.
    pub fn build(self) -> NestedNode {
        let sink = self
            .log_sink
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn LogSink>);
        let config = match self.config {
            Some(config) => match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    sink.record(LogRecord::new(
                        LogLevel::Warn,
                        self.path.as_deref().unwrap_or_default(),
                        format!("{err}, using default config"),
                    ));
                    ComposerConfig::default()
                }
            },
            None => ComposerConfig::default(),
        };
        let path = self.path.unwrap_or_else(|| config.root_path.clone());
        let ctx = Arc::new(Context::new(self.backend, sink, config));
        NestedNode::construct(ctx, self.library, self.node_type.as_deref(), &self.init, path)
    }
}
