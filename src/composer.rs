//! Composer - a library, a backend and a log sink bundled for repeated builds.

use crate::ComposerBuilder;
use nestgraph_core::{Backend, ComposerConfig, Library, LogSink, NestedNode};
use serde_json::Value;
use std::sync::Arc;

/// Builds nested nodes from one template library against one backend.
///
/// Each call to [`build`](Self::build) constructs an independent tree; all
/// trees share the backend's output sink.
pub struct Composer {
    library: Library,
    backend: Arc<dyn Backend>,
    log_sink: Arc<dyn LogSink>,
    config: ComposerConfig,
}

impl Composer {
    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::default()
    }

    pub(crate) fn from_parts(
        library: Library,
        backend: Arc<dyn Backend>,
        log_sink: Arc<dyn LogSink>,
        config: ComposerConfig,
    ) -> Self {
        Self {
            library,
            backend,
            log_sink,
            config,
        }
    }

    /// Build `node_type` with `init` applied over its API.
    pub fn build(&self, node_type: &str, init: Value) -> NestedNode {
        self.build_at(node_type, init, &self.config.root_path)
    }

    /// Build with an explicit log path for the top-level node.
    pub fn build_at(&self, node_type: &str, init: Value, path: &str) -> NestedNode {
        NestedNode::builder(Arc::clone(&self.backend))
            .library(&self.library)
            .node_type(node_type)
            .init(init)
            .path(path)
            .log_sink(Arc::clone(&self.log_sink))
            .config(self.config.clone())
            .build()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }
}
