//! Builder for configuring and constructing a [`Composer`].

use crate::{Composer, Result};
use nestgraph_core::{Backend, ComposerConfig, Library, LogSink, TracingSink};
use std::sync::Arc;

/// Without an explicit backend, the in-memory reference backend is used
/// when the `reference` feature is enabled.
///
/// # Example
///
/// ```ignore
/// use nestgraph::prelude::*;
///
/// let composer = Composer::builder()
///     .library_json(include_str!("synths.json"))
///     .namespace("Tone")
///     .build()?;
///
/// let synth = composer.build("synth", json!({"volume": 0.5}));
/// synth.start(&[]);
/// ```
#[derive(Default)]
pub struct ComposerBuilder {
    library: Option<Library>,
    library_json: Option<String>,
    backend: Option<Arc<dyn Backend>>,
    log_sink: Option<Arc<dyn LogSink>>,
    config: ComposerConfig,
}

impl ComposerBuilder {
    pub fn library(mut self, library: Library) -> Self {
        self.library = Some(library);
        self
    }

    /// Parsed on [`build`](Self::build); replaces any library set with
    /// [`library`](Self::library).
    pub fn library_json(mut self, json: impl Into<String>) -> Self {
        self.library_json = Some(json.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Default: [`TracingSink`]
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn config(mut self, config: ComposerConfig) -> Self {
        self.config = config;
        self
    }

    /// Reserved type names under `name`, e.g. `"Tone"` for `"Tone.Master"`.
    pub fn namespace(mut self, name: &str) -> Self {
        self.config = ComposerConfig {
            root_path: self.config.root_path,
            ..ComposerConfig::with_namespace(name)
        };
        self
    }

    pub fn build(self) -> Result<Composer> {
        self.config.validate()?;

        let library = match self.library_json {
            Some(json) => Library::from_json_str(&json)?,
            None => self.library.unwrap_or_default(),
        };

        let backend = match self.backend {
            Some(backend) => backend,
            None => default_backend()?,
        };

        let log_sink = self
            .log_sink
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn LogSink>);

        tracing::info!(
            templates = library.len(),
            namespace = %self.config.namespace,
            "Composer ready"
        );
        Ok(Composer::from_parts(library, backend, log_sink, self.config))
    }
}

#[cfg(feature = "reference")]
fn default_backend() -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(nestgraph_reference::ReferenceBackend::new()))
}

#[cfg(not(feature = "reference"))]
fn default_backend() -> Result<Arc<dyn Backend>> {
    Err(crate::Error::NoBackend)
}
