//! Composer configuration: reserved type names and the root path.

use crate::{ComposeError, Result};

/// Configuration for node construction.
///
/// Type names starting with `namespace` are created by the backend; every
/// other type name is looked up in the template library.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    /// Prefix of backend primitive type names, including the separator.
    pub namespace: String,
    /// Reserved type name of the shared output sink.
    pub output_sink: String,
    /// Reserved type names that are recognised but cannot be built.
    pub unsupported_globals: Vec<String>,
    /// Path given to a top-level node when the caller supplies none.
    pub root_path: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self::with_namespace("Backend")
    }
}

impl ComposerConfig {
    /// Config whose reserved names live under `name`, e.g. `"Tone"` gives
    /// `"Tone.Master"` and `"Tone.Transport"`.
    pub fn with_namespace(name: &str) -> Self {
        Self {
            namespace: format!("{name}."),
            output_sink: format!("{name}.Master"),
            unsupported_globals: vec![format!("{name}.Transport")],
            root_path: "1".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(ComposeError::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }
        for reserved in std::iter::once(&self.output_sink).chain(&self.unsupported_globals) {
            if self.backend_type(reserved).is_none() {
                return Err(ComposeError::InvalidConfig(format!(
                    "reserved name {} is outside namespace {}",
                    reserved, self.namespace
                )));
            }
        }
        if self.root_path.is_empty() {
            return Err(ComposeError::InvalidConfig(
                "root path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Strip the namespace from a backend type name, `None` for template names.
    pub fn backend_type<'a>(&self, type_name: &'a str) -> Option<&'a str> {
        type_name
            .strip_prefix(self.namespace.as_str())
            .filter(|bare| !bare.is_empty())
    }

    pub fn is_output_sink(&self, type_name: &str) -> bool {
        self.output_sink == type_name
    }

    pub fn is_unsupported_global(&self, type_name: &str) -> bool {
        self.unsupported_globals.iter().any(|g| g == type_name)
    }
}
