//! Template model and library.
//!
//! Templates are read-only descriptions of composite node types. They load
//! from JSON or are built in code:
//!
//! ```
//! use nestgraph_core::{Library, Template};
//!
//! let library = Library::new().with(
//!     "osc1",
//!     Template::new(1.0)
//!         .content("Backend.Oscillator")
//!         .output(0)
//!         .expose("freq", 0, "frequency"),
//! );
//! assert!(library.contains("osc1"));
//! ```
//!
//! Entries that do not match any recognised shape deserialize into an
//! `Other` variant instead of failing, so a single bad entry is reported when
//! the node is built rather than rejecting the whole library. The same holds
//! for the `contents`, `connect` and `api` fields themselves.

use crate::connector::Port;
use crate::value::{display, is_container, slot_index};
use crate::{ComposeError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Static description of a composite node type.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    /// Must be positive and finite; strictly decreases along containment.
    #[serde(default = "missing_level", deserialize_with = "lenient_level")]
    pub level: f64,
    #[serde(default, deserialize_with = "lenient_contents")]
    pub contents: Vec<ContentSpec>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub input: Option<usize>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub output: Option<usize>,
    #[serde(default)]
    pub connect: Option<Directives<ConnectionSpec>>,
    #[serde(default)]
    pub api: Option<Directives<ApiDirective>>,
}

fn missing_level() -> f64 {
    f64::NAN
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|v| v.as_f64().unwrap_or(f64::NAN))
}

fn lenient_index<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<Option<usize>, D::Error> {
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().and_then(slot_index))
}

/// A non-list `contents` becomes a single unrecognised entry.
fn lenient_contents<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<Vec<ContentSpec>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().map(ContentSpec::from_value).collect()),
        other => Ok(vec![ContentSpec::Other(other)]),
    }
}

/// A `connect` or `api` field: a list of entries, or whatever else was given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Directives<T> {
    List(Vec<T>),
    Other(Value),
}

impl<T> Directives<T> {
    pub fn as_list(&self) -> Option<&[T]> {
        match self {
            Self::List(items) => Some(items),
            Self::Other(_) => None,
        }
    }

    /// Append an entry, replacing a non-list value.
    pub fn push(&mut self, item: T) {
        match self {
            Self::List(items) => items.push(item),
            Self::Other(_) => *self = Self::List(vec![item]),
        }
    }

    pub fn len(&self) -> usize {
        self.as_list().map_or(0, <[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Directives<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl<T> From<Vec<T>> for Directives<T> {
    fn from(items: Vec<T>) -> Self {
        Self::List(items)
    }
}

impl Template {
    pub fn new(level: f64) -> Self {
        Self {
            level,
            contents: Vec::new(),
            input: None,
            output: None,
            connect: None,
            api: None,
        }
    }

    pub fn content(mut self, spec: impl Into<ContentSpec>) -> Self {
        self.contents.push(spec.into());
        self
    }

    pub fn input(mut self, slot: usize) -> Self {
        self.input = Some(slot);
        self
    }

    pub fn output(mut self, slot: usize) -> Self {
        self.output = Some(slot);
        self
    }

    pub fn connect(mut self, source: impl Into<Endpoint>, destination: impl Into<Endpoint>) -> Self {
        self.connect
            .get_or_insert_with(Directives::default)
            .push(ConnectionSpec::Pair(source.into(), destination.into()));
        self
    }

    pub fn api(mut self, directive: ApiDirective) -> Self {
        self.api.get_or_insert_with(Directives::default).push(directive);
        self
    }

    /// Expose `inner` from slot `slot` as `label`.
    pub fn expose(self, label: &str, slot: usize, inner: &str) -> Self {
        self.api(ApiDirective::expose(label, slot, inner))
    }

    /// Re-export the whole API of nested slot `slot` under `prefix`.
    pub fn copy_api(self, slot: usize, prefix: Option<&str>) -> Self {
        self.api(ApiDirective::copy(slot, prefix))
    }

    /// Declare an API with no directives, so construction runs the init stage.
    pub fn empty_api(mut self) -> Self {
        self.api.get_or_insert_with(Directives::default);
        self
    }

    pub fn io_index(&self, port: Port) -> Option<usize> {
        match port {
            Port::Input => self.input,
            Port::Output => self.output,
        }
    }
}

/// One content slot entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ContentSpec {
    /// Type name with no init.
    Type(String),
    /// `[type, ...positional]`, or `[type, payload]` when the second element
    /// is a list or mapping.
    List(Vec<Value>),
    /// `{type, init}`.
    Entry {
        #[serde(rename = "type")]
        node_type: String,
        #[serde(default)]
        init: Option<Value>,
    },
    Other(Value),
}

impl ContentSpec {
    fn from_value(value: Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(Self::Other(value))
    }

    pub fn with_init(node_type: &str, init: Value) -> Self {
        Self::Entry {
            node_type: node_type.to_string(),
            init: Some(init),
        }
    }

    /// Split into `(type, init)`. A scalar `init` is wrapped in a list; a
    /// missing one becomes the empty list.
    pub fn classify(&self) -> Result<(String, Value)> {
        match self {
            Self::Type(node_type) => Ok((node_type.clone(), Value::Array(Vec::new()))),
            Self::List(items) => match items.split_first() {
                Some((Value::String(node_type), rest)) => {
                    let init = match rest.first() {
                        Some(first) if is_container(first) => first.clone(),
                        _ => Value::Array(rest.to_vec()),
                    };
                    Ok((node_type.clone(), init))
                }
                _ => Err(ComposeError::UnrecognisedContent(display(&Value::Array(
                    items.clone(),
                )))),
            },
            Self::Entry { node_type, init } => {
                let init = match init {
                    Some(value) if is_container(value) => value.clone(),
                    Some(Value::Null) | None => Value::Array(Vec::new()),
                    Some(value) => Value::Array(vec![value.clone()]),
                };
                Ok((node_type.clone(), init))
            }
            Self::Other(value) => Err(ComposeError::UnrecognisedContent(display(value))),
        }
    }
}

impl From<&str> for ContentSpec {
    fn from(node_type: &str) -> Self {
        Self::Type(node_type.to_string())
    }
}

impl From<String> for ContentSpec {
    fn from(node_type: String) -> Self {
        Self::Type(node_type)
    }
}

/// Internal connection `[source, destination]`.
///
/// Elements past the first two are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ConnectionSpec {
    Pair(Endpoint, Endpoint),
    Other(Value),
}

impl From<Value> for ConnectionSpec {
    fn from(value: Value) -> Self {
        match &value {
            Value::Array(items) if items.len() >= 2 => {
                Self::Pair(Endpoint::from(items[0].clone()), Endpoint::from(items[1].clone()))
            }
            _ => Self::Other(value),
        }
    }
}

/// Port selector on a connection endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    /// Numbered port on a leaf or nested io.
    Index(usize),
    /// Schedulable parameter label.
    Label(String),
}

/// One end of a connection: a slot index plus an optional port.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Endpoint {
    Ref { slot: usize, port: Option<PortSpec> },
    Invalid(Value),
}

impl Endpoint {
    pub fn slot(slot: usize) -> Self {
        Self::Ref { slot, port: None }
    }

    pub fn port(slot: usize, port: usize) -> Self {
        Self::Ref {
            slot,
            port: Some(PortSpec::Index(port)),
        }
    }

    pub fn param(slot: usize, label: &str) -> Self {
        Self::Ref {
            slot,
            port: Some(PortSpec::Label(label.to_string())),
        }
    }
}

impl From<Value> for Endpoint {
    fn from(value: Value) -> Self {
        if let Some(slot) = slot_index(&value) {
            return Self::slot(slot);
        }
        let slot = match &value {
            Value::Array(items) => items.first().and_then(slot_index),
            _ => None,
        };
        let Some(slot) = slot else {
            return Self::Invalid(value);
        };
        let port = match value.get(1) {
            Some(Value::String(label)) => Some(PortSpec::Label(label.clone())),
            Some(other) => slot_index(other).map(PortSpec::Index),
            None => None,
        };
        Self::Ref { slot, port }
    }
}

impl From<usize> for Endpoint {
    fn from(slot: usize) -> Self {
        Self::slot(slot)
    }
}

impl From<(usize, usize)> for Endpoint {
    fn from((slot, port): (usize, usize)) -> Self {
        Self::port(slot, port)
    }
}

impl From<(usize, &str)> for Endpoint {
    fn from((slot, label): (usize, &str)) -> Self {
        Self::param(slot, label)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref { slot, port: None } => write!(f, "[{slot}]"),
            Self::Ref {
                slot,
                port: Some(PortSpec::Index(port)),
            } => write!(f, "[{slot}, {port}]"),
            Self::Ref {
                slot,
                port: Some(PortSpec::Label(label)),
            } => write!(f, "[{slot}, {}]", display(&Value::String(label.clone()))),
            Self::Invalid(value) => f.write_str(&display(value)),
        }
    }
}

/// API directive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ApiDirective {
    /// `[exposedLabel, slotIndex, innerLabel]`. Further elements are ignored.
    Expose(String, usize, String),
    /// `{copy: slotIndex, prefix?}`. Fields stay dynamic so an invalid index
    /// or prefix is reported when the node is built.
    Copy {
        copy: Value,
        prefix: Option<Value>,
    },
    Other(Value),
}

impl From<Value> for ApiDirective {
    fn from(value: Value) -> Self {
        match &value {
            Value::Array(items) => match items.as_slice() {
                [Value::String(label), slot, Value::String(inner), ..] => match slot_index(slot) {
                    Some(slot) => Self::Expose(label.clone(), slot, inner.clone()),
                    None => Self::Other(value),
                },
                _ => Self::Other(value),
            },
            Value::Object(fields) => match fields.get("copy") {
                Some(copy) => Self::Copy {
                    copy: copy.clone(),
                    prefix: fields.get("prefix").filter(|p| !p.is_null()).cloned(),
                },
                None => Self::Other(value),
            },
            _ => Self::Other(value),
        }
    }
}

impl ApiDirective {
    pub fn expose(label: &str, slot: usize, inner: &str) -> Self {
        Self::Expose(label.to_string(), slot, inner.to_string())
    }

    pub fn copy(slot: usize, prefix: Option<&str>) -> Self {
        Self::Copy {
            copy: Value::from(slot),
            prefix: prefix.map(Value::from),
        }
    }
}

/// Mapping from type name to template.
#[derive(Debug, Clone, Default)]
pub struct Library {
    templates: BTreeMap<String, Template>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, template: Template) -> Option<Template> {
        self.templates.insert(name.into(), template)
    }

    pub fn with(mut self, name: impl Into<String>, template: Template) -> Self {
        self.insert(name, template);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Load a library from a JSON object of templates.
    ///
    /// Entries that are not JSON objects are skipped with a warning.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        use serde::de::Error as _;

        let Value::Object(entries) = value else {
            return Err(serde_json::Error::custom(
                "template library must be a JSON object",
            ));
        };
        let mut library = Self::new();
        for (name, raw) in entries {
            match serde_json::from_value::<Template>(raw) {
                Ok(template) => {
                    library.insert(name, template);
                }
                Err(err) => {
                    tracing::warn!(template = %name, error = %err, "Skipping malformed template");
                }
            }
        }
        tracing::debug!(count = library.len(), "Loaded template library");
        Ok(library)
    }
}
