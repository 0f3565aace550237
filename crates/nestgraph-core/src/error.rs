//! Error types for nestgraph-core.
//!
//! Nothing in here escapes the public construction entry point: every
//! [`ComposeError`] raised while building a node is reduced to a log record
//! and the affected node, slot, connection or API entry is left unset.

use crate::connector::{Port, Role};
use thiserror::Error;

/// Errors raised by a backend adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Unknown leaf type: {0}")]
    UnknownLeafType(String),

    #[error("{type_name} does not support {operation}")]
    Unsupported {
        type_name: String,
        operation: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Property '{key}' rejected: {reason}")]
    PropertyRejected { key: String, reason: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("{0} has been disposed")]
    Disposed(String),
}

/// Error type for node construction and runtime operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("library not supplied")]
    MissingLibrary,

    #[error("type not supplied")]
    MissingType,

    #[error("template {0} not found in library")]
    TemplateNotFound(String),

    #[error("level for template {type_name} is not a positive number: {level}")]
    InvalidLevel { type_name: String, level: f64 },

    #[error("could not add {inner} at level {inner_level} to {outer} at level {outer_level}")]
    LevelOrder {
        inner: String,
        inner_level: f64,
        outer: String,
        outer_level: f64,
    },

    #[error("{0} is a reserved global that is not supported")]
    UnsupportedGlobal(String),

    #[error("content {0} not recognised")]
    UnrecognisedContent(String),

    #[error("at least one nested node of template {0} did not construct correctly")]
    IncompleteContents(String),

    #[error("{node} does not have {port}")]
    MissingIo { node: String, port: Port },

    #[error("{role} node {slot} not found")]
    SlotNotPopulated { role: Role, slot: String },

    #[error("{role} {node} does not have param {label}")]
    MissingParam {
        role: Role,
        node: String,
        label: String,
    },

    #[error("{label} inside {node} is not a schedulable parameter")]
    NotSchedulable { node: String, label: String },

    #[error("connection {0} is not a [source, destination] pair")]
    MalformedConnection(String),

    #[error("connect {0} is not a list of connections")]
    ConnectNotList(String),

    #[error("either source {source_ref} or destination {destination_ref} are not valid")]
    InvalidConnection {
        source_ref: String,
        destination_ref: String,
    },

    #[error("could not connect from {from} to {to}: {reason}")]
    ConnectFailed {
        from: String,
        to: String,
        reason: BackendError,
    },

    #[error("api entry {0} should be [label, index, label] or {{copy, prefix}}")]
    MalformedApiEntry(String),

    #[error("api slot {0} is not populated")]
    ApiSlotNotPopulated(usize),

    #[error("did not find {label} inside {node}")]
    ApiTargetMissing { node: String, label: String },

    #[error("copy directive invalid: {0}")]
    InvalidCopy(String),

    #[error("cannot initialise {node} on {payload}, require an object instead")]
    InvalidInit { node: String, payload: String },

    #[error("could not find param or const for {node} init of {label}")]
    UnknownApiLabel { node: String, label: String },

    #[error("value {value} for param {label} is not a number")]
    NonNumericValue { label: String, value: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, ComposeError>;
