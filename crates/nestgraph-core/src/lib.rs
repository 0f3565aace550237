//! Declarative composer for hierarchical node graphs.
//!
//! A [`Library`] of named [`Template`]s describes composite node types: their
//! content slots, internal wiring and exposed parameters. [`NestedNode`]
//! instantiates one recursively against a [`Backend`], wires it, composes a
//! flat API out of the nested structure and applies caller init values.
//!
//! Construction never fails. A bad template entry is logged through a
//! [`LogSink`] and only the affected slot, connection or API entry is lost.
//!
//! # Example
//! ```ignore
//! use nestgraph_core::{Library, NestedNode, Template};
//! use serde_json::json;
//!
//! let library = Library::new().with(
//!     "osc1",
//!     Template::new(1.0)
//!         .content("Backend.Oscillator")
//!         .output(0)
//!         .expose("freq", 0, "frequency"),
//! );
//!
//! let node = NestedNode::builder(backend)
//!     .library(&library)
//!     .node_type("osc1")
//!     .init(json!({"freq": 220}))
//!     .build();
//! assert!(node.is_ready());
//! node.start(&[]);
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod log;
pub mod template;

mod api;
mod builder;
mod connector;
mod construct;
mod context;
mod init;
mod node;
mod runtime;
mod value;

#[cfg(test)]
mod mock;

pub use api::ApiBinding;
pub use backend::{
    same_leaf, same_param, Backend, Connectable, LeafArgs, LeafHandle, LeafNode, Lifecycle,
    ParamHandle, Property, SchedulableParam,
};
pub use builder::NestedNodeBuilder;
pub use config::ComposerConfig;
pub use connector::{Port, Resolved, Role};
pub use error::{BackendError, ComposeError, Result};
pub use log::{LogLevel, LogRecord, LogSink, MemorySink, TracingSink};
pub use node::{ApiEntry, ConstDescriptor, ConstHandle, NestedNode, NodeState, Slot};
pub use template::{
    ApiDirective, ConnectionSpec, ContentSpec, Directives, Endpoint, Library, PortSpec, Template,
};
