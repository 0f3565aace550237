//! # nestgraph
//!
//! Declarative composer for hierarchical audio node graphs.
//!
//! ## Architecture
//!
//! nestgraph is organized into the following crates:
//!
//! - **nestgraph-core**: template library, recursive construction, wiring, API
//!   composition, init and lifecycle propagation. Defines the [`Backend`]
//!   capability a synthesis engine implements.
//! - **nestgraph-reference**: in-memory backend with a leaf registry,
//!   parameter event timelines and a manually advanced clock (optional,
//!   enabled with the `reference` feature).
//!
//! ## Quick Start
//!
//! ```
//! use nestgraph::prelude::*;
//!
//! let composer = Composer::builder()
//!     .library_json(
//!         r#"{
//!             "osc1": {
//!                 "level": 1,
//!                 "contents": ["Backend.Oscillator"],
//!                 "output": 0,
//!                 "api": [["freq", 0, "frequency"]]
//!             },
//!             "voice": {
//!                 "level": 2,
//!                 "contents": ["osc1", "Backend.Gain"],
//!                 "connect": [[[0], [1]]],
//!                 "output": 1,
//!                 "api": [{"copy": 0}, ["volume", 1, "gain"]]
//!             }
//!         }"#,
//!     )
//!     .build()?;
//!
//! let voice = composer.build("voice", json!({"freq": 220, "volume": 0.5}));
//! assert!(voice.is_ready());
//! voice.start(&[]);
//! # Ok::<(), nestgraph::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `reference` (default) - in-memory reference backend

pub use nestgraph_core as core;

#[cfg(feature = "reference")]
pub use nestgraph_reference as reference;

mod builder;
mod composer;
mod error;

pub use builder::ComposerBuilder;
pub use composer::Composer;
pub use error::{Error, Result};

// Templates
pub use nestgraph_core::{
    ApiDirective, ConnectionSpec, ContentSpec, Directives, Endpoint, Library, PortSpec, Template,
};

// Wiring
pub use nestgraph_core::{Port, Role};

// Nodes
pub use nestgraph_core::{
    ApiBinding, ApiEntry, ConstDescriptor, ConstHandle, NestedNode, NestedNodeBuilder, NodeState,
    Slot,
};

// Backend capability
pub use nestgraph_core::{
    Backend, BackendError, ComposeError, Connectable, LeafArgs, LeafHandle, LeafNode, Lifecycle,
    ParamHandle, Property, SchedulableParam,
};
pub use nestgraph_core::{same_leaf, same_param};

// Configuration and logging
pub use nestgraph_core::{ComposerConfig, LogLevel, LogRecord, LogSink, MemorySink, TracingSink};

#[cfg(feature = "reference")]
pub use nestgraph_reference::{LeafRegistry, LeafSpec, ManualClock, ReferenceBackend};

pub use serde_json::{json, Value};

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        json, Composer, ComposerBuilder, ComposerConfig, Error, Library, LogSink, MemorySink,
        NestedNode, NodeState, Result, Template, Value,
    };

    #[cfg(feature = "reference")]
    pub use crate::ReferenceBackend;
}
