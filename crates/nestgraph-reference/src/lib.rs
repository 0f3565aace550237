//! In-memory reference backend for nestgraph.
//!
//! Implements the [`nestgraph_core::Backend`] capability without rendering
//! any audio: leaves hold named parameters and constants, parameters keep
//! an event timeline that can be read back at any time, and a manually
//! advanced clock stands in for the audio clock.
//!
//! ```
//! use nestgraph_core::{Library, NestedNode, Template};
//! use nestgraph_reference::ReferenceBackend;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(ReferenceBackend::new());
//! let library = Library::new().with(
//!     "osc1",
//!     Template::new(1.0)
//!         .content("Backend.Oscillator")
//!         .output(0)
//!         .expose("freq", 0, "frequency"),
//! );
//! let node = NestedNode::builder(backend.clone())
//!     .library(&library)
//!     .node_type("osc1")
//!     .build();
//! assert!(node.is_ready());
//! assert!(node.param("freq").is_some());
//! ```

mod backend;
mod builtin;
mod clock;
mod leaf;
mod lockfree;
mod param;
mod range;
mod registry;

pub use backend::{ConnectionRecord, ReferenceBackend};
pub use clock::ManualClock;
pub use leaf::{LeafSpec, ReferenceLeaf};
pub use lockfree::{AtomicDouble, AtomicFlag};
pub use param::{ParamEvent, Ramp, ReferenceParam};
pub use range::ParameterRange;
pub use registry::{LeafConstructor, LeafRegistry};
