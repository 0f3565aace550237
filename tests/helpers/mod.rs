//! Test helpers and fixtures for nestgraph integration tests
//!
//! Every fixture runs against the in-memory reference backend and collects
//! log records in a [`MemorySink`] so tests can assert on diagnostics.

#![allow(dead_code)]

use nestgraph::prelude::*;
use nestgraph::{LeafHandle, Slot};
use nestgraph::reference::ReferenceLeaf;
use std::sync::Arc;

/// A small library covering one, two and three levels of nesting.
pub const SAMPLE_LIBRARY: &str = r#"{
    "osc1": {
        "level": 1,
        "contents": ["Backend.Oscillator"],
        "output": 0,
        "api": [["freq", 0, "frequency"], ["wave", 0, "type"]]
    },
    "amp": {
        "level": 1,
        "contents": [{"type": "Backend.Gain", "init": [0.5]}],
        "input": 0,
        "output": 0,
        "api": [["volume", 0, "gain"]]
    },
    "voice": {
        "level": 2,
        "contents": ["osc1", "amp", "Backend.Master"],
        "connect": [[[0], [1]], [[1], [2]]],
        "output": 1,
        "api": [{"copy": 0}, {"copy": 1, "prefix": "amp."}]
    },
    "poly": {
        "level": 3,
        "contents": ["voice", "voice", "Backend.LFO"],
        "connect": [[[2], [0, "freq"]], [[2], [1, "freq"]]],
        "output": 0,
        "api": [
            {"copy": 0, "prefix": "a."},
            {"copy": 1, "prefix": "b."},
            ["rate", 2, "frequency"]
        ]
    },
    "flat_chain": {
        "level": 1,
        "contents": ["Backend.Oscillator", "Backend.Gain", "Backend.Filter"],
        "connect": [[[0, "output"], [1]], [[0], [2]]],
        "input": 2,
        "output": 2
    },
    "same_level": {
        "level": 2,
        "contents": ["voice"],
        "output": 0
    }
}"#;

/// Reference backend, memory sink and the sample library.
pub struct Fixture {
    pub backend: Arc<ReferenceBackend>,
    pub sink: Arc<MemorySink>,
    pub library: Library,
}

impl Fixture {
    pub fn build(&self, node_type: &str, init: Value) -> NestedNode {
        NestedNode::builder(self.backend.clone())
            .library(&self.library)
            .node_type(node_type)
            .init(init)
            .log_sink(self.sink.clone())
            .build()
    }

    pub fn composer(&self) -> Composer {
        Composer::builder()
            .library(self.library.clone())
            .backend(self.backend.clone())
            .log_sink(self.sink.clone())
            .build()
            .expect("Failed to create test composer")
    }
}

pub fn fixture() -> Fixture {
    fixture_with(SAMPLE_LIBRARY)
}

pub fn fixture_with(library_json: &str) -> Fixture {
    init_tracing();
    Fixture {
        backend: Arc::new(ReferenceBackend::new()),
        sink: Arc::new(MemorySink::new()),
        library: Library::from_json_str(library_json).expect("Failed to parse test library"),
    }
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn reference(leaf: &LeafHandle) -> &ReferenceLeaf {
    leaf.as_any()
        .downcast_ref::<ReferenceLeaf>()
        .expect("leaf should come from the reference backend")
}

/// Every leaf in the tree, depth first.
pub fn collect_leaves(node: &NestedNode) -> Vec<LeafHandle> {
    let mut leaves = Vec::new();
    for slot in node.contents().iter().flatten() {
        match slot {
            Slot::Leaf(leaf) => leaves.push(leaf.clone()),
            Slot::Nested(child) => leaves.extend(collect_leaves(child)),
        }
    }
    leaves
}

/// Error records as `"path: text"` strings, for readable assertion failures.
pub fn error_lines(sink: &MemorySink) -> Vec<String> {
    sink.errors()
        .into_iter()
        .map(|r| format!("{}: {}", r.path, r.text))
        .collect()
}
