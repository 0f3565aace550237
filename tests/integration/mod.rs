//! Integration test modules for nestgraph

pub mod api;
pub mod composer;
pub mod runtime;
