//! In-memory backend.

use crate::builtin::master_spec;
use crate::clock::ManualClock;
use crate::leaf::ReferenceLeaf;
use crate::param::ReferenceParam;
use crate::registry::LeafRegistry;
use nestgraph_core::{Backend, BackendError, Connectable, LeafArgs, LeafHandle};
use parking_lot::Mutex;
use std::sync::Arc;

/// A successful connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub source: String,
    pub destination: String,
    pub source_port: usize,
    pub destination_port: usize,
}

/// Backend that builds [`ReferenceLeaf`]s and records connections.
pub struct ReferenceBackend {
    registry: LeafRegistry,
    clock: Arc<ManualClock>,
    master: Arc<ReferenceLeaf>,
    connections: Mutex<Vec<ConnectionRecord>>,
}

impl ReferenceBackend {
    pub fn new() -> Self {
        Self::with_registry(LeafRegistry::default())
    }

    pub fn with_registry(registry: LeafRegistry) -> Self {
        let clock = Arc::new(ManualClock::new());
        let master = Arc::new(ReferenceLeaf::new(master_spec(), registry.next_id(), &clock));
        Self {
            registry,
            clock,
            master,
            connections: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &LeafRegistry {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<ManualClock> {
        &self.clock
    }

    pub fn master(&self) -> &Arc<ReferenceLeaf> {
        &self.master
    }

    pub fn connections(&self) -> Vec<ConnectionRecord> {
        self.connections.lock().clone()
    }

    fn check_source(leaf: &LeafHandle, port: usize) -> Result<(), BackendError> {
        let Some(leaf) = leaf.as_any().downcast_ref::<ReferenceLeaf>() else {
            return Ok(());
        };
        if leaf.is_disposed() {
            return Err(BackendError::Disposed(leaf.label().to_string()));
        }
        if port >= leaf.outputs() {
            return Err(BackendError::ConnectionRefused(format!(
                "{} has no output {port}",
                leaf.label()
            )));
        }
        Ok(())
    }

    fn check_destination(leaf: &LeafHandle, port: usize) -> Result<(), BackendError> {
        let Some(leaf) = leaf.as_any().downcast_ref::<ReferenceLeaf>() else {
            return Ok(());
        };
        if leaf.is_disposed() {
            return Err(BackendError::Disposed(leaf.label().to_string()));
        }
        if port >= leaf.inputs() {
            return Err(BackendError::ConnectionRefused(format!(
                "{} has no input {port}",
                leaf.label()
            )));
        }
        Ok(())
    }
}

impl Default for ReferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(target: &Connectable) -> String {
    match target {
        Connectable::Leaf(leaf) => leaf
            .as_any()
            .downcast_ref::<ReferenceLeaf>()
            .map(|leaf| leaf.label().to_string())
            .unwrap_or_else(|| leaf.type_name().to_string()),
        Connectable::Param(param) => match param.as_any().downcast_ref::<ReferenceParam>() {
            Some(reference) => format!("{}.{}", reference.owner(), param.name()),
            None => param.name().to_string(),
        },
    }
}

impl Backend for ReferenceBackend {
    fn create_leaf(&self, type_name: &str, args: LeafArgs) -> Result<LeafHandle, BackendError> {
        let leaf = self.registry.create(type_name, &args, &self.clock)?;
        tracing::debug!(type_name, ?args, "Created leaf");
        Ok(leaf)
    }

    fn connect(
        &self,
        source: &Connectable,
        destination: &Connectable,
        source_port: usize,
        destination_port: usize,
    ) -> Result<(), BackendError> {
        let Connectable::Leaf(source_leaf) = source else {
            tracing::warn!(source = %describe(source), "Refused parameter as connection source");
            return Err(BackendError::ConnectionRefused(format!(
                "parameter {} cannot be a connection source",
                describe(source)
            )));
        };
        Self::check_source(source_leaf, source_port)?;
        if let Connectable::Leaf(destination_leaf) = destination {
            Self::check_destination(destination_leaf, destination_port)?;
        }

        let record = ConnectionRecord {
            source: describe(source),
            destination: describe(destination),
            source_port,
            destination_port,
        };
        if let Some(leaf) = source_leaf.as_any().downcast_ref::<ReferenceLeaf>() {
            leaf.record_outgoing(record.destination.clone());
        }
        tracing::debug!(
            source = %record.source,
            destination = %record.destination,
            source_port,
            destination_port,
            "Connected"
        );
        self.connections.lock().push(record);
        Ok(())
    }

    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn output_sink(&self) -> Result<LeafHandle, BackendError> {
        Ok(Arc::clone(&self.master) as LeafHandle)
    }
}
