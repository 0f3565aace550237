//! Leaf registry for creating leaves from type names.
//!
//! Type names are the bare names the composer passes after stripping the
//! namespace, e.g. `"Oscillator"` for `"Backend.Oscillator"`.

use crate::builtin::register_builtin_leaves;
use crate::clock::ManualClock;
use crate::leaf::{LeafSpec, ReferenceLeaf};
use nestgraph_core::{BackendError, LeafArgs, LeafHandle};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Function that constructs a leaf from its id, arguments and the shared clock.
pub type LeafConstructor = Arc<
    dyn Fn(u64, &LeafArgs, &Arc<ManualClock>) -> Result<LeafHandle, BackendError> + Send + Sync,
>;

/// Registry of leaf constructors.
///
/// Clones share the same constructors and id counter.
pub struct LeafRegistry {
    constructors: Arc<RwLock<HashMap<String, LeafConstructor>>>,
    next_id: Arc<AtomicU64>,
}

impl LeafRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            constructors: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a leaf constructor
    ///
    /// # Example
    /// ```
    /// use nestgraph_reference::{LeafRegistry, LeafSpec, ReferenceLeaf};
    /// use std::sync::Arc;
    ///
    /// let registry = LeafRegistry::new();
    /// registry.register("Noise", |id, args, clock| {
    ///     let leaf = ReferenceLeaf::with_args(LeafSpec::new("Noise").io(0, 1), id, args, clock)?;
    ///     Ok(Arc::new(leaf))
    /// });
    /// assert!(registry.has_type("Noise"));
    /// ```
    pub fn register<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(u64, &LeafArgs, &Arc<ManualClock>) -> Result<LeafHandle, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .write()
            .insert(name.into(), Arc::new(constructor));
    }

    /// Register a [`ReferenceLeaf`] type under its spec's type name.
    pub fn register_spec(&self, spec: LeafSpec) {
        let name = spec.type_name.clone();
        self.register(name, move |id, args, clock| {
            let leaf = ReferenceLeaf::with_args(spec.clone(), id, args, clock)?;
            Ok(Arc::new(leaf))
        });
    }

    /// Create a leaf from a registered type name
    pub fn create(
        &self,
        name: &str,
        args: &LeafArgs,
        clock: &Arc<ManualClock>,
    ) -> Result<LeafHandle, BackendError> {
        let constructor = self
            .constructors
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::UnknownLeafType(name.to_string()))?;
        constructor(self.next_id(), args, clock)
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// List all registered types, sorted
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.constructors.read().keys().cloned().collect();
        types.sort();
        types
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.constructors.write().remove(name).is_some()
    }

    pub fn clear(&self) {
        self.constructors.write().clear();
    }
}

impl Default for LeafRegistry {
    fn default() -> Self {
        let registry = Self::new();
        register_builtin_leaves(&registry);
        registry
    }
}

impl Clone for LeafRegistry {
    fn clone(&self) -> Self {
        Self {
            constructors: Arc::clone(&self.constructors),
            next_id: Arc::clone(&self.next_id),
        }
    }
}
