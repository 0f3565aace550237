//! Reference leaf nodes.

use crate::clock::ManualClock;
use crate::lockfree::AtomicFlag;
use crate::param::ReferenceParam;
use crate::range::ParameterRange;
use nestgraph_core::{BackendError, LeafArgs, LeafNode, Lifecycle, ParamHandle, Property};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shape of a leaf type: its parameters, constants, io and lifecycle.
#[derive(Debug, Clone)]
pub struct LeafSpec {
    pub type_name: String,
    pub params: Vec<(String, ParameterRange)>,
    pub constants: Vec<(String, Value)>,
    /// Names assigned, in order, to positional constructor arguments.
    pub positional: Vec<String>,
    pub inputs: usize,
    pub outputs: usize,
    /// Whether `start` and `stop` are supported.
    pub startable: bool,
    pub disposable: bool,
}

impl LeafSpec {
    /// One input, one output, disposable, not startable.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: Vec::new(),
            constants: Vec::new(),
            positional: Vec::new(),
            inputs: 1,
            outputs: 1,
            startable: false,
            disposable: true,
        }
    }

    pub fn param(mut self, name: &str, range: ParameterRange) -> Self {
        self.params.push((name.to_string(), range));
        self
    }

    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.constants.push((name.to_string(), value));
        self
    }

    pub fn positional(mut self, names: &[&str]) -> Self {
        self.positional = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn io(mut self, inputs: usize, outputs: usize) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self
    }

    pub fn startable(mut self, startable: bool) -> Self {
        self.startable = startable;
        self
    }

    pub fn disposable(mut self, disposable: bool) -> Self {
        self.disposable = disposable;
        self
    }
}

/// In-memory leaf: named parameters and constants, lifecycle state and a
/// record of every lifecycle call. Renders nothing.
#[derive(Debug)]
pub struct ReferenceLeaf {
    id: u64,
    label: String,
    spec: LeafSpec,
    params: BTreeMap<String, Arc<ReferenceParam>>,
    constants: RwLock<BTreeMap<String, Value>>,
    started: AtomicFlag,
    disposed: AtomicFlag,
    calls: Mutex<Vec<(Lifecycle, Vec<Value>)>>,
    outgoing: Mutex<Vec<String>>,
}

impl ReferenceLeaf {
    pub fn new(spec: LeafSpec, id: u64, clock: &Arc<ManualClock>) -> Self {
        let label = format!("{}#{}", spec.type_name, id);
        let params = spec
            .params
            .iter()
            .map(|(name, range)| {
                let param = ReferenceParam::new(name.as_str(), label.as_str(), *range, Arc::clone(clock));
                (name.clone(), Arc::new(param))
            })
            .collect();
        let constants = spec.constants.iter().cloned().collect();
        Self {
            id,
            label,
            spec,
            params,
            constants: RwLock::new(constants),
            started: AtomicFlag::new(false),
            disposed: AtomicFlag::new(false),
            calls: Mutex::new(Vec::new()),
            outgoing: Mutex::new(Vec::new()),
        }
    }

    /// Build a leaf and apply constructor arguments.
    ///
    /// Positional arguments are matched with [`LeafSpec::positional`] names; a
    /// mapping sets properties by name; a lone scalar counts as the first
    /// positional argument.
    pub fn with_args(
        spec: LeafSpec,
        id: u64,
        args: &LeafArgs,
        clock: &Arc<ManualClock>,
    ) -> Result<Self, BackendError> {
        let leaf = Self::new(spec, id, clock);
        match args {
            LeafArgs::Positional(values) => leaf.apply_positional(values)?,
            LeafArgs::Options(Value::Object(options)) => {
                for (key, value) in options {
                    leaf.apply_arg(key, value)?;
                }
            }
            LeafArgs::Options(value) => leaf.apply_positional(std::slice::from_ref(value))?,
        }
        Ok(leaf)
    }

    fn apply_positional(&self, values: &[Value]) -> Result<(), BackendError> {
        if values.len() > self.spec.positional.len() {
            return Err(BackendError::InvalidArgument(format!(
                "{} takes at most {} positional arguments, got {}",
                self.spec.type_name,
                self.spec.positional.len(),
                values.len()
            )));
        }
        for (name, value) in self.spec.positional.iter().zip(values) {
            self.apply_arg(name, value)?;
        }
        Ok(())
    }

    fn apply_arg(&self, key: &str, value: &Value) -> Result<(), BackendError> {
        if value.is_null() {
            return Ok(());
        }
        match self.params.get(key) {
            Some(param) => {
                let number = value.as_f64().ok_or_else(|| {
                    BackendError::InvalidArgument(format!("{}.{key} expects a number, got {value}", self.label))
                })?;
                param.set_base_value(number)
            }
            None => self.assign_constant(key, value.clone()).map_err(|err| match err {
                BackendError::PropertyRejected { key, reason } => {
                    BackendError::InvalidArgument(format!("{}.{key}: {reason}", self.label))
                }
                other => other,
            }),
        }
    }

    fn assign_constant(&self, key: &str, value: Value) -> Result<(), BackendError> {
        let mut constants = self.constants.write();
        let Some(current) = constants.get_mut(key) else {
            return Err(BackendError::PropertyRejected {
                key: key.to_string(),
                reason: format!("{} has no such property", self.label),
            });
        };
        if !current.is_null() && !same_kind(current, &value) {
            return Err(BackendError::PropertyRejected {
                key: key.to_string(),
                reason: format!("cannot replace {current} with {value}"),
            });
        }
        *current = value;
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Type name plus id, e.g. `"Oscillator#3"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn spec(&self) -> &LeafSpec {
        &self.spec
    }

    pub fn inputs(&self) -> usize {
        self.spec.inputs
    }

    pub fn outputs(&self) -> usize {
        self.spec.outputs
    }

    pub fn param(&self, name: &str) -> Option<&Arc<ReferenceParam>> {
        self.params.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<Value> {
        self.constants.read().get(name).cloned()
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Lifecycle operations that succeeded, in order.
    pub fn calls(&self) -> Vec<Lifecycle> {
        self.calls.lock().iter().map(|(op, _)| *op).collect()
    }

    /// Arguments of the last successful `op` call.
    pub fn last_args(&self, op: Lifecycle) -> Option<Vec<Value>> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|(call, _)| *call == op)
            .map(|(_, args)| args.clone())
    }

    pub fn call_count(&self, op: Lifecycle) -> usize {
        self.calls.lock().iter().filter(|(call, _)| *call == op).count()
    }

    /// Destinations this leaf has been connected to.
    pub fn outgoing(&self) -> Vec<String> {
        self.outgoing.lock().clone()
    }

    pub(crate) fn record_outgoing(&self, destination: String) {
        self.outgoing.lock().push(destination);
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::String(_), Value::String(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

impl LeafNode for ReferenceLeaf {
    fn type_name(&self) -> &str {
        &self.spec.type_name
    }

    fn property(&self, key: &str) -> Option<Property> {
        if let Some(param) = self.params.get(key) {
            return Some(Property::Param(Arc::clone(param) as ParamHandle));
        }
        self.constant(key).map(Property::Constant)
    }

    fn set_property(&self, key: &str, value: Value) -> Result<(), BackendError> {
        if self.is_disposed() {
            return Err(BackendError::Disposed(self.label.clone()));
        }
        if self.params.contains_key(key) {
            return Err(BackendError::PropertyRejected {
                key: key.to_string(),
                reason: "is a schedulable parameter".to_string(),
            });
        }
        self.assign_constant(key, value)
    }

    fn invoke(&self, op: Lifecycle, args: &[Value]) -> Result<(), BackendError> {
        if self.is_disposed() {
            return Err(BackendError::Disposed(self.label.clone()));
        }
        let supported = match op {
            Lifecycle::Start | Lifecycle::Stop => self.spec.startable,
            Lifecycle::Dispose => self.spec.disposable,
        };
        if !supported {
            return Err(BackendError::Unsupported {
                type_name: self.spec.type_name.clone(),
                operation: op.to_string(),
            });
        }
        match op {
            Lifecycle::Start => self.started.set(true),
            Lifecycle::Stop => self.started.set(false),
            Lifecycle::Dispose => {
                self.started.set(false);
                self.disposed.set(true);
            }
        }
        self.calls.lock().push((op, args.to_vec()));
        tracing::trace!(leaf = %self.label, %op, "Lifecycle");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
