//! In-crate test backend.

use crate::backend::{Backend, Connectable, LeafArgs, LeafHandle, Lifecycle, LeafNode, ParamHandle, Property, SchedulableParam};
use crate::error::BackendError;
use crate::log::MemorySink;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) fn fixture() -> (Arc<MockBackend>, Arc<MemorySink>) {
    (Arc::new(MockBackend::new()), Arc::new(MemorySink::new()))
}

#[derive(Debug)]
pub(crate) struct MockParam {
    name: String,
    scheduled: Mutex<Vec<(f64, f64)>>,
    cancellations: Mutex<usize>,
}

impl MockParam {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            scheduled: Mutex::new(Vec::new()),
            cancellations: Mutex::new(0),
        })
    }

    pub(crate) fn scheduled(&self) -> Vec<(f64, f64)> {
        self.scheduled.lock().clone()
    }

    pub(crate) fn cancellations(&self) -> usize {
        *self.cancellations.lock()
    }
}

impl SchedulableParam for MockParam {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule_value_at_time(&self, value: f64, time: f64) -> Result<(), BackendError> {
        self.scheduled.lock().push((value, time));
        Ok(())
    }

    fn cancel_scheduled_changes(&self) -> Result<(), BackendError> {
        *self.cancellations.lock() += 1;
        Ok(())
    }

    fn call(&self, operation: &str, args: &[Value]) -> Result<(), BackendError> {
        match operation {
            "setValueAtTime" | "linearRampToValueAtTime" => {
                let (Some(value), Some(time)) = (
                    args.first().and_then(Value::as_f64),
                    args.get(1).and_then(Value::as_f64),
                ) else {
                    return Err(BackendError::InvalidArgument(format!(
                        "{operation} expects (value, time)"
                    )));
                };
                self.schedule_value_at_time(value, time)
            }
            "cancelScheduledValues" => self.cancel_scheduled_changes(),
            other => Err(BackendError::UnknownOperation(other.to_string())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub(crate) struct MockLeaf {
    kind: String,
    params: BTreeMap<String, Arc<MockParam>>,
    consts: Mutex<BTreeMap<String, Value>>,
    startable: bool,
    calls: Mutex<Vec<Lifecycle>>,
    disposed: Mutex<bool>,
}

impl MockLeaf {
    fn new(kind: &str, params: &[&str], consts: Value, startable: bool) -> Self {
        let consts = match consts {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Self {
            kind: kind.to_string(),
            params: params.iter().map(|name| (name.to_string(), MockParam::new(name))).collect(),
            consts: Mutex::new(consts),
            startable,
            calls: Mutex::new(Vec::new()),
            disposed: Mutex::new(false),
        }
    }

    pub(crate) fn osc() -> Self {
        Self::new(
            "Osc",
            &["frequency", "detune"],
            json!({"type": "sine", "phase": null, "offset": 0}),
            true,
        )
    }

    fn gain() -> Self {
        Self::new("Gain", &["gain"], json!({}), false)
    }

    fn master() -> Self {
        Self::new("Master", &["volume"], json!({"mute": false}), true)
    }

    pub(crate) fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn calls(&self) -> Vec<Lifecycle> {
        self.calls
            .lock()
            .iter()
            .copied()
            .filter(|op| *op != Lifecycle::Dispose)
            .collect()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        *self.disposed.lock()
    }
}

impl LeafNode for MockLeaf {
    fn type_name(&self) -> &str {
        &self.kind
    }

    fn property(&self, key: &str) -> Option<Property> {
        if let Some(param) = self.params.get(key) {
            return Some(Property::Param(Arc::clone(param) as ParamHandle));
        }
        self.consts.lock().get(key).cloned().map(Property::Constant)
    }

    fn set_property(&self, key: &str, value: Value) -> Result<(), BackendError> {
        let mut consts = self.consts.lock();
        let Some(current) = consts.get_mut(key) else {
            return Err(BackendError::PropertyRejected {
                key: key.to_string(),
                reason: "no such property".to_string(),
            });
        };
        let same_kind = matches!(
            (&*current, &value),
            (Value::String(_), Value::String(_))
                | (Value::Number(_), Value::Number(_))
                | (Value::Bool(_), Value::Bool(_))
        );
        if !same_kind {
            return Err(BackendError::PropertyRejected {
                key: key.to_string(),
                reason: format!("cannot assign {value}"),
            });
        }
        *current = value;
        Ok(())
    }

    fn invoke(&self, op: Lifecycle, _args: &[Value]) -> Result<(), BackendError> {
        if op != Lifecycle::Dispose && !self.startable {
            return Err(BackendError::Unsupported {
                type_name: self.kind.clone(),
                operation: op.to_string(),
            });
        }
        if op == Lifecycle::Dispose {
            *self.disposed.lock() = true;
        }
        self.calls.lock().push(op);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct MockBackend {
    now: Mutex<f64>,
    master: Arc<MockLeaf>,
    leaves: Mutex<Vec<Arc<MockLeaf>>>,
    created: Mutex<Vec<(String, LeafArgs)>>,
    connections: Mutex<Vec<(String, String)>>,
    sink_requests: Mutex<usize>,
    refuse_connections: bool,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self {
            now: Mutex::new(0.0),
            master: Arc::new(MockLeaf::master()),
            leaves: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            connections: Mutex::new(Vec::new()),
            sink_requests: Mutex::new(0),
            refuse_connections: false,
        }
    }

    pub(crate) fn refusing_connections() -> Self {
        Self {
            refuse_connections: true,
            ..Self::new()
        }
    }

    pub(crate) fn set_now(&self, now: f64) {
        *self.now.lock() = now;
    }

    pub(crate) fn leaves(&self) -> Vec<Arc<MockLeaf>> {
        self.leaves.lock().clone()
    }

    pub(crate) fn master(&self) -> Arc<MockLeaf> {
        Arc::clone(&self.master)
    }

    pub(crate) fn created(&self) -> Vec<(String, LeafArgs)> {
        self.created.lock().clone()
    }

    pub(crate) fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    pub(crate) fn output_sink_requests(&self) -> usize {
        *self.sink_requests.lock()
    }
}

impl Backend for MockBackend {
    fn create_leaf(&self, type_name: &str, args: LeafArgs) -> Result<LeafHandle, BackendError> {
        let leaf = match type_name {
            "Osc" => MockLeaf::osc(),
            "Gain" => MockLeaf::gain(),
            other => return Err(BackendError::UnknownLeafType(other.to_string())),
        };
        let leaf = Arc::new(leaf);
        self.leaves.lock().push(Arc::clone(&leaf));
        self.created.lock().push((type_name.to_string(), args));
        Ok(leaf)
    }

    fn connect(
        &self,
        source: &Connectable,
        destination: &Connectable,
        _source_port: usize,
        _destination_port: usize,
    ) -> Result<(), BackendError> {
        if self.refuse_connections || source.as_param().is_some() {
            return Err(BackendError::ConnectionRefused(format!(
                "{source} cannot feed {destination}"
            )));
        }
        self.connections
            .lock()
            .push((source.to_string(), destination.to_string()));
        Ok(())
    }

    fn now(&self) -> f64 {
        *self.now.lock()
    }

    fn output_sink(&self) -> Result<LeafHandle, BackendError> {
        *self.sink_requests.lock() += 1;
        Ok(Arc::clone(&self.master) as LeafHandle)
    }
}
