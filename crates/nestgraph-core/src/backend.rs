//! Backend capability interface.
//!
//! The composer never processes audio. Everything it builds bottoms out in
//! leaf nodes owned by a [`Backend`], and everything it schedules goes
//! through [`SchedulableParam`]. Capability detection (is this property a
//! schedulable parameter or a plain value?) happens here, at the adapter
//! boundary, via [`Property`].

use crate::error::BackendError;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a backend leaf.
pub type LeafHandle = Arc<dyn LeafNode>;

/// Shared handle to a schedulable parameter.
pub type ParamHandle = Arc<dyn SchedulableParam>;

/// Lifecycle operations propagated through a node tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Start,
    Stop,
    Dispose,
}

impl Lifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Dispose => "dispose",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructor arguments for a backend leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafArgs {
    /// Spread as positional constructor arguments.
    Positional(Vec<Value>),
    /// Passed whole, usually an options object.
    Options(Value),
}

impl LeafArgs {
    /// Lists are spread, anything else is passed whole. `null` means no args.
    pub fn from_init(init: &Value) -> Self {
        match init {
            Value::Array(items) => Self::Positional(items.clone()),
            Value::Null => Self::Positional(Vec::new()),
            other => Self::Options(other.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Positional(items) if items.is_empty())
    }
}

impl Default for LeafArgs {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

/// A named property read off a leaf.
#[derive(Debug, Clone)]
pub enum Property {
    /// Value that can be changed at a point on the backend's time axis.
    Param(ParamHandle),
    /// Plain value; `Value::Null` means the property is unset.
    Constant(Value),
}

/// A value that can be changed at a specific time on the backend clock.
pub trait SchedulableParam: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn schedule_value_at_time(&self, value: f64, time: f64) -> Result<(), BackendError>;

    /// Drop every change that has not taken effect yet.
    fn cancel_scheduled_changes(&self) -> Result<(), BackendError>;

    /// Invoke a named operation with positional arguments.
    ///
    /// Returns [`BackendError::UnknownOperation`] if the parameter has no
    /// operation called `operation`.
    fn call(&self, operation: &str, args: &[Value]) -> Result<(), BackendError>;

    fn as_any(&self) -> &dyn Any;
}

/// An opaque backend primitive.
pub trait LeafNode: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn property(&self, key: &str) -> Option<Property>;

    fn set_property(&self, key: &str, value: Value) -> Result<(), BackendError>;

    /// Run a lifecycle operation. Leaf types that do not support `op`
    /// return [`BackendError::Unsupported`].
    fn invoke(&self, op: Lifecycle, args: &[Value]) -> Result<(), BackendError>;

    fn as_any(&self) -> &dyn Any;
}

/// Anything that can sit at either end of a connection.
#[derive(Debug, Clone)]
pub enum Connectable {
    Leaf(LeafHandle),
    Param(ParamHandle),
}

impl Connectable {
    pub fn as_leaf(&self) -> Option<&LeafHandle> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Param(_) => None,
        }
    }

    pub fn as_param(&self) -> Option<&ParamHandle> {
        match self {
            Self::Param(param) => Some(param),
            Self::Leaf(_) => None,
        }
    }
}

impl fmt::Display for Connectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => f.write_str(leaf.type_name()),
            Self::Param(param) => write!(f, "param {}", param.name()),
        }
    }
}

/// The backend a node tree is built against.
pub trait Backend: Send + Sync {
    /// Create a leaf. `type_name` has the namespace already stripped.
    fn create_leaf(&self, type_name: &str, args: LeafArgs) -> Result<LeafHandle, BackendError>;

    fn connect(
        &self,
        source: &Connectable,
        destination: &Connectable,
        source_port: usize,
        destination_port: usize,
    ) -> Result<(), BackendError>;

    /// Current time on the backend's monotonic clock, in seconds.
    fn now(&self) -> f64;

    /// The process-wide output sink. Every call returns the same instance.
    fn output_sink(&self) -> Result<LeafHandle, BackendError>;
}

/// Identity comparison for leaf handles.
pub fn same_leaf(a: &LeafHandle, b: &LeafHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Identity comparison for parameter handles.
pub fn same_param(a: &ParamHandle, b: &ParamHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
