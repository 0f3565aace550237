//! The nested node composite.
//!
//! A [`NestedNode`] owns an ordered list of content slots, each holding a
//! backend leaf or another nested node. It exposes a flat API of
//! schedulable parameters and constants composed from arbitrarily deep
//! internal structure, plus at most one input and one output.

use crate::backend::{LeafHandle, ParamHandle};
use crate::connector::Port;
use crate::context::Context;
use crate::error::{BackendError, ComposeError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One content slot.
#[derive(Debug)]
pub enum Slot {
    Leaf(LeafHandle),
    Nested(Box<NestedNode>),
}

impl Slot {
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    pub fn as_leaf(&self) -> Option<&LeafHandle> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&NestedNode> {
        match self {
            Self::Nested(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => f.write_str(leaf.type_name()),
            Self::Nested(node) => fmt::Display::fmt(node, f),
        }
    }
}

/// How far construction got.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    /// Never built, failed validation, or disposed.
    Reset,
    /// Construction stopped at the contained error.
    Failed(ComposeError),
    /// Every stage up to API composition finished.
    Ready,
}

/// A plain property exposed through a node's API.
///
/// Shared between every level that re-exports it, so an assignment at any
/// level is visible everywhere.
#[derive(Debug)]
pub struct ConstDescriptor {
    owner: LeafHandle,
    key: String,
    value: Mutex<Value>,
}

/// Shared constant descriptor.
pub type ConstHandle = Arc<ConstDescriptor>;

impl ConstDescriptor {
    pub fn new(owner: LeafHandle, key: impl Into<String>, value: Value) -> Self {
        Self {
            owner,
            key: key.into(),
            value: Mutex::new(value),
        }
    }

    pub fn owner(&self) -> &LeafHandle {
        &self.owner
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last value assigned through this descriptor.
    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }

    /// Write onto the owning leaf, then record the new value.
    pub fn assign(&self, value: Value) -> Result<(), BackendError> {
        self.owner.set_property(&self.key, value.clone())?;
        *self.value.lock() = value;
        Ok(())
    }
}

/// One entry of a node's API.
#[derive(Debug, Clone)]
pub enum ApiEntry {
    Param(ParamHandle),
    Const(ConstHandle),
}

/// Composite node built from a template.
pub struct NestedNode {
    pub(crate) ctx: Arc<Context>,
    pub(crate) path: String,
    pub(crate) state: NodeState,
    pub(crate) node_type: Option<String>,
    pub(crate) level: Option<f64>,
    pub(crate) input: Option<LeafHandle>,
    pub(crate) output: Option<LeafHandle>,
    pub(crate) contents: Vec<Option<Slot>>,
    pub(crate) connects: Vec<String>,
    pub(crate) params: BTreeMap<String, ParamHandle>,
    pub(crate) consts: BTreeMap<String, ConstHandle>,
}

impl NestedNode {
    pub(crate) fn empty(ctx: Arc<Context>, path: String) -> Self {
        Self {
            ctx,
            path,
            state: NodeState::Reset,
            node_type: None,
            level: None,
            input: None,
            output: None,
            contents: Vec::new(),
            connects: Vec::new(),
            params: BTreeMap::new(),
            consts: BTreeMap::new(),
        }
    }

    /// Clear every field except the path.
    pub(crate) fn reset(&mut self) {
        self.state = NodeState::Reset;
        self.node_type = None;
        self.level = None;
        self.input = None;
        self.output = None;
        self.contents.clear();
        self.connects.clear();
        self.params.clear();
        self.consts.clear();
    }

    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Dotted slot address used to tag log records.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn input(&self) -> Option<&LeafHandle> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&LeafHandle> {
        self.output.as_ref()
    }

    pub fn io(&self, port: Port) -> Option<&LeafHandle> {
        match port {
            Port::Input => self.input(),
            Port::Output => self.output(),
        }
    }

    pub fn contents(&self) -> &[Option<Slot>] {
        &self.contents
    }

    /// A populated slot.
    pub fn slot(&self, idx: usize) -> Option<&Slot> {
        self.contents.get(idx).and_then(Option::as_ref)
    }

    /// Descriptions of successful internal connections, in template order.
    pub fn connects(&self) -> &[String] {
        &self.connects
    }

    pub fn params(&self) -> &BTreeMap<String, ParamHandle> {
        &self.params
    }

    pub fn consts(&self) -> &BTreeMap<String, ConstHandle> {
        &self.consts
    }

    pub fn param(&self, label: &str) -> Option<&ParamHandle> {
        self.params.get(label)
    }

    pub fn constant(&self, label: &str) -> Option<&ConstHandle> {
        self.consts.get(label)
    }

    /// The `(param, const)` pair registered under `label`.
    pub fn api_entry(&self, label: &str) -> (Option<&ParamHandle>, Option<&ConstHandle>) {
        (self.param(label), self.constant(label))
    }

    /// The API entry under `label`, params first.
    pub fn entry(&self, label: &str) -> Option<ApiEntry> {
        match self.api_entry(label) {
            (Some(param), _) => Some(ApiEntry::Param(Arc::clone(param))),
            (None, Some(constant)) => Some(ApiEntry::Const(Arc::clone(constant))),
            (None, None) => None,
        }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == NodeState::Ready
    }
}

impl fmt::Display for NestedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_type.as_deref().unwrap_or("null"))
    }
}

impl fmt::Debug for NestedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedNode")
            .field("path", &self.path)
            .field("node_type", &self.node_type)
            .field("level", &self.level)
            .field("state", &self.state)
            .field("contents", &self.contents)
            .field("connects", &self.connects)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("consts", &self.consts.keys().collect::<Vec<_>>())
            .finish()
    }
}
