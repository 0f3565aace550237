//! Runtime operations on a built tree.

use crate::backend::Lifecycle;
use crate::error::BackendError;
use crate::node::{NestedNode, Slot};
use serde_json::Value;

impl NestedNode {
    /// Start every slot. Slots that cannot start are skipped.
    pub fn start(&self, args: &[Value]) {
        self.propagate(Lifecycle::Start, args);
    }

    /// Stop every slot. Slots that cannot stop are skipped.
    pub fn stop(&self, args: &[Value]) {
        self.propagate(Lifecycle::Stop, args);
    }

    fn propagate(&self, op: Lifecycle, args: &[Value]) {
        for (idx, slot) in self.contents.iter().enumerate() {
            match slot {
                Some(Slot::Nested(child)) => child.propagate(op, args),
                Some(Slot::Leaf(leaf)) => {
                    if let Err(err) = leaf.invoke(op, args) {
                        self.ctx
                            .trace(&self.path, format!("{op} skipped for slot {idx}: {err}"));
                    }
                }
                None => {}
            }
        }
    }

    /// Dispose every slot, then reset this node.
    ///
    /// The shared output sink gets the call like any other leaf; whether it
    /// goes away is up to the backend. The node cannot be rebuilt in place
    /// afterwards.
    pub fn dispose(&mut self, args: &[Value]) {
        let contents = std::mem::take(&mut self.contents);
        for (idx, slot) in contents.into_iter().enumerate() {
            match slot {
                Some(Slot::Nested(mut child)) => child.dispose(args),
                Some(Slot::Leaf(leaf)) => {
                    if let Err(err) = leaf.invoke(Lifecycle::Dispose, args) {
                        self.ctx
                            .trace(&self.path, format!("dispose skipped for slot {idx}: {err}"));
                    }
                }
                None => {}
            }
        }
        self.ctx.debug(&self.path, format!("{self} disposed"));
        self.reset();
    }

    /// Cancel pending changes on this node's exposed parameters.
    pub fn cancel_scheduled_values(&self) {
        for (label, param) in &self.params {
            if let Err(err) = param.cancel_scheduled_changes() {
                self.ctx
                    .trace(&self.path, format!("cancel skipped for param {label}: {err}"));
            }
        }
    }

    /// Invoke a named operation on an exposed parameter.
    ///
    /// Returns `true` only if the operation exists and ran without error.
    pub fn update_param(&self, label: &str, operation: &str, args: &[Value]) -> bool {
        if label.is_empty() || operation.is_empty() {
            self.ctx.error(
                &self.path,
                "parameter update should receive a label and an operation",
            );
            return false;
        }
        let Some(param) = self.param(label) else {
            self.ctx.error(&self.path, format!("not found param {label}"));
            return false;
        };
        match param.call(operation, args) {
            Ok(()) => true,
            Err(BackendError::UnknownOperation(_)) => {
                self.ctx.error(
                    &self.path,
                    format!("found param {label}, cannot call {operation}"),
                );
                false
            }
            Err(err) => {
                self.ctx.error(
                    &self.path,
                    format!(
                        "backend threw error when moving param on {label}, {operation}, {}: {err}",
                        Value::from(args.to_vec())
                    ),
                );
                false
            }
        }
    }
}
