//! API composition.
//!
//! Runs in two passes. Expansion turns every directive into explicit
//! `(label, slot, inner)` bindings, replacing `{copy, prefix}` with one
//! binding per constant and then per parameter of the copied slot.
//! Resolution then looks each binding up and registers it under `params`
//! or `consts`.

use crate::backend::Property;
use crate::node::{ApiEntry, ConstDescriptor, NestedNode, Slot};
use crate::template::ApiDirective;
use crate::value::{display, slot_index};
use crate::{ComposeError, Result};
use serde_json::Value;
use std::sync::Arc;

/// An explicit API binding produced by expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBinding {
    /// Label exposed on this node.
    pub label: String,
    pub slot: usize,
    /// Label inside the slot.
    pub inner: String,
    /// Index of the directive this binding came from.
    pub directive: usize,
}

impl ApiBinding {
    fn new(label: String, slot: usize, inner: String, directive: usize) -> Self {
        Self {
            label,
            slot,
            inner,
            directive,
        }
    }
}

impl NestedNode {
    pub(crate) fn compose_api(&mut self, directives: &[ApiDirective]) {
        self.ctx.debug(
            &self.path,
            format!("{self} creating API from {} directives", directives.len()),
        );
        let bindings = self.expand_api(directives);
        for binding in bindings {
            let tag = format!("{} a.{}", self.path, binding.directive);
            if let Err(err) = self.bind(&binding, &tag) {
                self.ctx.error(&tag, err.to_string());
            }
        }
    }

    /// Expand directives into explicit bindings, preserving directive order.
    /// Invalid directives are logged and contribute nothing.
    pub fn expand_api(&self, directives: &[ApiDirective]) -> Vec<ApiBinding> {
        let mut bindings = Vec::new();
        for (idx, directive) in directives.iter().enumerate() {
            match self.expand_directive(directive, idx) {
                Ok(mut expanded) => bindings.append(&mut expanded),
                Err(err) => self
                    .ctx
                    .error(&format!("{} a.{}", self.path, idx), err.to_string()),
            }
        }
        bindings
    }

    fn expand_directive(&self, directive: &ApiDirective, idx: usize) -> Result<Vec<ApiBinding>> {
        let (copy, prefix) = match directive {
            ApiDirective::Expose(label, slot, inner) => {
                return Ok(vec![ApiBinding::new(label.clone(), *slot, inner.clone(), idx)])
            }
            ApiDirective::Copy { copy, prefix } => (copy, prefix),
            ApiDirective::Other(raw) => return Err(ComposeError::MalformedApiEntry(display(raw))),
        };

        let slot = slot_index(copy).ok_or_else(|| {
            ComposeError::InvalidCopy(format!("{} is not a slot index", display(copy)))
        })?;
        let prefix = match prefix {
            None | Some(Value::Null) => "",
            Some(Value::String(prefix)) => prefix.as_str(),
            Some(other) => {
                return Err(ComposeError::InvalidCopy(format!(
                    "prefix {} is not a string",
                    display(other)
                )))
            }
        };

        match self.slot(slot) {
            None => Err(ComposeError::InvalidCopy(format!(
                "slot {slot} is not populated"
            ))),
            Some(Slot::Leaf(leaf)) => {
                self.ctx.warn(
                    &format!("{} a.{}", self.path, idx),
                    format!("Copy from {} exposes nothing, it is not nested", leaf.type_name()),
                );
                Ok(Vec::new())
            }
            Some(Slot::Nested(child)) => Ok(child
                .consts
                .keys()
                .chain(child.params.keys())
                .map(|key| ApiBinding::new(format!("{prefix}{key}"), slot, key.clone(), idx))
                .collect()),
        }
    }

    fn lookup(&self, binding: &ApiBinding) -> Result<ApiEntry> {
        let slot = self
            .slot(binding.slot)
            .ok_or(ComposeError::ApiSlotNotPopulated(binding.slot))?;
        let missing = || ComposeError::ApiTargetMissing {
            node: slot.to_string(),
            label: binding.inner.clone(),
        };
        match slot {
            Slot::Nested(child) => child.entry(&binding.inner).ok_or_else(missing),
            Slot::Leaf(leaf) => match leaf.property(&binding.inner) {
                Some(Property::Param(param)) => Ok(ApiEntry::Param(param)),
                Some(Property::Constant(value)) if !value.is_null() => Ok(ApiEntry::Const(
                    Arc::new(ConstDescriptor::new(Arc::clone(leaf), &binding.inner, value)),
                )),
                _ => Err(missing()),
            },
        }
    }

    fn bind(&mut self, binding: &ApiBinding, tag: &str) -> Result<()> {
        let entry = self.lookup(binding)?;
        let label = binding.label.clone();
        let replaced = match &entry {
            ApiEntry::Param(_) => self.consts.remove(&label).is_some() || self.params.contains_key(&label),
            ApiEntry::Const(_) => self.params.remove(&label).is_some() || self.consts.contains_key(&label),
        };
        if replaced {
            self.ctx
                .warn(tag, format!("API label {label} registered again, later entry wins"));
        }

        let inner_node = self.slot(binding.slot).map(ToString::to_string).unwrap_or_default();
        match entry {
            ApiEntry::Param(param) => {
                self.ctx.debug(
                    tag,
                    format!("Set {self}.params.{label} to {inner_node}.{}", binding.inner),
                );
                self.params.insert(label, param);
            }
            ApiEntry::Const(constant) => {
                self.ctx.debug(
                    tag,
                    format!("Set {self}.consts.{label} to {inner_node}.{}", binding.inner),
                );
                self.consts.insert(label, constant);
            }
        }
        Ok(())
    }
}
