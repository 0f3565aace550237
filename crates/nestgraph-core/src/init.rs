//! Initial-value override and direct value updates.

use crate::node::{ApiEntry, NestedNode};
use crate::value::display;
use crate::{ComposeError, Result};
use serde_json::Value;

impl NestedNode {
    /// Apply caller-supplied values over the composed API.
    ///
    /// A mapping is applied key by key; a failing key is logged and the
    /// rest still apply. `null` and the empty list are no-ops. Any other
    /// shape is rejected without changing anything.
    pub(crate) fn apply_init(&self, init: &Value) -> Result<()> {
        let entries = match init {
            Value::Null => return Ok(()),
            Value::Array(items) if items.is_empty() => {
                self.ctx
                    .trace(&self.path, format!("{self} init on [] requires no action"));
                return Ok(());
            }
            Value::Object(entries) => entries,
            other => {
                return Err(ComposeError::InvalidInit {
                    node: self.to_string(),
                    payload: display(other),
                })
            }
        };

        self.ctx.debug(
            &self.path,
            format!("{self} initialisation from parent, using {}", display(init)),
        );
        for (idx, (key, value)) in entries.iter().enumerate() {
            let tag = format!("{} i.{}", self.path, idx);
            if let Err(err) = self.assign(key, value, &tag) {
                self.ctx.error(&tag, err.to_string());
            }
        }
        Ok(())
    }

    fn assign(&self, label: &str, value: &Value, tag: &str) -> Result<()> {
        match self.entry(label) {
            Some(ApiEntry::Param(param)) => {
                let number = value.as_f64().ok_or_else(|| ComposeError::NonNumericValue {
                    label: label.to_string(),
                    value: display(value),
                })?;
                let now = self.ctx.backend.now();
                self.ctx.debug(
                    tag,
                    format!("Updating {self}.params.{label} to {number} at {now}"),
                );
                param.schedule_value_at_time(number, now)?;
            }
            Some(ApiEntry::Const(constant)) => {
                self.ctx.debug(
                    tag,
                    format!(
                        "Updating {self}.consts.{label} on {}.{} from {} to {}",
                        constant.owner().type_name(),
                        constant.key(),
                        display(&constant.value()),
                        display(value)
                    ),
                );
                constant.assign(value.clone())?;
            }
            None => {
                return Err(ComposeError::UnknownApiLabel {
                    node: self.to_string(),
                    label: label.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Set an exposed parameter, effective immediately on the backend clock.
    ///
    /// Later calls at the same instant override earlier ones.
    pub fn set_param_value(&self, label: &str, value: f64) -> bool {
        let Some(param) = self.param(label) else {
            self.ctx.error(&self.path, format!("not found param {label}"));
            return false;
        };
        match param.schedule_value_at_time(value, self.ctx.backend.now()) {
            Ok(()) => true,
            Err(err) => {
                self.ctx.error(
                    &self.path,
                    format!("backend threw error when updating param {label} to {value}: {err}"),
                );
                false
            }
        }
    }

    /// Assign a new value to an exposed constant.
    pub fn set_const_value(&self, label: &str, value: Value) -> bool {
        let Some(constant) = self.constant(label) else {
            self.ctx.error(&self.path, format!("not found const {label}"));
            return false;
        };
        let shown = display(&value);
        match constant.assign(value) {
            Ok(()) => true,
            Err(err) => {
                self.ctx.error(
                    &self.path,
                    format!(
                        "backend threw error when updating constant {}.{} to {shown}: {err}",
                        constant.owner().type_name(),
                        constant.key()
                    ),
                );
                false
            }
        }
    }
}
