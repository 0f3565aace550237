//! Connector resolution and internal wiring.

use crate::backend::{Connectable, Property};
use crate::node::{NestedNode, Slot};
use crate::template::{ConnectionSpec, Endpoint, PortSpec};
use crate::value::display;
use crate::{ComposeError, Result};
use std::fmt;
use std::sync::Arc;

/// Default io port of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Input,
    Output,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// Which end of a connection is being resolved. Only used in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Source,
    Destination,
}

impl Role {
    /// Port used when an endpoint names no parameter.
    pub fn default_port(&self) -> Port {
        match self {
            Self::Source => Port::Output,
            Self::Destination => Port::Input,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Destination => "destination",
        })
    }
}

/// A resolved connection endpoint.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub target: Connectable,
    pub port: usize,
}

impl NestedNode {
    /// Resolve a content-slot reference to something connectable.
    ///
    /// Without a label a nested slot yields its `default_port` io and a leaf
    /// slot yields the leaf itself. With a label, a nested slot yields its
    /// exposed parameter and a leaf slot yields its schedulable property.
    pub fn resolve(&self, endpoint: &Endpoint, role: Role, default_port: Port) -> Result<Resolved> {
        let (index, port) = match endpoint {
            Endpoint::Ref { slot, port } => (*slot, port.as_ref()),
            Endpoint::Invalid(value) => {
                return Err(ComposeError::SlotNotPopulated {
                    role,
                    slot: display(value),
                })
            }
        };
        let (port_index, label) = match port {
            Some(PortSpec::Index(idx)) => (*idx, None),
            Some(PortSpec::Label(label)) => (0, Some(label.as_str())),
            None => (0, None),
        };
        let slot = self.slot(index).ok_or_else(|| ComposeError::SlotNotPopulated {
            role,
            slot: endpoint.to_string(),
        })?;

        let target = match (slot, label) {
            (Slot::Nested(child), None) => child
                .io(default_port)
                .map(|leaf| Connectable::Leaf(Arc::clone(leaf)))
                .ok_or_else(|| ComposeError::MissingParam {
                    role,
                    node: child.to_string(),
                    label: default_port.to_string(),
                })?,
            (Slot::Nested(child), Some(label)) => child
                .param(label)
                .map(|param| Connectable::Param(Arc::clone(param)))
                .ok_or_else(|| ComposeError::MissingParam {
                    role,
                    node: child.to_string(),
                    label: label.to_string(),
                })?,
            (Slot::Leaf(leaf), None) => Connectable::Leaf(Arc::clone(leaf)),
            (Slot::Leaf(leaf), Some(label)) => match leaf.property(label) {
                Some(Property::Param(param)) => Connectable::Param(param),
                _ => {
                    return Err(ComposeError::NotSchedulable {
                        node: leaf.type_name().to_string(),
                        label: label.to_string(),
                    })
                }
            },
        };
        Ok(Resolved {
            target,
            port: port_index,
        })
    }

    pub(crate) fn wire(&mut self, connections: &[ConnectionSpec]) {
        for (idx, connection) in connections.iter().enumerate() {
            let tag = format!("{} c.{}", self.path(), idx);
            match self.connect_pair(connection, &tag) {
                Ok(description) => {
                    self.ctx.debug(&tag, format!("Successful connection {description}"));
                    self.connects.push(description);
                }
                Err(err) => self.ctx.error(&tag, err.to_string()),
            }
        }
    }

    fn connect_pair(&self, connection: &ConnectionSpec, tag: &str) -> Result<String> {
        let (source, destination) = match connection {
            ConnectionSpec::Pair(source, destination) => (source, destination),
            ConnectionSpec::Other(raw) => {
                return Err(ComposeError::MalformedConnection(display(raw)))
            }
        };
        self.ctx.debug(
            tag,
            format!("Connecting from source {source} to destination {destination}"),
        );

        let from = self.resolve(source, Role::Source, Role::Source.default_port());
        let to = self.resolve(destination, Role::Destination, Role::Destination.default_port());
        let (from, to) = match (from, to) {
            (Ok(from), Ok(to)) => (from, to),
            (from, to) => {
                for err in [from.err(), to.err()].into_iter().flatten() {
                    self.ctx.error(tag, err.to_string());
                }
                return Err(ComposeError::InvalidConnection {
                    source_ref: source.to_string(),
                    destination_ref: destination.to_string(),
                });
            }
        };

        self.ctx
            .backend
            .connect(&from.target, &to.target, from.port, to.port)
            .map_err(|reason| ComposeError::ConnectFailed {
                from: from.target.to_string(),
                to: to.target.to_string(),
                reason,
            })?;
        Ok(format!(
            "{source} -> {destination} ({} -> {})",
            from.target, to.target
        ))
    }
}
