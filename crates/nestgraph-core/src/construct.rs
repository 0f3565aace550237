//! Recursive construction of a node from its template.
//!
//! Stages run in a fixed order and an error in stages 1 or 2 stops the
//! remaining ones for this node:
//!
//! 1. validate the library, type and template level
//! 2. populate content slots, recursing into nested templates
//! 3. derive input and output from the designated slots
//! 4. make internal connections
//! 5. compose the API
//! 6. apply the caller's init values over the composed API

use crate::backend::LeafArgs;
use crate::connector::Port;
use crate::context::Context;
use crate::node::{NestedNode, NodeState, Slot};
use crate::template::{ContentSpec, Directives, Library, Template};
use crate::value::display;
use crate::{ComposeError, Result};
use serde_json::Value;
use std::sync::Arc;

impl NestedNode {
    pub(crate) fn construct(
        ctx: Arc<Context>,
        library: Option<&Library>,
        node_type: Option<&str>,
        init: &Value,
        path: String,
    ) -> Self {
        let label = node_type.unwrap_or("null");
        let mut node = Self::empty(ctx, path);
        node.ctx
            .debug(&node.path, format!("----- START nested node ----- {label}"));

        node.state = match node.initialise(library, node_type, init) {
            Ok(()) => NodeState::Ready,
            Err(err) => {
                node.ctx.error(&node.path, err.to_string());
                NodeState::Failed(err)
            }
        };
        // Validation failures leave nothing behind.
        if node.node_type.is_none() {
            node.state = NodeState::Reset;
        }

        node.ctx
            .debug(&node.path, format!("~~~~~ RESULT nested node ~~~~ {label}"));
        node
    }

    fn initialise(
        &mut self,
        library: Option<&Library>,
        node_type: Option<&str>,
        init: &Value,
    ) -> Result<()> {
        let library = library.ok_or(ComposeError::MissingLibrary)?;
        let node_type = node_type.ok_or(ComposeError::MissingType)?;
        let template = library
            .get(node_type)
            .ok_or_else(|| ComposeError::TemplateNotFound(node_type.to_string()))?;
        let level = template.level;
        if !level.is_finite() || level <= 0.0 {
            return Err(ComposeError::InvalidLevel {
                type_name: node_type.to_string(),
                level,
            });
        }
        self.node_type = Some(node_type.to_string());
        self.level = Some(level);
        self.ctx.debug(
            &self.path,
            format!("Template at level {level} found for {node_type}"),
        );

        self.populate_contents(library, template, node_type, level)?;

        for port in [Port::Input, Port::Output] {
            if let Err(err) = self.setup_io(template, port) {
                self.ctx.error(&self.path, err.to_string());
            }
        }

        match &template.connect {
            Some(Directives::List(connections)) => self.wire(connections),
            Some(Directives::Other(raw)) => {
                let err = ComposeError::ConnectNotList(display(raw));
                self.ctx.error(&self.path, format!("{node_type}.{err}"));
            }
            None => {}
        }

        let Some(api) = template.api.as_ref().and_then(Directives::as_list) else {
            self.ctx.info(
                &self.path,
                format!("{node_type} does not have an API - is that correct?"),
            );
            return Ok(());
        };
        self.compose_api(api);

        if let Err(err) = self.apply_init(init) {
            self.ctx.error(&self.path, err.to_string());
        }
        Ok(())
    }

    fn populate_contents(
        &mut self,
        library: &Library,
        template: &Template,
        node_type: &str,
        level: f64,
    ) -> Result<()> {
        self.ctx.debug(
            &self.path,
            format!("Creating {} content slots", template.contents.len()),
        );
        self.contents = Vec::with_capacity(template.contents.len());
        for (idx, spec) in template.contents.iter().enumerate() {
            let slot_path = format!("{}.{}", self.path, idx + 1);
            let slot = match self.create_slot(library, spec, node_type, level, &slot_path) {
                Ok(slot) => Some(slot),
                Err(err) => {
                    self.ctx.error(&slot_path, err.to_string());
                    None
                }
            };
            self.contents.push(slot);
        }

        if self.contents.iter().any(Option::is_none) {
            return Err(ComposeError::IncompleteContents(node_type.to_string()));
        }
        self.ctx
            .debug(&self.path, format!("{node_type} contents created"));
        Ok(())
    }

    fn create_slot(
        &self,
        library: &Library,
        spec: &ContentSpec,
        node_type: &str,
        level: f64,
        path: &str,
    ) -> Result<Slot> {
        let (inner_type, inner_init) = spec.classify()?;
        self.ctx.trace(
            path,
            format!("Item {inner_type} with init {}", display(&inner_init)),
        );
        let config = &self.ctx.config;

        if config.is_output_sink(&inner_type) {
            let sink = self.ctx.output_sink()?;
            self.ctx.debug(
                path,
                format!("Node created for unique instance of {inner_type}"),
            );
            return Ok(Slot::Leaf(sink));
        }
        if config.is_unsupported_global(&inner_type) {
            return Err(ComposeError::UnsupportedGlobal(inner_type));
        }
        if let Some(bare) = config.backend_type(&inner_type) {
            let leaf = self
                .ctx
                .backend
                .create_leaf(bare, LeafArgs::from_init(&inner_init))?;
            self.ctx
                .debug(path, format!("Backend instance created for {inner_type}"));
            return Ok(Slot::Leaf(leaf));
        }

        let inner = library
            .get(&inner_type)
            .ok_or_else(|| ComposeError::TemplateNotFound(inner_type.clone()))?;
        if !(inner.level.is_finite() && inner.level < level) {
            return Err(ComposeError::LevelOrder {
                inner: inner_type,
                inner_level: inner.level,
                outer: node_type.to_string(),
                outer_level: level,
            });
        }

        let child = NestedNode::construct(
            Arc::clone(&self.ctx),
            Some(library),
            Some(&inner_type),
            &inner_init,
            path.to_string(),
        );
        if child.is_ready() {
            self.ctx
                .debug(path, format!("**** SUCCESS nested node **** {inner_type}"));
        } else {
            self.ctx.warn(
                path,
                format!("Nested node {inner_type} did not construct completely"),
            );
        }
        Ok(Slot::Nested(Box::new(child)))
    }

    fn setup_io(&mut self, template: &Template, port: Port) -> Result<()> {
        let Some(idx) = template.io_index(port) else {
            return Ok(());
        };
        let io = match self.slot(idx) {
            None => return Ok(()),
            Some(Slot::Leaf(leaf)) => Arc::clone(leaf),
            Some(Slot::Nested(child)) => {
                child
                    .io(port)
                    .cloned()
                    .ok_or_else(|| ComposeError::MissingIo {
                        node: child.to_string(),
                        port,
                    })?
            }
        };
        self.ctx.debug(
            &self.path,
            format!(
                "{self} has {port} {} from contents at index {idx}",
                io.type_name()
            ),
        );
        match port {
            Port::Input => self.input = Some(io),
            Port::Output => self.output = Some(io),
        }
        Ok(())
    }
}
