// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Nodes: named participants that own endpoints.

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::context::{Context, ContextInner};
use crate::names;
use crate::ret::{Error, Result, RetCode};

/// Options consumed by [`Node::init`].
#[derive(Debug, Clone, Copy)]
pub struct NodeOptions {
    pub allocator: Allocator,
    /// Domain override; `None` uses the context's domain.
    pub domain_id: Option<u32>,
    pub use_global_arguments: bool,
    pub enable_rosout: bool,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            allocator: Allocator::system(),
            domain_id: None,
            use_global_arguments: true,
            enable_rosout: true,
        }
    }
}

pub(crate) struct NodeInner {
    pub(crate) context: Arc<ContextInner>,
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) fully_qualified_name: String,
    pub(crate) domain_id: u32,
}

impl NodeInner {
    pub(crate) fn is_valid(&self) -> bool {
        self.context.is_valid()
    }
}

/// Middleware node.
#[derive(Default)]
pub struct Node {
    inner: Option<Arc<NodeInner>>,
}

impl Node {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    /// Zero-initialize and init in one step.
    pub fn new(
        name: &str,
        namespace: &str,
        context: &Context,
        options: &NodeOptions,
    ) -> Result<Self> {
        let mut node = Self::zero_initialized();
        node.init(name, namespace, context, options)?;
        Ok(node)
    }

    /// Initialize against a valid context. An empty namespace means `/`.
    pub fn init(
        &mut self,
        name: &str,
        namespace: &str,
        context: &Context,
        options: &NodeOptions,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(RetCode::AlreadyInit, "node already initialized"));
        }
        let Some(context) = context.live_inner() else {
            return Err(Error::new(RetCode::NotInit, "context is not valid"));
        };
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }
        if let Err(reason) = names::validate_node_name(name) {
            return Err(Error::new(
                RetCode::NodeInvalidName,
                format!("invalid node name '{name}': {reason}"),
            ));
        }
        let namespace = names::normalize_namespace(namespace);
        if let Err(reason) = names::validate_namespace(&namespace) {
            return Err(Error::new(
                RetCode::NodeInvalidNamespace,
                format!("invalid node namespace '{namespace}': {reason}"),
            ));
        }

        let fully_qualified_name = names::fully_qualified_name(&namespace, name);
        let domain_id = options.domain_id.unwrap_or_else(|| context.domain_id());
        log::debug!("[node] init {} (domain {})", fully_qualified_name, domain_id);

        self.inner = Some(Arc::new(NodeInner {
            context: Arc::clone(context),
            name: name.to_string(),
            namespace,
            fully_qualified_name,
            domain_id,
        }));
        Ok(())
    }

    /// Return to the zero-initialized state.
    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(inner) => {
                log::debug!("[node] fini {}", inner.fully_qualified_name);
                Ok(())
            }
            None => Err(Error::new(RetCode::NodeInvalid, "node is not initialized")),
        }
    }

    /// Initialized and its context still valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.is_valid())
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.live().map(|inner| inner.name.as_str())
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.live().map(|inner| inner.namespace.as_str())
    }

    #[must_use]
    pub fn fully_qualified_name(&self) -> Option<&str> {
        self.live().map(|inner| inner.fully_qualified_name.as_str())
    }

    #[must_use]
    pub fn domain_id(&self) -> Option<u32> {
        self.live().map(|inner| inner.domain_id)
    }

    fn live(&self) -> Option<&Arc<NodeInner>> {
        self.inner.as_ref().filter(|inner| inner.is_valid())
    }

    /// Shared node state for endpoint creation.
    pub(crate) fn require_live(&self) -> Result<&Arc<NodeInner>> {
        self.live()
            .ok_or_else(|| Error::new(RetCode::NodeInvalid, "node is not valid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InitOptions;

    fn context() -> Context {
        Context::new(&InitOptions::default()).expect("context")
    }

    #[test]
    fn init_and_names() {
        let context = context();
        let node = Node::new("talker", "/demo", &context, &NodeOptions::default()).expect("node");
        assert!(node.is_valid());
        assert_eq!(node.name(), Some("talker"));
        assert_eq!(node.namespace(), Some("/demo"));
        assert_eq!(node.fully_qualified_name(), Some("/demo/talker"));
        assert_eq!(node.domain_id(), Some(0));
    }

    #[test]
    fn empty_namespace_is_root() {
        let context = context();
        let node = Node::new("listener", "", &context, &NodeOptions::default()).expect("node");
        assert_eq!(node.namespace(), Some("/"));
        assert_eq!(node.fully_qualified_name(), Some("/listener"));
    }

    #[test]
    fn domain_override() {
        let context = context();
        let options = NodeOptions {
            domain_id: Some(42),
            ..NodeOptions::default()
        };
        let node = Node::new("n", "/", &context, &options).expect("node");
        assert_eq!(node.domain_id(), Some(42));
    }

    #[test]
    fn invalid_inputs() {
        let context = context();
        let options = NodeOptions::default();

        let err = Node::new("9lives", "/", &context, &options).err().expect("bad name");
        assert_eq!(err.code(), RetCode::NodeInvalidName);

        let err = Node::new("ok", "relative", &context, &options).err().expect("bad ns");
        assert_eq!(err.code(), RetCode::NodeInvalidNamespace);

        let err = Node::new("ok", "/", &Context::zero_initialized(), &options)
            .err()
            .expect("bad context");
        assert_eq!(err.code(), RetCode::NotInit);

        let bad_alloc = NodeOptions {
            allocator: Allocator::zeroed(),
            ..NodeOptions::default()
        };
        let err = Node::new("ok", "/", &context, &bad_alloc).err().expect("bad allocator");
        assert_eq!(err.code(), RetCode::InvalidArgument);
    }

    #[test]
    fn shutdown_invalidates_node() {
        let context = context();
        let mut node = Node::new("n", "/", &context, &NodeOptions::default()).expect("node");
        context.shutdown().expect("shutdown");
        assert!(!node.is_valid());
        assert_eq!(node.name(), None);
        node.fini().expect("fini still releases");
        assert_eq!(node.fini().expect_err("twice").code(), RetCode::NodeInvalid);
    }

    #[test]
    fn double_init_rejected() {
        let context = context();
        let mut node = Node::new("n", "/", &context, &NodeOptions::default()).expect("node");
        let err = node
            .init("m", "/", &context, &NodeOptions::default())
            .expect_err("second init");
        assert_eq!(err.code(), RetCode::AlreadyInit);
        assert_eq!(node.name(), Some("n"));
    }
}
