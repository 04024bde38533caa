// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::bus::bus;
use crate::entity::EntityId;
use crate::names;
use crate::node::{Node, NodeInner};
use crate::qos::QosProfile;
use crate::ret::{Error, Result, RetCode};

/// Options consumed by [`Publisher::init`]. The QoS profile is copied in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublisherOptions {
    pub qos: QosProfile,
    pub allocator: Allocator,
}

impl PublisherOptions {
    #[must_use]
    pub fn with_qos(qos: QosProfile) -> Self {
        Self {
            qos,
            allocator: Allocator::system(),
        }
    }
}

struct PublisherInner {
    id: EntityId,
    node: Arc<NodeInner>,
    topic: String,
    qos: QosProfile,
}

impl Drop for PublisherInner {
    fn drop(&mut self) {
        bus().remove_writer(self.node.domain_id, &self.topic, self.id);
        log::debug!("[publisher] fini {} on {}", self.id, self.topic);
    }
}

/// Publisher of opaque serialized payloads.
#[derive(Default)]
pub struct Publisher {
    inner: Option<PublisherInner>,
}

impl Publisher {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(node: &Node, topic_name: &str, options: &PublisherOptions) -> Result<Self> {
        let mut publisher = Self::zero_initialized();
        publisher.init(node, topic_name, options)?;
        Ok(publisher)
    }

    /// Create the publisher on `topic_name`, expanded against the node.
    pub fn init(
        &mut self,
        node: &Node,
        topic_name: &str,
        options: &PublisherOptions,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(
                RetCode::AlreadyInit,
                "publisher already initialized",
            ));
        }
        let node = node.require_live()?;
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }
        options.qos.validate()?;
        let topic = names::expand_topic_name(topic_name, &node.name, &node.namespace).map_err(
            |reason| {
                Error::new(
                    RetCode::TopicNameInvalid,
                    format!("invalid topic name '{topic_name}': {reason}"),
                )
            },
        )?;

        let id = EntityId::next();
        let retain_bound = options.qos.queue_bound(node.context.default_depth());
        bus().add_writer(node.domain_id, &topic, id, options.qos, retain_bound);
        log::debug!("[publisher] init {} on {}", id, topic);

        self.inner = Some(PublisherInner {
            id,
            node: Arc::clone(node),
            topic,
            qos: options.qos,
        });
        Ok(())
    }

    /// Unregister and return to the zero-initialized state.
    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(Error::new(
                RetCode::PublisherInvalid,
                "publisher is not initialized",
            )),
        }
    }

    /// Send one serialized message to every matching subscription.
    pub fn publish(&self, payload: &[u8]) -> Result<()> {
        let inner = self.live()?;
        let delivered = bus().publish(inner.node.domain_id, &inner.topic, inner.id, payload);
        log::trace!(
            "[publisher] {} published {} bytes to {} readers",
            inner.id,
            payload.len(),
            delivered
        );
        Ok(())
    }

    /// Live subscriptions currently on this publisher's topic.
    pub fn subscription_count(&self) -> Result<usize> {
        let inner = self.live()?;
        Ok(bus().reader_count(inner.node.domain_id, &inner.topic))
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.live_inner().is_some()
    }

    #[must_use]
    pub fn id(&self) -> Option<EntityId> {
        self.inner.as_ref().map(|inner| inner.id)
    }

    #[must_use]
    pub fn topic_name(&self) -> Option<&str> {
        self.live_inner().map(|inner| inner.topic.as_str())
    }

    #[must_use]
    pub fn qos(&self) -> Option<&QosProfile> {
        self.live_inner().map(|inner| &inner.qos)
    }

    fn live_inner(&self) -> Option<&PublisherInner> {
        self.inner.as_ref().filter(|inner| inner.node.is_valid())
    }

    fn live(&self) -> Result<&PublisherInner> {
        self.live_inner()
            .ok_or_else(|| Error::new(RetCode::PublisherInvalid, "publisher is not valid"))
    }
}
