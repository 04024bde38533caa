// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::bus::{bus, SampleMailbox};
use crate::condition::Waitable;
use crate::entity::EntityId;
use crate::names;
use crate::node::{Node, NodeInner};
use crate::qos::QosProfile;
use crate::ret::{Error, Result, RetCode};

/// Options consumed by [`Subscription::init`]. The QoS profile is copied in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionOptions {
    pub qos: QosProfile,
    pub allocator: Allocator,
}

impl SubscriptionOptions {
    #[must_use]
    pub fn with_qos(qos: QosProfile) -> Self {
        Self {
            qos,
            allocator: Allocator::system(),
        }
    }
}

struct SubscriptionInner {
    id: EntityId,
    node: Arc<NodeInner>,
    topic: String,
    qos: QosProfile,
    mailbox: Arc<SampleMailbox>,
}

impl Drop for SubscriptionInner {
    fn drop(&mut self) {
        bus().remove_reader(self.node.domain_id, &self.topic, self.id);
        log::debug!("[subscription] fini {} on {}", self.id, self.topic);
    }
}

/// Subscription receiving opaque serialized payloads.
///
/// Incoming messages queue up to the history depth of the QoS profile;
/// the subscription is ready in a wait-set while its queue is non-empty.
#[derive(Default)]
pub struct Subscription {
    inner: Option<SubscriptionInner>,
}

impl Subscription {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(node: &Node, topic_name: &str, options: &SubscriptionOptions) -> Result<Self> {
        let mut subscription = Self::zero_initialized();
        subscription.init(node, topic_name, options)?;
        Ok(subscription)
    }

    pub fn init(
        &mut self,
        node: &Node,
        topic_name: &str,
        options: &SubscriptionOptions,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(
                RetCode::AlreadyInit,
                "subscription already initialized",
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
        let mailbox = Arc::new(SampleMailbox::new(
            options.qos.queue_bound(node.context.default_depth()),
        ));
        bus().add_reader(node.domain_id, &topic, id, options.qos, &mailbox);
        log::debug!("[subscription] init {} on {}", id, topic);

        self.inner = Some(SubscriptionInner {
            id,
            node: Arc::clone(node),
            topic,
            qos: options.qos,
            mailbox,
        });
        Ok(())
    }

    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(Error::new(
                RetCode::SubscriptionInvalid,
                "subscription is not initialized",
            )),
        }
    }

    /// Take the oldest queued message.
    ///
    /// An empty queue yields `SubscriptionTakeFailed` without recording an
    /// error message.
    pub fn take(&mut self) -> Result<Vec<u8>> {
        let inner = self.live()?;
        inner
            .mailbox
            .pop()
            .ok_or_else(|| Error::quiet(RetCode::SubscriptionTakeFailed, "no message to take"))
    }

    /// Copy the oldest queued message into `buffer` and return its length.
    ///
    /// When the message does not fit it stays queued and the call fails with
    /// `InvalidArgument`; [`Subscription::next_message_len`] tells how much
    /// room is needed.
    pub fn take_into(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let inner = self.live()?;
        inner.mailbox.with_queue(|queue| match queue.front() {
            None => Err(Error::quiet(
                RetCode::SubscriptionTakeFailed,
                "no message to take",
            )),
            Some(message) if message.len() > buffer.len() => Err(Error::new(
                RetCode::InvalidArgument,
                format!(
                    "buffer of {} bytes too small for {} byte message",
                    buffer.len(),
                    message.len()
                ),
            )),
            Some(_) => {
                let message = queue.pop_front().unwrap_or_default();
                buffer[..message.len()].copy_from_slice(&message);
                Ok(message.len())
            }
        })
    }

    /// Length of the message the next take would return.
    #[must_use]
    pub fn next_message_len(&self) -> Option<usize> {
        self.live_inner()?
            .mailbox
            .with_queue(|queue| queue.front().map(Vec::len))
    }

    /// Messages currently queued.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.live_inner().map_or(0, |inner| inner.mailbox.len())
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

    pub(crate) fn waitable(&self) -> Option<(EntityId, Arc<dyn Waitable>)> {
        let inner = self.live_inner()?;
        let member: Arc<dyn Waitable> = inner.mailbox.clone();
        Some((inner.id, member))
    }

    fn live_inner(&self) -> Option<&SubscriptionInner> {
        self.inner.as_ref().filter(|inner| inner.node.is_valid())
    }

    fn live(&self) -> Result<&SubscriptionInner> {
        self.live_inner().ok_or_else(|| {
            Error::new(RetCode::SubscriptionInvalid, "subscription is not valid")
        })
    }
}
