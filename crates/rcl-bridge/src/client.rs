// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::bus::{bus, Mailbox, RequestEnvelope, ResponseEnvelope};
use crate::condition::Waitable;
use crate::entity::EntityId;
use crate::node::{Node, NodeInner};
use crate::qos::QosProfile;
use crate::ret::{Error, Result, RetCode};
use crate::service::{expand_service_name, RequestId};

/// Options consumed by [`Client::init`].
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub qos: QosProfile,
    pub allocator: Allocator,
}

impl ClientOptions {
    #[must_use]
    pub fn with_qos(qos: QosProfile) -> Self {
        Self {
            qos,
            allocator: Allocator::system(),
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::with_qos(QosProfile::SERVICES_DEFAULT)
    }
}

struct ClientInner {
    id: EntityId,
    node: Arc<NodeInner>,
    name: String,
    qos: QosProfile,
    next_sequence: i64,
    responses: Arc<Mailbox<ResponseEnvelope>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        bus().remove_client(self.id);
        log::debug!("[client] fini {} on {}", self.id, self.name);
    }
}

/// Service client. Ready in a wait-set while responses are pending.
#[derive(Default)]
pub struct Client {
    inner: Option<ClientInner>,
}

impl Client {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(node: &Node, service_name: &str, options: &ClientOptions) -> Result<Self> {
        let mut client = Self::zero_initialized();
        client.init(node, service_name, options)?;
        Ok(client)
    }

    pub fn init(
        &mut self,
        node: &Node,
        service_name: &str,
        options: &ClientOptions,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(RetCode::AlreadyInit, "client already initialized"));
        }
        let node = node.require_live()?;
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }
        options.qos.validate()?;
        let name = expand_service_name(node, service_name)?;

        let id = EntityId::next();
        let responses = Arc::new(Mailbox::new(
            options.qos.queue_bound(node.context.default_depth()),
        ));
        bus().add_client(id, &responses);
        log::debug!("[client] init {} on {}", id, name);

        self.inner = Some(ClientInner {
            id,
            node: Arc::clone(node),
            name,
            qos: options.qos,
            next_sequence: 1,
            responses,
        });
        Ok(())
    }

    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(Error::new(RetCode::ClientInvalid, "client is not initialized")),
        }
    }

    /// Send a request and return its sequence number. Without a server the
    /// request is lost, as with any unmatched request on the wire.
    pub fn send_request(&mut self, payload: &[u8]) -> Result<i64> {
        let inner = self.live_mut()?;
        let sequence_number = inner.next_sequence;
        inner.next_sequence += 1;

        let delivered = bus().send_request(
            inner.node.domain_id,
            &inner.name,
            RequestEnvelope {
                id: RequestId {
                    client_id: inner.id.as_raw(),
                    sequence_number,
                },
                payload: payload.to_vec(),
            },
        );
        if !delivered {
            log::debug!(
                "[client] {} request {} on {}: no server",
                inner.id,
                sequence_number,
                inner.name
            );
        }
        Ok(sequence_number)
    }

    /// Take the oldest response.
    pub fn take_response(&mut self) -> Result<(RequestId, Vec<u8>)> {
        let inner = self.live()?;
        inner
            .responses
            .pop()
            .map(|response| (response.id, response.payload))
            .ok_or_else(|| Error::quiet(RetCode::ClientTakeFailed, "no response to take"))
    }

    /// Length of the response the next take would return.
    #[must_use]
    pub fn next_response_len(&self) -> Option<usize> {
        self.live_inner()?
            .responses
            .with_queue(|queue| queue.front().map(|response| response.payload.len()))
    }

    /// Copy variant of [`Client::take_response`]; an oversized response stays
    /// queued and yields `InvalidArgument`.
    pub fn take_response_into(&mut self, buffer: &mut [u8]) -> Result<(RequestId, usize)> {
        let inner = self.live()?;
        inner.responses.with_queue(|queue| match queue.front() {
            None => Err(Error::quiet(RetCode::ClientTakeFailed, "no response to take")),
            Some(response) if response.payload.len() > buffer.len() => Err(Error::new(
                RetCode::InvalidArgument,
                format!(
                    "buffer of {} bytes too small for {} byte response",
                    buffer.len(),
                    response.payload.len()
                ),
            )),
            Some(_) => match queue.pop_front() {
                Some(response) => {
                    let len = response.payload.len();
                    buffer[..len].copy_from_slice(&response.payload);
                    Ok((response.id, len))
                }
                None => Err(Error::quiet(RetCode::ClientTakeFailed, "no response to take")),
            },
        })
    }

    /// Whether a live server exists for this client's service.
    pub fn server_is_available(&self) -> Result<bool> {
        let inner = self.live()?;
        Ok(bus().service_available(inner.node.domain_id, &inner.name))
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
    pub fn service_name(&self) -> Option<&str> {
        self.live_inner().map(|inner| inner.name.as_str())
    }

    #[must_use]
    pub fn qos(&self) -> Option<&QosProfile> {
        self.live_inner().map(|inner| &inner.qos)
    }

    pub(crate) fn waitable(&self) -> Option<(EntityId, Arc<dyn Waitable>)> {
        let inner = self.live_inner()?;
        let member: Arc<dyn Waitable> = inner.responses.clone();
        Some((inner.id, member))
    }

    fn live_inner(&self) -> Option<&ClientInner> {
        self.inner.as_ref().filter(|inner| inner.node.is_valid())
    }

    fn live(&self) -> Result<&ClientInner> {
        self.live_inner()
            .ok_or_else(|| Error::new(RetCode::ClientInvalid, "client is not valid"))
    }

    fn live_mut(&mut self) -> Result<&mut ClientInner> {
        match self.inner.as_mut() {
            Some(inner) if inner.node.is_valid() => Ok(inner),
            _ => Err(Error::new(RetCode::ClientInvalid, "client is not valid")),
        }
    }
}
