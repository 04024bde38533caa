// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::Arc;

use crate::allocator::Allocator;
use crate::bus::{bus, Mailbox, RequestEnvelope, ResponseEnvelope};
use crate::condition::Waitable;
use crate::entity::EntityId;
use crate::names;
use crate::node::{Node, NodeInner};
use crate::qos::QosProfile;
use crate::ret::{Error, Result, RetCode};

/// Identifies one request: the issuing client and its sequence number.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub client_id: u64,
    pub sequence_number: i64,
}

/// Options consumed by [`Service::init`].
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub qos: QosProfile,
    pub allocator: Allocator,
}

impl ServiceOptions {
    #[must_use]
    pub fn with_qos(qos: QosProfile) -> Self {
        Self {
            qos,
            allocator: Allocator::system(),
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::with_qos(QosProfile::SERVICES_DEFAULT)
    }
}

pub(crate) fn expand_service_name(node: &NodeInner, service_name: &str) -> Result<String> {
    names::expand_topic_name(service_name, &node.name, &node.namespace).map_err(|reason| {
        Error::new(
            RetCode::ServiceNameInvalid,
            format!("invalid service name '{service_name}': {reason}"),
        )
    })
}

struct ServiceInner {
    id: EntityId,
    node: Arc<NodeInner>,
    name: String,
    qos: QosProfile,
    requests: Arc<Mailbox<RequestEnvelope>>,
}

impl Drop for ServiceInner {
    fn drop(&mut self) {
        bus().remove_service(self.node.domain_id, &self.name, self.id);
        log::debug!("[service] fini {} on {}", self.id, self.name);
    }
}

/// Service server. Ready in a wait-set while requests are pending.
#[derive(Default)]
pub struct Service {
    inner: Option<ServiceInner>,
}

impl Service {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(node: &Node, service_name: &str, options: &ServiceOptions) -> Result<Self> {
        let mut service = Self::zero_initialized();
        service.init(node, service_name, options)?;
        Ok(service)
    }

    /// Register as the server for `service_name`. Only one live server per
    /// name and domain is accepted.
    pub fn init(
        &mut self,
        node: &Node,
        service_name: &str,
        options: &ServiceOptions,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(RetCode::AlreadyInit, "service already initialized"));
        }
        let node = node.require_live()?;
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }
        options.qos.validate()?;
        let name = expand_service_name(node, service_name)?;

        let id = EntityId::next();
        let requests = Arc::new(Mailbox::new(
            options.qos.queue_bound(node.context.default_depth()),
        ));
        if !bus().add_service(node.domain_id, &name, id, &requests) {
            return Err(Error::new(
                RetCode::Error,
                format!("a server for '{name}' already exists"),
            ));
        }
        log::debug!("[service] init {} on {}", id, name);

        self.inner = Some(ServiceInner {
            id,
            node: Arc::clone(node),
            name,
            qos: options.qos,
            requests,
        });
        Ok(())
    }

    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(Error::new(
                RetCode::ServiceInvalid,
                "service is not initialized",
            )),
        }
    }

    /// Take the oldest pending request.
    pub fn take_request(&mut self) -> Result<(RequestId, Vec<u8>)> {
        let inner = self.live()?;
        inner
            .requests
            .pop()
            .map(|request| (request.id, request.payload))
            .ok_or_else(|| Error::quiet(RetCode::ServiceTakeFailed, "no request to take"))
    }

    /// Length of the request the next take would return.
    #[must_use]
    pub fn next_request_len(&self) -> Option<usize> {
        self.live_inner()?
            .requests
            .with_queue(|queue| queue.front().map(|request| request.payload.len()))
    }

    /// Copy variant of [`Service::take_request`]; an oversized request stays
    /// queued and yields `InvalidArgument`.
    pub fn take_request_into(&mut self, buffer: &mut [u8]) -> Result<(RequestId, usize)> {
        let inner = self.live()?;
        inner.requests.with_queue(|queue| match queue.front() {
            None => Err(Error::quiet(RetCode::ServiceTakeFailed, "no request to take")),
            Some(request) if request.payload.len() > buffer.len() => Err(Error::new(
                RetCode::InvalidArgument,
                format!(
                    "buffer of {} bytes too small for {} byte request",
                    buffer.len(),
                    request.payload.len()
                ),
            )),
            Some(_) => match queue.pop_front() {
                Some(request) => {
                    let len = request.payload.len();
                    buffer[..len].copy_from_slice(&request.payload);
                    Ok((request.id, len))
                }
                None => Err(Error::quiet(RetCode::ServiceTakeFailed, "no request to take")),
            },
        })
    }

    /// Answer `request_id`. A response for a client that went away is
    /// dropped silently.
    pub fn send_response(&self, request_id: RequestId, payload: &[u8]) -> Result<()> {
        let inner = self.live()?;
        let delivered = bus().send_response(ResponseEnvelope {
            id: request_id,
            payload: payload.to_vec(),
        });
        if !delivered {
            log::debug!(
                "[service] {} response to client {} seq {} dropped: client gone",
                inner.id,
                request_id.client_id,
                request_id.sequence_number
            );
        }
        Ok(())
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
        let member: Arc<dyn Waitable> = inner.requests.clone();
        Some((inner.id, member))
    }

    fn live_inner(&self) -> Option<&ServiceInner> {
        self.inner.as_ref().filter(|inner| inner.node.is_valid())
    }

    fn live(&self) -> Result<&ServiceInner> {
        self.live_inner()
            .ok_or_else(|| Error::new(RetCode::ServiceInvalid, "service is not valid"))
    }
}
