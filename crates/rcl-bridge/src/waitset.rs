// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wait-set: block on a caller-sized set of waitables.
//!
//! The set holds one fixed-size slot array per [`WaitableKind`]. Entities
//! are added in order into the next free slot of their kind. After a wait
//! returns, slots whose entity was not ready are nulled and ready slots keep
//! their entity, so callers scan the arrays by index. Lookups only check
//! bounds: an index below the provisioned size is always "found", even when
//! the slot is null.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::allocator::Allocator;
use crate::client::Client;
use crate::condition::{WaitSignal, Waitable};
use crate::context::{Context, ContextInner};
use crate::entity::{EntityId, WaitableKind};
use crate::guard_condition::GuardCondition;
use crate::ret::{Error, Result, RetCode};
use crate::service::Service;
use crate::subscription::Subscription;

/// Provisioned slot count per kind.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitSetSizes {
    pub subscriptions: usize,
    pub guard_conditions: usize,
    pub clients: usize,
    pub services: usize,
}

impl WaitSetSizes {
    #[must_use]
    pub fn of(&self, kind: WaitableKind) -> usize {
        match kind {
            WaitableKind::Subscription => self.subscriptions,
            WaitableKind::GuardCondition => self.guard_conditions,
            WaitableKind::Client => self.clients,
            WaitableKind::Service => self.services,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        WaitableKind::ALL.iter().all(|&kind| self.of(kind) == 0)
    }
}

/// Where a wait-set is in its cycle.
///
/// There is no observable waiting state: [`WaitSet::wait`] holds `&mut self`
/// for the whole block. Reading ready members out leaves the slots as they
/// are, so `Ready` also covers a wait-set whose results were consumed; the
/// next `clear` or `resize` returns it to `Provisioned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitSetState {
    /// Zero-initialized.
    Empty,
    /// Sized and being populated.
    Provisioned,
    /// Last wait returned; ready members stay in their slots until cleared.
    Ready,
}

struct Slot {
    id: EntityId,
    member: Arc<dyn Waitable>,
}

#[derive(Default)]
struct SlotArray {
    slots: Vec<Option<Slot>>,
    /// Next index `add` fills; only `clear` and `resize` rewind it.
    next: usize,
}

impl SlotArray {
    fn with_size(size: usize) -> Self {
        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, || None);
        Self { slots, next: 0 }
    }

    fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.next = 0;
    }

    fn members(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().flatten()
    }
}

struct WaitSetInner {
    context: Arc<ContextInner>,
    allocator: Allocator,
    arrays: [SlotArray; 4],
    signal: Arc<WaitSignal>,
    state: WaitSetState,
}

impl WaitSetInner {
    fn array(&self, kind: WaitableKind) -> &SlotArray {
        &self.arrays[kind.slot()]
    }

    fn sizes(&self) -> WaitSetSizes {
        WaitSetSizes {
            subscriptions: self.array(WaitableKind::Subscription).slots.len(),
            guard_conditions: self.array(WaitableKind::GuardCondition).slots.len(),
            clients: self.array(WaitableKind::Client).slots.len(),
            services: self.array(WaitableKind::Service).slots.len(),
        }
    }

    fn members(&self) -> impl Iterator<Item = &Slot> {
        self.arrays.iter().flat_map(SlotArray::members)
    }

    fn any_ready(&self) -> bool {
        self.members().any(|slot| slot.member.is_ready())
    }
}

fn build_arrays(sizes: &WaitSetSizes) -> [SlotArray; 4] {
    WaitableKind::ALL.map(|kind| SlotArray::with_size(sizes.of(kind)))
}

/// Readiness multiplexer over subscriptions, guard conditions, clients and
/// services.
#[derive(Default)]
pub struct WaitSet {
    inner: Option<WaitSetInner>,
}

impl WaitSet {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(context: &Context, sizes: WaitSetSizes, allocator: &Allocator) -> Result<Self> {
        let mut wait_set = Self::zero_initialized();
        wait_set.init(context, sizes, allocator)?;
        Ok(wait_set)
    }

    /// Provision slot arrays. On failure the wait-set stays zero-initialized.
    pub fn init(
        &mut self,
        context: &Context,
        sizes: WaitSetSizes,
        allocator: &Allocator,
    ) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(
                RetCode::AlreadyInit,
                "wait set already initialized",
            ));
        }
        let Some(context) = context.live_inner() else {
            return Err(Error::new(RetCode::NotInit, "context is not valid"));
        };
        if !allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }

        log::debug!("[waitset] init {:?}", sizes);
        self.inner = Some(WaitSetInner {
            context: Arc::clone(context),
            allocator: *allocator,
            arrays: build_arrays(&sizes),
            signal: Arc::new(WaitSignal::new()),
            state: WaitSetState::Provisioned,
        });
        Ok(())
    }

    /// Release the slot arrays and return to the zero-initialized state.
    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(_) => Ok(()),
            None => Err(Error::new(
                RetCode::WaitSetInvalid,
                "wait set is not initialized",
            )),
        }
    }

    /// Reprovision every kind. Current members are dropped.
    pub fn resize(&mut self, sizes: WaitSetSizes) -> Result<()> {
        let inner = self.initialized_mut()?;
        inner.arrays = build_arrays(&sizes);
        inner.state = WaitSetState::Provisioned;
        log::trace!("[waitset] resize {:?}", sizes);
        Ok(())
    }

    /// Null every slot, keeping the sizes.
    pub fn clear(&mut self) -> Result<()> {
        let inner = self.initialized_mut()?;
        inner.arrays.iter_mut().for_each(SlotArray::clear);
        inner.state = WaitSetState::Provisioned;
        Ok(())
    }

    pub fn add_subscription(&mut self, subscription: &Subscription) -> Result<usize> {
        let member = subscription.waitable().ok_or_else(|| {
            Error::new(RetCode::SubscriptionInvalid, "subscription is not valid")
        })?;
        self.add(WaitableKind::Subscription, member)
    }

    pub fn add_guard_condition(&mut self, guard: &GuardCondition) -> Result<usize> {
        let member = guard.waitable().ok_or_else(|| {
            Error::new(RetCode::InvalidArgument, "guard condition is not initialized")
        })?;
        self.add(WaitableKind::GuardCondition, member)
    }

    pub fn add_client(&mut self, client: &Client) -> Result<usize> {
        let member = client
            .waitable()
            .ok_or_else(|| Error::new(RetCode::ClientInvalid, "client is not valid"))?;
        self.add(WaitableKind::Client, member)
    }

    pub fn add_service(&mut self, service: &Service) -> Result<usize> {
        let member = service
            .waitable()
            .ok_or_else(|| Error::new(RetCode::ServiceInvalid, "service is not valid"))?;
        self.add(WaitableKind::Service, member)
    }

    fn add(
        &mut self,
        kind: WaitableKind,
        (id, member): (EntityId, Arc<dyn Waitable>),
    ) -> Result<usize> {
        let inner = self.initialized_mut()?;
        let array = &mut inner.arrays[kind.slot()];
        let index = array.next;
        let Some(slot) = array.slots.get_mut(index) else {
            return Err(Error::new(
                RetCode::WaitSetFull,
                format!("{} capacity exceeded", kind.name()),
            ));
        };
        *slot = Some(Slot { id, member });
        array.next += 1;
        Ok(index)
    }

    /// Block until at least one member is ready.
    ///
    /// `None` waits indefinitely and `Some(Duration::ZERO)` polls. Returns
    /// the number of ready members; a timeout is reported as `Timeout`
    /// without recording an error message. Context shutdown does not wake a
    /// blocked wait; trigger a member guard condition for that.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<usize> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(Error::new(
                RetCode::WaitSetInvalid,
                "wait set is not initialized",
            ));
        };
        if !inner.context.is_valid() {
            return Err(Error::new(
                RetCode::WaitSetInvalid,
                "wait set context is shut down",
            ));
        }
        if inner.sizes().is_zero() {
            return Err(Error::new(RetCode::WaitSetEmpty, "wait set is empty"));
        }

        // Overflowing deadlines degrade to an indefinite wait.
        let deadline = timeout.and_then(|timeout| Instant::now().checked_add(timeout));
        let indefinite = deadline.is_none();
        log::trace!("[waitset] wait timeout={:?}", timeout);

        let signal = Arc::clone(&inner.signal);
        for slot in inner.members() {
            slot.member.add_signal(&signal);
        }

        loop {
            let seen = signal.generation();
            if inner.any_ready() {
                break;
            }
            let woke = signal.wait_past(seen, deadline);
            if !woke && !indefinite {
                break;
            }
        }

        for slot in inner.members() {
            slot.member.remove_signal(signal.id());
        }

        let mut ready = 0;
        for array in &mut inner.arrays {
            for slot in &mut array.slots {
                if let Some(entry) = slot.take().filter(|entry| entry.member.is_ready()) {
                    entry.member.on_wait_reported();
                    *slot = Some(entry);
                    ready += 1;
                }
            }
        }

        inner.state = WaitSetState::Ready;
        if ready == 0 {
            log::trace!("[waitset] wait timed out");
            return Err(Error::quiet(RetCode::Timeout, "wait timed out"));
        }
        log::trace!("[waitset] wait returned {} ready", ready);
        Ok(ready)
    }

    /// Bounds-checked lookup: `(entity, found)`. `found` is false iff
    /// `index >= size_of(kind)`; a found slot may still be `None`.
    #[must_use]
    pub fn get(&self, kind: WaitableKind, index: usize) -> (Option<EntityId>, bool) {
        let Some(inner) = self.inner.as_ref() else {
            return (None, false);
        };
        match inner.array(kind).slots.get(index) {
            Some(slot) => (slot.as_ref().map(|slot| slot.id), true),
            None => (None, false),
        }
    }

    #[must_use]
    pub fn get_subscription(&self, index: usize) -> (Option<EntityId>, bool) {
        self.get(WaitableKind::Subscription, index)
    }

    #[must_use]
    pub fn get_guard_condition(&self, index: usize) -> (Option<EntityId>, bool) {
        self.get(WaitableKind::GuardCondition, index)
    }

    #[must_use]
    pub fn get_client(&self, index: usize) -> (Option<EntityId>, bool) {
        self.get(WaitableKind::Client, index)
    }

    #[must_use]
    pub fn get_service(&self, index: usize) -> (Option<EntityId>, bool) {
        self.get(WaitableKind::Service, index)
    }

    /// Provisioned slot count for `kind`; 0 when uninitialized.
    #[must_use]
    pub fn size_of(&self, kind: WaitableKind) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.array(kind).slots.len())
    }

    #[must_use]
    pub fn sizes(&self) -> WaitSetSizes {
        self.inner
            .as_ref()
            .map_or_else(WaitSetSizes::default, WaitSetInner::sizes)
    }

    #[must_use]
    pub fn state(&self) -> WaitSetState {
        self.inner
            .as_ref()
            .map_or(WaitSetState::Empty, |inner| inner.state)
    }

    #[must_use]
    pub fn allocator(&self) -> Option<&Allocator> {
        self.inner.as_ref().map(|inner| &inner.allocator)
    }

    /// Initialized and its context not shut down.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.context.is_valid())
    }

    fn initialized_mut(&mut self) -> Result<&mut WaitSetInner> {
        self.inner
            .as_mut()
            .ok_or_else(|| Error::new(RetCode::WaitSetInvalid, "wait set is not initialized"))
    }
}

#[cfg(test)]
mod tests;
