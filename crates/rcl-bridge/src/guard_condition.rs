// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Guard conditions: manually triggered waitables.
//!
//! Triggering is the one operation that may run on any thread while another
//! thread is blocked in a wait, which is how waiters are cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::condition::{SignalHooks, WaitSignal, Waitable};
use crate::context::Context;
use crate::entity::EntityId;
use crate::ret::{Error, Result, RetCode};

#[derive(Debug, Clone, Copy, Default)]
pub struct GuardConditionOptions {
    pub allocator: Allocator,
}

struct GuardState {
    triggered: AtomicBool,
    hooks: SignalHooks,
}

impl Waitable for GuardState {
    fn is_ready(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    fn add_signal(&self, signal: &Arc<WaitSignal>) {
        self.hooks.add(signal);
    }

    fn remove_signal(&self, signal_id: u64) {
        self.hooks.remove(signal_id);
    }

    // A trigger is consumed by the wait that reports it.
    fn on_wait_reported(&self) {
        self.triggered.store(false, Ordering::Release);
    }
}

struct GuardInner {
    id: EntityId,
    options: GuardConditionOptions,
    state: Arc<GuardState>,
}

/// Guard condition.
///
/// Validity is the presence of its options record: a guard condition stays
/// valid after its context shuts down.
#[derive(Default)]
pub struct GuardCondition {
    inner: Option<GuardInner>,
}

impl GuardCondition {
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    pub fn new(context: &Context, options: &GuardConditionOptions) -> Result<Self> {
        let mut guard = Self::zero_initialized();
        guard.init(context, options)?;
        Ok(guard)
    }

    pub fn init(&mut self, context: &Context, options: &GuardConditionOptions) -> Result<()> {
        if self.inner.is_some() {
            return Err(Error::new(
                RetCode::AlreadyInit,
                "guard condition already initialized",
            ));
        }
        if !context.is_valid() {
            return Err(Error::new(RetCode::NotInit, "context is not valid"));
        }
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }

        let id = EntityId::next();
        log::debug!("[guard] init {}", id);
        self.inner = Some(GuardInner {
            id,
            options: *options,
            state: Arc::new(GuardState {
                triggered: AtomicBool::new(false),
                hooks: SignalHooks::new(),
            }),
        });
        Ok(())
    }

    pub fn fini(&mut self) -> Result<()> {
        match self.inner.take() {
            Some(inner) => {
                log::debug!("[guard] fini {}", inner.id);
                Ok(())
            }
            None => Err(Error::new(
                RetCode::InvalidArgument,
                "guard condition is not initialized",
            )),
        }
    }

    /// Mark the guard ready and wake every wait-set blocked on it. The
    /// trigger stays set until a wait reports it.
    pub fn trigger(&self) -> Result<()> {
        let Some(inner) = self.inner.as_ref() else {
            return Err(Error::new(
                RetCode::InvalidArgument,
                "guard condition is not initialized",
            ));
        };
        inner.state.triggered.store(true, Ordering::Release);
        inner.state.hooks.notify_all();
        log::trace!("[guard] trigger {}", inner.id);
        Ok(())
    }

    /// Triggered and not yet reported by a wait.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.state.is_ready())
    }

    #[must_use]
    pub fn options(&self) -> Option<&GuardConditionOptions> {
        self.inner.as_ref().map(|inner| &inner.options)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.options().is_some()
    }

    #[must_use]
    pub fn id(&self) -> Option<EntityId> {
        self.inner.as_ref().map(|inner| inner.id)
    }

    pub(crate) fn waitable(&self) -> Option<(EntityId, Arc<dyn Waitable>)> {
        let inner = self.inner.as_ref()?;
        let member: Arc<dyn Waitable> = inner.state.clone();
        Some((inner.id, member))
    }
}

/// Allocate and initialize a guard condition with default options in one
/// step; nothing is returned on failure.
pub fn get_guard_condition(context: &Context) -> Result<GuardCondition> {
    GuardCondition::new(context, &GuardConditionOptions::default())
}
