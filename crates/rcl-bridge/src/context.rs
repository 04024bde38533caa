// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Context: the init/shutdown cycle every other entity hangs off.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::allocator::Allocator;
use crate::config::{EnvConfig, DEFAULT_QUEUE_DEPTH};
use crate::ret::{Error, Result, RetCode};

/// Options consumed by [`Context::init`].
#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    pub allocator: Allocator,
    pub domain_id: u32,
    /// Queue depth applied to SYSTEM_DEFAULT history.
    pub default_depth: usize,
}

impl InitOptions {
    /// Options with the allocator given and everything else from the
    /// environment.
    #[must_use]
    pub fn from_env(allocator: Allocator) -> Self {
        let config = EnvConfig::from_env();
        Self {
            allocator,
            domain_id: config.domain_id,
            default_depth: config.default_depth,
        }
    }
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            allocator: Allocator::system(),
            domain_id: 0,
            default_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

pub(crate) struct ContextInner {
    instance_id: u64,
    domain_id: u32,
    default_depth: usize,
    shutdown: AtomicBool,
}

impl ContextInner {
    pub(crate) fn is_valid(&self) -> bool {
        !self.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub(crate) fn default_depth(&self) -> usize {
        self.default_depth
    }
}

/// Middleware context.
///
/// Starts zero-initialized; [`Context::init`] brings it up once and
/// [`Context::shutdown`] invalidates it together with every entity created
/// under it. Dropping an initialized context shuts it down.
pub struct Context {
    inner: Option<Arc<ContextInner>>,
}

impl Context {
    /// Uninitialized context record.
    #[must_use]
    pub const fn zero_initialized() -> Self {
        Self { inner: None }
    }

    /// Zero-initialize and init in one step.
    pub fn new(options: &InitOptions) -> Result<Self> {
        let mut context = Self::zero_initialized();
        context.init(options)?;
        Ok(context)
    }

    /// Initialize the context.
    pub fn init(&mut self, options: &InitOptions) -> Result<()> {
        static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

        if self.inner.is_some() {
            return Err(Error::new(
                RetCode::AlreadyInit,
                "context already initialized",
            ));
        }
        if !options.allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }

        let instance_id = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        self.inner = Some(Arc::new(ContextInner {
            instance_id,
            domain_id: options.domain_id,
            default_depth: options.default_depth.max(1),
            shutdown: AtomicBool::new(false),
        }));
        log::debug!(
            "[context] init instance={} domain={}",
            instance_id,
            options.domain_id
        );
        Ok(())
    }

    /// Shut the context down. Entities created under it become invalid;
    /// blocked waits are not woken (use a guard condition for that).
    pub fn shutdown(&self) -> Result<()> {
        let Some(inner) = self.inner.as_ref() else {
            return Err(Error::new(RetCode::NotInit, "context is zero-initialized"));
        };
        if inner.shutdown.swap(true, Ordering::AcqRel) {
            return Err(Error::new(
                RetCode::AlreadyShutdown,
                "context already shut down",
            ));
        }
        log::debug!("[context] shutdown instance={}", inner.instance_id);
        Ok(())
    }

    /// Release a shut-down context back to the zero-initialized state.
    ///
    /// A context that is still valid must be shut down first.
    pub fn fini(&mut self) -> Result<()> {
        let Some(inner) = self.inner.as_ref() else {
            return Err(Error::new(RetCode::NotInit, "context is zero-initialized"));
        };
        if inner.is_valid() {
            return Err(Error::new(
                RetCode::InvalidArgument,
                "context must be shut down before fini",
            ));
        }
        log::debug!("[context] fini instance={}", inner.instance_id);
        self.inner = None;
        Ok(())
    }

    /// Initialized and not shut down.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.is_valid())
    }

    /// Instance id of a valid context, 0 otherwise.
    #[must_use]
    pub fn instance_id(&self) -> u64 {
        match self.inner.as_ref() {
            Some(inner) if inner.is_valid() => inner.instance_id,
            _ => 0,
        }
    }

    /// Domain of an initialized context.
    #[must_use]
    pub fn domain_id(&self) -> Option<u32> {
        self.inner.as_ref().map(|inner| inner.domain_id)
    }

    /// Shared state for entities, only while valid.
    pub(crate) fn live_inner(&self) -> Option<&Arc<ContextInner>> {
        self.inner.as_ref().filter(|inner| inner.is_valid())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::zero_initialized()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            if !inner.shutdown.swap(true, Ordering::AcqRel) {
                log::debug!("[context] shutdown on drop instance={}", inner.instance_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_initialized_is_invalid() {
        let context = Context::zero_initialized();
        assert!(!context.is_valid());
        assert_eq!(context.instance_id(), 0);
        assert_eq!(context.domain_id(), None);
    }

    #[test]
    fn init_then_shutdown() {
        let mut context = Context::zero_initialized();
        context.init(&InitOptions::default()).expect("init");
        assert!(context.is_valid());
        assert_ne!(context.instance_id(), 0);

        context.shutdown().expect("shutdown");
        assert!(!context.is_valid());
        assert_eq!(context.instance_id(), 0);

        let err = context.shutdown().expect_err("second shutdown");
        assert_eq!(err.code(), RetCode::AlreadyShutdown);
    }

    #[test]
    fn double_init_is_rejected() {
        let mut context = Context::new(&InitOptions::default()).expect("init");
        let err = context
            .init(&InitOptions::default())
            .expect_err("second init");
        assert_eq!(err.code(), RetCode::AlreadyInit);
        assert!(context.is_valid());
    }

    #[test]
    fn invalid_allocator_leaves_context_untouched() {
        let mut context = Context::zero_initialized();
        let options = InitOptions {
            allocator: Allocator::zeroed(),
            ..InitOptions::default()
        };
        let err = context.init(&options).expect_err("bad allocator");
        assert_eq!(err.code(), RetCode::InvalidArgument);
        assert!(!context.is_valid());

        context.init(&InitOptions::default()).expect("retry init");
        assert!(context.is_valid());
    }

    #[test]
    fn shutdown_uninitialized_reports_not_init() {
        let context = Context::zero_initialized();
        assert_eq!(
            context.shutdown().expect_err("not init").code(),
            RetCode::NotInit
        );
    }

    #[test]
    fn fini_requires_shutdown_and_runs_once() {
        let mut context = Context::new(&InitOptions::default()).expect("init");
        let err = context.fini().expect_err("still valid");
        assert_eq!(err.code(), RetCode::InvalidArgument);
        assert!(context.is_valid());

        context.shutdown().expect("shutdown");
        context.fini().expect("fini");
        assert_eq!(context.domain_id(), None);
        assert_eq!(context.fini().expect_err("second fini").code(), RetCode::NotInit);

        context.init(&InitOptions::default()).expect("reinit after fini");
        assert!(context.is_valid());
    }

    #[test]
    fn instance_ids_are_unique() {
        let a = Context::new(&InitOptions::default()).expect("a");
        let b = Context::new(&InitOptions::default()).expect("b");
        assert_ne!(a.instance_id(), b.instance_id());
    }
}
