// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Kind-dispatched handle operations.
//!
//! Hosts that marshal every entity the same way can drive the lifecycle
//! through one set of entry points keyed by the raw [`RclbEntityKind`]
//! value. Each call forwards to the per-kind function of the same name; an
//! unknown kind is a no-op that yields NULL, false or
//! `RCL_RET_INVALID_ARGUMENT`.

use std::os::raw::c_void;
use std::ptr;

use rcl_bridge::RetCode;

use crate::context::{
    rclb_context_fini, rclb_context_is_valid, rclb_free_context,
    rclb_get_zero_initialized_context,
};
use crate::guard::{
    rclb_free_guard_condition, rclb_get_zero_initialized_guard_condition,
    rclb_guard_condition_create_default_options, rclb_guard_condition_dispose_options,
    rclb_guard_condition_fini, rclb_guard_condition_is_valid,
};
use crate::node::{
    rclb_free_node, rclb_get_zero_initialized_node, rclb_node_create_default_options,
    rclb_node_dispose_options, rclb_node_fini, rclb_node_is_valid,
};
use crate::pubsub::{
    rclb_free_publisher, rclb_free_subscription, rclb_get_zero_initialized_publisher,
    rclb_get_zero_initialized_subscription, rclb_publisher_create_options,
    rclb_publisher_dispose_options, rclb_publisher_fini, rclb_publisher_is_valid,
    rclb_subscription_create_options, rclb_subscription_dispose_options,
    rclb_subscription_fini, rclb_subscription_is_valid,
};
use crate::service::{
    rclb_client_create_options, rclb_client_dispose_options, rclb_client_fini,
    rclb_client_is_valid, rclb_free_client, rclb_free_service, rclb_get_zero_initialized_client,
    rclb_get_zero_initialized_service, rclb_service_create_options,
    rclb_service_dispose_options, rclb_service_fini, rclb_service_is_valid,
};
use crate::waitset::{
    rclb_free_wait_set, rclb_get_zero_initialized_wait_set, rclb_wait_set_fini,
    rclb_wait_set_is_valid,
};

/// Entity kinds for the dispatched entry points.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RclbEntityKind {
    Context = 0,
    Node = 1,
    Publisher = 2,
    Subscription = 3,
    Service = 4,
    Client = 5,
    GuardCondition = 6,
    WaitSet = 7,
}

impl RclbEntityKind {
    pub const ALL: [RclbEntityKind; 8] = [
        RclbEntityKind::Context,
        RclbEntityKind::Node,
        RclbEntityKind::Publisher,
        RclbEntityKind::Subscription,
        RclbEntityKind::Service,
        RclbEntityKind::Client,
        RclbEntityKind::GuardCondition,
        RclbEntityKind::WaitSet,
    ];

    /// Map a raw kind from the host; `None` outside `0..=7`.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Allocate the default options record for `kind`. Publishers and
/// subscriptions get the default profile, services and clients the
/// services-default profile. Contexts, wait-sets and unknown kinds have no
/// options record: NULL.
///
/// # Safety
/// - A returned record must be released with `rclb_dispose_options` and the same kind.
#[no_mangle]
pub unsafe extern "C" fn rclb_create_default_options(kind: i32) -> *mut c_void {
    match RclbEntityKind::from_raw(kind) {
        Some(RclbEntityKind::Node) => rclb_node_create_default_options().cast(),
        Some(RclbEntityKind::Publisher) => rclb_publisher_create_options(ptr::null()).cast(),
        Some(RclbEntityKind::Subscription) => {
            rclb_subscription_create_options(ptr::null()).cast()
        }
        Some(RclbEntityKind::Service) => rclb_service_create_options(ptr::null()).cast(),
        Some(RclbEntityKind::Client) => rclb_client_create_options(ptr::null()).cast(),
        Some(RclbEntityKind::GuardCondition) => {
            rclb_guard_condition_create_default_options().cast()
        }
        Some(RclbEntityKind::Context | RclbEntityKind::WaitSet) | None => ptr::null_mut(),
    }
}

/// Release an options record of `kind`.
///
/// # Safety
/// - `options` must come from `rclb_create_default_options` with the same kind, or be NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_dispose_options(kind: i32, options: *mut c_void) {
    match RclbEntityKind::from_raw(kind) {
        Some(RclbEntityKind::Node) => rclb_node_dispose_options(options.cast()),
        Some(RclbEntityKind::Publisher) => rclb_publisher_dispose_options(options.cast()),
        Some(RclbEntityKind::Subscription) => rclb_subscription_dispose_options(options.cast()),
        Some(RclbEntityKind::Service) => rclb_service_dispose_options(options.cast()),
        Some(RclbEntityKind::Client) => rclb_client_dispose_options(options.cast()),
        Some(RclbEntityKind::GuardCondition) => {
            rclb_guard_condition_dispose_options(options.cast());
        }
        Some(RclbEntityKind::Context | RclbEntityKind::WaitSet) | None => {}
    }
}

/// Allocate a zero-initialized handle of `kind`; NULL for an unknown kind.
///
/// # Safety
/// - The returned handle must be released with `rclb_free` and the same kind.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized(kind: i32) -> *mut c_void {
    match RclbEntityKind::from_raw(kind) {
        Some(RclbEntityKind::Context) => rclb_get_zero_initialized_context().cast(),
        Some(RclbEntityKind::Node) => rclb_get_zero_initialized_node().cast(),
        Some(RclbEntityKind::Publisher) => rclb_get_zero_initialized_publisher().cast(),
        Some(RclbEntityKind::Subscription) => rclb_get_zero_initialized_subscription().cast(),
        Some(RclbEntityKind::Service) => rclb_get_zero_initialized_service().cast(),
        Some(RclbEntityKind::Client) => rclb_get_zero_initialized_client().cast(),
        Some(RclbEntityKind::GuardCondition) => {
            rclb_get_zero_initialized_guard_condition().cast()
        }
        Some(RclbEntityKind::WaitSet) => rclb_get_zero_initialized_wait_set().cast(),
        None => ptr::null_mut(),
    }
}

/// Finalize a handle of `kind` without releasing it.
///
/// # Safety
/// - `handle` must be a handle of `kind`.
///
/// # Returns
/// The per-kind status, or `RCL_RET_INVALID_ARGUMENT` for an unknown kind.
#[no_mangle]
pub unsafe extern "C" fn rclb_fini(kind: i32, handle: *mut c_void) -> i32 {
    let Some(kind) = RclbEntityKind::from_raw(kind) else {
        rcl_bridge::error_state::set_error("unknown entity kind");
        return RetCode::InvalidArgument.as_raw();
    };
    match kind {
        RclbEntityKind::Context => rclb_context_fini(handle.cast()),
        RclbEntityKind::Node => rclb_node_fini(handle.cast()),
        RclbEntityKind::Publisher => rclb_publisher_fini(handle.cast()),
        RclbEntityKind::Subscription => rclb_subscription_fini(handle.cast()),
        RclbEntityKind::Service => rclb_service_fini(handle.cast()),
        RclbEntityKind::Client => rclb_client_fini(handle.cast()),
        RclbEntityKind::GuardCondition => rclb_guard_condition_fini(handle.cast()),
        RclbEntityKind::WaitSet => rclb_wait_set_fini(handle.cast()),
    }
}

/// Release a handle of `kind`, finalizing it first if needed. An unknown
/// kind releases nothing.
///
/// # Safety
/// - `handle` must be a handle of `kind`, or NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free(kind: i32, handle: *mut c_void) {
    match RclbEntityKind::from_raw(kind) {
        Some(RclbEntityKind::Context) => rclb_free_context(handle.cast()),
        Some(RclbEntityKind::Node) => rclb_free_node(handle.cast()),
        Some(RclbEntityKind::Publisher) => rclb_free_publisher(handle.cast()),
        Some(RclbEntityKind::Subscription) => rclb_free_subscription(handle.cast()),
        Some(RclbEntityKind::Service) => rclb_free_service(handle.cast()),
        Some(RclbEntityKind::Client) => rclb_free_client(handle.cast()),
        Some(RclbEntityKind::GuardCondition) => rclb_free_guard_condition(handle.cast()),
        Some(RclbEntityKind::WaitSet) => rclb_free_wait_set(handle.cast()),
        None => {}
    }
}

/// Validity of a handle of `kind`; false for NULL or an unknown kind.
///
/// # Safety
/// - `handle` must be a handle of `kind`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_is_valid(kind: i32, handle: *const c_void) -> bool {
    match RclbEntityKind::from_raw(kind) {
        Some(RclbEntityKind::Context) => rclb_context_is_valid(handle.cast()),
        Some(RclbEntityKind::Node) => rclb_node_is_valid(handle.cast()),
        Some(RclbEntityKind::Publisher) => rclb_publisher_is_valid(handle.cast()),
        Some(RclbEntityKind::Subscription) => rclb_subscription_is_valid(handle.cast()),
        Some(RclbEntityKind::Service) => rclb_service_is_valid(handle.cast()),
        Some(RclbEntityKind::Client) => rclb_client_is_valid(handle.cast()),
        Some(RclbEntityKind::GuardCondition) => rclb_guard_condition_is_valid(handle.cast()),
        Some(RclbEntityKind::WaitSet) => rclb_wait_set_is_valid(handle.cast()),
        None => false,
    }
}
