// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wait-set handles.
//!
//! The core wait-set reports members by entity id. Host runtimes want back
//! the handle pointers they added, so the foreign wait-set keeps a mirror of
//! handle pointers per kind, sized like the core slot arrays and nulled in
//! step with them after every wait.

use std::os::raw::c_void;
use std::ptr;
use std::time::Duration;

use rcl_bridge::{Allocator, RetCode, WaitSet, WaitSetSizes, WaitableKind};

use crate::context::{context_ref, RclbContext};
use crate::guard::{guard_ref, RclbGuardCondition};
use crate::pubsub::{subscription_ref, RclbSubscription};
use crate::service::{client_ref, service_ref, RclbClient, RclbService};
use crate::{drop_handle, into_handle, status};

/// Opaque handle to a wait-set.
#[repr(C)]
pub struct RclbWaitSet {
    _private: [u8; 0],
}

#[derive(Default)]
pub(crate) struct ForeignWaitSet {
    wait_set: WaitSet,
    handles: [Vec<*const c_void>; 4],
}

impl ForeignWaitSet {
    fn reprovision(&mut self, sizes: &WaitSetSizes) {
        for kind in WaitableKind::ALL {
            self.handles[kind as usize] = vec![ptr::null(); sizes.of(kind)];
        }
    }

    fn clear_handles(&mut self) {
        for handles in &mut self.handles {
            handles.iter_mut().for_each(|handle| *handle = ptr::null());
        }
    }

    /// Null every mirrored handle whose core slot is empty.
    fn sync_after_wait(&mut self) {
        for kind in WaitableKind::ALL {
            for (index, handle) in self.handles[kind as usize].iter_mut().enumerate() {
                if self.wait_set.get(kind, index).0.is_none() {
                    *handle = ptr::null();
                }
            }
        }
    }

    fn record(&mut self, kind: WaitableKind, index: usize, handle: *const c_void) {
        if let Some(slot) = self.handles[kind as usize].get_mut(index) {
            *slot = handle;
        }
    }

    /// `(handle, found)` for the slot at `index`.
    fn lookup(&self, kind: WaitableKind, index: usize) -> (*const c_void, bool) {
        match self.handles[kind as usize].get(index) {
            Some(&handle) => (handle, true),
            None => (ptr::null(), false),
        }
    }
}

fn sizes(
    subscriptions: usize,
    guard_conditions: usize,
    clients: usize,
    services: usize,
) -> WaitSetSizes {
    WaitSetSizes {
        subscriptions,
        guard_conditions,
        clients,
        services,
    }
}

/// Allocate a zero-initialized wait-set.
///
/// # Safety
/// The returned handle must be released with `rclb_free_wait_set`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_wait_set() -> *mut RclbWaitSet {
    into_handle(ForeignWaitSet::default())
}

/// Provision the wait-set for the given number of members per kind.
///
/// On failure the wait-set stays zero-initialized.
///
/// # Safety
/// - `wait_set` must be a handle from `rclb_get_zero_initialized_wait_set`.
/// - `context` must be a context handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_init(
    wait_set: *mut RclbWaitSet,
    number_of_subscriptions: usize,
    number_of_guard_conditions: usize,
    number_of_clients: usize,
    number_of_services: usize,
    context: *const RclbContext,
    allocator: Allocator,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set, context);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let sizes = sizes(
        number_of_subscriptions,
        number_of_guard_conditions,
        number_of_clients,
        number_of_services,
    );
    let result = foreign.wait_set.init(context_ref(context), sizes, &allocator);
    if result.is_ok() {
        foreign.reprovision(&sizes);
    }
    status(result)
}

/// Reprovision every kind; current members are dropped.
///
/// # Safety
/// - `wait_set` must be a wait-set handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_resize(
    wait_set: *mut RclbWaitSet,
    number_of_subscriptions: usize,
    number_of_guard_conditions: usize,
    number_of_clients: usize,
    number_of_services: usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let sizes = sizes(
        number_of_subscriptions,
        number_of_guard_conditions,
        number_of_clients,
        number_of_services,
    );
    let result = foreign.wait_set.resize(sizes);
    if result.is_ok() {
        foreign.reprovision(&sizes);
    }
    status(result)
}

/// Null every slot, keeping the sizes.
///
/// # Safety
/// - `wait_set` must be a wait-set handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_clear(wait_set: *mut RclbWaitSet) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.clear();
    if result.is_ok() {
        foreign.clear_handles();
    }
    status(result)
}

/// Store the added member's handle and report its index.
unsafe fn finish_add(
    foreign: &mut ForeignWaitSet,
    kind: WaitableKind,
    result: rcl_bridge::Result<usize>,
    handle: *const c_void,
    out_index: *mut usize,
) -> i32 {
    match result {
        Ok(index) => {
            foreign.record(kind, index, handle);
            if let Some(out_index) = out_index.as_mut() {
                *out_index = index;
            }
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// Add a subscription into the next free subscription slot.
///
/// # Safety
/// - `wait_set` must be a wait-set handle and `subscription` a subscription handle.
/// - `out_index` may be NULL.
///
/// # Returns
/// `RCL_RET_WAIT_SET_FULL` when every subscription slot is taken.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_add_subscription(
    wait_set: *mut RclbWaitSet,
    subscription: *const RclbSubscription,
    out_index: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set, subscription);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign
        .wait_set
        .add_subscription(subscription_ref(subscription));
    finish_add(
        foreign,
        WaitableKind::Subscription,
        result,
        subscription.cast(),
        out_index,
    )
}

/// Add a guard condition into the next free guard condition slot.
///
/// # Safety
/// - `wait_set` must be a wait-set handle and `guard` a guard condition handle.
/// - `out_index` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_add_guard_condition(
    wait_set: *mut RclbWaitSet,
    guard: *const RclbGuardCondition,
    out_index: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set, guard);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.add_guard_condition(guard_ref(guard));
    finish_add(
        foreign,
        WaitableKind::GuardCondition,
        result,
        guard.cast(),
        out_index,
    )
}

/// Add a client into the next free client slot.
///
/// # Safety
/// - `wait_set` must be a wait-set handle and `client` a client handle.
/// - `out_index` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_add_client(
    wait_set: *mut RclbWaitSet,
    client: *const RclbClient,
    out_index: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set, client);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.add_client(client_ref(client));
    finish_add(
        foreign,
        WaitableKind::Client,
        result,
        client.cast(),
        out_index,
    )
}

/// Add a service into the next free service slot.
///
/// # Safety
/// - `wait_set` must be a wait-set handle and `service` a service handle.
/// - `out_index` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_add_service(
    wait_set: *mut RclbWaitSet,
    service: *const RclbService,
    out_index: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set, service);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.add_service(service_ref(service));
    finish_add(
        foreign,
        WaitableKind::Service,
        result,
        service.cast(),
        out_index,
    )
}

/// Block until a member is ready, the timeout elapses or a member guard
/// condition is triggered.
///
/// `timeout_ns < 0` waits indefinitely, `0` polls. After the call every slot
/// whose member was not ready reads as NULL.
///
/// # Safety
/// - `wait_set` must be a wait-set handle.
/// - Members must stay alive for the duration of the call.
///
/// # Returns
/// `RCL_RET_OK`, `RCL_RET_TIMEOUT` (no error message recorded),
/// `RCL_RET_WAIT_SET_INVALID` or `RCL_RET_WAIT_SET_EMPTY`.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait(wait_set: *mut RclbWaitSet, timeout_ns: i64) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set);

    let timeout = u64::try_from(timeout_ns).ok().map(Duration::from_nanos);
    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.wait(timeout);
    foreign.sync_after_wait();
    match result {
        Ok(_) => RetCode::Ok.as_raw(),
        Err(err) => err.code().as_raw(),
    }
}

/// Provisioned slot count for the raw `WaitableKind` value `kind`; 0 for
/// NULL, an uninitialized wait-set or an unknown kind.
///
/// # Safety
/// - `wait_set` must be a wait-set handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_size_of(wait_set: *const RclbWaitSet, kind: i32) -> usize {
    match (wait_set.cast::<ForeignWaitSet>().as_ref(), WaitableKind::from_raw(kind)) {
        (Some(foreign), Some(kind)) => foreign.wait_set.size_of(kind),
        _ => 0,
    }
}

/// Kind-dispatched slot lookup.
///
/// `kind` is a raw `WaitableKind` value. Returns `found`: false when `kind`
/// is unknown or `index` is outside the provisioned size for it. When found,
/// `*out` receives the slot's handle, which is NULL for an empty or
/// not-ready slot.
///
/// # Safety
/// - `wait_set` must be a wait-set handle, or NULL.
/// - `out` may be NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_get(
    wait_set: *const RclbWaitSet,
    kind: i32,
    index: usize,
    out: *mut *const c_void,
) -> bool {
    let Some(foreign) = wait_set.cast::<ForeignWaitSet>().as_ref() else {
        return false;
    };
    let Some(kind) = WaitableKind::from_raw(kind) else {
        return false;
    };
    let (handle, found) = foreign.lookup(kind, index);
    if found {
        if let Some(out) = out.as_mut() {
            *out = handle;
        }
    }
    found
}

/// # Safety
/// See `rclb_wait_set_get`.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_get_subscription(
    wait_set: *const RclbWaitSet,
    index: usize,
    out: *mut *const RclbSubscription,
) -> bool {
    rclb_wait_set_get(wait_set, WaitableKind::Subscription as i32, index, out.cast())
}

/// # Safety
/// See `rclb_wait_set_get`.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_get_guard_condition(
    wait_set: *const RclbWaitSet,
    index: usize,
    out: *mut *const RclbGuardCondition,
) -> bool {
    rclb_wait_set_get(wait_set, WaitableKind::GuardCondition as i32, index, out.cast())
}

/// # Safety
/// See `rclb_wait_set_get`.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_get_client(
    wait_set: *const RclbWaitSet,
    index: usize,
    out: *mut *const RclbClient,
) -> bool {
    rclb_wait_set_get(wait_set, WaitableKind::Client as i32, index, out.cast())
}

/// # Safety
/// See `rclb_wait_set_get`.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_get_service(
    wait_set: *const RclbWaitSet,
    index: usize,
    out: *mut *const RclbService,
) -> bool {
    rclb_wait_set_get(wait_set, WaitableKind::Service as i32, index, out.cast())
}

/// Initialized and its context not shut down.
///
/// # Safety
/// - `wait_set` must be a wait-set handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_is_valid(wait_set: *const RclbWaitSet) -> bool {
    match wait_set.cast::<ForeignWaitSet>().as_ref() {
        Some(foreign) => foreign.wait_set.is_valid(),
        None => false,
    }
}

/// Finalize a wait-set and drop its members. The handle stays allocated and
/// every lookup misses until `rclb_free_wait_set`.
///
/// # Safety
/// - `wait_set` must be a wait-set handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_WAIT_SET_INVALID` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_wait_set_fini(wait_set: *mut RclbWaitSet) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), wait_set);

    let foreign = &mut *wait_set.cast::<ForeignWaitSet>();
    let result = foreign.wait_set.fini();
    if result.is_ok() {
        foreign.reprovision(&WaitSetSizes::default());
    }
    status(result)
}

/// Release a wait-set.
///
/// # Safety
/// - `wait_set` must come from `rclb_get_zero_initialized_wait_set`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_wait_set(wait_set: *mut RclbWaitSet) {
    drop_handle::<ForeignWaitSet, _>(wait_set);
}

#[cfg(test)]
mod tests;
