// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Guard condition handles.

use std::ptr;

use rcl_bridge::{get_guard_condition, GuardCondition, GuardConditionOptions, RetCode};

use crate::context::{context_ref, RclbContext};
use crate::{drop_handle, into_handle, status};

/// Opaque handle to a guard condition.
#[repr(C)]
pub struct RclbGuardCondition {
    _private: [u8; 0],
}

/// Opaque handle to a guard condition options record.
#[repr(C)]
pub struct RclbGuardConditionOptions {
    _private: [u8; 0],
}

/// # Safety
/// The returned record must be released with `rclb_guard_condition_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_guard_condition_create_default_options(
) -> *mut RclbGuardConditionOptions {
    into_handle(GuardConditionOptions::default())
}

/// # Safety
/// - `options` must come from `rclb_guard_condition_create_default_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_guard_condition_dispose_options(
    options: *mut RclbGuardConditionOptions,
) {
    drop_handle::<GuardConditionOptions, _>(options);
}

/// Allocate a zero-initialized guard condition.
///
/// # Safety
/// The returned handle must be released with `rclb_free_guard_condition`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_guard_condition() -> *mut RclbGuardCondition {
    into_handle(GuardCondition::zero_initialized())
}

/// Initialize a guard condition.
///
/// # Safety
/// - `guard` must be a handle from `rclb_get_zero_initialized_guard_condition`.
/// - `context` must be a context handle.
/// - `options` may be NULL for defaults.
#[no_mangle]
pub unsafe extern "C" fn rclb_guard_condition_init(
    guard: *mut RclbGuardCondition,
    context: *const RclbContext,
    options: *const RclbGuardConditionOptions,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), guard, context);
    let options = match options.cast::<GuardConditionOptions>().as_ref() {
        Some(options) => *options,
        None => GuardConditionOptions::default(),
    };

    let guard = &mut *guard.cast::<GuardCondition>();
    status(guard.init(context_ref(context), &options))
}

/// Allocate and initialize a guard condition with default options.
///
/// On failure `*out_guard` is set to NULL and nothing is allocated.
///
/// # Safety
/// - `context` must be a context handle.
/// - `out_guard` must be a valid pointer.
/// - A handle written to `*out_guard` must be released with `rclb_free_guard_condition`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_guard_condition(
    context: *const RclbContext,
    out_guard: *mut *mut RclbGuardCondition,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), out_guard);
    *out_guard = ptr::null_mut();
    check_not_null!(RetCode::InvalidArgument.as_raw(), context);

    match get_guard_condition(context_ref(context)) {
        Ok(guard) => {
            *out_guard = into_handle(guard);
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// Trigger the guard condition, waking any wait-set blocked on it.
///
/// May be called from any thread while another thread waits.
///
/// # Safety
/// - `guard` must be a guard condition handle that is not being freed concurrently.
#[no_mangle]
pub unsafe extern "C" fn rclb_trigger_guard_condition(guard: *const RclbGuardCondition) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), guard);

    status((*guard.cast::<GuardCondition>()).trigger())
}

/// Validity is the presence of the options record; it survives context
/// shutdown.
///
/// # Safety
/// - `guard` must be a guard condition handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_guard_condition_is_valid(guard: *const RclbGuardCondition) -> bool {
    !guard.is_null() && (*guard.cast::<GuardCondition>()).is_valid()
}

/// Finalize a guard condition. The handle stays allocated until
/// `rclb_free_guard_condition`.
///
/// # Safety
/// - `guard` must be a guard condition handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_INVALID_ARGUMENT` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_guard_condition_fini(guard: *mut RclbGuardCondition) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), guard);

    status((*guard.cast::<GuardCondition>()).fini())
}

/// Release a guard condition.
///
/// # Safety
/// - `guard` must come from `rclb_get_zero_initialized_guard_condition` or
///   `rclb_get_guard_condition`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_guard_condition(guard: *mut RclbGuardCondition) {
    drop_handle::<GuardCondition, _>(guard);
}

pub(crate) unsafe fn guard_ref<'a>(guard: *const RclbGuardCondition) -> &'a GuardCondition {
    &*guard.cast::<GuardCondition>()
}
