// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Context handles.

use rcl_bridge::{Allocator, Context, InitOptions, RetCode};

use crate::{drop_handle, into_handle, status};

/// Opaque handle to a context.
#[repr(C)]
pub struct RclbContext {
    _private: [u8; 0],
}

/// Allocate a zero-initialized context.
///
/// # Safety
/// The returned handle must be released with `rclb_free_context`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_context() -> *mut RclbContext {
    into_handle(Context::zero_initialized())
}

/// Initialize a context. Domain and default queue depth come from the
/// environment (`RCLB_DOMAIN_ID`, `ROS_DOMAIN_ID`, `RCLB_DEFAULT_DEPTH`).
///
/// # Safety
/// - `context` must be a handle from `rclb_get_zero_initialized_context`.
///
/// # Returns
/// `RCL_RET_OK`, `RCL_RET_ALREADY_INIT`, or `RCL_RET_INVALID_ARGUMENT` for a
/// null handle or an incomplete allocator.
#[no_mangle]
pub unsafe extern "C" fn rclb_init(context: *mut RclbContext, allocator: Allocator) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), context);

    let context = &mut *context.cast::<Context>();
    status(context.init(&InitOptions::from_env(allocator)))
}

/// Shut a context down. Entities created under it become invalid.
///
/// # Safety
/// - `context` must be a handle from `rclb_get_zero_initialized_context`.
#[no_mangle]
pub unsafe extern "C" fn rclb_shutdown(context: *mut RclbContext) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), context);

    let context = &*context.cast::<Context>();
    status(context.shutdown())
}

/// Whether the context is initialized and not shut down. NULL is invalid.
///
/// # Safety
/// - `context` must be a handle from `rclb_get_zero_initialized_context`, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_context_is_valid(context: *const RclbContext) -> bool {
    !context.is_null() && (*context.cast::<Context>()).is_valid()
}

/// Finalize a shut-down context. The handle stays allocated and reads as
/// invalid until `rclb_free_context`.
///
/// # Safety
/// - `context` must be a handle from `rclb_get_zero_initialized_context`.
///
/// # Returns
/// `RCL_RET_OK`, `RCL_RET_INVALID_ARGUMENT` while the context is still valid,
/// or `RCL_RET_NOT_INIT` when there is nothing to finalize.
#[no_mangle]
pub unsafe extern "C" fn rclb_context_fini(context: *mut RclbContext) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), context);

    let context = &mut *context.cast::<Context>();
    status(context.fini())
}

/// Release a context, shutting it down first if needed.
///
/// # Safety
/// - `context` must be a handle from `rclb_get_zero_initialized_context`, or NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_context(context: *mut RclbContext) {
    drop_handle::<Context, _>(context);
}

/// Borrow the Rust context behind a handle.
pub(crate) unsafe fn context_ref<'a>(context: *const RclbContext) -> &'a Context {
    &*context.cast::<Context>()
}
