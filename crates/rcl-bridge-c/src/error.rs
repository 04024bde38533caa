// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Last-error snapshots.

use std::ffi::CString;
use std::os::raw::c_char;

use rcl_bridge::error_state;

/// Copy the calling thread's last error into a new C string:
/// `"<message>, at <file>:<line>"`, or `"error not set"`.
///
/// # Safety
/// The returned string must be released with `rclb_dispose_error_string`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_error_string() -> *mut c_char {
    let mut snapshot = error_state::error_string();
    snapshot.retain(|c| c != '\0');
    match CString::new(snapshot) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Release a string from `rclb_get_error_string`.
///
/// # Safety
/// - `error` must come from `rclb_get_error_string`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_dispose_error_string(error: *mut c_char) {
    if !error.is_null() {
        drop(CString::from_raw(error));
    }
}

/// Clear the calling thread's last error.
///
/// # Safety
/// Always safe to call.
#[no_mangle]
pub unsafe extern "C" fn rclb_reset_error() {
    error_state::reset_error();
}
