// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rcl-bridge C FFI
//!
//! C ABI over `rcl-bridge` for managed host runtimes. Every entity is an
//! opaque heap handle: `rclb_get_zero_initialized_*` allocates it, an
//! `*_init` function brings it up, `*_is_valid` can be asked at any time and
//! `rclb_free_*` releases it exactly once. Status codes are returned as raw
//! `int32_t` with the rcl numbering.
//!
//! # Safety
//!
//! All public functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment. Handles are not
//! synchronized: apart from `rclb_trigger_guard_condition`, a handle must
//! not be used from two threads at once.

/// Record an error and bail out when any pointer argument is null.
macro_rules! check_not_null {
    ($ret:expr, $($ptr:expr),+ $(,)?) => {
        $(
            if $ptr.is_null() {
                rcl_bridge::error_state::set_error(concat!(stringify!($ptr), " argument is null"));
                return $ret;
            }
        )+
    };
}

/// Borrow a C string argument as UTF-8, bailing out with `INVALID_ARGUMENT`.
macro_rules! c_str_arg {
    ($ptr:expr) => {
        match std::ffi::CStr::from_ptr($ptr).to_str() {
            Ok(value) => value,
            Err(_) => {
                rcl_bridge::error_state::set_error(concat!(
                    stringify!($ptr),
                    " is not valid UTF-8"
                ));
                return rcl_bridge::RetCode::InvalidArgument.as_raw();
            }
        }
    };
}

mod clock;
mod context;
mod dispatch;
mod error;
mod guard;
mod logging;
mod node;
mod pubsub;
mod qos;
mod service;
mod waitset;

pub use clock::*;
pub use context::*;
pub use dispatch::*;
pub use error::*;
pub use guard::*;
pub use logging::*;
pub use node::*;
pub use pubsub::*;
pub use qos::*;
pub use service::*;
pub use waitset::*;

pub use rcl_bridge::{Allocator, QosProfile, RequestId, RetCode, WaitableKind};

use std::os::raw::c_char;

use rcl_bridge::Result;

/// Collapse a unit result into the raw status code.
pub(crate) fn status(result: Result<()>) -> i32 {
    rcl_bridge::ret::to_raw(&result)
}

/// Heap-allocate `value` and hand ownership to the caller as an opaque
/// pointer.
pub(crate) fn into_handle<T, H>(value: T) -> *mut H {
    Box::into_raw(Box::new(value)).cast::<H>()
}

/// Take back ownership of a handle produced by [`into_handle`].
///
/// # Safety
/// `handle` must come from `into_handle::<T, _>` and not have been released.
pub(crate) unsafe fn drop_handle<T, H>(handle: *mut H) {
    if !handle.is_null() {
        drop(Box::from_raw(handle.cast::<T>()));
    }
}

/// Borrow a `(data, len)` payload argument. NULL is accepted for `len == 0`.
///
/// # Safety
/// Unless `len` is zero, `data` must point to `len` readable bytes.
pub(crate) unsafe fn payload_arg<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len)
    }
}

/// Borrow a `(buffer, capacity)` output argument. NULL is accepted for
/// `capacity == 0`.
///
/// # Safety
/// Unless `capacity` is zero, `buffer` must point to `capacity` writable bytes.
pub(crate) unsafe fn buffer_arg<'a>(buffer: *mut u8, capacity: usize) -> &'a mut [u8] {
    if capacity == 0 {
        &mut []
    } else {
        std::slice::from_raw_parts_mut(buffer, capacity)
    }
}

/// Name of the wrapped middleware implementation.
///
/// # Safety
/// The returned pointer is valid for the lifetime of the process (static storage).
#[no_mangle]
pub unsafe extern "C" fn rclb_get_implementation_identifier() -> *const c_char {
    static IDENTIFIER: &str = "rclbridge_intra\0";
    IDENTIFIER.as_ptr().cast::<c_char>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn identifier_matches_core() {
        let id = unsafe { CStr::from_ptr(rclb_get_implementation_identifier()) };
        assert_eq!(id.to_str().expect("utf8"), rcl_bridge::IMPLEMENTATION_IDENTIFIER);
    }

    #[test]
    fn status_codes_pass_through() {
        assert_eq!(status(Ok(())), 0);
        let err = rcl_bridge::Error::new(RetCode::WaitSetFull, "full");
        assert_eq!(status(Err(err)), 902);
    }
}
