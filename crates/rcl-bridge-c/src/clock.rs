// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clock handles.

use std::ptr;

use rcl_bridge::{Allocator, Clock, ClockType, RetCode};

use crate::{drop_handle, into_handle, status};

/// Opaque handle to a clock.
#[repr(C)]
pub struct RclbClock {
    _private: [u8; 0],
}

/// Create a ROS clock. Returns NULL (with the error recorded) for a NULL or
/// incomplete allocator.
///
/// # Safety
/// - `allocator` must be a valid pointer or NULL.
/// - A returned clock must be released with `rclb_ros_clock_dispose`.
#[no_mangle]
pub unsafe extern "C" fn rclb_ros_clock_create(allocator: *const Allocator) -> *mut RclbClock {
    check_not_null!(ptr::null_mut(), allocator);

    match Clock::ros(&*allocator) {
        Ok(clock) => into_handle(clock),
        Err(_) => ptr::null_mut(),
    }
}

/// Create a clock of `clock_type` (1 ROS, 2 system, 3 steady).
///
/// On failure `*out_clock` is set to NULL and nothing is allocated.
///
/// # Safety
/// - `allocator` and `out_clock` must be valid pointers.
/// - A clock written to `*out_clock` must be released with `rclb_ros_clock_dispose`.
///
/// # Returns
/// `RCL_RET_INVALID_ARGUMENT` for an unknown or uninitialized type or an
/// incomplete allocator.
#[no_mangle]
pub unsafe extern "C" fn rclb_clock_init(
    clock_type: i32,
    allocator: *const Allocator,
    out_clock: *mut *mut RclbClock,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), out_clock);
    *out_clock = ptr::null_mut();
    check_not_null!(RetCode::InvalidArgument.as_raw(), allocator);

    let Some(clock_type) = ClockType::from_raw(clock_type) else {
        rcl_bridge::error_state::set_error("unknown clock type");
        return RetCode::InvalidArgument.as_raw();
    };
    match Clock::new(clock_type, &*allocator) {
        Ok(clock) => {
            *out_clock = into_handle(clock);
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// Current time of the clock in nanoseconds.
///
/// # Safety
/// - `clock` and `out_now` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn rclb_clock_get_now(clock: *const RclbClock, out_now: *mut i64) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), clock, out_now);

    *out_now = (*clock.cast::<Clock>()).now();
    RetCode::Ok.as_raw()
}

/// # Safety
/// - `clock` must be a clock handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_enable_ros_time_override(clock: *mut RclbClock) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), clock);

    status((*clock.cast::<Clock>()).enable_ros_time_override())
}

/// # Safety
/// - `clock` must be a clock handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_disable_ros_time_override(clock: *mut RclbClock) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), clock);

    status((*clock.cast::<Clock>()).disable_ros_time_override())
}

/// Value returned by `rclb_clock_get_now` while the override is enabled.
///
/// # Safety
/// - `clock` must be a clock handle.
#[no_mangle]
pub unsafe extern "C" fn rclb_set_ros_time_override(clock: *mut RclbClock, time: i64) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), clock);

    status((*clock.cast::<Clock>()).set_ros_time_override(time))
}

/// Release a clock from `rclb_ros_clock_create` or `rclb_clock_init`.
///
/// # Safety
/// - `clock` must be a clock handle, or NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_ros_clock_dispose(clock: *mut RclbClock) {
    drop_handle::<Clock, _>(clock);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ros_clock_override() {
        unsafe {
            let allocator = Allocator::system();
            let clock = rclb_ros_clock_create(&allocator);
            assert!(!clock.is_null());

            assert_eq!(rclb_set_ros_time_override(clock, 42), 0);
            assert_eq!(rclb_enable_ros_time_override(clock), 0);
            let mut now = 0;
            assert_eq!(rclb_clock_get_now(clock, &mut now), 0);
            assert_eq!(now, 42);
            assert_eq!(rclb_disable_ros_time_override(clock), 0);

            rclb_ros_clock_dispose(clock);
        }
    }

    #[test]
    fn invalid_allocator_yields_null() {
        unsafe {
            let allocator = Allocator::zeroed();
            assert!(rclb_ros_clock_create(&allocator).is_null());
            assert!(rclb_ros_clock_create(ptr::null()).is_null());
        }
    }

    #[test]
    fn clock_init_rejects_bad_type() {
        unsafe {
            let allocator = Allocator::system();
            let mut clock = ptr::null_mut();
            assert_eq!(
                rclb_clock_init(0, &allocator, &mut clock),
                RetCode::InvalidArgument.as_raw()
            );
            assert!(clock.is_null());
            assert_eq!(
                rclb_clock_init(9, &allocator, &mut clock),
                RetCode::InvalidArgument.as_raw()
            );

            assert_eq!(rclb_clock_init(3, &allocator, &mut clock), 0);
            assert!(!clock.is_null());
            assert_eq!(
                rclb_enable_ros_time_override(clock),
                RetCode::Error.as_raw()
            );
            rclb_ros_clock_dispose(clock);
        }
    }
}
