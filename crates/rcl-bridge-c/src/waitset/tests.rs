// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::context::{rclb_free_context, rclb_get_zero_initialized_context, rclb_init};
use crate::guard::{
    rclb_free_guard_condition, rclb_get_guard_condition, rclb_trigger_guard_condition,
};

struct Fixture {
    context: *mut RclbContext,
    guard: *mut RclbGuardCondition,
    wait_set: *mut RclbWaitSet,
}

impl Fixture {
    unsafe fn new(guards: usize) -> Self {
        let context = rclb_get_zero_initialized_context();
        assert_eq!(rclb_init(context, Allocator::system()), 0);

        let mut guard = ptr::null_mut();
        assert_eq!(rclb_get_guard_condition(context, &mut guard), 0);

        let wait_set = rclb_get_zero_initialized_wait_set();
        assert_eq!(
            rclb_wait_set_init(wait_set, 0, guards, 0, 0, context, Allocator::system()),
            0
        );
        Self {
            context,
            guard,
            wait_set,
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        unsafe {
            rclb_free_wait_set(self.wait_set);
            rclb_free_guard_condition(self.guard);
            rclb_free_context(self.context);
        }
    }
}

#[test]
fn ready_guard_handle_comes_back() {
    unsafe {
        let fx = Fixture::new(2);
        let mut index = usize::MAX;
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, &mut index),
            0
        );
        assert_eq!(index, 0);

        assert_eq!(rclb_trigger_guard_condition(fx.guard), 0);
        assert_eq!(rclb_wait(fx.wait_set, 1_000_000_000), 0);

        let mut out = ptr::null();
        assert!(rclb_wait_set_get_guard_condition(fx.wait_set, 0, &mut out));
        assert_eq!(out, fx.guard.cast_const());

        // Second slot was never filled: found, but NULL.
        out = fx.guard.cast_const();
        assert!(rclb_wait_set_get_guard_condition(fx.wait_set, 1, &mut out));
        assert!(out.is_null());

        assert!(!rclb_wait_set_get_guard_condition(fx.wait_set, 2, &mut out));
    }
}

#[test]
fn not_ready_slot_is_nulled_after_timeout() {
    unsafe {
        let fx = Fixture::new(1);
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, ptr::null_mut()),
            0
        );
        assert_eq!(rclb_wait(fx.wait_set, 0), RetCode::Timeout.as_raw());

        let mut out = fx.guard.cast_const();
        assert!(rclb_wait_set_get_guard_condition(fx.wait_set, 0, &mut out));
        assert!(out.is_null());
    }
}

#[test]
fn full_and_resize() {
    unsafe {
        let fx = Fixture::new(1);
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, ptr::null_mut()),
            0
        );
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, ptr::null_mut()),
            RetCode::WaitSetFull.as_raw()
        );

        assert_eq!(rclb_wait_set_resize(fx.wait_set, 3, 2, 1, 0), 0);
        assert_eq!(
            rclb_wait_set_size_of(fx.wait_set, WaitableKind::Subscription as i32),
            3
        );
        assert_eq!(
            rclb_wait_set_size_of(fx.wait_set, WaitableKind::GuardCondition as i32),
            2
        );
        assert_eq!(rclb_wait_set_size_of(fx.wait_set, WaitableKind::Service as i32), 0);

        let mut out: *const c_void = ptr::null();
        assert!(rclb_wait_set_get(fx.wait_set, WaitableKind::Client as i32, 0, &mut out));
        assert!(out.is_null());
        assert!(!rclb_wait_set_get(fx.wait_set, WaitableKind::Service as i32, 0, &mut out));
    }
}

#[test]
fn clear_nulls_mirror() {
    unsafe {
        let fx = Fixture::new(1);
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, ptr::null_mut()),
            0
        );
        let mut out = ptr::null();
        assert!(rclb_wait_set_get_guard_condition(fx.wait_set, 0, &mut out));
        assert_eq!(out, fx.guard.cast_const());

        assert_eq!(rclb_wait_set_clear(fx.wait_set), 0);
        assert!(rclb_wait_set_get_guard_condition(fx.wait_set, 0, &mut out));
        assert!(out.is_null());
        assert_eq!(
            rclb_wait_set_size_of(fx.wait_set, WaitableKind::GuardCondition as i32),
            1
        );
    }
}

#[test]
fn zero_initialized_and_null_wait_sets() {
    unsafe {
        let wait_set = rclb_get_zero_initialized_wait_set();
        assert!(!rclb_wait_set_is_valid(wait_set));
        assert_eq!(rclb_wait(wait_set, 0), RetCode::WaitSetInvalid.as_raw());
        assert!(!rclb_wait_set_get(
            wait_set,
            WaitableKind::GuardCondition as i32,
            0,
            ptr::null_mut()
        ));
        assert_eq!(
            rclb_wait_set_size_of(wait_set, WaitableKind::GuardCondition as i32),
            0
        );
        rclb_free_wait_set(wait_set);

        assert!(!rclb_wait_set_is_valid(ptr::null()));
        assert_eq!(rclb_wait_set_size_of(ptr::null(), WaitableKind::Client as i32), 0);
        rclb_free_wait_set(ptr::null_mut());
    }
}

#[test]
fn unknown_kind_misses_and_fini_empties_mirror() {
    unsafe {
        let fx = Fixture::new(1);
        assert_eq!(
            rclb_wait_set_add_guard_condition(fx.wait_set, fx.guard, ptr::null_mut()),
            0
        );
        let mut out: *const c_void = ptr::null();
        assert!(!rclb_wait_set_get(fx.wait_set, 7, 0, &mut out));
        assert!(out.is_null());
        assert_eq!(rclb_wait_set_size_of(fx.wait_set, i32::MAX), 0);

        assert_eq!(rclb_wait_set_fini(fx.wait_set), 0);
        assert!(!rclb_wait_set_get(
            fx.wait_set,
            WaitableKind::GuardCondition as i32,
            0,
            &mut out
        ));
        assert_eq!(
            rclb_wait_set_fini(fx.wait_set),
            RetCode::WaitSetInvalid.as_raw()
        );
    }
}
