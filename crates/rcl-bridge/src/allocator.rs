// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Allocator descriptor handed to init calls.
//!
//! Mirrors the middleware's C allocator record: a bundle of function pointers
//! plus an opaque state pointer. Rust-side records are owned by `Box`, so the
//! descriptor is only validated and carried along; a descriptor with a
//! missing function pointer is rejected the same way the middleware rejects
//! it.

use std::os::raw::c_void;
use std::ptr;

/// `malloc`-like hook.
pub type AllocateFn = unsafe extern "C" fn(size: usize, state: *mut c_void) -> *mut c_void;
/// `free`-like hook.
pub type DeallocateFn = unsafe extern "C" fn(pointer: *mut c_void, state: *mut c_void);
/// `realloc`-like hook.
pub type ReallocateFn =
    unsafe extern "C" fn(pointer: *mut c_void, size: usize, state: *mut c_void) -> *mut c_void;
/// `calloc`-like hook.
pub type ZeroAllocateFn =
    unsafe extern "C" fn(count: usize, size: usize, state: *mut c_void) -> *mut c_void;

/// Allocator descriptor (C layout).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    pub allocate: Option<AllocateFn>,
    pub deallocate: Option<DeallocateFn>,
    pub reallocate: Option<ReallocateFn>,
    pub zero_allocate: Option<ZeroAllocateFn>,
    pub state: *mut c_void,
}

unsafe extern "C" fn system_allocate(size: usize, _state: *mut c_void) -> *mut c_void {
    libc::malloc(size)
}

unsafe extern "C" fn system_deallocate(pointer: *mut c_void, _state: *mut c_void) {
    libc::free(pointer);
}

unsafe extern "C" fn system_reallocate(
    pointer: *mut c_void,
    size: usize,
    _state: *mut c_void,
) -> *mut c_void {
    libc::realloc(pointer, size)
}

unsafe extern "C" fn system_zero_allocate(
    count: usize,
    size: usize,
    _state: *mut c_void,
) -> *mut c_void {
    libc::calloc(count, size)
}

impl Allocator {
    /// Process allocator backed by libc.
    #[must_use]
    pub fn system() -> Self {
        Self {
            allocate: Some(system_allocate),
            deallocate: Some(system_deallocate),
            reallocate: Some(system_reallocate),
            zero_allocate: Some(system_zero_allocate),
            state: ptr::null_mut(),
        }
    }

    /// Descriptor with every hook missing; never valid.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            allocate: None,
            deallocate: None,
            reallocate: None,
            zero_allocate: None,
            state: ptr::null_mut(),
        }
    }

    /// All hooks present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.allocate.is_some()
            && self.deallocate.is_some()
            && self.reallocate.is_some()
            && self.zero_allocate.is_some()
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::system()
    }
}

// The state pointer is opaque and only ever passed back to the hooks.
unsafe impl Send for Allocator {}
unsafe impl Sync for Allocator {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_allocator_is_valid() {
        assert!(Allocator::system().is_valid());
        assert!(Allocator::default().is_valid());
    }

    #[test]
    fn zeroed_allocator_is_invalid() {
        assert!(!Allocator::zeroed().is_valid());

        let mut partial = Allocator::system();
        partial.reallocate = None;
        assert!(!partial.is_valid());
    }

    #[test]
    fn system_hooks_round_trip() {
        let allocator = Allocator::system();
        let (Some(allocate), Some(deallocate)) = (allocator.allocate, allocator.deallocate) else {
            panic!("system allocator must carry hooks");
        };
        unsafe {
            let block = allocate(64, allocator.state);
            assert!(!block.is_null());
            deallocate(block, allocator.state);
        }
    }
}
