// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile records.
//!
//! Profiles are handed out as heap records of the C-layout [`QosProfile`];
//! the host may read the fields directly. Setters store raw values verbatim,
//! range checks only happen when an entity is created with the profile.

use std::ptr;

use rcl_bridge::QosProfile;

use crate::{drop_handle, into_handle};

/// Allocate a profile populated from a preset id.
///
/// Ids 0..=5 select sensor-data, parameters, default, services-default,
/// parameter-events and system-default; anything else yields the unknown
/// sentinel.
///
/// # Safety
/// The returned profile must be released with `rclb_qos_profile_dispose`.
#[no_mangle]
pub unsafe extern "C" fn rclb_qos_profile_create(preset_id: i32) -> *mut QosProfile {
    into_handle::<_, QosProfile>(QosProfile::from_preset_id(preset_id))
}

/// Release a profile from `rclb_qos_profile_create`.
///
/// # Safety
/// - `qos` must come from `rclb_qos_profile_create`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_qos_profile_dispose(qos: *mut QosProfile) {
    drop_handle::<QosProfile, _>(qos);
}

/// Set history kind and depth. `depth` is converted like a C `(size_t)` cast.
///
/// # Safety
/// `qos` must be a valid profile pointer or NULL (ignored).
#[no_mangle]
pub unsafe extern "C" fn rclb_qos_set_history(qos: *mut QosProfile, mode: i32, depth: i32) {
    if let Some(qos) = qos.as_mut() {
        qos.set_history(mode, depth);
    }
}

/// # Safety
/// `qos` must be a valid profile pointer or NULL (ignored).
#[no_mangle]
pub unsafe extern "C" fn rclb_qos_set_reliability(qos: *mut QosProfile, mode: i32) {
    if let Some(qos) = qos.as_mut() {
        qos.set_reliability(mode);
    }
}

/// # Safety
/// `qos` must be a valid profile pointer or NULL (ignored).
#[no_mangle]
pub unsafe extern "C" fn rclb_qos_set_durability(qos: *mut QosProfile, mode: i32) {
    if let Some(qos) = qos.as_mut() {
        qos.set_durability(mode);
    }
}

/// Copy a profile argument, falling back to `fallback` for NULL.
pub(crate) unsafe fn qos_or(qos: *const QosProfile, fallback: QosProfile) -> QosProfile {
    if qos.is_null() {
        fallback
    } else {
        ptr::read(qos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_and_setters() {
        unsafe {
            let qos = rclb_qos_profile_create(0);
            assert_eq!(*qos, QosProfile::SENSOR_DATA);

            rclb_qos_set_history(qos, 1, -1);
            rclb_qos_set_reliability(qos, 1);
            rclb_qos_set_durability(qos, 1);
            assert_eq!((*qos).history, 1);
            assert_eq!((*qos).depth, usize::MAX);
            assert_eq!((*qos).reliability, 1);
            assert_eq!((*qos).durability, 1);

            rclb_qos_profile_dispose(qos);
        }
    }

    #[test]
    fn out_of_range_preset_is_unknown() {
        unsafe {
            let qos = rclb_qos_profile_create(6);
            assert!((*qos).is_unknown());
            rclb_qos_profile_dispose(qos);

            let qos = rclb_qos_profile_create(-1);
            assert!((*qos).is_unknown());
            rclb_qos_profile_dispose(qos);
        }
    }

    #[test]
    fn null_profile_is_ignored() {
        unsafe {
            rclb_qos_set_history(ptr::null_mut(), 1, 1);
            rclb_qos_profile_dispose(ptr::null_mut());
            assert_eq!(qos_or(ptr::null(), QosProfile::DEFAULT), QosProfile::DEFAULT);
        }
    }
}
