// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher and subscription handles.

use std::os::raw::c_char;

use rcl_bridge::{
    Publisher, PublisherOptions, QosProfile, RetCode, Subscription, SubscriptionOptions,
};

use crate::node::{node_ref, RclbNode};
use crate::qos::qos_or;
use crate::{buffer_arg, drop_handle, into_handle, payload_arg, status};

/// Opaque handle to a publisher.
#[repr(C)]
pub struct RclbPublisher {
    _private: [u8; 0],
}

/// Opaque handle to a publisher options record.
#[repr(C)]
pub struct RclbPublisherOptions {
    _private: [u8; 0],
}

/// Opaque handle to a subscription.
#[repr(C)]
pub struct RclbSubscription {
    _private: [u8; 0],
}

/// Opaque handle to a subscription options record.
#[repr(C)]
pub struct RclbSubscriptionOptions {
    _private: [u8; 0],
}

// =========================================================================
// Publisher
// =========================================================================

/// Allocate publisher options carrying a copy of `qos` (NULL selects the
/// default profile).
///
/// # Safety
/// - `qos` must be a valid profile pointer or NULL.
/// - The returned record must be released with `rclb_publisher_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_create_options(
    qos: *const QosProfile,
) -> *mut RclbPublisherOptions {
    into_handle(PublisherOptions::with_qos(qos_or(qos, QosProfile::DEFAULT)))
}

/// # Safety
/// - `options` must come from `rclb_publisher_create_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_dispose_options(options: *mut RclbPublisherOptions) {
    drop_handle::<PublisherOptions, _>(options);
}

/// Allocate a zero-initialized publisher.
///
/// # Safety
/// The returned handle must be released with `rclb_free_publisher`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_publisher() -> *mut RclbPublisher {
    into_handle(Publisher::zero_initialized())
}

/// Create the publisher on `topic_name`, expanded against the node.
///
/// # Safety
/// - `publisher` must be a handle from `rclb_get_zero_initialized_publisher`.
/// - `node` must be a node handle.
/// - `topic_name` must be a valid NUL-terminated string.
/// - `options` may be NULL for defaults.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_init(
    publisher: *mut RclbPublisher,
    node: *const RclbNode,
    topic_name: *const c_char,
    options: *const RclbPublisherOptions,
) -> i32 {
    check_not_null!(
        RetCode::InvalidArgument.as_raw(),
        publisher,
        node,
        topic_name
    );
    let topic_name = c_str_arg!(topic_name);
    let options = match options.cast::<PublisherOptions>().as_ref() {
        Some(options) => *options,
        None => PublisherOptions::default(),
    };

    let publisher = &mut *publisher.cast::<Publisher>();
    status(publisher.init(node_ref(node), topic_name, &options))
}

/// Publish `len` serialized bytes.
///
/// # Safety
/// - `publisher` must be a publisher handle.
/// - `data` must point to `len` readable bytes (may be NULL when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclb_publish(
    publisher: *const RclbPublisher,
    data: *const u8,
    len: usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), publisher);
    if len > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), data);
    }

    let publisher = &*publisher.cast::<Publisher>();
    status(publisher.publish(payload_arg(data, len)))
}

/// Number of subscriptions currently matched on the topic.
///
/// # Safety
/// - `publisher` must be a publisher handle.
/// - `out_count` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_get_subscription_count(
    publisher: *const RclbPublisher,
    out_count: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), publisher, out_count);

    match (*publisher.cast::<Publisher>()).subscription_count() {
        Ok(count) => {
            *out_count = count;
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// # Safety
/// - `publisher` must be a publisher handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_is_valid(publisher: *const RclbPublisher) -> bool {
    !publisher.is_null() && (*publisher.cast::<Publisher>()).is_valid()
}

/// Unregister a publisher. The handle stays allocated until
/// `rclb_free_publisher`.
///
/// # Safety
/// - `publisher` must be a publisher handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_PUBLISHER_INVALID` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_publisher_fini(publisher: *mut RclbPublisher) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), publisher);

    status((*publisher.cast::<Publisher>()).fini())
}

/// Release a publisher, unregistering it first if needed.
///
/// # Safety
/// - `publisher` must come from `rclb_get_zero_initialized_publisher`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_publisher(publisher: *mut RclbPublisher) {
    drop_handle::<Publisher, _>(publisher);
}

// =========================================================================
// Subscription
// =========================================================================

/// Allocate subscription options carrying a copy of `qos` (NULL selects the
/// default profile).
///
/// # Safety
/// - `qos` must be a valid profile pointer or NULL.
/// - The returned record must be released with `rclb_subscription_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_subscription_create_options(
    qos: *const QosProfile,
) -> *mut RclbSubscriptionOptions {
    into_handle(SubscriptionOptions::with_qos(qos_or(
        qos,
        QosProfile::DEFAULT,
    )))
}

/// # Safety
/// - `options` must come from `rclb_subscription_create_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_subscription_dispose_options(
    options: *mut RclbSubscriptionOptions,
) {
    drop_handle::<SubscriptionOptions, _>(options);
}

/// Allocate a zero-initialized subscription.
///
/// # Safety
/// The returned handle must be released with `rclb_free_subscription`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_subscription() -> *mut RclbSubscription {
    into_handle(Subscription::zero_initialized())
}

/// Create the subscription on `topic_name`, expanded against the node.
///
/// # Safety
/// - `subscription` must be a handle from `rclb_get_zero_initialized_subscription`.
/// - `node` must be a node handle.
/// - `topic_name` must be a valid NUL-terminated string.
/// - `options` may be NULL for defaults.
#[no_mangle]
pub unsafe extern "C" fn rclb_subscription_init(
    subscription: *mut RclbSubscription,
    node: *const RclbNode,
    topic_name: *const c_char,
    options: *const RclbSubscriptionOptions,
) -> i32 {
    check_not_null!(
        RetCode::InvalidArgument.as_raw(),
        subscription,
        node,
        topic_name
    );
    let topic_name = c_str_arg!(topic_name);
    let options = match options.cast::<SubscriptionOptions>().as_ref() {
        Some(options) => *options,
        None => SubscriptionOptions::default(),
    };

    let subscription = &mut *subscription.cast::<Subscription>();
    status(subscription.init(node_ref(node), topic_name, &options))
}

/// Take the oldest queued message into `buffer`.
///
/// `out_len` receives the message length on success. When the buffer is too
/// small the call returns `RCL_RET_INVALID_ARGUMENT`, the message stays
/// queued and `out_len` receives the size needed. An empty queue returns
/// `RCL_RET_SUBSCRIPTION_TAKE_FAILED` with `out_len` set to 0.
///
/// # Safety
/// - `subscription` must be a subscription handle.
/// - `buffer` must point to `capacity` writable bytes (may be NULL when `capacity` is 0).
/// - `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_take(
    subscription: *mut RclbSubscription,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), subscription, out_len);
    if capacity > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), buffer);
    }

    let subscription = &mut *subscription.cast::<Subscription>();
    match subscription.take_into(buffer_arg(buffer, capacity)) {
        Ok(len) => {
            *out_len = len;
            RetCode::Ok.as_raw()
        }
        Err(err) => {
            *out_len = subscription.next_message_len().unwrap_or(0);
            err.code().as_raw()
        }
    }
}

/// # Safety
/// - `subscription` must be a subscription handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_subscription_is_valid(subscription: *const RclbSubscription) -> bool {
    !subscription.is_null() && (*subscription.cast::<Subscription>()).is_valid()
}

/// Unregister a subscription and drop its queue. The handle stays allocated until
/// `rclb_free_subscription`.
///
/// # Safety
/// - `subscription` must be a subscription handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_SUBSCRIPTION_INVALID` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_subscription_fini(subscription: *mut RclbSubscription) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), subscription);

    status((*subscription.cast::<Subscription>()).fini())
}

/// Release a subscription, unregistering it first if needed.
///
/// # Safety
/// - `subscription` must come from `rclb_get_zero_initialized_subscription`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_subscription(subscription: *mut RclbSubscription) {
    drop_handle::<Subscription, _>(subscription);
}

/// Borrow the Rust subscription behind a handle.
pub(crate) unsafe fn subscription_ref<'a>(
    subscription: *const RclbSubscription,
) -> &'a Subscription {
    &*subscription.cast::<Subscription>()
}

