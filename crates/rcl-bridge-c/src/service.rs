// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service and client handles.

use std::os::raw::c_char;

use rcl_bridge::{
    Client, ClientOptions, QosProfile, RequestId, RetCode, Service, ServiceOptions,
};

use crate::node::{node_ref, RclbNode};
use crate::qos::qos_or;
use crate::{buffer_arg, drop_handle, into_handle, payload_arg, status};

/// Opaque handle to a service server.
#[repr(C)]
pub struct RclbService {
    _private: [u8; 0],
}

/// Opaque handle to a service options record.
#[repr(C)]
pub struct RclbServiceOptions {
    _private: [u8; 0],
}

/// Opaque handle to a service client.
#[repr(C)]
pub struct RclbClient {
    _private: [u8; 0],
}

/// Opaque handle to a client options record.
#[repr(C)]
pub struct RclbClientOptions {
    _private: [u8; 0],
}

/// Write the outcome of a `*_take_*_into` call to the caller's out
/// parameters. On failure `out_len` receives the pending payload size (0 when
/// nothing is queued).
unsafe fn report_take(
    result: rcl_bridge::Result<(RequestId, usize)>,
    pending: Option<usize>,
    out_id: *mut RequestId,
    out_len: *mut usize,
) -> i32 {
    match result {
        Ok((id, len)) => {
            *out_id = id;
            *out_len = len;
            RetCode::Ok.as_raw()
        }
        Err(err) => {
            *out_len = pending.unwrap_or(0);
            err.code().as_raw()
        }
    }
}

// =========================================================================
// Service
// =========================================================================

/// Allocate service options carrying a copy of `qos` (NULL selects the
/// services-default profile).
///
/// # Safety
/// - `qos` must be a valid profile pointer or NULL.
/// - The returned record must be released with `rclb_service_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_create_options(
    qos: *const QosProfile,
) -> *mut RclbServiceOptions {
    into_handle(ServiceOptions::with_qos(qos_or(
        qos,
        QosProfile::SERVICES_DEFAULT,
    )))
}

/// # Safety
/// - `options` must come from `rclb_service_create_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_dispose_options(options: *mut RclbServiceOptions) {
    drop_handle::<ServiceOptions, _>(options);
}

/// Allocate a zero-initialized service.
///
/// # Safety
/// The returned handle must be released with `rclb_free_service`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_service() -> *mut RclbService {
    into_handle(Service::zero_initialized())
}

/// Register the server for `service_name`.
///
/// # Safety
/// - `service` must be a handle from `rclb_get_zero_initialized_service`.
/// - `node` must be a node handle.
/// - `service_name` must be a valid NUL-terminated string.
/// - `options` may be NULL for defaults.
///
/// # Returns
/// `RCL_RET_ERROR` when another live server already owns the name.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_init(
    service: *mut RclbService,
    node: *const RclbNode,
    service_name: *const c_char,
    options: *const RclbServiceOptions,
) -> i32 {
    check_not_null!(
        RetCode::InvalidArgument.as_raw(),
        service,
        node,
        service_name
    );
    let service_name = c_str_arg!(service_name);
    let options = match options.cast::<ServiceOptions>().as_ref() {
        Some(options) => *options,
        None => ServiceOptions::default(),
    };

    let service = &mut *service.cast::<Service>();
    status(service.init(node_ref(node), service_name, &options))
}

/// Take the oldest pending request into `buffer`; buffer sizing follows
/// `rclb_take`.
///
/// # Safety
/// - `service` must be a service handle.
/// - `out_id` and `out_len` must be valid pointers.
/// - `buffer` must point to `capacity` writable bytes (may be NULL when `capacity` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclb_take_request(
    service: *mut RclbService,
    out_id: *mut RequestId,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), service, out_id, out_len);
    if capacity > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), buffer);
    }

    let service = &mut *service.cast::<Service>();
    let result = service.take_request_into(buffer_arg(buffer, capacity));
    report_take(result, service.next_request_len(), out_id, out_len)
}

/// Answer the request identified by `request_id`.
///
/// # Safety
/// - `service` must be a service handle.
/// - `request_id` must be a valid pointer.
/// - `data` must point to `len` readable bytes (may be NULL when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclb_send_response(
    service: *const RclbService,
    request_id: *const RequestId,
    data: *const u8,
    len: usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), service, request_id);
    if len > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), data);
    }

    let service = &*service.cast::<Service>();
    status(service.send_response(*request_id, payload_arg(data, len)))
}

/// # Safety
/// - `service` must be a service handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_is_valid(service: *const RclbService) -> bool {
    !service.is_null() && (*service.cast::<Service>()).is_valid()
}

/// Unregister a service and drop pending requests. The handle stays allocated until
/// `rclb_free_service`.
///
/// # Safety
/// - `service` must be a service handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_SERVICE_INVALID` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_fini(service: *mut RclbService) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), service);

    status((*service.cast::<Service>()).fini())
}

/// Release a service, unregistering it first if needed.
///
/// # Safety
/// - `service` must come from `rclb_get_zero_initialized_service`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_service(service: *mut RclbService) {
    drop_handle::<Service, _>(service);
}

// =========================================================================
// Client
// =========================================================================

/// Allocate client options carrying a copy of `qos` (NULL selects the
/// services-default profile).
///
/// # Safety
/// - `qos` must be a valid profile pointer or NULL.
/// - The returned record must be released with `rclb_client_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_client_create_options(
    qos: *const QosProfile,
) -> *mut RclbClientOptions {
    into_handle(ClientOptions::with_qos(qos_or(
        qos,
        QosProfile::SERVICES_DEFAULT,
    )))
}

/// # Safety
/// - `options` must come from `rclb_client_create_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_client_dispose_options(options: *mut RclbClientOptions) {
    drop_handle::<ClientOptions, _>(options);
}

/// Allocate a zero-initialized client.
///
/// # Safety
/// The returned handle must be released with `rclb_free_client`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_client() -> *mut RclbClient {
    into_handle(Client::zero_initialized())
}

/// Create a client for `service_name`.
///
/// # Safety
/// - `client` must be a handle from `rclb_get_zero_initialized_client`.
/// - `node` must be a node handle.
/// - `service_name` must be a valid NUL-terminated string.
/// - `options` may be NULL for defaults.
#[no_mangle]
pub unsafe extern "C" fn rclb_client_init(
    client: *mut RclbClient,
    node: *const RclbNode,
    service_name: *const c_char,
    options: *const RclbClientOptions,
) -> i32 {
    check_not_null!(
        RetCode::InvalidArgument.as_raw(),
        client,
        node,
        service_name
    );
    let service_name = c_str_arg!(service_name);
    let options = match options.cast::<ClientOptions>().as_ref() {
        Some(options) => *options,
        None => ClientOptions::default(),
    };

    let client = &mut *client.cast::<Client>();
    status(client.init(node_ref(node), service_name, &options))
}

/// Send a request; `out_sequence` receives its sequence number.
///
/// # Safety
/// - `client` must be a client handle.
/// - `data` must point to `len` readable bytes (may be NULL when `len` is 0).
/// - `out_sequence` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_send_request(
    client: *mut RclbClient,
    data: *const u8,
    len: usize,
    out_sequence: *mut i64,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), client, out_sequence);
    if len > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), data);
    }

    let client = &mut *client.cast::<Client>();
    match client.send_request(payload_arg(data, len)) {
        Ok(sequence_number) => {
            *out_sequence = sequence_number;
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// Take the oldest response into `buffer`; buffer sizing follows
/// `rclb_take`.
///
/// # Safety
/// - `client` must be a client handle.
/// - `out_id` and `out_len` must be valid pointers.
/// - `buffer` must point to `capacity` writable bytes (may be NULL when `capacity` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclb_take_response(
    client: *mut RclbClient,
    out_id: *mut RequestId,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), client, out_id, out_len);
    if capacity > 0 {
        check_not_null!(RetCode::InvalidArgument.as_raw(), buffer);
    }

    let client = &mut *client.cast::<Client>();
    let result = client.take_response_into(buffer_arg(buffer, capacity));
    report_take(result, client.next_response_len(), out_id, out_len)
}

/// Whether a live server exists for the client's service.
///
/// # Safety
/// - `client` must be a client handle.
/// - `out_available` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_service_server_is_available(
    client: *const RclbClient,
    out_available: *mut bool,
) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), client, out_available);

    match (*client.cast::<Client>()).server_is_available() {
        Ok(available) => {
            *out_available = available;
            RetCode::Ok.as_raw()
        }
        Err(err) => err.code().as_raw(),
    }
}

/// # Safety
/// - `client` must be a client handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_client_is_valid(client: *const RclbClient) -> bool {
    !client.is_null() && (*client.cast::<Client>()).is_valid()
}

/// Unregister a client and drop pending responses. The handle stays allocated until
/// `rclb_free_client`.
///
/// # Safety
/// - `client` must be a client handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_CLIENT_INVALID` when it is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_client_fini(client: *mut RclbClient) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), client);

    status((*client.cast::<Client>()).fini())
}

/// Release a client, unregistering it first if needed.
///
/// # Safety
/// - `client` must come from `rclb_get_zero_initialized_client`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_client(client: *mut RclbClient) {
    drop_handle::<Client, _>(client);
}

pub(crate) unsafe fn service_ref<'a>(service: *const RclbService) -> &'a Service {
    &*service.cast::<Service>()
}

pub(crate) unsafe fn client_ref<'a>(client: *const RclbClient) -> &'a Client {
    &*client.cast::<Client>()
}
