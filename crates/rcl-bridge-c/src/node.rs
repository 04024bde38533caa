// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node handles and node options.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use rcl_bridge::{Node, NodeOptions, RetCode};

use crate::context::{context_ref, RclbContext};
use crate::{drop_handle, into_handle, status};

/// Opaque handle to a node.
#[repr(C)]
pub struct RclbNode {
    _private: [u8; 0],
}

/// Opaque handle to a node options record.
#[repr(C)]
pub struct RclbNodeOptions {
    _private: [u8; 0],
}

/// Node plus NUL-terminated copies of its names, so the getters can hand
/// out pointers that live as long as the handle.
#[derive(Default)]
pub(crate) struct ForeignNode {
    pub(crate) node: Node,
    names: Option<[CString; 3]>,
}

impl ForeignNode {
    fn cache_names(&mut self) {
        let names = (
            self.node.name(),
            self.node.namespace(),
            self.node.fully_qualified_name(),
        );
        self.names = match names {
            (Some(name), Some(namespace), Some(fqn)) => {
                match (CString::new(name), CString::new(namespace), CString::new(fqn)) {
                    (Ok(name), Ok(namespace), Ok(fqn)) => Some([name, namespace, fqn]),
                    _ => None,
                }
            }
            _ => None,
        };
    }

    fn name_ptr(&self, which: usize) -> *const c_char {
        if !self.node.is_valid() {
            return ptr::null();
        }
        match &self.names {
            Some(names) => names[which].as_ptr(),
            None => ptr::null(),
        }
    }
}

/// Allocate a node options record with defaults (system allocator, context
/// domain, global arguments and rosout enabled).
///
/// # Safety
/// The returned record must be released with `rclb_node_dispose_options`.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_create_default_options() -> *mut RclbNodeOptions {
    into_handle(NodeOptions::default())
}

/// # Safety
/// - `options` must come from `rclb_node_create_default_options`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_dispose_options(options: *mut RclbNodeOptions) {
    drop_handle::<NodeOptions, _>(options);
}

/// Allocate a zero-initialized node.
///
/// # Safety
/// The returned handle must be released with `rclb_free_node`.
#[no_mangle]
pub unsafe extern "C" fn rclb_get_zero_initialized_node() -> *mut RclbNode {
    into_handle(ForeignNode::default())
}

/// Initialize a node.
///
/// # Safety
/// - `node` must be a handle from `rclb_get_zero_initialized_node`.
/// - `name` and `namespace` must be valid NUL-terminated strings.
/// - `context` must be a context handle.
/// - `options` may be NULL for defaults.
///
/// # Returns
/// `RCL_RET_OK`, `RCL_RET_ALREADY_INIT`, `RCL_RET_NOT_INIT`,
/// `RCL_RET_INVALID_ARGUMENT`, `RCL_RET_NODE_INVALID_NAME` or
/// `RCL_RET_NODE_INVALID_NAMESPACE`.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_init(
    node: *mut RclbNode,
    name: *const c_char,
    namespace: *const c_char,
    context: *const RclbContext,
    options: *const RclbNodeOptions,
) -> i32 {
    check_not_null!(
        RetCode::InvalidArgument.as_raw(),
        node,
        name,
        namespace,
        context
    );
    let name = c_str_arg!(name);
    let namespace = c_str_arg!(namespace);
    let options = if options.is_null() {
        NodeOptions::default()
    } else {
        *options.cast::<NodeOptions>()
    };

    let foreign = &mut *node.cast::<ForeignNode>();
    let result = foreign
        .node
        .init(name, namespace, context_ref(context), &options);
    if result.is_ok() {
        foreign.cache_names();
    }
    status(result)
}

/// Node name, or NULL when the node is not valid. Owned by the handle.
///
/// # Safety
/// - `node` must be a node handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_get_name(node: *const RclbNode) -> *const c_char {
    match node.cast::<ForeignNode>().as_ref() {
        Some(foreign) => foreign.name_ptr(0),
        None => ptr::null(),
    }
}

/// Node namespace, or NULL when the node is not valid. Owned by the handle.
///
/// # Safety
/// - `node` must be a node handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_get_namespace(node: *const RclbNode) -> *const c_char {
    match node.cast::<ForeignNode>().as_ref() {
        Some(foreign) => foreign.name_ptr(1),
        None => ptr::null(),
    }
}

/// Fully qualified node name, or NULL when the node is not valid.
///
/// # Safety
/// - `node` must be a node handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_get_fully_qualified_name(
    node: *const RclbNode,
) -> *const c_char {
    match node.cast::<ForeignNode>().as_ref() {
        Some(foreign) => foreign.name_ptr(2),
        None => ptr::null(),
    }
}

/// # Safety
/// - `node` must be a node handle, or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_is_valid(node: *const RclbNode) -> bool {
    match node.cast::<ForeignNode>().as_ref() {
        Some(foreign) => foreign.node.is_valid(),
        None => false,
    }
}

/// Finalize a node. The cached names are dropped with it; the handle stays
/// allocated until `rclb_free_node`.
///
/// # Safety
/// - `node` must be a node handle.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_NODE_INVALID` when the node is not initialized.
#[no_mangle]
pub unsafe extern "C" fn rclb_node_fini(node: *mut RclbNode) -> i32 {
    check_not_null!(RetCode::InvalidArgument.as_raw(), node);

    let foreign = &mut *node.cast::<ForeignNode>();
    let result = foreign.node.fini();
    foreign.names = None;
    status(result)
}

/// Release a node, finalizing it first if needed.
///
/// # Safety
/// - `node` must come from `rclb_get_zero_initialized_node`, or be NULL (no-op).
/// - Must not be called more than once with the same pointer.
#[no_mangle]
pub unsafe extern "C" fn rclb_free_node(node: *mut RclbNode) {
    drop_handle::<ForeignNode, _>(node);
}

/// Borrow the Rust node behind a handle.
pub(crate) unsafe fn node_ref<'a>(node: *const RclbNode) -> &'a Node {
    &(*node.cast::<ForeignNode>()).node
}
