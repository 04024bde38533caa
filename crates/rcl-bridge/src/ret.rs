// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Status codes and the error type returned by every fallible operation.
//!
//! The numeric values are the rcl return codes. Callers on the other side of
//! the C boundary compare against these integers directly, so they must never
//! be renumbered.

use std::fmt;

use thiserror::Error;

use crate::error_state;

/// Return code of a middleware operation.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetCode {
    /// Operation completed successfully
    Ok = 0,
    /// Unspecified failure
    Error = 1,
    /// Wait timed out before any entity became ready
    Timeout = 2,
    /// Operation not supported by this implementation
    Unsupported = 3,

    /// Allocation failed
    BadAlloc = 10,
    /// Invalid argument (null pointer, out of range value, bad allocator)
    InvalidArgument = 11,

    // === rcl specific (1xx) ===
    /// Entity already initialized
    AlreadyInit = 100,
    /// Entity not initialized
    NotInit = 101,
    /// Topic name failed validation
    TopicNameInvalid = 103,
    /// Service name failed validation
    ServiceNameInvalid = 104,
    /// Context already shut down
    AlreadyShutdown = 106,

    // === node (2xx) ===
    /// Node handle is invalid
    NodeInvalid = 200,
    /// Node name failed validation
    NodeInvalidName = 201,
    /// Node namespace failed validation
    NodeInvalidNamespace = 202,

    // === publisher (3xx) ===
    /// Publisher handle is invalid
    PublisherInvalid = 300,

    // === subscription (4xx) ===
    /// Subscription handle is invalid
    SubscriptionInvalid = 400,
    /// Nothing to take
    SubscriptionTakeFailed = 401,

    // === client (5xx) ===
    /// Client handle is invalid
    ClientInvalid = 500,
    /// No response to take
    ClientTakeFailed = 501,

    // === service (6xx) ===
    /// Service handle is invalid
    ServiceInvalid = 600,
    /// No request to take
    ServiceTakeFailed = 601,

    // === wait set (9xx) ===
    /// Wait set handle is invalid
    WaitSetInvalid = 900,
    /// Wait set has no members
    WaitSetEmpty = 901,
    /// Wait set slot capacity exhausted
    WaitSetFull = 902,
}

impl RetCode {
    /// Raw integer value as seen across the C boundary.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for RetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_raw())
    }
}

/// Failure of a middleware operation.
///
/// Building one through [`Error::new`] also records the message as the
/// calling thread's last error, the same way the middleware's error macros do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} [{code}]")]
pub struct Error {
    code: RetCode,
    message: String,
}

impl Error {
    /// Create an error and record it in the thread-local error state.
    #[track_caller]
    pub fn new(code: RetCode, message: impl Into<String>) -> Self {
        let message = message.into();
        error_state::set_error(&message);
        Self { code, message }
    }

    /// Create an error without touching the thread-local error state.
    ///
    /// Used for outcomes that are not failures from the caller's point of
    /// view (a timed out wait).
    pub(crate) fn quiet(code: RetCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Status code carried by this error.
    #[must_use]
    pub fn code(&self) -> RetCode {
        self.code
    }

    /// Human readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Collapse a unit result into the raw status code.
#[must_use]
pub fn to_raw(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => RetCode::Ok.as_raw(),
        Err(err) => err.code().as_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_keep_their_numbering() {
        assert_eq!(RetCode::Ok.as_raw(), 0);
        assert_eq!(RetCode::Timeout.as_raw(), 2);
        assert_eq!(RetCode::InvalidArgument.as_raw(), 11);
        assert_eq!(RetCode::AlreadyShutdown.as_raw(), 106);
        assert_eq!(RetCode::NodeInvalidName.as_raw(), 201);
        assert_eq!(RetCode::SubscriptionTakeFailed.as_raw(), 401);
        assert_eq!(RetCode::WaitSetFull.as_raw(), 902);
    }

    #[test]
    fn new_records_last_error() {
        error_state::reset_error();
        let err = Error::new(RetCode::InvalidArgument, "bad thing");
        assert_eq!(err.code(), RetCode::InvalidArgument);
        assert!(error_state::is_error_set());
        assert!(error_state::error_string().starts_with("bad thing"));
        error_state::reset_error();
    }

    #[test]
    fn quiet_leaves_error_state_alone() {
        error_state::reset_error();
        let err = Error::quiet(RetCode::Timeout, "timed out");
        assert_eq!(to_raw(&Err(err)), 2);
        assert!(!error_state::is_error_set());
    }
}
