// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-local "last error" state.
//!
//! Every failing operation records a description here. The buffer is
//! overwritten by the next failure on the same thread, so readers must take a
//! copy with [`error_string`] right after the failing call.

use std::cell::RefCell;
use std::panic::Location;

/// Returned by [`error_string`] when nothing has failed on this thread.
pub const ERROR_NOT_SET: &str = "error not set";

struct ErrorState {
    message: String,
    file: &'static str,
    line: u32,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<ErrorState>> = const { RefCell::new(None) };
}

/// Record `message` as this thread's last error, tagged with the caller's
/// source location.
#[track_caller]
pub fn set_error(message: &str) {
    let location = Location::caller();
    LAST_ERROR.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(previous) = slot.as_ref() {
            log::trace!(
                "[error_state] overwriting unread error '{}' with '{}'",
                previous.message,
                message
            );
        }
        *slot = Some(ErrorState {
            message: message.to_string(),
            file: location.file(),
            line: location.line(),
        });
    });
}

/// Whether an error is currently recorded on this thread.
#[must_use]
pub fn is_error_set() -> bool {
    LAST_ERROR.with(|slot| slot.borrow().is_some())
}

/// Independent copy of this thread's last error.
#[must_use]
pub fn error_string() -> String {
    LAST_ERROR.with(|slot| match slot.borrow().as_ref() {
        Some(state) => format!("{}, at {}:{}", state.message, state.file, state.line),
        None => ERROR_NOT_SET.to_string(),
    })
}

/// Forget this thread's last error.
pub fn reset_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_reports_placeholder() {
        reset_error();
        assert_eq!(error_string(), ERROR_NOT_SET);
        assert!(!is_error_set());
    }

    #[test]
    fn snapshot_survives_overwrite() {
        reset_error();
        set_error("first failure");
        let first = error_string();
        set_error("second failure");
        let second = error_string();

        assert!(first.starts_with("first failure, at "));
        assert!(second.starts_with("second failure, at "));
        assert_ne!(first, second);
        reset_error();
    }

    #[test]
    fn state_is_per_thread() {
        reset_error();
        set_error("main thread");
        let other = std::thread::spawn(error_string)
            .join()
            .expect("thread should not panic");
        assert_eq!(other, ERROR_NOT_SET);
        assert!(is_error_set());
        reset_error();
    }
}
