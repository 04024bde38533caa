// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization for the C boundary.
//!
//! The core logs through the `log` facade; these entry points install an
//! `env_logger` backend for hosts that want the output on stderr.

use std::env;
use std::ffi::CStr;
use std::os::raw::c_char;

use rcl_bridge::config::{EnvConfig, ENV_LOG_LEVEL};
use rcl_bridge::RetCode;

/// Log level for bridge logging.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RclbLogLevel {
    RclbLogOff = 0,
    RclbLogError = 1,
    RclbLogWarn = 2,
    RclbLogInfo = 3,
    RclbLogDebug = 4,
    RclbLogTrace = 5,
}

impl From<RclbLogLevel> for log::LevelFilter {
    fn from(level: RclbLogLevel) -> Self {
        match level {
            RclbLogLevel::RclbLogOff => log::LevelFilter::Off,
            RclbLogLevel::RclbLogError => log::LevelFilter::Error,
            RclbLogLevel::RclbLogWarn => log::LevelFilter::Warn,
            RclbLogLevel::RclbLogInfo => log::LevelFilter::Info,
            RclbLogLevel::RclbLogDebug => log::LevelFilter::Debug,
            RclbLogLevel::RclbLogTrace => log::LevelFilter::Trace,
        }
    }
}

fn init_result(result: Result<(), log::SetLoggerError>) -> i32 {
    match result {
        Ok(()) => RetCode::Ok.as_raw(),
        // A logger is already installed.
        Err(_) => RetCode::Error.as_raw(),
    }
}

/// Initialize logging to stderr at a fixed level.
///
/// # Safety
/// Must be called from a single thread during initialization.
///
/// # Returns
/// `RCL_RET_OK`, or `RCL_RET_ERROR` when a logger is already installed.
///
/// # Example (C)
/// ```c
/// rclb_logging_init(RCLB_LOG_LEVEL_RCLB_LOG_INFO);
/// ```
#[no_mangle]
pub unsafe extern "C" fn rclb_logging_init(level: RclbLogLevel) -> i32 {
    let filter: log::LevelFilter = level.into();

    init_result(
        env_logger::Builder::new()
            .filter_level(filter)
            .format_timestamp_millis()
            .try_init(),
    )
}

/// Initialize logging with environment overrides.
///
/// `RUST_LOG` wins when set; otherwise `RCLB_LOG_LEVEL`, otherwise
/// `default_level`.
///
/// # Safety
/// Must be called from a single thread during initialization.
#[no_mangle]
pub unsafe extern "C" fn rclb_logging_init_env(default_level: RclbLogLevel) -> i32 {
    let fallback = if env::var_os(ENV_LOG_LEVEL).is_some() {
        EnvConfig::from_env().log_level
    } else {
        log::LevelFilter::from(default_level).to_string()
    };

    init_result(
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback))
            .format_timestamp_millis()
            .try_init(),
    )
}

/// Initialize logging with an `env_logger` filter string
/// (e.g. `"rcl_bridge=debug,info"`).
///
/// # Safety
/// - `filter` must be a valid null-terminated C string or NULL.
///
/// # Returns
/// `RCL_RET_INVALID_ARGUMENT` for a NULL or non-UTF-8 filter.
#[no_mangle]
pub unsafe extern "C" fn rclb_logging_init_with_filter(filter: *const c_char) -> i32 {
    if filter.is_null() {
        return RetCode::InvalidArgument.as_raw();
    }

    let Ok(filter_str) = CStr::from_ptr(filter).to_str() else {
        return RetCode::InvalidArgument.as_raw();
    };

    init_result(
        env_logger::Builder::new()
            .parse_filters(filter_str)
            .format_timestamp_millis()
            .try_init(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_mapping() {
        assert_eq!(
            log::LevelFilter::from(RclbLogLevel::RclbLogOff),
            log::LevelFilter::Off
        );
        assert_eq!(
            log::LevelFilter::from(RclbLogLevel::RclbLogDebug),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn null_filter_rejected() {
        let rc = unsafe { rclb_logging_init_with_filter(std::ptr::null()) };
        assert_eq!(rc, RetCode::InvalidArgument.as_raw());
    }
}
