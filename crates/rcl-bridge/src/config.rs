// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment variable configuration.
//!
//! - `RCLB_DOMAIN_ID`: domain used by default init options (falls back to
//!   `ROS_DOMAIN_ID`, then 0)
//! - `RCLB_LOG_LEVEL`: default log filter when `RUST_LOG` is unset
//!   (default: "info")
//! - `RCLB_DEFAULT_DEPTH`: queue depth used for SYSTEM_DEFAULT history
//!   (default: 10)
//!
//! # Example
//!
//! ```bash
//! export ROS_DOMAIN_ID=7
//! export RCLB_LOG_LEVEL=debug
//! ```

use std::env;

pub const ENV_DOMAIN_ID: &str = "RCLB_DOMAIN_ID";
pub const ENV_LOG_LEVEL: &str = "RCLB_LOG_LEVEL";
pub const ENV_DEFAULT_DEPTH: &str = "RCLB_DEFAULT_DEPTH";

/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

/// Depth substituted for SYSTEM_DEFAULT history when nothing is configured.
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// Runtime configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Domain ID applied to default init options
    pub domain_id: u32,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Queue depth for SYSTEM_DEFAULT history
    pub default_depth: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            log_level: "info".to_string(),
            default_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl EnvConfig {
    /// Load configuration from environment variables
    ///
    /// Priority for domain ID:
    /// 1. RCLB_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. Default (0)
    #[must_use]
    pub fn from_env() -> Self {
        let domain_id = env::var(ENV_DOMAIN_ID)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .or_else(|| {
                env::var(ENV_ROS_DOMAIN_ID)
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .unwrap_or(0);

        let log_level = env::var(ENV_LOG_LEVEL)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info".to_string());

        let default_depth = env::var(ENV_DEFAULT_DEPTH)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&depth| depth > 0)
            .unwrap_or(DEFAULT_QUEUE_DEPTH);

        Self {
            domain_id,
            log_level,
            default_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.domain_id, 0);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_depth, DEFAULT_QUEUE_DEPTH);
    }

    // Every env-mutating assertion lives in this one test so parallel tests
    // never observe each other's variables.
    #[test]
    fn test_from_env_priorities() {
        let prev_rclb = env::var(ENV_DOMAIN_ID).ok();
        let prev_ros = env::var(ENV_ROS_DOMAIN_ID).ok();
        let prev_depth = env::var(ENV_DEFAULT_DEPTH).ok();

        env::set_var(ENV_DOMAIN_ID, "42");
        env::set_var(ENV_ROS_DOMAIN_ID, "99");
        assert_eq!(EnvConfig::from_env().domain_id, 42);

        env::remove_var(ENV_DOMAIN_ID);
        assert_eq!(EnvConfig::from_env().domain_id, 99);

        env::set_var(ENV_DEFAULT_DEPTH, "0");
        assert_eq!(EnvConfig::from_env().default_depth, DEFAULT_QUEUE_DEPTH);
        env::set_var(ENV_DEFAULT_DEPTH, "25");
        assert_eq!(EnvConfig::from_env().default_depth, 25);

        // Restore
        match prev_rclb {
            Some(v) => env::set_var(ENV_DOMAIN_ID, v),
            None => env::remove_var(ENV_DOMAIN_ID),
        }
        match prev_ros {
            Some(v) => env::set_var(ENV_ROS_DOMAIN_ID, v),
            None => env::remove_var(ENV_ROS_DOMAIN_ID),
        }
        match prev_depth {
            Some(v) => env::set_var(ENV_DEFAULT_DEPTH, v),
            None => env::remove_var(ENV_DEFAULT_DEPTH),
        }
    }
}
