// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Clocks: ROS time (with override), system time and steady time.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::allocator::Allocator;
use crate::ret::{Error, Result, RetCode};

/// Time point in nanoseconds.
pub type TimePointValue = i64;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockType {
    Uninitialized = 0,
    RosTime = 1,
    SystemTime = 2,
    SteadyTime = 3,
}

impl ClockType {
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::RosTime),
            2 => Some(Self::SystemTime),
            3 => Some(Self::SteadyTime),
            _ => None,
        }
    }
}

fn system_now() -> TimePointValue {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_nanos()).unwrap_or(i64::MAX),
    }
}

fn steady_now() -> TimePointValue {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    let anchor = ANCHOR.get_or_init(Instant::now);
    i64::try_from(anchor.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy, Default)]
struct RosOverride {
    enabled: bool,
    time: TimePointValue,
}

#[derive(Debug)]
pub struct Clock {
    clock_type: ClockType,
    allocator: Allocator,
    ros_override: RosOverride,
}

impl Clock {
    /// Create an initialized clock. An invalid allocator or the
    /// uninitialized type fail with `InvalidArgument` and nothing is created.
    pub fn new(clock_type: ClockType, allocator: &Allocator) -> Result<Self> {
        if clock_type == ClockType::Uninitialized {
            return Err(Error::new(
                RetCode::InvalidArgument,
                "clock type must not be uninitialized",
            ));
        }
        if !allocator.is_valid() {
            return Err(Error::new(RetCode::InvalidArgument, "invalid allocator"));
        }
        Ok(Self {
            clock_type,
            allocator: *allocator,
            ros_override: RosOverride::default(),
        })
    }

    /// ROS clock; without an override it follows system time.
    pub fn ros(allocator: &Allocator) -> Result<Self> {
        Self::new(ClockType::RosTime, allocator)
    }

    #[must_use]
    pub fn clock_type(&self) -> ClockType {
        self.clock_type
    }

    #[must_use]
    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Current time in nanoseconds.
    #[must_use]
    pub fn now(&self) -> TimePointValue {
        match self.clock_type {
            ClockType::RosTime if self.ros_override.enabled => self.ros_override.time,
            ClockType::RosTime | ClockType::SystemTime | ClockType::Uninitialized => system_now(),
            ClockType::SteadyTime => steady_now(),
        }
    }

    pub fn enable_ros_time_override(&mut self) -> Result<()> {
        self.require_ros("enable")?;
        self.ros_override.enabled = true;
        Ok(())
    }

    pub fn disable_ros_time_override(&mut self) -> Result<()> {
        self.require_ros("disable")?;
        self.ros_override.enabled = false;
        Ok(())
    }

    pub fn set_ros_time_override(&mut self, time: TimePointValue) -> Result<()> {
        self.require_ros("set")?;
        self.ros_override.time = time;
        Ok(())
    }

    pub fn is_ros_time_override_enabled(&self) -> Result<bool> {
        self.require_ros("query")?;
        Ok(self.ros_override.enabled)
    }

    fn require_ros(&self, action: &str) -> Result<()> {
        if self.clock_type == ClockType::RosTime {
            Ok(())
        } else {
            Err(Error::new(
                RetCode::Error,
                format!("cannot {action} time override on a {:?} clock", self.clock_type),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_allocator_fails() {
        let err = Clock::ros(&Allocator::zeroed()).expect_err("bad allocator");
        assert_eq!(err.code(), RetCode::InvalidArgument);
    }

    #[test]
    fn uninitialized_type_fails() {
        let err = Clock::new(ClockType::Uninitialized, &Allocator::system()).expect_err("type");
        assert_eq!(err.code(), RetCode::InvalidArgument);
    }

    #[test]
    fn steady_is_monotonic() {
        let clock = Clock::new(ClockType::SteadyTime, &Allocator::system()).expect("clock");
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn ros_override() {
        let mut clock = Clock::ros(&Allocator::system()).expect("clock");
        assert!(clock.now() > 0);
        assert!(!clock.is_ros_time_override_enabled().expect("query"));

        clock.set_ros_time_override(1_234).expect("set");
        clock.enable_ros_time_override().expect("enable");
        assert_eq!(clock.now(), 1_234);

        clock.disable_ros_time_override().expect("disable");
        assert_ne!(clock.now(), 1_234);
    }

    #[test]
    fn override_rejected_on_system_clock() {
        let mut clock = Clock::new(ClockType::SystemTime, &Allocator::system()).expect("clock");
        assert_eq!(
            clock.enable_ros_time_override().expect_err("system").code(),
            RetCode::Error
        );
    }
}
