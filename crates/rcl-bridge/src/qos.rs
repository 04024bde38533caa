// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profiles: presets, in-place mutation and creation-time validation.
//!
//! Policy fields are stored as raw integers so that whatever the caller
//! writes reaches the middleware untouched. Range checking happens in
//! [`QosProfile::validate`], which entity init calls run, never in the
//! setters.

use crate::ret::{Error, Result, RetCode};

/// Raw policy value, as carried in the C layout.
pub type PolicyValue = i32;

/// History policy kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPolicy {
    SystemDefault = 0,
    KeepLast = 1,
    KeepAll = 2,
    Unknown = 3,
}

/// Reliability policy kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityPolicy {
    SystemDefault = 0,
    Reliable = 1,
    BestEffort = 2,
    Unknown = 3,
}

/// Durability policy kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityPolicy {
    SystemDefault = 0,
    TransientLocal = 1,
    Volatile = 2,
    Unknown = 3,
}

/// Liveliness policy kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivelinessPolicy {
    SystemDefault = 0,
    Automatic = 1,
    ManualByTopic = 3,
    Unknown = 4,
}

impl HistoryPolicy {
    #[must_use]
    pub fn from_raw(raw: PolicyValue) -> Option<Self> {
        match raw {
            0 => Some(Self::SystemDefault),
            1 => Some(Self::KeepLast),
            2 => Some(Self::KeepAll),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl ReliabilityPolicy {
    #[must_use]
    pub fn from_raw(raw: PolicyValue) -> Option<Self> {
        match raw {
            0 => Some(Self::SystemDefault),
            1 => Some(Self::Reliable),
            2 => Some(Self::BestEffort),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl DurabilityPolicy {
    #[must_use]
    pub fn from_raw(raw: PolicyValue) -> Option<Self> {
        match raw {
            0 => Some(Self::SystemDefault),
            1 => Some(Self::TransientLocal),
            2 => Some(Self::Volatile),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl LivelinessPolicy {
    #[must_use]
    pub fn from_raw(raw: PolicyValue) -> Option<Self> {
        match raw {
            0 => Some(Self::SystemDefault),
            1 => Some(Self::Automatic),
            3 => Some(Self::ManualByTopic),
            4 => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Duration as carried by QoS policies. Zero means "middleware default".
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QosDuration {
    pub sec: u64,
    pub nsec: u64,
}

impl QosDuration {
    pub const DEFAULT: QosDuration = QosDuration { sec: 0, nsec: 0 };
}

/// Named preset configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosPreset {
    SensorData,
    Parameters,
    Default,
    ServicesDefault,
    ParameterEvents,
    SystemDefault,
    /// Sentinel for anything else; rejected at entity creation.
    Unknown,
}

impl QosPreset {
    /// Map a preset id from the C boundary. Ids outside `0..=5` are not an
    /// error: they select [`QosPreset::Unknown`].
    #[must_use]
    pub fn from_id(id: i32) -> Self {
        match id {
            0 => Self::SensorData,
            1 => Self::Parameters,
            2 => Self::Default,
            3 => Self::ServicesDefault,
            4 => Self::ParameterEvents,
            5 => Self::SystemDefault,
            _ => Self::Unknown,
        }
    }
}

/// QoS profile (C layout).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QosProfile {
    pub history: PolicyValue,
    pub depth: usize,
    pub reliability: PolicyValue,
    pub durability: PolicyValue,
    pub deadline: QosDuration,
    pub lifespan: QosDuration,
    pub liveliness: PolicyValue,
    pub liveliness_lease_duration: QosDuration,
    pub avoid_ros_namespace_conventions: bool,
}

impl QosProfile {
    const fn keep_last(
        depth: usize,
        reliability: ReliabilityPolicy,
        durability: DurabilityPolicy,
    ) -> Self {
        Self {
            history: HistoryPolicy::KeepLast as i32,
            depth,
            reliability: reliability as i32,
            durability: durability as i32,
            deadline: QosDuration::DEFAULT,
            lifespan: QosDuration::DEFAULT,
            liveliness: LivelinessPolicy::SystemDefault as i32,
            liveliness_lease_duration: QosDuration::DEFAULT,
            avoid_ros_namespace_conventions: false,
        }
    }

    pub const SENSOR_DATA: QosProfile =
        Self::keep_last(5, ReliabilityPolicy::BestEffort, DurabilityPolicy::Volatile);
    pub const PARAMETERS: QosProfile =
        Self::keep_last(1000, ReliabilityPolicy::Reliable, DurabilityPolicy::Volatile);
    pub const DEFAULT: QosProfile =
        Self::keep_last(10, ReliabilityPolicy::Reliable, DurabilityPolicy::Volatile);
    pub const SERVICES_DEFAULT: QosProfile =
        Self::keep_last(10, ReliabilityPolicy::Reliable, DurabilityPolicy::Volatile);
    pub const PARAMETER_EVENTS: QosProfile =
        Self::keep_last(1000, ReliabilityPolicy::Reliable, DurabilityPolicy::Volatile);

    pub const SYSTEM_DEFAULT: QosProfile = QosProfile {
        history: HistoryPolicy::SystemDefault as i32,
        depth: 0,
        reliability: ReliabilityPolicy::SystemDefault as i32,
        durability: DurabilityPolicy::SystemDefault as i32,
        deadline: QosDuration::DEFAULT,
        lifespan: QosDuration::DEFAULT,
        liveliness: LivelinessPolicy::SystemDefault as i32,
        liveliness_lease_duration: QosDuration::DEFAULT,
        avoid_ros_namespace_conventions: false,
    };

    pub const UNKNOWN: QosProfile = QosProfile {
        history: HistoryPolicy::Unknown as i32,
        depth: 0,
        reliability: ReliabilityPolicy::Unknown as i32,
        durability: DurabilityPolicy::Unknown as i32,
        deadline: QosDuration::DEFAULT,
        lifespan: QosDuration::DEFAULT,
        liveliness: LivelinessPolicy::Unknown as i32,
        liveliness_lease_duration: QosDuration::DEFAULT,
        avoid_ros_namespace_conventions: false,
    };

    /// Materialize a preset.
    #[must_use]
    pub fn preset(preset: QosPreset) -> Self {
        match preset {
            QosPreset::SensorData => Self::SENSOR_DATA,
            QosPreset::Parameters => Self::PARAMETERS,
            QosPreset::Default => Self::DEFAULT,
            QosPreset::ServicesDefault => Self::SERVICES_DEFAULT,
            QosPreset::ParameterEvents => Self::PARAMETER_EVENTS,
            QosPreset::SystemDefault => Self::SYSTEM_DEFAULT,
            QosPreset::Unknown => Self::UNKNOWN,
        }
    }

    /// Materialize a preset from its integer id.
    #[must_use]
    pub fn from_preset_id(id: i32) -> Self {
        Self::preset(QosPreset::from_id(id))
    }

    /// Assign history kind and depth verbatim.
    ///
    /// `depth` goes through the same signed-to-size conversion a C caller
    /// would apply, so negative values wrap.
    pub fn set_history(&mut self, mode: PolicyValue, depth: i32) {
        self.history = mode;
        self.depth = depth as usize;
    }

    pub fn set_reliability(&mut self, mode: PolicyValue) {
        self.reliability = mode;
    }

    pub fn set_durability(&mut self, mode: PolicyValue) {
        self.durability = mode;
    }

    /// Whether this is the unknown sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Reject values the middleware cannot honour. Called at entity creation.
    pub fn validate(&self) -> Result<()> {
        match HistoryPolicy::from_raw(self.history) {
            Some(HistoryPolicy::Unknown) | None => {
                return Err(Error::new(
                    RetCode::InvalidArgument,
                    format!("invalid qos history policy: {}", self.history),
                ));
            }
            Some(_) => {}
        }
        match ReliabilityPolicy::from_raw(self.reliability) {
            Some(ReliabilityPolicy::Unknown) | None => {
                return Err(Error::new(
                    RetCode::InvalidArgument,
                    format!("invalid qos reliability policy: {}", self.reliability),
                ));
            }
            Some(_) => {}
        }
        match DurabilityPolicy::from_raw(self.durability) {
            Some(DurabilityPolicy::Unknown) | None => {
                return Err(Error::new(
                    RetCode::InvalidArgument,
                    format!("invalid qos durability policy: {}", self.durability),
                ));
            }
            Some(_) => {}
        }
        match LivelinessPolicy::from_raw(self.liveliness) {
            Some(LivelinessPolicy::Unknown) | None => Err(Error::new(
                RetCode::InvalidArgument,
                format!("invalid qos liveliness policy: {}", self.liveliness),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Effective queue bound, or `None` for unbounded (KEEP_ALL).
    ///
    /// SYSTEM_DEFAULT history uses `default_depth`; KEEP_LAST 0 keeps one sample.
    #[must_use]
    pub(crate) fn queue_bound(&self, default_depth: usize) -> Option<usize> {
        match HistoryPolicy::from_raw(self.history) {
            Some(HistoryPolicy::KeepAll) => None,
            Some(HistoryPolicy::SystemDefault) => Some(default_depth.max(1)),
            _ => Some(self.depth.max(1)),
        }
    }

    pub(crate) fn is_transient_local(&self) -> bool {
        DurabilityPolicy::from_raw(self.durability) == Some(DurabilityPolicy::TransientLocal)
    }

    pub(crate) fn is_best_effort(&self) -> bool {
        ReliabilityPolicy::from_raw(self.reliability) == Some(ReliabilityPolicy::BestEffort)
    }

    pub(crate) fn is_reliable(&self) -> bool {
        ReliabilityPolicy::from_raw(self.reliability) == Some(ReliabilityPolicy::Reliable)
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}
