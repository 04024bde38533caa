// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rcl-bridge
//!
//! Handle lifecycle and readiness multiplexing over an rcl-style pub/sub
//! client library.
//!
//! Every entity (context, node, publisher, subscription, service, client,
//! guard condition, wait-set) follows the same protocol: start
//! zero-initialized, `init` once, query `is_valid` at any time, and release
//! on `fini` or drop. Failing operations return [`Error`] carrying an
//! rcl-numbered [`RetCode`] and record a thread-local message readable
//! through [`error_state::error_string`].
//!
//! The wrapped middleware is the in-process `rclbridge_intra`
//! implementation: a per-domain topic and service bus moving opaque
//! serialized payloads between endpoints of the same process.
//!
//! ```
//! use rcl_bridge::{
//!     get_guard_condition, Allocator, Context, InitOptions, WaitSet, WaitSetSizes,
//! };
//!
//! let context = Context::new(&InitOptions::default())?;
//! let guard = get_guard_condition(&context)?;
//! let mut wait_set = WaitSet::new(
//!     &context,
//!     WaitSetSizes { guard_conditions: 1, ..WaitSetSizes::default() },
//!     &Allocator::system(),
//! )?;
//! wait_set.add_guard_condition(&guard)?;
//! guard.trigger()?;
//! assert_eq!(wait_set.wait(None)?, 1);
//! assert_eq!(wait_set.get_guard_condition(0), (guard.id(), true));
//! # Ok::<(), rcl_bridge::Error>(())
//! ```

pub mod allocator;
mod bus;
pub mod client;
pub mod clock;
pub mod condition;
pub mod config;
pub mod context;
pub mod entity;
pub mod error_state;
pub mod guard_condition;
pub mod names;
pub mod node;
pub mod publisher;
pub mod qos;
pub mod ret;
pub mod service;
pub mod subscription;
pub mod waitset;

pub use allocator::Allocator;
pub use client::{Client, ClientOptions};
pub use clock::{Clock, ClockType, TimePointValue};
pub use config::EnvConfig;
pub use context::{Context, InitOptions};
pub use entity::{EntityId, WaitableKind};
pub use guard_condition::{get_guard_condition, GuardCondition, GuardConditionOptions};
pub use node::{Node, NodeOptions};
pub use publisher::{Publisher, PublisherOptions};
pub use qos::{
    DurabilityPolicy, HistoryPolicy, LivelinessPolicy, QosDuration, QosPreset, QosProfile,
    ReliabilityPolicy,
};
pub use ret::{Error, Result, RetCode};
pub use service::{RequestId, Service, ServiceOptions};
pub use subscription::{Subscription, SubscriptionOptions};
pub use waitset::{WaitSet, WaitSetSizes, WaitSetState};

/// Name of the wrapped middleware implementation.
pub const IMPLEMENTATION_IDENTIFIER: &str = "rclbridge_intra";
