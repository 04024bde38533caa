// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of an initialized entity.
///
/// Wait-set lookups report members by id; compare against
/// `Subscription::id()` and friends to find the ready entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity kinds a wait-set can hold.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitableKind {
    Subscription = 0,
    GuardCondition = 1,
    Client = 2,
    Service = 3,
}

impl WaitableKind {
    pub const ALL: [WaitableKind; 4] = [
        WaitableKind::Subscription,
        WaitableKind::GuardCondition,
        WaitableKind::Client,
        WaitableKind::Service,
    ];

    /// Map a raw kind from a foreign caller; `None` outside `0..=3`.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Subscription),
            1 => Some(Self::GuardCondition),
            2 => Some(Self::Client),
            3 => Some(Self::Service),
            _ => None,
        }
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WaitableKind::Subscription => "subscription",
            WaitableKind::GuardCondition => "guard condition",
            WaitableKind::Client => "client",
            WaitableKind::Service => "service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_nonzero() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert_ne!(a, b);
        assert_ne!(a.as_raw(), 0);
    }

    #[test]
    fn kind_slots_cover_all() {
        let slots: Vec<usize> = WaitableKind::ALL.iter().map(|k| k.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn raw_kinds_map_back_or_reject() {
        for kind in WaitableKind::ALL {
            assert_eq!(WaitableKind::from_raw(kind as i32), Some(kind));
        }
        assert_eq!(WaitableKind::from_raw(4), None);
        assert_eq!(WaitableKind::from_raw(-1), None);
    }
}
