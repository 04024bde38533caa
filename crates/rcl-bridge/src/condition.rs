// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Readiness plumbing shared by every waitable entity.
//!
//! A wait-set owns one [`WaitSignal`]. While it waits, it registers the
//! signal with each member through [`Waitable::add_signal`]; members call
//! [`WaitSignal::notify`] whenever they may have become ready. Members only
//! hold a `Weak` reference, so a dropped wait-set never keeps hooks alive.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Something a wait-set can block on.
pub trait Waitable: Send + Sync {
    /// Whether the entity is ready right now.
    fn is_ready(&self) -> bool;

    /// Register a signal to be notified on readiness changes.
    fn add_signal(&self, signal: &Arc<WaitSignal>);

    /// Remove a previously registered signal.
    fn remove_signal(&self, signal_id: u64);

    /// Called on members reported ready when a wait returns.
    fn on_wait_reported(&self) {}
}

/// Wake-up primitive owned by a wait-set.
///
/// A monotonically increasing generation counter guards against lost
/// wake-ups: the waiter samples the generation before scanning members and
/// only sleeps while it is unchanged.
pub struct WaitSignal {
    id: u64,
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl WaitSignal {
    #[must_use]
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            generation: Mutex::new(0),
            condvar: Condvar::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Bump the generation and wake the waiter.
    pub fn notify(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.condvar.notify_all();
    }

    /// Block while the generation equals `seen`, up to `deadline`
    /// (`None` blocks indefinitely). Returns `false` when the deadline passed.
    pub fn wait_past(&self, seen: u64, deadline: Option<Instant>) -> bool {
        let mut generation = self.generation.lock();
        while *generation == seen {
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut generation, deadline).timed_out() {
                        return *generation != seen;
                    }
                }
                None => self.condvar.wait(&mut generation),
            }
        }
        true
    }
}

impl Default for WaitSignal {
    fn default() -> Self {
        Self::new()
    }
}

struct SignalHook {
    id: u64,
    signal: Weak<WaitSignal>,
}

/// Signal registry embedded in each waitable entity.
#[derive(Default)]
pub struct SignalHooks {
    hooks: Mutex<Vec<SignalHook>>,
}

impl SignalHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, signal: &Arc<WaitSignal>) {
        let mut hooks = self.hooks.lock();
        hooks.retain(|hook| hook.signal.strong_count() > 0 && hook.id != signal.id());
        hooks.push(SignalHook {
            id: signal.id(),
            signal: Arc::downgrade(signal),
        });
    }

    pub fn remove(&self, signal_id: u64) {
        self.hooks.lock().retain(|hook| hook.id != signal_id);
    }

    /// Wake every live registered waiter, pruning dead hooks.
    pub fn notify_all(&self) {
        self.hooks.lock().retain(|hook| {
            if let Some(signal) = hook.signal.upgrade() {
                signal.notify();
                true
            } else {
                false
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.hooks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_past_times_out_without_notify() {
        let signal = WaitSignal::new();
        let seen = signal.generation();
        let woke = signal.wait_past(seen, Some(Instant::now() + Duration::from_millis(20)));
        assert!(!woke);
    }

    #[test]
    fn notify_before_wait_is_not_lost() {
        let signal = WaitSignal::new();
        let seen = signal.generation();
        signal.notify();
        assert!(signal.wait_past(seen, None));
    }

    #[test]
    fn notify_from_other_thread_wakes_waiter() {
        let signal = Arc::new(WaitSignal::new());
        let seen = signal.generation();
        let remote = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.notify();
        });
        assert!(signal.wait_past(seen, Some(Instant::now() + Duration::from_secs(5))));
        handle.join().expect("notifier thread");
    }

    #[test]
    fn hooks_drop_dead_signals() {
        let hooks = SignalHooks::new();
        let live = Arc::new(WaitSignal::new());
        {
            let dead = Arc::new(WaitSignal::new());
            hooks.add(&dead);
        }
        hooks.add(&live);
        hooks.notify_all();
        assert_eq!(hooks.len(), 1);
        assert_eq!(live.generation(), 1);

        hooks.remove(live.id());
        assert_eq!(hooks.len(), 0);
    }
}
