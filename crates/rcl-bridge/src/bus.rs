// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process topic and service bus behind the `rclbridge_intra`
//! implementation.
//!
//! Every context in the process shares one bus; topics and services are
//! keyed by `(domain_id, fully qualified name)`. Endpoints own their
//! mailboxes, the bus only holds `Weak` references, so a dropped endpoint
//! stops receiving even if it was never unregistered.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, OnceLock, Weak};

use crate::condition::{SignalHooks, WaitSignal, Waitable};
use crate::entity::EntityId;
use crate::qos::QosProfile;
use crate::service::RequestId;

type Key = (u32, String);

/// Bounded FIFO that wakes registered wait-sets on push.
pub(crate) struct Mailbox<T> {
    queue: Mutex<VecDeque<T>>,
    bound: Option<usize>,
    hooks: SignalHooks,
}

impl<T> Mailbox<T> {
    pub(crate) fn new(bound: Option<usize>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            bound,
            hooks: SignalHooks::new(),
        }
    }

    /// Append `item`, evicting the oldest entry when full. Returns whether
    /// something was evicted.
    pub(crate) fn push(&self, item: T) -> bool {
        let evicted = {
            let mut queue = self.queue.lock();
            let evicted = match self.bound {
                Some(bound) if queue.len() >= bound => queue.pop_front().is_some(),
                _ => false,
            };
            queue.push_back(item);
            evicted
        };
        self.hooks.notify_all();
        evicted
    }

    pub(crate) fn pop(&self) -> Option<T> {
        self.queue.lock().pop_front()
    }

    /// Run `f` with the queue locked.
    pub(crate) fn with_queue<R>(&self, f: impl FnOnce(&mut VecDeque<T>) -> R) -> R {
        f(&mut self.queue.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<T: Send> Waitable for Mailbox<T> {
    fn is_ready(&self) -> bool {
        !self.queue.lock().is_empty()
    }

    fn add_signal(&self, signal: &Arc<WaitSignal>) {
        self.hooks.add(signal);
    }

    fn remove_signal(&self, signal_id: u64) {
        self.hooks.remove(signal_id);
    }
}

pub(crate) type SampleMailbox = Mailbox<Vec<u8>>;

/// Request as queued on a service.
pub(crate) struct RequestEnvelope {
    pub(crate) id: RequestId,
    pub(crate) payload: Vec<u8>,
}

/// Response as queued on a client.
pub(crate) struct ResponseEnvelope {
    pub(crate) id: RequestId,
    pub(crate) payload: Vec<u8>,
}

struct Reader {
    id: EntityId,
    qos: QosProfile,
    mailbox: Weak<SampleMailbox>,
}

struct Writer {
    id: EntityId,
    qos: QosProfile,
    /// Last samples kept for late TRANSIENT_LOCAL readers.
    retained: VecDeque<Vec<u8>>,
    retain_bound: Option<usize>,
}

#[derive(Default)]
struct Topic {
    readers: Vec<Reader>,
    writers: Vec<Writer>,
}

impl Topic {
    fn is_unused(&self) -> bool {
        self.readers.is_empty() && self.writers.is_empty()
    }
}

struct ServiceEntry {
    id: EntityId,
    requests: Weak<Mailbox<RequestEnvelope>>,
}

/// A BEST_EFFORT offer cannot satisfy a RELIABLE request.
fn compatible(writer: &QosProfile, reader: &QosProfile) -> bool {
    !(writer.is_best_effort() && reader.is_reliable())
}

pub(crate) struct Bus {
    topics: Mutex<HashMap<Key, Topic>>,
    services: Mutex<HashMap<Key, ServiceEntry>>,
    clients: Mutex<HashMap<u64, Weak<Mailbox<ResponseEnvelope>>>>,
}

pub(crate) fn bus() -> &'static Bus {
    static BUS: OnceLock<Bus> = OnceLock::new();
    BUS.get_or_init(|| Bus {
        topics: Mutex::new(HashMap::new()),
        services: Mutex::new(HashMap::new()),
        clients: Mutex::new(HashMap::new()),
    })
}

impl Bus {
    pub(crate) fn add_reader(
        &self,
        domain_id: u32,
        topic: &str,
        id: EntityId,
        qos: QosProfile,
        mailbox: &Arc<SampleMailbox>,
    ) {
        let mut topics = self.topics.lock();
        let entry = topics.entry((domain_id, topic.to_string())).or_default();

        for writer in &entry.writers {
            if !compatible(&writer.qos, &qos) {
                log::warn!(
                    "[bus] {}: best-effort writer {} will not deliver to reliable reader {}",
                    topic,
                    writer.id,
                    id
                );
                continue;
            }
            if qos.is_transient_local() && writer.qos.is_transient_local() {
                for sample in &writer.retained {
                    mailbox.push(sample.clone());
                }
            }
        }

        entry.readers.push(Reader {
            id,
            qos,
            mailbox: Arc::downgrade(mailbox),
        });
        log::debug!("[bus] reader {} joined {} (domain {})", id, topic, domain_id);
    }

    pub(crate) fn add_writer(
        &self,
        domain_id: u32,
        topic: &str,
        id: EntityId,
        qos: QosProfile,
        retain_bound: Option<usize>,
    ) {
        let mut topics = self.topics.lock();
        let entry = topics.entry((domain_id, topic.to_string())).or_default();

        for reader in &entry.readers {
            if !compatible(&qos, &reader.qos) {
                log::warn!(
                    "[bus] {}: best-effort writer {} will not deliver to reliable reader {}",
                    topic,
                    id,
                    reader.id
                );
            }
        }

        entry.writers.push(Writer {
            id,
            qos,
            retained: VecDeque::new(),
            retain_bound,
        });
        log::debug!("[bus] writer {} joined {} (domain {})", id, topic, domain_id);
    }

    pub(crate) fn remove_reader(&self, domain_id: u32, topic: &str, id: EntityId) {
        self.remove_endpoint(domain_id, topic, |t| t.readers.retain(|r| r.id != id));
    }

    pub(crate) fn remove_writer(&self, domain_id: u32, topic: &str, id: EntityId) {
        self.remove_endpoint(domain_id, topic, |t| t.writers.retain(|w| w.id != id));
    }

    fn remove_endpoint(&self, domain_id: u32, topic: &str, remove: impl FnOnce(&mut Topic)) {
        let mut topics = self.topics.lock();
        let key = (domain_id, topic.to_string());
        if let Some(entry) = topics.get_mut(&key) {
            remove(entry);
            if entry.is_unused() {
                topics.remove(&key);
            }
        }
    }

    /// Deliver `payload` from `writer_id` to every compatible reader.
    /// Returns the number of readers reached.
    pub(crate) fn publish(
        &self,
        domain_id: u32,
        topic: &str,
        writer_id: EntityId,
        payload: &[u8],
    ) -> usize {
        let mut topics = self.topics.lock();
        let Some(entry) = topics.get_mut(&(domain_id, topic.to_string())) else {
            return 0;
        };
        let Some(writer) = entry.writers.iter_mut().find(|w| w.id == writer_id) else {
            return 0;
        };

        if writer.qos.is_transient_local() {
            if let Some(bound) = writer.retain_bound {
                while writer.retained.len() >= bound {
                    writer.retained.pop_front();
                }
            }
            writer.retained.push_back(payload.to_vec());
        }
        let writer_qos = writer.qos;

        let mut delivered = 0;
        entry.readers.retain(|reader| {
            let Some(mailbox) = reader.mailbox.upgrade() else {
                return false;
            };
            if compatible(&writer_qos, &reader.qos) {
                if mailbox.push(payload.to_vec()) {
                    log::trace!(
                        "[bus] {}: reader {} queue full, dropped oldest",
                        topic,
                        reader.id
                    );
                }
                delivered += 1;
            }
            true
        });
        delivered
    }

    /// Number of live readers on a topic.
    pub(crate) fn reader_count(&self, domain_id: u32, topic: &str) -> usize {
        self.topics
            .lock()
            .get(&(domain_id, topic.to_string()))
            .map_or(0, |t| {
                t.readers
                    .iter()
                    .filter(|r| r.mailbox.strong_count() > 0)
                    .count()
            })
    }

    /// Register a service server. Fails when a live server already owns the
    /// name.
    pub(crate) fn add_service(
        &self,
        domain_id: u32,
        name: &str,
        id: EntityId,
        requests: &Arc<Mailbox<RequestEnvelope>>,
    ) -> bool {
        let mut services = self.services.lock();
        let key = (domain_id, name.to_string());
        if services
            .get(&key)
            .is_some_and(|entry| entry.requests.strong_count() > 0)
        {
            return false;
        }
        services.insert(
            key,
            ServiceEntry {
                id,
                requests: Arc::downgrade(requests),
            },
        );
        log::debug!("[bus] service {} registered {} (domain {})", id, name, domain_id);
        true
    }

    pub(crate) fn remove_service(&self, domain_id: u32, name: &str, id: EntityId) {
        let mut services = self.services.lock();
        let key = (domain_id, name.to_string());
        if services.get(&key).is_some_and(|entry| entry.id == id) {
            services.remove(&key);
        }
    }

    pub(crate) fn service_available(&self, domain_id: u32, name: &str) -> bool {
        self.services
            .lock()
            .get(&(domain_id, name.to_string()))
            .is_some_and(|entry| entry.requests.strong_count() > 0)
    }

    /// Queue a request on the named service. Returns `false` when no server
    /// is listening; the request is then lost.
    pub(crate) fn send_request(
        &self,
        domain_id: u32,
        name: &str,
        request: RequestEnvelope,
    ) -> bool {
        let mailbox = self
            .services
            .lock()
            .get(&(domain_id, name.to_string()))
            .and_then(|entry| entry.requests.upgrade());
        match mailbox {
            Some(mailbox) => {
                mailbox.push(request);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_client(&self, id: EntityId, responses: &Arc<Mailbox<ResponseEnvelope>>) {
        self.clients
            .lock()
            .insert(id.as_raw(), Arc::downgrade(responses));
    }

    pub(crate) fn remove_client(&self, id: EntityId) {
        self.clients.lock().remove(&id.as_raw());
    }

    /// Route a response back to the client that issued the request.
    pub(crate) fn send_response(&self, response: ResponseEnvelope) -> bool {
        let mailbox = self
            .clients
            .lock()
            .get(&response.id.client_id)
            .and_then(Weak::upgrade);
        match mailbox {
            Some(mailbox) => {
                mailbox.push(response);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qos::{DurabilityPolicy, ReliabilityPolicy};

    // Domains are picked per test so parallel tests never share topics.

    #[test]
    fn mailbox_bound_drops_oldest() {
        let mailbox: Mailbox<u32> = Mailbox::new(Some(2));
        assert!(!mailbox.push(1));
        assert!(!mailbox.push(2));
        assert!(mailbox.push(3));
        assert_eq!(mailbox.pop(), Some(2));
        assert_eq!(mailbox.pop(), Some(3));
        assert_eq!(mailbox.pop(), None);
    }

    #[test]
    fn mailbox_push_notifies_hooks() {
        let mailbox: Mailbox<u32> = Mailbox::new(None);
        let signal = Arc::new(WaitSignal::new());
        mailbox.add_signal(&signal);
        assert!(!mailbox.is_ready());
        mailbox.push(7);
        assert!(mailbox.is_ready());
        assert_eq!(signal.generation(), 1);
    }

    #[test]
    fn publish_reaches_matching_readers_only() {
        let bus = bus();
        let reader = Arc::new(SampleMailbox::new(None));
        let other = Arc::new(SampleMailbox::new(None));
        let writer = EntityId::next();

        bus.add_reader(9001, "/a", EntityId::next(), QosProfile::DEFAULT, &reader);
        bus.add_reader(9001, "/b", EntityId::next(), QosProfile::DEFAULT, &other);
        bus.add_writer(9001, "/a", writer, QosProfile::DEFAULT, Some(10));

        assert_eq!(bus.publish(9001, "/a", writer, b"hello"), 1);
        assert_eq!(reader.pop().as_deref(), Some(&b"hello"[..]));
        assert_eq!(other.len(), 0);
    }

    #[test]
    fn best_effort_writer_skips_reliable_reader() {
        let bus = bus();
        let reliable = Arc::new(SampleMailbox::new(None));
        let mut best_effort_qos = QosProfile::DEFAULT;
        best_effort_qos.set_reliability(ReliabilityPolicy::BestEffort as i32);
        let best_effort = Arc::new(SampleMailbox::new(None));
        let writer = EntityId::next();

        bus.add_reader(9002, "/t", EntityId::next(), QosProfile::DEFAULT, &reliable);
        bus.add_reader(9002, "/t", EntityId::next(), best_effort_qos, &best_effort);
        bus.add_writer(9002, "/t", writer, best_effort_qos, Some(10));

        assert_eq!(bus.publish(9002, "/t", writer, b"x"), 1);
        assert_eq!(reliable.len(), 0);
        assert_eq!(best_effort.len(), 1);
    }

    #[test]
    fn transient_local_replays_to_late_reader() {
        let bus = bus();
        let mut qos = QosProfile::DEFAULT;
        qos.set_durability(DurabilityPolicy::TransientLocal as i32);
        let writer = EntityId::next();
        bus.add_writer(9003, "/latched", writer, qos, Some(2));
        for sample in [b"1", b"2", b"3"] {
            bus.publish(9003, "/latched", writer, sample);
        }

        let late = Arc::new(SampleMailbox::new(None));
        bus.add_reader(9003, "/latched", EntityId::next(), qos, &late);
        assert_eq!(late.pop().as_deref(), Some(&b"2"[..]));
        assert_eq!(late.pop().as_deref(), Some(&b"3"[..]));

        let volatile = Arc::new(SampleMailbox::new(None));
        bus.add_reader(9003, "/latched", EntityId::next(), QosProfile::DEFAULT, &volatile);
        assert_eq!(volatile.len(), 0);
    }

    #[test]
    fn dropped_reader_is_pruned() {
        let bus = bus();
        let writer = EntityId::next();
        {
            let reader = Arc::new(SampleMailbox::new(None));
            bus.add_reader(9004, "/p", EntityId::next(), QosProfile::DEFAULT, &reader);
            assert_eq!(bus.reader_count(9004, "/p"), 1);
        }
        bus.add_writer(9004, "/p", writer, QosProfile::DEFAULT, Some(1));
        assert_eq!(bus.reader_count(9004, "/p"), 0);
        assert_eq!(bus.publish(9004, "/p", writer, b"x"), 0);
    }

    #[test]
    fn one_live_service_per_name() {
        let bus = bus();
        let first = Arc::new(Mailbox::new(None));
        let second = Arc::new(Mailbox::new(None));
        let first_id = EntityId::next();
        assert!(bus.add_service(9005, "/srv", first_id, &first));
        assert!(!bus.add_service(9005, "/srv", EntityId::next(), &second));
        assert!(bus.service_available(9005, "/srv"));

        bus.remove_service(9005, "/srv", first_id);
        assert!(!bus.service_available(9005, "/srv"));
    }
}
