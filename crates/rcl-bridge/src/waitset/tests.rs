// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::context::InitOptions;
use crate::error_state;
use crate::guard_condition::get_guard_condition;
use crate::node::{Node, NodeOptions};
use crate::publisher::{Publisher, PublisherOptions};
use crate::subscription::SubscriptionOptions;
use std::thread;

fn context() -> Context {
    Context::new(&InitOptions::default()).expect("context")
}

fn sizes(subscriptions: usize, guard_conditions: usize) -> WaitSetSizes {
    WaitSetSizes {
        subscriptions,
        guard_conditions,
        ..WaitSetSizes::default()
    }
}

fn wait_set(context: &Context, sizes: WaitSetSizes) -> WaitSet {
    WaitSet::new(context, sizes, &Allocator::system()).expect("wait set")
}

#[test]
fn triggered_guard_is_reported_and_unready_slots_nulled() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(1, 1));

    assert_eq!(ws.add_guard_condition(&guard).expect("add guard"), 0);
    guard.trigger().expect("trigger");

    assert_eq!(ws.wait(None).expect("wait"), 1);
    assert_eq!(ws.state(), WaitSetState::Ready);
    assert_eq!(ws.get_guard_condition(0), (guard.id(), true));
    assert_eq!(ws.get_subscription(0), (None, true));
    assert_eq!(ws.get_subscription(1), (None, false));
}

#[test]
fn trigger_is_consumed_by_the_reporting_wait() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));

    ws.add_guard_condition(&guard).expect("add");
    guard.trigger().expect("trigger");
    ws.wait(Some(Duration::ZERO)).expect("first wait");
    assert!(!guard.is_triggered());

    let err = ws.wait(Some(Duration::ZERO)).expect_err("second wait");
    assert_eq!(err.code(), RetCode::Timeout);
    assert_eq!(ws.get_guard_condition(0), (None, true));
}

#[test]
fn lookup_on_zero_sized_kind_is_not_found() {
    let context = context();
    let ws = wait_set(&context, sizes(0, 1));
    assert_eq!(ws.get_subscription(0), (None, false));
    assert_eq!(ws.size_of(WaitableKind::Subscription), 0);
}

#[test]
fn lookup_on_uninitialized_wait_set() {
    let ws = WaitSet::zero_initialized();
    assert_eq!(ws.get(WaitableKind::Service, 0), (None, false));
    assert_eq!(ws.state(), WaitSetState::Empty);
    assert!(!ws.is_valid());
}

#[test]
fn trigger_from_other_thread_unblocks_indefinite_wait() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));
    ws.add_guard_condition(&guard).expect("add");

    let started = Instant::now();
    let ready = thread::scope(|scope| {
        scope.spawn(|| {
            thread::sleep(Duration::from_millis(50));
            guard.trigger().expect("trigger");
        });
        ws.wait(None)
    })
    .expect("wait");

    assert_eq!(ready, 1);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(ws.get_guard_condition(0), (guard.id(), true));
}

#[test]
fn timeout_records_no_error() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));
    ws.add_guard_condition(&guard).expect("add");

    error_state::reset_error();
    let started = Instant::now();
    let err = ws.wait(Some(Duration::from_millis(20))).expect_err("timeout");
    assert_eq!(err.code(), RetCode::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert!(!error_state::is_error_set());
}

#[test]
fn zero_capacity_wait_set_is_empty() {
    let context = context();
    let mut ws = wait_set(&context, WaitSetSizes::default());
    let err = ws.wait(Some(Duration::ZERO)).expect_err("empty");
    assert_eq!(err.code(), RetCode::WaitSetEmpty);
}

#[test]
fn invalid_wait_sets() {
    let mut ws = WaitSet::zero_initialized();
    assert_eq!(
        ws.wait(None).expect_err("uninit").code(),
        RetCode::WaitSetInvalid
    );

    let context = context();
    let mut ws = wait_set(&context, sizes(0, 1));
    context.shutdown().expect("shutdown");
    assert!(!ws.is_valid());
    assert_eq!(
        ws.wait(Some(Duration::ZERO)).expect_err("shut down").code(),
        RetCode::WaitSetInvalid
    );
}

#[test]
fn add_beyond_capacity_is_full() {
    let context = context();
    let first = get_guard_condition(&context).expect("guard");
    let second = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));

    ws.add_guard_condition(&first).expect("first");
    let err = ws.add_guard_condition(&second).expect_err("second");
    assert_eq!(err.code(), RetCode::WaitSetFull);
}

#[test]
fn failed_init_leaves_wait_set_empty() {
    let context = context();
    let mut ws = WaitSet::zero_initialized();
    let err = ws
        .init(&context, sizes(1, 1), &Allocator::zeroed())
        .expect_err("bad allocator");
    assert_eq!(err.code(), RetCode::InvalidArgument);
    assert_eq!(ws.state(), WaitSetState::Empty);
    assert_eq!(ws.size_of(WaitableKind::Subscription), 0);

    let err = ws
        .init(&Context::zero_initialized(), sizes(1, 1), &Allocator::system())
        .expect_err("bad context");
    assert_eq!(err.code(), RetCode::NotInit);
    assert_eq!(ws.state(), WaitSetState::Empty);

    ws.init(&context, sizes(1, 1), &Allocator::system())
        .expect("init");
    let err = ws
        .init(&context, sizes(1, 1), &Allocator::system())
        .expect_err("double init");
    assert_eq!(err.code(), RetCode::AlreadyInit);
}

#[test]
fn clear_and_resize() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(2, 2));

    ws.add_guard_condition(&guard).expect("add");
    ws.clear().expect("clear");
    assert_eq!(ws.get_guard_condition(0), (None, true));
    assert_eq!(ws.size_of(WaitableKind::GuardCondition), 2);
    assert_eq!(ws.add_guard_condition(&guard).expect("re-add"), 0);

    ws.resize(sizes(0, 3)).expect("resize");
    assert_eq!(ws.sizes(), sizes(0, 3));
    assert_eq!(ws.get_guard_condition(0), (None, true));
    assert_eq!(ws.get_subscription(0), (None, false));
}

#[test]
fn subscription_becomes_ready_on_publish() {
    let context = context();
    let node = Node::new("waitset_pubsub", "/", &context, &NodeOptions::default()).expect("node");
    let publisher =
        Publisher::new(&node, "ws_ready_topic", &PublisherOptions::default()).expect("publisher");
    let mut subscription =
        Subscription::new(&node, "ws_ready_topic", &SubscriptionOptions::default())
            .expect("subscription");
    let mut ws = wait_set(&context, sizes(1, 0));

    ws.add_subscription(&subscription).expect("add");
    assert_eq!(
        ws.wait(Some(Duration::ZERO)).expect_err("nothing yet").code(),
        RetCode::Timeout
    );

    ws.clear().expect("clear");
    ws.add_subscription(&subscription).expect("re-add");
    publisher.publish(b"ping").expect("publish");
    assert_eq!(ws.wait(Some(Duration::from_secs(1))).expect("wait"), 1);
    assert_eq!(ws.get_subscription(0), (subscription.id(), true));
    assert_eq!(subscription.take().expect("take"), b"ping");
}

#[test]
fn lookup_is_bounds_checked_for_random_sizes() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let context = context();
    let node = Node::new("waitset_bounds", "/", &context, &NodeOptions::default()).expect("node");

    for round in 0..8 {
        let n = rng.usize(0..8);
        let mut endpoints = Vec::with_capacity(n);
        for i in 0..n {
            let topic = format!("bounds_{round}_{i}");
            let publisher =
                Publisher::new(&node, &topic, &PublisherOptions::default()).expect("publisher");
            let subscription =
                Subscription::new(&node, &topic, &SubscriptionOptions::default())
                    .expect("subscription");
            endpoints.push((publisher, subscription));
        }

        // Keep one guard so a round without publishes still has a member.
        let guard = get_guard_condition(&context).expect("guard");
        let mut ws = wait_set(&context, sizes(n, 1));
        ws.add_guard_condition(&guard).expect("add guard");
        guard.trigger().expect("trigger");

        let mut published = Vec::with_capacity(n);
        for (publisher, subscription) in &endpoints {
            ws.add_subscription(subscription).expect("add subscription");
            let publish = rng.bool();
            if publish {
                publisher.publish(b"x").expect("publish");
            }
            published.push(publish);
        }

        ws.wait(Some(Duration::ZERO)).expect("guard keeps the wait ready");

        for (index, publish) in published.iter().enumerate() {
            let (entity, found) = ws.get_subscription(index);
            assert!(found);
            assert_eq!(entity.is_some(), *publish);
            if *publish {
                assert_eq!(entity, endpoints[index].1.id());
            }
        }
        for index in n..n + 4 {
            assert_eq!(ws.get_subscription(index), (None, false));
        }
    }
}

#[test]
fn ready_state_holds_through_lookups_until_clear() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));
    assert_eq!(ws.state(), WaitSetState::Provisioned);

    ws.add_guard_condition(&guard).expect("add");
    guard.trigger().expect("trigger");
    ws.wait(Some(Duration::ZERO)).expect("wait");
    assert_eq!(ws.get_guard_condition(0), (guard.id(), true));
    assert_eq!(ws.get_guard_condition(0), (guard.id(), true));
    assert_eq!(ws.state(), WaitSetState::Ready);

    ws.clear().expect("clear");
    assert_eq!(ws.state(), WaitSetState::Provisioned);
}

#[test]
fn fini_releases_slots_once() {
    let context = context();
    let guard = get_guard_condition(&context).expect("guard");
    let mut ws = wait_set(&context, sizes(0, 1));
    ws.add_guard_condition(&guard).expect("add");

    ws.fini().expect("fini");
    assert!(!ws.is_valid());
    assert_eq!(ws.state(), WaitSetState::Empty);
    assert_eq!(ws.get_guard_condition(0), (None, false));
    assert_eq!(ws.fini().expect_err("second fini").code(), RetCode::WaitSetInvalid);
}
