#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;

use relayq_client::config::QueueSection;
use relayq_client::connection::Placement;
use relayq_client::pressure::PressureState;
use relayq_core::CorrelationId;

mod support;
use support::{Fixture, RecordingChannel};

fn submit_n(fx: &Fixture, n: usize) -> Vec<CorrelationId> {
    (0..n).map(|i| fx.queue.submit(format!("req-{i}"))).collect()
}

#[test]
fn scenarios_a_through_d() {
    let mut fx = Fixture::new(5);

    // A: disconnected, six submissions land in the backlog
    let mut ids = submit_n(&fx, 4);
    assert!(fx.drain_events().is_empty());
    ids.extend(submit_n(&fx, 2));

    let events = fx.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state, PressureState::AboveThreshold);
    assert_eq!(events[0].outstanding, 5);
    for id in &ids {
        assert!(fx.queue.is_pending(id));
        assert_eq!(fx.queue.placement(id), Some(Placement::Backlog));
    }

    // B: connect forwards everything, pressure unchanged
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());

    let sent: HashSet<CorrelationId> = channel.performs().into_iter().collect();
    assert_eq!(channel.attempt_count(), 6);
    assert_eq!(sent, ids.iter().cloned().collect::<HashSet<_>>());
    let snap = fx.queue.snapshot();
    assert_eq!((snap.backlog, snap.in_flight), (0, 6));
    assert!(snap.connected);
    assert!(snap.warned);
    assert!(fx.drain_events().is_empty());

    // C: resolving #3 keeps us at the threshold, no crossing
    let env = fx.queue.remove(&ids[2]).expect("in flight");
    assert_eq!(env.correlation_id(), &ids[2]);
    assert_eq!(&env.payload()[..], b"req-2");
    assert_eq!(fx.queue.snapshot().outstanding(), 5);
    assert!(fx.drain_events().is_empty());

    // D: one more drops below
    assert!(fx.queue.remove(&ids[0]).is_some());
    let events = fx.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state, PressureState::Recovered);
    assert_eq!(events[0].outstanding, 4);
}

#[test]
fn scenario_e_cancel_before_connect_is_never_sent() {
    let fx = Fixture::new(0);
    let id = fx.queue.submit("draft");
    fx.queue.cancel(&id);
    assert!(!fx.queue.is_pending(&id));

    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());
    assert_eq!(channel.attempt_count(), 0);
    assert_eq!(fx.metrics.worker_sends.get(&[("kind", "cancel"), ("result", "ok")]), 0);
}

#[test]
fn submit_while_connected_goes_straight_to_in_flight() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());

    let id = fx.queue.submit("now");
    assert_eq!(fx.queue.placement(&id), Some(Placement::InFlight));
    assert_eq!(channel.performs(), vec![id]);
}

#[test]
fn pressure_counts_backlog_and_in_flight_together() {
    let mut fx = Fixture::new(3);
    submit_n(&fx, 2);
    fx.queue.on_connected(Arc::new(RecordingChannel::default()));
    assert!(fx.drain_events().is_empty());

    fx.queue.submit("third");
    let events = fx.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outstanding, 3);
}

#[test]
fn cancel_is_idempotent() {
    let mut fx = Fixture::new(2);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());
    let a = fx.queue.submit("a");
    let b = fx.queue.submit("b");
    assert_eq!(fx.drain_events().len(), 1);

    fx.queue.cancel(&a);
    let after_once = fx.queue.snapshot();
    let events_once = fx.drain_events();
    fx.queue.cancel(&a);

    assert_eq!(fx.queue.snapshot(), after_once);
    assert!(fx.drain_events().is_empty());
    assert_eq!(events_once.len(), 1);
    assert_eq!(events_once[0].state, PressureState::Recovered);
    assert!(!fx.queue.is_pending(&a));
    assert!(fx.queue.is_pending(&b));

    // advisory notice goes out both times
    assert_eq!(channel.cancels(), vec![a.clone(), a]);
    assert_eq!(fx.metrics.cancels.get(&[("found", "true")]), 1);
    assert_eq!(fx.metrics.cancels.get(&[("found", "false")]), 1);
}

#[test]
fn cancel_unknown_id_still_notifies_worker() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());

    let stranger = CorrelationId::parse("never-submitted").unwrap();
    fx.queue.cancel(&stranger);
    assert_eq!(channel.cancels(), vec![stranger]);
    assert_eq!(fx.queue.snapshot().outstanding(), 0);
}

#[test]
fn cancel_send_failure_is_swallowed() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());
    let id = fx.queue.submit("x");

    channel.set_failing(true);
    fx.queue.cancel(&id);
    assert!(!fx.queue.is_pending(&id));
    assert_eq!(fx.metrics.worker_sends.get(&[("kind", "cancel"), ("result", "error")]), 1);
}

#[test]
fn teardown_clears_everything() {
    let mut fx = Fixture::new(3);
    let mut ids = submit_n(&fx, 2);
    fx.queue.on_connected(Arc::new(RecordingChannel::default()));
    fx.queue.on_disconnected();
    ids.extend(submit_n(&fx, 2));
    assert_eq!(fx.drain_events().len(), 1);

    fx.queue.cancel_all_unsubmitted();

    for id in &ids {
        assert!(!fx.queue.is_pending(id));
    }
    let snap = fx.queue.snapshot();
    assert_eq!(snap.outstanding(), 0);
    assert!(!snap.warned);
    let events = fx.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state, PressureState::Recovered);
    assert_eq!(events[0].outstanding, 0);
}

#[test]
fn teardown_sends_nothing() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());
    submit_n(&fx, 3);

    fx.queue.cancel_all_unsubmitted();
    assert_eq!(channel.performs().len(), 3);
    assert!(channel.cancels().is_empty());
}

#[test]
fn remove_ignores_backlog_and_repeats() {
    let fx = Fixture::new(0);
    let queued = fx.queue.submit("queued");
    assert!(fx.queue.remove(&queued).is_none());
    assert!(fx.queue.is_pending(&queued));

    fx.queue.on_connected(Arc::new(RecordingChannel::default()));
    assert!(fx.queue.remove(&queued).is_some());
    assert!(fx.queue.remove(&queued).is_none());
}

#[test]
fn failed_forward_stays_in_flight() {
    let fx = Fixture::new(0);
    let id = fx.queue.submit("doomed");
    let channel = Arc::new(RecordingChannel::failing());
    fx.queue.on_connected(channel.clone());

    assert_eq!(channel.attempt_count(), 1);
    assert_eq!(fx.queue.placement(&id), Some(Placement::InFlight));
    assert_eq!(fx.metrics.worker_sends.get(&[("kind", "perform"), ("result", "error")]), 1);
}

#[test]
fn disconnect_leaves_maps_untouched() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(channel.clone());
    let flying = fx.queue.submit("flying");

    fx.queue.on_disconnected();
    let waiting = fx.queue.submit("waiting");
    assert!(!fx.queue.is_connected());
    assert_eq!(fx.queue.placement(&flying), Some(Placement::InFlight));
    assert_eq!(fx.queue.placement(&waiting), Some(Placement::Backlog));

    // late response for the old connection still resolves
    assert!(fx.queue.remove(&flying).is_some());

    // cancel while disconnected has no channel to notify
    fx.queue.cancel(&waiting);
    assert!(channel.cancels().is_empty());
}

#[test]
fn reconnect_does_not_resend_in_flight_by_default() {
    let fx = Fixture::new(0);
    fx.queue.on_connected(Arc::new(RecordingChannel::default()));
    let flying = fx.queue.submit("flying");
    fx.queue.on_disconnected();
    let waiting = fx.queue.submit("waiting");

    let second = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(second.clone());
    assert_eq!(second.performs(), vec![waiting]);
    assert_eq!(fx.queue.placement(&flying), Some(Placement::InFlight));
}

#[test]
fn reconnect_resends_in_flight_when_enabled() {
    let fx = Fixture::with_section(QueueSection {
        pending_warning_threshold: 0,
        resend_in_flight_on_reconnect: true,
    });
    fx.queue.on_connected(Arc::new(RecordingChannel::default()));
    let flying = fx.queue.submit("flying");
    fx.queue.on_disconnected();
    let waiting = fx.queue.submit("waiting");

    let second = Arc::new(RecordingChannel::default());
    fx.queue.on_connected(second.clone());

    let sent: HashSet<CorrelationId> = second.performs().into_iter().collect();
    assert_eq!(second.attempt_count(), 2);
    assert!(sent.contains(&flying));
    assert!(sent.contains(&waiting));
    assert_eq!(fx.queue.snapshot().in_flight, 2);
}

#[test]
fn submit_racing_connect_is_sent_exactly_once() {
    let fx = Fixture::new(0);
    let channel = Arc::new(RecordingChannel::default());

    let ids: Vec<CorrelationId> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&fx.queue);
                s.spawn(move || {
                    (0..250)
                        .map(|i| queue.submit(format!("t{t}-{i}")))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        fx.queue.on_connected(channel.clone());

        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });

    let sent = channel.performs();
    let unique: HashSet<&CorrelationId> = sent.iter().collect();
    assert_eq!(sent.len(), 1000);
    assert_eq!(unique.len(), 1000);

    let snap = fx.queue.snapshot();
    assert_eq!((snap.backlog, snap.in_flight), (0, 1000));
    for id in &ids {
        assert_eq!(fx.queue.placement(id), Some(Placement::InFlight));
    }
}
