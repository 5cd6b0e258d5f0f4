//! Event Bus Tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mipsim_core::sim::{EventBus, EventResponse, SimulationEvent, SimulationListener};
use pretty_assertions::assert_eq;

use crate::common::harness::EventRecorder;

#[test]
fn listeners_receive_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    for tag in ["a", "b"] {
        let order = Arc::clone(&order);
        let listener: Arc<dyn SimulationListener> = Arc::new(move |_: &SimulationEvent| {
            order.lock().unwrap().push(tag);
            EventResponse::Continue
        });
        let _ = bus.subscribe(listener);
    }

    let _ = bus.publish(&SimulationEvent::Start);

    assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn unsubscribed_listener_is_silent() {
    let bus = EventBus::new();
    let recorder = EventRecorder::new();
    let id = bus.subscribe(recorder.clone());

    assert!(bus.unsubscribe(id));
    assert!(!bus.unsubscribe(id));
    let _ = bus.publish(&SimulationEvent::Start);

    assert!(recorder.events().is_empty());
}

#[test]
fn veto_cancels_cancellable_events() {
    let bus = EventBus::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let listener: Arc<dyn SimulationListener> = Arc::new(move |_: &SimulationEvent| {
        let _ = counter.fetch_add(1, Ordering::SeqCst);
        EventResponse::Cancel
    });
    let _ = bus.subscribe(listener);
    let recorder = EventRecorder::new();
    let _ = bus.subscribe(recorder.clone());

    let before = SimulationEvent::CycleBefore { cycle: 0, pc: 0x0040_0000 };
    assert_eq!(bus.publish(&before), EventResponse::Cancel);
    assert_eq!(bus.publish(&SimulationEvent::CachesResetBefore), EventResponse::Cancel);
    assert_eq!(recorder.events().len(), 2, "later listeners still see vetoed events");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn veto_of_notification_is_ignored() {
    let bus = EventBus::new();
    let recorder = EventRecorder::new();
    recorder.veto_when(|_| true);
    let _ = bus.subscribe(recorder.clone());

    assert_eq!(bus.publish(&SimulationEvent::Reset), EventResponse::Continue);
    assert_eq!(
        bus.publish(&SimulationEvent::Finished { exit_code: 0 }),
        EventResponse::Continue
    );
}

#[test]
fn empty_bus_continues() {
    assert_eq!(
        EventBus::new().publish(&SimulationEvent::CachesResetBefore),
        EventResponse::Continue
    );
}

#[test]
fn only_before_events_are_cancellable() {
    assert!(SimulationEvent::CycleBefore { cycle: 3, pc: 0 }.is_cancellable());
    assert!(SimulationEvent::CachesResetBefore.is_cancellable());
    assert!(!SimulationEvent::CycleAfter { cycle: 3, pc: 0 }.is_cancellable());
    assert!(!SimulationEvent::Lock.is_cancellable());
}
