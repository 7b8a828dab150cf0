use crate::{TypedEvents, event_catalog};

use std::sync::{Arc, Mutex};

event_catalog! {
    pub Thermostat {
        TemperatureChanged(f32) = "temperatureChanged";
        Reset(()) = "reset";
    }
}

/// WHAT: Typed subscribers receive the payload of their own event only
/// WHY: The catalog binds each name to one payload type
#[test]
#[allow(clippy::unwrap_used)]
fn given_typed_subscriber_when_emitting_then_payload_delivered() {
    // Given: Subscribers for two different events
    let events = TypedEvents::<Thermostat>::new();
    let readings = Arc::new(Mutex::new(Vec::new()));
    let resets = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&readings);
    events.subscribe::<TemperatureChanged, _>(move |celsius| sink.lock().unwrap().push(*celsius));
    let counter = Arc::clone(&resets);
    events.subscribe::<Reset, _>(move |_| *counter.lock().unwrap() += 1);

    // When: Emitting readings and a reset
    events.emit::<TemperatureChanged>(&21.5);
    events.emit::<TemperatureChanged>(&22.0);
    events.emit::<Reset>(&());

    // Then: Each subscriber saw its own events
    assert_eq!(*readings.lock().unwrap(), vec![21.5, 22.0]);
    assert_eq!(*resets.lock().unwrap(), 1);
}

/// WHAT: Unsubscribing stops delivery and is idempotent
/// WHY: Hosts withdraw subscriptions on shutdown, possibly twice
#[test]
#[allow(clippy::unwrap_used)]
fn given_subscription_when_unsubscribed_then_no_more_deliveries() {
    // Given: One subscription
    let events = TypedEvents::<Thermostat>::new();
    let readings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&readings);
    let subscription =
        events.subscribe::<TemperatureChanged, _>(move |celsius| sink.lock().unwrap().push(*celsius));
    assert_eq!(subscription.event_name(), "temperatureChanged");
    assert_eq!(events.subscriber_count::<TemperatureChanged>(), 1);

    // When: Unsubscribing twice, then emitting
    events.unsubscribe(&subscription);
    events.unsubscribe(&subscription);
    events.emit::<TemperatureChanged>(&19.0);

    // Then: Nothing delivered
    assert!(readings.lock().unwrap().is_empty());
    assert_eq!(events.subscriber_count::<TemperatureChanged>(), 0);
}
