//! Integration tests for bus isolation.
//!
//! Every `EventBus`, and every bus declared with `define_event_bus!`, has its own
//! channels and its own registry.

use std::sync::{Arc, Mutex};
use typed_event_bus::{define_event_bus, EventBus};

#[test]
fn test_multiple_isolated_buses() {
    define_event_bus!(input);
    define_event_bus!(audio);
    define_event_bus!(physics);

    input::subscribe(|_: &String| {});
    audio::subscribe(|_: &String| {});
    audio::subscribe(|_: &String| {});

    assert_eq!(input::publish("key".to_string()), 1);
    assert_eq!(audio::publish("beep".to_string()), 2);
    assert_eq!(physics::publish("nothing".to_string()), 0);
}

#[test]
fn test_reset_all_does_not_leak_between_buses() {
    define_event_bus!(reset_a);
    define_event_bus!(reset_b);

    reset_a::subscribe(|_: &i32| {});
    reset_b::subscribe(|_: &i32| {});

    assert_eq!(reset_a::reset_all(), 1);

    assert!(!reset_a::contains::<i32>().unwrap());
    assert!(reset_b::contains::<i32>().unwrap());
    assert_eq!(reset_b::publish(1), 1);
}

#[test]
fn test_tokens_from_another_bus_are_ignored() {
    let left = EventBus::new();
    let right = EventBus::new();

    let left_token = left.subscribe(|_: &u8| {});
    right.subscribe(|_: &u8| {});

    assert!(!right.unsubscribe(left_token));
    assert_eq!(right.subscriber_count::<u8>(), Ok(1));
    assert!(left.unsubscribe(left_token));
}

#[test]
fn test_bus_scoping() {
    // Buses can be scoped to different modules
    mod module_a {
        use typed_event_bus::define_event_bus;
        define_event_bus!(scoped);

        pub fn setup(log: std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
            scoped::subscribe(move |s: &String| log.lock().unwrap().push(format!("A got {s}")));
        }

        pub fn fire() {
            scoped::publish("ping".to_string());
        }
    }

    mod module_b {
        use typed_event_bus::define_event_bus;
        define_event_bus!(scoped);

        pub fn setup(log: std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
            scoped::subscribe(move |s: &String| log.lock().unwrap().push(format!("B got {s}")));
        }

        pub fn fire() {
            scoped::publish("pong".to_string());
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    module_a::setup(log.clone());
    module_b::setup(log.clone());

    module_a::fire();
    module_b::fire();

    assert_eq!(*log.lock().unwrap(), vec!["A got ping", "B got pong"]);
}

#[test]
fn test_bus_with_tracing_isolation() {
    define_event_bus!(traced_a);
    define_event_bus!(traced_b);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();

    traced_a::set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(format!("{}", event));
    });

    traced_a::publish(1i32);
    traced_b::publish(2i32);

    // Only traced_a should have events
    let captured = events.lock().unwrap();
    assert_eq!(*captured, vec!["publish { type_name: i32, subscribers: 0 }"]);
}
