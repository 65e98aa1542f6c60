//! Integration tests for the subscribe / publish / reset lifecycle.
//!
//! These tests walk a process-wide bus through the phases a host application drives:
//! subscribe, publish, unsubscribe, and a full reset between phases.
//!
//! NOTE: All tests use #[serial] because they share the same bus (lifecycle).
//! Running them in parallel could cause interference.

use serial_test::serial;
use std::sync::{Arc, Mutex};
use typed_event_bus::define_event_bus;

// Create a bus for these tests
define_event_bus!(lifecycle);

type Log = Arc<Mutex<Vec<String>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
#[serial]
fn test_handlers_run_once_each_in_subscription_order() {
    lifecycle::reset_all();
    let log = new_log();

    for tag in ["first", "second", "third"] {
        let log = log.clone();
        lifecycle::subscribe(move |x: &i32| log.lock().unwrap().push(format!("{tag}:{x}")));
    }

    assert_eq!(lifecycle::publish(11), 3);
    assert_eq!(entries(&log), vec!["first:11", "second:11", "third:11"]);
}

#[test]
#[serial]
fn test_log_scenario() {
    lifecycle::reset_all();
    let log = new_log();

    let a_log = log.clone();
    let a = lifecycle::subscribe(move |x: &i32| a_log.lock().unwrap().push(format!("A:{x}")));
    let b_log = log.clone();
    lifecycle::subscribe(move |x: &i32| b_log.lock().unwrap().push(format!("B:{x}")));

    lifecycle::publish(5);
    assert_eq!(entries(&log), vec!["A:5", "B:5"]);

    lifecycle::unsubscribe(a);
    lifecycle::publish(7);
    assert_eq!(entries(&log), vec!["A:5", "B:5", "B:7"]);

    lifecycle::reset_all();
    lifecycle::publish(9);
    assert_eq!(entries(&log), vec!["A:5", "B:5", "B:7"]);

    let c_log = log.clone();
    lifecycle::subscribe(move |x: &i32| c_log.lock().unwrap().push(format!("C:{x}")));
    lifecycle::publish(9);
    assert_eq!(entries(&log), vec!["A:5", "B:5", "B:7", "C:9"]);
}

#[test]
#[serial]
fn test_reset_all_covers_every_touched_type() {
    lifecycle::reset_all();
    let log = new_log();

    let ints = log.clone();
    lifecycle::subscribe(move |x: &i32| ints.lock().unwrap().push(format!("int:{x}")));
    let strings = log.clone();
    lifecycle::subscribe(move |s: &String| strings.lock().unwrap().push(format!("str:{s}")));
    let flags = log.clone();
    lifecycle::subscribe(move |b: &bool| flags.lock().unwrap().push(format!("bool:{b}")));

    assert_eq!(lifecycle::registered_channels(), Ok(3));
    assert_eq!(lifecycle::reset_all(), 3);
    assert_eq!(lifecycle::registered_channels(), Ok(0));

    lifecycle::publish(1);
    lifecycle::publish("x".to_string());
    lifecycle::publish(true);
    assert!(entries(&log).is_empty());

    // Fresh channels start empty.
    assert_eq!(lifecycle::subscriber_count::<i32>(), Ok(0));
    assert_eq!(lifecycle::subscriber_count::<String>(), Ok(0));
}

#[test]
#[serial]
fn test_many_subscriptions_one_reset() {
    lifecycle::reset_all();

    for _ in 0..5 {
        lifecycle::subscribe(|_: &u64| {});
    }

    assert_eq!(lifecycle::registered_channels(), Ok(1));
    assert_eq!(lifecycle::reset_all(), 1);
}

#[test]
#[serial]
fn test_publish_to_empty_channel() {
    lifecycle::reset_all();
    assert_eq!(lifecycle::publish(0u16), 0);
    assert!(!lifecycle::contains::<u16>().unwrap());
}

#[test]
#[serial]
fn test_interleaved_types_do_not_cross() {
    lifecycle::reset_all();
    let log = new_log();

    let ints = log.clone();
    lifecycle::subscribe(move |x: &i32| ints.lock().unwrap().push(format!("int:{x}")));
    let strings = log.clone();
    lifecycle::subscribe(move |s: &String| strings.lock().unwrap().push(format!("str:{s}")));

    lifecycle::publish("a".to_string());
    lifecycle::publish(1);
    lifecycle::publish("b".to_string());
    lifecycle::publish(2);

    assert_eq!(entries(&log), vec!["str:a", "int:1", "str:b", "int:2"]);
}

#[test]
#[serial]
fn test_emptied_channel_stays_registered_until_reset() {
    lifecycle::reset_all();

    let token = lifecycle::subscribe(|_: &char| {});
    lifecycle::unsubscribe(token);

    assert!(lifecycle::contains::<char>().unwrap());
    assert_eq!(lifecycle::subscriber_count::<char>(), Ok(0));

    assert_eq!(lifecycle::reset_all(), 1);
    assert!(!lifecycle::contains::<char>().unwrap());
}

#[test]
#[serial]
fn test_reset_single_channel_between_phases() {
    lifecycle::reset_all();
    let log = new_log();

    let ints = log.clone();
    lifecycle::subscribe(move |x: &i32| ints.lock().unwrap().push(format!("int:{x}")));
    let strings = log.clone();
    lifecycle::subscribe(move |s: &String| strings.lock().unwrap().push(format!("str:{s}")));

    assert!(lifecycle::reset::<String>());
    lifecycle::publish("gone".to_string());
    lifecycle::publish(3);

    assert_eq!(entries(&log), vec!["int:3"]);
    assert_eq!(lifecycle::registered_channels(), Ok(1));
}
