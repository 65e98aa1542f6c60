//! Basic usage example for typed-event-bus.
//!
//! Demonstrates:
//! - Subscribing handlers to different payload types
//! - Publishing values (handlers run in subscription order)
//! - Unsubscribing with the returned token
//! - Resetting every channel between two "levels"
//!
//! Run with: `cargo run --example basic_usage`

use typed_event_bus::{define_event_bus, BusEvent};

// Create an isolated, process-wide bus for this example
define_event_bus!(game);

#[derive(Debug)]
struct EnemyDefeated {
    name: String,
    points: u32,
}

#[derive(Debug)]
struct LevelStarted(u32);

fn main() {
    println!("=== typed-event-bus: Basic Usage ===\n");

    game::set_trace_callback(|event: &BusEvent| println!("   [trace] {event}"));

    // -------------------------------------------------------------------------
    // 1. Subscribe
    // -------------------------------------------------------------------------
    println!("1. Subscribing handlers...");

    game::subscribe(|level: &LevelStarted| println!("   HUD: level {} started", level.0));
    let announcer = game::subscribe(|e: &EnemyDefeated| println!("   Announcer: {} is down!", e.name));
    game::subscribe(|e: &EnemyDefeated| println!("   Score: +{}", e.points));

    // -------------------------------------------------------------------------
    // 2. Publish
    // -------------------------------------------------------------------------
    println!("\n2. Publishing...");

    game::publish(LevelStarted(1));
    game::publish(EnemyDefeated {
        name: "Slime".to_string(),
        points: 10,
    });

    // -------------------------------------------------------------------------
    // 3. Unsubscribe
    // -------------------------------------------------------------------------
    println!("\n3. Unsubscribing the announcer...");

    game::unsubscribe(announcer);
    game::publish(EnemyDefeated {
        name: "Bat".to_string(),
        points: 5,
    });

    // -------------------------------------------------------------------------
    // 4. Reset between levels
    // -------------------------------------------------------------------------
    println!("\n4. Level unloaded, resetting every channel...");

    let reset = game::reset_all();
    println!("   Reset {reset} channel(s)");

    let invoked = game::publish(LevelStarted(2));
    println!("   Handlers invoked after reset: {invoked}");

    game::clear_trace_callback();
    println!("\n=== Example completed successfully! ===");
}
