//! # Typed Event Bus
//!
//! In-process, type-indexed publish/subscribe. For any payload type `T`, callers subscribe
//! handlers to "events of type `T`" and publish values of `T` to invoke them synchronously,
//! in subscription order, on the publishing thread.
//!
//! Every channel that receives a subscription joins a registry, so all of them can be
//! reset with one call between application phases (scene reloads, request ends, teardown).
//!
//! ## Quick Start
//!
//! ```rust
//! use typed_event_bus::EventBus;
//!
//! #[derive(Debug)]
//! struct LevelLoaded(u32);
//!
//! let bus = EventBus::new();
//! bus.subscribe(|level: &LevelLoaded| println!("entered level {}", level.0));
//! assert_eq!(bus.publish(LevelLoaded(1)), 1);
//!
//! // Next phase: every handler, for every type, is gone.
//! bus.reset_all();
//! assert_eq!(bus.publish(LevelLoaded(2)), 0);
//! ```
//!
//! ## Features
//!
//! - **Type-indexed**: one lazily created channel per payload type
//! - **Thread-safe**: channels and registry are mutex-guarded; handlers run without any lock held
//! - **Re-entrant**: handlers may subscribe, unsubscribe, publish or reset while being invoked
//! - **Tracing support**: optional callback receiving a [`BusEvent`] for every operation,
//!   plus `log` records at `debug`/`trace` level
//!
//! ## Main Items
//!
//! - [`EventBus`] - owns the per-type channels and their registry
//! - [`define_event_bus!`] - declares an isolated, process-wide bus with free functions
//! - [`EventChannel`] - the handler list for one payload type
//! - [`ChannelRegistry`] - resets every subscribed channel at once

mod bus;
mod bus_error;
mod bus_event;
mod channel;
mod channel_registry;
mod macros;

pub use bus::{EventBus, TraceCallback};
pub use bus_error::BusError;
pub use bus_event::BusEvent;
pub use channel::{EventChannel, Handler, ResetChannel, Subscription};
pub use channel_registry::ChannelRegistry;
