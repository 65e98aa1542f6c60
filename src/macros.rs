//! Macros for declaring process-wide event buses.
//!
//! This module provides a simple macro-based approach to create isolated,
//! thread-safe event buses backed by a lazily initialized static.

/// Creates a process-wide event bus with a single macro invocation.
///
/// The macro generates a module containing:
/// - A hidden `EventBus` static
/// - A `bus()` accessor for code that wants the `EventBus` itself
/// - Free functions delegating to that bus
///
/// # Examples
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use typed_event_bus::define_event_bus;
///
/// define_event_bus!(game);
///
/// let score = Arc::new(Mutex::new(0));
/// let sink = score.clone();
///
/// game::subscribe(move |points: &u32| *sink.lock().unwrap() += points);
/// game::publish(10u32);
/// game::publish(5u32);
/// assert_eq!(*score.lock().unwrap(), 15);
///
/// // Level change: drop every subscription at once.
/// game::reset_all();
/// game::publish(100u32);
/// assert_eq!(*score.lock().unwrap(), 15);
/// ```
///
/// # Multiple Buses
///
/// Each invocation is completely isolated:
///
/// ```rust
/// use typed_event_bus::define_event_bus;
///
/// define_event_bus!(ui);
/// define_event_bus!(network);
///
/// ui::subscribe(|_: &String| {});
///
/// assert!(ui::contains::<String>().unwrap());
/// assert!(!network::contains::<String>().unwrap());
/// ```
#[macro_export]
macro_rules! define_event_bus {
    ($name:ident) => {
        pub mod $name {
            // Bus instance (module-private)
            static BUS: ::std::sync::LazyLock<$crate::EventBus> =
                ::std::sync::LazyLock::new($crate::EventBus::new);

            /// The bus behind this module's free functions.
            pub fn bus() -> &'static $crate::EventBus {
                &BUS
            }

            /// Subscribe a handler to events of type `T`.
            pub fn subscribe<T: 'static>(
                handler: impl Fn(&T) + Send + Sync + 'static,
            ) -> $crate::Subscription<T> {
                BUS.subscribe(handler)
            }

            /// Subscribe an `Arc`-wrapped handler to events of type `T`.
            pub fn subscribe_arc<T: 'static>(handler: $crate::Handler<T>) -> $crate::Subscription<T> {
                BUS.subscribe_arc(handler)
            }

            /// Remove the handler registered under `subscription`.
            pub fn unsubscribe<T: 'static>(subscription: $crate::Subscription<T>) -> bool {
                BUS.unsubscribe(subscription)
            }

            /// Remove the first subscription of this exact handler.
            pub fn unsubscribe_handler<T: 'static>(handler: &$crate::Handler<T>) -> bool {
                BUS.unsubscribe_handler(handler)
            }

            /// Invoke every handler subscribed to `T`.
            pub fn publish<T: 'static>(value: T) -> usize {
                BUS.publish(value)
            }

            /// Reset only the channel for `T`.
            pub fn reset<T: 'static>() -> bool {
                BUS.reset::<T>()
            }

            /// Reset every registered channel.
            pub fn reset_all() -> usize {
                BUS.reset_all()
            }

            /// Check if the channel for `T` is registered.
            pub fn contains<T: 'static>() -> Result<bool, $crate::BusError> {
                BUS.contains::<T>()
            }

            /// Number of handlers subscribed to `T`.
            pub fn subscriber_count<T: 'static>() -> Result<usize, $crate::BusError> {
                BUS.subscriber_count::<T>()
            }

            /// Number of channels `reset_all` would reset.
            pub fn registered_channels() -> Result<usize, $crate::BusError> {
                BUS.registered_channels()
            }

            /// Set a tracing callback for bus operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::BusEvent) + Send + Sync + 'static) {
                BUS.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                BUS.clear_trace_callback()
            }
        }
    };
}
