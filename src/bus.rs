//! Type-keyed event bus.
//!
//! An [`EventBus`] owns one lazily created [`EventChannel<T>`] per payload type `T` and
//! the [`ChannelRegistry`] those channels join on their first subscription. It is the
//! object a host application creates once and passes around (or declares process-wide
//! with [`define_event_bus!`](crate::define_event_bus)).
//!
//! # Examples
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use typed_event_bus::EventBus;
//!
//! let bus = EventBus::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//!
//! let token = bus.subscribe(move |n: &i32| sink.lock().unwrap().push(*n));
//! bus.publish(5);
//! bus.unsubscribe(token);
//! bus.publish(7);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![5]);
//! ```

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex},
};

use log::trace;

use crate::{BusError, BusEvent, ChannelRegistry, EventChannel, Handler, ResetChannel, Subscription};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `BusEvent` every time the bus is interacted
/// with. It must be thread-safe because a bus is usually shared.
pub type TraceCallback = dyn Fn(&BusEvent) + Send + Sync + 'static;

/// One arena entry: the same channel, once for downcasting and once type-erased.
struct ChannelSlot {
    any: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ResetChannel>,
}

/// Owns the per-type channels and the registry that resets them.
pub struct EventBus {
    channels: Mutex<HashMap<TypeId, ChannelSlot>>,
    registry: ChannelRegistry,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            registry: ChannelRegistry::new(),
            trace: Mutex::new(None),
        }
    }

    /// The registry tracking this bus's subscribed channels.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback that will be invoked on every bus interaction.
    ///
    /// The callback is cloned out of its lock before it runs, so it may use this bus.
    ///
    /// # Example
    /// ```rust
    /// use typed_event_bus::EventBus;
    ///
    /// let bus = EventBus::new();
    /// bus.set_trace_callback(|event| println!("[bus-trace] {event}"));
    /// ```
    pub fn set_trace_callback(&self, callback: impl Fn(&BusEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clears the tracing callback (disables bus tracing).
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: BusEvent) {
        let callback = self.trace.lock().unwrap_or_else(|p| p.into_inner()).clone();
        if let Some(callback) = callback {
            callback(&event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Channels
    // -------------------------------------------------------------------------------------------------

    /// The live channel for `T`, created on first access.
    ///
    /// A channel retired by a reset is replaced by a fresh, empty and unregistered one.
    pub fn channel<T: 'static>(&self) -> Arc<EventChannel<T>> {
        let mut channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());

        if let Some(existing) = lookup::<T>(&channels) {
            if !existing.is_retired() {
                return existing;
            }
        }

        let fresh = Arc::new(EventChannel::<T>::new());
        channels.insert(
            TypeId::of::<T>(),
            ChannelSlot {
                any: fresh.clone(),
                erased: fresh.clone(),
            },
        );
        fresh
    }

    /// The live channel for `T`, without creating one.
    fn existing<T: 'static>(&self) -> Result<Option<Arc<EventChannel<T>>>, BusError> {
        let channels = self.channels.lock().map_err(|_| BusError::ChannelsLock)?;
        Ok(lookup::<T>(&channels).filter(|channel| !channel.is_retired()))
    }

    /// Subscribe `handler` to events of type `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_event_bus::EventBus;
    ///
    /// let bus = EventBus::new();
    /// bus.subscribe(|name: &String| println!("hello, {name}"));
    /// assert_eq!(bus.publish("world".to_string()), 1);
    /// ```
    pub fn subscribe<T: 'static>(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription<T> {
        self.subscribe_arc(Arc::new(handler))
    }

    /// Subscribe an already shared handler; keep a clone to remove it with
    /// [`unsubscribe_handler`](Self::unsubscribe_handler).
    pub fn subscribe_arc<T: 'static>(&self, handler: Handler<T>) -> Subscription<T> {
        // A concurrent reset may retire the channel between lookup and attach.
        let attached = loop {
            if let Some(attached) = self.channel::<T>().attach_live(&self.registry, handler.clone()) {
                break attached;
            }
        };

        if attached.newly_registered {
            self.emit_event(BusEvent::Register {
                type_name: type_name::<T>(),
            });
        }

        trace!(
            "subscribed to {} ({} handler(s))",
            type_name::<T>(),
            attached.subscribers
        );
        self.emit_event(BusEvent::Subscribe {
            type_name: type_name::<T>(),
            subscribers: attached.subscribers,
        });

        attached.subscription
    }

    /// Remove the handler registered under `subscription`. Unknown tokens are a no-op.
    pub fn unsubscribe<T: 'static>(&self, subscription: Subscription<T>) -> bool {
        let removed = self
            .live::<T>()
            .is_some_and(|channel| channel.unsubscribe(subscription));
        self.traced_unsubscribe::<T>(removed)
    }

    /// Remove the first subscription of this exact `Arc` handler. Unknown handlers are a no-op.
    pub fn unsubscribe_handler<T: 'static>(&self, handler: &Handler<T>) -> bool {
        let removed = self
            .live::<T>()
            .is_some_and(|channel| channel.unsubscribe_handler(handler));
        self.traced_unsubscribe::<T>(removed)
    }

    fn traced_unsubscribe<T: 'static>(&self, removed: bool) -> bool {
        trace!("unsubscribe from {} (removed: {removed})", type_name::<T>());
        self.emit_event(BusEvent::Unsubscribe {
            type_name: type_name::<T>(),
            removed,
        });
        removed
    }

    /// Like `existing`, recovering a poisoned arena lock.
    fn live<T: 'static>(&self) -> Option<Arc<EventChannel<T>>> {
        let channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
        lookup::<T>(&channels).filter(|channel| !channel.is_retired())
    }

    /// Invoke every handler subscribed to `T`, in subscription order, on this thread.
    ///
    /// Returns how many handlers ran. Handler panics propagate to the caller and skip
    /// the handlers after the one that panicked.
    pub fn publish<T: 'static>(&self, value: T) -> usize {
        let invoked = self.channel::<T>().publish(&value);

        trace!("published {} to {invoked} handler(s)", type_name::<T>());
        self.emit_event(BusEvent::Publish {
            type_name: type_name::<T>(),
            subscribers: invoked,
        });
        invoked
    }

    /// Reset only the channel for `T`. Returns `false` if there was no live channel.
    pub fn reset<T: 'static>(&self) -> bool {
        let removed = self
            .channels
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&TypeId::of::<T>());

        let Some(slot) = removed else {
            return false;
        };
        if slot.erased.is_retired() {
            return false;
        }

        slot.erased.reset();
        self.emit_event(BusEvent::Reset {
            type_name: type_name::<T>(),
        });
        true
    }

    /// Reset every channel that had a subscriber since the last reset, and empty the registry.
    ///
    /// Returns the number of channels reset. Calling this with nothing registered is a no-op.
    pub fn reset_all(&self) -> usize {
        let reset = self.registry.reset_all();

        self.channels
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .retain(|_, slot| !slot.erased.is_retired());

        self.emit_event(BusEvent::ResetAll { channels: reset });
        reset
    }

    // -------------------------------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------------------------------

    /// Whether the channel for `T` is registered, i.e. had a subscriber since the last reset.
    pub fn contains<T: 'static>(&self) -> Result<bool, BusError> {
        match self.existing::<T>()? {
            Some(channel) => channel.is_registered(),
            None => Ok(false),
        }
    }

    /// Number of handlers currently subscribed to `T`.
    pub fn subscriber_count<T: 'static>(&self) -> Result<usize, BusError> {
        match self.existing::<T>()? {
            Some(channel) => channel.subscriber_count(),
            None => Ok(0),
        }
    }

    /// Number of channels the registry would reset right now.
    pub fn registered_channels(&self) -> Result<usize, BusError> {
        self.registry.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
        let names: Vec<&'static str> = channels.values().map(|slot| slot.erased.type_name()).collect();
        f.debug_struct("EventBus")
            .field("channels", &names)
            .field("registry", &self.registry)
            .finish()
    }
}

fn lookup<T: 'static>(channels: &HashMap<TypeId, ChannelSlot>) -> Option<Arc<EventChannel<T>>> {
    channels
        .get(&TypeId::of::<T>())
        .and_then(|slot| slot.any.clone().downcast::<EventChannel<T>>().ok())
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
