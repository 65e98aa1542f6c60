//! Per-payload-type event channel.
//!
//! An [`EventChannel<T>`] keeps an ordered list of handlers for values of type `T`.
//! Publishing invokes every handler on the calling thread, in subscription order.
//!
//! The handler list is guarded by a mutex, but [`EventChannel::publish`] never holds
//! that lock while a handler runs: it takes a snapshot of the list first. A handler may
//! therefore subscribe, unsubscribe, publish or reset from inside its own invocation;
//! such changes apply to the next publish, never to the one in progress.

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use crate::{BusError, ChannelRegistry};

/// A subscribed handler. Wrap a closure in an `Arc` yourself (and keep a clone) when
/// you want to remove it later by identity with `unsubscribe_handler`.
pub type Handler<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Process-wide, so a token from a channel that was reset never matches a handler of
/// the channel that replaced it.
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Token returned by `subscribe`, required by `unsubscribe`.
///
/// The payload type is part of the token, so `unsubscribe` always targets the right channel.
pub struct Subscription<T> {
    id: u64,
    _event: PhantomData<fn(&T)>,
}

impl<T> Subscription<T> {
    fn next() -> Self {
        Self {
            id: NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed),
            _event: PhantomData,
        }
    }

    /// Raw numeric id, unique for the lifetime of the process.
    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls: derives would needlessly require the same traits on `T`.
impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Subscription<T> {}

impl<T> PartialEq for Subscription<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Subscription<T> {}

impl<T> Hash for Subscription<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("type_name", &type_name::<T>())
            .field("id", &self.id)
            .finish()
    }
}

/// Type-erased view of a channel, as tracked by [`ChannelRegistry`].
pub trait ResetChannel: Send + Sync {
    /// Drop every handler and retire the instance. Idempotent.
    fn reset(&self);

    /// Name of the payload type, for tracing.
    fn type_name(&self) -> &'static str;

    /// Whether `reset` has been called on this instance.
    fn is_retired(&self) -> bool;
}

struct ChannelState<T> {
    subscribers: Vec<(u64, Handler<T>)>,
    registered: bool,
}

/// Ordered set of handlers for payload type `T`.
///
/// Usually reached through [`EventBus`](crate::EventBus), which keeps exactly one live
/// channel per `T`. A channel registers itself with a [`ChannelRegistry`] on its first
/// subscription and stays registered, even once empty, until it is reset.
pub struct EventChannel<T> {
    state: Mutex<ChannelState<T>>,
    retired: AtomicBool,
}

impl<T: 'static> EventChannel<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState {
                subscribers: Vec::new(),
                registered: false,
            }),
            retired: AtomicBool::new(false),
        }
    }

    /// Append `handler` to the channel.
    ///
    /// On the first subscription since creation (or since the last reset) the channel
    /// registers itself with `registry` before the handler is added.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use typed_event_bus::{ChannelRegistry, EventChannel};
    ///
    /// let registry = ChannelRegistry::new();
    /// let channel = Arc::new(EventChannel::<u32>::new());
    ///
    /// channel.subscribe(&registry, |n| assert_eq!(*n, 7));
    /// assert_eq!(channel.publish(&7), 1);
    /// assert_eq!(registry.len().unwrap(), 1);
    /// ```
    pub fn subscribe(
        self: &Arc<Self>,
        registry: &ChannelRegistry,
        handler: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription<T> {
        self.subscribe_arc(registry, Arc::new(handler))
    }

    /// Like [`subscribe`](Self::subscribe), for a handler that is already shared.
    pub fn subscribe_arc(self: &Arc<Self>, registry: &ChannelRegistry, handler: Handler<T>) -> Subscription<T> {
        self.attach(registry, handler).subscription
    }

    pub(crate) fn attach(self: &Arc<Self>, registry: &ChannelRegistry, handler: Handler<T>) -> Attached<T> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        self.push(&mut state, registry, handler)
    }

    /// Like `attach`, but refuses a retired channel so the caller can retry on its replacement.
    pub(crate) fn attach_live(
        self: &Arc<Self>,
        registry: &ChannelRegistry,
        handler: Handler<T>,
    ) -> Option<Attached<T>> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if self.is_retired() {
            return None;
        }
        Some(self.push(&mut state, registry, handler))
    }

    fn push(
        self: &Arc<Self>,
        state: &mut ChannelState<T>,
        registry: &ChannelRegistry,
        handler: Handler<T>,
    ) -> Attached<T> {
        let subscription = Subscription::next();

        // The registry never locks a channel while holding its own lock, so nesting is safe.
        // A retired channel reused on its own keeps its handlers but is no longer tracked.
        let newly_registered = if state.registered || self.is_retired() {
            false
        } else {
            state.registered = true;
            registry.register(self)
        };

        state.subscribers.push((subscription.id, handler));

        Attached {
            subscription,
            newly_registered,
            subscribers: state.subscribers.len(),
        }
    }

    /// Remove the handler added under `subscription`.
    ///
    /// Returns `false` (and changes nothing) if it is not present. The channel stays
    /// registered even when this removes its last handler.
    pub fn unsubscribe(&self, subscription: Subscription<T>) -> bool {
        self.detach(|id, _| id == subscription.id)
    }

    /// Remove the first subscribed entry that is the very same `Arc` as `handler`.
    pub fn unsubscribe_handler(&self, handler: &Handler<T>) -> bool {
        self.detach(|_, subscribed| Arc::ptr_eq(subscribed, handler))
    }

    fn detach(&self, matches: impl Fn(u64, &Handler<T>) -> bool) -> bool {
        let removed = {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            let index = state
                .subscribers
                .iter()
                .position(|(id, handler)| matches(*id, handler));
            index.map(|index| state.subscribers.remove(index))
        };

        // Handler dropped here, outside the lock.
        removed.is_some()
    }

    /// Invoke every current handler with `value`, in subscription order.
    ///
    /// Returns the number of handlers invoked. A panicking handler is not caught: the
    /// panic reaches the caller and the remaining handlers are skipped for this call.
    pub fn publish(&self, value: &T) -> usize {
        let snapshot: Vec<Handler<T>> = {
            let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state.subscribers.iter().map(|(_, handler)| handler.clone()).collect()
        };

        for handler in &snapshot {
            handler(value);
        }

        snapshot.len()
    }

    /// Drop every handler, forget the registration and retire this instance.
    ///
    /// A retired channel is replaced by a fresh one the next time its bus is asked for `T`.
    pub fn reset(&self) {
        let dropped = {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state.registered = false;
            self.retired.store(true, Ordering::Release);
            std::mem::take(&mut state.subscribers)
        };

        debug!(
            "reset channel for {} ({} handler(s) dropped)",
            type_name::<T>(),
            dropped.len()
        );
    }

    pub fn subscriber_count(&self) -> Result<usize, BusError> {
        self.state
            .lock()
            .map(|state| state.subscribers.len())
            .map_err(|_| BusError::ChannelLock)
    }

    /// Whether the channel is tracked by a registry, i.e. had a subscriber since its last reset.
    pub fn is_registered(&self) -> Result<bool, BusError> {
        self.state
            .lock()
            .map(|state| state.registered)
            .map_err(|_| BusError::ChannelLock)
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

impl<T: 'static> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ResetChannel for EventChannel<T> {
    fn reset(&self) {
        EventChannel::reset(self);
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn is_retired(&self) -> bool {
        EventChannel::is_retired(self)
    }
}

impl<T: 'static> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f.debug_struct("EventChannel")
            .field("type_name", &type_name::<T>())
            .field("subscribers", &state.subscribers.len())
            .field("registered", &state.registered)
            .field("retired", &self.is_retired())
            .finish()
    }
}

/// Outcome of a subscription, for the bus to trace.
pub(crate) struct Attached<T> {
    pub(crate) subscription: Subscription<T>,
    pub(crate) newly_registered: bool,
    pub(crate) subscribers: usize,
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
