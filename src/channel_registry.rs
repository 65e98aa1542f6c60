//! Tracks every channel that has had a subscriber, so all of them can be reset at once.
//!
//! The registry holds only weak handles: channels are owned by their bus, and a channel
//! that has been dropped is simply skipped (and pruned) by the registry.

use std::sync::{Arc, Mutex, Weak};

use log::debug;

use crate::{BusError, ResetChannel};

/// Set of type-erased channel handles, deduplicated by identity.
pub struct ChannelRegistry {
    channels: Mutex<Vec<Weak<dyn ResetChannel>>>,
}

impl ChannelRegistry {
    pub const fn new() -> Self {
        Self {
            channels: Mutex::new(Vec::new()),
        }
    }

    /// Start tracking `channel`.
    ///
    /// Returns `true` if it was not tracked yet; registering the same instance again is a no-op.
    /// A retired channel is never tracked.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the registry lock is poisoned, this method recovers the inner list and continues.
    /// Insertion is idempotent, so nothing is lost.
    pub fn register<C: ResetChannel + 'static>(&self, channel: &Arc<C>) -> bool {
        if channel.is_retired() {
            return false;
        }

        let handle = Arc::downgrade(channel) as Weak<dyn ResetChannel>;
        let mut channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());

        channels.retain(is_live);
        if channels.iter().any(|tracked| Weak::ptr_eq(tracked, &handle)) {
            return false;
        }

        debug!("tracking channel for {}", channel.type_name());
        channels.push(handle);
        true
    }

    /// Reset every tracked channel that is still alive and not yet retired, then forget them all.
    ///
    /// Returns the number of channels reset. The tracked list is detached before any
    /// channel is touched, so a reset never runs under the registry lock.
    pub fn reset_all(&self) -> usize {
        let tracked = std::mem::take(&mut *self.channels.lock().unwrap_or_else(|p| p.into_inner()));

        let mut reset = 0;
        for channel in tracked
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|channel| !channel.is_retired())
        {
            channel.reset();
            reset += 1;
        }

        debug!("reset {reset} tracked channel(s)");
        reset
    }

    /// Whether `channel` is currently tracked.
    pub fn contains<C: ResetChannel + 'static>(&self, channel: &Arc<C>) -> Result<bool, BusError> {
        if channel.is_retired() {
            return Ok(false);
        }

        let handle = Arc::downgrade(channel) as Weak<dyn ResetChannel>;
        self.channels
            .lock()
            .map(|channels| channels.iter().any(|tracked| Weak::ptr_eq(tracked, &handle)))
            .map_err(|_| BusError::RegistryLock)
    }

    /// Number of tracked channels that are still alive and not retired.
    pub fn len(&self) -> Result<usize, BusError> {
        self.channels
            .lock()
            .map(|channels| channels.iter().filter(|tracked| is_live(tracked)).count())
            .map_err(|_| BusError::RegistryLock)
    }

    pub fn is_empty(&self) -> Result<bool, BusError> {
        self.len().map(|len| len == 0)
    }
}

/// A channel reset on its own (not through `reset_all`) may still be reachable; it no
/// longer counts as tracked.
fn is_live(tracked: &Weak<dyn ResetChannel>) -> bool {
    tracked.upgrade().is_some_and(|channel| !channel.is_retired())
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
        let names: Vec<&'static str> = channels
            .iter()
            .filter_map(Weak::upgrade)
            .map(|channel| channel.type_name())
            .collect();
        f.debug_struct("ChannelRegistry").field("channels", &names).finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
