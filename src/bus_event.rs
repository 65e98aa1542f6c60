/// Events emitted by an [`EventBus`](crate::EventBus) during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use typed_event_bus::BusEvent;
///
/// let event = BusEvent::Publish { type_name: "i32", subscribers: 2 };
/// assert_eq!(event.to_string(), "publish { type_name: i32, subscribers: 2 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A handler was added to a channel.
    Subscribe {
        /// Payload type of the channel (e.g., "i32", "alloc::string::String")
        type_name: &'static str,
        /// Number of handlers after the subscription
        subscribers: usize,
    },

    /// An unsubscribe was requested.
    Unsubscribe {
        type_name: &'static str,
        /// Whether a matching handler was found and removed
        removed: bool,
    },

    /// A value was published.
    Publish {
        type_name: &'static str,
        /// Number of handlers in the snapshot that was invoked
        subscribers: usize,
    },

    /// A channel was tracked by the registry for the first time since its last reset.
    Register { type_name: &'static str },

    /// A single channel was reset.
    Reset { type_name: &'static str },

    /// Every tracked channel was reset.
    ResetAll {
        /// How many live channels were reset
        channels: usize,
    },
}

impl std::fmt::Display for BusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusEvent::Subscribe {
                type_name,
                subscribers,
            } => write!(
                f,
                "subscribe {{ type_name: {type_name}, subscribers: {subscribers} }}"
            ),
            BusEvent::Unsubscribe { type_name, removed } => {
                write!(f, "unsubscribe {{ type_name: {type_name}, removed: {removed} }}")
            }
            BusEvent::Publish {
                type_name,
                subscribers,
            } => write!(
                f,
                "publish {{ type_name: {type_name}, subscribers: {subscribers} }}"
            ),
            BusEvent::Register { type_name } => {
                write!(f, "register {{ type_name: {type_name} }}")
            }
            BusEvent::Reset { type_name } => write!(f, "reset {{ type_name: {type_name} }}"),
            BusEvent::ResetAll { channels } => {
                write!(f, "Resetting {channels} channel(s)")
            }
        }
    }
}
