use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    ChannelLock,
    ChannelsLock,
    RegistryLock,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::ChannelLock => write!(f, "Failed to acquire channel lock"),
            BusError::ChannelsLock => write!(f, "Failed to acquire channel map lock"),
            BusError::RegistryLock => write!(f, "Failed to acquire registry lock"),
        }
    }
}

impl std::error::Error for BusError {}
