use serde::{Deserialize, Serialize};

/// Connection state of a device transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// Not connected, no active connection attempt
    #[default]
    Disconnected,
    /// Connect-retry loop in progress
    Connecting,
    /// Successfully connected and operational
    Connected,
    /// Connection is unusable; requires an explicit reconnect
    Failed,
}

impl ConnectionState {
    /// Check if a connection attempt may be started from this state
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed)
    }

    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if manual intervention is required
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}
