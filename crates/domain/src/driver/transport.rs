use async_trait::async_trait;

use super::connection_state::ConnectionState;
use crate::error::AdapterError;

/// Byte pipe over the persistent device connection.
///
/// The transport does not interpret payloads; framing and schema validation
/// live in [`crate::protocol`]. One transport instance backs both the status
/// poller and the command executor, so callers must hold their own
/// transaction lock across each write+read pair (replies carry no
/// correlation id and would otherwise be misattributed).
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Establish the connection to the device
    async fn connect(&mut self) -> Result<(), AdapterError>;

    /// Close the connection
    async fn disconnect(&mut self) -> Result<(), AdapterError>;

    /// Read whatever bytes are available within the transport's bounded
    /// wait. `Ok(None)` means the wait elapsed with nothing to read and the
    /// connection is still usable.
    async fn read(&mut self) -> Result<Option<Vec<u8>>, AdapterError>;

    /// Send a fully-formed frame
    async fn write(&mut self, frame: &[u8]) -> Result<(), AdapterError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get current connection state
    fn connection_state(&self) -> ConnectionState;

    /// Get transport type identifier
    fn transport_type(&self) -> &str;
}
