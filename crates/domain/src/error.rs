use thiserror::Error;

/// Adapter-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Connection failed after {attempts} attempts: {reason}")]
    ConnectionExhausted { attempts: u32, reason: String },

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Connect cancelled")]
    Cancelled,

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Device reported error: {0}")]
    DeviceFault(String),

    #[error("No reply from device")]
    NoReply,

    #[error("Unrecognized command: {0}")]
    BadCommand(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Poller is already running")]
    PollerAlreadyRunning,
}

pub type Result<T> = std::result::Result<T, AdapterError>;
