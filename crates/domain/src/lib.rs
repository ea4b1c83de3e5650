//! Domain layer - protocol and state types for the vertical-lift adapter
//!
//! This crate contains:
//! - The wire protocol (frame codec, command set, reply schemas)
//! - State containers (DeviceState, PendingCommand)
//! - The transport seam (DeviceTransport trait, ConnectionState)
//!
//! Principles:
//! - No I/O; transports live in infrastructure
//! - Fixed, statically typed field schemas
//! - Reply parsing fails closed on unexpected token counts

pub mod driver;
pub mod error;
pub mod protocol;
pub mod state;

// Re-export commonly used types
pub use error::AdapterError;
pub use protocol::{CommandReply, LiftCommand, StatusReply};
pub use state::{DeviceState, PendingCommand};
