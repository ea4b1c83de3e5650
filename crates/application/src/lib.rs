//! Application layer - adapter lifecycle, status polling and command execution

pub mod device;

pub use device::{AdapterSettings, LiftAdapter, PollingState};
