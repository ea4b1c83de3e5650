mod adapter;
mod executor;
mod poller;

pub use adapter::{AdapterSettings, LiftAdapter};
pub use poller::PollingState;
