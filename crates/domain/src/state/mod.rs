mod device_state;
mod pending_command;

pub use device_state::DeviceState;
pub use pending_command::PendingCommand;

/// ERROR field value after a successful command transaction
pub const NO_ERROR: &str = "NO ERROR";

/// ERROR field sentinel for an unrecognized COMMAND value
pub const BAD_COMMAND: &str = "BAD_COMMAND";

/// ERROR field value when a command reply never arrived
pub const NO_REPLY: &str = "NO REPLY";
