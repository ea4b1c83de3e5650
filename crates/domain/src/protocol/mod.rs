//! The lift's pipe-delimited line protocol.
//!
//! Frame layout: `<prefix>|<request_id>|<command>|<args...>` terminated by
//! `\n\r`, where the prefix is the machine number concatenated with a single
//! exit-group digit.

mod command;
pub mod frame;
mod reply;

pub use command::LiftCommand;
pub use reply::{CommandReply, StatusReply, build_prefix, split_prefix};
