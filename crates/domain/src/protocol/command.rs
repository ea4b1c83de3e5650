use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// The fixed set of operations the lift understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiftCommand {
    /// Query machine status and tray positions
    Status,
    /// Call a tray to an operator bay position
    Call,
    /// Return the tray at a bay position to storage
    Return,
}

impl LiftCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "STATUS",
            Self::Call => "CALL",
            Self::Return => "RETURN",
        }
    }

    /// Parse a command name. Matching is exact; anything outside the fixed
    /// set is a caller error.
    pub fn parse(s: &str) -> Result<Self, AdapterError> {
        match s {
            "STATUS" => Ok(Self::Status),
            "CALL" => Ok(Self::Call),
            "RETURN" => Ok(Self::Return),
            other => Err(AdapterError::BadCommand(other.to_string())),
        }
    }
}
