use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;

/// Fields the caller fills in before triggering a command transaction.
///
/// Like [`super::DeviceState`] the schema is fixed; the server wrapper
/// writes fields by their published names through [`Self::set_field`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PendingCommand {
    #[serde(rename = "Machine")]
    pub machine: i64,
    #[serde(rename = "Exit_Group")]
    pub exit_group: i64,
    #[serde(rename = "Request_ID")]
    pub request_id: i64,
    #[serde(rename = "TRAY")]
    pub tray: i64,
    #[serde(rename = "POSITION")]
    pub position: i64,
    #[serde(rename = "COMMAND")]
    pub command: String,
}

impl PendingCommand {
    /// Zero/empty-initialized command with addressing fields seeded
    pub fn new(machine: i64, exit_group: i64, request_id: i64) -> Self {
        Self {
            machine,
            exit_group,
            request_id,
            ..Self::default()
        }
    }

    /// Set a field by its published name. Unknown names and wrongly typed
    /// values are rejected; the schema is not discovered at runtime.
    pub fn set_field(&mut self, name: &str, value: Value) -> Result<(), AdapterError> {
        match name {
            "COMMAND" => {
                let s = value
                    .as_str()
                    .ok_or_else(|| type_error(name, "string", &value))?;
                self.command = s.to_string();
            }
            "Machine" => self.machine = as_integer(name, &value)?,
            "Exit_Group" => self.exit_group = as_integer(name, &value)?,
            "Request_ID" => self.request_id = as_integer(name, &value)?,
            "TRAY" => self.tray = as_integer(name, &value)?,
            "POSITION" => self.position = as_integer(name, &value)?,
            other => return Err(AdapterError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn as_integer(name: &str, value: &Value) -> Result<i64, AdapterError> {
    value
        .as_i64()
        .ok_or_else(|| type_error(name, "integer", value))
}

fn type_error(name: &str, expected: &str, value: &Value) -> AdapterError {
    AdapterError::InvalidConfig(format!(
        "Field {} expects an {} value, got {}",
        name, expected, value
    ))
}
