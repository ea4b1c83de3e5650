use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::NO_ERROR;
use crate::protocol::{CommandReply, StatusReply};

/// Last-known values reported by the lift.
///
/// The schema is fixed per device profile; serde names match the variables
/// the server wrapper publishes. The status decode path owns the addressing,
/// STATUS and tray fields; the command decode path owns RESULT; ERROR is
/// written by whichever path last failed (or cleared on command success).
/// Updates are group-atomic: a failed decode never half-applies a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceState {
    #[serde(rename = "Machine")]
    pub machine: i64,
    #[serde(rename = "Exit_Group")]
    pub exit_group: i64,
    #[serde(rename = "Request_ID")]
    pub request_id: i64,
    #[serde(rename = "STATUS")]
    pub status: i64,
    #[serde(rename = "POS1PICKTRAY")]
    pub pos1_pick_tray: i64,
    #[serde(rename = "POS2PICKTRAY")]
    pub pos2_pick_tray: i64,
    #[serde(rename = "POS1EXETRAY")]
    pub pos1_exe_tray: i64,
    #[serde(rename = "POS2EXETRAY")]
    pub pos2_exe_tray: i64,
    #[serde(rename = "RESULT")]
    pub result: i64,
    #[serde(rename = "ERROR")]
    pub error: String,
    #[serde(rename = "LAST_UPDATE")]
    pub last_update: Option<DateTime<Utc>>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            machine: 0,
            exit_group: 0,
            request_id: 0,
            status: 0,
            pos1_pick_tray: 0,
            pos2_pick_tray: 0,
            pos1_exe_tray: 0,
            pos2_exe_tray: 0,
            result: 0,
            error: String::new(),
            last_update: None,
        }
    }
}

impl DeviceState {
    /// Zero/empty-initialized state with addressing fields seeded
    pub fn new(machine: i64, exit_group: i64, request_id: i64) -> Self {
        Self {
            machine,
            exit_group,
            request_id,
            ..Self::default()
        }
    }

    /// Apply a full status reply as one group
    pub fn apply_status(&mut self, reply: &StatusReply) {
        self.machine = reply.machine;
        self.exit_group = reply.exit_group;
        self.request_id = reply.request_id;
        self.status = reply.status;
        self.pos1_pick_tray = reply.pos1_pick_tray;
        self.pos2_pick_tray = reply.pos2_pick_tray;
        self.pos1_exe_tray = reply.pos1_exe_tray;
        self.pos2_exe_tray = reply.pos2_exe_tray;
        self.last_update = Some(Utc::now());
    }

    /// Apply a command reply: record the result code and clear ERROR
    pub fn apply_result(&mut self, reply: &CommandReply) {
        self.result = reply.result;
        self.error = NO_ERROR.to_string();
    }

    /// Record a fault without touching any other field
    pub fn record_error(&mut self, message: &str) {
        self.error = message.to_string();
    }

    /// Export as a name -> value map for the server layer
    pub fn variables(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
