use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use domain::AdapterError;
use domain::driver::{ConnectionState, DeviceTransport};
use domain::protocol::{LiftCommand, frame};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Machine status code reported in every status reply (1 = ready)
    #[serde(default = "default_status")]
    pub status: i64,
    #[serde(default)]
    pub pos1_pick_tray: i64,
    #[serde(default)]
    pub pos2_pick_tray: i64,
    /// When set, every request is answered with this bare error token
    #[serde(default)]
    pub fault: Option<String>,
}

fn default_status() -> i64 {
    1
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            pos1_pick_tray: 0,
            pos2_pick_tray: 0,
            fault: None,
        }
    }
}

/// In-process lift emulator for tests and bring-up.
///
/// Keeps two pick-tray registers, answers STATUS with their contents and
/// executes CALL/RETURN against them. Each write queues exactly one reply
/// for the next read, mirroring the request/response discipline of the real
/// controller.
pub struct SimulatorTransport {
    config: SimulatorConfig,
    connected: bool,
    pick_trays: [i64; 2],
    exe_trays: [i64; 2],
    queued_reply: Option<Vec<u8>>,
}

impl SimulatorTransport {
    pub fn new(config: SimulatorConfig) -> Self {
        let pick_trays = [config.pos1_pick_tray, config.pos2_pick_tray];
        Self {
            config,
            connected: false,
            pick_trays,
            exe_trays: [0, 0],
            queued_reply: None,
        }
    }

    /// Make every subsequent request fail with the given device error
    pub fn inject_fault(&mut self, fault: &str) {
        self.config.fault = Some(fault.to_string());
    }

    pub fn clear_fault(&mut self) {
        self.config.fault = None;
    }

    fn handle_request(&mut self, tokens: &[String]) -> Result<Vec<u8>, AdapterError> {
        if let Some(fault) = &self.config.fault {
            return frame::encode(std::slice::from_ref(fault));
        }
        if tokens.len() < 3 {
            return frame::encode(&["INVALID_REQUEST".to_string()]);
        }

        let prefix = tokens[0].clone();
        let request_id = tokens[1].clone();
        let command = match LiftCommand::parse(&tokens[2]) {
            Ok(cmd) => cmd,
            Err(_) => return frame::encode(&["INVALID_REQUEST".to_string()]),
        };

        match command {
            LiftCommand::Status => frame::encode(&[
                prefix,
                request_id,
                "STATUS".to_string(),
                self.config.status.to_string(),
                self.pick_trays[0].to_string(),
                self.pick_trays[1].to_string(),
                self.exe_trays[0].to_string(),
                self.exe_trays[1].to_string(),
            ]),
            LiftCommand::Call => {
                let result = match (token_as_int(tokens, 3), token_as_int(tokens, 4)) {
                    (Some(tray), Some(position @ 1..=2)) => {
                        self.pick_trays[(position - 1) as usize] = tray;
                        0
                    }
                    _ => 1,
                };
                frame::encode(&[prefix, request_id, "CALL".to_string(), result.to_string()])
            }
            LiftCommand::Return => {
                let result = match token_as_int(tokens, 3) {
                    Some(position @ 1..=2) => {
                        self.pick_trays[(position - 1) as usize] = 0;
                        0
                    }
                    _ => 1,
                };
                frame::encode(&[prefix, request_id, "RETURN".to_string(), result.to_string()])
            }
        }
    }
}

fn token_as_int(tokens: &[String], index: usize) -> Option<i64> {
    tokens.get(index).and_then(|t| t.parse().ok())
}

#[async_trait]
impl DeviceTransport for SimulatorTransport {
    async fn connect(&mut self) -> Result<(), AdapterError> {
        self.connected = true;
        tracing::info!(config = ?self.config, "Simulator connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), AdapterError> {
        self.connected = false;
        self.queued_reply = None;
        tracing::info!("Simulator disconnected");
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, AdapterError> {
        if !self.connected {
            return Err(AdapterError::NotConnected);
        }
        Ok(self.queued_reply.take())
    }

    async fn write(&mut self, raw: &[u8]) -> Result<(), AdapterError> {
        if !self.connected {
            return Err(AdapterError::NotConnected);
        }
        let tokens = frame::decode(raw)?;
        self.queued_reply = Some(self.handle_request(&tokens)?);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connection_state(&self) -> ConnectionState {
        if self.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    fn transport_type(&self) -> &str {
        "Simulator"
    }
}
