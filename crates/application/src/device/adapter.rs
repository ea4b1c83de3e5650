use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use domain::driver::{ConnectionState, DeviceTransport};
use domain::{AdapterError, DeviceState, PendingCommand};

use super::executor;
use super::poller::{self, PollingState, SharedDeviceState, SharedTransport, StatusPoller};

/// Adapter tuning and addressing seeds
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub machine: i64,
    pub exit_group: i64,
    pub request_id: i64,
    pub poll_interval_ms: u64,
    pub command_settle_ms: u64,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            machine: 1,
            exit_group: 1,
            request_id: 2000,
            poll_interval_ms: 500,
            command_settle_ms: 100,
        }
    }
}

/// The device adapter the server wrapper drives.
///
/// Owns the transport behind a transaction mutex shared by the status
/// poller and the command executor, plus the two state containers the
/// wrapper reads (`DeviceState`) and writes (`PendingCommand`).
pub struct LiftAdapter {
    transport: SharedTransport,
    state: SharedDeviceState,
    pending: Arc<RwLock<PendingCommand>>,
    polling_state: Arc<RwLock<PollingState>>,
    poller: Mutex<Option<StatusPoller>>,
    settings: AdapterSettings,
}

impl LiftAdapter {
    pub fn new(transport: Box<dyn DeviceTransport>, settings: AdapterSettings) -> Self {
        let state = DeviceState::new(settings.machine, settings.exit_group, settings.request_id);
        let pending =
            PendingCommand::new(settings.machine, settings.exit_group, settings.request_id);
        Self {
            transport: Arc::new(Mutex::new(transport)),
            state: Arc::new(RwLock::new(state)),
            pending: Arc::new(RwLock::new(pending)),
            polling_state: Arc::new(RwLock::new(PollingState::Stopped)),
            poller: Mutex::new(None),
            settings,
        }
    }

    /// Open the device connection (bounded retry inside the transport)
    pub async fn connect(&self) -> Result<(), AdapterError> {
        self.transport.lock().await.connect().await
    }

    pub async fn disconnect(&self) -> Result<(), AdapterError> {
        self.transport.lock().await.disconnect().await
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.transport.lock().await.connection_state()
    }

    /// Start the background status poller. Starting while one is running is
    /// refused; restarting after a stop or fault reaps the old task first.
    pub async fn start_polling(&self) -> Result<(), AdapterError> {
        let mut slot = self.poller.lock().await;
        if *self.polling_state.read().await == PollingState::Running {
            return Err(AdapterError::PollerAlreadyRunning);
        }
        if let Some(old) = slot.take() {
            old.cancel.cancel();
            let _ = old.join.await;
        }

        *self.polling_state.write().await = PollingState::Running;
        *slot = Some(poller::spawn(
            self.transport.clone(),
            self.state.clone(),
            self.polling_state.clone(),
            Duration::from_millis(self.settings.poll_interval_ms),
        ));
        info!("Polling started");
        Ok(())
    }

    /// Stop the poller and wait for the loop to fully exit. Idempotent:
    /// stopping an already-stopped adapter is a no-op.
    pub async fn stop_polling(&self) {
        let mut slot = self.poller.lock().await;
        if let Some(poller) = slot.take() {
            poller.cancel.cancel();
            let _ = poller.join.await;
            info!("Polling stopped");
        }
        *self.polling_state.write().await = PollingState::Stopped;
    }

    pub async fn polling_state(&self) -> PollingState {
        *self.polling_state.read().await
    }

    /// Execute the command currently described by [`PendingCommand`]
    pub async fn execute_command(&self) -> Result<(), AdapterError> {
        executor::execute(
            &self.transport,
            &self.state,
            &self.pending,
            Duration::from_millis(self.settings.command_settle_ms),
        )
        .await
    }

    /// Snapshot of the last-known device state
    pub async fn device_state(&self) -> DeviceState {
        self.state.read().await.clone()
    }

    /// Device state as the name -> value map the server layer publishes
    pub async fn variables(&self) -> Map<String, Value> {
        self.state.read().await.variables()
    }

    /// Write one pending-command field by its published name
    pub async fn set_command_field(&self, name: &str, value: Value) -> Result<(), AdapterError> {
        self.pending.write().await.set_field(name, value)
    }

    pub async fn pending_command(&self) -> PendingCommand {
        self.pending.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AdapterSettings::default();
        assert_eq!(settings.machine, 1);
        assert_eq!(settings.exit_group, 1);
        assert_eq!(settings.request_id, 2000);
        assert_eq!(settings.poll_interval_ms, 500);
        assert_eq!(settings.command_settle_ms, 100);
    }
}
