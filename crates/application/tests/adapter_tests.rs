use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use serde_json::json;
use tokio::time::sleep;

use application::{AdapterSettings, LiftAdapter, PollingState};
use domain::AdapterError;
use domain::driver::{ConnectionState, DeviceTransport};
use domain::protocol::frame;
use domain::state::{BAD_COMMAND, NO_ERROR};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn fast_settings() -> AdapterSettings {
    AdapterSettings {
        poll_interval_ms: 10,
        command_settle_ms: 1,
        ..AdapterSettings::default()
    }
}

// --- Scripted transport: pairs each write with a canned reply ---

#[derive(Default)]
struct Script {
    status_reply: Option<Vec<u8>>,
    command_reply: Option<Vec<u8>>,
    /// Answers every request regardless of command (device error strings)
    override_reply: Option<Vec<u8>>,
    fail_writes: bool,
    writes: Vec<Vec<u8>>,
    pending: Option<Vec<u8>>,
}

#[derive(Clone)]
struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    fn new(script: Script) -> (Self, Arc<Mutex<Script>>) {
        let shared = Arc::new(Mutex::new(script));
        (
            Self {
                script: shared.clone(),
            },
            shared,
        )
    }
}

#[async_trait]
impl DeviceTransport for ScriptedTransport {
    async fn connect(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, AdapterError> {
        Ok(self.script.lock().unwrap().pending.take())
    }

    async fn write(&mut self, raw: &[u8]) -> Result<(), AdapterError> {
        let mut script = self.script.lock().unwrap();
        if script.fail_writes {
            return Err(AdapterError::ConnectionLost(
                "Simulated write failure".to_string(),
            ));
        }
        script.writes.push(raw.to_vec());

        let tokens = frame::decode(raw)?;
        let reply = if script.override_reply.is_some() {
            script.override_reply.clone()
        } else if tokens.get(2).map(String::as_str) == Some("STATUS") {
            script.status_reply.clone()
        } else {
            script.command_reply.clone()
        };
        script.pending = reply;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Connected
    }

    fn transport_type(&self) -> &str {
        "Scripted"
    }
}

// --- Strict mock: any transport call at all fails the test ---

mock! {
    Transport {}

    #[async_trait]
    impl DeviceTransport for Transport {
        async fn connect(&mut self) -> Result<(), AdapterError>;
        async fn disconnect(&mut self) -> Result<(), AdapterError>;
        async fn read(&mut self) -> Result<Option<Vec<u8>>, AdapterError>;
        async fn write(&mut self, frame: &[u8]) -> Result<(), AdapterError>;
        fn is_connected(&self) -> bool;
        fn connection_state(&self) -> ConnectionState;
        fn transport_type(&self) -> &'static str;
    }
}

#[tokio::test]
async fn test_bad_command_never_touches_transport() {
    // No expectations configured: any transport call panics the test
    let adapter = LiftAdapter::new(Box::new(MockTransport::new()), fast_settings());
    adapter
        .set_command_field("COMMAND", json!("DELIVER"))
        .await
        .unwrap();

    let err = adapter.execute_command().await.unwrap_err();
    assert_eq!(err, AdapterError::BadCommand("DELIVER".to_string()));
    assert_eq!(adapter.device_state().await.error, BAD_COMMAND);
}

#[tokio::test]
async fn test_status_command_is_refused_by_executor() {
    let adapter = LiftAdapter::new(Box::new(MockTransport::new()), fast_settings());
    adapter
        .set_command_field("COMMAND", json!("STATUS"))
        .await
        .unwrap();

    let err = adapter.execute_command().await.unwrap_err();
    assert_eq!(err, AdapterError::BadCommand("STATUS".to_string()));
}

#[tokio::test]
async fn test_poller_applies_status_reply() {
    init_tracing();
    let (transport, _script) = ScriptedTransport::new(Script {
        status_reply: Some(b"12|2000|STATUS|1|3|3|0|0\n\r".to_vec()),
        ..Script::default()
    });

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    adapter.start_polling().await.unwrap();
    sleep(Duration::from_millis(100)).await;
    adapter.stop_polling().await;

    let state = adapter.device_state().await;
    assert_eq!(state.machine, 1);
    assert_eq!(state.exit_group, 2);
    assert_eq!(state.request_id, 2000);
    assert_eq!(state.status, 1);
    assert_eq!(state.pos1_pick_tray, 3);
    assert_eq!(state.pos2_pick_tray, 3);
    assert_eq!(state.pos1_exe_tray, 0);
    assert_eq!(state.pos2_exe_tray, 0);
    assert!(state.last_update.is_some());
    assert_eq!(adapter.polling_state().await, PollingState::Stopped);
}

#[tokio::test]
async fn test_single_token_reply_sets_error_only() {
    let (transport, _script) = ScriptedTransport::new(Script {
        override_reply: Some(b"JAMMED\n\r".to_vec()),
        ..Script::default()
    });

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    let before = adapter.device_state().await;

    adapter.start_polling().await.unwrap();
    sleep(Duration::from_millis(50)).await;
    adapter.stop_polling().await;

    let state = adapter.device_state().await;
    assert_eq!(state.error, "JAMMED");
    // Every other field is exactly as constructed
    assert_eq!(state.status, before.status);
    assert_eq!(state.machine, before.machine);
    assert_eq!(state.pos1_pick_tray, before.pos1_pick_tray);
    assert_eq!(state.result, before.result);
    assert_eq!(state.last_update, before.last_update);
}

#[tokio::test]
async fn test_call_frame_field_order() {
    let (transport, script) = ScriptedTransport::new(Script {
        command_reply: Some(b"11|2000|CALL|0\n\r".to_vec()),
        ..Script::default()
    });

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    adapter.set_command_field("COMMAND", json!("CALL")).await.unwrap();
    adapter.set_command_field("TRAY", json!(3)).await.unwrap();
    adapter.set_command_field("POSITION", json!(1)).await.unwrap();

    adapter.execute_command().await.unwrap();

    let writes = script.lock().unwrap().writes.clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0], b"11|2000|CALL|3|1\n\r");

    let state = adapter.device_state().await;
    assert_eq!(state.result, 0);
    assert_eq!(state.error, NO_ERROR);
}

#[tokio::test]
async fn test_return_frame_field_order() {
    let (transport, script) = ScriptedTransport::new(Script {
        command_reply: Some(b"11|2000|RETURN|0\n\r".to_vec()),
        ..Script::default()
    });

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    adapter.set_command_field("COMMAND", json!("RETURN")).await.unwrap();
    adapter.set_command_field("POSITION", json!(2)).await.unwrap();

    adapter.execute_command().await.unwrap();

    let writes = script.lock().unwrap().writes.clone();
    assert_eq!(writes[0], b"11|2000|RETURN|2\n\r");
}

#[tokio::test]
async fn test_command_with_no_reply() {
    let (transport, _script) = ScriptedTransport::new(Script::default());

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    adapter.set_command_field("COMMAND", json!("CALL")).await.unwrap();

    let err = adapter.execute_command().await.unwrap_err();
    assert_eq!(err, AdapterError::NoReply);
    assert_eq!(adapter.device_state().await.error, "NO REPLY");
}

#[tokio::test]
async fn test_stop_polling_is_idempotent() {
    let (transport, _script) = ScriptedTransport::new(Script::default());
    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());

    adapter.stop_polling().await;
    adapter.stop_polling().await;
    assert_eq!(adapter.polling_state().await, PollingState::Stopped);
    assert_eq!(adapter.device_state().await.error, "");
}

#[tokio::test]
async fn test_start_polling_twice_is_refused() {
    let (transport, _script) = ScriptedTransport::new(Script {
        status_reply: Some(b"11|2000|STATUS|1|0|0|0|0\n\r".to_vec()),
        ..Script::default()
    });
    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());

    adapter.start_polling().await.unwrap();
    let err = adapter.start_polling().await.unwrap_err();
    assert_eq!(err, AdapterError::PollerAlreadyRunning);
    adapter.stop_polling().await;

    // Restart after a clean stop is allowed
    adapter.start_polling().await.unwrap();
    adapter.stop_polling().await;
}

#[tokio::test]
async fn test_transport_failure_faults_poller_observably() {
    init_tracing();
    let (transport, script) = ScriptedTransport::new(Script {
        status_reply: Some(b"11|2000|STATUS|1|0|0|0|0\n\r".to_vec()),
        ..Script::default()
    });
    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());

    adapter.start_polling().await.unwrap();
    sleep(Duration::from_millis(30)).await;
    script.lock().unwrap().fail_writes = true;
    sleep(Duration::from_millis(50)).await;

    assert_eq!(adapter.polling_state().await, PollingState::Faulted);
    assert!(
        adapter
            .device_state()
            .await
            .error
            .contains("Simulated write failure")
    );
}

// Serialization property: command transactions running while the poller is
// live never pick up a status reply (and vice versa), because the transport
// mutex is held across each complete write+read pair.
#[tokio::test]
async fn test_concurrent_poll_and_commands_never_misattribute_replies() {
    init_tracing();
    let (transport, _script) = ScriptedTransport::new(Script {
        status_reply: Some(b"12|2000|STATUS|1|5|5|0|0\n\r".to_vec()),
        command_reply: Some(b"12|2000|CALL|7\n\r".to_vec()),
        ..Script::default()
    });

    let adapter = LiftAdapter::new(Box::new(transport), fast_settings());
    adapter.start_polling().await.unwrap();
    adapter.set_command_field("COMMAND", json!("CALL")).await.unwrap();
    adapter.set_command_field("TRAY", json!(5)).await.unwrap();
    adapter.set_command_field("POSITION", json!(1)).await.unwrap();

    for _ in 0..50 {
        adapter.execute_command().await.unwrap();
        // A status reply misread as a command reply would land status code 1
        // in RESULT; the scripted result is 7
        assert_eq!(adapter.device_state().await.result, 7);
        sleep(Duration::from_millis(2)).await;
    }

    adapter.stop_polling().await;
    assert_eq!(adapter.polling_state().await, PollingState::Stopped);

    let state = adapter.device_state().await;
    // A command reply misread as a status reply would have been recorded as
    // a malformed-reply error; the last command left ERROR cleared
    assert_eq!(state.error, NO_ERROR);
    assert_eq!(state.status, 1);
    assert_eq!(state.pos1_pick_tray, 5);
}
