use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use domain::driver::DeviceTransport;
use domain::protocol::{LiftCommand, StatusReply, build_prefix, frame};
use domain::{AdapterError, DeviceState};

pub(crate) type SharedTransport = Arc<Mutex<Box<dyn DeviceTransport>>>;
pub(crate) type SharedDeviceState = Arc<RwLock<DeviceState>>;

/// Observable lifecycle state of the status poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollingState {
    #[default]
    Stopped,
    Running,
    /// The poll loop exited because the transport failed; the fault message
    /// is in the ERROR field and a reconnect is up to the caller
    Faulted,
}

/// Handle to a spawned poll loop
pub(crate) struct StatusPoller {
    pub cancel: CancellationToken,
    pub join: JoinHandle<()>,
}

pub(crate) fn spawn(
    transport: SharedTransport,
    state: SharedDeviceState,
    polling_state: Arc<RwLock<PollingState>>,
    interval: Duration,
) -> StatusPoller {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let join = tokio::spawn(run(transport, state, polling_state, interval, token));
    StatusPoller { cancel, join }
}

async fn run(
    transport: SharedTransport,
    state: SharedDeviceState,
    polling_state: Arc<RwLock<PollingState>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    info!(interval_ms = interval.as_millis() as u64, "Starting status poll loop");
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Poll loop shutdown signal received");
                break;
            }
            _ = timer.tick() => {
                if let Err(e) = poll_once(&transport, &state).await {
                    // Transport-level failure: record it, flag the fault and
                    // exit the loop rather than stopping silently
                    error!(error = %e, "Status poll failed, stopping poll loop");
                    state.write().await.record_error(&e.to_string());
                    *polling_state.write().await = PollingState::Faulted;
                    return;
                }
            }
        }
    }
}

/// One status transaction: query, bounded read, decode, apply.
///
/// Decode-level problems are resolved into the ERROR field and the cycle is
/// abandoned; only transport-level failures bubble up to end the loop.
async fn poll_once(
    transport: &SharedTransport,
    state: &SharedDeviceState,
) -> Result<(), AdapterError> {
    let query = {
        let s = state.read().await;
        frame::encode(&[
            build_prefix(s.machine, s.exit_group),
            s.request_id.to_string(),
            LiftCommand::Status.as_str().to_string(),
            String::new(),
        ])?
    };

    // Transaction lock: held across the whole write+read pair so a command
    // transaction can never interleave on the wire
    let raw = {
        let mut t = transport.lock().await;
        t.write(&query).await?;
        t.read().await?
    };

    let Some(raw) = raw else {
        // Read window elapsed; nothing to apply this cycle
        return Ok(());
    };

    let tokens = match frame::decode(&raw) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(error = %e, "Dropping undecodable status reply");
            state.write().await.record_error(&e.to_string());
            return Ok(());
        }
    };
    if tokens.is_empty() {
        return Ok(());
    }

    match StatusReply::from_tokens(&tokens) {
        Ok(reply) => {
            state.write().await.apply_status(&reply);
        }
        Err(AdapterError::DeviceFault(message)) => {
            warn!(%message, "Device reported an error to the status query");
            state.write().await.record_error(&message);
        }
        Err(e) => {
            warn!(error = %e, "Dropping status reply with unexpected shape");
            state.write().await.record_error(&e.to_string());
        }
    }

    Ok(())
}
