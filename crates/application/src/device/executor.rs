use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use domain::protocol::{CommandReply, LiftCommand, build_prefix, frame};
use domain::state::{BAD_COMMAND, NO_REPLY};
use domain::{AdapterError, PendingCommand};

use super::poller::{SharedDeviceState, SharedTransport};

/// One synchronous command transaction against the lift.
///
/// Every failure is resolved into the ERROR field before it is returned, so
/// a caller that only watches the published variables still sees the
/// outcome. There is no automatic retry; resubmission is the caller's call.
pub(crate) async fn execute(
    transport: &SharedTransport,
    state: &SharedDeviceState,
    pending: &Arc<RwLock<PendingCommand>>,
    settle: Duration,
) -> Result<(), AdapterError> {
    let request = pending.read().await.clone();

    // Validate before any transport activity. STATUS is refused here too:
    // status queries belong to the poller path.
    let args = match LiftCommand::parse(&request.command) {
        Ok(LiftCommand::Call) => vec![request.tray.to_string(), request.position.to_string()],
        Ok(LiftCommand::Return) => vec![request.position.to_string()],
        Ok(LiftCommand::Status) | Err(_) => {
            warn!(command = %request.command, "Refusing unrecognized command");
            state.write().await.record_error(BAD_COMMAND);
            return Err(AdapterError::BadCommand(request.command));
        }
    };

    let mut fields = vec![
        build_prefix(request.machine, request.exit_group),
        request.request_id.to_string(),
        request.command.clone(),
    ];
    fields.extend(args);
    let query = frame::encode(&fields)?;

    info!(command = %request.command, request_id = request.request_id, "Executing command");

    // Transaction lock held across write + settle + read
    let raw = {
        let mut t = transport.lock().await;
        if let Err(e) = t.write(&query).await {
            state.write().await.record_error(&e.to_string());
            return Err(e);
        }
        tokio::time::sleep(settle).await;
        match t.read().await {
            Ok(raw) => raw,
            Err(e) => {
                state.write().await.record_error(&e.to_string());
                return Err(e);
            }
        }
    };

    let Some(raw) = raw else {
        warn!(command = %request.command, "No reply within the read window");
        state.write().await.record_error(NO_REPLY);
        return Err(AdapterError::NoReply);
    };

    let tokens = match frame::decode(&raw) {
        Ok(tokens) => tokens,
        Err(e) => {
            state.write().await.record_error(&e.to_string());
            return Err(e);
        }
    };

    match CommandReply::from_tokens(&tokens) {
        Ok(reply) => {
            info!(command = %request.command, result = reply.result, "Command acknowledged");
            state.write().await.apply_result(&reply);
            Ok(())
        }
        Err(AdapterError::DeviceFault(message)) => {
            warn!(command = %request.command, %message, "Device rejected the command");
            state.write().await.record_error(&message);
            Err(AdapterError::DeviceFault(message))
        }
        Err(e) => {
            warn!(command = %request.command, error = %e, "Unusable command reply");
            state.write().await.record_error(&e.to_string());
            Err(e)
        }
    }
}
