use crate::error::AdapterError;

/// Token count of a full status reply:
/// `prefix|request_id|STATUS|status|pos1pick|pos2pick|pos1exe|pos2exe`
pub const STATUS_REPLY_TOKENS: usize = 8;

/// Minimum token count of a command reply; the result code sits at a fixed
/// position regardless of how much of the request the device echoes back.
pub const COMMAND_REPLY_MIN_TOKENS: usize = 4;
const RESULT_TOKEN_INDEX: usize = 3;

/// Split a frame prefix into (machine, exit_group).
///
/// The prefix is the machine number with a single exit-group digit
/// appended, so `"12"` is machine 1 on exit group 2.
pub fn split_prefix(prefix: &str) -> Result<(i64, i64), AdapterError> {
    if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_digit()) {
        return Err(AdapterError::MalformedReply(format!(
            "Invalid frame prefix: {:?}",
            prefix
        )));
    }
    let (machine, exit_group) = prefix.split_at(prefix.len() - 1);
    Ok((parse_numeric("prefix machine", machine)?, parse_numeric("prefix exit group", exit_group)?))
}

/// Build the frame prefix from machine number and exit-group digit.
pub fn build_prefix(machine: i64, exit_group: i64) -> String {
    format!("{}{}", machine, exit_group)
}

fn parse_numeric(what: &str, token: &str) -> Result<i64, AdapterError> {
    token.parse::<i64>().map_err(|_| {
        AdapterError::MalformedReply(format!("Non-numeric {}: {:?}", what, token))
    })
}

/// Check the single-token error convention shared by both reply kinds: the
/// device answers a failed request with one bare error string.
fn check_device_fault(tokens: &[String]) -> Result<(), AdapterError> {
    if tokens.len() == 1 {
        return Err(AdapterError::DeviceFault(tokens[0].clone()));
    }
    Ok(())
}

/// Decoded status reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub machine: i64,
    pub exit_group: i64,
    pub request_id: i64,
    pub status: i64,
    pub pos1_pick_tray: i64,
    pub pos2_pick_tray: i64,
    pub pos1_exe_tray: i64,
    pub pos2_exe_tray: i64,
}

impl StatusReply {
    /// Validate and parse a decoded token stream against the status schema.
    /// Fails closed: any token count other than exactly
    /// [`STATUS_REPLY_TOKENS`] (or the single-token device error) is
    /// rejected before positional access.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, AdapterError> {
        check_device_fault(tokens)?;
        if tokens.len() != STATUS_REPLY_TOKENS {
            return Err(AdapterError::MalformedReply(format!(
                "Expected {} status tokens, got {}",
                STATUS_REPLY_TOKENS,
                tokens.len()
            )));
        }

        let (machine, exit_group) = split_prefix(&tokens[0])?;
        // tokens[2] is the echoed command name and carries no data
        Ok(Self {
            machine,
            exit_group,
            request_id: parse_numeric("request id", &tokens[1])?,
            status: parse_numeric("status", &tokens[3])?,
            pos1_pick_tray: parse_numeric("pos1 pick tray", &tokens[4])?,
            pos2_pick_tray: parse_numeric("pos2 pick tray", &tokens[5])?,
            pos1_exe_tray: parse_numeric("pos1 exe tray", &tokens[6])?,
            pos2_exe_tray: parse_numeric("pos2 exe tray", &tokens[7])?,
        })
    }
}

/// Decoded command (CALL/RETURN) reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub result: i64,
}

impl CommandReply {
    pub fn from_tokens(tokens: &[String]) -> Result<Self, AdapterError> {
        check_device_fault(tokens)?;
        if tokens.len() < COMMAND_REPLY_MIN_TOKENS {
            return Err(AdapterError::MalformedReply(format!(
                "Expected at least {} command reply tokens, got {}",
                COMMAND_REPLY_MIN_TOKENS,
                tokens.len()
            )));
        }

        Ok(Self {
            result: parse_numeric("result code", &tokens[RESULT_TOKEN_INDEX])?,
        })
    }
}
