//! Frame encoding and decoding.
//!
//! The protocol has no escaping: a `|` inside a field value would corrupt
//! the frame, so encoding rejects it outright. Decoding splits on `|`
//! preserving interior empty fields, so a device that sends `a||b` yields
//! three tokens and schema validation can reject the frame instead of
//! silently shifting every later field.

use crate::error::AdapterError;

pub const FIELD_SEPARATOR: char = '|';
pub const FRAME_TERMINATOR: &str = "\n\r";

/// Join stringified fields into a wire frame.
pub fn encode(fields: &[String]) -> Result<Vec<u8>, AdapterError> {
    for field in fields {
        if field.contains(FIELD_SEPARATOR) {
            return Err(AdapterError::InvalidConfig(format!(
                "Field value {:?} contains the separator '{}'",
                field, FIELD_SEPARATOR
            )));
        }
    }

    let mut frame = fields.join("|");
    frame.push_str(FRAME_TERMINATOR);
    Ok(frame.into_bytes())
}

/// Tokenize a received buffer.
///
/// Returns an empty vector for an empty buffer. A trailing empty token
/// produced by a terminating `|` is dropped; interior empties are kept.
pub fn decode(raw: &[u8]) -> Result<Vec<String>, AdapterError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| AdapterError::MalformedReply(format!("Non-UTF-8 frame: {}", e)))?;

    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens: Vec<String> = trimmed
        .split(FIELD_SEPARATOR)
        .map(|t| t.trim().to_string())
        .collect();

    if tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    Ok(tokens)
}
