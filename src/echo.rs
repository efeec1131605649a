//! The echo host's reply logic.
//!
//! A valid JSON payload comes back wrapped byte-for-byte as `{"echo": <payload>}`.
//! Anything else gets an error object the extension can inspect, and the host keeps
//! running.

use serde_json::value::RawValue;

const PREFIX: &[u8] = b"{\"echo\": ";
const SUFFIX: &[u8] = b"}";

/// Build the reply frame payload for one inbound payload.
pub fn reply(payload: &[u8]) -> Vec<u8> {
    match wrap(payload) {
        Ok(out) => out,
        Err(err) => {
            tracing::debug!(bytes_in = payload.len(), error = %err, "rejecting non-JSON payload");
            error_reply(payload.len(), &err)
        }
    }
}

/// Wrap a JSON payload in the echo envelope without reformatting it.
pub fn wrap(payload: &[u8]) -> Result<Vec<u8>, serde_json::Error> {
    // RawValue validates the document (UTF-8 included) and keeps the original bytes.
    let _: &RawValue = serde_json::from_slice(payload)?;
    let mut out = Vec::with_capacity(PREFIX.len() + payload.len() + SUFFIX.len());
    out.extend_from_slice(PREFIX);
    out.extend_from_slice(payload);
    out.extend_from_slice(SUFFIX);
    Ok(out)
}

fn error_reply(bytes_in: usize, err: &serde_json::Error) -> Vec<u8> {
    serde_json::json!({
        "error": "invalid_json",
        "details": err.to_string(),
        "bytes_in": bytes_in,
    })
    .to_string()
    .into_bytes()
}
