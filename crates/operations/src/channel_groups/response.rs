//! Channel-group response types and their lenient parsers.
//!
//! Parsers read the body into a `serde_json::Value` and pick out known keys.
//! Unknown keys are ignored and missing keys leave the field at its zero
//! value; only a body that is not JSON at all is an error.

use request::PubSubError;
use serde::Serialize;
use serde_json::Value;

/// Channels registered in one group, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllChannelsInGroup {
    pub group: String,
    pub channels: Vec<String>,
}

/// Acknowledgement of an add, remove, or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelGroupAck {
    /// `status` from the body, falling back to the HTTP status code.
    pub status: u16,
    pub message: String,
}

fn parse_json(body: &[u8]) -> Result<Value, PubSubError> {
    serde_json::from_slice(body)
        .map_err(|e| PubSubError::parsing("Error unmarshalling response", body, Some(e)))
}

/// Projects `payload.group` and `payload.channels`.
///
/// Non-string channel entries are dropped. A body whose top level is not an
/// object, or that has no `payload` object, yields an empty result.
pub fn parse_all_channels(body: &[u8]) -> Result<AllChannelsInGroup, PubSubError> {
    let value = parse_json(body)?;
    let mut response = AllChannelsInGroup::default();

    if let Some(payload) = value.get("payload").and_then(Value::as_object) {
        if let Some(group) = payload.get("group").and_then(Value::as_str) {
            response.group = group.to_string();
        }
        if let Some(channels) = payload.get("channels").and_then(Value::as_array) {
            response.channels = channels
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
    }

    Ok(response)
}

/// Projects `status` and `message` from a mutation acknowledgement.
pub fn parse_ack(body: &[u8], http_status: Option<u16>) -> Result<ChannelGroupAck, PubSubError> {
    let value = parse_json(body)?;

    let status = value
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .or(http_status)
        .unwrap_or_default();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(ChannelGroupAck { status, message })
}
