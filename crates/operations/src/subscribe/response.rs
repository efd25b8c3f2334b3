//! Typed subscribe envelope.
//!
//! Unlike the channel-group parsers, this one fails closed: a body that does
//! not match the envelope shape is a [`PubSubError::ResponseParsing`].

use request::{PubSubError, Timetoken};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Appended to a channel or group name to form its presence companion.
pub(crate) const PRESENCE_SUFFIX: &str = "-pnpres";

/// Position to resume the stream from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscribeCursor {
    pub timetoken: Timetoken,
    pub region: u32,
}

/// One message delivered by a subscribe long-poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscribeMessage {
    /// Channel the message was published to.
    pub channel: String,
    /// Subscription that matched it (a group or wildcard), when different
    /// from the channel.
    pub subscription: Option<String>,
    pub payload: Value,
    /// Identity of the publisher, if the server disclosed it.
    pub publisher: Option<String>,
    /// When the message was published.
    pub published: Option<SubscribeCursor>,
    pub user_metadata: Option<Value>,
}

impl SubscribeMessage {
    /// `true` for join/leave/timeout events on a presence channel.
    pub fn is_presence(&self) -> bool {
        self.channel.ends_with(PRESENCE_SUFFIX)
    }
}

/// Result of one subscribe long-poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscribeEnvelope {
    /// Cursor for the next long-poll.
    pub cursor: SubscribeCursor,
    pub messages: Vec<SubscribeMessage>,
}

// Wire shapes ----------------------------------------------------------------

#[derive(Deserialize)]
struct WireCursor {
    t: String,
    #[serde(default)]
    r: u32,
}

#[derive(Deserialize)]
struct WireMessage {
    c: String,
    #[serde(default)]
    b: Option<String>,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    i: Option<String>,
    #[serde(default)]
    p: Option<WireCursor>,
    #[serde(default)]
    u: Option<Value>,
}

#[derive(Deserialize)]
struct WireEnvelope {
    t: WireCursor,
    #[serde(default)]
    m: Vec<WireMessage>,
}

impl WireCursor {
    fn into_cursor(self, body: &[u8]) -> Result<SubscribeCursor, PubSubError> {
        let timetoken = self.t.parse::<Timetoken>().map_err(|e| {
            PubSubError::parsing(format!("invalid timetoken {:?}: {e}", self.t), body, None)
        })?;
        Ok(SubscribeCursor {
            timetoken,
            region: self.r,
        })
    }
}

/// Parses a subscribe response body.
pub fn parse_subscribe(body: &[u8]) -> Result<SubscribeEnvelope, PubSubError> {
    let wire: WireEnvelope = serde_json::from_slice(body)
        .map_err(|e| PubSubError::parsing("Error unmarshalling subscribe response", body, Some(e)))?;

    let cursor = wire.t.into_cursor(body)?;
    let mut messages = Vec::with_capacity(wire.m.len());
    for m in wire.m {
        let published = m.p.map(|p| p.into_cursor(body)).transpose()?;
        messages.push(SubscribeMessage {
            subscription: m.b.filter(|b| b != &m.c),
            channel: m.c,
            payload: m.d,
            publisher: m.i,
            published,
            user_metadata: m.u,
        });
    }

    Ok(SubscribeEnvelope { cursor, messages })
}
