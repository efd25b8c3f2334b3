//! Shared value types for the request pipeline.
//!
//! Unlike the newtypes in [`crate::identifiers`], these types carry values
//! that participate in request construction (methods, operation tags) or in
//! the status record every request produces.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Closed set of logical operations the client can perform.
///
/// Carried on every [`StatusResponse`] so error reporting is uniform across
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Single long-poll subscribe request.
    Subscribe,
    /// List the channels registered in a channel group.
    ChannelsForGroup,
    /// Add channels to a channel group.
    AddChannelsToGroup,
    /// Remove channels from a channel group.
    RemoveChannelsFromGroup,
    /// Delete a channel group.
    RemoveGroup,
}

impl OperationType {
    /// Stable name used in logs and telemetry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::ChannelsForGroup => "channels_for_group",
            Self::AddChannelsToGroup => "add_channels_to_group",
            Self::RemoveChannelsFromGroup => "remove_channels_from_group",
            Self::RemoveGroup => "remove_group",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// HTTP method a descriptor may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Patch,
    Put,
}

impl HttpMethod {
    /// Upper-case method token as sent on the request line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Server-assigned 64-bit logical timestamp, in units of 100 nanoseconds since
/// the Unix epoch.
///
/// Zero means "no position"; subscribe omits the `tt` parameter in that case.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timetoken(i64);

impl Timetoken {
    const TICKS_PER_SECOND: i64 = 10_000_000;

    /// Creates a [`Timetoken`] from its raw integer value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Returns `true` if this timetoken carries no position.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Converts to wall-clock time. Returns `None` outside chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let secs = self.0.div_euclid(Self::TICKS_PER_SECOND);
        let ticks = self.0.rem_euclid(Self::TICKS_PER_SECOND);
        DateTime::from_timestamp(secs, (ticks * 100) as u32)
    }
}

impl std::fmt::Display for Timetoken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timetoken {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for Timetoken {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Envelope returned alongside every response body or error.
///
/// Built by the executor. `status_code` is `None` when no HTTP exchange took
/// place (validation, construction, transport, or cancellation failures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    /// Logical operation that produced this status.
    pub operation: OperationType,

    /// HTTP status code of the response, if one was received.
    pub status_code: Option<u16>,

    /// `true` if the request failed at any stage.
    pub is_error: bool,

    /// Display form of the error that failed the request, if any.
    pub error_message: Option<String>,

    /// `true` if the request was (or would have been) sent over HTTPS.
    pub tls_enabled: bool,

    /// Host the request was sent to.
    pub origin: String,

    /// Identity sent with the request.
    pub uuid: String,

    /// Channels the operation targeted.
    pub affected_channels: Vec<String>,

    /// Channel groups the operation targeted.
    pub affected_groups: Vec<String>,
}
