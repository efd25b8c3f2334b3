//! Single long-poll subscribe request.
//!
//! This module builds and executes *one* subscribe request. Driving repeated
//! long-polls (advancing the cursor, reconnecting, dispatching messages) is
//! the caller's job.
//!
//! The subscribe descriptor differs from the channel-group ones in three ways:
//! it dispatches through the subscribe transport pool with the longer
//! subscribe timeout, it requires both the publish and subscribe keys, and it
//! requires at least one channel or channel group.

pub mod response;

pub use response::{SubscribeCursor, SubscribeEnvelope, SubscribeMessage};

use std::time::Duration;

use request::encoding::{encode_filter_expression, join_channels, join_query_list};
use request::errors::{MISSING_CHANNEL_OR_GROUP, MISSING_PUBLISH_KEY, MISSING_SUBSCRIBE_KEY};
use request::{
    OperationType, PubSubError, QueryParams, RequestDescriptor, RequestFailure, StatusResponse,
    Timetoken,
};
use tracing::debug;

use crate::context::{common_builder_methods, context_hooks, non_empty, RequestContext};
use response::{parse_subscribe, PRESENCE_SUFFIX};

/// Server-side minimum heartbeat, in seconds. Smaller values are not sent.
pub const MIN_HEARTBEAT: u32 = 4;

/// Stands in for the channel segment when only groups are subscribed.
const EMPTY_CHANNELS_PLACEHOLDER: &str = ",";

/// Descriptor for one subscribe long-poll:
/// `GET /v2/subscribe/{sub-key}/{channels}/0`.
#[derive(Clone)]
pub struct SubscribeRequest {
    pub(crate) ctx: RequestContext,
    pub(crate) channels: Vec<String>,
    pub(crate) groups: Vec<String>,
    pub(crate) heartbeat: u32,
    pub(crate) region: String,
    pub(crate) timetoken: Timetoken,
    pub(crate) filter_expression: String,
    pub(crate) with_presence: bool,
}

impl SubscribeRequest {
    fn with_presence_companions(&self, names: &[String]) -> Vec<String> {
        let mut all = names.to_vec();
        if self.with_presence {
            all.extend(names.iter().map(|n| format!("{n}{PRESENCE_SUFFIX}")));
        }
        all
    }
}

impl RequestDescriptor for SubscribeRequest {
    context_hooks!();

    fn validate(&self) -> Result<(), PubSubError> {
        let config = &self.ctx.config;
        if config.publish_key.is_none() {
            return Err(PubSubError::validation(MISSING_PUBLISH_KEY));
        }
        if config.subscribe_key.is_none() {
            return Err(PubSubError::validation(MISSING_SUBSCRIBE_KEY));
        }
        if self.channels.is_empty() && self.groups.is_empty() {
            return Err(PubSubError::validation(MISSING_CHANNEL_OR_GROUP));
        }
        Ok(())
    }

    fn build_path(&self) -> Result<String, PubSubError> {
        let channels = self.with_presence_companions(&self.channels);
        let segment = if channels.is_empty() {
            EMPTY_CHANNELS_PLACEHOLDER.to_string()
        } else {
            join_channels(&channels)
        };

        Ok(format!(
            "/v2/subscribe/{}/{}/0",
            self.ctx.subscribe_key_segment(),
            segment
        ))
    }

    fn build_query(&self) -> Result<QueryParams, PubSubError> {
        let mut query = self.ctx.base_query();

        if !self.groups.is_empty() {
            query.set_encoded(
                "channel-group",
                join_query_list(&self.with_presence_companions(&self.groups)),
            );
        }
        if !self.timetoken.is_zero() {
            query.set("tt", self.timetoken.to_string());
        }
        if !self.region.is_empty() {
            query.set("tr", self.region.clone());
        }
        if !self.filter_expression.is_empty() {
            query.set_encoded(
                "filter-expr",
                encode_filter_expression(&self.filter_expression),
            );
        }
        if self.heartbeat >= MIN_HEARTBEAT {
            query.set("heartbeat", self.heartbeat.to_string());
        }

        Ok(query)
    }

    fn request_timeout(&self) -> Duration {
        self.ctx.config.subscribe_request_timeout
    }

    fn operation_type(&self) -> OperationType {
        OperationType::Subscribe
    }

    fn affected_channels(&self) -> Vec<String> {
        self.channels.clone()
    }

    fn affected_groups(&self) -> Vec<String> {
        self.groups.clone()
    }
}

/// Builds and executes one subscribe long-poll.
///
/// Query values are sent raw and form-encoded by the executor, except the
/// `channel-group` list, whose names are encoded one by one around literal
/// commas, and the filter expression, which is percent-encoded here. The
/// server parses `filter-expr` in that form.
pub struct SubscribeRequestBuilder {
    request: SubscribeRequest,
}

impl SubscribeRequestBuilder {
    pub(crate) fn new(ctx: RequestContext) -> Self {
        Self {
            request: SubscribeRequest {
                ctx,
                channels: Vec::new(),
                groups: Vec::new(),
                heartbeat: 0,
                region: String::new(),
                timetoken: Timetoken::default(),
                filter_expression: String::new(),
                with_presence: false,
            },
        }
    }

    /// Channels to subscribe to. Empty names are ignored.
    pub fn channels(mut self, channels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.request.channels = non_empty(channels);
        self
    }

    /// Channel groups to subscribe to. Empty names are ignored.
    pub fn channel_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.request.groups = non_empty(groups);
        self
    }

    /// Resume position. Zero starts a new stream.
    pub fn timetoken(mut self, timetoken: impl Into<Timetoken>) -> Self {
        self.request.timetoken = timetoken.into();
        self
    }

    /// Region from the previous cursor, sent as `tr`.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.request.region = region.into();
        self
    }

    /// Server-side message filter. Sent pre-encoded as `filter-expr`.
    pub fn filter_expression(mut self, expression: impl Into<String>) -> Self {
        self.request.filter_expression = expression.into();
        self
    }

    /// Presence heartbeat in seconds. Values below [`MIN_HEARTBEAT`] are dropped.
    pub fn heartbeat(mut self, seconds: u32) -> Self {
        self.request.heartbeat = seconds;
        self
    }

    /// Also receive presence events for every channel and group.
    pub fn with_presence(mut self, with_presence: bool) -> Self {
        self.request.with_presence = with_presence;
        self
    }

    common_builder_methods!();

    pub fn request(&self) -> &SubscribeRequest {
        &self.request
    }

    pub async fn execute(&self) -> Result<(SubscribeEnvelope, StatusResponse), RequestFailure> {
        let raw = request::execute(&self.request).await?;

        match parse_subscribe(&raw.body) {
            Ok(envelope) => {
                debug!(
                    messages = envelope.messages.len(),
                    timetoken = %envelope.cursor.timetoken,
                    "subscribe long-poll returned"
                );
                Ok((envelope, raw.status))
            }
            Err(error) => Err(RequestFailure::new(raw.status, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use request::testing::StubTransport;
    use request::Config;

    use super::*;

    fn builder(config: Config) -> SubscribeRequestBuilder {
        let ctx = RequestContext::new(Arc::new(config), Arc::new(StubTransport::new()));
        SubscribeRequestBuilder::new(ctx)
    }

    fn keyed() -> SubscribeRequestBuilder {
        builder(Config::new("sub-c-1", "pub-c-1"))
    }

    #[test]
    fn validation_order_is_publish_key_subscribe_key_channels() {
        let err = builder(Config::new("sub", "")).channels(["a"]).request().validate();
        assert!(err.unwrap_err().to_string().contains("Missing Publish Key"));

        let err = builder(Config::new("", "pub")).channels(["a"]).request().validate();
        assert!(err.unwrap_err().to_string().contains("Missing Subscribe Key"));

        let err = keyed().request().validate();
        assert!(err.unwrap_err().to_string().contains("Missing Channel"));
    }

    #[test]
    fn channels_are_joined_into_path() {
        let b = keyed().channels(["a", "b c"]);

        assert_eq!(
            b.request().build_path().unwrap(),
            "/v2/subscribe/sub-c-1/a,b%20c/0"
        );
    }

    #[test]
    fn groups_only_uses_placeholder_segment() {
        let b = keyed().channel_groups(["g1", "g2"]);
        let query = b.request().build_query().unwrap();

        assert_eq!(b.request().build_path().unwrap(), "/v2/subscribe/sub-c-1/,/0");
        assert_eq!(query.get_str("channel-group"), Some("g1,g2"));
    }

    #[test]
    fn comma_inside_a_group_name_is_not_a_separator() {
        let b = keyed().channel_groups(["rooms,east", "lobby"]);
        let query = b.request().build_query().unwrap();

        assert_eq!(query.get_str("channel-group"), Some("rooms%2Ceast,lobby"));
    }

    #[test]
    fn optional_parameters_are_omitted_at_zero_values() {
        let query = keyed().channels(["a"]).request().build_query().unwrap();

        for key in ["channel-group", "tt", "tr", "filter-expr", "heartbeat"] {
            assert!(!query.contains_key(key), "{key} should be absent");
        }
    }

    #[test]
    fn optional_parameters_are_sent_when_set() {
        let b = keyed()
            .channels(["a"])
            .timetoken(Timetoken::new(15_000_000_000_000_000))
            .region("4")
            .heartbeat(60);
        let query = b.request().build_query().unwrap();

        assert_eq!(query.get_str("tt"), Some("15000000000000000"));
        assert_eq!(query.get_str("tr"), Some("4"));
        assert_eq!(query.get_str("heartbeat"), Some("60"));
    }

    #[test]
    fn heartbeat_below_minimum_is_dropped() {
        for (seconds, expected) in [(0, None), (3, None), (4, Some("4")), (5, Some("5"))] {
            let b = keyed().channels(["a"]).heartbeat(seconds);
            let query = b.request().build_query().unwrap();
            assert_eq!(query.get_str("heartbeat"), expected, "heartbeat {seconds}");
        }
    }

    #[test]
    fn filter_expression_is_pre_encoded() {
        let b = keyed().channels(["a"]).filter_expression("uuid != 'me'");
        let query = b.request().build_query().unwrap();

        assert_eq!(
            query.get("filter-expr"),
            Some(&request::QueryValue::Encoded(
                "uuid%20%21%3D%20%27me%27".to_string()
            ))
        );
    }

    #[test]
    fn presence_adds_companion_channels_and_groups() {
        let b = keyed()
            .channels(["a"])
            .channel_groups(["g"])
            .with_presence(true);

        assert_eq!(
            b.request().build_path().unwrap(),
            "/v2/subscribe/sub-c-1/a,a-pnpres/0"
        );
        assert_eq!(
            b.request().build_query().unwrap().get_str("channel-group"),
            Some("g,g-pnpres")
        );
        assert_eq!(b.request().affected_channels(), vec!["a"]);
    }

    #[test]
    fn uses_subscribe_timeout() {
        let b = keyed().channels(["a"]);

        assert_eq!(b.request().request_timeout(), Duration::from_secs(310));
    }
}
