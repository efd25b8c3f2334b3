use request::encoding::join_query_list;
use request::{
    OperationType, PubSubError, QueryParams, RequestDescriptor, RequestFailure, StatusResponse,
};

use super::response::{parse_ack, ChannelGroupAck};
use super::{group_path, require_channels, require_group, require_subscribe_key};
use crate::context::{common_builder_methods, context_hooks, non_empty, RequestContext};

/// Direction of a membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    Add,
    Remove,
}

impl MembershipChange {
    /// Query parameter that carries the channel list.
    fn query_key(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    fn operation(self) -> OperationType {
        match self {
            Self::Add => OperationType::AddChannelsToGroup,
            Self::Remove => OperationType::RemoveChannelsFromGroup,
        }
    }
}

/// Descriptor for adding channels to, or removing them from, a group. The
/// channels go in `add` or `remove` as a comma-separated list.
#[derive(Clone)]
pub struct GroupMembershipRequest {
    pub(crate) ctx: RequestContext,
    pub(crate) change: MembershipChange,
    pub(crate) channel_group: String,
    pub(crate) channels: Vec<String>,
}

impl RequestDescriptor for GroupMembershipRequest {
    context_hooks!();

    fn validate(&self) -> Result<(), PubSubError> {
        require_subscribe_key(&self.ctx.config)?;
        require_channels(&self.channels)?;
        require_group(&self.channel_group)
    }

    fn build_path(&self) -> Result<String, PubSubError> {
        Ok(group_path(&self.ctx, &self.channel_group))
    }

    fn build_query(&self) -> Result<QueryParams, PubSubError> {
        let mut query = self.ctx.base_query();
        if !self.channels.is_empty() {
            query.set_encoded(self.change.query_key(), join_query_list(&self.channels));
        }
        Ok(query)
    }

    fn operation_type(&self) -> OperationType {
        self.change.operation()
    }

    fn affected_channels(&self) -> Vec<String> {
        self.channels.clone()
    }

    fn affected_groups(&self) -> Vec<String> {
        vec![self.channel_group.clone()]
    }
}

/// Adds channels to a channel group (creating the group if needed) or removes
/// them from it. Removing leaves the group itself registered.
pub struct GroupMembershipBuilder {
    request: GroupMembershipRequest,
}

impl GroupMembershipBuilder {
    pub(crate) fn new(ctx: RequestContext, change: MembershipChange) -> Self {
        Self {
            request: GroupMembershipRequest {
                ctx,
                change,
                channel_group: String::new(),
                channels: Vec::new(),
            },
        }
    }

    pub fn channel_group(mut self, group: impl Into<String>) -> Self {
        self.request.channel_group = group.into();
        self
    }

    /// Channels to add or remove. Empty names are ignored.
    pub fn channels(mut self, channels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.request.channels = non_empty(channels);
        self
    }

    common_builder_methods!();

    pub fn request(&self) -> &GroupMembershipRequest {
        &self.request
    }

    pub async fn execute(&self) -> Result<(ChannelGroupAck, StatusResponse), RequestFailure> {
        let raw = request::execute(&self.request).await?;

        match parse_ack(&raw.body, raw.status.status_code) {
            Ok(ack) => Ok((ack, raw.status)),
            Err(error) => Err(RequestFailure::new(raw.status, error)),
        }
    }
}
