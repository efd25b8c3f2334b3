use request::{
    OperationType, PubSubError, QueryParams, RequestDescriptor, RequestFailure, StatusResponse,
};
use tracing::debug;

use super::response::{parse_all_channels, AllChannelsInGroup};
use super::{group_path, require_group, require_subscribe_key};
use crate::context::{common_builder_methods, context_hooks, RequestContext};

/// Descriptor for listing the channels in one group.
#[derive(Clone)]
pub struct ListChannelsInGroupRequest {
    pub(crate) ctx: RequestContext,
    pub(crate) channel_group: String,
}

impl RequestDescriptor for ListChannelsInGroupRequest {
    context_hooks!();

    fn validate(&self) -> Result<(), PubSubError> {
        require_subscribe_key(&self.ctx.config)?;
        require_group(&self.channel_group)
    }

    fn build_path(&self) -> Result<String, PubSubError> {
        Ok(group_path(&self.ctx, &self.channel_group))
    }

    fn build_query(&self) -> Result<QueryParams, PubSubError> {
        Ok(self.ctx.base_query())
    }

    fn operation_type(&self) -> OperationType {
        OperationType::ChannelsForGroup
    }

    fn affected_groups(&self) -> Vec<String> {
        vec![self.channel_group.clone()]
    }
}

/// Lists the channels registered in a channel group.
pub struct ListChannelsInGroupBuilder {
    request: ListChannelsInGroupRequest,
}

impl ListChannelsInGroupBuilder {
    pub(crate) fn new(ctx: RequestContext) -> Self {
        Self {
            request: ListChannelsInGroupRequest {
                ctx,
                channel_group: String::new(),
            },
        }
    }

    pub fn channel_group(mut self, group: impl Into<String>) -> Self {
        self.request.channel_group = group.into();
        self
    }

    common_builder_methods!();

    /// The descriptor this builder will execute.
    pub fn request(&self) -> &ListChannelsInGroupRequest {
        &self.request
    }

    pub async fn execute(&self) -> Result<(AllChannelsInGroup, StatusResponse), RequestFailure> {
        let raw = request::execute(&self.request).await?;

        match parse_all_channels(&raw.body) {
            Ok(parsed) => {
                debug!(group = %parsed.group, channels = parsed.channels.len(), "listed channel group");
                Ok((parsed, raw.status))
            }
            Err(error) => Err(RequestFailure::new(raw.status, error)),
        }
    }
}
