use request::{
    OperationType, PubSubError, QueryParams, RequestDescriptor, RequestFailure, StatusResponse,
};

use super::response::{parse_ack, ChannelGroupAck};
use super::{group_path, require_group, require_subscribe_key};
use crate::context::{common_builder_methods, context_hooks, RequestContext};

/// Descriptor for deleting a whole group: the group path plus `/remove`.
#[derive(Clone)]
pub struct DeleteGroupRequest {
    pub(crate) ctx: RequestContext,
    pub(crate) channel_group: String,
}

impl RequestDescriptor for DeleteGroupRequest {
    context_hooks!();

    fn validate(&self) -> Result<(), PubSubError> {
        require_subscribe_key(&self.ctx.config)?;
        require_group(&self.channel_group)
    }

    fn build_path(&self) -> Result<String, PubSubError> {
        Ok(format!("{}/remove", group_path(&self.ctx, &self.channel_group)))
    }

    fn build_query(&self) -> Result<QueryParams, PubSubError> {
        Ok(self.ctx.base_query())
    }

    fn operation_type(&self) -> OperationType {
        OperationType::RemoveGroup
    }

    fn affected_groups(&self) -> Vec<String> {
        vec![self.channel_group.clone()]
    }
}

/// Deletes a channel group and all of its channel registrations.
pub struct DeleteGroupBuilder {
    request: DeleteGroupRequest,
}

impl DeleteGroupBuilder {
    pub(crate) fn new(ctx: RequestContext) -> Self {
        Self {
            request: DeleteGroupRequest {
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

    pub fn request(&self) -> &DeleteGroupRequest {
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
