//! Channel-group registry operations.
//!
//! | Operation | Builder | Response |
//! |-----------|---------|----------|
//! | List channels in a group | [`ListChannelsInGroupBuilder`] | [`AllChannelsInGroup`] |
//! | Add channels to a group | [`GroupMembershipBuilder`] ([`MembershipChange::Add`]) | [`ChannelGroupAck`] |
//! | Remove channels from a group | [`GroupMembershipBuilder`] ([`MembershipChange::Remove`]) | [`ChannelGroupAck`] |
//! | Delete a group | [`DeleteGroupBuilder`] | [`ChannelGroupAck`] |
//!
//! All four are `GET` requests against the same group path and require the
//! subscribe key and a group name.

mod delete;
mod list;
mod membership;
pub mod response;

pub use delete::{DeleteGroupBuilder, DeleteGroupRequest};
pub use list::{ListChannelsInGroupBuilder, ListChannelsInGroupRequest};
pub use membership::{GroupMembershipBuilder, GroupMembershipRequest, MembershipChange};
pub use response::{AllChannelsInGroup, ChannelGroupAck};

use request::encoding::encode_path_segment;
use request::errors::{MISSING_CHANNEL, MISSING_CHANNEL_GROUP, MISSING_SUBSCRIBE_KEY};
use request::{Config, PubSubError};

use crate::context::RequestContext;

/// `/v1/channel-registration/sub-key/{sub-key}/channel-group/{group}`
fn group_path(ctx: &RequestContext, group: &str) -> String {
    format!(
        "/v1/channel-registration/sub-key/{}/channel-group/{}",
        ctx.subscribe_key_segment(),
        encode_path_segment(group)
    )
}

fn require_subscribe_key(config: &Config) -> Result<(), PubSubError> {
    if config.subscribe_key.is_none() {
        return Err(PubSubError::validation(MISSING_SUBSCRIBE_KEY));
    }
    Ok(())
}

fn require_group(group: &str) -> Result<(), PubSubError> {
    if group.is_empty() {
        return Err(PubSubError::validation(MISSING_CHANNEL_GROUP));
    }
    Ok(())
}

fn require_channels(channels: &[String]) -> Result<(), PubSubError> {
    if channels.is_empty() {
        return Err(PubSubError::validation(MISSING_CHANNEL));
    }
    Ok(())
}
