//! The [`PubSub`] client facade.

use std::sync::Arc;

use request::{Config, HttpTransport};

use crate::channel_groups::{
    DeleteGroupBuilder, GroupMembershipBuilder, ListChannelsInGroupBuilder, MembershipChange,
};
use crate::context::RequestContext;
use crate::subscribe::SubscribeRequestBuilder;

/// Entry point for every operation.
///
/// Holds the shared [`Config`] and two transport pools: one for subscribe
/// long-polls and one for everything else, so a held subscribe connection
/// never starves short requests. Cloning is cheap; clones share the config
/// and both pools.
#[derive(Clone)]
pub struct PubSub {
    config: Arc<Config>,
    transport: Arc<dyn HttpTransport>,
    subscribe_transport: Arc<dyn HttpTransport>,
}

impl PubSub {
    pub fn new(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        subscribe_transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            subscribe_transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the transport used by non-subscribe operations. Builders
    /// created before the call keep the old one.
    pub fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = transport;
    }

    /// Replaces the transport used by subscribe long-polls.
    pub fn set_subscribe_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.subscribe_transport = transport;
    }

    // -----------------------------------------------------------------------
    // Channel groups
    // -----------------------------------------------------------------------

    pub fn list_channels_in_group(&self) -> ListChannelsInGroupBuilder {
        ListChannelsInGroupBuilder::new(self.context())
    }

    pub fn add_channels_to_group(&self) -> GroupMembershipBuilder {
        GroupMembershipBuilder::new(self.context(), MembershipChange::Add)
    }

    pub fn remove_channels_from_group(&self) -> GroupMembershipBuilder {
        GroupMembershipBuilder::new(self.context(), MembershipChange::Remove)
    }

    pub fn delete_group(&self) -> DeleteGroupBuilder {
        DeleteGroupBuilder::new(self.context())
    }

    // -----------------------------------------------------------------------
    // Subscribe
    // -----------------------------------------------------------------------

    /// Builder for a single subscribe long-poll, dispatched on the subscribe
    /// transport.
    pub fn subscribe_request(&self) -> SubscribeRequestBuilder {
        SubscribeRequestBuilder::new(RequestContext::new(
            Arc::clone(&self.config),
            Arc::clone(&self.subscribe_transport),
        ))
    }

    fn context(&self) -> RequestContext {
        RequestContext::new(Arc::clone(&self.config), Arc::clone(&self.transport))
    }
}

impl std::fmt::Debug for PubSub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSub")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
