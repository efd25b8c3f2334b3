//! Channel-group registry and subscribe operations.
//!
//! Each operation is a pair: a descriptor implementing
//! [`request::RequestDescriptor`] and a builder that collects the caller's
//! inputs, runs the descriptor through [`request::execute`], and parses the
//! body into a typed response. [`PubSub`] hands out the builders.
//!
//! ## Architectural Layer
//!
//! **Application layer.** This crate depends only on the `request` domain
//! crate. It never names a concrete HTTP client; the transports it dispatches
//! through are injected into [`PubSub`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`channel_groups`] | List, add, remove, and delete operations on channel groups |
//! | [`subscribe`] | One subscribe long-poll and its typed envelope |
//! | `client` | The [`PubSub`] facade |

mod client;
mod context;

pub mod channel_groups;
pub mod subscribe;

pub use channel_groups::{
    AllChannelsInGroup, ChannelGroupAck, DeleteGroupBuilder, GroupMembershipBuilder,
    ListChannelsInGroupBuilder, MembershipChange,
};
pub use client::PubSub;
pub use subscribe::{
    SubscribeCursor, SubscribeEnvelope, SubscribeMessage, SubscribeRequestBuilder,
};
