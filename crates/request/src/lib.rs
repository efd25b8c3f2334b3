//! Request pipeline for the channel-group registry and subscribe clients.
//!
//! Every operation against the messaging service is expressed as a
//! [`RequestDescriptor`]: a fixed set of hooks declaring the path, query, body,
//! method, timeouts, and authentication needs of one HTTP request. The single
//! generic [`execute`] function turns any descriptor into an HTTP round-trip
//! and a [`StatusResponse`].
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate owns no concrete HTTP client. It
//! defines [`HttpTransport`]; the `transport` crate supplies a `reqwest`
//! implementation and tests supply a stub.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | Process-wide [`Config`] and its environment loader |
//! | [`identifiers`] | Newtype keys and identity (`SubscribeKey`, `UserId`, etc.) |
//! | [`types`] | Shared value types (`OperationType`, `HttpMethod`, `Timetoken`, `StatusResponse`) |
//! | [`errors`] | Error taxonomy and stable validation messages |
//! | [`encoding`] | Path-segment and filter-expression percent-encoders |
//! | [`query`] | [`QueryParams`] and its form encoder |
//! | [`descriptor`] | The [`RequestDescriptor`] capability trait |
//! | [`transport`] | The [`HttpTransport`] port and its request/response records |
//! | [`signature`] | HMAC request signing |
//! | [`executor`] | The generic [`execute`] engine |

pub mod config;
pub mod descriptor;
pub mod encoding;
pub mod errors;
pub mod executor;
pub mod identifiers;
pub mod query;
pub mod signature;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::Config;
pub use descriptor::RequestDescriptor;
pub use errors::{ConfigError, PubSubError, RequestFailure, TransportError, TransportErrorKind};
pub use executor::{execute, RawResponse, SDK_NAME};
pub use identifiers::{AuthKey, PublishKey, SecretKey, SubscribeKey, UserId};
pub use query::{QueryParams, QueryValue};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};
pub use types::{HttpMethod, OperationType, StatusResponse, Timetoken};

pub use tokio_util::sync::CancellationToken;
