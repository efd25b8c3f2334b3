//! The request descriptor capability trait.
//!
//! A descriptor fully specifies one HTTP request through a fixed set of hooks.
//! Everything that is the same for every operation (standard query parameters,
//! auth, signing, timeouts, dispatch, status construction) lives in
//! [`crate::execute`], so adding an operation means writing one descriptor,
//! one builder, and one parser.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Config, HttpMethod, HttpTransport, OperationType, PubSubError, QueryParams};

/// Hooks the executor calls to assemble and dispatch one request.
///
/// Hooks are called in a fixed order: `validate`, `build_path`,
/// `build_query`, `build_body`. A descriptor whose `validate` fails is never
/// dispatched.
pub trait RequestDescriptor: Send + Sync {
    /// Configuration snapshot this request is built from.
    fn config(&self) -> &Config;

    /// Transport pool to dispatch through.
    fn http_client(&self) -> &dyn HttpTransport;

    /// Cancellation handle for this request. Every request carries one; the
    /// default token never fires unless the caller cancels it.
    fn context(&self) -> CancellationToken;

    /// Checks inputs before any I/O. Errors must be [`PubSubError::Validation`].
    fn validate(&self) -> Result<(), PubSubError>;

    /// URL path with all substitutions made and every segment encoded.
    fn build_path(&self) -> Result<String, PubSubError>;

    /// Operation-specific query parameters. Values are raw unless set with
    /// [`QueryParams::set_encoded`].
    fn build_query(&self) -> Result<QueryParams, PubSubError>;

    fn build_body(&self) -> Result<Vec<u8>, PubSubError> {
        Ok(Vec::new())
    }

    fn http_method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    /// Whether the configured auth key is sent as `auth`.
    fn is_auth_required(&self) -> bool {
        true
    }

    fn request_timeout(&self) -> Duration {
        self.config().non_subscribe_request_timeout
    }

    fn connect_timeout(&self) -> Duration {
        self.config().connect_timeout
    }

    fn operation_type(&self) -> OperationType;

    /// Channels reported on the [`crate::StatusResponse`].
    fn affected_channels(&self) -> Vec<String> {
        Vec::new()
    }

    /// Channel groups reported on the [`crate::StatusResponse`].
    fn affected_groups(&self) -> Vec<String> {
        Vec::new()
    }
}
