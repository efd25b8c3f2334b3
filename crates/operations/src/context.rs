//! State every descriptor carries, plus the macros that wire it into the
//! [`RequestDescriptor`](request::RequestDescriptor) hooks and the builders.

use std::collections::BTreeMap;
use std::sync::Arc;

use request::{CancellationToken, Config, HttpTransport, QueryParams};

/// Configuration, transport pool, cancellation handle, and caller-supplied
/// query parameters for one request.
#[derive(Clone)]
pub(crate) struct RequestContext {
    pub(crate) config: Arc<Config>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) cancellation: CancellationToken,
    pub(crate) query_params: BTreeMap<String, String>,
}

impl RequestContext {
    pub(crate) fn new(config: Arc<Config>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            cancellation: CancellationToken::new(),
            query_params: BTreeMap::new(),
        }
    }

    /// Starting query for `build_query`: the caller's extra parameters.
    pub(crate) fn base_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        for (key, value) in &self.query_params {
            query.set(key.clone(), value.clone());
        }
        query
    }

    /// Subscribe key encoded for a path segment, or empty if unset.
    pub(crate) fn subscribe_key_segment(&self) -> String {
        self.config
            .subscribe_key
            .as_ref()
            .map(|k| request::encoding::encode_path_segment(k.as_str()))
            .unwrap_or_default()
    }
}

/// Drops empty names so they never reach the wire as empty list entries.
pub(crate) fn non_empty(names: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    names
        .into_iter()
        .map(Into::into)
        .filter(|n| !n.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Expands to the `config`, `http_client`, and `context` hooks for a descriptor
// whose `RequestContext` lives in `self.ctx`.
// ---------------------------------------------------------------------------
macro_rules! context_hooks {
    () => {
        fn config(&self) -> &request::Config {
            &self.ctx.config
        }

        fn http_client(&self) -> &dyn request::HttpTransport {
            self.ctx.transport.as_ref()
        }

        fn context(&self) -> request::CancellationToken {
            self.ctx.cancellation.clone()
        }
    };
}

// ---------------------------------------------------------------------------
// Expands to the setters every builder shares. The builder's descriptor lives
// in `self.request`.
// ---------------------------------------------------------------------------
macro_rules! common_builder_methods {
    () => {
        /// Adds an extra query parameter. The standard parameters (`uuid`,
        /// `pnsdk`, `auth`) cannot be overridden this way.
        pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.request
                .ctx
                .query_params
                .insert(key.into(), value.into());
            self
        }

        /// Attaches a cancellation token. Cancelling it aborts the request in
        /// flight with [`request::PubSubError::Cancelled`].
        pub fn cancellation(mut self, token: request::CancellationToken) -> Self {
            self.request.ctx.cancellation = token;
            self
        }
    };
}

pub(crate) use {common_builder_methods, context_hooks};
