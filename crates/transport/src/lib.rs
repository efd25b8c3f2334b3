//! HTTP transport adapter.
//!
//! Implements the [`request::HttpTransport`] port on top of `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, TLS, and socket timeouts live here.
//! The `request` and `operations` crates see only [`request::HttpTransport`].
//!
//! A client keeps one `reqwest::Client` per pool. Build one
//! [`ReqwestTransport`] for subscribe long-polls and another for everything
//! else, so a held long-poll never occupies a connection a short request
//! needs.

use std::time::Duration;

use async_trait::async_trait;
use request::{
    Config, HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError,
    TransportErrorKind,
};
use tracing::{debug, trace};

const SUBSCRIBE_IDLE_CONNECTIONS: usize = 1;

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport whose connections give up after `connect_timeout`.
    ///
    /// The overall request deadline is taken from each [`HttpRequest`].
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        Self::build(reqwest::Client::builder().connect_timeout(connect_timeout))
    }

    /// Transport for channel-group and other short requests.
    pub fn for_non_subscribe(config: &Config) -> Result<Self, TransportError> {
        Self::new(config.connect_timeout)
    }

    /// Transport for subscribe long-polls.
    ///
    /// A client holds at most one long-poll per origin, so only one idle
    /// connection is kept for reuse.
    pub fn for_subscribe(config: &Config) -> Result<Self, TransportError> {
        Self::build(
            reqwest::Client::builder()
                .connect_timeout(config.connect_timeout)
                .pool_max_idle_per_host(SUBSCRIBE_IDLE_CONNECTIONS),
        )
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self, TransportError> {
        let client = builder
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;
        Ok(Self { client })
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Put => reqwest::Method::PUT,
    }
}

fn classify(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    }
}

fn transport_error(error: reqwest::Error) -> TransportError {
    TransportError::new(classify(&error), error.to_string())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url();
        trace!(%url, "sending request");

        let mut builder = self
            .client
            .request(method(request.method), &url)
            .timeout(request.request_timeout);
        if !request.body.is_empty() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(request.body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
