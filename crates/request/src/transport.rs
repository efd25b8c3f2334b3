//! The HTTP transport port.
//!
//! The executor builds an [`HttpRequest`] and hands it to whatever
//! [`HttpTransport`] the descriptor names. Implementations own connection
//! pooling and the connect deadline; the executor also bounds the whole
//! exchange by `request_timeout`. Implementations must not add query
//! parameters or re-encode the path.

use std::time::Duration;

use async_trait::async_trait;

use crate::{HttpMethod, TransportError};

/// A fully assembled request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// `https` or `http`.
    pub scheme: &'static str,
    /// Host (and optional port), without scheme.
    pub origin: String,
    /// Fully encoded path, starting with `/`.
    pub path: String,
    /// Fully encoded query string without the leading `?`. May be empty.
    pub query: String,
    pub body: Vec<u8>,
    pub connect_timeout: Duration,
    /// Deadline for the whole exchange, including reading the body.
    pub request_timeout: Duration,
}

impl HttpRequest {
    /// Absolute URL: scheme, origin, path, and query.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            format!("{}://{}{}", self.scheme, self.origin, self.path)
        } else {
            format!("{}://{}{}?{}", self.scheme, self.origin, self.path, self.query)
        }
    }
}

/// Status code and complete body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Sends one request and reads the full response body.
///
/// Any status code is a successful transport outcome; the executor decides
/// what counts as an HTTP error.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
