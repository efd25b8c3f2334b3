//! In-memory [`HttpTransport`] for tests.
//!
//! [`StubTransport`] records every request it is asked to send and answers
//! from a list of stubs. A stub matches on path (optionally) and on a set of
//! required decoded query pairs; when several match, the one with the most
//! query constraints wins, then the earliest registered. Unmatched requests
//! fail with a transport error.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use url::form_urlencoded;

use crate::{HttpRequest, HttpResponse, HttpTransport, TransportError, TransportErrorKind};

/// What a matched stub does.
#[derive(Debug, Clone)]
pub enum StubReply {
    Respond { status: u16, body: Vec<u8> },
    Fail(TransportError),
    /// Never completes; used to exercise cancellation and deadlines.
    Hang,
}

impl StubReply {
    pub fn json(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.as_bytes().to_vec(),
        }
    }
}

#[derive(Debug)]
struct Stub {
    path: Option<String>,
    query: Vec<(String, String)>,
    reply: StubReply,
}

impl Stub {
    fn matches(&self, request: &HttpRequest, pairs: &[(String, String)]) -> bool {
        if let Some(path) = &self.path {
            if path != &request.path {
                return false;
            }
        }
        self.query.iter().all(|wanted| pairs.contains(wanted))
    }
}

#[derive(Debug, Default)]
pub struct StubTransport {
    stubs: Mutex<Vec<Stub>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request.
    pub fn stub_any(&self, reply: StubReply) {
        self.push(None, &[], reply);
    }

    /// Answers requests for exactly `path`.
    pub fn stub(&self, path: impl Into<String>, reply: StubReply) {
        self.push(Some(path.into()), &[], reply);
    }

    /// Answers requests for `path` whose decoded query contains every pair.
    pub fn stub_with_query(&self, path: impl Into<String>, query: &[(&str, &str)], reply: StubReply) {
        self.push(Some(path.into()), query, reply);
    }

    /// Requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, path: Option<String>, query: &[(&str, &str)], reply: StubReply) {
        let query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.stubs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Stub { path, query, reply });
    }

    fn find_reply(&self, request: &HttpRequest) -> Option<StubReply> {
        let pairs: Vec<(String, String)> = form_urlencoded::parse(request.query.as_bytes())
            .into_owned()
            .collect();
        let stubs = self.stubs.lock().unwrap_or_else(PoisonError::into_inner);

        let mut best: Option<&Stub> = None;
        for stub in stubs.iter().filter(|s| s.matches(request, &pairs)) {
            if best.map_or(true, |b| stub.query.len() > b.query.len()) {
                best = Some(stub);
            }
        }
        best.map(|s| s.reply.clone())
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self.find_reply(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match reply {
            Some(StubReply::Respond { status, body }) => Ok(HttpResponse { status, body }),
            Some(StubReply::Fail(error)) => Err(error),
            Some(StubReply::Hang) => std::future::pending().await,
            None => Err(TransportError::new(
                TransportErrorKind::Other,
                format!("no stub matches {} {}", request.method, request.path),
            )),
        }
    }
}
