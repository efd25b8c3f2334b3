//! The generic request executor.
//!
//! [`execute`] is written once and drives every [`RequestDescriptor`]:
//!
//! 1. `validate`: failure returns before any I/O.
//! 2. `build_path`, `build_query`, `build_body`: failure is a construction error.
//! 3. Merge instance-level global parameters, then the standard set
//!    (`uuid`, `pnsdk`, `auth`), which always wins on key overlap.
//! 4. Sign the request when a secret key is configured.
//! 5. Dispatch through the descriptor's transport, racing the cancellation
//!    token and the overall request deadline.
//! 6. Map status ≥ 400 to [`PubSubError::Http`], keeping the body.
//!
//! The executor spawns nothing; the caller's task drives the whole exchange.

use chrono::Utc;
use tracing::{debug, warn, Instrument};

use crate::signature;
use crate::{
    Config, HttpRequest, PubSubError, QueryParams, RequestDescriptor, RequestFailure,
    StatusResponse, TransportError, TransportErrorKind,
};

/// Name stamped into the `pnsdk` parameter.
pub const SDK_NAME: &str = "PubSub-Rust";

/// `pnsdk` value: SDK name and crate version.
pub fn sdk_identifier() -> String {
    format!("{SDK_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

/// Raw body and status of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub body: Vec<u8>,
    pub status: StatusResponse,
}

/// Runs one descriptor through validation, construction, and dispatch.
pub async fn execute<D>(descriptor: &D) -> Result<RawResponse, RequestFailure>
where
    D: RequestDescriptor + ?Sized,
{
    let operation = descriptor.operation_type();
    let span = tracing::debug_span!("request", operation = %operation);

    async move {
        let mut status = initial_status(descriptor);

        if let Err(error) = descriptor.validate() {
            debug!(%error, "descriptor failed validation");
            return Err(RequestFailure::new(status, error));
        }

        let request = match build_request(descriptor) {
            Ok(request) => request,
            Err(error) => {
                debug!(%error, "request construction failed");
                return Err(RequestFailure::new(status, error));
            }
        };

        debug!(method = %request.method, path = %request.path, "dispatching request");

        let token = descriptor.context();
        let deadline = request.request_timeout;
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(PubSubError::Cancelled),
            result = tokio::time::timeout(deadline, descriptor.http_client().send(request)) => {
                match result {
                    Ok(sent) => sent.map_err(PubSubError::from),
                    Err(_) => Err(PubSubError::from(TransportError::new(
                        TransportErrorKind::Timeout,
                        format!("no response within {deadline:?}"),
                    ))),
                }
            }
        };

        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "request did not complete");
                return Err(RequestFailure::new(status, error));
            }
        };

        status.status_code = Some(response.status);

        if response.status >= 400 {
            warn!(status = response.status, "server returned an error status");
            let error = PubSubError::Http {
                status_code: response.status,
                body: response.body,
            };
            return Err(RequestFailure::new(status, error));
        }

        debug!(
            status = response.status,
            bytes = response.body.len(),
            "request completed"
        );

        Ok(RawResponse {
            body: response.body,
            status,
        })
    }
    .instrument(span)
    .await
}

fn initial_status<D>(descriptor: &D) -> StatusResponse
where
    D: RequestDescriptor + ?Sized,
{
    let config = descriptor.config();
    StatusResponse {
        operation: descriptor.operation_type(),
        status_code: None,
        is_error: false,
        error_message: None,
        tls_enabled: config.secure,
        origin: config.origin.clone(),
        uuid: config.uuid.to_string(),
        affected_channels: descriptor.affected_channels(),
        affected_groups: descriptor.affected_groups(),
    }
}

fn build_request<D>(descriptor: &D) -> Result<HttpRequest, PubSubError>
where
    D: RequestDescriptor + ?Sized,
{
    let config = descriptor.config();
    let method = descriptor.http_method();

    let path = descriptor.build_path()?;
    let mut query = descriptor.build_query()?;
    for (key, value) in &config.global_query_params {
        query.set_default(key.clone(), value.clone());
    }
    apply_standard_params(&mut query, config, descriptor.is_auth_required());

    let body = descriptor.build_body()?;

    if let Some(secret) = &config.secret_key {
        query.remove("signature");
        query.set("timestamp", Utc::now().timestamp().to_string());
        let publish_key = config
            .publish_key
            .as_ref()
            .map(|k| k.as_str())
            .unwrap_or_default();
        let input = signature::signing_input(method, publish_key, &path, &query.encode(), &body);
        query.set_encoded("signature", signature::sign(secret, &input)?);
    }

    Ok(HttpRequest {
        method,
        scheme: config.scheme(),
        origin: config.origin.clone(),
        path,
        query: query.encode(),
        body,
        connect_timeout: descriptor.connect_timeout(),
        request_timeout: descriptor.request_timeout(),
    })
}

/// Writes the standard parameters over whatever the operation set.
///
/// `auth` is present iff the operation requires it and a key is configured.
pub fn apply_standard_params(query: &mut QueryParams, config: &Config, auth_required: bool) {
    query.set("uuid", config.uuid.as_str());
    query.set("pnsdk", sdk_identifier());

    match (&config.auth_key, auth_required) {
        (Some(auth), true) => {
            query.set("auth", auth.as_str());
        }
        _ => {
            query.remove("auth");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;
    use url::form_urlencoded;

    use super::*;
    use crate::errors::MISSING_CHANNEL_GROUP;
    use crate::testing::{StubReply, StubTransport};
    use crate::{HttpTransport, OperationType, SecretKey};

    struct Fixture {
        config: Config,
        transport: Arc<StubTransport>,
        token: CancellationToken,
        group: String,
        query: QueryParams,
        auth_required: bool,
    }

    impl Fixture {
        fn new(config: Config, transport: Arc<StubTransport>) -> Self {
            Self {
                config,
                transport,
                token: CancellationToken::new(),
                group: "g".into(),
                query: QueryParams::new(),
                auth_required: true,
            }
        }
    }

    impl RequestDescriptor for Fixture {
        fn config(&self) -> &Config {
            &self.config
        }

        fn http_client(&self) -> &dyn HttpTransport {
            self.transport.as_ref()
        }

        fn context(&self) -> CancellationToken {
            self.token.clone()
        }

        fn validate(&self) -> Result<(), PubSubError> {
            if self.group.is_empty() {
                return Err(PubSubError::validation(MISSING_CHANNEL_GROUP));
            }
            Ok(())
        }

        fn build_path(&self) -> Result<String, PubSubError> {
            Ok(format!("/fixture/{}", self.group))
        }

        fn build_query(&self) -> Result<QueryParams, PubSubError> {
            Ok(self.query.clone())
        }

        fn is_auth_required(&self) -> bool {
            self.auth_required
        }

        fn operation_type(&self) -> OperationType {
            OperationType::ChannelsForGroup
        }

        fn affected_groups(&self) -> Vec<String> {
            vec![self.group.clone()]
        }
    }

    fn pairs(query: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    fn value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn validation_failure_never_dispatches() {
        let transport = Arc::new(StubTransport::new());
        let mut fixture = Fixture::new(Config::new("sub", "pub"), transport.clone());
        fixture.group.clear();

        let failure = execute(&fixture).await.unwrap_err();

        assert!(matches!(failure.error, PubSubError::Validation { .. }));
        assert!(failure.status.is_error);
        assert_eq!(failure.status.operation, OperationType::ChannelsForGroup);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn standard_params_are_present_and_win_over_operation_values() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));
        let config = Config::new("sub", "pub")
            .with_uuid("real-id")
            .with_auth_key("real-auth");
        let mut fixture = Fixture::new(config, transport.clone());
        fixture.query.set("uuid", "spoofed").set("custom", "1");

        let raw = execute(&fixture).await.unwrap();
        let sent = transport.requests();
        let q = pairs(&sent[0].query);

        assert_eq!(raw.status.status_code, Some(200));
        assert!(!raw.status.is_error);
        assert_eq!(q.iter().filter(|(k, _)| k == "uuid").count(), 1);
        assert_eq!(value(&q, "uuid"), Some("real-id"));
        assert_eq!(value(&q, "auth"), Some("real-auth"));
        assert_eq!(value(&q, "custom"), Some("1"));
        assert!(value(&q, "pnsdk").unwrap().starts_with(SDK_NAME));
    }

    #[tokio::test]
    async fn auth_is_omitted_when_not_required_or_not_configured() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));

        let mut fixture = Fixture::new(
            Config::new("sub", "pub").with_auth_key("k"),
            transport.clone(),
        );
        fixture.auth_required = false;
        fixture.query.set("auth", "sneaky");
        execute(&fixture).await.unwrap();

        let fixture = Fixture::new(Config::new("sub", "pub"), transport.clone());
        execute(&fixture).await.unwrap();

        for request in transport.requests() {
            assert!(value(&pairs(&request.query), "auth").is_none());
        }
    }

    #[tokio::test]
    async fn global_params_fill_but_do_not_override() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));
        let config = Config::new("sub", "pub")
            .with_global_query_param("region", "eu")
            .with_global_query_param("custom", "global")
            .with_global_query_param("uuid", "global-id");
        let mut fixture = Fixture::new(config, transport.clone());
        fixture.query.set("custom", "local");

        execute(&fixture).await.unwrap();
        let q = pairs(&transport.requests()[0].query);

        assert_eq!(value(&q, "region"), Some("eu"));
        assert_eq!(value(&q, "custom"), Some("local"));
        assert_ne!(value(&q, "uuid"), Some("global-id"));
    }

    #[tokio::test]
    async fn request_uses_scheme_origin_and_declared_timeouts() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));
        let config = Config::new("sub", "pub")
            .with_origin("localhost:9000")
            .with_secure(false);
        let fixture = Fixture::new(config, transport.clone());

        let raw = execute(&fixture).await.unwrap();
        let sent = &transport.requests()[0];

        assert!(sent.url().starts_with("http://localhost:9000/fixture/g?"));
        assert_eq!(sent.request_timeout, Duration::from_secs(10));
        assert_eq!(sent.connect_timeout, Duration::from_secs(5));
        assert!(!raw.status.tls_enabled);
        assert_eq!(raw.status.affected_groups, vec!["g".to_string()]);
    }

    #[tokio::test]
    async fn http_error_keeps_status_and_body() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(403, r#"{"error":"forbidden"}"#));
        let fixture = Fixture::new(Config::new("sub", "pub"), transport);

        let failure = execute(&fixture).await.unwrap_err();

        assert_eq!(failure.status.status_code, Some(403));
        assert!(failure.status.is_error);
        assert_eq!(failure.error.status_code(), Some(403));
        assert_eq!(failure.error.body(), Some(&br#"{"error":"forbidden"}"#[..]));
    }

    #[tokio::test]
    async fn transport_failure_is_a_connection_error() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::Fail(TransportError::new(
            TransportErrorKind::Connect,
            "dns lookup failed",
        )));
        let fixture = Fixture::new(Config::new("sub", "pub"), transport);

        let failure = execute(&fixture).await.unwrap_err();

        assert!(matches!(failure.error, PubSubError::Connection(_)));
        assert_eq!(failure.status.status_code, None);
        assert!(failure.error.body().is_none());
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::Hang);
        let fixture = Fixture::new(Config::new("sub", "pub"), transport);
        let token = fixture.token.clone();

        let canceller = async {
            tokio::task::yield_now().await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(execute(&fixture), canceller);

        assert!(matches!(result.unwrap_err().error, PubSubError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn request_deadline_is_enforced() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::Hang);
        let fixture = Fixture::new(Config::new("sub", "pub"), transport);

        let failure = execute(&fixture).await.unwrap_err();

        match failure.error {
            PubSubError::Connection(e) => assert_eq!(e.kind, TransportErrorKind::Timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn secret_key_adds_timestamp_and_signature() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));
        let config = Config::new("sub", "pub").with_secret_key("sec");
        let fixture = Fixture::new(config, transport.clone());

        execute(&fixture).await.unwrap();
        let q = pairs(&transport.requests()[0].query);

        assert!(value(&q, "timestamp").unwrap().parse::<i64>().is_ok());
        assert!(value(&q, "signature").unwrap().starts_with("v2."));
    }

    #[tokio::test]
    async fn signature_covers_the_merged_query_without_itself() {
        let transport = Arc::new(StubTransport::new());
        transport.stub_any(StubReply::json(200, "{}"));
        let config = Config::new("sub", "pub-c-1")
            .with_secret_key("sec-c-1")
            .with_auth_key("auth-1")
            .with_global_query_param("region", "eu");
        let mut fixture = Fixture::new(config, transport.clone());
        fixture.query.set("signature", "x").set("custom", "a b");

        execute(&fixture).await.unwrap();
        let sent = &transport.requests()[0];

        let (signatures, rest): (Vec<&str>, Vec<&str>) = sent
            .query
            .split('&')
            .partition(|pair| pair.starts_with("signature="));
        assert_eq!(signatures.len(), 1);
        let sent_signature = signatures[0].trim_start_matches("signature=");
        assert_ne!(sent_signature, "x");

        let signed_query = rest.join("&");
        for key in ["auth=auth-1", "timestamp=", "uuid=", "pnsdk=", "region=eu", "custom=a+b"] {
            assert!(signed_query.contains(key), "{key} missing from {signed_query}");
        }

        let secret = SecretKey::new("sec-c-1").unwrap();
        let input = signature::signing_input(
            sent.method,
            "pub-c-1",
            &sent.path,
            &signed_query,
            &sent.body,
        );
        assert_eq!(sent_signature, signature::sign(&secret, &input).unwrap());
    }
}
