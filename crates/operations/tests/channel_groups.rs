//! End-to-end channel-group flows through [`PubSub`] against a stub transport.

use std::sync::Arc;

use operations::PubSub;
use percent_encoding::percent_decode_str;
use request::testing::{StubReply, StubTransport};
use request::{Config, OperationType, PubSubError};

const SUB_KEY: &str = "sub-c-test";
const GROUP_PATH: &str = "/v1/channel-registration/sub-key/sub-c-test/channel-group";

fn client(config: Config) -> (PubSub, Arc<StubTransport>) {
    let stub = Arc::new(StubTransport::new());
    let pubsub = PubSub::new(config, stub.clone(), Arc::new(StubTransport::new()));
    (pubsub, stub)
}

fn keyed_client() -> (PubSub, Arc<StubTransport>) {
    client(Config::new(SUB_KEY, "").with_uuid("test-user"))
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query_pairs(query)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_group_fails_validation_without_dispatch() {
    let (pubsub, stub) = keyed_client();

    let failure = pubsub.list_channels_in_group().execute().await.unwrap_err();

    assert!(matches!(failure.error, PubSubError::Validation { .. }));
    assert!(failure.error.to_string().contains("Missing Channel Group"));
    assert!(failure.status.is_error);
    assert_eq!(failure.status.status_code, None);

    let failure = pubsub.delete_group().execute().await.unwrap_err();
    assert!(failure.error.to_string().contains("Missing Channel Group"));

    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn missing_subscribe_key_is_reported_before_group() {
    let (pubsub, stub) = client(Config::new("", ""));

    let failure = pubsub.list_channels_in_group().execute().await.unwrap_err();

    assert!(failure.error.to_string().contains("Missing Subscribe Key"));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn add_without_channels_is_rejected() {
    let (pubsub, stub) = keyed_client();

    let failure = pubsub
        .add_channels_to_group()
        .channel_group("g")
        .channels(["", ""])
        .execute()
        .await
        .unwrap_err();

    assert!(failure.error.to_string().contains("Missing Channel"));
    assert_eq!(failure.status.operation, OperationType::AddChannelsToGroup);
    assert!(stub.requests().is_empty());
}

// ---------------------------------------------------------------------------
// Path and query construction
// ---------------------------------------------------------------------------

#[tokio::test]
async fn special_characters_in_group_survive_as_one_segment() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::json(200, r#"{"payload":{"channels":[]}}"#));
    let group = "my group/with?query#frag&more";

    pubsub
        .list_channels_in_group()
        .channel_group(group)
        .execute()
        .await
        .unwrap();

    let sent = &stub.requests()[0];
    let url = url::Url::parse(&sent.url()).unwrap();
    let segments: Vec<&str> = url.path_segments().unwrap().collect();

    assert_eq!(segments.len(), 6);
    assert!(!segments[5].contains('?'));
    assert!(!segments[5].contains('#'));
    assert!(!segments[5].contains('/'));
    assert_eq!(
        percent_decode_str(segments[5]).decode_utf8().unwrap(),
        group
    );
    assert!(url.fragment().is_none());
}

#[tokio::test]
async fn reserved_and_sub_delimiter_characters_in_group_round_trip() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::json(200, r#"{"payload":{"channels":[]}}"#));
    let group = "-_~?#[]@!$&'()+;=`|";

    let (_, status) = pubsub
        .list_channels_in_group()
        .channel_group(group)
        .execute()
        .await
        .unwrap();

    let sent = &stub.requests()[0];
    assert_eq!(
        sent.path,
        format!("{GROUP_PATH}/-_~%3F%23[]@!$%26'()%2B%3B%3D`|")
    );

    let segment = sent.path.rsplit('/').next().unwrap();
    assert_eq!(percent_decode_str(segment).decode_utf8().unwrap(), group);
    assert_eq!(status.affected_groups, vec![group]);
}

#[tokio::test]
async fn standard_parameters_are_always_sent() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::json(200, "{}"));

    pubsub
        .list_channels_in_group()
        .channel_group("g")
        .query_param("uuid", "spoofed")
        .query_param("custom", "1")
        .execute()
        .await
        .unwrap();

    let query = &stub.requests()[0].query;
    assert_eq!(query_value(query, "uuid").as_deref(), Some("test-user"));
    assert!(query_value(query, "pnsdk").unwrap().starts_with("PubSub-Rust/"));
    assert_eq!(query_value(query, "custom").as_deref(), Some("1"));
    assert_eq!(query_value(query, "auth"), None);
}

#[tokio::test]
async fn auth_key_is_sent_when_configured() {
    let (pubsub, stub) = client(Config::new(SUB_KEY, "").with_auth_key("secret-token"));
    stub.stub_any(StubReply::json(200, "{}"));

    pubsub
        .delete_group()
        .channel_group("g")
        .execute()
        .await
        .unwrap();

    let sent = &stub.requests()[0];
    assert_eq!(sent.path, format!("{GROUP_PATH}/g/remove"));
    assert_eq!(
        query_value(&sent.query, "auth").as_deref(),
        Some("secret-token")
    );
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_list_returns_channels_and_status() {
    let (pubsub, stub) = keyed_client();
    stub.stub(
        format!("{GROUP_PATH}/my-group"),
        StubReply::json(
            200,
            r#"{"status":200,"payload":{"channels":["my-channel"],"group":"my-group"},"service":"channel-registry","error":false}"#,
        ),
    );

    let (channels, status) = pubsub
        .list_channels_in_group()
        .channel_group("my-group")
        .execute()
        .await
        .unwrap();

    assert_eq!(channels.group, "my-group");
    assert_eq!(channels.channels, vec!["my-channel"]);
    assert_eq!(status.status_code, Some(200));
    assert!(!status.is_error);
    assert_eq!(status.operation, OperationType::ChannelsForGroup);
    assert_eq!(status.affected_groups, vec!["my-group"]);
    assert_eq!(status.uuid, "test-user");
    assert!(status.tls_enabled);
}

#[tokio::test]
async fn malformed_body_is_a_parsing_error_with_body() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::json(200, "not-json"));

    let failure = pubsub
        .list_channels_in_group()
        .channel_group("g")
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PubSubError::ResponseParsing { .. }));
    assert_eq!(failure.error.body(), Some(b"not-json".as_slice()));
    assert_eq!(failure.status.status_code, Some(200));
    assert!(failure.status.is_error);
}

#[tokio::test]
async fn http_error_keeps_status_and_body() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::json(403, r#"{"error":"forbidden"}"#));

    let failure = pubsub
        .list_channels_in_group()
        .channel_group("g")
        .execute()
        .await
        .unwrap_err();

    match &failure.error {
        PubSubError::Http { status_code, body } => {
            assert_eq!(*status_code, 403);
            let json: serde_json::Value = serde_json::from_slice(body).unwrap();
            assert_eq!(json["error"], "forbidden");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(failure.status.status_code, Some(403));
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_list_remove_flow() {
    let (pubsub, stub) = keyed_client();
    let path = format!("{GROUP_PATH}/flow");
    let ack = r#"{"status":200,"message":"OK","service":"channel-registry","error":false}"#;
    stub.stub_with_query(&path, &[("add", "a,b")], StubReply::json(200, ack));
    stub.stub_with_query(&path, &[("remove", "a")], StubReply::json(200, ack));
    stub.stub(
        &path,
        StubReply::json(200, r#"{"payload":{"channels":["a","b"],"group":"flow"}}"#),
    );

    let (added, _) = pubsub
        .add_channels_to_group()
        .channel_group("flow")
        .channels(["a", "b"])
        .execute()
        .await
        .unwrap();
    assert_eq!(added.status, 200);
    assert_eq!(added.message, "OK");

    // Listing twice without an intervening mutation sends the same request.
    let (first, _) = pubsub
        .list_channels_in_group()
        .channel_group("flow")
        .execute()
        .await
        .unwrap();
    let (second, _) = pubsub
        .list_channels_in_group()
        .channel_group("flow")
        .execute()
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.channels, vec!["a", "b"]);

    let (removed, status) = pubsub
        .remove_channels_from_group()
        .channel_group("flow")
        .channels(["a"])
        .execute()
        .await
        .unwrap();
    assert_eq!(removed.message, "OK");
    assert_eq!(status.affected_channels, vec!["a"]);

    let requests = stub.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(query_value(&requests[0].query, "add").as_deref(), Some("a,b"));
    assert_eq!(
        query_pairs(&requests[1].query),
        query_pairs(&requests[2].query)
    );
    assert_eq!(query_value(&requests[3].query, "remove").as_deref(), Some("a"));
}

#[tokio::test]
async fn cancelled_token_aborts_request() {
    let (pubsub, stub) = keyed_client();
    stub.stub_any(StubReply::Hang);
    let token = request::CancellationToken::new();
    token.cancel();

    let failure = pubsub
        .list_channels_in_group()
        .channel_group("g")
        .cancellation(token)
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(failure.error, PubSubError::Cancelled));
    assert_eq!(failure.status.status_code, None);
}
