/// Integration tests for the legacy `/fcm/send` endpoint
///
/// Covers:
/// - Request body and headers for registration ids, topics and conditions
/// - Topic/condition rejection without any request
/// - Status code classification
/// - Canonical ID and NotRegistered extraction
mod common;

use common::{legacy_client, API_KEY};
use fcm_client::classifier::{BAD_REQUEST, INTERNAL_ERROR, SERVICE_UNAVAILABLE, UNAUTHORIZED};
use fcm_client::{CanonicalId, FcmError, MessageOptions};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALID_CONDITION: &str = "'TopicA' in topics && ('TopicB' in topics || 'TopicC' in topics)";
const INVALID_CONDITION: &str =
    "'TopicA' in topics and some other text ('TopicB' in topics || 'TopicC' in topics)";
const INVALID_CONDITION_TOPIC: &str = "'TopicA$' in topics";

fn score_data() -> MessageOptions {
    MessageOptions::new().with_data(json!({"score": "5x1", "time": "15:10"}))
}

async fn mount_send(server: &MockServer, body: serde_json::Value, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", format!("key={}", API_KEY).as_str()))
        .and(body_json(body))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_nothing_expected(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_posts_registration_ids() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"registration_ids": ["42"]}),
        ResponseTemplate::new(200).set_body_string("{}"),
    )
    .await;

    let response = legacy_client(&server)
        .send(vec!["42"], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(response.status_code, 200);
    assert_eq!(response.response, "success");
    assert_eq!(response.body, "{}");
    assert_eq!(response.canonical_ids, Some(vec![]));
    assert_eq!(response.not_registered_ids, Some(vec![]));
}

#[tokio::test]
async fn test_send_with_single_string_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(body_json(json!({"registration_ids": ["42"]})))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(2)
        .mount(&server)
        .await;

    let client = legacy_client(&server);
    let from_string = client
        .send("42", &MessageOptions::default())
        .await
        .expect("send");
    let from_list = client
        .send(vec!["42".to_string()], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(from_string.response, "success");
    assert_eq!(from_string.canonical_ids, from_list.canonical_ids);
}

#[tokio::test]
async fn test_send_with_data() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"registration_ids": ["42"], "data": {"score": "5x1", "time": "15:10"}}),
        ResponseTemplate::new(200),
    )
    .await;

    let response = legacy_client(&server)
        .send(vec!["42"], &score_data())
        .await
        .expect("send");

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_send_to_notification_key() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"to": "APA91bGHXQBB", "data": {"score": "5x1", "time": "15:10"}}),
        ResponseTemplate::new(200).set_body_string(r#"{"success":2,"failure":0}"#),
    )
    .await;

    let response = legacy_client(&server)
        .send_with_notification_key("APA91bGHXQBB", &score_data())
        .await
        .expect("send");

    assert_eq!(response.response, "success");
    assert_eq!(response.canonical_ids, None);
}

#[tokio::test]
async fn test_send_to_topic() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"to": "/topics/TopicA", "data": {"score": "5x1", "time": "15:10"}}),
        ResponseTemplate::new(200),
    )
    .await;

    let response = legacy_client(&server)
        .send_to_topic("TopicA", &score_data())
        .await
        .expect("send");

    assert_eq!(response.response, "success");
    assert_eq!(response.canonical_ids, None);
    assert_eq!(response.not_registered_ids, None);
}

#[tokio::test]
async fn test_send_to_invalid_topic_issues_no_request() {
    let server = MockServer::start().await;
    mount_nothing_expected(&server).await;

    let result = legacy_client(&server)
        .send_to_topic("TopicA$", &score_data())
        .await;

    assert!(matches!(result, Err(FcmError::InvalidTopic(_))));
}

#[tokio::test]
async fn test_send_to_topic_condition() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"condition": VALID_CONDITION, "data": {"score": "5x1", "time": "15:10"}}),
        ResponseTemplate::new(200),
    )
    .await;

    let response = legacy_client(&server)
        .send_to_topic_condition(VALID_CONDITION, &score_data())
        .await
        .expect("send");

    assert_eq!(response.response, "success");
}

#[tokio::test]
async fn test_invalid_conditions_issue_no_request() {
    let server = MockServer::start().await;
    mount_nothing_expected(&server).await;
    let client = legacy_client(&server);

    for condition in [INVALID_CONDITION, INVALID_CONDITION_TOPIC] {
        let result = client
            .send_to_topic_condition(condition, &score_data())
            .await;

        match result {
            Err(FcmError::InvalidCondition(rejected)) => assert_eq!(rejected, condition),
            other => panic!("expected InvalidCondition, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_failure_status_codes_are_classified() {
    let cases = [
        (400, BAD_REQUEST),
        (401, UNAUTHORIZED),
        (503, SERVICE_UNAVAILABLE),
        (500, INTERNAL_ERROR),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        mount_send(
            &server,
            json!({"registration_ids": ["42"]}),
            ResponseTemplate::new(status).set_body_string("{}"),
        )
        .await;

        let response = legacy_client(&server)
            .send(vec!["42"], &MessageOptions::default())
            .await
            .expect("remote failures are not errors");

        assert_eq!(response.status_code, status);
        assert_eq!(response.response, expected);
        assert_eq!(response.body, "{}");
        assert_eq!(response.canonical_ids, None);
        assert_eq!(response.not_registered_ids, None);
    }
}

#[tokio::test]
async fn test_5xx_keeps_raw_body_and_headers() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"registration_ids": ["42"]}),
        ResponseTemplate::new(599)
            .insert_header("header-key", "Header value")
            .set_body_string(r#"{"body-key" => "Body value"}"#),
    )
    .await;

    let response = legacy_client(&server)
        .send(vec!["42"], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(response.status_code, 599);
    assert_eq!(response.response, INTERNAL_ERROR);
    assert_eq!(response.body, r#"{"body-key" => "Body value"}"#);
    assert_eq!(
        response.headers.get("header-key").map(String::as_str),
        Some("Header value")
    );
}

#[tokio::test]
async fn test_canonical_ids_are_extracted() {
    let server = MockServer::start().await;
    let body = r#"{"failure":0,"canonical_ids":1,"results":[{"registration_id":"43","message_id":"0:1385025861956342%572c22801bb3"}]}"#;
    mount_send(
        &server,
        json!({"registration_ids": ["42"]}),
        ResponseTemplate::new(200).set_body_string(body),
    )
    .await;

    let response = legacy_client(&server)
        .send(vec!["42"], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(response.response, "success");
    assert_eq!(response.body, body);
    assert_eq!(
        response.canonical_ids,
        Some(vec![CanonicalId {
            old: "42".to_string(),
            new: "43".to_string(),
        }])
    );
    assert_eq!(response.not_registered_ids, Some(vec![]));
}

#[tokio::test]
async fn test_not_registered_ids_are_extracted() {
    let server = MockServer::start().await;
    let body = r#"{"canonical_ids":0,"failure":1,"results":[{"error":"NotRegistered"}]}"#;
    mount_send(
        &server,
        json!({"registration_ids": ["42"]}),
        ResponseTemplate::new(200).set_body_string(body),
    )
    .await;

    let response = legacy_client(&server)
        .send(vec!["42"], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(response.canonical_ids, Some(vec![]));
    assert_eq!(response.not_registered_ids, Some(vec!["42".to_string()]));
}

#[tokio::test]
async fn test_endpoint_userinfo_does_not_replace_api_key() {
    let server = MockServer::start().await;
    mount_send(
        &server,
        json!({"registration_ids": ["42"]}),
        ResponseTemplate::new(200).set_body_string("{}"),
    )
    .await;

    let base = server.uri().replacen("http://", "http://a:b@", 1);
    let client = fcm_client::FcmClient::with_config(
        fcm_client::Credentials::api_key(API_KEY),
        fcm_client::FcmConfig::with_base(&base),
    )
    .expect("client");

    let response = client
        .send(vec!["42"], &MessageOptions::default())
        .await
        .expect("send");

    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = fcm_client::FcmClient::with_config(
        fcm_client::Credentials::api_key(API_KEY),
        fcm_client::FcmConfig::with_base("http://127.0.0.1:1"),
    )
    .expect("client");

    let result = client.send(vec!["42"], &MessageOptions::default()).await;

    assert!(matches!(result, Err(FcmError::Transport(_))));
}
