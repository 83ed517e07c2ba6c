//! Non-streaming request tests against a wiremock backend.

mod common;

use std::time::Duration;

use chatflow_client::{ApiResponse, ChatflowError, NetworkError, Rating, RequestOptions};
use common::{client_for, client_with_timeout, TEST_API_KEY, TEST_USER};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_conversations_sends_paging_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/conversations"))
        .and(query_param("limit", "100"))
        .and(query_param("first_id", ""))
        .and(query_param("user", TEST_USER))
        .and(header("Authorization", format!("Bearer {}", TEST_API_KEY)))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"id": "c1", "name": "Trip", "inputs": {}, "created_at": 1700000000},
                {"id": "c2", "name": "Recipes", "inputs": {}, "created_at": 1700000100}
            ],
            "has_more": false,
            "limit": 100
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let list = client.fetch_conversations().await.unwrap();

    assert_eq!(list.data.len(), 2);
    assert_eq!(list.data[1].name, "Recipes");
    assert_eq!(list.limit, 100);
}

#[tokio::test]
async fn test_update_feedback_posts_rating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages/m1/feedbacks"))
        .and(body_json(serde_json::json!({"rating": "like", "user": TEST_USER})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let ack = client.update_feedback("m1", Some(Rating::Like)).await.unwrap();
    assert!(ack.is_success());
}

#[tokio::test]
async fn test_no_content_skips_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/conversations/c1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let (client, notifier) = client_for(&server);
    let response = client
        .del("conversations/c1", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response, ApiResponse::Empty);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_binary_body_is_returned_as_blob() {
    let server = MockServer::start().await;
    let audio = vec![0x49u8, 0x44, 0x33, 0x04, 0x00];
    Mock::given(method("GET"))
        .and(path("/v1/files/f1/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(audio.clone(), "application/octet-stream"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let response = client
        .get("/files/f1/preview", RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(response, ApiResponse::Blob(audio.into()));
}

#[tokio::test]
async fn test_unauthorized_is_a_handled_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/parameters"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"message": "Access token is invalid"})),
        )
        .mount(&server)
        .await;

    let (client, notifier) = client_for(&server);
    let err = client.fetch_app_params().await.unwrap_err();

    assert!(matches!(err, ChatflowError::Network(NetworkError::Unauthorized)));
    assert_eq!(err.user_message(), "Invalid token");
    assert_eq!(notifier.messages(), vec!["Invalid token".to_string()]);
}

#[tokio::test]
async fn test_error_status_surfaces_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "not_found",
            "message": "Conversation Not Exists.",
            "status": 404
        })))
        .mount(&server)
        .await;

    let (client, notifier) = client_for(&server);
    let err = client.fetch_chat_list("missing").await.unwrap_err();

    match err {
        ChatflowError::Network(NetworkError::HttpStatus { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Conversation Not Exists.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(notifier.messages(), vec!["Conversation Not Exists.".to_string()]);
}

#[tokio::test]
async fn test_full_response_keeps_status_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/parameters"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-42")
                .set_body_json(serde_json::json!({"opening_statement": "Hi"})),
        )
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let response = client
        .get("parameters", RequestOptions::new().full_response())
        .await
        .unwrap();

    match response {
        ApiResponse::Full(raw) => {
            assert_eq!(raw.status, 200);
            assert_eq!(raw.headers.get("x-request-id").map(String::as_str), Some("req-42"));
            assert!(raw.text().contains("opening_statement"));
        }
        other => panic!("expected full response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/parameters"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let (client, notifier) = client_with_timeout(&server, Duration::from_millis(300));
    let err = client.fetch_app_params().await.unwrap_err();

    assert!(matches!(
        err,
        ChatflowError::Network(NetworkError::RequestTimeout { .. })
    ));
    assert!(err.is_retryable());
    assert_eq!(
        notifier.messages(),
        vec!["Request timed out, please try again".to_string()]
    );
}
