//! Request issuer for non-streaming calls.
//!
//! Every call races the transport against a fixed deadline. The loser is
//! abandoned and its cancellation token fired, so a late response never
//! leaks into a finished call.

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ChatflowError, ChatflowResult, NetworkError};
use crate::stream::{error_body_fields, INVALID_TOKEN_MESSAGE, SERVER_ERROR_MESSAGE};
use crate::traits::{
    Headers, HttpError, HttpRequest, HttpResponse, HttpTransport, Method, Notification,
    NotificationSink,
};

/// Notification text when the deadline wins.
pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timed out, please try again";

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_BINARY: &str = "application/octet-stream";
const ACCEPT_EVENT_STREAM: &str = "text/event-stream";

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, appended to GET requests only.
    pub params: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
    /// Return status, headers and raw bytes instead of parsed JSON.
    pub needs_full_response: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON body.
    pub fn with_json<T: Serialize>(self, body: &T) -> ChatflowResult<Self> {
        Ok(self.with_body(serde_json::to_value(body)?))
    }

    pub fn full_response(mut self) -> Self {
        self.needs_full_response = true;
        self
    }
}

/// Status, headers and body of a response, unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> ChatflowResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Successful result of a non-streaming call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// `application/octet-stream` body.
    Blob(Bytes),
    /// 204, or a success with an empty body.
    Empty,
    Full(RawResponse),
}

impl ApiResponse {
    /// JSON view of the response. `Empty` reads as `{"result": "success"}`.
    pub fn into_json(self) -> ChatflowResult<Value> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Empty => Ok(json!({ "result": "success" })),
            ApiResponse::Full(raw) => raw.json(),
            ApiResponse::Blob(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    /// Deserialize into `T` via [`ApiResponse::into_json`].
    pub fn parse<T: DeserializeOwned>(self) -> ChatflowResult<T> {
        Ok(serde_json::from_value(self.into_json()?)?)
    }
}

/// Builds requests from the client config and issues them.
#[derive(Clone)]
pub struct RequestIssuer {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn NotificationSink>,
}

impl RequestIssuer {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            transport,
            notifier,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        Arc::clone(&self.notifier)
    }

    /// Full URL for `path`, with `params` appended for GET.
    pub fn build_url(&self, method: Method, path: &str, params: &[(String, String)]) -> String {
        let mut url = self.config.url_for(path);
        if method == Method::Get && !params.is_empty() {
            let query = params
                .iter()
                .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
        url
    }

    fn base_request(&self, method: Method, url: String) -> HttpRequest {
        let request = HttpRequest::new(method, url).with_header("Content-Type", CONTENT_TYPE_JSON);
        match &self.config.api_key {
            Some(key) => request.with_header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> ChatflowResult<HttpRequest> {
        let url = self.build_url(method, path, &options.params);
        let request = self.base_request(method, url);
        match &options.body {
            Some(body) => Ok(request.with_body(serde_json::to_string(body)?)),
            None => Ok(request),
        }
    }

    /// POST request for a streaming endpoint.
    pub fn build_stream_request(&self, path: &str, body: &Value) -> ChatflowResult<HttpRequest> {
        let request = self
            .base_request(Method::Post, self.config.url_for(path))
            .with_header("Accept", ACCEPT_EVENT_STREAM)
            .with_body(serde_json::to_string(body)?);
        Ok(request)
    }

    /// Issue a call and classify its outcome.
    ///
    /// Failures are surfaced once through the notification sink, except
    /// a caller cancel, which is silent.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> ChatflowResult<ApiResponse> {
        let request = self.build_request(method, path, &options)?;
        debug!(method = %method, url = %request.url, "Issuing request");

        let transport_cancel = cancel.child_token();
        let exchange = self.exchange(request, options.needs_full_response, transport_cancel.clone());
        let deadline = tokio::time::sleep(self.config.timeout);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NetworkError::Cancelled.into()),
            _ = deadline => {
                transport_cancel.cancel();
                let duration_secs = self.config.timeout.as_secs();
                warn!(method = %method, path, duration_secs, "Request timed out");
                self.notify(REQUEST_TIMEOUT_MESSAGE);
                Err(NetworkError::RequestTimeout { duration_secs }.into())
            }
            result = exchange => result,
        }
    }

    async fn exchange(
        &self,
        request: HttpRequest,
        needs_full_response: bool,
        cancel: CancellationToken,
    ) -> ChatflowResult<ApiResponse> {
        let response = match self.transport.execute(request, cancel).await {
            Ok(response) => response,
            Err(HttpError::Cancelled) => return Err(NetworkError::Cancelled.into()),
            Err(err) => return Err(self.transport_failed(err)),
        };

        let status = response.status;
        if status == 401 {
            warn!(status, "Request rejected as unauthorized");
            self.notify(INVALID_TOKEN_MESSAGE);
            return Err(NetworkError::Unauthorized.into());
        }

        if !response.is_success() {
            return Err(self.rejected(response).await);
        }

        if status == 204 {
            return Ok(ApiResponse::Empty);
        }

        let is_binary = response.content_type() == Some(CONTENT_TYPE_BINARY);
        let headers = response.headers.clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(HttpError::Cancelled) => return Err(NetworkError::Cancelled.into()),
            Err(err) => return Err(self.transport_failed(err)),
        };

        if needs_full_response {
            return Ok(ApiResponse::Full(RawResponse {
                status,
                headers,
                body,
            }));
        }
        if is_binary {
            return Ok(ApiResponse::Blob(body));
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse::Empty);
        }
        Ok(ApiResponse::Json(serde_json::from_slice(&body)?))
    }

    async fn rejected(&self, response: HttpResponse) -> ChatflowError {
        let status = response.status;
        let message = match response.bytes().await {
            Ok(body) => error_body_fields(&body).0,
            Err(err) => {
                debug!(status, error = %err, "Could not read error body");
                None
            }
        }
        .unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string());

        warn!(status, message = %message, "Request failed");
        self.notify(&message);
        NetworkError::HttpStatus { status, message }.into()
    }

    fn transport_failed(&self, err: HttpError) -> ChatflowError {
        error!(error = %err, "Transport failed");
        let message = err.to_string();
        self.notify(&message);
        NetworkError::Transport { message }.into()
    }

    fn notify(&self, message: &str) {
        self.notifier.notify(Notification::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockTransport, RecordingNotifier, ScriptedResponse};
    use std::time::Duration;

    fn issuer(
        transport: Arc<MockTransport>,
        notifier: Arc<RecordingNotifier>,
    ) -> RequestIssuer {
        let config = ClientConfig::default()
            .with_base_url("http://test/v1")
            .with_api_key("secret");
        RequestIssuer::new(config, transport, notifier)
    }

    #[test]
    fn test_build_url_appends_params_to_get_only() {
        let issuer = issuer(
            Arc::new(MockTransport::new(ScriptedResponse::status(200, "{}"))),
            Arc::new(RecordingNotifier::new()),
        );
        let params = vec![
            ("limit".to_string(), "20".to_string()),
            ("last_id".to_string(), "".to_string()),
            ("q".to_string(), "a b&c".to_string()),
        ];

        assert_eq!(
            issuer.build_url(Method::Get, "messages", &params),
            "http://test/v1/messages?limit=20&last_id=&q=a%20b%26c"
        );
        assert_eq!(
            issuer.build_url(Method::Get, "/messages?user=u", &params[..1]),
            "http://test/v1/messages?user=u&limit=20"
        );
        assert_eq!(
            issuer.build_url(Method::Post, "messages", &params),
            "http://test/v1/messages"
        );
    }

    #[test]
    fn test_build_request_sets_headers_and_body() {
        let issuer = issuer(
            Arc::new(MockTransport::new(ScriptedResponse::status(200, "{}"))),
            Arc::new(RecordingNotifier::new()),
        );
        let options = RequestOptions::new().with_body(json!({"rating": "like"}));
        let request = issuer.build_request(Method::Post, "messages/m1/feedbacks", &options).unwrap();

        assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("Bearer secret"));
        assert_eq!(request.body.as_deref(), Some("{\"rating\":\"like\"}"));

        let stream = issuer.build_stream_request("chat-messages", &json!({})).unwrap();
        assert_eq!(stream.method, Method::Post);
        assert_eq!(stream.headers.get("Accept").map(String::as_str), Some("text/event-stream"));
    }

    #[tokio::test]
    async fn test_json_success() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(
            200,
            "{\"result\":\"success\"}",
        )));
        let issuer = issuer(transport, Arc::new(RecordingNotifier::new()));

        let response = issuer
            .send(Method::Get, "parameters", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response, ApiResponse::Json(json!({"result": "success"})));
    }

    #[tokio::test]
    async fn test_no_content_synthesizes_success() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(204, "garbage")));
        let issuer = issuer(transport, Arc::new(RecordingNotifier::new()));

        let response = issuer
            .send(Method::Delete, "conversations/c1", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response, ApiResponse::Empty);
        assert_eq!(response.into_json().unwrap(), json!({"result": "success"}));
    }

    #[tokio::test]
    async fn test_binary_body_is_blob() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::body(
            200,
            "application/octet-stream",
            vec![0u8, 159, 146, 150],
        )));
        let issuer = issuer(transport, Arc::new(RecordingNotifier::new()));

        let response = issuer
            .send(Method::Get, "files/f1", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response, ApiResponse::Blob(Bytes::from(vec![0u8, 159, 146, 150])));
    }

    #[tokio::test]
    async fn test_full_response() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(200, "{\"a\":1}")));
        let issuer = issuer(transport, Arc::new(RecordingNotifier::new()));

        let response = issuer
            .send(
                Method::Get,
                "parameters",
                RequestOptions::new().full_response(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        match response {
            ApiResponse::Full(raw) => {
                assert_eq!(raw.status, 200);
                assert_eq!(raw.headers.get("content-type").map(String::as_str), Some("application/json"));
                assert_eq!(raw.json::<Value>().unwrap(), json!({"a": 1}));
            }
            other => panic!("expected full response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_is_handled_without_body() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(
            401,
            "{\"message\":\"raw detail\"}",
        )));
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer(transport, notifier.clone());

        let err = issuer
            .send(Method::Get, "conversations", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatflowError::Network(NetworkError::Unauthorized)));
        assert_eq!(notifier.messages(), vec!["Invalid token".to_string()]);
    }

    #[tokio::test]
    async fn test_error_status_surfaces_message() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(
            404,
            "{\"code\":\"not_found\",\"message\":\"Conversation Not Exists.\"}",
        )));
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer(transport, notifier.clone());

        let err = issuer
            .send(Method::Get, "messages", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Conversation Not Exists.");
        assert_eq!(notifier.messages(), vec!["Conversation Not Exists.".to_string()]);
    }

    #[tokio::test]
    async fn test_transport_failure_notifies() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::fail(
            HttpError::ConnectionFailed("refused".to_string()),
        )));
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer(transport, notifier.clone());

        let err = issuer
            .send(Method::Get, "parameters", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(notifier.messages(), vec!["Connection failed: refused".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_request() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::never()));
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer(transport.clone(), notifier.clone());

        let started = tokio::time::Instant::now();
        let err = issuer
            .send(Method::Get, "parameters", RequestOptions::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(started.elapsed() >= Duration::from_secs(180));
        assert!(matches!(
            err,
            ChatflowError::Network(NetworkError::RequestTimeout { duration_secs: 180 })
        ));
        assert_eq!(
            notifier.messages(),
            vec!["Request timed out, please try again".to_string()]
        );
        assert!(transport.was_cancelled());
    }

    #[tokio::test]
    async fn test_caller_cancel_is_silent() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::never()));
        let notifier = Arc::new(RecordingNotifier::new());
        let issuer = issuer(transport, notifier.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = issuer
            .send(Method::Get, "parameters", RequestOptions::new(), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(notifier.messages().is_empty());
    }
}
