//! Public client facade.
//!
//! [`ChatflowClient`] is cheap to clone and safe to share: it holds the
//! config plus the transport and notification seams behind `Arc`s. Each
//! call or stream session owns its own state.
//!
//! # Example
//!
//! ```ignore
//! use chatflow_client::client::ChatflowClient;
//! use chatflow_client::config::ClientConfig;
//! use chatflow_client::models::ChatRequest;
//! use chatflow_client::stream::StreamHandlers;
//!
//! let client = ChatflowClient::new(ClientConfig::from_env()?)?;
//! let handlers = StreamHandlers::new().on_data(|text, _, _| print!("{}", text));
//! let outcome = client
//!     .send_chat_message(ChatRequest::new("Hello"), handlers)?
//!     .wait()
//!     .await;
//! ```

mod api;
mod request;

pub use request::{ApiResponse, RawResponse, RequestIssuer, RequestOptions, REQUEST_TIMEOUT_MESSAGE};

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::adapters::{ReqwestTransport, TracingNotifier};
use crate::config::ClientConfig;
use crate::error::ChatflowResult;
use crate::stream::{SessionHandle, StreamHandlers, StreamSession};
use crate::traits::{HttpTransport, Method, NotificationSink};

#[derive(Clone)]
pub struct ChatflowClient {
    issuer: RequestIssuer,
}

impl ChatflowClient {
    /// Client with the reqwest transport and log-backed notifications.
    pub fn new(config: ClientConfig) -> ChatflowResult<Self> {
        config.validate()?;
        Ok(Self::with_parts(
            config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(TracingNotifier::new()),
        ))
    }

    /// Client with injected seams.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            issuer: RequestIssuer::new(config, transport, notifier),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.issuer.config()
    }

    pub fn issuer(&self) -> &RequestIssuer {
        &self.issuer
    }

    /// Issue a non-streaming call.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ChatflowResult<ApiResponse> {
        self.request_with_token(method, path, options, &CancellationToken::new())
            .await
    }

    /// Like [`ChatflowClient::request`], abortable through `cancel`.
    pub async fn request_with_token(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> ChatflowResult<ApiResponse> {
        self.issuer.send(method, path, options, cancel).await
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> ChatflowResult<ApiResponse> {
        self.request(Method::Get, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> ChatflowResult<ApiResponse> {
        self.request(Method::Post, path, options).await
    }

    pub async fn put(&self, path: &str, options: RequestOptions) -> ChatflowResult<ApiResponse> {
        self.request(Method::Put, path, options).await
    }

    pub async fn del(&self, path: &str, options: RequestOptions) -> ChatflowResult<ApiResponse> {
        self.request(Method::Delete, path, options).await
    }

    /// Start a streaming session on the current runtime.
    pub fn sse_post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        handlers: StreamHandlers,
    ) -> ChatflowResult<SessionHandle> {
        self.sse_post_with_token(path, body, handlers, CancellationToken::new())
    }

    /// Start a streaming session that also stops when `cancel` fires.
    pub fn sse_post_with_token<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        handlers: StreamHandlers,
        cancel: CancellationToken,
    ) -> ChatflowResult<SessionHandle> {
        let body = serde_json::to_value(body)?;
        let request = self.issuer.build_stream_request(path, &body)?;
        let session = StreamSession::new(
            self.issuer.transport(),
            self.issuer.notifier(),
            request,
            handlers,
        )
        .with_inactivity_timeout(self.config().timeout);
        Ok(session.spawn(cancel))
    }
}

impl fmt::Debug for ChatflowClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatflowClient")
            .field("base_url", &self.config().base_url)
            .field("timeout", &self.config().timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockTransport, RecordingNotifier, ScriptedResponse};
    use serde_json::json;
    use std::sync::Mutex;

    fn client(transport: Arc<MockTransport>) -> ChatflowClient {
        ChatflowClient::with_parts(
            ClientConfig::default().with_base_url("http://test/v1"),
            transport,
            Arc::new(RecordingNotifier::new()),
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("ftp://nope");
        assert!(ChatflowClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_verb_helpers_use_matching_methods() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::status(204, "")));
        let client = client(transport.clone());

        client.get("a", RequestOptions::new()).await.unwrap();
        client.post("b", RequestOptions::new()).await.unwrap();
        client.put("c", RequestOptions::new()).await.unwrap();
        client.del("d", RequestOptions::new()).await.unwrap();

        let methods: Vec<Method> = transport.requests().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![Method::Get, Method::Post, Method::Put, Method::Delete]
        );
        assert_eq!(transport.requests()[3].url, "http://test/v1/d");
    }

    #[tokio::test]
    async fn test_sse_post_runs_session() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::stream(vec![
            "data: {\"event\":\"message\",\"answer\":\"Hi\",\"id\":\"m1\"}\n",
        ])));
        let client = client(transport.clone());
        let received = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&received);

        let handle = client
            .sse_post(
                "chat-messages",
                &json!({"query": "hello"}),
                StreamHandlers::new().on_data(move |text, _, _| sink.lock().unwrap().push_str(&text)),
            )
            .unwrap();

        assert!(handle.wait().await.is_completed());
        assert_eq!(*received.lock().unwrap(), "Hi");
        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://test/v1/chat-messages");
        assert_eq!(request.body.as_deref(), Some("{\"query\":\"hello\"}"));
    }

    #[tokio::test]
    async fn test_sse_post_with_token_honours_caller_token() {
        let transport = Arc::new(MockTransport::new(ScriptedResponse::never()));
        let client = client(transport.clone());
        let cancel = CancellationToken::new();

        let handle = client
            .sse_post_with_token("chat-messages", &json!({}), StreamHandlers::new(), cancel.clone())
            .unwrap();
        while transport.requests().is_empty() {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        assert!(handle.wait().await.is_cancelled());
        assert!(transport.was_cancelled());
    }
}
