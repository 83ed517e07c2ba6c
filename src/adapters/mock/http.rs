//! Scripted HTTP transport for testing.
//!
//! Each call to `execute` pops the next [`ScriptedResponse`]; once the
//! queue is empty the default response is replayed. Bodies are played
//! back chunk by chunk, with optional delays, errors, or an endless
//! pause, and stop as soon as the cancellation token fires.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::traits::{Headers, HttpError, HttpRequest, HttpResponse, HttpTransport};

/// One step of a scripted body.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Yield these bytes.
    Data(Bytes),
    /// Sleep before the next step (honours paused tokio time).
    Delay(Duration),
    /// Yield a body error.
    Error(HttpError),
    /// Never yield again.
    Hang,
}

impl Chunk {
    pub fn data(bytes: impl Into<Bytes>) -> Self {
        Chunk::Data(bytes.into())
    }

    pub fn delay(duration: Duration) -> Self {
        Chunk::Delay(duration)
    }

    pub fn error(err: HttpError) -> Self {
        Chunk::Error(err)
    }
}

/// What the mock answers to one request.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Respond {
        status: u16,
        headers: Headers,
        chunks: Vec<Chunk>,
    },
    /// `execute` fails with this error.
    Fail(HttpError),
    /// `execute` never resolves until cancelled.
    Never,
}

impl ScriptedResponse {
    /// 200 event stream, one chunk per entry.
    pub fn stream(chunks: Vec<&str>) -> Self {
        Self::chunks(
            chunks
                .into_iter()
                .map(|c| Chunk::data(c.to_string()))
                .collect(),
        )
    }

    /// Like [`ScriptedResponse::stream`], but the body never ends.
    pub fn stream_then_hang(chunks: Vec<&str>) -> Self {
        let mut steps: Vec<Chunk> = chunks
            .into_iter()
            .map(|c| Chunk::data(c.to_string()))
            .collect();
        steps.push(Chunk::Hang);
        Self::chunks(steps)
    }

    /// 200 event stream from explicit steps.
    pub fn chunks(chunks: Vec<Chunk>) -> Self {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "text/event-stream".to_string());
        ScriptedResponse::Respond {
            status: 200,
            headers,
            chunks,
        }
    }

    /// A JSON body with the given status.
    pub fn status(status: u16, body: &str) -> Self {
        Self::body(status, "application/json", Bytes::from(body.to_string()))
    }

    /// Any body with the given status and content type.
    pub fn body(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        ScriptedResponse::Respond {
            status,
            headers,
            chunks: vec![Chunk::Data(body.into())],
        }
    }

    pub fn fail(err: HttpError) -> Self {
        ScriptedResponse::Fail(err)
    }

    pub fn never() -> Self {
        ScriptedResponse::Never
    }
}

/// Mock transport for tests.
///
/// # Example
///
/// ```ignore
/// let transport = Arc::new(MockTransport::new(ScriptedResponse::stream(vec![
///     "data: {\"event\":\"message\",\"answer\":\"Hi\",\"id\":\"m1\"}\n",
/// ])));
/// // ... run a session against it ...
/// assert_eq!(transport.requests().len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTransport {
    default_response: ScriptedResponse,
    queued: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl MockTransport {
    pub fn new(default_response: ScriptedResponse) -> Self {
        Self {
            default_response,
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for the next call, ahead of the default.
    pub fn push(&self, response: ScriptedResponse) {
        self.queued.lock().unwrap().push_back(response);
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// True if any call's cancellation token has fired.
    pub fn was_cancelled(&self) -> bool {
        self.tokens
            .lock()
            .unwrap()
            .iter()
            .any(CancellationToken::is_cancelled)
    }

    fn next_response(&self) -> ScriptedResponse {
        self.queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        self.tokens.lock().unwrap().push(cancel.clone());

        match self.next_response() {
            ScriptedResponse::Fail(err) => Err(err),
            ScriptedResponse::Never => {
                cancel.cancelled().await;
                Err(HttpError::Cancelled)
            }
            ScriptedResponse::Respond {
                status,
                headers,
                chunks,
            } => {
                let body = futures::stream::iter(chunks)
                    .then(|chunk| async move {
                        match chunk {
                            Chunk::Data(bytes) => Some(Ok(bytes)),
                            Chunk::Error(err) => Some(Err(err)),
                            Chunk::Delay(duration) => {
                                tokio::time::sleep(duration).await;
                                None
                            }
                            Chunk::Hang => {
                                futures::future::pending::<()>().await;
                                None
                            }
                        }
                    })
                    .filter_map(|item| async move { item })
                    .take_until(cancel.cancelled_owned());
                Ok(HttpResponse::new(status, headers, Box::pin(body)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Method;

    fn request() -> HttpRequest {
        HttpRequest::new(Method::Get, "http://test/v1/parameters")
    }

    #[tokio::test]
    async fn test_replays_chunks_and_records() {
        let transport = MockTransport::new(ScriptedResponse::stream(vec!["a", "b"]));
        let response = transport
            .execute(request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("text/event-stream"));
        assert_eq!(response.bytes().await.unwrap(), Bytes::from("ab"));
        assert_eq!(transport.requests().len(), 1);
        assert!(!transport.was_cancelled());
    }

    #[tokio::test]
    async fn test_queue_before_default() {
        let transport = MockTransport::new(ScriptedResponse::status(200, "{}"));
        transport.push(ScriptedResponse::fail(HttpError::Other("first".to_string())));

        let first = transport.execute(request(), CancellationToken::new()).await;
        assert_eq!(first.unwrap_err(), HttpError::Other("first".to_string()));
        let second = transport.execute(request(), CancellationToken::new()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_ends_hanging_body() {
        let transport = MockTransport::new(ScriptedResponse::stream_then_hang(vec!["a"]));
        let cancel = CancellationToken::new();
        let response = transport.execute(request(), cancel.clone()).await.unwrap();
        let mut body = response.into_body();

        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from("a"));
        cancel.cancel();
        assert!(body.next().await.is_none());
        assert!(transport.was_cancelled());
    }

    #[tokio::test]
    async fn test_never_resolves_cancelled() {
        let transport = MockTransport::new(ScriptedResponse::never());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = transport.execute(request(), cancel).await;
        assert_eq!(result.unwrap_err(), HttpError::Cancelled);
    }
}
