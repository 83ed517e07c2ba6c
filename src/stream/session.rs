//! Stream session: one streaming request from send to completion.
//!
//! The session owns everything mutable about one request: the decoder
//! buffer, the first-message flag, the watchdog and the phase. Nothing
//! is shared between sessions, so any number can run at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::dispatcher::{DispatchOutcome, Dispatcher, SERVER_ERROR_MESSAGE};
use super::handlers::StreamHandlers;
use super::state::SessionPhase;
use super::watchdog::{Watchdog, DEFAULT_TIMEOUT};
use crate::error::{ChatflowError, NetworkError, StreamError};
use crate::sse::{classify, Classification, FrameDecoder};
use crate::traits::{HttpError, HttpRequest, HttpResponse, HttpTransport, NotificationSink};

/// Delivered once per inactivity expiry.
pub const RESPONSE_TIMEOUT_MESSAGE: &str = "Response timed out";
/// Notification text for a 401.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The stream ended cleanly.
    Completed,
    /// The session failed; the error was already surfaced through the
    /// callbacks and the notification sink.
    Failed(ChatflowError),
    /// The caller cancelled. No callbacks fired after the cancel.
    Cancelled,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionOutcome::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionOutcome::Cancelled)
    }

    pub fn error(&self) -> Option<&ChatflowError> {
        match self {
            SessionOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of racing one future against cancellation and the watchdog.
enum Step<T> {
    Cancelled,
    TimedOut,
    Ready(T),
}

enum ChunkOutcome {
    Continue,
    Cancelled,
    Terminate(StreamError),
}

/// A single streaming request.
pub struct StreamSession {
    id: u64,
    transport: Arc<dyn HttpTransport>,
    request: HttpRequest,
    inactivity_timeout: Duration,
    dispatcher: Dispatcher,
    decoder: FrameDecoder,
    phase: SessionPhase,
}

impl StreamSession {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn NotificationSink>,
        request: HttpRequest,
        handlers: StreamHandlers,
    ) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            transport,
            request,
            inactivity_timeout: DEFAULT_TIMEOUT,
            dispatcher: Dispatcher::new(handlers, notifier),
            decoder: FrameDecoder::new(),
            phase: SessionPhase::Idle,
        }
    }

    /// Override the inactivity window.
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Spawn the session on the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> SessionHandle {
        let token = cancel.clone();
        let task = tokio::spawn(self.run(cancel));
        SessionHandle { cancel: token, task }
    }

    /// Drive the session to a terminal state.
    ///
    /// The watchdog is armed before the request is sent, so a server that
    /// never answers is caught by the same window as one that stalls
    /// mid-stream.
    pub async fn run(mut self, cancel: CancellationToken) -> SessionOutcome {
        let mut watchdog = Watchdog::start(self.inactivity_timeout);
        // Fires on caller cancel (as a child) and when the session gives up.
        let transport_cancel = cancel.child_token();

        self.transition(SessionPhase::Requesting);
        info!(
            session = self.id,
            method = %self.request.method,
            url = %self.request.url,
            "Starting stream session"
        );

        let transport = Arc::clone(&self.transport);
        let call = transport.execute(self.request.clone(), transport_cancel.clone());
        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => Step::Cancelled,
            _ = watchdog.expired() => Step::TimedOut,
            result = call => Step::Ready(result),
        };

        let response = match step {
            Step::Cancelled => return self.cancelled(),
            Step::TimedOut => {
                transport_cancel.cancel();
                return self.timed_out();
            }
            Step::Ready(Err(HttpError::Cancelled)) if cancel.is_cancelled() => {
                return self.cancelled()
            }
            Step::Ready(Err(err)) => {
                transport_cancel.cancel();
                return self.transport_failed(err);
            }
            Step::Ready(Ok(response)) => response,
        };

        if !response.is_success() {
            return self
                .rejected(response, &cancel, &mut watchdog, &transport_cancel)
                .await;
        }

        self.transition(SessionPhase::Streaming);
        debug!(session = self.id, status = response.status, "Response headers received");

        let mut body = response.into_body();
        loop {
            let step = tokio::select! {
                biased;
                _ = cancel.cancelled() => Step::Cancelled,
                _ = watchdog.expired() => Step::TimedOut,
                chunk = body.next() => Step::Ready(chunk),
            };

            match step {
                Step::Cancelled => return self.cancelled(),
                Step::TimedOut => {
                    transport_cancel.cancel();
                    drop(body);
                    return self.timed_out();
                }
                Step::Ready(None) => return self.finished(),
                Step::Ready(Some(Err(HttpError::Cancelled))) if cancel.is_cancelled() => {
                    return self.cancelled()
                }
                Step::Ready(Some(Err(err))) => {
                    transport_cancel.cancel();
                    return self.transport_failed(err);
                }
                Step::Ready(Some(Ok(chunk))) => {
                    watchdog.reset();
                    match self.consume(&chunk, &cancel) {
                        ChunkOutcome::Continue => {}
                        ChunkOutcome::Cancelled => return self.cancelled(),
                        ChunkOutcome::Terminate(err) => {
                            transport_cancel.cancel();
                            drop(body);
                            return self.upstream_failed(err);
                        }
                    }
                }
            }
        }
    }

    /// Decode, classify and dispatch one chunk. Lines after a terminating
    /// frame are not processed.
    fn consume(&mut self, chunk: &Bytes, cancel: &CancellationToken) -> ChunkOutcome {
        for line in self.decoder.feed(chunk) {
            if cancel.is_cancelled() {
                return ChunkOutcome::Cancelled;
            }
            match classify(&line) {
                Classification::NotAFrame => {}
                Classification::Malformed(err) => {
                    warn!(session = self.id, error = %err, "Skipping malformed frame");
                }
                Classification::Event(event) => {
                    debug!(session = self.id, event = event.event_type_name(), "Dispatching");
                    if let DispatchOutcome::Terminate(err) = self.dispatcher.dispatch(event) {
                        return ChunkOutcome::Terminate(err);
                    }
                }
            }
        }
        ChunkOutcome::Continue
    }

    /// Non-success status while requesting.
    async fn rejected(
        mut self,
        response: HttpResponse,
        cancel: &CancellationToken,
        watchdog: &mut Watchdog,
        transport_cancel: &CancellationToken,
    ) -> SessionOutcome {
        let status = response.status;
        warn!(session = self.id, status, "Stream request rejected");

        if status == 401 {
            transport_cancel.cancel();
            drop(response);
            self.dispatcher
                .report_error(INVALID_TOKEN_MESSAGE.to_string(), None);
            return self.fail(NetworkError::Unauthorized.into());
        }

        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => Step::Cancelled,
            _ = watchdog.expired() => Step::TimedOut,
            body = response.bytes() => Step::Ready(body),
        };
        transport_cancel.cancel();

        let (message, code) = match step {
            Step::Cancelled => return self.cancelled(),
            Step::TimedOut => return self.timed_out(),
            Step::Ready(Ok(body)) => error_body_fields(&body),
            Step::Ready(Err(err)) => {
                debug!(session = self.id, error = %err, "Could not read error body");
                (None, None)
            }
        };

        let shown = message.unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string());
        self.dispatcher.report_error(shown.clone(), code);
        self.fail(
            NetworkError::HttpStatus {
                status,
                message: shown,
            }
            .into(),
        )
    }

    fn transport_failed(mut self, err: HttpError) -> SessionOutcome {
        error!(session = self.id, error = %err, "Stream transport failed");
        let message = err.to_string();
        self.dispatcher.report_error(message.clone(), None);
        self.fail(NetworkError::Transport { message }.into())
    }

    fn upstream_failed(self, err: StreamError) -> SessionOutcome {
        warn!(session = self.id, error = %err, "Upstream error frame");
        // Callbacks already ran in the dispatcher.
        self.fail(err.into())
    }

    fn timed_out(mut self) -> SessionOutcome {
        let duration_secs = self.inactivity_timeout.as_secs();
        warn!(session = self.id, duration_secs, "Stream inactivity timeout");
        self.dispatcher.deliver_timeout(RESPONSE_TIMEOUT_MESSAGE);
        self.fail(StreamError::InactivityTimeout { duration_secs }.into())
    }

    fn finished(mut self) -> SessionOutcome {
        let dropped = self.decoder.finish();
        if dropped > 0 {
            debug!(session = self.id, bytes = dropped, "Discarding unterminated trailing data");
        }
        self.transition(SessionPhase::Completed);
        self.dispatcher.complete(false);
        info!(session = self.id, "Stream session completed");
        SessionOutcome::Completed
    }

    fn fail(mut self, err: ChatflowError) -> SessionOutcome {
        self.transition(SessionPhase::Failed);
        self.dispatcher.complete(true);
        SessionOutcome::Failed(err)
    }

    fn cancelled(mut self) -> SessionOutcome {
        debug!(session = self.id, phase = %self.phase, "Stream session cancelled");
        self.transition(SessionPhase::Failed);
        SessionOutcome::Cancelled
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase.can_transition_to(next) {
            debug!(session = self.id, from = %self.phase, to = %next, "Session transition");
            self.phase = next;
        } else {
            debug!(
                session = self.id,
                from = %self.phase,
                to = %next,
                "Ignoring invalid session transition"
            );
        }
    }
}

/// Pull `message` and `code` out of an error response body, if it is JSON.
pub(crate) fn error_body_fields(body: &[u8]) -> (Option<String>, Option<String>) {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return (None, None),
    };
    let field = |name: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    (field("message"), field("code"))
}

/// Handle to a spawned session.
#[derive(Debug)]
pub struct SessionHandle {
    cancel: CancellationToken,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Abort the session. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The token the session listens on.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to reach a terminal state.
    pub async fn wait(self) -> SessionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "Stream session task failed");
                SessionOutcome::Failed(ChatflowError::TaskFailed(err.to_string()))
            }
        }
    }
}
