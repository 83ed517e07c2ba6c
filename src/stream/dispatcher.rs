//! Routes classified events to the registered callbacks.
//!
//! The dispatcher owns the per-session delivery state: whether the next
//! message is the first one, and whether the completion callback already
//! fired.

use std::sync::Arc;

use crate::error::StreamError;
use crate::sse::{MessageInfo, StreamEvent, UpstreamError};
use crate::stream::handlers::StreamHandlers;
use crate::traits::{Notification, NotificationSink};

/// Shown when the backend gives no message of its own.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// What the session should do after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Continue,
    /// Stop reading; the session failed with this error.
    Terminate(StreamError),
}

/// Delivers events for one session, in arrival order.
pub struct Dispatcher {
    handlers: StreamHandlers,
    notifier: Arc<dyn NotificationSink>,
    is_first_message: bool,
    completed: bool,
}

impl Dispatcher {
    pub fn new(handlers: StreamHandlers, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            handlers,
            notifier,
            is_first_message: true,
            completed: false,
        }
    }

    /// True until the first message chunk has been delivered.
    pub fn is_first_message(&self) -> bool {
        self.is_first_message
    }

    /// True once the completion callback has fired.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Deliver one event.
    pub fn dispatch(&mut self, event: StreamEvent) -> DispatchOutcome {
        match event {
            StreamEvent::Message(chunk) | StreamEvent::AgentMessage(chunk) => {
                let is_first = self.is_first_message;
                self.is_first_message = false;
                let info = chunk.info();
                if let Some(on_data) = self.handlers.on_data.as_mut() {
                    on_data(chunk.answer, is_first, info);
                }
            }
            StreamEvent::AgentThought(thought) => {
                if let Some(f) = self.handlers.on_thought.as_mut() {
                    f(thought);
                }
            }
            StreamEvent::MessageEnd(end) => {
                if let Some(f) = self.handlers.on_message_end.as_mut() {
                    f(end);
                }
            }
            StreamEvent::MessageReplace(replace) => {
                if let Some(f) = self.handlers.on_message_replace.as_mut() {
                    f(replace);
                }
            }
            StreamEvent::WorkflowStarted(started) => {
                if let Some(f) = self.handlers.on_workflow_started.as_mut() {
                    f(started);
                }
            }
            StreamEvent::WorkflowFinished(finished) => {
                if let Some(f) = self.handlers.on_workflow_finished.as_mut() {
                    f(finished);
                }
            }
            StreamEvent::NodeStarted(started) => {
                if let Some(f) = self.handlers.on_node_started.as_mut() {
                    f(started);
                }
            }
            StreamEvent::NodeFinished(finished) => {
                if let Some(f) = self.handlers.on_node_finished.as_mut() {
                    f(finished);
                }
            }
            StreamEvent::UpstreamError(UpstreamError { message, code, .. }) => {
                let shown = message.clone().unwrap_or_else(|| SERVER_ERROR_MESSAGE.to_string());
                self.report_error(shown, code.clone());
                return DispatchOutcome::Terminate(StreamError::Upstream { message, code });
            }
            StreamEvent::Unrecognized(tag) => {
                tracing::debug!(event = %tag, "Ignoring unrecognized stream event");
            }
        }
        DispatchOutcome::Continue
    }

    /// Notify the sink and invoke the error callback.
    pub fn report_error(&mut self, message: String, code: Option<String>) {
        self.notifier.notify(Notification::error(message.clone()));
        if let Some(on_error) = self.handlers.on_error.as_mut() {
            on_error(message, code);
        }
    }

    /// Watchdog expiry: one empty message delivery carrying the timeout text.
    pub fn deliver_timeout(&mut self, message: &str) {
        self.notifier.notify(Notification::error(message));
        let info = MessageInfo {
            error_message: Some(message.to_string()),
            ..MessageInfo::default()
        };
        if let Some(on_data) = self.handlers.on_data.as_mut() {
            on_data(String::new(), false, info);
        }
    }

    /// Fire the completion callback. Returns false if it already fired.
    pub fn complete(&mut self, has_error: bool) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        if let Some(on_completed) = self.handlers.on_completed.as_mut() {
            on_completed(has_error);
        }
        true
    }
}
