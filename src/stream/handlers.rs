//! Dispatch table: the callbacks a caller registers for one session.
//!
//! Every slot is optional. An event whose slot is empty is dropped
//! without error.

use std::fmt;

use crate::sse::{
    AgentThought, MessageEnd, MessageInfo, MessageReplace, NodeFinished, NodeStarted,
    WorkflowFinished, WorkflowStarted,
};

/// Message text, first-message flag, correlation ids.
pub type OnData = Box<dyn FnMut(String, bool, MessageInfo) + Send>;
pub type OnThought = Box<dyn FnMut(AgentThought) + Send>;
pub type OnMessageEnd = Box<dyn FnMut(MessageEnd) + Send>;
pub type OnMessageReplace = Box<dyn FnMut(MessageReplace) + Send>;
pub type OnWorkflowStarted = Box<dyn FnMut(WorkflowStarted) + Send>;
pub type OnWorkflowFinished = Box<dyn FnMut(WorkflowFinished) + Send>;
pub type OnNodeStarted = Box<dyn FnMut(NodeStarted) + Send>;
pub type OnNodeFinished = Box<dyn FnMut(NodeFinished) + Send>;
/// Error message and optional backend code.
pub type OnError = Box<dyn FnMut(String, Option<String>) + Send>;
/// `true` when the session ended with an error.
pub type OnCompleted = Box<dyn FnMut(bool) + Send>;

/// Callbacks for one streaming session, fixed once the session starts.
///
/// # Example
///
/// ```ignore
/// let handlers = StreamHandlers::new()
///     .on_data(|text, _first, _info| print!("{}", text))
///     .on_completed(|has_error| println!("\ndone (error: {})", has_error));
/// ```
#[derive(Default)]
pub struct StreamHandlers {
    pub(crate) on_data: Option<OnData>,
    pub(crate) on_thought: Option<OnThought>,
    pub(crate) on_message_end: Option<OnMessageEnd>,
    pub(crate) on_message_replace: Option<OnMessageReplace>,
    pub(crate) on_workflow_started: Option<OnWorkflowStarted>,
    pub(crate) on_workflow_finished: Option<OnWorkflowFinished>,
    pub(crate) on_node_started: Option<OnNodeStarted>,
    pub(crate) on_node_finished: Option<OnNodeFinished>,
    pub(crate) on_error: Option<OnError>,
    pub(crate) on_completed: Option<OnCompleted>,
}

impl StreamHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called for every `message` / `agent_message` chunk.
    pub fn on_data(mut self, f: impl FnMut(String, bool, MessageInfo) + Send + 'static) -> Self {
        self.on_data = Some(Box::new(f));
        self
    }

    pub fn on_thought(mut self, f: impl FnMut(AgentThought) + Send + 'static) -> Self {
        self.on_thought = Some(Box::new(f));
        self
    }

    pub fn on_message_end(mut self, f: impl FnMut(MessageEnd) + Send + 'static) -> Self {
        self.on_message_end = Some(Box::new(f));
        self
    }

    pub fn on_message_replace(mut self, f: impl FnMut(MessageReplace) + Send + 'static) -> Self {
        self.on_message_replace = Some(Box::new(f));
        self
    }

    pub fn on_workflow_started(mut self, f: impl FnMut(WorkflowStarted) + Send + 'static) -> Self {
        self.on_workflow_started = Some(Box::new(f));
        self
    }

    pub fn on_workflow_finished(
        mut self,
        f: impl FnMut(WorkflowFinished) + Send + 'static,
    ) -> Self {
        self.on_workflow_finished = Some(Box::new(f));
        self
    }

    pub fn on_node_started(mut self, f: impl FnMut(NodeStarted) + Send + 'static) -> Self {
        self.on_node_started = Some(Box::new(f));
        self
    }

    pub fn on_node_finished(mut self, f: impl FnMut(NodeFinished) + Send + 'static) -> Self {
        self.on_node_finished = Some(Box::new(f));
        self
    }

    /// Called once when the session fails with a surfaced error.
    pub fn on_error(mut self, f: impl FnMut(String, Option<String>) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Called exactly once when the session ends, unless it was cancelled.
    pub fn on_completed(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_completed = Some(Box::new(f));
        self
    }

    /// Names of the registered slots, for logging.
    pub fn registered(&self) -> Vec<&'static str> {
        let slots = [
            ("data", self.on_data.is_some()),
            ("thought", self.on_thought.is_some()),
            ("message_end", self.on_message_end.is_some()),
            ("message_replace", self.on_message_replace.is_some()),
            ("workflow_started", self.on_workflow_started.is_some()),
            ("workflow_finished", self.on_workflow_finished.is_some()),
            ("node_started", self.on_node_started.is_some()),
            ("node_finished", self.on_node_finished.is_some()),
            ("error", self.on_error.is_some()),
            ("completed", self.on_completed.is_some()),
        ];
        slots
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }
}

impl fmt::Debug for StreamHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandlers")
            .field("registered", &self.registered())
            .finish()
    }
}
