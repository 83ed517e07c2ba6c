//! Stream event types and payload definitions.
//!
//! Every `data: ` frame the backend sends is classified into one
//! [`StreamEvent`]. Payload structs mirror the wire objects; fields the
//! client does not model are kept in `extra` so consumers lose nothing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::deserialize_nullable;

/// Correlation identifiers delivered with every message chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    pub conversation_id: Option<String>,
    pub task_id: Option<String>,
    pub message_id: String,
    /// Set only for the synthetic delivery made when the watchdog fires
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

/// `message` / `agent_message` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub answer: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageChunk {
    pub fn info(&self) -> MessageInfo {
        MessageInfo {
            conversation_id: self.conversation_id.clone(),
            task_id: self.task_id.clone(),
            message_id: self.id.clone(),
            error_message: None,
            error_code: None,
        }
    }
}

/// `agent_thought` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentThought {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub thought: String,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub tool_input: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub files: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `message_end` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEnd {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `message_replace` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReplace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub answer: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` object of `workflow_started`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStartedData {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub workflow_id: String,
    #[serde(default)]
    pub sequence_number: Option<u64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` object of `workflow_finished`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFinishedData {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub workflow_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_steps: Option<u64>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub finished_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `data` object of `node_started`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStartedData {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub node_id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub node_type: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub title: String,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub predecessor_node_id: Option<String>,
    #[serde(default)]
    pub inputs: Option<Value>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub extras: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token accounting attached to a finished node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    #[serde(default)]
    pub total_tokens: Option<u64>,
    #[serde(default)]
    pub total_price: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// `data` object of `node_finished`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFinishedData {
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub node_id: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub node_type: String,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub title: String,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub predecessor_node_id: Option<String>,
    #[serde(default)]
    pub inputs: Option<Value>,
    #[serde(default)]
    pub process_data: Option<Value>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub execution_metadata: Option<ExecutionMetadata>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope shared by the workflow and node events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEnvelope<T> {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub workflow_run_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        bound(deserialize = "T: Deserialize<'de> + Default")
    )]
    pub data: T,
}

pub type WorkflowStarted = WorkflowEnvelope<WorkflowStartedData>;
pub type WorkflowFinished = WorkflowEnvelope<WorkflowFinishedData>;
pub type NodeStarted = WorkflowEnvelope<NodeStartedData>;
pub type NodeFinished = WorkflowEnvelope<NodeFinishedData>;

/// An error frame: `status >= 400`, or no `event` at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub code: Option<String>,
}

/// Classified stream events.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Message(MessageChunk),
    AgentMessage(MessageChunk),
    AgentThought(AgentThought),
    MessageEnd(MessageEnd),
    MessageReplace(MessageReplace),
    WorkflowStarted(WorkflowStarted),
    WorkflowFinished(WorkflowFinished),
    NodeStarted(NodeStarted),
    NodeFinished(NodeFinished),
    UpstreamError(UpstreamError),
    /// An `event` value this client does not know. Dispatched as a no-op.
    Unrecognized(String),
}

impl StreamEvent {
    /// Returns the wire name of the event for logging.
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::Message(_) => "message",
            StreamEvent::AgentMessage(_) => "agent_message",
            StreamEvent::AgentThought(_) => "agent_thought",
            StreamEvent::MessageEnd(_) => "message_end",
            StreamEvent::MessageReplace(_) => "message_replace",
            StreamEvent::WorkflowStarted(_) => "workflow_started",
            StreamEvent::WorkflowFinished(_) => "workflow_finished",
            StreamEvent::NodeStarted(_) => "node_started",
            StreamEvent::NodeFinished(_) => "node_finished",
            StreamEvent::UpstreamError(_) => "error",
            StreamEvent::Unrecognized(tag) => tag,
        }
    }

    /// True for the two message variants that carry answer text.
    pub fn is_message(&self) -> bool {
        matches!(self, StreamEvent::Message(_) | StreamEvent::AgentMessage(_))
    }

    /// True if dispatching this event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::UpstreamError(_))
    }
}
