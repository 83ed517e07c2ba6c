//! Line classification.
//!
//! Turns one decoded line into a [`Classification`]. A line that is not a
//! frame, and a frame that fails to parse, are both reported as values so
//! the caller decides explicitly what to do with them.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::StreamError;
use crate::sse::events::{AgentThought, MessageChunk, MessageReplace, StreamEvent, UpstreamError};
use crate::sse::unescape::unescape_unicode;

/// Prefix that marks a line as a frame.
pub const DATA_PREFIX: &str = "data: ";

/// Outcome of classifying one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A frame mapped to an event (possibly [`StreamEvent::Unrecognized`]).
    Event(StreamEvent),
    /// The line does not start with [`DATA_PREFIX`].
    NotAFrame,
    /// The frame is not a usable JSON object. The session continues.
    Malformed(StreamError),
}

/// Classify one line, without its trailing newline.
pub fn classify(line: &str) -> Classification {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Classification::NotAFrame;
    };

    let object = match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            return malformed(line, format!("expected a JSON object, got {}", kind_of(&other)))
        }
        Err(e) => return malformed(line, e.to_string()),
    };

    if let Some(error) = upstream_error(&object) {
        return Classification::Event(StreamEvent::UpstreamError(error));
    }

    let tag = match object.get("event") {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    match map_event(&tag, Value::Object(object)) {
        Ok(event) => Classification::Event(event),
        Err(e) => malformed(line, format!("invalid '{}' payload: {}", tag, e)),
    }
}

/// An error frame has a numeric `status >= 400`, or no usable `event`.
fn upstream_error(object: &Map<String, Value>) -> Option<UpstreamError> {
    let status = object
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    let client_error = status.is_some_and(|s| s >= 400);

    let missing_event = match object.get("event") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(tag)) => tag.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    };

    if !client_error && !missing_event {
        return None;
    }

    Some(UpstreamError {
        status,
        message: object.get("message").and_then(as_text),
        code: object.get("code").and_then(as_text),
    })
}

fn map_event(tag: &str, value: Value) -> Result<StreamEvent, serde_json::Error> {
    let event = match tag {
        "message" => {
            let mut chunk: MessageChunk = parse(value)?;
            chunk.answer = unescape_unicode(&chunk.answer);
            StreamEvent::Message(chunk)
        }
        "agent_message" => {
            let mut chunk: MessageChunk = parse(value)?;
            chunk.answer = unescape_unicode(&chunk.answer);
            StreamEvent::AgentMessage(chunk)
        }
        "agent_thought" => {
            let mut thought: AgentThought = parse(value)?;
            thought.thought = unescape_unicode(&thought.thought);
            thought.observation = thought.observation.as_deref().map(unescape_unicode);
            StreamEvent::AgentThought(thought)
        }
        "message_end" => StreamEvent::MessageEnd(parse(value)?),
        "message_replace" => {
            let mut replace: MessageReplace = parse(value)?;
            replace.answer = unescape_unicode(&replace.answer);
            StreamEvent::MessageReplace(replace)
        }
        "workflow_started" => StreamEvent::WorkflowStarted(parse(value)?),
        "workflow_finished" => StreamEvent::WorkflowFinished(parse(value)?),
        "node_started" => StreamEvent::NodeStarted(parse(value)?),
        "node_finished" => StreamEvent::NodeFinished(parse(value)?),
        // Newer backends add events; they are tolerated, not errors.
        other => StreamEvent::Unrecognized(other.to_string()),
    };
    Ok(event)
}

fn parse<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value)
}

fn malformed(line: &str, message: String) -> Classification {
    Classification::Malformed(StreamError::MalformedFrame {
        line: line.to_string(),
        message,
    })
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
