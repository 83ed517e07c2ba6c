//! Request bodies and list responses for the backend endpoints.
//!
//! Response types use `#[serde(default)]` throughout: the backend adds
//! fields freely and older deployments omit some.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default for both `null` and a missing key.
pub(crate) fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Only mode the client speaks for chat messages.
pub const RESPONSE_MODE_STREAMING: &str = "streaming";

/// Body of `POST chat-messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Values for the app's input form.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    pub query: String,
    /// Set by the client before sending.
    #[serde(default)]
    pub response_mode: String,
    /// Continue this conversation; `None` starts a new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Filled from the client config when empty.
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRef>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }

    pub fn with_file(mut self, file: FileRef) -> Self {
        self.files.push(file);
        self
    }
}

/// How an attached file reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    /// Previously uploaded; referenced by `upload_file_id`.
    LocalFile,
    RemoteUrl,
}

/// A file attached to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "type")]
    pub file_type: String,
    pub transfer_method: TransferMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileRef {
    /// An image from the upload endpoint, by its returned id.
    pub fn uploaded_image(upload_file_id: impl Into<String>) -> Self {
        Self {
            file_type: "image".to_string(),
            transfer_method: TransferMethod::LocalFile,
            upload_file_id: Some(upload_file_id.into()),
            url: None,
        }
    }

    pub fn remote_image(url: impl Into<String>) -> Self {
        Self {
            file_type: "image".to_string(),
            transfer_method: TransferMethod::RemoteUrl,
            upload_file_id: None,
            url: Some(url.into()),
        }
    }
}

/// Message rating. `None` in [`FeedbackRequest`] clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Like,
    Dislike,
}

/// Body of `POST messages/{id}/feedbacks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub rating: Option<Rating>,
    pub user: String,
}

/// Body of `POST conversations/{id}/name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub auto_generate: bool,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: String,
    #[serde(deserialize_with = "deserialize_nullable")]
    pub name: String,
    pub inputs: Map<String, Value>,
    pub status: Option<String>,
    pub introduction: Option<String>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationList {
    pub data: Vec<Conversation>,
    pub has_more: bool,
    pub limit: u32,
}

/// One past exchange in a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryMessage {
    pub id: String,
    pub conversation_id: String,
    pub inputs: Map<String, Value>,
    pub query: String,
    #[serde(deserialize_with = "deserialize_nullable")]
    pub answer: String,
    #[serde(deserialize_with = "deserialize_nullable")]
    pub message_files: Vec<Value>,
    pub feedback: Option<Value>,
    #[serde(deserialize_with = "deserialize_nullable")]
    pub agent_thoughts: Vec<Value>,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageList {
    pub data: Vec<HistoryMessage>,
    pub has_more: bool,
    pub limit: u32,
}

/// App parameters: opening statement, suggested questions, input form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppParameters {
    pub opening_statement: Option<String>,
    pub suggested_questions: Vec<String>,
    pub user_input_form: Vec<Value>,
    pub file_upload: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Generic `{ "result": "success" }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Acknowledgement {
    pub result: String,
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        self.result == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest::new("Hello")
            .with_user("alice")
            .with_input("lang", "en")
            .with_file(FileRef::uploaded_image("up-1"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "inputs": {"lang": "en"},
                "query": "Hello",
                "response_mode": "",
                "user": "alice",
                "files": [{"type": "image", "transfer_method": "local_file", "upload_file_id": "up-1"}]
            })
        );
    }

    #[test]
    fn test_chat_request_with_conversation() {
        let value = serde_json::to_value(ChatRequest::new("Hi").with_conversation("c1")).unwrap();
        assert_eq!(value["conversation_id"], "c1");
        assert!(value.get("files").is_none());
    }

    #[test]
    fn test_feedback_rating_serialization() {
        let like = FeedbackRequest {
            rating: Some(Rating::Like),
            user: "u".to_string(),
        };
        let cleared = FeedbackRequest {
            rating: None,
            user: "u".to_string(),
        };
        assert_eq!(serde_json::to_value(like).unwrap(), json!({"rating": "like", "user": "u"}));
        assert_eq!(serde_json::to_value(cleared).unwrap(), json!({"rating": null, "user": "u"}));
    }

    #[test]
    fn test_conversation_list_tolerates_missing_fields() {
        let list: ConversationList = serde_json::from_value(json!({
            "data": [{"id": "c1", "name": "First", "unknown": 1}]
        }))
        .unwrap();
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].name, "First");
        assert!(!list.has_more);
    }

    #[test]
    fn test_app_parameters_keep_unknown_fields() {
        let params: AppParameters = serde_json::from_value(json!({
            "opening_statement": "Hi there",
            "suggested_questions": ["a", "b"],
            "speech_to_text": {"enabled": false}
        }))
        .unwrap();
        assert_eq!(params.opening_statement.as_deref(), Some("Hi there"));
        assert_eq!(params.suggested_questions, vec!["a", "b"]);
        assert!(params.extra.contains_key("speech_to_text"));
    }

    #[test]
    fn test_history_message_null_fields_read_as_empty() {
        let list: MessageList = serde_json::from_value(json!({
            "data": [{"id": "m1", "query": "q", "answer": null, "message_files": null, "agent_thoughts": null}]
        }))
        .unwrap();
        assert_eq!(list.data[0].answer, "");
        assert!(list.data[0].message_files.is_empty());
        assert!(list.data[0].agent_thoughts.is_empty());

        let conversation: Conversation =
            serde_json::from_value(json!({"id": "c1", "name": null})).unwrap();
        assert_eq!(conversation.name, "");
    }
}
