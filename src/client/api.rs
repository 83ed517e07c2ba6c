//! Typed backend endpoints.

use tracing::debug;

use super::{ChatflowClient, RequestOptions};
use crate::error::ChatflowResult;
use crate::models::{
    Acknowledgement, AppParameters, ChatRequest, Conversation, ConversationList, FeedbackRequest,
    MessageList, Rating, RenameRequest, RESPONSE_MODE_STREAMING,
};
use crate::stream::{SessionHandle, StreamHandlers};

const CONVERSATION_PAGE_SIZE: &str = "100";
const MESSAGE_PAGE_SIZE: &str = "20";

impl ChatflowClient {
    /// Send a chat message and stream the answer into `handlers`.
    ///
    /// `user` falls back to the configured user when left empty.
    pub fn send_chat_message(
        &self,
        mut request: ChatRequest,
        handlers: StreamHandlers,
    ) -> ChatflowResult<SessionHandle> {
        request.response_mode = RESPONSE_MODE_STREAMING.to_string();
        if request.user.is_empty() {
            request.user = self.config().user.clone();
        }
        debug!(
            conversation = request.conversation_id.as_deref().unwrap_or(""),
            files = request.files.len(),
            "Sending chat message"
        );
        self.sse_post("chat-messages", &request, handlers)
    }

    /// First page of the user's conversations.
    pub async fn fetch_conversations(&self) -> ChatflowResult<ConversationList> {
        let options = RequestOptions::new()
            .with_param("limit", CONVERSATION_PAGE_SIZE)
            .with_param("first_id", "")
            .with_param("user", self.config().user.clone());
        self.get("conversations", options).await?.parse()
    }

    /// Latest messages of one conversation.
    pub async fn fetch_chat_list(&self, conversation_id: &str) -> ChatflowResult<MessageList> {
        let options = RequestOptions::new()
            .with_param("conversation_id", conversation_id)
            .with_param("limit", MESSAGE_PAGE_SIZE)
            .with_param("last_id", "")
            .with_param("user", self.config().user.clone());
        self.get("messages", options).await?.parse()
    }

    pub async fn fetch_app_params(&self) -> ChatflowResult<AppParameters> {
        let options = RequestOptions::new().with_param("user", self.config().user.clone());
        self.get("parameters", options).await?.parse()
    }

    /// Rate a message; `None` clears an earlier rating.
    pub async fn update_feedback(
        &self,
        message_id: &str,
        rating: Option<Rating>,
    ) -> ChatflowResult<Acknowledgement> {
        let body = FeedbackRequest {
            rating,
            user: self.config().user.clone(),
        };
        let options = RequestOptions::new().with_json(&body)?;
        self.post(&format!("messages/{}/feedbacks", message_id), options)
            .await?
            .parse()
    }

    /// Ask the backend to name a conversation from its content.
    pub async fn generate_conversation_name(
        &self,
        conversation_id: &str,
    ) -> ChatflowResult<Conversation> {
        let body = RenameRequest {
            auto_generate: true,
            user: self.config().user.clone(),
        };
        let options = RequestOptions::new().with_json(&body)?;
        self.post(&format!("conversations/{}/name", conversation_id), options)
            .await?
            .parse()
    }
}
