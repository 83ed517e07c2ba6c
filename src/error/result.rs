//! Result type alias for client operations.

use super::chatflow_error::ChatflowError;

/// Type alias for Results using [`ChatflowError`].
///
/// # Example
///
/// ```ignore
/// use chatflow_client::error::ChatflowResult;
///
/// async fn load(client: &ChatflowClient) -> ChatflowResult<serde_json::Value> {
///     client.fetch_app_params().await
/// }
/// ```
pub type ChatflowResult<T> = Result<T, ChatflowError>;
