//! Streaming sessions.
//!
//! A [`StreamSession`] sends one request, reads the response body chunk
//! by chunk and hands every recognised event to the caller's
//! [`StreamHandlers`] in arrival order. It ends in exactly one of three
//! ways (see [`SessionOutcome`]) and the completion callback fires once,
//! unless the caller cancelled.
//!
//! # Module structure
//! - `handlers` - the caller's callback table
//! - `dispatcher` - event to callback routing, first-message flag
//! - `watchdog` - inactivity timer
//! - `state` - session lifecycle
//! - `session` - the read loop and [`SessionHandle`]

mod dispatcher;
mod handlers;
mod session;
mod state;
mod watchdog;

pub use dispatcher::{DispatchOutcome, Dispatcher, SERVER_ERROR_MESSAGE};
pub use handlers::{
    OnCompleted, OnData, OnError, OnMessageEnd, OnMessageReplace, OnNodeFinished, OnNodeStarted,
    OnThought, OnWorkflowFinished, OnWorkflowStarted, StreamHandlers,
};
pub(crate) use session::error_body_fields;
pub use session::{
    SessionHandle, SessionOutcome, StreamSession, INVALID_TOKEN_MESSAGE,
    RESPONSE_TIMEOUT_MESSAGE,
};
pub use state::SessionPhase;
pub use watchdog::{Watchdog, DEFAULT_TIMEOUT};
