//! Chatflow client - streaming chat over a `data: `-framed HTTP response.
//!
//! The crate sends chat requests to a chatflow backend, decodes the
//! streamed answer frame by frame and delivers typed events to caller
//! callbacks. Plain JSON calls (conversation lists, feedback, app
//! parameters) go through the same client.
//!
//! Entry points: [`ChatflowClient`] for requests and streams,
//! [`StreamHandlers`] for callbacks, [`ClientConfig`] for setup.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod sse;
pub mod stream;
pub mod traits;

pub use client::{ApiResponse, ChatflowClient, RawResponse, RequestOptions};
pub use config::ClientConfig;
pub use error::{ChatflowError, ChatflowResult, NetworkError, StreamError};
pub use models::{ChatRequest, FileRef, Rating};
pub use sse::{MessageInfo, StreamEvent};
pub use stream::{SessionHandle, SessionOutcome, StreamHandlers};
