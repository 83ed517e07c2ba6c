//! Stream frame parsing.
//!
//! The backend answers streaming requests with a text body in which each
//! event is one line:
//!
//! ```text
//! data: {"event":"message","answer":"Hi","conversation_id":"c1","id":"m1"}
//! data: {"event":"message_end","id":"m1"}
//! ```
//!
//! Lines without the `data: ` prefix are ignored. An error frame carries
//! `status >= 400` or omits `event`.
//!
//! # Module structure
//! - `decoder` - bytes to lines, with carry-over across chunk boundaries
//! - `classifier` - line to [`Classification`]
//! - `events` - [`StreamEvent`] and its payload types
//! - `unescape` - `\uXXXX` post-processing of double-encoded text

mod classifier;
mod decoder;
mod events;
mod unescape;

pub use classifier::{classify, Classification, DATA_PREFIX};
pub use decoder::FrameDecoder;
pub use events::{
    AgentThought, ExecutionMetadata, MessageChunk, MessageEnd, MessageInfo, MessageReplace,
    NodeFinished, NodeFinishedData, NodeStarted, NodeStartedData, StreamEvent, UpstreamError,
    WorkflowEnvelope, WorkflowFinished, WorkflowFinishedData, WorkflowStarted,
    WorkflowStartedData,
};
pub use unescape::unescape_unicode;
