//! Error taxonomy for the chatflow client.
//!
//! | Error | Raised by | Effect |
//! |-------|-----------|--------|
//! | `NetworkError::Transport` | transport | terminates, surfaced once |
//! | `NetworkError::HttpStatus` | non-2xx/3xx status | terminates, body `message` surfaced |
//! | `NetworkError::Unauthorized` | 401 | terminates, fixed notification |
//! | `NetworkError::RequestTimeout` | request deadline | terminates |
//! | `StreamError::MalformedFrame` | one bad JSON line | logged, stream continues |
//! | `StreamError::Upstream` | error frame | terminates the session |
//! | `StreamError::InactivityTimeout` | watchdog | terminates the session |
//!
//! Nothing in this crate retries. Retry policy belongs to the caller.

mod chatflow_error;
mod network;
mod result;
mod stream;

pub use chatflow_error::ChatflowError;
pub use network::NetworkError;
pub use result::ChatflowResult;
pub use stream::StreamError;
