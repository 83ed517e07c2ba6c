//! Mock implementations for testing.
//!
//! Test doubles for the trait seams, so sessions and the request issuer
//! can be exercised without a network.
//!
//! # Available Mocks
//!
//! - [`MockTransport`] - scripted responses and chunked bodies
//! - [`RecordingNotifier`] - captures notifications

pub mod http;
pub mod notify;

pub use http::{Chunk, MockTransport, ScriptedResponse};
pub use notify::RecordingNotifier;
