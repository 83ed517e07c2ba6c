//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestTransport`] - HTTP transport using reqwest
//! - [`TracingNotifier`] - notifications written to the log
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockTransport`] - scripted responses and chunked bodies
//! - [`mock::RecordingNotifier`] - captures notifications

pub mod mock;
pub mod notify;
pub mod reqwest_http;

pub use notify::TracingNotifier;
pub use reqwest_http::ReqwestTransport;
