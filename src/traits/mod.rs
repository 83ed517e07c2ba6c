//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpTransport`] - issues requests and hands back streaming bodies
//! - [`NotificationSink`] - receives user-visible error messages

pub mod http;
pub mod notify;

pub use http::{ByteStream, Headers, HttpError, HttpRequest, HttpResponse, HttpTransport, Method};
pub use notify::{Notification, NotificationLevel, NotificationSink};
