//! HTTP transport trait abstraction.
//!
//! Provides a trait-based abstraction for issuing requests, enabling
//! dependency injection and scripted transports in tests.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incrementally delivered response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    /// Serialized JSON body, if any
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// HTTP response whose body has not been read yet.
///
/// Status and headers are available as soon as the transport returns;
/// the body is only pulled when the caller asks for it.
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: Headers,
    body: ByteStream,
}

impl HttpResponse {
    /// Create a response around a body stream.
    pub fn new(status: u16, headers: Headers, body: ByteStream) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a response whose body is already in memory.
    pub fn from_bytes(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(
            status,
            headers,
            Box::pin(futures::stream::once(async move { Ok(body) })),
        )
    }

    /// 2xx and 3xx both count as success.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Look up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The media type of the body, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|value| value.split(';').next().unwrap_or(value).trim())
    }

    /// Take the body stream.
    pub fn into_body(self) -> ByteStream {
        self.body
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// HTTP transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Timeout enforced by the transport itself
    Timeout(String),
    /// The cancellation token fired
    Cancelled,
    /// Body read failed midway
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for issuing HTTP requests.
///
/// Implementations must honour `cancel`: once it fires, a pending
/// `execute` resolves with [`HttpError::Cancelled`] and an already
/// returned body stream ends without yielding further chunks. Dropping
/// alone is not relied upon to release the connection.
///
/// # Example
///
/// ```ignore
/// use chatflow_client::traits::{HttpRequest, HttpTransport, Method};
///
/// async fn status<T: HttpTransport>(transport: &T) -> u16 {
///     let request = HttpRequest::new(Method::Get, "http://localhost/v1/parameters");
///     transport.execute(request, CancellationToken::new()).await.map(|r| r.status).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and resolve once response headers arrive.
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Result<HttpResponse, HttpError>;
}
