//! Reqwest-based transport adapter.
//!
//! Production implementation of [`HttpTransport`]. Response bodies are
//! exposed as a chunk stream and end as soon as the cancellation token
//! fires, which drops the underlying connection.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::traits::{Headers, HttpError, HttpRequest, HttpResponse, HttpTransport, Method};

/// Transport implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use chatflow_client::adapters::ReqwestTransport;
/// use chatflow_client::traits::{HttpRequest, HttpTransport, Method};
///
/// let transport = ReqwestTransport::new();
/// let request = HttpRequest::new(Method::Get, "http://localhost:5001/v1/parameters");
/// let response = transport.execute(request, CancellationToken::new()).await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    ///
    /// No client-level timeout is set: deadlines are enforced by the
    /// request issuer and the session watchdog.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Wrap a preconfigured reqwest client (proxies, TLS, pools).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    fn convert_body_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else {
            HttpError::Io(err.to_string())
        }
    }

    fn convert_method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    fn apply_headers(
        builder: reqwest::RequestBuilder,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        let mut builder = builder;
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        cancel: CancellationToken,
    ) -> Result<HttpResponse, HttpError> {
        let builder = self
            .client
            .request(Self::convert_method(request.method), &request.url);
        let mut builder = Self::apply_headers(builder, &request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HttpError::Cancelled),
            result = builder.send() => result.map_err(Self::convert_error)?,
        };

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response
            .bytes_stream()
            .map(|result| result.map_err(Self::convert_body_error))
            .take_until(cancel.cancelled_owned());

        Ok(HttpResponse::new(status, headers, Box::pin(body)))
    }
}
