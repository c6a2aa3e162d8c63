//! HTTP transport seam
//!
//! [`Requests`](crate::Requests) never talks to the network directly; it hands
//! an [`HttpRequest`] to an [`HttpTransport`]. The default transport is built
//! on reqwest with a cookie store so session cookies travel with every
//! request.

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::time::Duration;

/// Outgoing request, already resolved and serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
	pub method: Method,
	pub url: String,
	pub headers: Vec<(String, String)>,
	pub body: Option<String>,
}

/// Raw response as received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
	pub status: u16,
	pub headers: Vec<(String, String)>,
	pub body: Bytes,
}

/// Failure before any response was received.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
	pub message: String,
	pub is_timeout: bool,
	pub is_connect: bool,
}

impl TransportError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			is_timeout: false,
			is_connect: false,
		}
	}
}

impl From<reqwest::Error> for TransportError {
	fn from(err: reqwest::Error) -> Self {
		Self {
			message: err.to_string(),
			is_timeout: err.is_timeout(),
			is_connect: err.is_connect(),
		}
	}
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Builder for [`ReqwestTransport`]
///
/// # Example
/// ```rust,no_run
/// use formwork_http::ReqwestTransport;
/// use std::time::Duration;
///
/// let transport = ReqwestTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
	timeout: Option<Duration>,
	cookie_store: bool,
}

impl ReqwestTransportBuilder {
	pub fn new() -> Self {
		Self {
			timeout: None,
			cookie_store: true,
		}
	}

	/// Set the request timeout
	pub fn timeout(mut self, duration: Duration) -> Self {
		self.timeout = Some(duration);
		self
	}

	/// Enable or disable automatic cookie storage (enabled by default)
	pub fn cookie_store(mut self, enabled: bool) -> Self {
		self.cookie_store = enabled;
		self
	}

	pub fn build(self) -> Result<ReqwestTransport, TransportError> {
		let mut client_builder = reqwest::Client::builder();

		if let Some(timeout) = self.timeout {
			client_builder = client_builder.timeout(timeout);
		}
		if self.cookie_store {
			client_builder = client_builder.cookie_store(true);
		}

		Ok(ReqwestTransport {
			client: client_builder.build()?,
		})
	}
}

impl Default for ReqwestTransportBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn builder() -> ReqwestTransportBuilder {
		ReqwestTransportBuilder::new()
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let mut builder = self.client.request(request.method, &request.url);
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value
					.to_str()
					.ok()
					.map(|v| (name.as_str().to_string(), v.to_string()))
			})
			.collect();
		let body = response.bytes().await?;

		Ok(HttpResponse {
			status,
			headers,
			body,
		})
	}
}
