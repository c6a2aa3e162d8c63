//! JSON request helper
//!
//! [`Requests`] resolves a path to a URL, sends JSON with the standard
//! headers and classifies the response status against a [`StatusPolicy`].

use crate::error::{RequestContext, RequestError, RequestResult};
use crate::policy::{StatusClass, StatusPolicy};
use crate::query::build_query;
use crate::submit::SubmitTarget;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::url::UrlResolver;
use formwork_conf::Settings;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Status and parsed JSON body of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	pub status: u16,
	pub data: Value,
}

impl Response {
	pub fn new(status: u16, data: Value) -> Self {
		Self { status, data }
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Per-request options
///
/// # Examples
///
/// ```
/// use formwork_http::RequestConfig;
/// use serde_json::json;
///
/// let config = RequestConfig::new()
///     .arg("page", json!(2))
///     .send_data(json!({"name": "x"}))
///     .expected_status([200, 204]);
/// assert_eq!(config.args.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
	/// Query arguments, in order
	pub args: Vec<(String, Value)>,
	/// JSON body
	pub send_data: Option<Value>,
	/// Replaces the policy's expected statuses for this request
	pub expected_status: Option<Vec<u16>>,
}

impl RequestConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn arg(mut self, name: impl Into<String>, value: Value) -> Self {
		self.args.push((name.into(), value));
		self
	}

	pub fn send_data(mut self, data: Value) -> Self {
		self.send_data = Some(data);
		self
	}

	pub fn expected_status(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
		self.expected_status = Some(statuses.into_iter().collect());
		self
	}
}

/// Request helper shared by every form of an application.
#[derive(Clone)]
pub struct Requests {
	transport: Arc<dyn HttpTransport>,
	resolver: UrlResolver,
	policy: StatusPolicy,
}

impl Requests {
	pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
		Self {
			transport,
			resolver: UrlResolver::default(),
			policy: StatusPolicy::default(),
		}
	}

	/// reqwest transport, domain and status policy taken from `settings`.
	pub fn from_settings(settings: &Settings) -> RequestResult<Self> {
		let mut builder = ReqwestTransport::builder();
		if settings.timeout_ms > 0 {
			builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
		}
		let transport = builder.build().map_err(|e| RequestError::Transport {
			message: e.message,
			context: Box::new(RequestContext {
				method: String::new(),
				url: String::new(),
				headers: Vec::new(),
				body: None,
			}),
		})?;
		Ok(Self::new(Arc::new(transport))
			.with_domain(settings.domain.clone())
			.with_policy(StatusPolicy::from_settings(settings)))
	}

	pub fn with_domain(mut self, domain: Option<String>) -> Self {
		self.resolver = UrlResolver::Domain(domain);
		self
	}

	pub fn with_url_resolver(mut self, resolver: UrlResolver) -> Self {
		self.resolver = resolver;
		self
	}

	pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn policy(&self) -> &StatusPolicy {
		&self.policy
	}

	pub async fn get(&self, path: &str, config: RequestConfig) -> RequestResult<Response> {
		self.request(Method::GET, path, config).await
	}

	pub async fn post(&self, path: &str, data: Value) -> RequestResult<Response> {
		self.request(Method::POST, path, RequestConfig::new().send_data(data))
			.await
	}

	pub async fn put(&self, path: &str, data: Value) -> RequestResult<Response> {
		self.request(Method::PUT, path, RequestConfig::new().send_data(data))
			.await
	}

	pub async fn patch(&self, path: &str, data: Value) -> RequestResult<Response> {
		self.request(Method::PATCH, path, RequestConfig::new().send_data(data))
			.await
	}

	pub async fn delete(&self, path: &str) -> RequestResult<Response> {
		self.request(Method::DELETE, path, RequestConfig::new()).await
	}

	/// Submit a form payload to `target`.
	///
	/// Handler targets are awaited with the payload; path targets send it as
	/// the JSON body.
	pub async fn submit(&self, target: &SubmitTarget, payload: Value) -> RequestResult<Response> {
		match target {
			SubmitTarget::Handler(handler) => handler(payload).await,
			SubmitTarget::Path { method, path } => {
				self.request(
					method.clone(),
					path,
					RequestConfig::new().send_data(payload),
				)
				.await
			}
		}
	}

	/// Send a request and classify the response.
	///
	/// Expected statuses and structured failures are returned as
	/// [`Response`]; any other status becomes
	/// [`RequestError::UnexpectedStatus`].
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		config: RequestConfig,
	) -> RequestResult<Response> {
		let mut url = self.resolver.resolve(path)?;
		url.push_str(&build_query(
			config.args.iter().map(|(name, value)| (name.as_str(), value)),
		));

		let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
		if method != Method::GET {
			headers.push(("Content-Type".to_string(), "application/json".to_string()));
		}
		let body = config
			.send_data
			.as_ref()
			.map(serde_json::to_string)
			.transpose()?;

		let context = RequestContext {
			method: method.to_string(),
			url: url.clone(),
			headers: headers.clone(),
			body: body.clone(),
		};
		tracing::debug!(method = %method, url = %url, "sending request");

		let response = self
			.transport
			.send(HttpRequest {
				method,
				url,
				headers,
				body,
			})
			.await
			.map_err(|e| {
				tracing::warn!(url = %context.url, error = %e, "request failed before a response");
				RequestError::Transport {
					message: e.message,
					context: Box::new(context.clone()),
				}
			})?;

		self.classify(response, context, config.expected_status.as_deref())
	}

	fn classify(
		&self,
		response: HttpResponse,
		context: RequestContext,
		expected: Option<&[u16]>,
	) -> RequestResult<Response> {
		let status = response.status;
		match self.policy.classify(status, expected) {
			StatusClass::Expected => {
				let data = parse_body(&response.body).map_err(|e| RequestError::InvalidBody {
					status,
					message: e.to_string(),
					context: Box::new(context),
				})?;
				Ok(Response::new(status, data))
			}
			StatusClass::StructuredFailure => match parse_body(&response.body) {
				Ok(data) => Ok(Response::new(status, data)),
				Err(_) => Err(unexpected(response, context)),
			},
			StatusClass::Unexpected => Err(unexpected(response, context)),
		}
	}
}

fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}
	serde_json::from_slice(body)
}

fn unexpected(response: HttpResponse, context: RequestContext) -> RequestError {
	let response_data = parse_body(&response.body).unwrap_or(Value::Null);
	let message = response_data
		.get("message")
		.and_then(Value::as_str)
		.map(str::to_string)
		.unwrap_or_else(|| format!("Unexpected response {}", response.status));
	tracing::warn!(status = response.status, url = %context.url, "{}", message);
	RequestError::UnexpectedStatus {
		status: response.status,
		message,
		context: Box::new(context),
		response_data,
		headers: response.headers,
	}
}
