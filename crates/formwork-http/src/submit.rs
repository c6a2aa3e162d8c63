//! Submission targets
//!
//! A form submits either to a path (sent through [`crate::Requests`]) or to
//! a handler function that produces the response itself.

use crate::client::Response;
use crate::error::RequestResult;
use futures::future::BoxFuture;
use http::Method;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SubmitHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, RequestResult<Response>> + Send + Sync>;

#[derive(Clone)]
pub enum SubmitTarget {
	/// Send the payload as the JSON body of an HTTP request
	Path { method: Method, path: String },
	/// Await a handler with the payload
	Handler(SubmitHandler),
}

impl SubmitTarget {
	/// POST the payload to `path`
	pub fn post(path: impl Into<String>) -> Self {
		Self::Path {
			method: Method::POST,
			path: path.into(),
		}
	}

	pub fn path(method: Method, path: impl Into<String>) -> Self {
		Self::Path {
			method,
			path: path.into(),
		}
	}

	/// Wrap an async function as a submit target
	///
	/// # Examples
	///
	/// ```
	/// use formwork_http::{Response, SubmitTarget};
	///
	/// let target = SubmitTarget::handler(|payload| async move {
	///     Ok(Response::new(201, payload))
	/// });
	/// assert!(matches!(target, SubmitTarget::Handler(_)));
	/// ```
	pub fn handler<F, Fut>(f: F) -> Self
	where
		F: Fn(Value) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = RequestResult<Response>> + Send + 'static,
	{
		Self::Handler(Arc::new(move |payload| Box::pin(f(payload))))
	}
}

impl fmt::Debug for SubmitTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path { method, path } => f
				.debug_struct("Path")
				.field("method", method)
				.field("path", path)
				.finish(),
			Self::Handler(_) => f.write_str("Handler(..)"),
		}
	}
}
