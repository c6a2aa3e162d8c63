//! Request errors
//!
//! Every failure carries enough context (url, method, headers, body) to be
//! logged or displayed without access to the original call site.

use serde::Serialize;
use serde_json::Value;

/// Snapshot of the request that failed, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContext {
	pub method: String,
	pub url: String,
	pub headers: Vec<(String, String)>,
	pub body: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
	/// Relative request paths must be rooted
	#[error("path must start with \"/\": {0}")]
	InvalidPath(String),

	/// The request never produced a response (DNS, connection, timeout)
	#[error("{message}")]
	Transport {
		message: String,
		context: Box<RequestContext>,
	},

	/// A response arrived with a status outside the expected set
	#[error("{message}")]
	UnexpectedStatus {
		status: u16,
		message: String,
		context: Box<RequestContext>,
		response_data: Value,
		headers: Vec<(String, String)>,
	},

	/// An expected response whose body is not JSON
	#[error("Invalid JSON in response {status}: {message}")]
	InvalidBody {
		status: u16,
		message: String,
		context: Box<RequestContext>,
	},

	#[error("Failed to serialize request body: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Failure reported by a handler submit target
	#[error("{0}")]
	Handler(String),
}

pub type RequestResult<T> = Result<T, RequestError>;

impl RequestError {
	/// Create a handler error
	pub fn handler(msg: impl Into<String>) -> Self {
		Self::Handler(msg.into())
	}

	/// HTTP status of the failed response, `None` when no response arrived.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnexpectedStatus { status, .. } | Self::InvalidBody { status, .. } => {
				Some(*status)
			}
			_ => None,
		}
	}

	pub fn context(&self) -> Option<&RequestContext> {
		match self {
			Self::Transport { context, .. }
			| Self::UnexpectedStatus { context, .. }
			| Self::InvalidBody { context, .. } => Some(context),
			_ => None,
		}
	}

	/// Parsed body of an unexpected response (`Value::Null` if unparsable).
	pub fn response_data(&self) -> Option<&Value> {
		match self {
			Self::UnexpectedStatus { response_data, .. } => Some(response_data),
			_ => None,
		}
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}
