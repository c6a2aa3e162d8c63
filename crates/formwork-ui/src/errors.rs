//! Error and loading placeholders

use formwork_http::RequestError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ErrorView {
	Error {
		status: Option<u16>,
		message: String,
	},
	NotFound {
		url: String,
	},
	Loading,
}

impl ErrorView {
	/// View for a failed request; `location` stands in when the request has
	/// no URL.
	pub fn from_error(error: &RequestError, location: &str) -> Self {
		match error.status() {
			Some(404) => Self::NotFound {
				url: error
					.context()
					.map(|context| context.url.clone())
					.unwrap_or_else(|| location.to_string()),
			},
			status => Self::Error {
				status,
				message: error.to_string(),
			},
		}
	}

	pub fn heading(&self) -> &'static str {
		match self {
			Self::Error { .. } => "Error",
			Self::NotFound { .. } => "Page not found",
			Self::Loading => "Loading",
		}
	}

	/// CSS classes, with `extra` appended when given.
	pub fn classes(&self, extra: Option<&str>) -> String {
		let default = match self {
			Self::Error { .. } => "error",
			Self::NotFound { .. } => "not-found",
			Self::Loading => "d-flex justify-content-center py-2 loading",
		};
		match extra {
			Some(extra) if !extra.is_empty() => format!("{} {}", default, extra),
			_ => default.to_string(),
		}
	}
}

impl fmt::Display for ErrorView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error {
				status: Some(status),
				message,
			} => write!(f, "{}: {}.", status, message),
			Self::Error { status: None, message } => write!(f, "{}.", message),
			Self::NotFound { url } => write!(f, "The page {} does not exist.", url),
			Self::Loading => Ok(()),
		}
	}
}
