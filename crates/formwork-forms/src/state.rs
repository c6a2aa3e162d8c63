//! Form state and submission outcomes

use formwork_http::Response;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form-level message when the submitted payload is empty.
pub const NO_DATA_ENTERED: &str = "No data entered";
/// Message for required fields left blank.
pub const FIELD_REQUIRED: &str = "Field Required";
/// Form-level message when a rejection names no known field.
pub const ERROR_OCCURRED: &str = "Error occurred";

/// State owned by a [`FormController`](crate::FormController).
///
/// `errors` only ever names fields of the form's field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormState {
	pub values: Map<String, Value>,
	pub errors: IndexMap<String, String>,
	/// A submission is in flight
	pub disabled: bool,
	pub form_error: Option<String>,
}

/// Where the controller is in the submission lifecycle.
///
/// `Succeeded` and `Rejected` are reported until the next edit or submit
/// attempt returns the form to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
	#[default]
	Idle,
	Validating,
	Submitting,
	Succeeded,
	Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
	pub field_name: String,
	pub message: String,
}

impl ValidationError {
	pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field_name: field_name.into(),
			message: message.into(),
		}
	}
}

/// Result of one submit attempt that got past the re-entrancy guard.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
	Success(Response),
	/// Local or server-side validation failure; empty when the failure could
	/// not be attributed to a field
	ValidationFailure(Vec<ValidationError>),
	TransportFailure(String),
}

impl SubmissionOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}
}

/// Map a structured rejection body to field errors.
///
/// Entries come from `details` (or `detail`); each entry's `loc` names the
/// field by its first segment, or its second when the first is `body`.
pub fn extract_field_errors(data: &Value) -> Vec<ValidationError> {
	let Some(entries) = data
		.get("details")
		.or_else(|| data.get("detail"))
		.and_then(Value::as_array)
	else {
		return Vec::new();
	};

	entries
		.iter()
		.filter_map(|entry| {
			let loc = entry.get("loc")?.as_array()?;
			let segment = match loc.first()? {
				Value::String(s) if s == "body" => loc.get(1)?,
				first => first,
			};
			let field_name = match segment {
				Value::String(s) => s.clone(),
				Value::Number(n) => n.to_string(),
				_ => return None,
			};
			let message = entry.get("msg")?.as_str()?;
			Some(ValidationError::new(field_name, message))
		})
		.collect()
}
