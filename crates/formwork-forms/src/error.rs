//! Errors raised by form definitions and widget collaborators
//!
//! Validation and submission failures never surface here: the controller
//! turns them into [`FormState`](crate::FormState).

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	/// A field was referenced for rendering but is not defined
	#[error(
		"field \"{0}\" is not defined and not marked optional, make sure all referenced fields are defined"
	)]
	UndefinedField(String),

	/// A value was set for a field outside the field set
	#[error("unknown field \"{0}\"")]
	UnknownField(String),

	/// A choice that is neither a string nor an object with a string value
	#[error("choice not an object or choice.value not a string: {0}")]
	InvalidChoice(String),

	/// A widget operation was routed to a field of another type
	#[error("field \"{field}\" is not a {expected} field")]
	WrongFieldType { field: String, expected: &'static str },

	#[error("Failed to read file {path}: {source}")]
	FileRead {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid field definition: {0}")]
	Definition(#[from] serde_json::Error),

	/// The captcha widget could not be loaded or rendered
	#[error("captcha unavailable: {0}")]
	Captcha(String),

	#[error(transparent)]
	Request(#[from] formwork_http::RequestError),
}

pub type FormResult<T> = Result<T, FormError>;
