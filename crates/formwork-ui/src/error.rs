//! UI primitive errors

#[derive(Debug, thiserror::Error)]
pub enum UiError {
	#[error("Invalid modal pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	/// A history implementation refused to navigate
	#[error("Navigation to {path} failed: {reason}")]
	NavigationFailed { path: String, reason: String },

	#[error("A choice dialog needs at least one choice")]
	NoChoices,

	#[error("Desktop notification failed: {0}")]
	Notification(String),

	#[error(transparent)]
	Form(#[from] formwork_forms::FormError),
}

pub type UiResult<T> = Result<T, UiError>;
