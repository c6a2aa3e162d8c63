//! Status classification table

use formwork_conf::Settings;

/// How a response status is treated by [`crate::Requests`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
	/// Returned as a successful response
	Expected,
	/// Returned as a response whose body describes the failure
	StructuredFailure,
	/// Raised as [`crate::RequestError::UnexpectedStatus`]
	Unexpected,
}

/// Which statuses are expected and which failures carry a parseable body.
///
/// The two lists vary between deployments, so neither is hard-coded at the
/// call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
	expected: Vec<u16>,
	structured_failures: Vec<u16>,
}

impl StatusPolicy {
	pub fn new(expected: Vec<u16>, structured_failures: Vec<u16>) -> Self {
		Self {
			expected,
			structured_failures,
		}
	}

	/// Policy that only accepts the given statuses and parses no failures.
	pub fn strict(expected: Vec<u16>) -> Self {
		Self::new(expected, Vec::new())
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(
			settings.expected_status.clone(),
			settings.structured_failure_status.clone(),
		)
	}

	pub fn expected(&self) -> &[u16] {
		&self.expected
	}

	pub fn structured_failures(&self) -> &[u16] {
		&self.structured_failures
	}

	/// Classify `status`; `expected_override` replaces the expected list for
	/// a single request.
	pub fn classify(&self, status: u16, expected_override: Option<&[u16]>) -> StatusClass {
		let expected = expected_override.unwrap_or(&self.expected);
		if expected.contains(&status) {
			StatusClass::Expected
		} else if self.structured_failures.contains(&status) {
			StatusClass::StructuredFailure
		} else {
			StatusClass::Unexpected
		}
	}
}

impl Default for StatusPolicy {
	fn default() -> Self {
		Self::from_settings(&Settings::default())
	}
}
