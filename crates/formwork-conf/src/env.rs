//! Environment variable handling
//!
//! Typed lookups of (optionally prefixed) environment variables. Every
//! lookup distinguishes "absent" from "present but malformed" so callers can
//! fall back to defaults without hiding typos.

use std::env;

/// Environment variable reader with prefix support
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Optional prefix for environment variables (e.g., "FORMWORK_")
	pub prefix: Option<String>,
}

impl Env {
	/// Create a new Env instance without a prefix
	pub fn new() -> Self {
		Self { prefix: None }
	}
	/// Set a prefix for all environment variable lookups
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	/// Read a raw string value, `Ok(None)` when the variable is not set
	pub fn opt_str(&self, key: &str) -> Result<Option<String>, EnvError> {
		let full_key = self.key_name(key);
		validate_env_var_name(&full_key)?;
		Ok(env::var(&full_key).ok())
	}
	/// Read a string value
	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.opt_str(key)?
			.ok_or_else(|| EnvError::MissingVariable(self.key_name(key)))
	}
	/// Read an unsigned integer value, `Ok(None)` when the variable is not set
	pub fn opt_u64(&self, key: &str) -> Result<Option<u64>, EnvError> {
		let Some(val) = self.opt_str(key)? else {
			return Ok(None);
		};
		val.trim()
			.parse::<u64>()
			.map(Some)
			.map_err(|e| EnvError::ParseError {
				key: self.key_name(key),
				value_len: val.len(),
				error: e.to_string(),
			})
	}
	/// Read a comma-separated list of status codes, `Ok(None)` when not set
	pub fn opt_status_list(&self, key: &str) -> Result<Option<Vec<u16>>, EnvError> {
		let Some(val) = self.opt_str(key)? else {
			return Ok(None);
		};
		parse_list(&val)
			.into_iter()
			.map(|item| {
				item.parse::<u16>().map_err(|e| EnvError::ParseError {
					key: self.key_name(key),
					value_len: val.len(),
					error: format!("'{}': {}", item, e),
				})
			})
			.collect::<Result<Vec<_>, _>>()
			.map(Some)
	}
}

/// Splits a comma-separated value, trimming items and dropping empty ones.
pub fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Validates an environment variable name.
///
/// Rejects names that are empty, contain control characters, or contain
/// the `=` character (which is used as the key-value separator).
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

/// Environment variable errors
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}
