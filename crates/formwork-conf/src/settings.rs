//! Toolkit settings
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `FORMWORK_*` environment variables. Later layers only override the keys
//! they actually set.

use crate::env::{Env, EnvError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix used for every environment variable read by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "FORMWORK_";

/// Default statuses returned as successful responses.
pub const DEFAULT_EXPECTED_STATUS: &[u16] = &[200, 201];

/// Default statuses that carry a parseable error body.
pub const DEFAULT_STRUCTURED_FAILURE_STATUS: &[u16] = &[400, 409, 422, 470];

/// Default script used to load the captcha widget.
pub const DEFAULT_RECAPTCHA_SCRIPT_URL: &str =
	"https://www.google.com/recaptcha/api.js?render=explicit";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("Invalid settings TOML: {0}")]
	Toml(#[from] toml::de::Error),
	#[error(transparent)]
	Env(#[from] EnvError),
	#[error("Invalid setting '{key}': {reason}")]
	Invalid { key: &'static str, reason: String },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings shared by the request helper, the form controller and the UI
/// primitives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// API domain; `localhost` maps to `http://localhost:8000`, anything
	/// else to `https://{domain}`. `None` leaves request paths unchanged.
	pub domain: Option<String>,

	/// Statuses treated as successful responses
	pub expected_status: Vec<u16>,

	/// Statuses whose JSON body describes a structured failure
	pub structured_failure_status: Vec<u16>,

	/// Per-request timeout in milliseconds (0 disables the timeout)
	pub timeout_ms: u64,

	/// Time without input after which the browser window counts as inactive
	pub browser_inactive_ms: u64,

	/// Default on-screen time of a toast message
	pub toast_time_ms: u64,

	/// Site key handed to the captcha widget
	pub recaptcha_site_key: Option<String>,

	/// Script loaded before the captcha widget can render
	pub recaptcha_script_url: String,

	/// Regex matched against the location to decide whether a modal is open
	pub modal_pattern: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			domain: None,
			expected_status: DEFAULT_EXPECTED_STATUS.to_vec(),
			structured_failure_status: DEFAULT_STRUCTURED_FAILURE_STATUS.to_vec(),
			timeout_ms: 30_000,
			browser_inactive_ms: 5_000,
			toast_time_ms: 5_000,
			recaptcha_site_key: None,
			recaptcha_script_url: DEFAULT_RECAPTCHA_SCRIPT_URL.to_string(),
			modal_pattern: "modal/$".to_string(),
		}
	}
}

impl Settings {
	/// Parse settings from a TOML document, missing keys keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use formwork_conf::Settings;
	///
	/// let settings = Settings::from_toml_str("domain = \"api.example.com\"").unwrap();
	/// assert_eq!(settings.domain.as_deref(), Some("api.example.com"));
	/// assert_eq!(settings.expected_status, vec![200, 201]);
	/// ```
	pub fn from_toml_str(source: &str) -> SettingsResult<Self> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Read settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.display().to_string(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Defaults overridden by `FORMWORK_*` environment variables.
	pub fn from_env() -> SettingsResult<Self> {
		let mut settings = Self::default();
		settings.apply_env(&Env::new().with_prefix(ENV_PREFIX))?;
		Ok(settings)
	}

	/// Optional TOML file, then environment overrides.
	pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
		let mut settings = match path {
			Some(path) => Self::from_file(path)?,
			None => Self::default(),
		};
		settings.apply_env(&Env::new().with_prefix(ENV_PREFIX))?;
		Ok(settings)
	}

	/// Override every key that is set in `env`.
	pub fn apply_env(&mut self, env: &Env) -> SettingsResult<()> {
		if let Some(domain) = env.opt_str("DOMAIN")? {
			self.domain = Some(domain).filter(|d| !d.is_empty());
		}
		if let Some(expected) = env.opt_status_list("EXPECTED_STATUS")? {
			self.expected_status = expected;
		}
		if let Some(structured) = env.opt_status_list("STRUCTURED_FAILURE_STATUS")? {
			self.structured_failure_status = structured;
		}
		if let Some(timeout) = env.opt_u64("TIMEOUT_MS")? {
			self.timeout_ms = timeout;
		}
		if let Some(inactive) = env.opt_u64("BROWSER_INACTIVE_MS")? {
			self.browser_inactive_ms = inactive;
		}
		if let Some(toast) = env.opt_u64("TOAST_TIME_MS")? {
			self.toast_time_ms = toast;
		}
		if let Some(key) = env.opt_str("RECAPTCHA_SITE_KEY")? {
			self.recaptcha_site_key = Some(key);
		}
		if let Some(url) = env.opt_str("RECAPTCHA_SCRIPT_URL")? {
			self.recaptcha_script_url = url;
		}
		if let Some(pattern) = env.opt_str("MODAL_PATTERN")? {
			self.modal_pattern = pattern;
		}
		tracing::debug!(domain = ?self.domain, "applied environment settings");
		self.validate()
	}

	fn validate(&self) -> SettingsResult<()> {
		if self.expected_status.is_empty() {
			return Err(SettingsError::Invalid {
				key: "expected_status",
				reason: "at least one status must be expected".to_string(),
			});
		}
		if let Some(status) = self
			.expected_status
			.iter()
			.chain(&self.structured_failure_status)
			.find(|s| !(100..=599).contains(*s))
		{
			return Err(SettingsError::Invalid {
				key: "expected_status",
				reason: format!("{} is not an HTTP status code", status),
			});
		}
		if self.modal_pattern.is_empty() {
			return Err(SettingsError::Invalid {
				key: "modal_pattern",
				reason: "pattern must not be empty".to_string(),
			});
		}
		Ok(())
	}
}
