//! # formwork-conf
//!
//! Settings for the formwork toolkit: API domain, the HTTP status policy
//! table, timers used by toasts and notifications, and captcha keys.
//!
//! ```
//! use formwork_conf::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.browser_inactive_ms, 5_000);
//! ```

pub mod env;
pub mod settings;

pub use env::{Env, EnvError};
pub use settings::{
	DEFAULT_EXPECTED_STATUS, DEFAULT_STRUCTURED_FAILURE_STATUS, ENV_PREFIX, Settings,
	SettingsError, SettingsResult,
};
