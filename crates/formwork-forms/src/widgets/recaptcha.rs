//! Captcha widget
//!
//! The third-party script is loaded through an injected [`WidgetLoader`].
//! Loading happens at most once per widget; later mounts only render into
//! their element and reset it.

use crate::callback::Callback;
use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::error::{FormError, FormResult};
use crate::renderer::{FieldProps, RenderStrategy, UserInput, base_control};
use async_trait::async_trait;
use formwork_conf::Settings;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// How long the script may take to load.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Error text the widget reports when mounted twice into one element.
pub const ALREADY_RENDERED: &str = "reCAPTCHA has already been rendered in this element";

/// Host-side access to the captcha library.
#[async_trait]
pub trait WidgetLoader: Send + Sync {
	/// Load the widget script.
	async fn load_script(&self, url: &str) -> anyhow::Result<()>;

	/// Render the widget into `element_id`; `on_token` receives each new
	/// token, or `None` when one expires.
	fn render(
		&self,
		element_id: &str,
		site_key: &str,
		on_token: Callback<Option<String>>,
	) -> anyhow::Result<()>;

	fn reset(&self, element_id: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
	Unloaded,
	Loading,
	Ready,
}

/// Captcha strategy owning the script load state.
pub struct CaptchaWidget {
	loader: Option<Arc<dyn WidgetLoader>>,
	site_key: String,
	script_url: String,
	state: Mutex<LoadState>,
	loaded: OnceCell<()>,
}

impl CaptchaWidget {
	pub fn new(loader: Arc<dyn WidgetLoader>, settings: &Settings) -> Self {
		Self {
			loader: Some(loader),
			site_key: settings.recaptcha_site_key.clone().unwrap_or_default(),
			script_url: settings.recaptcha_script_url.clone(),
			state: Mutex::new(LoadState::Unloaded),
			loaded: OnceCell::new(),
		}
	}

	/// Widget that renders but cannot load; used when no loader is injected.
	pub fn detached() -> Self {
		let settings = Settings::default();
		Self {
			loader: None,
			site_key: String::new(),
			script_url: settings.recaptcha_script_url,
			state: Mutex::new(LoadState::Unloaded),
			loaded: OnceCell::new(),
		}
	}

	pub fn state(&self) -> LoadState {
		*self.state.lock()
	}

	pub fn site_key(&self) -> &str {
		&self.site_key
	}

	fn loader(&self) -> FormResult<&Arc<dyn WidgetLoader>> {
		self.loader
			.as_ref()
			.ok_or_else(|| FormError::Captcha("no widget loader configured".to_string()))
	}

	async fn load(&self, loader: &dyn WidgetLoader) -> FormResult<()> {
		*self.state.lock() = LoadState::Loading;
		let result = match tokio::time::timeout(SCRIPT_TIMEOUT, loader.load_script(&self.script_url)).await
		{
			Ok(Ok(())) => Ok(()),
			Ok(Err(e)) => Err(FormError::Captcha(e.to_string())),
			Err(_) => Err(FormError::Captcha(format!(
				"script \"{}\" timed out",
				self.script_url
			))),
		};
		match &result {
			Ok(()) => *self.state.lock() = LoadState::Ready,
			Err(e) => {
				tracing::error!(url = %self.script_url, error = %e, "failed to load captcha script");
				*self.state.lock() = LoadState::Unloaded;
			}
		}
		result
	}

	/// Load the script if needed and render into `element_id`.
	///
	/// Concurrent callers share a single load. A failed load leaves the
	/// widget `Unloaded` so a later call retries.
	pub async fn ensure_ready(
		&self,
		element_id: &str,
		on_token: Callback<Option<String>>,
	) -> FormResult<()> {
		let loader = self.loader()?;
		let was_loaded = self.loaded.initialized();
		self.loaded
			.get_or_try_init(|| self.load(loader.as_ref()))
			.await?;

		match loader.render(element_id, &self.site_key, on_token) {
			Ok(()) => {}
			Err(e) if e.to_string() == ALREADY_RENDERED => {}
			Err(e) => return Err(FormError::Captcha(e.to_string())),
		}
		if was_loaded {
			loader
				.reset(element_id)
				.map_err(|e| FormError::Captcha(e.to_string()))?;
		}
		Ok(())
	}

	/// Reset the widget in `element_id` if the script is loaded.
	pub fn reset(&self, element_id: &str) {
		if self.state() != LoadState::Ready {
			return;
		}
		if let Some(loader) = &self.loader
			&& let Err(e) = loader.reset(element_id)
		{
			tracing::error!(element_id, error = %e, "failed to reset captcha");
		}
	}
}

impl fmt::Debug for CaptchaWidget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CaptchaWidget")
			.field("site_key", &self.site_key)
			.field("script_url", &self.script_url)
			.field("state", &self.state())
			.finish_non_exhaustive()
	}
}

impl RenderStrategy for CaptchaWidget {
	fn name(&self) -> &'static str {
		"recaptcha"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let mut control = base_control(props, ControlKind::Captcha);
		control.label = None;
		control.attrs.insert("site_key".to_string(), self.site_key.clone());
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Token(Some(token)) | UserInput::Text(token) if !token.is_empty() => {
				Value::String(token)
			}
			UserInput::Token(_) | UserInput::Text(_) => Value::Null,
			other => other.into_raw(),
		}
	}
}
