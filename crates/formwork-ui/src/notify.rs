//! Desktop notifications with an in-app fallback
//!
//! A message goes to the desktop only when notifications are supported,
//! permitted, and the window is inactive. Everything else becomes a toast
//! without a progress bar. Clicking either one follows the message link.

use crate::error::UiResult;
use crate::modal::History;
use crate::toast::{Toast, ToastOptions, Toaster};
use formwork_conf::Settings;
use formwork_forms::Callback;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
	Default,
	Granted,
	Denied,
}

/// What the host shows on the desktop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopNotification {
	pub title: String,
	pub body: Option<String>,
	pub icon: Option<String>,
	pub badge: Option<String>,
}

/// Host access to desktop notifications.
pub trait DesktopNotifications: Send + Sync {
	fn permission(&self) -> Permission;

	/// Ask the user for permission; the answer arrives asynchronously.
	fn request_permission(&self);

	/// Show a notification; `on_click` runs when the user clicks it.
	fn show(&self, notification: DesktopNotification, on_click: Callback<()>) -> UiResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
	pub title: String,
	#[serde(default)]
	pub message: Option<String>,
	/// Used when `message` is not set
	#[serde(default)]
	pub body: Option<String>,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub badge: Option<String>,
	#[serde(default)]
	pub link: Option<String>,
	/// Extra payload; `data.link` is used when `link` is not set
	#[serde(default)]
	pub data: Option<Value>,
}

impl Message {
	pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			message: Some(message.into()),
			..Self::default()
		}
	}

	pub fn with_link(mut self, link: impl Into<String>) -> Self {
		self.link = Some(link.into());
		self
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn text(&self) -> Option<&str> {
		self.message.as_deref().or(self.body.as_deref())
	}

	pub fn link(&self) -> Option<&str> {
		self.link.as_deref().or_else(|| {
			self.data
				.as_ref()
				.and_then(|data| data.get("link"))
				.and_then(Value::as_str)
		})
	}
}

/// Tracks whether the user is looking at the window.
///
/// Active means not hidden and some input within the inactivity window.
#[derive(Debug)]
pub struct ActivityTracker {
	last_event: Mutex<Instant>,
	hidden: AtomicBool,
	inactive_after: Duration,
}

impl ActivityTracker {
	pub fn new(inactive_after: Duration) -> Self {
		Self {
			last_event: Mutex::new(Instant::now()),
			hidden: AtomicBool::new(false),
			inactive_after,
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(Duration::from_millis(settings.browser_inactive_ms))
	}

	/// Record a key press or pointer move.
	pub fn record_event(&self) {
		*self.last_event.lock() = Instant::now();
	}

	pub fn set_hidden(&self, hidden: bool) {
		self.hidden.store(hidden, Ordering::SeqCst);
	}

	pub fn is_active(&self) -> bool {
		!self.hidden.load(Ordering::SeqCst) && self.last_event.lock().elapsed() < self.inactive_after
	}
}

/// Where a notification ended up.
#[derive(Debug, Clone)]
pub enum Delivery {
	Desktop,
	Toast(Arc<Toast>),
}

pub struct Notifier {
	history: Arc<dyn History>,
	desktop: Option<Arc<dyn DesktopNotifications>>,
	activity: Arc<ActivityTracker>,
	toaster: Toaster,
}

impl Notifier {
	/// Notifier without desktop support; every message becomes a toast.
	pub fn new(history: Arc<dyn History>, toaster: Toaster, settings: &Settings) -> Self {
		Self {
			history,
			desktop: None,
			activity: Arc::new(ActivityTracker::from_settings(settings)),
			toaster,
		}
	}

	pub fn with_desktop(mut self, desktop: Arc<dyn DesktopNotifications>) -> Self {
		self.desktop = Some(desktop);
		self
	}

	pub fn activity(&self) -> &Arc<ActivityTracker> {
		&self.activity
	}

	/// Ask for permission if the user has not decided yet.
	pub fn request(&self) {
		match &self.desktop {
			None => tracing::warn!("desktop notifications are not supported"),
			Some(desktop) if desktop.permission() == Permission::Default => {
				desktop.request_permission();
			}
			Some(_) => {}
		}
	}

	/// Must be called within a tokio runtime.
	pub fn notify(&self, message: &Message) -> Delivery {
		let Some(desktop) = &self.desktop else {
			tracing::warn!("desktop notifications are not supported");
			return self.toast(message);
		};
		if desktop.permission() != Permission::Granted {
			tracing::warn!("desktop notifications not permitted");
			return self.toast(message);
		}
		if self.activity.is_active() {
			return self.toast(message);
		}

		let notification = DesktopNotification {
			title: message.title.clone(),
			body: message.text().map(str::to_string),
			icon: message.icon.clone(),
			badge: message.badge.clone(),
		};
		let on_click = {
			let history = self.history.clone();
			let link = message.link().map(str::to_string);
			Callback::new(move |()| follow(history.as_ref(), link.as_deref()))
		};
		match desktop.show(notification, on_click) {
			Ok(()) => Delivery::Desktop,
			Err(e) => {
				tracing::warn!(error = %e, "desktop notification failed, showing toast");
				self.toast(message)
			}
		}
	}

	fn toast(&self, message: &Message) -> Delivery {
		let history = self.history.clone();
		let link = message.link().map(str::to_string);
		let mut options = ToastOptions::new(message.title.clone())
			.without_progress()
			.on_click(move |toast: Arc<Toast>| {
				toast.close();
				follow(history.as_ref(), link.as_deref());
			});
		options.message = message.text().map(str::to_string);
		options.icon = message.icon.clone();
		Delivery::Toast(self.toaster.message_toast(options))
	}
}

impl std::fmt::Debug for Notifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Notifier")
			.field("desktop", &self.desktop.is_some())
			.field("activity", &self.activity)
			.finish_non_exhaustive()
	}
}

fn follow(history: &dyn History, link: Option<&str>) {
	if let Some(link) = link
		&& let Err(e) = history.push(link)
	{
		tracing::warn!(link, error = %e, "failed to follow notification link");
	}
}
