//! Toast messages
//!
//! Each toast counts down in [`ANIMATION_STEP`] ticks while not hovered, then
//! spends [`CLOSING_TIME`] in the closing state before it is removed. Every
//! close bumps the toast's version; a countdown or closing timer that finds a
//! newer version has been superseded and does nothing.
//!
//! The [`Toaster`] keeps every toast shown since the stack was last empty and
//! clears them together once the last visible one closes.

use formwork_conf::Settings;
use formwork_forms::{Callback, MessageSink};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

pub const ANIMATION_STEP: Duration = Duration::from_millis(20);
pub const CLOSING_TIME: Duration = Duration::from_millis(700);
pub const DEFAULT_TOAST_TIME: Duration = Duration::from_millis(5000);

#[derive(Clone, Default)]
pub struct ToastOptions {
	pub title: String,
	pub message: Option<String>,
	/// Used when `message` is not set
	pub body: Option<String>,
	/// Only icon names starting with `fa` are shown
	pub icon: Option<String>,
	/// Takes precedence over `icon`
	pub toast_icon: Option<String>,
	pub class_name: Option<String>,
	/// On-screen time, the toaster default when unset
	pub time: Option<Duration>,
	/// Hide the progress bar
	pub no_progress: bool,
	pub on_click: Option<Callback<Arc<Toast>>>,
}

impl ToastOptions {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			..Self::default()
		}
	}

	pub fn message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = Some(class_name.into());
		self
	}

	pub fn time(mut self, time: Duration) -> Self {
		self.time = Some(time);
		self
	}

	pub fn without_progress(mut self) -> Self {
		self.no_progress = true;
		self
	}

	pub fn on_click<F>(mut self, f: F) -> Self
	where
		F: Fn(Arc<Toast>) + Send + Sync + 'static,
	{
		self.on_click = Some(Callback::new(f));
		self
	}

	fn shown_icon(&self) -> Option<String> {
		self.toast_icon
			.as_ref()
			.or(self.icon.as_ref())
			.filter(|icon| icon.starts_with("fa"))
			.cloned()
	}
}

impl fmt::Debug for ToastOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ToastOptions")
			.field("title", &self.title)
			.field("message", &self.message)
			.field("icon", &self.icon)
			.field("time", &self.time)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
	Open,
	Closing,
	Closed,
}

#[derive(Debug)]
struct ToastInner {
	version: u64,
	hover: bool,
	status: ToastStatus,
	/// Fraction of the countdown remaining
	progress: f64,
}

pub struct Toast {
	key: u64,
	title: String,
	message: Option<String>,
	icon: Option<String>,
	class_name: Option<String>,
	time: Duration,
	progress_bar: bool,
	on_click: Option<Callback<Arc<Toast>>>,
	inner: Mutex<ToastInner>,
	stack: Weak<StackInner>,
}

impl Toast {
	pub fn key(&self) -> u64 {
		self.key
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	pub fn icon(&self) -> Option<&str> {
		self.icon.as_deref()
	}

	pub fn time(&self) -> Duration {
		self.time
	}

	pub fn status(&self) -> ToastStatus {
		self.inner.lock().status
	}

	/// Remaining countdown fraction, `None` without a progress bar.
	pub fn progress(&self) -> Option<f64> {
		self.progress_bar.then(|| self.inner.lock().progress)
	}

	pub fn set_hover(&self, hover: bool) {
		self.inner.lock().hover = hover;
	}

	/// CSS classes for the toast container.
	pub fn classes(&self) -> String {
		let mut classes = vec!["toast-msg"];
		if self.status() == ToastStatus::Closing {
			classes.push("t-closing");
		}
		if self.on_click.is_some() {
			classes.push("cursor-pointer");
		}
		if let Some(class_name) = &self.class_name {
			classes.push(class_name);
		}
		classes.join(" ")
	}

	/// Start closing now, superseding the countdown.
	pub fn close(self: &Arc<Self>) {
		let version = {
			let mut inner = self.inner.lock();
			if inner.status == ToastStatus::Closed {
				return;
			}
			inner.version += 1;
			inner.version
		};
		tokio::spawn(self.clone().finish(version));
	}

	pub fn click(self: &Arc<Self>) {
		if let Some(on_click) = &self.on_click {
			on_click.call(self.clone());
		}
	}

	async fn run(self: Arc<Self>, version: u64) {
		let steps = (self.time.as_millis() / ANIMATION_STEP.as_millis()).max(1) as u64;
		let mut remaining = steps;
		while remaining > 0 {
			{
				let mut inner = self.inner.lock();
				if inner.version != version {
					return;
				}
				inner.progress = remaining as f64 / steps as f64;
				if !inner.hover {
					remaining -= 1;
				}
			}
			tokio::time::sleep(ANIMATION_STEP).await;
		}
		self.finish(version).await;
	}

	async fn finish(self: Arc<Self>, version: u64) {
		self.inner.lock().status = ToastStatus::Closing;
		tokio::time::sleep(CLOSING_TIME).await;
		{
			let mut inner = self.inner.lock();
			if inner.version != version {
				return;
			}
			inner.status = ToastStatus::Closed;
		}
		if let Some(stack) = self.stack.upgrade() {
			stack.remove();
		}
	}
}

impl fmt::Debug for Toast {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Toast")
			.field("key", &self.key)
			.field("title", &self.title)
			.field("status", &self.status())
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Default)]
struct StackState {
	toasts: Vec<Arc<Toast>>,
	visible: usize,
}

#[derive(Debug)]
struct StackInner {
	state: Mutex<StackState>,
	next_key: AtomicU64,
	default_time: Duration,
}

impl StackInner {
	fn remove(&self) {
		let mut state = self.state.lock();
		state.visible = state.visible.saturating_sub(1);
		if state.visible == 0 {
			state.toasts.clear();
		}
	}
}

/// Stack of toast messages.
#[derive(Debug, Clone)]
pub struct Toaster {
	inner: Arc<StackInner>,
}

impl Toaster {
	pub fn new() -> Self {
		Self::with_default_time(DEFAULT_TOAST_TIME)
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::with_default_time(Duration::from_millis(settings.toast_time_ms))
	}

	pub fn with_default_time(default_time: Duration) -> Self {
		Self {
			inner: Arc::new(StackInner {
				state: Mutex::new(StackState::default()),
				next_key: AtomicU64::new(1),
				default_time,
			}),
		}
	}

	/// Show a toast and start its countdown.
	///
	/// Must be called within a tokio runtime.
	pub fn message_toast(&self, options: ToastOptions) -> Arc<Toast> {
		let icon = options.shown_icon();
		let toast = Arc::new(Toast {
			key: self.inner.next_key.fetch_add(1, Ordering::Relaxed),
			title: options.title,
			message: options.message.or(options.body),
			icon,
			class_name: options.class_name,
			time: options.time.unwrap_or(self.inner.default_time),
			progress_bar: !options.no_progress,
			on_click: options.on_click,
			inner: Mutex::new(ToastInner {
				version: 0,
				hover: false,
				status: ToastStatus::Open,
				progress: 1.0,
			}),
			stack: Arc::downgrade(&self.inner),
		});
		{
			let mut state = self.inner.state.lock();
			state.toasts.push(toast.clone());
			state.visible += 1;
		}
		tracing::debug!(key = toast.key, title = %toast.title, "showing toast");
		tokio::spawn(toast.clone().run(0));
		toast
	}

	/// Toasts currently in the stack, oldest first.
	pub fn toasts(&self) -> Vec<Arc<Toast>> {
		self.inner.state.lock().toasts.clone()
	}

	pub fn visible(&self) -> usize {
		self.inner.state.lock().visible
	}
}

impl Default for Toaster {
	fn default() -> Self {
		Self::new()
	}
}

impl MessageSink for Toaster {
	fn set_message(&self, message: &str) {
		self.message_toast(ToastOptions::new(message));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::AtomicUsize;

	async fn advance(ms: u64) {
		tokio::time::sleep(Duration::from_millis(ms)).await;
	}

	#[rstest]
	#[case(Some("fa-check"), None, Some("fa-check"))]
	#[case(Some("https://example.com/icon.png"), None, None)]
	#[case(Some("fa-check"), Some("fa-bell"), Some("fa-bell"))]
	#[case(None, Some("bell.png"), None)]
	fn test_icon_rule(
		#[case] icon: Option<&str>,
		#[case] toast_icon: Option<&str>,
		#[case] shown: Option<&str>,
	) {
		let options = ToastOptions {
			icon: icon.map(str::to_string),
			toast_icon: toast_icon.map(str::to_string),
			..ToastOptions::default()
		};
		assert_eq!(options.shown_icon().as_deref(), shown);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_body_is_message_alias() {
		let toaster = Toaster::new();
		let toast = toaster.message_toast(ToastOptions {
			body: Some("from body".into()),
			..ToastOptions::new("Saved")
		});
		assert_eq!(toast.message(), Some("from body"));
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_lifecycle_with_default_time() {
		// Arrange
		let toaster = Toaster::new();

		// Act
		let toast = toaster.message_toast(ToastOptions::new("Saved"));

		// Assert
		advance(4_900).await;
		assert_eq!(toast.status(), ToastStatus::Open);
		assert!(toast.progress().unwrap() < 0.1);
		advance(300).await;
		assert_eq!(toast.status(), ToastStatus::Closing);
		assert!(toast.classes().contains("t-closing"));
		advance(700).await;
		assert_eq!(toast.status(), ToastStatus::Closed);
		assert!(toaster.toasts().is_empty());
		assert_eq!(toaster.visible(), 0);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_hover_pauses_countdown() {
		let toaster = Toaster::new();
		let toast = toaster.message_toast(ToastOptions::new("Hold"));
		toast.set_hover(true);

		advance(10_000).await;
		assert_eq!(toast.status(), ToastStatus::Open);

		toast.set_hover(false);
		advance(5_800).await;
		assert_eq!(toast.status(), ToastStatus::Closed);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_close_supersedes_countdown() {
		let toaster = Toaster::new();
		let toast = toaster.message_toast(ToastOptions::new("Bye"));
		advance(100).await;

		toast.close();
		advance(50).await;
		assert_eq!(toast.status(), ToastStatus::Closing);
		advance(700).await;

		assert_eq!(toast.status(), ToastStatus::Closed);
		assert_eq!(toaster.visible(), 0);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_repeated_close_removes_once() {
		let toaster = Toaster::new();
		let first = toaster.message_toast(ToastOptions::new("one"));
		let _second = toaster.message_toast(ToastOptions::new("two").time(Duration::from_secs(60)));

		first.close();
		advance(300).await;
		first.close();
		advance(800).await;

		assert_eq!(first.status(), ToastStatus::Closed);
		assert_eq!(toaster.visible(), 1);
		assert_eq!(toaster.toasts().len(), 2);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_stack_clears_when_last_toast_closes() {
		let toaster = Toaster::new();
		toaster.message_toast(ToastOptions::new("short").time(Duration::from_millis(1_000)));
		toaster.message_toast(ToastOptions::new("long").time(Duration::from_millis(3_000)));

		advance(2_000).await;
		assert_eq!(toaster.visible(), 1);
		assert_eq!(toaster.toasts().len(), 2);

		advance(2_000).await;
		assert!(toaster.toasts().is_empty());
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_click_passes_toast_to_handler() {
		let clicks = Arc::new(AtomicUsize::new(0));
		let toaster = Toaster::new();
		let toast = toaster.message_toast(ToastOptions::new("Open").on_click({
			let clicks = clicks.clone();
			move |toast: Arc<Toast>| {
				clicks.fetch_add(1, Ordering::SeqCst);
				toast.close();
			}
		}));
		assert!(toast.classes().contains("cursor-pointer"));

		toast.click();
		advance(800).await;

		assert_eq!(clicks.load(Ordering::SeqCst), 1);
		assert_eq!(toast.status(), ToastStatus::Closed);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_without_progress_hides_bar() {
		let toaster = Toaster::from_settings(&Settings::default());
		let toast = toaster.message_toast(ToastOptions::new("x").without_progress());
		assert_eq!(toast.progress(), None);
		assert_eq!(toast.time(), DEFAULT_TOAST_TIME);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_message_sink_shows_toast() {
		let toaster = Toaster::new();
		toaster.set_message("Saved");
		let toasts = toaster.toasts();
		assert_eq!(toasts.len(), 1);
		assert_eq!(toasts[0].title(), "Saved");
	}
}
