//! Modals addressed by the current location
//!
//! A [`ModalRoute`] is open while the location matches its pattern. Closing
//! navigates back with `replace`, either to an explicit parent URI or to the
//! location with the matched part removed.

use crate::error::UiResult;
use formwork_conf::Settings;
use formwork_forms::{Callback, FormController, FormControllerBuilder, FormOptions, FormView};
use formwork_http::Response;
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

pub const MODAL_BODY_CLASS: &str = "modal-body";
pub const MODAL_FOOTER_CLASS: &str = "modal-footer";

/// Navigation entry point shared by modals and notifications.
pub trait History: Send + Sync {
	/// Current location path
	fn location(&self) -> String;

	fn push(&self, path: &str) -> UiResult<()>;

	fn replace(&self, path: &str) -> UiResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationType {
	Push,
	Replace,
}

/// In-memory history, for headless hosts and tests.
#[derive(Debug)]
pub struct MemoryHistory {
	entries: Mutex<Vec<String>>,
	navigations: Mutex<Vec<(NavigationType, String)>>,
}

impl MemoryHistory {
	pub fn new(location: impl Into<String>) -> Self {
		Self {
			entries: Mutex::new(vec![location.into()]),
			navigations: Mutex::new(Vec::new()),
		}
	}

	pub fn entries(&self) -> Vec<String> {
		self.entries.lock().clone()
	}

	/// Every navigation so far, oldest first.
	pub fn navigations(&self) -> Vec<(NavigationType, String)> {
		self.navigations.lock().clone()
	}

	pub fn back(&self) -> Option<String> {
		let mut entries = self.entries.lock();
		if entries.len() > 1 {
			entries.pop();
		}
		entries.last().cloned()
	}
}

impl History for MemoryHistory {
	fn location(&self) -> String {
		self.entries.lock().last().cloned().unwrap_or_default()
	}

	fn push(&self, path: &str) -> UiResult<()> {
		self.entries.lock().push(path.to_string());
		self.navigations
			.lock()
			.push((NavigationType::Push, path.to_string()));
		Ok(())
	}

	fn replace(&self, path: &str) -> UiResult<()> {
		{
			let mut entries = self.entries.lock();
			match entries.last_mut() {
				Some(last) => *last = path.to_string(),
				None => entries.push(path.to_string()),
			}
		}
		self.navigations
			.lock()
			.push((NavigationType::Replace, path.to_string()));
		Ok(())
	}
}

pub struct ModalRoute {
	pattern: Regex,
	parent_uri: Option<String>,
	history: Arc<dyn History>,
}

impl ModalRoute {
	/// Route using the configured modal pattern.
	pub fn new(history: Arc<dyn History>, settings: &Settings) -> UiResult<Self> {
		Self::with_pattern(history, &settings.modal_pattern)
	}

	pub fn with_pattern(history: Arc<dyn History>, pattern: &str) -> UiResult<Self> {
		Ok(Self {
			pattern: Regex::new(pattern)?,
			parent_uri: None,
			history,
		})
	}

	/// Close to `uri` instead of the stripped location.
	pub fn parent(mut self, uri: impl Into<String>) -> Self {
		self.parent_uri = Some(uri.into());
		self
	}

	pub fn is_open(&self) -> bool {
		self.pattern.is_match(&self.history.location())
	}

	pub fn parent_uri(&self) -> String {
		match &self.parent_uri {
			Some(uri) => uri.clone(),
			None => self
				.pattern
				.replace(&self.history.location(), "")
				.into_owned(),
		}
	}

	pub fn close(&self) -> UiResult<()> {
		let parent = self.parent_uri();
		tracing::debug!(parent = %parent, "closing modal");
		self.history.replace(&parent)
	}

	/// Close, then hand the response to `forward`.
	pub fn submitted(&self, response: Response, forward: Option<&Callback<Response>>) -> UiResult<()> {
		self.close()?;
		if let Some(forward) = forward {
			forward.call(response);
		}
		Ok(())
	}
}

impl std::fmt::Debug for ModalRoute {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModalRoute")
			.field("pattern", &self.pattern.as_str())
			.field("parent_uri", &self.parent_uri)
			.finish_non_exhaustive()
	}
}

/// Everything needed to draw a modal form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
	pub open: bool,
	pub title: String,
	pub body_class: &'static str,
	pub footer_class: &'static str,
	pub form: FormView,
}

/// A form shown in a [`ModalRoute`].
///
/// Cancelling or finishing the form closes the modal before the caller's
/// `done` hook runs.
#[derive(Debug)]
pub struct ModalForm {
	route: Arc<ModalRoute>,
	form: Arc<FormController>,
	title: String,
}

impl ModalForm {
	pub fn new(
		route: ModalRoute,
		title: impl Into<String>,
		builder: FormControllerBuilder,
		mut options: FormOptions,
	) -> UiResult<Self> {
		let route = Arc::new(route);
		let forward = options.done.take();
		let closing = route.clone();
		options.done = Some(Callback::new(move |response: Option<Response>| {
			if let Err(e) = closing.close() {
				tracing::warn!(error = %e, "failed to close modal");
			}
			if let Some(forward) = &forward {
				forward.call(response);
			}
		}));
		let form = builder.options(options).build()?;
		Ok(Self {
			route,
			form: Arc::new(form),
			title: title.into(),
		})
	}

	pub fn form(&self) -> &Arc<FormController> {
		&self.form
	}

	pub fn route(&self) -> &ModalRoute {
		&self.route
	}

	pub fn is_open(&self) -> bool {
		self.route.is_open()
	}

	pub fn close(&self) -> UiResult<()> {
		self.route.close()
	}

	pub fn render(&self) -> ModalView {
		ModalView {
			open: self.is_open(),
			title: self.title.clone(),
			body_class: MODAL_BODY_CLASS,
			footer_class: MODAL_FOOTER_CLASS,
			form: self.form.render(),
		}
	}
}
