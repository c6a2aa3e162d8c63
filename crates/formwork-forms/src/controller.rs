//! Form submission state machine
//!
//! ```text
//! Idle ──submit──▶ Validating ──ok──▶ Submitting ──2xx──▶ Succeeded ──▶ Idle
//!  ▲                   │                   │
//!  └──── local error ──┘                   └──≥400 / failure──▶ Rejected ──▶ Idle
//! ```
//!
//! The `disabled` flag is set in the same critical section that leaves
//! `Validating`, so a second submit while one is in flight is ignored.
//! State is kept behind a `parking_lot::Mutex` that is never held across an
//! `.await` or while a caller hook runs.

use crate::callback::Callback;
use crate::control::Control;
use crate::descriptor::{FieldDescriptor, FieldSet, FieldType};
use crate::error::{FormError, FormResult};
use crate::registry::{FieldRegistry, Overrides};
use crate::renderer::{FieldProps, RenderStrategy, UserInput};
use crate::state::{
	ERROR_OCCURRED, FIELD_REQUIRED, FormState, NO_DATA_ENTERED, SubmissionOutcome, SubmissionPhase,
	ValidationError, extract_field_errors,
};
use crate::utils::{is_blank, is_falsy, merge_errors};
use crate::widgets::{FileSelection, read_file};
use formwork_conf::Settings;
use formwork_http::{RequestResult, Requests, Response, SubmitTarget};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Receives the success message after a submission succeeds.
pub trait MessageSink: Send + Sync {
	fn set_message(&self, message: &str);
}

/// Transform applied to the form values before submission
pub type SubmitTransform = Callback<Map<String, Value>, Map<String, Value>>;

/// Caller hooks and labels.
#[derive(Debug, Clone)]
pub struct FormOptions {
	pub submit_data: Option<SubmitTransform>,
	/// Seed values from non-blank initial values when the form is built
	pub submit_initial: bool,
	pub success_msg: Option<String>,
	/// Called with the response after a successful submission
	pub submitted: Option<Callback<Response>>,
	/// Called after `submitted`, or without a response when cancelled
	pub done: Option<Callback<Option<Response>>>,
	pub on_blur: Option<Callback<String>>,
	pub cancel_label: String,
	pub save_label: String,
}

impl Default for FormOptions {
	fn default() -> Self {
		Self {
			submit_data: None,
			submit_initial: false,
			success_msg: None,
			submitted: None,
			done: None,
			on_blur: None,
			cancel_label: "Cancel".to_string(),
			save_label: "Save".to_string(),
		}
	}
}

impl FormOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn submit_data<F>(mut self, f: F) -> Self
	where
		F: Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
	{
		self.submit_data = Some(Callback::new(f));
		self
	}

	pub fn submit_initial(mut self) -> Self {
		self.submit_initial = true;
		self
	}

	pub fn success_msg(mut self, message: impl Into<String>) -> Self {
		self.success_msg = Some(message.into());
		self
	}

	pub fn on_submitted<F>(mut self, f: F) -> Self
	where
		F: Fn(Response) + Send + Sync + 'static,
	{
		self.submitted = Some(Callback::new(f));
		self
	}

	pub fn on_done<F>(mut self, f: F) -> Self
	where
		F: Fn(Option<Response>) + Send + Sync + 'static,
	{
		self.done = Some(Callback::new(f));
		self
	}

	pub fn on_blur<F>(mut self, f: F) -> Self
	where
		F: Fn(String) + Send + Sync + 'static,
	{
		self.on_blur = Some(Callback::new(f));
		self
	}

	pub fn labels(mut self, cancel: impl Into<String>, save: impl Into<String>) -> Self {
		self.cancel_label = cancel.into();
		self.save_label = save.into();
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
	pub label: String,
	pub disabled: bool,
}

/// Rendered form: form-level error, one control per field, button bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
	pub form_error: Option<String>,
	pub fields: Vec<Control>,
	pub cancel: Button,
	pub save: Button,
}

#[derive(Debug, Default)]
struct Inner {
	state: FormState,
	phase: SubmissionPhase,
	/// Caller-owned errors; any non-empty entry blocks submission
	external_errors: HashMap<String, String>,
	external_form_error: Option<String>,
	/// Errors raised by controls themselves, e.g. a rejected file
	local_errors: HashMap<String, String>,
}

impl Inner {
	fn leave_terminal_phase(&mut self) {
		if matches!(
			self.phase,
			SubmissionPhase::Succeeded | SubmissionPhase::Rejected
		) {
			self.phase = SubmissionPhase::Idle;
		}
	}
}

pub struct FormController {
	fields: FieldSet,
	initial: Map<String, Value>,
	registry: Arc<FieldRegistry>,
	overrides: Overrides,
	requests: Requests,
	target: SubmitTarget,
	options: FormOptions,
	messages: Option<Arc<dyn MessageSink>>,
	inner: Mutex<Inner>,
	mounted: AtomicBool,
}

/// Builder for [`FormController`]
///
/// # Example
/// ```rust,no_run
/// use formwork_forms::{FieldDescriptor, FieldSet, FieldType, FormController, FormOptions};
/// use formwork_http::SubmitTarget;
///
/// let fields = FieldSet::new()
///     .with(FieldDescriptor::text("name").required())
///     .with(FieldDescriptor::new("age", FieldType::Int));
/// let form = FormController::builder(fields, SubmitTarget::post("/people/"))
///     .options(FormOptions::new().success_msg("Saved"))
///     .build()
///     .unwrap();
/// ```
pub struct FormControllerBuilder {
	fields: FieldSet,
	target: SubmitTarget,
	initial: Map<String, Value>,
	registry: Option<Arc<FieldRegistry>>,
	overrides: Overrides,
	requests: Option<Requests>,
	options: FormOptions,
	messages: Option<Arc<dyn MessageSink>>,
}

impl FormControllerBuilder {
	pub fn initial(mut self, initial: Map<String, Value>) -> Self {
		self.initial = initial;
		self
	}

	pub fn registry(mut self, registry: Arc<FieldRegistry>) -> Self {
		self.registry = Some(registry);
		self
	}

	/// Use `strategy` for fields tagged `tag`, ahead of the registry.
	pub fn override_widget(mut self, tag: impl Into<String>, strategy: Arc<dyn RenderStrategy>) -> Self {
		self.overrides.insert(tag.into(), strategy);
		self
	}

	pub fn requests(mut self, requests: Requests) -> Self {
		self.requests = Some(requests);
		self
	}

	pub fn options(mut self, options: FormOptions) -> Self {
		self.options = options;
		self
	}

	pub fn messages(mut self, sink: Arc<dyn MessageSink>) -> Self {
		self.messages = Some(sink);
		self
	}

	/// Build and mount the controller.
	///
	/// Without explicit [`Requests`] a reqwest-backed helper is built from
	/// default settings.
	pub fn build(self) -> FormResult<FormController> {
		let requests = match self.requests {
			Some(requests) => requests,
			None => Requests::from_settings(&Settings::default())?,
		};

		let mut state = FormState::default();
		if self.options.submit_initial {
			for name in self.fields.names() {
				if let Some(value) = self.initial.get(name)
					&& !is_falsy(value)
				{
					state.values.insert(name.to_string(), value.clone());
				}
			}
		}

		Ok(FormController {
			fields: self.fields,
			initial: self.initial,
			registry: self.registry.unwrap_or_default(),
			overrides: self.overrides,
			requests,
			target: self.target,
			options: self.options,
			messages: self.messages,
			inner: Mutex::new(Inner {
				state,
				..Inner::default()
			}),
			mounted: AtomicBool::new(true),
		})
	}
}

impl FormController {
	pub fn builder(fields: FieldSet, target: SubmitTarget) -> FormControllerBuilder {
		FormControllerBuilder {
			fields,
			target,
			initial: Map::new(),
			registry: None,
			overrides: Overrides::new(),
			requests: None,
			options: FormOptions::default(),
			messages: None,
		}
	}

	pub fn fields(&self) -> &FieldSet {
		&self.fields
	}

	pub fn options(&self) -> &FormOptions {
		&self.options
	}

	/// Snapshot of the current state.
	pub fn state(&self) -> FormState {
		self.inner.lock().state.clone()
	}

	pub fn phase(&self) -> SubmissionPhase {
		self.inner.lock().phase
	}

	pub fn is_disabled(&self) -> bool {
		self.inner.lock().state.disabled
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.load(Ordering::SeqCst)
	}

	/// Current value of a field, falling back to its initial value.
	pub fn value(&self, name: &str) -> Value {
		let inner = self.inner.lock();
		self.value_of(&inner, name)
	}

	fn value_of(&self, inner: &Inner, name: &str) -> Value {
		inner
			.state
			.values
			.get(name)
			.or_else(|| self.initial.get(name))
			.cloned()
			.unwrap_or(Value::Null)
	}

	/// Value the control shows: current, else initial, else the field default.
	fn shown_value(&self, field: &FieldDescriptor) -> Value {
		match (self.value(&field.name), &field.default) {
			(Value::Null, Some(default)) => default.clone(),
			(value, _) => value,
		}
	}

	fn field(&self, name: &str) -> FormResult<&FieldDescriptor> {
		self.fields
			.get(name)
			.ok_or_else(|| FormError::UnknownField(name.to_string()))
	}

	/// Replace the caller-owned field errors.
	pub fn set_external_errors(&self, errors: HashMap<String, String>) {
		self.inner.lock().external_errors = errors;
	}

	/// Caller-owned form-level error, shown ahead of the controller's own.
	pub fn set_external_form_error(&self, error: Option<String>) {
		self.inner.lock().external_form_error = error;
	}

	/// Set a field value.
	///
	/// Returns `Ok(false)` when the edit was rejected because a submission
	/// is in flight.
	pub fn set_field(&self, name: &str, value: Value) -> FormResult<bool> {
		let field = self.field(name)?;
		let blank = is_blank(Some(&value));
		{
			let mut inner = self.inner.lock();
			if inner.state.disabled {
				tracing::debug!(field = name, "edit ignored while submitting");
				return Ok(false);
			}
			inner.state.values.insert(name.to_string(), value);
			inner.leave_terminal_phase();
		}
		if field.field_type == FieldType::Recaptcha && blank {
			self.registry.captcha().reset(name);
		}
		Ok(true)
	}

	/// Coerce raw input with the field's strategy and set the result.
	pub fn input(&self, name: &str, input: UserInput) -> FormResult<bool> {
		let field = self.field(name)?;
		let strategy = self.registry.resolve(&field.field_type, &self.overrides);
		let value = strategy.coerce(field, &self.shown_value(field), input);
		self.set_field(name, value)
	}

	/// Forward a blur to the caller hook. Errors are left untouched.
	pub fn blur(&self, name: &str) {
		if let Some(on_blur) = &self.options.on_blur {
			on_blur.call(name.to_string());
		}
	}

	/// Read a selected file into a file field.
	///
	/// A rejected file sets the field's local error and clears its value.
	pub async fn select_file(&self, name: &str, selection: FileSelection) -> FormResult<bool> {
		let field = self.field(name)?;
		if field.field_type != FieldType::File {
			return Err(FormError::WrongFieldType {
				field: name.to_string(),
				expected: "file",
			});
		}
		let read = read_file(field, selection).await;
		{
			let mut inner = self.inner.lock();
			match read.error {
				Some(error) => inner.local_errors.insert(name.to_string(), error),
				None => inner.local_errors.remove(name),
			};
		}
		self.set_field(name, read.value)
	}

	/// Load and render the captcha for `name`; tokens flow back into the
	/// field.
	pub async fn mount_captcha(self: &Arc<Self>, name: &str) -> FormResult<()> {
		let field = self.field(name)?;
		if field.field_type != FieldType::Recaptcha {
			return Err(FormError::WrongFieldType {
				field: name.to_string(),
				expected: "recaptcha",
			});
		}
		let form: Weak<Self> = Arc::downgrade(self);
		let field_name = name.to_string();
		let on_token = Callback::new(move |token: Option<String>| {
			if let Some(form) = form.upgrade()
				&& let Err(e) = form.input(&field_name, UserInput::Token(token))
			{
				tracing::warn!(field = %field_name, error = %e, "captcha token not applied");
			}
		});
		self.registry.captcha().ensure_ready(name, on_token).await
	}

	/// Stop applying outcomes; an in-flight submission still resolves.
	pub fn unmount(&self) {
		self.mounted.store(false, Ordering::SeqCst);
	}

	pub fn cancel(&self) {
		if let Some(done) = &self.options.done {
			done.call(None);
		}
	}

	/// Validate and submit the form.
	///
	/// Returns `None` when the attempt was ignored: a submission is already
	/// in flight, or caller-supplied errors are present.
	pub async fn submit(&self) -> Option<SubmissionOutcome> {
		let payload = match self.begin_submit() {
			Ok(payload) => payload,
			Err(outcome) => return outcome,
		};

		let result = self.requests.submit(&self.target, Value::Object(payload)).await;
		let (outcome, form_error) = self.classify(result);

		if !self.is_mounted() {
			tracing::debug!("form unmounted during submission, outcome not applied");
			return Some(outcome);
		}
		self.apply(&outcome, form_error);
		Some(outcome)
	}

	fn begin_submit(&self) -> Result<Map<String, Value>, Option<SubmissionOutcome>> {
		let values = {
			let mut inner = self.inner.lock();
			if inner.state.disabled {
				tracing::debug!("submit ignored, a submission is already in flight");
				return Err(None);
			}
			if inner.external_errors.values().any(|e| !e.is_empty()) {
				tracing::debug!("submit ignored, caller-supplied errors are present");
				return Err(None);
			}
			inner.phase = SubmissionPhase::Validating;
			inner.state.values.clone()
		};

		let payload = match &self.options.submit_data {
			Some(transform) => transform.call(values),
			None => values,
		};

		let missing: Vec<ValidationError> = self
			.fields
			.iter()
			.filter(|f| {
				f.required && is_blank(self.initial.get(&f.name)) && is_blank(payload.get(&f.name))
			})
			.map(|f| ValidationError::new(f.name.clone(), FIELD_REQUIRED))
			.collect();

		let mut inner = self.inner.lock();
		if inner.state.disabled {
			return Err(None);
		}
		if !missing.is_empty() {
			inner.state.errors = missing
				.iter()
				.map(|e| (e.field_name.clone(), e.message.clone()))
				.collect();
			inner.state.form_error = None;
			inner.phase = SubmissionPhase::Idle;
			return Err(Some(SubmissionOutcome::ValidationFailure(missing)));
		}
		if payload.is_empty() {
			inner.state.form_error = Some(NO_DATA_ENTERED.to_string());
			inner.phase = SubmissionPhase::Idle;
			return Err(Some(SubmissionOutcome::ValidationFailure(Vec::new())));
		}

		inner.state.disabled = true;
		inner.state.errors.clear();
		inner.state.form_error = None;
		inner.phase = SubmissionPhase::Submitting;
		Ok(payload)
	}

	/// Outcome of a submit result plus the form-level error it implies.
	fn classify(&self, result: RequestResult<Response>) -> (SubmissionOutcome, Option<String>) {
		match result {
			Ok(response) if response.status < 400 => (SubmissionOutcome::Success(response), None),
			Ok(response) => {
				let (errors, unattributed): (Vec<_>, Vec<_>) = extract_field_errors(&response.data)
					.into_iter()
					.partition(|e| self.fields.contains(&e.field_name));
				for e in &unattributed {
					tracing::debug!(field = %e.field_name, "dropping error for unknown field");
				}
				tracing::warn!(status = response.status, errors = errors.len(), "form submission rejected");
				let form_error = errors.is_empty().then(|| {
					response
						.data
						.get("message")
						.and_then(Value::as_str)
						.unwrap_or(ERROR_OCCURRED)
						.to_string()
				});
				(SubmissionOutcome::ValidationFailure(errors), form_error)
			}
			Err(e) => {
				tracing::warn!(error = %e, "form submission failed");
				let message = e.to_string();
				(SubmissionOutcome::TransportFailure(message.clone()), Some(message))
			}
		}
	}

	fn apply(&self, outcome: &SubmissionOutcome, form_error: Option<String>) {
		{
			let mut inner = self.inner.lock();
			inner.state.disabled = false;
			inner.state.form_error = form_error;
			match outcome {
				SubmissionOutcome::Success(_) => {
					inner.state.errors.clear();
					inner.phase = SubmissionPhase::Succeeded;
				}
				SubmissionOutcome::ValidationFailure(errors) => {
					inner.state.errors = errors
						.iter()
						.map(|e| (e.field_name.clone(), e.message.clone()))
						.collect();
					inner.phase = SubmissionPhase::Rejected;
				}
				SubmissionOutcome::TransportFailure(_) => {
					inner.state.errors.clear();
					inner.phase = SubmissionPhase::Rejected;
				}
			}
		}

		if let SubmissionOutcome::Success(response) = outcome {
			if let (Some(message), Some(sink)) = (&self.options.success_msg, &self.messages) {
				sink.set_message(message);
			}
			if let Some(submitted) = &self.options.submitted {
				submitted.call(response.clone());
			}
			if let Some(done) = &self.options.done {
				done.call(Some(response.clone()));
			}
		}
	}

	/// Render one field.
	///
	/// An undefined field is an error unless `optional` is set, in which
	/// case nothing is rendered.
	pub fn render_field(&self, name: &str, optional: bool) -> FormResult<Option<Control>> {
		match self.fields.get(name) {
			Some(field) => Ok(Some(self.render_descriptor(field))),
			None if optional => Ok(None),
			None => Err(FormError::UndefinedField(name.to_string())),
		}
	}

	fn render_descriptor(&self, field: &FieldDescriptor) -> Control {
		let (value, disabled, error, local_error) = {
			let inner = self.inner.lock();
			let error = merge_errors(
				inner.state.errors.get(&field.name).map(String::as_str),
				inner
					.external_errors
					.get(&field.name)
					.map(String::as_str)
					.filter(|e| !e.is_empty()),
			);
			(
				self.value_of(&inner, &field.name),
				inner.state.disabled,
				error,
				inner.local_errors.get(&field.name).cloned(),
			)
		};
		let strategy = self.registry.resolve(&field.field_type, &self.overrides);
		strategy.render(&FieldProps {
			field,
			value: &value,
			disabled,
			error: error.as_deref(),
			local_error: local_error.as_deref(),
		})
	}

	/// Render every field in order with the form error and button bar.
	pub fn render(&self) -> FormView {
		let fields = self
			.fields
			.iter()
			.map(|field| self.render_descriptor(field))
			.collect();
		let inner = self.inner.lock();
		let disabled = inner.state.disabled;
		FormView {
			form_error: inner
				.external_form_error
				.clone()
				.or_else(|| inner.state.form_error.clone()),
			fields,
			cancel: Button {
				label: self.options.cancel_label.clone(),
				disabled,
			},
			save: Button {
				label: self.options.save_label.clone(),
				disabled,
			},
		}
	}
}

impl fmt::Debug for FormController {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormController")
			.field("fields", &self.fields.names().collect::<Vec<_>>())
			.field("target", &self.target)
			.field("phase", &self.phase())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::control::ControlKind;
	use formwork_http::RequestError;
	use rstest::rstest;
	use serde_json::json;
	use std::sync::atomic::AtomicUsize;
	use std::time::Duration;

	fn form(fields: FieldSet, target: SubmitTarget) -> FormControllerBuilder {
		FormController::builder(fields, target)
	}

	fn echo_target(calls: Arc<AtomicUsize>) -> SubmitTarget {
		SubmitTarget::handler(move |payload| {
			let calls = calls.clone();
			async move {
				calls.fetch_add(1, Ordering::SeqCst);
				Ok(Response::new(200, payload))
			}
		})
	}

	fn person_fields() -> FieldSet {
		FieldSet::new()
			.with(FieldDescriptor::text("name").required())
			.with(FieldDescriptor::new("age", FieldType::Int))
	}

	#[rstest]
	#[tokio::test]
	async fn test_set_field_unknown_is_error() {
		let form = form(person_fields(), SubmitTarget::post("/x/")).build().unwrap();
		assert!(matches!(
			form.set_field("nope", json!(1)),
			Err(FormError::UnknownField(name)) if name == "nope"
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_input_coerces_through_strategy() {
		let form = form(person_fields(), SubmitTarget::post("/x/")).build().unwrap();

		assert!(form.input("age", UserInput::Text("42".into())).unwrap());

		assert_eq!(form.value("age"), json!(42));
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_required_blocks_request() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let form = form(person_fields(), echo_target(calls.clone())).build().unwrap();
		form.set_field("age", json!(30)).unwrap();

		// Act
		let outcome = form.submit().await;

		// Assert
		assert_eq!(
			outcome,
			Some(SubmissionOutcome::ValidationFailure(vec![ValidationError::new(
				"name",
				"Field Required"
			)]))
		);
		assert_eq!(form.state().errors.get("name").map(String::as_str), Some("Field Required"));
		assert_eq!(form.phase(), SubmissionPhase::Idle);
		assert!(!form.is_disabled());
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_required_satisfied_by_initial_value() {
		let calls = Arc::new(AtomicUsize::new(0));
		let mut initial = Map::new();
		initial.insert("name".into(), json!("Ada"));
		let form = form(person_fields(), echo_target(calls.clone()))
			.initial(initial)
			.build()
			.unwrap();
		form.set_field("age", json!(36)).unwrap();

		let outcome = form.submit().await.unwrap();

		assert!(outcome.is_success());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_payload_sets_form_error() {
		let calls = Arc::new(AtomicUsize::new(0));
		let fields = FieldSet::new().with(FieldDescriptor::text("note"));
		let form = form(fields, echo_target(calls.clone())).build().unwrap();

		let outcome = form.submit().await;

		assert_eq!(outcome, Some(SubmissionOutcome::ValidationFailure(vec![])));
		assert_eq!(form.state().form_error.as_deref(), Some("No data entered"));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	#[tokio::test]
	async fn test_external_errors_block_submit_without_state_change() {
		let calls = Arc::new(AtomicUsize::new(0));
		let form = form(person_fields(), echo_target(calls.clone())).build().unwrap();
		form.set_field("name", json!("Ada")).unwrap();
		form.set_external_errors(HashMap::from([("name".to_string(), "Already taken".to_string())]));
		let before = form.state();

		let outcome = form.submit().await;

		assert_eq!(outcome, None);
		assert_eq!(form.state(), before);
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		let control = form.render_field("name", false).unwrap().unwrap();
		assert_eq!(control.error.as_deref(), Some("Already taken"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_submit_transform_shapes_payload() {
		let received = Arc::new(Mutex::new(Value::Null));
		let target = SubmitTarget::handler({
			let received = received.clone();
			move |payload| {
				*received.lock() = payload.clone();
				async move { Ok(Response::new(201, json!({}))) }
			}
		});
		let form = form(person_fields(), target)
			.options(FormOptions::new().submit_data(|mut values| {
				values.insert("source".into(), json!("web"));
				values
			}))
			.build()
			.unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		form.submit().await.unwrap();

		assert_eq!(*received.lock(), json!({"name": "Ada", "source": "web"}));
	}

	#[rstest]
	#[tokio::test]
	async fn test_success_runs_hooks_in_order() {
		// Arrange
		struct Sink(Mutex<Vec<String>>);
		impl MessageSink for Sink {
			fn set_message(&self, message: &str) {
				self.0.lock().push(format!("message:{}", message));
			}
		}
		let sink = Arc::new(Sink(Mutex::new(Vec::new())));
		let log = sink.clone();
		let log2 = sink.clone();
		let options = FormOptions::new()
			.success_msg("Saved")
			.on_submitted(move |r| log.0.lock().push(format!("submitted:{}", r.status)))
			.on_done(move |r| log2.0.lock().push(format!("done:{}", r.is_some())));
		let form = form(person_fields(), echo_target(Arc::new(AtomicUsize::new(0))))
			.options(options)
			.messages(sink.clone())
			.build()
			.unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		// Act
		form.submit().await.unwrap();

		// Assert
		assert_eq!(
			*sink.0.lock(),
			["message:Saved", "submitted:200", "done:true"]
		);
		assert_eq!(form.phase(), SubmissionPhase::Succeeded);
		form.set_field("age", json!(1)).unwrap();
		assert_eq!(form.phase(), SubmissionPhase::Idle);
	}

	#[rstest]
	#[case(json!({"details": [{"loc": ["body", "email"], "msg": "bad"}]}), None)]
	#[case(json!({"details": [{"loc": ["body", "unknown"], "msg": "bad"}]}), Some("Error occurred"))]
	#[case(json!({"message": "Conflict with existing record"}), Some("Conflict with existing record"))]
	#[tokio::test]
	async fn test_rejection_form_error(#[case] body: Value, #[case] form_error: Option<&str>) {
		let fields = FieldSet::new().with(FieldDescriptor::text("email"));
		let target = SubmitTarget::handler(move |_| {
			let body = body.clone();
			async move { Ok(Response::new(409, body)) }
		});
		let form = form(fields, target).build().unwrap();
		form.set_field("email", json!("x")).unwrap();

		form.submit().await.unwrap();

		let state = form.state();
		assert_eq!(state.form_error.as_deref(), form_error);
		assert!(state.errors.keys().all(|k| form.fields().contains(k)));
		assert!(!state.disabled);
		assert_eq!(form.phase(), SubmissionPhase::Rejected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_handler_error_is_transport_failure() {
		let target = SubmitTarget::handler(|_| async { Err(RequestError::handler("offline")) });
		let form = form(person_fields(), target).build().unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		let outcome = form.submit().await;

		assert_eq!(outcome, Some(SubmissionOutcome::TransportFailure("offline".into())));
		assert_eq!(form.state().form_error.as_deref(), Some("offline"));
		assert!(form.state().errors.is_empty());
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_concurrent_submits_send_once() {
		// Arrange
		let calls = Arc::new(AtomicUsize::new(0));
		let target = SubmitTarget::handler({
			let calls = calls.clone();
			move |payload| {
				let calls = calls.clone();
				async move {
					calls.fetch_add(1, Ordering::SeqCst);
					tokio::time::sleep(Duration::from_millis(50)).await;
					Ok(Response::new(200, payload))
				}
			}
		});
		let form = form(person_fields(), target).build().unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		// Act
		let (first, second) = tokio::join!(form.submit(), form.submit());

		// Assert
		assert!(first.unwrap().is_success());
		assert_eq!(second, None);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_edits_rejected_while_submitting() {
		let target = SubmitTarget::handler(|payload| async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			Ok(Response::new(200, payload))
		});
		let form = form(person_fields(), target).build().unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		let edit = async {
			tokio::task::yield_now().await;
			let accepted = form.set_field("name", json!("Grace")).unwrap();
			let view = form.render();
			(accepted, view)
		};
		let (_, (accepted, view)) = tokio::join!(form.submit(), edit);

		assert!(!accepted);
		assert!(view.save.disabled && view.cancel.disabled);
		assert!(view.fields.iter().all(|c| c.disabled));
		assert_eq!(form.value("name"), json!("Ada"));
		assert!(!form.is_disabled());
	}

	#[rstest]
	#[tokio::test(start_paused = true)]
	async fn test_unmounted_form_ignores_outcome() {
		let target = SubmitTarget::handler(|_| async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			Ok(Response::new(422, json!({"details": [{"loc": ["name"], "msg": "bad"}]})))
		});
		let form = form(person_fields(), target).build().unwrap();
		form.set_field("name", json!("Ada")).unwrap();

		let unmount = async {
			tokio::task::yield_now().await;
			form.unmount();
		};
		let (outcome, _) = tokio::join!(form.submit(), unmount);

		assert!(matches!(outcome, Some(SubmissionOutcome::ValidationFailure(ref e)) if e.len() == 1));
		assert!(form.state().errors.is_empty());
		assert_eq!(form.phase(), SubmissionPhase::Submitting);
	}

	#[rstest]
	#[tokio::test]
	async fn test_blur_only_forwards() {
		let blurred = Arc::new(Mutex::new(Vec::new()));
		let options = FormOptions::new().on_blur({
			let blurred = blurred.clone();
			move |name| blurred.lock().push(name)
		});
		let form = form(person_fields(), SubmitTarget::post("/x/"))
			.options(options)
			.build()
			.unwrap();
		form.submit().await;
		let errors_before = form.state().errors;

		form.blur("name");

		assert_eq!(*blurred.lock(), ["name"]);
		assert_eq!(form.state().errors, errors_before);
	}

	#[rstest]
	#[tokio::test]
	async fn test_submit_initial_seeds_truthy_values() {
		let mut initial = Map::new();
		initial.insert("name".into(), json!("Ada"));
		initial.insert("age".into(), json!(0));
		initial.insert("stray".into(), json!("ignored"));
		let form = form(person_fields(), SubmitTarget::post("/x/"))
			.initial(initial)
			.options(FormOptions::new().submit_initial())
			.build()
			.unwrap();

		let values = form.state().values;

		assert_eq!(values.len(), 1);
		assert_eq!(values.get("name"), Some(&json!("Ada")));
	}

	#[rstest]
	#[tokio::test]
	async fn test_toggle_starts_from_default_selection() {
		// Arrange
		let fields = FieldSet::new().with(
			FieldDescriptor::new("tags", FieldType::Checkboxes)
				.choices(["a", "b"])
				.default_value(json!(["a"])),
		);
		let form = form(fields, SubmitTarget::post("/x/")).build().unwrap();
		let shown = form.render_field("tags", false).unwrap().unwrap();
		assert_eq!(shown.value, json!(["a"]));

		// Act
		form.input("tags", UserInput::Pick("b".into())).unwrap();

		// Assert
		assert_eq!(form.value("tags"), json!(["a", "b"]));
	}

	#[rstest]
	#[tokio::test]
	async fn test_datetime_half_keeps_default_other_half() {
		let fields = FieldSet::new().with(
			FieldDescriptor::new("starts", FieldType::Datetime).default_value(json!("2024-03-01T10:30")),
		);
		let form = form(fields, SubmitTarget::post("/x/")).build().unwrap();

		form.input("starts", UserInput::Time("11:45".into())).unwrap();

		let value = form.value("starts");
		assert!(value.as_str().unwrap().starts_with("2024-03-01T11:45"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_server_and_external_errors_both_displayed() {
		// Arrange
		let fields = FieldSet::new().with(FieldDescriptor::text("email"));
		let target = SubmitTarget::handler(|_| async {
			Ok(Response::new(
				422,
				json!({"details": [{"loc": ["email"], "msg": "invalid format"}]}),
			))
		});
		let form = form(fields, target).build().unwrap();
		form.set_field("email", json!("x")).unwrap();
		form.submit().await.unwrap();

		// Act
		form.set_external_errors(HashMap::from([("email".to_string(), "already taken".to_string())]));
		let control = form.render_field("email", false).unwrap().unwrap();

		// Assert
		assert_eq!(control.error.as_deref(), Some("invalid format, already taken"));
		assert_eq!(form.state().errors.get("email").map(String::as_str), Some("invalid format"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_render_field_undefined() {
		let form = form(person_fields(), SubmitTarget::post("/x/")).build().unwrap();

		assert!(matches!(
			form.render_field("missing", false),
			Err(FormError::UndefinedField(_))
		));
		assert!(form.render_field("missing", true).unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_render_uses_initial_then_default() {
		let fields = FieldSet::new()
			.with(FieldDescriptor::text("city").default_value(json!("Paris")))
			.with(FieldDescriptor::text("country").default_value(json!("France")));
		let mut initial = Map::new();
		initial.insert("city".into(), json!("Lyon"));
		let form = form(fields, SubmitTarget::post("/x/")).initial(initial).build().unwrap();

		let view = form.render();

		assert_eq!(view.fields[0].value, json!("Lyon"));
		assert_eq!(view.fields[1].value, json!("France"));
		assert_eq!(view.cancel.label, "Cancel");
		assert_eq!(view.save.label, "Save");
	}

	#[rstest]
	#[tokio::test]
	async fn test_override_widget_is_used() {
		struct Shouty;
		impl RenderStrategy for Shouty {
			fn name(&self) -> &'static str {
				"shouty"
			}
			fn render(&self, props: &FieldProps<'_>) -> Control {
				Control::new(ControlKind::Hidden, props.field.name.to_uppercase())
			}
		}
		let form = form(person_fields(), SubmitTarget::post("/x/"))
			.override_widget("text", Arc::new(Shouty))
			.build()
			.unwrap();

		let control = form.render_field("name", false).unwrap().unwrap();

		assert_eq!(control.name, "NAME");
	}

	#[rstest]
	#[tokio::test]
	async fn test_rejected_file_sets_local_error() {
		let fields = FieldSet::new().with(
			FieldDescriptor::new("upload", FieldType::File).file_types(["text/csv"]),
		);
		let form = form(fields, SubmitTarget::post("/x/")).build().unwrap();
		form.set_external_errors(HashMap::from([("upload".into(), "Too large".into())]));

		form.select_file("upload", FileSelection::new("a.png", "image/png", vec![0]))
			.await
			.unwrap();

		let control = form.render_field("upload", false).unwrap().unwrap();
		assert_eq!(form.value("upload"), Value::Null);
		assert_eq!(
			control.error.as_deref(),
			Some("Too large, Unexpected file type image/png, expected text/csv")
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_select_file_on_wrong_field_type() {
		let form = form(person_fields(), SubmitTarget::post("/x/")).build().unwrap();
		let result = form
			.select_file("name", FileSelection::new("a.txt", "text/plain", vec![]))
			.await;
		assert!(matches!(result, Err(FormError::WrongFieldType { .. })));
	}

	#[rstest]
	#[tokio::test]
	async fn test_cancel_calls_done_without_response() {
		let done = Arc::new(Mutex::new(Vec::new()));
		let options = FormOptions::new().on_done({
			let done = done.clone();
			move |r| done.lock().push(r)
		});
		let form = form(person_fields(), SubmitTarget::post("/x/"))
			.options(options)
			.build()
			.unwrap();

		form.cancel();

		assert_eq!(*done.lock(), vec![None]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_captcha_tokens_flow_into_field() {
		// Arrange
		use crate::widgets::WidgetLoader;

		#[derive(Default)]
		struct Loader {
			on_token: Mutex<Option<Callback<Option<String>>>>,
			resets: AtomicUsize,
		}

		#[async_trait::async_trait]
		impl WidgetLoader for Loader {
			async fn load_script(&self, _url: &str) -> anyhow::Result<()> {
				Ok(())
			}

			fn render(
				&self,
				_element_id: &str,
				_site_key: &str,
				on_token: Callback<Option<String>>,
			) -> anyhow::Result<()> {
				*self.on_token.lock() = Some(on_token);
				Ok(())
			}

			fn reset(&self, _element_id: &str) -> anyhow::Result<()> {
				self.resets.fetch_add(1, Ordering::SeqCst);
				Ok(())
			}
		}

		let loader = Arc::new(Loader::default());
		let registry = FieldRegistry::new().with_widget_loader(loader.clone(), &Settings::default());
		let fields = FieldSet::new().with(FieldDescriptor::new("captcha", FieldType::Recaptcha));
		let form = Arc::new(
			form(fields, SubmitTarget::post("/x/"))
				.registry(Arc::new(registry))
				.build()
				.unwrap(),
		);

		// Act
		form.mount_captcha("captcha").await.unwrap();
		let on_token = loader.on_token.lock().clone().unwrap();
		on_token.call(Some("token-1".into()));

		// Assert
		assert_eq!(form.value("captcha"), json!("token-1"));
		on_token.call(None);
		assert_eq!(form.value("captcha"), Value::Null);
		assert_eq!(loader.resets.load(Ordering::SeqCst), 1);
	}
}
