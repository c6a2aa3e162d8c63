//! # formwork
//!
//! A headless toolkit for dynamic, data-driven forms.
//!
//! Forms are described as data ([`FieldSet`] of [`FieldDescriptor`]s), each
//! field type is dispatched to a render strategy through the
//! [`FieldRegistry`], and the [`FormController`] owns values, errors and the
//! submission lifecycle. Submissions go through [`Requests`], a JSON helper
//! with a configurable status policy. Toasts, notifications, modal routes
//! and confirmation dialogs round out the toolkit.
//!
//! ## Feature Flags
//!
//! - `conf` - settings from defaults, TOML and `FORMWORK_*` variables
//! - `http` - the request helper
//! - `forms` - field registry, renderer and form controller
//! - `ui` - toasts, notifications, modals, dialogs and error views
//! - `full` (default) - everything above
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use formwork::prelude::*;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), FormError> {
//! let fields = FieldSet::from_json(json!({
//!     "email": {"type": "email", "required": true},
//!     "age": {"type": "int"},
//! }))?;
//! let form = FormController::builder(fields, SubmitTarget::post("/signup/"))
//!     .options(FormOptions::new().success_msg("Welcome"))
//!     .build()?;
//! form.input("email", UserInput::Text("ada@example.com".into()))?;
//! match form.submit().await {
//!     Some(SubmissionOutcome::Success(response)) => println!("created {}", response.data),
//!     Some(_) => println!("{:?}", form.state().errors),
//!     None => {}
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "conf")]
pub use formwork_conf as conf;
#[cfg(feature = "forms")]
pub use formwork_forms as forms;
#[cfg(feature = "http")]
pub use formwork_http as http;
#[cfg(feature = "ui")]
pub use formwork_ui as ui;

// Re-export settings
#[cfg(feature = "conf")]
pub use formwork_conf::{Settings, SettingsError};

// Re-export the request helper
#[cfg(feature = "http")]
pub use formwork_http::{
	RequestConfig, RequestError, RequestResult, Requests, Response, StatusPolicy, SubmitTarget,
};

// Re-export forms
#[cfg(feature = "forms")]
pub use formwork_forms::{
	Callback, Control, ControlKind, FieldDescriptor, FieldRegistry, FieldSet, FieldType,
	FormController, FormError, FormOptions, FormResult, FormState, FormView, RenderStrategy,
	SubmissionOutcome, SubmissionPhase, UserInput, ValidationError,
};

// Re-export UI primitives
#[cfg(feature = "ui")]
pub use formwork_ui::{
	ErrorView, MemoryHistory, ModalForm, ModalRoute, Notifier, Toaster, UiError, choice_modal,
	confirm_modal,
};

/// Commonly used types in one import.
pub mod prelude {
	#[cfg(feature = "conf")]
	pub use crate::Settings;

	#[cfg(feature = "http")]
	pub use crate::{RequestConfig, RequestError, Requests, Response, SubmitTarget};

	#[cfg(feature = "forms")]
	pub use crate::{
		FieldDescriptor, FieldRegistry, FieldSet, FieldType, FormController, FormError,
		FormOptions, SubmissionOutcome, SubmissionPhase, UserInput,
	};

	#[cfg(feature = "ui")]
	pub use crate::{ModalForm, ModalRoute, Toaster, confirm_modal};
}
