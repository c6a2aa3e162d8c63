//! Dynamic forms for formwork
//!
//! This crate provides:
//! - Field descriptors and ordered field sets, loadable from JSON
//! - A field registry dispatching each field type to a render strategy,
//!   with caller overrides and a generic text fallback
//! - Built-in strategies producing headless [`Control`] descriptions
//! - The form controller: values, errors, and the submission lifecycle
//!
//! ```no_run
//! use formwork_forms::{FieldDescriptor, FieldSet, FieldType, FormController};
//! use formwork_http::SubmitTarget;
//!
//! # async fn run() -> formwork_forms::FormResult<()> {
//! let fields = FieldSet::new()
//!     .with(FieldDescriptor::new("age", FieldType::Int).required());
//! let form = FormController::builder(fields, SubmitTarget::post("/people/")).build()?;
//! form.set_field("age", serde_json::json!(30))?;
//! let outcome = form.submit().await;
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod control;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod renderer;
pub mod state;
pub mod utils;
pub mod widgets;

pub use callback::Callback;
pub use control::{Control, ControlKind, ControlOption};
pub use controller::{
	Button, FormController, FormControllerBuilder, FormOptions, FormView, MessageSink,
	SubmitTransform,
};
pub use descriptor::{Choice, FieldDescriptor, FieldSet, FieldType, Placeholder};
pub use error::{FormError, FormResult};
pub use registry::{FieldRegistry, Overrides};
pub use renderer::{FieldProps, RenderStrategy, UserInput};
pub use state::{
	FormState, SubmissionOutcome, SubmissionPhase, ValidationError, extract_field_errors,
};
pub use widgets::{CaptchaWidget, FileSelection, LoadState, WidgetLoader};
