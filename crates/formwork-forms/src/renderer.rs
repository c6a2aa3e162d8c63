//! Field rendering seam
//!
//! A [`RenderStrategy`] turns a descriptor and its current value into a
//! [`Control`] and converts raw user input back into a typed value.

use crate::control::{Control, ControlKind};
use crate::descriptor::FieldDescriptor;
use crate::utils::{display_value, merge_errors};
use serde_json::Value;

/// Raw input reported by a rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
	/// Text typed into an input, or the value of a native select
	Text(String),
	/// Checkbox state
	Checked(bool),
	/// A choice was clicked
	Pick(String),
	/// Date half of a datetime field
	Date(String),
	/// Time half of a datetime field
	Time(String),
	/// Captcha token, `None` when expired
	Token(Option<String>),
	/// Result of reading a selected file
	File(Value),
}

impl UserInput {
	/// Value carried by the input without any type coercion.
	pub fn into_raw(self) -> Value {
		match self {
			Self::Text(s) | Self::Pick(s) | Self::Date(s) | Self::Time(s) => Value::String(s),
			Self::Checked(b) => Value::Bool(b),
			Self::Token(token) => token.map_or(Value::Null, Value::String),
			Self::File(value) => value,
		}
	}
}

/// Inputs to a single render.
#[derive(Debug, Clone, Copy)]
pub struct FieldProps<'a> {
	pub field: &'a FieldDescriptor,
	/// Current value, `Null` when nothing was entered
	pub value: &'a Value,
	/// Form-wide disabled flag
	pub disabled: bool,
	/// Error passed in by the form
	pub error: Option<&'a str>,
	/// Error produced by the control itself, e.g. a rejected file
	pub local_error: Option<&'a str>,
}

impl<'a> FieldProps<'a> {
	pub fn new(field: &'a FieldDescriptor, value: &'a Value) -> Self {
		Self {
			field,
			value,
			disabled: false,
			error: None,
			local_error: None,
		}
	}

	/// The current value, or the field default when nothing is set.
	pub fn shown_value(&self) -> Value {
		match (self.value, &self.field.default) {
			(Value::Null, Some(default)) => default.clone(),
			(value, _) => value.clone(),
		}
	}

	/// Passed-in and local errors joined.
	pub fn merged_error(&self) -> Option<String> {
		merge_errors(self.error, self.local_error)
	}

	pub fn is_disabled(&self) -> bool {
		self.disabled || self.field.disabled
	}
}

/// Rendering behaviour for one field type.
pub trait RenderStrategy: Send + Sync {
	/// Short name used in logs
	fn name(&self) -> &'static str;

	fn render(&self, props: &FieldProps<'_>) -> Control;

	/// Convert user input into the value handed to the form.
	///
	/// `current` is the value before the edit; multi-value widgets derive the
	/// full new value from it.
	fn coerce(&self, field: &FieldDescriptor, current: &Value, input: UserInput) -> Value {
		let _ = (field, current);
		input.into_raw()
	}
}

/// Control with the attributes every input shares: label, value, flags,
/// errors, help text, placeholder, autocomplete and length limits.
pub(crate) fn base_control(props: &FieldProps<'_>, kind: ControlKind) -> Control {
	let field = props.field;
	let mut control = Control::new(kind, field.name.clone());
	control.label = field.show_label.then(|| field.display_title());
	control.value = props.shown_value();
	control.disabled = props.is_disabled();
	control.required = field.required;
	control.autofocus = field.focus;
	control.error = props.merged_error();
	control.help_text = field.help_text.clone();
	control
		.attr("placeholder", field.placeholder_text())
		.attr("autocomplete", field.autocomplete.clone())
		.attr("minlength", field.min_length.map(|n| n.to_string()))
		.attr("maxlength", field.max_length.map(|n| n.to_string()))
}

/// Optional value forwarded as an attribute string.
pub(crate) fn attr_value(value: &Option<Value>) -> Option<String> {
	value.as_ref().map(display_value)
}
