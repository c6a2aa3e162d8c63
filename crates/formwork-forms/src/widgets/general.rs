//! Plain text-like inputs and hidden inputs

use crate::control::{Control, ControlKind};
use crate::descriptor::{FieldDescriptor, FieldType};
use crate::renderer::{FieldProps, RenderStrategy, UserInput, base_control};
use crate::utils::{as_title, display_value};
use serde_json::Value;

/// Fallback strategy: an `<input>` whose type is the field's own tag, so
/// `email` or `password` fields render as such.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralInput;

impl RenderStrategy for GeneralInput {
	fn name(&self) -> &'static str {
		"general"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let input_type = match &props.field.field_type {
			FieldType::Other(tag) if !tag.is_empty() => tag.clone(),
			_ => "text".to_string(),
		};
		let mut control = base_control(props, ControlKind::Input { input_type });
		control.value = Value::String(display_value(&control.value));
		control.attr("pattern", props.field.pattern.clone())
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenInput;

impl RenderStrategy for HiddenInput {
	fn name(&self) -> &'static str {
		"hidden"
	}

	fn render(&self, props: &FieldProps<'_>) -> Control {
		let field = props.field;
		let mut control = Control::new(ControlKind::Hidden, field.name.clone());
		control.value = Value::String(display_value(&props.shown_value()));
		control.required = field.required;
		// there is no visible control to sit next to, so name the field
		control.error = props
			.merged_error()
			.map(|e| format!("{}: {}", as_title(&field.name), e));
		control
	}

	fn coerce(&self, _field: &FieldDescriptor, _current: &Value, input: UserInput) -> Value {
		match input {
			UserInput::Text(s) => Value::String(s),
			other => other.into_raw(),
		}
	}
}
